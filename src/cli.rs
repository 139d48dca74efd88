use clap::Parser;
use std::path::PathBuf;

/// dccpscope: decode and print DCCP packets from hex-encoded IP datagrams
#[derive(Parser, Debug)]
#[command(name = "dccpscope", version, about)]
pub struct Cli {
    /// Hex-encoded IP datagrams to decode. Read from --read or stdin when
    /// none are given.
    pub packets: Vec<String>,

    /// TOML config file; command-line flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// File of hex-encoded datagrams, one per line
    #[arg(short, long)]
    pub read: Option<PathBuf>,

    /// Maximum number of datagrams to decode (0 = unlimited)
    #[arg(short = 'c', long)]
    pub count: Option<u64>,

    /// Cut each datagram to this many bytes, as a capture snap length would
    #[arg(short, long)]
    pub snaplen: Option<usize>,

    /// Print only the payload length of each packet
    #[arg(short, long)]
    pub quiet: bool,

    /// Override a config file that enables quiet output
    #[arg(long, conflicts_with = "quiet")]
    pub no_quiet: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Show hex dump of each datagram
    #[arg(short = 'x', long)]
    pub hex_dump: bool,

    /// Override a config file that enables hex dumps
    #[arg(long, conflicts_with = "hex_dump")]
    pub no_hex_dump: bool,
}
