mod cli;

use clap::Parser;
use dccpscope::config::{self, InputConfig, OutputConfig};
use dccpscope::display;
use dccpscope::input::{self, HexLines};
use std::fs::File;
use std::io::{self, BufReader};

fn main() {
    let args = cli::Cli::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    };

    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(if config.output.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        })
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&config, &args.packets) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[derive(Debug, Default)]
struct Summary {
    packets: u64,
    invalid: u64,
    skipped: u64,
}

/// Decode every datagram from the configured source and print one line each.
fn run(config: &RuntimeConfig, packets: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let datagrams: Box<dyn Iterator<Item = Result<(usize, Vec<u8>), input::InputError>> + '_> =
        if !packets.is_empty() {
            Box::new(
                packets
                    .iter()
                    .enumerate()
                    .map(|(i, text)| input::decode_hex(text, i + 1).map(|bytes| (i + 1, bytes))),
            )
        } else if let Some(path) = &config.input.path {
            tracing::info!(path = %path.display(), "reading datagrams from file");
            Box::new(HexLines::new(BufReader::new(File::open(path)?)))
        } else {
            Box::new(HexLines::new(io::stdin().lock()))
        };

    let opts = config.output.display_options();
    let mut summary = Summary::default();

    for item in datagrams {
        if config.input.count > 0 && summary.packets >= config.input.count {
            break;
        }

        let (line, mut raw) = match item {
            Ok(datagram) => datagram,
            Err(input::InputError::Io(e)) => return Err(Box::new(e)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable line");
                continue;
            }
        };
        summary.packets += 1;

        if config.input.snaplen > 0 {
            raw.truncate(config.input.snaplen);
        }

        match dccpscope::render_datagram(&raw, &opts) {
            Ok(Some(rendered)) => {
                if rendered.is_invalid() {
                    summary.invalid += 1;
                }
                display::print_packet_line(summary.packets, &rendered);
            }
            Ok(None) => summary.skipped += 1,
            Err(e) => {
                summary.skipped += 1;
                tracing::debug!(error = %e, line, "network header parse error");
                if !config.output.quiet {
                    display::print_parse_error(summary.packets, raw.len(), &e);
                }
            }
        }

        if config.output.hex_dump {
            display::print_hex_dump(&raw);
        }
    }

    if !config.output.quiet {
        println!();
        println!("{}", "=".repeat(50));
        println!("  Datagrams read:    {}", summary.packets);
        println!("  Invalid DCCP:      {}", summary.invalid);
        println!("  Skipped:           {}", summary.skipped);
        println!("{}", "=".repeat(50));
    }
    tracing::info!(
        packets = summary.packets,
        invalid = summary.invalid,
        skipped = summary.skipped,
        "run complete"
    );

    Ok(())
}

#[derive(Debug, Clone)]
struct RuntimeConfig {
    input: InputConfig,
    output: OutputConfig,
}

fn load_config(args: &cli::Cli) -> Result<RuntimeConfig, config::ConfigError> {
    let base = match &args.config {
        Some(path) => config::Config::load(path)?,
        None => config::Config::default(),
    };
    Ok(apply_overrides(base, args))
}

/// Command-line flags win over the config file.
fn apply_overrides(base: config::Config, args: &cli::Cli) -> RuntimeConfig {
    let mut input = base.input;
    let mut output = base.output;

    if let Some(value) = &args.read {
        input.path = Some(value.clone());
    }
    if let Some(value) = args.count {
        input.count = value;
    }
    if let Some(value) = args.snaplen {
        input.snaplen = value;
    }

    if args.quiet {
        output.quiet = true;
    }
    if args.no_quiet {
        output.quiet = false;
    }
    if args.verbose > 0 {
        output.verbose = args.verbose;
    }
    if args.hex_dump {
        output.hex_dump = true;
    }
    if args.no_hex_dump {
        output.hex_dump = false;
    }

    RuntimeConfig { input, output }
}
