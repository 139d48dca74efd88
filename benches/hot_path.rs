//! Criterion benchmarks for the dccpscope hot path:
//! - `protocol::dccp::decode_header` (generic header + type extension)
//! - `protocol::dccp_option::Options` (option TLV walk)
//! - `render_datagram` (IP parse, decode, checksum and line rendering)

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dccpscope::display::DisplayOptions;
use dccpscope::protocol::dccp::decode_header;
use dccpscope::protocol::dccp_option::Options;

/// Build a DCCP-DataAck segment with a 48-bit sequence number, an option
/// area of `options` and `payload_len` bytes of payload.
fn make_dataack_segment(options: &[u8], payload_len: usize) -> Vec<u8> {
    let fixed = 16 + 8;
    let header_len = fixed + options.len();
    assert_eq!(header_len % 4, 0, "option area must be word aligned");

    let mut seg = vec![0u8; header_len + payload_len];
    seg[0..2].copy_from_slice(&40000u16.to_be_bytes()); // sport
    seg[2..4].copy_from_slice(&5001u16.to_be_bytes()); // dport
    seg[4] = (header_len / 4) as u8; // data offset
    seg[5] = 0x10; // CCVal 1, CsCov 0
    seg[8] = (4 << 1) | 1; // DCCP-DataAck, X=1
    seg[10..16].copy_from_slice(&[0, 0, 0, 1, 0, 0]); // seq
    seg[18..24].copy_from_slice(&[0, 0, 0, 0, 0xff, 0xff]); // ack
    seg[fixed..header_len].copy_from_slice(options);

    // Fill payload with arbitrary data
    for (i, byte) in seg[header_len..].iter_mut().enumerate() {
        *byte = (i & 0xFF) as u8;
    }
    seg
}

/// Wrap a segment in a 20-byte IPv4 header with protocol 33.
fn make_ipv4_datagram(src_ip: [u8; 4], dst_ip: [u8; 4], segment: &[u8]) -> Vec<u8> {
    let mut pkt = vec![0u8; 20];
    pkt[0] = 0x45; // version=4, ihl=5
    pkt[2..4].copy_from_slice(&((20 + segment.len()) as u16).to_be_bytes());
    pkt[8] = 64; // TTL
    pkt[9] = 33; // protocol = DCCP
    pkt[12..16].copy_from_slice(&src_ip);
    pkt[16..20].copy_from_slice(&dst_ip);
    pkt.extend_from_slice(segment);
    pkt
}

/// Timestamp, elapsed time, a feature negotiation and a CCID option.
const OPTIONS: &[u8] = &[
    41, 6, 0x00, 0x01, 0x02, 0x03, // timestamp
    43, 4, 0x00, 0x10, // elapsed_time
    34, 4, 1, 2, // change_r ccid 2
    192, 4, 0x12, 0x34, // CCID option
    0, 0, // padding
];

fn bench_decode_header(c: &mut Criterion) {
    let seg = make_dataack_segment(OPTIONS, 0);

    let mut group = c.benchmark_group("decode_header");
    group.throughput(Throughput::Elements(1));

    group.bench_function("dataack_x1", |b| {
        b.iter(|| {
            let _ = decode_header(black_box(&seg), seg.len());
        })
    });

    group.finish();
}

fn bench_options(c: &mut Criterion) {
    let seg = make_dataack_segment(OPTIONS, 0);
    let header = decode_header(&seg, seg.len()).unwrap();

    let mut group = c.benchmark_group("options");
    group.throughput(Throughput::Bytes(OPTIONS.len() as u64));

    group.bench_function("walk_20B", |b| {
        b.iter(|| {
            Options::new(black_box(&seg), header.fixed_len, header.options_len())
                .filter(|opt| opt.is_ok())
                .count()
        })
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let small = make_ipv4_datagram([10, 0, 0, 1], [10, 0, 0, 2], &make_dataack_segment(OPTIONS, 0));
    let large = make_ipv4_datagram(
        [10, 0, 0, 1],
        [10, 0, 0, 2],
        &make_dataack_segment(OPTIONS, 1400),
    );

    let mut group = c.benchmark_group("render_datagram");
    group.throughput(Throughput::Elements(1));

    let brief = DisplayOptions::default();
    let verbose = DisplayOptions {
        quiet: false,
        verbose: 2,
    };

    group.bench_function("brief_64B", |b| {
        b.iter(|| dccpscope::render_datagram(black_box(&small), &brief))
    });

    // Verbose output verifies the checksum over the whole datagram.
    group.bench_function("verbose_1464B", |b| {
        b.iter(|| dccpscope::render_datagram(black_box(&large), &verbose))
    });

    group.finish();
}

criterion_group!(benches, bench_decode_header, bench_options, bench_render);
criterion_main!(benches);
