use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use tracelens::traceroute::parser::{parse_hop_line, parse_output};
use tracelens::{AddressLiteral, ConnectionMessageParser};

fn sample_output(hops: u32) -> String {
    let mut output = String::from("traceroute to 8.8.8.8 (8.8.8.8), 30 hops max, 60 byte packets\n");
    for n in 1..=hops {
        if n % 5 == 0 {
            output.push_str(&format!("{n:2}  * * *\n"));
        } else {
            output.push_str(&format!(
                "{n:2}  hop{n}.example.net (10.0.{n}.1)  {n}.512 ms  {n}.204 ms  {n}.188 ms\n"
            ));
        }
    }
    output
}

fn benchmark_traceroute_parser(c: &mut Criterion) {
    let output = sample_output(30);

    c.bench_function("parse_output_30_hops", |b| {
        b.iter(|| parse_output(black_box(&output)))
    });

    c.bench_function("parse_hop_line", |b| {
        b.iter(|| parse_hop_line(black_box(" 4  * ae-5.edge1.example.net (203.0.113.9)  25.100 ms *")))
    });
}

fn benchmark_connection_parser(c: &mut Criterion) {
    let parser = ConnectionMessageParser::new();
    let message = "Little Snitch: Spotify tried to establish an outgoing connection to Spotify \
                   via Spotify Helper on TCP port 443 (https) to 2600:1901:1:c36::";

    c.bench_function("parse_connection_message", |b| {
        b.iter(|| parser.parse(black_box(message)))
    });
}

fn benchmark_address_validation(c: &mut Criterion) {
    c.bench_function("validate_addresses", |b| {
        b.iter(|| {
            for text in ["192.168.1.1", "2001:db8::1", "256.0.0.1", "fe80::1::2", "router.local"] {
                black_box(AddressLiteral::parse(black_box(text)));
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_traceroute_parser,
    benchmark_connection_parser,
    benchmark_address_validation
);
criterion_main!(benches);
