//! Benchmarks for rendering records with the JSON formatter.

use std::{
    net::{IpAddr, Ipv4Addr},
    time::{Duration, UNIX_EPOCH},
};

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tcplog::{
    FieldValue, JsonFormatter, RecordFormatter, TimestampFormat, record::schema,
};

fn sample_record() -> Vec<FieldValue> {
    vec![
        FieldValue::Time(UNIX_EPOCH + Duration::from_micros(1_700_000_000_123_456)),
        FieldValue::String("CHhAvVGS1DHFjwGM9".into()),
        IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)).into(),
        FieldValue::Port(51_234),
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 53)).into(),
        FieldValue::Port(53),
        FieldValue::Enum("udp".into()),
        FieldValue::Interval(0.000_412),
        FieldValue::Count(48),
        FieldValue::Unset,
        FieldValue::Set(vec!["A".into(), "AAAA".into()]),
    ]
}

fn bench_json(c: &mut Criterion) {
    let fields = schema([
        "ts", "uid", "orig_h", "orig_p", "resp_h", "resp_p", "proto", "duration", "bytes",
        "service", "qtypes",
    ]);
    let values = sample_record();
    let mut group = c.benchmark_group("json_formatter");
    for timestamps in [
        TimestampFormat::Epoch,
        TimestampFormat::Millis,
        TimestampFormat::Iso8601,
    ] {
        let formatter = JsonFormatter::new(timestamps);
        let mut out = Vec::with_capacity(512);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{timestamps:?}")),
            &values,
            |b, values| {
                b.iter(|| {
                    out.clear();
                    formatter
                        .describe(black_box(&fields), black_box(values), &mut out)
                        .expect("record matches schema");
                    black_box(out.len())
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_json);
criterion_main!(benches);
