use criterion::{criterion_group, criterion_main, Criterion};
use tempo::prelude::*;
use tempo::{NopMetricSink, StatsdClient};

fn new_nop_client() -> StatsdClient {
    StatsdClient::from_sink("client.bench.", NopMetricSink)
}

fn benchmark_count(c: &mut Criterion) {
    let client = new_nop_client();
    c.bench_function("statsdclient_count", |b| b.iter(|| client.count("some.counter", 4)));
}

fn benchmark_count_sampled(c: &mut Criterion) {
    let client = new_nop_client();
    c.bench_function("statsdclient_count_sampled", |b| {
        b.iter(|| client.count_with_rate("some.counter", 4, 0.5))
    });
}

fn benchmark_count_full_rate(c: &mut Criterion) {
    let client = new_nop_client();
    c.bench_function("statsdclient_count_full_rate", |b| {
        b.iter(|| client.count_with_rate("some.counter", 4, 1.0))
    });
}

fn benchmark_time(c: &mut Criterion) {
    let client = new_nop_client();
    c.bench_function("statsdclient_time", |b| b.iter(|| client.time("some.timer", 4)));
}

fn benchmark_gauge(c: &mut Criterion) {
    let client = new_nop_client();
    c.bench_function("statsdclient_gauge", |b| b.iter(|| client.gauge("some.gauge", 4)));
}

fn benchmark_set(c: &mut Criterion) {
    let client = new_nop_client();
    c.bench_function("statsdclient_set", |b| b.iter(|| client.set("some.set", 4)));
}

criterion_group!(
    benches,
    benchmark_count,
    benchmark_count_sampled,
    benchmark_count_full_rate,
    benchmark_time,
    benchmark_gauge,
    benchmark_set
);

criterion_main!(benches);
