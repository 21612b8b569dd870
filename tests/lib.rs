use crossbeam_channel::Receiver;
use rand::rngs::mock::StepRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempo::prelude::*;
use tempo::{SpyMetricSink, StatsdClient};

mod utils;
use utils::{run_threaded_test, NUM_ITERATIONS, NUM_THREADS};

fn new_spy_client(prefix: &str) -> (Receiver<Vec<u8>>, StatsdClient) {
    let (rx, sink) = SpyMetricSink::new();
    (rx, StatsdClient::from_sink(prefix, sink))
}

// A client whose generator keeps every mid-range sample rate, so sampled
// emissions are deterministic without a live coin flip.
fn new_sampling_spy_client(prefix: &str) -> (Receiver<Vec<u8>>, StatsdClient) {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::builder(prefix, sink)
        .with_rng(StepRng::new(0, 0))
        .build();
    (rx, client)
}

fn recv_line(rx: &Receiver<Vec<u8>>) -> String {
    String::from_utf8(rx.try_recv().expect("expected a metric on the wire")).unwrap()
}

/// Reference parser for the Statsd line format:
/// `{key}:{value}|{type}` with an optional trailing `|@{rate}`.
fn parse_metric(line: &str) -> (String, i64, String, Option<f64>) {
    let mut parts = line.split('|');

    let base = parts.next().expect("missing key and value");
    let (key, value) = base.split_once(':').expect("missing value separator");
    let type_ = parts.next().expect("missing metric type").to_string();
    let rate = parts.next().map(|part| {
        let rate = part.strip_prefix('@').expect("missing rate marker");
        rate.parse::<f64>().expect("unparseable rate")
    });
    assert_eq!(None, parts.next(), "trailing garbage on metric line");

    (key.to_string(), value.parse::<i64>().expect("unparseable value"), type_, rate)
}

#[test]
fn test_wire_lines_match_statsd_format() {
    let (rx, client) = new_spy_client("myPrefix");

    client.incr("incr");
    client.decr("decr");
    client.count("count", 42);
    client.gauge("gauge", 128);
    client.time("timing", 2);
    client.set("set", 4294967295);

    assert_eq!("myPrefixincr:1|c", recv_line(&rx));
    assert_eq!("myPrefixdecr:-1|c", recv_line(&rx));
    assert_eq!("myPrefixcount:42|c", recv_line(&rx));
    assert_eq!("myPrefixgauge:128|g", recv_line(&rx));
    assert_eq!("myPrefixtiming:2|ms", recv_line(&rx));
    assert_eq!("myPrefixset:4294967295|s", recv_line(&rx));
}

#[test]
fn test_round_trip_counter() {
    let (rx, client) = new_spy_client("app.");
    client.count("requests", -3);

    let (key, value, type_, rate) = parse_metric(&recv_line(&rx));
    assert_eq!("app.requests", key);
    assert_eq!(-3, value);
    assert_eq!("c", type_);
    assert_eq!(None, rate);
}

#[test]
fn test_round_trip_sampled_counter() {
    let (rx, client) = new_sampling_spy_client("app.");
    client.incr_with_rate("requests", 0.5);

    let (key, value, type_, rate) = parse_metric(&recv_line(&rx));
    assert_eq!("app.requests", key);
    assert_eq!(1, value);
    assert_eq!("c", type_);
    assert_eq!(Some(0.5), rate);
}

#[test]
fn test_round_trip_sampled_rate_two_decimal_precision() {
    let (rx, client) = new_sampling_spy_client("app.");
    client.incr_with_rate("requests", 1.0 / 3.0);

    let (_, _, _, rate) = parse_metric(&recv_line(&rx));
    assert_eq!(Some(0.33), rate);
}

#[test]
fn test_round_trip_timer() {
    let (rx, client) = new_spy_client("app.");
    client.time("db.query", 157);

    let (key, value, type_, rate) = parse_metric(&recv_line(&rx));
    assert_eq!("app.db.query", key);
    assert_eq!(157, value);
    assert_eq!("ms", type_);
    assert_eq!(None, rate);
}

#[test]
fn test_round_trip_gauge() {
    let (rx, client) = new_spy_client("app.");
    client.gauge("connections", 42);

    let (key, value, type_, rate) = parse_metric(&recv_line(&rx));
    assert_eq!("app.connections", key);
    assert_eq!(42, value);
    assert_eq!("g", type_);
    assert_eq!(None, rate);
}

#[test]
fn test_round_trip_set() {
    let (rx, client) = new_spy_client("app.");
    client.set("users.uniques", 4294967295);

    let (key, value, type_, rate) = parse_metric(&recv_line(&rx));
    assert_eq!("app.users.uniques", key);
    assert_eq!(4294967295, value);
    assert_eq!("s", type_);
    assert_eq!(None, rate);
}

#[test]
fn test_zero_and_invalid_rates_emit_nothing() {
    let (rx, client) = new_spy_client("app.");

    for _ in 0..50 {
        client.incr_with_rate("some.counter", 0.0);
        client.incr_with_rate("some.counter", -1.0);
        client.incr_with_rate("some.counter", f64::NAN);
        client.incr_with_rate("some.counter", f64::NEG_INFINITY);
        client.incr_with_rate("some.counter", 1e-9);
    }

    assert!(rx.try_recv().is_err());
}

#[test]
fn test_full_and_excess_rates_always_emit_unsampled() {
    let (rx, client) = new_spy_client("app.");

    for _ in 0..50 {
        client.incr_with_rate("some.counter", 1.0);
        client.incr_with_rate("some.counter", 7.5);
        client.incr_with_rate("some.counter", f64::INFINITY);
    }

    let sent: Vec<Vec<u8>> = rx.try_iter().collect();
    assert_eq!(150, sent.len());
    for line in sent {
        assert_eq!("app.some.counter:1|c", String::from_utf8(line).unwrap());
    }
}

#[test]
fn test_seeded_clients_agree_on_decisions() {
    let (rx1, sink1) = SpyMetricSink::new();
    let (rx2, sink2) = SpyMetricSink::new();
    let client1 = StatsdClient::builder("app.", sink1).with_seed(42).build();
    let client2 = StatsdClient::builder("app.", sink2).with_seed(42).build();

    for _ in 0..200 {
        client1.incr_with_rate("some.counter", 0.5);
        client2.incr_with_rate("some.counter", 0.5);
    }

    let sent1: Vec<Vec<u8>> = rx1.try_iter().collect();
    let sent2: Vec<Vec<u8>> = rx2.try_iter().collect();

    assert!(!sent1.is_empty()); // always happening (probably)
    assert!(sent1.len() < 200); // never happening (probably)
    assert_eq!(sent1, sent2);
}

#[test]
fn test_injected_generator_reproducible_decisions() {
    let (rx1, sink1) = SpyMetricSink::new();
    let (rx2, sink2) = SpyMetricSink::new();
    let client1 = StatsdClient::builder("app.", sink1)
        .with_rng(ChaCha8Rng::seed_from_u64(99))
        .build();
    let client2 = StatsdClient::builder("app.", sink2)
        .with_rng(ChaCha8Rng::seed_from_u64(99))
        .build();

    for _ in 0..200 {
        client1.incr_with_rate("some.counter", 0.25);
        client2.incr_with_rate("some.counter", 0.25);
    }

    let sent1: Vec<Vec<u8>> = rx1.try_iter().collect();
    let sent2: Vec<Vec<u8>> = rx2.try_iter().collect();

    assert!(!sent1.is_empty());
    assert_eq!(sent1, sent2);
}

#[test]
fn test_statsd_client_nop_sink_threaded() {
    let clients = (0..NUM_THREADS)
        .map(|_| StatsdClient::from_sink("tempo.", tempo::NopMetricSink))
        .collect();
    run_threaded_test(clients, NUM_ITERATIONS);
}

#[test]
fn test_statsd_client_spy_sink_threaded() {
    let (rx, clients): (Vec<_>, Vec<_>) = (0..NUM_THREADS)
        .map(|_| {
            let (rx, sink) = SpyMetricSink::new();
            (rx, StatsdClient::from_sink("tempo.", sink))
        })
        .unzip();

    run_threaded_test(clients, NUM_ITERATIONS);

    // four unsampled metrics per iteration, sampled ones on top
    for rx in rx {
        let sent = rx.try_iter().count() as u64;
        assert!(sent >= NUM_ITERATIONS * 4);
    }
}
