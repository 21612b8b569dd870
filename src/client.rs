// Tempo - A Statsd client for Rust with client-side sampling!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::format::{MetricFormatter, MetricValue};
use crate::sampler::{SampleOutcome, Sampler};
use crate::sinks::{MetricSink, SinkStats};
use log::{debug, trace};
use rand::RngCore;
use std::fmt;

/// Trait for incrementing and decrementing counters.
///
/// Counters are simple values incremented or decremented by a client. The
/// rates at which these events occur or average values will be determined
/// by the server receiving them. Examples of counter uses include number
/// of logins to a system or requests received.
///
/// The `_with_rate` variants accept a sample rate between 0.0 and 1.0, the
/// probability that this particular observation is put on the wire. Rates
/// outside that range are clamped and a NaN rate drops the observation.
/// Sampled counters carry the rate in their wire form so the server can
/// scale the counts back up.
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Counted {
    /// Increment the counter by 1
    fn incr(&self, key: &str) {
        self.count(key, 1);
    }

    /// Increment the counter by 1, sampled at the given rate
    fn incr_with_rate(&self, key: &str, rate: f64) {
        self.count_with_rate(key, 1, rate);
    }

    /// Decrement the counter by 1
    fn decr(&self, key: &str) {
        self.count(key, -1);
    }

    /// Decrement the counter by 1, sampled at the given rate
    fn decr_with_rate(&self, key: &str, rate: f64) {
        self.count_with_rate(key, -1, rate);
    }

    /// Increment or decrement the counter by the given amount
    fn count(&self, key: &str, count: i64) {
        self.count_with_rate(key, count, 1.0);
    }

    /// Increment or decrement the counter by the given amount, sampled
    /// at the given rate
    fn count_with_rate(&self, key: &str, count: i64, rate: f64);
}

/// Trait for recording timings in milliseconds.
///
/// Timings are a positive number of milliseconds between a start and end
/// time. Examples include time taken to render a web page or time taken
/// for a database call to return.
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Timed {
    /// Record a timing in milliseconds with the given key
    fn time(&self, key: &str, time: u64) {
        self.time_with_rate(key, time, 1.0);
    }

    /// Record a timing in milliseconds with the given key, sampled at
    /// the given rate
    fn time_with_rate(&self, key: &str, time: u64, rate: f64);
}

/// Trait for recording gauge values.
///
/// Gauge values are an instantaneous measurement of a value determined
/// by the client. They do not change unless changed by the client. Examples
/// include things like load average or how many connections are active.
/// Gauges are absolute, non-negative values; there is no delta form.
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Gauged {
    /// Record a gauge value with the given key
    fn gauge(&self, key: &str, value: u64) {
        self.gauge_with_rate(key, value, 1.0);
    }

    /// Record a gauge value with the given key, sampled at the given rate
    fn gauge_with_rate(&self, key: &str, value: u64, rate: f64);
}

/// Trait for recording set values.
///
/// Sets count the number of unique elements in a group. You can use them
/// to, for example, count the unique visitors to your site. Sets are
/// always emitted at full rate: sampling a cardinality metric would skew
/// it in ways the server cannot correct for.
///
/// See the [Statsd spec](https://github.com/b/statsd_spec) for more
/// information.
pub trait Setted {
    /// Record a single set value with the given key
    fn set(&self, key: &str, value: u64);
}

/// Trait that encompasses all other traits for sending metrics.
///
/// If you wish to use `StatsdClient` with a generic type or place a
/// `StatsdClient` instance behind a pointer (such as a `Box`) this will
/// allow you to reference all the implemented methods for recording
/// metrics, while using a single trait. An example of this is shown below.
///
/// ```
/// use tempo::{MetricClient, StatsdClient, NopMetricSink};
///
/// let client: Box<dyn MetricClient> = Box::new(StatsdClient::from_sink(
///     "prefix.", NopMetricSink));
///
/// client.count("some.counter", 1);
/// client.time("some.timer", 42);
/// client.gauge("some.gauge", 8);
/// client.set("some.set", 5);
/// ```
pub trait MetricClient: Counted + Timed + Gauged + Setted {}

/// Builder for creating and customizing `StatsdClient` instances.
///
/// Instances of the builder should be created by calling the `::builder()`
/// method on the `StatsdClient` struct.
///
/// # Example
///
/// ```
/// use tempo::prelude::*;
/// use tempo::{StatsdClient, NopMetricSink};
///
/// let client = StatsdClient::builder("prefix.", NopMetricSink)
///     .with_seed(42)
///     .build();
///
/// client.incr_with_rate("something", 0.5);
/// ```
pub struct StatsdClientBuilder {
    prefix: String,
    sink: Box<dyn MetricSink + Send>,
    sampler: Sampler,
}

impl StatsdClientBuilder {
    // Set the required fields and defaults for optional fields
    fn new<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Send + 'static,
    {
        StatsdClientBuilder {
            // required
            prefix: prefix.to_string(),
            sink: Box::new(sink),

            // optional with defaults
            sampler: Sampler::new(),
        }
    }

    /// Use the given generator for sampling decisions instead of one
    /// seeded from the OS entropy source.
    ///
    /// Supplying a deterministic generator makes the keep/drop sequence
    /// of sampled metrics reproducible, which is mostly useful in tests.
    pub fn with_rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.sampler = Sampler::with_rng(rng);
        self
    }

    /// Seed the sampling generator with the given value.
    ///
    /// Equivalent to calling `reseed` on the built client before using it.
    pub fn with_seed(self, seed: u64) -> Self {
        self.sampler.reseed(seed);
        self
    }

    /// Construct a new `StatsdClient` instance based on current settings.
    pub fn build(self) -> StatsdClient {
        StatsdClient::from_builder(self)
    }
}

/// Client for Statsd that implements various traits to record metrics.
///
/// # Traits
///
/// The client is the main entry point for users of this library. It supports
/// several traits for recording metrics of different types.
///
/// * `Counted` for emitting counters.
/// * `Timed` for emitting timings.
/// * `Gauged` for emitting gauge values.
/// * `Setted` for emitting set values.
/// * `MetricClient` for a combination of all of the above.
///
/// For more information about the uses for each type of metric, see the
/// documentation for each mentioned trait.
///
/// # Prefix
///
/// The prefix given at construction is prepended to every key exactly as
/// written, no separator is inserted. If you want `my.app.some.counter`,
/// pass the prefix `"my.app."` (with the trailing dot).
///
/// # Sampling
///
/// Every rate-accepting method runs the same sampling policy: NaN rates
/// and rates at or below zero drop the metric, rates at or above one send
/// it unsampled, and anything in between flips a coin against the client's
/// own generator and sends the metric with an `|@rate` suffix when it wins.
/// The generator can be seeded via the builder or reseeded at any time
/// with [`reseed`](StatsdClient::reseed), which makes the decision
/// sequence reproducible.
///
/// # Errors
///
/// Sending a metric never fails as far as callers are concerned: Statsd
/// emission is fire-and-forget by design. Write errors from the sink are
/// logged at debug level, counted in the sink stats, and otherwise
/// swallowed.
///
/// # Threading
///
/// A client instance owns the mutable state of its sampling generator and
/// takes no internal locks, so it is `Send` but deliberately not `Sync`.
/// Create one client per thread, or wrap a single client in a mutex if it
/// must be shared.
///
/// ```no_run
/// use std::net::UdpSocket;
/// use std::thread;
/// use tempo::prelude::*;
/// use tempo::{StatsdClient, UdpMetricSink, DEFAULT_PORT};
///
/// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
/// socket.set_nonblocking(true).unwrap();
/// let sink = UdpMetricSink::from(("localhost", DEFAULT_PORT), socket).unwrap();
/// let client = StatsdClient::from_sink("my.prefix.", sink);
///
/// let t = thread::spawn(move || {
///     client.incr("some.event");
///     client.time_with_rate("some.slow.call", 212, 0.1);
/// });
///
/// t.join().unwrap();
/// ```
pub struct StatsdClient {
    prefix: String,
    sink: Box<dyn MetricSink + Send>,
    sampler: Sampler,
}

impl StatsdClient {
    /// Create a new client instance that will use the given prefix for
    /// all metrics emitted to the given `MetricSink` implementation, with
    /// sampling decisions drawn from a generator seeded by the OS.
    ///
    /// # No-op Example
    ///
    /// ```
    /// use tempo::{StatsdClient, NopMetricSink};
    ///
    /// let prefix = "my.stats.";
    /// let client = StatsdClient::from_sink(prefix, NopMetricSink);
    /// ```
    ///
    /// # UDP Socket Example
    ///
    /// ```no_run
    /// use std::net::UdpSocket;
    /// use tempo::{StatsdClient, UdpMetricSink, DEFAULT_PORT};
    ///
    /// let prefix = "my.stats.";
    /// let host = ("127.0.0.1", DEFAULT_PORT);
    ///
    /// let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
    /// socket.set_nonblocking(true).unwrap();
    ///
    /// let sink = UdpMetricSink::from(host, socket).unwrap();
    /// let client = StatsdClient::from_sink(prefix, sink);
    /// ```
    pub fn from_sink<T>(prefix: &str, sink: T) -> Self
    where
        T: MetricSink + Send + 'static,
    {
        Self::builder(prefix, sink).build()
    }

    /// Create a new builder with the provided prefix and metric sink.
    ///
    /// A prefix and a metric sink are required to create a new client
    /// instance. All other optional customizations can be set by calling
    /// methods on the returned builder. Any customizations that aren't
    /// set by the caller will use defaults.
    ///
    /// Note, though a metric prefix is required, you may pass an empty
    /// string as a prefix. In this case, the metrics emitted will use only
    /// the bare keys supplied when you call the various methods to emit
    /// metrics.
    ///
    /// # Example
    ///
    /// ```
    /// use tempo::prelude::*;
    /// use tempo::{StatsdClient, NopMetricSink};
    ///
    /// let client = StatsdClient::builder("some.prefix.", NopMetricSink)
    ///     .with_seed(1010)
    ///     .build();
    ///
    /// client.gauge("some.key", 7);
    /// ```
    pub fn builder<T>(prefix: &str, sink: T) -> StatsdClientBuilder
    where
        T: MetricSink + Send + 'static,
    {
        StatsdClientBuilder::new(prefix, sink)
    }

    /// Reset the sampling generator to a deterministic state derived from
    /// the given seed.
    ///
    /// Reseeding with the same value produces the same subsequent sequence
    /// of keep/drop decisions. This operation cannot fail.
    pub fn reseed(&self, seed: u64) {
        self.sampler.reseed(seed);
    }

    /// Replace the sampling generator with one freshly seeded from the OS
    /// entropy source. This operation cannot fail.
    pub fn reseed_from_entropy(&self) {
        self.sampler.reseed_from_entropy();
    }

    /// Return I/O telemetry from the underlying sink, like bytes and
    /// packets sent or dropped.
    ///
    /// Sinks that don't keep counters report zeros.
    pub fn stats(&self) -> SinkStats {
        self.sink.stats()
    }

    // Create a new StatsdClient by consuming the builder
    fn from_builder(builder: StatsdClientBuilder) -> Self {
        StatsdClient {
            prefix: builder.prefix,
            sink: builder.sink,
            sampler: builder.sampler,
        }
    }

    fn send_metric(&self, mut formatter: MetricFormatter<'_>, rate: f64) {
        match self.sampler.sample(rate) {
            SampleOutcome::Skipped => (),
            SampleOutcome::FullRate => self.write_to_sink(&formatter.format()),
            SampleOutcome::Sampled(clamped) => {
                formatter.with_sample_rate(clamped);
                self.write_to_sink(&formatter.format());
            }
        }
    }

    fn write_to_sink(&self, line: &str) {
        match self.sink.emit(line) {
            Ok(written) => trace!("Wrote {} bytes to metric sink", written),
            Err(err) => debug!("Error writing to metric sink, metric dropped: {}", err),
        }
    }
}

impl fmt::Debug for StatsdClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatsdClient {{ prefix: {:?}, sink: ..., sampler: ... }}", self.prefix)
    }
}

impl Counted for StatsdClient {
    fn count_with_rate(&self, key: &str, count: i64, rate: f64) {
        let fmt = MetricFormatter::counter(&self.prefix, key, MetricValue::Signed(count));
        self.send_metric(fmt, rate);
    }
}

impl Timed for StatsdClient {
    fn time_with_rate(&self, key: &str, time: u64, rate: f64) {
        let fmt = MetricFormatter::timer(&self.prefix, key, MetricValue::Unsigned(time));
        self.send_metric(fmt, rate);
    }
}

impl Gauged for StatsdClient {
    fn gauge_with_rate(&self, key: &str, value: u64, rate: f64) {
        let fmt = MetricFormatter::gauge(&self.prefix, key, MetricValue::Unsigned(value));
        self.send_metric(fmt, rate);
    }
}

impl Setted for StatsdClient {
    fn set(&self, key: &str, value: u64) {
        let fmt = MetricFormatter::set(&self.prefix, key, MetricValue::Unsigned(value));
        self.send_metric(fmt, 1.0);
    }
}

impl MetricClient for StatsdClient {}
