// Tempo - A Statsd client for Rust with client-side sampling!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A Statsd client for Rust with client-side sampling!
//!
//! Tempo converts application metric events (counters, gauges, timings, and
//! sets) into Statsd text-format UDP datagrams, with optional statistical
//! sampling to thin out high-volume metrics before they ever hit the wire.
//!
//! ## Features
//!
//! * Counters, gauges, timings, and sets in the Statsd text format, one
//!   metric per datagram.
//! * Per-call sample rates with a seedable, per-client generator: sampled
//!   metrics carry an `|@rate` suffix so the server can scale counts back
//!   up, full-rate metrics skip the coin flip entirely.
//! * Fire-and-forget emission: sending a metric never blocks, never
//!   retries, and never returns an error to the instrumented code.
//! * Support for alternate backends via the `MetricSink` trait.
//!
//! ## Install
//!
//! To make use of `tempo` in your project, add it as a dependency in your
//! `Cargo.toml` file.
//!
//! ```toml
//! [dependencies]
//! tempo = "x.y.z"
//! ```
//!
//! ## Usage
//!
//! ### Simple Use
//!
//! Simple usage is shown below. In this example, we just import the client,
//! create an instance that will write to some imaginary metrics server, and
//! send a few metrics. The prefix is prepended to keys exactly as given, so
//! it should usually end with a separator.
//!
//! ```rust,no_run
//! use std::net::UdpSocket;
//! use tempo::prelude::*;
//! use tempo::{StatsdClient, UdpMetricSink, DEFAULT_PORT};
//!
//! // Create client that will write to the given host over UDP.
//! //
//! // Note that you'll probably want to actually handle any errors creating
//! // the client when you use it for real in your application. We're just
//! // using .unwrap() here since this is an example!
//! let host = ("metrics.example.com", DEFAULT_PORT);
//! let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
//! socket.set_nonblocking(true).unwrap();
//! let sink = UdpMetricSink::from(host, socket).unwrap();
//! let client = StatsdClient::from_sink("my.metrics.", sink);
//!
//! // Emit metrics!
//! client.incr("some.counter");
//! client.time("some.methodCall", 42);
//! client.gauge("some.thing", 7);
//! client.set("some.uniques", 42);
//! ```
//!
//! ### Sampling
//!
//! Metrics emitted by a busy code path can overwhelm the network or the
//! aggregation server. Passing a sample rate emits only that fraction of
//! the observations, marked up so the server can extrapolate the rest.
//! Rates outside the `[0.0, 1.0]` range are clamped and a NaN rate drops
//! everything, so callers never need to validate rates themselves.
//!
//! ```rust,no_run
//! use std::net::UdpSocket;
//! use tempo::prelude::*;
//! use tempo::{StatsdClient, UdpMetricSink, DEFAULT_PORT};
//!
//! let host = ("metrics.example.com", DEFAULT_PORT);
//! let socket = UdpSocket::bind("0.0.0.0:0").unwrap();
//! socket.set_nonblocking(true).unwrap();
//! let sink = UdpMetricSink::from(host, socket).unwrap();
//! let client = StatsdClient::from_sink("my.metrics.", sink);
//!
//! // Roughly one in ten of these calls puts a datagram on the wire,
//! // in the form "my.metrics.requests:1|c|@0.10"
//! client.incr_with_rate("requests", 0.1);
//! ```
//!
//! The sampling generator is owned by the client and can be seeded, which
//! makes the keep/drop sequence reproducible:
//!
//! ```
//! use tempo::prelude::*;
//! use tempo::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::builder("my.metrics.", NopMetricSink)
//!     .with_seed(42)
//!     .build();
//!
//! client.incr_with_rate("sampled.counter", 0.5);
//! client.reseed(42); // back to the same decision sequence
//! client.incr_with_rate("sampled.counter", 0.5);
//! ```
//!
//! ### Implemented Traits
//!
//! Each of the methods that the `StatsdClient` struct uses to send metrics
//! are implemented as a trait. There is also a trait that combines all of
//! these other traits. If we want, we can just use one of the trait types
//! to refer to the client instance. This might be useful to you if you'd
//! like to swap out the actual client with a dummy version when you are
//! unit testing your code.
//!
//! ```
//! use tempo::prelude::*;
//! use tempo::{MetricClient, StatsdClient, NopMetricSink};
//!
//! pub struct MyRequestHandler {
//!     metrics: Box<dyn MetricClient>,
//! }
//!
//! impl MyRequestHandler {
//!     pub fn new<T: MetricClient + 'static>(metrics: T) -> MyRequestHandler {
//!         MyRequestHandler { metrics: Box::new(metrics) }
//!     }
//!
//!     pub fn handle_some_request(&self) {
//!         self.metrics.incr("request.handler");
//!     }
//! }
//!
//! let handler = MyRequestHandler::new(
//!     StatsdClient::from_sink("handler.metrics.", NopMetricSink));
//! handler.handle_some_request();
//! ```
//!
//! ### Custom Metric Sinks
//!
//! The `StatsdClient` uses implementations of the `MetricSink` trait to
//! send metrics to a metric server. Maybe you want to do something not
//! covered by an existing sink. An example of creating a custom sink is
//! below.
//!
//! ```rust,no_run
//! use std::io;
//! use tempo::prelude::*;
//! use tempo::{StatsdClient, MetricSink};
//!
//! pub struct MyMetricSink;
//!
//! impl MetricSink for MyMetricSink {
//!     fn emit(&self, metric: &str) -> io::Result<usize> {
//!         // Your custom metric sink implementation goes here!
//!         Ok(0)
//!     }
//! }
//!
//! let sink = MyMetricSink;
//! let client = StatsdClient::from_sink("my.prefix.", sink);
//!
//! client.count("my.counter.thing", 42);
//! client.time("my.method.time", 25);
//! ```
//!
//! ### Threading
//!
//! A client owns the mutable state of its sampling generator and takes no
//! internal locks, so a single instance is `Send` but not `Sync`: create
//! one client per thread (they are cheap), or guard a shared instance with
//! a mutex. See the `StatsdClient` docs for details.

#![forbid(unsafe_code)]

pub const DEFAULT_PORT: u16 = 8125;

pub use self::client::{Counted, Gauged, MetricClient, Setted, StatsdClient, StatsdClientBuilder, Timed};

pub use self::sinks::{MetricSink, NopMetricSink, SinkStats, SpyMetricSink, UdpMetricSink};

pub use self::types::{ErrorKind, MetricError, MetricResult};

mod client;
mod format;
pub mod prelude;
mod sampler;
mod sinks;
mod types;
