// Tempo - A Statsd client for Rust with client-side sampling!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Export commonly used parts of Tempo for easy glob imports
//!
//! # Example
//!
//! ```
//! use tempo::prelude::*;
//! use tempo::{StatsdClient, NopMetricSink};
//!
//! let client = StatsdClient::from_sink("some.prefix.", NopMetricSink);
//!
//! client.count("some.counter", 1);
//! client.time("some.timer", 23);
//! client.gauge("some.gauge", 45);
//! client.set("some.set", 123);
//! ```

pub use crate::client::{Counted, Gauged, MetricClient, Setted, Timed};
