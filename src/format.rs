// Tempo - A Statsd client for Rust with client-side sampling!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt::{self, Write};

/// Type of metric that knows how to display its wire suffix
#[derive(Debug, Clone, Copy)]
enum MetricType {
    Counter,
    Timer,
    Gauge,
    Set,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricType::Counter => "c".fmt(f),
            MetricType::Timer => "ms".fmt(f),
            MetricType::Gauge => "g".fmt(f),
            MetricType::Set => "s".fmt(f),
        }
    }
}

/// Holder for primitive metric values that knows how to display itself
///
/// Counters are signed deltas while gauges, timers, and sets are
/// non-negative by the contract of the client methods that create them.
/// The formatter itself places no sign constraint on values.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MetricValue {
    Signed(i64),
    Unsigned(u64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MetricValue::Signed(v) => v.fmt(f),
            MetricValue::Unsigned(v) => v.fmt(f),
        }
    }
}

/// Renders a single metric in the Statsd text format.
///
/// The base form is `{prefix}{key}:{value}|{type}`. When a sample rate has
/// been set via `with_sample_rate`, the form is
/// `{prefix}{key}:{value}|{type}|@{rate}` with the rate always written with
/// two digits after the decimal point. No line terminator is appended, the
/// line is a complete datagram payload by itself.
#[derive(Debug, Clone)]
pub(crate) struct MetricFormatter<'a> {
    prefix: &'a str,
    key: &'a str,
    val: MetricValue,
    type_: MetricType,
    sample_rate: Option<f64>,
    base_size: usize,
}

impl<'a> MetricFormatter<'a> {
    // "|@0.00"
    const RATE_SIZE: usize = 6;

    pub(crate) fn counter(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_val(prefix, key, val, MetricType::Counter)
    }

    pub(crate) fn timer(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_val(prefix, key, val, MetricType::Timer)
    }

    pub(crate) fn gauge(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_val(prefix, key, val, MetricType::Gauge)
    }

    pub(crate) fn set(prefix: &'a str, key: &'a str, val: MetricValue) -> Self {
        Self::from_val(prefix, key, val, MetricType::Set)
    }

    #[rustfmt::skip]
    fn from_val(prefix: &'a str, key: &'a str, val: MetricValue, type_: MetricType) -> Self {
        MetricFormatter {
            prefix,
            key,
            val,
            type_,
            sample_rate: None,
            base_size: prefix.len() + key.len() + 1 /* : */ + 20 /* value */ + 1 /* | */ + 2, /* type */
        }
    }

    /// Mark this metric as sampled at the given rate.
    ///
    /// Callers are expected to pass a rate strictly between 0 and 1; rates
    /// outside that range are resolved to "send everything" or "send
    /// nothing" before a formatter is ever constructed.
    pub(crate) fn with_sample_rate(&mut self, rate: f64) {
        self.sample_rate = Some(rate);
    }

    pub(crate) fn format(&self) -> String {
        let size_hint = self.base_size + self.sample_rate.map_or(0, |_| Self::RATE_SIZE);
        let mut metric_string = String::with_capacity(size_hint);

        let _ = write!(
            &mut metric_string,
            "{}{}:{}|{}",
            self.prefix, self.key, self.val, self.type_
        );

        if let Some(rate) = self.sample_rate {
            let _ = write!(&mut metric_string, "|@{:.2}", rate);
        }

        metric_string
    }
}
