// Tempo - A Statsd client for Rust with client-side sampling!
//
// Copyright 2015-2021 Nick Pillitteri
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::cell::RefCell;
use std::fmt;

// Rates closer than this to 0 or 1 are treated as "never" and "always".
// Comparing exactly would let float noise (1e-9 rates, 1.0 - epsilon
// results of upstream arithmetic) sneak past the fast paths.
const RATE_TOLERANCE: f64 = 1e-6;

/// Result of asking the sampler whether a single observation should be sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SampleOutcome {
    /// Dropped by the sampling policy, nothing is emitted
    Skipped,
    /// Emitted at full rate, wire form carries no rate suffix
    FullRate,
    /// Emitted at the contained (clamped) rate, wire form carries `|@rate`
    Sampled(f64),
}

/// Per-client sampling state: a seedable generator and the keep/drop policy.
///
/// Rates are clamped to `[0.0, 1.0]` before use and a NaN rate always drops.
/// Rates at (or within tolerance of) the ends of the range never touch the
/// generator: full-rate metrics consume no entropy, which keeps seeded
/// decision sequences reproducible no matter how many unsampled metrics are
/// interleaved with sampled ones.
pub(crate) struct Sampler {
    rng: RefCell<Box<dyn RngCore + Send>>,
}

impl Sampler {
    /// Create a sampler seeded from the OS entropy source.
    pub(crate) fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a sampler that draws from the given generator.
    pub(crate) fn with_rng<R>(rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        Sampler {
            rng: RefCell::new(Box::new(rng)),
        }
    }

    /// Reset the generator to a deterministic state derived from `seed`.
    ///
    /// Reseeding with the same value always produces the same subsequent
    /// sequence of decisions.
    pub(crate) fn reseed(&self, seed: u64) {
        *self.rng.borrow_mut() = Box::new(StdRng::seed_from_u64(seed));
    }

    /// Replace the generator with one freshly seeded from the OS.
    pub(crate) fn reseed_from_entropy(&self) {
        *self.rng.borrow_mut() = Box::new(StdRng::from_entropy());
    }

    /// Decide whether a single observation at the given rate is sent.
    ///
    /// Advances the generator by exactly one draw in the `Sampled` and
    /// mid-range `Skipped` cases and by zero draws otherwise.
    pub(crate) fn sample(&self, rate: f64) -> SampleOutcome {
        // clamp() panics on NaN so it must be rejected first, and the
        // wire contract for NaN is "drop everything" anyway.
        if rate.is_nan() {
            return SampleOutcome::Skipped;
        }

        let rate = rate.clamp(0.0, 1.0);
        if rate <= RATE_TOLERANCE {
            return SampleOutcome::Skipped;
        }

        if rate >= 1.0 - RATE_TOLERANCE {
            return SampleOutcome::FullRate;
        }

        let draw: f64 = self.rng.borrow_mut().gen();
        if rate < draw {
            SampleOutcome::Skipped
        } else {
            SampleOutcome::Sampled(rate)
        }
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sampler {{ rng: ... }}")
    }
}
