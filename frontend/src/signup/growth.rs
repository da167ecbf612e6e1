//! Simulated organic growth of the public counters.
//!
//! Every tick has a fixed chance of "new members" showing up. They only move
//! the counters; no member records are created for them.

use gloo_timers::callback::Interval;
use rand::Rng;

use crate::config::SignupConfig;

/// How many members a tick adds, if any.
pub fn draw_growth<R: Rng + ?Sized>(config: &SignupConfig, rng: &mut R) -> Option<u64> {
    if !rng.gen_bool(config.growth_probability.clamp(0.0, 1.0)) {
        return None;
    }
    Some(rng.gen_range(config.growth_range.clone()))
}

/// Repeating growth tick. Dropping the timer stops it.
pub struct GrowthTimer {
    _interval: Interval,
}

impl GrowthTimer {
    pub fn start<F>(config: &SignupConfig, on_tick: F) -> Self
    where
        F: FnMut() + 'static,
    {
        Self {
            _interval: Interval::new(config.growth_interval_ms, on_tick),
        }
    }
}
