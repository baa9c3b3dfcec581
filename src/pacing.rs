//! Pacing primitives: waiting and randomness
//!
//! All sleeps and random draws in the pipeline go through the `Clock` and
//! `RandomSource` traits so retry timing and identity choice can be driven
//! deterministically.

use rand::Rng;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Converts seconds to a `Duration`, saturating instead of panicking
///
/// Negative and NaN inputs map to zero, values past `Duration::MAX` to
/// `Duration::MAX`.
pub fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Something that can wait for a duration
pub trait Clock: Clone + Send + Sync {
    /// Suspends the caller for `duration`
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Source of uniform random draws
pub trait RandomSource: Clone + Send + Sync {
    /// Returns an index in `0..len` (`len` must be non-zero)
    fn index(&self, len: usize) -> usize;

    /// Returns a value in `low..=high`
    fn uniform(&self, low: f64, high: f64) -> f64;
}

/// Wall-clock sleeping backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that records every requested wait and returns immediately
#[derive(Debug, Clone, Default)]
pub struct RecordingClock {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the waits requested so far, in order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .map(|waits| waits.clone())
            .unwrap_or_default()
    }
}

impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
    }
}

/// Thread-local generator from `rand`
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len.max(1))
    }

    fn uniform(&self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        rand::rng().random_range(low..=high)
    }
}

/// Deterministic source: always picks the same index and the same
/// fraction of any requested range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRandom {
    pick: usize,
    fraction: f64,
}

impl FixedRandom {
    /// `fraction` is clamped to `0.0..=1.0`; 0.0 yields the low end of every range
    pub fn new(pick: usize, fraction: f64) -> Self {
        Self {
            pick,
            fraction: fraction.clamp(0.0, 1.0),
        }
    }
}

impl RandomSource for FixedRandom {
    fn index(&self, len: usize) -> usize {
        self.pick % len.max(1)
    }

    fn uniform(&self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.fraction
    }
}

/// Deterministic source that replays a sequence of index picks
///
/// Each `index` call takes the next pick, wrapping around at the end. Clones
/// share the cursor. `uniform` always yields the low end of the range.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    picks: Arc<Vec<usize>>,
    cursor: Arc<AtomicUsize>,
}

impl SequenceRandom {
    pub fn new(picks: Vec<usize>) -> Self {
        Self {
            picks: Arc::new(picks),
            cursor: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn index(&self, len: usize) -> usize {
        if self.picks.is_empty() {
            return 0;
        }
        let position = self.cursor.fetch_add(1, Ordering::Relaxed) % self.picks.len();
        self.picks[position] % len.max(1)
    }

    fn uniform(&self, low: f64, _high: f64) -> f64 {
        low
    }
}
