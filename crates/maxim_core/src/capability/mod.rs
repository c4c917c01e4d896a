//! Host capabilities injected into the journal core.
//!
//! # Responsibility
//! - Abstract randomness, wall-clock time and file access behind small
//!   traits so the core stays deterministic under test.
//!
//! # Invariants
//! - `RandomSource::index_below(upper)` is only called with `upper > 0` and
//!   returns a value in `0..upper`.
//! - `Clock::now_ms` returns Unix epoch milliseconds.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

/// Source of uniform random choices.
pub trait RandomSource {
    /// Uniform index in `0..upper`. `upper` must be non-zero.
    fn index_below(&mut self, upper: usize) -> usize;

    /// Lowercase ASCII alphanumeric string of `len` characters.
    fn alphanumeric(&mut self, len: usize) -> String;
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index_below(&mut self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }

    fn alphanumeric(&mut self, len: usize) -> String {
        sample_alphanumeric(&mut rand::thread_rng(), len)
    }
}

/// Reproducible generator for tests and replays.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn index_below(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    fn alphanumeric(&mut self, len: usize) -> String {
        sample_alphanumeric(&mut self.rng, len)
    }
}

fn sample_alphanumeric(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect()
}

/// Wall-clock source.
pub trait Clock {
    fn now_ms(&self) -> i64;

    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.now_ms()).unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: Cell<i64>,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

impl<T: Clock + ?Sized> Clock for Rc<T> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Whole-file text access used by pack export/import.
pub trait FileIo {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
    fn write_string(&self, path: &Path, contents: &str) -> std::io::Result<()>;
}

/// Local filesystem access through `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileIo;

impl FileIo for FsFileIo {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_string(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        std::fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock, RandomSource, SeededRandom};

    #[test]
    fn seeded_random_is_reproducible_and_in_range() {
        let mut a = SeededRandom::new(7);
        let mut b = SeededRandom::new(7);
        for _ in 0..100 {
            let value = a.index_below(4);
            assert!(value < 4);
            assert_eq!(value, b.index_below(4));
        }
    }

    #[test]
    fn alphanumeric_is_lowercase_of_requested_length() {
        let suffix = SeededRandom::new(1).alphanumeric(6);
        assert_eq!(suffix.len(), 6);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn fixed_clock_reports_utc_instant() {
        let clock = FixedClock::new(1_700_000_000_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_700_000_000_500);
        assert_eq!(clock.now_utc().timestamp_millis(), 1_700_000_000_500);
    }
}
