//! Display intensity level persisted next to the collection.

use std::fmt::{Display, Formatter};

/// UI intensity setting in `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpiceLevel(u8);

impl SpiceLevel {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 3;
    pub const DEFAULT: SpiceLevel = SpiceLevel(1);

    /// Clamps `value` into the supported range.
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Advances one level, wrapping back to the minimum after the maximum.
    pub fn cycle(self) -> Self {
        if self.0 >= Self::MAX {
            Self(Self::MIN)
        } else {
            Self(self.0 + 1)
        }
    }

    /// Parses a stored value; anything unreadable yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().parse::<u8>().ok()?;
        (value <= Self::MAX).then_some(Self(value))
    }
}

impl Default for SpiceLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for SpiceLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::SpiceLevel;

    #[test]
    fn cycle_wraps_after_max() {
        let mut level = SpiceLevel::new(0);
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(level.value());
            level = level.cycle();
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn parse_rejects_out_of_range_and_garbage() {
        assert_eq!(SpiceLevel::parse(" 2 "), Some(SpiceLevel::new(2)));
        assert_eq!(SpiceLevel::parse("7"), None);
        assert_eq!(SpiceLevel::parse("hot"), None);
    }
}
