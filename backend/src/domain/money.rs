//! Monetary amounts in minor currency units (cents).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-negative amount in cents.
///
/// # Examples
/// ```
/// use vetpal::domain::MinorUnits;
///
/// let total = MinorUnits::new(2_500).unwrap().saturating_add(MinorUnits::new(100).unwrap());
/// assert_eq!(total.get(), 2_600);
/// assert!(MinorUnits::new(-1).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

impl MinorUnits {
    pub const ZERO: Self = Self(0);

    /// `None` for negative values.
    pub fn new(cents: i64) -> Option<Self> {
        (cents >= 0).then_some(Self(cents))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for MinorUnits {
    /// Renders as a plain decimal amount, e.g. `25.00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0.00")]
    #[case(5, "0.05")]
    #[case(2_550, "25.50")]
    fn renders_decimal(#[case] cents: i64, #[case] expected: &str) {
        assert_eq!(MinorUnits::new(cents).expect("non-negative").to_string(), expected);
    }

    #[rstest]
    fn addition_saturates() {
        let max = MinorUnits::new(i64::MAX).expect("non-negative");
        assert_eq!(max.saturating_add(MinorUnits::new(1).expect("one")), max);
    }
}
