use std::fmt;

use serde::{Deserialize, Serialize};

/// A percentage rounded to one decimal place.
///
/// Rounding is half away from zero, so `2/3` renders as `66.7` and a zero
/// denominator yields `0.0` instead of dividing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.0);

    pub fn from_ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Self::ZERO;
        }
        Self(round1(100.0 * numerator as f64 / denominator as f64))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Fill level for a progress bar; bonus credit can push the raw value past 100.
    pub fn clamped(self) -> f64 {
        self.0.clamp(0.0, 100.0)
    }

    /// Signed distance to `goal`, one decimal.
    pub fn delta_from(self, goal: u8) -> f64 {
        round1(self.0 - f64::from(goal))
    }

    /// Signed distance to another percentage, one decimal.
    pub fn delta_to(self, other: Percentage) -> f64 {
        round1(self.0 - other.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_thirds_rounds_up() {
        assert_eq!(Percentage::from_ratio(2, 3).to_string(), "66.7");
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(Percentage::from_ratio(0, 0).to_string(), "0.0");
        assert_eq!(Percentage::from_ratio(5, 0), Percentage::ZERO);
    }

    #[test]
    fn test_whole_values_keep_one_decimal() {
        assert_eq!(Percentage::from_ratio(15, 20).to_string(), "75.0");
        assert_eq!(Percentage::from_ratio(1, 1).to_string(), "100.0");
    }

    #[test]
    fn test_clamped_caps_bonus_overflow() {
        let p = Percentage::from_ratio(12, 10);
        assert_eq!(p.value(), 120.0);
        assert_eq!(p.clamped(), 100.0);
    }

    #[test]
    fn test_delta_from_goal_is_signed() {
        assert_eq!(Percentage::from_ratio(2, 3).delta_from(75), -8.3);
        assert_eq!(Percentage::from_ratio(4, 5).delta_from(75), 5.0);
    }
}
