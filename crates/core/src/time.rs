//! Unit-tagged trace timestamps.
//!
//! A [`Time`] pairs a raw integer with the representation it was recorded in.
//! Arithmetic and ordering between values of different representations is a
//! caller bug and panics. Equality never panics: two times in different units
//! are simply unequal.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Representation tag of a [`Time`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// Abstract logical clock, shown as-is.
    Ticks,
    Nanoseconds,
    #[default]
    Microseconds,
    Milliseconds,
}

impl TimeUnit {
    /// Microseconds per raw unit, `None` for logical ticks.
    fn micros_per_unit(self) -> Option<f64> {
        match self {
            TimeUnit::Ticks => None,
            TimeUnit::Nanoseconds => Some(0.001),
            TimeUnit::Microseconds => Some(1.0),
            TimeUnit::Milliseconds => Some(1000.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Time {
    raw: i64,
    unit: TimeUnit,
}

impl Time {
    pub const fn new(raw: i64, unit: TimeUnit) -> Self {
        Self { raw, unit }
    }

    pub const fn micros(raw: i64) -> Self {
        Self::new(raw, TimeUnit::Microseconds)
    }

    pub const fn zero(unit: TimeUnit) -> Self {
        Self::new(0, unit)
    }

    pub fn raw(self) -> i64 {
        self.raw
    }

    pub fn unit(self) -> TimeUnit {
        self.unit
    }

    pub fn same_unit(self, other: Time) -> bool {
        self.unit == other.unit
    }

    /// Parse the canonical form produced by `Display`.
    pub fn parse(unit: TimeUnit, s: &str) -> Option<Time> {
        s.trim().parse::<i64>().ok().map(|raw| Time::new(raw, unit))
    }

    /// `a + (b - a) * pos`.
    pub fn scale(a: Time, b: Time, pos: f64) -> Time {
        a + (b - a) * pos
    }

    /// Absolute difference.
    pub fn distance(a: Time, b: Time) -> Time {
        if a > b { a - b } else { b - a }
    }

    fn check(self, other: Time) {
        assert!(
            self.same_unit(other),
            "mixing time units {:?} and {:?}",
            self.unit,
            other.unit
        );
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        self.check(rhs);
        Time::new(self.raw.saturating_add(rhs.raw), self.unit)
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Time {
        self.check(rhs);
        Time::new(self.raw.saturating_sub(rhs.raw), self.unit)
    }
}

/// Rounds half up.
impl Mul<f64> for Time {
    type Output = Time;

    fn mul(self, a: f64) -> Time {
        Time::new((self.raw as f64 * a + 0.5).floor() as i64, self.unit)
    }
}

impl Div<f64> for Time {
    type Output = Time;

    fn div(self, a: f64) -> Time {
        self * (1.0 / a)
    }
}

/// Ratio of two durations.
impl Div for Time {
    type Output = f64;

    fn div(self, rhs: Time) -> f64 {
        self.check(rhs);
        self.raw as f64 / rhs.raw as f64
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.check(*other);
        self.raw.cmp(&other.raw)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Unit that axis labels and tooltips are printed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Us,
    Ms,
    S,
    M,
    H,
}

impl DisplayUnit {
    pub const ALL: [DisplayUnit; 5] = [
        DisplayUnit::Us,
        DisplayUnit::Ms,
        DisplayUnit::S,
        DisplayUnit::M,
        DisplayUnit::H,
    ];

    /// Microseconds per display unit.
    pub fn scale(self) -> i64 {
        match self {
            DisplayUnit::Us => 1,
            DisplayUnit::Ms => 1_000,
            DisplayUnit::S => 1_000_000,
            DisplayUnit::M => 60 * 1_000_000,
            DisplayUnit::H => 60 * 60 * 1_000_000,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DisplayUnit::Us => "us",
            DisplayUnit::Ms => "ms",
            DisplayUnit::S => "s",
            DisplayUnit::M => "m",
            DisplayUnit::H => "h",
        }
    }
}

/// How times are turned into human-readable labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeDisplay {
    pub unit: DisplayUnit,
    /// Append the unit name, e.g. `"12 ms"`.
    pub show_unit: bool,
}

impl TimeDisplay {
    /// Format a time, truncating toward zero in the display unit.
    ///
    /// Logical ticks are printed raw and never carry a suffix.
    pub fn format(&self, t: Time) -> String {
        let Some(per_unit) = t.unit().micros_per_unit() else {
            return t.raw().to_string();
        };
        let micros = (t.raw() as f64 * per_unit).trunc() as i64;
        let value = micros / self.unit.scale();
        if self.show_unit {
            format!("{value} {}", self.unit.name())
        } else {
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_and_ordering() {
        let a = Time::micros(10);
        let b = Time::micros(25);
        assert_eq!(a + b, Time::micros(35));
        assert_eq!(b - a, Time::micros(15));
        assert!(a < b);
        assert_eq!(Time::distance(a, b), Time::micros(15));
        assert_eq!(Time::distance(b, a), Time::micros(15));
        assert!((b / a - 2.5).abs() < 1e-12);
    }

    #[test]
    fn multiplication_rounds_half_up() {
        assert_eq!(Time::micros(3) * 0.5, Time::micros(2));
        assert_eq!(Time::micros(5) * 0.5, Time::micros(3));
        assert_eq!(Time::micros(10) * 0.33, Time::micros(3));
        assert_eq!(Time::micros(9) / 2.0, Time::micros(5));
    }

    #[test]
    fn scale_interpolates() {
        let a = Time::micros(100);
        let b = Time::micros(200);
        assert_eq!(Time::scale(a, b, 0.0), a);
        assert_eq!(Time::scale(a, b, 1.0), b);
        assert_eq!(Time::scale(a, b, 0.25), Time::micros(125));
    }

    #[test]
    fn canonical_string_roundtrips() {
        let t = Time::new(-42, TimeUnit::Ticks);
        assert_eq!(t.to_string(), "-42");
        assert_eq!(Time::parse(TimeUnit::Ticks, "-42"), Some(t));
        assert_eq!(Time::parse(TimeUnit::Ticks, "4x"), None);
    }

    #[test]
    fn different_units_are_unequal() {
        assert_ne!(
            Time::new(1, TimeUnit::Ticks),
            Time::new(1, TimeUnit::Microseconds)
        );
    }

    #[test]
    #[should_panic(expected = "mixing time units")]
    fn mixed_units_panic_on_arithmetic() {
        let _ = Time::new(1, TimeUnit::Ticks) + Time::micros(1);
    }

    #[test]
    #[should_panic(expected = "mixing time units")]
    fn mixed_units_panic_on_comparison() {
        let _ = Time::new(1, TimeUnit::Milliseconds) < Time::micros(1);
    }

    #[test]
    fn display_units() {
        let plain = TimeDisplay::default();
        assert_eq!(plain.format(Time::micros(2_500_000)), "2500000");

        let seconds = TimeDisplay {
            unit: DisplayUnit::S,
            show_unit: true,
        };
        assert_eq!(seconds.format(Time::micros(2_500_000)), "2 s");
        assert_eq!(
            seconds.format(Time::new(3_000, TimeUnit::Milliseconds)),
            "3 s"
        );
        assert_eq!(
            seconds.format(Time::new(77, TimeUnit::Ticks)),
            "77",
            "ticks have no physical unit"
        );
    }

    #[test]
    fn display_unit_scales() {
        let scales: Vec<i64> = DisplayUnit::ALL.iter().map(|u| u.scale()).collect();
        assert_eq!(scales, vec![1, 1_000, 1_000_000, 60_000_000, 3_600_000_000]);
    }
}
