//! # Money Module
//!
//! Provides the `Money` type for catalog prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The legacy catalog stored prices as decimal(18,2). A float would      │
//! │  round-trip 8.50 fine but turn 0.1 + 0.2 into 0.30000000000000004.     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    price_cents INTEGER in the store, Money in Rust                     │
//! │    Decimal text ("19.50") only at the edges (seed data, display)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use catalog_core::money::Money;
//!
//! let price = Money::from_cents(1950);
//! assert_eq!(price.to_string(), "19.50");
//!
//! let parsed: Money = "8.5".parse().unwrap();
//! assert_eq!(parsed.cents(), 850);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// As a newtype it serializes as a bare integer, matching the
/// `price_cents` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`19.50`), matching how the grid shows prices.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

/// Parses a decimal price with at most two fractional digits.
///
/// Accepts `"12"`, `"12.5"`, `"12.50"` and a leading `-`.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a decimal number"));
        }
        if minor_str.len() > 2 || !minor_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("at most two decimal places"));
        }

        let major: i64 = major_str
            .parse()
            .map_err(|_| invalid("value is too large"))?;
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("bad fraction"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("value is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1950).to_string(), "19.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!("12".parse::<Money>().unwrap().cents(), 1200);
        assert_eq!("8.5".parse::<Money>().unwrap().cents(), 850);
        assert_eq!("19.50".parse::<Money>().unwrap().cents(), 1950);
        assert_eq!(" 0.05 ".parse::<Money>().unwrap().cents(), 5);
        assert_eq!("-1.25".parse::<Money>().unwrap().cents(), -125);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
        assert!("1.2x".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(850)).unwrap();
        assert_eq!(json, "850");
    }
}
