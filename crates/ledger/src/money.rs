use std::{fmt, iter::Sum, ops::Neg, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Signed amount in **integer minor units** (1/100 of the currency unit).
///
/// Transaction amounts are always positive; the sign of a balance
/// contribution comes from the transaction kind.
///
/// Arithmetic never wraps or panics. Sums go through an `i128` accumulator
/// and clamp to the `i64` range, and negation saturates at `i64::MAX`.
///
/// ```rust
/// use ledger::Money;
///
/// let rent: Money = "1250,5".parse().unwrap();
/// assert_eq!(rent.minor(), 125_050);
/// assert_eq!(rent.to_string(), "1250.50");
/// assert!("3.999".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Clamps a wide accumulator back into the `i64` range.
    pub(crate) fn saturating_from_wide(value: i128) -> Money {
        Money(i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:02}", abs / 100, abs % 100)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money::saturating_from_wide(iter.map(|m| i128::from(m.0)).sum())
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Digits after the separator as minor units: `"5"` is 50, `"05"` is 5.
fn parse_fraction(frac: &str) -> Result<i64, LedgerError> {
    if frac.len() > 2 {
        return Err(LedgerError::InvalidAmount(format!(
            "at most 2 decimals allowed, got {}",
            frac.len()
        )));
    }
    frac.chars().try_fold(0i64, |acc, c| {
        c.to_digit(10)
            .map(|d| acc * 10 + i64::from(d))
            .ok_or_else(|| LedgerError::InvalidAmount(format!("invalid digit {c:?}")))
    })
    .map(|value| if frac.len() == 1 { value * 10 } else { value })
}

impl FromStr for Money {
    type Err = LedgerError;

    /// Parses a decimal string such as `-12.5` or `1000,00`. The separator may
    /// be `.` or `,`, the sign is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidAmount(format!("invalid amount: {s:?}"));

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, trimmed[1..].trim_start()),
            Some(b'+') => (false, trimmed[1..].trim_start()),
            _ => (false, trimmed),
        };

        let (major, frac) = match digits.split_once(['.', ',']) {
            Some((major, frac)) => (major, frac),
            None => (digits, ""),
        };
        if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let major: i64 = major
            .parse()
            .map_err(|_| LedgerError::InvalidAmount("amount too large".to_string()))?;
        let minor = parse_fraction(frac)?;

        let total = major
            .checked_mul(100)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(|| LedgerError::InvalidAmount("amount too large".to_string()))?;
        Ok(Money(if negative { -total } else { total }))
    }
}
