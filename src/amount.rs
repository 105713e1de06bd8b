//! Exact currency amounts stored as an integral number of cents.
//!
//! Expense totals are recomputed every time a page is rendered, so amounts
//! never pass through floating point arithmetic except when handed to the
//! chart library.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// A currency amount in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// The largest magnitude an expense amount may have: ten billion currency units.
    ///
    /// Millions of amounts at this limit still sum without leaving `i64`.
    pub const MAX: Amount = Amount(1_000_000_000_000);

    /// Create an amount from a number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The zero amount.
    pub const fn zero() -> Self {
        Self(0)
    }

    /// The amount in cents.
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whether the amount is less than zero.
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Return the amount if its magnitude is at most [Amount::MAX].
    ///
    /// # Errors
    /// Returns [Error::AmountTooLarge] otherwise.
    pub fn within_limit(self) -> Result<Self, Error> {
        if self.0.unsigned_abs() > Self::MAX.0.unsigned_abs() {
            Err(Error::AmountTooLarge(self))
        } else {
            Ok(self)
        }
    }

    /// The amount in whole currency units, for chart values only.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse an amount such as "100", "$1234.5" or "-12,30".
    ///
    /// Either `.` or `,` may be used as the decimal separator. At most two
    /// fractional digits are accepted.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `text` is not a valid amount, or
    /// [Error::AmountTooLarge] if it is larger than [Amount::MAX].
    pub fn parse(text: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidAmount(text.to_owned());

        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned).trim_start();

        let (whole, fraction) = match unsigned.split_once(['.', ',']) {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        if !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
            || fraction.len() > 2
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(fraction))
            .ok_or_else(invalid)?;

        Self(if negative { -cents } else { cents }).within_limit()
    }

    fn from_f64_rounded(value: f64) -> Option<Self> {
        let cents = (value * 100.0).round();

        if cents.is_finite() && cents.abs() < i64::MAX as f64 {
            Some(Self(cents as i64))
        } else {
            None
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.0.into())
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Number(number) => Amount::from_f64_rounded(number)
                .ok_or_else(|| Error::InvalidAmount(number.to_string()))
                .and_then(Amount::within_limit)
                .map_err(serde::de::Error::custom),
            AmountRepr::Text(text) => Amount::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}
