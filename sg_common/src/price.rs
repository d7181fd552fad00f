use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// Number of micro-units in a single currency unit.
pub const MICROS_PER_UNIT: i64 = 1_000_000;

//--------------------------------------       Price         ---------------------------------------------------------
/// A currency amount stored as an integer number of micro-units, so that upstream rates such as `"0.0025"` survive
/// the trip through the database without floating point drift.
///
/// On the wire a `Price` is a plain decimal number (`12.5`). Decimal strings (`"12.5"`) are also accepted when
/// deserializing, since the upstream panel reports rates as strings.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[sqlx(transparent)]
pub struct Price(i64);

op!(binary Price, Add, add);
op!(binary Price, Sub, sub);
op!(inplace Price, AddAssign, add_assign);
op!(inplace Price, SubAssign, sub_assign);
op!(unary Price, Neg, neg);

impl Mul<i64> for Price {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Value cannot be represented as a price: {0}")]
pub struct PriceConversionError(String);

impl From<i64> for Price {
    fn from(micros: i64) -> Self {
        Self(micros)
    }
}

impl Price {
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn from_units(units: i64) -> Self {
        Self(units * MICROS_PER_UNIT)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn as_units(&self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT as f64
    }

    pub fn try_from_units_f64(units: f64) -> Result<Self, PriceConversionError> {
        if !units.is_finite() {
            return Err(PriceConversionError(units.to_string()));
        }
        let micros = (units * MICROS_PER_UNIT as f64).round();
        if micros.abs() > i64::MAX as f64 {
            return Err(PriceConversionError(units.to_string()));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(micros as i64))
    }

    /// Applies a price multiplier (e.g. the reseller markup), rounding to the nearest micro-unit.
    pub fn with_markup(&self, multiplier: f64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self((self.0 as f64 * multiplier).round() as i64)
    }

    /// SMM panels quote rates per 1000 units. Returns the cost of `quantity` units at this rate.
    pub fn for_quantity_per_thousand(&self, quantity: i64) -> Self {
        let micros = i128::from(self.0) * i128::from(quantity) / 1000;
        #[allow(clippy::cast_possible_truncation)]
        Self(micros.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }
}

impl FromStr for Price {
    type Err = PriceConversionError;

    /// Parses a plain decimal string. Digits beyond micro-unit precision are truncated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let mut parts = digits.splitn(2, '.');
        let whole = parts.next().unwrap_or_default();
        let frac = parts.next().unwrap_or_default();
        if (whole.is_empty() && frac.is_empty()) ||
            !whole.chars().all(|c| c.is_ascii_digit()) ||
            !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(PriceConversionError(s.to_string()));
        }
        let whole = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|e| PriceConversionError(format!("{s}. {e}")))?
        };
        let frac = format!("{frac:0<6}");
        let micros = frac[..6].parse::<i64>().map_err(|e| PriceConversionError(format!("{s}. {e}")))?;
        let value = whole
            .checked_mul(MICROS_PER_UNIT)
            .and_then(|v| v.checked_add(micros))
            .ok_or_else(|| PriceConversionError(s.to_string()))?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MICROS_PER_UNIT.unsigned_abs();
        let frac = abs % MICROS_PER_UNIT.unsigned_abs();
        if frac == 0 {
            write!(f, "{sign}{whole}")
        } else {
            let frac = format!("{frac:06}");
            write!(f, "{sign}{whole}.{}", frac.trim_end_matches('0'))
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_units())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPrice {
            Number(f64),
            Text(String),
        }
        match RawPrice::deserialize(deserializer)? {
            RawPrice::Number(n) => Price::try_from_units_f64(n).map_err(serde::de::Error::custom),
            RawPrice::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
