//! Literal payload carried by constant nodes.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

/// Numeric literal as written in the source.
///
/// Integers keep arbitrary precision so the target algebra decides how (and
/// whether) a large literal is represented.
#[derive(Debug, Clone, PartialEq, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Number {
    Integer(BigInt),
    Real(f64),
}

impl Number {
    /// Parses a decimal literal. Text without a `.` or an exponent becomes an
    /// [`Number::Integer`], everything else a [`Number::Real`].
    pub fn parse_literal(text: &str) -> Option<Number> {
        if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().ok().map(Number::Real)
        } else {
            BigInt::parse_bytes(text.as_bytes(), 10).map(Number::Integer)
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Integer(value) => value.to_f64().unwrap_or(f64::NAN),
            Number::Real(value) => *value,
        }
    }

    /// Integral value that fits in an `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(value) => value.to_i64(),
            Number::Real(value) if value.fract() == 0.0 => value.to_i64(),
            Number::Real(_) => None,
        }
    }

    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Number::Integer(value) => Some(value.clone()),
            Number::Real(value) if value.is_finite() && value.fract() == 0.0 => {
                BigInt::from_f64(*value)
            }
            Number::Real(_) => None,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Integer(value) => value.sign() == num_bigint::Sign::Minus,
            Number::Real(value) => value.is_sign_negative(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{value}"),
            // Debug formatting always keeps a `.` or an exponent, so the
            // literal reads back as a real.
            Number::Real(value) => write!(f, "{value:?}"),
        }
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(value: $t) -> Self {
                    Number::Integer(BigInt::from(value))
                }
            }
        )*
    };
}

number_from_int!(i32, i64, u32, u64);

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Real(value)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::Integer(value)
    }
}
