use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::{
    algebra::{Algebra, BinaryFn, UnaryFn, binary_fn, hash_of, unary_fn},
    error::{EvalError, EvalResult},
    number::Number,
    ops::{BinaryOp, UnaryOp},
};

/// Ring of 64-bit integers with wrapping arithmetic.
///
/// Division is not part of the ring. `pow` accepts non-negative exponents
/// only, and `0 ^ 0 = 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntRing;

fn int_pow(base: &i64, exponent: &i64) -> EvalResult<i64> {
    let exponent = u32::try_from(*exponent).map_err(|_| {
        EvalError::arithmetic(
            "pow",
            format!("exponent {exponent} is outside 0..={}", u32::MAX),
        )
    })?;
    Ok(base.wrapping_pow(exponent))
}

impl Algebra for IntRing {
    type Elem = i64;

    fn name(&self) -> &'static str {
        "int"
    }

    fn zero(&self) -> i64 {
        0
    }

    fn one(&self) -> i64 {
        1
    }

    fn number(&self, value: &Number) -> EvalResult<i64> {
        value.to_i64().ok_or_else(|| EvalError::InvalidLiteral {
            literal: value.to_string(),
            algebra: self.name(),
        })
    }

    fn fingerprint(&self, value: &i64) -> u64 {
        hash_of(value)
    }

    fn unary_function(&self, op: UnaryOp) -> Option<UnaryFn<i64>> {
        let f: fn(i64) -> i64 = match op {
            UnaryOp::Plus => |x| x,
            UnaryOp::Minus => i64::wrapping_neg,
            UnaryOp::Abs => i64::wrapping_abs,
            _ => return None,
        };
        Some(unary_fn(move |x: &i64| Ok(f(*x))))
    }

    fn binary_function(&self, op: BinaryOp) -> Option<BinaryFn<i64>> {
        let f: fn(i64, i64) -> i64 = match op {
            BinaryOp::Add => i64::wrapping_add,
            BinaryOp::Sub => i64::wrapping_sub,
            BinaryOp::Mul => i64::wrapping_mul,
            BinaryOp::Pow => return Some(binary_fn(int_pow)),
            BinaryOp::Div => return None,
        };
        Some(binary_fn(move |a: &i64, b: &i64| Ok(f(*a, *b))))
    }
}

/// Ring of arbitrary precision integers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BigIntRing;

fn bigint_pow(base: &BigInt, exponent: &BigInt) -> EvalResult<BigInt> {
    let exponent = exponent.to_u32().ok_or_else(|| {
        EvalError::arithmetic(
            "pow",
            format!("exponent {exponent} is outside 0..={}", u32::MAX),
        )
    })?;
    Ok(base.pow(exponent))
}

impl Algebra for BigIntRing {
    type Elem = BigInt;

    fn name(&self) -> &'static str {
        "bigint"
    }

    fn zero(&self) -> BigInt {
        BigInt::zero()
    }

    fn one(&self) -> BigInt {
        BigInt::one()
    }

    fn number(&self, value: &Number) -> EvalResult<BigInt> {
        value.to_bigint().ok_or_else(|| EvalError::InvalidLiteral {
            literal: value.to_string(),
            algebra: self.name(),
        })
    }

    fn fingerprint(&self, value: &BigInt) -> u64 {
        hash_of(value)
    }

    fn unary_function(&self, op: UnaryOp) -> Option<UnaryFn<BigInt>> {
        match op {
            UnaryOp::Plus => Some(unary_fn(|x: &BigInt| Ok(x.clone()))),
            UnaryOp::Minus => Some(unary_fn(|x: &BigInt| Ok(-x))),
            UnaryOp::Abs => Some(unary_fn(|x: &BigInt| Ok(x.abs()))),
            _ => None,
        }
    }

    fn binary_function(&self, op: BinaryOp) -> Option<BinaryFn<BigInt>> {
        match op {
            BinaryOp::Add => Some(binary_fn(|a: &BigInt, b: &BigInt| Ok(a + b))),
            BinaryOp::Sub => Some(binary_fn(|a: &BigInt, b: &BigInt| Ok(a - b))),
            BinaryOp::Mul => Some(binary_fn(|a: &BigInt, b: &BigInt| Ok(a * b))),
            BinaryOp::Pow => Some(binary_fn(bigint_pow)),
            BinaryOp::Div => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_arithmetic() {
        assert_eq!(IntRing.binary_operation("+", &i64::MAX, &1), Ok(i64::MIN));
        assert_eq!(IntRing.binary_operation("pow", &0, &0), Ok(1));
        assert_eq!(IntRing.binary_operation("pow", &3, &4), Ok(81));
    }

    #[test]
    fn negative_exponent_is_arithmetic_error() {
        let err = IntRing.binary_operation("pow", &2, &-1).unwrap_err();
        assert!(err.is_arithmetic());
        let err = BigIntRing
            .binary_operation("pow", &BigInt::from(2), &BigInt::from(-1))
            .unwrap_err();
        assert!(err.is_arithmetic());
    }

    #[test]
    fn fractional_literals_are_rejected() {
        let err = IntRing.number(&Number::Real(0.5)).unwrap_err();
        assert_eq!(
            err,
            EvalError::InvalidLiteral {
                literal: "0.5".to_owned(),
                algebra: "int"
            }
        );
        assert_eq!(IntRing.number(&Number::Real(4.0)), Ok(4));
        assert!(IntRing.number(&Number::parse_literal("99999999999999999999").unwrap()).is_err());
    }

    #[test]
    fn big_powers_do_not_overflow() {
        let big = BigIntRing
            .binary_operation("pow", &BigInt::from(2), &BigInt::from(100))
            .unwrap();
        assert_eq!(big.to_string(), "1267650600228229401496703205376");
    }
}
