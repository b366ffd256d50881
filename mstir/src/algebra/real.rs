use std::f64::consts;

use crate::{
    algebra::{Algebra, BinaryFn, UnaryFn, binary_fn, unary_fn},
    error::EvalResult,
    number::Number,
    ops::{BinaryOp, UnaryOp},
    symbol::Symbol,
};

/// Field of double precision reals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealField;

impl RealField {
    /// Plain `f64` implementation of a unary operation. Every kind of the
    /// vocabulary is available.
    pub fn native_unary(op: UnaryOp) -> fn(f64) -> f64 {
        match op {
            UnaryOp::Plus => |x| x,
            UnaryOp::Minus => |x| -x,
            UnaryOp::Sin => f64::sin,
            UnaryOp::Cos => f64::cos,
            UnaryOp::Tan => f64::tan,
            UnaryOp::Asin => f64::asin,
            UnaryOp::Acos => f64::acos,
            UnaryOp::Atan => f64::atan,
            UnaryOp::Sinh => f64::sinh,
            UnaryOp::Cosh => f64::cosh,
            UnaryOp::Tanh => f64::tanh,
            UnaryOp::Asinh => f64::asinh,
            UnaryOp::Acosh => f64::acosh,
            UnaryOp::Atanh => f64::atanh,
            UnaryOp::Exp => f64::exp,
            UnaryOp::Ln => f64::ln,
            UnaryOp::Sqrt => f64::sqrt,
            UnaryOp::Abs => f64::abs,
        }
    }

    pub fn native_binary(op: BinaryOp) -> fn(f64, f64) -> f64 {
        match op {
            BinaryOp::Add => |a, b| a + b,
            BinaryOp::Sub => |a, b| a - b,
            BinaryOp::Mul => |a, b| a * b,
            BinaryOp::Div => |a, b| a / b,
            BinaryOp::Pow => f64::powf,
        }
    }
}

impl Algebra for RealField {
    type Elem = f64;

    fn name(&self) -> &'static str {
        "real"
    }

    fn zero(&self) -> f64 {
        0.0
    }

    fn one(&self) -> f64 {
        1.0
    }

    fn number(&self, value: &Number) -> EvalResult<f64> {
        Ok(value.to_f64())
    }

    fn bind_symbol(&self, symbol: &Symbol) -> Option<f64> {
        match symbol.identity() {
            "pi" => Some(consts::PI),
            "e" => Some(consts::E),
            _ => None,
        }
    }

    fn identical(&self, a: &f64, b: &f64) -> bool {
        a.to_bits() == b.to_bits()
    }

    fn fingerprint(&self, value: &f64) -> u64 {
        value.to_bits()
    }

    fn unary_function(&self, op: UnaryOp) -> Option<UnaryFn<f64>> {
        let f = RealField::native_unary(op);
        Some(unary_fn(move |x: &f64| Ok(f(*x))))
    }

    fn binary_function(&self, op: BinaryOp) -> Option<BinaryFn<f64>> {
        let f = RealField::native_binary(op);
        Some(binary_fn(move |a: &f64, b: &f64| Ok(f(*a, *b))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_constants() {
        assert_eq!(RealField.bind_symbol(&Symbol::new("pi")), Some(consts::PI));
        assert_eq!(RealField.bind_symbol(&Symbol::new("x")), None);
    }

    #[test]
    fn operations_by_name() {
        assert_eq!(RealField.binary_operation("pow", &2.0, &10.0), Ok(1024.0));
        assert_eq!(RealField.binary_operation("^", &2.0, &3.0), Ok(8.0));
        assert_eq!(RealField.unary_operation("-", &2.5), Ok(-2.5));
        assert_eq!(RealField.unary_operation("sqrt", &9.0), Ok(3.0));
        assert!(RealField.binary_operation("/", &1.0, &0.0).unwrap().is_infinite());
    }
}
