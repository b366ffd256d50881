use std::f64::consts;

use num_complex::Complex64;

use crate::{
    algebra::{Algebra, BinaryFn, UnaryFn, binary_fn, hash_of, unary_fn},
    error::EvalResult,
    number::Number,
    ops::{BinaryOp, UnaryOp},
    symbol::Symbol,
};

/// Field of complex numbers over `f64`.
///
/// Supports the whole vocabulary except `abs`, whose result would leave the
/// field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplexField;

fn complex_pow(base: &Complex64, exponent: &Complex64) -> Complex64 {
    if exponent.im == 0.0 {
        let re = exponent.re;
        if re.fract() == 0.0 && re.abs() <= i32::MAX as f64 {
            // Integral exponents use repeated squaring and stay exact on
            // integral inputs.
            return base.powi(re as i32);
        }
        return base.powf(re);
    }
    base.powc(*exponent)
}

impl Algebra for ComplexField {
    type Elem = Complex64;

    fn name(&self) -> &'static str {
        "complex"
    }

    fn zero(&self) -> Complex64 {
        Complex64::new(0.0, 0.0)
    }

    fn one(&self) -> Complex64 {
        Complex64::new(1.0, 0.0)
    }

    fn number(&self, value: &Number) -> EvalResult<Complex64> {
        Ok(Complex64::new(value.to_f64(), 0.0))
    }

    fn bind_symbol(&self, symbol: &Symbol) -> Option<Complex64> {
        match symbol.identity() {
            "pi" => Some(Complex64::new(consts::PI, 0.0)),
            "e" => Some(Complex64::new(consts::E, 0.0)),
            "i" => Some(Complex64::i()),
            _ => None,
        }
    }

    fn identical(&self, a: &Complex64, b: &Complex64) -> bool {
        a.re.to_bits() == b.re.to_bits() && a.im.to_bits() == b.im.to_bits()
    }

    fn fingerprint(&self, value: &Complex64) -> u64 {
        hash_of(&(value.re.to_bits(), value.im.to_bits()))
    }

    fn unary_function(&self, op: UnaryOp) -> Option<UnaryFn<Complex64>> {
        let f: fn(&Complex64) -> Complex64 = match op {
            UnaryOp::Plus => |z| *z,
            UnaryOp::Minus => |z| -z,
            UnaryOp::Sin => |z| z.sin(),
            UnaryOp::Cos => |z| z.cos(),
            UnaryOp::Tan => |z| z.tan(),
            UnaryOp::Asin => |z| z.asin(),
            UnaryOp::Acos => |z| z.acos(),
            UnaryOp::Atan => |z| z.atan(),
            UnaryOp::Sinh => |z| z.sinh(),
            UnaryOp::Cosh => |z| z.cosh(),
            UnaryOp::Tanh => |z| z.tanh(),
            UnaryOp::Asinh => |z| z.asinh(),
            UnaryOp::Acosh => |z| z.acosh(),
            UnaryOp::Atanh => |z| z.atanh(),
            UnaryOp::Exp => |z| z.exp(),
            UnaryOp::Ln => |z| z.ln(),
            UnaryOp::Sqrt => |z| z.sqrt(),
            UnaryOp::Abs => return None,
        };
        Some(unary_fn(move |z: &Complex64| Ok(f(z))))
    }

    fn binary_function(&self, op: BinaryOp) -> Option<BinaryFn<Complex64>> {
        let f: fn(&Complex64, &Complex64) -> Complex64 = match op {
            BinaryOp::Add => |a, b| a + b,
            BinaryOp::Sub => |a, b| a - b,
            BinaryOp::Mul => |a, b| a * b,
            BinaryOp::Div => |a, b| a / b,
            BinaryOp::Pow => complex_pow,
        };
        Some(binary_fn(move |a: &Complex64, b: &Complex64| Ok(f(a, b))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imaginary_unit_squares_to_minus_one() {
        let i = ComplexField.bind_symbol(&Symbol::new("i")).unwrap();
        let square = ComplexField.binary_operation("*", &i, &i).unwrap();
        assert_eq!(square, Complex64::new(-1.0, 0.0));
    }

    #[test]
    fn integral_powers_are_exact() {
        let two = Complex64::new(2.0, 0.0);
        let three = Complex64::new(3.0, 0.0);
        assert_eq!(
            ComplexField.binary_operation("pow", &two, &three),
            Ok(Complex64::new(8.0, 0.0))
        );
    }
}
