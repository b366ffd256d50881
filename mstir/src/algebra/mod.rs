//! Algebra contract and the bundled numeric algebras.
//!
//! An [`Algebra`] gives meaning to a tree: it turns literals into elements,
//! supplies defaults for well-known names such as `pi`, and maps each
//! operation kind of the vocabulary to a function. Names are resolved once
//! (`resolve_unary`/`resolve_binary`); the returned function can then be
//! called any number of times without further lookups.
//!
//! Operation functions are fallible so algebras can reject inputs (negative
//! exponents in an integer ring, for instance) instead of panicking.

use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
    str::FromStr,
    sync::Arc,
};

use crate::{
    error::{EvalError, EvalResult},
    number::Number,
    ops::{BinaryOp, UnaryOp},
    symbol::Symbol,
};

mod complex;
mod integer;
mod real;

pub use complex::ComplexField;
pub use integer::{BigIntRing, IntRing};
pub use real::RealField;

pub type UnaryFn<T> = Arc<dyn Fn(&T) -> EvalResult<T> + Send + Sync>;
pub type BinaryFn<T> = Arc<dyn Fn(&T, &T) -> EvalResult<T> + Send + Sync>;

pub fn unary_fn<T, F>(f: F) -> UnaryFn<T>
where
    F: Fn(&T) -> EvalResult<T> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn binary_fn<T, F>(f: F) -> BinaryFn<T>
where
    F: Fn(&T, &T) -> EvalResult<T> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

pub trait Algebra: Send + Sync {
    type Elem: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    fn zero(&self) -> Self::Elem;

    fn one(&self) -> Self::Elem;

    /// Converts a literal into an element, or fails with
    /// [`EvalError::InvalidLiteral`].
    fn number(&self, value: &Number) -> EvalResult<Self::Elem>;

    /// Value used for `symbol` when the caller does not bind it.
    fn bind_symbol(&self, _symbol: &Symbol) -> Option<Self::Elem> {
        None
    }

    /// Whether two elements are interchangeable as constants.
    ///
    /// Stricter than `==` where equal values still behave differently:
    /// the real field keeps `0.0` and `-0.0` apart and treats every `NaN`
    /// with the same bits as one value.
    fn identical(&self, a: &Self::Elem, b: &Self::Elem) -> bool {
        a == b
    }

    /// Hash consistent with [`identical`](Self::identical). The default
    /// sends every element to one bucket.
    fn fingerprint(&self, _value: &Self::Elem) -> u64 {
        0
    }

    fn unary_function(&self, op: UnaryOp) -> Option<UnaryFn<Self::Elem>>;

    fn binary_function(&self, op: BinaryOp) -> Option<BinaryFn<Self::Elem>>;

    fn resolve_unary(&self, name: &str) -> EvalResult<(UnaryOp, UnaryFn<Self::Elem>)> {
        UnaryOp::from_str(name)
            .ok()
            .and_then(|op| self.unary_function(op).map(|f| (op, f)))
            .ok_or_else(|| EvalError::unsupported(name, self.name()))
    }

    fn resolve_binary(&self, name: &str) -> EvalResult<(BinaryOp, BinaryFn<Self::Elem>)> {
        BinaryOp::from_str(name)
            .ok()
            .and_then(|op| self.binary_function(op).map(|f| (op, f)))
            .ok_or_else(|| EvalError::unsupported(name, self.name()))
    }

    fn unary_operation(&self, name: &str, operand: &Self::Elem) -> EvalResult<Self::Elem> {
        let (_, f) = self.resolve_unary(name)?;
        f(operand)
    }

    fn binary_operation(
        &self,
        name: &str,
        left: &Self::Elem,
        right: &Self::Elem,
    ) -> EvalResult<Self::Elem> {
        let (_, f) = self.resolve_binary(name)?;
        f(left, right)
    }

    fn supports_unary(&self, name: &str) -> bool {
        self.resolve_unary(name).is_ok()
    }

    fn supports_binary(&self, name: &str) -> bool {
        self.resolve_binary(name).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_unsupported() {
        let err = RealField.unary_operation("frobnicate", &1.0).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnsupportedOperation {
                name: "frobnicate".to_owned(),
                algebra: "real"
            }
        );
        // Known name, wrong arity.
        assert!(RealField.binary_operation("sin", &1.0, &2.0).is_err());
    }

    #[test]
    fn division_is_missing_from_rings() {
        assert!(!IntRing.supports_binary("/"));
        assert!(!BigIntRing.supports_binary("/"));
        assert!(RealField.supports_binary("/"));
        assert!(!ComplexField.supports_unary("abs"));
    }

    #[test]
    fn signed_zeros_are_not_identical() {
        assert!(!RealField.identical(&0.0, &-0.0));
        assert_ne!(RealField.fingerprint(&0.0), RealField.fingerprint(&-0.0));
        assert!(RealField.identical(&f64::NAN, &f64::NAN));

        let zero = num_complex::Complex64::new(0.0, 0.0);
        let negative_zero = num_complex::Complex64::new(0.0, -0.0);
        assert!(!ComplexField.identical(&zero, &negative_zero));
        assert!(ComplexField.identical(&zero, &zero));

        assert!(IntRing.identical(&3, &3));
        assert_eq!(IntRing.fingerprint(&3), IntRing.fingerprint(&3));
        let big = num_bigint::BigInt::from(7);
        assert_eq!(BigIntRing.fingerprint(&big), BigIntRing.fingerprint(&big.clone()));
    }
}
