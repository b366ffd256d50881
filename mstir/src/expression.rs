//! Callable expressions.
//!
//! An [`Expression`] is a tree bound to an algebra, ready to be invoked many
//! times with different argument values. Interpreted and compiled forms share
//! this contract, so callers can swap one for the other freely.

use std::collections::HashMap;

use crate::{
    error::{EvalError, EvalResult},
    symbol::{Symbol, SymbolIndexer},
};

/// Argument values keyed by symbol.
pub type Bindings<T> = HashMap<Symbol, T>;

/// Builds a [`Bindings`] map from `name => value` pairs.
///
/// ```
/// use mstir::bindings;
/// let args = bindings! { "x" => 1.0, "y" => 2.5 };
/// assert_eq!(args.get("y"), Some(&2.5));
/// ```
#[macro_export]
macro_rules! bindings {
    () => {
        $crate::expression::Bindings::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut bindings = $crate::expression::Bindings::new();
        $(
            bindings.insert($crate::symbol::Symbol::from($name), $value);
        )+
        bindings
    }};
}

pub trait Expression<T>: Send + Sync {
    /// Evaluates the expression. Symbols missing from `arguments` fall back to
    /// the algebra's defaults, then fail with [`EvalError::UnboundSymbol`].
    fn invoke(&self, arguments: &Bindings<T>) -> EvalResult<T>;
}

/// Expression that can also be invoked with a dense argument array.
pub trait IndexedExpression<T>: Expression<T> {
    /// Slot assignment for [`invoke_indexed`](IndexedExpression::invoke_indexed).
    fn indexer(&self) -> &SymbolIndexer;

    /// Evaluates with `arguments[i]` bound to `indexer().symbols()[i]`.
    fn invoke_indexed(&self, arguments: &[T]) -> EvalResult<T>;
}

impl<T, E: Expression<T> + ?Sized> Expression<T> for Box<E> {
    fn invoke(&self, arguments: &Bindings<T>) -> EvalResult<T> {
        (**self).invoke(arguments)
    }
}

impl<T, E: Expression<T> + ?Sized> Expression<T> for std::sync::Arc<E> {
    fn invoke(&self, arguments: &Bindings<T>) -> EvalResult<T> {
        (**self).invoke(arguments)
    }
}

/// Fails with [`EvalError::ArityMismatch`] unless `found == expected`.
pub fn check_arity(expected: usize, found: usize) -> EvalResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(EvalError::ArityMismatch { expected, found })
    }
}
