//! Tree-walking evaluation of an [`Mst`] against an [`Algebra`].
//!
//! This is the reference semantics every compiled backend must agree with:
//! literals go through [`Algebra::number`], symbols through the bindings then
//! the algebra defaults, and the left operand of a binary node is evaluated
//! completely before the right one.

use std::sync::Arc;

use crate::{
    algebra::Algebra,
    error::{EvalError, EvalResult},
    expression::{Bindings, Expression},
    mst::Mst,
    symbol::Symbol,
};

pub(crate) fn lookup<A: Algebra>(
    algebra: &A,
    bindings: &Bindings<A::Elem>,
    symbol: &Symbol,
) -> EvalResult<A::Elem> {
    bindings
        .get(symbol)
        .cloned()
        .or_else(|| algebra.bind_symbol(symbol))
        .ok_or_else(|| EvalError::UnboundSymbol {
            symbol: symbol.clone(),
        })
}

/// Evaluates `tree` once.
///
/// Recursion depth follows the height of `tree`.
///
/// ```
/// use mstir::{algebra::RealField, bindings, interpreter::evaluate, parser::parse};
/// let tree = parse("2 * x + 1").unwrap();
/// assert_eq!(evaluate(&tree, &RealField, &bindings! { "x" => 3.0 }), Ok(7.0));
/// ```
pub fn evaluate<A: Algebra>(
    tree: &Mst,
    algebra: &A,
    bindings: &Bindings<A::Elem>,
) -> EvalResult<A::Elem> {
    match tree {
        Mst::Constant(value) => algebra.number(value),
        Mst::Symbol(symbol) => lookup(algebra, bindings, symbol),
        Mst::Unary { operation, operand } => {
            let operand = evaluate(operand, algebra, bindings)?;
            algebra.unary_operation(operation, &operand)
        }
        Mst::Binary {
            operation,
            left,
            right,
        } => {
            let left = evaluate(left, algebra, bindings)?;
            let right = evaluate(right, algebra, bindings)?;
            algebra.binary_operation(operation, &left, &right)
        }
    }
}

/// Tree bound to an algebra, evaluated by [`evaluate`] on every call.
#[derive(Debug, Clone)]
pub struct InterpretedExpression<A> {
    tree: Arc<Mst>,
    algebra: A,
}

impl<A: Algebra> InterpretedExpression<A> {
    pub fn tree(&self) -> &Mst {
        &self.tree
    }

    pub fn algebra(&self) -> &A {
        &self.algebra
    }
}

impl<A: Algebra> Expression<A::Elem> for InterpretedExpression<A> {
    fn invoke(&self, arguments: &Bindings<A::Elem>) -> EvalResult<A::Elem> {
        evaluate(&self.tree, &self.algebra, arguments)
    }
}

/// Binds `tree` to `algebra` without any preprocessing. Unsupported
/// operations surface on the first invocation that reaches them.
pub fn bind<A: Algebra>(tree: impl Into<Arc<Mst>>, algebra: A) -> InterpretedExpression<A> {
    InterpretedExpression {
        tree: tree.into(),
        algebra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algebra::RealField, bindings};

    #[test]
    fn defaults_apply_only_when_unbound() {
        let tree = Mst::symbol("pi");
        assert_eq!(
            evaluate(&tree, &RealField, &Bindings::new()),
            Ok(std::f64::consts::PI)
        );
        assert_eq!(evaluate(&tree, &RealField, &bindings! { "pi" => 3.0 }), Ok(3.0));
    }

    #[test]
    fn bound_expression_is_reusable() {
        let expr = bind(Mst::symbol("x") * 2, RealField);
        assert_eq!(expr.invoke(&bindings! { "x" => 1.0 }), Ok(2.0));
        assert_eq!(expr.invoke(&bindings! { "x" => 4.0 }), Ok(8.0));
        assert!(expr.invoke(&Bindings::new()).unwrap_err().is_unbound_symbol());
    }
}
