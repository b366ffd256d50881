//! Algebraic syntax tree (MST).
//!
//! An [`Mst`] is an immutable tree whose inner nodes carry operation *names*.
//! Nothing is resolved here: the same tree can be evaluated against a real,
//! complex or integer algebra, and only the algebra decides whether `sin` or
//! `/` exist.
//!
//! Trees are built by the [parser](crate::parser), by the constructors on
//! [`Mst`], with the operator sugar below (`x + 1`, `-x`, `2.0 * x`), or with the
//! free functions of [`func`].
//!
//! ```
//! use mstir::mst::{Mst, func::sin};
//! let x = Mst::symbol("x");
//! let tree = sin(&x) * 2 + 1.5;
//! assert_eq!(tree.to_string(), "sin(x) * 2 + 1.5");
//! ```
//!
//! Besides the infix text of [`pretty`], trees render as LaTeX or MathML
//! through [`render`].

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{number::Number, ops::BinaryOp, ops::UnaryOp, symbol::Symbol};

pub mod func;
pub mod pretty;
pub mod render;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mst {
    Constant(Number),
    Symbol(Symbol),
    Unary {
        operation: String,
        operand: Arc<Mst>,
    },
    Binary {
        operation: String,
        left: Arc<Mst>,
        right: Arc<Mst>,
    },
}

impl Mst {
    pub fn number(value: impl Into<Number>) -> Self {
        Mst::Constant(value.into())
    }

    pub fn symbol(name: &str) -> Self {
        Mst::Symbol(Symbol::new(name))
    }

    pub fn unary(operation: impl Into<String>, operand: impl Into<Mst>) -> Self {
        Mst::Unary {
            operation: operation.into(),
            operand: Arc::new(operand.into()),
        }
    }

    pub fn binary(
        operation: impl Into<String>,
        left: impl Into<Mst>,
        right: impl Into<Mst>,
    ) -> Self {
        Mst::Binary {
            operation: operation.into(),
            left: Arc::new(left.into()),
            right: Arc::new(right.into()),
        }
    }

    pub fn pow(self, exponent: impl Into<Mst>) -> Self {
        Mst::binary(BinaryOp::Pow, self, exponent)
    }

    /// Free symbols in order of first appearance (left-to-right, depth-first).
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut found = Vec::new();
        self.collect_symbols(&mut found);
        found
    }

    fn collect_symbols(&self, found: &mut Vec<Symbol>) {
        match self {
            Mst::Constant(_) => {}
            Mst::Symbol(symbol) => {
                if !found.contains(symbol) {
                    found.push(symbol.clone());
                }
            }
            Mst::Unary { operand, .. } => operand.collect_symbols(found),
            Mst::Binary { left, right, .. } => {
                left.collect_symbols(found);
                right.collect_symbols(found);
            }
        }
    }

    /// True when the tree contains no symbol, i.e. folds to a single value.
    pub fn is_constant(&self) -> bool {
        match self {
            Mst::Constant(_) => true,
            Mst::Symbol(_) => false,
            Mst::Unary { operand, .. } => operand.is_constant(),
            Mst::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Mst::Constant(_) | Mst::Symbol(_) => 1,
            Mst::Unary { operand, .. } => 1 + operand.node_count(),
            Mst::Binary { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Mst::Constant(_) | Mst::Symbol(_) => 1,
            Mst::Unary { operand, .. } => 1 + operand.depth(),
            Mst::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl From<Number> for Mst {
    fn from(value: Number) -> Self {
        Mst::Constant(value)
    }
}

impl From<Symbol> for Mst {
    fn from(symbol: Symbol) -> Self {
        Mst::Symbol(symbol)
    }
}

impl From<&Mst> for Mst {
    fn from(tree: &Mst) -> Self {
        tree.clone()
    }
}

macro_rules! mst_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Mst {
                fn from(value: $t) -> Self {
                    Mst::Constant(Number::from(value))
                }
            }
        )*
    };
}

mst_from_number!(i32, i64, u32, u64, f64);

/// Operator sugar: implements the arithmetic operator traits on `Mst`, `&Mst`
/// and on numeric left operands so that `2.0 * x + 1` builds a tree.
macro_rules! define_ops_mst {
    ($($trait:ident::$method:ident => $op:expr),* $(,)?) => {
        $(
            impl<R: Into<Mst>> std::ops::$trait<R> for Mst {
                type Output = Mst;

                fn $method(self, rhs: R) -> Mst {
                    Mst::binary($op, self, rhs)
                }
            }

            impl<R: Into<Mst>> std::ops::$trait<R> for &Mst {
                type Output = Mst;

                fn $method(self, rhs: R) -> Mst {
                    Mst::binary($op, self.clone(), rhs)
                }
            }

            define_ops_mst!(@lhs $trait::$method => $op; i32, i64, f64);
        )*
    };
    (@lhs $trait:ident::$method:ident => $op:expr; $($t:ty),*) => {
        $(
            impl std::ops::$trait<Mst> for $t {
                type Output = Mst;

                fn $method(self, rhs: Mst) -> Mst {
                    Mst::binary($op, self, rhs)
                }
            }

            impl std::ops::$trait<&Mst> for $t {
                type Output = Mst;

                fn $method(self, rhs: &Mst) -> Mst {
                    Mst::binary($op, self, rhs.clone())
                }
            }
        )*
    };
}

define_ops_mst! {
    Add::add => BinaryOp::Add,
    Sub::sub => BinaryOp::Sub,
    Mul::mul => BinaryOp::Mul,
    Div::div => BinaryOp::Div,
}

impl std::ops::Neg for Mst {
    type Output = Mst;

    fn neg(self) -> Mst {
        Mst::unary(UnaryOp::Minus, self)
    }
}

impl std::ops::Neg for &Mst {
    type Output = Mst;

    fn neg(self) -> Mst {
        Mst::unary(UnaryOp::Minus, self.clone())
    }
}
