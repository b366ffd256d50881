//! mstir: algebraic syntax trees and their evaluation.
//!
//! This crate is the front half of the mstkit pipeline:
//! - [`parser`] turns infix text into an [`mst::Mst`];
//! - [`algebra`] defines what a tree *means* (reals, complexes, integer rings,
//!   or any user-provided [`algebra::Algebra`]);
//! - [`interpreter`] evaluates a tree by walking it;
//! - [`fold`] pre-evaluates every symbol-free subtree and resolves operations,
//!   producing the [`fold::TypedMst`] that compilers consume.
//!
//! Trees are immutable and cheap to clone; every public type is `Send + Sync`.
//!
//! Example
//! ```
//! use mstir::prelude::*;
//!
//! let tree = parse("2 + 2 * (2 + 2)").unwrap();
//! assert_eq!(evaluate(&tree, &RealField, &Bindings::new()), Ok(10.0));
//!
//! let folded = tree.evaluate_constants(&RealField).unwrap();
//! assert_eq!(folded.value(), Some(&10.0));
//! ```

pub mod algebra;
pub mod error;
pub mod expression;
pub mod fold;
pub mod interpreter;
pub mod mst;
pub mod number;
pub mod ops;
pub mod parser;
pub mod symbol;

pub mod prelude {
    pub use crate::{
        algebra::{Algebra, BigIntRing, ComplexField, IntRing, RealField},
        bindings,
        error::{EvalError, EvalResult, ParseError},
        expression::{Bindings, Expression, IndexedExpression},
        fold::{ConstantFolding, TypedMst, lift},
        interpreter::{bind, evaluate},
        mst::Mst,
        number::Number,
        ops::{BinaryOp, UnaryOp},
        parser::parse,
        symbol::{Symbol, SymbolIndexer},
    };
}
