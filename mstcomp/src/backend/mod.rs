//! Compiler backends.
//!
//! A [`Backend`] turns a folded tree into an [`IndexedExpression`]. All
//! backends share the same front: a whole-constant tree short-circuits to a
//! [`ConstantExpression`], anything else is [lowered](crate::lowering::lower)
//! into a [`Procedure`] which the backend then *emits* in its own executable
//! form.
//!
//! | backend            | algebra    | executable form                      |
//! |--------------------|------------|--------------------------------------|
//! | [`BytecodeBackend`] | any        | register machine over the procedure  |
//! | [`ClosureBackend`]  | any        | tree of boxed closures               |
//! | [`NativeF64Backend`]| `RealField`| `f64` opcodes with inline arithmetic |

use log::debug;
use mstir::{
    algebra::Algebra,
    error::EvalResult,
    expression::{Bindings, Expression, IndexedExpression, check_arity},
    fold::TypedMst,
    symbol::SymbolIndexer,
};

use crate::{
    error::CompileResult,
    lowering::{ArgumentLayout, Procedure, lower},
};

mod bytecode;
mod closure;
mod native;

pub use bytecode::{BytecodeBackend, BytecodeExpression};
pub use closure::{ClosureBackend, ClosureExpression};
pub use native::{NativeF64Backend, NativeF64Expression};

pub trait Backend<A: Algebra> {
    type Output: IndexedExpression<A::Elem>;

    fn name(&self) -> &'static str;

    /// Builds the executable form of an already lowered procedure.
    fn emit(
        &self,
        procedure: Procedure<A::Elem>,
        layout: ArgumentLayout<A::Elem>,
    ) -> CompileResult<Self::Output>;

    /// Compiles `tree` with arguments addressed through `indexer`.
    fn compile(
        &self,
        tree: &TypedMst<A::Elem>,
        algebra: &A,
        indexer: &SymbolIndexer,
    ) -> CompileResult<Compiled<Self::Output, A::Elem>> {
        let layout = ArgumentLayout::new(indexer.clone(), algebra);
        match tree {
            TypedMst::Constant { value, .. } => {
                debug!("{}: tree is constant, skipping emission", self.name());
                Ok(Compiled::Constant(ConstantExpression {
                    value: value.clone(),
                    layout,
                }))
            }
            TypedMst::Node(tree) => {
                let procedure = lower(tree, algebra, indexer)?;
                debug!(
                    "{}: lowered {} nodes to {} instructions, {} pooled values, {} functions",
                    self.name(),
                    tree.len(),
                    procedure.instructions().len(),
                    procedure.pool().values().len(),
                    procedure.pool().function_count(),
                );
                Ok(Compiled::Procedure(self.emit(procedure, layout)?))
            }
        }
    }
}

/// Expression of a tree that folded to a single value.
#[derive(Debug, Clone)]
pub struct ConstantExpression<T> {
    value: T,
    layout: ArgumentLayout<T>,
}

impl<T: Clone> ConstantExpression<T> {
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Send + Sync> Expression<T> for ConstantExpression<T> {
    fn invoke(&self, _arguments: &Bindings<T>) -> EvalResult<T> {
        Ok(self.value.clone())
    }
}

impl<T: Clone + Send + Sync> IndexedExpression<T> for ConstantExpression<T> {
    fn indexer(&self) -> &SymbolIndexer {
        self.layout.indexer()
    }

    fn invoke_indexed(&self, arguments: &[T]) -> EvalResult<T> {
        check_arity(self.layout.arity(), arguments.len())?;
        Ok(self.value.clone())
    }
}

/// Result of [`Backend::compile`].
#[derive(Debug, Clone)]
pub enum Compiled<E, T> {
    Constant(ConstantExpression<T>),
    Procedure(E),
}

impl<E, T> Compiled<E, T> {
    pub fn is_constant(&self) -> bool {
        matches!(self, Compiled::Constant(_))
    }
}

impl<E, T> Expression<T> for Compiled<E, T>
where
    E: IndexedExpression<T>,
    T: Clone + Send + Sync,
{
    fn invoke(&self, arguments: &Bindings<T>) -> EvalResult<T> {
        match self {
            Compiled::Constant(expr) => expr.invoke(arguments),
            Compiled::Procedure(expr) => expr.invoke(arguments),
        }
    }
}

impl<E, T> IndexedExpression<T> for Compiled<E, T>
where
    E: IndexedExpression<T>,
    T: Clone + Send + Sync,
{
    fn indexer(&self) -> &SymbolIndexer {
        match self {
            Compiled::Constant(expr) => expr.indexer(),
            Compiled::Procedure(expr) => expr.indexer(),
        }
    }

    fn invoke_indexed(&self, arguments: &[T]) -> EvalResult<T> {
        match self {
            Compiled::Constant(expr) => expr.invoke_indexed(arguments),
            Compiled::Procedure(expr) => expr.invoke_indexed(arguments),
        }
    }
}
