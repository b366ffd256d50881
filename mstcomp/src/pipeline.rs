//! Typed stages of the text-to-expression pipeline.
//!
//! ```text
//! Parsed ──fold/lift──▶ Folded<A> ──compile(backend)──▶ Compiled
//! ```
//!
//! Each stage is an immutable value, so a [`Parsed`] tree can be folded for
//! several algebras and a [`Folded`] tree compiled with several backends.
//! [`Toolchain`] drives the whole chain from a [`PipelineConfig`].
//!
//! ```
//! use mstcomp::{backend::BytecodeBackend, pipeline::Parsed};
//! use mstir::prelude::*;
//!
//! let compiled = Parsed::parse("x ^ 2 + 1")?
//!     .fold(RealField)?
//!     .compile(&BytecodeBackend)?;
//! assert_eq!(compiled.invoke_indexed(&[3.0]), Ok(10.0));
//! # Ok::<(), mstcomp::error::PipelineError>(())
//! ```

use std::sync::Arc;

use log::debug;
use mstir::{
    algebra::{Algebra, RealField},
    error::{EvalResult, ParseError},
    expression::{Bindings, Expression, IndexedExpression, check_arity},
    fold::{self, ConstantFolding, TypedMst},
    interpreter::{InterpretedExpression, bind},
    mst::Mst,
    parser::parse,
    symbol::SymbolIndexer,
};

use crate::{
    backend::{Backend, BytecodeBackend, ClosureBackend, Compiled, NativeF64Backend},
    config::{BackendKind, PipelineConfig},
    error::{CompileResult, PipelineError, PipelineResult},
};

/// A tree that is not yet tied to an algebra.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    tree: Arc<Mst>,
}

impl Parsed {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(Parsed {
            tree: Arc::new(parse(text)?),
        })
    }

    pub fn from_tree(tree: impl Into<Arc<Mst>>) -> Self {
        Parsed { tree: tree.into() }
    }

    pub fn tree(&self) -> &Mst {
        &self.tree
    }

    /// Every free symbol of the tree, in order of first appearance.
    pub fn indexer(&self) -> SymbolIndexer {
        SymbolIndexer::of(&self.tree)
    }

    pub fn interpret<A: Algebra>(&self, algebra: A) -> InterpretedExpression<A> {
        bind(self.tree.clone(), algebra)
    }

    /// Folds constant subtrees and resolves every operation against `algebra`.
    pub fn fold<A: Algebra>(&self, algebra: A) -> EvalResult<Folded<A>> {
        let typed = self.tree.evaluate_constants(&algebra)?;
        Ok(Folded::new(typed, algebra))
    }

    /// Resolves operations against `algebra` without folding.
    pub fn lift<A: Algebra>(&self, algebra: A) -> EvalResult<Folded<A>> {
        let typed = fold::lift(&self.tree, &algebra)?;
        Ok(Folded::new(typed, algebra))
    }
}

/// A tree whose operations are resolved for one algebra.
///
/// The default argument order lists every free symbol in order of first
/// appearance, including names the algebra binds such as `pi`. Map
/// invocation falls back to the algebra value for those, so every backend
/// honors an explicit `pi` binding. Name a smaller indexer with
/// [`with_indexer`](Self::with_indexer) to compile them as constants.
#[derive(Debug, Clone)]
pub struct Folded<A: Algebra> {
    typed: TypedMst<A::Elem>,
    algebra: A,
    indexer: SymbolIndexer,
}

impl<A: Algebra> Folded<A> {
    fn new(typed: TypedMst<A::Elem>, algebra: A) -> Self {
        let indexer = typed.indexer();
        Folded {
            typed,
            algebra,
            indexer,
        }
    }

    pub fn typed(&self) -> &TypedMst<A::Elem> {
        &self.typed
    }

    pub fn algebra(&self) -> &A {
        &self.algebra
    }

    pub fn indexer(&self) -> &SymbolIndexer {
        &self.indexer
    }

    /// Value of a tree without free symbols.
    pub fn value(&self) -> Option<&A::Elem> {
        self.typed.value()
    }

    /// Replaces the argument order used by [`compile`](Self::compile).
    pub fn with_indexer(mut self, indexer: SymbolIndexer) -> Self {
        self.indexer = indexer;
        self
    }

    pub fn compile<B: Backend<A>>(&self, backend: &B) -> CompileResult<Compiled<B::Output, A::Elem>> {
        let compiled = backend.compile(&self.typed, &self.algebra, &self.indexer)?;
        debug!(
            "compiled {} expression with {} arguments using the {} backend",
            self.algebra.name(),
            self.indexer.len(),
            backend.name()
        );
        Ok(compiled)
    }
}

/// Folded tree evaluated by walking its arena.
#[derive(Debug, Clone)]
pub struct FoldedInterpreter<A: Algebra> {
    folded: Folded<A>,
}

impl<A: Algebra> Expression<A::Elem> for FoldedInterpreter<A> {
    fn invoke(&self, arguments: &Bindings<A::Elem>) -> EvalResult<A::Elem> {
        self.folded
            .typed
            .interpret(&self.folded.algebra, arguments)
    }
}

/// Builds expressions from text according to a [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct Toolchain {
    config: PipelineConfig,
}

impl Toolchain {
    pub fn new(config: PipelineConfig) -> Self {
        Toolchain { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn stage<A: Algebra>(&self, parsed: &Parsed, algebra: A) -> PipelineResult<Folded<A>> {
        Ok(if self.config.fold_constants {
            parsed.fold(algebra)?
        } else {
            parsed.lift(algebra)?
        })
    }

    /// Parses, folds (if enabled) and compiles `text` for `algebra`.
    ///
    /// The interpreter without folding resolves operations lazily, so an
    /// unsupported operation only fails when it is reached.
    /// [`BackendKind::Native`] only exists for the real field; use
    /// [`build_real`](Self::build_real) for it.
    pub fn build<A>(&self, text: &str, algebra: A) -> PipelineResult<Box<dyn Expression<A::Elem>>>
    where
        A: Algebra + 'static,
    {
        if self.config.backend == BackendKind::Native {
            return Err(PipelineError::UnsupportedBackend {
                backend: self.config.backend.to_string(),
                algebra: algebra.name(),
            });
        }

        let parsed = Parsed::parse(text)?;
        if self.config.backend == BackendKind::Interpreter && !self.config.fold_constants {
            debug!("interpreting `{}` without folding", parsed.tree());
            return Ok(Box::new(parsed.interpret(algebra)));
        }

        let folded = self.stage(&parsed, algebra)?;
        Ok(match self.config.backend {
            BackendKind::Interpreter => Box::new(FoldedInterpreter { folded }),
            BackendKind::Bytecode | BackendKind::Native => {
                Box::new(folded.compile(&BytecodeBackend)?)
            }
            BackendKind::Closure => Box::new(folded.compile(&ClosureBackend)?),
        })
    }

    /// [`build`](Self::build) for the real field, honoring every backend
    /// and exposing indexed invocation.
    pub fn build_real(&self, text: &str) -> PipelineResult<Box<dyn IndexedExpression<f64>>> {
        let parsed = Parsed::parse(text)?;
        if self.config.backend == BackendKind::Interpreter && !self.config.fold_constants {
            return Ok(Box::new(IndexedInterpreter {
                inner: parsed.interpret(RealField),
                indexer: parsed.indexer(),
            }));
        }

        let folded = self.stage(&parsed, RealField)?;
        Ok(match self.config.backend {
            BackendKind::Interpreter => {
                let indexer = folded.indexer().clone();
                Box::new(IndexedInterpreter {
                    inner: FoldedInterpreter { folded },
                    indexer,
                })
            }
            BackendKind::Bytecode => Box::new(folded.compile(&BytecodeBackend)?),
            BackendKind::Closure => Box::new(folded.compile(&ClosureBackend)?),
            BackendKind::Native => Box::new(folded.compile(&NativeF64Backend)?),
        })
    }
}

/// Interpreter with an argument order, so it can stand in for a compiled
/// expression.
struct IndexedInterpreter<E> {
    inner: E,
    indexer: SymbolIndexer,
}

impl<T, E: Expression<T>> Expression<T> for IndexedInterpreter<E> {
    fn invoke(&self, arguments: &Bindings<T>) -> EvalResult<T> {
        self.inner.invoke(arguments)
    }
}

impl<T: Clone, E: Expression<T>> IndexedExpression<T> for IndexedInterpreter<E> {
    fn indexer(&self) -> &SymbolIndexer {
        &self.indexer
    }

    fn invoke_indexed(&self, arguments: &[T]) -> EvalResult<T> {
        check_arity(self.indexer.len(), arguments.len())?;
        let bindings = self
            .indexer
            .iter()
            .cloned()
            .zip(arguments.iter().cloned())
            .collect();
        self.inner.invoke(&bindings)
    }
}
