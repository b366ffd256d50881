use std::fmt;

use mstir::{
    algebra::Algebra,
    error::EvalResult,
    expression::{Bindings, Expression, IndexedExpression, check_arity},
    symbol::SymbolIndexer,
};

use crate::{
    backend::Backend,
    error::{CompileError, CompileResult},
    lowering::{ArgumentLayout, ConstantPool, Instruction, Operand, Procedure},
};

type Thunk<T> = Box<dyn Fn(&[T]) -> EvalResult<T> + Send + Sync>;

/// Rebuilds the procedure as nested closures, one per instruction.
///
/// Constants and functions are captured by value, so the emitted expression
/// does not keep the pool around. Each register must be read exactly once,
/// which holds for every procedure lowered from a tree.
///
/// Calling (and dropping) the expression recurses once per nesting level;
/// prefer [`BytecodeBackend`](super::BytecodeBackend) for very deep trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosureBackend;

pub struct ClosureExpression<T> {
    root: Thunk<T>,
    layout: ArgumentLayout<T>,
}

impl<T: fmt::Debug> fmt::Debug for ClosureExpression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureExpression")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync> Expression<T> for ClosureExpression<T> {
    fn invoke(&self, arguments: &Bindings<T>) -> EvalResult<T> {
        let arguments = self.layout.gather(arguments)?;
        (self.root)(&arguments)
    }
}

impl<T: Clone + Send + Sync> IndexedExpression<T> for ClosureExpression<T> {
    fn indexer(&self) -> &SymbolIndexer {
        self.layout.indexer()
    }

    fn invoke_indexed(&self, arguments: &[T]) -> EvalResult<T> {
        check_arity(self.layout.arity(), arguments.len())?;
        (self.root)(arguments)
    }
}

fn take<T>(
    registers: &mut [Option<Thunk<T>>],
    pool: &ConstantPool<T>,
    operand: Operand,
) -> CompileResult<Thunk<T>>
where
    T: Clone + Send + Sync + 'static,
{
    match operand {
        Operand::Constant(slot) => {
            let value = pool.value(slot).clone();
            Ok(Box::new(move |_: &[T]| Ok(value.clone())))
        }
        Operand::Argument(slot) => {
            let slot = slot as usize;
            Ok(Box::new(move |arguments: &[T]| {
                Ok(arguments[slot].clone())
            }))
        }
        Operand::Register(slot) => registers
            .get_mut(slot as usize)
            .and_then(Option::take)
            .ok_or_else(|| CompileError::lowering(format!("register r{slot} is read twice"))),
    }
}

impl<A: Algebra> Backend<A> for ClosureBackend {
    type Output = ClosureExpression<A::Elem>;

    fn name(&self) -> &'static str {
        "closure"
    }

    fn emit(
        &self,
        procedure: Procedure<A::Elem>,
        layout: ArgumentLayout<A::Elem>,
    ) -> CompileResult<Self::Output> {
        let pool = procedure.pool();
        let mut registers: Vec<Option<Thunk<A::Elem>>> =
            Vec::with_capacity(procedure.instructions().len());

        for instruction in procedure.instructions() {
            let thunk: Thunk<A::Elem> = match *instruction {
                Instruction::Unary {
                    function, operand, ..
                } => {
                    let function = pool.unary(function).clone();
                    let operand = take(&mut registers, pool, operand)?;
                    Box::new(move |arguments: &[A::Elem]| function(&operand(arguments)?))
                }
                Instruction::Binary {
                    function, lhs, rhs, ..
                } => {
                    let function = pool.binary(function).clone();
                    let lhs = take(&mut registers, pool, lhs)?;
                    let rhs = take(&mut registers, pool, rhs)?;
                    Box::new(move |arguments: &[A::Elem]| {
                        let left = lhs(arguments)?;
                        let right = rhs(arguments)?;
                        function(&left, &right)
                    })
                }
            };
            registers.push(Some(thunk));
        }

        let root = take(&mut registers, pool, procedure.result())?;
        if let Some(unused) = registers.iter().position(Option::is_some) {
            return Err(CompileError::lowering(format!(
                "register r{unused} is never read"
            )));
        }
        Ok(ClosureExpression { root, layout })
    }
}
