use mstir::{
    algebra::Algebra,
    error::EvalResult,
    expression::{Bindings, Expression, IndexedExpression, check_arity},
    symbol::SymbolIndexer,
};
use smallvec::SmallVec;

use crate::{
    backend::Backend,
    error::CompileResult,
    lowering::{ArgumentLayout, Instruction, Procedure},
};

/// Executes the lowered procedure directly on a register file.
///
/// Works with every algebra: operations are called through the pooled
/// functions, so no per-call name lookup or tree dispatch remains.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytecodeBackend;

#[derive(Debug, Clone)]
pub struct BytecodeExpression<T> {
    procedure: Procedure<T>,
    layout: ArgumentLayout<T>,
}

impl<T: Clone> BytecodeExpression<T> {
    pub fn procedure(&self) -> &Procedure<T> {
        &self.procedure
    }

    fn run(&self, arguments: &[T]) -> EvalResult<T> {
        let pool = self.procedure.pool();
        let mut registers: SmallVec<[T; 16]> =
            SmallVec::with_capacity(self.procedure.instructions().len());

        for instruction in self.procedure.instructions() {
            let value = match *instruction {
                Instruction::Unary {
                    function, operand, ..
                } => pool.unary(function)(operand.fetch(pool, arguments, &registers))?,
                Instruction::Binary {
                    function, lhs, rhs, ..
                } => pool.binary(function)(
                    lhs.fetch(pool, arguments, &registers),
                    rhs.fetch(pool, arguments, &registers),
                )?,
            };
            registers.push(value);
        }

        Ok(self
            .procedure
            .result()
            .fetch(pool, arguments, &registers)
            .clone())
    }
}

impl<T: Clone + Send + Sync> Expression<T> for BytecodeExpression<T> {
    fn invoke(&self, arguments: &Bindings<T>) -> EvalResult<T> {
        let arguments = self.layout.gather(arguments)?;
        self.run(&arguments)
    }
}

impl<T: Clone + Send + Sync> IndexedExpression<T> for BytecodeExpression<T> {
    fn indexer(&self) -> &SymbolIndexer {
        self.layout.indexer()
    }

    fn invoke_indexed(&self, arguments: &[T]) -> EvalResult<T> {
        check_arity(self.layout.arity(), arguments.len())?;
        self.run(arguments)
    }
}

impl<A: Algebra> Backend<A> for BytecodeBackend {
    type Output = BytecodeExpression<A::Elem>;

    fn name(&self) -> &'static str {
        "bytecode"
    }

    fn emit(
        &self,
        procedure: Procedure<A::Elem>,
        layout: ArgumentLayout<A::Elem>,
    ) -> CompileResult<Self::Output> {
        Ok(BytecodeExpression { procedure, layout })
    }
}
