use mstir::{
    algebra::RealField,
    error::EvalResult,
    expression::{Bindings, Expression, IndexedExpression, check_arity},
    ops::{BinaryOp, UnaryOp},
    symbol::SymbolIndexer,
};
use smallvec::SmallVec;

use crate::{
    backend::Backend,
    error::CompileResult,
    lowering::{ArgumentLayout, Instruction, Operand, Procedure},
};

/// Specialized backend for [`RealField`].
///
/// Arithmetic is inlined as plain `f64` operations and math functions are
/// called through `fn` pointers, bypassing the pooled trait objects. Results
/// are bit-identical to the interpreter since both use the same `f64`
/// primitives in the same order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeF64Backend;

#[derive(Debug, Clone, Copy)]
enum NativeOp {
    Copy(Operand),
    Neg(Operand),
    Call(fn(f64) -> f64, Operand),
    Add(Operand, Operand),
    Sub(Operand, Operand),
    Mul(Operand, Operand),
    Div(Operand, Operand),
    Pow(Operand, Operand),
}

#[derive(Debug, Clone)]
pub struct NativeF64Expression {
    constants: Vec<f64>,
    code: Vec<NativeOp>,
    result: Operand,
    layout: ArgumentLayout<f64>,
}

impl NativeF64Expression {
    #[inline]
    fn read(&self, operand: Operand, arguments: &[f64], registers: &[f64]) -> f64 {
        match operand {
            Operand::Constant(slot) => self.constants[slot as usize],
            Operand::Argument(slot) => arguments[slot as usize],
            Operand::Register(slot) => registers[slot as usize],
        }
    }

    fn run(&self, arguments: &[f64]) -> f64 {
        let mut registers: SmallVec<[f64; 32]> = SmallVec::with_capacity(self.code.len());
        for op in &self.code {
            let read = |operand| self.read(operand, arguments, &registers);
            let value = match *op {
                NativeOp::Copy(x) => read(x),
                NativeOp::Neg(x) => -read(x),
                NativeOp::Call(f, x) => f(read(x)),
                NativeOp::Add(a, b) => read(a) + read(b),
                NativeOp::Sub(a, b) => read(a) - read(b),
                NativeOp::Mul(a, b) => read(a) * read(b),
                NativeOp::Div(a, b) => read(a) / read(b),
                NativeOp::Pow(a, b) => read(a).powf(read(b)),
            };
            registers.push(value);
        }
        self.read(self.result, arguments, &registers)
    }

    /// Evaluates the expression for every row of `rows`, each row being a
    /// full argument array.
    pub fn invoke_rows<'a, I>(&self, rows: I) -> EvalResult<Vec<f64>>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        rows.into_iter().map(|row| self.invoke_indexed(row)).collect()
    }
}

impl Expression<f64> for NativeF64Expression {
    fn invoke(&self, arguments: &Bindings<f64>) -> EvalResult<f64> {
        let arguments = self.layout.gather(arguments)?;
        Ok(self.run(&arguments))
    }
}

impl IndexedExpression<f64> for NativeF64Expression {
    fn indexer(&self) -> &SymbolIndexer {
        self.layout.indexer()
    }

    fn invoke_indexed(&self, arguments: &[f64]) -> EvalResult<f64> {
        check_arity(self.layout.arity(), arguments.len())?;
        Ok(self.run(arguments))
    }
}

impl Backend<RealField> for NativeF64Backend {
    type Output = NativeF64Expression;

    fn name(&self) -> &'static str {
        "native-f64"
    }

    fn emit(
        &self,
        procedure: Procedure<f64>,
        layout: ArgumentLayout<f64>,
    ) -> CompileResult<Self::Output> {
        let code = procedure
            .instructions()
            .iter()
            .map(|instruction| match *instruction {
                Instruction::Unary { op, operand, .. } => match op {
                    UnaryOp::Plus => NativeOp::Copy(operand),
                    UnaryOp::Minus => NativeOp::Neg(operand),
                    op => NativeOp::Call(RealField::native_unary(op), operand),
                },
                Instruction::Binary { op, lhs, rhs, .. } => match op {
                    BinaryOp::Add => NativeOp::Add(lhs, rhs),
                    BinaryOp::Sub => NativeOp::Sub(lhs, rhs),
                    BinaryOp::Mul => NativeOp::Mul(lhs, rhs),
                    BinaryOp::Div => NativeOp::Div(lhs, rhs),
                    BinaryOp::Pow => NativeOp::Pow(lhs, rhs),
                },
            })
            .collect();

        Ok(NativeF64Expression {
            constants: procedure.pool().values().to_vec(),
            code,
            result: procedure.result(),
            layout,
        })
    }
}
