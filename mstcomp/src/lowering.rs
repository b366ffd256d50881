//! Lowering of folded trees into a flat, index-addressed procedure.
//!
//! Every backend starts from the same [`Procedure`]:
//! - a [`ConstantPool`] holding each literal value once and each operation
//!   function once per operation kind;
//! - a list of [`Instruction`]s in evaluation order, where instruction `k`
//!   writes register `k`;
//! - the [`Operand`] holding the final result.
//!
//! Operands address the pool, the argument array (by [`SymbolIndexer`] slot)
//! or an earlier register. Lowering walks the post-order arena of a
//! [`TypedTree`] linearly, so left operands are always computed before right
//! ones.

use std::{collections::HashMap, fmt};

use log::trace;
use mstir::{
    algebra::{Algebra, BinaryFn, UnaryFn},
    error::{EvalError, EvalResult},
    expression::Bindings,
    fold::{TypedNode, TypedTree},
    ops::{BinaryOp, UnaryOp},
    symbol::SymbolIndexer,
};
use smallvec::SmallVec;

use crate::error::{CompileError, CompileResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Constant(u32),
    Argument(u32),
    Register(u32),
}

impl Operand {
    /// Reads the operand. `arguments` must have been arity-checked and
    /// `registers` must hold every register written so far.
    #[inline]
    pub fn fetch<'a, T>(self, pool: &'a ConstantPool<T>, arguments: &'a [T], registers: &'a [T]) -> &'a T {
        match self {
            Operand::Constant(slot) => &pool.values[slot as usize],
            Operand::Argument(slot) => &arguments[slot as usize],
            Operand::Register(slot) => &registers[slot as usize],
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(slot) => write!(f, "c{slot}"),
            Operand::Argument(slot) => write!(f, "a{slot}"),
            Operand::Register(slot) => write!(f, "r{slot}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Unary {
        op: UnaryOp,
        function: u32,
        operand: Operand,
    },
    Binary {
        op: BinaryOp,
        function: u32,
        lhs: Operand,
        rhs: Operand,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Unary { op, operand, .. } => write!(f, "{op} {operand}"),
            Instruction::Binary { op, lhs, rhs, .. } => write!(f, "{op} {lhs}, {rhs}"),
        }
    }
}

/// Deduplicated literals and operation functions of one procedure.
///
/// Values are deduplicated with [`Algebra::identical`], so elements that
/// compare equal but behave differently (`0.0` and `-0.0`) keep separate
/// slots.
#[derive(Clone)]
pub struct ConstantPool<T> {
    values: Vec<T>,
    // Slots by `Algebra::fingerprint`.
    buckets: HashMap<u64, SmallVec<[u32; 2]>>,
    unary: Vec<(UnaryOp, UnaryFn<T>)>,
    binary: Vec<(BinaryOp, BinaryFn<T>)>,
}

impl<T> Default for ConstantPool<T> {
    fn default() -> Self {
        ConstantPool {
            values: Vec::new(),
            buckets: HashMap::new(),
            unary: Vec::new(),
            binary: Vec::new(),
        }
    }
}

impl<T> ConstantPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of `value`, adding it if no identical value is pooled yet.
    pub fn value_slot<A: Algebra<Elem = T>>(&mut self, algebra: &A, value: T) -> u32 {
        let bucket = self.buckets.entry(algebra.fingerprint(&value)).or_default();
        if let Some(&slot) = bucket
            .iter()
            .find(|&&slot| algebra.identical(&self.values[slot as usize], &value))
        {
            return slot;
        }
        let slot = self.values.len() as u32;
        bucket.push(slot);
        self.values.push(value);
        slot
    }

    pub fn unary_slot(&mut self, op: UnaryOp, function: &UnaryFn<T>) -> u32 {
        if let Some(slot) = self.unary.iter().position(|(o, _)| *o == op) {
            return slot as u32;
        }
        self.unary.push((op, function.clone()));
        (self.unary.len() - 1) as u32
    }

    pub fn binary_slot(&mut self, op: BinaryOp, function: &BinaryFn<T>) -> u32 {
        if let Some(slot) = self.binary.iter().position(|(o, _)| *o == op) {
            return slot as u32;
        }
        self.binary.push((op, function.clone()));
        (self.binary.len() - 1) as u32
    }

    pub fn value(&self, slot: u32) -> &T {
        &self.values[slot as usize]
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn unary(&self, slot: u32) -> &UnaryFn<T> {
        &self.unary[slot as usize].1
    }

    pub fn binary(&self, slot: u32) -> &BinaryFn<T> {
        &self.binary[slot as usize].1
    }

    /// Number of distinct operation functions.
    pub fn function_count(&self) -> usize {
        self.unary.len() + self.binary.len()
    }
}

impl<T: fmt::Debug> fmt::Debug for ConstantPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantPool")
            .field("values", &self.values)
            .field("unary", &self.unary.iter().map(|(op, _)| op).collect::<Vec<_>>())
            .field("binary", &self.binary.iter().map(|(op, _)| op).collect::<Vec<_>>())
            .finish()
    }
}

/// Lowered form of a tree, shared by all backends.
#[derive(Debug, Clone)]
pub struct Procedure<T> {
    pool: ConstantPool<T>,
    instructions: Vec<Instruction>,
    result: Operand,
}

impl<T> Procedure<T> {
    pub fn pool(&self) -> &ConstantPool<T> {
        &self.pool
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn result(&self) -> Operand {
        self.result
    }
}

impl<T> fmt::Display for Procedure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "r{k} = {instruction}")?;
        }
        write!(f, "ret {}", self.result)
    }
}

/// Argument slots of a compiled expression and the algebra defaults used
/// when a map invocation leaves a slot unbound.
#[derive(Debug, Clone)]
pub struct ArgumentLayout<T> {
    indexer: SymbolIndexer,
    defaults: Vec<Option<T>>,
}

impl<T: Clone> ArgumentLayout<T> {
    pub fn new<A: Algebra<Elem = T>>(indexer: SymbolIndexer, algebra: &A) -> Self {
        let defaults = indexer.iter().map(|s| algebra.bind_symbol(s)).collect();
        ArgumentLayout { indexer, defaults }
    }

    pub fn indexer(&self) -> &SymbolIndexer {
        &self.indexer
    }

    pub fn arity(&self) -> usize {
        self.indexer.len()
    }

    /// Argument array in slot order; unbound slots fall back to their
    /// default, else fail with [`EvalError::UnboundSymbol`].
    pub fn gather(&self, bindings: &Bindings<T>) -> EvalResult<SmallVec<[T; 8]>> {
        self.indexer
            .iter()
            .zip(&self.defaults)
            .map(|(symbol, default)| {
                bindings
                    .get(symbol)
                    .or(default.as_ref())
                    .cloned()
                    .ok_or_else(|| EvalError::UnboundSymbol {
                        symbol: symbol.clone(),
                    })
            })
            .collect()
    }
}

/// Lowers `tree` into a [`Procedure`] whose arguments follow `indexer`.
///
/// Symbols missing from `indexer` become pooled constants when the algebra
/// binds them and fail with [`CompileError::UnboundSymbol`] otherwise.
pub fn lower<A: Algebra>(
    tree: &TypedTree<A::Elem>,
    algebra: &A,
    indexer: &SymbolIndexer,
) -> CompileResult<Procedure<A::Elem>> {
    let mut pool = ConstantPool::new();
    let mut instructions = Vec::new();
    let mut operands: Vec<Operand> = Vec::with_capacity(tree.len());

    let operand_of = |operands: &[Operand], id: mstir::fold::NodeId| {
        operands.get(id.index()).copied().ok_or_else(|| {
            CompileError::lowering(format!("node {id} is used before it is defined"))
        })
    };

    for node in tree.nodes() {
        let operand = match node {
            TypedNode::Constant { value, .. } => Operand::Constant(pool.value_slot(algebra, value.clone())),
            TypedNode::Variable(symbol) => match indexer.try_index(symbol) {
                Some(slot) => Operand::Argument(slot as u32),
                None => {
                    let value = algebra.bind_symbol(symbol).ok_or_else(|| {
                        CompileError::UnboundSymbol {
                            symbol: symbol.clone(),
                        }
                    })?;
                    trace!("pooling default for `{symbol}`");
                    Operand::Constant(pool.value_slot(algebra, value))
                }
            },
            TypedNode::Unary {
                operation,
                function,
                operand,
            } => {
                let instruction = Instruction::Unary {
                    op: *operation,
                    function: pool.unary_slot(*operation, function),
                    operand: operand_of(&operands, *operand)?,
                };
                trace!("r{} = {instruction}", instructions.len());
                instructions.push(instruction);
                Operand::Register((instructions.len() - 1) as u32)
            }
            TypedNode::Binary {
                operation,
                function,
                left,
                right,
            } => {
                let instruction = Instruction::Binary {
                    op: *operation,
                    function: pool.binary_slot(*operation, function),
                    lhs: operand_of(&operands, *left)?,
                    rhs: operand_of(&operands, *right)?,
                };
                trace!("r{} = {instruction}", instructions.len());
                instructions.push(instruction);
                Operand::Register((instructions.len() - 1) as u32)
            }
        };
        operands.push(operand);
    }

    let result = operand_of(&operands, tree.root())?;
    Ok(Procedure {
        pool,
        instructions,
        result,
    })
}

#[cfg(test)]
mod tests {
    use mstir::prelude::*;

    use super::*;

    fn lowered(src: &str, indexer: &SymbolIndexer) -> CompileResult<Procedure<f64>> {
        let TypedMst::Node(tree) = parse(src).unwrap().evaluate_constants(&RealField).unwrap()
        else {
            panic!("`{src}` folded to a constant");
        };
        lower(&tree, &RealField, indexer)
    }

    #[test]
    fn pool_deduplicates_values_and_functions() {
        let indexer = SymbolIndexer::new(["x"]);
        let procedure = lowered("x * 2 + x * 2 + sin(x) + sin(2 * x)", &indexer).unwrap();
        assert_eq!(procedure.pool().values(), &[2.0]);
        // `*`, `+`, `sin`
        assert_eq!(procedure.pool().function_count(), 3);
        assert_eq!(procedure.instructions().len(), 8);
    }

    #[test]
    fn signed_zeros_keep_separate_slots() {
        let indexer = SymbolIndexer::new(["x", "y"]);
        let procedure = lowered("x * 0 + 1 / (y * -0)", &indexer).unwrap();
        let bits: Vec<u64> = procedure.pool().values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits, [0.0f64.to_bits(), 1.0f64.to_bits(), (-0.0f64).to_bits()]);
    }

    #[test]
    fn pool_scales_to_many_distinct_values() {
        let mut pool = ConstantPool::new();
        for k in 0..10_000 {
            assert_eq!(pool.value_slot(&RealField, k as f64), k);
        }
        assert_eq!(pool.value_slot(&RealField, 1234.0), 1234);
        assert_eq!(pool.values().len(), 10_000);
    }

    #[test]
    fn instructions_follow_evaluation_order() {
        let indexer = SymbolIndexer::new(["x", "y"]);
        let procedure = lowered("(x - 1) / (y + 1)", &indexer).unwrap();
        assert_eq!(
            procedure.to_string(),
            "r0 = - a0, c0\nr1 = + a1, c0\nr2 = / r0, r1\nret r2"
        );
    }

    #[test]
    fn unknown_symbols_use_defaults_or_fail() {
        let indexer = SymbolIndexer::new(["x"]);
        let procedure = lowered("x * pi", &indexer).unwrap();
        assert_eq!(procedure.pool().values(), &[std::f64::consts::PI]);

        let err = lowered("x * q", &indexer).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnboundSymbol {
                symbol: Symbol::new("q")
            }
        );
    }

    #[test]
    fn layout_gathers_with_defaults() {
        let layout = ArgumentLayout::new(SymbolIndexer::new(["x", "pi", "y"]), &RealField);
        let args = layout.gather(&bindings! { "x" => 1.0, "y" => 2.0 }).unwrap();
        assert_eq!(args.as_slice(), &[1.0, std::f64::consts::PI, 2.0]);
        assert!(layout.gather(&bindings! { "x" => 1.0 }).is_err());
    }
}
