//! Constant folding into an operation-resolved arena tree.
//!
//! Folding walks an [`Mst`] bottom-up against an algebra. Every subtree that
//! contains no symbol is evaluated once and replaced by its value; the other
//! nodes keep their shape but have their operation resolved to a kind and a
//! function. The result is a [`TypedMst`]:
//!
//! - [`TypedMst::Constant`] when the whole tree reduced to one value;
//! - [`TypedMst::Node`] otherwise, holding a [`TypedTree`] arena.
//!
//! Arena layout
//! - Nodes are stored in post-order: a node's children always have smaller
//!   ids than the node itself, and the operations of the left subtree precede
//!   those of the right one.
//! - Reduced children of a surviving node appear as [`TypedNode::Constant`].
//!
//! Folding is idempotent: folding a [`TypedMst`] again yields an equal tree.
//!
//! Folding an [`Mst`] recurses along its height. Everything downstream of the
//! arena (refolding, [`TypedTree::interpret`], lowering) walks the nodes in
//! order and works at any depth.
//!
//! ```
//! use mstir::{algebra::RealField, fold::{ConstantFolding, TypedMst}, parser::parse};
//! let folded = parse("x * (2 + 3)").unwrap().evaluate_constants(&RealField).unwrap();
//! let TypedMst::Node(tree) = &folded else { panic!("x keeps the tree alive") };
//! assert_eq!(tree.len(), 3); // x, 5.0, *
//! ```

use std::fmt;

use crate::{
    algebra::{Algebra, BinaryFn, UnaryFn},
    error::EvalResult,
    expression::Bindings,
    interpreter::lookup,
    mst::Mst,
    number::Number,
    ops::{BinaryOp, UnaryOp},
    symbol::{Symbol, SymbolIndexer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

#[derive(Clone)]
pub enum TypedNode<T> {
    /// Reduced value. `number` keeps the source literal when the value came
    /// straight from one.
    Constant { value: T, number: Option<Number> },
    Variable(Symbol),
    Unary {
        operation: UnaryOp,
        function: UnaryFn<T>,
        operand: NodeId,
    },
    Binary {
        operation: BinaryOp,
        function: BinaryFn<T>,
        left: NodeId,
        right: NodeId,
    },
}

impl<T: fmt::Debug> fmt::Debug for TypedNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedNode::Constant { value, .. } => write!(f, "const {value:?}"),
            TypedNode::Variable(symbol) => write!(f, "var {symbol}"),
            TypedNode::Unary {
                operation, operand, ..
            } => write!(f, "{operation} {operand}"),
            TypedNode::Binary {
                operation,
                left,
                right,
                ..
            } => write!(f, "{operation} {left}, {right}"),
        }
    }
}

// Functions are derived from the operation kind, so comparing kinds is enough.
impl<T: PartialEq> PartialEq for TypedNode<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                TypedNode::Constant { value, number },
                TypedNode::Constant {
                    value: other_value,
                    number: other_number,
                },
            ) => value == other_value && number == other_number,
            (TypedNode::Variable(a), TypedNode::Variable(b)) => a == b,
            (
                TypedNode::Unary {
                    operation, operand, ..
                },
                TypedNode::Unary {
                    operation: other_operation,
                    operand: other_operand,
                    ..
                },
            ) => operation == other_operation && operand == other_operand,
            (
                TypedNode::Binary {
                    operation,
                    left,
                    right,
                    ..
                },
                TypedNode::Binary {
                    operation: other_operation,
                    left: other_left,
                    right: other_right,
                    ..
                },
            ) => operation == other_operation && left == other_left && right == other_right,
            _ => false,
        }
    }
}

/// Arena of [`TypedNode`]s in post-order with a designated root.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedTree<T> {
    nodes: Vec<TypedNode<T>>,
    root: NodeId,
}

impl<T: Clone> TypedTree<T> {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &TypedNode<T> {
        &self.nodes[id.index()]
    }

    /// All nodes, children before parents.
    pub fn nodes(&self) -> &[TypedNode<T>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Free symbols in order of first appearance.
    pub fn indexer(&self) -> SymbolIndexer {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                TypedNode::Variable(symbol) => Some(symbol.clone()),
                _ => None,
            })
            .collect()
    }

    /// Evaluates the tree. `algebra` only supplies defaults for unbound
    /// symbols; operations were resolved during folding.
    ///
    /// The arena is walked front to back, so evaluation needs no recursion
    /// however deep the tree is.
    pub fn interpret<A>(&self, algebra: &A, bindings: &Bindings<T>) -> EvalResult<T>
    where
        A: Algebra<Elem = T>,
    {
        let mut values: Vec<T> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let value = match node {
                TypedNode::Constant { value, .. } => value.clone(),
                TypedNode::Variable(symbol) => lookup(algebra, bindings, symbol)?,
                TypedNode::Unary {
                    function, operand, ..
                } => function(&values[operand.index()])?,
                TypedNode::Binary {
                    function,
                    left,
                    right,
                    ..
                } => function(&values[left.index()], &values[right.index()])?,
            };
            values.push(value);
        }
        Ok(values.swap_remove(self.root.index()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedMst<T> {
    /// The whole tree reduced to a single value.
    Constant { value: T, number: Option<Number> },
    Node(TypedTree<T>),
}

impl<T: Clone> TypedMst<T> {
    /// The folded value, if the tree had no free symbol.
    pub fn value(&self) -> Option<&T> {
        match self {
            TypedMst::Constant { value, .. } => Some(value),
            TypedMst::Node(_) => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, TypedMst::Constant { .. })
    }

    pub fn indexer(&self) -> SymbolIndexer {
        match self {
            TypedMst::Constant { .. } => SymbolIndexer::default(),
            TypedMst::Node(tree) => tree.indexer(),
        }
    }

    pub fn interpret<A>(&self, algebra: &A, bindings: &Bindings<T>) -> EvalResult<T>
    where
        A: Algebra<Elem = T>,
    {
        match self {
            TypedMst::Constant { value, .. } => Ok(value.clone()),
            TypedMst::Node(tree) => tree.interpret(algebra, bindings),
        }
    }
}

/// Trees that can be constant-folded against an algebra.
pub trait ConstantFolding<A: Algebra> {
    fn evaluate_constants(&self, algebra: &A) -> EvalResult<TypedMst<A::Elem>>;
}

impl<A: Algebra> ConstantFolding<A> for Mst {
    fn evaluate_constants(&self, algebra: &A) -> EvalResult<TypedMst<A::Elem>> {
        let mut folder = Folder::new(algebra, true);
        let root = folder.visit_mst(self)?;
        Ok(folder.finish(root))
    }
}

impl<A: Algebra> ConstantFolding<A> for TypedMst<A::Elem> {
    fn evaluate_constants(&self, algebra: &A) -> EvalResult<TypedMst<A::Elem>> {
        match self {
            TypedMst::Constant { .. } => Ok(self.clone()),
            TypedMst::Node(tree) => {
                let mut folder = Folder::new(algebra, true);
                let root = folder.visit_typed(tree)?;
                Ok(folder.finish(root))
            }
        }
    }
}

/// Resolves every operation of `tree` without folding anything.
///
/// Literals stay separate constant nodes; only a tree that *is* a single
/// literal becomes a [`TypedMst::Constant`].
pub fn lift<A: Algebra>(tree: &Mst, algebra: &A) -> EvalResult<TypedMst<A::Elem>> {
    let mut folder = Folder::new(algebra, false);
    let root = folder.visit_mst(tree)?;
    Ok(folder.finish(root))
}

#[derive(Clone)]
enum Reduced<T> {
    Value { value: T, number: Option<Number> },
    Node(NodeId),
}

struct Folder<'a, A: Algebra> {
    algebra: &'a A,
    nodes: Vec<TypedNode<A::Elem>>,
    fold: bool,
}

impl<'a, A: Algebra> Folder<'a, A> {
    fn new(algebra: &'a A, fold: bool) -> Self {
        Folder {
            algebra,
            nodes: Vec::new(),
            fold,
        }
    }

    fn push(&mut self, node: TypedNode<A::Elem>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn materialize(&mut self, reduced: Reduced<A::Elem>) -> NodeId {
        match reduced {
            Reduced::Value { value, number } => self.push(TypedNode::Constant { value, number }),
            Reduced::Node(id) => id,
        }
    }

    fn unary(
        &mut self,
        operation: UnaryOp,
        function: UnaryFn<A::Elem>,
        operand: Reduced<A::Elem>,
    ) -> EvalResult<Reduced<A::Elem>> {
        match operand {
            Reduced::Value { value, .. } if self.fold => {
                log::trace!("folding unary `{operation}`");
                Ok(Reduced::Value {
                    value: function(&value)?,
                    number: None,
                })
            }
            operand => {
                let operand = self.materialize(operand);
                Ok(Reduced::Node(self.push(TypedNode::Unary {
                    operation,
                    function,
                    operand,
                })))
            }
        }
    }

    fn binary(
        &mut self,
        operation: BinaryOp,
        function: BinaryFn<A::Elem>,
        left: Reduced<A::Elem>,
        right: Reduced<A::Elem>,
    ) -> EvalResult<Reduced<A::Elem>> {
        match (left, right) {
            (Reduced::Value { value: l, .. }, Reduced::Value { value: r, .. }) if self.fold => {
                log::trace!("folding binary `{operation}`");
                Ok(Reduced::Value {
                    value: function(&l, &r)?,
                    number: None,
                })
            }
            (left, right) => {
                let left = self.materialize(left);
                let right = self.materialize(right);
                Ok(Reduced::Node(self.push(TypedNode::Binary {
                    operation,
                    function,
                    left,
                    right,
                })))
            }
        }
    }

    fn visit_mst(&mut self, tree: &Mst) -> EvalResult<Reduced<A::Elem>> {
        match tree {
            Mst::Constant(number) => Ok(Reduced::Value {
                value: self.algebra.number(number)?,
                number: Some(number.clone()),
            }),
            Mst::Symbol(symbol) => Ok(Reduced::Node(self.push(TypedNode::Variable(symbol.clone())))),
            Mst::Unary { operation, operand } => {
                let (op, function) = self.algebra.resolve_unary(operation)?;
                let operand = self.visit_mst(operand)?;
                self.unary(op, function, operand)
            }
            Mst::Binary {
                operation,
                left,
                right,
            } => {
                let (op, function) = self.algebra.resolve_binary(operation)?;
                let left = self.visit_mst(left)?;
                let right = self.visit_mst(right)?;
                self.binary(op, function, left, right)
            }
        }
    }

    /// Refolds an arena in one pass over its nodes.
    fn visit_typed(&mut self, tree: &TypedTree<A::Elem>) -> EvalResult<Reduced<A::Elem>> {
        let mut reduced: Vec<Reduced<A::Elem>> = Vec::with_capacity(tree.len());
        for node in tree.nodes() {
            let next = match node {
                TypedNode::Constant { value, number } => Reduced::Value {
                    value: value.clone(),
                    number: number.clone(),
                },
                TypedNode::Variable(symbol) => {
                    Reduced::Node(self.push(TypedNode::Variable(symbol.clone())))
                }
                TypedNode::Unary {
                    operation,
                    function,
                    operand,
                } => {
                    let operand = reduced[operand.index()].clone();
                    self.unary(*operation, function.clone(), operand)?
                }
                TypedNode::Binary {
                    operation,
                    function,
                    left,
                    right,
                } => {
                    let left = reduced[left.index()].clone();
                    let right = reduced[right.index()].clone();
                    self.binary(*operation, function.clone(), left, right)?
                }
            };
            reduced.push(next);
        }
        Ok(reduced.swap_remove(tree.root.index()))
    }

    fn finish(self, root: Reduced<A::Elem>) -> TypedMst<A::Elem> {
        match root {
            Reduced::Value { value, number } => {
                log::debug!("{} tree folded to a constant", self.algebra.name());
                TypedMst::Constant { value, number }
            }
            Reduced::Node(root) => {
                log::debug!(
                    "{} tree folded to {} nodes",
                    self.algebra.name(),
                    self.nodes.len()
                );
                TypedMst::Node(TypedTree {
                    nodes: self.nodes,
                    root,
                })
            }
        }
    }
}
