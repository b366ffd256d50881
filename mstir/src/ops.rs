//! Operation vocabulary shared by trees, algebras and backends.
//!
//! Trees carry operation *names*; algebras and compilers resolve them into one
//! of the kinds below exactly once. The canonical spelling (the `Display`
//! form) is the one the parser emits: prefix minus is `-`, `^` is `pow`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum UnaryOp {
    #[strum(to_string = "+")]
    Plus,
    #[strum(to_string = "-", serialize = "neg")]
    Minus,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Exp,
    Ln,
    Sqrt,
    Abs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    #[strum(to_string = "+")]
    Add,
    #[strum(to_string = "-")]
    Sub,
    #[strum(to_string = "*")]
    Mul,
    #[strum(to_string = "/")]
    Div,
    #[strum(to_string = "pow", serialize = "^")]
    Pow,
}

impl UnaryOp {
    /// Name as stored in trees.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Prefix operators print as `-x` instead of `name(x)`.
    pub fn is_prefix(self) -> bool {
        matches!(self, UnaryOp::Plus | UnaryOp::Minus)
    }
}

impl BinaryOp {
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Infix symbol used by the printer.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

impl From<UnaryOp> for String {
    fn from(op: UnaryOp) -> Self {
        op.name().to_owned()
    }
}

impl From<BinaryOp> for String {
    fn from(op: BinaryOp) -> Self {
        op.name().to_owned()
    }
}
