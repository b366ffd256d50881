//! Builder functions for the named operations of the vocabulary.

use crate::{
    mst::Mst,
    ops::{BinaryOp, UnaryOp},
};

macro_rules! unary_builders {
    ($($name:ident => $op:expr),* $(,)?) => {
        $(
            pub fn $name(operand: impl Into<Mst>) -> Mst {
                Mst::unary($op, operand)
            }
        )*
    };
}

unary_builders! {
    sin => UnaryOp::Sin,
    cos => UnaryOp::Cos,
    tan => UnaryOp::Tan,
    asin => UnaryOp::Asin,
    acos => UnaryOp::Acos,
    atan => UnaryOp::Atan,
    sinh => UnaryOp::Sinh,
    cosh => UnaryOp::Cosh,
    tanh => UnaryOp::Tanh,
    asinh => UnaryOp::Asinh,
    acosh => UnaryOp::Acosh,
    atanh => UnaryOp::Atanh,
    exp => UnaryOp::Exp,
    ln => UnaryOp::Ln,
    sqrt => UnaryOp::Sqrt,
    abs => UnaryOp::Abs,
}

pub fn pow(base: impl Into<Mst>, exponent: impl Into<Mst>) -> Mst {
    Mst::binary(BinaryOp::Pow, base, exponent)
}
