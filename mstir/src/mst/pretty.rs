//! Infix pretty-printer for [`Mst`] built on `pretty::RcDoc`.
//!
//! The printer mirrors the parser's precedence table and inserts parentheses
//! only where reading the text back would otherwise build a different tree,
//! so `parse(tree.to_string()) == tree` holds for every parsed tree.
//! Operation names outside the infix vocabulary print in call syntax
//! (`sin(x)`, `atan2(y, x)`).

use std::{fmt, str::FromStr};

use pretty::RcDoc;

use crate::{
    mst::Mst,
    ops::{BinaryOp, UnaryOp},
};

pub(super) const SUM: u8 = 1;
pub(super) const PRODUCT: u8 = 2;
pub(super) const PREFIX: u8 = 3;
pub(super) const POWER: u8 = 4;
pub(super) const ATOM: u8 = 5;

// Wide enough that `Display` never breaks a line in practice.
const DISPLAY_WIDTH: usize = 1 << 20;

pub(super) fn precedence(tree: &Mst) -> u8 {
    match tree {
        Mst::Constant(value) if value.is_negative() => PREFIX,
        Mst::Constant(_) | Mst::Symbol(_) => ATOM,
        Mst::Unary { operation, .. } => match UnaryOp::from_str(operation) {
            Ok(op) if op.is_prefix() => PREFIX,
            _ => ATOM,
        },
        Mst::Binary { operation, .. } => match BinaryOp::from_str(operation) {
            Ok(BinaryOp::Add | BinaryOp::Sub) => SUM,
            Ok(BinaryOp::Mul | BinaryOp::Div) => PRODUCT,
            Ok(BinaryOp::Pow) => POWER,
            Err(_) => ATOM,
        },
    }
}

fn call(name: &str, args: Vec<RcDoc<'static>>) -> RcDoc<'static> {
    RcDoc::text(name.to_owned())
        .append("(")
        .append(RcDoc::intersperse(args, RcDoc::text(", ")))
        .append(")")
}

fn doc_at(tree: &Mst, min: u8) -> RcDoc<'static> {
    let doc = match tree {
        Mst::Constant(value) => RcDoc::as_string(value),
        Mst::Symbol(symbol) => RcDoc::as_string(symbol),
        Mst::Unary { operation, operand } => match UnaryOp::from_str(operation) {
            Ok(op) if op.is_prefix() => RcDoc::text(op.name()).append(doc_at(operand, PREFIX)),
            _ => call(operation, vec![doc_at(operand, SUM)]),
        },
        Mst::Binary {
            operation,
            left,
            right,
        } => match BinaryOp::from_str(operation) {
            Ok(op @ (BinaryOp::Add | BinaryOp::Sub)) => infix(op, left, SUM, right, PRODUCT),
            Ok(op @ (BinaryOp::Mul | BinaryOp::Div)) => infix(op, left, PRODUCT, right, PREFIX),
            Ok(BinaryOp::Pow) => doc_at(left, ATOM)
                .append(" ^ ")
                .append(doc_at(right, PREFIX)),
            Err(_) => call(operation, vec![doc_at(left, SUM), doc_at(right, SUM)]),
        },
    };

    if precedence(tree) < min {
        RcDoc::text("(").append(doc).append(")")
    } else {
        doc
    }
}

fn infix(op: BinaryOp, left: &Mst, left_min: u8, right: &Mst, right_min: u8) -> RcDoc<'static> {
    doc_at(left, left_min)
        .append(RcDoc::line())
        .append(op.symbol())
        .append(" ")
        .append(doc_at(right, right_min))
        .group()
}

impl Mst {
    /// Document form of the tree.
    pub fn to_doc(&self) -> RcDoc<'static> {
        doc_at(self, SUM)
    }

    /// Renders the tree, breaking long sums and products to fit `width`.
    pub fn pretty_string(&self, width: usize) -> String {
        self.to_doc().pretty(width).to_string()
    }
}

impl fmt::Display for Mst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_doc().render_fmt(DISPLAY_WIDTH, f)
    }
}
