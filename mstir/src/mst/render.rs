//! Typeset rendering of an [`Mst`] as LaTeX or MathML.
//!
//! Rendering happens in two steps. [`MathSyntax::of`] decides the layout
//! once: which operands need parentheses (with the printer's precedence
//! table), where `/` becomes a built-up fraction, how `pow` and `exp`
//! become superscripts, and how a real literal is split into
//! `mantissa × 10^exponent`. A [`SyntaxRenderer`] then writes that layout
//! in its own markup.
//!
//! Layout rules
//! - `a / b` is a fraction, except inside an exponent where it stays inline.
//! - `a ^ b` is a superscript; the base is parenthesized unless it is atomic.
//! - `exp(x)` is `e^x`, or the `exp` operator when `x` is already built up.
//! - `asin` and friends print as the inverse of their function (`sin^-1`).
//! - `sqrt` is a radical and `abs` a pair of bars.
//! - `pi` is the Greek letter; infinities use the infinity sign.
//!
//! ```
//! use mstir::parser::parse;
//! let tree = parse("sqrt(x ^ 2 + 1) / 2").unwrap();
//! assert_eq!(tree.to_latex(), r"\frac{\sqrt{x^{2}+1}}{2}");
//! ```

use std::str::FromStr;

use crate::{
    mst::{
        Mst,
        pretty::{ATOM, POWER, PREFIX, PRODUCT, SUM, precedence},
    },
    number::Number,
    ops::{BinaryOp, UnaryOp},
};

const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialSymbol {
    Pi,
    Infinity,
    NotANumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Times,
    /// Inline division.
    Slash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionName {
    /// A function with its own typeset name, such as `sin` or `ln`.
    Builtin(&'static str),
    /// Inverse of a builtin, typeset with a `-1` superscript.
    Inverse(&'static str),
    Named(String),
}

/// Layout of a tree, independent of the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathSyntax {
    /// Unsigned literal text.
    Number(String),
    Symbol(String),
    Special(SpecialSymbol),
    Parenthesized(Box<MathSyntax>),
    Prefix {
        negative: bool,
        operand: Box<MathSyntax>,
    },
    Infix {
        operator: InfixOperator,
        left: Box<MathSyntax>,
        right: Box<MathSyntax>,
    },
    Fraction {
        numerator: Box<MathSyntax>,
        denominator: Box<MathSyntax>,
    },
    Superscript {
        base: Box<MathSyntax>,
        exponent: Box<MathSyntax>,
    },
    Radical(Box<MathSyntax>),
    Abs(Box<MathSyntax>),
    Function {
        name: FunctionName,
        arguments: Vec<MathSyntax>,
    },
}

// Reals outside this range print as `mantissa × 10^exponent`.
fn is_scientific(value: f64) -> bool {
    value.is_finite() && value != 0.0 && !(1e-5..1e16).contains(&value.abs())
}

fn rank(tree: &Mst, inline: bool) -> u8 {
    match tree {
        Mst::Constant(Number::Real(value)) if is_scientific(*value) => PRODUCT,
        Mst::Binary { operation, .. }
            if !inline && matches!(BinaryOp::from_str(operation), Ok(BinaryOp::Div)) =>
        {
            POWER
        }
        Mst::Unary { operation, operand }
            if matches!(UnaryOp::from_str(operation), Ok(UnaryOp::Exp)) && !is_built_up(operand) =>
        {
            POWER
        }
        _ => precedence(tree),
    }
}

/// Whether `tree` contains a fraction, superscript or radical.
fn is_built_up(tree: &Mst) -> bool {
    match tree {
        Mst::Constant(Number::Real(value)) => is_scientific(*value),
        Mst::Constant(_) | Mst::Symbol(_) => false,
        Mst::Unary { operation, operand } => {
            matches!(
                UnaryOp::from_str(operation),
                Ok(UnaryOp::Sqrt | UnaryOp::Exp)
            ) || is_built_up(operand)
        }
        Mst::Binary {
            operation,
            left,
            right,
        } => {
            matches!(
                BinaryOp::from_str(operation),
                Ok(BinaryOp::Div | BinaryOp::Pow)
            ) || is_built_up(left)
                || is_built_up(right)
        }
    }
}

fn unsigned_real(value: f64) -> MathSyntax {
    if value.is_nan() {
        return MathSyntax::Special(SpecialSymbol::NotANumber);
    }
    if value.is_infinite() {
        return MathSyntax::Special(SpecialSymbol::Infinity);
    }
    if !is_scientific(value) {
        return MathSyntax::Number(format!("{value}"));
    }
    let text = format!("{value:e}");
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    let exponent = match exponent.strip_prefix('-') {
        Some(digits) => MathSyntax::Prefix {
            negative: true,
            operand: Box::new(MathSyntax::Number(digits.to_owned())),
        },
        None => MathSyntax::Number(exponent.to_owned()),
    };
    MathSyntax::Infix {
        operator: InfixOperator::Times,
        left: Box::new(MathSyntax::Number(mantissa.to_owned())),
        right: Box::new(MathSyntax::Superscript {
            base: Box::new(MathSyntax::Number("10".to_owned())),
            exponent: Box::new(exponent),
        }),
    }
}

fn number(value: &Number) -> MathSyntax {
    let magnitude = match value {
        Number::Integer(value) => MathSyntax::Number(value.magnitude().to_string()),
        Number::Real(value) if value.is_nan() => return unsigned_real(*value),
        Number::Real(value) => unsigned_real(value.abs()),
    };
    if value.is_negative() {
        MathSyntax::Prefix {
            negative: true,
            operand: Box::new(magnitude),
        }
    } else {
        magnitude
    }
}

fn function_name(op: UnaryOp) -> FunctionName {
    match op {
        UnaryOp::Asin => FunctionName::Inverse("sin"),
        UnaryOp::Acos => FunctionName::Inverse("cos"),
        UnaryOp::Atan => FunctionName::Inverse("tan"),
        UnaryOp::Asinh => FunctionName::Inverse("sinh"),
        UnaryOp::Acosh => FunctionName::Inverse("cosh"),
        UnaryOp::Atanh => FunctionName::Inverse("tanh"),
        op => FunctionName::Builtin(op.name()),
    }
}

fn syntax_at(tree: &Mst, min: u8, inline: bool) -> MathSyntax {
    let at = |tree: &Mst, min: u8| Box::new(syntax_at(tree, min, inline));
    let syntax = match tree {
        Mst::Constant(value) => number(value),
        Mst::Symbol(symbol) if symbol.identity() == "pi" => {
            MathSyntax::Special(SpecialSymbol::Pi)
        }
        Mst::Symbol(symbol) => MathSyntax::Symbol(symbol.identity().to_owned()),
        Mst::Unary { operation, operand } => match UnaryOp::from_str(operation) {
            Ok(op @ (UnaryOp::Plus | UnaryOp::Minus)) => MathSyntax::Prefix {
                negative: op == UnaryOp::Minus,
                operand: at(operand, PREFIX),
            },
            Ok(UnaryOp::Sqrt) => MathSyntax::Radical(at(operand, SUM)),
            Ok(UnaryOp::Abs) => MathSyntax::Abs(at(operand, SUM)),
            Ok(UnaryOp::Exp) if !is_built_up(operand) => MathSyntax::Superscript {
                base: Box::new(MathSyntax::Symbol("e".to_owned())),
                exponent: Box::new(syntax_at(operand, SUM, true)),
            },
            Ok(op) => MathSyntax::Function {
                name: function_name(op),
                arguments: vec![syntax_at(operand, SUM, inline)],
            },
            Err(_) => MathSyntax::Function {
                name: FunctionName::Named(operation.clone()),
                arguments: vec![syntax_at(operand, SUM, inline)],
            },
        },
        Mst::Binary {
            operation,
            left,
            right,
        } => match BinaryOp::from_str(operation) {
            Ok(op @ (BinaryOp::Add | BinaryOp::Sub)) => MathSyntax::Infix {
                operator: if op == BinaryOp::Add {
                    InfixOperator::Plus
                } else {
                    InfixOperator::Minus
                },
                left: at(left, SUM),
                right: at(right, PRODUCT),
            },
            Ok(BinaryOp::Mul) => MathSyntax::Infix {
                operator: InfixOperator::Times,
                left: at(left, PRODUCT),
                right: at(right, PREFIX),
            },
            Ok(BinaryOp::Div) if inline => MathSyntax::Infix {
                operator: InfixOperator::Slash,
                left: at(left, PRODUCT),
                right: at(right, PREFIX),
            },
            Ok(BinaryOp::Div) => MathSyntax::Fraction {
                numerator: Box::new(syntax_at(left, SUM, false)),
                denominator: Box::new(syntax_at(right, SUM, false)),
            },
            Ok(BinaryOp::Pow) => MathSyntax::Superscript {
                base: at(left, ATOM),
                exponent: Box::new(syntax_at(right, SUM, true)),
            },
            Err(_) => MathSyntax::Function {
                name: FunctionName::Named(operation.clone()),
                arguments: vec![syntax_at(left, SUM, inline), syntax_at(right, SUM, inline)],
            },
        },
    };

    if rank(tree, inline) < min {
        MathSyntax::Parenthesized(Box::new(syntax))
    } else {
        syntax
    }
}

impl MathSyntax {
    pub fn of(tree: &Mst) -> Self {
        syntax_at(tree, SUM, false)
    }
}

/// Markup for a [`MathSyntax`].
pub trait SyntaxRenderer {
    fn render(&self, syntax: &MathSyntax, out: &mut String);

    fn render_to_string(&self, syntax: &MathSyntax) -> String {
        let mut out = String::new();
        self.render(syntax, &mut out);
        out
    }
}

/// LaTeX math-mode markup, without surrounding `$`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexRenderer;

fn latex_escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '_' | '#' | '$' | '%' | '&' | '{' | '}') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

const LATEX_FUNCTIONS: [&str; 8] = ["sin", "cos", "tan", "sinh", "cosh", "tanh", "exp", "ln"];

impl LatexRenderer {
    fn function_name(name: &str, out: &mut String) {
        if LATEX_FUNCTIONS.contains(&name) {
            out.push('\\');
            out.push_str(name);
        } else {
            out.push_str(r"\operatorname{");
            out.push_str(&latex_escape(name));
            out.push('}');
        }
    }

    // Keeps a control word such as `\times` from swallowing a following letter.
    fn command_then(&self, command: &str, next: &MathSyntax, out: &mut String) {
        let next = self.render_to_string(next);
        out.push_str(command);
        if next.starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.push(' ');
        }
        out.push_str(&next);
    }
}

impl SyntaxRenderer for LatexRenderer {
    fn render(&self, syntax: &MathSyntax, out: &mut String) {
        match syntax {
            MathSyntax::Number(text) => out.push_str(text),
            MathSyntax::Symbol(name) if name.chars().count() == 1 => out.push_str(&latex_escape(name)),
            MathSyntax::Symbol(name) => {
                out.push_str(r"\mathrm{");
                out.push_str(&latex_escape(name));
                out.push('}');
            }
            MathSyntax::Special(SpecialSymbol::Pi) => out.push_str(r"\pi"),
            MathSyntax::Special(SpecialSymbol::Infinity) => out.push_str(r"\infty"),
            MathSyntax::Special(SpecialSymbol::NotANumber) => out.push_str(r"\mathrm{NaN}"),
            MathSyntax::Parenthesized(inner) => {
                out.push_str(r"\left(");
                self.render(inner, out);
                out.push_str(r"\right)");
            }
            MathSyntax::Prefix { negative, operand } => {
                out.push(if *negative { '-' } else { '+' });
                self.render(operand, out);
            }
            MathSyntax::Infix {
                operator,
                left,
                right,
            } => {
                self.render(left, out);
                match operator {
                    InfixOperator::Plus => out.push('+'),
                    InfixOperator::Minus => out.push('-'),
                    InfixOperator::Slash => out.push('/'),
                    InfixOperator::Times => return self.command_then(r"\times", right, out),
                }
                self.render(right, out);
            }
            MathSyntax::Fraction {
                numerator,
                denominator,
            } => {
                out.push_str(r"\frac{");
                self.render(numerator, out);
                out.push_str("}{");
                self.render(denominator, out);
                out.push('}');
            }
            MathSyntax::Superscript { base, exponent } => {
                self.render(base, out);
                out.push_str("^{");
                self.render(exponent, out);
                out.push('}');
            }
            MathSyntax::Radical(operand) => {
                out.push_str(r"\sqrt{");
                self.render(operand, out);
                out.push('}');
            }
            MathSyntax::Abs(operand) => {
                out.push_str(r"\left|");
                self.render(operand, out);
                out.push_str(r"\right|");
            }
            MathSyntax::Function { name, arguments } => {
                match name {
                    FunctionName::Builtin(name) => Self::function_name(name, out),
                    FunctionName::Inverse(name) => {
                        Self::function_name(name, out);
                        out.push_str("^{-1}");
                    }
                    FunctionName::Named(name) => Self::function_name(name, out),
                }
                out.push_str(r"\left(");
                for (k, argument) in arguments.iter().enumerate() {
                    if k > 0 {
                        out.push(',');
                    }
                    self.render(argument, out);
                }
                out.push_str(r"\right)");
            }
        }
    }
}

/// Presentation MathML. Every syntax node renders as exactly one element.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathMlRenderer;

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn tag(out: &mut String, name: &str, body: impl FnOnce(&mut String)) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    body(out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn leaf(out: &mut String, name: &str, text: &str) {
    tag(out, name, |out| out.push_str(text));
}

impl MathMlRenderer {
    /// Wraps the rendered syntax in a `<math>` root element.
    pub fn document(&self, syntax: &MathSyntax) -> String {
        let mut out = format!("<math xmlns=\"{MATHML_NAMESPACE}\">");
        self.render(syntax, &mut out);
        out.push_str("</math>");
        out
    }

    fn parenthesized(&self, out: &mut String, body: impl FnOnce(&mut String)) {
        tag(out, "mrow", |out| {
            leaf(out, "mo", "(");
            body(out);
            leaf(out, "mo", ")");
        });
    }
}

impl SyntaxRenderer for MathMlRenderer {
    fn render(&self, syntax: &MathSyntax, out: &mut String) {
        match syntax {
            MathSyntax::Number(text) => leaf(out, "mn", text),
            MathSyntax::Symbol(name) => leaf(out, "mi", &xml_escape(name)),
            MathSyntax::Special(SpecialSymbol::Pi) => leaf(out, "mi", "&#x3C0;"),
            MathSyntax::Special(SpecialSymbol::Infinity) => leaf(out, "mi", "&#x221E;"),
            MathSyntax::Special(SpecialSymbol::NotANumber) => leaf(out, "mi", "NaN"),
            MathSyntax::Parenthesized(inner) => {
                self.parenthesized(out, |out| self.render(inner, out))
            }
            MathSyntax::Prefix { negative, operand } => tag(out, "mrow", |out| {
                leaf(out, "mo", if *negative { "-" } else { "+" });
                self.render(operand, out);
            }),
            MathSyntax::Infix {
                operator,
                left,
                right,
            } => tag(out, "mrow", |out| {
                self.render(left, out);
                let symbol = match operator {
                    InfixOperator::Plus => "+",
                    InfixOperator::Minus => "-",
                    InfixOperator::Times => "&#xD7;",
                    InfixOperator::Slash => "/",
                };
                leaf(out, "mo", symbol);
                self.render(right, out);
            }),
            MathSyntax::Fraction {
                numerator,
                denominator,
            } => tag(out, "mfrac", |out| {
                self.render(numerator, out);
                self.render(denominator, out);
            }),
            MathSyntax::Superscript { base, exponent } => tag(out, "msup", |out| {
                self.render(base, out);
                self.render(exponent, out);
            }),
            MathSyntax::Radical(operand) => tag(out, "msqrt", |out| self.render(operand, out)),
            MathSyntax::Abs(operand) => tag(out, "mrow", |out| {
                leaf(out, "mo", "|");
                self.render(operand, out);
                leaf(out, "mo", "|");
            }),
            MathSyntax::Function { name, arguments } => tag(out, "mrow", |out| {
                match name {
                    FunctionName::Builtin(name) => leaf(out, "mi", name),
                    FunctionName::Inverse(name) => tag(out, "msup", |out| {
                        leaf(out, "mi", name);
                        tag(out, "mrow", |out| {
                            leaf(out, "mo", "-");
                            leaf(out, "mn", "1");
                        });
                    }),
                    FunctionName::Named(name) => leaf(out, "mi", &xml_escape(name)),
                }
                // Function application.
                leaf(out, "mo", "&#x2061;");
                self.parenthesized(out, |out| {
                    for (k, argument) in arguments.iter().enumerate() {
                        if k > 0 {
                            leaf(out, "mo", ",");
                        }
                        self.render(argument, out);
                    }
                });
            }),
        }
    }
}

impl Mst {
    /// LaTeX math-mode rendering of the tree.
    pub fn to_latex(&self) -> String {
        LatexRenderer.render_to_string(&MathSyntax::of(self))
    }

    /// MathML rendering of the tree, as a `<math>` element.
    pub fn to_mathml(&self) -> String {
        MathMlRenderer.document(&MathSyntax::of(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_reals_split_their_exponent() {
        assert_eq!(Mst::number(1.5e-7).to_latex(), r"1.5\times10^{-7}");
        assert_eq!(Mst::number(2e20).to_latex(), r"2\times10^{20}");
        assert_eq!(Mst::number(0.25).to_latex(), "0.25");
        assert_eq!(Mst::number(2.0).to_latex(), "2");
        // Wrapped where a product would bind differently.
        assert_eq!(
            Mst::number(1.5e-7).pow(Mst::symbol("x")).to_latex(),
            r"\left(1.5\times10^{-7}\right)^{x}"
        );
    }

    #[test]
    fn special_values() {
        assert_eq!(Mst::number(f64::INFINITY).to_latex(), r"\infty");
        assert_eq!(Mst::number(f64::NEG_INFINITY).to_latex(), r"-\infty");
        assert_eq!(Mst::number(f64::NAN).to_latex(), r"\mathrm{NaN}");
        assert_eq!(Mst::number(-3).to_latex(), "-3");
    }

    #[test]
    fn layout_is_shared_between_renderers() {
        let syntax = MathSyntax::of(&(Mst::symbol("x") / 2));
        assert_eq!(
            syntax,
            MathSyntax::Fraction {
                numerator: Box::new(MathSyntax::Symbol("x".to_owned())),
                denominator: Box::new(MathSyntax::Number("2".to_owned())),
            }
        );
        assert_eq!(LatexRenderer.render_to_string(&syntax), r"\frac{x}{2}");
        assert_eq!(
            MathMlRenderer.render_to_string(&syntax),
            "<mfrac><mi>x</mi><mn>2</mn></mfrac>"
        );
    }
}
