//! Parser for infix algebraic expressions using chumsky.
//!
//! Role
//! - Turn text such as `2 * sin(x) ^ 2 - y / 3` into an [`Mst`].
//! - Mirrors the precedence used by the [printer](crate::mst::pretty) so that
//!   printing and parsing round-trip.
//!
//! Two stages:
//! 1) Tokenisation from the input string to a spanned `Token` stream.
//! 2) Parsing tokens into an `Mst` with precedence climbing.
//!
//! Grammar, loosest first:
//! - Sums: `a + b`, `a - b` (left-associative).
//! - Products: `a * b`, `a / b` (left-associative).
//! - Prefix signs: `-a`, `+a`. A prefix sign binds looser than `^`, so
//!   `-2^2` reads as `-(2^2)`; it may also start an exponent, as in `2^-1`.
//! - Powers: `a ^ b` (right-associative, stored as the `pow` operation).
//! - Calls: `name(a)` is a unary node, `name(a, b)` a binary node.
//! - Atoms: decimal literals (`42`, `4.5`, `1e-3`), identifiers, parentheses.
//!
//! Parsing recurses once per nesting level, as do the other walks over an
//! [`Mst`] (printing, interpretation, folding and dropping). Trees a few
//! thousand levels deep need a thread with a larger stack.
use chumsky::{input::ValueInput, prelude::*};

use crate::{
    error::ParseError,
    mst::Mst,
    number::Number,
    ops::{BinaryOp, UnaryOp},
    symbol::Symbol,
};

pub type Spanned<T> = (T, SimpleSpan);
type Span = SimpleSpan;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(Number),
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret,

    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

// ---------------- Lexer ----------------

fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<Spanned<Token>>, extra::Err<Rich<'a, char>>> {
    let digits = any().filter(|c: &char| c.is_ascii_digit()).repeated();

    let exponent = just('e')
        .or(just('E'))
        .then(just('+').or(just('-')).or_not())
        .then(digits.clone().at_least(1));

    let number = digits
        .clone()
        .at_least(1)
        .then(just('.').then(digits).or_not())
        .then(exponent.or_not())
        .to_slice()
        .try_map(|s: &str, span| {
            Number::parse_literal(s)
                .map(Token::Number)
                .ok_or_else(|| Rich::custom(span, format!("invalid numeric literal '{s}'")))
        });

    let ident = any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated(),
        )
        .to_slice()
        .map(|s: &str| Token::Ident(s.to_owned()));

    let punct = choice((
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('^').to(Token::Caret),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just(',').to(Token::Comma),
    ));

    let token = choice((number, ident, punct));

    token
        .map_with(|tok, e| (tok, e.span()))
        .padded()
        .repeated()
        .collect()
        .then_ignore(end())
}

// ---------------- chumsky parser over tokens ----------------

fn mst_parser<'tokens, I>()
-> impl Parser<'tokens, I, Mst, extra::Err<Rich<'tokens, Token, Span>>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    recursive(|expr| {
        let number = select! { Token::Number(n) => Mst::Constant(n) }.labelled("number");
        let ident = select! { Token::Ident(name) => name }.labelled("identifier");

        let parens = expr
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .labelled("parentheses");

        // name(a) or name(a, b)
        let call = ident
            .clone()
            .then(
                expr.clone()
                    .then(just(Token::Comma).ignore_then(expr.clone()).or_not())
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map(|(name, (first, second))| match second {
                Some(second) => Mst::binary(name, first, second),
                None => Mst::unary(name, first),
            })
            .labelled("call");

        let atom = choice((
            number,
            call,
            ident.map(|name| Mst::Symbol(Symbol::new(&name))),
            parens,
        ))
        .labelled("atom");

        // Prefix signs and right-associative powers are mutually recursive:
        // the exponent of `^` may itself start with a sign.
        let signed = recursive(|signed| {
            let power = atom
                .clone()
                .then(just(Token::Caret).ignore_then(signed.clone()).or_not())
                .map(|(base, exponent)| match exponent {
                    Some(exponent) => Mst::binary(BinaryOp::Pow, base, exponent),
                    None => base,
                })
                .labelled("power");

            let sign = choice((
                just(Token::Minus).to(UnaryOp::Minus),
                just(Token::Plus).to(UnaryOp::Plus),
            ));

            sign.then(signed)
                .map(|(op, operand)| Mst::unary(op, operand))
                .or(power)
                .labelled("unary")
        });

        let product_op = choice((
            just(Token::Star).to(BinaryOp::Mul),
            just(Token::Slash).to(BinaryOp::Div),
        ));
        let product = signed
            .clone()
            .foldl(product_op.then(signed).repeated(), |a, (op, b)| {
                Mst::binary(op, a, b)
            })
            .labelled("product");

        let sum_op = choice((
            just(Token::Plus).to(BinaryOp::Add),
            just(Token::Minus).to(BinaryOp::Sub),
        ));
        product
            .clone()
            .foldl(sum_op.then(product).repeated(), |a, (op, b)| {
                Mst::binary(op, a, b)
            })
            .labelled("sum")
    })
}

// ---------------- Public API ----------------

/// Byte offset of the token at `index`, or the end of input when the
/// parser ran past the last token.
fn token_offset(spans: &[Span], index: usize, input_len: usize) -> usize {
    spans.get(index).map(|s| s.start).unwrap_or(input_len)
}

/// Parse an infix expression into an [`Mst`].
///
/// Returns the first diagnostic as a [`ParseError`] whose `position` is a
/// character offset into `src`. No partial tree is ever returned.
///
/// Example
/// ```
/// use mstir::{mst::Mst, parser::parse};
/// let tree = parse("2 + x ^ 2").unwrap();
/// assert_eq!(tree, Mst::number(2) + Mst::symbol("x").pow(2));
/// assert!(parse("2 +").is_err());
/// ```
pub fn parse(src: &str) -> Result<Mst, ParseError> {
    // Chumsky spans count bytes; positions are reported in characters.
    let to_chars = |byte: usize| src[..byte.min(src.len())].chars().count();

    let (tokens, lex_errs) = lexer().parse(src).into_output_errors();
    if let Some(e) = lex_errs.into_iter().next() {
        return Err(ParseError {
            position: to_chars(e.span().start),
            message: format!("lexing error: {}", e.reason()),
        });
    }
    let Some(tokens) = tokens else {
        return Err(ParseError {
            position: 0,
            message: "lexing error: no tokens produced".to_owned(),
        });
    };

    let plain: Vec<Token> = tokens.iter().map(|(t, _)| t.clone()).collect();
    let spans: Vec<Span> = tokens.iter().map(|(_, s)| *s).collect();

    let (tree, parse_errs) = mst_parser()
        .then_ignore(end())
        .parse(plain.as_slice())
        .into_output_errors();
    if let Some(e) = parse_errs.into_iter().next() {
        return Err(ParseError {
            position: to_chars(token_offset(&spans, e.span().start, src.len())),
            message: format!("parse error: {}", e.reason()),
        });
    }

    tree.ok_or_else(|| ParseError {
        position: src.chars().count(),
        message: "parse error: empty expression".to_owned(),
    })
}
