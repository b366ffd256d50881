use strum::EnumIs;
use thiserror::Error;

use crate::symbol::Symbol;

/// Failure while turning source text into an [`Mst`](crate::mst::Mst).
///
/// `position` is a character offset into the input. Unexpected end of input
/// reports the length of the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub position: usize,
    pub message: String,
}

/// Errors raised while evaluating or folding an expression against an algebra.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum EvalError {
    #[error("symbol `{symbol}` is not bound and has no default in the algebra")]
    UnboundSymbol { symbol: Symbol },

    #[error("operation `{name}` is not supported by algebra `{algebra}`")]
    UnsupportedOperation { name: String, algebra: &'static str },

    #[error("literal `{literal}` cannot be represented in algebra `{algebra}`")]
    InvalidLiteral {
        literal: String,
        algebra: &'static str,
    },

    #[error("arithmetic failure in `{operation}`: {message}")]
    Arithmetic { operation: String, message: String },

    #[error("expected {expected} arguments, got {found}")]
    ArityMismatch { expected: usize, found: usize },
}

impl EvalError {
    pub fn unsupported(name: impl Into<String>, algebra: &'static str) -> Self {
        EvalError::UnsupportedOperation {
            name: name.into(),
            algebra,
        }
    }

    pub fn arithmetic(operation: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::Arithmetic {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
