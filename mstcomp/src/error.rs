use mstir::{
    error::{EvalError, ParseError},
    symbol::Symbol,
};
use strum::EnumIs;
use thiserror::Error;

/// Failures detected while lowering or emitting a compiled expression.
///
/// Every lowering failure is reported here, before any expression is handed
/// out.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum CompileError {
    #[error(
        "symbol `{symbol}` is neither an argument of the expression nor bound by the algebra"
    )]
    UnboundSymbol { symbol: Symbol },

    #[error("operation `{name}` is not supported by algebra `{algebra}`")]
    UnsupportedOperation { name: String, algebra: &'static str },

    #[error("literal `{literal}` cannot be represented in algebra `{algebra}`")]
    InvalidLiteral {
        literal: String,
        algebra: &'static str,
    },

    #[error("lowering failed: {reason}")]
    Lowering { reason: String },
}

impl CompileError {
    pub fn lowering(reason: impl Into<String>) -> Self {
        CompileError::Lowering {
            reason: reason.into(),
        }
    }

    /// Human-readable reason, as carried by every variant.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<EvalError> for CompileError {
    fn from(error: EvalError) -> Self {
        match error {
            EvalError::UnboundSymbol { symbol } => CompileError::UnboundSymbol { symbol },
            EvalError::UnsupportedOperation { name, algebra } => {
                CompileError::UnsupportedOperation { name, algebra }
            }
            EvalError::InvalidLiteral { literal, algebra } => {
                CompileError::InvalidLiteral { literal, algebra }
            }
            other => CompileError::lowering(other.to_string()),
        }
    }
}

/// Any failure of the text-to-expression pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("backend `{backend}` cannot compile for algebra `{algebra}`")]
    UnsupportedBackend {
        backend: String,
        algebra: &'static str,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file '{file}': {source}")]
    ConfigParseError {
        source: toml::de::Error,
        file: String,
    },

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
}

pub type CompileResult<T> = Result<T, CompileError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
