//! mstcomp: compilation of folded syntax trees into reusable expressions.
//!
//! The back half of the mstkit pipeline. A tree produced by
//! [`mstir`] is folded for an algebra, [lowered](lowering) into a flat
//! procedure and emitted by a [`backend::Backend`]:
//!
//! - [`backend::BytecodeBackend`] runs the procedure on a register file;
//! - [`backend::ClosureBackend`] nests one closure per instruction;
//! - [`backend::NativeF64Backend`] specializes the real field to `f64` opcodes.
//!
//! [`pipeline::Toolchain`] chains every stage according to a
//! [`config::PipelineConfig`], which can be stored as TOML.
//!
//! ```
//! use mstcomp::prelude::*;
//! use mstir::prelude::*;
//!
//! let expr = Toolchain::default().build("x * y + 1", IntRing)?;
//! assert_eq!(expr.invoke(&bindings! { "x" => 6, "y" => 7 }), Ok(43));
//! # Ok::<(), PipelineError>(())
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod lowering;
pub mod pipeline;

pub mod prelude {
    pub use crate::{
        backend::{
            Backend, BytecodeBackend, ClosureBackend, Compiled, ConstantExpression,
            NativeF64Backend,
        },
        config::{BackendKind, PipelineConfig},
        error::{CompileError, CompileResult, PipelineError, PipelineResult},
        pipeline::{Folded, Parsed, Toolchain},
    };
}
