//! `shroud_core`: scope analysis and the transform pipeline engine of a
//! JavaScript obfuscator.
//!
//! The crate works on an already parsed [`syntax::ast::Program`]; parsing and
//! printing belong to the front end.
//!
//! # Crate layout
//!
//! - [`syntax`]: the tree, ancestor chains and the mutable walker.
//! - [`analysis`]: contexts, identifier roles and scope attribution.
//! - [`transform`]: the staged pipeline, run state, naming and the
//!   variable virtualization transform.
//! - [`config`]: options handed to a run.
//! - [`logging`]: optional `tracing` subscriber setup.
//! - [`error`]: the engine error type.
//!
//! # Example
//!
//! ```
//! use shroud_core::config::{Options, Probability};
//! use shroud_core::syntax::ast::{BinaryOp, VarKind};
//! use shroud_core::syntax::build::*;
//! use shroud_core::transform::{Pipeline, Virtualize};
//!
//! let mut program = program(vec![function_decl(
//!     "add",
//!     vec![param("a"), param("b")],
//!     vec![
//!         var_decl(VarKind::Var, "sum", Some(binary(BinaryOp::Add, ident_expr("a"), ident_expr("b")))),
//!         return_stmt(Some(ident_expr("sum"))),
//!     ],
//! )]);
//! let options = Options {
//!     virtualize: Probability::Flag(true),
//!     seed: Some(7),
//!     ..Options::default()
//! };
//! let report = Pipeline::new().with(Virtualize::new()).run(&mut program, options)?;
//! assert_eq!(report.stage("Virtualize").map(|s| s.declined), Some(0));
//! # Ok::<(), shroud_core::error::EngineError>(())
//! ```

/// Read-only scope analysis.
pub mod analysis;
/// Engine options.
pub mod config;
/// Error types.
pub mod error;
/// `tracing` subscriber setup.
pub mod logging;
/// Syntax tree and traversal.
pub mod syntax;
/// Pipeline engine and transforms.
pub mod transform;

#[cfg(test)]
mod testing;

pub use config::Options;
pub use error::{EngineError, EngineResult};
pub use transform::{Pipeline, RunReport, Transform};
