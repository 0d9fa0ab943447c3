//! Syntax tree, node constructors, ancestor paths and the walker.
//!
//! - [`ast`]: the tree handed in by the parser and out to the printer.
//! - [`build`]: constructors for synthesized nodes.
//! - [`path`]: [`path::NodeKind`], [`path::Edge`] and the ancestor chain.
//! - [`walk`]: the depth-first mutable walker.

/// Syntax tree node types.
pub mod ast;
/// Constructors for synthesized nodes.
pub mod build;
/// Ancestor chains and node paths.
pub mod path;
/// The depth-first mutable walker.
pub mod walk;
