//! Read-only scope analysis over the live tree.
//!
//! - [`context`]: variable and lexical contexts.
//! - [`identifier`]: role classification of identifier occurrences.
//! - [`scope`]: owning and resolution contexts of bindings.
//!
//! Nothing here is cached. Every answer is derived from the ancestor chain
//! the walker hands out, so it is only valid until the next mutation.

/// Variable and lexical contexts.
pub mod context;
/// Identifier classification.
pub mod identifier;
/// Scope attribution.
pub mod scope;

pub use context::{
    is_any_context, is_lexical_context, is_variable_context, nearest_lexical_context,
    nearest_variable_context,
};
pub use identifier::{IdentifierInfo, SpecFlags, classify};
pub use scope::{
    BindingKind, all_defining_contexts, defining_context, referencing_contexts,
};
