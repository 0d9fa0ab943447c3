//! Per-context bookkeeping of defined and referenced names.
//!
//! None of the shipped transforms depend on it. Embedders that need the
//! report list [`VariableAnalysis`] in their transform's
//! [`Transform::before`] and read it from [`RunContext::scope_report`] in
//! `on_start` or later.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use super::naming::RESERVED_IDENTIFIERS;
use super::{Deferred, RunContext, Transform};
use crate::analysis::identifier::classify;
use crate::analysis::scope::{all_defining_contexts, referencing_contexts};
use crate::error::EngineResult;
use crate::syntax::ast::Program;
use crate::syntax::path::{Ancestors, NodePath};
use crate::syntax::walk::{Node, NodeMut};

/// Names defined in and referenced from each context, keyed by the
/// context's path. Only valid until the next structural mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeReport {
    /// Context → names it defines.
    pub defined: BTreeMap<NodePath, BTreeSet<String>>,
    /// Context → names used there but not defined there.
    pub references: BTreeMap<NodePath, BTreeSet<String>>,
    /// Names used somewhere and defined nowhere in the program.
    pub globals: BTreeSet<String>,
}

impl ScopeReport {
    /// `true` if the context at `path` defines `name`.
    pub fn defines(&self, path: &NodePath, name: &str) -> bool {
        self.defined.get(path).is_some_and(|s| s.contains(name))
    }

    /// `true` if the context at `path` uses `name` without defining it.
    pub fn references(&self, path: &NodePath, name: &str) -> bool {
        self.references.get(path).is_some_and(|s| s.contains(name))
    }

    pub fn is_global(&self, name: &str) -> bool {
        self.globals.contains(name)
    }
}

/// Records every identifier occurrence into a [`ScopeReport`] and publishes
/// it on the run context when the walk finishes.
#[derive(Debug, Default)]
pub struct VariableAnalysis {
    report: ScopeReport,
    not_globals: HashSet<String>,
}

impl VariableAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, name: &str, ancestors: &Ancestors, node: Node<'_>) -> EngineResult<()> {
        let info = classify(node, ancestors)?;
        if !info.spec.is_referenced || info.spec.is_exported {
            return Ok(());
        }

        if info.spec.is_defined {
            self.not_globals.insert(name.to_string());
            self.report.globals.remove(name);
            for context in all_defining_contexts(node, ancestors)? {
                self.report
                    .defined
                    .entry(context.path.clone())
                    .or_default()
                    .insert(name.to_string());
                if let Some(refs) = self.report.references.get_mut(&context.path) {
                    refs.remove(name);
                }
            }
        } else {
            if !self.not_globals.contains(name) {
                self.report.globals.insert(name.to_string());
            }
            for context in referencing_contexts(node, ancestors)? {
                if self.report.defines(&context.path, name) {
                    continue;
                }
                self.report
                    .references
                    .entry(context.path)
                    .or_default()
                    .insert(name.to_string());
            }
        }
        Ok(())
    }
}

impl Transform for VariableAnalysis {
    fn name(&self) -> &'static str {
        "VariableAnalysis"
    }

    fn matches(&self, node: Node<'_>, _ancestors: &Ancestors) -> bool {
        node.as_ident().is_some()
    }

    fn transform(
        &mut self,
        node: NodeMut<'_>,
        ancestors: &Ancestors,
        cx: &mut RunContext,
    ) -> EngineResult<Option<Deferred>> {
        let node = node.as_node();
        let Some(ident) = node.as_ident() else {
            return Ok(None);
        };
        let name = ident.name.as_str();
        if RESERVED_IDENTIFIERS.contains(&name) || cx.options().is_global(name) {
            return Ok(None);
        }
        self.record(name, ancestors, node)?;
        Ok(None)
    }

    fn on_start(&mut self, _program: &mut Program, cx: &mut RunContext) -> EngineResult<()> {
        self.report = ScopeReport::default();
        self.not_globals.clear();
        cx.invalidate_scope_report();
        Ok(())
    }

    fn on_finish(&mut self, _program: &mut Program, cx: &mut RunContext) -> EngineResult<()> {
        let report = std::mem::take(&mut self.report);
        debug!(
            contexts = report.defined.len(),
            globals = report.globals.len(),
            "scope report published"
        );
        cx.set_scope_report(report);
        Ok(())
    }
}
