//! Test support: occurrence collection and a reference interpreter.

pub mod interp;

use crate::error::EngineResult;
use crate::syntax::ast::{Ident, Program};
use crate::syntax::path::Ancestors;
use crate::syntax::walk::{Flow, NodeMut, VisitMut, walk_program};

/// One identifier occurrence with a snapshot of its chain.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub ident: Ident,
    pub ancestors: Ancestors,
}

struct Collector(Vec<Occurrence>);

impl VisitMut for Collector {
    fn enter(&mut self, node: NodeMut<'_>, ancestors: &Ancestors) -> EngineResult<Flow> {
        if let Some(i) = node.as_node().as_ident() {
            self.0.push(Occurrence {
                ident: i.clone(),
                ancestors: ancestors.clone(),
            });
        }
        Ok(Flow::Continue)
    }
}

/// Every identifier occurrence in document order.
pub fn occurrences(program: &mut Program) -> Vec<Occurrence> {
    let mut c = Collector(Vec::new());
    walk_program(program, &mut c).expect("collector never fails");
    c.0
}

/// The `n`-th occurrence of `name`.
pub fn nth<'a>(occ: &'a [Occurrence], name: &str, n: usize) -> &'a Occurrence {
    occ.iter()
        .filter(|o| o.ident.name == name)
        .nth(n)
        .unwrap_or_else(|| panic!("no occurrence #{n} of `{name}`"))
}
