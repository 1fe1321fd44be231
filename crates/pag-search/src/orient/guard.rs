//! Admissibility checks consulted before every rule commits a mark.
//!
//! Rules only refine CIRCLE marks. An arrowhead must be allowed by the
//! current marks and by knowledge; a tail must not contradict knowledge.
//! Neither may complete a directed cycle.

use tracing::debug;

use pag_core::graph::paths::would_create_cycle;
use pag_core::{Endpoint, Graph, Knowledge, NodeId, PagResult};

use super::report::{OrientationReport, Rule};

/// Whether an arrowhead may be placed at `y` on the edge `x *-* y`.
pub fn is_arrowhead_allowed(graph: &Graph, x: NodeId, y: NodeId, knowledge: &Knowledge) -> bool {
    let Some(at_y) = graph.endpoint(x, y) else {
        return false;
    };
    let at_x = graph.endpoint(y, x);
    match at_y {
        Endpoint::Arrow => return true,
        Endpoint::Tail => return false,
        Endpoint::Circle => {}
    }
    let (xn, yn) = (graph.name(x), graph.name(y));
    // An arrowhead at y contradicts a required y --> x.
    if knowledge.is_required(yn, xn) {
        return false;
    }
    // A forbidden x --> y only tolerates x <-> y.
    if knowledge.is_forbidden(xn, yn) && at_x != Some(Endpoint::Arrow) {
        return false;
    }
    true
}

/// Whether a tail may be placed at `y` on the edge `x *-* y`.
pub fn is_tail_allowed(graph: &Graph, x: NodeId, y: NodeId, knowledge: &Knowledge) -> bool {
    match graph.endpoint(x, y) {
        Some(Endpoint::Tail) => return true,
        Some(Endpoint::Circle) => {}
        _ => return false,
    }
    let (xn, yn) = (graph.name(x), graph.name(y));
    if knowledge.is_required(xn, yn) {
        return false;
    }
    // With an arrowhead at x this makes y --> x.
    if graph.has_mark(y, x, Endpoint::Arrow) && knowledge.is_forbidden(yn, xn) {
        return false;
    }
    true
}

/// Mutable orientation state shared by every rule in one run.
pub(crate) struct Ctx<'g, 'k> {
    pub graph: &'g mut Graph,
    pub knowledge: &'k Knowledge,
    pub report: &'g mut OrientationReport,
    pub changed: bool,
}

impl<'g, 'k> Ctx<'g, 'k> {
    pub fn new(
        graph: &'g mut Graph,
        knowledge: &'k Knowledge,
        report: &'g mut OrientationReport,
    ) -> Self {
        Self {
            graph,
            knowledge,
            report,
            changed: false,
        }
    }

    /// Refine the CIRCLE at `b` on `a *-o b` to `mark`. Returns whether
    /// the mark changed.
    pub fn commit(&mut self, a: NodeId, b: NodeId, mark: Endpoint, rule: Rule) -> PagResult<bool> {
        if self.graph.endpoint(a, b) != Some(Endpoint::Circle) || mark == Endpoint::Circle {
            return Ok(false);
        }
        let allowed = match mark {
            Endpoint::Arrow => {
                is_arrowhead_allowed(self.graph, a, b, self.knowledge)
                    && !(self.graph.has_mark(b, a, Endpoint::Tail)
                        && would_create_cycle(self.graph, a, b))
            }
            Endpoint::Tail => {
                is_tail_allowed(self.graph, a, b, self.knowledge)
                    && !(self.graph.has_mark(b, a, Endpoint::Arrow)
                        && would_create_cycle(self.graph, b, a))
            }
            Endpoint::Circle => false,
        };
        if !allowed {
            self.report.refused += 1;
            debug!(%rule, a = self.graph.name(a), b = self.graph.name(b), %mark, "mark change refused");
            return Ok(false);
        }
        self.write(a, b, mark, rule)?;
        Ok(true)
    }

    /// Overwrite the mark at `b` without the CIRCLE-only and admissibility
    /// checks. Used by knowledge orientation, initial marks, and repair.
    pub fn force(&mut self, a: NodeId, b: NodeId, mark: Endpoint, rule: Rule) -> PagResult<bool> {
        if self.graph.endpoint(a, b) == Some(mark) {
            return Ok(false);
        }
        self.write(a, b, mark, rule)?;
        Ok(true)
    }

    fn write(&mut self, a: NodeId, b: NodeId, mark: Endpoint, rule: Rule) -> PagResult<()> {
        self.graph.set_endpoint(a, b, mark)?;
        self.report.record(rule);
        self.changed = true;
        debug!(%rule, a = self.graph.name(a), b = self.graph.name(b), %mark, "mark set");
        Ok(())
    }
}
