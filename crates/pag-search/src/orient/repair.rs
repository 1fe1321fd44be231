//! Post-pass repair that forces a legal PAG.

use std::collections::HashSet;

use tracing::warn;

use pag_core::graph::paths::directed_cycles;
use pag_core::{Endpoint, NodeId, PagResult};

use super::guard::Ctx;
use super::report::{RepairAction, RepairKind, Rule};

/// Break directed cycles, then turn almost-cycles `x <-> y` with `x` an
/// ancestor of `y` into `x --> y`.
pub(crate) fn guarantee_pag(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    // Each iteration removes at least one directed edge.
    for _ in 0..=ctx.graph.edge_count() {
        let cycles = directed_cycles(ctx.graph);
        let Some(cycle) = cycles.first() else {
            break;
        };
        let members: HashSet<NodeId> = cycle.iter().copied().collect();
        let closing = ctx.graph.edge_pairs().into_iter().rev().find(|&(a, b)| {
            members.contains(&a)
                && members.contains(&b)
                && (ctx.graph.is_parent_of(a, b) || ctx.graph.is_parent_of(b, a))
                && ctx.knowledge.no_edge_required(ctx.graph.name(a), ctx.graph.name(b))
        });
        let Some((a, b)) = closing else {
            break;
        };
        ctx.force(a, b, Endpoint::Circle, Rule::Repair)?;
        ctx.force(b, a, Endpoint::Circle, Rule::Repair)?;
        record(ctx, a, b, RepairKind::DirectedCycle);
    }

    for (a, b) in ctx.graph.edge_pairs() {
        let g = &*ctx.graph;
        if !(g.has_mark(a, b, Endpoint::Arrow) && g.has_mark(b, a, Endpoint::Arrow)) {
            continue;
        }
        let (tail, head) = if g.exists_directed_path(a, b) {
            (a, b)
        } else if g.exists_directed_path(b, a) {
            (b, a)
        } else {
            continue;
        };
        if ctx.knowledge.is_forbidden(g.name(tail), g.name(head)) {
            continue;
        }
        ctx.force(head, tail, Endpoint::Tail, Rule::Repair)?;
        record(ctx, tail, head, RepairKind::AlmostCycle);
    }
    ctx.report.repaired = !ctx.report.repairs.is_empty();
    Ok(())
}

fn record(ctx: &mut Ctx<'_, '_>, a: NodeId, b: NodeId, kind: RepairKind) {
    let edge = ctx
        .graph
        .edge(a, b)
        .map(|e| e.to_string())
        .unwrap_or_default();
    warn!(?kind, %edge, "repaired PAG");
    ctx.report.repairs.push(RepairAction { kind, edge });
}
