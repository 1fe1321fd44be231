//! R4: discriminating paths.
//!
//! For `v o-> y`, a discriminating path `<x, ..., w, v, y>` has `x`
//! nonadjacent to `y`, and every node strictly between `x` and `v` is a
//! collider on the path and a parent of `y`. Paths are searched backwards
//! from `w`, breadth first, so the shortest one is found first.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use pag_core::{Endpoint, NodeId, PagResult};

use super::guard::Ctx;
use super::report::{Rule, UnresolvedReason};
use super::strategies::{ColliderDecision, ColliderStrategy};

/// A discriminating path for `v`, reduced to the nodes R4 needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DiscriminatingPath {
    pub x: NodeId,
    pub w: NodeId,
    pub v: NodeId,
    pub y: NodeId,
}

enum Search {
    Found(Vec<NodeId>),
    TooLong,
    None,
}

/// Apply R4 to every `v o-> y`. `max_nodes` bounds path length in nodes.
pub(crate) fn rule_r4(
    ctx: &mut Ctx<'_, '_>,
    strategy: &dyn ColliderStrategy,
    max_nodes: Option<usize>,
) -> PagResult<()> {
    for y in ctx.graph.nodes() {
        for v in ctx.graph.nodes_into(y, Endpoint::Arrow) {
            if !ctx.graph.has_mark(y, v, Endpoint::Circle) {
                continue;
            }
            resolve(ctx, strategy, v, y, max_nodes)?;
        }
    }
    Ok(())
}

fn resolve(
    ctx: &mut Ctx<'_, '_>,
    strategy: &dyn ColliderStrategy,
    v: NodeId,
    y: NodeId,
    max_nodes: Option<usize>,
) -> PagResult<()> {
    let mut too_long = false;
    let mut ambiguous = false;
    for w in ctx.graph.adjacent(v) {
        if w == y || !ctx.graph.is_parent_of(w, y) || !ctx.graph.has_mark(v, w, Endpoint::Arrow) {
            continue;
        }
        let far_ends = match far_ends(ctx, v, w, y, max_nodes) {
            Search::Found(xs) => xs,
            Search::TooLong => {
                too_long = true;
                continue;
            }
            Search::None => continue,
        };
        for x in far_ends {
            let path = DiscriminatingPath { x, w, v, y };
            match strategy.decide(ctx.graph, x, v, y)? {
                ColliderDecision::Ambiguous => ambiguous = true,
                decision => {
                    orient(ctx, path, decision)?;
                    return Ok(());
                }
            }
        }
    }
    let (vn, yn) = (ctx.graph.name(v).to_string(), ctx.graph.name(y).to_string());
    if ambiguous {
        ctx.report.unresolved(&vn, &yn, UnresolvedReason::Ambiguous);
    } else if too_long {
        debug!(v = %vn, y = %yn, "discriminating path exceeds length bound");
        ctx.report.unresolved(&vn, &yn, UnresolvedReason::LengthBound);
    }
    Ok(())
}

/// Far endpoints `x` of the shortest discriminating paths through `w`.
fn far_ends(
    ctx: &Ctx<'_, '_>,
    v: NodeId,
    w: NodeId,
    y: NodeId,
    max_nodes: Option<usize>,
) -> Search {
    let g = &*ctx.graph;
    let mut queue: VecDeque<(NodeId, NodeId, usize)> = VecDeque::from([(w, v, 1)]);
    let mut seen: HashSet<NodeId> = HashSet::from([v, w, y]);
    let mut too_long = false;

    while let Some((t, toward_v, colliders)) = queue.pop_front() {
        let nodes = colliders + 3;
        let mut found = Vec::new();
        for x in g.nodes_into(t, Endpoint::Arrow) {
            if x == toward_v || seen.contains(&x) {
                continue;
            }
            if max_nodes.is_some_and(|m| nodes > m) {
                too_long = true;
                continue;
            }
            if !g.is_adjacent(x, y) {
                found.push(x);
            } else if g.is_parent_of(x, y) && g.has_mark(t, x, Endpoint::Arrow) {
                seen.insert(x);
                queue.push_back((x, t, colliders + 1));
            }
        }
        if !found.is_empty() {
            return Search::Found(found);
        }
    }
    if too_long {
        Search::TooLong
    } else {
        Search::None
    }
}

fn orient(ctx: &mut Ctx<'_, '_>, path: DiscriminatingPath, decision: ColliderDecision) -> PagResult<()> {
    let DiscriminatingPath { x, w, v, y } = path;
    debug!(
        x = ctx.graph.name(x),
        v = ctx.graph.name(v),
        y = ctx.graph.name(y),
        ?decision,
        "discriminating path"
    );
    match decision {
        ColliderDecision::NonCollider => {
            ctx.commit(y, v, Endpoint::Tail, Rule::R4)?;
        }
        ColliderDecision::Collider => {
            ctx.commit(w, v, Endpoint::Arrow, Rule::R4)?;
            ctx.commit(y, v, Endpoint::Arrow, Rule::R4)?;
        }
        ColliderDecision::Ambiguous => {}
    }
    Ok(())
}
