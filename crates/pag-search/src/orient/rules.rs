//! Knowledge orientation, R0, and the FCI rules other than R4.

use tracing::trace;

use pag_core::combinatorics::choose;
use pag_core::graph::paths::would_create_cycle;
use pag_core::{Endpoint, NodeId, PagResult};

use super::guard::{is_arrowhead_allowed, is_tail_allowed, Ctx};
use super::paths::{circle_step, potentially_directed_step, PathQuery};
use super::report::Rule;
use super::strategies::{ColliderDecision, ColliderStrategy};

/// Put arrowheads at the source of every forbidden direction, then orient
/// every required edge.
pub(crate) fn orient_knowledge(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    for (a, b) in ctx.graph.edge_pairs() {
        for (from, to) in [(a, b), (b, a)] {
            if ctx.knowledge.is_forbidden(ctx.graph.name(from), ctx.graph.name(to)) {
                ctx.commit(to, from, Endpoint::Arrow, Rule::Knowledge)?;
            }
        }
    }
    let required: Vec<(String, String)> = ctx
        .knowledge
        .required_edges()
        .map(|(f, t)| (f.to_string(), t.to_string()))
        .collect();
    for (from, to) in required {
        let (Some(f), Some(t)) = (ctx.graph.id(&from), ctx.graph.id(&to)) else {
            continue;
        };
        if !ctx.graph.is_adjacent(f, t) {
            continue;
        }
        ctx.force(t, f, Endpoint::Tail, Rule::Knowledge)?;
        ctx.force(f, t, Endpoint::Arrow, Rule::Knowledge)?;
    }
    Ok(())
}

/// Orient unshielded colliders `a *-> b <-* c` as the strategy decides.
pub(crate) fn rule_r0(ctx: &mut Ctx<'_, '_>, strategy: &dyn ColliderStrategy) -> PagResult<()> {
    for b in ctx.graph.nodes() {
        let adj = ctx.graph.adjacent(b);
        for pair in choose(&adj, 2) {
            let (a, c) = (pair[0], pair[1]);
            if ctx.graph.is_adjacent(a, c) || ctx.graph.is_def_collider(a, b, c) {
                continue;
            }
            match strategy.decide(ctx.graph, a, b, c)? {
                ColliderDecision::Collider => {
                    if is_arrowhead_allowed(ctx.graph, a, b, ctx.knowledge)
                        && is_arrowhead_allowed(ctx.graph, c, b, ctx.knowledge)
                    {
                        ctx.commit(a, b, Endpoint::Arrow, Rule::R0)?;
                        ctx.commit(c, b, Endpoint::Arrow, Rule::R0)?;
                    }
                }
                ColliderDecision::NonCollider => {}
                ColliderDecision::Ambiguous => {
                    let names = (
                        ctx.graph.name(a).to_string(),
                        ctx.graph.name(b).to_string(),
                        ctx.graph.name(c).to_string(),
                    );
                    trace!(x = %names.0, z = %names.1, y = %names.2, "ambiguous triple");
                    ctx.report.ambiguous_triples.push(names);
                }
            }
        }
    }
    Ok(())
}

/// R1: `a *-> b o-* c`, `a` and `c` nonadjacent, gives `b --> c`.
pub(crate) fn rule_r1(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    for b in ctx.graph.nodes() {
        for a in ctx.graph.nodes_into(b, Endpoint::Arrow) {
            for c in ctx.graph.nodes_into(b, Endpoint::Circle) {
                if c == a || ctx.graph.is_adjacent(a, c) {
                    continue;
                }
                orient_directed(ctx, b, c, Rule::R1)?;
            }
        }
    }
    Ok(())
}

/// R2: `a --> b *-> c` or `a *-> b --> c`, with `a *-o c`, gives `a *-> c`.
pub(crate) fn rule_r2(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    for b in ctx.graph.nodes() {
        let adj = ctx.graph.adjacent(b);
        for &a in &adj {
            for &c in &adj {
                if a == c || !ctx.graph.has_mark(a, c, Endpoint::Circle) {
                    continue;
                }
                let g = &*ctx.graph;
                let through_b = (g.is_parent_of(a, b) && g.has_mark(b, c, Endpoint::Arrow))
                    || (g.has_mark(a, b, Endpoint::Arrow) && g.is_parent_of(b, c));
                if through_b && is_arrowhead_allowed(g, a, c, ctx.knowledge) {
                    ctx.commit(a, c, Endpoint::Arrow, Rule::R2)?;
                }
            }
        }
    }
    Ok(())
}

/// R3: `a *-> b <-* c` with `a` and `c` nonadjacent, and `a *-o d o-* c`
/// with `d *-o b`, gives `d *-> b`.
pub(crate) fn rule_r3(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    for b in ctx.graph.nodes() {
        let into_b = ctx.graph.nodes_into(b, Endpoint::Arrow);
        for pair in choose(&into_b, 2) {
            let (a, c) = (pair[0], pair[1]);
            if ctx.graph.is_adjacent(a, c) {
                continue;
            }
            for d in ctx.graph.nodes_into(b, Endpoint::Circle) {
                let g = &*ctx.graph;
                if d == a || d == c {
                    continue;
                }
                if g.has_mark(a, d, Endpoint::Circle)
                    && g.has_mark(c, d, Endpoint::Circle)
                    && is_arrowhead_allowed(g, d, b, ctx.knowledge)
                {
                    ctx.commit(d, b, Endpoint::Arrow, Rule::R3)?;
                }
            }
        }
    }
    Ok(())
}

/// R5: `a o-o b` closed by an uncovered circle path whose inner ends are
/// nonadjacent to the opposite endpoint; every edge involved becomes `---`.
pub(crate) fn rule_r5(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    for (a, b) in ctx.graph.edge_pairs() {
        if !circle_step(ctx.graph, a, b) {
            continue;
        }
        let g = &*ctx.graph;
        let query = PathQuery {
            graph: g,
            from: a,
            to: b,
            min_nodes: 4,
            step: circle_step,
            first_ok: |n: NodeId| !g.is_adjacent(n, b),
            last_ok: |n: NodeId| !g.is_adjacent(n, a),
            avoid: &[],
        };
        let Some(path) = query.find() else {
            continue;
        };
        ctx.commit(a, b, Endpoint::Tail, Rule::R5)?;
        ctx.commit(b, a, Endpoint::Tail, Rule::R5)?;
        for w in path.windows(2) {
            ctx.commit(w[0], w[1], Endpoint::Tail, Rule::R5)?;
            ctx.commit(w[1], w[0], Endpoint::Tail, Rule::R5)?;
        }
    }
    Ok(())
}

/// R6: `a --- b o-* c` gives `b --* c`.
pub(crate) fn rule_r6(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    for b in ctx.graph.nodes() {
        for a in ctx.graph.nodes_into(b, Endpoint::Tail) {
            if !ctx.graph.has_mark(b, a, Endpoint::Tail) {
                continue;
            }
            for c in ctx.graph.nodes_into(b, Endpoint::Circle) {
                if c != a {
                    ctx.commit(c, b, Endpoint::Tail, Rule::R6)?;
                }
            }
        }
    }
    Ok(())
}

/// R7: `a --o b o-* c` with `a` and `c` nonadjacent gives `b --* c`.
pub(crate) fn rule_r7(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    for b in ctx.graph.nodes() {
        for a in ctx.graph.nodes_into(b, Endpoint::Circle) {
            if !ctx.graph.has_mark(b, a, Endpoint::Tail) {
                continue;
            }
            for c in ctx.graph.nodes_into(b, Endpoint::Circle) {
                if c != a && !ctx.graph.is_adjacent(a, c) {
                    ctx.commit(c, b, Endpoint::Tail, Rule::R7)?;
                }
            }
        }
    }
    Ok(())
}

/// R8 to R10 each turn `a o-> c` into `a --> c`. They are tried in order
/// per edge.
pub(crate) fn rules_r8_to_r10(ctx: &mut Ctx<'_, '_>) -> PagResult<()> {
    for (x, y) in ctx.graph.edge_pairs() {
        for (a, c) in [(x, y), (y, x)] {
            if !is_partially_directed(ctx, a, c) {
                continue;
            }
            let rule = if r8_applies(ctx, a, c) {
                Rule::R8
            } else if r9_applies(ctx, a, c) {
                Rule::R9
            } else if r10_applies(ctx, a, c) {
                Rule::R10
            } else {
                continue;
            };
            ctx.commit(c, a, Endpoint::Tail, rule)?;
        }
    }
    Ok(())
}

fn is_partially_directed(ctx: &Ctx<'_, '_>, a: NodeId, c: NodeId) -> bool {
    ctx.graph.has_mark(c, a, Endpoint::Circle) && ctx.graph.has_mark(a, c, Endpoint::Arrow)
}

/// `a --> b --> c` or `a --o b --> c`.
fn r8_applies(ctx: &Ctx<'_, '_>, a: NodeId, c: NodeId) -> bool {
    let g = &*ctx.graph;
    g.adjacent(a).into_iter().any(|b| {
        b != c
            && g.is_parent_of(b, c)
            && g.has_mark(b, a, Endpoint::Tail)
            && (g.has_mark(a, b, Endpoint::Arrow) || g.has_mark(a, b, Endpoint::Circle))
    })
}

/// An uncovered potentially directed path from `a` to `c` whose second
/// node is nonadjacent to `c`.
fn r9_applies(ctx: &Ctx<'_, '_>, a: NodeId, c: NodeId) -> bool {
    let g = &*ctx.graph;
    PathQuery {
        graph: g,
        from: a,
        to: c,
        min_nodes: 3,
        step: potentially_directed_step,
        first_ok: |n: NodeId| !g.is_adjacent(n, c),
        last_ok: |_: NodeId| true,
        avoid: &[],
    }
    .find()
    .is_some()
}

/// `b --> c <-- d`, with uncovered potentially directed paths from `a` to
/// `b` and to `d` leaving `a` through distinct nonadjacent nodes.
fn r10_applies(ctx: &Ctx<'_, '_>, a: NodeId, c: NodeId) -> bool {
    let g = &*ctx.graph;
    let parents: Vec<NodeId> = g.parents(c).into_iter().filter(|&p| p != a).collect();
    if parents.len() < 2 {
        return false;
    }
    let first_hops = |target: NodeId| -> Vec<NodeId> {
        g.adjacent(a)
            .into_iter()
            .filter(|&m| m != c)
            .filter(|&m| {
                PathQuery {
                    graph: g,
                    from: a,
                    to: target,
                    min_nodes: 2,
                    step: potentially_directed_step,
                    first_ok: |n: NodeId| n == m,
                    last_ok: |_: NodeId| true,
                    avoid: &[c],
                }
                .find()
                .is_some()
            })
            .collect()
    };
    let hops: Vec<Vec<NodeId>> = parents.iter().map(|&p| first_hops(p)).collect();
    for i in 0..parents.len() {
        for j in i + 1..parents.len() {
            for &mu in &hops[i] {
                for &omega in &hops[j] {
                    if mu != omega && !g.is_adjacent(mu, omega) {
                        return true;
                    }
                }
            }
        }
    }
    false
}

/// `b o-* c` becomes `b --> c` when both marks are admissible. Either
/// both marks are written or neither is.
fn orient_directed(ctx: &mut Ctx<'_, '_>, b: NodeId, c: NodeId, rule: Rule) -> PagResult<()> {
    let g = &*ctx.graph;
    let admissible = is_arrowhead_allowed(g, b, c, ctx.knowledge)
        && (g.has_mark(c, b, Endpoint::Tail) || is_tail_allowed(g, c, b, ctx.knowledge))
        && !would_create_cycle(g, b, c);
    if !admissible {
        ctx.report.refused += 1;
        trace!(%rule, b = g.name(b), c = g.name(c), "directed orientation refused");
        return Ok(());
    }
    ctx.commit(c, b, Endpoint::Tail, rule)?;
    ctx.commit(b, c, Endpoint::Arrow, rule)?;
    Ok(())
}
