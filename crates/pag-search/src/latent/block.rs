//! Candidate parent/child blocks and their dependence check.

use std::collections::{BTreeSet, HashMap};

use pag_core::combinatorics::subsets_up_to;
use pag_core::config::{LatentCheck, LatentConfig};
use pag_core::{Endpoint, Graph, GuardedOracle, Knowledge, NodeId, PagResult};

/// A confirmed block, names sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub parents: Vec<String>,
    pub children: Vec<String>,
}

pub(super) struct BlockFinder<'a> {
    oracle: &'a GuardedOracle,
    knowledge: &'a Knowledge,
    config: &'a LatentConfig,
    /// `(c1, c2, Z)` with `c1 < c2` and `Z` sorted ↦ dependent.
    cache: HashMap<(String, String, Vec<String>), bool>,
    tests_run: usize,
}

impl<'a> BlockFinder<'a> {
    pub fn new(oracle: &'a GuardedOracle, knowledge: &'a Knowledge, config: &'a LatentConfig) -> Self {
        Self {
            oracle,
            knowledge,
            config,
            cache: HashMap::new(),
            tests_run: 0,
        }
    }

    pub fn tests_run(&self) -> usize {
        self.tests_run
    }

    /// The confirmed block through `seed` with the most parent/child pairs.
    /// Smaller blocks come first, so ties keep the smallest.
    pub fn best_block(&mut self, graph: &Graph, seed: NodeId) -> PagResult<Option<Block>> {
        let seed_children = possible_children(graph, seed);
        if seed_children.is_empty() {
            return Ok(None);
        }
        let parents: BTreeSet<NodeId> = seed_children
            .iter()
            .flat_map(|&c| possible_parents(graph, c))
            .collect();
        let children: BTreeSet<NodeId> = parents
            .iter()
            .flat_map(|&p| possible_children(graph, p))
            .collect();

        let by_name = |set: &BTreeSet<NodeId>| -> Vec<NodeId> {
            let mut v: Vec<NodeId> = set.iter().copied().filter(|&n| n != seed).collect();
            v.sort_by(|a, b| graph.name(*a).cmp(graph.name(*b)));
            v
        };
        let other_parents = by_name(&parents);
        let mut child_pool = by_name(&children);
        child_pool.retain(|c| !parents.contains(c));

        let max = self.config.max_block_size;
        let mut best: Option<(usize, Vec<NodeId>, Vec<NodeId>)> = None;
        for others in subsets_up_to(&other_parents, 0, max.saturating_sub(1)) {
            let mut block_parents = vec![seed];
            block_parents.extend(others);
            for block_children in subsets_up_to(&child_pool, 2, max) {
                let score = block_parents.len() * block_children.len();
                if best.as_ref().is_some_and(|(s, _, _)| *s >= score) {
                    continue;
                }
                if !is_cartesian(graph, &block_parents, &block_children)
                    || self.drops_required_edge(graph, &block_parents, &block_children)
                {
                    continue;
                }
                if self.children_dependent(graph, &block_parents, &block_children)? {
                    best = Some((score, block_parents.clone(), block_children));
                }
            }
        }

        Ok(best.map(|(_, p, c)| Block {
            parents: sorted_names(graph, &p),
            children: sorted_names(graph, &c),
        }))
    }

    /// Replacing the block would drop an edge knowledge requires.
    fn drops_required_edge(&self, graph: &Graph, parents: &[NodeId], children: &[NodeId]) -> bool {
        parents.iter().any(|&p| {
            children
                .iter()
                .any(|&c| !self.knowledge.no_edge_required(graph.name(p), graph.name(c)))
        })
    }

    /// No two children become independent given the conditioning set the
    /// configured check derives from the parents.
    fn children_dependent(&mut self, graph: &Graph, parents: &[NodeId], children: &[NodeId]) -> PagResult<bool> {
        let z: Vec<NodeId> = match self.config.check {
            LatentCheck::Direct => parents.to_vec(),
            LatentCheck::Minimal => parents
                .iter()
                .copied()
                .filter(|&p| children.iter().all(|&c| graph.has_mark(c, p, Endpoint::Tail)))
                .collect(),
        };
        let z = sorted_names(graph, &z);
        for (i, &a) in children.iter().enumerate() {
            for &b in &children[i + 1..] {
                if !self.dependent(graph.name(a), graph.name(b), &z)? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn dependent(&mut self, a: &str, b: &str, z: &[String]) -> PagResult<bool> {
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        let key = (a.to_string(), b.to_string(), z.to_vec());
        if let Some(&dep) = self.cache.get(&key) {
            return Ok(dep);
        }
        self.tests_run += 1;
        let dep = !self.oracle.test_or_dependent(a, b, z)?.independent;
        self.cache.insert(key, dep);
        Ok(dep)
    }
}

/// Observed `c` with `n *-> c` and no arrowhead at `n`.
fn possible_children(graph: &Graph, n: NodeId) -> Vec<NodeId> {
    graph
        .adjacent(n)
        .into_iter()
        .filter(|&c| !graph.is_latent(c) && can_point(graph, n, c))
        .collect()
}

/// Observed `p` with `p *-> n` and no arrowhead at `p`.
fn possible_parents(graph: &Graph, n: NodeId) -> Vec<NodeId> {
    graph
        .adjacent(n)
        .into_iter()
        .filter(|&p| !graph.is_latent(p) && can_point(graph, p, n))
        .collect()
}

fn can_point(graph: &Graph, p: NodeId, c: NodeId) -> bool {
    graph.has_mark(p, c, Endpoint::Arrow) && !graph.has_mark(c, p, Endpoint::Arrow)
}

fn is_cartesian(graph: &Graph, parents: &[NodeId], children: &[NodeId]) -> bool {
    parents
        .iter()
        .all(|&p| children.iter().all(|&c| can_point(graph, p, c)))
}

fn sorted_names(graph: &Graph, ids: &[NodeId]) -> Vec<String> {
    let mut names: Vec<String> = ids.iter().map(|&n| graph.name(n).to_string()).collect();
    names.sort();
    names
}
