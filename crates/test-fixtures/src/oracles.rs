//! Oracles with known answers.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pag_core::{DataType, IndependenceResult, IndependenceTest, PagResult};

// =============================================================================
// DagOracle
// =============================================================================

/// Exact d-separation over a DAG. Latent nodes take part in the graph but
/// are not reported as variables.
#[derive(Debug, Default)]
pub struct DagOracle {
    nodes: Vec<String>,
    latents: HashSet<String>,
    parents: HashMap<String, Vec<String>>,
    children: HashMap<String, Vec<String>>,
    calls: AtomicUsize,
}

impl DagOracle {
    /// Nodes are taken from the edges, in order of first appearance.
    pub fn new(edges: &[(&str, &str)]) -> Self {
        let mut nodes: Vec<String> = Vec::new();
        for (a, b) in edges {
            for n in [a, b] {
                if !nodes.iter().any(|x| x == n) {
                    nodes.push(n.to_string());
                }
            }
        }
        Self::with_nodes(&nodes, edges)
    }

    /// Explicit node order, which may include isolated nodes.
    pub fn with_nodes<S: AsRef<str>>(nodes: &[S], edges: &[(&str, &str)]) -> Self {
        let mut oracle = Self {
            nodes: nodes.iter().map(|n| n.as_ref().to_string()).collect(),
            ..Self::default()
        };
        for (a, b) in edges {
            oracle
                .children
                .entry(a.to_string())
                .or_default()
                .push(b.to_string());
            oracle
                .parents
                .entry(b.to_string())
                .or_default()
                .push(a.to_string());
        }
        oracle
    }

    pub fn with_latents(mut self, latents: &[&str]) -> Self {
        self.latents = latents.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Number of `check_independence` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Whether `x` and `y` are d-separated given `z`.
    pub fn d_separated(&self, x: &str, y: &str, z: &[String]) -> bool {
        let given: HashSet<&str> = z.iter().map(String::as_str).collect();

        // Ancestors of the conditioning set, itself included.
        let mut anc: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = given.iter().copied().collect();
        while let Some(n) = stack.pop() {
            if anc.insert(n) {
                stack.extend(self.parents_of(n));
            }
        }

        // Reachability over (node, arrived-from-child) states.
        let mut seen: HashSet<(&str, bool)> = HashSet::new();
        let mut queue: VecDeque<(&str, bool)> = VecDeque::from([(x, true)]);
        while let Some((n, up)) = queue.pop_front() {
            if !seen.insert((n, up)) {
                continue;
            }
            let blocked = given.contains(n);
            if n == y && !blocked {
                return false;
            }
            if up {
                if !blocked {
                    queue.extend(self.parents_of(n).map(|p| (p, true)));
                    queue.extend(self.children_of(n).map(|c| (c, false)));
                }
            } else {
                if !blocked {
                    queue.extend(self.children_of(n).map(|c| (c, false)));
                }
                if anc.contains(n) {
                    queue.extend(self.parents_of(n).map(|p| (p, true)));
                }
            }
        }
        true
    }

    fn parents_of<'a>(&'a self, n: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.parents
            .get(n)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    fn children_of<'a>(&'a self, n: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.children
            .get(n)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

impl IndependenceTest for DagOracle {
    fn check_independence(&self, x: &str, y: &str, z: &[String]) -> PagResult<IndependenceResult> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(if self.d_separated(x, y, z) {
            IndependenceResult::independent(1.0)
        } else {
            IndependenceResult::dependent(0.0)
        })
    }

    fn variables(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| !self.latents.contains(*n))
            .cloned()
            .collect()
    }
}

// =============================================================================
// ScriptedOracle
// =============================================================================

/// Answers "independent" only for the listed facts; everything else is
/// dependent with p-value 0.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    variables: Vec<String>,
    facts: HashMap<(String, String, Vec<String>), f64>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new<S: AsRef<str>>(variables: &[S]) -> Self {
        Self {
            variables: variables.iter().map(|v| v.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    /// `x ⟂ y | z` with p-value 0.5.
    pub fn independent(self, x: &str, y: &str, z: &[&str]) -> Self {
        self.independent_with_p(x, y, z, 0.5)
    }

    pub fn independent_with_p(mut self, x: &str, y: &str, z: &[&str], p_value: f64) -> Self {
        let z: Vec<String> = z.iter().map(|s| s.to_string()).collect();
        self.facts.insert(key(x, y, &z), p_value);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl IndependenceTest for ScriptedOracle {
    fn check_independence(&self, x: &str, y: &str, z: &[String]) -> PagResult<IndependenceResult> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(match self.facts.get(&key(x, y, z)) {
            Some(&p) => IndependenceResult::independent(p),
            None => IndependenceResult::dependent(0.0),
        })
    }

    fn variables(&self) -> Vec<String> {
        self.variables.clone()
    }
}

fn key(x: &str, y: &str, z: &[String]) -> (String, String, Vec<String>) {
    let mut z = z.to_vec();
    z.sort();
    if x <= y {
        (x.to_string(), y.to_string(), z)
    } else {
        (y.to_string(), x.to_string(), z)
    }
}

// =============================================================================
// SlowOracle
// =============================================================================

/// Delays calls before delegating. With a pair set, only tests of that
/// pair are delayed.
pub struct SlowOracle {
    inner: Arc<dyn IndependenceTest>,
    delay: Duration,
    pair: Option<(String, String)>,
}

impl SlowOracle {
    pub fn new(inner: Arc<dyn IndependenceTest>, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            pair: None,
        }
    }

    pub fn only_pair(mut self, x: &str, y: &str) -> Self {
        self.pair = Some((x.to_string(), y.to_string()));
        self
    }

    fn is_slow(&self, x: &str, y: &str) -> bool {
        match &self.pair {
            None => true,
            Some((a, b)) => (a == x && b == y) || (a == y && b == x),
        }
    }
}

impl IndependenceTest for SlowOracle {
    fn check_independence(&self, x: &str, y: &str, z: &[String]) -> PagResult<IndependenceResult> {
        if self.is_slow(x, y) {
            std::thread::sleep(self.delay);
        }
        self.inner.check_independence(x, y, z)
    }

    fn variables(&self) -> Vec<String> {
        self.inner.variables()
    }

    fn alpha(&self) -> f64 {
        self.inner.alpha()
    }

    fn check_data_type(&self, data_type: DataType) -> PagResult<()> {
        self.inner.check_data_type(data_type)
    }
}
