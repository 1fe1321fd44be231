//! Subset enumeration for conditioning sets and latent blocks.

/// Iterates the `k`-element index subsets of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct ChoiceGenerator {
    n: usize,
    k: usize,
    current: Vec<usize>,
    done: bool,
}

impl ChoiceGenerator {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            current: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for ChoiceGenerator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let out = self.current.clone();

        // Advance: find the rightmost slot that can still move right.
        let mut i = self.k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.current[i] < self.n - self.k + i {
                self.current[i] += 1;
                for j in i + 1..self.k {
                    self.current[j] = self.current[j - 1] + 1;
                }
                break;
            }
        }
        Some(out)
    }
}

/// Every `k`-element subset of `items`, preserving the order of `items`.
pub fn choose<T: Clone>(items: &[T], k: usize) -> impl Iterator<Item = Vec<T>> + '_ {
    ChoiceGenerator::new(items.len(), k).map(move |idx| idx.iter().map(|&i| items[i].clone()).collect())
}

/// Every subset of `items` with size in `min..=max`, smallest first.
pub fn subsets_up_to<T: Clone>(items: &[T], min: usize, max: usize) -> impl Iterator<Item = Vec<T>> + '_ {
    let max = max.min(items.len());
    (min..=max).flat_map(move |k| choose(items, k))
}
