use pag_core::combinatorics::{subsets_up_to, ChoiceGenerator};
use pag_core::Knowledge;
use proptest::prelude::*;

const NAMES: [&str; 4] = ["A", "B", "C", "D"];

fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Forbid(usize, usize),
    Require(usize, usize),
    Unforbid(usize, usize),
    Unrequire(usize, usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    (0u8..4, 0usize..4, 0usize..4).prop_map(|(kind, a, b)| match kind {
        0 => Op::Forbid(a, b),
        1 => Op::Require(a, b),
        2 => Op::Unforbid(a, b),
        _ => Op::Unrequire(a, b),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn choice_generator_yields_every_subset_once_in_order(n in 0usize..9, k in 0usize..9) {
        let subsets: Vec<Vec<usize>> = ChoiceGenerator::new(n, k).collect();

        prop_assert_eq!(subsets.len(), binomial(n, k));
        for s in &subsets {
            prop_assert_eq!(s.len(), k);
            prop_assert!(s.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(s.iter().all(|&i| i < n));
        }
        prop_assert!(subsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn subsets_up_to_stays_within_bounds(n in 0usize..7, min in 0usize..4, max in 0usize..8) {
        let items: Vec<usize> = (0..n).collect();
        let sizes: Vec<usize> = subsets_up_to(&items, min, max).map(|s| s.len()).collect();

        let expected: usize = (min..=max.min(n)).map(|k| binomial(n, k)).sum();
        prop_assert_eq!(sizes.len(), expected);
        prop_assert!(sizes.iter().all(|&s| s >= min && s <= max));
        prop_assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn knowledge_setters_never_require_a_forbidden_direction(
        ops in prop::collection::vec(arb_op(), 0..24),
    ) {
        let mut knowledge = Knowledge::new();
        for op in ops {
            let before = knowledge.clone();
            let outcome = match op {
                Op::Forbid(a, b) => knowledge.set_forbidden(NAMES[a], NAMES[b]),
                Op::Require(a, b) => knowledge.set_required(NAMES[a], NAMES[b]),
                Op::Unforbid(a, b) => {
                    knowledge.remove_forbidden(NAMES[a], NAMES[b]);
                    Ok(())
                }
                Op::Unrequire(a, b) => {
                    knowledge.remove_required(NAMES[a], NAMES[b]);
                    Ok(())
                }
            };
            if outcome.is_err() {
                prop_assert_eq!(&knowledge, &before);
            }
            prop_assert!(knowledge.validate().is_ok());
        }
        for from in NAMES {
            for to in NAMES {
                prop_assert!(!(knowledge.is_required(from, to) && knowledge.is_explicitly_forbidden(from, to)));
            }
        }
    }
}
