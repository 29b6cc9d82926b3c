use std::collections::{HashMap, HashSet};

use crate::models::{Basket, FrequentItemSet, ProductId};

/// Level-wise Apriori over the extracted baskets.
///
/// The basket count is fixed up front and every support is a ratio against
/// that denominator, so size-0/1 baskets correctly dilute support without
/// ever producing itemsets. Candidates at level k+1 are built only from
/// frequent level-k sets and pruned by the anti-monotonicity property before
/// counting. Itemsets are canonical sorted id vectors, which makes the join
/// and the subset lookups order-independent and the output reproducible.
pub fn mine(
    baskets: &[Basket],
    min_support: f64,
    max_itemset_size: Option<usize>,
) -> Vec<FrequentItemSet> {
    let total = baskets.len();
    if total == 0 {
        return Vec::new();
    }
    let meets_support = |count: usize| count as f64 / total as f64 >= min_support;

    let mut frequent = Vec::new();

    // L1: single-product counts.
    let mut singles: HashMap<ProductId, usize> = HashMap::new();
    for basket in baskets {
        for id in &basket.items {
            *singles.entry(*id).or_insert(0) += 1;
        }
    }
    let mut level: Vec<(Vec<ProductId>, usize)> = singles
        .into_iter()
        .filter(|(_, count)| meets_support(*count))
        .map(|(id, count)| (vec![id], count))
        .collect();
    level.sort_unstable();

    let mut size = 1;
    while !level.is_empty() {
        for (items, count) in &level {
            frequent.push(FrequentItemSet {
                items: items.clone(),
                support_count: *count,
                support: *count as f64 / total as f64,
            });
        }

        if max_itemset_size.is_some_and(|max| size >= max) {
            break;
        }

        let candidates = join_level(&level);
        let level_index: HashSet<&[ProductId]> =
            level.iter().map(|(items, _)| items.as_slice()).collect();

        let mut next: Vec<(Vec<ProductId>, usize)> = Vec::new();
        for candidate in candidates {
            if !all_subsets_frequent(&candidate, &level_index) {
                continue;
            }
            let count = baskets
                .iter()
                .filter(|b| b.len() > size && b.contains_all(&candidate))
                .count();
            if meets_support(count) {
                next.push((candidate, count));
            }
        }

        level = next;
        size += 1;
    }

    frequent
}

/// Lk -> Ck+1: join pairs of sorted size-k itemsets sharing a (k-1)-prefix.
/// Because the level is lexicographically sorted, each pair yields exactly
/// one candidate and no candidate is produced twice.
fn join_level(level: &[(Vec<ProductId>, usize)]) -> Vec<Vec<ProductId>> {
    let mut candidates = Vec::new();
    for i in 0..level.len() {
        let (left, _) = &level[i];
        let prefix = &left[..left.len() - 1];
        for (right, _) in &level[i + 1..] {
            if &right[..right.len() - 1] != prefix {
                break;
            }
            let mut candidate = left.clone();
            candidate.push(right[right.len() - 1]);
            candidates.push(candidate);
        }
    }
    candidates
}

/// Anti-monotone prune: a candidate survives only if every size-k subset is
/// itself frequent. A superset of an infrequent itemset cannot be frequent.
fn all_subsets_frequent(candidate: &[ProductId], level_index: &HashSet<&[ProductId]>) -> bool {
    let mut subset = Vec::with_capacity(candidate.len() - 1);
    for skip in 0..candidate.len() {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, id)| *id),
        );
        if !level_index.contains(subset.as_slice()) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: i64 = 1;
    const B: i64 = 2;
    const D: i64 = 3;
    const E: i64 = 4;
    const F: i64 = 5;
    const G: i64 = 6;
    const H: i64 = 7;

    fn baskets(sets: &[&[i64]]) -> Vec<Basket> {
        sets.iter()
            .enumerate()
            .map(|(i, items)| Basket::new(i as i64 + 1, items.to_vec()))
            .collect()
    }

    fn five_basket_store() -> Vec<Basket> {
        baskets(&[
            &[A, B, D, E],
            &[A, B, F],
            &[A, D, G],
            &[B, D, H],
            &[A, B, D],
        ])
    }

    fn support_of(mined: &[FrequentItemSet], items: &[i64]) -> Option<(usize, f64)> {
        mined
            .iter()
            .find(|s| s.items == items)
            .map(|s| (s.support_count, s.support))
    }

    #[test]
    fn counts_pairs_in_small_store() {
        let mined = mine(&five_basket_store(), 0.4, None);

        assert_eq!(support_of(&mined, &[A]), Some((4, 0.8)));
        assert_eq!(support_of(&mined, &[B]), Some((4, 0.8)));
        assert_eq!(support_of(&mined, &[D]), Some((4, 0.8)));
        assert_eq!(support_of(&mined, &[A, B]), Some((3, 0.6)));
        assert_eq!(support_of(&mined, &[A, D]), Some((3, 0.6)));
        assert_eq!(support_of(&mined, &[B, D]), Some((3, 0.6)));
        assert_eq!(support_of(&mined, &[A, B, D]), Some((2, 0.4)));

        // Products seen once fall below the 0.4 threshold.
        assert_eq!(support_of(&mined, &[E]), None);
        assert_eq!(support_of(&mined, &[F]), None);
        assert_eq!(support_of(&mined, &[G]), None);
        assert_eq!(support_of(&mined, &[H]), None);
    }

    #[test]
    fn higher_threshold_drops_triple() {
        let mined = mine(&five_basket_store(), 0.6, None);
        assert!(support_of(&mined, &[A, B]).is_some());
        assert_eq!(support_of(&mined, &[A, B, D]), None);
    }

    #[test]
    fn max_size_caps_mining_level() {
        let mined = mine(&five_basket_store(), 0.4, Some(2));
        assert!(mined.iter().all(|s| s.size() <= 2));
        assert!(support_of(&mined, &[A, B]).is_some());
    }

    #[test]
    fn no_baskets_means_no_itemsets() {
        assert!(mine(&[], 0.4, None).is_empty());
    }

    #[test]
    fn tiny_baskets_dilute_support_but_yield_nothing() {
        // Two pair-baskets plus two single-item baskets: the pair occurs in
        // 2 of 4 baskets, not 2 of 2.
        let mined = mine(&baskets(&[&[A, B], &[A, B], &[A], &[B]]), 0.5, None);
        assert_eq!(support_of(&mined, &[A, B]), Some((2, 0.5)));

        let mined = mine(&baskets(&[&[A, B], &[A, B], &[A], &[B]]), 0.6, None);
        assert_eq!(support_of(&mined, &[A, B]), None);
    }

    #[test]
    fn empty_transactions_count_in_denominator() {
        let mined = mine(&baskets(&[&[A], &[A], &[], &[]]), 0.5, None);
        assert_eq!(support_of(&mined, &[A]), Some((2, 0.5)));
        let mined = mine(&baskets(&[&[A], &[A], &[], &[]]), 0.6, None);
        assert!(mined.is_empty());
    }

    // Small deterministic generator, enough to exercise the properties
    // without pulling in a property-testing framework.
    fn pseudo_random_baskets(seed: u64, basket_count: usize, catalog: i64) -> Vec<Basket> {
        let mut state = seed;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        (0..basket_count)
            .map(|i| {
                let size = (next() % 6) as usize;
                let items = (0..size).map(|_| (next() % catalog as u64) as i64 + 1).collect();
                Basket::new(i as i64 + 1, items)
            })
            .collect()
    }

    #[test]
    fn support_is_monotone_under_superset() {
        for seed in [3, 17, 91] {
            let baskets = pseudo_random_baskets(seed, 60, 8);
            let mined = mine(&baskets, 0.05, None);
            for s in &mined {
                for sup in &mined {
                    let is_superset = s.items.iter().all(|id| sup.items.contains(id));
                    if is_superset && sup.size() > s.size() {
                        assert!(
                            sup.support <= s.support + 1e-12,
                            "superset {:?} has higher support than {:?}",
                            sup.items,
                            s.items
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn every_subset_of_a_frequent_itemset_is_frequent() {
        for seed in [5, 23, 77] {
            let baskets = pseudo_random_baskets(seed, 50, 7);
            let mined = mine(&baskets, 0.1, None);
            let index: HashSet<&[i64]> = mined.iter().map(|s| s.items.as_slice()).collect();
            for s in &mined {
                if s.size() < 2 {
                    continue;
                }
                for skip in 0..s.size() {
                    let subset: Vec<i64> = s
                        .items
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != skip)
                        .map(|(_, id)| *id)
                        .collect();
                    assert!(
                        index.contains(subset.as_slice()),
                        "{:?} frequent but subset {:?} is not",
                        s.items,
                        subset
                    );
                }
            }
        }
    }

    #[test]
    fn mining_is_deterministic() {
        let baskets = pseudo_random_baskets(42, 80, 10);
        let first = mine(&baskets, 0.08, None);
        let second = mine(&baskets, 0.08, None);
        assert_eq!(first, second);
    }
}
