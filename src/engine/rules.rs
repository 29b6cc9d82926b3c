use std::collections::HashMap;

use crate::models::{AssociationRule, FrequentItemSet, ProductId, RuleStrength};

/// Derive directional rules from the mined itemsets.
///
/// Every non-empty proper subset A of a frequent itemset S (|S| >= 2) yields
/// the candidate rule A -> S-A. Confidence and lift come from the support
/// counts recorded during mining; the baskets are never re-scanned. Rules
/// below `min_confidence` are discarded outright, not stored as weak.
pub fn generate(
    frequent: &[FrequentItemSet],
    min_confidence: f64,
    total_baskets: usize,
) -> Vec<AssociationRule> {
    if total_baskets == 0 {
        return Vec::new();
    }

    let support_index: HashMap<&[ProductId], usize> = frequent
        .iter()
        .map(|s| (s.items.as_slice(), s.support_count))
        .collect();

    let mut rules = Vec::new();
    for itemset in frequent {
        let n = itemset.size();
        if n < 2 {
            continue;
        }

        // Masks enumerate every non-empty proper subset as the antecedent.
        for mask in 1..((1usize << n) - 1) {
            let mut antecedent = Vec::new();
            let mut consequent = Vec::new();
            for (i, id) in itemset.items.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    antecedent.push(*id);
                } else {
                    consequent.push(*id);
                }
            }

            // Both subsets of a frequent itemset are themselves frequent, so
            // the lookups should always hit; a zero or missing count would
            // mean a division by zero, so such rules are skipped.
            let antecedent_count = match support_index.get(antecedent.as_slice()) {
                Some(count) if *count > 0 => *count,
                _ => continue,
            };
            let consequent_count = match support_index.get(consequent.as_slice()) {
                Some(count) if *count > 0 => *count,
                _ => continue,
            };

            let confidence = itemset.support_count as f64 / antecedent_count as f64;
            if confidence < min_confidence {
                continue;
            }

            let consequent_support = consequent_count as f64 / total_baskets as f64;
            let lift = confidence / consequent_support;

            rules.push(AssociationRule {
                antecedent,
                consequent,
                support: itemset.support,
                support_count: itemset.support_count,
                confidence,
                lift,
                strength: RuleStrength::classify(confidence, lift),
            });
        }
    }

    rules
}
