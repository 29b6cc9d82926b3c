use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{AssociationRule, ProductId, Recommendation};

/// Collapse pairwise rules into per-product top-N recommendation lists.
///
/// Only rules with a single-product antecedent and consequent feed the
/// ranking; wider rules stay in the association-rule report. The score is
/// `confidence * lift`, so a lift at or under 1 pulls the score toward or
/// below the bare confidence. Ordering is fully deterministic: score desc,
/// then co-occurrence count desc, then recommended product id asc.
pub fn rank(rules: &[AssociationRule], top_n: usize) -> Vec<Recommendation> {
    let mut by_source: BTreeMap<ProductId, Vec<Recommendation>> = BTreeMap::new();

    for rule in rules {
        if rule.antecedent.len() != 1 || rule.consequent.len() != 1 {
            continue;
        }
        by_source
            .entry(rule.antecedent[0])
            .or_default()
            .push(Recommendation {
                source_product_id: rule.antecedent[0],
                recommended_product_id: rule.consequent[0],
                score: rule.confidence * rule.lift,
                co_occurrence_count: rule.support_count,
                is_active: true,
            });
    }

    let mut ranked = Vec::new();
    for (_, mut group) in by_source {
        group.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(b.co_occurrence_count.cmp(&a.co_occurrence_count))
                .then(a.recommended_product_id.cmp(&b.recommended_product_id))
        });
        group.truncate(top_n);
        ranked.extend(group);
    }

    ranked
}
