use std::collections::{BTreeSet, HashMap};

use anyhow::Result;
use rusqlite::Connection;

use crate::database::queries;
use crate::models::{AssociationRule, FrequentItemSet, ProductId, Recommendation};

/// Resolve display labels for every product a run references in one batched
/// catalog query. Ids missing from the catalog stay absent from the map and
/// render as a placeholder at display time; labeling never fails a run.
pub fn resolve_labels(
    conn: &Connection,
    itemsets: &[FrequentItemSet],
    rules: &[AssociationRule],
    recommendations: &[Recommendation],
) -> Result<HashMap<ProductId, String>> {
    let mut ids: BTreeSet<ProductId> = BTreeSet::new();
    for itemset in itemsets {
        ids.extend(&itemset.items);
    }
    for rule in rules {
        ids.extend(&rule.antecedent);
        ids.extend(&rule.consequent);
    }
    for rec in recommendations {
        ids.insert(rec.source_product_id);
        ids.insert(rec.recommended_product_id);
    }

    let ids: Vec<ProductId> = ids.into_iter().collect();
    queries::get_product_labels(conn, &ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_in_memory;
    use crate::database::queries::insert_product;

    #[test]
    fn collects_ids_from_all_three_outputs_once() {
        let conn = init_in_memory().unwrap();
        let a = insert_product(&conn, "P-A", "Product A").unwrap();
        let b = insert_product(&conn, "P-B", "Product B").unwrap();

        let itemsets = vec![FrequentItemSet {
            items: vec![a, b],
            support_count: 2,
            support: 0.5,
        }];
        let recommendations = vec![Recommendation {
            source_product_id: a,
            recommended_product_id: 999, // not in catalog
            score: 1.0,
            co_occurrence_count: 2,
            is_active: true,
        }];

        let labels = resolve_labels(&conn, &itemsets, &[], &recommendations).unwrap();
        assert_eq!(labels.get(&a).map(String::as_str), Some("Product A"));
        assert_eq!(labels.get(&b).map(String::as_str), Some("Product B"));
        assert!(!labels.contains_key(&999));
    }
}
