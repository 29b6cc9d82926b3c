use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{AssociationRule, FrequentItemSet, ProductId, Recommendation};

/// Everything one analysis pass produced, handed to the result store as a
/// single value. A run supersedes any previously stored run whose period
/// overlaps; runs are never merged.
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub uuid: String,
    /// Inclusive period bounds, epoch seconds.
    pub period_start: i64,
    pub period_end: i64,
    pub generated_at: i64,
    /// Fixed at extraction time; includes size-0/1 baskets.
    pub basket_count: usize,
    pub itemsets: Vec<FrequentItemSet>,
    pub rules: Vec<AssociationRule>,
    pub recommendations: Vec<Recommendation>,
    /// Batched catalog labels for every product id the run references.
    pub labels: HashMap<ProductId, String>,
}

impl AnalysisRun {
    pub fn label_for(&self, id: ProductId) -> String {
        match self.labels.get(&id) {
            Some(name) => name.clone(),
            None => format!("product #{}", id),
        }
    }

    /// Display label for an itemset, e.g. "Kopi Hitam + Gula Pasir".
    pub fn itemset_label(&self, items: &[ProductId]) -> String {
        items
            .iter()
            .map(|id| self.label_for(*id))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// One persisted analysis row, either a frequent itemset or an association
/// rule depending on `result_kind`. Rule-only columns are None for itemsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResult {
    pub id: i64,
    pub run_id: i64,
    pub result_kind: String,
    pub item_ids: Vec<ProductId>,
    pub item_label: String,
    pub antecedent_ids: Option<Vec<ProductId>>,
    pub consequent_ids: Option<Vec<ProductId>>,
    pub itemset_size: i64,
    pub support: f64,
    pub support_count: i64,
    pub confidence: Option<f64>,
    pub lift: Option<f64>,
    pub strength: Option<String>,
}

/// Stored run header shown on the admin analytics screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: i64,
    pub uuid: String,
    pub period_start: i64,
    pub period_end: i64,
    pub generated_at: i64,
    pub basket_count: i64,
    pub itemset_count: i64,
    pub rule_count: i64,
    pub recommendation_count: i64,
}
