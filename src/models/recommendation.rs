use serde::{Deserialize, Serialize};

use crate::models::ProductId;

/// One ranked "customers also bought" pair, produced wholesale per analysis
/// run and owned by the result store. `is_active` allows a merchandiser to
/// retire a single pair without deleting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub source_product_id: ProductId,
    pub recommended_product_id: ProductId,
    /// confidence * lift of the underlying pairwise rule; higher is better.
    pub score: f64,
    /// Baskets in which the pair co-occurred (the union itemset's count).
    pub co_occurrence_count: usize,
    pub is_active: bool,
}

/// Read-side row returned to checkout upsell and merchandising consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub recommended_product_id: ProductId,
    pub product_name: String,
    pub score: f64,
    pub co_occurrence_count: i64,
}
