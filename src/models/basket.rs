use serde::{Deserialize, Serialize};

use crate::models::ProductId;

/// The distinct products bought together in one completed transaction.
///
/// Items are kept as a sorted, deduplicated vector so that two baskets with
/// the same members compare equal regardless of line-item order. Baskets are
/// transient: built fresh for each analysis run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    pub transaction_id: i64,
    pub items: Vec<ProductId>,
}

impl Basket {
    pub fn new(transaction_id: i64, mut product_ids: Vec<ProductId>) -> Self {
        product_ids.sort_unstable();
        product_ids.dedup();
        Self {
            transaction_id,
            items: product_ids,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when every id in `itemset` (sorted) is present in this basket.
    pub fn contains_all(&self, itemset: &[ProductId]) -> bool {
        // Both sides are sorted, so a linear merge walk suffices.
        let mut pos = 0;
        for id in itemset {
            match self.items[pos..].binary_search(id) {
                Ok(found) => pos += found + 1,
                Err(_) => return false,
            }
        }
        true
    }
}

/// A frequent itemset: canonical sorted product ids plus its support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentItemSet {
    /// Sorted, distinct product ids. Canonical ordering keeps candidate
    /// joins and subset lookups order-independent across runs.
    pub items: Vec<ProductId>,
    /// Number of baskets containing all members.
    pub support_count: usize,
    /// support_count / total basket count, in (0, 1].
    pub support: f64,
}

impl FrequentItemSet {
    pub fn size(&self) -> usize {
        self.items.len()
    }
}
