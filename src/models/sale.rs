use serde::{Deserialize, Serialize};

pub type ProductId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLineItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// One completed sale pulled from the transaction feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleTransaction {
    pub id: i64,
    pub invoice_no: String,
    pub status: String,
    pub sale_time: i64,
    pub line_items: Vec<SaleLineItem>,
}

pub const STATUS_COMPLETED: &str = "completed";
