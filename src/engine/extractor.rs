use anyhow::Result;
use rusqlite::Connection;

use crate::database::queries;
use crate::models::Basket;

/// Group each completed transaction in the inclusive window into one basket
/// of distinct product ids. Size-0/1 baskets are kept: they cannot form
/// itemsets but they count toward the support denominator.
pub fn extract_baskets(
    conn: &Connection,
    period_start: i64,
    period_end: i64,
) -> Result<Vec<Basket>> {
    let transactions = queries::get_completed_transactions(conn, period_start, period_end)?;

    let baskets = transactions
        .into_iter()
        .map(|t| {
            let product_ids = t.line_items.iter().map(|item| item.product_id).collect();
            Basket::new(t.id, product_ids)
        })
        .collect();

    Ok(baskets)
}
