use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Connection;

use crate::models::{ProductId, SaleLineItem, SaleTransaction, STATUS_COMPLETED};

/// Transaction feed: completed sales whose sale_time falls inside the
/// inclusive window, with their line items, ordered by transaction id.
pub fn get_completed_transactions(
    conn: &Connection,
    period_start: i64,
    period_end: i64,
) -> Result<Vec<SaleTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.invoice_no, t.status, t.sale_time, i.product_id, i.quantity
         FROM transactions t
         LEFT JOIN transaction_items i ON i.transaction_id = t.id
         WHERE t.status = ?1 AND t.sale_time >= ?2 AND t.sale_time <= ?3
         ORDER BY t.id, i.id",
    )?;

    let mut rows = stmt.query(rusqlite::params![STATUS_COMPLETED, period_start, period_end])?;
    let mut transactions: Vec<SaleTransaction> = Vec::new();

    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let product_id: Option<i64> = row.get(4)?;

        if transactions.last().map(|t| t.id) != Some(id) {
            transactions.push(SaleTransaction {
                id,
                invoice_no: row.get(1)?,
                status: row.get(2)?,
                sale_time: row.get(3)?,
                line_items: Vec::new(),
            });
        }

        // LEFT JOIN keeps item-less transactions; they become empty baskets.
        if let Some(product_id) = product_id {
            let current = transactions
                .last_mut()
                .ok_or_else(|| anyhow::anyhow!("transaction row vanished while grouping"))?;
            current.line_items.push(SaleLineItem {
                product_id,
                quantity: row.get(5)?,
            });
        }
    }

    Ok(transactions)
}

/// Batched catalog lookup for every product id a run references. One query
/// per run; ids missing from the catalog are simply absent from the map and
/// resolve to a placeholder label downstream.
pub fn get_product_labels(
    conn: &Connection,
    product_ids: &[ProductId],
) -> Result<HashMap<ProductId, String>> {
    let mut labels = HashMap::new();
    if product_ids.is_empty() {
        return Ok(labels);
    }

    let placeholders = (1..=product_ids.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(",");
    let sql = format!("SELECT id, name FROM products WHERE id IN ({})", placeholders);

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::types::ToSql> = product_ids
        .iter()
        .map(|id| id as &dyn rusqlite::types::ToSql)
        .collect();

    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
    })?;

    for row in rows {
        let (id, name) = row?;
        labels.insert(id, name);
    }

    Ok(labels)
}

pub fn insert_product(conn: &Connection, code: &str, name: &str) -> Result<ProductId> {
    conn.execute(
        "INSERT INTO products (code, name) VALUES (?1, ?2)",
        rusqlite::params![code, name],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_transaction(
    conn: &Connection,
    invoice_no: &str,
    status: &str,
    sale_time: i64,
    line_items: &[(ProductId, i32)],
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (invoice_no, status, sale_time) VALUES (?1, ?2, ?3)",
        rusqlite::params![invoice_no, status, sale_time],
    )?;
    let transaction_id = conn.last_insert_rowid();

    for (product_id, quantity) in line_items {
        conn.execute(
            "INSERT INTO transaction_items (transaction_id, product_id, quantity)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![transaction_id, product_id, quantity],
        )?;
    }

    Ok(transaction_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::init_in_memory;

    #[test]
    fn feed_filters_status_and_window_inclusively() {
        let conn = init_in_memory().unwrap();
        let a = insert_product(&conn, "P-A", "Product A").unwrap();
        let b = insert_product(&conn, "P-B", "Product B").unwrap();

        insert_transaction(&conn, "INV-1", "completed", 100, &[(a, 1), (b, 2)]).unwrap();
        insert_transaction(&conn, "INV-2", "completed", 200, &[(a, 1)]).unwrap();
        insert_transaction(&conn, "INV-3", "pending", 150, &[(a, 1)]).unwrap();
        insert_transaction(&conn, "INV-4", "completed", 201, &[(b, 1)]).unwrap();

        let feed = get_completed_transactions(&conn, 100, 200).unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].invoice_no, "INV-1");
        assert_eq!(feed[0].line_items.len(), 2);
        assert_eq!(feed[1].invoice_no, "INV-2");
    }

    #[test]
    fn feed_keeps_transactions_without_items() {
        let conn = init_in_memory().unwrap();
        insert_transaction(&conn, "INV-1", "completed", 100, &[]).unwrap();

        let feed = get_completed_transactions(&conn, 0, 1000).unwrap();
        assert_eq!(feed.len(), 1);
        assert!(feed[0].line_items.is_empty());
    }

    #[test]
    fn label_lookup_is_batched_and_partial() {
        let conn = init_in_memory().unwrap();
        let a = insert_product(&conn, "P-A", "Product A").unwrap();
        let labels = get_product_labels(&conn, &[a, 9999]).unwrap();
        assert_eq!(labels.get(&a).map(String::as_str), Some("Product A"));
        assert!(!labels.contains_key(&9999));
        assert!(get_product_labels(&conn, &[]).unwrap().is_empty());
    }
}
