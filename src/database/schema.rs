use anyhow::Result;
use rusqlite::Connection;

pub const KIND_FREQUENT_ITEMSET: &str = "frequent_itemset";
pub const KIND_ASSOCIATION_RULE: &str = "association_rule";

pub fn create_tables(conn: &Connection) -> Result<()> {
    // Product catalog (read-only for this engine)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL
        )",
        [],
    )?;

    // Sales transactions (read-only for this engine)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            invoice_no TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL,
            sale_time INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transaction_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            transaction_id INTEGER NOT NULL,
            product_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY (transaction_id) REFERENCES transactions(id),
            FOREIGN KEY (product_id) REFERENCES products(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_sale_time ON transactions(sale_time)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_items_transaction_id
         ON transaction_items(transaction_id)",
        [],
    )?;

    // Analysis runs (owned by the engine)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS analysis_runs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uuid TEXT NOT NULL UNIQUE,
            period_start INTEGER NOT NULL,
            period_end INTEGER NOT NULL,
            generated_at INTEGER NOT NULL,
            basket_count INTEGER NOT NULL,
            itemset_count INTEGER NOT NULL,
            rule_count INTEGER NOT NULL,
            recommendation_count INTEGER NOT NULL
        )",
        [],
    )?;

    // Frequent itemsets and association rules, one flat row each.
    // Item id vectors are stored as JSON arrays; labels are denormalized
    // display strings resolved once per run.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS analysis_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id INTEGER NOT NULL,
            result_kind TEXT NOT NULL,
            item_ids TEXT NOT NULL,
            item_label TEXT NOT NULL,
            antecedent_ids TEXT,
            consequent_ids TEXT,
            itemset_size INTEGER NOT NULL,
            support REAL NOT NULL,
            support_count INTEGER NOT NULL,
            confidence REAL,
            lift REAL,
            strength TEXT,
            FOREIGN KEY (run_id) REFERENCES analysis_runs(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS recommendations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id INTEGER NOT NULL,
            source_product_id INTEGER NOT NULL,
            recommended_product_id INTEGER NOT NULL,
            score REAL NOT NULL,
            co_occurrence_count INTEGER NOT NULL,
            is_active INTEGER DEFAULT 1,
            FOREIGN KEY (run_id) REFERENCES analysis_runs(id),
            FOREIGN KEY (source_product_id) REFERENCES products(id),
            FOREIGN KEY (recommended_product_id) REFERENCES products(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_analysis_results_run_kind
         ON analysis_results(run_id, result_kind)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_recommendations_source
         ON recommendations(source_product_id, is_active)",
        [],
    )?;

    // Advisory locks serializing runs over overlapping periods
    conn.execute(
        "CREATE TABLE IF NOT EXISTS analysis_locks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            period_start INTEGER NOT NULL,
            period_end INTEGER NOT NULL,
            locked_at INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}
