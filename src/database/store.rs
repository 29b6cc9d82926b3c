use anyhow::{Context, Result};
use rusqlite::Connection;
use thiserror::Error;

use crate::database::schema::{KIND_ASSOCIATION_RULE, KIND_FREQUENT_ITEMSET};
use crate::models::{AnalysisRun, ProductId, RecommendationEntry, RunSummary, StoredResult};

/// A second run over an in-flight overlapping period is rejected, not queued.
#[derive(Debug, Error, PartialEq)]
#[error("an analysis run is already in flight for period {period_start}..{period_end}")]
pub struct PeriodLocked {
    pub period_start: i64,
    pub period_end: i64,
}

/// Locks older than this are assumed to belong to a crashed run and are
/// reclaimed on the next acquisition attempt.
const LOCK_TTL_SECS: i64 = 3600;

/// Atomically supersede any stored run whose period overlaps `run`'s period,
/// then insert the new run with all its itemsets, rules and recommendations.
///
/// Everything happens inside a single transaction: a reader either sees the
/// prior run intact or the new run complete, never a mix, and any failure
/// rolls back to the prior state.
pub fn replace_run(conn: &mut Connection, run: &AnalysisRun) -> Result<i64> {
    let tx = conn.transaction()?;

    // Supersede: hard-delete every overlapping run and its child rows.
    tx.execute(
        "DELETE FROM recommendations WHERE run_id IN (
            SELECT id FROM analysis_runs WHERE period_start <= ?1 AND period_end >= ?2
         )",
        rusqlite::params![run.period_end, run.period_start],
    )?;
    tx.execute(
        "DELETE FROM analysis_results WHERE run_id IN (
            SELECT id FROM analysis_runs WHERE period_start <= ?1 AND period_end >= ?2
         )",
        rusqlite::params![run.period_end, run.period_start],
    )?;
    tx.execute(
        "DELETE FROM analysis_runs WHERE period_start <= ?1 AND period_end >= ?2",
        rusqlite::params![run.period_end, run.period_start],
    )?;

    tx.execute(
        "INSERT INTO analysis_runs
         (uuid, period_start, period_end, generated_at, basket_count,
          itemset_count, rule_count, recommendation_count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        rusqlite::params![
            run.uuid,
            run.period_start,
            run.period_end,
            run.generated_at,
            run.basket_count as i64,
            run.itemsets.len() as i64,
            run.rules.len() as i64,
            run.recommendations.len() as i64,
        ],
    )?;
    let run_id = tx.last_insert_rowid();

    for itemset in &run.itemsets {
        tx.execute(
            "INSERT INTO analysis_results
             (run_id, result_kind, item_ids, item_label, itemset_size, support, support_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                run_id,
                KIND_FREQUENT_ITEMSET,
                serde_json::to_string(&itemset.items)?,
                run.itemset_label(&itemset.items),
                itemset.items.len() as i64,
                itemset.support,
                itemset.support_count as i64,
            ],
        )?;
    }

    for rule in &run.rules {
        let mut union = rule.antecedent.clone();
        union.extend_from_slice(&rule.consequent);
        union.sort_unstable();
        let label = format!(
            "{} => {}",
            run.itemset_label(&rule.antecedent),
            run.itemset_label(&rule.consequent)
        );
        tx.execute(
            "INSERT INTO analysis_results
             (run_id, result_kind, item_ids, item_label, antecedent_ids, consequent_ids,
              itemset_size, support, support_count, confidence, lift, strength)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                run_id,
                KIND_ASSOCIATION_RULE,
                serde_json::to_string(&union)?,
                label,
                serde_json::to_string(&rule.antecedent)?,
                serde_json::to_string(&rule.consequent)?,
                union.len() as i64,
                rule.support,
                rule.support_count as i64,
                rule.confidence,
                rule.lift,
                rule.strength.as_str(),
            ],
        )?;
    }

    for rec in &run.recommendations {
        tx.execute(
            "INSERT INTO recommendations
             (run_id, source_product_id, recommended_product_id, score,
              co_occurrence_count, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                run_id,
                rec.source_product_id,
                rec.recommended_product_id,
                rec.score,
                rec.co_occurrence_count as i64,
                rec.is_active as i64,
            ],
        )?;
    }

    tx.commit()?;
    Ok(run_id)
}

/// Active recommendations for a product, from the newest run that has rows
/// for it, ordered best-first. Consumed by checkout upsell and merchandising.
pub fn fetch_recommendations(
    conn: &Connection,
    product_id: ProductId,
    limit: usize,
) -> Result<Vec<RecommendationEntry>> {
    let mut stmt = conn.prepare(
        "SELECT r.recommended_product_id,
                COALESCE(p.name, 'product #' || r.recommended_product_id),
                r.score, r.co_occurrence_count
         FROM recommendations r
         LEFT JOIN products p ON p.id = r.recommended_product_id
         WHERE r.source_product_id = ?1 AND r.is_active = 1
           AND r.run_id = (
               SELECT MAX(run_id) FROM recommendations
               WHERE source_product_id = ?1 AND is_active = 1
           )
         ORDER BY r.score DESC, r.co_occurrence_count DESC, r.recommended_product_id
         LIMIT ?2",
    )?;

    let entries = stmt
        .query_map(rusqlite::params![product_id, limit as i64], |row| {
            Ok(RecommendationEntry {
                recommended_product_id: row.get(0)?,
                product_name: row.get(1)?,
                score: row.get(2)?,
                co_occurrence_count: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(entries)
}

/// Soft retirement of a single pair; the row stays for audit but stops being
/// served. Returns false when no matching active row exists.
pub fn deactivate_recommendation(
    conn: &Connection,
    source_product_id: ProductId,
    recommended_product_id: ProductId,
) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE recommendations SET is_active = 0
         WHERE source_product_id = ?1 AND recommended_product_id = ?2 AND is_active = 1",
        rusqlite::params![source_product_id, recommended_product_id],
    )?;
    Ok(changed > 0)
}

pub fn get_run_summaries(conn: &Connection) -> Result<Vec<RunSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, uuid, period_start, period_end, generated_at, basket_count,
                itemset_count, rule_count, recommendation_count
         FROM analysis_runs
         ORDER BY generated_at DESC, id DESC",
    )?;

    let summaries = stmt
        .query_map([], |row| {
            Ok(RunSummary {
                id: row.get(0)?,
                uuid: row.get(1)?,
                period_start: row.get(2)?,
                period_end: row.get(3)?,
                generated_at: row.get(4)?,
                basket_count: row.get(5)?,
                itemset_count: row.get(6)?,
                rule_count: row.get(7)?,
                recommendation_count: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(summaries)
}

/// Stored results of one kind (`frequent_itemset` or `association_rule`)
/// belonging to runs whose period overlaps the query window.
pub fn get_results(
    conn: &Connection,
    result_kind: &str,
    period_start: i64,
    period_end: i64,
) -> Result<Vec<StoredResult>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.run_id, r.result_kind, r.item_ids, r.item_label,
                r.antecedent_ids, r.consequent_ids, r.itemset_size,
                r.support, r.support_count, r.confidence, r.lift, r.strength
         FROM analysis_results r
         JOIN analysis_runs a ON a.id = r.run_id
         WHERE r.result_kind = ?1 AND a.period_start <= ?2 AND a.period_end >= ?3
         ORDER BY r.support DESC, r.id",
    )?;

    let rows = stmt
        .query_map(
            rusqlite::params![result_kind, period_end, period_start],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, i64>(7)?,
                    row.get::<_, f64>(8)?,
                    row.get::<_, i64>(9)?,
                    row.get::<_, Option<f64>>(10)?,
                    row.get::<_, Option<f64>>(11)?,
                    row.get::<_, Option<String>>(12)?,
                ))
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;

    let mut results = Vec::with_capacity(rows.len());
    for (
        id,
        run_id,
        kind,
        item_ids,
        item_label,
        antecedent_ids,
        consequent_ids,
        itemset_size,
        support,
        support_count,
        confidence,
        lift,
        strength,
    ) in rows
    {
        results.push(StoredResult {
            id,
            run_id,
            result_kind: kind,
            item_ids: serde_json::from_str(&item_ids)
                .context("malformed item_ids in analysis_results")?,
            item_label,
            antecedent_ids: antecedent_ids
                .map(|s| serde_json::from_str(&s))
                .transpose()
                .context("malformed antecedent_ids in analysis_results")?,
            consequent_ids: consequent_ids
                .map(|s| serde_json::from_str(&s))
                .transpose()
                .context("malformed consequent_ids in analysis_results")?,
            itemset_size,
            support,
            support_count,
            confidence,
            lift,
            strength,
        });
    }

    Ok(results)
}

/// Take the advisory lock for a period, failing with `PeriodLocked` when a
/// live overlapping lock exists. Stale locks are reclaimed first.
pub fn acquire_period_lock(
    conn: &mut Connection,
    period_start: i64,
    period_end: i64,
) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let tx = conn.transaction()?;

    tx.execute(
        "DELETE FROM analysis_locks WHERE locked_at < ?1",
        [now - LOCK_TTL_SECS],
    )?;

    let holders: i64 = tx.query_row(
        "SELECT COUNT(*) FROM analysis_locks WHERE period_start <= ?1 AND period_end >= ?2",
        rusqlite::params![period_end, period_start],
        |row| row.get(0),
    )?;
    if holders > 0 {
        return Err(PeriodLocked {
            period_start,
            period_end,
        }
        .into());
    }

    tx.execute(
        "INSERT INTO analysis_locks (period_start, period_end, locked_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![period_start, period_end, now],
    )?;
    let lock_id = tx.last_insert_rowid();

    tx.commit()?;
    Ok(lock_id)
}

pub fn release_period_lock(conn: &Connection, lock_id: i64) -> Result<()> {
    conn.execute("DELETE FROM analysis_locks WHERE id = ?1", [lock_id])?;
    Ok(())
}
