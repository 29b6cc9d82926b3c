use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;

use crate::database::store;
use crate::models::{AnalysisConfig, AnalysisRun, RunSummary};

pub mod apriori;
pub mod extractor;
pub mod labels;
pub mod ranker;
pub mod rules;

/// Run the full analysis pipeline for one period and persist the result.
///
/// extract -> mine -> generate rules -> rank -> label -> replace. Stages run
/// strictly in sequence; every stage error bubbles up here and aborts the run
/// before the store is touched. A period with no completed sales is not an
/// error: the run completes with empty results, which still clears any stale
/// prior results for that period.
pub fn run_analysis(
    conn: &mut Connection,
    period_start: i64,
    period_end: i64,
    config: &AnalysisConfig,
) -> Result<RunSummary> {
    config.validate()?;
    if period_start > period_end {
        return Err(anyhow!(
            "period start {} is after period end {}",
            period_start,
            period_end
        ));
    }

    // Serialize runs over overlapping periods; a second request is rejected.
    let lock_id = store::acquire_period_lock(conn, period_start, period_end)?;
    let outcome = execute_run(conn, period_start, period_end, config);
    let released = store::release_period_lock(conn, lock_id);

    let summary = outcome?;
    released?;
    Ok(summary)
}

fn execute_run(
    conn: &mut Connection,
    period_start: i64,
    period_end: i64,
    config: &AnalysisConfig,
) -> Result<RunSummary> {
    let baskets = extractor::extract_baskets(conn, period_start, period_end)
        .context("failed to read the transaction feed")?;
    log::info!(
        "extracted {} baskets for period {}..{}",
        baskets.len(),
        period_start,
        period_end
    );

    let itemsets = apriori::mine(&baskets, config.min_support, config.max_itemset_size);
    log::info!(
        "mined {} frequent itemsets at min_support {}",
        itemsets.len(),
        config.min_support
    );

    let rules = rules::generate(&itemsets, config.min_confidence, baskets.len());
    log::info!(
        "generated {} rules at min_confidence {}",
        rules.len(),
        config.min_confidence
    );

    let recommendations = ranker::rank(&rules, config.top_n);
    let labels = labels::resolve_labels(conn, &itemsets, &rules, &recommendations)?;

    let run = AnalysisRun {
        uuid: uuid::Uuid::new_v4().to_string(),
        period_start,
        period_end,
        generated_at: chrono::Utc::now().timestamp(),
        basket_count: baskets.len(),
        itemsets,
        rules,
        recommendations,
        labels,
    };

    let run_id = store::replace_run(conn, &run).context("failed to persist the analysis run")?;
    log::info!(
        "stored run {} ({} itemsets, {} rules, {} recommendations)",
        run.uuid,
        run.itemsets.len(),
        run.rules.len(),
        run.recommendations.len()
    );

    Ok(RunSummary {
        id: run_id,
        uuid: run.uuid,
        period_start,
        period_end,
        generated_at: run.generated_at,
        basket_count: run.basket_count as i64,
        itemset_count: run.itemsets.len() as i64,
        rule_count: run.rules.len() as i64,
        recommendation_count: run.recommendations.len() as i64,
    })
}
