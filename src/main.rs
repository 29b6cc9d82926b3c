use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use cartwise::database::schema::{KIND_ASSOCIATION_RULE, KIND_FREQUENT_ITEMSET};
use cartwise::database::{self, store};
use cartwise::engine;
use cartwise::models::AnalysisConfig;
use cartwise::utils::config::resolve_db_path;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Market basket analysis and product recommendations for retail POS", long_about = None)]
struct Cli {
    /// Path to the POS database (falls back to CARTWISE_DB, then cartwise.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine completed sales in a period and store fresh recommendations
    Analyze {
        /// First day of the period (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: String,

        /// Last day of the period (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: String,

        /// Minimum fraction of baskets an itemset must appear in, (0, 1]
        #[arg(long, default_value_t = 0.1)]
        min_support: f64,

        /// Minimum confidence a rule needs to be stored, (0, 1]
        #[arg(long, default_value_t = 0.3)]
        min_confidence: f64,

        /// Recommendations kept per source product
        #[arg(long, default_value_t = 5)]
        top_n: usize,

        /// Cap on mined itemset size (unbounded when omitted)
        #[arg(long)]
        max_size: Option<usize>,
    },

    /// Show stored recommendations for a product
    Recommend {
        /// Source product id
        #[arg(long)]
        product: i64,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Retire one stored recommendation pair without deleting it
    Retire {
        /// Source product id
        #[arg(long)]
        product: i64,

        /// Recommended product id to stop serving
        #[arg(long)]
        recommended: i64,
    },

    /// List stored analysis runs, newest first
    Runs,

    /// Show stored itemsets or rules for a period
    Report {
        #[arg(long, value_enum)]
        kind: ReportKind,

        /// First day of the period (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: String,

        /// Last day of the period (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportKind {
    Itemsets,
    Rules,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let db_path = resolve_db_path(cli.db);
    let mut conn = database::init_database(&db_path)?;

    match cli.command {
        Commands::Analyze {
            from,
            to,
            min_support,
            min_confidence,
            top_n,
            max_size,
        } => {
            let period_start = parse_day_start(&from)?;
            let period_end = parse_day_end(&to)?;
            let config = AnalysisConfig {
                min_support,
                min_confidence,
                top_n,
                max_itemset_size: max_size,
            };

            let summary = engine::run_analysis(&mut conn, period_start, period_end, &config)?;
            println!("run {} stored", summary.uuid);
            println!("  period:          {} .. {}", from, to);
            println!("  baskets:         {}", summary.basket_count);
            println!("  itemsets:        {}", summary.itemset_count);
            println!("  rules:           {}", summary.rule_count);
            println!("  recommendations: {}", summary.recommendation_count);
        }

        Commands::Recommend { product, limit } => {
            let entries = store::fetch_recommendations(&conn, product, limit)?;
            if entries.is_empty() {
                println!("no recommendations stored for product {}", product);
            }
            for entry in entries {
                println!(
                    "{:<6} {:<30} score {:.4}  seen together {}x",
                    entry.recommended_product_id,
                    entry.product_name,
                    entry.score,
                    entry.co_occurrence_count
                );
            }
        }

        Commands::Retire {
            product,
            recommended,
        } => {
            if store::deactivate_recommendation(&conn, product, recommended)? {
                println!("recommendation {} -> {} retired", product, recommended);
            } else {
                println!(
                    "no active recommendation {} -> {} to retire",
                    product, recommended
                );
            }
        }

        Commands::Runs => {
            let summaries = store::get_run_summaries(&conn)?;
            if summaries.is_empty() {
                println!("no analysis runs stored");
            }
            for s in summaries {
                println!(
                    "#{} {} period {} .. {} | {} baskets, {} itemsets, {} rules, {} recommendations",
                    s.id,
                    format_day(s.generated_at),
                    format_day(s.period_start),
                    format_day(s.period_end),
                    s.basket_count,
                    s.itemset_count,
                    s.rule_count,
                    s.recommendation_count
                );
            }
        }

        Commands::Report { kind, from, to } => {
            let period_start = parse_day_start(&from)?;
            let period_end = parse_day_end(&to)?;
            let kind = match kind {
                ReportKind::Itemsets => KIND_FREQUENT_ITEMSET,
                ReportKind::Rules => KIND_ASSOCIATION_RULE,
            };

            let results = store::get_results(&conn, kind, period_start, period_end)?;
            if results.is_empty() {
                println!("no stored {} rows for {} .. {}", kind, from, to);
            }
            for r in results {
                match (r.confidence, r.lift) {
                    (Some(confidence), Some(lift)) => println!(
                        "{:<50} support {:.4} ({}x)  confidence {:.4}  lift {:.4}  {}",
                        r.item_label,
                        r.support,
                        r.support_count,
                        confidence,
                        lift,
                        r.strength.unwrap_or_default()
                    ),
                    _ => println!(
                        "{:<50} support {:.4} ({}x)  size {}",
                        r.item_label, r.support, r.support_count, r.itemset_size
                    ),
                }
            }
        }
    }

    Ok(())
}

fn parse_day(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|e| anyhow!("invalid date '{}': {} (expected YYYY-MM-DD)", input, e))
}

fn parse_day_start(input: &str) -> Result<i64> {
    Ok(parse_day(input)?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("invalid start of day for '{}'", input))?
        .and_utc()
        .timestamp())
}

fn parse_day_end(input: &str) -> Result<i64> {
    Ok(parse_day(input)?
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| anyhow!("invalid end of day for '{}'", input))?
        .and_utc()
        .timestamp())
}

fn format_day(timestamp: i64) -> String {
    match chrono::DateTime::from_timestamp(timestamp, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => timestamp.to_string(),
    }
}
