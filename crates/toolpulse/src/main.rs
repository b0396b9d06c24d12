//! toolpulse - local usage telemetry for developer tools

mod cli;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use toolpulse_core::aggregation::summarize;
use toolpulse_core::{
    AggregationSummary, Aggregator, AnalyticsConfig, AnalyticsEvent, ErrorCategory, EventStore,
    InsightsGenerator, PeriodType, UsageStats,
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "toolpulse",
    version,
    about = "Local usage telemetry for developer tools",
    long_about = "Records tool invocations into date-partitioned JSON files and reports\n\
                  usage statistics, trends and rule-based insights. Nothing leaves the machine.\n\
                  \n\
                  Examples:\n\
                    toolpulse record format_code --duration-ms 42\n\
                    toolpulse record search_docs --duration-ms 900 --failed timeout\n\
                    toolpulse stats --since 7d           # Last week\n\
                    toolpulse periods --period weekly    # Weekly buckets\n\
                    toolpulse insights --text            # Plain-text report\n\
                    toolpulse cleanup --dry-run          # Preview retention pruning\n\
                  \n\
                  Environment Variables:\n\
                    TOOLPULSE_DATA_DIR                   # Override the data directory\n\
                    TOOLPULSE_CONFIG                     # Path to a TOML config file\n\
                    TOOLPULSE_NO_COLOR                   # Disable ANSI colors\n\
                    RUST_LOG                             # Override log filtering"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding partition files
    #[arg(long, global = true, env = "TOOLPULSE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true, env = "TOOLPULSE_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Disable ANSI colors
    #[arg(long, global = true, env = "TOOLPULSE_NO_COLOR")]
    no_color: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one tool invocation
    Record {
        /// Tool name
        tool: String,
        /// Invocation duration in milliseconds
        #[arg(long)]
        duration_ms: f64,
        /// Session identifier
        #[arg(long, default_value = "cli")]
        session: String,
        /// Mark the invocation as failed with this category
        #[arg(long, value_enum)]
        failed: Option<CategoryArg>,
        /// ISO-8601 timestamp (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Usage statistics for a window
    Stats {
        /// Start: 7d, 3m, 1y or YYYY-MM-DD (default: 30 days ago)
        #[arg(long, short = 's')]
        since: Option<String>,
        /// End date, YYYY-MM-DD (default: today)
        #[arg(long, short = 'u')]
        until: Option<String>,
        /// Show a single tool
        #[arg(long, short = 't')]
        tool: Option<String>,
    },
    /// Daily usage series and trend per tool
    Trends {
        #[arg(long, short = 's')]
        since: Option<String>,
        #[arg(long, short = 'u')]
        until: Option<String>,
    },
    /// Daily, weekly or monthly buckets per tool
    Periods {
        #[arg(long, short = 'p', default_value = "daily")]
        period: PeriodType,
        #[arg(long, short = 't')]
        tool: Option<String>,
        #[arg(long, short = 's')]
        since: Option<String>,
        #[arg(long, short = 'u')]
        until: Option<String>,
    },
    /// Rank tools by popularity, error rate or latency
    Top {
        #[arg(long, value_enum, default_value = "popularity")]
        by: RankBy,
        #[arg(long, short = 'n', default_value = "10")]
        limit: usize,
        #[arg(long, short = 's')]
        since: Option<String>,
        #[arg(long, short = 'u')]
        until: Option<String>,
    },
    /// Insights report
    Insights {
        #[arg(long, short = 's')]
        since: Option<String>,
        #[arg(long, short = 'u')]
        until: Option<String>,
        /// Print the plain-text report
        #[arg(long)]
        text: bool,
    },
    /// Remove partitions older than the retention window
    Cleanup {
        /// Report what would be removed without deleting
        #[arg(long)]
        dry_run: bool,
    },
    /// Show storage usage
    Storage,
    /// Delete every partition, set-aside corrupt partition and temp file
    Purge {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Validation,
    Runtime,
    Timeout,
    Unknown,
}

impl From<CategoryArg> for ErrorCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Validation => ErrorCategory::Validation,
            CategoryArg::Runtime => ErrorCategory::Runtime,
            CategoryArg::Timeout => ErrorCategory::Timeout,
            CategoryArg::Unknown => ErrorCategory::Unknown,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RankBy {
    Popularity,
    Errors,
    Latency,
}

/// Output flags shared by every command
#[derive(Clone, Copy)]
struct Output {
    json: bool,
    no_color: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(value).context("Failed to serialize output")?
            );
        } else {
            println!("{}", human());
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AnalyticsConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    debug!(data_dir = %config.data_dir.display(), "Using data directory");

    let store = Arc::new(EventStore::new(config.clone()));
    let out = Output {
        json: cli.json,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Record {
            tool,
            duration_ms,
            session,
            failed,
            at,
        } => run_record(&store, tool, duration_ms, session, failed, at, out).await,
        Commands::Stats { since, until, tool } => {
            run_stats(store, since, until, tool, out).await
        }
        Commands::Trends { since, until } => run_trends(store, since, until, out).await,
        Commands::Periods {
            period,
            tool,
            since,
            until,
        } => run_periods(store, period, tool, since, until, out).await,
        Commands::Top {
            by,
            limit,
            since,
            until,
        } => run_top(store, by, limit, since, until, out).await,
        Commands::Insights { since, until, text } => {
            run_insights(store, config, since, until, text, out).await
        }
        Commands::Cleanup { dry_run } => run_cleanup(&store, dry_run, out).await,
        Commands::Storage => run_storage(&store, out).await,
        Commands::Purge { yes } => run_purge(&store, yes, out).await,
    }
}

/// Logs go to stderr so `--json` output stays parseable
fn init_tracing(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();

    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

async fn run_record(
    store: &EventStore,
    tool: String,
    duration_ms: f64,
    session: String,
    failed: Option<CategoryArg>,
    at: Option<String>,
    out: Output,
) -> Result<()> {
    let event = match failed {
        Some(category) => AnalyticsEvent::failure(tool, duration_ms, session, category.into()),
        None => AnalyticsEvent::success(tool, duration_ms, session),
    };
    let event = match at {
        Some(timestamp) => event.at(timestamp),
        None => event,
    };

    let outcome = store.append_event(event).await;
    if !outcome.success {
        bail!(
            "Failed to record event: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    if outcome.events_rejected > 0 {
        bail!("Event rejected (check --at and --duration-ms)");
    }

    out.emit(&outcome, || {
        format!("✓ Recorded {} event(s)", outcome.events_written)
    })
}

async fn run_stats(
    store: Arc<EventStore>,
    since: Option<String>,
    until: Option<String>,
    tool: Option<String>,
    out: Output,
) -> Result<()> {
    let (start, end) = cli::resolve_range(since.as_deref(), until.as_deref())?;
    let aggregator = Aggregator::new(store);

    if let Some(tool) = tool {
        let Some(metrics) = aggregator.tool_metrics(&tool, start, end).await else {
            bail!("No events for '{}' in this period", tool);
        };
        return out.emit(&metrics, || cli::format_tool_metrics(&metrics));
    }

    let stats = aggregator.usage_stats(start, end).await;
    let summary = summarize(&stats);

    #[derive(Serialize)]
    struct StatsOutput<'a> {
        stats: &'a UsageStats,
        summary: &'a AggregationSummary,
    }
    out.emit(
        &StatsOutput {
            stats: &stats,
            summary: &summary,
        },
        || cli::format_stats(&stats, &summary, out.no_color),
    )
}

async fn run_trends(
    store: Arc<EventStore>,
    since: Option<String>,
    until: Option<String>,
    out: Output,
) -> Result<()> {
    let (start, end) = cli::resolve_range(since.as_deref(), until.as_deref())?;
    let trends = Aggregator::new(store).usage_trends(start, end).await;
    out.emit(&trends, || cli::format_trends(&trends, out.no_color))
}

async fn run_periods(
    store: Arc<EventStore>,
    period: PeriodType,
    tool: Option<String>,
    since: Option<String>,
    until: Option<String>,
    out: Output,
) -> Result<()> {
    let (start, end) = cli::resolve_range(since.as_deref(), until.as_deref())?;
    let series = Aggregator::new(store)
        .period_counts(period, tool.as_deref(), start, end)
        .await;
    out.emit(&series, || cli::format_periods(&series, out.no_color))
}

async fn run_top(
    store: Arc<EventStore>,
    by: RankBy,
    limit: usize,
    since: Option<String>,
    until: Option<String>,
    out: Output,
) -> Result<()> {
    let (start, end) = cli::resolve_range(since.as_deref(), until.as_deref())?;
    let aggregator = Aggregator::new(store);
    let limit = Some(limit);

    match by {
        RankBy::Popularity => {
            let entries = aggregator.popularity_ranking(limit, start, end).await;
            out.emit(&entries, || cli::format_popularity(&entries, out.no_color))
        }
        RankBy::Errors => {
            let entries = aggregator.error_rates(limit, start, end).await;
            out.emit(&entries, || cli::format_error_rates(&entries, out.no_color))
        }
        RankBy::Latency => {
            let entries = aggregator.response_times(limit, start, end).await;
            out.emit(&entries, || cli::format_response_times(&entries, out.no_color))
        }
    }
}

async fn run_insights(
    store: Arc<EventStore>,
    config: AnalyticsConfig,
    since: Option<String>,
    until: Option<String>,
    text: bool,
    out: Output,
) -> Result<()> {
    let (start, end) = cli::resolve_range(since.as_deref(), until.as_deref())?;
    let generator = InsightsGenerator::with_store_tracker(Aggregator::new(store), config.insights);

    if text && !out.json {
        print!("{}", generator.text_report(start, end).await);
        return Ok(());
    }

    let (report, summary) = generator.report_with_summary(start, end).await;
    out.emit(&report, || {
        cli::format_insights_table(&report, &summary, out.no_color)
    })
}

async fn run_cleanup(store: &EventStore, dry_run: bool, out: Output) -> Result<()> {
    let outcome = store.run_cleanup(dry_run).await;
    if !outcome.success {
        bail!(
            "Cleanup failed after {} file(s): {}",
            outcome.files_removed,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    out.emit(&outcome, || cli::format_cleanup(&outcome))
}

async fn run_storage(store: &EventStore, out: Output) -> Result<()> {
    let info = store.storage_info().await;
    if !info.success {
        bail!(
            "Failed to inspect {}: {}",
            info.data_dir.display(),
            info.error.as_deref().unwrap_or("unknown error")
        );
    }
    out.emit(&info, || cli::format_storage(&info))
}

async fn run_purge(store: &EventStore, yes: bool, out: Output) -> Result<()> {
    if !yes {
        bail!(
            "Refusing to delete all data in {} without --yes",
            store.data_dir().display()
        );
    }
    let outcome = store.delete_all_data().await;
    if !outcome.success {
        bail!(
            "Purge failed after {} file(s): {}",
            outcome.files_deleted,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    out.emit(&outcome, || {
        format!(
            "✓ Deleted {} file(s) from {}",
            outcome.files_deleted,
            store.data_dir().display()
        )
    })
}
