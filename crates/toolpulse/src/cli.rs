//! Argument parsing helpers and table formatters for the toolpulse CLI

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use toolpulse_core::aggregation::{ErrorRateEntry, PopularityEntry, ResponseTimeEntry};
use toolpulse_core::insights::{format_insights, InsightsSummary};
use toolpulse_core::models::today;
use toolpulse_core::{
    AggregationSummary, CleanupOutcome, InsightSeverity, InsightsReport, StorageInfo, ToolMetrics,
    ToolPeriodCounts, UsageStats, UsageTrend,
};

// ============================================================================
// Date Filter
// ============================================================================

/// Relative or absolute start of a query window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Days(u32),
    Months(u32),
    Years(u32),
    Since(NaiveDate),
}

impl DateFilter {
    /// Parse from string: "7d", "3m", "1y", "YYYY-MM-DD"
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(stripped) = s.strip_suffix('d') {
            let days = stripped
                .parse::<u32>()
                .context("Invalid days format (expected: 7d)")?;
            return Ok(DateFilter::Days(days));
        }

        if let Some(stripped) = s.strip_suffix('m') {
            let months = stripped
                .parse::<u32>()
                .context("Invalid months format (expected: 3m)")?;
            return Ok(DateFilter::Months(months));
        }

        if let Some(stripped) = s.strip_suffix('y') {
            let years = stripped
                .parse::<u32>()
                .context("Invalid years format (expected: 1y)")?;
            return Ok(DateFilter::Years(years));
        }

        let date = parse_date(s)?;
        Ok(DateFilter::Since(date))
    }

    /// First calendar date covered, relative to `today`
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            DateFilter::Days(d) => today - Duration::days(i64::from(*d)),
            DateFilter::Months(m) => today - Duration::days(i64::from(*m) * 30),
            DateFilter::Years(y) => today - Duration::days(i64::from(*y) * 365),
            DateFilter::Since(date) => *date,
        }
    }
}

/// Strict `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", s))
}

/// Resolve `--since` / `--until` into optional window bounds
pub fn resolve_range(
    since: Option<&str>,
    until: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    let start = since
        .map(DateFilter::parse)
        .transpose()
        .context("Invalid --since")?
        .map(|filter| filter.start_date(today()));
    let end = until.map(parse_date).transpose().context("Invalid --until")?;
    Ok((start, end))
}

// ============================================================================
// Formatters
// ============================================================================

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn rate_cell(error_rate: f64, no_color: bool) -> Cell {
    let cell = Cell::new(format!("{:.1}%", error_rate));
    if no_color {
        return cell;
    }
    if error_rate >= 25.0 {
        cell.fg(Color::Red)
    } else if error_rate >= 10.0 {
        cell.fg(Color::Yellow)
    } else {
        cell
    }
}

pub fn format_stats(stats: &UsageStats, summary: &AggregationSummary, no_color: bool) -> String {
    let mut lines = vec![
        format!("Period:           {} to {}", stats.period_start, stats.period_end),
        format!("Invocations:      {}", stats.total_invocations),
        format!(
            "  Success/Error:  {} / {}",
            stats.success_count, stats.error_count
        ),
        format!("Error rate:       {:.1}%", stats.overall_error_rate),
        format!(
            "Avg duration:     {}",
            format_duration_ms(summary.overall_avg_duration_ms)
        ),
        format!(
            "Sessions:         {} ({:.1} invocations each)",
            stats.unique_sessions, stats.avg_invocations_per_session
        ),
    ];
    if !stats.tools_needing_attention.is_empty() {
        lines.push(format!(
            "Needs attention:  {}",
            stats.tools_needing_attention.join(", ")
        ));
    }

    if stats.is_empty() {
        lines.push(String::new());
        lines.push("No events recorded in this period.".to_string());
        return lines.join("\n");
    }

    let mut table = new_table(
        &["Tool", "Calls", "Errors", "Error %", "Avg", "P95", "Max", "Trend"],
        no_color,
    );
    for metrics in &stats.tool_metrics {
        let trend = stats
            .trend_for(&metrics.tool_name)
            .map(|t| t.trend.arrow())
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(&metrics.tool_name),
            Cell::new(metrics.invocation_count),
            Cell::new(metrics.error_count),
            rate_cell(metrics.error_rate, no_color),
            Cell::new(format_duration_ms(metrics.avg_duration_ms)),
            Cell::new(format_duration_ms(metrics.p95_duration_ms)),
            Cell::new(format_duration_ms(metrics.max_duration_ms)),
            Cell::new(trend),
        ]);
    }

    lines.push(String::new());
    lines.push(table.to_string());
    lines.join("\n")
}

pub fn format_tool_metrics(metrics: &ToolMetrics) -> String {
    let mut lines = vec![
        format!("Tool:             {}", metrics.tool_name),
        format!("Invocations:      {}", metrics.invocation_count),
        format!(
            "  Success/Error:  {} / {}",
            metrics.success_count, metrics.error_count
        ),
        format!("Error rate:       {:.1}%", metrics.error_rate),
        format!(
            "Duration:         avg {} / min {} / max {} / p95 {}",
            format_duration_ms(metrics.avg_duration_ms),
            format_duration_ms(metrics.min_duration_ms),
            format_duration_ms(metrics.max_duration_ms),
            format_duration_ms(metrics.p95_duration_ms)
        ),
        format!("First seen:       {}", metrics.first_seen),
        format!("Last seen:        {}", metrics.last_seen),
        "Errors by category:".to_string(),
    ];
    for (category, count) in &metrics.errors_by_category {
        lines.push(format!("  {:<14}{}", category.as_str(), count));
    }
    lines.join("\n")
}

pub fn format_trends(trends: &[UsageTrend], no_color: bool) -> String {
    if trends.is_empty() {
        return "No usage in this period.".to_string();
    }
    let mut table = new_table(&["Tool", "Trend", "Change", "Days", "Daily counts"], no_color);
    for trend in trends {
        let counts = trend
            .data_points
            .iter()
            .map(|p| p.count.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![
            Cell::new(&trend.tool_name),
            Cell::new(format!("{} {}", trend.trend.arrow(), trend.trend.as_str())),
            Cell::new(format!("{:+.1}%", trend.change_percentage)),
            Cell::new(trend.data_points.len()),
            Cell::new(truncate(&counts, 40)),
        ]);
    }
    table.to_string()
}

pub fn format_periods(series: &[ToolPeriodCounts], no_color: bool) -> String {
    if series.is_empty() {
        return "No usage in this period.".to_string();
    }
    let mut table = new_table(
        &["Tool", "Period", "Calls", "Success", "Errors", "Error %", "Avg"],
        no_color,
    );
    for tool in series {
        for bucket in &tool.periods {
            table.add_row(vec![
                Cell::new(&tool.tool_name),
                Cell::new(&bucket.period),
                Cell::new(bucket.total_count),
                Cell::new(bucket.success_count),
                Cell::new(bucket.error_count),
                rate_cell(bucket.error_rate, no_color),
                Cell::new(format_duration_ms(bucket.avg_duration_ms)),
            ]);
        }
    }
    table.to_string()
}

pub fn format_popularity(entries: &[PopularityEntry], no_color: bool) -> String {
    let mut table = new_table(&["#", "Tool", "Calls", "Share"], no_color);
    for (rank, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.tool_name),
            Cell::new(entry.invocation_count),
            Cell::new(format!("{:.1}%", entry.percentage)),
        ]);
    }
    table.to_string()
}

pub fn format_error_rates(entries: &[ErrorRateEntry], no_color: bool) -> String {
    let mut table = new_table(&["#", "Tool", "Errors", "Calls", "Error %"], no_color);
    for (rank, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.tool_name),
            Cell::new(entry.error_count),
            Cell::new(entry.invocation_count),
            rate_cell(entry.error_rate, no_color),
        ]);
    }
    table.to_string()
}

pub fn format_response_times(entries: &[ResponseTimeEntry], no_color: bool) -> String {
    let mut table = new_table(&["#", "Tool", "Avg", "Min", "Max", "P95"], no_color);
    for (rank, entry) in entries.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&entry.tool_name),
            Cell::new(format_duration_ms(entry.avg_duration_ms)),
            Cell::new(format_duration_ms(entry.min_duration_ms)),
            Cell::new(format_duration_ms(entry.max_duration_ms)),
            Cell::new(format_duration_ms(entry.p95_duration_ms)),
        ]);
    }
    table.to_string()
}

pub fn format_insights_table(
    report: &InsightsReport,
    summary: &InsightsSummary,
    no_color: bool,
) -> String {
    let mut lines = vec![
        format!("Health:   {}", summary.health_status),
        format!("Summary:  {}", summary.one_liner),
        format!(
            "Insights: {} ({} critical, {} warning, {} info)",
            report.summary.total_insights,
            report.summary.critical_count,
            report.summary.warning_count,
            report.summary.info_count
        ),
        String::new(),
    ];

    let mut table = new_table(&["", "Category", "Title", "Description"], no_color);
    for formatted in format_insights(&report.insights) {
        let title = Cell::new(&formatted.title);
        let title = match (no_color, formatted.severity) {
            (false, InsightSeverity::Critical) => title.fg(Color::Red),
            (false, InsightSeverity::Warning) => title.fg(Color::Yellow),
            _ => title,
        };
        table.add_row(vec![
            Cell::new(&formatted.icon),
            Cell::new(formatted.category.as_str()),
            title,
            Cell::new(&formatted.description),
        ]);
    }
    lines.push(table.to_string());
    lines.join("\n")
}

pub fn format_cleanup(outcome: &CleanupOutcome) -> String {
    let verb = if outcome.dry_run {
        "Would remove"
    } else {
        "Removed"
    };
    let mut lines = vec![
        format!("Cutoff:   partitions before {}", outcome.cutoff_date),
        format!(
            "{} {} file(s), {} event(s)",
            verb, outcome.files_removed, outcome.events_removed
        ),
    ];
    for date in &outcome.removed_dates {
        lines.push(format!("  - {}", date));
    }
    lines.join("\n")
}

pub fn format_storage(info: &StorageInfo) -> String {
    let range = match (info.oldest_date, info.newest_date) {
        (Some(oldest), Some(newest)) => format!("{} to {}", oldest, newest),
        _ => "-".to_string(),
    };
    [
        format!("Data dir:  {}", info.data_dir.display()),
        format!("Files:     {}", info.total_files),
        format!("Events:    {}", info.total_events),
        format!("Size:      {}", format_size(info.total_size_bytes)),
        format!("Range:     {}", range),
    ]
    .join("\n")
}

// ============================================================================
// Utilities
// ============================================================================

pub fn format_duration_ms(ms: f64) -> String {
    if ms >= 60_000.0 {
        format!("{:.1}m", ms / 60_000.0)
    } else if ms >= 1_000.0 {
        format!("{:.2}s", ms / 1_000.0)
    } else {
        format!("{:.0}ms", ms)
    }
}

pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1_024 {
        format!("{:.1}KB", bytes as f64 / 1_024.0)
    } else {
        format!("{}B", bytes)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max - 1).collect::<String>() + "…"
    }
}

// ============================================================================
// Tests
// ============================================================================
