//! Ronda CLI binary.
//!
//! Provides a command-line interface for the Ronda fund analytics engine:
//! risk metrics, anomaly detection, allocation suggestions and the full
//! analytics report, computed from JSON input documents.

mod data;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use ronda_allocate::{AllocationRecommendation, Allocator, AllocatorConfig, StepLimitedAllocator};
use ronda_anomaly::{AnomalyDetector, AnomalyResult, DetectorConfig};
use ronda_report::ReportBuilder;
use ronda_risk::{RiskCalculator, RiskConfig, RiskMetricsResult};

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Risk analytics for fund return series", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute risk and performance metrics for one fund
    Risk {
        /// Fund series JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Benchmark series JSON file (enables the Treynor ratio)
        #[arg(short, long)]
        benchmark: Option<PathBuf>,

        /// Annual risk-free rate
        #[arg(long, default_value = "0.02")]
        risk_free: f64,

        /// Confidence level for VaR and expected shortfall
        #[arg(long, default_value = "0.95")]
        confidence: f64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Flag anomalous return observations
    Anomaly {
        /// Fund series JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Expected fraction of anomalous observations
        #[arg(long, default_value = "0.05")]
        contamination: f64,

        /// Seed for the isolation ensemble
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Minimum number of observations
        #[arg(long, default_value = "20")]
        min_samples: usize,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Suggest a bounded reallocation for a portfolio
    Allocate {
        /// Portfolio JSON file (weights, stats, correlation)
        #[arg(short, long)]
        input: PathBuf,

        /// Largest per-asset weight change in one suggestion
        #[arg(long, default_value = "0.05")]
        max_step: f64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Assemble the full analytics report across funds
    Report {
        /// JSON file with an array of fund series
        #[arg(short, long)]
        input: PathBuf,

        /// Benchmark series JSON file shared by all funds
        #[arg(short, long)]
        benchmark: Option<PathBuf>,

        /// Portfolio JSON file for the allocation section
        #[arg(short, long)]
        portfolio: Option<PathBuf>,

        /// Annual risk-free rate
        #[arg(long, default_value = "0.02")]
        risk_free: f64,

        /// Expected fraction of anomalous observations
        #[arg(long, default_value = "0.05")]
        contamination: f64,

        /// Seed for the isolation ensemble
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Risk {
            input,
            benchmark,
            risk_free,
            confidence,
            format,
        } => run_risk(&input, benchmark.as_deref(), risk_free, confidence, &format),
        Commands::Anomaly {
            input,
            contamination,
            seed,
            min_samples,
            format,
        } => run_anomaly(&input, contamination, seed, min_samples, &format),
        Commands::Allocate {
            input,
            max_step,
            format,
        } => run_allocate(&input, max_step, &format),
        Commands::Report {
            input,
            benchmark,
            portfolio,
            risk_free,
            contamination,
            seed,
            format,
        } => run_report(
            &input,
            benchmark.as_deref(),
            portfolio.as_deref(),
            risk_free,
            contamination,
            seed,
            &format,
        ),
    }
}

fn run_risk(
    input: &std::path::Path,
    benchmark: Option<&std::path::Path>,
    risk_free: f64,
    confidence: f64,
    format: &str,
) -> Result<()> {
    let series = data::load_fund(input)?;
    let benchmark = benchmark.map(data::load_fund).transpose()?;

    let config = RiskConfig {
        risk_free_rate: risk_free,
        confidence_level: confidence,
        ..Default::default()
    };
    let metrics = RiskCalculator::new(config).calculate(&series, benchmark.as_ref())?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    print_header("Risk Metrics");
    println!("Fund:          {}", metrics.fund_id);
    println!("Observations:  {}", metrics.n_observations);
    println!("Period:        {} to {}", series.first_date(), series.last_date());
    println!();
    print_risk_section(&metrics);
    Ok(())
}

fn run_anomaly(
    input: &std::path::Path,
    contamination: f64,
    seed: u64,
    min_samples: usize,
    format: &str,
) -> Result<()> {
    let series = data::load_fund(input)?;

    let config = DetectorConfig {
        contamination,
        seed,
        min_samples,
        ..Default::default()
    };
    let result = AnomalyDetector::new(config).detect(&series)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_header("Anomaly Detection");
    println!("Fund:           {}", result.fund_id);
    println!("Observations:   {}", result.points.len());
    println!("Contamination:  {:.1}%", result.contamination * 100.0);
    println!("Seed:           {}", result.seed);
    println!();
    print_anomaly_section(&result);
    Ok(())
}

fn run_allocate(input: &std::path::Path, max_step: f64, format: &str) -> Result<()> {
    let portfolio = data::load_portfolio(input)?;

    let config = AllocatorConfig {
        max_step,
        ..Default::default()
    };
    let recommendation = StepLimitedAllocator::new(config).rebalance(
        &portfolio.weights,
        &portfolio.stats,
        &portfolio.correlations,
    )?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&recommendation)?);
        return Ok(());
    }

    print_header("Allocation Suggestion");
    print_allocation_section(&recommendation);
    Ok(())
}

fn run_report(
    input: &std::path::Path,
    benchmark: Option<&std::path::Path>,
    portfolio: Option<&std::path::Path>,
    risk_free: f64,
    contamination: f64,
    seed: u64,
    format: &str,
) -> Result<()> {
    let funds = data::load_funds(input)?;
    let benchmark = benchmark.map(data::load_fund).transpose()?;
    let allocation = portfolio.map(data::load_portfolio).transpose()?;

    let builder = ReportBuilder::new(
        RiskConfig {
            risk_free_rate: risk_free,
            ..Default::default()
        },
        DetectorConfig {
            contamination,
            seed,
            ..Default::default()
        },
        AllocatorConfig::default(),
    );
    let report = builder.build(&funds, benchmark.as_ref(), allocation.as_ref(), Utc::now())?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_header("Analytics Report");
    println!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();

    println!("Summary:");
    println!("  Funds:              {:>10}", report.summary.fund_count);
    println!("  Observations:       {:>10}", report.summary.total_observations);
    println!(
        "  Mean Ann. Return:   {:>10.2}%",
        report.summary.mean_annualized_return * 100.0
    );
    println!(
        "  Mean Ann. Vol:      {:>10}",
        fmt_pct(report.summary.mean_annualized_volatility)
    );
    println!("  Best Performer:     {:>10}", report.summary.best_performer);
    println!("  Worst Performer:    {:>10}", report.summary.worst_performer);
    println!();

    for fund in &report.funds {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("FUND: {}", fund.fund_id);
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        print_risk_section(&fund.risk);
        print_anomaly_section(&fund.anomalies);
    }

    if let Some(recommendation) = &report.allocation {
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("ALLOCATION");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        print_allocation_section(recommendation);
    }

    Ok(())
}

fn print_header(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {title:<60} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

fn print_risk_section(metrics: &RiskMetricsResult) {
    println!("Performance:");
    println!("  Total Return:       {:>10.2}%", metrics.total_return * 100.0);
    println!(
        "  Annualized Return:  {:>10.2}%",
        metrics.annualized_return * 100.0
    );
    println!(
        "  Annualized Vol:     {:>10}",
        fmt_pct(metrics.annualized_volatility)
    );
    println!();

    println!("Ratios (risk-free {:.2}%):", metrics.risk_free_rate * 100.0);
    println!("  Sharpe Ratio:       {:>10}", fmt_opt(metrics.sharpe_ratio));
    println!("  Sortino Ratio:      {:>10}", fmt_opt(metrics.sortino_ratio));
    println!("  Treynor Ratio:      {:>10}", fmt_opt(metrics.treynor_ratio));
    println!();

    println!(
        "Tail Risk ({:.0}% confidence):",
        metrics.confidence_level * 100.0
    );
    println!("  VaR:                {:>10}", fmt_pct(metrics.value_at_risk));
    println!(
        "  Expected Shortfall: {:>10}",
        fmt_pct(metrics.expected_shortfall)
    );
    println!();

    println!("Drawdown:");
    println!(
        "  Max Drawdown:       {:>10.2}%",
        metrics.drawdown.max_drawdown * 100.0
    );
    println!(
        "  Longest Underwater: {:>10} periods",
        metrics.drawdown.drawdown_length
    );
    println!(
        "  Recovered:          {:>10}",
        if metrics.drawdown.recovered { "yes" } else { "no" }
    );
    println!();
}

fn print_anomaly_section(result: &AnomalyResult) {
    println!(
        "Anomalies ({} of {} observations flagged):",
        result.n_anomalies(),
        result.points.len()
    );
    if result.n_anomalies() == 0 {
        println!("  none");
        println!();
        return;
    }
    println!("  {:<12} {:>10} {:>8}", "Date", "Return", "Score");
    println!("  {}", "─".repeat(32));
    for point in result.anomalies() {
        println!(
            "  {:<12} {:>9.2}% {:>8.3}",
            point.date.to_string(),
            point.value * 100.0,
            point.score
        );
    }
    println!();
}

fn print_allocation_section(recommendation: &AllocationRecommendation) {
    println!(
        "Diversification Score: {:.3}",
        recommendation.diversification_score
    );
    println!(
        "Suggested Portfolio:   {:.2}% expected return, {:.2}% volatility",
        recommendation.expected_return * 100.0,
        recommendation.expected_volatility * 100.0
    );
    println!();

    println!("  {:<10} {:>10} {:>10} {:>8}", "Asset", "Current", "Suggested", "Change");
    println!("  {}", "─".repeat(40));
    for (asset, &current) in &recommendation.current_weights {
        let suggested = recommendation.suggested_weights.get(asset).copied().unwrap_or(current);
        println!(
            "  {:<10} {:>9.2}% {:>9.2}% {:>+7.2}%",
            asset,
            current * 100.0,
            suggested * 100.0,
            (suggested - current) * 100.0
        );
    }
    println!();

    println!("Rationale:");
    for tag in &recommendation.rationale {
        println!("  - {tag}");
    }
    println!();
}

/// Format an optional ratio, rendering undefined values as N/A.
fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.4}"))
}

/// Format an optional fraction as a percentage, rendering undefined as N/A.
fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}%", v * 100.0))
}
