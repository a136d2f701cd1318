//! Card Fraud Analysis - Main Entry Point
//!
//! Classifies transactions with the trained model bundle, exports the
//! session history and prints dataset and model insights.

use anyhow::{Context, Result};
use card_fraud_analysis::{
    config::{AppConfig, LogFormat, DEFAULT_CONFIG_PATH},
    dataset::Dataset,
    history::export_records,
    models::inference::InferenceEngine,
    session::{Analysis, Session},
    types::labels::{format_category, format_gender, format_state},
    types::prediction::{PredictionRecord, TIMESTAMP_FORMAT},
    types::transaction::TransactionInput,
    types::{RiskLevel, RiskProfile},
    DatasetSummary,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "card-fraud-analysis", version, about = "Credit card fraud analysis")]
struct Args {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one transaction
    Classify {
        #[arg(long)]
        category: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        state: String,
        #[arg(long, default_value_t = 35)]
        age: u32,
        #[arg(long, default_value_t = 14)]
        hour: u32,
        #[arg(long)]
        weekend: bool,
        #[arg(long)]
        json: bool,
        /// Write the prediction record as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Classify every transaction of a JSON lines file in one session
    Batch {
        input: PathBuf,
        /// Write the session history as CSV
        #[arg(long)]
        export: Option<PathBuf>,
        /// Records shown in the recent view (configured limit by default)
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Descriptive statistics of the historical dataset
    Dataset {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Model information and recorded performance
    Model {
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("warn")
            .add_directive(format!("card_fraud_analysis={}", config.logging.level).parse()?),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load_or_default(&args.config)?;
    init_logging(&config)?;
    info!(config = %args.config.display(), "Configuration loaded");

    match args.command {
        Command::Classify {
            category,
            amount,
            gender,
            state,
            age,
            hour,
            weekend,
            json,
            export,
        } => {
            let input = TransactionInput::new(&category, amount, &gender, &state)
                .with_age(age)
                .with_hour(hour)
                .on_weekend(weekend);
            run_classify(&config, input, json, export.as_deref())
        }
        Command::Batch {
            input,
            export,
            recent,
        } => run_batch(
            &config,
            &input,
            export.as_deref(),
            recent.unwrap_or(config.history.recent_limit),
        ),
        Command::Dataset { path, json } => run_dataset(&config, path, json),
        Command::Model { json } => run_model(&config, json),
    }
}

fn load_engine(config: &AppConfig) -> Result<Arc<InferenceEngine>> {
    let engine = InferenceEngine::new(config).with_context(|| {
        format!(
            "Failed to load model bundle {}",
            config.artifacts.bundle_path.display()
        )
    })?;
    Ok(Arc::new(engine))
}

/// JSON view of one analysis
#[derive(Serialize)]
struct AnalysisView<'a> {
    record: &'a PredictionRecord,
    confidence: f64,
    risk_level: RiskLevel,
    profile: &'a RiskProfile,
}

fn print_analysis(analysis: &Analysis<'_>) {
    let record = analysis.record;
    let input = &record.input;
    let classification = &record.classification;

    println!("Verdict:      {}", record.verdict());
    println!("Confidence:   {:.2}%", classification.confidence_pct());
    println!(
        "Probability:  safe {:.2}% | fraud {:.2}%",
        classification.prob_safe() * 100.0,
        classification.prob_fraud() * 100.0
    );
    println!("Risk level:   {:?}", analysis.risk_level);
    println!(
        "Transaction:  {} | ${:.2} | {} | {} | age {} | {:02}:00 | {}",
        format_category(&input.category),
        input.amount,
        format_gender(&input.gender),
        format_state(&input.state),
        input.age,
        input.hour,
        if input.is_weekend { "weekend" } else { "weekday" }
    );
    let profile = &analysis.profile;
    println!(
        "Badges:       amount {:?} | time {:?} | age {:?} | {:?}",
        profile.amount, profile.time, profile.age, profile.day
    );
    if profile.factors.is_empty() {
        println!("Risk factors: none");
    } else {
        println!("Risk factors:");
        for factor in &profile.factors {
            println!("  - {}", factor.describe());
        }
    }
}

fn run_classify(
    config: &AppConfig,
    input: TransactionInput,
    json: bool,
    export: Option<&Path>,
) -> Result<()> {
    let engine = load_engine(config)?;
    let mut session =
        Session::new(engine, config.detection.clone()).with_input_bounds(config.input.clone());

    {
        let analysis = session.analyze(input)?;
        if json {
            let view = AnalysisView {
                record: analysis.record,
                confidence: analysis.record.classification.confidence_pct(),
                risk_level: analysis.risk_level,
                profile: &analysis.profile,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            print_analysis(&analysis);
        }
    }

    if let Some(path) = export {
        export_records(session.history().records(), path)?;
        info!(path = %path.display(), "Prediction exported");
    }
    session.metrics().print_summary();
    Ok(())
}

fn run_batch(config: &AppConfig, input: &Path, export: Option<&Path>, recent: usize) -> Result<()> {
    let engine = load_engine(config)?;
    let mut session =
        Session::new(engine, config.detection.clone()).with_input_bounds(config.input.clone());

    let file = std::fs::File::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", input.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = index + 1;

        let tx: TransactionInput = match serde_json::from_str(&line) {
            Ok(tx) => tx,
            Err(e) => {
                warn!(line = line_no, error = %e, "Failed to deserialize transaction");
                continue;
            }
        };
        match session.analyze(tx) {
            Ok(_) => {}
            Err(e) if e.is_recoverable() => {
                warn!(line = line_no, error = %e, "Transaction rejected");
            }
            Err(e) => {
                error!(line = line_no, error = %e, "Inference failed");
                return Err(e.into());
            }
        }
    }

    let history = session.history();
    println!(
        "Classified {} transactions ({} flagged as fraud)",
        history.len(),
        session.metrics().fraud_verdicts()
    );
    print_recent(history.recent(recent));

    if let Some(path) = export {
        history.export_to_path(path)?;
    }
    session.metrics().print_summary();
    Ok(())
}

fn print_recent(records: &[PredictionRecord]) {
    if records.is_empty() {
        return;
    }
    println!();
    println!(
        "{:<19}  {:<16} {:>10}  {:<5} {:>4}  {:<6} {:>10}",
        "Time", "Category", "Amount", "State", "Hour", "Result", "Confidence"
    );
    for record in records.iter().rev() {
        println!(
            "{:<19}  {:<16} {:>10.2}  {:<5} {:>4}  {:<6} {:>9.1}%",
            record.timestamp.format(TIMESTAMP_FORMAT),
            format_category(&record.input.category),
            record.input.amount,
            record.input.state,
            record.input.hour,
            record.verdict(),
            record.classification.confidence_pct()
        );
    }
}

fn run_dataset(config: &AppConfig, path: Option<PathBuf>, json: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| config.dataset.path.clone());
    let dataset =
        Dataset::load(&path, config.dataset.reference_date).context("Dataset unavailable")?;
    let summary = dataset.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &DatasetSummary) {
    let o = &summary.overview;
    println!("Overview");
    println!(
        "  transactions {} ({} complete) | fraud {} ({:.2}%) | mean amount ${:.2} | columns {}",
        o.rows_read, o.complete_rows, o.fraud_count, o.fraud_rate, o.mean_amount, o.column_count
    );

    println!("Missing values");
    if summary.missing_values.is_empty() {
        println!("  none");
    }
    for m in &summary.missing_values {
        println!("  {:<24} {:>8} ({:.2}%)", m.column, m.count, m.pct);
    }

    println!("Outliers (1.5 IQR)");
    for r in &summary.outliers {
        println!(
            "  {:<4} Q1 {:.2} Q3 {:.2} IQR {:.2} bounds [{:.2}, {:.2}] outliers {} ({:.2}%)",
            r.column, r.q1, r.q3, r.iqr, r.lower_bound, r.upper_bound, r.count, r.pct
        );
    }

    if let Some(n) = &summary.amount_normalization {
        println!("Amount normalisation");
        println!(
            "  before: mean {:.2} std {:.2} min {:.2} max {:.2}",
            n.before.mean, n.before.std, n.before.min, n.before.max
        );
        println!(
            "  after:  mean {:.4} std {:.4} min {:.4} max {:.4}",
            n.after.mean, n.after.std, n.after.min, n.after.max
        );
    }

    println!("Gender");
    for c in &summary.gender_distribution {
        println!("  {:<8} {:>8}", format_gender(&c.label), c.count);
    }
    println!("Top categories");
    for c in &summary.top_categories {
        println!("  {:<16} {:>8}", format_category(&c.label), c.count);
    }
    println!(
        "Weekday {} | Weekend {}",
        summary.weekday_count, summary.weekend_count
    );

    println!("Hour  transactions  fraud");
    for hour in 0..24 {
        println!(
            "  {:02}  {:>12}  {:>5}",
            hour, summary.transactions_by_hour[hour], summary.fraud_by_hour[hour]
        );
    }

    println!("Fraud by category");
    for c in &summary.fraud_by_category {
        println!("  {:<16} {:>8}", format_category(&c.label), c.count);
    }

    println!("Amount by age group");
    for g in &summary.amount_by_age_group {
        println!(
            "  {:<15} {:<6} n={:<6} min {:.2} q1 {:.2} median {:.2} q3 {:.2} max {:.2}",
            g.age_group,
            g.fraud_label,
            g.amount.count,
            g.amount.min,
            g.amount.q1,
            g.amount.median,
            g.amount.q3,
            g.amount.max
        );
    }

    let corr = &summary.correlation;
    println!("Correlation");
    print!("  {:<11}", "");
    for c in &corr.columns {
        print!("{:>11}", c);
    }
    println!();
    for (name, row) in corr.columns.iter().zip(&corr.matrix) {
        print!("  {:<11}", name);
        for value in row {
            match value {
                Some(v) => print!("{:>11.3}", v),
                None => print!("{:>11}", "n/a"),
            }
        }
        println!();
    }
}

fn run_model(config: &AppConfig, json: bool) -> Result<()> {
    let engine = load_engine(config)?;
    let report = engine.report(&config.performance)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Algorithm:    {} ({})", report.algorithm, report.classifier);
    println!("Estimators:   {}", report.n_estimators);
    println!("Max depth:    {}", report.max_depth);
    if let Some(trained_at) = &report.trained_at {
        println!("Trained at:   {}", trained_at);
    }
    println!(
        "Vocabulary:   {} categories, {} states",
        report.known_categories, report.known_states
    );
    if !report.unsupported_categories.is_empty() {
        println!("Unsupported:  {}", report.unsupported_categories.join(", "));
    }
    println!("Features:     {}", report.feature_columns.join(", "));
    println!("Scaled:       {}", report.numerical_columns.join(", "));

    match (&report.performance, report.meets_requirements) {
        (Some(p), Some(meets)) => {
            println!("Accuracy:     {:.2}%", p.accuracy * 100.0);
            println!("Precision:    {:.2}%", p.precision * 100.0);
            println!("Recall:       {:.2}%", p.recall * 100.0);
            println!("F1 score:     {:.2}%", p.f1_score * 100.0);
            println!("ROC-AUC:      {:.4}", p.roc_auc);
            println!(
                "Requirements: {} (accuracy >= {:.0}%, recall >= {:.0}%)",
                if meets { "met" } else { "not met" },
                config.performance.min_accuracy * 100.0,
                config.performance.min_recall * 100.0
            );
        }
        _ => println!("Performance:  not recorded"),
    }

    println!("Category codes");
    for (code, label) in &report.category_codes {
        println!("  {:>3}  {}", code, format_category(label));
    }

    if !report.feature_importance.is_empty() {
        println!("Feature importance");
        for (feature, importance) in &report.feature_importance {
            let bar = "█".repeat((importance * 50.0).round().clamp(0.0, 50.0) as usize);
            println!("  {:<20} {:.4} {}", feature, importance, bar);
        }
    }
    Ok(())
}
