//! Classification metrics and statistics tracking for one analysis session.

use crate::types::prediction::{Classification, Verdict};
use crate::types::risk::RiskLevel;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::info;

/// Latency samples kept per session
const MAX_SAMPLES: usize = 10_000;

/// Metrics collector for the classifications of one session
#[derive(Debug)]
pub struct SessionMetrics {
    /// Successful classifications
    classified: u64,
    /// Inputs rejected with a caller-correctable error
    rejected: u64,
    /// Classifications by verdict
    fraud_verdicts: u64,
    /// Classifications by risk level
    by_level: BTreeMap<RiskLevel, u64>,
    /// Classification times (in microseconds)
    processing_times: Vec<u64>,
    /// P(fraud) distribution buckets
    score_buckets: [u64; 10],
    /// Start time for rate calculation
    start_time: Instant,
}

impl SessionMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            classified: 0,
            rejected: 0,
            fraud_verdicts: 0,
            by_level: BTreeMap::new(),
            processing_times: Vec::with_capacity(64),
            score_buckets: [0; 10],
            start_time: Instant::now(),
        }
    }

    /// Record a classified transaction
    pub fn record_classification(
        &mut self,
        processing_time: Duration,
        classification: &Classification,
        level: RiskLevel,
    ) {
        self.classified += 1;
        if classification.verdict == Verdict::Fraud {
            self.fraud_verdicts += 1;
        }
        *self.by_level.entry(level).or_insert(0) += 1;

        self.processing_times
            .push(processing_time.as_micros() as u64);
        if self.processing_times.len() > MAX_SAMPLES {
            self.processing_times.drain(0..MAX_SAMPLES / 2);
        }

        let bucket = (classification.prob_fraud() * 10.0).clamp(0.0, 9.0) as usize;
        self.score_buckets[bucket] += 1;
    }

    /// Record an input rejected before classification
    pub fn record_rejection(&mut self) {
        self.rejected += 1;
    }

    pub fn classified(&self) -> u64 {
        self.classified
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn fraud_verdicts(&self) -> u64 {
        self.fraud_verdicts
    }

    /// Share of classifications with a FRAUD verdict, in percent
    pub fn fraud_rate(&self) -> f64 {
        if self.classified == 0 {
            return 0.0;
        }
        self.fraud_verdicts as f64 / self.classified as f64 * 100.0
    }

    /// Get processing time statistics
    pub fn processing_stats(&self) -> ProcessingStats {
        if self.processing_times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted = self.processing_times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let at = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: at(0.95),
            p99_us: at(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (classifications per second)
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.classified as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get score distribution
    pub fn score_distribution(&self) -> [u64; 10] {
        self.score_buckets
    }

    /// Get classifications by risk level
    pub fn by_level(&self) -> &BTreeMap<RiskLevel, u64> {
        &self.by_level
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let processing = self.processing_stats();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║             CARD FRAUD ANALYSIS - SESSION SUMMARY            ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Transactions Classified: {:>7}  │  Throughput: {:>6.1} tx/s ║",
            self.classified,
            self.throughput()
        );
        info!(
            "║ Fraud Verdicts:          {:>7}  │  Fraud Rate: {:>6.1}%     ║",
            self.fraud_verdicts,
            self.fraud_rate()
        );
        info!("║ Rejected Inputs:         {:>7}                              ║", self.rejected);
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Classifications by Risk Level:                               ║");
        for (level, count) in &self.by_level {
            let pct = if self.classified > 0 {
                (*count as f64 / self.classified as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", format!("{:?}", level), count, pct);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Fraud Probability Distribution:                              ║");
        let total: u64 = self.score_buckets.iter().sum();
        for (i, &count) in self.score_buckets.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
