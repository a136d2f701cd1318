//! Dataset insights: the numbers behind every dashboard chart

use crate::dataset::record::DatasetRecord;
use crate::dataset::stats::{self, BoxStats, HistogramBin, Moments, OutlierReport};
use crate::dataset::Dataset;
use serde::Serialize;
use std::collections::HashMap;

/// Numeric columns of a dataset record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericColumn {
    Amount,
    Age,
    Hour,
    IsWeekend,
    IsFraud,
}

impl NumericColumn {
    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Amount => "amt",
            NumericColumn::Age => "age",
            NumericColumn::Hour => "hour",
            NumericColumn::IsWeekend => "is_weekend",
            NumericColumn::IsFraud => "is_fraud",
        }
    }

    fn value(self, record: &DatasetRecord) -> f64 {
        match self {
            NumericColumn::Amount => record.amt,
            NumericColumn::Age => record.age as f64,
            NumericColumn::Hour => record.hour as f64,
            NumericColumn::IsWeekend => record.is_weekend as u8 as f64,
            NumericColumn::IsFraud => record.is_fraud as u8 as f64,
        }
    }
}

/// Columns of the correlation matrix
pub const CORRELATION_COLUMNS: [NumericColumn; 5] = [
    NumericColumn::Amount,
    NumericColumn::Age,
    NumericColumn::Hour,
    NumericColumn::IsWeekend,
    NumericColumn::IsFraud,
];

/// Age groups as `(label, lower exclusive, upper inclusive)`
pub const AGE_GROUPS: [(&str, u32, u32); 4] = [
    ("Young (18-25)", 0, 25),
    ("Adult (26-40)", 25, 40),
    ("Middle (41-60)", 40, 60),
    ("Senior (60+)", 60, 100),
];

const TOP_N: usize = 10;
const AMOUNT_BINS: usize = 30;
const AGE_BINS: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    /// Data rows in the file
    pub rows_read: usize,
    /// Rows with every required value present
    pub complete_rows: usize,
    pub fraud_count: usize,
    /// Percent of complete rows
    pub fraud_rate: f64,
    pub mean_amount: f64,
    pub column_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingValues {
    pub column: String,
    pub count: usize,
    /// Percent of rows read
    pub pct: f64,
}

/// Amount before and after standard scaling
#[derive(Debug, Clone, Serialize)]
pub struct Normalization {
    pub before: Moments,
    pub after: Moments,
}

#[derive(Debug, Clone, Serialize)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeGroupAmounts {
    pub age_group: String,
    /// `Normal` or `Fraud`
    pub fraud_label: String,
    pub amount: BoxStats,
}

/// Symmetric matrix over `CORRELATION_COLUMNS`; `None` where a column is constant
#[derive(Debug, Clone, Serialize)]
pub struct Correlation {
    pub columns: Vec<String>,
    pub matrix: Vec<Vec<Option<f64>>>,
}

impl Correlation {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.matrix[i][j]
    }
}

/// Every descriptive statistic of the historical dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub overview: Overview,
    pub missing_values: Vec<MissingValues>,
    pub outliers: Vec<OutlierReport>,
    pub amount_normalization: Option<Normalization>,
    pub gender_distribution: Vec<Count>,
    pub top_categories: Vec<Count>,
    /// Transactions per hour, index = hour
    pub transactions_by_hour: [usize; 24],
    pub weekday_count: usize,
    pub weekend_count: usize,
    pub age_histogram: Vec<HistogramBin>,
    /// Amounts below the 99th percentile
    pub amount_histogram: Vec<HistogramBin>,
    pub fraud_by_category: Vec<Count>,
    pub fraud_by_hour: [usize; 24],
    /// Amounts below the 95th percentile, by age group and class
    pub amount_by_age_group: Vec<AgeGroupAmounts>,
    pub correlation: Correlation,
}

/// Label counts, largest first, ties by label
fn ranked(counts: HashMap<&str, usize>, limit: usize) -> Vec<Count> {
    let mut counts: Vec<Count> = counts
        .into_iter()
        .map(|(label, count)| Count {
            label: label.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    counts.truncate(limit);
    counts
}

fn column(records: &[DatasetRecord], column: NumericColumn) -> Vec<f64> {
    records.iter().map(|r| column.value(r)).collect()
}

fn normalization(amounts: &[f64]) -> Option<Normalization> {
    let before = Moments::of(amounts)?;
    let mean = stats::mean(amounts)?;
    let scale = match stats::std_dev(amounts, 0)? {
        s if s > 0.0 => s,
        _ => 1.0,
    };
    let scaled: Vec<f64> = amounts.iter().map(|v| (v - mean) / scale).collect();
    Some(Normalization {
        before,
        after: Moments::of(&scaled)?,
    })
}

fn below_quantile(records: &[DatasetRecord], amounts: &[f64], q: f64) -> Vec<DatasetRecord> {
    let Some(cut) = stats::quantile(&stats::sorted(amounts), q) else {
        return Vec::new();
    };
    records.iter().filter(|r| r.amt < cut).cloned().collect()
}

fn amount_by_age_group(records: &[DatasetRecord], amounts: &[f64]) -> Vec<AgeGroupAmounts> {
    let kept = below_quantile(records, amounts, 0.95);
    let mut groups = Vec::new();
    for (label, lower, upper) in AGE_GROUPS {
        for (fraud, fraud_label) in [(false, "Normal"), (true, "Fraud")] {
            let values: Vec<f64> = kept
                .iter()
                .filter(|r| r.age > lower && r.age <= upper && r.is_fraud == fraud)
                .map(|r| r.amt)
                .collect();
            if let Some(amount) = BoxStats::of(&values) {
                groups.push(AgeGroupAmounts {
                    age_group: label.to_string(),
                    fraud_label: fraud_label.to_string(),
                    amount,
                });
            }
        }
    }
    groups
}

fn correlation(records: &[DatasetRecord]) -> Correlation {
    let columns: Vec<Vec<f64>> = CORRELATION_COLUMNS
        .iter()
        .map(|&c| column(records, c))
        .collect();
    let matrix: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|a| columns.iter().map(|b| stats::pearson(a, b)).collect())
        .collect();
    Correlation {
        columns: CORRELATION_COLUMNS.iter().map(|c| c.name().to_string()).collect(),
        matrix,
    }
}

impl DatasetSummary {
    pub fn compute(dataset: &Dataset) -> Self {
        let records = dataset.records();
        let amounts = column(records, NumericColumn::Amount);
        let ages = column(records, NumericColumn::Age);

        let fraud_count = records.iter().filter(|r| r.is_fraud).count();
        let overview = Overview {
            rows_read: dataset.rows_read(),
            complete_rows: records.len(),
            fraud_count,
            fraud_rate: if records.is_empty() {
                0.0
            } else {
                fraud_count as f64 / records.len() as f64 * 100.0
            },
            mean_amount: stats::mean(&amounts).unwrap_or(0.0),
            column_count: dataset.columns().len(),
        };

        let missing_values = dataset
            .missing_counts()
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(column, count)| MissingValues {
                column: column.clone(),
                count: *count,
                pct: *count as f64 / dataset.rows_read().max(1) as f64 * 100.0,
            })
            .collect();

        let outliers = [("amt", &amounts), ("age", &ages)]
            .into_iter()
            .filter_map(|(name, values)| OutlierReport::of(name, values))
            .collect();

        let mut genders = HashMap::new();
        let mut categories = HashMap::new();
        let mut fraud_categories = HashMap::new();
        let mut transactions_by_hour = [0usize; 24];
        let mut fraud_by_hour = [0usize; 24];
        let mut weekend_count = 0;
        for r in records {
            *genders.entry(r.gender.as_str()).or_insert(0) += 1;
            *categories.entry(r.category.as_str()).or_insert(0) += 1;
            let fraud = fraud_categories.entry(r.category.as_str()).or_insert(0);
            let hour = (r.hour as usize).min(23);
            transactions_by_hour[hour] += 1;
            if r.is_fraud {
                *fraud += 1;
                fraud_by_hour[hour] += 1;
            }
            if r.is_weekend {
                weekend_count += 1;
            }
        }

        let amount_histogram = column(&below_quantile(records, &amounts, 0.99), NumericColumn::Amount);

        Self {
            overview,
            missing_values,
            outliers,
            amount_normalization: normalization(&amounts),
            gender_distribution: ranked(genders, usize::MAX),
            top_categories: ranked(categories, TOP_N),
            transactions_by_hour,
            weekday_count: records.len() - weekend_count,
            weekend_count,
            age_histogram: stats::histogram(&ages, AGE_BINS),
            amount_histogram: stats::histogram(&amount_histogram, AMOUNT_BINS),
            fraud_by_category: ranked(fraud_categories, TOP_N),
            fraud_by_hour,
            amount_by_age_group: amount_by_age_group(records, &amounts),
            correlation: correlation(records),
        }
    }
}
