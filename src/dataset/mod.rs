//! Historical transaction dataset and its descriptive statistics

pub mod record;
pub mod stats;
pub mod summary;

pub use record::{DatasetRecord, RawTransaction};
pub use summary::DatasetSummary;

use crate::error::{FraudError, FraudResult};
use chrono::{Local, NaiveDate};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Origin reported for data parsed by `from_reader`
const IN_MEMORY: &str = "<reader>";

/// Historical transactions loaded from CSV
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<DatasetRecord>,
    rows_read: usize,
    /// Empty or malformed cells per column, in file column order
    missing: Vec<(String, usize)>,
    reference_date: NaiveDate,
}

impl Dataset {
    /// Load the CSV at `path`; ages are computed against `reference_date` (today when `None`)
    pub fn load<P: AsRef<Path>>(path: P, reference_date: Option<NaiveDate>) -> FraudResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading dataset");

        let file = std::fs::File::open(path).map_err(|e| FraudError::load("dataset", path, e))?;
        let dataset = Self::read(file, reference_date, path)?;

        info!(
            rows = dataset.rows_read,
            complete = dataset.records.len(),
            columns = dataset.columns.len(),
            reference_date = %dataset.reference_date,
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse CSV data from any reader
    pub fn from_reader<R: Read>(reader: R, reference_date: Option<NaiveDate>) -> FraudResult<Self> {
        Self::read(reader, reference_date, Path::new(IN_MEMORY))
    }

    fn read<R: Read>(
        reader: R,
        reference_date: Option<NaiveDate>,
        origin: &Path,
    ) -> FraudResult<Self> {
        let reference_date = reference_date.unwrap_or_else(|| Local::now().date_naive());
        let malformed = |e: csv::Error| FraudError::load("dataset", origin, e);
        let mut csv = csv::Reader::from_reader(reader);

        let headers = csv.headers().map_err(malformed)?.clone();
        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let absent: Vec<&str> = record::REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|required| !columns.iter().any(|c| c == required))
            .collect();
        if !absent.is_empty() {
            return Err(FraudError::load(
                "dataset",
                origin,
                format!("missing required columns: {}", absent.join(", ")),
            ));
        }
        let headers = csv::StringRecord::from(columns.clone());

        let mut missing = vec![0usize; columns.len()];
        let mut records = Vec::new();
        let mut rows_read = 0;

        for row in csv.records() {
            let row = row.map_err(malformed)?;
            rows_read += 1;

            let raw: RawTransaction = row.deserialize(Some(&headers)).map_err(malformed)?;
            let invalid = match raw.into_record(reference_date) {
                Ok(record) => {
                    records.push(record);
                    Vec::new()
                }
                Err(invalid) => invalid,
            };

            for ((slot, column), field) in missing.iter_mut().zip(&columns).zip(row.iter()) {
                if field.trim().is_empty() || invalid.iter().any(|c| *c == column.as_str()) {
                    *slot += 1;
                }
            }
        }

        let skipped = rows_read - records.len();
        if skipped > 0 {
            warn!(skipped = skipped, "Dataset rows with missing or malformed values excluded");
        }

        Ok(Self {
            missing: columns.iter().cloned().zip(missing).collect(),
            columns,
            records,
            rows_read,
            reference_date,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Complete rows with derived columns
    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn missing_counts(&self) -> &[(String, usize)] {
        &self.missing
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary::compute(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
trans_date_trans_time,merchant,category,amt,gender,state,dob,is_fraud
2020-06-20 02:10:00,m1,shopping_net,950.00,M,NY,1985-03-01,1
2020-06-22 14:00:00,m2,grocery_pos,40.00,F,CA,1990-01-15,0
2020-06-22 14:30:00,,grocery_pos,60.00,F,CA,1990-01-15,0
2020-06-23 09:00:00,m4,gas_transport,,M,TX,1970-07-04,0
2020-06-24 23:45:00,m5,misc_net,300.00,F,TX,1950-11-30,1
";

    fn reference() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2020, 12, 31)
    }

    #[test]
    fn test_from_reader() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes(), reference()).unwrap();

        assert_eq!(dataset.columns().len(), 8);
        assert_eq!(dataset.rows_read(), 5);
        assert_eq!(dataset.records().len(), 4);

        let first = &dataset.records()[0];
        assert_eq!(first.hour, 2);
        assert!(first.is_weekend);
        assert_eq!(first.age, 35);

        let missing: Vec<&(String, usize)> = dataset
            .missing_counts()
            .iter()
            .filter(|(_, n)| *n > 0)
            .collect();
        assert_eq!(
            missing,
            vec![&("merchant".to_string(), 1), &("amt".to_string(), 1)]
        );
    }

    #[test]
    fn test_missing_required_column() {
        let err = Dataset::from_reader("category,amt\nmisc_net,10.0\n".as_bytes(), reference())
            .unwrap_err();
        assert!(matches!(err, FraudError::ArtifactLoad { kind: "dataset", .. }));
        let message = err.to_string();
        assert!(message.contains("trans_date_trans_time"));
        assert!(message.contains("is_fraud"));
    }

    #[test]
    fn test_unparseable_values_count_as_missing() {
        let csv = "\
trans_date_trans_time,category,amt,gender,state,dob,is_fraud
2020-06-22 10:00:00,travel,abc,F,WA,1980-01-01,0
2020-06-23 11:00:00,travel,20.0,M,WA,not-a-date,0
2020-06-24 12:00:00,travel,30.0,F,WA,1982-01-01,0
2020-06-25 13:00:00,travel,40.0,F,WA,2021-05-01,7
";
        let dataset = Dataset::from_reader(csv.as_bytes(), reference()).unwrap();
        assert_eq!(dataset.rows_read(), 4);
        assert_eq!(dataset.records().len(), 1);

        let summary = dataset.summary();
        let missing: Vec<(&str, usize)> = summary
            .missing_values
            .iter()
            .map(|m| (m.column.as_str(), m.count))
            .collect();
        assert_eq!(missing, vec![("amt", 1), ("dob", 2), ("is_fraud", 1)]);
        assert!((summary.missing_values[1].pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(dir.path().join("absent.csv"), reference()).unwrap_err();
        assert!(matches!(err, FraudError::ArtifactLoad { kind: "dataset", .. }));

        let path = dir.path().join("sample.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let dataset = Dataset::load(&path, reference()).unwrap();
        assert_eq!(dataset.reference_date(), reference().unwrap());
    }

    #[test]
    fn test_summary() {
        let summary = Dataset::from_reader(SAMPLE.as_bytes(), reference())
            .unwrap()
            .summary();

        assert_eq!(summary.overview.rows_read, 5);
        assert_eq!(summary.overview.complete_rows, 4);
        assert_eq!(summary.overview.fraud_count, 2);
        assert!((summary.overview.fraud_rate - 50.0).abs() < 1e-9);
        assert!((summary.overview.mean_amount - 337.5).abs() < 1e-9);
        assert_eq!(summary.missing_values.len(), 2);
        assert!((summary.missing_values[0].pct - 20.0).abs() < 1e-9);

        assert_eq!(summary.top_categories[0].label, "grocery_pos");
        assert_eq!(summary.top_categories[0].count, 2);
        assert_eq!(summary.fraud_by_category[0].count, 1);
        assert_eq!(summary.transactions_by_hour[14], 2);
        assert_eq!(summary.fraud_by_hour[2], 1);
        assert_eq!(summary.fraud_by_hour[23], 1);
        assert_eq!((summary.weekday_count, summary.weekend_count), (3, 1));
        assert_eq!(summary.gender_distribution[0].label, "F");
        assert_eq!(summary.gender_distribution[0].count, 3);

        let normalization = summary.amount_normalization.as_ref().unwrap();
        assert!(normalization.after.mean.abs() < 1e-9);
        assert_eq!(normalization.before.max, 950.0);

        assert_eq!(summary.outliers.len(), 2);
        assert_eq!(summary.outliers[0].column, "amt");

        let correlation = &summary.correlation;
        assert!((correlation.get("amt", "amt").unwrap() - 1.0).abs() < 1e-9);
        assert!(correlation.get("amt", "is_fraud").unwrap() > 0.0);
        assert_eq!(correlation.get("amt", "hour"), correlation.get("hour", "amt"));
    }

    #[test]
    fn test_constant_column_has_no_correlation() {
        let csv = "\
trans_date_trans_time,category,amt,gender,state,dob,is_fraud
2020-06-22 10:00:00,travel,10.0,F,WA,1980-01-01,0
2020-06-23 11:00:00,travel,20.0,M,WA,1981-01-01,0
2020-06-24 12:00:00,travel,30.0,F,WA,1982-01-01,0
";
        let summary = Dataset::from_reader(csv.as_bytes(), reference())
            .unwrap()
            .summary();
        assert_eq!(summary.correlation.get("amt", "is_fraud"), None);
        assert_eq!(summary.correlation.get("is_weekend", "is_weekend"), None);
        assert!((summary.correlation.get("amt", "hour").unwrap() - 1.0).abs() < 1e-9);
    }
}
