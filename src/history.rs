//! Append-only prediction history of one session

use crate::types::prediction::PredictionRecord;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Ordered sequence of the prediction records of one session.
///
/// Records can be appended and read, never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    records: Vec<PredictionRecord>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return a view of it
    pub fn append(&mut self, record: PredictionRecord) -> &PredictionRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// All records, oldest first
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&PredictionRecord> {
        self.records.last()
    }

    /// The last `n` records, oldest first
    pub fn recent(&self, n: usize) -> &[PredictionRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionRecord> {
        self.records.iter()
    }

    /// Write the whole history as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_records(self.records.iter(), writer)
    }

    /// Export the whole history to a CSV file
    pub fn export_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        export_records(self.records.iter(), path.as_ref())?;
        info!(
            path = %path.as_ref().display(),
            records = self.records.len(),
            "History exported"
        );
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SessionHistory {
    type Item = &'a PredictionRecord;
    type IntoIter = std::slice::Iter<'a, PredictionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Write records as CSV rows under the export header
pub fn write_records<'a, I, W>(records: I, writer: W) -> Result<()>
where
    I: IntoIterator<Item = &'a PredictionRecord>,
    W: Write,
{
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record.to_row())
            .context("Failed to serialize prediction record")?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Export records to a CSV file, replacing it if present
pub fn export_records<'a, I>(records: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a PredictionRecord>,
{
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_records(records, std::io::BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))
}
