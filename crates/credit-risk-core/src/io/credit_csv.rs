//! Reader and writer for the credit risk dataset CSV.
//!
//! Ingestion treats rows as opaque `StringRecord`s so the split files keep
//! every column exactly as it appeared in the source. The transformation
//! stage reads the split files back through the typed `DatasetRow` schema.
use std::fs;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;

use crate::data_handling::{ApplicantRecord, LabeledDataset};
use crate::error::{PipelineError, Result};

/// Header plus rows, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    pub fn select(&self, indices: &[usize]) -> RawTable {
        RawTable {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    person_age: u32,
    person_income: f64,
    person_home_ownership: String,
    person_emp_length: Option<f64>,
    loan_intent: String,
    loan_grade: String,
    loan_amnt: f64,
    loan_int_rate: Option<f64>,
    loan_status: usize,
    loan_percent_income: f64,
    cb_person_default_on_file: String,
    cb_person_cred_hist_length: f64,
}

impl DatasetRow {
    fn split(self) -> (ApplicantRecord, usize) {
        let record = ApplicantRecord {
            age: self.person_age,
            income: self.person_income,
            home_ownership: self.person_home_ownership,
            employment_length: self.person_emp_length,
            loan_intent: self.loan_intent,
            loan_grade: self.loan_grade,
            loan_amount: self.loan_amnt,
            interest_rate: self.loan_int_rate,
            default_on_file: self.cb_person_default_on_file,
            loan_percent_income: self.loan_percent_income,
            credit_history_length: self.cb_person_cred_hist_length,
        };
        (record, self.loan_status)
    }
}

/// Raw reads keep cells untouched; typed reads trim whitespace around them.
fn open_reader<P: AsRef<Path>>(path: P, trim: csv::Trim) -> Result<csv::Reader<fs::File>> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(trim)
        .from_reader(file))
}

/// Read a CSV file as header + raw rows.
pub fn read_raw_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let mut reader = open_reader(path, csv::Trim::None)?;
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .clone();

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| PipelineError::csv(path, e))?;

    Ok(RawTable { headers, rows })
}

/// Write header + rows, creating parent directories as needed.
pub fn write_raw_table<P: AsRef<Path>>(path: P, table: &RawTable) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| PipelineError::csv(path, e))?;
    writer
        .write_record(&table.headers)
        .map_err(|e| PipelineError::csv(path, e))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| PipelineError::csv(path, e))?;
    }
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}

/// Read a dataset CSV into typed records and their `loan_status` labels.
pub fn read_labeled_dataset<P: AsRef<Path>>(path: P) -> Result<LabeledDataset> {
    let path = path.as_ref();
    let mut reader = open_reader(path, csv::Trim::All)?;

    let mut records = Vec::new();
    let mut labels = Vec::new();
    for (row_idx, result) in reader.deserialize::<DatasetRow>().enumerate() {
        let row = result.map_err(|e| {
            PipelineError::InvalidInput(format!(
                "{}: row {}: {}",
                path.display(),
                row_idx + 1,
                e
            ))
        })?;
        let (record, label) = row.split();
        let record = record.validated().map_err(|e| {
            PipelineError::InvalidInput(format!("{}: row {}: {}", path.display(), row_idx + 1, e))
        })?;
        records.push(record);
        labels.push(label);
    }

    log::debug!("Read {} rows from {}", records.len(), path.display());
    LabeledDataset::new(records, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "person_age,person_income,person_home_ownership,person_emp_length,loan_intent,loan_grade,loan_amnt,loan_int_rate,loan_status,loan_percent_income,cb_person_default_on_file,cb_person_cred_hist_length";

    #[test]
    fn reads_typed_rows_with_missing_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "{}", HEADER).unwrap();
        writeln!(f, "22,59000,RENT,123.0,PERSONAL,D,35000,16.02,1,0.59,Y,3").unwrap();
        writeln!(f, "21,9600,OWN,,EDUCATION,B,1000,,0,0.1,N,2").unwrap();
        drop(f);

        let ds = read_labeled_dataset(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.labels.to_vec(), vec![1, 0]);
        assert_eq!(ds.records[0].loan_grade, "D");
        assert_eq!(ds.records[1].employment_length, None);
        assert_eq!(ds.records[1].interest_rate, None);
    }

    #[test]
    fn malformed_row_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "{}", HEADER).unwrap();
        writeln!(f, "abc,59000,RENT,1,PERSONAL,D,35000,16.02,1,0.59,Y,3").unwrap();
        drop(f);

        let err = read_labeled_dataset(&path).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_raw_table("/nonexistent/credit.csv").unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn raw_table_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.csv");
        fs::write(&src, "a,b\n1,\nx,2.50\n").unwrap();
        let table = read_raw_table(&src).unwrap();
        let dst = dir.path().join("nested").join("out.csv");
        write_raw_table(&dst, &table).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "a,b\n1,\nx,2.50\n");
    }

    #[test]
    fn raw_table_keeps_padded_cells() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.csv");
        fs::write(&src, "a,b\n\"RENT\", 2.5\n").unwrap();
        let table = read_raw_table(&src).unwrap();
        assert_eq!(&table.rows[0][1], " 2.5");

        let dst = dir.path().join("out.csv");
        write_raw_table(&dst, &table).unwrap();
        let copy = read_raw_table(&dst).unwrap();
        assert_eq!(copy, table);
    }
}
