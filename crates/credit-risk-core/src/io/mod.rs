//! IO utilities for the credit risk CSV files.

pub mod credit_csv;

pub use credit_csv::{read_labeled_dataset, read_raw_table, write_raw_table, RawTable};
