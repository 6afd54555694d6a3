//! Fraud count and distinct-party counts over the transaction dataset.

use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

use crate::dataset::{open_transaction_file, transaction_reader, TransactionRecord};
use crate::error::DatasetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSummary {
    rows: u64,
    fraudulent_transactions: i64,
    unique_customers: usize,
    unique_recipients: usize,
}

impl TransactionSummary {
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Sum of the fraud flag column.
    pub fn total_fraudulent_transactions(&self) -> i64 {
        self.fraudulent_transactions
    }

    /// Distinct `nameOrig` values.
    pub fn unique_customers(&self) -> usize {
        self.unique_customers
    }

    /// Distinct `nameDest` values, with an empty recipient counted as one value.
    pub fn unique_recipients(&self) -> usize {
        self.unique_recipients
    }

    pub fn report_lines(&self) -> [String; 3] {
        [
            format!(
                "Total fraudulent transactions:  {}",
                self.fraudulent_transactions
            ),
            format!("Total unique Customers {}", self.unique_customers),
            format!(
                "Total unique Recipients include Null:  {}",
                self.unique_recipients
            ),
        ]
    }
}

impl fmt::Display for TransactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [fraud, customers, recipients] = self.report_lines();
        writeln!(f, "{fraud}")?;
        writeln!(f, "{customers}")?;
        write!(f, "{recipients}")
    }
}

/// Folds transaction rows one at a time so the dataset never has to fit in memory.
#[derive(Debug, Default)]
pub struct SummaryAccumulator {
    rows: u64,
    fraudulent: i64,
    customers: HashSet<String>,
    recipients: HashSet<Option<String>>,
}

impl SummaryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: TransactionRecord) {
        self.rows += 1;
        self.fraudulent += record.fraud_flag;
        self.customers.insert(record.name_orig);
        self.recipients.insert(record.name_dest);
    }

    pub fn finish(&self) -> TransactionSummary {
        TransactionSummary {
            rows: self.rows,
            fraudulent_transactions: self.fraudulent,
            unique_customers: self.customers.len(),
            unique_recipients: self.recipients.len(),
        }
    }
}

/// Reads every row from `reader` and summarizes it. The first bad row aborts the read.
pub fn summarize_reader<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<TransactionSummary, DatasetError> {
    let mut csv_reader = transaction_reader(reader, delimiter);
    summarize_records(&mut csv_reader)
}

pub fn summarize_csv(
    path: impl AsRef<Path>,
    delimiter: u8,
) -> Result<TransactionSummary, DatasetError> {
    let mut csv_reader = open_transaction_file(path, delimiter)?;
    summarize_records(&mut csv_reader)
}

fn summarize_records<R: Read>(
    csv_reader: &mut csv::Reader<R>,
) -> Result<TransactionSummary, DatasetError> {
    let mut accumulator = SummaryAccumulator::new();
    for record in csv_reader.deserialize::<TransactionRecord>() {
        accumulator.observe(record?);
    }
    Ok(accumulator.finish())
}
