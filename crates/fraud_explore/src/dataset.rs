//! Transaction CSV row model.
//!
//! Only the three columns the summary needs are deserialized. Extra columns are
//! ignored, and a missing required column fails the read.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::DatasetError;

pub const DEFAULT_DATASET_PATH: &str = "Fraud.csv";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionRecord {
    /// Raw flag value. `true`/`false` read as 1/0.
    #[serde(rename = "isFraud", deserialize_with = "deserialize_fraud_flag")]
    pub fraud_flag: i64,
    #[serde(rename = "nameOrig")]
    pub name_orig: String,
    /// `None` when the cell is empty.
    #[serde(rename = "nameDest", deserialize_with = "deserialize_optional_identifier")]
    pub name_dest: Option<String>,
}

impl TransactionRecord {
    pub fn is_fraud(&self) -> bool {
        self.fraud_flag != 0
    }
}

/// Builds a CSV reader over `reader` with a header row and the given delimiter.
pub fn transaction_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(reader)
}

pub fn open_transaction_file(
    path: impl AsRef<Path>,
    delimiter: u8,
) -> Result<csv::Reader<File>, DatasetError> {
    let file = File::open(path)?;
    Ok(transaction_reader(file, delimiter))
}

fn deserialize_fraud_flag<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_fraud_flag(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "isFraud must be an integer or true/false, got {raw:?}"
        ))
    })
}

fn deserialize_optional_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(if raw.is_empty() { None } else { Some(raw) })
}

fn parse_fraud_flag(raw: &str) -> Option<i64> {
    let value = raw.trim();
    if let Ok(number) = value.parse::<i64>() {
        return Some(number);
    }
    if value.eq_ignore_ascii_case("true") {
        Some(1)
    } else if value.eq_ignore_ascii_case("false") {
        Some(0)
    } else {
        None
    }
}
