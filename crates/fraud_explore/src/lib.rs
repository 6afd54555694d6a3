//! Exploratory analysis tools for the transaction fraud dataset.
//!
//! Two independent pieces live here:
//!
//! - [`summary`]: streams the transaction CSV and computes the fraud count and
//!   distinct sender/recipient counts.
//! - [`decision_tree`]: loads a fitted binary classification tree exported as
//!   JSON and renders it to Graphviz DOT.
//!
//! The `explore_data` binary wires both into a small CLI.

pub mod dataset;
pub mod decision_tree;
pub mod error;
pub mod summary;

pub use dataset::TransactionRecord;
pub use decision_tree::{DecisionTree, DotOptions};
pub use error::{DatasetError, TreeError};
pub use summary::{summarize_csv, summarize_reader, SummaryAccumulator, TransactionSummary};
