//! Lambda handler that starts an AWS Glue crawler.
//!
//! `handlers` holds the invocation logic and the response contract. It only sees
//! the [`adapters::crawler::CrawlerStarter`] trait, so the Glue SDK stays in the
//! `crawler_trigger` binary.

pub mod adapters;
pub mod handlers;
