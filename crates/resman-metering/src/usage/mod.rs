//! Usage module
//!
//! Counts how often each resource is referenced across membership records
//! and how many distinct owners hold them.

pub mod summarizer;

pub use summarizer::{UsageSummarizer, UsageSummary};
