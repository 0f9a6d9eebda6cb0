//! Library interface for the typeflat CLI

pub mod config;
pub mod driver;

pub use config::{Overrides, ProjectConfig, RunSettings};
pub use driver::{FileOutcome, FileReport, RunOptions, RunSummary};
