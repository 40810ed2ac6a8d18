//! Report generation module - Builds result tables from recorded outcomes.
//!
//! This module handles:
//! - The per-case suite report (validation stages and per-engine outcomes)
//! - The combined per-engine report (remote vs local runs)
//! - Export to Markdown and JSON files
//!
//! # Module Organization
//!
//! - `suite` - Per-case suite table
//! - `engine` - Per-engine remote/local table, HTML clean-up of error text
//! - `export` - Markdown report and run results JSON writers

mod engine;
mod export;
mod suite;

pub use engine::{RunSide, build_engine_table};
pub use export::{export_run_results, write_markdown_report};
pub use suite::build_suite_table;
