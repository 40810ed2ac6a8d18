//! Report export to Markdown and JSON files.

use crate::table::ResultTable;
use crate::types::RunResults;
use log::debug;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a Markdown report: title, generation time, optional description, then the table.
///
/// The table is rendered before the file is created, so an unsafe cell
/// leaves no partial report behind.
pub fn write_markdown_report(
    output_path: &Path,
    title: &str,
    description: Option<&str>,
    table: &ResultTable,
) -> Result<(), String> {
    let markdown = table.to_markdown().map_err(|e| format!("Failed to render table: {}", e))?;

    let mut content = String::new();
    content.push_str(&format!("# {}\n\n", title));
    content.push_str(&format!("Generated: {}\n\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
    if let Some(description) = description {
        content.push_str(description);
        content.push_str("\n\n");
    }
    content.push_str(&markdown);

    let mut file =
        File::create(output_path).map_err(|e| format!("Failed to create {}: {}", output_path.display(), e))?;
    file.write_all(content.as_bytes()).map_err(|e| format!("Failed to write {}: {}", output_path.display(), e))?;

    debug!("wrote {} table rows to {:?}", table.n_rows(), output_path);
    Ok(())
}

/// Export collected run records as pretty-printed JSON (engine id -> run record).
pub fn export_run_results(results: &RunResults, output_path: &Path) -> Result<(), String> {
    let file = File::create(output_path).map_err(|e| format!("Failed to create {}: {}", output_path.display(), e))?;
    serde_json::to_writer_pretty(file, results).map_err(|e| format!("Failed to write {}: {}", output_path.display(), e))
}
