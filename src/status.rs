/// Engine run status resolution
///
/// This module handles:
/// - Turning a parsed `log.yml` into a pass/FAIL status record
/// - Overriding that status from a `detailedErrorLog.txt`
/// - Collecting run records from engine output directories
/// - Finding the d1 plots engines produced
use crate::engines;
use crate::types::{DetailedErrorLog, RunRecord, RunResults, StatusRecord};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const LOG_YML: &str = "log.yml";
pub const DETAILED_ERROR_LOG: &str = "detailedErrorLog.txt";

const LOG_NOT_FOUND: &str = "Error unknown. The log.yml containing error information was not found.";
const MAX_STEPS_PATTERN: &str = "simulation failed: Reached maximum number of steps";

fn is_empty_log(log: &Value) -> bool {
    match log {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Status record for a parsed `log.yml`
pub fn process_log_yml(log: &Value) -> StatusRecord {
    if is_empty_log(log) {
        return StatusRecord::fail(LOG_NOT_FOUND);
    }

    match log.get("status").and_then(Value::as_str) {
        Some("SUCCEEDED") => {
            // Some engines report success even when the integrator gave up early
            if log.to_string().contains(MAX_STEPS_PATTERN) {
                StatusRecord::fail("Reached maximum number of steps")
            } else {
                StatusRecord::pass()
            }
        }
        Some("FAILED") => {
            let exception = log.get("exception");
            let field = |name: &str| {
                exception.and_then(|e| e.get(name)).and_then(Value::as_str).unwrap_or_default().to_string()
            };
            StatusRecord { exception_type: field("type"), ..StatusRecord::fail(&field("message")) }
        }
        Some("QUEUED") => StatusRecord::fail("status: QUEUED"),
        other => {
            debug!("unrecognized log.yml status: {:?}", other);
            StatusRecord::default()
        }
    }
}

/// Final status of one run: the `log.yml` status, overridden by a detailed error log when one exists
pub fn resolve_status(run: &RunRecord) -> StatusRecord {
    let mut record = process_log_yml(&run.log_yml);
    if let Some(ref detailed) = run.detailed_error_log
        && !detailed.status.is_empty()
    {
        record.status = Some(detailed.status.clone());
        record.error_message = detailed.error_message.clone();
    }
    record
}

/// Read a `log.yml` file into a JSON value
///
/// A missing file gives an empty log, which later resolves to FAIL.
pub fn read_log_yml(path: &Path) -> Result<Value, String> {
    if !path.is_file() {
        debug!("no log.yml at {:?}", path);
        return Ok(Value::Object(Default::default()));
    }
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_yaml::from_str(&text).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Check a run directory for a `detailedErrorLog.txt` reporting a runtime exception
pub fn detailed_error_log(dir: &Path) -> Result<Option<DetailedErrorLog>, String> {
    let Some(path) = find_named(dir, DETAILED_ERROR_LOG) else {
        return Ok(None);
    };
    let text = fs::read_to_string(&path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    if text.contains("RuntimeException") {
        return Ok(Some(DetailedErrorLog { status: "FAIL".to_string(), error_message: "Runtime Exception".to_string() }));
    }
    Ok(None)
}

/// First file called `name` under `dir`, searching recursively
fn find_named(dir: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == name)
        .map(|entry| entry.into_path())
}

/// Build a run record from one engine's output directory
pub fn collect_engine_dir(dir: &Path) -> Result<RunRecord, String> {
    let log_yml = match find_named(dir, LOG_YML) {
        Some(path) => read_log_yml(&path)?,
        None => Value::Object(Default::default()),
    };
    Ok(RunRecord { log_yml, detailed_error_log: detailed_error_log(dir)?, ..Default::default() })
}

/// Collect run records from a directory holding one subdirectory per engine
///
/// Subdirectories that are not named after a known engine are skipped.
pub fn collect_run_dir(root: &Path) -> Result<RunResults, String> {
    let entries = fs::read_dir(root).map_err(|e| format!("Failed to read run directory {}: {}", root.display(), e))?;
    let mut results = BTreeMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to read run directory {}: {}", root.display(), e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if engines::get_engine(&name).is_none() {
            debug!("skipping {:?}: not an engine directory", path);
            continue;
        }
        debug!("collecting {} from {:?}", name, path);
        results.insert(name, collect_engine_dir(&path)?);
    }

    Ok(results)
}

/// All files under `dir` with extension `ext` (without the dot), sorted
pub fn find_files(dir: &Path, ext: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|e| e == ext))
        .collect()
}

/// Engine id -> d1 plot link for the PDF plots under `dir`
///
/// Plots are matched to engines by file name. Links are relative to the
/// parent of `dir`, so a report written next to the plot directory resolves them.
pub fn d1_plots(dir: &Path) -> BTreeMap<String, String> {
    let base = dir.parent().unwrap_or(dir);
    let mut plots = BTreeMap::new();
    for path in find_files(dir, "pdf") {
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let link = path.strip_prefix(base).unwrap_or(path.as_path());
        for id in engines::engine_ids().filter(|id| file_name.contains(*id)) {
            plots.insert(id.to_string(), link.to_string_lossy().replace('\\', "/"));
        }
    }
    plots
}
