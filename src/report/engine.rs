//! Combined per-engine report.
//!
//! One row per engine, comparing a remote (R) and a local (L) run of the
//! same model/experiment pair. Every cell carries an icon with the details
//! (links, error message, error type) folded underneath.

use crate::engines::{self, Compatibility, Engine};
use crate::status::resolve_status;
use crate::table::{Cell, FAIL, PASS, ResultTable, RowValues, TableError};
use crate::types::{RunRecord, RunResults};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;

pub const PASS_ICON: &str = "&#9989; PASS";
pub const FAIL_ICON: &str = "&#10060; FAIL";
pub const WARNING_ICON: &str = "&#9888; WARNING";
pub const UNSURE_ICON: &str = "&#10067; UNSURE";
pub const XFAIL_ICON: &str = "&#9888; XFAIL";

const COLUMNS: &[(&str, &str)] = &[
    ("engine", "Engine"),
    ("compat", "Compatibility"),
    ("pass_fail_r", "pass / FAIL (R)"),
    ("pass_fail_l", "pass / FAIL (L)"),
    ("d1_r", "d1 (R)"),
    ("d1_l", "d1 (L)"),
];

lazy_static! {
    static ref ANSI_CODE: Regex = Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex");
    static ref ANGLE_WRAPPED: Regex = Regex::new(r"<([^>]*)>").expect("valid regex");
}

/// One side (remote or local) of the comparison
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSide<'a> {
    pub results: Option<&'a RunResults>,
    /// Engine id -> d1 plot link
    pub plots: Option<&'a BTreeMap<String, String>>,
}

impl RunSide<'_> {
    fn run(&self, id: &str) -> Option<&RunRecord> {
        self.results.and_then(|r| r.get(id))
    }

    fn plot(&self, id: &str) -> Option<&str> {
        self.plots.and_then(|p| p.get(id)).map(String::as_str)
    }
}

/// `<a href="path">title</a>`, titled by the file name when no title is given
pub fn hyperlink(path: &str, title: Option<&str>) -> String {
    let title = title.unwrap_or_else(|| path.rsplit(['/', '\\']).next().unwrap_or(path));
    format!(r#"<a href="{}">{}</a>"#, path, title)
}

/// A fold of `content` under `title`, or just `title` when there is no content
pub fn collapsible(content: &str, title: &str) -> Cell {
    if content.is_empty() { Cell::text(title) } else { Cell::fold(title, content) }
}

/// Clean engine error output for display inside a table cell
///
/// Colour codes are dropped, `<x>` is unwrapped to `x`, line breaks become
/// `<br>` and pipes are removed.
pub fn error_to_html(text: &str) -> String {
    let text = text.replace('|', "");
    let text = ANSI_CODE.replace_all(&text, "");
    let text = ANGLE_WRAPPED.replace_all(&text, "$1");
    text.replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
        .replace("BioSimulatorsWarning:", "<br><br>BioSimulatorsWarning:<br><br>")
        .replace("warnings.warn(termcolor.colored(message, Colors.warning.value), category)", "<br>")
}

fn compatibility_cell(engine: &Engine, model: &str, experiment: &str) -> Cell {
    if engines::sbml_incompatible(engine) {
        return collapsible(&engines::expected_fail_message(engine), XFAIL_ICON);
    }
    let (result, message) = engines::check_file_compatibility(engine, model, experiment);
    let icon = match result {
        Compatibility::Pass => PASS_ICON,
        Compatibility::Fail => FAIL_ICON,
        Compatibility::Unsure => UNSURE_ICON,
    };
    collapsible(&message, icon)
}

fn status_cell(engine: &Engine, run: Option<&RunRecord>) -> Cell {
    let Some(run) = run else {
        return Cell::na();
    };
    let record = resolve_status(run);
    let expected_fail = engines::sbml_incompatible(engine);
    let icon = match record.status.as_deref() {
        _ if expected_fail => XFAIL_ICON.to_string(),
        Some(PASS) => PASS_ICON.to_string(),
        Some(FAIL) => FAIL_ICON.to_string(),
        Some("WARNING") => WARNING_ICON.to_string(),
        Some(other) => other.to_string(),
        None => UNSURE_ICON.to_string(),
    };

    let mut content = String::new();
    if expected_fail {
        content.push_str("EXPECTED FAIL<br><br>");
    }
    let links = run.links();
    if !links.is_empty() {
        let links: Vec<String> = links.iter().map(|(title, url)| hyperlink(url, Some(title))).collect();
        content.push_str(&format!("{}<br><br>", links.join("<br>")));
    }
    if !record.error_message.is_empty() && record.status.as_deref() != Some(record.error_message.as_str()) {
        content.push_str(&format!("ERROR MESSAGE:<br>{}<br><br>", error_to_html(&record.error_message)));
    }
    if !record.exception_type.is_empty() {
        content.push_str(&format!("ERROR TYPE:<br>{}", error_to_html(&record.exception_type)));
    }

    collapsible(&content, &icon)
}

fn plot_cell(plot: Option<&str>) -> Cell {
    Cell::text(plot.map(|p| hyperlink(p, Some("plot"))).unwrap_or_default())
}

/// Build the combined engine table for one model/experiment pair.
///
/// Engines appear in registry order, limited to those present in either run.
/// A side without a record for an engine shows `NA`.
pub fn build_engine_table(
    remote: RunSide<'_>,
    local: RunSide<'_>,
    model: &str,
    experiment: &str,
) -> Result<ResultTable, TableError> {
    let mut table = ResultTable::new(COLUMNS)?;

    for engine in engines::ENGINES {
        let (r, l) = (remote.run(engine.id), local.run(engine.id));
        if r.is_none() && l.is_none() {
            continue;
        }

        table.new_row(
            RowValues::new()
                .with("engine", collapsible(&format!("{}<br>{}", engine.url, engine.status), engine.name))
                .with("compat", compatibility_cell(engine, model, experiment))
                .with("pass_fail_r", status_cell(engine, r))
                .with("pass_fail_l", status_cell(engine, l))
                .with("d1_r", plot_cell(remote.plot(engine.id)))
                .with("d1_l", plot_cell(local.plot(engine.id))),
        )?;
        debug!("{}", table.last_row_text());
    }

    let is_pass = |c: &Cell| c.tag() == PASS_ICON;
    table.add_count("pass_fail_r", is_pass, "pass={count}")?;
    table.add_count("pass_fail_l", is_pass, "pass={count}")?;

    Ok(table)
}
