//! Markdown text helpers for table cells.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
}

/// Make arbitrary text (typically an exception message) safe to place in a
/// markdown table cell.
///
/// Carriage returns are dropped, backticks become spaces, every run of
/// whitespace (newlines and tabs included) collapses to one space, and `|`
/// becomes `<br>`. Applying it twice gives the same result as applying it once.
pub fn safe_md_string(text: &str) -> String {
    let text = text.replace('\r', "").replace('`', " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().replace('|', "<br>")
}

/// Build a foldable html cell with `summary` visible and `details` hidden.
pub fn make_fold(summary: &str, details: &str) -> String {
    format!("<details><summary>{}</summary>{}</details>", summary, details)
}

/// True if the text would corrupt a pipe-delimited markdown line.
pub fn breaks_table(text: &str) -> bool {
    text.contains(['|', '\n', '\r'])
}

/// Join already-checked cell texts into one `|a|b|c|` line.
pub(crate) fn table_line<S: AsRef<str>>(cells: &[S]) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push_str(cell.as_ref());
        line.push('|');
    }
    line
}
