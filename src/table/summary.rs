//! Summary row builders.
//!
//! Each builder reads one column and writes the matching summary cell; row
//! data is never changed (except by an explicit `rewrite` callback).

use super::cell::{Cell, NA, PASS};
use super::markdown::make_fold;
use super::categorize::OTHER_TAG;
use super::{ResultTable, TableError};
use regex::Regex;

/// Tag frequencies in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TagCounts {
    counts: Vec<(String, usize)>,
}

impl TagCounts {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start with zero counts for `tags`, fixing their order.
    pub(crate) fn with_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = Self::new();
        for tag in tags {
            if !counts.counts.iter().any(|(t, _)| t == tag) {
                counts.counts.push((tag.to_string(), 0));
            }
        }
        counts
    }

    pub(crate) fn add(&mut self, tag: &str) {
        match self.counts.iter_mut().find(|(t, _)| t == tag) {
            Some(entry) => entry.1 += 1,
            None => self.counts.push((tag.to_string(), 1)),
        }
    }

    /// Remove a tag, returning its count if it was seen.
    fn take(&mut self, tag: &str) -> Option<usize> {
        let pos = self.counts.iter().position(|(t, _)| t == tag)?;
        Some(self.counts.remove(pos).1)
    }

    pub(crate) fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(t, n)| (t.as_str(), *n))
    }
}

/// Build the pass / NA / FAIL breakdown for a set of tag counts.
///
/// `pass` and `NA` are reported on their own. Everything else is a failure:
/// a single failing tag is reported inline as `tag=n`, several are folded
/// under `FAIL=<total>` with an `n_tag=count` breakdown.
pub(crate) fn generate_summary(mut counts: TagCounts) -> String {
    let mut parts = Vec::new();

    if let Some(n) = counts.take(PASS) {
        parts.push(format!("pass={}", n));
    }
    if let Some(n) = counts.take(NA) {
        parts.push(format!("NA={}", n));
    }

    let failing: Vec<(&str, usize)> = counts.iter().collect();
    match failing.len() {
        0 => parts.join(" "),
        1 => {
            parts.push(format!("{}={}", failing[0].0, failing[0].1));
            parts.join(" ")
        }
        _ => {
            parts.push(format!("FAIL={}", counts.total()));
            let details = failing.iter().map(|(tag, n)| format!("n_{}={}", tag, n)).collect::<Vec<_>>().join(" ");
            make_fold(&parts.join(" "), &details)
        }
    }
}

impl ResultTable {
    /// Count the rows where `predicate` holds and write `template` with
    /// `{count}` replaced into the summary cell.
    pub fn add_count<F>(&mut self, id: &str, predicate: F, template: &str) -> Result<(), TableError>
    where
        F: Fn(&Cell) -> bool,
    {
        let count = self.column(id)?.into_iter().filter(|c| predicate(c)).count();
        self.add_summary(id, template.replace("{count}", &count.to_string()))
    }

    /// Tally each distinct value in the column and summarize it as a
    /// pass / NA / FAIL breakdown.
    pub fn simple_summary(&mut self, id: &str) -> Result<(), TableError> {
        let mut counts = TagCounts::new();
        for cell in self.column(id)? {
            counts.add(&cell.tag());
        }
        self.add_summary(id, generate_summary(counts))
    }

    /// Tag each cell by the first pattern matching its text (`other` when
    /// none does), and write `template` with `{summary}` replaced by the
    /// `n_tag=count` list.
    ///
    /// With `rewrite`, each cell is replaced by `rewrite(cell, tag)`.
    pub fn regex_summary(
        &mut self,
        id: &str,
        patterns: &[(Regex, String)],
        template: &str,
        rewrite: Option<&dyn Fn(&Cell, &str) -> Cell>,
    ) -> Result<(), TableError> {
        let mut counts = TagCounts::new();

        for cell in self.column_mut(id)? {
            let text = cell.tag();
            let tag = patterns.iter().find(|(re, _)| re.is_match(&text)).map(|(_, t)| t.as_str()).unwrap_or(OTHER_TAG);
            counts.add(tag);

            if let Some(f) = rewrite {
                *cell = f(&*cell, tag);
            }
        }

        let summary = counts.iter().map(|(tag, n)| format!("n_{}={}", tag, n)).collect::<Vec<_>>().join(" ");
        self.add_summary(id, template.replace("{summary}", &summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(tags: &[&str]) -> TagCounts {
        let mut c = TagCounts::new();
        for t in tags {
            c.add(t);
        }
        c
    }

    #[test]
    fn test_generate_summary_pass_only() {
        assert_eq!(generate_summary(counts(&["pass", "pass"])), "pass=2");
    }

    #[test]
    fn test_generate_summary_single_fail_tag_inline() {
        assert_eq!(generate_summary(counts(&["pass", "FAIL", "NA", "pass"])), "pass=2 NA=1 FAIL=1");
    }

    #[test]
    fn test_generate_summary_folds_multiple_fail_tags() {
        let summary = generate_summary(counts(&["pass", "FAIL", "timeout", "FAIL"]));
        assert_eq!(summary, "<details><summary>pass=1 FAIL=3</summary>n_FAIL=2 n_timeout=1</details>");
    }

    #[test]
    fn test_tag_counts_keep_seen_order() {
        let c = counts(&["b", "a", "b"]);
        let seen: Vec<_> = c.iter().collect();
        assert_eq!(seen, vec![("b", 2), ("a", 1)]);
        assert_eq!(c.total(), 3);
    }

    #[test]
    fn test_with_tags_fixes_order_without_duplicates() {
        let mut c = TagCounts::with_tags(["x", "y", "x"]);
        c.add("y");
        let seen: Vec<_> = c.iter().collect();
        assert_eq!(seen, vec![("x", 0), ("y", 1)]);
    }
}
