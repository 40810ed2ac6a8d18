//! Error category registry and engine outcome column processing.
//!
//! The registry maps an engine id to an ordered list of `(regex, tag)` pairs.
//! The first pattern matching an error message decides its tag; no match
//! falls back to [`OTHER_TAG`].

use super::cell::{Cell, FAIL, PASS, Scalar};
use super::markdown::{make_fold, safe_md_string};
use super::summary::TagCounts;
use super::{ResultTable, TableError};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Tag for errors that match no registered pattern
pub const OTHER_TAG: &str = "other";

/// Built-in tellurium error taxonomy, in match order
const TELLURIUM_CATEGORIES: &[(&str, &str)] = &[
    ("^Unable to support algebraic rules.", "algebraic"),
    ("^Unable to support delay differential equations.", "delay"),
    ("^Unknown ASTNode type of", "ASTNode"),
    ("^Mutable stochiometry for species which appear multiple times in a single reaction", "stochiometry"),
    ("^'float' object is not callable", "float"),
    ("is not a named SpeciesReference", "SpeciesRef"),
    ("reset", "reset"),
    ("^failed to validate SEDML file", "SEDMLfile"),
    ("^No sbml element exists", "NoSBMLelement"),
    ("CV_ERR_FAILURE", "CV_ERR_FAILURE"),
    ("CV_TOO_MUCH_WORK", "CV_TOO_MUCH_WORK"),
    ("CV_CONV_FAILURE", "CV_CONV_FAILURE"),
    ("CV_ILL_INPUT", "CV_ILL_INPUT"),
    ("list index out of range", "OutOfRange"),
];

/// One `pattern = ..., tag = ...` entry of a categories file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryDef {
    pub pattern: String,
    pub tag: String,
}

#[derive(Debug, Deserialize)]
struct CategoriesFile {
    #[serde(default)]
    engines: BTreeMap<String, Vec<CategoryDef>>,
}

#[derive(Debug, Clone)]
struct Category {
    regex: Regex,
    tag: String,
}

/// Per-engine error categories, compiled once and passed explicitly to
/// whatever needs to classify errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorCategories {
    engines: BTreeMap<String, Vec<Category>>,
}

impl ErrorCategories {
    /// An empty registry: every error is `other`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in registry (tellurium taxonomy).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let defs = TELLURIUM_CATEGORIES
            .iter()
            .map(|(pattern, tag)| CategoryDef { pattern: pattern.to_string(), tag: tag.to_string() })
            .collect::<Vec<_>>();
        registry.insert("tellurium", &defs).expect("built-in category patterns are valid");
        registry
    }

    /// Parse a TOML categories file:
    ///
    /// ```toml
    /// [[engines.tellurium]]
    /// pattern = "^Unable to support algebraic rules."
    /// tag = "algebraic"
    /// ```
    pub fn from_toml(text: &str) -> Result<Self, String> {
        let file: CategoriesFile = toml::from_str(text).map_err(|e| format!("Invalid categories file: {}", e))?;
        let mut registry = Self::new();
        for (engine, defs) in &file.engines {
            registry.insert(engine, defs)?;
        }
        Ok(registry)
    }

    /// Set (replace) the ordered categories for one engine.
    pub fn insert(&mut self, engine: &str, defs: &[CategoryDef]) -> Result<(), String> {
        let categories = defs
            .iter()
            .map(|d| {
                Regex::new(&d.pattern)
                    .map(|regex| Category { regex, tag: d.tag.clone() })
                    .map_err(|e| format!("Invalid pattern '{}' for {}: {}", d.pattern, engine, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.engines.insert(engine.to_string(), categories);
        Ok(())
    }

    pub fn engines(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }

    /// Registered tags for an engine, in match order (empty for unknown engines).
    pub fn tags(&self, engine: &str) -> Vec<&str> {
        self.engines.get(engine).map(|cats| cats.iter().map(|c| c.tag.as_str()).collect()).unwrap_or_default()
    }

    /// Tag for an error message: the first matching pattern wins.
    pub fn classify(&self, engine: &str, error: &str) -> &str {
        self.engines
            .get(engine)
            .and_then(|cats| cats.iter().find(|c| c.regex.is_match(error)))
            .map(|c| c.tag.as_str())
            .unwrap_or(OTHER_TAG)
    }
}

/// Parse the tag back out of a `FAIL (<tag>)` summary.
fn fail_tag(summary: &str) -> Option<&str> {
    summary.strip_prefix(FAIL)?.trim_start().strip_prefix('(')?.strip_suffix(')')
}

impl ResultTable {
    /// Categorize a column of engine outcomes.
    ///
    /// Falsy cells, `true` and `pass` become `pass`, `NA` stays `NA`, and every other
    /// value is treated as an error message: it is normalized, tagged with
    /// the engine's categories and replaced by a foldable `FAIL (<tag>)` cell
    /// holding the message. Cells that are already foldable keep their tag.
    /// The summary cell gets the failure total folded over a per-tag breakdown.
    pub fn categorize_column(&mut self, registry: &ErrorCategories, engine: &str, id: &str) -> Result<(), TableError> {
        let mut tags = registry.tags(engine);
        tags.push(OTHER_TAG);
        let mut errors = TagCounts::with_tags(tags);

        for cell in self.column_mut(id)? {
            let replacement = match &*cell {
                Cell::Scalar(Scalar::Na) => None,
                Cell::Foldable { summary, .. } => {
                    if summary != PASS {
                        errors.add(fail_tag(summary).unwrap_or(summary.as_str()));
                    }
                    None
                }
                Cell::Scalar(Scalar::Text(t)) if t.trim() == PASS => Some(Cell::text(PASS)),
                Cell::Scalar(Scalar::Bool(true)) => Some(Cell::text(PASS)),
                c if c.is_falsy() => Some(Cell::text(PASS)),
                c => {
                    let error = safe_md_string(&c.to_string());
                    let tag = registry.classify(engine, &error);
                    debug!("{}: categorized error as {}", engine, tag);
                    errors.add(tag);
                    Some(Cell::fold(format!("{} ({})", FAIL, tag), error))
                }
            };
            if let Some(new) = replacement {
                *cell = new;
            }
        }

        let details =
            errors.iter().filter(|(_, n)| *n > 0).map(|(t, n)| format!("{}={}", t, n)).collect::<Vec<_>>().join(" ");
        self.add_summary(id, make_fold(&format!("fails={}", errors.total()), &details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_tellurium() {
        let registry = ErrorCategories::builtin();
        assert_eq!(registry.tags("tellurium").len(), 14);
        assert_eq!(registry.classify("tellurium", "Unable to support algebraic rules. at x"), "algebraic");
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = ErrorCategories::new();
        registry
            .insert(
                "e",
                &[
                    CategoryDef { pattern: "bad".to_string(), tag: "first".to_string() },
                    CategoryDef { pattern: "bad input".to_string(), tag: "second".to_string() },
                ],
            )
            .unwrap();
        for _ in 0..3 {
            assert_eq!(registry.classify("e", "a bad input"), "first");
        }
    }

    #[test]
    fn test_unknown_engine_is_other() {
        let registry = ErrorCategories::builtin();
        assert_eq!(registry.classify("copasi", "anything"), OTHER_TAG);
        assert!(registry.tags("copasi").is_empty());
    }

    #[test]
    fn test_from_toml() {
        let text = r#"
[[engines.tellurium]]
pattern = "bad input"
tag = "badinput"

[[engines.copasi]]
pattern = "^CVODE"
tag = "cvode"
"#;
        let registry = ErrorCategories::from_toml(text).unwrap();
        assert_eq!(registry.engines().collect::<Vec<_>>(), vec!["copasi", "tellurium"]);
        assert_eq!(registry.classify("tellurium", "SomeError: bad input"), "badinput");
        assert_eq!(registry.classify("copasi", "CVODE failed"), "cvode");
        assert_eq!(registry.classify("copasi", "no CVODE"), OTHER_TAG);
    }

    #[test]
    fn test_from_toml_rejects_bad_regex() {
        let text = "[[engines.x]]\npattern = \"(\"\ntag = \"t\"\n";
        let err = ErrorCategories::from_toml(text).unwrap_err();
        assert!(err.contains("Invalid pattern"));
    }

    #[test]
    fn test_fail_tag() {
        assert_eq!(fail_tag("FAIL (badinput)"), Some("badinput"));
        assert_eq!(fail_tag("FAIL"), None);
        assert_eq!(fail_tag("pass"), None);
    }
}
