/// Core data structures for recorded engine outcomes
///
/// This module defines the records read from and written to disk: the
/// status of one engine run, the raw run record an engine run leaves behind,
/// and the per-case validation record the suite report is built from.
use std::collections::BTreeMap;

/// Normalized outcome of one engine run
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct StatusRecord {
    /// "pass", "FAIL", or None when the run state is unknown
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub exception_type: String,
}

impl StatusRecord {
    pub fn pass() -> Self {
        Self { status: Some("pass".to_string()), ..Default::default() }
    }

    pub fn fail(error_message: &str) -> Self {
        Self { status: Some("FAIL".to_string()), error_message: error_message.to_string(), ..Default::default() }
    }

    pub fn is_pass(&self) -> bool {
        self.status.as_deref() == Some("pass")
    }
}

/// Override recorded when the detailed error log reveals a failure
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetailedErrorLog {
    pub status: String,
    pub error_message: String,
}

/// Everything one engine run left behind, as stored in `results_*.json`
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct RunRecord {
    /// Exception raised while launching the run (local runs)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub exception_message: String,

    /// Parsed `log.yml`; an empty object when none was found
    #[serde(default)]
    pub log_yml: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_error_log: Option<DetailedErrorLog>,

    /// Remote run links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
}

impl RunRecord {
    /// `(title, url)` for each remote link present, in view/download/logs order
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [("view", &self.view), ("download", &self.download), ("logs", &self.logs)]
            .into_iter()
            .filter_map(|(title, url)| url.as_deref().map(|u| (title, u)))
            .collect()
    }
}

/// Engine id -> run record, the layout of `results_local.json` / `results_remote.json`
pub type RunResults = BTreeMap<String, RunRecord>;

/// One test case of a suite run
///
/// Stages that never ran are left out and show up as `NA` in the report.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct CaseRecord {
    pub case: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub valid_sbml: Option<bool>,
    #[serde(default)]
    pub valid_sbml_units: Option<bool>,
    #[serde(default)]
    pub valid_sedml: Option<bool>,
    /// true when the SED-ML model reference already looked right
    #[serde(default)]
    pub fixed_ref: Option<bool>,
    /// Engine id -> error text (empty = ran without error)
    #[serde(default)]
    pub outcomes: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_record_from_remote_json() {
        let json = r#"{
            "view": "https://example.org/runs/1",
            "download": "https://example.org/runs/1/download",
            "log_yml": {"status": "SUCCEEDED"}
        }"#;
        let record: RunRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.links(), vec![("view", "https://example.org/runs/1"), ("download", "https://example.org/runs/1/download")]);
        assert_eq!(record.log_yml["status"], "SUCCEEDED");
        assert!(record.detailed_error_log.is_none());
    }

    #[test]
    fn test_run_record_defaults() {
        let record: RunRecord = serde_json::from_str("{}").unwrap();
        assert!(record.exception_message.is_empty());
        assert!(record.log_yml.is_null());
        assert!(record.links().is_empty());
    }

    #[test]
    fn test_case_record_missing_stages() {
        let record: CaseRecord = serde_json::from_str(r#"{"case": "BIOMD0000000001", "valid_sbml": true}"#).unwrap();
        assert_eq!(record.valid_sbml, Some(true));
        assert_eq!(record.valid_sedml, None);
        assert!(record.outcomes.is_empty());
    }

    #[test]
    fn test_status_record_serialization() {
        let record = StatusRecord::fail("boom");
        let json = serde_json::to_string(&record).unwrap();
        let back: StatusRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!(!back.is_pass());
        assert!(StatusRecord::pass().is_pass());
    }
}
