//! SED-ML text fixes applied before a model is run.
//!
//! This module handles:
//! - Pointing a generic `source="model.xml"` reference at the real SBML file
//! - Adding the `xmlns:sbml` / `xmlns:fbc` namespaces the SBML file declares
//!   but the `<sedML>` tag is missing
//! - Backup and restore of the SED-ML file around those edits
//!
//! # Safety
//!
//! [`apply_fixes`] backs the SED-ML file up before writing anything, so
//! [`restore_file`] can always put the original back.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension for backup files
const BACKUP_EXTENSION: &str = ".sbml-compat-backup";

const GENERIC_MODEL_SOURCE: &str = r#"source="model.xml""#;

lazy_static! {
    static ref SEDML_TAG: Regex = Regex::new(r"<sedML[^>]*>").expect("valid regex");
    static ref XMLNS: Regex = Regex::new(r#"xmlns="([^"]*)""#).expect("valid regex");
    static ref XMLNS_FBC: Regex = Regex::new(r#"xmlns:fbc="([^"]*)""#).expect("valid regex");
}

/// A fix applied to a SED-ML file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fix {
    ModelReference,
    XmlnsSbml,
    XmlnsFbc,
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fix::ModelReference => write!(f, "model.xml reference"),
            Fix::XmlnsSbml => write!(f, "xmlns:sbml attribute"),
            Fix::XmlnsFbc => write!(f, "xmlns:fbc attribute"),
        }
    }
}

fn backup_path(path: &Path) -> PathBuf {
    path.with_extension(format!(
        "{}{}",
        path.extension().map(|e| e.to_string_lossy()).unwrap_or_default(),
        BACKUP_EXTENSION
    ))
}

/// Create a backup of a file.
///
/// Returns the path to the backup file.
pub fn backup_file(path: &Path) -> std::io::Result<PathBuf> {
    let backup = backup_path(path);
    if !path.exists() {
        return Ok(backup);
    }
    fs::copy(path, &backup)?;
    debug!("Created backup: {:?}", backup);
    Ok(backup)
}

/// Restore a file from its backup, removing the backup.
///
/// Returns false when there was no backup to restore.
pub fn restore_file(path: &Path) -> std::io::Result<bool> {
    let backup = backup_path(path);
    if !backup.exists() {
        return Ok(false);
    }
    fs::copy(&backup, path)?;
    fs::remove_file(&backup)?;
    debug!("Restored from backup: {:?}", path);
    Ok(true)
}

fn sedml_tag(sedml: &str) -> Result<regex::Match<'_>, String> {
    SEDML_TAG.find(sedml).ok_or_else(|| "Invalid SED-ML: main <sedML> tag not found".to_string())
}

/// Rewrite a generic `model.xml` reference to `sbml_filename`.
///
/// Returns None when the reference already looks valid.
pub fn replace_model_reference(sedml: &str, sbml_filename: &str) -> Option<String> {
    if sbml_filename == "model.xml" || !sedml.contains(GENERIC_MODEL_SOURCE) {
        return None;
    }
    Some(sedml.replace(GENERIC_MODEL_SOURCE, &format!(r#"source="{}""#, sbml_filename)))
}

/// File-level [`replace_model_reference`]: returns true when the reference
/// already looked valid and the file was left alone.
pub fn replace_model_xml(sedml_path: &Path, sbml_filename: &str) -> Result<bool, String> {
    let text = fs::read_to_string(sedml_path).map_err(|e| format!("Failed to read {}: {}", sedml_path.display(), e))?;
    match replace_model_reference(&text, sbml_filename) {
        None => Ok(true),
        Some(fixed) => {
            fs::write(sedml_path, fixed).map_err(|e| format!("Failed to write {}: {}", sedml_path.display(), e))?;
            Ok(false)
        }
    }
}

/// True if the main `<sedML>` tag has no `xmlns:sbml` attribute
pub fn xmlns_sbml_attribute_missing(sedml: &str) -> Result<bool, String> {
    Ok(!sedml_tag(sedml)?.as_str().contains("xmlns:sbml"))
}

/// Add an `xmlns:sbml` attribute matching the SBML file's default namespace
pub fn add_xmlns_sbml_attribute(sedml: &str, sbml: &str) -> Result<String, String> {
    let tag = sedml_tag(sedml)?;
    if tag.as_str().contains("xmlns:sbml") {
        return Err("xmlns:sbml attribute already present".to_string());
    }
    let namespace = XMLNS
        .captures(sbml)
        .and_then(|c| c.get(1))
        .ok_or_else(|| "SBML file declares no xmlns namespace".to_string())?;

    let at = tag.start() + "<sedML".len();
    Ok(format!(r#"{} xmlns:sbml="{}"{}"#, &sedml[..at], namespace.as_str(), &sedml[at..]))
}

/// True if the SBML file declares `xmlns:fbc` and the SED-ML file does not
pub fn xmlns_fbc_attribute_missing(sbml: &str, sedml: &str) -> bool {
    XMLNS_FBC.is_match(sbml) && !XMLNS_FBC.is_match(sedml)
}

/// Add the SBML file's `xmlns:fbc` namespace to the `<sedML>` tag
pub fn add_xmlns_fbc_attribute(sedml: &str, sbml: &str) -> Result<String, String> {
    let tag = sedml_tag(sedml)?;
    if tag.as_str().contains("xmlns:fbc") {
        return Err("xmlns:fbc attribute already present".to_string());
    }
    let namespace = XMLNS_FBC
        .captures(sbml)
        .and_then(|c| c.get(1))
        .ok_or_else(|| "SBML file declares no xmlns:fbc namespace".to_string())?;

    let at = tag.end() - 1;
    Ok(format!(r#"{} xmlns:fbc="{}"{}"#, &sedml[..at], namespace.as_str(), &sedml[at..]))
}

/// Work out (and unless `dry_run`, write) every fix the SED-ML file needs.
///
/// The original is backed up before the file is rewritten.
pub fn apply_fixes(sedml_path: &Path, sbml_path: &Path, dry_run: bool) -> Result<Vec<Fix>, String> {
    let read = |p: &Path| fs::read_to_string(p).map_err(|e| format!("Failed to read {}: {}", p.display(), e));
    let mut sedml = read(sedml_path)?;
    let sbml = read(sbml_path)?;
    let sbml_filename = sbml_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Not a file: {}", sbml_path.display()))?;

    let mut fixes = Vec::new();

    if let Some(fixed) = replace_model_reference(&sedml, &sbml_filename) {
        sedml = fixed;
        fixes.push(Fix::ModelReference);
    }
    if xmlns_sbml_attribute_missing(&sedml)? {
        sedml = add_xmlns_sbml_attribute(&sedml, &sbml)?;
        fixes.push(Fix::XmlnsSbml);
    }
    if xmlns_fbc_attribute_missing(&sbml, &sedml) {
        sedml = add_xmlns_fbc_attribute(&sedml, &sbml)?;
        fixes.push(Fix::XmlnsFbc);
    }

    debug!("{} fixes for {:?} (dry run: {})", fixes.len(), sedml_path, dry_run);

    if !fixes.is_empty() && !dry_run {
        backup_file(sedml_path).map_err(|e| format!("Failed to back up {}: {}", sedml_path.display(), e))?;
        fs::write(sedml_path, sedml).map_err(|e| format!("Failed to write {}: {}", sedml_path.display(), e))?;
    }

    Ok(fixes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SBML: &str = r#"<?xml version="1.0"?>
<sbml xmlns="http://www.sbml.org/sbml/level3/version1/core" xmlns:fbc="http://www.sbml.org/sbml/level3/version1/fbc/version2" level="3">
</sbml>"#;

    const SEDML: &str = r#"<?xml version="1.0"?>
<sedML xmlns="http://sed-ml.org/sed-ml/level1/version3" level="1" version="3">
  <listOfModels>
    <model id="m" language="urn:sedml:language:sbml" source="model.xml"/>
  </listOfModels>
</sedML>"#;

    #[test]
    fn test_replace_model_reference() {
        let fixed = replace_model_reference(SEDML, "BIOMD0000000001.xml").unwrap();
        assert!(fixed.contains(r#"source="BIOMD0000000001.xml""#));
        assert!(replace_model_reference(SEDML, "model.xml").is_none());
        assert!(replace_model_reference(&fixed, "BIOMD0000000001.xml").is_none());
    }

    #[test]
    fn test_add_xmlns_sbml() {
        assert!(xmlns_sbml_attribute_missing(SEDML).unwrap());
        let fixed = add_xmlns_sbml_attribute(SEDML, SBML).unwrap();
        assert!(fixed.contains(r#"<sedML xmlns:sbml="http://www.sbml.org/sbml/level3/version1/core" xmlns="#));
        assert!(!xmlns_sbml_attribute_missing(&fixed).unwrap());
        assert!(add_xmlns_sbml_attribute(&fixed, SBML).is_err());
    }

    #[test]
    fn test_add_xmlns_fbc() {
        assert!(xmlns_fbc_attribute_missing(SBML, SEDML));
        let fixed = add_xmlns_fbc_attribute(SEDML, SBML).unwrap();
        assert!(fixed.contains(r#"version="3" xmlns:fbc="http://www.sbml.org/sbml/level3/version1/fbc/version2">"#));
        assert!(!xmlns_fbc_attribute_missing(SBML, &fixed));
    }

    #[test]
    fn test_missing_sedml_tag() {
        assert!(xmlns_sbml_attribute_missing("<notSedml/>").is_err());
        assert!(add_xmlns_fbc_attribute("<notSedml/>", SBML).is_err());
    }

    #[test]
    fn test_apply_fixes_backs_up_and_restores() {
        let temp = TempDir::new().unwrap();
        let sedml_path = temp.path().join("sim.sedml");
        let sbml_path = temp.path().join("model_1.xml");
        fs::write(&sedml_path, SEDML).unwrap();
        fs::write(&sbml_path, SBML).unwrap();

        let planned = apply_fixes(&sedml_path, &sbml_path, true).unwrap();
        assert_eq!(planned, vec![Fix::ModelReference, Fix::XmlnsSbml, Fix::XmlnsFbc]);
        assert_eq!(fs::read_to_string(&sedml_path).unwrap(), SEDML);

        let applied = apply_fixes(&sedml_path, &sbml_path, false).unwrap();
        assert_eq!(applied, planned);
        let patched = fs::read_to_string(&sedml_path).unwrap();
        assert!(patched.contains(r#"source="model_1.xml""#));
        assert!(backup_path(&sedml_path).exists());

        assert!(apply_fixes(&sedml_path, &sbml_path, false).unwrap().is_empty());

        assert!(restore_file(&sedml_path).unwrap());
        assert_eq!(fs::read_to_string(&sedml_path).unwrap(), SEDML);
        assert!(!restore_file(&sedml_path).unwrap());
    }

    #[test]
    fn test_replace_model_xml_file() {
        let temp = TempDir::new().unwrap();
        let sedml_path = temp.path().join("sim.sedml");
        fs::write(&sedml_path, SEDML).unwrap();

        assert!(!replace_model_xml(&sedml_path, "real.xml").unwrap());
        assert!(replace_model_xml(&sedml_path, "real.xml").unwrap());
    }
}
