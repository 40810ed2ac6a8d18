/// Integration tests for the sbml-compat binary
///
/// These tests run the built binary on the recorded outcomes under
/// tests/fixtures and check the reports it writes.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Helper to get the test fixtures directory
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_string_lossy().into_owned()
}

// Helper to run the binary with a clean category environment
fn run_bin(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sbml-compat"))
        .args(args)
        .current_dir(cwd)
        .env_remove("SBML_COMPAT_CATEGORIES")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run sbml-compat {}: {}", args.join(" "), e))
}

fn assert_success(output: &Output, context: &str) {
    assert!(
        output.status.success(),
        "{} failed with status: {:?}\nstderr: {}",
        context,
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn table_lines(report: &str) -> Vec<&str> {
    report.lines().filter(|l| l.starts_with('|')).collect()
}

#[test]
fn test_fixtures_exist() {
    let fixtures = fixtures_dir();
    assert!(fixtures.join("cases.json").exists());
    assert!(fixtures.join("results_local.json").exists());
    assert!(fixtures.join("results_remote.json").exists());
    assert!(fixtures.join("runs/vcell/detailedErrorLog.txt").exists());
}

#[test]
fn test_suite_report_with_category_file() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("suite.md");
    let out = output.to_string_lossy().into_owned();

    let result = run_bin(
        &[
            "suite",
            "--cases",
            &fixture("cases.json"),
            "--engine",
            "tellurium",
            "copasi",
            "--categories",
            &fixture("categories.toml"),
            "--output",
            &out,
            "--title",
            "SBML test suite",
        ],
        temp.path(),
    );
    assert_success(&result, "suite");

    let report = fs::read_to_string(&output).unwrap();
    assert!(report.starts_with("# SBML test suite\n"));
    assert!(report.contains("Engines: Tellurium, COPASI"));

    let lines = table_lines(&report);
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "|case|valid-sbml|valid-sbml-units|valid-sedml|fixed-ref|Tellurium|COPASI|");
    assert_eq!(lines[1], "|---|---|---|---|---|---|---|");
    assert_eq!(
        lines[2],
        "|cases=3|pass=2 FAIL=1|pass=1 NA=1 FAIL=1|pass=2 NA=1|NA=3|\
         <details><summary>fails=1</summary>other=1</details>|\
         <details><summary>fails=1</summary>too_much_work=1</details>|"
    );
    assert_eq!(
        lines[3],
        "|[00001](https://github.com/sbmlteam/sbml-test-suite/tree/release/cases/semantic/00001)|pass|pass|pass|NA|pass|pass|"
    );
    assert!(lines[4].contains(
        "<details><summary>FAIL (too_much_work)</summary>CVODE error: CV_TOO_MUCH_WORK at t=10</details>"
    ));
    assert_eq!(lines[5], "|00003|FAIL|NA|NA|NA|NA|NA|");
}

#[test]
fn test_suite_report_builtin_categories() {
    let temp = TempDir::new().unwrap();
    let result = run_bin(&["--quiet", "suite", "--cases", &fixture("cases.json")], temp.path());
    assert_success(&result, "suite");
    assert!(result.stdout.is_empty(), "--quiet should suppress status output");

    let report = fs::read_to_string(temp.path().join("results.md")).unwrap();
    assert!(report.contains("<details><summary>FAIL (algebraic)</summary>Unable to support algebraic rules."));
    assert!(report.contains("<details><summary>fails=1</summary>algebraic=1</details>"));
}

#[test]
fn test_suite_rejects_unknown_engine() {
    let temp = TempDir::new().unwrap();
    let result = run_bin(&["suite", "--cases", &fixture("cases.json"), "--engine", "nosuch"], temp.path());
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Unknown engine 'nosuch'"));
    assert!(!temp.path().join("results.md").exists());
}

#[test]
fn test_engines_report() {
    let temp = TempDir::new().unwrap();
    let result = run_bin(
        &[
            "engines",
            "--local",
            &fixture("results_local.json"),
            "--remote",
            &fixture("results_remote.json"),
            "--model",
            "BIOMD1.sbml",
            "--experiment",
            "BIOMD1 sim.sedml",
            "--plots-local",
            &fixture("d1_plots_local"),
        ],
        temp.path(),
    );
    assert_success(&result, "engines");

    let report = fs::read_to_string(temp.path().join("results_BIOMD1sim.md")).unwrap();
    assert!(report.starts_with("# BIOMD1 sim.sedml\n"));

    let lines = table_lines(&report);
    assert_eq!(lines[0], "|Engine|Compatibility|pass / FAIL (R)|pass / FAIL (L)|d1 (R)|d1 (L)|");
    assert_eq!(lines[2], "|||pass=1|pass=1|||");
    // copasi, tellurium, vcell
    assert_eq!(lines.len(), 6);

    let copasi = lines[3];
    assert!(copasi.starts_with("|<details><summary>COPASI</summary>"));
    assert!(copasi.contains("|NA|<details><summary>&#10060; FAIL</summary>"));
    assert!(copasi.contains("ERROR MESSAGE:<br>Model BIOMD1 could not be simulated<br><br>"));
    assert!(copasi.contains("ERROR TYPE:<br>CombineArchiveExecutionError"));

    let tellurium = lines[4];
    assert!(tellurium.contains(r#"<a href="https://run.biosimulations.org/runs/abc">view</a>"#));
    assert!(tellurium.contains("|&#9989; PASS|"));
    assert!(tellurium.contains("tellurium_autogen_plot.pdf\">plot</a>|"));

    let vcell = lines[5];
    assert!(vcell.contains("status: QUEUED"));
    assert!(vcell.ends_with("|NA|||"));
}

#[test]
fn test_collect_then_report() {
    let temp = TempDir::new().unwrap();
    let json = temp.path().join("results_local.json");
    let json_arg = json.to_string_lossy().into_owned();

    let result = run_bin(&["collect", "--run-dir", &fixture("runs"), "--output", &json_arg], temp.path());
    assert_success(&result, "collect");

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("sbml-compat: tellurium: pass"));
    assert!(stdout.contains("sbml-compat: vcell: FAIL"));
    assert!(stdout.contains("sbml-compat: copasi: FAIL"));

    let collected: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(collected["vcell"]["detailed_error_log"]["error_message"], "Runtime Exception");
    assert_eq!(collected["tellurium"]["log_yml"]["status"], "SUCCEEDED");

    let result = run_bin(
        &["engines", "--local", &json_arg, "--model", "m.sbml", "--experiment", "s.sedml", "--output", "out.md"],
        temp.path(),
    );
    assert_success(&result, "engines after collect");
    let report = fs::read_to_string(temp.path().join("out.md")).unwrap();
    assert!(report.contains("Runtime Exception"));
}

#[test]
fn test_patch_dry_run_apply_restore() {
    let temp = TempDir::new().unwrap();
    let sedml = temp.path().join("simulation.sedml");
    let sbml = temp.path().join("model_1.xml");
    fs::copy(fixtures_dir().join("patch/simulation.sedml"), &sedml).unwrap();
    fs::copy(fixtures_dir().join("patch/model_1.xml"), &sbml).unwrap();
    let original = fs::read_to_string(&sedml).unwrap();
    let (sedml_arg, sbml_arg) = (sedml.to_string_lossy().into_owned(), sbml.to_string_lossy().into_owned());

    let result = run_bin(&["patch", "--sedml", &sedml_arg, "--sbml", &sbml_arg, "--dry-run"], temp.path());
    assert_success(&result, "patch --dry-run");
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("would fix model.xml reference"));
    assert!(stdout.contains("would fix xmlns:sbml attribute"));
    assert!(!stdout.contains("xmlns:fbc"));
    assert_eq!(fs::read_to_string(&sedml).unwrap(), original);

    let result = run_bin(&["patch", "--sedml", &sedml_arg, "--sbml", &sbml_arg], temp.path());
    assert_success(&result, "patch");
    let patched = fs::read_to_string(&sedml).unwrap();
    assert!(patched.contains(r#"source="model_1.xml""#));
    assert!(patched.contains(r#"<sedML xmlns:sbml="http://www.sbml.org/sbml/level3/version1/core" "#));

    let result = run_bin(&["patch", "--sedml", &sedml_arg, "--sbml", &sbml_arg, "--restore"], temp.path());
    assert_success(&result, "patch --restore");
    assert_eq!(fs::read_to_string(&sedml).unwrap(), original);
}
