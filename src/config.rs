/// Configuration resolution module
///
/// This module handles:
/// - Building a RunPlan from CLI arguments
/// - Resolving engine ids against the registry
/// - Loading the error category registry (file, environment, or built-in)
/// - Validating input paths and deriving default output names
use crate::cli::{CliArgs, Command};
use crate::engines::{self, Engine};
use crate::table::ErrorCategories;
use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a categories TOML file
pub const CATEGORIES_ENV: &str = "SBML_COMPAT_CATEGORIES";

/// Everything one invocation will do, resolved up front
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub quiet: bool,
    pub task: Task,
}

#[derive(Debug, Clone)]
pub enum Task {
    Suite(SuitePlan),
    Engines(EnginePlan),
    Collect { run_dir: PathBuf, output: PathBuf },
    Patch { sedml: PathBuf, sbml: PathBuf, mode: PatchMode },
}

#[derive(Debug, Clone)]
pub struct SuitePlan {
    pub cases: PathBuf,
    pub engines: Vec<&'static Engine>,
    pub registry: ErrorCategories,
    pub output: PathBuf,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct EnginePlan {
    pub local: Option<PathBuf>,
    pub remote: Option<PathBuf>,
    pub model: String,
    pub experiment: String,
    pub plots_local: Option<PathBuf>,
    pub plots_remote: Option<PathBuf>,
    pub output: PathBuf,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchMode {
    Apply,
    DryRun,
    Restore,
}

/// Build a complete RunPlan from CLI arguments
///
/// This resolves all configuration upfront, so the command that runs
/// receives a fully validated, immutable plan.
pub fn build_plan(args: &CliArgs) -> Result<RunPlan, String> {
    debug!("Building run plan from CLI args");

    let task = match &args.command {
        Command::Suite { cases, engines, categories, output, title } => {
            require_file(cases, "--cases")?;
            let engines = resolve_engines(engines)?;
            let registry = resolve_categories(categories.as_deref(), env::var(CATEGORIES_ENV).ok())?;
            debug!("Suite over {} engines, categories for {:?}", engines.len(), registry.engines().collect::<Vec<_>>());
            Task::Suite(SuitePlan {
                cases: cases.clone(),
                engines,
                registry,
                output: output.clone(),
                title: title.clone(),
            })
        }
        Command::Engines { local, remote, model, experiment, plots_local, plots_remote, output, title } => {
            if let Some(path) = local {
                require_file(path, "--local")?;
            }
            if let Some(path) = remote {
                require_file(path, "--remote")?;
            }
            for (dir, flag) in [(plots_local, "--plots-local"), (plots_remote, "--plots-remote")] {
                if let Some(dir) = dir
                    && !dir.is_dir()
                {
                    return Err(format!("{} directory not found: {}", flag, dir.display()));
                }
            }
            Task::Engines(EnginePlan {
                local: local.clone(),
                remote: remote.clone(),
                model: model.clone(),
                experiment: experiment.clone(),
                plots_local: plots_local.clone(),
                plots_remote: plots_remote.clone(),
                output: output.clone().unwrap_or_else(|| default_engine_report_path(experiment)),
                title: title.clone().unwrap_or_else(|| experiment.clone()),
            })
        }
        Command::Collect { run_dir, output } => {
            if !run_dir.is_dir() {
                return Err(format!("--run-dir directory not found: {}", run_dir.display()));
            }
            Task::Collect { run_dir: run_dir.clone(), output: output.clone() }
        }
        Command::Patch { sedml, sbml, dry_run, restore } => {
            require_file(sedml, "--sedml")?;
            let mode = match (*dry_run, *restore) {
                (_, true) => PatchMode::Restore,
                (true, false) => PatchMode::DryRun,
                (false, false) => PatchMode::Apply,
            };
            if mode != PatchMode::Restore {
                require_file(sbml, "--sbml")?;
            }
            Task::Patch { sedml: sedml.clone(), sbml: sbml.clone(), mode }
        }
    };

    Ok(RunPlan { quiet: args.quiet, task })
}

fn require_file(path: &Path, flag: &str) -> Result<(), String> {
    if path.is_file() { Ok(()) } else { Err(format!("{} file not found: {}", flag, path.display())) }
}

/// Resolve engine ids against the registry, keeping the given order
pub fn resolve_engines(ids: &[String]) -> Result<Vec<&'static Engine>, String> {
    let mut resolved: Vec<&'static Engine> = Vec::with_capacity(ids.len());
    for id in ids {
        let engine = engines::get_engine(id).ok_or_else(|| {
            format!("Unknown engine '{}'. Known engines: {}", id, engines::engine_ids().collect::<Vec<_>>().join(", "))
        })?;
        if resolved.iter().any(|e| e.id == engine.id) {
            return Err(format!("Engine '{}' listed more than once", id));
        }
        resolved.push(engine);
    }
    Ok(resolved)
}

/// Load the category registry: the `--categories` file first, then the
/// file named by the environment, else the built-in registry.
pub fn resolve_categories(flag: Option<&Path>, env_value: Option<String>) -> Result<ErrorCategories, String> {
    let path = match (flag, env_value) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(value)) if !value.trim().is_empty() => PathBuf::from(value),
        _ => {
            debug!("Using built-in error categories");
            return Ok(ErrorCategories::builtin());
        }
    };

    debug!("Loading error categories from {:?}", path);
    let text =
        fs::read_to_string(&path).map_err(|e| format!("Failed to read categories file {}: {}", path.display(), e))?;
    ErrorCategories::from_toml(&text).map_err(|e| format!("{}: {}", path.display(), e))
}

/// `results_<name>.md`, where `<name>` is the experiment file name up to
/// its first dot with spaces removed
pub fn default_engine_report_path(experiment: &str) -> PathBuf {
    let file_name = Path::new(experiment).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default().replace(' ', "");
    PathBuf::from(format!("results_{}.md", stem))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
