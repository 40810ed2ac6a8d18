use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "sbml-compat")]
#[command(about = "Report SBML/SED-ML compatibility across simulation engines")]
#[command(version)]
pub struct CliArgs {
    /// Suppress status output (reports and errors are still written)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render the per-case suite report from a cases JSON file
    Suite {
        /// JSON array of case records
        #[arg(long, value_name = "FILE")]
        cases: PathBuf,

        /// Engines to report on, in column order
        /// Can specify multiple: --engine tellurium copasi
        #[arg(long = "engine", value_name = "ID", num_args = 1.., default_value = "tellurium")]
        engines: Vec<String>,

        /// TOML file with error categories (overrides SBML_COMPAT_CATEGORIES)
        #[arg(long, value_name = "FILE")]
        categories: Option<PathBuf>,

        /// Markdown report output path
        #[arg(long, short = 'o', default_value = "results.md")]
        output: PathBuf,

        /// Report title
        #[arg(long, default_value = "Test suite results")]
        title: String,
    },

    /// Render the combined remote/local per-engine report
    Engines {
        /// Local run results JSON (engine id -> run record)
        #[arg(long, value_name = "FILE")]
        local: Option<PathBuf>,

        /// Remote run results JSON (engine id -> run record)
        #[arg(long, value_name = "FILE")]
        remote: Option<PathBuf>,

        /// Model (SBML) file name the runs used
        #[arg(long, value_name = "FILE")]
        model: String,

        /// Experiment (SED-ML) file name the runs used
        #[arg(long, value_name = "FILE")]
        experiment: String,

        /// Directory holding d1 plots from the local runs
        #[arg(long, value_name = "DIR")]
        plots_local: Option<PathBuf>,

        /// Directory holding d1 plots from the remote runs
        #[arg(long, value_name = "DIR")]
        plots_remote: Option<PathBuf>,

        /// Markdown report output path
        /// Default: results_<experiment name without extension or spaces>.md
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Report title (default: the experiment file name)
        #[arg(long)]
        title: Option<String>,
    },

    /// Build a run results JSON from engine output directories
    Collect {
        /// Directory with one subdirectory per engine
        #[arg(long, value_name = "DIR")]
        run_dir: PathBuf,

        /// Results JSON output path
        #[arg(long, short = 'o', default_value = "results_local.json")]
        output: PathBuf,
    },

    /// Apply SED-ML fixes (model.xml reference, missing xmlns:sbml / xmlns:fbc)
    Patch {
        #[arg(long, value_name = "FILE")]
        sedml: PathBuf,

        #[arg(long, value_name = "FILE")]
        sbml: PathBuf,

        /// Only report the fixes that would be applied
        #[arg(long)]
        dry_run: bool,

        /// Put the SED-ML file back from its backup
        #[arg(long, conflicts_with = "dry_run")]
        restore: bool,
    },
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        let mut args = CliArgs::parse();

        // Split engine ids on whitespace to support quoted lists like 'tellurium copasi'
        if let Command::Suite { ref mut engines, .. } = args.command {
            *engines = engines.iter().flat_map(|s| s.split_whitespace().map(|v| v.to_string())).collect();
        }

        args
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Suite { engines, .. } => {
                if engines.is_empty() {
                    return Err("Must specify at least one --engine".to_string());
                }
            }
            Command::Engines { local, remote, experiment, .. } => {
                if local.is_none() && remote.is_none() {
                    return Err("Must specify at least one of: --local or --remote".to_string());
                }
                if experiment.trim().is_empty() {
                    return Err("--experiment must not be empty".to_string());
                }
            }
            Command::Collect { .. } | Command::Patch { .. } => {}
        }
        Ok(())
    }
}
