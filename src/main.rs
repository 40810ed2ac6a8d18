// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod cli;
mod config;
mod engines;
mod patching;
mod report;
mod status;
mod table;
mod types;
mod ui;

use config::{EnginePlan, PatchMode, SuitePlan, Task};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use types::{CaseRecord, RunResults};

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Build run plan
    let plan = match config::build_plan(&args) {
        Ok(p) => p,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    ui::set_quiet(plan.quiet);

    if let Err(e) = run(&plan.task) {
        ui::print_error(&e);
        std::process::exit(1);
    }
}

fn run(task: &Task) -> Result<(), String> {
    match task {
        Task::Suite(plan) => run_suite(plan),
        Task::Engines(plan) => run_engines(plan),
        Task::Collect { run_dir, output } => run_collect(run_dir, output),
        Task::Patch { sedml, sbml, mode } => run_patch(sedml, sbml, *mode),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

fn run_suite(plan: &SuitePlan) -> Result<(), String> {
    let cases: Vec<CaseRecord> = read_json(&plan.cases)?;
    ui::status(&format!("Building suite report: {} cases, {} engines", cases.len(), plan.engines.len()));

    let table = report::build_suite_table(&cases, &plan.engines, &plan.registry).map_err(|e| e.to_string())?;

    let names: Vec<&str> = plan.engines.iter().map(|e| e.name).collect();
    let description = format!("Engines: {}", names.join(", "));
    report::write_markdown_report(&plan.output, &plan.title, Some(&description), &table)?;

    ui::status(&format!("Wrote {} rows to {}", table.n_rows(), plan.output.display()));
    Ok(())
}

fn run_engines(plan: &EnginePlan) -> Result<(), String> {
    let local: Option<RunResults> = plan.local.as_deref().map(read_json).transpose()?;
    let remote: Option<RunResults> = plan.remote.as_deref().map(read_json).transpose()?;
    let plots_local = plan.plots_local.as_deref().map(status::d1_plots);
    let plots_remote = plan.plots_remote.as_deref().map(status::d1_plots);

    ui::status(&format!(
        "Building engine report for {}: {} local, {} remote runs",
        plan.experiment,
        local.as_ref().map_or(0, |r| r.len()),
        remote.as_ref().map_or(0, |r| r.len())
    ));

    let table = report::build_engine_table(
        report::RunSide { results: remote.as_ref(), plots: plots_remote.as_ref() },
        report::RunSide { results: local.as_ref(), plots: plots_local.as_ref() },
        &plan.model,
        &plan.experiment,
    )
    .map_err(|e| e.to_string())?;

    let description = format!("Model: {}<br>Experiment: {}<br>(R) remote run, (L) local run", plan.model, plan.experiment);
    report::write_markdown_report(&plan.output, &plan.title, Some(&description), &table)?;

    ui::status(&format!("Wrote {} engines to {}", table.n_rows(), plan.output.display()));
    Ok(())
}

fn run_collect(run_dir: &Path, output: &Path) -> Result<(), String> {
    let results = status::collect_run_dir(run_dir)?;

    for (engine, run) in &results {
        let record = status::resolve_status(run);
        ui::status(&format!("{}: {}", engine, record.status.as_deref().unwrap_or("unknown")));
    }

    report::export_run_results(&results, output)?;
    ui::status(&format!("Wrote {} run records to {}", results.len(), output.display()));
    Ok(())
}

fn run_patch(sedml: &Path, sbml: &Path, mode: PatchMode) -> Result<(), String> {
    if mode == PatchMode::Restore {
        let restored =
            patching::restore_file(sedml).map_err(|e| format!("Failed to restore {}: {}", sedml.display(), e))?;
        if restored {
            ui::status(&format!("Restored {}", sedml.display()));
        } else {
            ui::status(&format!("No backup found for {}", sedml.display()));
        }
        return Ok(());
    }

    let dry_run = mode == PatchMode::DryRun;
    let fixes = patching::apply_fixes(sedml, sbml, dry_run)?;

    if fixes.is_empty() {
        ui::status(&format!("{}: no fixes needed", sedml.display()));
    }
    for fix in &fixes {
        let verb = if dry_run { "would fix" } else { "fixed" };
        ui::status(&format!("{}: {} {}", sedml.display(), verb, fix));
    }
    Ok(())
}
