//! Per-case suite report.
//!
//! One row per test case: the case name, the validation stages it went
//! through, then one outcome column per engine. Cases are added stage by
//! stage, so a case that stopped early still gets a full row with the
//! stages it never reached left as `NA`.

use crate::engines::Engine;
use crate::table::{Cell, ErrorCategories, ResultTable, RowValues, TableError, safe_md_string};
use crate::types::CaseRecord;
use log::debug;

/// Validation columns, `(id, label)`, in display order
pub const VALIDATION_COLUMNS: &[(&str, &str)] = &[
    ("valid_sbml", "valid-sbml"),
    ("valid_sbml_units", "valid-sbml-units"),
    ("valid_sedml", "valid-sedml"),
    ("fixed_ref", "fixed-ref"),
];

fn case_cell(case: &CaseRecord) -> Cell {
    let name = safe_md_string(&case.case);
    match case.url {
        Some(ref url) => Cell::text(format!("[{}]({})", name, url)),
        None => Cell::text(name),
    }
}

/// Build the suite table for `cases`, categorizing each engine column with `registry`.
pub fn build_suite_table(
    cases: &[CaseRecord],
    engines: &[&Engine],
    registry: &ErrorCategories,
) -> Result<ResultTable, TableError> {
    let mut spec = vec![("case", "case")];
    spec.extend_from_slice(VALIDATION_COLUMNS);
    spec.extend(engines.iter().map(|e| (e.id, e.name)));
    let mut table = ResultTable::new(&spec)?;

    for case in cases {
        table.new_row(RowValues::new().with("case", case_cell(case)))?;

        table.update_row(
            RowValues::new()
                .with("valid_sbml", case.valid_sbml)
                .with("valid_sbml_units", case.valid_sbml_units)
                .with("valid_sedml", case.valid_sedml)
                .with("fixed_ref", case.fixed_ref),
        )?;

        for engine in engines {
            if let Some(outcome) = case.outcomes.get(engine.id) {
                table.set_cell(engine.id, outcome.as_str())?;
            }
        }

        debug!("{}", table.last_row_text());
    }

    table.add_count("case", |_| true, "cases={count}")?;
    for (id, _) in VALIDATION_COLUMNS {
        table.simple_summary(id)?;
    }
    for engine in engines {
        table.categorize_column(registry, engine.id, engine.id)?;
    }

    Ok(table)
}
