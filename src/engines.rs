/// Simulation engine and file type registries
///
/// This module handles:
/// - The static list of BioSimulators engines and the (model, experiment)
///   format pairs each accepts
/// - File type names for the extensions those formats use
/// - Guessing from file names whether an input pair suits an engine
use lazy_static::lazy_static;
use log::debug;
use std::collections::HashMap;
use std::path::Path;

/// One simulation engine
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub id: &'static str,
    pub name: &'static str,
    /// Accepted (model, experiment) extensions, preferred pair first
    pub formats: &'static [(&'static str, &'static str)],
    pub url: &'static str,
    /// Free-form note shown under the engine name
    pub status: &'static str,
}

const SBML_SEDML: &[(&str, &str)] = &[("sbml", "sedml")];
const NEUROML_SEDML: &[(&str, &str)] = &[("nml", "sedml"), ("lems", "sedml")];
const SBMLQUAL_SEDML: &[(&str, &str)] = &[("sbmlqual", "sedml")];

const fn engine(
    id: &'static str,
    name: &'static str,
    formats: &'static [(&'static str, &'static str)],
    url: &'static str,
) -> Engine {
    Engine { id, name, formats, url, status: "" }
}

/// All known engines, in report order
pub const ENGINES: &[Engine] = &[
    engine("amici", "AMICI", SBML_SEDML, "https://docs.biosimulators.org/Biosimulators_AMICI/"),
    engine("brian2", "Brian 2", NEUROML_SEDML, "https://docs.biosimulators.org/Biosimulators_pyNeuroML/"),
    engine("bionetgen", "BioNetGen", &[("bngl", "sedml")], "https://docs.biosimulators.org/Biosimulators_BioNetGen/"),
    engine("boolnet", "BoolNet", SBMLQUAL_SEDML, "https://docs.biosimulators.org/Biosimulators_BoolNet/"),
    engine("cbmpy", "CBMPy", SBML_SEDML, "https://docs.biosimulators.org/Biosimulators_CBMPy/"),
    Engine {
        id: "cobrapy",
        name: "COBRApy",
        formats: SBML_SEDML,
        url: "https://docs.biosimulators.org/Biosimulators_COBRApy/",
        status: "Only allows steady state simulations",
    },
    engine("copasi", "COPASI", SBML_SEDML, "https://docs.biosimulators.org/Biosimulators_COPASI/"),
    engine("gillespy2", "GillesPy2", SBML_SEDML, "https://docs.biosimulators.org/Biosimulators_GillesPy2/"),
    engine("ginsim", "GINsim", SBMLQUAL_SEDML, "https://docs.biosimulators.org/Biosimulators_GINsim/"),
    engine("libsbmlsim", "LibSBMLSim", SBML_SEDML, "https://docs.biosimulators.org/Biosimulators_LibSBMLSim/"),
    engine("masspy", "MASSpy", SBML_SEDML, "https://docs.biosimulators.org/Biosimulators_MASSpy/"),
    engine("netpyne", "NetPyNE", NEUROML_SEDML, "https://docs.biosimulators.org/Biosimulators_pyNeuroML/"),
    engine("neuron", "NEURON", NEUROML_SEDML, "https://docs.biosimulators.org/Biosimulators_pyNeuroML/"),
    engine("opencor", "OpenCOR", &[("cellml", "sedml")], "https://docs.biosimulators.org/Biosimulators_OpenCOR/"),
    engine("pyneuroml", "pyNeuroML", NEUROML_SEDML, "https://docs.biosimulators.org/Biosimulators_pyNeuroML/"),
    engine("pysces", "PySCeS", SBML_SEDML, "https://docs.biosimulators.org/Biosimulators_PySCeS/"),
    engine("rbapy", "RBApy", &[("rbapy", "sedml")], "https://docs.biosimulators.org/Biosimulators_RBApy/"),
    engine(
        "smoldyn",
        "Smoldyn",
        &[("smoldyn", "sedml")],
        "https://smoldyn.readthedocs.io/en/latest/python/api.html#sed-ml-combine-biosimulators-api",
    ),
    engine("tellurium", "Tellurium", SBML_SEDML, "https://docs.biosimulators.org/Biosimulators_tellurium/"),
    engine("vcell", "VCell", &[("sbml", "sedml"), ("bngl", "sedml")], "https://github.com/virtualcell/vcell"),
    engine("xpp", "XPP", &[("xpp", "sedml")], "https://docs.biosimulators.org/Biosimulators_XPP/"),
];

/// File extension -> file type name
pub const FILE_TYPES: &[(&str, &str)] = &[
    ("sbml", "SBML"),
    ("sedml", "SED-ML"),
    ("nml", "NeuroML"),
    ("lems", "LEMS"),
    ("sbmlqual", "SBML-qual"),
    ("bngl", "BNGL"),
    ("rbapy", "RBApy"),
    ("xpp", "XPP"),
    ("smoldyn", "Smoldyn"),
    ("cellml", "CellML"),
    ("xml", "XML"),
];

lazy_static! {
    static ref ENGINE_INDEX: HashMap<&'static str, &'static Engine> = ENGINES.iter().map(|e| (e.id, e)).collect();
}

/// Look up an engine by id
pub fn get_engine(id: &str) -> Option<&'static Engine> {
    ENGINE_INDEX.get(id).copied()
}

/// Ids of all engines, in report order
pub fn engine_ids() -> impl Iterator<Item = &'static str> {
    ENGINES.iter().map(|e| e.id)
}

/// File type name for an extension; unknown extensions are shown as-is
pub fn file_type_name(ext: &str) -> &str {
    FILE_TYPES.iter().find(|(e, _)| *e == ext).map(|(_, name)| *name).unwrap_or(ext)
}

/// Extensions (without the dot) of a model and experiment file
pub fn get_filetypes(model: &str, experiment: &str) -> (String, String) {
    let ext = |p: &str| Path::new(p).extension().map(|e| e.to_string_lossy().into_owned()).unwrap_or_default();
    (ext(model), ext(experiment))
}

/// Engines whose preferred format pair has no SBML model
pub fn sbml_incompatible(engine: &Engine) -> bool {
    engine.formats.first().is_none_or(|(model, experiment)| *model != "sbml" && *experiment != "sbml")
}

/// Outcome of a file name based compatibility guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Pass,
    Fail,
    Unsure,
}

/// Join names as `A`, `A and B`, `A, B and C`
fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// File type names an engine accepts, without duplicates
fn compatible_types(engine: &Engine) -> Vec<&'static str> {
    let mut names = Vec::new();
    for (model, experiment) in engine.formats {
        for ext in [model, experiment] {
            if let Some((_, name)) = FILE_TYPES.iter().find(|(e, _)| e == ext)
                && !names.contains(name)
            {
                names.push(*name);
            }
        }
    }
    names
}

/// Guess from the file names whether `engine` can run this model/experiment pair.
///
/// Only `.sbml`/`.sedml` extensions, and `.xml` files with `sbml`/`sedml` in
/// their names, are recognized; anything else is [`Compatibility::Unsure`].
pub fn check_file_compatibility(engine: &Engine, model: &str, experiment: &str) -> (Compatibility, String) {
    let (model_ext, experiment_ext) = get_filetypes(model, experiment);
    let extensions = format!("('{}', '{}')", model_ext, experiment_ext);
    let supports = |m: &str, e: &str| engine.formats.iter().any(|(fm, fe)| *fm == m && *fe == e);
    let accepted = format!("{} are compatible with {}.", join_names(&compatible_types(engine)), engine.name);
    let input_types = join_names(&[file_type_name(&model_ext), file_type_name(&experiment_ext)]);

    debug!("compatibility check for {}: {}", engine.id, extensions);

    if model_ext == "sbml" && experiment_ext == "sedml" && !supports("sbml", "sedml") {
        return (
            Compatibility::Fail,
            format!(
                "The file extensions {} suggest the input file types are {} which is not compatible with {}.<br><br>{}",
                extensions, input_types, engine.name, accepted
            ),
        );
    }

    if supports(&model_ext, &experiment_ext) {
        return (
            Compatibility::Pass,
            format!("The file extensions {} suggest the input file types are {}.<br><br> {}", extensions, input_types, accepted),
        );
    }

    let unsure = (
        Compatibility::Unsure,
        format!(
            "The file extensions {} suggest the input file types may not be compatible with {}.<br><br>{}",
            extensions, engine.name, accepted
        ),
    );

    if model_ext != "xml" && experiment_ext != "xml" {
        return unsure;
    }

    let looks_like_pair =
        model.contains("sbml") && !model.contains("sedml") && experiment.contains("sbml") && experiment.contains("sedml");
    if !looks_like_pair {
        return unsure;
    }

    let inferred = join_names(&[file_type_name("sbml"), file_type_name("sedml")]);
    if supports("sbml", "sedml") {
        (
            Compatibility::Pass,
            format!(
                "The filenames '{}' and '{}' suggest the input files are {} which is compatible with {}.<br><br>{}",
                model, experiment, inferred, engine.name, accepted
            ),
        )
    } else {
        (
            Compatibility::Fail,
            format!(
                "The filenames '{}' and '{}' suggest the input files are {} which is not compatible with {}.<br><br>{}",
                model, experiment, inferred, engine.name, accepted
            ),
        )
    }
}

/// Message for an engine that cannot take SBML at all
pub fn expected_fail_message(engine: &Engine) -> String {
    let names: Vec<&str> = engine
        .formats
        .first()
        .map(|(m, e)| [*m, *e].iter().filter_map(|ext| FILE_TYPES.iter().find(|(x, _)| x == ext)).map(|(_, n)| *n).collect())
        .unwrap_or_default();
    format!("EXPECTED FAIL<br><br>Only {} are compatible with {}.", names.join(", "), engine.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_by_id(id: &str) -> &'static Engine {
        get_engine(id).unwrap()
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(ENGINES.len(), 21);
        assert_eq!(engine_by_id("tellurium").name, "Tellurium");
        assert_eq!(engine_by_id("cobrapy").status, "Only allows steady state simulations");
        assert!(get_engine("nope").is_none());
        assert_eq!(engine_ids().next(), Some("amici"));
    }

    #[test]
    fn test_get_filetypes() {
        assert_eq!(get_filetypes("dir/model.sbml", "sim.sedml"), ("sbml".to_string(), "sedml".to_string()));
        assert_eq!(get_filetypes("model", "sim.xml"), (String::new(), "xml".to_string()));
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&["SBML"]), "SBML");
        assert_eq!(join_names(&["SBML", "SED-ML"]), "SBML and SED-ML");
        assert_eq!(join_names(&["NeuroML", "SED-ML", "LEMS"]), "NeuroML, SED-ML and LEMS");
    }

    #[test]
    fn test_sbml_pair_passes_for_sbml_engine() {
        let (result, message) = check_file_compatibility(engine_by_id("copasi"), "model.sbml", "sim.sedml");
        assert_eq!(result, Compatibility::Pass);
        assert!(message.contains("SBML and SED-ML are compatible with COPASI."));
    }

    #[test]
    fn test_sbml_pair_fails_for_neuroml_engine() {
        let (result, message) = check_file_compatibility(engine_by_id("neuron"), "model.sbml", "sim.sedml");
        assert_eq!(result, Compatibility::Fail);
        assert!(message.contains("not compatible with NEURON"));
        assert!(message.contains("NeuroML, SED-ML and LEMS are compatible with NEURON."));
    }

    #[test]
    fn test_xml_names_are_inferred() {
        let engine = engine_by_id("tellurium");
        let (result, _) = check_file_compatibility(engine, "model_sbml.xml", "model_sbml.sedml.xml");
        assert_eq!(result, Compatibility::Pass);

        let (result, _) = check_file_compatibility(engine_by_id("xpp"), "model_sbml.xml", "model_sbml.sedml.xml");
        assert_eq!(result, Compatibility::Fail);

        let (result, _) = check_file_compatibility(engine, "model.xml", "experiment.xml");
        assert_eq!(result, Compatibility::Unsure);
    }

    #[test]
    fn test_unknown_extensions_are_unsure() {
        let (result, message) = check_file_compatibility(engine_by_id("amici"), "model.txt", "sim.json");
        assert_eq!(result, Compatibility::Unsure);
        assert!(message.contains("may not be compatible with AMICI"));
    }

    #[test]
    fn test_sbml_incompatible() {
        assert!(sbml_incompatible(engine_by_id("brian2")));
        assert!(sbml_incompatible(engine_by_id("boolnet")));
        assert!(!sbml_incompatible(engine_by_id("vcell")));
        assert!(!sbml_incompatible(engine_by_id("tellurium")));
    }

    #[test]
    fn test_expected_fail_message() {
        assert_eq!(
            expected_fail_message(engine_by_id("xpp")),
            "EXPECTED FAIL<br><br>Only XPP, SED-ML are compatible with XPP."
        );
    }
}
