//! Input discovery: the schema and rule-set files of one folder.

use std::path::{Path, PathBuf};

use log::debug;

use crate::diagnostic::Diagnostic;
use crate::schema::is_identifier;
use crate::span::Span;

pub const SCHEMA_EXTENSION: &str = "sea";
pub const RULES_EXTENSION: &str = "rules";

/// One rule-set file. `name` is the file stem and names its dispatchers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSetFile {
    pub name: String,
    pub path: PathBuf,
}

/// The input files of a folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inputs {
    pub schema: PathBuf,
    /// Sorted by name.
    pub rule_sets: Vec<RuleSetFile>,
}

impl Inputs {
    /// Scan `dir` for exactly one `*.sea` file and any number of `*.rules`
    /// files. Other files are ignored.
    pub fn discover(dir: &Path) -> Result<Inputs, Diagnostic> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            Diagnostic::error(
                format!("cannot read folder '{}': {}", dir.display(), e),
                Span::dummy(),
            )
        })?;

        let mut schemas = Vec::new();
        let mut rule_sets = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    Diagnostic::error(
                        format!("cannot read folder '{}': {}", dir.display(), e),
                        Span::dummy(),
                    )
                })?
                .path();
            if !path.is_file() {
                continue;
            }
            match path.extension().and_then(|e| e.to_str()) {
                Some(SCHEMA_EXTENSION) => schemas.push(path),
                Some(RULES_EXTENSION) => rule_sets.push(rule_set_file(path)?),
                _ => debug!("skipping {}", path.display()),
            }
        }

        schemas.sort();
        let schema = match schemas.len() {
            0 => {
                return Err(Diagnostic::error(
                    format!("no `.{}` schema file in '{}'", SCHEMA_EXTENSION, dir.display()),
                    Span::dummy(),
                )
                .with_help("the folder must hold exactly one node schema".to_string()))
            }
            1 => schemas.remove(0),
            _ => {
                let names: Vec<String> = schemas
                    .iter()
                    .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
                    .collect();
                return Err(Diagnostic::error(
                    format!(
                        "more than one `.{}` schema file in '{}': {}",
                        SCHEMA_EXTENSION,
                        dir.display(),
                        names.join(", ")
                    ),
                    Span::dummy(),
                ));
            }
        };

        rule_sets.sort_by(|a: &RuleSetFile, b| a.name.cmp(&b.name));
        debug!(
            "schema {}, {} rule-sets",
            schema.display(),
            rule_sets.len()
        );
        Ok(Inputs { schema, rule_sets })
    }
}

fn rule_set_file(path: PathBuf) -> Result<RuleSetFile, Diagnostic> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    if !is_identifier(&stem) {
        return Err(Diagnostic::error(
            format!(
                "rule-set file name '{}' is not a valid identifier",
                path.file_name().unwrap_or_default().to_string_lossy()
            ),
            Span::dummy(),
        )
        .with_help("the file stem names the generated functions: use [A-Za-z_][A-Za-z0-9_]*".to_string()));
    }
    Ok(RuleSetFile { name: stem, path })
}
