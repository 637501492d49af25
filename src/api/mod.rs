use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::info;

use crate::cnames::CNames;
use crate::diagnostic::Diagnostic;
use crate::dispatch::{self, DispatchCode};
use crate::emit::{emit, Output};
use crate::pattern::{compile_rule_set, RuleSet};
use crate::schema::{self, Schema};
use crate::span::Span;

mod pipeline;

pub use pipeline::Project;


/// Options controlling generation.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Prefix of every generated C identifier and of the output file names.
    pub prefix: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            prefix: "p9".to_string(),
        }
    }
}

impl GenerateOptions {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    /// The prefix must itself be a C identifier.
    pub fn validate(&self) -> Result<(), Diagnostic> {
        if schema::is_identifier(&self.prefix) {
            Ok(())
        } else {
            Err(Diagnostic::error(
                format!("prefix '{}' is not a valid C identifier", self.prefix),
                Span::dummy(),
            ))
        }
    }

    pub fn names(&self) -> CNames {
        CNames::new(&self.prefix)
    }
}

/// Run every stage over a loaded project.
///
/// Stops at the first failing stage. A schema may report several unknown
/// forms at once; every other fault is reported alone.
pub fn generate(project: &Project, options: &GenerateOptions) -> Result<Output, Vec<Diagnostic>> {
    options.validate().map_err(|e| vec![e])?;
    let names = options.names();

    let (schema_id, schema_file) = project.schema_file();
    let schema = schema::load(&schema_file.text, schema_id)?;
    info!(
        "{}: {} nodes, {} groups",
        schema_file.name,
        schema.nodes().len(),
        schema.groups().len()
    );

    let mut sets: Vec<(u16, RuleSet)> = Vec::new();
    for (name, file_id, file) in project.rule_sets() {
        let set = compile_rule_set(name, &file.text, file_id, &schema).map_err(|e| vec![e])?;
        sets.push((file_id, set));
    }
    check_identifiers(&schema, &sets, &names).map_err(|e| vec![e])?;

    let code = sets
        .iter()
        .map(|(_, set)| dispatch::generate(set, &schema, &names))
        .collect::<Result<Vec<DispatchCode>, _>>()
        .map_err(|e| vec![e])?;

    Ok(emit(&schema, &code, &names))
}

/// C identifiers declared by the generated files, with what declares each.
#[derive(Default)]
struct Identifiers {
    taken: HashMap<String, String>,
}

impl Identifiers {
    fn claim(&mut self, ident: String, owner: String, span: Span) -> Result<(), Diagnostic> {
        match self.taken.entry(ident) {
            Entry::Occupied(prev) => Err(Diagnostic::error(
                format!(
                    "generated name `{}` of {} clashes with {}",
                    prev.key(),
                    owner,
                    prev.get()
                ),
                span,
            )
            .with_help("rename the node or the rule-set file".to_string())),
            Entry::Vacant(slot) => {
                slot.insert(owner);
                Ok(())
            }
        }
    }
}

/// Node and rule-set names are pasted into C identifiers; reject any pair
/// that would declare the same one twice.
fn check_identifiers(
    schema: &Schema,
    sets: &[(u16, RuleSet)],
    names: &CNames,
) -> Result<(), Diagnostic> {
    let mut ids = Identifiers::default();
    ids.claim(names.node_type(), "the node record type".to_string(), Span::dummy())?;
    ids.claim(names.kind_type(), "the node kind type".to_string(), Span::dummy())?;
    ids.claim(names.extra_macro(), "the payload access macro".to_string(), Span::dummy())?;

    for node in schema.nodes() {
        ids.claim(
            names.kind(&node.name),
            format!("the kind of node `{}`", node.name),
            node.span,
        )?;
    }
    for (node, _) in schema.payload_nodes() {
        ids.claim(
            names.payload_struct(&node.name),
            format!("the payload struct of node `{}`", node.name),
            node.span,
        )?;
        ids.claim(
            names.payload_type(&node.name),
            format!("the payload type of node `{}`", node.name),
            node.span,
        )?;
    }

    for (file_id, set) in sets {
        let span = Span::at(*file_id, 0, 0);
        ids.claim(
            names.dispatcher(&set.name),
            format!("the dispatcher of rule-set `{}`", set.name),
            span,
        )?;
        for node in set.nodes() {
            let node = &schema.node(node).name;
            ids.claim(
                names.rule_fn(&set.name, node),
                format!("the `{}` rules of rule-set `{}`", node, set.name),
                span,
            )?;
        }
    }
    Ok(())
}

/// Write `<prefix>.h` and `<prefix>.c` into `dir`, returning both paths.
///
/// Both files are staged as `*.tmp` siblings and renamed into place only
/// once both were written, so a failed write keeps the previous pair.
pub fn write_output(
    output: &Output,
    dir: &Path,
    options: &GenerateOptions,
) -> Result<(PathBuf, PathBuf), Diagnostic> {
    let names = options.names();
    let header = dir.join(names.header_file());
    let source = dir.join(names.source_file());
    let files = [(&header, &output.header), (&source, &output.source)];
    let staged: Vec<PathBuf> = files.iter().map(|(path, _)| staging_path(path)).collect();

    let result = files
        .iter()
        .zip(&staged)
        .try_for_each(|((path, text), temp)| {
            std::fs::write(temp, text).map_err(|e| write_error(path, e))
        })
        .and_then(|()| {
            files.iter().zip(&staged).try_for_each(|((path, _), temp)| {
                std::fs::rename(temp, path).map_err(|e| write_error(path, e))
            })
        });
    if let Err(diag) = result {
        for temp in &staged {
            // Missing when the failure happened before it was written.
            let _ = std::fs::remove_file(temp);
        }
        return Err(diag);
    }

    info!("wrote {} and {}", header.display(), source.display());
    Ok((header, source))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_error(path: &Path, e: std::io::Error) -> Diagnostic {
    Diagnostic::error(
        format!("cannot write '{}': {}", path.display(), e),
        Span::dummy(),
    )
}
