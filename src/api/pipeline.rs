//! In-memory inputs of one generation run.

use std::path::Path;

use log::debug;

use crate::config::Inputs;
use crate::diagnostic::Diagnostic;
use crate::source::{SourceFile, Sources};
use crate::span::Span;

/// A rule-set registered in a [`Project`].
#[derive(Clone, Debug)]
pub(crate) struct RuleSetSource {
    pub name: String,
    pub file_id: u16,
}

/// Schema plus rule-sets, all read into one [`Sources`] registry so every
/// diagnostic can be located afterwards.
#[derive(Clone, Debug)]
pub struct Project {
    sources: Sources,
    schema: u16,
    rule_sets: Vec<RuleSetSource>,
}

impl Project {
    pub fn new(schema: SourceFile) -> Self {
        let mut sources = Sources::new();
        let schema = sources.add(schema);
        Self {
            sources,
            schema,
            rule_sets: Vec::new(),
        }
    }

    /// Register a rule-set under `name`. Rule-sets are generated in the
    /// order they are added.
    pub fn add_rule_set(&mut self, name: impl Into<String>, file: SourceFile) {
        let file_id = self.sources.add(file);
        self.rule_sets.push(RuleSetSource {
            name: name.into(),
            file_id,
        });
    }

    /// Read every discovered file.
    pub fn load(inputs: &Inputs) -> Result<Self, Diagnostic> {
        let mut project = Project::new(read_file(&inputs.schema)?);
        for rules in &inputs.rule_sets {
            project.add_rule_set(rules.name.clone(), read_file(&rules.path)?);
        }
        debug!("loaded {} files", project.rule_sets.len() + 1);
        Ok(project)
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub(crate) fn schema_file(&self) -> (u16, &SourceFile) {
        (self.schema, self.file(self.schema))
    }

    pub(crate) fn rule_sets(&self) -> impl Iterator<Item = (&str, u16, &SourceFile)> {
        self.rule_sets
            .iter()
            .map(|r| (r.name.as_str(), r.file_id, self.file(r.file_id)))
    }

    fn file(&self, id: u16) -> &SourceFile {
        &self.sources[id]
    }
}

fn read_file(path: &Path) -> Result<SourceFile, Diagnostic> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Diagnostic::error(
            format!("cannot read '{}': {}", path.display(), e),
            Span::dummy(),
        )
    })?;
    Ok(SourceFile::new(path.display().to_string(), text))
}
