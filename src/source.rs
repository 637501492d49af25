//! Source files held in memory for one generation run.
//!
//! Every span carries a `file_id` indexing into [`Sources`]; diagnostics use
//! it to recover the file name and a line/column position.

use crate::span::Span;

/// One input file: display name plus full text.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        line_col(&self.text, offset)
    }
}

/// 1-based (line, column) of a byte offset. Columns count characters.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = &text[..floor_char_boundary(text, offset)];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = before[line_start..].chars().count() + 1;
    (line, col)
}

fn floor_char_boundary(text: &str, mut offset: usize) -> usize {
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// All files of a run, addressed by `file_id`.
#[derive(Clone, Debug, Default)]
pub struct Sources {
    files: Vec<SourceFile>,
}

impl Sources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id.
    pub fn add(&mut self, file: SourceFile) -> u16 {
        self.files.push(file);
        (self.files.len() - 1) as u16
    }

    pub fn get(&self, file_id: u16) -> Option<&SourceFile> {
        self.files.get(file_id as usize)
    }

    /// `name:line:col` for the start of a span, if its file is known.
    pub fn locate(&self, span: Span) -> Option<(String, usize, usize)> {
        let file = self.get(span.file_id)?;
        let (line, col) = file.line_col(span.start as usize);
        Some((file.name.clone(), line, col))
    }
}

impl std::ops::Index<u16> for Sources {
    type Output = SourceFile;

    fn index(&self, file_id: u16) -> &SourceFile {
        &self.files[file_id as usize]
    }
}
