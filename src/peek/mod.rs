pub mod merge;
pub mod resolver;

pub use resolver::PeekResolver;

use crate::project::{Definition, LoadError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Longest definition snippet shown in a peek.
pub const MAX_VISIBLE_LINES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        Self {
            file_path: file_path.into(),
            start_line,
            end_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peek {
    pub definition_kind: String,
    pub reference_text: String,
    pub snippet: String,
    pub location: SourceLocation,
}

impl Peek {
    /// Builds a peek for a resolved definition, truncating long definitions
    /// to [`MAX_VISIBLE_LINES`].
    pub fn from_definition(reference_text: &str, definition: &Definition) -> Self {
        let lines: Vec<&str> = definition.text.split('\n').collect();
        let (snippet, end_line) = if lines.len() > MAX_VISIBLE_LINES {
            (
                lines[..MAX_VISIBLE_LINES].join("\n"),
                definition.start_line + MAX_VISIBLE_LINES,
            )
        } else {
            (definition.text.clone(), definition.end_line)
        };

        Self {
            definition_kind: definition.kind.as_str().to_string(),
            reference_text: reference_text.to_string(),
            snippet,
            location: SourceLocation::new(
                definition.path.to_string_lossy(),
                definition.start_line,
                end_line,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeekConfig {
    pub max_visible_lines_in_peek: usize,
}

impl Default for PeekConfig {
    fn default() -> Self {
        Self {
            max_visible_lines_in_peek: MAX_VISIBLE_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeekResult {
    pub snippet: String,
    pub location: SourceLocation,
    pub peeks: Vec<Peek>,
    pub config: PeekConfig,
}

#[derive(Debug, Error)]
pub enum PeekError {
    #[error("cannot peek into {}: {source}", path.display())]
    NotFound { path: PathBuf, source: LoadError },
    #[error("invalid line range {from}-{to} for {} ({line_count} lines)", path.display())]
    InvalidRange {
        path: PathBuf,
        from: usize,
        to: usize,
        line_count: usize,
    },
}
