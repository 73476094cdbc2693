use crate::parser::{parse_source, SourceLanguage};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};

use super::LoadError;

/// A parsed file held by the project.
pub struct SourceFile {
    pub path: PathBuf,
    pub language: SourceLanguage,
    pub text: String,
    pub tree: Tree,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn parse(path: PathBuf, text: String) -> Result<Self, LoadError> {
        let language =
            SourceLanguage::from_path(&path).ok_or_else(|| LoadError::Unsupported(path.clone()))?;
        let tree = parse_source(language, &text).map_err(|_| LoadError::Parse(path.clone()))?;
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();

        Ok(Self {
            path,
            language,
            text,
            tree,
            line_starts,
        })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    pub fn is_path(&self, path: &Path) -> bool {
        self.path == path
    }

    /// Number of `\n`-separated lines, counting a trailing empty line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line holding the byte at `offset`.
    pub fn line_of_byte(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset)
    }

    /// 1-based byte offset of the first character of `line`.
    pub fn byte_of_line(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|index| self.line_starts.get(index))
            .copied()
    }

    /// First and last line a node covers.
    pub fn line_span(&self, node: Node<'_>) -> (usize, usize) {
        let last_byte = node.end_byte().saturating_sub(1).max(node.start_byte());
        (
            self.line_of_byte(node.start_byte()),
            self.line_of_byte(last_byte),
        )
    }

    /// Lines `from..=to` joined with `\n`, with `to` clamped to the last line.
    pub fn lines(&self, from: usize, to: usize) -> &str {
        let to = to.min(self.line_count());
        let Some(start) = self.byte_of_line(from).filter(|_| from <= to) else {
            return "";
        };
        let end = self
            .byte_of_line(to + 1)
            .map_or(self.text.len(), |next| next - 1);
        &self.text[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(text: &str) -> SourceFile {
        SourceFile::parse(PathBuf::from("/project/src/a.ts"), text.to_string()).unwrap()
    }

    #[test]
    fn test_line_conversion() {
        let file = source("const a = 1;\nconst b = 2;\n\nexport { a, b };\n");
        assert_eq!(file.line_count(), 5);
        assert_eq!(file.line_of_byte(0), 1);
        assert_eq!(file.line_of_byte(12), 1);
        assert_eq!(file.line_of_byte(13), 2);
        assert_eq!(file.byte_of_line(2), Some(13));
        assert_eq!(file.byte_of_line(0), None);
        assert_eq!(file.byte_of_line(9), None);
    }

    #[test]
    fn test_lines_are_clamped() {
        let file = source("one\ntwo\nthree");
        assert_eq!(file.lines(1, 1), "one");
        assert_eq!(file.lines(2, 3), "two\nthree");
        assert_eq!(file.lines(2, 99), "two\nthree");
        assert_eq!(file.lines(4, 5), "");
    }

    #[test]
    fn test_line_span_of_statement() {
        let file = source("function f() {\n  return 1;\n}\n");
        let function = file.root().named_child(0).unwrap();
        assert_eq!(file.line_span(function), (1, 3));
    }

    #[test]
    fn test_rejects_unsupported_files() {
        let result = SourceFile::parse(PathBuf::from("styles.css"), String::new());
        assert!(matches!(result, Err(LoadError::Unsupported(_))));
    }
}
