use super::{merge, Peek, PeekConfig, PeekError, PeekResult, SourceLocation};
use crate::parser::typescript::{self, DefinitionKind};
use crate::project::{is_library_path, Definition, SemanticModel, SourceFile};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Definitions already turned into peeks, by name and by location.
#[derive(Default)]
struct SeenDefinitions {
    names: HashSet<String>,
    locations: HashSet<(PathBuf, usize, usize)>,
}

impl SeenDefinitions {
    /// True the first time a name resolves into a file and the first time a
    /// location is reached. Several declarators of one statement share a
    /// location, so both must be fresh.
    fn first_sighting(&mut self, name: &str, definition: &Definition) -> bool {
        let name_is_new = self
            .names
            .insert(format!("{}@{}", name, definition.path.display()));
        let location_is_new = self.locations.insert((
            definition.path.clone(),
            definition.start_line,
            definition.end_line,
        ));
        name_is_new && location_is_new
    }
}

/// Resolves the identifiers of a line range to the code that defines them.
pub struct PeekResolver<'m, M: SemanticModel> {
    model: &'m M,
}

impl<'m, M: SemanticModel> PeekResolver<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    pub fn peek(
        &self,
        file_path: &Path,
        from_line: usize,
        to_line: usize,
    ) -> Result<PeekResult, PeekError> {
        let file = self
            .model
            .load(file_path)
            .map_err(|source| PeekError::NotFound {
                path: file_path.to_path_buf(),
                source,
            })?;

        let line_count = file.line_count();
        if from_line == 0 || from_line > to_line || from_line > line_count {
            return Err(PeekError::InvalidRange {
                path: file.path.clone(),
                from: from_line,
                to: to_line,
                line_count,
            });
        }

        let end_line = to_line.min(line_count);
        let peeks = self.collect_peeks(&file, from_line, to_line);
        info!(
            "Found {} peeks for {}:{}-{}",
            peeks.len(),
            file.path.display(),
            from_line,
            end_line
        );

        Ok(merge::merge_result(PeekResult {
            snippet: file.lines(from_line, end_line).to_string(),
            location: SourceLocation::new(file.display_path(), from_line, end_line),
            peeks,
            config: PeekConfig::default(),
        }))
    }

    /// Walks the tree in document order, skipping subtrees outside the range.
    fn collect_peeks(&self, file: &SourceFile, from_line: usize, to_line: usize) -> Vec<Peek> {
        let mut peeks = Vec::new();
        let mut seen = SeenDefinitions::default();
        let mut cursor = file.root().walk();

        loop {
            let node = cursor.node();
            let (start, end) = file.line_span(node);
            let outside = start > to_line || end < from_line;

            if !outside
                && start >= from_line
                && end <= to_line
                && typescript::is_reference_identifier(node)
            {
                if let Some(peek) = self.peek_identifier(file, node, from_line, to_line, &mut seen) {
                    peeks.push(peek);
                }
            }

            if !outside && cursor.goto_first_child() {
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return peeks;
                }
            }
        }
    }

    fn peek_identifier(
        &self,
        file: &SourceFile,
        identifier: tree_sitter::Node<'_>,
        from_line: usize,
        to_line: usize,
        seen: &mut SeenDefinitions,
    ) -> Option<Peek> {
        let name = typescript::node_text(identifier, &file.text);
        let definition = self.model.definition_of(file, identifier)?;
        if !self.is_peekable(file, &definition, from_line, to_line) {
            debug!(
                "Skipping '{}' defined at {}:{}",
                name,
                definition.path.display(),
                definition.start_line
            );
            return None;
        }

        if !seen.first_sighting(name, &definition) {
            return None;
        }
        Some(Peek::from_definition(
            typescript::full_text(identifier, &file.text),
            &definition,
        ))
    }

    fn is_peekable(
        &self,
        file: &SourceFile,
        definition: &Definition,
        from_line: usize,
        to_line: usize,
    ) -> bool {
        if definition.kind == DefinitionKind::NamespaceImport || is_library_path(&definition.path) {
            return false;
        }
        let already_visible = file.is_path(&definition.path)
            && definition.start_line >= from_line
            && definition.end_line <= to_line;
        !already_visible
    }
}
