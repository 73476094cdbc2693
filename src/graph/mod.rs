use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdge {
    pub line: usize,
    pub specifier: String,
}

/// Files reached by an import walk, keyed by resolved path.
pub struct ImportGraph {
    pub graph: DiGraph<PathBuf, ImportEdge>,
    pub file_index: HashMap<PathBuf, NodeIndex>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            file_index: HashMap::new(),
        }
    }

    /// Adds a file, returning its node and whether it was new.
    pub fn add_file(&mut self, path: &Path) -> (NodeIndex, bool) {
        if let Some(&node_idx) = self.file_index.get(path) {
            return (node_idx, false);
        }
        let node_idx = self.graph.add_node(path.to_path_buf());
        self.file_index.insert(path.to_path_buf(), node_idx);
        (node_idx, true)
    }

    /// Records `from` importing `to`. Returns `true` when `to` had not been
    /// seen before.
    pub fn add_import(&mut self, from: &Path, to: &Path, edge: ImportEdge) -> bool {
        let (from_idx, _) = self.add_file(from);
        let (to_idx, discovered) = self.add_file(to);
        self.graph.add_edge(from_idx, to_idx, edge);
        discovered
    }

    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn import_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn importers_of(&self, path: &Path) -> Vec<&Path> {
        let Some(&node_idx) = self.file_index.get(path) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(node_idx, petgraph::Direction::Incoming)
            .filter_map(|idx| self.graph.node_weight(idx))
            .map(PathBuf::as_path)
            .collect()
    }
}

impl Default for ImportGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(line: usize) -> ImportEdge {
        ImportEdge {
            line,
            specifier: "./x".to_string(),
        }
    }

    #[test]
    fn test_add_import_reports_new_files_once() {
        let mut graph = ImportGraph::new();
        let a = Path::new("/src/a.ts");
        let b = Path::new("/src/b.ts");
        let c = Path::new("/src/c.ts");

        graph.add_file(a);
        assert!(graph.add_import(a, b, edge(1)));
        assert!(graph.add_import(a, c, edge(2)));
        assert!(!graph.add_import(b, c, edge(1)));
        assert!(!graph.add_import(c, a, edge(1)));

        assert_eq!(graph.file_count(), 3);
        assert_eq!(graph.import_count(), 4);

        let mut importers = graph.importers_of(c);
        importers.sort();
        assert_eq!(importers, vec![a, b]);
    }
}
