pub mod resolve;
pub mod source;

pub use resolve::{is_library_path, ModuleResolver, LIBRARY_DIR};
pub use source::SourceFile;

use crate::config::ProjectConfig;
use crate::parser::typescript::{self, Binding, DefinitionKind, ImportedName};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;
use tree_sitter::Node;

/// Re-export chains longer than this are treated as unresolvable.
const MAX_REEXPORT_DEPTH: usize = 16;

pub type SourceHandle = Rc<SourceFile>;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unsupported source file: {}", .0.display())]
    Unsupported(PathBuf),
    #[error("failed to parse {}", .0.display())]
    Parse(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub name: String,
    pub line: usize,
}

/// One import (or `export ... from`) statement of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    pub specifier: String,
    pub resolved: Option<PathBuf>,
    pub default_import: Option<ImportBinding>,
    pub namespace_import: Option<String>,
    pub named_imports: Vec<ImportBinding>,
    pub line: usize,
    pub statement_text: String,
    pub is_reexport: bool,
}

/// Where an identifier is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub path: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
    pub kind: DefinitionKind,
    pub text: String,
}

impl Definition {
    fn from_node(file: &SourceFile, node: Node<'_>, kind: DefinitionKind) -> Self {
        let (start_line, end_line) = file.line_span(node);
        Self {
            path: file.path.clone(),
            start_line,
            end_line,
            kind,
            text: file.lines(start_line, end_line).to_string(),
        }
    }
}

/// The semantic capabilities navigation and diagnostics rely on.
pub trait SemanticModel {
    fn load(&self, path: &Path) -> Result<SourceHandle, LoadError>;
    fn resolve_module_specifier(&self, importer: &Path, specifier: &str) -> Option<PathBuf>;
    fn imports_of(&self, file: &SourceFile) -> Vec<ImportRef>;
    fn exported_names(&self, file: &SourceFile) -> BTreeSet<String>;
    fn definition_of(&self, file: &SourceFile, identifier: Node<'_>) -> Option<Definition>;
}

/// Files loaded on demand for one invocation.
pub struct Project {
    config: ProjectConfig,
    files: RefCell<HashMap<PathBuf, SourceHandle>>,
}

impl Project {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            files: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn loaded_file_count(&self) -> usize {
        self.files.borrow().len()
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    }

    fn definition_from_binding(
        &self,
        file: &SourceFile,
        binding: Binding<'_>,
        depth: usize,
    ) -> Option<Definition> {
        match binding {
            Binding::Local { node, kind } => Some(Definition::from_node(
                file,
                typescript::definition_node(node),
                kind,
            )),
            Binding::Import {
                statement,
                imported: ImportedName::Namespace,
                ..
            } => Some(Definition::from_node(
                file,
                statement,
                DefinitionKind::NamespaceImport,
            )),
            Binding::Import {
                specifier,
                imported,
                ..
            } => {
                let name = imported.export_name()?;
                self.follow_export(file, &specifier, name, depth)
            }
        }
    }

    fn follow_export(
        &self,
        importer: &SourceFile,
        specifier: &str,
        name: &str,
        depth: usize,
    ) -> Option<Definition> {
        if depth >= MAX_REEXPORT_DEPTH {
            debug!("Giving up on '{}' after {} re-exports", name, depth);
            return None;
        }
        let target = self.resolve_module_specifier(&importer.path, specifier)?;
        let target = self.load(&target).ok()?;
        self.export_definition(&target, name, depth + 1)
    }

    fn export_definition(&self, file: &SourceFile, name: &str, depth: usize) -> Option<Definition> {
        if let Some(binding) = typescript::find_export(file.root(), name, &file.text) {
            return self.definition_from_binding(file, binding, depth);
        }
        if name == "default" {
            return None;
        }
        typescript::star_reexport_sources(file.root(), &file.text)
            .iter()
            .find_map(|specifier| self.follow_export(file, specifier, name, depth))
    }

    fn collect_exports(
        &self,
        file: &SourceFile,
        names: &mut BTreeSet<String>,
        seen: &mut HashSet<PathBuf>,
    ) {
        if !seen.insert(file.path.clone()) {
            return;
        }
        names.extend(typescript::direct_export_names(file.root(), &file.text));

        for specifier in typescript::star_reexport_sources(file.root(), &file.text) {
            let Some(target) = self
                .resolve_module_specifier(&file.path, &specifier)
                .and_then(|path| self.load(&path).ok())
            else {
                continue;
            };
            let mut starred = BTreeSet::new();
            self.collect_exports(&target, &mut starred, seen);
            starred.remove("default");
            names.extend(starred);
        }
    }
}

impl SemanticModel for Project {
    fn load(&self, path: &Path) -> Result<SourceHandle, LoadError> {
        let absolute = self.absolute(path);
        let canonical =
            fs::canonicalize(&absolute).map_err(|_| LoadError::NotFound(absolute.clone()))?;
        if let Some(file) = self.files.borrow().get(&canonical) {
            return Ok(Rc::clone(file));
        }

        let text = fs::read_to_string(&canonical).map_err(|e| {
            debug!("Failed to read {}: {}", canonical.display(), e);
            LoadError::NotFound(canonical.clone())
        })?;
        let file = Rc::new(SourceFile::parse(canonical.clone(), text)?);
        debug!("Loaded {}", canonical.display());
        self.files.borrow_mut().insert(canonical, Rc::clone(&file));
        Ok(file)
    }

    fn resolve_module_specifier(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        ModuleResolver::new(&self.config).resolve(importer, specifier)
    }

    fn imports_of(&self, file: &SourceFile) -> Vec<ImportRef> {
        let source = file.text.as_str();
        let binding = |node: Node<'_>| ImportBinding {
            name: typescript::node_text(node, source).to_string(),
            line: file.line_span(node).0,
        };

        typescript::import_declarations(file.root(), source)
            .into_iter()
            .map(|decl| {
                let mut default_import = decl.default.map(binding);
                let mut named_imports = Vec::new();
                for spec in &decl.named {
                    let line = file.line_span(spec.line_node).0;
                    if spec.imported == "default" {
                        default_import.get_or_insert(ImportBinding {
                            name: typescript::node_text(spec.local, source).to_string(),
                            line,
                        });
                    } else {
                        named_imports.push(ImportBinding {
                            name: spec.imported.clone(),
                            line,
                        });
                    }
                }

                ImportRef {
                    resolved: self.resolve_module_specifier(&file.path, &decl.specifier),
                    default_import,
                    namespace_import: decl
                        .namespace
                        .map(|node| typescript::node_text(node, source).to_string()),
                    named_imports,
                    line: file.line_span(decl.statement).0,
                    statement_text: typescript::node_text(decl.statement, source).to_string(),
                    is_reexport: decl.is_reexport,
                    specifier: decl.specifier,
                }
            })
            .collect()
    }

    fn exported_names(&self, file: &SourceFile) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_exports(file, &mut names, &mut HashSet::new());
        names
    }

    fn definition_of(&self, file: &SourceFile, identifier: Node<'_>) -> Option<Definition> {
        if let Some((qualifier, member)) = typescript::namespace_member(identifier, &file.text) {
            return match typescript::find_binding(qualifier, &file.text)? {
                Binding::Import {
                    specifier,
                    imported: ImportedName::Namespace,
                    ..
                } => self.follow_export(file, &specifier, member, 0),
                _ => None,
            };
        }
        let binding = typescript::find_binding(identifier, &file.text)?;
        self.definition_from_binding(file, binding, 0)
    }
}
