use super::{DiagnosticsResult, ImportDiagnostic};
use crate::graph::{ImportEdge, ImportGraph};
use crate::project::{is_library_path, ImportRef, SemanticModel, SourceHandle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Specifiers of stylesheets, data files, images and fonts.
static ASSET_SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\.(css|scss|sass|less|styl|json|svg|png|jpe?g|gif|webp|avif|ico|bmp|woff2?|ttf|otf|eot)(\?.*)?$",
    )
    .expect("valid asset pattern")
});

pub fn is_asset_specifier(specifier: &str) -> bool {
    ASSET_SPECIFIER.is_match(specifier)
}

/// Walks the import graph of a file level by level and reports the first
/// level that contains broken imports.
pub struct DiagnosticsWalker<'m, M: SemanticModel> {
    model: &'m M,
}

impl<'m, M: SemanticModel> DiagnosticsWalker<'m, M> {
    pub fn new(model: &'m M) -> Self {
        Self { model }
    }

    pub fn diagnose(&self, file_path: &Path) -> DiagnosticsResult {
        let start = Instant::now();
        let shown = file_path.to_string_lossy().to_string();

        let results = match self.model.load(file_path) {
            Ok(file) => self.walk(file),
            Err(e) => {
                debug!("Cannot diagnose {}: {}", shown, e);
                vec![ImportDiagnostic::missing_file(&shown)]
            }
        };

        DiagnosticsResult {
            file_path: shown,
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn walk(&self, start: SourceHandle) -> Vec<ImportDiagnostic> {
        let mut graph = ImportGraph::new();
        graph.add_file(&start.path);

        let mut frontier = vec![start];
        let mut level = 0;
        while !frontier.is_empty() {
            let mut diagnostics = Vec::new();
            let mut next = Vec::new();

            for file in &frontier {
                for import in self.model.imports_of(file) {
                    if let Some(target) =
                        self.check_import(file, &import, &mut graph, &mut diagnostics)
                    {
                        next.push(target);
                    }
                }
            }

            if !diagnostics.is_empty() {
                info!(
                    "Found {} import problems at depth {} ({} files, {} imports visited)",
                    diagnostics.len(),
                    level,
                    graph.file_count(),
                    graph.import_count()
                );
                return diagnostics;
            }
            frontier = next;
            level += 1;
        }

        info!(
            "No import problems in {} files ({} imports)",
            graph.file_count(),
            graph.import_count()
        );
        Vec::new()
    }

    /// Validates one import statement and returns its target when the walk
    /// reaches it for the first time.
    fn check_import(
        &self,
        file: &SourceHandle,
        import: &ImportRef,
        graph: &mut ImportGraph,
        diagnostics: &mut Vec<ImportDiagnostic>,
    ) -> Option<SourceHandle> {
        if is_asset_specifier(&import.specifier) {
            return None;
        }
        let importer = file.display_path();

        let Some(resolved) = &import.resolved else {
            diagnostics.push(ImportDiagnostic::unresolved_import(
                &importer,
                import.line,
                &import.statement_text,
            ));
            return None;
        };
        if is_library_path(resolved) {
            return None;
        }
        let target = match self.model.load(resolved) {
            Ok(target) => target,
            Err(e) => {
                debug!("Cannot load import target {}: {}", resolved.display(), e);
                diagnostics.push(ImportDiagnostic::unresolved_import(
                    &importer,
                    import.line,
                    &import.statement_text,
                ));
                return None;
            }
        };

        let edge = ImportEdge {
            line: import.line,
            specifier: import.specifier.clone(),
        };
        let discovered = graph.add_import(&file.path, &target.path, edge);
        if !discovered {
            debug!(
                "{} already visited (imported by {} files)",
                target.path.display(),
                graph.importers_of(&target.path).len()
            );
        }

        let exports = self.model.exported_names(&target);
        let target_display = target.display_path();
        if let Some(default) = &import.default_import {
            if !exports.contains("default") {
                diagnostics.push(ImportDiagnostic::missing_default_export(
                    &importer,
                    default.line,
                    &default.name,
                    &target_display,
                ));
            }
        }
        for named in &import.named_imports {
            if !exports.contains(&named.name) {
                diagnostics.push(ImportDiagnostic::missing_named_export(
                    &importer,
                    named.line,
                    &named.name,
                    &target_display,
                ));
            }
        }

        discovered.then_some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::diagnostics::DiagnosticKind;
    use crate::project::Project;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        fs::canonicalize(path).unwrap()
    }

    fn kinds(result: &DiagnosticsResult) -> Vec<(DiagnosticKind, Option<usize>)> {
        result
            .results
            .iter()
            .map(|d| (d.kind, d.location.line))
            .collect()
    }

    #[test]
    fn test_asset_specifiers() {
        assert!(is_asset_specifier("./styles.css"));
        assert!(is_asset_specifier("./Theme.module.SCSS"));
        assert!(is_asset_specifier("../data/config.json"));
        assert!(is_asset_specifier("./logo.svg?react"));
        assert!(is_asset_specifier("./font.woff2"));
        assert!(!is_asset_specifier("./jsonParser"));
        assert!(!is_asset_specifier("./utils"));
    }

    #[test]
    fn test_missing_default_and_named_exports() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let b = write(root, "b.ts", "export const one = 1;\n");
        let a = write(
            root,
            "a.ts",
            "import B from './b';\nimport {\n  one,\n  two,\n} from './b';\n",
        );
        let project = Project::new(ProjectConfig::with_root(root));

        let result = DiagnosticsWalker::new(&project).diagnose(&a);
        assert_eq!(
            kinds(&result),
            vec![
                (DiagnosticKind::MissingDefaultExport, Some(1)),
                (DiagnosticKind::MissingNamedExport, Some(4)),
            ]
        );
        assert_eq!(
            result.results[0].message,
            format!("Default export 'B' not found in '{}'", b.display())
        );
        assert_eq!(result.results[0].location.file_path, a.to_string_lossy());
    }

    #[test]
    fn test_assets_and_libraries_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(
            root,
            "node_modules/lib/package.json",
            r#"{ "name": "lib", "main": "index.js" }"#,
        );
        write(root, "node_modules/lib/index.js", "module.exports = {};\n");
        let a = write(
            root,
            "a.ts",
            "import './missing.css';\nimport data from './data.json';\nimport { nothing } from 'lib';\n",
        );
        let project = Project::new(ProjectConfig::with_root(root));

        let result = DiagnosticsWalker::new(&project).diagnose(&a);
        assert!(result.results.is_empty(), "{:?}", result.results);
    }

    #[test]
    fn test_unresolved_import_reports_statement() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let a = write(root, "a.ts", "const x = 1;\nimport { y } from './nowhere';\n");
        let project = Project::new(ProjectConfig::with_root(root));

        let result = DiagnosticsWalker::new(&project).diagnose(&a);
        assert_eq!(kinds(&result), vec![(DiagnosticKind::UnresolvedImport, Some(2))]);
        assert_eq!(
            result.results[0].message,
            "Import could not be resolved: 'import { y } from './nowhere';'"
        );
    }

    #[test]
    fn test_reexports_are_checked() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "impl.ts", "export const real = 1;\n");
        let barrel = write(root, "barrel.ts", "export { real, fake } from './impl';\n");
        let project = Project::new(ProjectConfig::with_root(root));

        let result = DiagnosticsWalker::new(&project).diagnose(&barrel);
        assert_eq!(kinds(&result), vec![(DiagnosticKind::MissingNamedExport, Some(1))]);
        assert!(result.results[0].message.starts_with("Named export 'fake'"));
    }

    #[test]
    fn test_cycles_terminate() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "b.ts", "import { a } from './a';\nexport const b = a;\n");
        let a = write(root, "a.ts", "import { b } from './b';\nexport const a = 1;\nexport { b };\n");
        let project = Project::new(ProjectConfig::with_root(root));

        let result = DiagnosticsWalker::new(&project).diagnose(&a);
        assert!(result.results.is_empty());
        assert_eq!(project.loaded_file_count(), 2);
    }
}
