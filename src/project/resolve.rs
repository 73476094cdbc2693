use crate::config::ProjectConfig;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Directory that marks third-party code.
pub const LIBRARY_DIR: &str = "node_modules";

const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "d.ts", "mts", "cts", "js", "jsx", "mjs", "cjs"];

const PACKAGE_ENTRY_FIELDS: &[&str] = &["types", "typings", "module", "main"];

pub fn is_library_path(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::Normal(name) if name == LIBRARY_DIR))
}

fn is_source_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Maps module specifiers to files the way `tsc` does with
/// `moduleResolution: "bundler"`.
pub struct ModuleResolver<'c> {
    config: &'c ProjectConfig,
}

impl<'c> ModuleResolver<'c> {
    pub fn new(config: &'c ProjectConfig) -> Self {
        Self { config }
    }

    pub fn resolve(&self, importer: &Path, specifier: &str) -> Option<PathBuf> {
        if specifier.is_empty() {
            return None;
        }
        let importer_dir = importer.parent().unwrap_or_else(|| Path::new("."));

        let resolved = if specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier == "."
            || specifier == ".."
        {
            self.resolve_path(&importer_dir.join(specifier))
        } else if Path::new(specifier).is_absolute() {
            self.resolve_path(Path::new(specifier))
        } else {
            self.resolve_alias(specifier)
                .or_else(|| {
                    self.config
                        .base_url
                        .as_ref()
                        .and_then(|base| self.resolve_path(&base.join(specifier)))
                })
                .or_else(|| self.resolve_package(importer_dir, specifier))
        };

        match &resolved {
            Some(path) => debug!("Resolved '{}' to {}", specifier, path.display()),
            None => debug!("Could not resolve '{}' from {}", specifier, importer.display()),
        }
        resolved.and_then(|path| fs::canonicalize(path).ok())
    }

    fn resolve_alias(&self, specifier: &str) -> Option<PathBuf> {
        self.config.paths.iter().find_map(|alias| {
            let captured = alias.capture(specifier)?;
            alias.targets.iter().find_map(|target| {
                let substituted = target.replacen('*', captured, 1);
                self.resolve_path(&self.config.paths_base.join(substituted))
            })
        })
    }

    fn resolve_path(&self, candidate: &Path) -> Option<PathBuf> {
        self.resolve_file(candidate)
            .or_else(|| self.resolve_directory(candidate))
    }

    fn resolve_file(&self, candidate: &Path) -> Option<PathBuf> {
        if is_source_file(candidate) {
            return Some(candidate.to_path_buf());
        }

        // `./util.js` in TypeScript sources refers to `./util.ts`
        let script_ext = candidate.extension().and_then(|ext| ext.to_str());
        let substitutes: &[&str] = match script_ext {
            Some("js") | Some("jsx") => &["ts", "tsx", "d.ts"],
            Some("mjs") => &["mts"],
            Some("cjs") => &["cts"],
            _ => &[],
        };
        let substituted = substitutes
            .iter()
            .map(|ext| candidate.with_extension(ext))
            .find(|path| path.is_file());
        if substituted.is_some() {
            return substituted;
        }

        SOURCE_EXTENSIONS
            .iter()
            .map(|ext| with_suffix(candidate, &format!(".{}", ext)))
            .find(|path| path.is_file())
    }

    fn resolve_directory(&self, dir: &Path) -> Option<PathBuf> {
        if !dir.is_dir() {
            return None;
        }

        let package_json = dir.join("package.json");
        if let Ok(content) = fs::read_to_string(&package_json) {
            if let Ok(manifest) = serde_json::from_str::<serde_json::Value>(&content) {
                let entry = PACKAGE_ENTRY_FIELDS
                    .iter()
                    .filter_map(|field| manifest.get(*field).and_then(|value| value.as_str()))
                    .find_map(|entry| {
                        let entry_path = dir.join(entry);
                        self.resolve_file(&entry_path).or_else(|| {
                            let index = entry_path.join("index");
                            entry_path
                                .is_dir()
                                .then(|| self.resolve_file(&index))
                                .flatten()
                        })
                    });
                if entry.is_some() {
                    return entry;
                }
            }
        }

        self.resolve_file(&dir.join("index"))
    }

    fn resolve_package(&self, importer_dir: &Path, specifier: &str) -> Option<PathBuf> {
        let (package, subpath) = split_package_specifier(specifier);
        let types_package = match package.strip_prefix('@') {
            Some(scoped) => format!("@types/{}", scoped.replacen('/', "__", 1)),
            None => format!("@types/{}", package),
        };

        for dir in importer_dir.ancestors() {
            let modules = dir.join(LIBRARY_DIR);
            if !modules.is_dir() {
                continue;
            }
            for name in [package, types_package.as_str()] {
                let mut candidate = modules.join(name);
                if let Some(subpath) = subpath {
                    candidate = candidate.join(subpath);
                }
                if let Some(found) = self.resolve_path(&candidate) {
                    return Some(found);
                }
            }
        }
        None
    }
}

/// Splits `@scope/pkg/sub/path` into the package name and the subpath.
fn split_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let package_segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut split_at = None;
    for (count, (index, _)) in specifier.match_indices('/').enumerate() {
        if count + 1 == package_segments {
            split_at = Some(index);
            break;
        }
    }
    match split_at {
        Some(index) => (&specifier[..index], Some(&specifier[index + 1..])),
        None => (specifier, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathAlias;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export {};\n").unwrap();
    }

    fn canonical(path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap()
    }

    #[test]
    fn test_split_package_specifier() {
        assert_eq!(split_package_specifier("react"), ("react", None));
        assert_eq!(
            split_package_specifier("react-dom/client"),
            ("react-dom", Some("client"))
        );
        assert_eq!(split_package_specifier("@scope/pkg"), ("@scope/pkg", None));
        assert_eq!(
            split_package_specifier("@scope/pkg/deep/file"),
            ("@scope/pkg", Some("deep/file"))
        );
    }

    #[test]
    fn test_library_path_detection() {
        assert!(is_library_path(Path::new("/app/node_modules/react/index.d.ts")));
        assert!(!is_library_path(Path::new("/app/src/node_modules_helper.ts")));
    }

    #[test]
    fn test_resolves_relative_specifiers() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("src/a.ts"));
        touch(&root.join("src/utils.ts"));
        touch(&root.join("src/components/index.tsx"));
        touch(&root.join("src/legacy.js"));

        let config = ProjectConfig::with_root(root);
        let resolver = ModuleResolver::new(&config);
        let importer = root.join("src/a.ts");

        assert_eq!(
            resolver.resolve(&importer, "./utils"),
            Some(canonical(&root.join("src/utils.ts")))
        );
        assert_eq!(
            resolver.resolve(&importer, "./utils.js"),
            Some(canonical(&root.join("src/utils.ts")))
        );
        assert_eq!(
            resolver.resolve(&importer, "./components"),
            Some(canonical(&root.join("src/components/index.tsx")))
        );
        assert_eq!(
            resolver.resolve(&importer, "./legacy.js"),
            Some(canonical(&root.join("src/legacy.js")))
        );
        assert_eq!(resolver.resolve(&importer, "./missing"), None);
    }

    #[test]
    fn test_resolves_path_aliases_and_packages() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("src/app/auth.ts"));
        touch(&root.join("node_modules/react/index.d.ts"));
        touch(&root.join("node_modules/@types/lodash/index.d.ts"));
        fs::create_dir_all(root.join("node_modules/zod/lib")).unwrap();
        fs::write(
            root.join("node_modules/zod/package.json"),
            r#"{ "types": "./lib/index.d.ts", "main": "./lib/index.js" }"#,
        )
        .unwrap();
        touch(&root.join("node_modules/zod/lib/index.d.ts"));

        let mut config = ProjectConfig::with_root(root);
        config.paths = vec![PathAlias {
            pattern: "@/*".to_string(),
            targets: vec!["./src/*".to_string()],
        }];
        let resolver = ModuleResolver::new(&config);
        let importer = root.join("src/pages/App.tsx");

        assert_eq!(
            resolver.resolve(&importer, "@/app/auth"),
            Some(canonical(&root.join("src/app/auth.ts")))
        );

        let react = resolver.resolve(&importer, "react").unwrap();
        assert!(is_library_path(&react));
        assert_eq!(
            resolver.resolve(&importer, "lodash"),
            Some(canonical(&root.join("node_modules/@types/lodash/index.d.ts")))
        );
        assert_eq!(
            resolver.resolve(&importer, "zod"),
            Some(canonical(&root.join("node_modules/zod/lib/index.d.ts")))
        );
        assert_eq!(resolver.resolve(&importer, "not-installed"), None);
    }
}
