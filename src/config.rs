use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

static JSONC_COMMENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)("(?:[^"\\]|\\.)*")|//[^\n]*|/\*.*?\*/"#).expect("valid comment pattern")
});

static TRAILING_COMMAS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"("(?:[^"\\]|\\.)*")|,(\s*[}\]])"#).expect("valid trailing comma pattern")
});

const MAX_EXTENDS_DEPTH: usize = 8;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTsConfig {
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: RawCompilerOptions,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompilerOptions {
    base_url: Option<String>,
    paths: Option<IndexMap<String, Vec<String>>>,
}

/// A `compilerOptions.paths` entry such as `"@/*": ["./src/*"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAlias {
    pub pattern: String,
    pub targets: Vec<String>,
}

impl PathAlias {
    /// Text captured by the pattern's `*`, or the empty string for exact
    /// patterns.
    pub fn capture<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        match self.pattern.split_once('*') {
            Some((prefix, suffix)) => specifier.strip_prefix(prefix)?.strip_suffix(suffix),
            None => (specifier == self.pattern).then_some(""),
        }
    }

    fn prefix_len(&self) -> usize {
        self.pattern.split('*').next().map_or(0, str::len)
    }
}

/// The subset of `tsconfig.json` that module resolution needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub root_dir: PathBuf,
    pub base_url: Option<PathBuf>,
    pub paths: Vec<PathAlias>,
    pub paths_base: PathBuf,
}

impl ProjectConfig {
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        Self {
            paths_base: root_dir.clone(),
            root_dir,
            base_url: None,
            paths: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let root_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let root_dir = fs::canonicalize(&root_dir).unwrap_or(root_dir);

        let mut config = Self::with_root(root_dir);
        config.apply_file(path, 0)?;
        if let Some(base_url) = &config.base_url {
            config.paths_base = base_url.clone();
        }
        // Longest prefix wins when several patterns match
        config
            .paths
            .sort_by(|a, b| b.prefix_len().cmp(&a.prefix_len()));
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults rooted
    /// at the working directory.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.is_file() {
            debug!("No tsconfig at {}, using defaults", path.display());
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            return Self::with_root(cwd);
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring unusable tsconfig: {}", e);
                let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                Self::with_root(fs::canonicalize(&root).unwrap_or(root))
            }
        }
    }

    fn apply_file(&mut self, path: &Path, depth: usize) -> Result<(), ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawTsConfig =
            serde_json::from_str(&strip_jsonc(&content)).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let parents = match raw.extends {
            Some(Extends::One(parent)) => vec![parent],
            Some(Extends::Many(parents)) => parents,
            None => Vec::new(),
        };
        for parent in parents {
            if depth >= MAX_EXTENDS_DEPTH {
                warn!("tsconfig extends chain too deep at {}", path.display());
                break;
            }
            if !parent.starts_with('.') {
                debug!("Skipping package tsconfig base '{}'", parent);
                continue;
            }
            let parent_path = if parent.ends_with(".json") {
                dir.join(&parent)
            } else {
                dir.join(format!("{}.json", parent))
            };
            self.apply_file(&parent_path, depth + 1)?;
        }

        let options = raw.compiler_options;
        if let Some(base_url) = options.base_url {
            self.base_url = Some(dir.join(base_url));
        }
        if let Some(paths) = options.paths {
            self.paths_base = dir.to_path_buf();
            self.paths = paths
                .into_iter()
                .map(|(pattern, targets)| PathAlias { pattern, targets })
                .collect();
        }
        Ok(())
    }
}

/// Removes comments and trailing commas so `serde_json` accepts tsconfig's
/// JSON-with-comments dialect. String literals are left untouched.
pub fn strip_jsonc(content: &str) -> String {
    let keep_strings = |caps: &Captures| {
        caps.get(1)
            .map(|string| string.as_str().to_string())
            .unwrap_or_default()
    };
    let without_comments = JSONC_COMMENTS.replace_all(content, keep_strings);
    TRAILING_COMMAS
        .replace_all(&without_comments, |caps: &Captures| match caps.get(1) {
            Some(string) => string.as_str().to_string(),
            None => caps[2].to_string(),
        })
        .into_owned()
}
