pub mod walker;

pub use walker::DiagnosticsWalker;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    MissingFile,
    MissingNamedExport,
    MissingDefaultExport,
    UnresolvedImport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticLocation {
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDiagnostic {
    pub message: String,
    pub location: DiagnosticLocation,
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl ImportDiagnostic {
    fn error(kind: DiagnosticKind, message: String, file_path: &str, line: Option<usize>) -> Self {
        Self {
            message,
            location: DiagnosticLocation {
                file_path: file_path.to_string(),
                line,
            },
            severity: Severity::Error,
            kind,
        }
    }

    pub fn missing_file(file_path: &str) -> Self {
        Self::error(
            DiagnosticKind::MissingFile,
            "Target file not found".to_string(),
            file_path,
            None,
        )
    }

    pub fn unresolved_import(file_path: &str, line: usize, statement: &str) -> Self {
        Self::error(
            DiagnosticKind::UnresolvedImport,
            format!("Import could not be resolved: '{}'", statement),
            file_path,
            Some(line),
        )
    }

    pub fn missing_default_export(file_path: &str, line: usize, name: &str, target: &str) -> Self {
        Self::error(
            DiagnosticKind::MissingDefaultExport,
            format!("Default export '{}' not found in '{}'", name, target),
            file_path,
            Some(line),
        )
    }

    pub fn missing_named_export(file_path: &str, line: usize, name: &str, target: &str) -> Self {
        Self::error(
            DiagnosticKind::MissingNamedExport,
            format!("Named export '{}' not found in '{}'", name, target),
            file_path,
            Some(line),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResult {
    pub file_path: String,
    pub results: Vec<ImportDiagnostic>,
    pub duration_ms: u64,
}
