use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticsResult;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_json_is_pretty_with_trailing_newline() {
        let result = DiagnosticsResult {
            file_path: "a.ts".to_string(),
            results: Vec::new(),
            duration_ms: 0,
        };
        let mut buffer = Vec::new();
        write_json(&mut buffer, &result).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "{\n  \"filePath\": \"a.ts\",\n  \"results\": [],\n  \"durationMs\": 0\n}\n"
        );
    }
}
