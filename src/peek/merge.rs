//! Coalesces peeks whose line ranges overlap, so the same code is never shown
//! twice.

use super::{Peek, PeekResult, SourceLocation};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Line-number to content map; later writes win.
#[derive(Debug, Default)]
struct LineOverlay {
    lines: BTreeMap<usize, String>,
}

impl LineOverlay {
    fn write(&mut self, start_line: usize, snippet: &str) {
        for (offset, line) in snippet.split('\n').enumerate() {
            self.lines.insert(start_line + offset, line.to_string());
        }
    }

    fn render(&self, start_line: usize, end_line: usize) -> String {
        self.lines
            .range(start_line..=end_line)
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Whether two ranges share at least one line.
pub fn overlaps(a: &SourceLocation, b: &SourceLocation) -> bool {
    a.start_line <= b.end_line && b.start_line <= a.end_line
}

/// Union of two snippets of the same file. Lines of `b` win where both
/// snippets cover the same line.
pub fn merge_snippets(
    a: (&str, &SourceLocation),
    b: (&str, &SourceLocation),
) -> (String, SourceLocation) {
    let (a_snippet, a_location) = a;
    let (b_snippet, b_location) = b;
    let start_line = a_location.start_line.min(b_location.start_line);
    let end_line = a_location.end_line.max(b_location.end_line);

    let mut overlay = LineOverlay::default();
    overlay.write(a_location.start_line, a_snippet);
    overlay.write(b_location.start_line, b_snippet);

    (
        overlay.render(start_line, end_line),
        SourceLocation::new(a_location.file_path.clone(), start_line, end_line),
    )
}

impl Peek {
    fn absorb(self, other: Peek) -> Peek {
        let (snippet, location) = merge_snippets(
            (&self.snippet, &self.location),
            (&other.snippet, &other.location),
        );
        Peek {
            definition_kind: format!("{},{}", self.definition_kind, other.definition_kind),
            reference_text: format!("{},{}", self.reference_text, other.reference_text),
            snippet,
            location,
        }
    }
}

/// Folds a file's peeks, sorted by start line, into non-overlapping peeks.
fn fold_sorted(peeks: Vec<Peek>) -> Vec<Peek> {
    let mut merged = Vec::new();
    let mut current: Option<Peek> = None;

    for peek in peeks {
        current = Some(match current.take() {
            None => peek,
            Some(acc) if overlaps(&acc.location, &peek.location) => acc.absorb(peek),
            Some(acc) => {
                merged.push(acc);
                peek
            }
        });
    }
    merged.extend(current);
    merged
}

/// Widens the queried snippet with overlapping peeks from the same file and
/// coalesces overlapping peeks from every other file.
pub fn merge_result(result: PeekResult) -> PeekResult {
    let PeekResult {
        mut snippet,
        mut location,
        peeks,
        config,
    } = result;

    let (same_file, other_files): (Vec<Peek>, Vec<Peek>) = peeks
        .into_iter()
        .partition(|peek| peek.location.file_path == location.file_path);

    let mut remaining = Vec::new();
    for peek in same_file {
        if overlaps(&peek.location, &location) {
            (snippet, location) =
                merge_snippets((&peek.snippet, &peek.location), (&snippet, &location));
        } else {
            remaining.push(peek);
        }
    }

    let mut by_file: IndexMap<String, Vec<Peek>> = IndexMap::new();
    for peek in other_files {
        by_file
            .entry(peek.location.file_path.clone())
            .or_default()
            .push(peek);
    }
    for (_, mut peeks) in by_file {
        peeks.sort_by_key(|peek| peek.location.start_line);
        remaining.extend(fold_sorted(peeks));
    }

    PeekResult {
        snippet,
        location,
        peeks: remaining,
        config,
    }
}
