//! Minimal CSV encoding for history rows and metrics documents
//!
//! Writing quotes a field only when it has to. Reading is only used to count
//! rows of an existing history object; the merge itself never re-encodes
//! stored bytes.

use std::mem::take;

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Encode a single field, quoting and doubling inner quotes when required
pub fn encode_field(field: &str) -> String {
    if needs_quotes(field) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Encode one row, newline terminated
pub fn encode_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| encode_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Append an encoded row to existing CSV bytes.
///
/// The existing bytes are copied verbatim. If they do not end with a line
/// terminator one is inserted first, so the previous last row is kept whole.
pub fn append_row(existing: &[u8], row: &str) -> Vec<u8> {
    let mut merged = Vec::with_capacity(existing.len() + row.len() + 1);
    merged.extend_from_slice(existing);
    if !existing.is_empty() && !existing.ends_with(b"\n") {
        merged.push(b'\n');
    }
    merged.extend_from_slice(row.as_bytes());
    merged
}

/// Parse CSV text into rows (quotes and CRLF tolerant, blank lines skipped)
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row: Vec<String> = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Number of rows in CSV bytes; invalid UTF-8 is read lossily
pub fn count_rows(bytes: &[u8]) -> usize {
    parse_rows(&String::from_utf8_lossy(bytes)).len()
}
