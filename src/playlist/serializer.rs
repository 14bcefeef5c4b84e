//! Renders entries back to playlist text.

use crate::domain::Entry;

use super::parser::HEADER;

/// Render a full playlist: header, then each entry followed by one blank line
pub fn serialize(entries: &[Entry]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + entries.len() * 128);
    out.push_str(HEADER);
    out.push('\n');

    for entry in entries {
        for line in entry.to_lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }

    out
}
