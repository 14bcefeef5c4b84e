//! Line-oriented parser for extended M3U playlists.
//!
//! The parser never fails: lines it cannot place are skipped, and every
//! metadata line produces an [`Entry`] even when no URL follows it.

use crate::domain::{Entry, METADATA_PREFIX};

/// Playlist header line
pub const HEADER: &str = "#EXTM3U";

/// Prefix of an active stream URL line
const URL_PREFIX: &str = "http";

/// Prefix of a commented-out stream URL line
const DISABLED_URL_PREFIX: &str = "#http";

fn is_header(line: &str) -> bool {
    line.starts_with(HEADER)
}

fn is_metadata(line: &str) -> bool {
    line.starts_with(METADATA_PREFIX)
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#') && !is_metadata(line)
}

/// Parse playlist text into entries, in file order
pub fn parse(content: &str) -> Vec<Entry> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() || is_header(line) {
            i += 1;
            continue;
        }

        // Contiguous comment run directly above a metadata line
        let mut leading_comments = Vec::new();
        while i < lines.len() && is_comment(lines[i]) {
            if !is_header(lines[i]) {
                leading_comments.push(lines[i].to_string());
            }
            i += 1;
        }

        if i < lines.len() && is_metadata(lines[i]) {
            let metadata_line = lines[i];
            i += 1;
            let (entry, next) = parse_entry(metadata_line, &lines, i, leading_comments);
            entries.push(entry);
            i = next;
        } else {
            // Orphaned comments or stray content: drop and move on
            i += 1;
        }
    }

    entries
}

/// Scan the lines following a metadata line. Returns the entry and the
/// index of the first unconsumed line.
fn parse_entry(
    metadata_line: &str,
    lines: &[&str],
    mut i: usize,
    mut auxiliary_lines: Vec<String>,
) -> (Entry, usize) {
    let mut url = String::new();
    let mut disabled = true;

    while i < lines.len() {
        let line = lines[i];

        if line.is_empty() {
            i += 1;
            if url.is_empty() {
                continue;
            }
            break;
        }

        if line.starts_with(DISABLED_URL_PREFIX) {
            if url.is_empty() {
                url = line[1..].to_string();
                disabled = true;
            } else {
                auxiliary_lines.push(line.to_string());
            }
            i += 1;
        } else if line.starts_with(URL_PREFIX) {
            if !url.is_empty() {
                // Keep the commented URL seen earlier as a comment
                auxiliary_lines.push(format!("#{}", url));
            }
            url = line.to_string();
            disabled = false;
            i += 1;
            break;
        } else if is_metadata(line) {
            break;
        } else if line.starts_with('#') {
            auxiliary_lines.push(line.to_string());
            i += 1;
        } else {
            i += 1;
            break;
        }
    }

    let entry = Entry::new(metadata_line, url, disabled).with_auxiliary_lines(auxiliary_lines);
    (entry, i)
}
