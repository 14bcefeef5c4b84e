//! Attribute parsing for `#EXTINF` metadata lines.
//!
//! A metadata line looks like:
//!
//! ```text
//! #EXTINF:-1 tvg-id="bbc.uk" tvg-logo="http://logo.test/bbc.png" group-title="News",BBC One
//! ```
//!
//! Every `key="value"` pair is collected into an [`Attributes`] map, and the
//! text after the last comma is the display name.

use std::sync::OnceLock;

use regex::Regex;

/// Source identifier tag (EPG id)
pub const TAG_SOURCE_ID: &str = "tvg-id";

/// Display name hint tag
pub const TAG_NAME_HINT: &str = "tvg-name";

/// Icon URL tag
pub const TAG_ICON: &str = "tvg-logo";

/// Group label tag
pub const TAG_GROUP: &str = "group-title";

static ATTRIBUTE_RE: OnceLock<Regex> = OnceLock::new();

fn attribute_regex() -> &'static Regex {
    ATTRIBUTE_RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z0-9_-]+)="([^"]*)""#).expect("attribute pattern is valid")
    })
}

/// Ordered `key="value"` pairs from a metadata line.
///
/// When a key appears more than once the first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    /// Parse all `key="value"` pairs from a line
    pub fn parse(line: &str) -> Self {
        let pairs = attribute_regex()
            .captures_iter(line)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
            .collect();

        Self { pairs }
    }

    /// Look up an attribute. `None` means the tag is absent; `Some("")`
    /// means it is present with an empty value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Extract the display name: everything after the last comma, trimmed.
///
/// Returns an empty string when the line has no comma.
pub fn display_name(line: &str) -> &str {
    match line.rfind(',') {
        Some(idx) => line[idx + 1..].trim(),
        None => "",
    }
}

/// Rebuild a metadata line with `suffix` appended to its display name.
///
/// Whitespace around the display name is preserved. A line without a
/// comma gets `,<suffix>` appended so that the result still carries a name.
pub fn with_display_name_suffix(line: &str, suffix: &str) -> String {
    let Some(idx) = line.rfind(',') else {
        return format!("{},{}", line, suffix.trim_start());
    };

    let (head, tail) = line.split_at(idx + 1);
    let name = tail.trim();
    if name.is_empty() {
        return format!("{}{}", head, suffix.trim_start());
    }

    let leading = &tail[..tail.len() - tail.trim_start().len()];
    let trailing = &tail[tail.trim_end().len()..];
    format!("{}{}{}{}{}", head, leading, name, suffix, trailing)
}
