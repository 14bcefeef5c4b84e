//! A single playlist entry and its matching key.

use std::sync::OnceLock;

use regex::Regex;

use super::attributes::{self, Attributes, TAG_GROUP, TAG_ICON, TAG_NAME_HINT, TAG_SOURCE_ID};

/// Prefix of a metadata line
pub const METADATA_PREFIX: &str = "#EXTINF";

/// `tvg-id` placeholder written by m3u4u for channels without an EPG id
pub const NO_ID_SENTINEL: &str = "(no tvg-id)(m3u4u)";

/// Suffix appended to the display name of synthesized backup entries
pub const BACKUP_SUFFIX: &str = " (Backup)";

/// Display name fragments that mark an entry as a backup variant
pub const BACKUP_MARKERS: [&str; 6] = ["Backup", "-[2]", "-[3]", "(2)", "(3)", " 2"];

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static NON_WORD_RE: OnceLock<Regex> = OnceLock::new();

/// One playlist item: metadata line, optional stream URL, and the comment
/// lines that travel with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full `#EXTINF` line
    metadata_line: String,

    /// Stream URL (empty when not yet known)
    pub stream_url: String,

    /// True when the URL is deliberately commented out
    pub disabled: bool,

    /// Comment lines preserved verbatim, in order
    pub auxiliary_lines: Vec<String>,

    attributes: Attributes,

    display_name: String,
}

impl Entry {
    /// Create an entry. An empty URL always yields a disabled entry.
    pub fn new(metadata_line: impl Into<String>, stream_url: impl Into<String>, disabled: bool) -> Self {
        let metadata_line = metadata_line.into();
        let stream_url = stream_url.into();
        let attributes = Attributes::parse(&metadata_line);
        let display_name = attributes::display_name(&metadata_line).to_string();
        let disabled = disabled || stream_url.is_empty();

        Self {
            metadata_line,
            stream_url,
            disabled,
            auxiliary_lines: Vec::new(),
            attributes,
            display_name,
        }
    }

    /// Attach auxiliary comment lines
    pub fn with_auxiliary_lines(mut self, lines: Vec<String>) -> Self {
        self.auxiliary_lines = lines;
        self
    }

    pub fn metadata_line(&self) -> &str {
        &self.metadata_line
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// `tvg-id`
    pub fn source_id(&self) -> Option<&str> {
        self.attributes.get(TAG_SOURCE_ID)
    }

    /// `tvg-name`
    pub fn display_name_hint(&self) -> Option<&str> {
        self.attributes.get(TAG_NAME_HINT)
    }

    /// `tvg-logo`
    pub fn icon_url(&self) -> Option<&str> {
        self.attributes.get(TAG_ICON)
    }

    /// `group-title`
    pub fn group_label(&self) -> Option<&str> {
        self.attributes.get(TAG_GROUP)
    }

    /// Text after the last comma of the metadata line
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn has_url(&self) -> bool {
        !self.stream_url.is_empty()
    }

    /// True when the entry has a URL that will be written uncommented
    pub fn is_active(&self) -> bool {
        self.has_url() && !self.disabled
    }

    /// Key used to correlate entries across playlists.
    ///
    /// `id:<tvg-id>` when a real id is present, else `name:<normalized name>`.
    pub fn match_key(&self) -> String {
        match self.source_id() {
            Some(id) if !id.is_empty() && id != NO_ID_SENTINEL => format!("id:{}", id),
            _ => format!("name:{}", normalize_name(&self.display_name)),
        }
    }

    /// Whether the display name marks this entry as a backup variant
    pub fn is_backup_variant(&self) -> bool {
        BACKUP_MARKERS
            .iter()
            .any(|marker| self.display_name.contains(marker))
    }

    /// Metadata line with ` (Backup)` appended to the display name
    pub fn with_backup_name(&self) -> String {
        attributes::with_display_name_suffix(&self.metadata_line, BACKUP_SUFFIX)
    }

    /// Build the backup sibling of this entry pointing at `url`
    pub fn backup_for(&self, url: impl Into<String>) -> Self {
        Self::new(self.with_backup_name(), url, false)
    }

    /// Adopt a new URL and enable the entry
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.stream_url = url.into();
        self.disabled = self.stream_url.is_empty();
    }

    /// Render the entry as playlist lines
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .auxiliary_lines
            .iter()
            .filter(|line| line.starts_with('#') && !line.starts_with(METADATA_PREFIX))
            .cloned()
            .collect();

        lines.push(self.metadata_line.clone());

        if self.has_url() {
            if self.disabled {
                lines.push(format!("#{}", self.stream_url));
            } else {
                lines.push(self.stream_url.clone());
            }
        }

        lines
    }
}

/// Lower-case, collapse whitespace, trim, and drop non-word characters
pub fn normalize_name(name: &str) -> String {
    let whitespace = WHITESPACE_RE
        .get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
    let non_word = NON_WORD_RE
        .get_or_init(|| Regex::new(r"[^\w\s]").expect("non-word pattern is valid"));

    let lowered = name.to_lowercase();
    let collapsed = whitespace.replace_all(lowered.trim(), " ");
    non_word.replace_all(&collapsed, "").into_owned()
}
