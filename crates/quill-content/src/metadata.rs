//! Front-matter metadata.
//!
//! Documents open with a YAML block delimited by `---` lines:
//!
//! ```yaml
//! ---
//! title: Hello
//! date: 2024-03-01
//! tags: [rust, web]
//! slug: hello-world
//! draft: false
//! pinned: true
//! ---
//! ```
//!
//! Each field is read leniently. A value of the wrong type is treated as
//! absent, so one bad field never discards the rest of the block. Only YAML
//! that fails to parse at all is an error.

use serde_yaml::{Mapping, Value};

/// Metadata extracted from a document's front matter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Display title.
    pub title: Option<String>,
    /// Publication date as written (expected `YYYY-MM-DD`).
    pub date: Option<String>,
    /// Tags in declaration order.
    pub tags: Vec<String>,
    /// Slug override.
    pub slug: Option<String>,
    /// Excluded from the public collection.
    pub draft: bool,
    /// Listed ahead of unpinned records in category views.
    pub pinned: bool,
    /// Hidden from navigation (standalone pages only).
    pub hidden: bool,
}

impl DocumentMetadata {
    /// Parse metadata from YAML content.
    ///
    /// Empty content and non-mapping documents yield default metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, MetadataError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_yaml::from_str(trimmed)
            .map_err(|e| MetadataError::Parse(format!("Invalid YAML: {e}")))?;

        let Value::Mapping(map) = value else {
            return Ok(Self::default());
        };

        Ok(Self {
            title: string_field(&map, "title"),
            date: string_field(&map, "date"),
            tags: string_list(&map, "tags"),
            slug: string_field(&map, "slug"),
            draft: bool_field(&map, "draft"),
            pinned: bool_field(&map, "pinned"),
            hidden: bool_field(&map, "hidden"),
        })
    }
}

/// Error type for metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// YAML parsing error.
    #[error("{0}")]
    Parse(String),
}

/// Value under `key`, treating an explicit null as absent.
fn field<'a>(map: &'a Mapping, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|value| !value.is_null())
}

fn ignored(key: &str, expected: &str) {
    tracing::debug!(field = key, expected, "Front-matter field has the wrong type, ignoring");
}

fn string_field(map: &Mapping, key: &str) -> Option<String> {
    let value = field(map, key)?;
    let Some(text) = value.as_str() else {
        ignored(key, "string");
        return None;
    };
    Some(text.to_owned())
}

fn bool_field(map: &Mapping, key: &str) -> bool {
    let Some(value) = field(map, key) else {
        return false;
    };
    value.as_bool().unwrap_or_else(|| {
        ignored(key, "bool");
        false
    })
}

fn string_list(map: &Mapping, key: &str) -> Vec<String> {
    let Some(value) = field(map, key) else {
        return Vec::new();
    };
    let Value::Sequence(items) = value else {
        ignored(key, "list");
        return Vec::new();
    };
    let tags: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    if tags.len() < items.len() {
        tracing::debug!(
            field = key,
            skipped = items.len() - tags.len(),
            "Ignoring non-string list entries"
        );
    }
    tags
}
