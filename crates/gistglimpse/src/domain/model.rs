//! Domain models for gist manifests and fused preview bundles.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Title used when a gist has neither a description nor any files.
pub const UNTITLED: &str = "Untitled";

/// Canonical gist identifier produced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct GistId(String);

impl GistId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single file inside a gist manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetFile {
    pub filename: String,
    #[serde(rename = "language", default, deserialize_with = "null_as_empty")]
    pub declared_language: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub raw_url: Option<String>,
    #[serde(default)]
    pub size: u64,
    /// Set by the API when `content` was cut short.
    #[serde(default)]
    pub truncated: bool,
}

/// Owner identity shown alongside a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerInfo {
    pub login: String,
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// The file listing and metadata for one gist, as returned by the API.
///
/// Files are keyed by filename in sorted order, so anything derived from iteration order
/// is independent of the key order in the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetManifest {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<OwnerInfo>,
    #[serde(default)]
    pub files: BTreeMap<String, SnippetFile>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl SnippetManifest {
    /// Human title: description, then the first filename, then [`UNTITLED`].
    pub fn title(&self) -> String {
        self.description
            .as_deref()
            .filter(|description| !description.is_empty())
            .or_else(|| self.files.keys().next().map(String::as_str))
            .unwrap_or(UNTITLED)
            .to_owned()
    }
}

/// Normalized output of fusion, ready to render.
///
/// An empty `html`, `css` or `js` means no file matched that slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewBundle {
    pub html: String,
    pub css: String,
    pub js: String,
    pub title: String,
    pub owner: Option<OwnerInfo>,
}

impl PreviewBundle {
    /// Returns whether none of the three content slots were filled.
    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
