//! Core type definitions for Plugdir

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

/// A plugin listed in the directory
///
/// `slug` is the unique key. Any field not modelled explicitly is kept in
/// `metadata` and flattened back out when the plugin is serialized, so
/// records written by other tools round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    /// Unique human-readable identifier
    pub slug: String,
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Plugin author
    #[serde(default)]
    pub author: Option<String>,
    /// Category id, if the plugin has been categorized
    #[serde(default)]
    pub category: Option<String>,
    /// Tag ids
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Lowercased searchable text derived from name, author, tags and description
    #[serde(default)]
    pub keywords: String,
    /// Arbitrary additional metadata
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Plugin {
    /// Create a plugin with the given slug and name
    pub fn new<S: Into<String>, N: Into<String>>(slug: S, name: N) -> Self {
        let mut plugin = Self {
            slug: slug.into(),
            name: name.into(),
            description: String::new(),
            author: None,
            category: None,
            tags: BTreeSet::new(),
            keywords: String::new(),
            metadata: Map::new(),
        };
        plugin.refresh_keywords();
        plugin
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self.refresh_keywords();
        self
    }

    pub fn with_author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = Some(author.into());
        self.refresh_keywords();
        self
    }

    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self.refresh_keywords();
        self
    }

    /// Recompute the `keywords` string from the searchable fields
    pub fn refresh_keywords(&mut self) {
        self.keywords = build_keywords(
            &self.name,
            self.author.as_deref(),
            &self.tags,
            &self.description,
        );
    }

    /// Replace the tag set, keeping `keywords` in sync
    pub fn set_tags(&mut self, tags: BTreeSet<String>) {
        self.tags = tags;
        self.refresh_keywords();
    }
}

/// Build the searchable keyword string for a plugin.
///
/// Whitespace is collapsed to single spaces so the string never contains
/// line breaks.
pub fn build_keywords(
    name: &str,
    author: Option<&str>,
    tags: &BTreeSet<String>,
    description: &str,
) -> String {
    let parts = std::iter::once(name)
        .chain(author)
        .chain(tags.iter().map(String::as_str))
        .chain(std::iter::once(description));

    parts
        .flat_map(str::split_whitespace)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Plugin category reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Category {
    pub fn new<S: Into<String>, N: Into<String>>(id: S, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
        }
    }
}

/// Tag reference data with the number of plugins carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    #[serde(default)]
    pub count: u64,
}

/// Submitted plugin identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    /// Generate a new random submission ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SubmissionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A user-submitted plugin awaiting moderation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedPlugin {
    pub id: SubmissionId,
    pub name: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(rename = "github-link", default)]
    pub github_link: Option<String>,
    /// External reference link used to detect duplicate submissions
    #[serde(rename = "vimorg-link", default)]
    pub vimorg_link: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unix timestamp in seconds
    #[serde(default)]
    pub submitted_at: Option<i64>,
    /// Absent or false means pending
    #[serde(default)]
    pub approved: bool,
    /// Any other submitted form fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubmittedPlugin {
    pub fn is_pending(&self) -> bool {
        !self.approved
    }
}
