//! Taxonomy Model
//!
//! Tags and genres share one entry shape; the backend only differs in the
//! name of the id field (`tagId` / `genreId`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Locale used when the preferred one has no name
pub const FALLBACK_LOCALE: &str = "en";

/// Catalog type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Tag,
    Genre,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 2] = [CatalogKind::Tag, CatalogKind::Genre];

    /// Name of the id field on the wire
    pub fn id_field(self) -> &'static str {
        match self {
            CatalogKind::Tag => "tagId",
            CatalogKind::Genre => "genreId",
        }
    }

    /// Prefix of synthesized placeholder names
    pub fn label(self) -> &'static str {
        match self {
            CatalogKind::Tag => "Tag",
            CatalogKind::Genre => "Genre",
        }
    }

    /// Placeholder shown when nothing better is known about `id`
    pub fn placeholder_name(self, id: u64) -> String {
        format!("{} {}", self.label(), id)
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogKind::Tag => f.write_str("tag"),
            CatalogKind::Genre => f.write_str("genre"),
        }
    }
}

/// Taxonomy term (tag or genre)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(alias = "tagId", alias = "genreId")]
    pub id: u64,
    /// Stable machine key
    #[serde(default)]
    pub slug: String,
    /// locale → localized name
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogEntry {
    pub fn new(id: u64, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            names: BTreeMap::new(),
            color: None,
            description: None,
        }
    }

    pub fn with_name(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(locale.into(), name.into());
        self
    }

    fn name_in(&self, locale: &str) -> Option<&str> {
        self.names
            .get(locale)
            .map(String::as_str)
            .filter(|n| !n.is_empty())
    }

    /// Preferred locale, then the fallback locale, then the slug, then a placeholder
    pub fn display_name(&self, kind: CatalogKind, locale: &str) -> String {
        self.name_in(locale)
            .or_else(|| self.name_in(FALLBACK_LOCALE))
            .or_else(|| Some(self.slug.as_str()).filter(|s| !s.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| kind.placeholder_name(self.id))
    }
}

/// Label/value pair for selection widgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOption {
    pub label: String,
    pub value: u64,
}

/// `result` of a catalog listing page
///
/// `items` missing altogether is a malformed page, not an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogItems {
    #[serde(default)]
    pub items: Option<Vec<CatalogEntry>>,
}

impl CatalogItems {
    pub fn new(items: Vec<CatalogEntry>) -> Self {
        Self { items: Some(items) }
    }
}

/// Create tag/genre payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntryCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Update tag/genre payload
///
/// `id` is sent under the kind's own id field, so it is not serialized here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntryUpdate {
    #[serde(skip)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
