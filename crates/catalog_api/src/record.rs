use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogApiError;
use crate::url::cover_url;

/// Which catalog field a search query is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SearchField {
    #[default]
    Title,
    Author,
    Isbn,
    Subject,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [Self::Title, Self::Author, Self::Isbn, Self::Subject];

    /// Query-parameter name understood by the catalog endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Isbn => "isbn",
            Self::Subject => "subject",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = CatalogApiError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| CatalogApiError::UnknownField(normalized.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverSize {
    Small,
    Medium,
    Large,
}

impl CoverSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
        }
    }
}

/// One search hit as returned by the catalog.
///
/// Only the fields the client renders or saves are decoded; everything else
/// in the source document is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "author_name", default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_publish_year: Option<i32>,
    #[serde(rename = "cover_i", default, skip_serializing_if = "Option::is_none")]
    pub cover_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<Vec<String>>,
}

impl CatalogRecord {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            authors: Vec::new(),
            first_publish_year: None,
            cover_id: None,
            isbn: None,
        }
    }

    pub fn with_authors(mut self, authors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_first_publish_year(mut self, year: i32) -> Self {
        self.first_publish_year = Some(year);
        self
    }

    pub fn with_cover_id(mut self, cover_id: u64) -> Self {
        self.cover_id = Some(cover_id);
        self
    }

    /// Authors joined for display, or `Unknown Author` when the list is empty.
    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            "Unknown Author".to_string()
        } else {
            self.authors.join(", ")
        }
    }

    pub fn primary_isbn(&self) -> Option<&str> {
        self.isbn.as_ref()?.first().map(String::as_str)
    }

    pub fn cover_url(&self, size: CoverSize) -> Option<String> {
        self.cover_id.map(|cover_id| cover_url(cover_id, size))
    }
}

/// Response envelope of the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub docs: Vec<CatalogRecord>,
}
