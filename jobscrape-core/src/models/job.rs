//! Per-site job records and classification labels.
//!
//! - [`JobRecord`] - Normalized listing produced by a site extractor
//! - [`ClassificationLabel`] - Suitability label written by the classifier

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::site::SiteKind;
use super::table::format_date;
use crate::error::CoreError;

// ============================================================================
// Classification Label
// ============================================================================

/// Suitability label assigned to a listing by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationLabel {
    /// Listing is suitable.
    Yes,
    /// Listing is not suitable.
    No,
    /// Classifier could not decide.
    Maybe,
    /// Classification failed; eligible for another attempt next run.
    Error,
    /// Not classified yet.
    #[default]
    Unset,
}

impl ClassificationLabel {
    /// Returns the storage/export text for this label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Maybe => "maybe",
            Self::Error => "error",
            Self::Unset => "",
        }
    }

    /// Yes, no and maybe are final; everything else is classified again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Yes | Self::No | Self::Maybe)
    }

    /// Maps a free-text model answer onto the label vocabulary.
    ///
    /// Anything outside `yes`/`no`/`maybe` becomes [`ClassificationLabel::Error`].
    pub fn from_answer(answer: &str) -> Self {
        let normalized = answer
            .trim()
            .trim_matches(|c: char| c == '.' || c == '"' || c == '\'')
            .to_ascii_lowercase();

        match normalized.as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            "maybe" => Self::Maybe,
            _ => Self::Error,
        }
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("unset"),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for ClassificationLabel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "maybe" => Ok(Self::Maybe),
            "error" => Ok(Self::Error),
            "" | "unset" => Ok(Self::Unset),
            _ => Err(CoreError::UnknownLabel(s.to_string())),
        }
    }
}

// ============================================================================
// Job Record
// ============================================================================

/// A normalized job listing.
///
/// `url` is the unique key within a site. Every other text field is
/// optional because extractors leave fields they cannot find empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Site the listing was harvested from.
    pub site: SiteKind,
    /// Canonical listing URL.
    pub url: String,
    /// Site-side identifier, when the site exposes one.
    #[serde(default)]
    pub external_id: Option<String>,
    /// Job title.
    #[serde(default)]
    pub title: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Australian state or territory.
    #[serde(default)]
    pub state: Option<String>,
    /// Suburb or town.
    #[serde(default)]
    pub suburb: Option<String>,
    /// Employment type (casual, full time, ...).
    #[serde(default)]
    pub job_type: Option<String>,
    /// Compensation text as shown on the site.
    #[serde(default)]
    pub salary: Option<String>,
    /// Engagement duration text.
    #[serde(default)]
    pub duration: Option<String>,
    /// Start date text as shown on the site.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Search category or site category.
    #[serde(default)]
    pub category: Option<String>,
    /// When the site says the listing was published.
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    /// When this record was extracted.
    pub discovered_at: DateTime<Utc>,
    /// Classifier verdict.
    #[serde(default)]
    pub label: ClassificationLabel,
    /// Site-specific fields without a shared column.
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

impl JobRecord {
    /// Columns shared by every site's export, in order.
    pub const COLUMNS: &'static [&'static str] = &[
        "url",
        "title",
        "description",
        "state",
        "suburb",
        "job_type",
        "salary",
        "duration",
        "start_date",
        "category",
        "external_id",
        "posted_at",
        "discovered_at",
        "label",
    ];

    /// Creates an empty record for `url`, discovered now.
    pub fn new(site: SiteKind, url: impl Into<String>) -> Self {
        Self {
            site,
            url: url.into(),
            external_id: None,
            title: None,
            description: None,
            state: None,
            suburb: None,
            job_type: None,
            salary: None,
            duration: None,
            start_date: None,
            category: None,
            posted_at: None,
            discovered_at: Utc::now(),
            label: ClassificationLabel::Unset,
            extras: BTreeMap::new(),
        }
    }

    /// Returns true if the description is missing or blank.
    pub fn has_empty_description(&self) -> bool {
        self.description
            .as_deref()
            .is_none_or(|d| d.trim().is_empty())
    }

    /// Renders the shared columns as strings, dates as `YYYY-MM-DD`.
    pub fn to_row(&self) -> Vec<String> {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        vec![
            self.url.clone(),
            text(&self.title),
            text(&self.description),
            text(&self.state),
            text(&self.suburb),
            text(&self.job_type),
            text(&self.salary),
            text(&self.duration),
            text(&self.start_date),
            text(&self.category),
            text(&self.external_id),
            self.posted_at.as_ref().map(format_date).unwrap_or_default(),
            format_date(&self.discovered_at),
            self.label.as_str().to_string(),
        ]
    }
}
