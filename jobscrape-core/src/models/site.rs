//! Supported recruiting sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A recruiting site jobscrape knows how to harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    /// Agri Labour Australia (casual farm work listings).
    Agrilabour,
    /// APG Workforce job search.
    Apgworkforce,
    /// Costa Group careers board.
    Costagroup,
    /// Workforce Australia vacancy API.
    #[serde(rename = "workforceaustralia")]
    WorkforceAustralia,
}

impl SiteKind {
    /// Returns every supported site.
    pub fn all() -> &'static [SiteKind] {
        &[
            Self::Agrilabour,
            Self::Apgworkforce,
            Self::Costagroup,
            Self::WorkforceAustralia,
        ]
    }

    /// Identifier used on the command line, in config and in storage.
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::Agrilabour => "agrilabour",
            Self::Apgworkforce => "apgworkforce",
            Self::Costagroup => "costagroup",
            Self::WorkforceAustralia => "workforceaustralia",
        }
    }

    /// Human-readable site name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Agrilabour => "Agri Labour Australia",
            Self::Apgworkforce => "APG Workforce",
            Self::Costagroup => "Costa Group",
            Self::WorkforceAustralia => "Workforce Australia",
        }
    }

    /// Worksheet that receives this site's records.
    pub fn worksheet(&self) -> &'static str {
        self.cli_name()
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cli_name())
    }
}

impl FromStr for SiteKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.cli_name() == needle)
            .ok_or_else(|| CoreError::SiteNotFound(s.to_string()))
    }
}
