//! Block-page detection.
//!
//! Sites that throttle scrapers rarely answer with an error status. They
//! serve a normal-looking page that says "you have been blocked", or an
//! interstitial that is far smaller than any real listing. The detector
//! judges fetched content with an ordered policy:
//!
//! 1. Known phrases, first match wins.
//! 2. Size heuristic: fewer than `min_content_len` characters.
//! 3. Otherwise clean.
//!
//! Every positive verdict is logged with enough context to tell which rule
//! fired. The detector never fails.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::settings::DetectorSettings;

/// Characters logged either side of a matched phrase.
const SNIPPET_RADIUS: usize = 200;

/// Characters logged from the start of undersized content.
const PREVIEW_LEN: usize = 500;

// ============================================================================
// Block Signature
// ============================================================================

/// A phrase that marks content as a block page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSignature {
    /// Case-sensitive phrase searched for in the content.
    pub pattern: String,
    /// What the phrase usually means, for logs.
    pub explanation: String,
}

impl BlockSignature {
    /// Creates a signature.
    pub fn new(pattern: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            explanation: explanation.into(),
        }
    }

    /// The built-in signature table.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "may take a few seconds",
                "Page may be temporarily unavailable",
            ),
            Self::new(
                "you have been blocked",
                "Access has been explicitly blocked",
            ),
            Self::new("This site can\u{2019}t be reached", "Generic network error"),
            Self::new(
                "ERR_TOO_MANY_RETRIES",
                "Too many retries, possibly due to rate limiting",
            ),
        ]
    }
}

// ============================================================================
// Block Verdict
// ============================================================================

/// Outcome of inspecting one piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockVerdict {
    /// Content looks like a real page.
    Clean,
    /// A known phrase was found.
    Signature {
        /// The matched phrase.
        pattern: String,
        /// Its explanation.
        explanation: String,
        /// Surrounding text, newlines flattened.
        snippet: String,
    },
    /// Content is shorter than the threshold.
    TooSmall {
        /// Actual length in characters.
        size: usize,
        /// Required minimum.
        min: usize,
        /// Leading part of the content, newlines flattened.
        preview: String,
    },
}

impl BlockVerdict {
    /// Returns true for any verdict other than [`BlockVerdict::Clean`].
    pub fn is_blocked(&self) -> bool {
        !matches!(self, Self::Clean)
    }
}

impl fmt::Display for BlockVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => f.write_str("clean"),
            Self::Signature {
                pattern,
                explanation,
                ..
            } => write!(f, "matched '{pattern}' ({explanation})"),
            Self::TooSmall { size, min, .. } => {
                write!(f, "content too small ({size} < {min} chars)")
            }
        }
    }
}

// ============================================================================
// Block Detector
// ============================================================================

/// Decides whether fetched content is a block page.
#[derive(Debug, Clone)]
pub struct BlockDetector {
    signatures: Vec<BlockSignature>,
    min_content_len: usize,
}

impl BlockDetector {
    /// Creates a detector with the built-in signatures and a 2000-char minimum.
    pub fn new() -> Self {
        Self::from_settings(&DetectorSettings::default())
    }

    /// Creates a detector from settings.
    pub fn from_settings(settings: &DetectorSettings) -> Self {
        Self {
            signatures: settings.signatures.clone(),
            min_content_len: settings.min_content_len,
        }
    }

    /// Overrides the size threshold. Zero disables the size check.
    #[must_use]
    pub fn with_min_content_len(mut self, min: usize) -> Self {
        self.min_content_len = min;
        self
    }

    /// The size threshold in characters.
    pub fn min_content_len(&self) -> usize {
        self.min_content_len
    }

    /// Returns true if `content` looks blocked.
    pub fn is_blocked(&self, content: &str) -> bool {
        self.inspect(content).is_blocked()
    }

    /// Judges `content` and logs the evidence for a positive verdict.
    pub fn inspect(&self, content: &str) -> BlockVerdict {
        for signature in &self.signatures {
            if signature.pattern.is_empty() {
                continue;
            }
            if let Some(index) = content.find(&signature.pattern) {
                let snippet = context_snippet(content, index, signature.pattern.len());
                warn!(
                    pattern = %signature.pattern,
                    explanation = %signature.explanation,
                    snippet = %snippet,
                    "Detected blocking pattern in content"
                );
                return BlockVerdict::Signature {
                    pattern: signature.pattern.clone(),
                    explanation: signature.explanation.clone(),
                    snippet,
                };
            }
        }

        let size = content.chars().count();
        if size < self.min_content_len {
            let preview = flatten(&content.chars().take(PREVIEW_LEN).collect::<String>());
            warn!(
                size,
                min = self.min_content_len,
                preview = %preview,
                "Content too small, possible block or error page"
            );
            return BlockVerdict::TooSmall {
                size,
                min: self.min_content_len,
                preview,
            };
        }

        BlockVerdict::Clean
    }
}

impl Default for BlockDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Up to [`SNIPPET_RADIUS`] characters either side of a match, on char
/// boundaries.
fn context_snippet(content: &str, index: usize, match_len: usize) -> String {
    let start = content[..index]
        .char_indices()
        .rev()
        .take(SNIPPET_RADIUS)
        .last()
        .map_or(index, |(i, _)| i);

    let after = index + match_len;
    let end = content[after..]
        .char_indices()
        .nth(SNIPPET_RADIUS)
        .map_or(content.len(), |(i, _)| after + i);

    flatten(&content[start..end])
}

fn flatten(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}
