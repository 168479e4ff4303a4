//! Recognition transcript types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transcript produced by the speech adapter.
///
/// Partial transcripts arrive continuously while the user speaks
/// (`is_final = false`); only final transcripts with non-empty text are
/// dispatched to a mode handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Recognized text
    pub text: String,
    /// Whether this is the final result for the utterance
    pub is_final: bool,
    /// When the result was produced
    pub timestamp: DateTime<Utc>,
}

impl Transcript {
    /// Create a partial (interim) transcript
    pub fn partial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            timestamp: Utc::now(),
        }
    }

    /// Create a final transcript
    pub fn fin(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            timestamp: Utc::now(),
        }
    }

    /// Whether the transcript carries any usable text
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
