//! Signal — the single identity string correlating a strategy-issued order
//! with later host callbacks.
//!
//! The host exposes only one free-text identity field per order, so label
//! and comment travel concatenated with a reserved separator. Decoding the
//! field back distinguishes engine-issued orders from host-initiated ones
//! (protective exits, session closes), which never carry the separator.

use crate::orders::reconciler::ReconcileError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved separator between label and comment. Labels and comments
/// containing it are rejected at submission.
pub const SIGNAL_SEPARATOR: &str = "|#|";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    pub label: String,
    pub comment: String,
}

impl Signal {
    pub fn new(
        label: impl Into<String>,
        comment: impl Into<String>,
    ) -> Result<Self, ReconcileError> {
        let label = label.into();
        let comment = comment.into();
        if label.contains(SIGNAL_SEPARATOR) || comment.contains(SIGNAL_SEPARATOR) {
            return Err(ReconcileError::ReservedSeparator);
        }
        Ok(Self { label, comment })
    }

    /// Encode into the host's single identity field.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.label, SIGNAL_SEPARATOR, self.comment)
    }

    /// Parse a host identity field. `None` means the order is not ours.
    pub fn decode(field: &str) -> Option<Self> {
        field.split_once(SIGNAL_SEPARATOR).map(|(label, comment)| Self {
            label: label.to_string(),
            comment: comment.to_string(),
        })
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}
