//! Classification of the failure recorded by the last sync attempt.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::assertion::{SyncError, SyncErrorPayload};
use crate::config::{ReconcilerConfig, DEFAULT_NOT_FOUND_CODE, DEFAULT_SCOPE_REVOCATION_MARKER};

/// Closed set of failure categories the reconciler distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorClass {
    /// No failure recorded.
    None,
    /// The registry no longer has the user's record.
    NotFound,
    /// The access token's scope no longer covers the write.
    InvalidScope,
    /// Anything else, including payloads that could not be parsed.
    Other,
}

impl std::fmt::Display for SyncErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncErrorClass::None => write!(f, "none"),
            SyncErrorClass::NotFound => write!(f, "not_found"),
            SyncErrorClass::InvalidScope => write!(f, "invalid_scope"),
            SyncErrorClass::Other => write!(f, "other"),
        }
    }
}

/// Maps a recorded error onto a [`SyncErrorClass`]. Never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncErrorClassifier {
    not_found_code: i64,
    scope_revocation_marker: String,
}

impl Default for SyncErrorClassifier {
    fn default() -> Self {
        Self {
            not_found_code: DEFAULT_NOT_FOUND_CODE,
            scope_revocation_marker: DEFAULT_SCOPE_REVOCATION_MARKER.to_string(),
        }
    }
}

impl SyncErrorClassifier {
    pub fn from_config(config: &ReconcilerConfig) -> Self {
        Self {
            not_found_code: config.not_found_code,
            scope_revocation_marker: config.scope_revocation_marker.clone(),
        }
    }

    /// Classify the payload recorded on an assertion, if any.
    ///
    /// Raw payloads that do not parse degrade to [`SyncErrorClass::Other`].
    pub fn classify(&self, payload: Option<&SyncErrorPayload>) -> SyncErrorClass {
        let Some(payload) = payload else {
            return SyncErrorClass::None;
        };

        match payload.decode() {
            Ok(error) => self.classify_error(&error),
            Err(e) => {
                warn!(error = %e, "unparseable sync error payload, classifying as other");
                SyncErrorClass::Other
            }
        }
    }

    /// Classify an already decoded error. The not-found code is checked before
    /// the scope marker.
    pub fn classify_error(&self, error: &SyncError) -> SyncErrorClass {
        if error.code == self.not_found_code {
            SyncErrorClass::NotFound
        } else if error.message.contains(self.scope_revocation_marker.as_str()) {
            SyncErrorClass::InvalidScope
        } else {
            SyncErrorClass::Other
        }
    }
}
