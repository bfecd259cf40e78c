//! Local assertion records and the sync bookkeeping attached to them.
//!
//! An [`Assertion`] is one affiliation a member organization has claimed about
//! a user. Its optional milestone fields are written by the sync engine after
//! each registry call; `modified` is bumped by local edits. Nothing in this
//! crate mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{StatusError, StatusResult};
use crate::ids::{ExternalRef, MemberId};

/// Structured failure captured from a registry call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncError {
    /// HTTP-style status code returned by the registry.
    pub code: i64,
    /// Error text as returned by the registry.
    #[serde(default)]
    pub message: String,
}

/// Error document shape persisted by the sync engine,
/// e.g. `{"statusCode": 404, "error": "Not Found"}`.
#[derive(Deserialize)]
struct StoredErrorDocument {
    #[serde(rename = "statusCode")]
    status_code: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Integer status code from a JSON number or numeric string.
/// `404`, `404.0` and `"404"` are accepted; fractional codes are not.
fn status_code_from(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_f64))
        }
        _ => None,
    }
}

fn integral_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

impl SyncError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parse the JSON error document the sync engine stores alongside an
    /// assertion.
    pub fn parse(raw: &str) -> StatusResult<Self> {
        let doc: StoredErrorDocument = serde_json::from_str(raw)
            .map_err(|e| StatusError::MalformedSyncError(e.to_string()))?;
        let code = status_code_from(&doc.status_code).ok_or_else(|| {
            StatusError::MalformedSyncError(format!("invalid statusCode: {}", doc.status_code))
        })?;
        Ok(Self {
            code,
            message: doc.error.unwrap_or_default(),
        })
    }
}

/// The recorded error as it reaches the classifier: either already decoded,
/// or the raw text the sync engine persisted.
///
/// Deserialization never fails on the error value itself: strings stay raw,
/// `{code, message}` objects are structured, and any other JSON value is kept
/// as its raw text for the classifier to judge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SyncErrorPayload {
    Structured(SyncError),
    Raw(String),
}

impl<'de> Deserialize<'de> for SyncErrorPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(raw) => Self::Raw(raw),
            other => match SyncError::deserialize(&other) {
                Ok(error) => Self::Structured(error),
                Err(_) => Self::Raw(other.to_string()),
            },
        })
    }
}

impl SyncErrorPayload {
    /// Decode into a [`SyncError`], parsing raw text if needed.
    pub fn decode(&self) -> StatusResult<SyncError> {
        match self {
            Self::Structured(err) => Ok(err.clone()),
            Self::Raw(raw) => SyncError::parse(raw),
        }
    }
}

impl From<SyncError> for SyncErrorPayload {
    fn from(err: SyncError) -> Self {
        Self::Structured(err)
    }
}

/// Local record of one institutional affiliation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    /// Owning member organization.
    pub member_id: MemberId,

    /// Last local edit time.
    pub modified: DateTime<Utc>,

    /// Most recent attempted write to the registry; `None` if never attempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_attempt: Option<DateTime<Utc>>,

    /// Failure captured from that attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<SyncErrorPayload>,

    /// First successful creation in the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,

    /// Most recent successful update in the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Time the record was observed deleted from the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Registry handle, set once `added_at` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<ExternalRef>,
}

impl Assertion {
    /// A freshly created assertion: never synced, nothing recorded.
    pub fn new(member_id: impl Into<MemberId>, modified: DateTime<Utc>) -> Self {
        Self {
            member_id: member_id.into(),
            modified,
            last_sync_attempt: None,
            last_error: None,
            added_at: None,
            updated_at: None,
            deleted_at: None,
            external_ref: None,
        }
    }

    pub fn with_modified(mut self, modified: DateTime<Utc>) -> Self {
        self.modified = modified;
        self
    }

    pub fn with_last_sync_attempt(mut self, at: DateTime<Utc>) -> Self {
        self.last_sync_attempt = Some(at);
        self
    }

    pub fn with_last_error(mut self, error: impl Into<SyncErrorPayload>) -> Self {
        self.last_error = Some(error.into());
        self
    }

    /// Record the raw error text as the sync engine would have stored it.
    pub fn with_raw_error(mut self, raw: impl Into<String>) -> Self {
        self.last_error = Some(SyncErrorPayload::Raw(raw.into()));
        self
    }

    pub fn with_added_at(mut self, at: DateTime<Utc>) -> Self {
        self.added_at = Some(at);
        self
    }

    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    pub fn with_deleted_at(mut self, at: DateTime<Utc>) -> Self {
        self.deleted_at = Some(at);
        self
    }

    pub fn with_external_ref(mut self, put_code: impl Into<ExternalRef>) -> Self {
        self.external_ref = Some(put_code.into());
        self
    }

    /// Whether the local copy was edited after the last sync attempt.
    ///
    /// An assertion with no recorded attempt counts as edited.
    pub fn edited_since_last_attempt(&self) -> bool {
        match self.last_sync_attempt {
            Some(attempt) => self.modified > attempt,
            None => true,
        }
    }

    /// Check the bookkeeping invariants the sync engine must uphold.
    ///
    /// The classifier does not rely on this; it stays total for snapshots
    /// that fail it.
    pub fn check_invariants(&self) -> StatusResult<()> {
        if self.last_sync_attempt.is_none() {
            if self.last_error.is_some() {
                return Err(StatusError::invariant(
                    "error-has-attempt",
                    "last_error recorded without a last_sync_attempt",
                ));
            }
            if self.added_at.is_some() {
                return Err(StatusError::invariant(
                    "added-has-attempt",
                    "added_at set without a last_sync_attempt",
                ));
            }
        }

        if self.deleted_at.is_some() && self.added_at.is_none() {
            return Err(StatusError::invariant(
                "deleted-after-added",
                "deleted_at set for a record that was never added",
            ));
        }

        Ok(())
    }
}
