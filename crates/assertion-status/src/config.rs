//! Reconciler configuration

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StatusError, StatusResult};
use crate::grant::AuthorizationState;

/// Registry status code reported when the user's record no longer exists.
pub const DEFAULT_NOT_FOUND_CODE: i64 = 404;

/// Error text the registry returns once a token's scope no longer covers
/// the requested write.
pub const DEFAULT_SCOPE_REVOCATION_MARKER: &str = "invalid_scope";

/// Outcome assumed when no access grant matches the assertion's member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingGrantPolicy {
    /// No authorization problem is known locally.
    #[default]
    Approved,
    Denied,
    Revoked,
}

impl MissingGrantPolicy {
    pub fn as_state(self) -> AuthorizationState {
        match self {
            Self::Approved => AuthorizationState::Approved,
            Self::Denied => AuthorizationState::Denied,
            Self::Revoked => AuthorizationState::Revoked,
        }
    }
}

/// Configuration for [`StatusReconciler`](crate::StatusReconciler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Status code classified as "record deleted by the user".
    pub not_found_code: i64,

    /// Case-sensitive substring marking a scope revocation.
    pub scope_revocation_marker: String,

    /// What to assume when the member holds no matching grant.
    pub missing_grant: MissingGrantPolicy,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            not_found_code: DEFAULT_NOT_FOUND_CODE,
            scope_revocation_marker: DEFAULT_SCOPE_REVOCATION_MARKER.to_string(),
            missing_grant: MissingGrantPolicy::default(),
        }
    }
}

impl ReconcilerConfig {
    /// Load configuration from a TOML file.
    ///
    /// Falls back to the defaults when no path is given or the file does not
    /// exist.
    pub fn load(path: Option<&Path>) -> StatusResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        info!(path = %path.display(), "loaded reconciler configuration");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(contents: &str) -> StatusResult<Self> {
        let config: ReconcilerConfig =
            toml::from_str(contents).map_err(|e| StatusError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StatusResult<()> {
        if self.scope_revocation_marker.trim().is_empty() {
            return Err(StatusError::Config(
                "scope_revocation_marker must not be empty".into(),
            ));
        }
        Ok(())
    }
}
