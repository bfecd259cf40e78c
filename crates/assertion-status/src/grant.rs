//! Access grants and authorization resolution.
//!
//! A grant is the user's permission for a member to write to their registry
//! record. It can be declined before a token is ever issued (`denied_at`) or
//! withdrawn after issuance (`revoked_at`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MissingGrantPolicy;
use crate::error::{StatusError, StatusResult};
use crate::ids::MemberId;

/// One authorization token tied to a member.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub member_id: MemberId,

    /// Opaque token material. Never read by the classifier.
    pub credential: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denied_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

// Keeps the credential out of logs and panic messages.
impl std::fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGrant")
            .field("member_id", &self.member_id)
            .field("credential", &"<redacted>")
            .field("denied_at", &self.denied_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

impl AccessGrant {
    /// An approved grant: neither denied nor revoked.
    pub fn approved(member_id: impl Into<MemberId>, credential: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            credential: credential.into(),
            denied_at: None,
            revoked_at: None,
        }
    }

    pub fn denied(
        member_id: impl Into<MemberId>,
        credential: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            denied_at: Some(at),
            ..Self::approved(member_id, credential)
        }
    }

    pub fn revoked(
        member_id: impl Into<MemberId>,
        credential: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            revoked_at: Some(at),
            ..Self::approved(member_id, credential)
        }
    }

    /// Authorization state recorded on this grant.
    pub fn state(&self) -> AuthorizationState {
        if self.denied_at.is_some() {
            AuthorizationState::Denied
        } else if self.revoked_at.is_some() {
            AuthorizationState::Revoked
        } else {
            AuthorizationState::Approved
        }
    }

    /// Denial happens before any token exists; revocation after. Never both.
    pub fn check_invariants(&self) -> StatusResult<()> {
        if self.denied_at.is_some() && self.revoked_at.is_some() {
            return Err(StatusError::invariant(
                "denied-xor-revoked",
                format!("grant for member {} is both denied and revoked", self.member_id),
            ));
        }
        Ok(())
    }
}

/// Current authorization state of a member's grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationState {
    Approved,
    Denied,
    Revoked,
}

impl std::fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorizationState::Approved => write!(f, "approved"),
            AuthorizationState::Denied => write!(f, "denied"),
            AuthorizationState::Revoked => write!(f, "revoked"),
        }
    }
}

/// Resolves the authorization state for a member from the grants supplied by
/// the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorizationResolver {
    missing_grant: MissingGrantPolicy,
}

impl AuthorizationResolver {
    pub fn new(missing_grant: MissingGrantPolicy) -> Self {
        Self { missing_grant }
    }

    /// Find the first grant held for `member_id`.
    pub fn find<'a>(grants: &'a [AccessGrant], member_id: &MemberId) -> Option<&'a AccessGrant> {
        grants.iter().find(|grant| &grant.member_id == member_id)
    }

    /// Decide Approved / Denied / Revoked. Total over all inputs.
    pub fn resolve(&self, grants: &[AccessGrant], member_id: &MemberId) -> AuthorizationState {
        match Self::find(grants, member_id) {
            Some(grant) => grant.state(),
            None => self.missing_grant.as_state(),
        }
    }
}
