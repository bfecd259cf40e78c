//! The nine reconciliation statuses.

use serde::{Deserialize, Serialize};

use crate::error::{StatusError, StatusResult};

/// Relationship between a local assertion and its registry counterpart.
///
/// Serialized by name (`"PENDING_RETRY"`); [`code`](Self::code) gives a
/// stable small integer for compact storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssertionStatus {
    /// The user declined to authorize the member.
    UserDeniedAccess,
    /// The user withdrew a previously issued authorization.
    UserRevokedAccess,
    /// Never synced, no failure recorded.
    Pending,
    /// Edited locally since the last attempt; the next sync will pick it up.
    PendingRetry,
    /// The very first write attempt failed.
    ErrorAdding,
    /// A later write failed after at least one success.
    ErrorUpdating,
    /// The record was removed from the registry.
    DeletedInRegistry,
    /// The user's registry record no longer exists.
    UserDeletedFromRegistry,
    /// The registry holds the current local version.
    InRegistry,
}

impl AssertionStatus {
    /// All statuses in code order.
    pub const ALL: [AssertionStatus; 9] = [
        AssertionStatus::UserDeniedAccess,
        AssertionStatus::UserRevokedAccess,
        AssertionStatus::Pending,
        AssertionStatus::PendingRetry,
        AssertionStatus::ErrorAdding,
        AssertionStatus::ErrorUpdating,
        AssertionStatus::DeletedInRegistry,
        AssertionStatus::UserDeletedFromRegistry,
        AssertionStatus::InRegistry,
    ];

    pub fn code(self) -> u8 {
        match self {
            AssertionStatus::UserDeniedAccess => 1,
            AssertionStatus::UserRevokedAccess => 2,
            AssertionStatus::Pending => 3,
            AssertionStatus::PendingRetry => 4,
            AssertionStatus::ErrorAdding => 5,
            AssertionStatus::ErrorUpdating => 6,
            AssertionStatus::DeletedInRegistry => 7,
            AssertionStatus::UserDeletedFromRegistry => 8,
            AssertionStatus::InRegistry => 9,
        }
    }

    pub fn from_code(code: u8) -> StatusResult<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(StatusError::UnknownStatusCode(code))
    }

    /// Stable serialized name.
    pub fn name(self) -> &'static str {
        match self {
            AssertionStatus::UserDeniedAccess => "USER_DENIED_ACCESS",
            AssertionStatus::UserRevokedAccess => "USER_REVOKED_ACCESS",
            AssertionStatus::Pending => "PENDING",
            AssertionStatus::PendingRetry => "PENDING_RETRY",
            AssertionStatus::ErrorAdding => "ERROR_ADDING",
            AssertionStatus::ErrorUpdating => "ERROR_UPDATING",
            AssertionStatus::DeletedInRegistry => "DELETED_IN_REGISTRY",
            AssertionStatus::UserDeletedFromRegistry => "USER_DELETED_FROM_REGISTRY",
            AssertionStatus::InRegistry => "IN_REGISTRY",
        }
    }

    /// Human-readable label shown to member administrators.
    pub fn label(self) -> &'static str {
        match self {
            AssertionStatus::UserDeniedAccess => "User denied access",
            AssertionStatus::UserRevokedAccess => "User revoked access",
            AssertionStatus::Pending => "Pending",
            AssertionStatus::PendingRetry => "Pending retry in ORCID",
            AssertionStatus::ErrorAdding => "Error adding to ORCID",
            AssertionStatus::ErrorUpdating => "Error updating in ORCID",
            AssertionStatus::DeletedInRegistry => "Deleted in ORCID",
            AssertionStatus::UserDeletedFromRegistry => "User deleted from ORCID",
            AssertionStatus::InRegistry => "In ORCID",
        }
    }

    /// A registry write failed and the failure is still current.
    pub fn is_error(self) -> bool {
        matches!(self, Self::ErrorAdding | Self::ErrorUpdating)
    }

    /// Only the user can unblock this assertion.
    pub fn needs_user_action(self) -> bool {
        matches!(
            self,
            Self::UserDeniedAccess | Self::UserRevokedAccess | Self::UserDeletedFromRegistry
        )
    }

    pub fn is_in_registry(self) -> bool {
        matches!(self, Self::InRegistry)
    }
}

impl std::fmt::Display for AssertionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for AssertionStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.name() == s)
            .ok_or_else(|| StatusError::UnknownStatus(s.to_string()))
    }
}
