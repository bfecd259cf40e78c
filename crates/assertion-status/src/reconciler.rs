//! Status reconciliation.
//!
//! [`StatusReconciler::classify`] turns an assertion snapshot and the grants
//! held for its member into one [`AssertionStatus`]. Rules are checked in a
//! fixed order and the first match wins:
//!
//! 1. A denied grant yields `UserDeniedAccess` regardless of sync history.
//! 2. With a recorded failure: a local edit after the attempt makes the
//!    failure stale (`PendingRetry`); otherwise the failure category decides
//!    between `UserDeletedFromRegistry`, `UserRevokedAccess`, `ErrorAdding`
//!    and `ErrorUpdating`.
//! 3. Without a failure: a revoked grant yields `UserRevokedAccess`, then
//!    `Pending`, `DeletedInRegistry`, `PendingRetry` and `InRegistry` follow
//!    from the milestone fields.
//!
//! No state is kept between calls.

use tracing::debug;

use crate::assertion::Assertion;
use crate::config::ReconcilerConfig;
use crate::error::StatusResult;
use crate::grant::{AccessGrant, AuthorizationResolver, AuthorizationState};
use crate::status::AssertionStatus;
use crate::sync_error::{SyncErrorClass, SyncErrorClassifier};

/// Combines authorization and sync-error signals into an [`AssertionStatus`].
#[derive(Debug, Clone, Default)]
pub struct StatusReconciler {
    resolver: AuthorizationResolver,
    errors: SyncErrorClassifier,
}

impl StatusReconciler {
    pub fn new(config: ReconcilerConfig) -> StatusResult<Self> {
        config.validate()?;
        Ok(Self {
            resolver: AuthorizationResolver::new(config.missing_grant),
            errors: SyncErrorClassifier::from_config(&config),
        })
    }

    /// Classify one assertion. Pure and total.
    pub fn classify(&self, assertion: &Assertion, grants: &[AccessGrant]) -> AssertionStatus {
        let auth = self.resolver.resolve(grants, &assertion.member_id);
        let error_class = match auth {
            AuthorizationState::Denied => SyncErrorClass::None,
            _ => self.errors.classify(assertion.last_error.as_ref()),
        };

        let status = Self::reconcile(assertion, auth, error_class);
        debug!(
            member_id = %assertion.member_id,
            auth = %auth,
            error_class = %error_class,
            status = status.name(),
            "classified assertion"
        );
        status
    }

    fn reconcile(
        assertion: &Assertion,
        auth: AuthorizationState,
        error_class: SyncErrorClass,
    ) -> AssertionStatus {
        if auth == AuthorizationState::Denied {
            return AssertionStatus::UserDeniedAccess;
        }

        match error_class {
            SyncErrorClass::None => Self::reconcile_clean(assertion, auth),
            _ if assertion.edited_since_last_attempt() => AssertionStatus::PendingRetry,
            SyncErrorClass::NotFound => AssertionStatus::UserDeletedFromRegistry,
            SyncErrorClass::InvalidScope => AssertionStatus::UserRevokedAccess,
            SyncErrorClass::Other if assertion.added_at.is_none() => AssertionStatus::ErrorAdding,
            SyncErrorClass::Other => AssertionStatus::ErrorUpdating,
        }
    }

    /// No failure on record.
    fn reconcile_clean(assertion: &Assertion, auth: AuthorizationState) -> AssertionStatus {
        if auth == AuthorizationState::Revoked {
            AssertionStatus::UserRevokedAccess
        } else if assertion.added_at.is_none() {
            AssertionStatus::Pending
        } else if assertion.deleted_at.is_some() {
            AssertionStatus::DeletedInRegistry
        } else if assertion.edited_since_last_attempt() {
            AssertionStatus::PendingRetry
        } else {
            AssertionStatus::InRegistry
        }
    }
}

/// Classify with the default configuration.
pub fn classify(assertion: &Assertion, grants: &[AccessGrant]) -> AssertionStatus {
    StatusReconciler::default().classify(assertion, grants)
}
