//! # assertion-status
//!
//! Reconciliation status for affiliation assertions mirrored to the ORCID
//! registry.
//!
//! A member organization asserts affiliations about its users; a separate
//! sync engine writes them to the registry and records what happened. This
//! crate reads that bookkeeping, together with the user's access grant, and
//! answers one question per assertion: where does it stand?
//!
//! ## Components
//!
//! - [`AuthorizationResolver`]: Approved / Denied / Revoked for a member's grant
//! - [`SyncErrorClassifier`]: closed failure category for the last recorded error
//! - [`StatusReconciler`]: ordered rules combining both into an [`AssertionStatus`]
//! - [`StatusReport`]: per-status tallies over a batch
//!
//! ## Example
//!
//! ```rust
//! use assertion_status::{classify, AccessGrant, Assertion, AssertionStatus, SyncError};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let grants = vec![AccessGrant::approved("member-1", "token")];
//!
//! let assertion = Assertion::new("member-1", now)
//!     .with_last_sync_attempt(now + Duration::seconds(50))
//!     .with_last_error(SyncError::new(404, "Not Found"));
//!
//! assert_eq!(
//!     classify(&assertion, &grants),
//!     AssertionStatus::UserDeletedFromRegistry
//! );
//! ```
//!
//! Classification performs no I/O, never fails and never mutates its inputs;
//! a [`StatusReconciler`] may be shared freely across threads.

#![deny(unsafe_code)]

pub mod assertion;
pub mod config;
pub mod error;
pub mod grant;
pub mod ids;
pub mod reconciler;
pub mod report;
pub mod status;
pub mod sync_error;

pub use assertion::{Assertion, SyncError, SyncErrorPayload};
pub use config::{MissingGrantPolicy, ReconcilerConfig};
pub use error::{StatusError, StatusResult};
pub use grant::{AccessGrant, AuthorizationResolver, AuthorizationState};
pub use ids::{ExternalRef, MemberId};
pub use reconciler::{classify, StatusReconciler};
pub use report::StatusReport;
pub use status::AssertionStatus;
pub use sync_error::{SyncErrorClass, SyncErrorClassifier};
