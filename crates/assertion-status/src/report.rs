//! Per-status tallies over a batch of assertions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assertion::Assertion;
use crate::grant::AccessGrant;
use crate::reconciler::StatusReconciler;
use crate::status::AssertionStatus;

/// Summary of statuses across a set of assertions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    counts: BTreeMap<AssertionStatus, usize>,
    total: usize,
}

impl StatusReport {
    /// Classify every assertion against the same grant collection.
    pub fn build<'a, I>(reconciler: &StatusReconciler, assertions: I, grants: &[AccessGrant]) -> Self
    where
        I: IntoIterator<Item = &'a Assertion>,
    {
        let mut report = Self::default();
        for assertion in assertions {
            report.record(reconciler.classify(assertion, grants));
        }
        debug!(
            total = report.total,
            errors = report.error_count(),
            "built status report"
        );
        report
    }

    /// Add one classified status.
    pub fn record(&mut self, status: AssertionStatus) {
        *self.counts.entry(status).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn count(&self, status: AssertionStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn error_count(&self) -> usize {
        self.sum_where(AssertionStatus::is_error)
    }

    pub fn needs_user_action_count(&self) -> usize {
        self.sum_where(AssertionStatus::needs_user_action)
    }

    /// Non-zero counts in status code order.
    pub fn iter(&self) -> impl Iterator<Item = (AssertionStatus, usize)> + '_ {
        self.counts.iter().map(|(status, count)| (*status, *count))
    }

    fn sum_where(&self, pred: impl Fn(AssertionStatus) -> bool) -> usize {
        self.iter()
            .filter(|(status, _)| pred(*status))
            .map(|(_, count)| count)
            .sum()
    }
}
