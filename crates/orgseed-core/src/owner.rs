//! Weighted owner selection with scope restrictions and per-run quotas.

use std::collections::HashMap;

use rand::Rng;

use crate::error::EngineError;
use crate::weighted::{WeightedEntry, sample_index};

/// A user that may own a generated task.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerCandidate {
    /// Identity token; quotas are keyed by it.
    pub user_id: String,
    /// Secondary reference written onto records (the user's contact), if any.
    pub contact_id: Option<String>,
    /// When set, the candidate is only eligible inside this scope (an account id).
    pub scope: Option<String>,
    pub weight: f64,
}

impl OwnerCandidate {
    pub fn new(user_id: impl Into<String>, weight: f64) -> Self {
        Self {
            user_id: user_id.into(),
            contact_id: None,
            scope: None,
            weight,
        }
    }

    pub fn with_contact(mut self, contact_id: impl Into<String>) -> Self {
        self.contact_id = Some(contact_id.into());
        self
    }

    pub fn restricted_to(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// True when the candidate carries no restriction or is restricted to `scope`.
    pub fn in_scope(&self, scope: &str) -> bool {
        self.scope.as_deref().is_none_or(|restricted| restricted == scope)
    }
}

/// Remaining pick budgets, keyed by candidate identity.
///
/// Candidates without an entry are unlimited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaLedger {
    remaining: HashMap<String, u32>,
}

impl QuotaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, user_id: impl Into<String>, picks: u32) -> Self {
        self.set(user_id, picks);
        self
    }

    pub fn set(&mut self, user_id: impl Into<String>, picks: u32) {
        self.remaining.insert(user_id.into(), picks);
    }

    /// `None` when the candidate has no quota.
    pub fn remaining(&self, user_id: &str) -> Option<u32> {
        self.remaining.get(user_id).copied()
    }

    pub fn has_capacity(&self, user_id: &str) -> bool {
        self.remaining(user_id).is_none_or(|left| left > 0)
    }

    /// Records one pick. Saturates at zero.
    pub fn consume(&mut self, user_id: &str) {
        if let Some(left) = self.remaining.get_mut(user_id) {
            *left = left.saturating_sub(1);
        }
    }
}

/// Chooses task owners from an always-eligible candidate plus optional ones.
#[derive(Debug, Default)]
pub struct OwnerSelector;

impl OwnerSelector {
    /// Picks an owner for a task in `scope`.
    ///
    /// `always` is eligible regardless of scope or quota. Each optional candidate is eligible when it
    /// is in scope and has quota left. The chosen candidate's quota, if any, is decremented by one.
    pub fn select<'a, R: Rng + ?Sized>(
        scope: &str,
        always: &'a OwnerCandidate,
        optional: &'a [OwnerCandidate],
        quotas: &mut QuotaLedger,
        rng: &mut R,
    ) -> Result<&'a OwnerCandidate, EngineError> {
        for candidate in std::iter::once(always).chain(optional) {
            if !(candidate.weight.is_finite() && candidate.weight > 0.0) {
                return Err(EngineError::invalid(format!(
                    "candidate {} has weight {} (must be positive)",
                    candidate.user_id, candidate.weight
                )));
            }
        }

        let mut entries = Vec::with_capacity(optional.len() + 1);
        entries.push(WeightedEntry::new(always, always.weight, true));
        for candidate in optional {
            let eligible = candidate.in_scope(scope) && quotas.has_capacity(&candidate.user_id);
            entries.push(WeightedEntry::new(candidate, candidate.weight, eligible));
        }

        let chosen = entries[sample_index(&entries, rng)?].item;
        quotas.consume(&chosen.user_id);
        Ok(chosen)
    }
}

/// The run-long owner roster: candidates plus the quota ledger they draw against.
#[derive(Debug, Clone)]
pub struct OwnerRoster {
    pub always: OwnerCandidate,
    pub optional: Vec<OwnerCandidate>,
    pub quotas: QuotaLedger,
}

impl OwnerRoster {
    pub fn new(always: OwnerCandidate) -> Self {
        Self {
            always,
            optional: Vec::new(),
            quotas: QuotaLedger::new(),
        }
    }

    pub fn push(&mut self, candidate: OwnerCandidate, quota: Option<u32>) {
        if let Some(picks) = quota {
            self.quotas.set(candidate.user_id.clone(), picks);
        }
        self.optional.push(candidate);
    }

    pub fn pick<R: Rng + ?Sized>(
        &mut self,
        scope: &str,
        rng: &mut R,
    ) -> Result<&OwnerCandidate, EngineError> {
        OwnerSelector::select(scope, &self.always, &self.optional, &mut self.quotas, rng)
    }
}
