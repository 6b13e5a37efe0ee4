//! Criteria registry and evaluation sweep.
//!
//! Criterion identifiers are opaque keys; each definition carries display
//! metadata (for operator listings) and one fact predicate. The registry
//! owns the whole predicate-evaluation cadence: the lifecycle manager only
//! accepts the resulting verdicts, and rejects them when the contract is
//! no longer Active.

use std::collections::BTreeMap;

use covenant_model::{FactPredicate, PredicateOp};

use crate::lifecycle::LifecycleManager;

#[derive(Debug, Clone)]
pub struct CriterionDef {
    pub criterion_id: String,
    pub display_name: String,
    pub description: String,
    pub predicate: FactPredicate,
}

/// Minimal fact surface the registry evaluates against. Facts are plain
/// keyed integers; missing keys read as 0.
#[derive(Debug, Clone, Default)]
pub struct FactView {
    facts: BTreeMap<String, i64>,
}

impl FactView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: i64) {
        self.facts.insert(key.into(), value);
    }

    pub fn fact(&self, key: &str) -> i64 {
        self.facts.get(key).copied().unwrap_or(0)
    }
}

/// Counts of verdicts applied by one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    pub breached: u32,
    pub finalized: u32,
}

#[derive(Debug, Default)]
pub struct CriteriaRegistry {
    by_id: BTreeMap<String, CriterionDef>,
}

impl CriteriaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a criterion definition. Panics on duplicate criterion_id.
    pub fn register(&mut self, def: CriterionDef) {
        assert!(
            !self.by_id.contains_key(&def.criterion_id),
            "duplicate criterion_id: {}",
            def.criterion_id
        );
        self.by_id.insert(def.criterion_id.clone(), def);
    }

    pub fn get(&self, criterion_id: &str) -> Option<&CriterionDef> {
        self.by_id.get(criterion_id)
    }

    /// Human-readable description for a criterion identifier, if the
    /// identifier resolves. Listings skip unresolvable identifiers.
    pub fn display(&self, criterion_id: &str) -> Option<&str> {
        self.by_id
            .get(criterion_id)
            .map(|def| def.description.as_str())
    }

    /// Whether the identified criterion is satisfied against the facts.
    /// Unknown identifiers are never satisfied.
    pub fn evaluate(&self, criterion_id: &str, facts: &FactView) -> bool {
        let Some(def) = self.by_id.get(criterion_id) else {
            return false;
        };
        let actual = facts.fact(&def.predicate.fact_key);
        match def.predicate.operator {
            PredicateOp::Eq => actual == def.predicate.value,
            PredicateOp::Neq => actual != def.predicate.value,
            PredicateOp::Gt => actual > def.predicate.value,
            PredicateOp::Gte => actual >= def.predicate.value,
            PredicateOp::Lt => actual < def.predicate.value,
            PredicateOp::Lte => actual <= def.predicate.value,
        }
    }

    /// One evaluation pass over every contract. For each contract the
    /// breaching criteria are checked first, in binding order, then the
    /// finalizing criteria; each satisfied set hands its verdict to the
    /// manager. A verdict rejected because the contract is no longer
    /// Active (resolved earlier in this same pass, or never activated) is
    /// routine and is not retried.
    pub fn sweep(&self, manager: &mut LifecycleManager, facts: &FactView) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();
        for handle in manager.handles() {
            let Some(record) = manager.record(handle) else {
                continue;
            };
            let binding = record.criteria.clone();

            if binding
                .breaching
                .iter()
                .any(|criterion_id| self.evaluate(criterion_id, facts))
                && manager.breach(handle).unwrap_or(false)
            {
                outcome.breached += 1;
            }
            if binding
                .finalizing
                .iter()
                .any(|criterion_id| self.evaluate(criterion_id, facts))
                && manager.finalize(handle).unwrap_or(false)
            {
                outcome.finalized += 1;
            }
        }
        outcome
    }
}

// ---- helpers to build criterion definitions concisely ----

fn criterion(
    id: &str,
    display: &str,
    description: &str,
    fact_key: &str,
    operator: PredicateOp,
    value: i64,
) -> CriterionDef {
    CriterionDef {
        criterion_id: id.to_string(),
        display_name: display.to_string(),
        description: description.to_string(),
        predicate: FactPredicate {
            fact_key: fact_key.to_string(),
            operator,
            value,
        },
    }
}

/// Default registry covering the shipped contract presets.
pub fn default_registry() -> CriteriaRegistry {
    let mut registry = CriteriaRegistry::new();

    registry.register(criterion(
        "basic-term-elapsed",
        "Term Elapsed",
        "The agreed contract term has run out",
        "term_days_remaining",
        PredicateOp::Lte,
        0,
    ));
    registry.register(criterion(
        "basic-oath-broken",
        "Oath Broken",
        "The contractor violated the sworn terms",
        "oath_violations",
        PredicateOp::Gt,
        0,
    ));
    registry.register(criterion(
        "escort-arrived",
        "Charge Arrived",
        "The escorted charge reached the destination",
        "charge_at_destination",
        PredicateOp::Gte,
        1,
    ));
    registry.register(criterion(
        "escort-charge-lost",
        "Charge Lost",
        "The escorted charge died en route",
        "charge_health",
        PredicateOp::Lte,
        0,
    ));
    registry.register(criterion(
        "delivery-received",
        "Delivery Received",
        "All promised crates were delivered",
        "crates_delivered",
        PredicateOp::Gte,
        3,
    ));
    registry.register(criterion(
        "delivery-window-expired",
        "Window Expired",
        "The delivery window closed before completion",
        "delivery_ticks_remaining",
        PredicateOp::Lte,
        0,
    ));
    registry.register(criterion(
        "bounty-mark-slain",
        "Mark Slain",
        "The bounty mark was brought down",
        "mark_health",
        PredicateOp::Lte,
        0,
    ));
    registry.register(criterion(
        "bounty-mark-escaped",
        "Mark Escaped",
        "The bounty mark left the region",
        "mark_escaped",
        PredicateOp::Gte,
        1,
    ));

    registry
}
