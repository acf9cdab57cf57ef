// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Collaborator Interfaces
// ─────────────────────────────────────────────────────────────────────
//! Seams to the external collaborators: the sensitive-pattern detector,
//! the policy evaluator, and the reputation source.
//!
//! The real detector (regex engine) and policy engine live outside
//! this crate. Host processes plug in over these traits — either
//! directly or through the function-pointer `External*` adapters.

use arbiter_memory::{DomainReputation, MemoryStore};
use arbiter_types::{ArbiterResult, PatternCounters, PolicyVerdict};

/// Counts sensitive patterns in a piece of text.
///
/// Never fails for in-memory input.
pub trait PatternDetector: Send + Sync {
    fn scan(&self, text: &str) -> PatternCounters;
}

/// Detector returning fixed counters regardless of input.
///
/// Deterministic stand-in for hosts without a detector, and for tests.
pub struct StaticDetector(pub PatternCounters);

impl PatternDetector for StaticDetector {
    fn scan(&self, _text: &str) -> PatternCounters {
        self.0
    }
}

/// External pattern detector that calls a function pointer.
type ScanFn = Box<dyn Fn(&str) -> PatternCounters + Send + Sync>;

pub struct ExternalDetector {
    scan_fn: ScanFn,
}

impl ExternalDetector {
    pub fn new(scan_fn: impl Fn(&str) -> PatternCounters + Send + Sync + 'static) -> Self {
        Self {
            scan_fn: Box::new(scan_fn),
        }
    }
}

impl PatternDetector for ExternalDetector {
    fn scan(&self, text: &str) -> PatternCounters {
        (self.scan_fn)(text)
    }
}

/// Produces a structured verdict for (domain, pack, counters, features).
///
/// May fail with `PolicyUnavailable`; the normalizer substitutes an
/// empty allow verdict plus a low-strength suspicion and continues.
pub trait PolicyEvaluator: Send + Sync {
    fn evaluate(
        &self,
        domain: &str,
        pack: &str,
        counters: &PatternCounters,
        features: &serde_json::Value,
    ) -> ArbiterResult<PolicyVerdict>;
}

/// External policy evaluator that calls a function pointer.
type EvaluateFn = Box<
    dyn Fn(&str, &str, &PatternCounters, &serde_json::Value) -> ArbiterResult<PolicyVerdict>
        + Send
        + Sync,
>;

pub struct ExternalPolicy {
    evaluate_fn: EvaluateFn,
}

impl ExternalPolicy {
    pub fn new(
        evaluate_fn: impl Fn(&str, &str, &PatternCounters, &serde_json::Value) -> ArbiterResult<PolicyVerdict>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            evaluate_fn: Box::new(evaluate_fn),
        }
    }
}

impl PolicyEvaluator for ExternalPolicy {
    fn evaluate(
        &self,
        domain: &str,
        pack: &str,
        counters: &PatternCounters,
        features: &serde_json::Value,
    ) -> ArbiterResult<PolicyVerdict> {
        (self.evaluate_fn)(domain, pack, counters, features)
    }
}

/// Supplies domain reputation to the normalizer.
///
/// A failing source degrades the reputation to `unknown` — the
/// normalizer records the substitution and keeps going.
pub trait ReputationSource: Send + Sync {
    fn reputation(&self, domain: &str, now: f64) -> ArbiterResult<DomainReputation>;
}

impl ReputationSource for MemoryStore {
    fn reputation(&self, domain: &str, now: f64) -> ArbiterResult<DomainReputation> {
        Ok(MemoryStore::reputation(self, domain, now))
    }
}
