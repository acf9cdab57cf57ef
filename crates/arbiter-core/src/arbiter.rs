// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Arbiter (Admission Pipeline)
// ─────────────────────────────────────────────────────────────────────
//! End-to-end admission pipeline: scan → evaluate → normalize → solve →
//! resolve, then record the decision observation in domain memory.
//!
//! Each request owns a private framework and solver pass; only the
//! memory store handle is shared across requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use arbiter_memory::{KnowledgeEntry, MemoryStore};
use arbiter_types::{ArbiterConfig, ArbiterResult, Outcome};

use crate::collaborators::{PatternDetector, PolicyEvaluator};
use crate::normalizer::{Evidence, EvidenceNormalizer, PolicySignal};
use crate::resolver::{ResolutionResult, Resolver};
use crate::solver::ExtensionSolver;

/// The admission gate. Owns its configuration and collaborator handles;
/// the memory store is an explicit shared handle, never a global.
pub struct Arbiter {
    config: ArbiterConfig,
    memory: Arc<MemoryStore>,
    detector: Arc<dyn PatternDetector>,
    policy: Arc<dyn PolicyEvaluator>,
    normalizer: EvidenceNormalizer,
    solver: ExtensionSolver,
}

impl Arbiter {
    pub fn new(
        config: ArbiterConfig,
        memory: Arc<MemoryStore>,
        detector: Arc<dyn PatternDetector>,
        policy: Arc<dyn PolicyEvaluator>,
    ) -> ArbiterResult<Self> {
        config.validate()?;
        let normalizer = EvidenceNormalizer::new(config.clone());
        let solver = ExtensionSolver::from_config(&config);
        Ok(Self {
            config,
            memory,
            detector,
            policy,
            normalizer,
            solver,
        })
    }

    /// Review one piece of content for admission.
    ///
    /// Runs the full pipeline and appends the decision observation to
    /// domain memory. A failed append does not void the verdict: it is
    /// logged and recorded in the explanation.
    pub fn review(
        &self,
        domain: &str,
        pack: &str,
        text: &str,
        features: &serde_json::Value,
        now: f64,
    ) -> ArbiterResult<ResolutionResult> {
        let counters = self.detector.scan(text);

        let policy = match self.policy.evaluate(domain, pack, &counters, features) {
            Ok(verdict) => PolicySignal::Verdict(verdict),
            Err(e) => PolicySignal::Unavailable(e.to_string()),
        };
        let matched_rules = match &policy {
            PolicySignal::Verdict(v) => v.matched_rules.clone(),
            PolicySignal::Unavailable(_) => Vec::new(),
        };

        let evidence = Evidence {
            domain: domain.to_string(),
            pack: pack.to_string(),
            counters,
            policy,
        };
        let mut result = self.resolve_evidence(&evidence, now)?;

        log::info!(
            "admission verdict for {domain:?}: {} (risk {:.1})",
            result.verdict,
            result.risk_score
        );

        let entry = KnowledgeEntry {
            domain: domain.to_string(),
            matched_rules,
            meta: BTreeMap::new(),
            outcome: Outcome::from(result.verdict),
            timestamp: now,
        };
        if let Err(e) = self.memory.store(entry) {
            log::error!("decision observation for {domain:?} not recorded: {e}");
            result
                .explanation
                .substitutions
                .push(format!("decision observation not recorded ({e})"));
        }

        Ok(result)
    }

    /// Pure evidence → result path: normalize, solve, resolve. Does not
    /// touch the memory log except to read reputation.
    pub fn resolve_evidence(
        &self,
        evidence: &Evidence,
        now: f64,
    ) -> ArbiterResult<ResolutionResult> {
        let normalized = self.normalizer.normalize(evidence, self.memory.as_ref(), now)?;
        let outcome = self.solver.solve(&normalized.framework)?;
        Ok(Resolver::resolve(
            &normalized.framework,
            outcome,
            normalized.risk_score_hint,
            normalized.substitutions,
        ))
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }
}
