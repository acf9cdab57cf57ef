// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Evidence Normalizer
// ─────────────────────────────────────────────────────────────────────
//! Deterministic transformation of raw admission evidence — policy
//! verdict, sensitive-pattern counters, domain reputation — into a
//! typed argument graph with attack relations.
//!
//! Argument ids are assigned as `kind:sourcekey`, so identical evidence
//! always produces an identical framework. Degraded inputs (policy
//! evaluator down, memory unreadable) substitute weaker arguments and
//! are recorded for the explanation; the normalizer itself never
//! refuses evidence.

use serde_json::json;

use arbiter_types::{ArbiterConfig, ArbiterResult, PolicyVerdict};
use arbiter_memory::ReputationLabel;

use crate::collaborators::ReputationSource;
use crate::framework::{Argument, ArgumentKind, ArgumentationFramework, EvidenceSource};
use crate::solver::cmp_strength;

/// Deny strength when no reason-prefix override matches.
const DENY_BASE_STRENGTH: f64 = 0.9;

/// Strength of every modification argument.
const MODIFY_STRENGTH: f64 = 0.7;

/// Strength of the pattern-sourced denial for critical counters.
const PATTERN_DENY_STRENGTH: f64 = 0.95;

/// Suspicion strength substituted when the policy evaluator is down.
const POLICY_OUTAGE_SUSPICION: f64 = 0.4;

/// Pack tag whose exemptions suppress the pattern-sourced denial.
const RESEARCH_PACK: &str = "research";

/// Outcome of the policy evaluator call, as seen by the normalizer.
#[derive(Debug, Clone)]
pub enum PolicySignal {
    Verdict(PolicyVerdict),
    /// The evaluator failed; carries the failure description.
    Unavailable(String),
}

/// Raw evidence for one admission request.
#[derive(Debug, Clone)]
pub struct Evidence {
    pub domain: String,
    /// Opaque policy pack tag. Influences argument strengths.
    pub pack: String,
    pub counters: arbiter_types::PatternCounters,
    pub policy: PolicySignal,
}

/// The normalizer's output: a framework plus the audit trail of every
/// substituted signal.
#[derive(Debug)]
pub struct NormalizedEvidence {
    pub framework: ArgumentationFramework,
    pub substitutions: Vec<String>,
    pub risk_score_hint: i64,
}

/// Evidence → (A, R). Stateless apart from configuration; each request
/// gets a private framework.
pub struct EvidenceNormalizer {
    config: ArbiterConfig,
}

impl EvidenceNormalizer {
    #[must_use]
    pub fn new(config: ArbiterConfig) -> Self {
        Self { config }
    }

    pub fn normalize(
        &self,
        evidence: &Evidence,
        memory: &dyn ReputationSource,
        now: f64,
    ) -> ArbiterResult<NormalizedEvidence> {
        let mut af = ArgumentationFramework::new();
        let mut substitutions = Vec::new();

        let verdict = match &evidence.policy {
            PolicySignal::Verdict(v) => v.clone(),
            PolicySignal::Unavailable(reason) => {
                log::warn!(
                    "policy evaluator unavailable for {:?}: {reason}; substituting empty verdict",
                    evidence.domain
                );
                substitutions.push(format!(
                    "policy evaluator unavailable ({reason}); continued with an empty allow \
                     verdict and a suspicion argument"
                ));
                PolicyVerdict::empty_allow()
            }
        };

        // Deny arguments, one per reason. Repeated reasons collapse.
        let mut denies: Vec<(String, String)> = Vec::new();
        for reason in &verdict.deny_reasons {
            let id = format!("deny:{reason}");
            if af.index_of(&id).is_some() {
                continue;
            }
            af.add_argument(
                Argument::new(
                    id.clone(),
                    ArgumentKind::Deny,
                    self.deny_strength(reason),
                    format!("Policy denies admission: {reason}"),
                    EvidenceSource::Policy,
                )
                .with_evidence(json!({ "reason": reason, "domain": evidence.domain })),
            )?;
            denies.push((id, reason.clone()));
        }

        // Modification arguments.
        let mut modifies: Vec<String> = Vec::new();
        for modification in &verdict.modification_list {
            let id = format!("modify:{modification}");
            if af.index_of(&id).is_some() {
                continue;
            }
            af.add_argument(
                Argument::new(
                    id.clone(),
                    ArgumentKind::Modify,
                    MODIFY_STRENGTH,
                    format!("Policy requires modification: {modification}"),
                    EvidenceSource::Policy,
                )
                .with_evidence(json!({ "modification": modification })),
            )?;
            modifies.push(id);
        }

        // Counter-sourced denial for critical patterns, unless an
        // equivalent policy denial already exists or the pack exempts it.
        let has_critical_deny = denies.iter().any(|(_, r)| r.starts_with("critical_pii:"));
        if evidence.counters.has_critical()
            && !has_critical_deny
            && evidence.pack != RESEARCH_PACK
        {
            let id = "deny:pattern:critical_pii".to_string();
            let strength = self
                .config
                .deny_strength_overrides
                .get("critical_pii:")
                .copied()
                .unwrap_or(PATTERN_DENY_STRENGTH);
            af.add_argument(
                Argument::new(
                    id.clone(),
                    ArgumentKind::Deny,
                    strength,
                    format!(
                        "Sensitive patterns detected: {} SSN, {} credit card",
                        evidence.counters.ssn, evidence.counters.credit_card
                    ),
                    EvidenceSource::Pattern,
                )
                .with_evidence(json!(evidence.counters)),
            )?;
            denies.push((id, "critical_pii:pattern".to_string()));
        }

        // Reputation arguments from domain memory.
        let mut trusts: Vec<String> = Vec::new();
        let mut suspicions: Vec<String> = Vec::new();
        match memory.reputation(&evidence.domain, now) {
            Ok(rep) => match rep.label {
                ReputationLabel::Trusted => {
                    let id = format!("trust:{}", evidence.domain);
                    af.add_argument(
                        Argument::new(
                            id.clone(),
                            ArgumentKind::Trust,
                            self.config.trust_strength_floor + 0.5 * rep.score,
                            format!(
                                "Domain {} has a trusted recent history (score {:.2})",
                                evidence.domain, rep.score
                            ),
                            EvidenceSource::Memory,
                        )
                        .with_evidence(json!({
                            "domain": rep.domain,
                            "score": rep.score,
                            "sample_count": rep.sample_count,
                        })),
                    )?;
                    trusts.push(id);
                }
                ReputationLabel::Suspicious => {
                    let id = format!("suspicion:{}", evidence.domain);
                    af.add_argument(
                        Argument::new(
                            id.clone(),
                            ArgumentKind::Suspicion,
                            self.config.trust_strength_floor + 0.5 * rep.score.abs(),
                            format!(
                                "Domain {} has a suspicious recent history (score {:.2})",
                                evidence.domain, rep.score
                            ),
                            EvidenceSource::Memory,
                        )
                        .with_evidence(json!({
                            "domain": rep.domain,
                            "score": rep.score,
                            "sample_count": rep.sample_count,
                        })),
                    )?;
                    suspicions.push(id);
                }
                ReputationLabel::Mixed | ReputationLabel::Unknown => {}
            },
            Err(e) => {
                log::warn!(
                    "reputation unavailable for {:?}: {e}; treating as unknown",
                    evidence.domain
                );
                substitutions.push(format!(
                    "memory store unavailable ({e}); domain reputation treated as unknown"
                ));
            }
        }

        // The evaluator outage itself argues for caution.
        if matches!(evidence.policy, PolicySignal::Unavailable(_)) {
            let id = "suspicion:policy".to_string();
            af.add_argument(
                Argument::new(
                    id.clone(),
                    ArgumentKind::Suspicion,
                    POLICY_OUTAGE_SUSPICION,
                    "Policy evaluator unavailable; applying caution",
                    EvidenceSource::Default,
                ),
            )?;
            suspicions.push(id);
        }

        // The baseline position: admit unless something defeats this.
        let baseline = "allow:baseline".to_string();
        af.add_argument(Argument::new(
            baseline.clone(),
            ArgumentKind::Baseline,
            self.config.baseline_allow_strength,
            "No standing objection to admission",
            EvidenceSource::Default,
        ))?;

        self.wire_attacks(&mut af, &denies, &modifies, &trusts, &suspicions, &baseline)?;

        Ok(NormalizedEvidence {
            framework: af,
            substitutions,
            risk_score_hint: verdict.risk_score_hint,
        })
    }

    fn wire_attacks(
        &self,
        af: &mut ArgumentationFramework,
        denies: &[(String, String)],
        modifies: &[String],
        trusts: &[String],
        suspicions: &[String],
        baseline: &str,
    ) -> ArbiterResult<()> {
        for (deny, _) in denies {
            af.add_attack(deny, baseline)?;
            for modify in modifies {
                af.add_attack(deny, modify)?;
            }
            for trust in trusts {
                af.add_attack(deny, trust)?;
            }
        }

        for modify in modifies {
            af.add_attack(modify, baseline)?;
        }

        // Trust counters a deny or modify from memory unconditionally,
        // anything else only when it is at least as strong.
        for trust in trusts {
            let Some(trust_idx) = af.index_of(trust) else {
                continue;
            };
            let trust_strength = af.argument(trust_idx).strength;
            let mut contested: Vec<String> = Vec::new();
            for id in denies.iter().map(|(id, _)| id).chain(modifies.iter()) {
                let Some(idx) = af.index_of(id) else {
                    continue;
                };
                let arg = af.argument(idx);
                if arg.source == EvidenceSource::Memory
                    || cmp_strength(arg.strength, trust_strength) != std::cmp::Ordering::Greater
                {
                    contested.push(id.clone());
                }
            }
            for target in &contested {
                af.add_attack(trust, target)?;
            }
        }

        for suspicion in suspicions {
            af.add_attack(suspicion, baseline)?;
            for trust in trusts {
                af.add_attack(suspicion, trust)?;
            }
        }

        // A denial attacks a rival denial only under strict class
        // dominance (e.g. critical_pii: over classified_content:).
        for (x_id, x_reason) in denies {
            for (y_id, y_reason) in denies {
                if x_id != y_id && reason_class_rank(x_reason) > reason_class_rank(y_reason) {
                    af.add_attack(x_id, y_id)?;
                }
            }
        }

        Ok(())
    }

    fn deny_strength(&self, reason: &str) -> f64 {
        // Longest matching prefix wins.
        self.config
            .deny_strength_overrides
            .iter()
            .filter(|(prefix, _)| reason.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, strength)| *strength)
            .unwrap_or(DENY_BASE_STRENGTH)
    }
}

/// Dominance rank of a deny reason's conflict class.
fn reason_class_rank(reason: &str) -> u8 {
    if reason.starts_with("critical_pii:") {
        3
    } else if reason.starts_with("credential_detected:") {
        2
    } else if reason.starts_with("domain_blocked:") {
        1
    } else {
        0
    }
}
