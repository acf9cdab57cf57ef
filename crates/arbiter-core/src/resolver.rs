// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Resolver (Extensions → Verdict)
// ─────────────────────────────────────────────────────────────────────
//! Projects the solver's extensions onto the final admission decision.
//!
//! The grounded extension is authoritative; a non-empty preferred
//! family steps in only when grounded is empty. The verdict, risk
//! score, defeated map, and explanation are all deterministic
//! functions of the chosen extension.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use arbiter_types::{clamp_range, Verdict};

use crate::framework::{ArgumentKind, ArgumentationFramework, IndexSet};
use crate::solver::{cmp_strength, Extension, SolverOutcome};

/// Risk weight per argument kind, applied to winning arguments.
fn kind_weight(kind: ArgumentKind) -> f64 {
    match kind {
        ArgumentKind::Deny => 40.0,
        ArgumentKind::Modify => 15.0,
        ArgumentKind::Suspicion => 25.0,
        ArgumentKind::Trust => -20.0,
        ArgumentKind::Allow | ArgumentKind::Baseline => 0.0,
    }
}

/// Share of the final risk score taken from the policy evaluator's hint.
const HINT_WEIGHT: f64 = 0.25;

/// One winning argument and everything attributed to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerEntry {
    pub id: String,
    pub claim: String,
    /// Defeated arguments this winner is credited with, lexically sorted.
    pub defeats: Vec<String>,
}

/// Machine- and human-auditable rationale for a verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Winners ordered by strength (descending), then id.
    pub winners: Vec<WinnerEntry>,
    /// Every degraded signal substituted during normalization.
    pub substitutions: Vec<String>,
}

/// The full outcome of one admission resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub verdict: Verdict,
    /// In [0, 100].
    pub risk_score: f64,
    /// The authoritative extension the verdict was derived from.
    pub chosen: Extension,
    pub grounded: Extension,
    pub preferred: Vec<Extension>,
    pub stable: Vec<Extension>,
    /// Defeated argument id → the winning argument that defeats it.
    pub defeated: BTreeMap<String, String>,
    pub explanation: Explanation,
    /// True when the solver degraded to grounded-only.
    pub budget_exceeded: bool,
}

/// Stateless projection from extensions to a `ResolutionResult`.
/// Borrows the framework read-only.
pub struct Resolver;

impl Resolver {
    pub fn resolve(
        af: &ArgumentationFramework,
        outcome: SolverOutcome,
        risk_score_hint: i64,
        substitutions: Vec<String>,
    ) -> ResolutionResult {
        let chosen = Self::choose_authoritative(&outcome);
        let chosen_set: IndexSet = chosen
            .members
            .iter()
            .filter_map(|id| af.index_of(id))
            .collect();

        let verdict = Self::derive_verdict(af, &chosen_set);
        let risk_score = Self::risk_score(af, &chosen_set, risk_score_hint);
        let defeated = Self::defeated_map(af, &chosen_set);
        let winners = Self::winners(af, &chosen_set, &defeated);

        ResolutionResult {
            verdict,
            risk_score,
            chosen,
            grounded: outcome.grounded,
            preferred: outcome.preferred,
            stable: outcome.stable,
            defeated,
            explanation: Explanation {
                winners,
                substitutions,
            },
            budget_exceeded: outcome.budget_exceeded,
        }
    }

    /// Grounded by default; when grounded is empty, the preferred
    /// extension with the highest summed strength (ties: more members,
    /// then lexical ids).
    fn choose_authoritative(outcome: &SolverOutcome) -> Extension {
        if !outcome.grounded.is_empty() || outcome.preferred.is_empty() {
            return outcome.grounded.clone();
        }
        let mut best: Option<&Extension> = None;
        for candidate in &outcome.preferred {
            let Some(current) = best else {
                best = Some(candidate);
                continue;
            };
            let ordering = cmp_strength(candidate.aggregate_strength, current.aggregate_strength)
                .then_with(|| candidate.members.len().cmp(&current.members.len()))
                .then_with(|| current.members.cmp(&candidate.members));
            if ordering == std::cmp::Ordering::Greater {
                best = Some(candidate);
            }
        }
        best.unwrap_or(&outcome.grounded).clone()
    }

    fn derive_verdict(af: &ArgumentationFramework, chosen: &IndexSet) -> Verdict {
        let mut has_modify = false;
        for i in chosen.iter() {
            match af.argument(i).kind {
                ArgumentKind::Deny => return Verdict::Deny,
                ArgumentKind::Modify => has_modify = true,
                _ => {}
            }
        }
        if has_modify {
            Verdict::AllowWithModifications
        } else {
            Verdict::Allow
        }
    }

    fn risk_score(af: &ArgumentationFramework, chosen: &IndexSet, hint: i64) -> f64 {
        let weighted: f64 = chosen
            .iter()
            .map(|i| {
                let arg = af.argument(i);
                arg.strength * kind_weight(arg.kind)
            })
            .sum();
        let base = clamp_range(weighted, 0.0, 100.0);
        clamp_range(
            (1.0 - HINT_WEIGHT) * base + HINT_WEIGHT * hint as f64,
            0.0,
            100.0,
        )
    }

    /// For every argument outside the chosen extension that the
    /// extension attacks, credit the strongest attacking member
    /// (ties broken by lexical id).
    fn defeated_map(
        af: &ArgumentationFramework,
        chosen: &IndexSet,
    ) -> BTreeMap<String, String> {
        let mut defeated = BTreeMap::new();
        for target in 0..af.argument_count() {
            if chosen.contains(target) {
                continue;
            }
            let mut winner: Option<usize> = None;
            for attacker in af.attackers_of(target).iter() {
                if !chosen.contains(attacker) {
                    continue;
                }
                winner = Some(match winner {
                    None => attacker,
                    Some(best) => {
                        let a = af.argument(attacker);
                        let b = af.argument(best);
                        match cmp_strength(a.strength, b.strength)
                            .then_with(|| b.id.cmp(&a.id))
                        {
                            std::cmp::Ordering::Greater => attacker,
                            _ => best,
                        }
                    }
                });
            }
            if let Some(winner) = winner {
                defeated.insert(
                    af.argument(target).id.clone(),
                    af.argument(winner).id.clone(),
                );
            }
        }
        defeated
    }

    fn winners(
        af: &ArgumentationFramework,
        chosen: &IndexSet,
        defeated: &BTreeMap<String, String>,
    ) -> Vec<WinnerEntry> {
        let mut indices: Vec<usize> = chosen.iter().collect();
        indices.sort_by(|&a, &b| {
            cmp_strength(af.argument(b).strength, af.argument(a).strength)
                .then_with(|| af.argument(a).id.cmp(&af.argument(b).id))
        });
        indices
            .into_iter()
            .map(|i| {
                let arg = af.argument(i);
                let defeats: Vec<String> = defeated
                    .iter()
                    .filter(|(_, winner)| winner.as_str() == arg.id)
                    .map(|(loser, _)| loser.clone())
                    .collect();
                WinnerEntry {
                    id: arg.id.clone(),
                    claim: arg.claim.clone(),
                    defeats,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{Argument, EvidenceSource};
    use crate::solver::ExtensionSolver;

    fn arg(id: &str, kind: ArgumentKind, strength: f64) -> Argument {
        Argument::new(id, kind, strength, format!("claim for {id}"), EvidenceSource::Policy)
    }

    fn solve(af: &ArgumentationFramework) -> SolverOutcome {
        ExtensionSolver::new(1_000, 32).solve(af).unwrap()
    }

    #[test]
    fn test_winning_deny_means_deny() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("deny:x", ArgumentKind::Deny, 0.95)).unwrap();
        af.add_argument(arg("allow:baseline", ArgumentKind::Baseline, 0.3)).unwrap();
        af.add_attack("deny:x", "allow:baseline").unwrap();

        let result = Resolver::resolve(&af, solve(&af), 90, Vec::new());
        assert_eq!(result.verdict, Verdict::Deny);
        assert_eq!(result.chosen.members, vec!["deny:x"]);
        // base = 0.95·40 = 38, blended with the hint: 0.75·38 + 0.25·90.
        assert!((result.risk_score - 51.0).abs() < 1e-9);
        assert_eq!(result.defeated["allow:baseline"], "deny:x");
    }

    #[test]
    fn test_winning_modify_means_modifications() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("modify:redact", ArgumentKind::Modify, 0.7)).unwrap();
        af.add_argument(arg("allow:baseline", ArgumentKind::Baseline, 0.3)).unwrap();
        af.add_attack("modify:redact", "allow:baseline").unwrap();

        let result = Resolver::resolve(&af, solve(&af), 20, Vec::new());
        assert_eq!(result.verdict, Verdict::AllowWithModifications);
        // base = 0.7·15 = 10.5 → 0.75·10.5 + 0.25·20 = 12.875.
        assert!((result.risk_score - 12.875).abs() < 1e-9);
    }

    #[test]
    fn test_clean_framework_allows_at_zero_risk() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("allow:baseline", ArgumentKind::Baseline, 0.3)).unwrap();

        let result = Resolver::resolve(&af, solve(&af), 0, Vec::new());
        assert_eq!(result.verdict, Verdict::Allow);
        assert_eq!(result.risk_score, 0.0);
        assert!(result.defeated.is_empty());
    }

    #[test]
    fn test_trust_pulls_risk_down_to_floor() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("trust:a.test", ArgumentKind::Trust, 0.8)).unwrap();
        af.add_argument(arg("allow:baseline", ArgumentKind::Baseline, 0.3)).unwrap();

        let result = Resolver::resolve(&af, solve(&af), 0, Vec::new());
        // 0.8·(−20) clamps to 0 before blending.
        assert_eq!(result.risk_score, 0.0);
        assert_eq!(result.verdict, Verdict::Allow);
    }

    #[test]
    fn test_empty_grounded_falls_back_to_strongest_preferred() {
        // Two mutually attacking denies; the heavier side must win.
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("deny:a", ArgumentKind::Deny, 0.9)).unwrap();
        af.add_argument(arg("deny:b", ArgumentKind::Deny, 0.9)).unwrap();
        af.add_argument(arg("suspicion:s", ArgumentKind::Suspicion, 0.5)).unwrap();
        af.add_attack("deny:a", "deny:b").unwrap();
        af.add_attack("deny:b", "deny:a").unwrap();
        af.add_attack("suspicion:s", "deny:a").unwrap();
        af.add_attack("deny:a", "suspicion:s").unwrap();

        let outcome = solve(&af);
        assert!(outcome.grounded.is_empty());
        let result = Resolver::resolve(&af, outcome, 0, Vec::new());
        // {deny:b, suspicion:s} outweighs {deny:a}.
        assert_eq!(result.chosen.members, vec!["deny:b", "suspicion:s"]);
        assert_eq!(result.verdict, Verdict::Deny);
    }

    #[test]
    fn test_preferred_tie_prefers_more_members() {
        let mut af = ArgumentationFramework::new();
        // {big1, big2} (0.3 + 0.3) ties {solo} (0.6); the pair wins.
        af.add_argument(arg("solo", ArgumentKind::Deny, 0.6)).unwrap();
        af.add_argument(arg("big1", ArgumentKind::Suspicion, 0.3)).unwrap();
        af.add_argument(arg("big2", ArgumentKind::Suspicion, 0.3)).unwrap();
        af.add_attack("solo", "big1").unwrap();
        af.add_attack("big1", "solo").unwrap();
        af.add_attack("solo", "big2").unwrap();
        af.add_attack("big2", "solo").unwrap();

        let outcome = solve(&af);
        assert!(outcome.grounded.is_empty());
        let result = Resolver::resolve(&af, outcome, 0, Vec::new());
        assert_eq!(result.chosen.members, vec!["big1", "big2"]);
    }

    #[test]
    fn test_defeated_credit_goes_to_strongest_then_lexical() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("deny:a", ArgumentKind::Deny, 0.9)).unwrap();
        af.add_argument(arg("deny:b", ArgumentKind::Deny, 0.9)).unwrap();
        af.add_argument(arg("allow:baseline", ArgumentKind::Baseline, 0.3)).unwrap();
        af.add_attack("deny:a", "allow:baseline").unwrap();
        af.add_attack("deny:b", "allow:baseline").unwrap();

        let result = Resolver::resolve(&af, solve(&af), 0, Vec::new());
        // Equal strengths: lexically smaller id gets the credit.
        assert_eq!(result.defeated["allow:baseline"], "deny:a");
        let winner = result
            .explanation
            .winners
            .iter()
            .find(|w| w.id == "deny:a")
            .unwrap();
        assert_eq!(winner.defeats, vec!["allow:baseline"]);
    }

    #[test]
    fn test_winners_ordered_by_strength() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("allow:baseline", ArgumentKind::Baseline, 0.3)).unwrap();
        af.add_argument(arg("trust:a.test", ArgumentKind::Trust, 0.8)).unwrap();

        let result = Resolver::resolve(&af, solve(&af), 0, Vec::new());
        let ids: Vec<&str> = result
            .explanation
            .winners
            .iter()
            .map(|w| w.id.as_str())
            .collect();
        assert_eq!(ids, vec!["trust:a.test", "allow:baseline"]);
    }

    #[test]
    fn test_substitutions_travel_into_explanation() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("allow:baseline", ArgumentKind::Baseline, 0.3)).unwrap();
        let notes = vec!["policy evaluator unavailable (timeout)".to_string()];
        let result = Resolver::resolve(&af, solve(&af), 0, notes.clone());
        assert_eq!(result.explanation.substitutions, notes);
    }

    #[test]
    fn test_budget_flag_propagates() {
        let mut af = ArgumentationFramework::new();
        for i in 0..40 {
            af.add_argument(arg(&format!("deny:r{i:02}"), ArgumentKind::Deny, 0.9)).unwrap();
        }
        let outcome = solve(&af);
        assert!(outcome.budget_exceeded);
        let result = Resolver::resolve(&af, outcome, 0, Vec::new());
        assert!(result.budget_exceeded);
        assert_eq!(result.verdict, Verdict::Deny);
    }
}
