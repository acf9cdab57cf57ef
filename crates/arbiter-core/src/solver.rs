// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Extension Solver (Grounded / Preferred / Stable)
// ─────────────────────────────────────────────────────────────────────
//! Semantic extensions of an argumentation framework.
//!
//! The grounded extension is the least fixed point of the
//! characteristic function, computed over bitsets; it always runs.
//! Preferred extensions are the maximal admissible sets, enumerated by
//! a strength-ordered depth-first search; stable extensions are the
//! preferred sets that attack everything outside themselves.
//!
//! Enumeration is worst-case exponential, so it runs under a hard
//! budget: past `preferred_enumeration_cap` arguments or the caller's
//! deadline the solver abandons enumeration and degrades to the
//! grounded extension, flagging the result. Degradation is part of the
//! contract — it is never an error surfaced from a resolution.

use std::cmp::Ordering;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use arbiter_types::{ArbiterConfig, ArbiterError, ArbiterResult};

use crate::framework::{ArgumentationFramework, IndexSet};

/// Tolerance below which two strengths compare equal, keeping
/// tie-breaks stable across platforms.
pub(crate) const STRENGTH_EPSILON: f64 = 1e-9;

/// Compare two finite strengths with the epsilon snap.
pub(crate) fn cmp_strength(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= STRENGTH_EPSILON {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Semantics under which an extension was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    Grounded,
    Preferred,
    Stable,
}

/// One accepted position: the member arguments plus everything the
/// position defeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub kind: ExtensionKind,
    /// Member ids, lexically sorted.
    pub members: Vec<String>,
    /// Ids attacked by the members, lexically sorted.
    pub rejected: Vec<String>,
    /// Sum of member strengths.
    pub aggregate_strength: f64,
}

impl Extension {
    pub(crate) fn from_set(
        af: &ArgumentationFramework,
        set: &IndexSet,
        kind: ExtensionKind,
    ) -> Self {
        let mut members: Vec<String> = set.iter().map(|i| af.argument(i).id.clone()).collect();
        members.sort();
        let mut rejected: Vec<String> = af
            .attacked_by(set)
            .iter()
            .map(|i| af.argument(i).id.clone())
            .collect();
        rejected.sort();
        let aggregate_strength = set.iter().map(|i| af.argument(i).strength).sum();
        Self {
            kind,
            members,
            rejected,
            aggregate_strength,
        }
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(id)).is_ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Everything the solver produced for one framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    pub grounded: Extension,
    /// Preferred extensions, strongest first; empty when enumeration
    /// was abandoned.
    pub preferred: Vec<Extension>,
    /// Stable extensions; always a subset of the preferred family.
    pub stable: Vec<Extension>,
    /// True when the enumeration cap or the deadline cut enumeration
    /// short and only the grounded extension is authoritative.
    pub budget_exceeded: bool,
}

/// Budgeted extension solver. CPU-bound; never suspends.
pub struct ExtensionSolver {
    budget_ms: u64,
    enumeration_cap: usize,
}

impl ExtensionSolver {
    #[must_use]
    pub fn new(budget_ms: u64, enumeration_cap: usize) -> Self {
        Self {
            budget_ms,
            enumeration_cap,
        }
    }

    #[must_use]
    pub fn from_config(config: &ArbiterConfig) -> Self {
        Self::new(config.solver_budget_ms, config.preferred_enumeration_cap)
    }

    /// Solve with the configured wall-clock budget.
    pub fn solve(&self, af: &ArgumentationFramework) -> ArbiterResult<SolverOutcome> {
        let deadline = Instant::now() + Duration::from_millis(self.budget_ms);
        self.solve_with_deadline(af, deadline)
    }

    /// Solve honoring a caller-provided deadline. The deadline is
    /// checked at every expansion of the preferred search; grounded
    /// computation is unconditional.
    pub fn solve_with_deadline(
        &self,
        af: &ArgumentationFramework,
        deadline: Instant,
    ) -> ArbiterResult<SolverOutcome> {
        af.validate()?;

        let grounded_set = self.grounded_set(af);
        let grounded = Extension::from_set(af, &grounded_set, ExtensionKind::Grounded);

        let maximal = match self.enumerate_preferred(af, deadline) {
            Ok(sets) => sets,
            Err(ArbiterError::TimeBudgetExceeded { budget_ms }) => {
                log::warn!(
                    "preferred enumeration abandoned ({} arguments, {budget_ms}ms budget); \
                     resolving from grounded only",
                    af.argument_count()
                );
                return Ok(SolverOutcome {
                    grounded,
                    preferred: Vec::new(),
                    stable: Vec::new(),
                    budget_exceeded: true,
                });
            }
            Err(e) => return Err(e),
        };

        let mut preferred: Vec<Extension> = maximal
            .iter()
            .map(|s| Extension::from_set(af, s, ExtensionKind::Preferred))
            .collect();
        sort_extensions(&mut preferred);

        let mut stable: Vec<Extension> = maximal
            .iter()
            .filter(|s| self.is_stable(af, s))
            .map(|s| Extension::from_set(af, s, ExtensionKind::Stable))
            .collect();
        sort_extensions(&mut stable);

        Ok(SolverOutcome {
            grounded,
            preferred,
            stable,
            budget_exceeded: false,
        })
    }

    /// Least fixed point of the characteristic function, from ∅.
    /// Converges in at most |A| steps; never fails on a valid framework.
    fn grounded_set(&self, af: &ArgumentationFramework) -> IndexSet {
        let mut current = IndexSet::new();
        loop {
            let next = af.characteristic(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Enumerate the maximal admissible sets.
    fn enumerate_preferred(
        &self,
        af: &ArgumentationFramework,
        deadline: Instant,
    ) -> ArbiterResult<Vec<IndexSet>> {
        if af.argument_count() > self.enumeration_cap {
            return Err(ArbiterError::TimeBudgetExceeded {
                budget_ms: self.budget_ms,
            });
        }

        // Branch on the strongest undecided argument first, lexical id
        // on ties, so the search order is deterministic.
        let mut order: Vec<usize> = (0..af.argument_count()).collect();
        order.sort_by(|&a, &b| {
            cmp_strength(af.argument(b).strength, af.argument(a).strength)
                .then_with(|| af.argument(a).id.cmp(&af.argument(b).id))
        });

        let mut search = PreferredSearch {
            af,
            order,
            deadline,
            budget_ms: self.budget_ms,
            admissible: Vec::new(),
        };
        let mut in_set = IndexSet::new();
        search.dfs(&mut in_set, 0)?;

        let admissible = search.admissible;
        let mut maximal: Vec<IndexSet> = Vec::new();
        for s in &admissible {
            let dominated = admissible.iter().any(|t| t != s && s.is_subset_of(t));
            if !dominated && !maximal.contains(s) {
                maximal.push(s.clone());
            }
        }
        Ok(maximal)
    }

    /// S is stable iff everything outside S is attacked by S.
    fn is_stable(&self, af: &ArgumentationFramework, set: &IndexSet) -> bool {
        let attacked = af.attacked_by(set);
        (0..af.argument_count()).all(|i| set.contains(i) || attacked.contains(i))
    }
}

struct PreferredSearch<'a> {
    af: &'a ArgumentationFramework,
    order: Vec<usize>,
    deadline: Instant,
    budget_ms: u64,
    admissible: Vec<IndexSet>,
}

impl PreferredSearch<'_> {
    fn dfs(&mut self, in_set: &mut IndexSet, depth: usize) -> ArbiterResult<()> {
        if Instant::now() >= self.deadline {
            return Err(ArbiterError::TimeBudgetExceeded {
                budget_ms: self.budget_ms,
            });
        }

        if depth == self.order.len() {
            if self.is_admissible(in_set) {
                self.admissible.push(in_set.clone());
            }
            return Ok(());
        }

        // Everything this branch could still accept.
        let mut potential = in_set.clone();
        for &i in &self.order[depth..] {
            potential.insert(i);
        }

        // A branch whose ceiling is inside an already-found admissible
        // set cannot produce a new maximal set.
        if self.admissible.iter().any(|s| potential.is_subset_of(s)) {
            return Ok(());
        }

        // A member whose attacker can never be countered below this
        // branch dooms every leaf under it.
        let reachable = self.af.attacked_by(&potential);
        if in_set
            .iter()
            .any(|a| !self.af.attackers_of(a).is_subset_of(&reachable))
        {
            return Ok(());
        }

        let candidate = self.order[depth];

        // Try IN: self-attackers never join, and the set stays
        // conflict-free in both directions.
        if !self.af.is_self_attacking(candidate)
            && !self.af.targets_of(candidate).intersects(in_set)
            && !self.af.attackers_of(candidate).intersects(in_set)
        {
            in_set.insert(candidate);
            self.dfs(in_set, depth + 1)?;
            in_set.remove(candidate);
        }

        // Try OUT.
        self.dfs(in_set, depth + 1)
    }

    /// Conflict-free holds by construction; admissibility additionally
    /// needs every member defended by the set itself.
    fn is_admissible(&self, set: &IndexSet) -> bool {
        let attacked = self.af.attacked_by(set);
        set.iter()
            .all(|a| self.af.attackers_of(a).is_subset_of(&attacked))
    }
}

/// Deterministic output order: aggregate strength descending (epsilon
/// snap), then lexical on the sorted member ids.
pub(crate) fn sort_extensions(list: &mut [Extension]) {
    list.sort_by(|x, y| {
        cmp_strength(y.aggregate_strength, x.aggregate_strength)
            .then_with(|| x.members.cmp(&y.members))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{Argument, ArgumentKind, EvidenceSource};

    fn arg(id: &str, strength: f64) -> Argument {
        Argument::new(id, ArgumentKind::Deny, strength, "test", EvidenceSource::Policy)
    }

    fn chain() -> ArgumentationFramework {
        // a -> b -> c
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("a", 0.9)).unwrap();
        af.add_argument(arg("b", 0.8)).unwrap();
        af.add_argument(arg("c", 0.7)).unwrap();
        af.add_attack("a", "b").unwrap();
        af.add_attack("b", "c").unwrap();
        af
    }

    fn solver() -> ExtensionSolver {
        ExtensionSolver::new(50, 32)
    }

    #[test]
    fn test_chain_grounded_reinstates() {
        let outcome = solver().solve(&chain()).unwrap();
        assert_eq!(outcome.grounded.members, vec!["a", "c"]);
        assert_eq!(outcome.grounded.rejected, vec!["b"]);
        assert!(!outcome.budget_exceeded);
    }

    #[test]
    fn test_chain_preferred_and_stable_coincide() {
        let outcome = solver().solve(&chain()).unwrap();
        assert_eq!(outcome.preferred.len(), 1);
        assert_eq!(outcome.preferred[0].members, vec!["a", "c"]);
        assert_eq!(outcome.stable.len(), 1);
        assert_eq!(outcome.stable[0].members, vec!["a", "c"]);
        assert_eq!(outcome.stable[0].kind, ExtensionKind::Stable);
    }

    #[test]
    fn test_mutual_attack_splits_preferred() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("a", 0.9)).unwrap();
        af.add_argument(arg("b", 0.9)).unwrap();
        af.add_attack("a", "b").unwrap();
        af.add_attack("b", "a").unwrap();

        let outcome = solver().solve(&af).unwrap();
        assert!(outcome.grounded.is_empty());
        assert_eq!(outcome.preferred.len(), 2);
        // Equal aggregate strength: lexical order decides.
        assert_eq!(outcome.preferred[0].members, vec!["a"]);
        assert_eq!(outcome.preferred[1].members, vec!["b"]);
        assert_eq!(outcome.stable.len(), 2);
    }

    #[test]
    fn test_preferred_ordered_by_aggregate_strength() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("weak", 0.4)).unwrap();
        af.add_argument(arg("strong", 0.9)).unwrap();
        af.add_attack("weak", "strong").unwrap();
        af.add_attack("strong", "weak").unwrap();

        let outcome = solver().solve(&af).unwrap();
        assert_eq!(outcome.preferred[0].members, vec!["strong"]);
        assert_eq!(outcome.preferred[1].members, vec!["weak"]);
    }

    #[test]
    fn test_self_attacker_never_accepted() {
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("loop", 0.95)).unwrap();
        af.add_argument(arg("calm", 0.3)).unwrap();
        af.add_attack("loop", "loop").unwrap();

        let outcome = solver().solve(&af).unwrap();
        assert_eq!(outcome.grounded.members, vec!["calm"]);
        for ext in outcome.preferred.iter().chain(outcome.stable.iter()) {
            assert!(!ext.contains("loop"));
        }
    }

    #[test]
    fn test_odd_cycle_is_unstable() {
        // a -> b -> c -> a: grounded and the single preferred set are
        // empty, and no stable extension exists.
        let mut af = ArgumentationFramework::new();
        af.add_argument(arg("a", 0.5)).unwrap();
        af.add_argument(arg("b", 0.5)).unwrap();
        af.add_argument(arg("c", 0.5)).unwrap();
        af.add_attack("a", "b").unwrap();
        af.add_attack("b", "c").unwrap();
        af.add_attack("c", "a").unwrap();

        let outcome = solver().solve(&af).unwrap();
        assert!(outcome.grounded.is_empty());
        assert_eq!(outcome.preferred.len(), 1);
        assert!(outcome.preferred[0].is_empty());
        assert!(outcome.stable.is_empty());
        assert!(!outcome.budget_exceeded);
    }

    #[test]
    fn test_enumeration_cap_degrades_to_grounded() {
        let mut af = ArgumentationFramework::new();
        for i in 0..40 {
            af.add_argument(arg(&format!("a{i:02}"), 0.5)).unwrap();
        }
        let outcome = solver().solve(&af).unwrap();
        assert!(outcome.budget_exceeded);
        assert_eq!(outcome.grounded.members.len(), 40);
        assert!(outcome.preferred.is_empty());
        assert!(outcome.stable.is_empty());
    }

    #[test]
    fn test_expired_deadline_degrades_to_grounded() {
        let af = chain();
        let solver = solver();
        let deadline = Instant::now() - Duration::from_millis(1);
        let outcome = solver.solve_with_deadline(&af, deadline).unwrap();
        assert!(outcome.budget_exceeded);
        assert_eq!(outcome.grounded.members, vec!["a", "c"]);
        assert!(outcome.preferred.is_empty());
    }

    #[test]
    fn test_empty_framework() {
        let af = ArgumentationFramework::new();
        let outcome = solver().solve(&af).unwrap();
        assert!(outcome.grounded.is_empty());
        assert_eq!(outcome.preferred.len(), 1);
        assert!(outcome.preferred[0].is_empty());
        // With nothing outside it, the empty set is vacuously stable.
        assert_eq!(outcome.stable.len(), 1);
    }

    #[test]
    fn test_determinism_across_runs() {
        let af = chain();
        let solver = solver();
        let first = solver.solve(&af).unwrap();
        let second = solver.solve(&af).unwrap();
        assert_eq!(first, second);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn build(n: usize, edges: &[bool], strengths: &[f64]) -> ArgumentationFramework {
            let mut af = ArgumentationFramework::new();
            for (i, s) in strengths.iter().enumerate().take(n) {
                af.add_argument(arg(&format!("a{i}"), *s)).unwrap();
            }
            for i in 0..n {
                for j in 0..n {
                    if edges[i * n + j] {
                        af.add_attack_idx(i, j);
                    }
                }
            }
            af
        }

        fn framework_strategy() -> impl Strategy<Value = ArgumentationFramework> {
            (1usize..=7).prop_flat_map(|n| {
                (
                    Just(n),
                    prop::collection::vec(any::<bool>(), n * n),
                    prop::collection::vec(0.0f64..1.0, n),
                )
                    .prop_map(|(n, edges, strengths)| build(n, &edges, &strengths))
            })
        }

        proptest! {
            /// The grounded extension is unique, admissible, and
            /// contained in every preferred extension.
            #[test]
            fn test_grounded_minimal_and_admissible(af in framework_strategy()) {
                let outcome = ExtensionSolver::new(5_000, 32).solve(&af).unwrap();
                prop_assert!(!outcome.budget_exceeded);

                let grounded: IndexSet = outcome.grounded.members.iter()
                    .map(|id| af.index_of(id).unwrap())
                    .collect();
                prop_assert!(af.is_conflict_free(&grounded));
                prop_assert!(grounded.is_subset_of(&af.characteristic(&grounded)));

                for ext in &outcome.preferred {
                    for member in &outcome.grounded.members {
                        prop_assert!(ext.contains(member));
                    }
                }
            }

            /// Every returned extension is admissible, every stable
            /// extension is preferred and attacks all outsiders, and no
            /// self-attacker is ever accepted.
            #[test]
            fn test_extension_family_laws(af in framework_strategy()) {
                let solver = ExtensionSolver::new(5_000, 32);
                let outcome = solver.solve(&af).unwrap();

                for ext in outcome.preferred.iter().chain(outcome.stable.iter()) {
                    let set: IndexSet = ext.members.iter()
                        .map(|id| af.index_of(id).unwrap())
                        .collect();
                    prop_assert!(af.is_conflict_free(&set));
                    let attacked = af.attacked_by(&set);
                    for a in set.iter() {
                        prop_assert!(af.attackers_of(a).is_subset_of(&attacked));
                        prop_assert!(!af.is_self_attacking(a));
                    }
                }

                for stable in &outcome.stable {
                    prop_assert!(outcome.preferred.iter()
                        .any(|p| p.members == stable.members));
                    let set: IndexSet = stable.members.iter()
                        .map(|id| af.index_of(id).unwrap())
                        .collect();
                    let attacked = af.attacked_by(&set);
                    for i in 0..af.argument_count() {
                        prop_assert!(set.contains(i) || attacked.contains(i));
                    }
                }

                let again = solver.solve(&af).unwrap();
                prop_assert_eq!(outcome, again);
            }
        }
    }
}
