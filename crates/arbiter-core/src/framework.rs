// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Abstract Argumentation Framework
// ─────────────────────────────────────────────────────────────────────
//! Typed argument graph with attack relations.
//!
//! Arguments live in a contiguous array indexed by insertion order;
//! the attack relation is stored as bitset adjacency in both
//! directions (attackers-of and targets-of), which keeps the solver's
//! defense checks at O(|A|²/word) with no pointer cycles. Arguments
//! are immutable once inserted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use arbiter_types::{clamp_unit, ArbiterError, ArbiterResult};

/// Growable bitset over argument indices, stored as 64-bit words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSet {
    words: Vec<u64>,
}

impl IndexSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize) {
        let word = index >> 6;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index & 63);
    }

    pub fn remove(&mut self, index: usize) {
        let word = index >> 6;
        if word < self.words.len() {
            self.words[word] &= !(1u64 << (index & 63));
        }
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        let word = index >> 6;
        word < self.words.len() && self.words[word] >> (index & 63) & 1 == 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn union_with(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (dst, src) in self.words.iter_mut().zip(other.words.iter()) {
            *dst |= src;
        }
    }

    /// True when every index in `self` is also in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.words.iter().enumerate().all(|(i, &w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    /// True when `self` and `other` share at least one index.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(&a, &b)| a & b != 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &w)| {
            (0..64usize).filter_map(move |b| (w >> b & 1 == 1).then_some(wi * 64 + b))
        })
    }
}

impl FromIterator<usize> for IndexSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut set = Self::new();
        for i in iter {
            set.insert(i);
        }
        set
    }
}

/// Closed set of argument roles; attack generation is a pure function
/// over these tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    Deny,
    Modify,
    Allow,
    Trust,
    Suspicion,
    Baseline,
}

/// Which evidence channel produced an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    Policy,
    Pattern,
    Memory,
    Default,
}

/// One node of the argument graph. Immutable once inserted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argument {
    /// Stable id, unique within a framework.
    pub id: String,
    pub kind: ArgumentKind,
    /// In [0, 1]; non-finite inputs are clamped on construction.
    pub strength: f64,
    /// Human-readable claim for the explanation tree.
    pub claim: String,
    pub source: EvidenceSource,
    /// Optional structured payload (rule name, counters, domain, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<serde_json::Value>,
}

impl Argument {
    pub fn new(
        id: impl Into<String>,
        kind: ArgumentKind,
        strength: f64,
        claim: impl Into<String>,
        source: EvidenceSource,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            strength: clamp_unit(strength),
            claim: claim.into(),
            source,
            evidence: None,
        }
    }

    #[must_use]
    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

/// A finite argument set with a directed attack relation.
///
/// Multi-edges collapse; self-attacks are permitted and significant
/// (a self-attacker can never join an extension containing itself).
#[derive(Debug, Clone, Default)]
pub struct ArgumentationFramework {
    arguments: Vec<Argument>,
    index: HashMap<String, usize>,
    attackers: Vec<IndexSet>,
    targets: Vec<IndexSet>,
    attack_count: usize,
}

impl ArgumentationFramework {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an argument. Duplicate ids are a structural error.
    pub fn add_argument(&mut self, argument: Argument) -> ArbiterResult<usize> {
        if argument.id.is_empty() {
            return Err(ArbiterError::InvalidFramework(
                "empty argument id".to_string(),
            ));
        }
        if self.index.contains_key(&argument.id) {
            return Err(ArbiterError::InvalidFramework(format!(
                "duplicate argument id {:?}",
                argument.id
            )));
        }
        let idx = self.arguments.len();
        self.index.insert(argument.id.clone(), idx);
        self.arguments.push(argument);
        self.attackers.push(IndexSet::new());
        self.targets.push(IndexSet::new());
        Ok(idx)
    }

    /// Insert an attack edge by argument id. Idempotent; both endpoints
    /// must already be present.
    pub fn add_attack(&mut self, attacker: &str, target: &str) -> ArbiterResult<()> {
        let a = self.require(attacker)?;
        let t = self.require(target)?;
        self.add_attack_idx(a, t);
        Ok(())
    }

    pub(crate) fn add_attack_idx(&mut self, attacker: usize, target: usize) {
        if !self.targets[attacker].contains(target) {
            self.targets[attacker].insert(target);
            self.attackers[target].insert(attacker);
            self.attack_count += 1;
        }
    }

    fn require(&self, id: &str) -> ArbiterResult<usize> {
        self.index.get(id).copied().ok_or_else(|| {
            ArbiterError::InvalidFramework(format!("attack endpoint {id:?} is not in the framework"))
        })
    }

    #[must_use]
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    #[must_use]
    pub fn attack_count(&self) -> usize {
        self.attack_count
    }

    #[must_use]
    pub fn argument(&self, index: usize) -> &Argument {
        &self.arguments[index]
    }

    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    #[must_use]
    pub fn attackers_of(&self, index: usize) -> &IndexSet {
        &self.attackers[index]
    }

    #[must_use]
    pub fn targets_of(&self, index: usize) -> &IndexSet {
        &self.targets[index]
    }

    #[must_use]
    pub fn is_self_attacking(&self, index: usize) -> bool {
        self.targets[index].contains(index)
    }

    /// Union of the targets of every member of `set`.
    #[must_use]
    pub fn attacked_by(&self, set: &IndexSet) -> IndexSet {
        let mut attacked = IndexSet::new();
        for i in set.iter() {
            attacked.union_with(&self.targets[i]);
        }
        attacked
    }

    /// True when no member of `set` attacks another member (or itself).
    #[must_use]
    pub fn is_conflict_free(&self, set: &IndexSet) -> bool {
        set.iter().all(|i| !self.targets[i].intersects(set))
    }

    /// Dung's characteristic function F(S): the set of arguments whose
    /// every attacker is attacked by `set`.
    #[must_use]
    pub fn characteristic(&self, set: &IndexSet) -> IndexSet {
        let attacked = self.attacked_by(set);
        (0..self.arguments.len())
            .filter(|&a| self.attackers[a].is_subset_of(&attacked))
            .collect()
    }

    /// Re-check the structural invariants. Construction via
    /// `add_argument`/`add_attack` maintains them; this guards
    /// frameworks assembled by other means.
    pub fn validate(&self) -> ArbiterResult<()> {
        if self.index.len() != self.arguments.len() {
            return Err(ArbiterError::InvalidFramework(
                "id index out of sync with argument array".to_string(),
            ));
        }
        for (idx, arg) in self.arguments.iter().enumerate() {
            if self.index.get(&arg.id) != Some(&idx) {
                return Err(ArbiterError::InvalidFramework(format!(
                    "argument id {:?} does not resolve to its slot",
                    arg.id
                )));
            }
            if !arg.strength.is_finite() || !(0.0..=1.0).contains(&arg.strength) {
                return Err(ArbiterError::InvalidFramework(format!(
                    "argument {:?} has strength {} outside [0, 1]",
                    arg.id, arg.strength
                )));
            }
        }
        let n = self.arguments.len();
        for (idx, targets) in self.targets.iter().enumerate() {
            if let Some(out_of_range) = targets.iter().find(|&t| t >= n) {
                return Err(ArbiterError::InvalidFramework(format!(
                    "attack from {:?} targets dangling index {out_of_range}",
                    self.arguments[idx].id
                )));
            }
        }
        Ok(())
    }
}
