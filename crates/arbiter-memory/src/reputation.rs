// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Recency-Weighted Domain Reputation
// ─────────────────────────────────────────────────────────────────────
//! Reputation derivation over decision observations.
//!
//! Each observation contributes `2^(-Δ/H)` where Δ is its age and H the
//! configured half-life. Allows add their full weight to the numerator,
//! modifications half of it, denials subtract theirs; the denominator
//! is the total weight. Observations older than four half-lives no
//! longer count toward the sample size.

use serde::{Deserialize, Serialize};

use arbiter_types::Outcome;

use crate::store::KnowledgeEntry;

/// Total weight below which a domain is considered unobserved.
const WEIGHT_EPSILON: f64 = 1e-9;

/// Weight at four half-lives; entries below this do not count as samples.
const SAMPLE_WEIGHT_FLOOR: f64 = 0.0625;

/// Classification of a domain's recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReputationLabel {
    Trusted,
    Suspicious,
    Mixed,
    Unknown,
}

/// Derived reputation for one domain. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainReputation {
    pub domain: String,
    /// Recency-weighted score in [-1, 1]; positive favors admission.
    pub score: f64,
    pub label: ReputationLabel,
    /// Observations no older than four half-lives.
    pub sample_count: usize,
    pub last_seen: Option<f64>,
}

impl DomainReputation {
    /// Reputation of a domain with no usable history.
    #[must_use]
    pub fn unknown(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            score: 0.0,
            label: ReputationLabel::Unknown,
            sample_count: 0,
            last_seen: None,
        }
    }
}

/// Decay weight of an observation of age `age_s` under half-life
/// `half_life_s`. Future-dated entries weigh 1.0.
#[inline]
pub(crate) fn decay_weight(age_s: f64, half_life_s: f64) -> f64 {
    (-(age_s.max(0.0)) / half_life_s).exp2()
}

/// Fold a domain's entries into a reputation at time `now`.
pub(crate) fn score_entries<'a>(
    domain: &str,
    entries: impl Iterator<Item = &'a KnowledgeEntry>,
    now: f64,
    half_life_s: f64,
) -> DomainReputation {
    let mut w_allow = 0.0;
    let mut w_deny = 0.0;
    let mut w_modify = 0.0;
    let mut sample_count = 0usize;
    let mut last_seen: Option<f64> = None;

    for entry in entries {
        let weight = decay_weight(now - entry.timestamp, half_life_s);
        match entry.outcome {
            Outcome::Allow => w_allow += weight,
            Outcome::Deny => w_deny += weight,
            Outcome::Modify => w_modify += weight,
        }
        if weight + 1e-12 >= SAMPLE_WEIGHT_FLOOR {
            sample_count += 1;
        }
        last_seen = Some(last_seen.map_or(entry.timestamp, |t: f64| t.max(entry.timestamp)));
    }

    let total = w_allow + w_deny + w_modify;
    if total < WEIGHT_EPSILON {
        return DomainReputation::unknown(domain);
    }

    let score = ((w_allow + 0.5 * w_modify - w_deny) / total).clamp(-1.0, 1.0);
    let label = if score >= 0.5 && sample_count >= 3 {
        ReputationLabel::Trusted
    } else if score <= -0.3 {
        ReputationLabel::Suspicious
    } else {
        ReputationLabel::Mixed
    };

    DomainReputation {
        domain: domain.to_string(),
        score,
        label,
        sample_count,
        last_seen,
    }
}
