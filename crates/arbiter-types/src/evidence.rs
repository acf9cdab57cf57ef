// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Arbiter Kernel Evidence & Verdict Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Clamp a value to [lo, hi], mapping NaN to lo and Inf to the nearest
/// bound.
#[inline]
pub fn clamp_range(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_range: NaN detected, clamping to {lo:.4}");
        return lo;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 { hi } else { lo };
        log::warn!("clamp_range: Inf detected, clamping to {boundary:.4}");
        return boundary;
    }
    value.clamp(lo, hi)
}

/// Clamp a value to the unit interval [0, 1].
#[inline]
pub fn clamp_unit(value: f64) -> f64 {
    clamp_range(value, 0.0, 1.0)
}

/// Final admission decision for a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    AllowWithModifications,
    Deny,
}

impl Verdict {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::AllowWithModifications => "allow_with_modifications",
            Self::Deny => "deny",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision class shared by policy verdicts and memory observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allow,
    Deny,
    Modify,
}

impl Outcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Modify => "modify",
        }
    }
}

impl From<Verdict> for Outcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Allow => Self::Allow,
            Verdict::AllowWithModifications => Self::Modify,
            Verdict::Deny => Self::Deny,
        }
    }
}

/// Sensitive-pattern counters reported by the external detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCounters {
    pub ssn: u32,
    pub credit_card: u32,
    pub email: u32,
    pub phone: u32,
    pub ip_address: u32,
}

impl PatternCounters {
    /// True when a counter that warrants an unconditional denial is set.
    #[must_use]
    pub fn has_critical(&self) -> bool {
        self.ssn > 0 || self.credit_card > 0
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.ssn + self.credit_card + self.email + self.phone + self.ip_address
    }
}

/// Structured verdict returned by the external policy evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub decision: Outcome,
    pub deny_reasons: Vec<String>,
    pub modification_list: Vec<String>,
    pub matched_rules: Vec<String>,
    pub risk_score_hint: i64,
}

impl PolicyVerdict {
    /// The verdict substituted when the evaluator is unavailable.
    #[must_use]
    pub fn empty_allow() -> Self {
        Self {
            decision: Outcome::Allow,
            deny_reasons: Vec::new(),
            modification_list: Vec::new(),
            matched_rules: Vec::new(),
            risk_score_hint: 0,
        }
    }
}

impl Default for PolicyVerdict {
    fn default() -> Self {
        Self::empty_allow()
    }
}
