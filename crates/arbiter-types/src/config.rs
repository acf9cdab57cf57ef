// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Arbiter Kernel Configuration
// ─────────────────────────────────────────────────────────────────────

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ArbiterError, ArbiterResult};

/// Runtime configuration for the Arbiter Kernel.
///
/// Unknown keys are rejected at load time so a config file written for
/// a different kernel version fails fast instead of silently dropping
/// options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArbiterConfig {
    /// Wall-clock budget for preferred/stable enumeration, in ms.
    /// Default: 50.
    pub solver_budget_ms: u64,

    /// Half-life of a memory observation's reputation weight, seconds.
    /// Default: 604_800 (one week).
    pub memory_halflife_seconds: u64,

    /// Hard cap on argument count for preferred/stable enumeration.
    /// Frameworks above the cap resolve from the grounded extension only.
    /// Default: 32.
    pub preferred_enumeration_cap: usize,

    /// Base strength of Trust/Suspicion arguments derived from memory.
    /// Default: 0.3.
    pub trust_strength_floor: f64,

    /// Deny argument strength keyed by deny-reason prefix.
    /// Defaults: `critical_pii:` 0.95, `domain_blocked:` 0.92,
    /// `credential_detected:` 0.93. Unlisted reasons use 0.9.
    pub deny_strength_overrides: BTreeMap<String, f64>,

    /// Strength of the always-present baseline Allow argument.
    /// Default: 0.3.
    pub baseline_allow_strength: f64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        let mut deny_strength_overrides = BTreeMap::new();
        deny_strength_overrides.insert("critical_pii:".to_string(), 0.95);
        deny_strength_overrides.insert("domain_blocked:".to_string(), 0.92);
        deny_strength_overrides.insert("credential_detected:".to_string(), 0.93);
        Self {
            solver_budget_ms: 50,
            memory_halflife_seconds: 604_800,
            preferred_enumeration_cap: 32,
            trust_strength_floor: 0.3,
            deny_strength_overrides,
            baseline_allow_strength: 0.3,
        }
    }
}

impl ArbiterConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> ArbiterResult<()> {
        if self.solver_budget_ms == 0 {
            return Err(ArbiterError::Config(
                "solver_budget_ms must be > 0".to_string(),
            ));
        }
        if self.memory_halflife_seconds == 0 {
            return Err(ArbiterError::Config(
                "memory_halflife_seconds must be > 0".to_string(),
            ));
        }
        if self.preferred_enumeration_cap == 0 {
            return Err(ArbiterError::Config(
                "preferred_enumeration_cap must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.trust_strength_floor) {
            return Err(ArbiterError::Config(format!(
                "trust_strength_floor must be in [0, 1], got {}",
                self.trust_strength_floor
            )));
        }
        if !(0.0..=1.0).contains(&self.baseline_allow_strength) {
            return Err(ArbiterError::Config(format!(
                "baseline_allow_strength must be in [0, 1], got {}",
                self.baseline_allow_strength
            )));
        }
        for (prefix, strength) in &self.deny_strength_overrides {
            if prefix.is_empty() {
                return Err(ArbiterError::Config(
                    "deny_strength_overrides must not contain an empty prefix".to_string(),
                ));
            }
            if !(0.0..=1.0).contains(strength) {
                return Err(ArbiterError::Config(format!(
                    "deny strength for prefix {prefix:?} must be in [0, 1], got {strength}"
                )));
            }
        }
        Ok(())
    }

    /// Load from JSON string. Unknown options are a startup error.
    pub fn from_json(json: &str) -> ArbiterResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ArbiterError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
