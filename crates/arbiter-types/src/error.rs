// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Arbiter Kernel Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Arbiter Kernel failures.
#[derive(Error, Debug)]
pub enum ArbiterError {
    /// Domain memory log could not be read or appended.
    #[error("memory store unavailable: {0}")]
    StoreUnavailable(String),

    /// External policy evaluator failed to produce a verdict.
    #[error("policy evaluator unavailable: {0}")]
    PolicyUnavailable(String),

    /// Argument graph violates a structural invariant
    /// (duplicate id, dangling attack endpoint, non-finite strength).
    #[error("invalid framework: {0}")]
    InvalidFramework(String),

    /// Preferred/stable enumeration exceeded the solver budget.
    /// Non-fatal: the resolution degrades to the grounded extension.
    #[error("time budget exceeded: enumeration passed the {budget_ms}ms solver budget")]
    TimeBudgetExceeded { budget_ms: u64 },

    /// Configuration error (startup only).
    #[error("config error: {0}")]
    Config(String),
}

pub type ArbiterResult<T> = Result<T, ArbiterError>;
