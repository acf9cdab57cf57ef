// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Arbiter Kernel Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Argumentation core for the Arbiter Kernel: the resolver that
//! reconciles conflicting admission signals (policy rules, sensitive
//! patterns, domain memory) through a Dung-style abstract argumentation
//! framework and projects the winning extension onto an
//! allow / allow-with-modifications / deny verdict.
//!
//! # Core Invariants
//!
//! 1. **The grounded extension always resolves**: preferred and stable
//!    enumeration may be abandoned at the solver budget, but a valid
//!    framework always yields the grounded fixpoint and a verdict
//!    derived from it. Budget exhaustion is a flag, never a panic.
//!
//! 2. **Determinism is byte-level**: identical evidence produces an
//!    identical `ResolutionResult`, including extension ordering and
//!    the defeated map. Strength comparisons snap to a 1e-9 epsilon
//!    before falling back to lexical argument ids.
//!
//! 3. **Degradations are audited**: every substituted signal (policy
//!    evaluator down, memory unreadable, observation not recorded)
//!    appears in the explanation — nothing is swallowed silently.
//!
//! 4. **Frameworks are private per request**: only the domain memory
//!    handle is shared; the normalizer, graph, and solver state belong
//!    to one resolution.

pub mod arbiter;
pub mod collaborators;
pub mod framework;
pub mod normalizer;
pub mod resolver;
pub mod solver;

pub use arbiter::Arbiter;
pub use collaborators::{
    ExternalDetector, ExternalPolicy, PatternDetector, PolicyEvaluator, ReputationSource,
    StaticDetector,
};
pub use framework::{Argument, ArgumentKind, ArgumentationFramework, EvidenceSource, IndexSet};
pub use normalizer::{Evidence, EvidenceNormalizer, NormalizedEvidence, PolicySignal};
pub use resolver::{Explanation, ResolutionResult, Resolver, WinnerEntry};
pub use solver::{Extension, ExtensionKind, ExtensionSolver, SolverOutcome};
