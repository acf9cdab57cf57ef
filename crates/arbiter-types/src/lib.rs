// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Arbiter Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! Arbiter Kernel — the admission gate that decides what content is
//! allowed to reach a Director-Class model.

pub mod config;
pub mod error;
pub mod evidence;

pub use config::ArbiterConfig;
pub use error::{ArbiterError, ArbiterResult};
pub use evidence::{clamp_range, clamp_unit, Outcome, PatternCounters, PolicyVerdict, Verdict};
