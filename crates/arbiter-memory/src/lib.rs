// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Arbiter Kernel Domain Memory
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Durable per-domain decision memory for the Arbiter Kernel.
//!
//! One append-only text log, one observation per line, and a
//! recency-weighted reputation derived on demand. The store is an
//! explicit handle passed to its consumers — never a process global.
//!
//! # Durability Invariants
//!
//! 1. **An acknowledged append survives a restart**: `store()` flushes
//!    and syncs the log before returning, so a subsequent `open()`
//!    observes every entry that was acknowledged.
//! 2. **Torn trailing writes never poison a load**: a final line with
//!    no terminator is skipped (and logged), never parsed.
//! 3. **Timestamps never run backwards**: an entry older than the last
//!    accepted one is clamped forward, and the clamp is recorded in the
//!    entry's `meta` map.

pub mod reputation;
pub mod store;

pub use reputation::{DomainReputation, ReputationLabel};
pub use store::{KnowledgeEntry, MemoryStats, MemoryStore};
