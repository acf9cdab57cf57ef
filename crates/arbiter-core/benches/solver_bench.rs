// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Arbiter Kernel Solver Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks proving grounded computation and preferred
//! enumeration hold comfortable headroom under the 50 ms solver budget.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arbiter_core::{
    Argument, ArgumentKind, ArgumentationFramework, Evidence, EvidenceNormalizer,
    ExtensionSolver, PolicySignal, ReputationSource, Resolver,
};
use arbiter_memory::DomainReputation;
use arbiter_types::{ArbiterConfig, ArbiterResult, Outcome, PatternCounters, PolicyVerdict};

fn typical_framework() -> ArgumentationFramework {
    // Two denies, two modifies, a trust, a suspicion, and the baseline.
    let mut af = ArgumentationFramework::new();
    let args = [
        ("deny:critical_pii: ssn", ArgumentKind::Deny, 0.95),
        ("deny:classified_content: internal", ArgumentKind::Deny, 0.9),
        ("modify:pii_redaction", ArgumentKind::Modify, 0.7),
        ("modify:tone", ArgumentKind::Modify, 0.7),
        ("trust:bench.test", ArgumentKind::Trust, 0.75),
        ("suspicion:bench.test", ArgumentKind::Suspicion, 0.5),
        ("allow:baseline", ArgumentKind::Baseline, 0.3),
    ];
    for (id, kind, strength) in args {
        af.add_argument(Argument::new(
            id,
            kind,
            strength,
            id,
            arbiter_core::EvidenceSource::Policy,
        ))
        .unwrap();
    }
    for deny in ["deny:critical_pii: ssn", "deny:classified_content: internal"] {
        af.add_attack(deny, "allow:baseline").unwrap();
        af.add_attack(deny, "modify:pii_redaction").unwrap();
        af.add_attack(deny, "modify:tone").unwrap();
        af.add_attack(deny, "trust:bench.test").unwrap();
    }
    af.add_attack("modify:pii_redaction", "allow:baseline").unwrap();
    af.add_attack("modify:tone", "allow:baseline").unwrap();
    af.add_attack("trust:bench.test", "modify:pii_redaction").unwrap();
    af.add_attack("trust:bench.test", "modify:tone").unwrap();
    af.add_attack("suspicion:bench.test", "allow:baseline").unwrap();
    af.add_attack("suspicion:bench.test", "trust:bench.test").unwrap();
    af
}

fn ring_framework(n: usize) -> ArgumentationFramework {
    // Even attack ring: worst-case-ish branching for the enumeration.
    let mut af = ArgumentationFramework::new();
    for i in 0..n {
        af.add_argument(Argument::new(
            format!("deny:ring{i:02}"),
            ArgumentKind::Deny,
            0.9,
            "ring",
            arbiter_core::EvidenceSource::Policy,
        ))
        .unwrap();
    }
    for i in 0..n {
        af.add_attack(&format!("deny:ring{i:02}"), &format!("deny:ring{:02}", (i + 1) % n))
            .unwrap();
    }
    af
}

struct UnknownReputation;

impl ReputationSource for UnknownReputation {
    fn reputation(&self, domain: &str, _now: f64) -> ArbiterResult<DomainReputation> {
        Ok(DomainReputation::unknown(domain))
    }
}

fn bench_grounded_typical(c: &mut Criterion) {
    let af = typical_framework();
    let solver = ExtensionSolver::new(50, 32);
    c.bench_function("solve_typical_7args", |b| {
        b.iter(|| solver.solve(black_box(&af)).unwrap())
    });
}

fn bench_preferred_ring16(c: &mut Criterion) {
    let af = ring_framework(16);
    let solver = ExtensionSolver::new(50, 32);
    c.bench_function("solve_ring_16args", |b| {
        b.iter(|| solver.solve(black_box(&af)).unwrap())
    });
}

fn bench_full_resolution(c: &mut Criterion) {
    let normalizer = EvidenceNormalizer::new(ArbiterConfig::default());
    let solver = ExtensionSolver::new(50, 32);
    let evidence = Evidence {
        domain: "bench.test".to_string(),
        pack: "standard".to_string(),
        counters: PatternCounters {
            ssn: 1,
            email: 2,
            ..PatternCounters::default()
        },
        policy: PolicySignal::Verdict(PolicyVerdict {
            decision: Outcome::Deny,
            deny_reasons: vec!["critical_pii: 1 SSN detected".to_string()],
            modification_list: vec!["pii_redaction".to_string()],
            matched_rules: vec!["pii_ssn".to_string()],
            risk_score_hint: 80,
        }),
    };
    c.bench_function("normalize_solve_resolve", |b| {
        b.iter(|| {
            let normalized = normalizer
                .normalize(black_box(&evidence), &UnknownReputation, 0.0)
                .unwrap();
            let outcome = solver.solve(&normalized.framework).unwrap();
            Resolver::resolve(
                &normalized.framework,
                outcome,
                normalized.risk_score_hint,
                normalized.substitutions,
            )
        })
    });
}

criterion_group!(
    benches,
    bench_grounded_typical,
    bench_preferred_ring16,
    bench_full_resolution
);
criterion_main!(benches);
