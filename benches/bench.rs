// Criterion benchmarks for candidate selection

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mbti_match::core::{compatible_types, is_eligible, CandidateSelector, PERSONALITY_TYPES};
use mbti_match::models::{Gender, MatchingStatus, User};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn create_candidate(id: usize) -> User {
    User {
        id: id as i64,
        name: format!("User {}", id),
        personality_type: PERSONALITY_TYPES[id % PERSONALITY_TYPES.len()].to_string(),
        gender: if id % 2 == 0 { Gender::Female } else { Gender::Male },
        matching_status: if id % 5 == 0 {
            MatchingStatus::Waiting
        } else {
            MatchingStatus::None
        },
    }
}

fn create_requester() -> User {
    User {
        id: 0,
        name: "Requester".to_string(),
        personality_type: "INFP".to_string(),
        gender: Gender::Male,
        matching_status: MatchingStatus::None,
    }
}

fn bench_compatibility_lookup(c: &mut Criterion) {
    c.bench_function("compatible_types", |b| {
        b.iter(|| {
            for code in PERSONALITY_TYPES {
                black_box(compatible_types(black_box(code)));
            }
        });
    });
}

fn bench_eligibility(c: &mut Criterion) {
    let requester = create_requester();
    let candidate = create_candidate(2);

    c.bench_function("is_eligible", |b| {
        b.iter(|| is_eligible(black_box(&requester), black_box(&candidate)));
    });
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_candidates");
    let selector = CandidateSelector::default();
    let requester = create_requester();

    for size in [16usize, 64, 256, 1024] {
        let candidates: Vec<User> = (1..=size).map(create_candidate).collect();
        let mut rng = StdRng::seed_from_u64(size as u64);

        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| selector.rank(&requester, black_box(candidates.clone()), &mut rng));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compatibility_lookup, bench_eligibility, bench_rank);
criterion_main!(benches);
