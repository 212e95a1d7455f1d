use std::collections::{HashMap, HashSet};

use orgseed_core::EngineError;
use orgseed_core::distribute::{Placed, distribute};
use orgseed_core::owner::{OwnerCandidate, OwnerSelector, QuotaLedger};
use rand::SeedableRng;
use rand::rngs::StdRng;
use statrs::distribution::{ChiSquared, ContinuousCDF};

const TRIALS: usize = 20_000;

fn selection_frequencies(
    always: &OwnerCandidate,
    optional: &[OwnerCandidate],
    seed: u64,
) -> HashMap<String, usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut quotas = QuotaLedger::new();
    let mut counts = HashMap::new();
    for _ in 0..TRIALS {
        let chosen = OwnerSelector::select("001A", always, optional, &mut quotas, &mut rng)
            .expect("always-eligible candidate present");
        *counts.entry(chosen.user_id.clone()).or_insert(0) += 1;
    }
    counts
}

fn assert_matches_weights(always: OwnerCandidate, optional: Vec<OwnerCandidate>, seed: u64) {
    let counts = selection_frequencies(&always, &optional, seed);
    let roster: Vec<&OwnerCandidate> = std::iter::once(&always).chain(&optional).collect();
    let total_weight: f64 = roster.iter().map(|c| c.weight).sum();

    let mut chi_squared = 0.0_f64;
    for candidate in &roster {
        let expected_share = candidate.weight / total_weight;
        let observed = *counts.get(&candidate.user_id).unwrap_or(&0) as f64;
        let expected = expected_share * TRIALS as f64;
        chi_squared += (observed - expected).powi(2) / expected;

        let observed_share = observed / TRIALS as f64;
        assert!(
            (observed_share - expected_share).abs() < 0.05,
            "{} selected {:.4} of the time, expected {:.4}",
            candidate.user_id,
            observed_share,
            expected_share
        );
    }

    let dist = ChiSquared::new((roster.len() - 1) as f64).expect("valid degrees of freedom");
    let p_value = 1.0 - dist.cdf(chi_squared);
    assert!(
        p_value > 0.001,
        "chi-squared {chi_squared:.3} (p = {p_value:.5}) rejects the weight model"
    );
}

#[test]
fn selection_frequency_converges_to_normalized_weights() {
    assert_matches_weights(
        OwnerCandidate::new("005ME", 0.55),
        vec![
            OwnerCandidate::new("005KP", 0.35),
            OwnerCandidate::new("005WH", 0.10),
        ],
        2024,
    );
}

#[test]
fn weights_that_do_not_sum_to_one_are_normalized() {
    assert_matches_weights(
        OwnerCandidate::new("005ME", 0.2),
        vec![
            OwnerCandidate::new("005KP", 0.3),
            OwnerCandidate::new("005WH", 0.5),
            OwnerCandidate::new("005JD", 0.5),
        ],
        77,
    );
}

#[test]
fn exhausted_quota_candidate_is_never_selected_again() {
    const QUOTA: u32 = 4;
    let always = OwnerCandidate::new("005ME", 0.05);
    let optional = vec![OwnerCandidate::new("005WH", 0.95).restricted_to("001A")];
    let mut quotas = QuotaLedger::new().with_quota("005WH", QUOTA);
    let mut rng = StdRng::seed_from_u64(9);

    let mut picks = 0u32;
    for _ in 0..2_000 {
        let chosen = OwnerSelector::select("001A", &always, &optional, &mut quotas, &mut rng)
            .expect("selection succeeds");
        if chosen.user_id == "005WH" {
            picks += 1;
            assert!(picks <= QUOTA, "quota candidate picked {picks} times");
        }
    }
    assert_eq!(picks, QUOTA);
    assert_eq!(quotas.remaining("005WH"), Some(0));
}

#[test]
fn scope_restricted_candidate_never_leaves_its_scope() {
    let always = OwnerCandidate::new("005ME", 0.01);
    let optional = vec![
        OwnerCandidate::new("005WH", 0.99).restricted_to("001S1"),
        OwnerCandidate::new("005KP", 0.01),
    ];
    let mut quotas = QuotaLedger::new();
    let mut rng = StdRng::seed_from_u64(31);
    for _ in 0..10_000 {
        let chosen = OwnerSelector::select("001S2", &always, &optional, &mut quotas, &mut rng)
            .expect("selection succeeds");
        assert_ne!(chosen.user_id, "005WH");
    }
}

#[test]
fn partition_sizes_cover_items_exactly() {
    let mut rng = StdRng::seed_from_u64(5);
    for m in 1..=40usize {
        for k in 1..=9usize {
            let items: Vec<Placed<usize, usize>> = (0..m).map(|idx| Placed::new(idx, 0)).collect();
            let buckets: Vec<usize> = (0..k).collect();
            let dist = distribute(items, &buckets, &mut rng).expect("non-empty inputs");

            let sizes: Vec<usize> = dist.shares().iter().map(|s| s.items.len()).collect();
            assert_eq!(sizes.iter().sum::<usize>(), m);
            assert!(sizes.iter().all(|&s| s == m / k || s == m / k + 1));
            assert_eq!(sizes.iter().filter(|&&s| s == m / k + 1).count(), m % k);

            let mut seen = HashSet::new();
            for share in dist.shares() {
                for item in &share.items {
                    assert!(seen.insert(*item), "item {item} assigned twice");
                }
            }
            assert_eq!(seen.len(), m);
        }
    }
}

#[test]
fn ten_tasks_over_four_projects_move_only_off_origin() {
    let items: Vec<Placed<String, &str>> = (1..=10)
        .map(|idx| Placed::new(format!("t{idx}"), "B0"))
        .collect();
    let buckets = ["B0", "B1", "B2", "B3"];
    let mut rng = StdRng::seed_from_u64(10);
    let dist = distribute(items, &buckets, &mut rng).expect("valid input");

    let kept = dist.count_for(&"B0");
    assert_eq!(kept, 3);
    assert_eq!(dist.moves().len(), 10 - kept);
    for mv in dist.moves() {
        assert_eq!(mv.from, "B0");
        assert_ne!(mv.to, "B0");
    }

    let moved: HashSet<&str> = dist.moves().iter().map(|mv| mv.item.as_str()).collect();
    let home = dist.items_for(&"B0").expect("origin is a target");
    assert!(home.iter().all(|item| !moved.contains(item.as_str())));
}

#[test]
fn shuffle_varies_between_seeds() {
    let build = || -> Vec<Placed<u32, u8>> { (0..20).map(|idx| Placed::new(idx, 0)).collect() };
    let a = distribute(build(), &[0, 1], &mut StdRng::seed_from_u64(1)).unwrap();
    let b = distribute(build(), &[0, 1], &mut StdRng::seed_from_u64(2)).unwrap();
    assert_ne!(a.items_for(&0), b.items_for(&0));
}

#[test]
fn empty_items_or_buckets_fail_with_invalid_input() {
    let mut rng = StdRng::seed_from_u64(0);
    let no_items: Vec<Placed<&str, &str>> = Vec::new();
    assert!(matches!(
        distribute(no_items, &["B0"], &mut rng),
        Err(EngineError::InvalidInput { .. })
    ));

    let one_item = vec![Placed::new("t1", "B0")];
    let no_buckets: [&str; 0] = [];
    assert!(matches!(
        distribute(one_item, &no_buckets, &mut rng),
        Err(EngineError::InvalidInput { .. })
    ));
}
