//! Integration tests for the negative binomial generator.
//!
//! Covers output domain, NaN fast path, construction failures, state replay,
//! copy isolation versus aliasing, external mode, JSON records and seeded
//! reproducibility.

use approx::assert_relative_eq;
use nbinom_core::{ErrorKind, ExternalPrng, Mt19937, Seed, SharedState};
use nbinom_sampler::{Config, GeneratorJson, NegativeBinomial, Options};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_bound(r: f64, p: f64, seed: u32) -> NegativeBinomial {
    NegativeBinomial::new(Config::bound(r, p).with_options(Options::new().seed(seed))).unwrap()
}

fn is_non_negative_integer(v: f64) -> bool {
    v >= 0.0 && v.is_finite() && v.fract() == 0.0
}

// ============================================================================
// Output domain
// ============================================================================

#[test]
fn test_unbound_draws_are_non_negative_integers() {
    let mut params = StdRng::seed_from_u64(3893);
    let mut rng = NegativeBinomial::new(Config::Unbound).unwrap();
    for _ in 0..100 {
        let r = (params.gen_range(0.0..100.0) + 0.5_f64).round();
        let p = params.gen_range(0.0001..0.9999);
        let v = rng.sample_with(r, p);
        assert!(is_non_negative_integer(v), "NegativeBinomial({}, {}) => {}", r, p, v);
    }
}

#[test]
fn test_bound_mean_and_variance() {
    // Failures before the r-th success: mean r(1-p)/p, variance r(1-p)/p^2.
    let (r, p) = (10.0, 0.4);
    let mut rng = seeded_bound(r, p, 12345);
    let n = 200_000;
    let draws = rng.samples(n);
    let mean = draws.iter().sum::<f64>() / n as f64;
    let variance = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    assert_relative_eq!(mean, r * (1.0 - p) / p, max_relative = 0.02);
    assert_relative_eq!(variance, r * (1.0 - p) / (p * p), max_relative = 0.05);
}

#[test]
fn test_fill_matches_samples() {
    let mut a = seeded_bound(4.0, 0.3, 77);
    let mut b = seeded_bound(4.0, 0.3, 77);
    let mut buffer = vec![0.0; 64];
    a.fill(&mut buffer);
    assert_eq!(buffer, b.samples(64));
}

// ============================================================================
// Relaxed per-call validation
// ============================================================================

#[test]
fn test_unbound_invalid_inputs_return_nan() {
    let mut rng = NegativeBinomial::new(Config::Unbound).unwrap();
    for (r, p) in [
        (f64::NAN, 0.5),
        (10.0, f64::NAN),
        (10.0, 0.0),
        (10.0, -0.5),
        (10.0, 1.0),
        (10.0, 1.5),
    ] {
        assert!(rng.sample_with(r, p).is_nan(), "({}, {}) should be NaN", r, p);
    }
}

#[test]
fn test_subnormal_p() {
    let mut rng = NegativeBinomial::new(Config::Unbound).unwrap();
    assert!(rng.sample_with(10.0, 1e-310).is_nan());

    let err = NegativeBinomial::bound(10.0, 1e-310).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

// ============================================================================
// Strict construction validation
// ============================================================================

#[test]
fn test_invalid_bound_construction() {
    let cases = [
        (0.0, 0.5, ErrorKind::Range),
        (-2.0, 0.5, ErrorKind::Range),
        (f64::INFINITY, 0.5, ErrorKind::Range),
        (f64::NAN, 0.5, ErrorKind::Type),
        (10.0, 0.0, ErrorKind::Range),
        (10.0, 1.0, ErrorKind::Range),
        (10.0, f64::NAN, ErrorKind::Type),
    ];
    for (r, p, kind) in cases {
        let err = NegativeBinomial::bound(r, p).unwrap_err();
        assert_eq!(err.kind(), kind, "({}, {})", r, p);

        let err = NegativeBinomial::new(Config::bound(r, p).with_options(Options::new().seed(1)))
            .unwrap_err();
        assert_eq!(err.kind(), kind, "({}, {}) with options", r, p);
    }
}

#[test]
fn test_non_numeric_parameters_from_json() {
    use serde_json::json;
    let err = NegativeBinomial::from_json_args(&[json!("10"), json!(0.5)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    let err = NegativeBinomial::from_json_args(&[json!(10), json!([0.5])]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    let err = NegativeBinomial::from_json_args(&[json!(10), json!(0.5), json!("opts")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    let err = NegativeBinomial::from_json_args(&[json!({ "copy": null })]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);

    let rng = NegativeBinomial::from_json_args(&[json!(10), json!(0.5), json!({ "seed": 297 })])
        .unwrap();
    assert_eq!(rng.params(), Some((10.0, 0.5)));
    assert_eq!(rng.seed(), Some(vec![297]));
}

// ============================================================================
// State replay
// ============================================================================

#[test]
fn test_bound_state_replay() {
    let mut rng = seeded_bound(100.0, 0.75, 42);
    for _ in 0..100 {
        rng.sample();
    }
    let state = rng.state().unwrap();
    let first = rng.samples(100);
    rng.set_state(state).unwrap();
    assert_eq!(rng.samples(100), first);
}

#[test]
fn test_state_read_is_a_copy() {
    let mut rng = seeded_bound(5.0, 0.5, 8);
    let state = rng.state().unwrap();
    rng.samples(10);
    assert_ne!(rng.state().unwrap(), state);
}

#[test]
fn test_introspection_lengths() {
    let rng = NegativeBinomial::new(
        Config::UnboundWithOptions(Options::new().seed(vec![1, 2, 3, 4])),
    )
    .unwrap();
    assert_eq!(rng.seed(), Some(vec![1, 2, 3, 4]));
    assert_eq!(rng.seed_length(), Some(4));
    assert_eq!(rng.state_length(), Some(634));
    assert_eq!(rng.byte_length(), Some(634 * 4));
    assert_eq!(rng.state().map(|s| s.len()), rng.state_length());
}

// ============================================================================
// Copy isolation versus aliasing
// ============================================================================

fn mutated(words: &[u32]) -> Vec<u32> {
    Mt19937::from_seed(Seed::Scalar(words[3].wrapping_add(1)))
        .unwrap()
        .state()
}

#[test]
fn test_copy_true_isolates_supplied_state() {
    let original = Mt19937::from_seed(Seed::Scalar(2024)).unwrap().state();
    let buffer = SharedState::from(original.clone());

    let mut a = NegativeBinomial::new(
        Config::bound(10.0, 0.5).with_options(Options::new().state(&buffer)),
    )
    .unwrap();
    let replacement = mutated(&original);
    buffer.with_mut(|w| w.copy_from_slice(&replacement));

    let mut fresh = NegativeBinomial::new(
        Config::bound(10.0, 0.5).with_options(Options::new().state(original)),
    )
    .unwrap();
    assert_eq!(a.samples(50), fresh.samples(50));
}

#[test]
fn test_copy_false_aliases_supplied_state() {
    let original = Mt19937::from_seed(Seed::Scalar(2024)).unwrap().state();
    let buffer = SharedState::from(original.clone());

    let mut a = NegativeBinomial::new(
        Config::bound(10.0, 0.5).with_options(Options::new().state(&buffer).copy(false)),
    )
    .unwrap();
    let replacement = mutated(&original);
    buffer.with_mut(|w| w.copy_from_slice(&replacement));

    let mut expected = NegativeBinomial::new(
        Config::bound(10.0, 0.5).with_options(Options::new().state(replacement)),
    )
    .unwrap();
    let mut unmutated = NegativeBinomial::new(
        Config::bound(10.0, 0.5).with_options(Options::new().state(original)),
    )
    .unwrap();
    let observed = a.samples(50);
    assert_eq!(observed, expected.samples(50));
    assert_ne!(observed, unmutated.samples(50));
}

#[test]
fn test_copy_false_draws_advance_caller_buffer() {
    let buffer = SharedState::from(Mt19937::from_seed(Seed::Scalar(5)).unwrap().state());
    let before = buffer.to_vec();
    let mut rng = NegativeBinomial::new(
        Config::bound(3.0, 0.5).with_options(Options::new().state(&buffer).copy(false)),
    )
    .unwrap();
    rng.sample();
    assert_ne!(buffer.to_vec(), before);
    assert_eq!(rng.state().unwrap(), buffer.to_vec());
}

#[test]
fn test_set_state_copy_semantics() {
    let words = Mt19937::from_seed(Seed::Scalar(31)).unwrap().state();

    let copying = seeded_bound(2.0, 0.5, 1);
    let handle = SharedState::from(words.clone());
    copying.set_state(&handle).unwrap();
    handle.set(3, handle.get(3).unwrap() ^ 1);
    assert_eq!(copying.state().unwrap(), words);

    let aliasing = NegativeBinomial::new(
        Config::bound(2.0, 0.5).with_options(Options::new().seed(1).copy(false)),
    )
    .unwrap();
    let handle = SharedState::from(words.clone());
    aliasing.set_state(&handle).unwrap();
    handle.set(3, handle.get(3).unwrap() ^ 1);
    assert_eq!(aliasing.state().unwrap(), handle.to_vec());
}

// ============================================================================
// External mode
// ============================================================================

#[test]
fn test_external_mode_hides_state() {
    let mt = Mt19937::from_seed(Seed::Scalar(1)).unwrap();
    let rng = NegativeBinomial::new(Config::UnboundWithOptions(
        Options::new().prng(ExternalPrng::new(move || mt.uniform())),
    ))
    .unwrap();
    assert!(rng.is_external());
    assert_eq!(rng.seed(), None);
    assert_eq!(rng.seed_length(), None);
    assert_eq!(rng.state(), None);
    assert_eq!(rng.state_length(), None);
    assert_eq!(rng.byte_length(), None);
    assert!(rng.to_json().is_none());
    assert!(rng.set_state(vec![1, 2, 3]).is_ok());
    assert_eq!(rng.state(), None);
    assert_eq!(rng.name(), NegativeBinomial::NAME);
}

#[test]
fn test_external_mode_draws_from_closure() {
    let make = || {
        let mt = Mt19937::from_seed(Seed::Scalar(55)).unwrap();
        ExternalPrng::new(move || mt.uniform())
    };
    let mut a = NegativeBinomial::new(Config::bound(6.0, 0.3).with_options(Options::new().prng(make())))
        .unwrap();
    let mut b = NegativeBinomial::new(Config::bound(6.0, 0.3).with_options(Options::new().prng(make())))
        .unwrap();
    let draws = a.samples(100);
    assert!(draws.iter().all(|&v| is_non_negative_integer(v)));
    assert_eq!(draws, b.samples(100));
}

#[test]
fn test_external_mode_mean_and_variance() {
    let (r, p) = (10.0, 0.4);
    let mt = Mt19937::from_seed(Seed::Scalar(777)).unwrap();
    let prng = ExternalPrng::new(move || mt.uniform());
    let mut rng =
        NegativeBinomial::new(Config::bound(r, p).with_options(Options::new().prng(prng))).unwrap();
    let n = 200_000;
    let draws = rng.samples(n);
    let mean = draws.iter().sum::<f64>() / n as f64;
    let variance = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    assert_relative_eq!(mean, r * (1.0 - p) / p, max_relative = 0.02);
    assert_relative_eq!(variance, r * (1.0 - p) / (p * p), max_relative = 0.05);
}

// ============================================================================
// JSON records
// ============================================================================

#[test]
fn test_to_json_records_params() {
    let mut rng = seeded_bound(10.0, 0.5, 297);
    rng.samples(25);
    let record = rng.to_json().unwrap();
    assert_eq!(record.record_type, "PRNG");
    assert_eq!(record.name, "negative-binomial");
    assert_eq!(record.state.array_type, "Uint32Array");
    assert_eq!(record.params, vec![10.0, 0.5]);

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["type"], "PRNG");
    assert_eq!(value["state"]["type"], "Uint32Array");
    assert_eq!(value["params"], serde_json::json!([10.0, 0.5]));

    let unbound = NegativeBinomial::new(Config::Unbound).unwrap();
    assert!(unbound.to_json().unwrap().params.is_empty());
}

#[test]
fn test_revive_from_json_replays() {
    let mut rng = seeded_bound(10.0, 0.5, 297);
    rng.samples(25);
    let text = serde_json::to_string(&rng.to_json().unwrap()).unwrap();
    let expected = rng.samples(100);

    let record: GeneratorJson = serde_json::from_str(&text).unwrap();
    let mut revived = NegativeBinomial::from_json(&record).unwrap();
    assert_eq!(revived.params(), Some((10.0, 0.5)));
    assert_eq!(revived.samples(100), expected);
}

// ============================================================================
// Seeded reproducibility
// ============================================================================

#[test]
fn test_seed_297_is_reproducible() {
    let head = seeded_bound(10.0, 0.5, 297).samples(10);
    assert_eq!(head, vec![7.0, 3.0, 13.0, 11.0, 16.0, 8.0, 18.0, 17.0, 6.0, 4.0]);

    let reference = seeded_bound(10.0, 0.5, 297).samples(100);
    for _ in 0..5 {
        assert_eq!(seeded_bound(10.0, 0.5, 297).samples(100), reference);
    }
    assert_ne!(seeded_bound(10.0, 0.5, 298).samples(100), reference);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Valid parameters always give a non-negative integer.
    #[test]
    fn prop_valid_parameters_give_counts(
        seed in any::<u32>(),
        r in 0.01f64..500.0,
        p in 0.001f64..0.999,
    ) {
        let mut rng = NegativeBinomial::new(
            Config::UnboundWithOptions(Options::new().seed(seed)),
        ).unwrap();
        for _ in 0..20 {
            let v = rng.sample_with(r, p);
            prop_assert!(is_non_negative_integer(v), "NB({}, {}) => {}", r, p, v);
        }
    }

    /// Restoring a captured state replays the same draws for any N.
    #[test]
    fn prop_state_replay(seed in any::<u32>(), warmup in 0..50usize, n in 1..100usize) {
        let mut rng = seeded_bound(7.5, 0.35, seed);
        rng.samples(warmup);
        let state = rng.state().unwrap();
        let first = rng.samples(n);
        rng.set_state(state).unwrap();
        prop_assert_eq!(rng.samples(n), first);
    }
}
