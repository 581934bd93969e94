//! Property tests for the evaluator and the target selector

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use number_quest::sim::{Bucket, Operator, SynthesisError, TARGET_CATALOG, bucket_for_index, evaluate, select_target};

fn operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Add),
        Just(Operator::Sub),
        Just(Operator::Mul),
        Just(Operator::Div),
    ]
}

proptest! {
    #[test]
    fn results_are_never_negative(lhs in 0i64..10_000, op in operator(), rhs in 0i64..10_000) {
        if let Ok(v) = evaluate(lhs, op, rhs) {
            prop_assert!(v >= 0);
        }
    }

    #[test]
    fn evaluation_is_deterministic(lhs in 0i64..10_000, op in operator(), rhs in 0i64..10_000) {
        prop_assert_eq!(evaluate(lhs, op, rhs), evaluate(lhs, op, rhs));
    }

    #[test]
    fn division_is_exact(lhs in 0i64..1_000, rhs in 1i64..100) {
        match evaluate(lhs, Operator::Div, rhs) {
            Ok(q) => prop_assert_eq!(q * rhs, lhs),
            Err(e) => prop_assert_eq!(e, SynthesisError::NotDivisible(lhs, rhs)),
        }
    }

    #[test]
    fn subtraction_below_zero_is_rejected(lhs in 0i64..100, extra in 1i64..100) {
        prop_assert_eq!(evaluate(lhs, Operator::Sub, lhs + extra), Err(SynthesisError::NegativeResult));
    }

    #[test]
    fn selected_targets_come_from_their_bucket(seed in any::<u64>(), index in 0u32..200, draws in 0u32..6) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let target = select_target(index, draws, &mut rng);
        prop_assert!(bucket_for_index(index, draws).contains(&target));
        prop_assert!(TARGET_CATALOG.contains(&target));
    }
}

#[test]
fn warmup_then_cycle() {
    for i in 0..3 {
        assert_eq!(bucket_for_index(i, 0), Bucket::Warmup);
    }
    let long: Vec<_> = (3..9).map(|i| bucket_for_index(i, 0)).collect();
    assert_eq!(
        long,
        vec![Bucket::Low, Bucket::Low, Bucket::Low, Bucket::Medium, Bucket::High, Bucket::Legend]
    );
    let short: Vec<_> = (3..8).map(|i| bucket_for_index(i, 2)).collect();
    assert_eq!(short, vec![Bucket::Low, Bucket::Low, Bucket::Medium, Bucket::High, Bucket::Legend]);
}
