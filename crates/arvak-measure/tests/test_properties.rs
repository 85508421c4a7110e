//! Property-based tests for expectation estimation.
//!
//! Checks invariants that must hold for any state: results stay inside the
//! eigenvalue range, and batched evaluation agrees with per-element calls.

use arvak_measure::observable::Diagonal;
use arvak_measure::state::{batch, batch_samples};
use arvak_measure::{expval, math, ExpectationEstimator, Statevector, Wires};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Gate operations used to build random states.
#[derive(Debug, Clone)]
enum GateOp {
    H(usize),
    X(usize),
    Ry(usize, f64),
    Rz(usize, f64),
    CX(usize, usize),
}

impl GateOp {
    fn apply(&self, sv: &mut Statevector) {
        let applied = match *self {
            GateOp::H(q) => sv.h(q),
            GateOp::X(q) => sv.x(q),
            GateOp::Ry(q, t) => sv.ry(q, t),
            GateOp::Rz(q, t) => sv.rz(q, t),
            GateOp::CX(c, t) => sv.cx(c, t),
        };
        applied.unwrap();
    }
}

fn arb_gate_op(n: usize) -> impl Strategy<Value = GateOp> {
    let angle = -std::f64::consts::PI..std::f64::consts::PI;
    prop_oneof![
        (0..n).prop_map(GateOp::H),
        (0..n).prop_map(GateOp::X),
        ((0..n), angle.clone()).prop_map(|(q, t)| GateOp::Ry(q, t)),
        ((0..n), angle).prop_map(|(q, t)| GateOp::Rz(q, t)),
        ((0..n), (0..n))
            .prop_filter("control and target must differ", |(c, t)| c != t)
            .prop_map(|(c, t)| GateOp::CX(c, t)),
    ]
}

fn arb_state(n: usize) -> impl Strategy<Value = Statevector> {
    prop::collection::vec(arb_gate_op(n), 0..12).prop_map(move |ops| {
        let mut sv = Statevector::new(n);
        for op in &ops {
            op.apply(&mut sv);
        }
        sv
    })
}

fn arb_eigenvalues(n: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-10.0f64..10.0, 1 << n)
}

fn range_of(ev: &[f64]) -> (f64, f64) {
    let lo = ev.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = ev.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}

proptest! {
    #[test]
    fn exact_expectation_within_eigenvalue_range(
        sv in arb_state(3),
        ev in arb_eigenvalues(2),
    ) {
        let wires = Wires::new([2, 0]).unwrap();
        let mp = expval(Diagonal::real(ev.clone(), wires).unwrap());
        let got = ExpectationEstimator::new()
            .process_state(&mp, sv.view(), &Wires::range(3))
            .unwrap();
        let got = math::scalar(&got).unwrap();
        let (lo, hi) = range_of(&ev);
        prop_assert!(got >= lo - 1e-9 && got <= hi + 1e-9, "{got} not in [{lo}, {hi}]");
    }

    #[test]
    fn sampled_expectation_within_eigenvalue_range(
        sv in arb_state(2),
        ev in arb_eigenvalues(2),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = sv.sample_bits(32, &mut rng).into_dyn();
        let mp = expval(Diagonal::real(ev.clone(), Wires::range(2)).unwrap());
        let got = ExpectationEstimator::new()
            .process_samples(&mp, samples.view(), &Wires::range(2), None, None)
            .unwrap();
        let got = math::scalar(&got).unwrap();
        let (lo, hi) = range_of(&ev);
        prop_assert!(got >= lo - 1e-9 && got <= hi + 1e-9);
    }

    #[test]
    fn batched_state_matches_individual_calls(
        states in prop::collection::vec(arb_state(2), 2..5),
        ev in arb_eigenvalues(1),
    ) {
        let mp = expval(Diagonal::real(ev, Wires::single(1)).unwrap());
        let est = ExpectationEstimator::new();
        let order = Wires::range(2);

        let stacked = batch(&states).unwrap();
        let batched = est.process_state(&mp, stacked.view(), &order).unwrap();
        prop_assert_eq!(batched.shape(), &[states.len()]);

        for (sv, b) in states.iter().zip(batched.iter()) {
            let single = est.process_state(&mp, sv.view(), &order).unwrap();
            prop_assert!((math::scalar(&single).unwrap() - b).abs() < 1e-12);
        }
    }

    #[test]
    fn batched_samples_match_individual_calls(
        states in prop::collection::vec(arb_state(2), 2..4),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let blocks: Vec<_> = states.iter().map(|sv| sv.sample_bits(16, &mut rng)).collect();
        let mp = expval(Diagonal::real([1.0, 2.0, 3.0, 4.0], Wires::range(2)).unwrap());
        let est = ExpectationEstimator::new();
        let order = Wires::range(2);

        let stacked = batch_samples(&blocks).unwrap();
        let batched = est.process_samples(&mp, stacked.view(), &order, None, Some(4)).unwrap();
        prop_assert_eq!(batched.shape(), &[states.len(), 4]);

        for (i, block) in blocks.iter().enumerate() {
            let single = est
                .process_samples(&mp, block.view().into_dyn(), &order, None, Some(4))
                .unwrap();
            for (j, v) in single.iter().enumerate() {
                prop_assert!((batched[[i, j]] - v).abs() < 1e-12);
            }
        }
    }
}
