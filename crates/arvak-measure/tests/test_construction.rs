//! Tests for building measurement processes.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arvak_measure::observable::{BasisStateProjector, Diagonal, Observable, PauliX, PauliZ};
use arvak_measure::{
    expval, expval_with_config, EstimatorConfig, ExpectationEstimator, ExpectationMP,
    MeasureError, MeasurementValue, NumericType, OutputShape, ReturnType, ShotCopies, Shots,
    Statevector, Wires,
};
use num_complex::Complex64;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Counts events at WARN level.
#[derive(Clone, Default)]
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn count_warnings(f: impl FnOnce()) -> usize {
    let counter = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    tracing::subscriber::with_default(subscriber, f);
    counter.0.load(Ordering::SeqCst)
}

fn non_hermitian() -> Diagonal {
    Diagonal::new(
        [Complex64::new(1.0, 0.5), Complex64::new(-1.0, 0.0)],
        Wires::range(1),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Builder validation
// ---------------------------------------------------------------------------

#[test]
fn builder_requires_a_target() {
    let err = ExpectationMP::builder().build();
    assert!(matches!(err, Err(MeasureError::Configuration(_))));
}

#[test]
fn builder_rejects_observable_and_value() {
    let err = ExpectationMP::builder()
        .observable(PauliZ::new(0))
        .measurement_value(MeasurementValue::bit(0))
        .build();
    assert!(matches!(err, Err(MeasureError::Configuration(_))));
}

#[test]
fn builder_rejects_observable_with_eigenvalues() {
    let err = ExpectationMP::builder()
        .observable(PauliZ::new(0))
        .wires(Wires::range(1))
        .eigenvalues([1.0, -1.0])
        .build();
    assert!(matches!(err, Err(MeasureError::Configuration(_))));
}

#[test]
fn builder_requires_wires_with_eigenvalues() {
    let only_ev = ExpectationMP::builder().eigenvalues([1.0, -1.0]).build();
    assert!(matches!(only_ev, Err(MeasureError::Configuration(_))));

    let only_wires = ExpectationMP::builder().wires(Wires::range(1)).build();
    assert!(matches!(only_wires, Err(MeasureError::Configuration(_))));
}

#[test]
fn builder_checks_eigenvalue_count() {
    let err = ExpectationMP::builder()
        .wires(Wires::range(2))
        .eigenvalues([1.0, -1.0])
        .build();
    assert!(matches!(err, Err(MeasureError::Configuration(_))));
}

#[test]
fn builder_rejects_unindexable_wire_count() {
    let err = ExpectationMP::builder()
        .wires(Wires::range(usize::BITS as usize))
        .eigenvalues([1.0, -1.0])
        .build();
    assert!(matches!(err, Err(MeasureError::Configuration(_))));
}

#[test]
fn builder_keeps_id() {
    let mp = ExpectationMP::builder()
        .observable(PauliX::new(3))
        .id("x3")
        .build()
        .unwrap();
    assert_eq!(mp.id(), Some("x3"));
    assert_eq!(mp.wires(), &Wires::single(3));
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[test]
fn return_and_numeric_types() {
    let mp = expval(MeasurementValue::bit("m0"));
    assert_eq!(mp.return_type(), ReturnType::Expectation);
    assert_eq!(mp.numeric_type(), NumericType::Float);
    assert!(mp.measurement_value().is_some());
    assert_eq!(mp.to_string(), "expval(MeasurementValue(wires=['m0']))");
}

#[test]
fn shape_for_unpartitioned_shots_is_scalar() {
    let mp = expval(PauliZ::new(0));
    assert_eq!(mp.shape(&Shots::analytic()), OutputShape::Scalar);
    assert_eq!(mp.shape(&Shots::from(1000)), OutputShape::Scalar);
    assert!(mp.shape(&Shots::from(1000)).is_empty());
}

#[test]
fn shape_for_shot_vector() {
    let mp = expval(PauliZ::new(0));
    let shots = Shots::from_vec([10, 10, 20, 20, 20]);
    assert_eq!(shots.shot_vector().len(), 2);
    let shape = mp.shape(&shots);
    assert_eq!(shape, OutputShape::ShotVector(5));
    assert_eq!(shape.len(), 5);

    let copies = Shots::from_copies([ShotCopies { shots: 100, copies: 3 }]);
    assert_eq!(mp.shape(&copies), OutputShape::ShotVector(3));
}

// ---------------------------------------------------------------------------
// Hermiticity warning
// ---------------------------------------------------------------------------

#[test]
fn non_hermitian_observable_warns_once() {
    let mut mp = None;
    let warnings = count_warnings(|| mp = Some(expval(non_hermitian())));
    assert_eq!(warnings, 1);
    // Construction still succeeds.
    let mp = mp.unwrap();
    assert!(!mp.obs().unwrap().is_hermitian());
}

#[test]
fn hermitian_observable_does_not_warn() {
    let warnings = count_warnings(|| {
        let _ = expval(PauliZ::new(0));
        let _ = expval(BasisStateProjector::from_bitstring("1", Wires::range(1)));
    });
    assert_eq!(warnings, 0);
}

#[test]
fn warning_can_be_disabled() {
    let config = EstimatorConfig {
        warn_non_hermitian: false,
        ..EstimatorConfig::default()
    };
    let warnings = count_warnings(|| {
        let _ = expval_with_config(non_hermitian(), &config);
    });
    assert_eq!(warnings, 0);
}

#[test]
fn config_tolerance_accepts_near_hermitian() {
    let config = EstimatorConfig::from_yaml("hermitian_atol: 1.0e-3\n").unwrap();
    let d = config
        .diagonal(
            [Complex64::new(1.0, 1e-6), Complex64::new(-1.0, 0.0)],
            Wires::range(1),
        )
        .unwrap();
    let warnings = count_warnings(|| {
        let _ = expval_with_config(d, &config);
    });
    assert_eq!(warnings, 0);
}

// ---------------------------------------------------------------------------
// Projector errors
// ---------------------------------------------------------------------------

#[test]
fn malformed_bit_string_fails_at_evaluation() {
    let proj = BasisStateProjector::from_bitstring("1x", Wires::range(2));
    let mp = expval(proj);
    let sv = Statevector::new(2);
    let err = ExpectationEstimator::new().process_state(&mp, sv.view(), &Wires::range(2));
    assert!(matches!(err, Err(MeasureError::MalformedBitString { .. })));
}

#[test]
fn bit_string_longer_than_wires_is_rejected() {
    let proj = BasisStateProjector::from_bitstring("110", Wires::range(2));
    let mp = expval(proj);
    let sv = Statevector::new(2);
    let err = ExpectationEstimator::new().process_state(&mp, sv.view(), &Wires::range(2));
    assert!(matches!(err, Err(MeasureError::MalformedBitString { .. })));
}

#[test]
fn bit_string_shorter_than_wires_is_rejected() {
    // |01⟩: reading "1" as index 1 would wrongly give probability 1.
    let mut sv = Statevector::new(2);
    sv.x(1).unwrap();
    let proj = BasisStateProjector::from_bitstring("1", Wires::range(2));
    assert!(matches!(
        proj.eigenvalues(),
        Err(MeasureError::MalformedBitString { .. })
    ));

    let mp = expval(proj);
    let est = ExpectationEstimator::new();
    let order = Wires::range(2);
    let from_state = est.process_state(&mp, sv.view(), &order);
    assert!(matches!(from_state, Err(MeasureError::MalformedBitString { .. })));

    let samples = ndarray::array![[0u8, 1], [0, 1]].into_dyn();
    let from_samples = est.process_samples(&mp, samples.view(), &order, None, None);
    assert!(matches!(from_samples, Err(MeasureError::MalformedBitString { .. })));
}

#[test]
fn projector_parameter_is_the_bit_string() {
    let proj = BasisStateProjector::new([1, 0, 1], Wires::range(3));
    assert_eq!(proj.basis_state(), "101");
    assert_eq!(proj.eigenvalues().unwrap()[5], 1.0);
}
