//! `arvak-measure`: expectation-value measurement processes.
//!
//! An [`ExpectationMP`] names what is measured (an observable, a
//! mid-circuit [`MeasurementValue`], or explicit eigenvalues on wires) and
//! is evaluated by an [`ExpectationEstimator`] in one of two ways:
//!
//! - **Exact**: from a state vector, as `Σ pᵢ λᵢ` over the marginal
//!   distribution on the measured wires.
//! - **Sampled**: from raw bit samples, as the mean of per-shot
//!   eigenvalues, optionally restricted to a shot range and split into
//!   contiguous bins.
//!
//! Both paths accept a leading batch axis and keep it in the result.
//!
//! # Quick start
//!
//! ```rust
//! use arvak_measure::observable::{PauliZ, Tensor};
//! use arvak_measure::{expval, math, ExpectationEstimator, Obs, Statevector, Wires};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! // Bell state: ⟨Z₀ Z₁⟩ = 1.
//! let mut sv = Statevector::new(2);
//! sv.h(0).unwrap().cx(0, 1).unwrap();
//!
//! let zz = Tensor::new([Obs::from(PauliZ::new(0)), Obs::from(PauliZ::new(1))]).unwrap();
//! let mp = expval(zz);
//! let est = ExpectationEstimator::new();
//! let order = Wires::range(2);
//!
//! let exact = est.process_state(&mp, sv.view(), &order).unwrap();
//! assert!((math::scalar(&exact).unwrap() - 1.0).abs() < 1e-12);
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let samples = sv.sample_bits(100, &mut rng).into_dyn();
//! let sampled = est.process_samples(&mp, samples.view(), &order, None, None).unwrap();
//! assert_eq!(math::scalar(&sampled), Some(1.0));
//! ```

pub mod config;
pub mod error;
pub mod expval;
pub mod math;
pub mod mid_measure;
pub mod observable;
pub mod probs;
pub mod recording;
pub mod sample;
pub mod shots;
pub mod state;
pub mod wires;

pub use config::EstimatorConfig;
pub use error::{MeasureError, MeasureResult};
pub use expval::{
    expval, expval_with_config, ExpectationBuilder, ExpectationEstimator, ExpectationMP,
    ExpvalInput, MeasurementTarget, NumericType, OutputShape, ReturnType,
};
pub use mid_measure::MeasurementValue;
pub use observable::{BasisStateProjector, Obs, Observable};
pub use probs::{ComputationalProbs, ProbabilityEstimator};
pub use recording::{is_recording, stop_recording, RecordingGuard};
pub use sample::{EigenSampler, SampleTarget, Sampler};
pub use shots::{ShotCopies, ShotRange, Shots};
pub use state::Statevector;
pub use wires::{WireLabel, Wires};
