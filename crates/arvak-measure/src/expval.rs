//! Expectation-value measurement processes.
//!
//! [`expval`] wraps an observable or a mid-circuit [`MeasurementValue`] into
//! an [`ExpectationMP`]. An [`ExpectationEstimator`] then evaluates the
//! process either exactly from a state vector or statistically from raw
//! samples:
//!
//! ```text
//!   state ──► ProbabilityEstimator ──► p · eigenvalues ─────────────► ⟨O⟩
//! samples ──► Sampler ──► per-shot eigenvalues ──► mean(shot axis) ─► ⟨O⟩
//! ```
//!
//! A [`BasisStateProjector`](crate::observable::BasisStateProjector) skips
//! the eigenvalues on both paths: its expectation is the single probability
//! at the index spelled by its bit-string.
//!
//! # Example
//!
//! ```rust
//! use arvak_measure::{expval, math, ExpectationEstimator, Statevector, Wires};
//! use arvak_measure::observable::PauliZ;
//!
//! let mut sv = Statevector::new(1);
//! sv.ry(0, std::f64::consts::FRAC_PI_3).unwrap();
//!
//! let mp = expval(PauliZ::new(0));
//! let est = ExpectationEstimator::new();
//! let ev = est.process_state(&mp, sv.view(), &Wires::range(1)).unwrap();
//! assert!((math::scalar(&ev).unwrap() - 0.5).abs() < 1e-12);
//! ```

use ndarray::{ArrayD, ArrayViewD};
use num_complex::Complex64;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::config::EstimatorConfig;
use crate::error::{MeasureError, MeasureResult};
use crate::math::{
    as_f64_array, basis_dim, dot_last, mean_axis, outcome_axis, select_along, shot_axis, squeeze,
};
use crate::mid_measure::MeasurementValue;
use crate::observable::{
    BasisStateProjector, Diagonal, Hadamard, Identity, Obs, Observable, PauliX, PauliY, PauliZ,
    Tensor,
};
use crate::probs::{ComputationalProbs, ProbabilityEstimator};
use crate::recording::stop_recording;
use crate::sample::{EigenSampler, SampleTarget, Sampler};
use crate::shots::{ShotRange, Shots};
use crate::wires::Wires;

/// Kind of result a measurement process produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    /// Expectation value.
    Expectation,
}

/// Numeric type of a measurement result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// Real floating point.
    Float,
}

/// Declared per-call output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    /// A bare scalar (the empty shape).
    Scalar,
    /// One scalar per shot-vector repetition.
    ShotVector(usize),
}

impl OutputShape {
    /// Number of entries in the shape tuple: 0 for a scalar.
    pub fn len(&self) -> usize {
        match self {
            OutputShape::Scalar => 0,
            OutputShape::ShotVector(n) => *n,
        }
    }

    /// True for the empty (scalar) shape.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What an expectation is taken of.
#[derive(Debug, Clone)]
pub enum MeasurementTarget {
    /// A wire observable.
    Observable(Obs),
    /// A value derived from mid-circuit measurements.
    Value(MeasurementValue),
    /// Explicit eigenvalues over explicit wires.
    Eigen {
        /// Wires the eigenvalues are indexed over.
        wires: Wires,
        /// One eigenvalue per basis outcome, first wire most significant.
        eigenvalues: Vec<f64>,
    },
}

/// Input accepted by [`expval`].
#[derive(Debug, Clone)]
pub enum ExpvalInput {
    /// An observable.
    Observable(Obs),
    /// A mid-circuit measurement value.
    Value(MeasurementValue),
}

impl From<Obs> for ExpvalInput {
    fn from(obs: Obs) -> Self {
        ExpvalInput::Observable(obs)
    }
}

impl From<Arc<dyn Observable>> for ExpvalInput {
    fn from(obs: Arc<dyn Observable>) -> Self {
        ExpvalInput::Observable(Obs::generic(obs))
    }
}

impl From<MeasurementValue> for ExpvalInput {
    fn from(mv: MeasurementValue) -> Self {
        ExpvalInput::Value(mv)
    }
}

macro_rules! expval_input_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ExpvalInput {
                fn from(obs: $ty) -> Self {
                    ExpvalInput::Observable(Obs::from(obs))
                }
            }
        )*
    };
}

expval_input_from!(
    PauliX,
    PauliY,
    PauliZ,
    Hadamard,
    Identity,
    Diagonal,
    Tensor,
    BasisStateProjector
);

/// Expectation value of an observable or mid-circuit measurement value.
///
/// A non-Hermitian observable logs an advisory warning and is wrapped anyway.
pub fn expval(op: impl Into<ExpvalInput>) -> ExpectationMP {
    expval_with_config(op, &EstimatorConfig::default())
}

/// [`expval`] honouring `config.warn_non_hermitian`.
pub fn expval_with_config(op: impl Into<ExpvalInput>, config: &EstimatorConfig) -> ExpectationMP {
    match op.into() {
        ExpvalInput::Value(mv) => ExpectationMP::new(MeasurementTarget::Value(mv)),
        ExpvalInput::Observable(obs) => {
            if config.warn_non_hermitian && !obs.is_hermitian() {
                warn!(observable = %obs, "{} might not be hermitian.", obs.name());
            }
            ExpectationMP::new(MeasurementTarget::Observable(obs))
        }
    }
}

/// Measurement process computing an expectation value.
///
/// Immutable once built. The observable is shared, never owned exclusively.
#[derive(Debug, Clone)]
pub struct ExpectationMP {
    target: MeasurementTarget,
    id: Option<String>,
}

impl ExpectationMP {
    /// Wrap a target. Prefer [`expval`] or [`ExpectationMP::builder`].
    pub fn new(target: MeasurementTarget) -> Self {
        Self { target, id: None }
    }

    /// Start a validated construction.
    pub fn builder() -> ExpectationBuilder {
        ExpectationBuilder::default()
    }

    /// Attach a custom label.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The measured target.
    pub fn target(&self) -> &MeasurementTarget {
        &self.target
    }

    /// The observable, if the target is one.
    pub fn obs(&self) -> Option<&Obs> {
        match &self.target {
            MeasurementTarget::Observable(obs) => Some(obs),
            _ => None,
        }
    }

    /// The mid-circuit measurement value, if the target is one.
    pub fn measurement_value(&self) -> Option<&MeasurementValue> {
        match &self.target {
            MeasurementTarget::Value(mv) => Some(mv),
            _ => None,
        }
    }

    /// Custom label, if any. Has no effect on computation.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Wires the process measures.
    pub fn wires(&self) -> &Wires {
        match &self.target {
            MeasurementTarget::Observable(obs) => obs.wires(),
            MeasurementTarget::Value(mv) => mv.wires(),
            MeasurementTarget::Eigen { wires, .. } => wires,
        }
    }

    /// Eigenvalues of the target over [`wires`](Self::wires).
    pub fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
        match &self.target {
            MeasurementTarget::Observable(obs) => obs.eigenvalues(),
            MeasurementTarget::Value(mv) => mv.eigenvalues(),
            MeasurementTarget::Eigen { eigenvalues, .. } => Ok(eigenvalues.clone()),
        }
    }

    /// Always [`ReturnType::Expectation`].
    pub fn return_type(&self) -> ReturnType {
        ReturnType::Expectation
    }

    /// Always [`NumericType::Float`]: expectation values are real.
    pub fn numeric_type(&self) -> NumericType {
        NumericType::Float
    }

    /// Output shape for the given shots: a scalar unless the shots are
    /// partitioned, then one scalar per repetition.
    pub fn shape(&self, shots: &Shots) -> OutputShape {
        if !shots.has_partitioned_shots() {
            return OutputShape::Scalar;
        }
        OutputShape::ShotVector(usize::try_from(shots.num_elements()).unwrap_or(usize::MAX))
    }

    fn sample_target(&self) -> SampleTarget<'_> {
        match &self.target {
            MeasurementTarget::Observable(obs) => SampleTarget::Observable(obs),
            MeasurementTarget::Value(mv) => SampleTarget::Value(mv),
            MeasurementTarget::Eigen { wires, eigenvalues } => SampleTarget::Eigen {
                wires,
                eigenvalues,
            },
        }
    }
}

impl fmt::Display for ExpectationMP {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            MeasurementTarget::Observable(obs) => write!(f, "expval({obs})"),
            MeasurementTarget::Value(mv) => write!(f, "expval({mv})"),
            MeasurementTarget::Eigen { wires, eigenvalues } => {
                write!(f, "expval(eigvals={eigenvalues:?}, wires={wires})")
            }
        }
    }
}

/// Validated construction of an [`ExpectationMP`].
///
/// Exactly one of {observable, measurement value, wires + eigenvalues} must
/// be supplied.
#[derive(Debug, Default)]
pub struct ExpectationBuilder {
    obs: Option<Obs>,
    mv: Option<MeasurementValue>,
    wires: Option<Wires>,
    eigenvalues: Option<Vec<f64>>,
    id: Option<String>,
}

impl ExpectationBuilder {
    /// Measure an observable.
    #[must_use]
    pub fn observable(mut self, obs: impl Into<Obs>) -> Self {
        self.obs = Some(obs.into());
        self
    }

    /// Measure a mid-circuit measurement value.
    #[must_use]
    pub fn measurement_value(mut self, mv: MeasurementValue) -> Self {
        self.mv = Some(mv);
        self
    }

    /// Explicit wires; requires [`eigenvalues`](Self::eigenvalues).
    #[must_use]
    pub fn wires(mut self, wires: Wires) -> Self {
        self.wires = Some(wires);
        self
    }

    /// Explicit eigenvalues; requires [`wires`](Self::wires).
    #[must_use]
    pub fn eigenvalues(mut self, eigenvalues: impl IntoIterator<Item = f64>) -> Self {
        self.eigenvalues = Some(eigenvalues.into_iter().collect());
        self
    }

    /// Custom label.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validate and build.
    pub fn build(self) -> MeasureResult<ExpectationMP> {
        let config_err = |msg: &str| -> MeasureResult<ExpectationMP> {
            Err(MeasureError::Configuration(msg.to_string()))
        };
        let target = match (self.obs, self.mv, self.wires, self.eigenvalues) {
            (Some(_), Some(_), _, _) => {
                return config_err("cannot measure an observable and a measurement value at once");
            }
            (Some(obs), None, None, None) => MeasurementTarget::Observable(obs),
            (None, Some(mv), None, None) => MeasurementTarget::Value(mv),
            (Some(_), None, _, _) | (None, Some(_), _, _) => {
                return config_err("wires and eigenvalues cannot be given together with a target");
            }
            (None, None, Some(wires), Some(eigenvalues)) => {
                let dim = basis_dim(wires.len()).map_err(|e| {
                    MeasureError::Configuration(format!("explicit eigenvalues: {e}"))
                })?;
                if eigenvalues.len() != dim {
                    return Err(MeasureError::Configuration(format!(
                        "{} eigenvalues given for {} wires (expected {dim})",
                        eigenvalues.len(),
                        wires.len()
                    )));
                }
                MeasurementTarget::Eigen { wires, eigenvalues }
            }
            (None, None, None, None) => {
                return config_err("either an observable or wires and eigenvalues must be given");
            }
            (None, None, _, _) => {
                return config_err("wires and eigenvalues must be given together");
            }
        };
        Ok(ExpectationMP {
            target,
            id: self.id,
        })
    }
}

/// Evaluates [`ExpectationMP`]s against states or samples.
///
/// Collaborators default to [`ComputationalProbs`] and [`EigenSampler`].
/// Every call is a pure function of its borrowed inputs.
#[derive(Debug, Clone, Default)]
pub struct ExpectationEstimator<P = ComputationalProbs, S = EigenSampler> {
    probs: P,
    sampler: S,
}

impl ExpectationEstimator {
    /// Estimator with the default collaborators.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ProbabilityEstimator, S: Sampler> ExpectationEstimator<P, S> {
    /// Estimator with custom collaborators.
    pub fn with_collaborators(probs: P, sampler: S) -> Self {
        Self { probs, sampler }
    }

    /// Exact expectation from a state indexed by `wire_order`.
    ///
    /// Returns a 0-d array, or `[batch]` for a batched state.
    #[instrument(skip_all, fields(mp = %mp, wire_order = %wire_order))]
    pub fn process_state(
        &self,
        mp: &ExpectationMP,
        state: ArrayViewD<'_, Complex64>,
        wire_order: &Wires,
    ) -> MeasureResult<ArrayD<f64>> {
        if let MeasurementTarget::Observable(Obs::Projector(proj)) = &mp.target {
            let idx = proj.basis_index()?;
            let probs = {
                let _guard = stop_recording();
                self.probs.estimate_from_state(mp.wires(), state, wire_order)?
            };
            debug!(idx, shape = ?probs.shape(), "projector from state");
            return select_along(&probs, outcome_axis(probs.ndim(), false)?, idx);
        }

        let eigvals = as_f64_array(mp.eigenvalues()?);
        // The observable's basis change is already in the state, so the
        // distribution is taken over the process wires.
        let probs = {
            let _guard = stop_recording();
            self.probs.estimate_from_state(mp.wires(), state, wire_order)?
        };
        debug!(shape = ?probs.shape(), "eigenvalue-weighted probabilities");
        dot_last(&probs, &eigvals)
    }

    /// Statistical expectation from raw samples recorded under `wire_order`.
    ///
    /// `samples` is `[shots, wires]` or `[batch, shots, wires]`. Returns a
    /// 0-d array unless batching or binning leaves non-singleton axes; every
    /// length-one axis is dropped, for projectors as for any other target.
    #[instrument(skip_all, fields(mp = %mp, ?shot_range, ?bin_size))]
    pub fn process_samples(
        &self,
        mp: &ExpectationMP,
        samples: ArrayViewD<'_, u8>,
        wire_order: &Wires,
        shot_range: Option<ShotRange>,
        bin_size: Option<usize>,
    ) -> MeasureResult<ArrayD<f64>> {
        if let MeasurementTarget::Observable(Obs::Projector(proj)) = &mp.target {
            let idx = proj.basis_index()?;
            let probs = {
                let _guard = stop_recording();
                self.probs
                    .estimate_from_samples(mp.wires(), samples, wire_order, shot_range, bin_size)?
            };
            debug!(idx, shape = ?probs.shape(), "projector from samples");
            let axis = outcome_axis(probs.ndim(), bin_size.is_some())?;
            return Ok(squeeze(select_along(&probs, axis, idx)?));
        }

        let batched = samples.ndim() == 3;
        let values = {
            let _guard = stop_recording();
            self.sampler
                .sample(mp.sample_target(), samples, wire_order, shot_range, bin_size)?
        };
        let axis = shot_axis(bin_size.is_some(), batched);
        debug!(axis, shape = ?values.shape(), "averaging per-shot eigenvalues");
        Ok(squeeze(mean_axis(&values, axis)?))
    }
}
