//! Per-shot eigenvalue sampling.
//!
//! Turns raw bit samples into the eigenvalue each shot observed for a
//! target. The target's basis change is assumed to have been applied to
//! the samples already, so the lookup is a plain computational-basis read.

use ndarray::{Array2, Array3, ArrayD, ArrayViewD, Axis};
use tracing::{debug, instrument};

use crate::error::{MeasureError, MeasureResult};
use crate::math::basis_dim;
use crate::mid_measure::MeasurementValue;
use crate::observable::{Obs, Observable};
use crate::probs::{num_bins, SampleBlock};
use crate::shots::ShotRange;
use crate::wires::Wires;

/// What a [`Sampler`] labels each shot with.
#[derive(Debug, Clone, Copy)]
pub enum SampleTarget<'a> {
    /// Eigenvalues of an observable.
    Observable(&'a Obs),
    /// A value derived from mid-circuit measurements.
    Value(&'a MeasurementValue),
    /// Explicit eigenvalues on explicit wires.
    Eigen {
        /// Wires the eigenvalues are indexed over.
        wires: &'a Wires,
        /// One eigenvalue per basis outcome.
        eigenvalues: &'a [f64],
    },
}

impl SampleTarget<'_> {
    /// Wires whose bits determine the value of a shot.
    pub fn wires(&self) -> &Wires {
        match self {
            SampleTarget::Observable(obs) => obs.wires(),
            SampleTarget::Value(mv) => mv.wires(),
            SampleTarget::Eigen { wires, .. } => wires,
        }
    }

    /// Value of every basis outcome over [`wires`](Self::wires).
    pub fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
        match self {
            SampleTarget::Observable(obs) => obs.eigenvalues(),
            SampleTarget::Value(mv) => mv.eigenvalues(),
            SampleTarget::Eigen { eigenvalues, .. } => Ok(eigenvalues.to_vec()),
        }
    }
}

/// Produces per-shot values for a target.
///
/// Output layout: `[shots]`, `[batch, shots]`, or with binning
/// `[bin_size, num_bins]`, `[batch, bin_size, num_bins]`. Bins are
/// contiguous: bin `j` holds shots `j * bin_size .. (j + 1) * bin_size`.
pub trait Sampler: Send + Sync {
    /// Label every retained shot with the target's value for that shot.
    fn sample(
        &self,
        target: SampleTarget<'_>,
        samples: ArrayViewD<'_, u8>,
        wire_order: &Wires,
        shot_range: Option<ShotRange>,
        bin_size: Option<usize>,
    ) -> MeasureResult<ArrayD<f64>>;
}

/// Default sampler: reads each shot's eigenvalue from a lookup table.
///
/// A [`MeasurementValue`] target is tabulated from its processing function
/// over every outcome of its wires.
#[derive(Debug, Clone, Copy, Default)]
pub struct EigenSampler;

impl EigenSampler {
    /// Create the sampler.
    pub fn new() -> Self {
        Self
    }
}

impl Sampler for EigenSampler {
    #[instrument(skip(self, target, samples), fields(wires = %target.wires(), shape = ?samples.shape()))]
    fn sample(
        &self,
        target: SampleTarget<'_>,
        samples: ArrayViewD<'_, u8>,
        wire_order: &Wires,
        shot_range: Option<ShotRange>,
        bin_size: Option<usize>,
    ) -> MeasureResult<ArrayD<f64>> {
        let block = SampleBlock::new(samples, wire_order.len(), shot_range)?;
        let positions = target.wires().indices_in(wire_order)?;
        let table = target.eigenvalues()?;
        let dim = basis_dim(positions.len())?;
        if table.len() != dim {
            return Err(MeasureError::ShapeMismatch {
                expected: format!("{dim} eigenvalues for {} wires", positions.len()),
                got: format!("{} eigenvalues", table.len()),
            });
        }

        let indices = block.basis_indices(&positions)?;
        let values: Array2<f64> = indices.mapv(|idx| table[idx]);
        let (batch, shots) = values.dim();
        debug!(batch, shots, ?bin_size, "per-shot eigenvalues");

        let out = match bin_size {
            None => values.into_dyn(),
            Some(bin_size) => {
                let bins = num_bins(shots, bin_size)?;
                Array3::from_shape_fn((batch, bin_size, bins), |(b, k, j)| {
                    values[[b, j * bin_size + k]]
                })
                .into_dyn()
            }
        };

        Ok(if block.batched {
            out
        } else {
            out.index_axis_move(Axis(0), 0)
        })
    }
}
