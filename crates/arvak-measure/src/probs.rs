//! Computational-basis probability estimation.
//!
//! Basis indices follow the wire order: the first wire of `wire_order` (or
//! of the requested `wires`, for the marginal) is the most significant bit.

use ndarray::{s, Array2, Array3, ArrayD, ArrayView3, ArrayViewD, Axis, Ix2, Ix3};
use num_complex::Complex64;
use std::ops::Range;
use tracing::{debug, instrument};

use crate::error::{MeasureError, MeasureResult};
use crate::math::basis_dim;
use crate::shots::{select_shots, ShotRange};
use crate::wires::Wires;

/// Estimates probability distributions over computational-basis outcomes.
///
/// Implementations must accept an optional leading batch axis on their
/// inputs and preserve it on their outputs.
pub trait ProbabilityEstimator: Send + Sync {
    /// Exact marginal probabilities over `wires` for a state indexed by
    /// `wire_order`. Returns `[2^k]` or `[batch, 2^k]`.
    fn estimate_from_state(
        &self,
        wires: &Wires,
        state: ArrayViewD<'_, Complex64>,
        wire_order: &Wires,
    ) -> MeasureResult<ArrayD<f64>>;

    /// Outcome frequencies over `wires` from raw bit samples recorded under
    /// `wire_order`. Returns `[2^k]`/`[batch, 2^k]`, or with binning
    /// `[2^k, num_bins]`/`[batch, 2^k, num_bins]`.
    fn estimate_from_samples(
        &self,
        wires: &Wires,
        samples: ArrayViewD<'_, u8>,
        wire_order: &Wires,
        shot_range: Option<ShotRange>,
        bin_size: Option<usize>,
    ) -> MeasureResult<ArrayD<f64>>;
}

/// Default estimator for state vectors and bit samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputationalProbs;

impl ComputationalProbs {
    /// Create the estimator.
    pub fn new() -> Self {
        Self
    }
}

impl ProbabilityEstimator for ComputationalProbs {
    #[instrument(skip(self, state), fields(wires = %wires, shape = ?state.shape()))]
    fn estimate_from_state(
        &self,
        wires: &Wires,
        state: ArrayViewD<'_, Complex64>,
        wire_order: &Wires,
    ) -> MeasureResult<ArrayD<f64>> {
        let n = wire_order.len();
        let dim = basis_dim(n)?;
        let (batch, batched) = state_batch(state.shape(), n, dim)?;
        let full: Vec<f64> = state.iter().map(Complex64::norm_sqr).collect();

        let positions = wires.indices_in(wire_order)?;
        let k = positions.len();
        let outcomes = basis_dim(k)?;
        let sub_index: Vec<usize> = (0..dim)
            .map(|i| {
                positions.iter().enumerate().fold(0usize, |acc, (j, &p)| {
                    acc | (((i >> (n - 1 - p)) & 1) << (k - 1 - j))
                })
            })
            .collect();

        let mut out = Array2::<f64>::zeros((batch, outcomes));
        for (b, row) in full.chunks_exact(dim).enumerate() {
            for (i, &p) in row.iter().enumerate() {
                out[[b, sub_index[i]]] += p;
            }
        }
        debug!(batch, batched, outcomes, "state probabilities");

        Ok(if batched {
            out.into_dyn()
        } else {
            out.index_axis_move(Axis(0), 0).into_dyn()
        })
    }

    #[instrument(skip(self, samples), fields(wires = %wires, shape = ?samples.shape()))]
    fn estimate_from_samples(
        &self,
        wires: &Wires,
        samples: ArrayViewD<'_, u8>,
        wire_order: &Wires,
        shot_range: Option<ShotRange>,
        bin_size: Option<usize>,
    ) -> MeasureResult<ArrayD<f64>> {
        let block = SampleBlock::new(samples, wire_order.len(), shot_range)?;
        let positions = wires.indices_in(wire_order)?;
        let indices = block.basis_indices(&positions)?;
        let (batch, shots) = indices.dim();
        let dim = basis_dim(positions.len())?;

        let out = match bin_size {
            None => {
                let mut out = Array3::<f64>::zeros((batch, dim, 1));
                let weight = 1.0 / shots as f64;
                for ((b, _), &idx) in indices.indexed_iter() {
                    out[[b, idx, 0]] += weight;
                }
                out.index_axis_move(Axis(2), 0).into_dyn()
            }
            Some(bin_size) => {
                let num_bins = num_bins(shots, bin_size)?;
                let mut out = Array3::<f64>::zeros((batch, dim, num_bins));
                let weight = 1.0 / bin_size as f64;
                for ((b, t), &idx) in indices.indexed_iter() {
                    out[[b, idx, t / bin_size]] += weight;
                }
                out.into_dyn()
            }
        };
        debug!(batch, shots, ?bin_size, "sample probabilities");

        Ok(if block.batched {
            out
        } else {
            out.index_axis_move(Axis(0), 0)
        })
    }
}

/// Work out `(batch, batched)` for a state of `n` wires.
///
/// Accepted layouts: `[2^n]`, `[2; n]`, `[batch, 2^n]`, `[batch, 2; n]`.
fn state_batch(shape: &[usize], n: usize, dim: usize) -> MeasureResult<(usize, bool)> {
    let all_two = |dims: &[usize]| dims.iter().all(|&d| d == 2);
    match shape {
        [d] if *d == dim => Ok((1, false)),
        dims if n >= 2 && dims.len() == n && all_two(dims) => Ok((1, false)),
        [b, d] if *d == dim => Ok((*b, true)),
        [b, rest @ ..] if n >= 2 && rest.len() == n && all_two(rest) => Ok((*b, true)),
        _ => Err(MeasureError::ShapeMismatch {
            expected: format!("state of {n} wires ({dim} amplitudes, optionally batched)"),
            got: format!("{shape:?}"),
        }),
    }
}

/// Number of contiguous bins of `bin_size` covering `shots` exactly.
pub(crate) fn num_bins(shots: usize, bin_size: usize) -> MeasureResult<usize> {
    if bin_size == 0 || shots % bin_size != 0 {
        return Err(MeasureError::InvalidBinSize { bin_size, shots });
    }
    Ok(shots / bin_size)
}

/// Raw bit samples normalised to `[batch, shots, wires]` and restricted to
/// a shot range.
pub(crate) struct SampleBlock<'a> {
    view: ArrayView3<'a, u8>,
    /// Whether the caller supplied a leading batch axis.
    pub(crate) batched: bool,
}

impl<'a> SampleBlock<'a> {
    pub(crate) fn new(
        samples: ArrayViewD<'a, u8>,
        n_wires: usize,
        shot_range: Option<ShotRange>,
    ) -> MeasureResult<Self> {
        let (view, batched) = match samples.ndim() {
            2 => (
                samples
                    .into_dimensionality::<Ix2>()
                    .map_err(layout_err)?
                    .insert_axis(Axis(0)),
                false,
            ),
            3 => (samples.into_dimensionality::<Ix3>().map_err(layout_err)?, true),
            n => {
                return Err(MeasureError::ShapeMismatch {
                    expected: "[shots, wires] or [batch, shots, wires] samples".into(),
                    got: format!("{n} axes"),
                });
            }
        };
        let (_, total, cols) = view.dim();
        if cols != n_wires {
            return Err(MeasureError::ShapeMismatch {
                expected: format!("{n_wires} sample columns"),
                got: format!("{cols} columns"),
            });
        }
        let Range { start, end } = select_shots(shot_range, total)?;
        let view = view.slice_move(s![.., start..end, ..]);
        Ok(Self { view, batched })
    }

    /// Basis index of every retained shot over the columns `positions`,
    /// first position most significant. Shape `[batch, shots]`.
    pub(crate) fn basis_indices(&self, positions: &[usize]) -> MeasureResult<Array2<usize>> {
        let (batch, shots, _) = self.view.dim();
        let mut out = Array2::<usize>::zeros((batch, shots));
        for ((b, t), slot) in out.indexed_iter_mut() {
            let mut idx = 0usize;
            for &p in positions {
                let bit = self.view[[b, t, p]];
                if bit > 1 {
                    return Err(MeasureError::InvalidSample { value: bit });
                }
                idx = (idx << 1) | usize::from(bit);
            }
            *slot = idx;
        }
        Ok(out)
    }
}

fn layout_err(e: ndarray::ShapeError) -> MeasureError {
    MeasureError::ShapeMismatch {
        expected: "sample array".into(),
        got: e.to_string(),
    }
}
