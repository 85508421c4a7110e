//! Array helpers shared by the exact and sampled estimation paths.
//!
//! Layout conventions:
//!
//! | Array | Unbatched | Batched |
//! |-------|-----------|---------|
//! | Per-shot values | `[shots]` | `[batch, shots]` |
//! | Per-shot values, binned | `[bin_size, num_bins]` | `[batch, bin_size, num_bins]` |
//! | Probabilities | `[dim]` | `[batch, dim]` |
//! | Probabilities, binned | `[dim, num_bins]` | `[batch, dim, num_bins]` |

use ndarray::{Array1, ArrayD, Axis, Ix1, Ix2, IxDyn};

use crate::error::{MeasureError, MeasureResult};

/// Number of basis states over `num_wires` wires, `2^num_wires`.
pub fn basis_dim(num_wires: usize) -> MeasureResult<usize> {
    u32::try_from(num_wires)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
        .ok_or(MeasureError::TooManyWires { wires: num_wires })
}

/// Axis holding the shots of a per-shot value array.
///
/// The shot axis is the last axis without binning and the second-to-last
/// with binning (the last axis then indexes bins). Averaging over any other
/// axis silently mixes batch elements or bins.
pub fn shot_axis(has_binning: bool, has_broadcasting: bool) -> usize {
    let ndim = 1 + usize::from(has_binning) + usize::from(has_broadcasting);
    ndim - 1 - usize::from(has_binning)
}

/// Axis holding basis outcomes of a probability array with `ndim` axes.
pub fn outcome_axis(ndim: usize, has_binning: bool) -> MeasureResult<usize> {
    let trailing = 1 + usize::from(has_binning);
    if ndim < trailing || ndim > trailing + 1 {
        return Err(MeasureError::ShapeMismatch {
            expected: format!("{trailing} or {} probability axes", trailing + 1),
            got: format!("{ndim} axes"),
        });
    }
    Ok(ndim - trailing)
}

/// Arithmetic mean along `axis`.
pub fn mean_axis(values: &ArrayD<f64>, axis: usize) -> MeasureResult<ArrayD<f64>> {
    if axis >= values.ndim() {
        return Err(MeasureError::ShapeMismatch {
            expected: format!("more than {axis} axes"),
            got: format!("{:?}", values.shape()),
        });
    }
    values
        .mean_axis(Axis(axis))
        .ok_or_else(|| MeasureError::ShapeMismatch {
            expected: format!("non-empty axis {axis}"),
            got: format!("{:?}", values.shape()),
        })
}

/// Drop every axis of length one. A single element becomes a 0-d array.
pub fn squeeze(values: ArrayD<f64>) -> ArrayD<f64> {
    let shape: Vec<usize> = values.shape().iter().copied().filter(|&d| d != 1).collect();
    if shape.len() == values.ndim() {
        return values;
    }
    let data: Vec<f64> = values.iter().copied().collect();
    // Element count is unchanged by removing unit axes.
    ArrayD::from_shape_vec(IxDyn(&shape), data).unwrap_or(values)
}

/// Inner product of probabilities with eigenvalues along the last axis.
///
/// A `[dim]` probability vector yields a 0-d result; a batched
/// `[batch, dim]` array yields `[batch]`, preserving batch order.
pub fn dot_last(probs: &ArrayD<f64>, eigvals: &Array1<f64>) -> MeasureResult<ArrayD<f64>> {
    let last = probs.shape().last().copied().unwrap_or(0);
    if last != eigvals.len() {
        return Err(MeasureError::ShapeMismatch {
            expected: format!("{} outcomes", eigvals.len()),
            got: format!("{:?}", probs.shape()),
        });
    }
    match probs.ndim() {
        1 => {
            let p = probs.view().into_dimensionality::<Ix1>().map_err(shape_err)?;
            Ok(ArrayD::from_elem(IxDyn(&[]), p.dot(eigvals)))
        }
        2 => {
            let p = probs.view().into_dimensionality::<Ix2>().map_err(shape_err)?;
            Ok(p.dot(eigvals).into_dyn())
        }
        n => Err(MeasureError::ShapeMismatch {
            expected: "1 or 2 probability axes".into(),
            got: format!("{n} axes"),
        }),
    }
}

/// Cast eigenvalues to the fixed real precision used for reductions.
pub fn as_f64_array(values: impl IntoIterator<Item = f64>) -> Array1<f64> {
    values.into_iter().collect()
}

/// Select index `idx` along `axis`, dropping that axis.
pub fn select_along(values: &ArrayD<f64>, axis: usize, idx: usize) -> MeasureResult<ArrayD<f64>> {
    let len = values.shape().get(axis).copied().unwrap_or(0);
    if idx >= len {
        return Err(MeasureError::IndexOutOfBounds { index: idx, len });
    }
    Ok(values.index_axis(Axis(axis), idx).to_owned())
}

/// The value of a 0-d result.
pub fn scalar(values: &ArrayD<f64>) -> Option<f64> {
    if values.ndim() == 0 {
        values.first().copied()
    } else {
        None
    }
}

fn shape_err(e: ndarray::ShapeError) -> MeasureError {
    MeasureError::ShapeMismatch {
        expected: "consistent dimensionality".into(),
        got: e.to_string(),
    }
}
