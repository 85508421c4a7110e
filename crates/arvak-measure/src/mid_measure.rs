//! Classical values derived from mid-circuit measurements.

use std::fmt;
use std::sync::Arc;

use crate::error::MeasureResult;
use crate::math::basis_dim;
use crate::wires::{WireLabel, Wires};

type Processing = Arc<dyn Fn(&[u8]) -> f64 + Send + Sync>;

/// Opaque handle to a classical value computed from mid-circuit measurement
/// outcomes.
///
/// The value is a function of the bits recorded on [`MeasurementValue::wires`],
/// given in the same order as the wires.
#[derive(Clone)]
pub struct MeasurementValue {
    wires: Wires,
    processing: Processing,
}

impl MeasurementValue {
    /// The raw outcome (0 or 1) of measuring a single wire.
    pub fn bit(wire: impl Into<WireLabel>) -> Self {
        Self {
            wires: Wires::single(wire),
            processing: Arc::new(|bits: &[u8]| f64::from(bits[0])),
        }
    }

    /// An arbitrary function of the outcomes on `wires`.
    pub fn from_fn(wires: Wires, f: impl Fn(&[u8]) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            wires,
            processing: Arc::new(f),
        }
    }

    /// Post-compose a scalar function.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        let inner = Arc::clone(&self.processing);
        Self {
            wires: self.wires.clone(),
            processing: Arc::new(move |bits: &[u8]| f(inner(bits))),
        }
    }

    /// Wires whose outcomes determine the value.
    pub fn wires(&self) -> &Wires {
        &self.wires
    }

    /// Evaluate for one set of outcomes, ordered like [`wires`](Self::wires).
    pub fn value(&self, bits: &[u8]) -> f64 {
        (self.processing)(bits)
    }

    /// The value for every outcome combination, in basis order with the
    /// first wire most significant.
    pub fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
        let n = self.wires.len();
        let dim = basis_dim(n)?;
        let mut bits = vec![0u8; n];
        Ok((0..dim)
            .map(|idx| {
                for (k, bit) in bits.iter_mut().enumerate() {
                    *bit = u8::from((idx >> (n - 1 - k)) & 1 == 1);
                }
                self.value(&bits)
            })
            .collect())
    }
}

impl fmt::Debug for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasurementValue")
            .field("wires", &self.wires)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MeasurementValue(wires={})", self.wires)
    }
}
