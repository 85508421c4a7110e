//! Statevector preparation and outcome sampling.
//!
//! Produces the inputs the estimators consume: complex amplitudes for the
//! exact path and raw `[shots, wires]` bit arrays for the sampled path.
//! Qubit `0` is the most significant bit of the basis index, matching the
//! wire-order convention of [`crate::probs`].

use ndarray::{stack, Array1, Array2, ArrayD, ArrayView1, ArrayViewD, Axis};
use num_complex::Complex64;
use rand::Rng;

use crate::error::{MeasureError, MeasureResult};

/// A pure state of `num_qubits` qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Wrap raw amplitudes; the length must be a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> MeasureResult<Self> {
        let len = amplitudes.len();
        if !len.is_power_of_two() {
            return Err(MeasureError::ShapeMismatch {
                expected: "a power-of-two number of amplitudes".into(),
                got: format!("{len} amplitudes"),
            });
        }
        Ok(Self {
            amplitudes,
            num_qubits: len.trailing_zeros() as usize,
        })
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The amplitudes in basis order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Squared norm; 1 for a normalized state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// Borrow as a flat `[2^n]` array view.
    pub fn view(&self) -> ArrayViewD<'_, Complex64> {
        ArrayView1::from(self.amplitudes.as_slice()).into_dyn()
    }

    /// Convert into a flat `[2^n]` array.
    pub fn into_array(self) -> ArrayD<Complex64> {
        Array1::from(self.amplitudes).into_dyn()
    }

    /// Outcome probabilities in basis order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    fn mask(&self, qubit: usize) -> MeasureResult<usize> {
        if qubit >= self.num_qubits {
            return Err(MeasureError::QubitOutOfRange {
                qubit,
                n_qubits: self.num_qubits,
            });
        }
        Ok(1 << (self.num_qubits - 1 - qubit))
    }

    /// Apply a 2x2 unitary `[[a, b], [c, d]]` to every amplitude pair that
    /// differs only in `mask`, restricted to indices where `ctrl` bits are set.
    fn apply_pairs(&mut self, mask: usize, ctrl: usize, m: [Complex64; 4]) {
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 && i & ctrl == ctrl {
                let j = i | mask;
                let a0 = self.amplitudes[i];
                let a1 = self.amplitudes[j];
                self.amplitudes[i] = m[0] * a0 + m[1] * a1;
                self.amplitudes[j] = m[2] * a0 + m[3] * a1;
            }
        }
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Pauli-X.
    pub fn x(&mut self, qubit: usize) -> MeasureResult<&mut Self> {
        let mask = self.mask(qubit)?;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                self.amplitudes.swap(i, i | mask);
            }
        }
        Ok(self)
    }

    /// Pauli-Y.
    pub fn y(&mut self, qubit: usize) -> MeasureResult<&mut Self> {
        let mask = self.mask(qubit)?;
        let zero = Complex64::new(0.0, 0.0);
        let i_val = Complex64::new(0.0, 1.0);
        self.apply_pairs(mask, 0, [zero, -i_val, i_val, zero]);
        Ok(self)
    }

    /// Pauli-Z.
    pub fn z(&mut self, qubit: usize) -> MeasureResult<&mut Self> {
        let mask = self.mask(qubit)?;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask != 0 {
                *amp = -*amp;
            }
        }
        Ok(self)
    }

    /// Hadamard.
    pub fn h(&mut self, qubit: usize) -> MeasureResult<&mut Self> {
        let mask = self.mask(qubit)?;
        let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        self.apply_pairs(mask, 0, [s, s, s, -s]);
        Ok(self)
    }

    /// Rotation about X by `theta`.
    pub fn rx(&mut self, qubit: usize, theta: f64) -> MeasureResult<&mut Self> {
        let mask = self.mask(qubit)?;
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        self.apply_pairs(mask, 0, [c, neg_i_s, neg_i_s, c]);
        Ok(self)
    }

    /// Rotation about Y by `theta`.
    pub fn ry(&mut self, qubit: usize, theta: f64) -> MeasureResult<&mut Self> {
        let mask = self.mask(qubit)?;
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new((theta / 2.0).sin(), 0.0);
        self.apply_pairs(mask, 0, [c, -s, s, c]);
        Ok(self)
    }

    /// Rotation about Z by `theta`.
    pub fn rz(&mut self, qubit: usize, theta: f64) -> MeasureResult<&mut Self> {
        let mask = self.mask(qubit)?;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
        Ok(self)
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Controlled-NOT.
    pub fn cx(&mut self, control: usize, target: usize) -> MeasureResult<&mut Self> {
        let ctrl_mask = self.mask(control)?;
        let tgt_mask = self.mask(target)?;
        if ctrl_mask == tgt_mask {
            return Err(MeasureError::Configuration(format!(
                "control and target must differ (both {control})"
            )));
        }
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                self.amplitudes.swap(i, i | tgt_mask);
            }
        }
        Ok(self)
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Sample one basis index.
    pub fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen::<f64>() * self.norm_sqr();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave r just above the final partial sum.
        self.amplitudes.len() - 1
    }

    /// Sample `shots` outcomes as a `[shots, num_qubits]` bit array.
    pub fn sample_bits<R: Rng + ?Sized>(&self, shots: usize, rng: &mut R) -> Array2<u8> {
        let n = self.num_qubits;
        let mut out = Array2::<u8>::zeros((shots, n));
        for mut row in out.rows_mut() {
            let idx = self.sample_index(rng);
            for (q, bit) in row.iter_mut().enumerate() {
                *bit = u8::from((idx >> (n - 1 - q)) & 1 == 1);
            }
        }
        out
    }
}

/// Stack states along a leading batch axis: `[batch, 2^n]`.
pub fn batch(states: &[Statevector]) -> MeasureResult<ArrayD<Complex64>> {
    let views: Vec<ArrayView1<'_, Complex64>> = states
        .iter()
        .map(|s| ArrayView1::from(s.amplitudes.as_slice()))
        .collect();
    stack(Axis(0), &views)
        .map(|a| a.into_dyn())
        .map_err(|e| MeasureError::ShapeMismatch {
            expected: "states of equal size".into(),
            got: e.to_string(),
        })
}

/// Stack sample blocks along a leading batch axis: `[batch, shots, wires]`.
pub fn batch_samples(samples: &[Array2<u8>]) -> MeasureResult<ArrayD<u8>> {
    let views: Vec<_> = samples.iter().map(Array2::view).collect();
    stack(Axis(0), &views)
        .map(|a| a.into_dyn())
        .map_err(|e| MeasureError::ShapeMismatch {
            expected: "sample blocks of equal shape".into(),
            got: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(sv.amplitudes[1..].iter().all(|a| approx_eq(*a, Complex64::new(0.0, 0.0))));
    }

    #[test]
    fn test_qubit_zero_is_most_significant() {
        let mut sv = Statevector::new(2);
        sv.x(0).unwrap();
        // |10⟩ has basis index 2.
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.h(0).unwrap().cx(0, 1).unwrap();

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_rotations_preserve_norm() {
        let mut sv = Statevector::new(3);
        sv.rx(0, 0.3).unwrap().ry(1, 1.1).unwrap().rz(2, -0.7).unwrap().y(1).unwrap();
        assert!((sv.norm_sqr() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_qubit() {
        let mut sv = Statevector::new(1);
        assert!(matches!(
            sv.h(1),
            Err(MeasureError::QubitOutOfRange { qubit: 1, n_qubits: 1 })
        ));
    }

    #[test]
    fn test_sample_bits_deterministic() {
        let mut sv = Statevector::new(2);
        sv.x(1).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let bits = sv.sample_bits(50, &mut rng);
        assert_eq!(bits.dim(), (50, 2));
        assert!(bits.rows().into_iter().all(|r| r[0] == 0 && r[1] == 1));
    }

    #[test]
    fn test_from_amplitudes_requires_power_of_two() {
        let amps = vec![Complex64::new(1.0, 0.0); 3];
        assert!(Statevector::from_amplitudes(amps).is_err());
    }

    #[test]
    fn test_batch_stacks_rows() {
        let a = Statevector::new(1);
        let mut b = Statevector::new(1);
        b.x(0).unwrap();
        let stacked = batch(&[a, b]).unwrap();
        assert_eq!(stacked.shape(), &[2, 2]);
    }
}
