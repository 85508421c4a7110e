//! Observables and their capability set.
//!
//! Every observable exposes the same four capabilities through the
//! [`Observable`] trait: whether it is Hermitian, its eigenvalues in
//! computational-basis order, the wires it acts on, and its defining
//! parameters.
//!
//! Measurement code never inspects concrete types. It matches on [`Obs`],
//! whose [`Obs::Projector`] variant carries the basis-state projector that
//! receives bespoke handling; everything else is [`Obs::Generic`].
//!
//! # Example
//!
//! ```rust
//! use arvak_measure::observable::{BasisStateProjector, Obs, Observable, PauliZ, Tensor};
//! use arvak_measure::Wires;
//!
//! let zz = Tensor::new([Obs::from(PauliZ::new(0)), Obs::from(PauliZ::new(1))]).unwrap();
//! assert_eq!(zz.eigenvalues().unwrap(), vec![1.0, -1.0, -1.0, 1.0]);
//!
//! let proj = Obs::from(BasisStateProjector::from_bitstring("10", Wires::range(2)));
//! assert!(matches!(proj, Obs::Projector(_)));
//! ```

use num_complex::Complex64;
use std::fmt;
use std::sync::Arc;

use crate::error::{MeasureError, MeasureResult};
use crate::math::basis_dim;
use crate::wires::{WireLabel, Wires};

/// Default absolute tolerance on imaginary parts for Hermiticity checks.
pub const DEFAULT_HERMITIAN_ATOL: f64 = 1e-10;

/// A defining parameter of an observable.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Real scalar.
    Scalar(f64),
    /// Complex scalar.
    Complex(Complex64),
    /// Basis state digits, most significant first. Not validated.
    BasisState(String),
}

/// Capability set shared by all observables.
pub trait Observable: fmt::Debug + Send + Sync {
    /// Short operator name, e.g. `PauliZ`.
    fn name(&self) -> &str;

    /// Whether the operator is Hermitian.
    fn is_hermitian(&self) -> bool;

    /// Eigenvalues ordered by computational-basis index over [`wires`],
    /// first wire most significant.
    ///
    /// [`wires`]: Observable::wires
    fn eigenvalues(&self) -> MeasureResult<Vec<f64>>;

    /// Wires the observable acts on.
    fn wires(&self) -> &Wires;

    /// Defining parameters.
    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    /// Human-readable label, e.g. `PauliZ(wires=[0])`.
    fn label(&self) -> String {
        format!("{}(wires={})", self.name(), self.wires())
    }
}

macro_rules! pauli_observable {
    ($ty:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $ty {
            wires: Wires,
        }

        impl $ty {
            /// Create the observable on a single wire.
            pub fn new(wire: impl Into<WireLabel>) -> Self {
                Self {
                    wires: Wires::single(wire),
                }
            }
        }

        impl Observable for $ty {
            fn name(&self) -> &str {
                stringify!($ty)
            }

            fn is_hermitian(&self) -> bool {
                true
            }

            fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
                Ok(vec![1.0, -1.0])
            }

            fn wires(&self) -> &Wires {
                &self.wires
            }
        }
    };
}

pauli_observable!(PauliX, "Pauli-X observable. Eigenvalues `[1, -1]`.");
pauli_observable!(PauliY, "Pauli-Y observable. Eigenvalues `[1, -1]`.");
pauli_observable!(PauliZ, "Pauli-Z observable. Eigenvalues `[1, -1]`.");
pauli_observable!(Hadamard, "Hadamard observable. Eigenvalues `[1, -1]`.");

/// Identity observable on a single wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    wires: Wires,
}

impl Identity {
    /// Create the identity on a single wire.
    pub fn new(wire: impl Into<WireLabel>) -> Self {
        Self {
            wires: Wires::single(wire),
        }
    }
}

impl Observable for Identity {
    fn name(&self) -> &str {
        "Identity"
    }

    fn is_hermitian(&self) -> bool {
        true
    }

    fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
        Ok(vec![1.0, 1.0])
    }

    fn wires(&self) -> &Wires {
        &self.wires
    }
}

/// An operator that is diagonal in the computational basis.
///
/// Hermitian iff every diagonal entry is real to within `hermitian_atol`.
/// The eigenvalues reported are the real parts of the entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagonal {
    wires: Wires,
    entries: Vec<Complex64>,
    hermitian_atol: f64,
}

impl Diagonal {
    /// Create a diagonal operator; `entries.len()` must be `2^wires.len()`.
    pub fn new(entries: impl IntoIterator<Item = Complex64>, wires: Wires) -> MeasureResult<Self> {
        let entries: Vec<Complex64> = entries.into_iter().collect();
        let dim = basis_dim(wires.len())?;
        if entries.len() != dim {
            return Err(MeasureError::ShapeMismatch {
                expected: format!("{dim} diagonal entries"),
                got: format!("{} entries", entries.len()),
            });
        }
        Ok(Self {
            wires,
            entries,
            hermitian_atol: DEFAULT_HERMITIAN_ATOL,
        })
    }

    /// Create a real diagonal operator.
    pub fn real(entries: impl IntoIterator<Item = f64>, wires: Wires) -> MeasureResult<Self> {
        Self::new(entries.into_iter().map(|e| Complex64::new(e, 0.0)), wires)
    }

    /// Override the tolerance used by [`Observable::is_hermitian`].
    pub fn with_tolerance(mut self, hermitian_atol: f64) -> Self {
        self.hermitian_atol = hermitian_atol;
        self
    }

    /// The diagonal entries.
    pub fn entries(&self) -> &[Complex64] {
        &self.entries
    }
}

impl Observable for Diagonal {
    fn name(&self) -> &str {
        "Diagonal"
    }

    fn is_hermitian(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.im.abs() <= self.hermitian_atol)
    }

    fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
        Ok(self.entries.iter().map(|e| e.re).collect())
    }

    fn wires(&self) -> &Wires {
        &self.wires
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.entries.iter().copied().map(Parameter::Complex).collect()
    }
}

/// Tensor product of observables acting on disjoint wires.
#[derive(Debug, Clone)]
pub struct Tensor {
    factors: Vec<Obs>,
    wires: Wires,
}

impl Tensor {
    /// Build the product; factors must not share wires.
    pub fn new(factors: impl IntoIterator<Item = Obs>) -> MeasureResult<Self> {
        let factors: Vec<Obs> = factors.into_iter().collect();
        if factors.is_empty() {
            return Err(MeasureError::Configuration(
                "tensor product needs at least one factor".into(),
            ));
        }
        let wires = Wires::new(factors.iter().flat_map(|f| f.wires().iter().cloned()))?;
        Ok(Self { factors, wires })
    }

    /// The factors in order.
    pub fn factors(&self) -> &[Obs] {
        &self.factors
    }
}

impl Observable for Tensor {
    fn name(&self) -> &str {
        "Tensor"
    }

    fn is_hermitian(&self) -> bool {
        self.factors.iter().all(Observable::is_hermitian)
    }

    fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
        let mut acc = vec![1.0];
        for factor in &self.factors {
            let ev = factor.eigenvalues()?;
            acc = acc
                .iter()
                .flat_map(|a| ev.iter().map(move |b| a * b))
                .collect();
        }
        Ok(acc)
    }

    fn wires(&self) -> &Wires {
        &self.wires
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.factors.iter().flat_map(Observable::parameters).collect()
    }

    fn label(&self) -> String {
        let parts: Vec<String> = self.factors.iter().map(Observable::label).collect();
        parts.join(" @ ")
    }
}

/// Projector `|b⟩⟨b|` onto a single computational basis state.
///
/// The defining parameter is the bit-string `b`, most significant bit on the
/// first wire. It is stored as given and only validated when converted to a
/// basis index, so a malformed string (a non-binary digit, or a length other
/// than the wire count) surfaces as [`MeasureError::MalformedBitString`] at
/// evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisStateProjector {
    basis_state: String,
    wires: Wires,
}

impl BasisStateProjector {
    /// Create from a sequence of digits.
    pub fn new(basis_state: impl IntoIterator<Item = u8>, wires: Wires) -> Self {
        let basis_state: String = basis_state.into_iter().map(|d| d.to_string()).collect();
        Self { basis_state, wires }
    }

    /// Create from a textual bit-string such as `"0110"`.
    pub fn from_bitstring(bits: &str, wires: Wires) -> Self {
        Self {
            basis_state: bits.to_string(),
            wires,
        }
    }

    /// The raw bit-string.
    pub fn basis_state(&self) -> &str {
        &self.basis_state
    }

    /// The bit-string interpreted as a binary integer, most significant
    /// bit first.
    ///
    /// The bit-string must hold exactly one binary digit per wire.
    pub fn basis_index(&self) -> MeasureResult<usize> {
        let malformed = || MeasureError::MalformedBitString {
            bits: self.basis_state.clone(),
        };
        let digits = self.basis_state.chars().count();
        if digits != self.wires.len() || digits > usize::BITS as usize {
            return Err(malformed());
        }
        self.basis_state.chars().try_fold(0usize, |acc, c| match c {
            '0' => Ok(acc << 1),
            '1' => Ok((acc << 1) | 1),
            _ => Err(malformed()),
        })
    }
}

impl Observable for BasisStateProjector {
    fn name(&self) -> &str {
        "BasisStateProjector"
    }

    fn is_hermitian(&self) -> bool {
        true
    }

    fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
        let dim = basis_dim(self.wires.len())?;
        let idx = self.basis_index()?;
        if idx >= dim {
            return Err(MeasureError::IndexOutOfBounds { index: idx, len: dim });
        }
        let mut ev = vec![0.0; dim];
        ev[idx] = 1.0;
        Ok(ev)
    }

    fn wires(&self) -> &Wires {
        &self.wires
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::BasisState(self.basis_state.clone())]
    }
}

/// A shared observable, tagged by the kind of handling it needs.
///
/// Conversions from the concrete types route [`BasisStateProjector`] to the
/// `Projector` variant; anything else, including user-defined observables
/// passed to [`Obs::generic`], is `Generic`.
#[derive(Debug, Clone)]
pub enum Obs {
    /// Basis-state projector, evaluated from a single probability entry.
    Projector(Arc<BasisStateProjector>),
    /// Any other observable, evaluated through its eigenvalues.
    Generic(Arc<dyn Observable>),
}

impl Obs {
    /// Wrap a user-defined observable.
    pub fn generic(obs: Arc<dyn Observable>) -> Self {
        Obs::Generic(obs)
    }

    /// Wrap a basis-state projector.
    pub fn projector(proj: BasisStateProjector) -> Self {
        Obs::Projector(Arc::new(proj))
    }

    /// The underlying observable as a trait object.
    pub fn as_observable(&self) -> &dyn Observable {
        match self {
            Obs::Projector(p) => p.as_ref(),
            Obs::Generic(o) => o.as_ref(),
        }
    }
}

impl Observable for Obs {
    fn name(&self) -> &str {
        self.as_observable().name()
    }

    fn is_hermitian(&self) -> bool {
        self.as_observable().is_hermitian()
    }

    fn eigenvalues(&self) -> MeasureResult<Vec<f64>> {
        self.as_observable().eigenvalues()
    }

    fn wires(&self) -> &Wires {
        self.as_observable().wires()
    }

    fn parameters(&self) -> Vec<Parameter> {
        self.as_observable().parameters()
    }

    fn label(&self) -> String {
        self.as_observable().label()
    }
}

impl fmt::Display for Obs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<BasisStateProjector> for Obs {
    fn from(proj: BasisStateProjector) -> Self {
        Obs::projector(proj)
    }
}

macro_rules! generic_obs_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Obs {
                fn from(obs: $ty) -> Self {
                    Obs::Generic(Arc::new(obs))
                }
            }
        )*
    };
}

generic_obs_from!(PauliX, PauliY, PauliZ, Hadamard, Identity, Diagonal, Tensor);
