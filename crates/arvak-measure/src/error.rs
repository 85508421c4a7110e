//! Error types for the measure crate.

use thiserror::Error;

/// Errors produced while constructing or evaluating measurement processes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MeasureError {
    /// The measurement process was configured ambiguously or incompletely.
    #[error("Invalid measurement configuration: {0}")]
    Configuration(String),

    /// A basis-state projector carries a bit-string that is not binary.
    #[error("Basis state '{bits}' is not a valid bit-string")]
    MalformedBitString {
        /// The offending bit-string.
        bits: String,
    },

    /// An index computed from the inputs exceeds the available data.
    ///
    /// This signals an internal invariant violation (inconsistent wire
    /// counts), not a recoverable user error.
    #[error("Index {index} out of bounds for axis of length {len}")]
    IndexOutOfBounds {
        /// The computed index.
        index: usize,
        /// Length of the axis that was indexed.
        len: usize,
    },

    /// A wire is not part of the wire order the data was recorded under.
    #[error("Wire {wire} not found in wire order")]
    WireNotFound {
        /// Display form of the missing wire.
        wire: String,
    },

    /// A wire label appears more than once.
    #[error("Duplicate wire {wire}")]
    DuplicateWire {
        /// Display form of the duplicated wire.
        wire: String,
    },

    /// An array does not have the layout the operation requires.
    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Description of the expected layout.
        expected: String,
        /// Description of the layout that was received.
        got: String,
    },

    /// A shot range selected no shots.
    #[error("Shot range {start}..{end} selects no shots")]
    EmptyShotRange {
        /// Requested start of the range.
        start: usize,
        /// Requested (exclusive) end of the range.
        end: usize,
    },

    /// The bin size is zero or does not divide the retained shots.
    #[error("Bin size {bin_size} does not evenly partition {shots} shots")]
    InvalidBinSize {
        /// Requested bin size.
        bin_size: usize,
        /// Number of retained shots.
        shots: usize,
    },

    /// A raw sample contains a value other than 0 or 1.
    #[error("Sample value {value} is not a bit")]
    InvalidSample {
        /// The offending value.
        value: u8,
    },

    /// A gate references a qubit position outside the state.
    #[error("Qubit {qubit} out of range for a {n_qubits}-qubit state")]
    QubitOutOfRange {
        /// The offending qubit position.
        qubit: usize,
        /// Number of qubits in the state.
        n_qubits: usize,
    },

    /// The computational basis over this many wires has more states than
    /// a `usize` index can address.
    #[error("Basis over {wires} wires is too large to index")]
    TooManyWires {
        /// Number of wires requested.
        wires: usize,
    },

    /// Estimator configuration could not be loaded or is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for measurement operations.
pub type MeasureResult<T> = Result<T, MeasureError>;
