//! Circuit execution behind a single request/response call.
//!
//! A backend receives the corrected circuit and returns how often each classical
//! bitstring was observed. Bitstrings follow the usual simulator order: the rightmost
//! character is classical bit 0.

use std::collections::BTreeMap;

use crate::{ClbitId, ConjugationError, GateType, InstructionError, QubitId, circuit::Circuit};

mod noise;
mod state_vector;

pub use noise::ReadoutNoise;
pub use state_vector::{MAX_QUBITS, StateVector};

/// Outcome bitstring to number of shots that produced it.
pub type Counts = BTreeMap<String, usize>;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Circuit of {num_qubits} qubits exceeds simulator limit of {max}")]
    TooManyQubits { num_qubits: usize, max: usize },
    #[error("Instruction {index} acts on qubit {qubit} after it was measured")]
    MidCircuitMeasurement { index: usize, qubit: QubitId },
    #[error("Instruction {index}: gate {gate:?} cannot be simulated")]
    Unsupported { index: usize, gate: GateType },
    #[error("Instruction {index}: {err}")]
    Matrix {
        index: usize,
        err: ConjugationError,
    },
    #[error("Instruction {index}: {err}")]
    Instruction {
        index: usize,
        err: InstructionError,
    },
    #[error("Instruction {index} acts on qubit {qubit} outside circuit of {num_qubits} qubits")]
    QubitOutOfRange {
        index: usize,
        qubit: QubitId,
        num_qubits: usize,
    },
    #[error("Instruction {index} writes classical bit {clbit} outside circuit of {num_clbits} bits")]
    ClbitOutOfRange {
        index: usize,
        clbit: ClbitId,
        num_clbits: usize,
    },
    #[error("Noise probability {0} outside [0, 1]")]
    InvalidProbability(String),
}
pub type BackendError = Error;

pub trait ExecutionBackend {
    /// Runs `circuit` `shots` times. Circuits without measurements are measured in full.
    fn execute(&mut self, circuit: &Circuit, shots: usize) -> Result<Counts, Error>;
}

impl<B: ExecutionBackend + ?Sized> ExecutionBackend for &mut B {
    fn execute(&mut self, circuit: &Circuit, shots: usize) -> Result<Counts, Error> {
        (**self).execute(circuit, shots)
    }
}

pub fn total_shots(counts: &Counts) -> usize {
    counts.values().sum()
}
