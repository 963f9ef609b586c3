use crate::{ClbitId, GateType, InstructionError, QubitId};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CircuitError {
    #[error("Instruction error: {0}")]
    Instruction(#[from] InstructionError),
    #[error("Qubit {qubit} outside circuit of {num_qubits} qubits")]
    QubitOutOfRange { qubit: QubitId, num_qubits: usize },
    #[error("Classical bit {clbit} outside circuit of {num_clbits} bits")]
    ClbitOutOfRange { clbit: ClbitId, num_clbits: usize },
    #[error("Composition needs {needed} lines, circuit has {available}")]
    CompositionTooWide { needed: usize, available: usize },
    #[error("Gate {gate:?} has no inverse")]
    NotInvertible { gate: GateType },
}
