pub mod backend;
pub mod circuit;
pub mod config;
mod core;
pub mod protocol;

pub use crate::core::{
    conjugation::{ConjugationError, ConjugationTable, PauliImage, Unitary, conjugation_table},
    gate_type::{GateCount, GateType, PhaseClass},
    instruction::{ClbitId, Instruction, InstructionError, QubitId},
    keys::{KeyError, KeyTable},
    mask::Mask,
};

pub use circuit::{Circuit, CircuitError};
