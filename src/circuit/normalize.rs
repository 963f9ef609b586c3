//! Reduction of a circuit to the vocabulary the key-update walker understands.
//!
//! Every instruction the walker has an exact rule for passes through unchanged. The
//! reducible kinds are rewritten into that vocabulary, up to a global phase. Opaque
//! instructions have no known decomposition and pass through with a warning, so the walker
//! later reports them as unverified.

use log::{debug, warn};

use super::{errors::CircuitError, structure::Circuit};
use crate::{GateType, Instruction, InstructionError, QubitId};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed instruction {index}: {err}")]
    Instruction {
        index: usize,
        err: InstructionError,
    },
    #[error("Circuit error: {0}")]
    Circuit(#[from] CircuitError),
}
pub type NormalizeError = Error;

pub trait Normalizer {
    fn normalize(&self, circuit: &Circuit) -> Result<Circuit, Error>;
}

/// Rewrites `Rz`, `Cz`, `Cp`, `Swap` and `Ccx` into `H`, `P`, `T`, `T†` and `CX`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardBasis;

impl StandardBasis {
    fn rewrite(&self, instruction: &Instruction) -> Result<Vec<Instruction>, InstructionError> {
        instruction.validate()?;
        let q = &instruction.qubits;

        Ok(match instruction.gate_type {
            GateType::Rz => vec![Instruction::phase(instruction.angle()?, q[0])],
            GateType::Cz => vec![
                Instruction::h(q[1]),
                Instruction::cx(q[0], q[1]),
                Instruction::h(q[1]),
            ],
            GateType::Swap => vec![
                Instruction::cx(q[0], q[1]),
                Instruction::cx(q[1], q[0]),
                Instruction::cx(q[0], q[1]),
            ],
            GateType::Cp => {
                let half = instruction.angle()? / 2.0;
                vec![
                    Instruction::phase(half, q[0]),
                    Instruction::cx(q[0], q[1]),
                    Instruction::phase(-half, q[1]),
                    Instruction::cx(q[0], q[1]),
                    Instruction::phase(half, q[1]),
                ]
            }
            GateType::Ccx => toffoli(q[0], q[1], q[2]),
            GateType::Opaque => {
                warn!(
                    "normalize: opaque gate {} on {:?} passed through",
                    instruction.name(),
                    instruction.qubits
                );
                vec![instruction.clone()]
            }
            _ => vec![instruction.clone()],
        })
    }
}

/// Seven-T decomposition of the Toffoli gate.
pub fn toffoli(a: QubitId, b: QubitId, target: QubitId) -> Vec<Instruction> {
    vec![
        Instruction::h(target),
        Instruction::cx(b, target),
        Instruction::tdg(target),
        Instruction::cx(a, target),
        Instruction::t(target),
        Instruction::cx(b, target),
        Instruction::tdg(target),
        Instruction::cx(a, target),
        Instruction::t(b),
        Instruction::t(target),
        Instruction::h(target),
        Instruction::cx(a, b),
        Instruction::t(a),
        Instruction::tdg(b),
        Instruction::cx(a, b),
    ]
}

impl Normalizer for StandardBasis {
    fn normalize(&self, circuit: &Circuit) -> Result<Circuit, Error> {
        let mut output = Circuit::with_clbits(circuit.num_qubits, circuit.num_clbits);
        output.name = circuit.name.clone();

        for (index, instruction) in circuit.instructions.iter().enumerate() {
            let rewritten = self
                .rewrite(instruction)
                .map_err(|err| Error::Instruction { index, err })?;
            output.extend(rewritten)?;
        }

        debug!(
            "normalize: gates {} -> {} named_t={}",
            circuit.len(),
            output.len(),
            output.gate_count.t_count()
        );
        Ok(output)
    }
}

/// True when every instruction is in the walker's basis vocabulary.
pub fn is_normalized(circuit: &Circuit) -> bool {
    circuit.instructions.iter().all(|i| i.gate_type.is_basis())
}
