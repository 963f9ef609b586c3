use log::{debug, trace, warn};

use super::{
    errors::CircuitError,
    structure::Circuit,
    substitution::{NonClifford, Substitution, substitute},
};
use crate::{
    GateType, Instruction, InstructionError, KeyError, KeyTable, Mask, PhaseClass, QubitId,
    config::Tolerance,
};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Key lookup failed: {0}")]
    Key(#[from] KeyError),
    #[error("Malformed instruction {index}: {err}")]
    Instruction {
        index: usize,
        err: InstructionError,
    },
    #[error("Dummy qubit {dummy} outside circuit of {num_qubits} qubits")]
    DummyOutOfRange { dummy: QubitId, num_qubits: usize },
    #[error("Dummy qubit {dummy} is used by instruction {index}")]
    DummyInUse { dummy: QubitId, index: usize },
    #[error("Output circuit rejected instruction: {0}")]
    Circuit(#[from] CircuitError),
}
pub type KeyUpdateError = Error;

/// An instruction the walker could not account for. The key table is left untouched
/// for its qubits, so decryption of those lines is no longer guaranteed.
#[derive(Clone, Debug, PartialEq)]
pub struct UnverifiedGate {
    pub index: usize,
    pub instruction: Instruction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyUpdate {
    /// Input circuit with gadget corrections inserted after each `T`/`T†`
    pub circuit: Circuit,
    pub unverified: Vec<UnverifiedGate>,
    pub substitutions: Vec<Substitution>,
}

impl KeyUpdate {
    /// True when every instruction had a known effect on the keys.
    pub fn is_exact(&self) -> bool {
        self.unverified.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Passthrough,
    Hadamard(QubitId),
    Cnot(QubitId, QubitId),
    Phase(QubitId),
    Pauli,
    NonClifford(NonClifford, QubitId),
    Unverified,
}

/// Replays a normalized circuit over a [`KeyTable`], one instruction at a time.
#[derive(Clone, Debug)]
pub struct KeyUpdater {
    pub dummy: QubitId,
    pub tolerance: Tolerance,
}

impl KeyUpdater {
    pub fn new(dummy: QubitId) -> Self {
        Self {
            dummy,
            tolerance: Tolerance::default(),
        }
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn classify(&self, instruction: &Instruction) -> Result<Action, InstructionError> {
        Ok(match instruction.gate_type {
            GateType::Measure | GateType::Barrier => Action::Passthrough,
            GateType::H => Action::Hadamard(instruction.target()?),
            GateType::Cx => {
                let (control, target) = instruction.pair()?;
                Action::Cnot(control, target)
            }
            GateType::X | GateType::Y | GateType::Z | GateType::Id => {
                instruction.target()?;
                Action::Pauli
            }
            GateType::S | GateType::Sdg | GateType::T | GateType::Tdg | GateType::Phase => {
                let qubit = instruction.target()?;
                match instruction.phase_class(&self.tolerance)? {
                    Some(PhaseClass::S | PhaseClass::Sdg) => Action::Phase(qubit),
                    Some(PhaseClass::T) => Action::NonClifford(NonClifford::T, qubit),
                    Some(PhaseClass::Tdg) => Action::NonClifford(NonClifford::Tdg, qubit),
                    Some(PhaseClass::Identity | PhaseClass::Z) => Action::Pauli,
                    Some(PhaseClass::Unverified) | None => Action::Unverified,
                }
            }
            GateType::Rz
            | GateType::Cz
            | GateType::Cp
            | GateType::Swap
            | GateType::Ccx
            | GateType::Opaque => Action::Unverified,
        })
    }

    /// Walks `circuit` left to right, updating `keys` in gate order.
    ///
    /// Every instruction is copied to the output first; `T`/`T†` are then followed by
    /// their gadget correction. On error `keys` is left as it was.
    pub fn run(&self, keys: &mut KeyTable, circuit: &Circuit) -> Result<KeyUpdate, Error> {
        debug!(
            "update_keys: start qubits={} gates={} dummy={}",
            circuit.num_qubits,
            circuit.len(),
            self.dummy
        );

        if self.dummy.0 >= circuit.num_qubits {
            return Err(Error::DummyOutOfRange {
                dummy: self.dummy,
                num_qubits: circuit.num_qubits,
            });
        }
        if let Some(index) = circuit
            .instructions
            .iter()
            .position(|i| i.gate_type != GateType::Barrier && i.qubits.contains(&self.dummy))
        {
            return Err(Error::DummyInUse {
                dummy: self.dummy,
                index,
            });
        }

        let mut working = keys.clone();
        let mut output = Circuit::with_clbits(circuit.num_qubits, circuit.num_clbits);
        output.name = circuit.name.clone();
        let mut unverified = Vec::new();
        let mut substitutions = Vec::new();

        for (index, instruction) in circuit.instructions.iter().enumerate() {
            output.add_gate(instruction.clone())?;

            let action = self
                .classify(instruction)
                .map_err(|err| Error::Instruction { index, err })?;

            debug!("update_keys: gate[{index}] {instruction} {action:?}");

            match action {
                Action::Passthrough | Action::Pauli => {}
                Action::Hadamard(q) => {
                    let mask = working.update(q, Mask::conjugate_h)?;
                    trace!("update_keys: gate[{index}] key[{q}]={mask}");
                }
                Action::Phase(q) => {
                    let mask = working.update(q, Mask::conjugate_s)?;
                    trace!("update_keys: gate[{index}] key[{q}]={mask}");
                }
                Action::Cnot(control, target) => {
                    let (c, t) = working.update_pair(control, target, Mask::conjugate_cnot)?;
                    trace!("update_keys: gate[{index}] key[{control}]={c} key[{target}]={t}");
                }
                Action::NonClifford(gate, q) => {
                    let substitution = substitute(gate, q, working.get(q)?, self.dummy);
                    working.set(q, substitution.mask)?;
                    output.add_gate(substitution.instruction.clone())?;
                    substitutions.push(substitution);
                }
                Action::Unverified => {
                    warn!(
                        "update_keys: gate[{index}] unverified gate {} theta={:?}, keys not updated",
                        instruction.name(),
                        instruction.params.first()
                    );
                    unverified.push(UnverifiedGate {
                        index,
                        instruction: instruction.clone(),
                    });
                }
            }
        }

        if !unverified.is_empty() {
            warn!(
                "update_keys: {} unverified gate(s), key table is only an approximation",
                unverified.len()
            );
        }
        debug!(
            "update_keys: complete output_gates={} substitutions={}",
            output.len(),
            substitutions.len()
        );

        *keys = working;
        Ok(KeyUpdate {
            circuit: output,
            unverified,
            substitutions,
        })
    }
}

/// [`KeyUpdater::run`] with the default tolerance.
pub fn update_keys(
    keys: &mut KeyTable,
    circuit: &Circuit,
    dummy: QubitId,
) -> Result<KeyUpdate, Error> {
    KeyUpdater::new(dummy).run(keys, circuit)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use test_log::test;

    use super::*;
    use crate::ClbitId;

    fn keys(masks: &[(u8, u8)]) -> KeyTable {
        KeyTable::from_masks(masks.iter().copied().map(Mask::from))
    }

    fn circuit(num_qubits: usize, instructions: Vec<Instruction>) -> Circuit {
        let mut c = Circuit::with_clbits(num_qubits, num_qubits);
        c.extend(instructions).unwrap();
        c
    }

    #[test]
    fn test_hadamard_then_cnot() {
        let mut table = keys(&[(1, 0), (0, 1), (0, 0)]);
        let server = circuit(
            3,
            vec![
                Instruction::h(QubitId(0)),
                Instruction::cx(QubitId(0), QubitId(1)),
            ],
        );

        let result = update_keys(&mut table, &server, QubitId(2)).unwrap();

        // H: (1,0) -> (0,1); CNOT: ((0,1),(0,1)) -> ((0,0),(0,1))
        assert_eq!(table.get(QubitId(0)), Ok(Mask::from((0, 0))));
        assert_eq!(table.get(QubitId(1)), Ok(Mask::from((0, 1))));
        assert_eq!(result.circuit.instructions, server.instructions);
        assert!(result.is_exact());
    }

    #[test]
    fn test_double_hadamard_restores_keys() {
        let mut table = keys(&[(1, 0), (0, 0)]);
        let server = circuit(
            2,
            vec![Instruction::h(QubitId(0)), Instruction::h(QubitId(0))],
        );
        update_keys(&mut table, &server, QubitId(1)).unwrap();
        assert_eq!(table.get(QubitId(0)), Ok(Mask::from((1, 0))));
    }

    #[test]
    fn test_phase_rotations() {
        let mut table = keys(&[(1, 0), (1, 1), (0, 0)]);
        let server = circuit(
            3,
            vec![
                Instruction::phase(PI / 2.0, QubitId(0)),
                Instruction::phase(-PI / 2.0, QubitId(1)),
            ],
        );
        update_keys(&mut table, &server, QubitId(2)).unwrap();
        assert_eq!(table.get(QubitId(0)), Ok(Mask::from((1, 1))));
        assert_eq!(table.get(QubitId(1)), Ok(Mask::from((1, 0))));
    }

    #[test]
    fn test_paulis_and_directives_do_not_touch_keys() {
        let mut table = keys(&[(1, 1), (0, 1), (0, 0)]);
        let before = table.clone();
        let server = circuit(
            3,
            vec![
                Instruction::x(QubitId(0)),
                Instruction::y(QubitId(1)),
                Instruction::z(QubitId(0)),
                Instruction::id(QubitId(1)),
                Instruction::phase(PI, QubitId(0)),
                Instruction::barrier(vec![QubitId(0), QubitId(1), QubitId(2)]),
                Instruction::measure(QubitId(0), ClbitId(0)),
            ],
        );
        let result = update_keys(&mut table, &server, QubitId(2)).unwrap();
        assert_eq!(table, before);
        assert_eq!(result.circuit.len(), server.len());
    }

    #[test]
    fn test_t_gate_keeps_original_and_appends_correction() {
        let mut table = keys(&[(1, 0), (0, 1), (0, 0)]);
        let server = circuit(3, vec![Instruction::t(QubitId(0)), Instruction::tdg(QubitId(1))]);

        let result = update_keys(&mut table, &server, QubitId(2)).unwrap();

        assert_eq!(
            result.circuit.instructions,
            vec![
                Instruction::t(QubitId(0)),
                Instruction::s(QubitId(0)),
                Instruction::tdg(QubitId(1)),
                Instruction::sdg(QubitId(2)),
            ]
        );
        assert_eq!(table.get(QubitId(0)), Ok(Mask::from((1, 1))));
        assert_eq!(table.get(QubitId(1)), Ok(Mask::from((0, 1))));
        assert_eq!(result.substitutions.len(), 2);
    }

    #[test]
    fn test_phase_quarter_turn_uses_gadget() {
        let mut table = keys(&[(1, 0), (0, 0)]);
        let server = circuit(2, vec![Instruction::phase(-PI / 4.0, QubitId(0))]);
        let result = update_keys(&mut table, &server, QubitId(1)).unwrap();
        assert_eq!(result.circuit.instructions[1], Instruction::sdg(QubitId(0)));
    }

    #[test]
    fn test_unverified_gates_are_reported() {
        let mut table = keys(&[(1, 0), (0, 1), (0, 0)]);
        let before = table.clone();
        let server = circuit(
            3,
            vec![
                Instruction::phase(PI / 8.0, QubitId(0)),
                Instruction::swap(QubitId(0), QubitId(1)),
                Instruction::opaque("u3", vec![QubitId(1)], vec![0.1, 0.2, 0.3]),
            ],
        );

        let result = update_keys(&mut table, &server, QubitId(2)).unwrap();

        assert!(!result.is_exact());
        assert_eq!(
            result.unverified.iter().map(|u| u.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(table, before);
        assert_eq!(result.circuit.len(), 3);
    }

    #[test]
    fn test_dummy_checks() {
        let mut table = keys(&[(0, 0), (0, 0)]);
        let server = circuit(2, vec![Instruction::h(QubitId(1))]);

        assert_eq!(
            update_keys(&mut table, &server, QubitId(1)),
            Err(KeyUpdateError::DummyInUse {
                dummy: QubitId(1),
                index: 0
            })
        );
        assert_eq!(
            update_keys(&mut table, &server, QubitId(5)),
            Err(KeyUpdateError::DummyOutOfRange {
                dummy: QubitId(5),
                num_qubits: 2
            })
        );
    }

    #[test]
    fn test_missing_key_leaves_table_untouched() {
        let mut table = KeyTable::new(3);
        table.init(QubitId(0), Mask::from((1, 0))).unwrap();
        let before = table.clone();
        let server = circuit(
            3,
            vec![
                Instruction::h(QubitId(0)),
                Instruction::cx(QubitId(0), QubitId(1)),
            ],
        );
        assert_eq!(
            update_keys(&mut table, &server, QubitId(2)),
            Err(KeyUpdateError::Key(KeyError::KeyNotFound(QubitId(1))))
        );
        assert_eq!(table, before);
    }

    #[test]
    fn test_malformed_instruction_is_fatal() {
        let mut table = keys(&[(0, 0), (0, 0), (0, 0)]);
        let mut server = Circuit::new(3);
        // bypass add_gate validation
        server
            .instructions
            .push(Instruction::new(GateType::Phase, vec![QubitId(0)], vec![]));

        assert!(matches!(
            update_keys(&mut table, &server, QubitId(2)),
            Err(KeyUpdateError::Circuit(_))
        ));
    }
}
