use super::errors::CircuitError;
use crate::{ClbitId, GateCount, Instruction, PhaseClass, QubitId, config::Tolerance};

/// Ordered gate sequence over a fixed number of qubit and classical-bit lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Circuit {
    pub num_qubits: usize,
    pub num_clbits: usize,
    pub instructions: Vec<Instruction>,
    pub gate_count: GateCount,
    pub name: Option<String>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            ..Default::default()
        }
    }

    pub fn with_clbits(num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            num_qubits,
            num_clbits,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn qubits(&self) -> impl Iterator<Item = QubitId> {
        (0..self.num_qubits).map(QubitId)
    }

    /// Appends an instruction after checking its arity and line indices.
    pub fn add_gate(&mut self, instruction: Instruction) -> Result<(), CircuitError> {
        instruction.validate()?;

        if let Some(q) = instruction.qubits.iter().find(|q| q.0 >= self.num_qubits) {
            return Err(CircuitError::QubitOutOfRange {
                qubit: *q,
                num_qubits: self.num_qubits,
            });
        }
        if let Some(c) = instruction.clbits.iter().find(|c| c.0 >= self.num_clbits) {
            return Err(CircuitError::ClbitOutOfRange {
                clbit: *c,
                num_clbits: self.num_clbits,
            });
        }

        self.gate_count.handle(instruction.gate_type);
        self.instructions.push(instruction);
        Ok(())
    }

    pub fn extend(
        &mut self,
        instructions: impl IntoIterator<Item = Instruction>,
    ) -> Result<(), CircuitError> {
        instructions
            .into_iter()
            .try_for_each(|instruction| self.add_gate(instruction))
    }

    /// Grows the circuit to at least `num_qubits` lines.
    pub fn widen(&mut self, num_qubits: usize) {
        self.num_qubits = self.num_qubits.max(num_qubits);
    }

    /// Adds `count` fresh classical bits and returns the first one.
    pub fn add_clbits(&mut self, count: usize) -> ClbitId {
        let first = ClbitId(self.num_clbits);
        self.num_clbits += count;
        first
    }

    /// Appends `other` with its qubit `i` placed on line `qubit_offset + i` and its
    /// classical bit `j` on `clbit_offset + j`.
    pub fn compose(
        &mut self,
        other: &Circuit,
        qubit_offset: usize,
        clbit_offset: usize,
    ) -> Result<(), CircuitError> {
        if qubit_offset + other.num_qubits > self.num_qubits {
            return Err(CircuitError::CompositionTooWide {
                needed: qubit_offset + other.num_qubits,
                available: self.num_qubits,
            });
        }
        if clbit_offset + other.num_clbits > self.num_clbits {
            return Err(CircuitError::CompositionTooWide {
                needed: clbit_offset + other.num_clbits,
                available: self.num_clbits,
            });
        }

        other
            .instructions
            .iter()
            .try_for_each(|i| self.add_gate(i.shifted(qubit_offset, clbit_offset)))
    }

    /// Measures `qubits` in order into fresh classical bits; returns the first new bit.
    pub fn measure(
        &mut self,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> Result<ClbitId, CircuitError> {
        let qubits = qubits.into_iter().collect::<Vec<_>>();
        let first = self.add_clbits(qubits.len());
        qubits
            .into_iter()
            .enumerate()
            .try_for_each(|(i, q)| self.add_gate(Instruction::measure(q, ClbitId(first.0 + i))))?;
        Ok(first)
    }

    pub fn measure_all(&mut self) -> Result<ClbitId, CircuitError> {
        self.measure((0..self.num_qubits).map(QubitId))
    }

    /// Gates in reverse order, each replaced by its inverse.
    pub fn inverse(&self) -> Result<Circuit, CircuitError> {
        let mut inverse = Circuit::with_clbits(self.num_qubits, self.num_clbits);
        inverse.name = self.name.as_ref().map(|name| format!("{name}_dg"));
        for instruction in self.instructions.iter().rev() {
            let inverted = instruction
                .inverse()
                .ok_or(CircuitError::NotInvertible {
                    gate: instruction.gate_type,
                })?;
            inverse.add_gate(inverted)?;
        }
        Ok(inverse)
    }

    /// Instructions that cost one gadget correction: named `T`/`T†` and any phase
    /// rotation at `±π/4`.
    pub fn t_count(&self, tolerance: &Tolerance) -> usize {
        self.instructions
            .iter()
            .filter(|i| {
                matches!(
                    i.phase_class(tolerance),
                    Ok(Some(PhaseClass::T | PhaseClass::Tdg))
                )
            })
            .count()
    }

    pub fn has_measurements(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| i.gate_type == crate::GateType::Measure)
    }

    /// Whether any instruction other than a barrier touches `qubit`.
    pub fn touches(&self, qubit: QubitId) -> bool {
        self.instructions
            .iter()
            .filter(|i| i.gate_type != crate::GateType::Barrier)
            .any(|i| i.qubits.contains(&qubit))
    }
}
