use std::{
    f64::consts::{FRAC_PI_2, FRAC_PI_4},
    fmt,
    ops::Deref,
};

use crate::{GateType, PhaseClass, config::Tolerance};

/// Malformed qubit-index queries. These are contract violations by the caller, never
/// data-dependent conditions.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Gate {gate:?} expects {expected} qubit(s), got {actual}")]
    Arity {
        gate: GateType,
        expected: usize,
        actual: usize,
    },
    #[error("Gate {gate:?} acts on qubit {qubit} more than once")]
    DuplicateQubit { gate: GateType, qubit: QubitId },
    #[error("Gate {gate:?} is missing its angle parameter")]
    MissingParameter { gate: GateType },
    #[error("Instruction {gate:?} has no qubits")]
    NoQubits { gate: GateType },
}
pub type InstructionError = Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QubitId(pub usize);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for QubitId {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClbitId(pub usize);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub gate_type: GateType,
    pub qubits: Vec<QubitId>,
    pub clbits: Vec<ClbitId>,
    pub params: Vec<f64>,
    /// Free-form name, only meaningful for `Opaque`
    pub label: Option<String>,
}

impl Instruction {
    #[must_use]
    pub fn new(gate_type: GateType, qubits: Vec<QubitId>, params: Vec<f64>) -> Self {
        Self {
            gate_type,
            qubits,
            clbits: Vec::new(),
            params,
            label: None,
        }
    }

    fn single(gate_type: GateType, q: QubitId) -> Self {
        Self::new(gate_type, vec![q], Vec::new())
    }

    #[must_use]
    pub fn h(q: QubitId) -> Self {
        Self::single(GateType::H, q)
    }

    #[must_use]
    pub fn x(q: QubitId) -> Self {
        Self::single(GateType::X, q)
    }

    #[must_use]
    pub fn y(q: QubitId) -> Self {
        Self::single(GateType::Y, q)
    }

    #[must_use]
    pub fn z(q: QubitId) -> Self {
        Self::single(GateType::Z, q)
    }

    #[must_use]
    pub fn id(q: QubitId) -> Self {
        Self::single(GateType::Id, q)
    }

    #[must_use]
    pub fn s(q: QubitId) -> Self {
        Self::single(GateType::S, q)
    }

    #[must_use]
    pub fn sdg(q: QubitId) -> Self {
        Self::single(GateType::Sdg, q)
    }

    #[must_use]
    pub fn t(q: QubitId) -> Self {
        Self::single(GateType::T, q)
    }

    #[must_use]
    pub fn tdg(q: QubitId) -> Self {
        Self::single(GateType::Tdg, q)
    }

    #[must_use]
    pub fn phase(theta: f64, q: QubitId) -> Self {
        Self::new(GateType::Phase, vec![q], vec![theta])
    }

    #[must_use]
    pub fn rz(theta: f64, q: QubitId) -> Self {
        Self::new(GateType::Rz, vec![q], vec![theta])
    }

    #[must_use]
    pub fn cx(control: QubitId, target: QubitId) -> Self {
        Self::new(GateType::Cx, vec![control, target], Vec::new())
    }

    #[must_use]
    pub fn cz(a: QubitId, b: QubitId) -> Self {
        Self::new(GateType::Cz, vec![a, b], Vec::new())
    }

    #[must_use]
    pub fn cp(theta: f64, control: QubitId, target: QubitId) -> Self {
        Self::new(GateType::Cp, vec![control, target], vec![theta])
    }

    #[must_use]
    pub fn swap(a: QubitId, b: QubitId) -> Self {
        Self::new(GateType::Swap, vec![a, b], Vec::new())
    }

    #[must_use]
    pub fn ccx(c1: QubitId, c2: QubitId, target: QubitId) -> Self {
        Self::new(GateType::Ccx, vec![c1, c2, target], Vec::new())
    }

    #[must_use]
    pub fn measure(q: QubitId, c: ClbitId) -> Self {
        Self {
            gate_type: GateType::Measure,
            qubits: vec![q],
            clbits: vec![c],
            params: Vec::new(),
            label: None,
        }
    }

    #[must_use]
    pub fn barrier(qubits: Vec<QubitId>) -> Self {
        Self::new(GateType::Barrier, qubits, Vec::new())
    }

    #[must_use]
    pub fn opaque(label: impl Into<String>, qubits: Vec<QubitId>, params: Vec<f64>) -> Self {
        Self {
            gate_type: GateType::Opaque,
            qubits,
            clbits: Vec::new(),
            params,
            label: Some(label.into()),
        }
    }

    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or(self.gate_type.name())
    }

    pub fn angle(&self) -> Result<f64, Error> {
        self.params
            .first()
            .copied()
            .ok_or(Error::MissingParameter {
                gate: self.gate_type,
            })
    }

    /// Checks the qubit list against the gate's declared arity.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(expected) = self.gate_type.arity() {
            if self.qubits.len() != expected {
                return Err(Error::Arity {
                    gate: self.gate_type,
                    expected,
                    actual: self.qubits.len(),
                });
            }
        } else if self.qubits.is_empty() && self.gate_type == GateType::Opaque {
            return Err(Error::NoQubits {
                gate: self.gate_type,
            });
        }

        for (i, q) in self.qubits.iter().enumerate() {
            if self.qubits[..i].contains(q) {
                return Err(Error::DuplicateQubit {
                    gate: self.gate_type,
                    qubit: *q,
                });
            }
        }

        if self.params.len() < self.gate_type.param_count() {
            return Err(Error::MissingParameter {
                gate: self.gate_type,
            });
        }

        Ok(())
    }

    /// The single qubit of a one-qubit instruction.
    pub fn target(&self) -> Result<QubitId, Error> {
        match self.qubits.as_slice() {
            [q] => Ok(*q),
            other => Err(Error::Arity {
                gate: self.gate_type,
                expected: 1,
                actual: other.len(),
            }),
        }
    }

    /// `(control, target)` of a two-qubit instruction.
    pub fn pair(&self) -> Result<(QubitId, QubitId), Error> {
        match self.qubits.as_slice() {
            [c, t] if c == t => Err(Error::DuplicateQubit {
                gate: self.gate_type,
                qubit: *c,
            }),
            [c, t] => Ok((*c, *t)),
            other => Err(Error::Arity {
                gate: self.gate_type,
                expected: 2,
                actual: other.len(),
            }),
        }
    }

    /// Phase class of any diagonal single-qubit phase gate, `None` for other kinds.
    ///
    /// `Rz(θ)` equals `P(θ)` up to a global phase and is classified the same way.
    pub fn phase_class(&self, tolerance: &Tolerance) -> Result<Option<PhaseClass>, Error> {
        Ok(Some(match self.gate_type {
            GateType::S => PhaseClass::S,
            GateType::Sdg => PhaseClass::Sdg,
            GateType::T => PhaseClass::T,
            GateType::Tdg => PhaseClass::Tdg,
            GateType::Phase | GateType::Rz => PhaseClass::classify(self.angle()?, tolerance),
            _ => return Ok(None),
        }))
    }

    /// Equivalent `P(θ)` angle for diagonal phase gates.
    pub fn phase_angle(&self) -> Option<f64> {
        match self.gate_type {
            GateType::S => Some(FRAC_PI_2),
            GateType::Sdg => Some(-FRAC_PI_2),
            GateType::T => Some(FRAC_PI_4),
            GateType::Tdg => Some(-FRAC_PI_4),
            GateType::Z => Some(std::f64::consts::PI),
            GateType::Phase | GateType::Rz => self.params.first().copied(),
            _ => None,
        }
    }

    /// Inverse gate on the same lines, `None` for measurements and opaque gates.
    pub fn inverse(&self) -> Option<Self> {
        let mut inverse = self.clone();
        match self.gate_type {
            GateType::Measure | GateType::Opaque => return None,
            GateType::S => inverse.gate_type = GateType::Sdg,
            GateType::Sdg => inverse.gate_type = GateType::S,
            GateType::T => inverse.gate_type = GateType::Tdg,
            GateType::Tdg => inverse.gate_type = GateType::T,
            GateType::Phase | GateType::Rz | GateType::Cp => {
                inverse.params.iter_mut().for_each(|p| *p = -*p);
            }
            _ => {}
        }
        Some(inverse)
    }

    /// Same instruction with every qubit index shifted by `offset`.
    #[must_use]
    pub fn shifted(&self, offset: usize, clbit_offset: usize) -> Self {
        Self {
            gate_type: self.gate_type,
            qubits: self.qubits.iter().map(|q| QubitId(q.0 + offset)).collect(),
            clbits: self
                .clbits
                .iter()
                .map(|c| ClbitId(c.0 + clbit_offset))
                .collect(),
            params: self.params.clone(),
            label: self.label.clone(),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if !self.params.is_empty() {
            let params = self
                .params
                .iter()
                .map(|p| format!("{p:.4}"))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "({params})")?;
        }
        let qubits = self
            .qubits
            .iter()
            .map(|q| q.to_string())
            .collect::<Vec<_>>()
            .join("+");
        write!(f, " {qubits}")?;
        if !self.clbits.is_empty() {
            let clbits = self
                .clbits
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("+");
            write!(f, "->{clbits}")?;
        }
        Ok(())
    }
}
