use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::config::Tolerance;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GateType {
    H = 0,
    /// `P(θ) = diag(1, e^{iθ})`, angle in `params[0]`
    Phase = 1,
    S = 2,
    Sdg = 3,
    T = 4,
    Tdg = 5,
    Cx = 6, // control, target
    X = 7,
    Y = 8,
    Z = 9,
    Id = 10,
    Measure = 11,
    Barrier = 12,
    Rz = 13,
    Cz = 14,
    Cp = 15, // control, target, angle in params[0]
    Swap = 16,
    Ccx = 17, // control, control, target
    Opaque = 18,
}

impl GateType {
    pub const ALL: [GateType; 19] = [
        GateType::H,
        GateType::Phase,
        GateType::S,
        GateType::Sdg,
        GateType::T,
        GateType::Tdg,
        GateType::Cx,
        GateType::X,
        GateType::Y,
        GateType::Z,
        GateType::Id,
        GateType::Measure,
        GateType::Barrier,
        GateType::Rz,
        GateType::Cz,
        GateType::Cp,
        GateType::Swap,
        GateType::Ccx,
        GateType::Opaque,
    ];

    /// Number of qubits the gate acts on, `None` for variadic instructions.
    pub const fn arity(&self) -> Option<usize> {
        match self {
            GateType::Cx | GateType::Cz | GateType::Cp | GateType::Swap => Some(2),
            GateType::Ccx => Some(3),
            GateType::Barrier | GateType::Opaque => None,
            _ => Some(1),
        }
    }

    pub const fn param_count(&self) -> usize {
        match self {
            GateType::Phase | GateType::Rz | GateType::Cp => 1,
            _ => 0,
        }
    }

    /// Whether the key-update walker accepts this kind without normalization.
    pub fn is_basis(&self) -> bool {
        !matches!(
            self,
            GateType::Rz
                | GateType::Cz
                | GateType::Cp
                | GateType::Swap
                | GateType::Ccx
                | GateType::Opaque
        )
    }

    pub fn is_pauli(&self) -> bool {
        matches!(self, GateType::X | GateType::Y | GateType::Z | GateType::Id)
    }

    /// Clifford regardless of parameters. `Phase` depends on its angle, see [`PhaseClass`].
    pub fn is_clifford(&self) -> bool {
        matches!(
            self,
            GateType::H
                | GateType::S
                | GateType::Sdg
                | GateType::Cx
                | GateType::Cz
                | GateType::Swap
                | GateType::X
                | GateType::Y
                | GateType::Z
                | GateType::Id
        )
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, GateType::Measure | GateType::Barrier)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            GateType::H => "h",
            GateType::Phase => "p",
            GateType::S => "s",
            GateType::Sdg => "sdg",
            GateType::T => "t",
            GateType::Tdg => "tdg",
            GateType::Cx => "cx",
            GateType::X => "x",
            GateType::Y => "y",
            GateType::Z => "z",
            GateType::Id => "id",
            GateType::Measure => "measure",
            GateType::Barrier => "barrier",
            GateType::Rz => "rz",
            GateType::Cz => "cz",
            GateType::Cp => "cp",
            GateType::Swap => "swap",
            GateType::Ccx => "ccx",
            GateType::Opaque => "opaque",
        }
    }
}

/// What a single-qubit phase rotation does to a Pauli mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseClass {
    Identity,
    /// `±π/2`
    S,
    Sdg,
    /// `±π/4`
    T,
    Tdg,
    /// `π`, a Pauli Z
    Z,
    Unverified,
}

impl PhaseClass {
    pub fn classify(theta: f64, tolerance: &Tolerance) -> Self {
        if !theta.is_finite() {
            return PhaseClass::Unverified;
        }

        [
            (0.0, PhaseClass::Identity),
            (FRAC_PI_2, PhaseClass::S),
            (-FRAC_PI_2, PhaseClass::Sdg),
            (FRAC_PI_4, PhaseClass::T),
            (-FRAC_PI_4, PhaseClass::Tdg),
            (PI, PhaseClass::Z),
        ]
        .into_iter()
        .find(|(target, _)| tolerance.is_close_angle(theta, *target))
        .map(|(_, class)| class)
        .unwrap_or(PhaseClass::Unverified)
    }

    pub fn is_clifford(&self) -> bool {
        matches!(
            self,
            PhaseClass::Identity | PhaseClass::S | PhaseClass::Sdg | PhaseClass::Z
        )
    }
}

/// Per-kind instruction counter, indexed by the `GateType` discriminant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GateCount(pub [u64; 19]);

impl GateCount {
    pub fn handle(&mut self, gate_type: GateType) {
        self.0[gate_type as usize] += 1;
    }

    pub fn get(&self, gate_type: GateType) -> u64 {
        self.0[gate_type as usize]
    }

    pub fn total_gate_count(&self) -> u64 {
        GateType::ALL
            .iter()
            .filter(|t| !t.is_directive())
            .map(|t| self.get(*t))
            .sum()
    }

    /// Named `T`/`T†` only; `Phase(±π/4)` needs its angle to be recognised.
    pub fn t_count(&self) -> u64 {
        self.get(GateType::T) + self.get(GateType::Tdg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GateType, u64)> + '_ {
        GateType::ALL
            .iter()
            .map(|t| (*t, self.get(*t)))
            .filter(|(_, count)| *count > 0)
    }
}
