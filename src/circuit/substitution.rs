//! Constant-shape correction gadget for `T`/`T†`.
//!
//! Applying `T` to a masked qubit gives `T Xᵃ Zᵇ |ψ⟩ = Xᵃ Zᵇ (S†)ᵃ T |ψ⟩` up to a
//! global phase, so when `a = 1` the logical state picks up an extra `S†` that an `S`
//! right after the `T` cancels, leaving the mask `(a, a ⊕ b)`. `T†` is symmetric with
//! `S†` as the correction.
//!
//! When `a = 0` no correction is needed, but the same gate is still emitted, aimed at
//! the dummy line, so the emitted circuit does not depend on `a`.

use log::trace;

use crate::{GateType, Instruction, Mask, QubitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonClifford {
    T,
    Tdg,
}

impl NonClifford {
    /// The Clifford correction emitted for this gate.
    pub const fn correction(&self) -> GateType {
        match self {
            NonClifford::T => GateType::S,
            NonClifford::Tdg => GateType::Sdg,
        }
    }
}

/// One gadget invocation: the emitted instruction and the line's mask afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Substitution {
    pub gate: NonClifford,
    pub qubit: QubitId,
    pub instruction: Instruction,
    pub mask: Mask,
}

impl Substitution {
    /// Whether the correction landed on the real line. Client-side knowledge only.
    pub fn corrected(&self) -> bool {
        self.instruction.qubits.first() == Some(&self.qubit)
    }
}

/// Builds the correction for `gate` on `qubit`, currently masked by `mask`.
pub fn substitute(gate: NonClifford, qubit: QubitId, mask: Mask, dummy: QubitId) -> Substitution {
    let (target, mask) = if mask.a {
        (qubit, mask.flip_z())
    } else {
        (dummy, mask)
    };

    trace!("substitute: {gate:?} on {qubit} -> {:?} on {target}", gate.correction());

    Substitution {
        gate,
        qubit,
        instruction: Instruction::new(gate.correction(), vec![target], Vec::new()),
        mask,
    }
}
