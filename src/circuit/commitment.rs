use digest::Digest;

use super::structure::Circuit;
use crate::Instruction;

/// Digest bytes of a circuit or of its shape, as produced by the chosen hasher
pub type Commit = Vec<u8>;

/// Commit to a circuit: line counts and every instruction with its indices.
pub fn commit(circuit: &Circuit) -> Commit {
    commit_with::<blake3::Hasher>(circuit)
}

/// Commit to what the server sees of a circuit without its line indices: the gate
/// kinds, arities and parameters in order.
///
/// Two walks of one server circuit under different keys commit to the same shape.
pub fn shape_commit(circuit: &Circuit) -> Commit {
    shape_commit_with::<blake3::Hasher>(circuit)
}

pub fn commit_with<D: Digest>(circuit: &Circuit) -> Commit {
    let mut hasher = D::new();
    hasher.update((circuit.num_qubits as u64).to_le_bytes());
    hasher.update((circuit.num_clbits as u64).to_le_bytes());

    for instruction in &circuit.instructions {
        update_shape(&mut hasher, instruction);
        for q in &instruction.qubits {
            hasher.update((q.0 as u64).to_le_bytes());
        }
        hasher.update((instruction.clbits.len() as u64).to_le_bytes());
        for c in &instruction.clbits {
            hasher.update((c.0 as u64).to_le_bytes());
        }
    }

    hasher.finalize().to_vec()
}

pub fn shape_commit_with<D: Digest>(circuit: &Circuit) -> Commit {
    let mut hasher = D::new();
    circuit
        .instructions
        .iter()
        .for_each(|instruction| update_shape(&mut hasher, instruction));
    hasher.finalize().to_vec()
}

fn update_shape<D: Digest>(hasher: &mut D, instruction: &Instruction) {
    hasher.update([instruction.gate_type as u8]);
    hasher.update((instruction.qubits.len() as u64).to_le_bytes());
    hasher.update((instruction.params.len() as u64).to_le_bytes());
    for p in &instruction.params {
        hasher.update(p.to_bits().to_le_bytes());
    }
    if let Some(label) = &instruction.label {
        hasher.update((label.len() as u64).to_le_bytes());
        hasher.update(label.as_bytes());
    }
}
