pub mod conjugation;
pub mod gate_type;
pub mod instruction;
pub mod keys;
pub mod mask;
