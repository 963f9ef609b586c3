use std::ops::Range;

use log::debug;

use super::{encryption::Ciphertext, errors::CircuitError, structure::Circuit};
use crate::{ClbitId, KeyError, KeyTable, QubitId};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Ciphertexts at offsets {first} and {second} overlap")]
    Overlap { first: usize, second: usize },
    #[error("Ciphertext keys span {found} lines, expected {expected}")]
    KeyWidthMismatch { expected: usize, found: usize },
    #[error("Key merge failed: {0}")]
    Key(#[from] KeyError),
    #[error("Circuit error: {0}")]
    Circuit(#[from] CircuitError),
}
pub type CompositionError = Error;

/// A contiguous block of lines holding one logical value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register {
    pub offset: usize,
    pub width: usize,
}

impl Register {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.width
    }

    pub fn qubits(&self) -> impl Iterator<Item = QubitId> {
        self.range().map(QubitId)
    }
}

impl From<&Ciphertext> for Register {
    fn from(ciphertext: &Ciphertext) -> Self {
        Self {
            offset: ciphertext.offset,
            width: ciphertext.width(),
        }
    }
}

/// Ciphertext preparations followed by the server circuit, one spare line on top.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    pub circuit: Circuit,
    /// Merged key table over every line except the dummy
    pub keys: KeyTable,
    pub dummy: QubitId,
    /// One register per ciphertext, in input order
    pub registers: Vec<Register>,
}

impl Composition {
    /// Appends measurements of `register` into fresh classical bits and returns the
    /// first of them. Bit `first + i` holds line `register.offset + i`.
    pub fn measure_register(&mut self, register: Register) -> Result<ClbitId, CircuitError> {
        self.circuit.measure(register.qubits())
    }

    /// Width of the logical part of the register, the dummy excluded.
    pub fn data_width(&self) -> usize {
        self.dummy.0
    }
}

/// Places each ciphertext at its offset, appends `server` over the whole register and
/// reserves the line after it as the dummy.
///
/// Every ciphertext must carry keys for the same register width; each one contributes only
/// its own range to the merged table. Lines no ciphertext owns start with the zero mask.
pub fn compose(ciphertexts: &[Ciphertext], server: &Circuit) -> Result<Composition, Error> {
    let registers = ciphertexts.iter().map(Register::from).collect::<Vec<_>>();

    let mut sorted = registers.clone();
    sorted.sort_by_key(|r| r.offset);
    if let Some(pair) = sorted
        .windows(2)
        .find(|pair| pair[0].offset + pair[0].width > pair[1].offset)
    {
        return Err(Error::Overlap {
            first: pair[0].offset,
            second: pair[1].offset,
        });
    }

    let covered = registers
        .iter()
        .map(|r| r.offset + r.width)
        .max()
        .unwrap_or(0);
    let data_width = server.num_qubits.max(covered);

    if let Some(first) = ciphertexts.first() {
        let expected = first.keys.width();
        if let Some(other) = ciphertexts.iter().find(|c| c.keys.width() != expected) {
            return Err(Error::KeyWidthMismatch {
                expected,
                found: other.keys.width(),
            });
        }
    }

    let mut keys = KeyTable::new(data_width);
    for ciphertext in ciphertexts {
        keys.merge_range(&ciphertext.keys, ciphertext.range())?;
    }
    keys.fill_unassigned(data_width);

    let dummy = QubitId(data_width);
    let mut circuit = Circuit::with_clbits(data_width + 1, server.num_clbits);
    circuit.name = server.name.clone();
    for ciphertext in ciphertexts {
        circuit.compose(&ciphertext.circuit, ciphertext.offset, 0)?;
    }
    circuit.compose(server, 0, 0)?;

    debug!(
        "compose: ciphertexts={} width={} dummy={dummy} gates={}",
        ciphertexts.len(),
        circuit.num_qubits,
        circuit.len()
    );

    Ok(Composition {
        circuit,
        keys,
        dummy,
        registers,
    })
}
