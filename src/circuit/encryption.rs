use std::ops::Range;

use log::debug;
use rand::Rng;

use super::{errors::CircuitError, structure::Circuit};
use crate::{Instruction, KeyError, KeyTable, Mask, QubitId};

/// Smallest register a ciphertext occupies.
pub const MIN_REGISTER_WIDTH: usize = 2;
/// Smallest register produced by [`load_int`].
pub const MIN_PLAINTEXT_WIDTH: usize = 4;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Value {value} needs {bits} qubits, register has {width}")]
    WidthTooSmall { value: u64, bits: usize, width: usize },
    #[error("Register of {width} lines at {offset} exceeds server width {server_width}")]
    RegisterOverflow {
        offset: usize,
        width: usize,
        server_width: usize,
    },
    #[error("Key table error: {0}")]
    Key(#[from] KeyError),
    #[error("Circuit error: {0}")]
    Circuit(#[from] CircuitError),
}
pub type EncryptError = Error;

/// An encrypted basis-state preparation and the keys it was encrypted under.
#[derive(Clone, Debug, PartialEq)]
pub struct Ciphertext {
    /// Prepares `Xᵃ Zᵇ |ψ⟩` on `width` local lines
    pub circuit: Circuit,
    /// Keys over the whole server register; only [`Ciphertext::range`] belongs to this ciphertext
    pub keys: KeyTable,
    /// First server line of this ciphertext
    pub offset: usize,
}

impl Ciphertext {
    pub fn width(&self) -> usize {
        self.circuit.num_qubits
    }

    /// Server lines owned by this ciphertext.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.width()
    }

    pub fn key_fragment(&self) -> impl Iterator<Item = (QubitId, Mask)> + '_ {
        self.keys
            .iter()
            .filter(move |(q, _)| self.range().contains(&q.0))
    }

    pub fn overlaps(&self, other: &Ciphertext) -> bool {
        self.offset < other.offset + other.width() && other.offset < self.offset + self.width()
    }
}

pub fn bit_length(value: u64) -> usize {
    (u64::BITS - value.leading_zeros()) as usize
}

/// Unencrypted preparation of `|value⟩`, little-endian, at least four lines wide.
pub fn load_int(value: u64) -> Result<Circuit, CircuitError> {
    let width = MIN_PLAINTEXT_WIDTH.max(bit_length(value));
    let mut circuit = Circuit::new(width).named(format!("Plain: {value}"));
    prepare(&mut circuit, value)?;
    Ok(circuit)
}

fn prepare(circuit: &mut Circuit, value: u64) -> Result<(), CircuitError> {
    (0..bit_length(value))
        .filter(|i| value >> i & 1 == 1)
        .try_for_each(|i| circuit.add_gate(Instruction::x(QubitId(i))))
}

/// Encrypts `value` into the smallest register that holds it (never below two lines).
pub fn encrypt(
    value: u64,
    server_width: usize,
    offset: usize,
    rng: &mut impl Rng,
) -> Result<Ciphertext, Error> {
    encrypt_with_width(value, 0, server_width, offset, rng)
}

/// Encrypts `value` into `width` lines placed at `offset` of a `server_width` register.
///
/// Keys are drawn for every server line so that ciphertexts encrypted against the same
/// server can be merged by their disjoint ranges. `width == 0` picks the smallest
/// register holding `value`; small values never go below [`MIN_REGISTER_WIDTH`]. A
/// register reaching past the server draws keys up to its last line; composition widens
/// the circuit to match.
pub fn encrypt_with_width(
    value: u64,
    width: usize,
    server_width: usize,
    offset: usize,
    rng: &mut impl Rng,
) -> Result<Ciphertext, Error> {
    let width = register_width(value, width)?;
    let keys = KeyTable::random(server_width.max(offset + width), rng);
    encrypt_with_keys(value, width, keys, offset)
}

fn register_width(value: u64, width: usize) -> Result<usize, Error> {
    let bits = bit_length(value);
    Ok(match width {
        w if w < MIN_REGISTER_WIDTH && bits <= MIN_REGISTER_WIDTH => MIN_REGISTER_WIDTH,
        0 => bits,
        w if w < bits => return Err(Error::WidthTooSmall { value, bits, width: w }),
        w => w,
    })
}

/// Encryption under caller-supplied keys. `keys` must cover the ciphertext's range.
pub fn encrypt_with_keys(
    value: u64,
    width: usize,
    keys: KeyTable,
    offset: usize,
) -> Result<Ciphertext, Error> {
    let width = register_width(value, width)?;

    if offset + width > keys.width() {
        return Err(Error::RegisterOverflow {
            offset,
            width,
            server_width: keys.width(),
        });
    }

    let mut circuit = Circuit::new(width).named(format!("Encrypted: {offset}..{}", offset + width));
    prepare(&mut circuit, value)?;

    for i in 0..width {
        let mask = keys.get(QubitId(offset + i))?;
        if mask.a {
            circuit.add_gate(Instruction::x(QubitId(i)))?;
        }
        if mask.b {
            circuit.add_gate(Instruction::z(QubitId(i)))?;
        }
    }

    debug!(
        "encrypt: width={width} offset={offset} server_width={} gates={}",
        keys.width(),
        circuit.len()
    );

    Ok(Ciphertext {
        circuit,
        keys,
        offset,
    })
}
