use log::debug;

use crate::{ClbitId, KeyError, KeyTable, backend::Counts};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid character {found:?} at position {position} of measured bitstring")]
    InvalidBit { position: usize, found: char },
    #[error("Key lookup failed: {0}")]
    Key(#[from] KeyError),
    #[error("Decrypted bitstring of {len} bits does not fit in an integer")]
    TooWide { len: usize },
    #[error("Register {first}+{width} outside bitstring of {len} bits")]
    RegisterOutOfRange {
        first: ClbitId,
        width: usize,
        len: usize,
    },
}
pub type DecryptError = Error;

/// Removes the X component of the final keys from a measured bitstring.
///
/// The bitstring is in the backend's order: the rightmost character is the first
/// measured line, which sits at `offset` in the key table. Z components have no
/// effect on a computational-basis outcome and are ignored.
pub fn decrypt(keys: &KeyTable, measured: &str, offset: usize) -> Result<String, Error> {
    let len = measured.chars().count();
    let x_bits = keys.x_bits(offset, len)?;

    measured
        .chars()
        .rev()
        .enumerate()
        .map(|(i, c)| {
            let bit = match c {
                '0' => false,
                '1' => true,
                found => {
                    return Err(Error::InvalidBit {
                        position: len - 1 - i,
                        found,
                    });
                }
            };
            Ok(if bit ^ x_bits[i] { '1' } else { '0' })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|bits| bits.into_iter().rev().collect())
}

/// Decrypts every outcome of a count distribution.
///
/// Decryption is a bijection on bitstrings of a fixed length, counts are summed anyway
/// so that mixed-length input cannot lose shots.
pub fn decrypt_counts(keys: &KeyTable, counts: &Counts, offset: usize) -> Result<Counts, Error> {
    let mut decrypted = Counts::new();
    for (measured, count) in counts {
        *decrypted.entry(decrypt(keys, measured, offset)?).or_default() += count;
    }
    debug!(
        "decrypt: outcomes={} shots={}",
        decrypted.len(),
        decrypted.values().sum::<usize>()
    );
    Ok(decrypted)
}

/// Decrypted bitstring read as a little-endian integer (rightmost bit is bit 0).
pub fn decrypt_value(keys: &KeyTable, measured: &str, offset: usize) -> Result<u64, Error> {
    let bits = decrypt(keys, measured, offset)?;
    if bits.len() > u64::BITS as usize {
        return Err(Error::TooWide { len: bits.len() });
    }
    Ok(bits
        .chars()
        .fold(0u64, |acc, c| acc << 1 | (c == '1') as u64))
}

/// Characters of classical bits `first..first + width` in a full outcome bitstring.
pub fn register_bits(measured: &str, first: ClbitId, width: usize) -> Result<&str, Error> {
    let len = measured.len();
    if !measured.is_ascii() || first.0 + width > len {
        return Err(Error::RegisterOutOfRange { first, width, len });
    }
    Ok(&measured[len - first.0 - width..len - first.0])
}

/// Narrows every outcome to one register, summing outcomes that then coincide.
pub fn register_counts(counts: &Counts, first: ClbitId, width: usize) -> Result<Counts, Error> {
    let mut narrowed = Counts::new();
    for (measured, count) in counts {
        *narrowed
            .entry(register_bits(measured, first, width)?.to_string())
            .or_default() += count;
    }
    Ok(narrowed)
}

/// The outcome seen most often, ties broken by the smaller bitstring.
pub fn most_frequent(counts: &Counts) -> Option<&str> {
    counts
        .iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(bits, _)| bits.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mask, QubitId};

    fn keys(masks: &[(u8, u8)]) -> KeyTable {
        KeyTable::from_masks(masks.iter().copied().map(Mask::from))
    }

    #[test]
    fn test_decrypt_uses_x_component() {
        // line 0 has a = 1, line 1 has a = 0
        let table = keys(&[(1, 0), (0, 1)]);
        assert_eq!(decrypt(&table, "00", 0), Ok("01".to_string()));
        assert_eq!(decrypt(&table, "11", 0), Ok("10".to_string()));
    }

    #[test]
    fn test_decrypt_ignores_z_component() {
        let a = keys(&[(1, 0), (0, 0), (1, 1)]);
        let b = keys(&[(1, 1), (0, 1), (1, 0)]);
        for measured in ["000", "101", "111", "010"] {
            assert_eq!(decrypt(&a, measured, 0), decrypt(&b, measured, 0));
        }
    }

    #[test]
    fn test_decrypt_with_offset() {
        let table = keys(&[(0, 0), (0, 0), (1, 0), (0, 0)]);
        assert_eq!(decrypt(&table, "00", 2), Ok("01".to_string()));
        assert_eq!(
            decrypt(&table, "000", 2),
            Err(DecryptError::Key(KeyError::OutOfRange {
                qubit: QubitId(4),
                width: 4
            }))
        );
    }

    #[test]
    fn test_invalid_character() {
        let table = keys(&[(0, 0), (0, 0)]);
        assert_eq!(
            decrypt(&table, "1x", 0),
            Err(DecryptError::InvalidBit {
                position: 1,
                found: 'x'
            })
        );
    }

    #[test]
    fn test_decrypt_counts_and_value() {
        let table = keys(&[(1, 0), (1, 1)]);
        let counts = Counts::from([("00".to_string(), 900), ("01".to_string(), 124)]);
        let decrypted = decrypt_counts(&table, &counts, 0).unwrap();
        assert_eq!(decrypted.get("11"), Some(&900));
        assert_eq!(decrypted.get("10"), Some(&124));
        assert_eq!(most_frequent(&decrypted), Some("11"));
        assert_eq!(decrypt_value(&table, "00", 0), Ok(3));
    }

    #[test]
    fn test_register_bits() {
        // c3 c2 c1 c0
        assert_eq!(register_bits("1001", ClbitId(1), 2), Ok("00"));
        assert_eq!(register_bits("1001", ClbitId(2), 2), Ok("10"));
        assert_eq!(
            register_bits("1001", ClbitId(3), 2),
            Err(DecryptError::RegisterOutOfRange {
                first: ClbitId(3),
                width: 2,
                len: 4
            })
        );

        let counts = Counts::from([("011".to_string(), 3), ("111".to_string(), 2)]);
        let narrowed = register_counts(&counts, ClbitId(0), 2).unwrap();
        assert_eq!(narrowed, Counts::from([("11".to_string(), 5)]));
    }

    #[test]
    fn test_empty_bitstring() {
        let table = keys(&[]);
        assert_eq!(decrypt(&table, "", 0), Ok(String::new()));
        assert_eq!(decrypt_value(&table, "", 0), Ok(0));
        assert_eq!(most_frequent(&Counts::new()), None);
    }
}
