use std::ops::Range;

use bitvec::vec::BitVec;
use rand::Rng;

use crate::{Mask, QubitId};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// No mask has been assigned to this line
    #[error("No key for qubit {0}")]
    KeyNotFound(QubitId),
    /// The line already carries a mask
    #[error("Qubit {0} already has a key")]
    AlreadyAssigned(QubitId),
    #[error("Qubit {qubit} outside key table of width {width}")]
    OutOfRange { qubit: QubitId, width: usize },
}
pub type KeyError = Error;

/// Client-side mapping from circuit line to its current Pauli mask.
///
/// Lines are assigned once (at encryption or when fragments are merged) and afterwards
/// only rewritten in place by the key-update walker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyTable {
    masks: Vec<Mask>,
    assigned: BitVec,
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new(0)
    }
}

impl KeyTable {
    /// A table of `width` lines, none assigned yet.
    pub fn new(width: usize) -> Self {
        Self {
            masks: vec![Mask::IDENTITY; width],
            assigned: BitVec::repeat(false, width),
        }
    }

    /// Every line assigned a uniformly random mask.
    pub fn random(width: usize, rng: &mut impl Rng) -> Self {
        Self {
            masks: (0..width).map(|_| Mask::random(rng)).collect(),
            assigned: BitVec::repeat(true, width),
        }
    }

    pub fn from_masks(masks: impl IntoIterator<Item = Mask>) -> Self {
        let masks = masks.into_iter().collect::<Vec<_>>();
        let assigned = BitVec::repeat(true, masks.len());
        Self { masks, assigned }
    }

    pub fn width(&self) -> usize {
        self.masks.len()
    }

    pub fn is_assigned(&self, qubit: QubitId) -> bool {
        self.assigned.get(qubit.0).is_some_and(|bit| *bit)
    }

    pub fn is_complete(&self) -> bool {
        self.assigned.all()
    }

    pub fn get(&self, qubit: QubitId) -> Result<Mask, KeyError> {
        if qubit.0 >= self.width() {
            return Err(KeyError::OutOfRange {
                qubit,
                width: self.width(),
            });
        }
        if !self.assigned[qubit.0] {
            return Err(KeyError::KeyNotFound(qubit));
        }
        Ok(self.masks[qubit.0])
    }

    /// Assigns a mask to a line that has none yet.
    pub fn init(&mut self, qubit: QubitId, mask: Mask) -> Result<(), KeyError> {
        self.ensure_capacity(qubit.0 + 1);

        if self.assigned[qubit.0] {
            return Err(KeyError::AlreadyAssigned(qubit));
        }

        self.masks[qubit.0] = mask;
        self.assigned.set(qubit.0, true);
        Ok(())
    }

    /// Overwrites the mask of an assigned line.
    pub fn set(&mut self, qubit: QubitId, mask: Mask) -> Result<(), KeyError> {
        self.get(qubit)?;
        self.masks[qubit.0] = mask;
        Ok(())
    }

    pub fn update(
        &mut self,
        qubit: QubitId,
        f: impl FnOnce(Mask) -> Mask,
    ) -> Result<Mask, KeyError> {
        let updated = f(self.get(qubit)?);
        self.masks[qubit.0] = updated;
        Ok(updated)
    }

    /// Reads both masks, then writes both.
    pub fn update_pair(
        &mut self,
        first: QubitId,
        second: QubitId,
        f: impl FnOnce(Mask, Mask) -> (Mask, Mask),
    ) -> Result<(Mask, Mask), KeyError> {
        let (m1, m2) = f(self.get(first)?, self.get(second)?);
        self.masks[first.0] = m1;
        self.masks[second.0] = m2;
        Ok((m1, m2))
    }

    /// Copies the masks of `range` from `other` into this table.
    pub fn merge_range(&mut self, other: &KeyTable, range: Range<usize>) -> Result<(), KeyError> {
        for i in range {
            let qubit = QubitId(i);
            self.init(qubit, other.get(qubit)?)?;
        }
        Ok(())
    }

    /// Assigns the zero mask to every unassigned line below `width`.
    pub fn fill_unassigned(&mut self, width: usize) {
        self.ensure_capacity(width);
        for i in 0..width {
            if !self.assigned[i] {
                self.masks[i] = Mask::IDENTITY;
                self.assigned.set(i, true);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (QubitId, Mask)> + '_ {
        self.masks
            .iter()
            .enumerate()
            .filter(|(i, _)| self.assigned[*i])
            .map(|(i, m)| (QubitId(i), *m))
    }

    /// X components of lines `offset..offset + len`, in line order.
    pub fn x_bits(&self, offset: usize, len: usize) -> Result<BitVec, KeyError> {
        (offset..offset + len)
            .map(|i| self.get(QubitId(i)).map(|m| m.a))
            .collect()
    }

    fn ensure_capacity(&mut self, size: usize) {
        if self.masks.len() < size {
            self.masks.resize(size, Mask::IDENTITY);
            self.assigned.resize(size, false);
        }
    }
}
