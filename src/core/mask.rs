use std::{fmt, ops::BitXor};

use rand::Rng;

/// A single-qubit Pauli one-time-pad key.
///
/// The physical qubit holds `X^a Z^b |ψ⟩`: `a` is the X (bit-flip) component and
/// `b` the Z (phase-flip) component. Only `a` is visible to a computational
/// basis measurement.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Mask {
    pub a: bool,
    pub b: bool,
}

impl Mask {
    pub const IDENTITY: Mask = Mask { a: false, b: false };

    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    pub fn from_bits(a: u8, b: u8) -> Self {
        Self {
            a: a & 1 == 1,
            b: b & 1 == 1,
        }
    }

    /// Draws both components independently and uniformly.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            a: rng.random(),
            b: rng.random(),
        }
    }

    pub fn is_identity(&self) -> bool {
        !self.a && !self.b
    }

    /// `H X H = Z`, `H Z H = X`.
    #[must_use]
    pub const fn conjugate_h(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }

    /// Shared by `S` and `S†`: the sign of the rotation only changes a global phase.
    #[must_use]
    pub const fn conjugate_s(self) -> Self {
        Self {
            a: self.a,
            b: self.a ^ self.b,
        }
    }

    /// Conjugation by `CNOT(control, target)`.
    ///
    /// Both masks are read before either is written: the X component of the control
    /// spreads to the target, the Z component of the target spreads to the control.
    #[must_use]
    pub const fn conjugate_cnot(control: Self, target: Self) -> (Self, Self) {
        (
            Self {
                a: control.a,
                b: control.b ^ target.b,
            },
            Self {
                a: control.a ^ target.a,
                b: target.b,
            },
        )
    }

    #[must_use]
    pub const fn flip_z(self) -> Self {
        Self {
            a: self.a,
            b: !self.b,
        }
    }
}

impl BitXor for Mask {
    type Output = Mask;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Mask {
            a: self.a ^ rhs.a,
            b: self.b ^ rhs.b,
        }
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.a as u8, self.b as u8)
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<(u8, u8)> for Mask {
    fn from((a, b): (u8, u8)) -> Self {
        Self::from_bits(a, b)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    const ALL: [Mask; 4] = [
        Mask::new(false, false),
        Mask::new(false, true),
        Mask::new(true, false),
        Mask::new(true, true),
    ];

    #[test]
    fn test_hadamard_involution() {
        for mask in ALL {
            assert_eq!(mask.conjugate_h().conjugate_h(), mask);
        }
        assert_eq!(Mask::from((1, 0)).conjugate_h(), Mask::from((0, 1)));
    }

    #[test]
    fn test_s_twice_is_identity() {
        for mask in ALL {
            assert_eq!(mask.conjugate_s().conjugate_s(), mask);
        }
        assert_eq!(Mask::from((1, 0)).conjugate_s(), Mask::from((1, 1)));
        assert_eq!(Mask::from((0, 1)).conjugate_s(), Mask::from((0, 1)));
    }

    #[test]
    fn test_cnot_is_self_inverse() {
        for control in ALL {
            for target in ALL {
                let (c1, t1) = Mask::conjugate_cnot(control, target);
                let (c2, t2) = Mask::conjugate_cnot(c1, t1);
                assert_eq!((c2, t2), (control, target), "{control} {target}");
            }
        }
    }

    #[test]
    fn test_cnot_argument_order_matters() {
        let control = Mask::from((1, 0));
        let target = Mask::from((0, 1));
        assert_eq!(
            Mask::conjugate_cnot(control, target),
            (Mask::from((1, 1)), Mask::from((1, 1)))
        );
        assert_eq!(
            Mask::conjugate_cnot(target, control),
            (Mask::from((0, 1)), Mask::from((1, 0)))
        );
    }

    #[test]
    fn test_random_covers_all_masks() {
        let mut rng = rand::rngs::StdRng::from_seed([7u8; 32]);
        let mut seen = [false; 4];
        for _ in 0..64 {
            let mask = Mask::random(&mut rng);
            seen[(mask.a as usize) << 1 | mask.b as usize] = true;
        }
        assert_eq!(seen, [true; 4]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Mask::from((1, 0)).to_string(), "(1,0)");
        assert_eq!(format!("{:?}", Mask::IDENTITY), "(0,0)");
    }
}
