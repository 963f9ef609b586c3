//! Numeric conjugation tables `U P U†` for one- and two-qubit unitaries.
//!
//! A gate is Clifford exactly when every Pauli generator is mapped to a Pauli string
//! times a phase in `{±1, ±i}`. The images of the generators then fix a symplectic
//! update rule for [`Mask`]s, which is how the hand-written rules in [`Mask`] are
//! cross-checked.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex64;

use crate::{GateType, Instruction, InstructionError, Mask};

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Unsupported matrix dimension {0}, expected 2 or 4")]
    UnsupportedDimension(usize),
    #[error("Matrix of {len} entries is not square")]
    NotSquare { len: usize },
    #[error("No fixed unitary for gate {0:?}")]
    NoUnitary(GateType),
    #[error(transparent)]
    Instruction(#[from] InstructionError),
}
pub type ConjugationError = Error;

/// Dense row-major square matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Unitary {
    dim: usize,
    data: Vec<Complex64>,
}

impl Unitary {
    pub fn new(data: Vec<Complex64>) -> Result<Self, Error> {
        let dim = (data.len() as f64).sqrt().round() as usize;
        if dim * dim != data.len() {
            return Err(Error::NotSquare { len: data.len() });
        }
        Ok(Self { dim, data })
    }

    fn from_real(data: &[f64]) -> Self {
        let dim = (data.len() as f64).sqrt().round() as usize;
        Self {
            dim,
            data: data.iter().map(|x| Complex64::new(*x, 0.0)).collect(),
        }
    }

    fn diag(entries: &[Complex64]) -> Self {
        let dim = entries.len();
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for (i, e) in entries.iter().enumerate() {
            data[i * dim + i] = *e;
        }
        Self { dim, data }
    }

    pub fn identity(dim: usize) -> Self {
        Self::diag(&vec![Complex64::new(1.0, 0.0); dim])
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn at(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim + col]
    }

    pub fn mul(&self, rhs: &Unitary) -> Unitary {
        let n = self.dim;
        let mut data = vec![Complex64::new(0.0, 0.0); n * n];
        for i in 0..n {
            for k in 0..n {
                let lhs = self.at(i, k);
                for j in 0..n {
                    data[i * n + j] += lhs * rhs.at(k, j);
                }
            }
        }
        Unitary { dim: n, data }
    }

    pub fn dagger(&self) -> Unitary {
        let n = self.dim;
        let mut data = vec![Complex64::new(0.0, 0.0); n * n];
        for i in 0..n {
            for j in 0..n {
                data[j * n + i] = self.at(i, j).conj();
            }
        }
        Unitary { dim: n, data }
    }

    /// `self ⊗ rhs`, `self` acting on the most significant qubit.
    pub fn kron(&self, rhs: &Unitary) -> Unitary {
        let (n, m) = (self.dim, rhs.dim);
        let dim = n * m;
        let mut data = vec![Complex64::new(0.0, 0.0); dim * dim];
        for i in 0..n {
            for j in 0..n {
                for k in 0..m {
                    for l in 0..m {
                        data[(i * m + k) * dim + (j * m + l)] = self.at(i, j) * rhs.at(k, l);
                    }
                }
            }
        }
        Unitary { dim, data }
    }

    fn scaled(&self, c: Complex64) -> Unitary {
        Unitary {
            dim: self.dim,
            data: self.data.iter().map(|x| x * c).collect(),
        }
    }

    fn approx_eq(&self, other: &Unitary) -> bool {
        self.dim == other.dim
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).norm() < EPS)
    }

    /// `Tr(self† · other)`
    fn inner(&self, other: &Unitary) -> Complex64 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    pub fn is_unitary(&self) -> bool {
        self.mul(&self.dagger()).approx_eq(&Unitary::identity(self.dim))
    }

    /// Fixed unitary of a gate kind, control on the most significant qubit.
    pub fn of(instruction: &Instruction) -> Result<Unitary, Error> {
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let phase = |theta: f64| Complex64::from_polar(1.0, theta);

        Ok(match instruction.gate_type {
            GateType::Id => Self::identity(2),
            GateType::X => Self::from_real(&[0.0, 1.0, 1.0, 0.0]),
            GateType::Y => Self::new(vec![0.0 * one, -i, i, 0.0 * one])?,
            GateType::Z => Self::from_real(&[1.0, 0.0, 0.0, -1.0]),
            GateType::H => Self::from_real(&[
                FRAC_1_SQRT_2,
                FRAC_1_SQRT_2,
                FRAC_1_SQRT_2,
                -FRAC_1_SQRT_2,
            ]),
            GateType::S | GateType::Sdg | GateType::T | GateType::Tdg | GateType::Phase => {
                let theta = instruction.phase_angle().ok_or(Error::NoUnitary(GateType::Phase))?;
                Self::diag(&[one, phase(theta)])
            }
            GateType::Rz => {
                let theta = instruction.angle()?;
                Self::diag(&[phase(-theta / 2.0), phase(theta / 2.0)])
            }
            GateType::Cx => Self::from_real(&[
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, //
                0.0, 0.0, 1.0, 0.0,
            ]),
            GateType::Cz => Self::diag(&[one, one, one, -one]),
            GateType::Cp => Self::diag(&[one, one, one, phase(instruction.angle()?)]),
            GateType::Swap => Self::from_real(&[
                1.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ]),
            other @ (GateType::Ccx | GateType::Measure | GateType::Barrier | GateType::Opaque) => {
                return Err(Error::NoUnitary(other));
            }
        })
    }
}

/// Single-qubit Pauli as `(x, z)` bits: `I=(0,0)`, `X=(1,0)`, `Z=(0,1)`, `Y=(1,1)`.
fn pauli(x: bool, z: bool) -> Unitary {
    let i = Complex64::new(0.0, 1.0);
    let zero = Complex64::new(0.0, 0.0);
    match (x, z) {
        (false, false) => Unitary::identity(2),
        (true, false) => Unitary::from_real(&[0.0, 1.0, 1.0, 0.0]),
        (false, true) => Unitary::from_real(&[1.0, 0.0, 0.0, -1.0]),
        (true, true) => Unitary {
            dim: 2,
            data: vec![zero, -i, i, zero],
        },
    }
}

/// Pauli string on `n` qubits, index 0 the most significant.
fn pauli_string(masks: &[Mask]) -> Unitary {
    masks
        .iter()
        .skip(1)
        .fold(pauli(masks[0].a, masks[0].b), |acc, m| acc.kron(&pauli(m.a, m.b)))
}

fn all_pauli_strings(n: usize) -> Vec<Vec<Mask>> {
    (0..(1usize << (2 * n)))
        .map(|bits| {
            (0..n)
                .map(|q| Mask::new(bits >> (2 * q) & 1 == 1, bits >> (2 * q + 1) & 1 == 1))
                .collect()
        })
        .collect()
}

/// `c · P` decomposition of a matrix, if it is a Pauli string up to a unit phase.
fn as_pauli(matrix: &Unitary, n: usize) -> Option<(Complex64, Vec<Mask>)> {
    let dim = matrix.dim as f64;
    all_pauli_strings(n).into_iter().find_map(|masks| {
        let p = pauli_string(&masks);
        let c = p.inner(matrix) / dim;
        ((c.norm() - 1.0).abs() < EPS && p.scaled(c).approx_eq(matrix)).then_some((c, masks))
    })
}

/// Image of one Pauli generator under conjugation.
#[derive(Clone, Debug, PartialEq)]
pub struct PauliImage {
    pub phase: Complex64,
    pub paulis: Vec<Mask>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConjugationTable {
    pub num_qubits: usize,
    /// `U X_q U†` per qubit, `None` when not a Pauli string
    pub x_images: Vec<Option<PauliImage>>,
    /// `U Z_q U†` per qubit
    pub z_images: Vec<Option<PauliImage>>,
}

impl ConjugationTable {
    pub fn is_clifford(&self) -> bool {
        self.x_images
            .iter()
            .chain(self.z_images.iter())
            .all(Option::is_some)
    }

    /// Symplectic mask update `X^a Z^b ↦ U X^a Z^b U†`, global phase dropped.
    ///
    /// Returns `None` for non-Clifford unitaries or a mismatched number of masks.
    pub fn apply(&self, masks: &[Mask]) -> Option<Vec<Mask>> {
        if masks.len() != self.num_qubits || !self.is_clifford() {
            return None;
        }

        let mut out = vec![Mask::IDENTITY; self.num_qubits];
        for (q, mask) in masks.iter().enumerate() {
            let images = [(mask.a, &self.x_images[q]), (mask.b, &self.z_images[q])];
            for (_, image) in images.into_iter().filter(|(bit, _)| *bit) {
                let image = image.as_ref()?;
                for (o, p) in out.iter_mut().zip(image.paulis.iter()) {
                    *o = *o ^ *p;
                }
            }
        }
        Some(out)
    }
}

pub fn conjugation_table(u: &Unitary) -> Result<ConjugationTable, Error> {
    let n = match u.dim {
        2 => 1,
        4 => 2,
        other => return Err(Error::UnsupportedDimension(other)),
    };

    let u_dg = u.dagger();
    let image = |generator: Mask, q: usize| {
        let mut masks = vec![Mask::IDENTITY; n];
        masks[q] = generator;
        let conjugated = u.mul(&pauli_string(&masks)).mul(&u_dg);
        as_pauli(&conjugated, n).map(|(phase, paulis)| PauliImage { phase, paulis })
    };

    Ok(ConjugationTable {
        num_qubits: n,
        x_images: (0..n).map(|q| image(Mask::new(true, false), q)).collect(),
        z_images: (0..n).map(|q| image(Mask::new(false, true), q)).collect(),
    })
}
