use bitvec::vec::BitVec;
use log::debug;
use num_complex::Complex64;
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Counts, Error, ExecutionBackend};
use crate::{ClbitId, GateType, Instruction, QubitId, Unitary, circuit::Circuit};

/// Widest circuit the dense simulator accepts.
pub const MAX_QUBITS: usize = 20;

/// Dense state-vector simulator with terminal measurement.
///
/// Qubit `q` is bit `q` of the basis-state index.
#[derive(Clone, Debug)]
pub struct StateVector {
    rng: StdRng,
}

impl StateVector {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Final amplitudes of `circuit`, measurements and barriers skipped.
    pub fn amplitudes(circuit: &Circuit) -> Result<Vec<Complex64>, Error> {
        Ok(Self::evolve(circuit)?.0)
    }

    fn evolve(circuit: &Circuit) -> Result<(Vec<Complex64>, Vec<(QubitId, ClbitId)>), Error> {
        if circuit.num_qubits > MAX_QUBITS {
            return Err(Error::TooManyQubits {
                num_qubits: circuit.num_qubits,
                max: MAX_QUBITS,
            });
        }

        let mut state = vec![Complex64::new(0.0, 0.0); 1 << circuit.num_qubits];
        state[0] = Complex64::new(1.0, 0.0);

        let mut measured: BitVec = BitVec::repeat(false, circuit.num_qubits);
        let mut measurements = Vec::new();

        for (index, instruction) in circuit.instructions.iter().enumerate() {
            check(circuit, index, instruction)?;
            if instruction.gate_type == GateType::Barrier {
                continue;
            }
            if let Some(qubit) = instruction.qubits.iter().find(|q| measured[q.0]) {
                return Err(Error::MidCircuitMeasurement {
                    index,
                    qubit: *qubit,
                });
            }

            match instruction.gate_type {
                GateType::Measure => {
                    for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                        measured.set(q.0, true);
                        measurements.push((*q, *c));
                    }
                }
                GateType::Ccx => apply_ccx(&mut state, &instruction.qubits),
                GateType::Opaque => {
                    return Err(Error::Unsupported {
                        index,
                        gate: instruction.gate_type,
                    });
                }
                _ => apply(&mut state, instruction, index)?,
            }
        }

        Ok((state, measurements))
    }

    fn sample(&mut self, state: &[Complex64], shots: usize) -> Vec<usize> {
        let mut cumulative = Vec::with_capacity(state.len());
        let mut total = 0.0;
        for amplitude in state {
            total += amplitude.norm_sqr();
            cumulative.push(total);
        }

        (0..shots)
            .map(|_| {
                let r = self.rng.random::<f64>() * total;
                cumulative
                    .partition_point(|p| *p <= r)
                    .min(state.len() - 1)
            })
            .collect()
    }
}

impl ExecutionBackend for StateVector {
    fn execute(&mut self, circuit: &Circuit, shots: usize) -> Result<Counts, Error> {
        let (state, mut measurements) = Self::evolve(circuit)?;

        let num_clbits = if measurements.is_empty() {
            measurements = circuit.qubits().map(|q| (q, ClbitId(q.0))).collect();
            circuit.num_qubits
        } else {
            circuit.num_clbits
        };

        let mut counts = Counts::new();
        for outcome in self.sample(&state, shots) {
            let mut bits = vec![b'0'; num_clbits];
            for (q, c) in &measurements {
                if outcome >> q.0 & 1 == 1 {
                    bits[num_clbits - 1 - c.0] = b'1';
                }
            }
            *counts
                .entry(String::from_utf8_lossy(&bits).into_owned())
                .or_default() += 1;
        }

        debug!(
            "execute: qubits={} gates={} shots={shots} outcomes={}",
            circuit.num_qubits,
            circuit.len(),
            counts.len()
        );
        Ok(counts)
    }
}

/// Rejects instructions that were pushed without going through `Circuit::add_gate`.
fn check(circuit: &Circuit, index: usize, instruction: &Instruction) -> Result<(), Error> {
    instruction
        .validate()
        .map_err(|err| Error::Instruction { index, err })?;

    if let Some(qubit) = instruction
        .qubits
        .iter()
        .find(|q| q.0 >= circuit.num_qubits)
    {
        return Err(Error::QubitOutOfRange {
            index,
            qubit: *qubit,
            num_qubits: circuit.num_qubits,
        });
    }
    if let Some(clbit) = instruction
        .clbits
        .iter()
        .find(|c| c.0 >= circuit.num_clbits)
    {
        return Err(Error::ClbitOutOfRange {
            index,
            clbit: *clbit,
            num_clbits: circuit.num_clbits,
        });
    }
    Ok(())
}

/// Applies a one- or two-qubit gate. The first listed qubit is the matrix's most
/// significant one.
fn apply(state: &mut [Complex64], instruction: &Instruction, index: usize) -> Result<(), Error> {
    let u = Unitary::of(instruction).map_err(|err| Error::Matrix { index, err })?;
    let qubits = &instruction.qubits;
    let k = qubits.len();
    let mask = qubits.iter().fold(0usize, |m, q| m | 1usize << q.0);

    let local_to_global = |base: usize, local: usize| {
        qubits
            .iter()
            .enumerate()
            .filter(|(j, _)| local >> (k - 1 - j) & 1 == 1)
            .fold(base, |g, (_, q)| g | 1usize << q.0)
    };

    let dim = 1usize << k;
    let mut scratch = vec![Complex64::new(0.0, 0.0); dim];
    for base in (0..state.len()).filter(|i| i & mask == 0) {
        for (local, slot) in scratch.iter_mut().enumerate() {
            *slot = state[local_to_global(base, local)];
        }
        for row in 0..dim {
            state[local_to_global(base, row)] =
                (0..dim).map(|col| u.at(row, col) * scratch[col]).sum();
        }
    }
    Ok(())
}

fn apply_ccx(state: &mut [Complex64], qubits: &[QubitId]) {
    let controls = 1usize << qubits[0].0 | 1usize << qubits[1].0;
    let target = 1usize << qubits[2].0;
    for i in 0..state.len() {
        if i & controls == controls && i & target == 0 {
            state.swap(i, i | target);
        }
    }
}
