//! Ready-made server circuits.

use std::f64::consts::PI;

use crate::{
    Instruction, QubitId,
    circuit::{Circuit, CircuitError},
};

/// Small Clifford circuit over four lines: `X₀ H₂ CX(0,3) X₃ H₂`.
pub fn random_circuit() -> Result<Circuit, CircuitError> {
    let mut c = Circuit::new(4).named("Server circuit");
    c.extend([
        Instruction::x(QubitId(0)),
        Instruction::h(QubitId(2)),
        Instruction::cx(QubitId(0), QubitId(3)),
        Instruction::x(QubitId(3)),
        Instruction::h(QubitId(2)),
    ])?;
    Ok(c)
}

/// Fourier transform over `n` lines with negative controlled-phase angles.
///
/// `swap` appends the final qubit-order reversal, `inverse` returns the adjoint.
pub fn qft(n: usize, swap: bool, inverse: bool) -> Result<Circuit, CircuitError> {
    let mut c = Circuit::new(n).named("QFT");
    let all = c.qubits().collect::<Vec<_>>();
    for current in 0..n {
        c.add_gate(Instruction::barrier(all.clone()))?;
        c.add_gate(Instruction::h(QubitId(current)))?;
        for other in current + 1..n {
            let theta = -2.0 * PI / 2f64.powi((other - current + 1) as i32);
            c.add_gate(Instruction::cp(theta, QubitId(other), QubitId(current)))?;
        }
    }
    if swap {
        for j in 0..n / 2 {
            c.add_gate(Instruction::swap(QubitId(j), QubitId(n - 1 - j)))?;
        }
    }

    if inverse { c.inverse() } else { Ok(c) }
}

/// Draper adder over two 2-bit registers: lines `0..2` hold `x`, lines `2..4` hold `y`
/// and end up holding `x + y mod 4`.
pub fn two_qubit_adder() -> Result<Circuit, CircuitError> {
    const N: usize = 4;
    let mut c = Circuit::new(N).named("Two qubit adder");

    c.compose(&qft(2, false, true)?, 2, 0)?;
    for i in 0..N {
        for j in i + 2..N {
            let theta = 2f64.powi(i as i32) * PI / 2f64.powi(j as i32 - (N / 2) as i32);
            c.add_gate(Instruction::cp(theta, QubitId(i), QubitId(j)))?;
        }
    }
    c.compose(&qft(2, false, false)?, 2, 0)?;

    Ok(c)
}

/// In-place Toffoli on three lines.
pub fn toffoli() -> Result<Circuit, CircuitError> {
    let mut c = Circuit::new(3).named("Toffoli");
    c.add_gate(Instruction::ccx(QubitId(0), QubitId(1), QubitId(2)))?;
    Ok(c)
}
