use log::{debug, info, warn};
use rand::Rng;

use super::{client::Client, server::Server};
use crate::{
    backend::{BackendError, Counts, ExecutionBackend},
    circuit::{
        CircuitError, CompositionError, DecryptError, EncryptError, KeyUpdateError, Register,
        commitment::{Commit, shape_commit},
        compose,
        decryption::{most_frequent, register_counts},
    },
};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("Encryption failed: {0}")]
    Encrypt(#[from] EncryptError),
    #[error("Composition failed: {0}")]
    Composition(#[from] CompositionError),
    #[error("Key update failed: {0}")]
    KeyUpdate(#[from] KeyUpdateError),
    #[error("Circuit error: {0}")]
    Circuit(#[from] CircuitError),
    #[error("Backend failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Decryption failed: {0}")]
    Decrypt(#[from] DecryptError),
    #[error("Output register {index} out of {count} inputs")]
    NoSuchRegister { index: usize, count: usize },
}
pub type SessionError = Error;

#[derive(Clone, Debug, PartialEq)]
pub struct SessionReport {
    /// Raw outcomes of the output register as returned by the backend
    pub counts: Counts,
    /// Outcomes after removing the final X masks
    pub decrypted: Counts,
    pub output: Register,
    /// Most frequent decrypted outcome as an integer
    pub value: Option<u64>,
    /// Number of `S`/`S†` corrections inserted
    pub substitutions: usize,
    /// Indices of instructions the walker had no rule for
    pub unverified: Vec<usize>,
    /// Shape commitment of the circuit handed to the backend
    pub shape: Commit,
}

impl SessionReport {
    pub fn is_exact(&self) -> bool {
        self.unverified.is_empty()
    }
}

/// One encrypted evaluation of a server circuit.
///
/// Inputs are encrypted into consecutive registers starting at line 0, composed with
/// the server circuit, walked, executed and the chosen register decrypted.
pub struct Session<'a> {
    pub client: &'a mut Client,
    pub server: &'a Server,
}

impl<'a> Session<'a> {
    pub fn new(client: &'a mut Client, server: &'a Server) -> Self {
        Self { client, server }
    }

    pub fn run(
        &mut self,
        inputs: &[u64],
        output: usize,
        backend: &mut impl ExecutionBackend,
        rng: &mut impl Rng,
    ) -> Result<SessionReport, Error> {
        if output >= inputs.len() {
            return Err(Error::NoSuchRegister {
                index: output,
                count: inputs.len(),
            });
        }

        let widths = inputs
            .iter()
            .map(|value| self.client.register_width(*value))
            .collect::<Vec<_>>();
        let span = self.server.num_qubits().max(widths.iter().sum());

        let mut ciphertexts = Vec::with_capacity(inputs.len());
        let mut offset = 0;
        for (value, width) in inputs.iter().zip(widths) {
            ciphertexts.push(self.client.encrypt_over(*value, span, offset, rng)?);
            offset += width;
        }

        let composition = compose(&ciphertexts, &self.server.circuit)?;
        self.client.adopt(&composition);

        let update = self
            .client
            .update_keys(&composition.circuit, composition.dummy)?;
        if !update.is_exact() {
            warn!(
                "session: {} unverified gate(s), decrypted output may be wrong",
                update.unverified.len()
            );
        }

        let mut circuit = update.circuit;
        let register = composition.registers[output];
        let first = circuit.measure(register.qubits())?;
        let shape = shape_commit(&circuit);

        info!(
            "session: executing {} gates on {} qubits, {} shots",
            circuit.len(),
            circuit.num_qubits,
            self.client.config.shots
        );
        let raw = backend.execute(&circuit, self.client.config.shots)?;
        let counts = register_counts(&raw, first, register.width)?;
        let decrypted = self.client.decrypt_counts(&counts, register.offset)?;

        let value = most_frequent(&decrypted)
            .map(|bits| u64::from_str_radix(bits, 2))
            .transpose()
            .map_err(|_| DecryptError::TooWide {
                len: register.width,
            })?;

        debug!("session: output register {register:?} value={value:?}");

        Ok(SessionReport {
            counts,
            decrypted,
            output: register,
            value,
            substitutions: update.substitutions.len(),
            unverified: update.unverified.iter().map(|u| u.index).collect(),
            shape,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use test_log::test;

    use super::*;
    use crate::{
        Instruction, QubitId,
        backend::StateVector,
        circuit::{Circuit, StandardBasis},
        config::{QotpConfig, Tolerance},
        protocol::library,
    };

    fn trng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::from_seed([0u8; 32])
    }

    fn adder() -> Server {
        let mut server = Server::new(library::two_qubit_adder().unwrap());
        server.normalize(&StandardBasis).unwrap();
        server
    }

    #[test]
    fn test_encrypted_adder() {
        let server = adder();
        let mut rng = trng();
        let mut backend = StateVector::seeded(3);

        for (x, y) in [(1, 2), (3, 3), (0, 1), (2, 2)] {
            let mut client = Client::with_config(QotpConfig::with_shots(64));
            let report = Session::new(&mut client, &server)
                .run(&[x, y], 1, &mut backend, &mut rng)
                .unwrap();

            assert!(report.is_exact());
            assert_eq!(report.value, Some((x + y) % 4), "{x} + {y}");
            assert_eq!(report.decrypted.len(), 1);
            assert_eq!(report.output, Register { offset: 2, width: 2 });
        }
    }

    #[test]
    fn test_one_correction_per_t_gate() {
        let server = adder();
        let t_count = server.circuit.t_count(&Tolerance::default());
        assert!(t_count > 0);

        for seed in 0..4u8 {
            let mut client = Client::with_config(QotpConfig::with_shots(1));
            let mut rng = rand::rngs::StdRng::from_seed([seed; 32]);
            let report = Session::new(&mut client, &server)
                .run(&[0, 0], 1, &mut StateVector::seeded(0), &mut rng)
                .unwrap();
            assert_eq!(report.substitutions, t_count);
        }
    }

    #[test]
    fn test_unnormalized_server_is_reported() {
        let server = Server::new(library::toffoli().unwrap());
        let mut client = Client::with_config(QotpConfig::with_shots(8));
        // two registers of two lines reach past the three-line server
        let report = Session::new(&mut client, &server)
            .run(&[3, 0], 1, &mut StateVector::seeded(0), &mut trng())
            .unwrap();
        assert_eq!(report.output, Register { offset: 2, width: 2 });
        assert_eq!(client.keys().width(), 4);
        assert_eq!(report.unverified.len(), 1);
        assert!(!report.is_exact());
    }

    #[test]
    fn test_missing_output_register() {
        let server = adder();
        let mut client = Client::new();
        let report =
            Session::new(&mut client, &server).run(&[1], 3, &mut StateVector::seeded(0), &mut trng());
        assert_eq!(
            report,
            Err(SessionError::NoSuchRegister { index: 3, count: 1 })
        );
    }
}
