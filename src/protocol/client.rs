use log::debug;
use rand::Rng;

use super::server::Server;
use crate::{
    KeyTable, QubitId,
    backend::Counts,
    circuit::{
        Ciphertext, Circuit, Composition, DecryptError, EncryptError, KeyUpdate, KeyUpdateError,
        KeyUpdater, decryption, encryption,
    },
    config::QotpConfig,
};

/// Holder of the secret key table. Nothing here is ever sent to the server.
#[derive(Clone, Debug, Default)]
pub struct Client {
    keys: KeyTable,
    pub config: QotpConfig,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QotpConfig) -> Self {
        Self {
            keys: KeyTable::default(),
            config,
        }
    }

    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    /// Lines a ciphertext of `value` occupies under this configuration.
    pub fn register_width(&self, value: u64) -> usize {
        self.config
            .min_register_width
            .max(encryption::bit_length(value))
    }

    /// Encrypts `value` against `server`'s register, at `offset`.
    pub fn encrypt(
        &self,
        value: u64,
        server: &Server,
        offset: usize,
        rng: &mut impl Rng,
    ) -> Result<Ciphertext, EncryptError> {
        self.encrypt_over(value, server.num_qubits(), offset, rng)
    }

    /// Encrypts `value` at `offset` with keys drawn over `span` lines. Ciphertexts meant
    /// to be composed together share one `span`.
    pub fn encrypt_over(
        &self,
        value: u64,
        span: usize,
        offset: usize,
        rng: &mut impl Rng,
    ) -> Result<Ciphertext, EncryptError> {
        encryption::encrypt_with_width(value, self.register_width(value), span, offset, rng)
    }

    /// Takes over the merged keys of a composition, dropping any previous table.
    pub fn adopt(&mut self, composition: &Composition) {
        debug!("adopt: width={}", composition.keys.width());
        self.keys = composition.keys.clone();
    }

    pub fn update_keys(
        &mut self,
        circuit: &Circuit,
        dummy: QubitId,
    ) -> Result<KeyUpdate, KeyUpdateError> {
        KeyUpdater::new(dummy)
            .with_tolerance(self.config.tolerance)
            .run(&mut self.keys, circuit)
    }

    pub fn decrypt(&self, measured: &str, offset: usize) -> Result<String, DecryptError> {
        decryption::decrypt(&self.keys, measured, offset)
    }

    pub fn decrypt_counts(&self, counts: &Counts, offset: usize) -> Result<Counts, DecryptError> {
        decryption::decrypt_counts(&self.keys, counts, offset)
    }
}
