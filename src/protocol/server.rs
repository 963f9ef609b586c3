use crate::circuit::{Circuit, NormalizeError, Normalizer, is_normalized};

/// Owner of the public circuit. It sees ciphertext preparations and the corrected
/// circuit, never a key.
#[derive(Clone, Debug, PartialEq)]
pub struct Server {
    pub circuit: Circuit,
}

impl Server {
    pub fn new(circuit: Circuit) -> Self {
        Self { circuit }
    }

    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits
    }

    /// Rewrites the circuit in place with `normalizer`.
    pub fn normalize(&mut self, normalizer: &impl Normalizer) -> Result<(), NormalizeError> {
        self.circuit = normalizer.normalize(&self.circuit)?;
        Ok(())
    }

    pub fn is_normalized(&self) -> bool {
        is_normalized(&self.circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{circuit::StandardBasis, protocol::library};

    #[test]
    fn test_normalize_in_place() {
        let mut server = Server::new(library::toffoli().unwrap());
        assert!(!server.is_normalized());
        server.normalize(&StandardBasis).unwrap();
        assert!(server.is_normalized());
        assert_eq!(server.num_qubits(), 3);
        assert_eq!(server.circuit.len(), 15);
    }
}
