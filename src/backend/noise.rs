use log::debug;
use rand::{Rng, rngs::StdRng};

use super::{Counts, Error, ExecutionBackend};
use crate::circuit::Circuit;

/// Wraps a backend and flips every returned bit independently with probability `p`.
#[derive(Clone, Debug)]
pub struct ReadoutNoise<B> {
    inner: B,
    probability: f64,
    rng: StdRng,
}

impl<B: ExecutionBackend> ReadoutNoise<B> {
    pub fn new(inner: B, probability: f64, rng: StdRng) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::InvalidProbability(probability.to_string()));
        }
        Ok(Self {
            inner,
            probability,
            rng,
        })
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    fn flip(&mut self, bits: &str) -> String {
        bits.chars()
            .map(|c| match (c, self.rng.random_bool(self.probability)) {
                ('0', true) => '1',
                ('1', true) => '0',
                (c, _) => c,
            })
            .collect()
    }
}

impl<B: ExecutionBackend> ExecutionBackend for ReadoutNoise<B> {
    fn execute(&mut self, circuit: &Circuit, shots: usize) -> Result<Counts, Error> {
        let clean = self.inner.execute(circuit, shots)?;

        let mut noisy = Counts::new();
        for (bits, count) in &clean {
            for _ in 0..*count {
                *noisy.entry(self.flip(bits)).or_default() += 1;
            }
        }

        debug!(
            "execute: readout noise p={} outcomes {} -> {}",
            self.probability,
            clean.len(),
            noisy.len()
        );
        Ok(noisy)
    }
}
