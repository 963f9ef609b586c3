//! # Quantum One-Time Pad Pipeline
//!
//! This module tracks the Pauli one-time pad that hides a client's qubits while an untrusted
//! server runs its own circuit over them. Each qubit line carries a secret mask `(a, b)` so
//! that the physical state is `Xᵃ Zᵇ |ψ⟩`. The server only ever sees masked states, the
//! client only ever updates the masks.
//!
//! ## Security Level
//! The masks hide the *value* of the encrypted inputs. The server circuit itself is public,
//! and the corrected circuit has a fixed shape: every `T`/`T†` is followed by exactly one
//! `S`/`S†`, aimed at the real line or at the dummy line depending on a secret bit. Gate
//! indices of that correction do leak the bit to anyone who sees them; hiding them needs a
//! teleportation gadget, which this crate does not implement.
//!
//! ## Circuit Flow
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌──────────────┐    ┌─────────────┐    ┌────────────┐
//! │  encrypt()  │───▶│  compose()  │───▶│ update_keys()│───▶│  execute()  │───▶│ decrypt()  │
//! │ (Client)    │    │             │    │   (Walker)   │    │  (Backend)  │    │ (Client)   │
//! └─────────────┘    └─────────────┘    └──────────────┘    └─────────────┘    └────────────┘
//!       │                  │                   │                   │                  │
//!   • Xᵃ Zᵇ prep      • disjoint offsets   • Clifford rules    • bitstring counts  • XOR with a
//!   • random keys     • server circuit     • T/T† gadget       • rightmost = c0    • b ignored
//!                     • dummy line         • unverified list
//! ```
//!
//! The server circuit goes through [`normalize::Normalizer`] first so that the walker only
//! meets gates it has exact update rules for.
//!
//! ## Implementation Details
//!
//! ### Phase 1: Encryption ([`encryption`])
//! - Draw a mask per server line
//! - Prepare the integer in binary, then apply `X` where `a = 1` and `Z` where `b = 1`
//!
//! ### Phase 2: Composition ([`composition`])
//! - Place ciphertexts at non-overlapping offsets and append the server circuit
//! - Merge each ciphertext's own range of keys, zero masks elsewhere
//! - Reserve one extra line as the dummy
//!
//! ### Phase 3: Key Update ([`key_update`], [`substitution`])
//! - Walk the composed circuit once, in gate order
//! - Rewrite masks for `H`, `S`/`S†`, `CX`; leave them for Paulis and directives
//! - Append the `S`/`S†` correction after every `T`/`T†`
//! - Report, never fail on, gates with no known rule
//!
//! ### Phase 4: Decryption ([`decryption`])
//! - XOR each measured bit with the final `a` of its line
//!
//! ### Commitments ([`commitment`])
//! - Blake3 over the full circuit or over its index-free shape

pub mod commitment;
pub mod composition;
pub mod decryption;
pub mod encryption;
pub mod errors;
pub mod key_update;
pub mod normalize;
pub mod structure;
pub mod substitution;

pub use composition::{Composition, CompositionError, Register, compose};
pub use decryption::{DecryptError, decrypt, decrypt_counts, decrypt_value, register_counts};
pub use encryption::{Ciphertext, EncryptError, encrypt, encrypt_with_width, load_int};
pub use errors::CircuitError;
pub use key_update::{KeyUpdate, KeyUpdateError, KeyUpdater, UnverifiedGate, update_keys};
pub use normalize::{NormalizeError, Normalizer, StandardBasis, is_normalized};
pub use structure::Circuit;
pub use substitution::{NonClifford, Substitution};
