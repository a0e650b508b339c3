//! Plaintext equivalence proofs (PEPs) for [ElGamal]-encrypted ballots, in the style
//! of [ElectionGuard].
//!
//! # ⚠ Warnings
//!
//! While the logic in this crate relies on standard cryptographic assumptions
//! (complexity of discrete log and computational / decisional Diffie–Hellman problems
//! in certain groups), it has not been independently verified for correctness or absence
//! of side-channel attack vectors. **Use at your own risk.**
//!
//! # Overview
//!
//! - [`pep`] module contains the protocol itself: the [`PepCoordinator`](pep::PepCoordinator)
//!   that drives blinding trustees and a threshold decryptor, and the
//!   [`PepVerifier`](pep::PepVerifier) that checks produced [`BallotPep`](pep::BallotPep)s.
//! - [`Ciphertext`] provides ElGamal encryption with [`PublicKey`], [`SecretKey`]
//!   and [`Keypair`] representing keys. Ciphertexts are additively homomorphic,
//!   which is what the ratio of two ballots relies upon.
//! - [`ElectionContext`] binds all proofs to the extended base hash of an election
//!   and the guardians' joint public key.
//! - [`sharing`] module provides a [Feldman][feldman-vss]-style threshold scheme for guardians,
//!   including verifiable decryption shares.
//! - [`BlindingProof`] and [`LogEqualityProof`] are the zero-knowledge proofs
//!   the protocol outputs consist of.
//!
//! # Backends
//!
//! [`group`] module exposes a generic framework for plugging a [`Group`]
//! implementation into crypto primitives. It provides [`Ristretto`] and [`Curve25519Subgroup`]
//! implementations based on [`curve25519-dalek`].
//!
//! # Crate features
//!
//! ## `serde`
//!
//! *(on by default)*
//!
//! Enables [`Serialize`](::serde::Serialize) / [`Deserialize`](::serde::Deserialize)
//! implementations for protocol messages, outputs and configuration.
//! Group scalars, elements and wrapper key types are serialized to human-readable formats
//! (JSON, YAML, TOML, etc.) as strings that represent corresponding byte buffers using
//! base64-url encoding without padding. For binary formats, byte buffers are serialized directly.
//!
//! Deserialized protocol outputs are not checked on deserialization; use
//! [`PepVerifier`](pep::PepVerifier) to check them.
//!
//! # Async runtime
//!
//! [`PepCoordinator`](pep::PepCoordinator) uses [`tokio`] timers to bound calls
//! to blinding trustees; it must be polled within a Tokio runtime with the time driver enabled.
//!
//! [ElGamal]: https://en.wikipedia.org/wiki/ElGamal_encryption
//! [ElectionGuard]: https://www.electionguard.vote/
//! [feldman-vss]: https://www.cs.umd.edu/~gasarch/TOPICS/secretsharing/feldmanVSS.pdf
//! [`Group`]: group::Group
//! [`Ristretto`]: group::Ristretto
//! [`Curve25519Subgroup`]: group::Curve25519Subgroup
//! [`curve25519-dalek`]: https://docs.rs/curve25519-dalek/
//! [`tokio`]: https://docs.rs/tokio/

// Documentation settings.
#![cfg_attr(docsrs, feature(doc_cfg))]
// Linter settings.
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

mod context;
mod decryption;
mod encryption;
pub mod group;
mod keys;
pub mod pep;
mod proofs;
#[cfg(feature = "serde")]
mod serde;
pub mod sharing;

pub use crate::{
    context::ElectionContext,
    decryption::{CandidateDecryption, VerifiableDecryption},
    encryption::Ciphertext,
    keys::{Keypair, PublicKey, PublicKeyConversionError, SecretKey},
    proofs::{BlindingProof, LogEqualityProof, VerificationError},
};
