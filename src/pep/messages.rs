//! Messages exchanged between the coordinator and blinding trustees.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::fmt;

#[cfg(feature = "serde")]
use crate::serde::ScalarHelper;
use crate::{group::Group, Ciphertext, SecretKey};

/// Coordinator-issued handle identifying a single protocol run. Trustees key
/// retained nonces by this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunId {
    instance: [u8; 16],
    sequence: u64,
}

impl RunId {
    /// Creates a run id from the coordinator instance id and a sequence number.
    pub const fn new(instance: [u8; 16], sequence: u64) -> Self {
        Self { instance, sequence }
    }

    /// Returns the id of the coordinator instance that issued this run.
    pub fn instance(&self) -> &[u8; 16] {
        &self.instance
    }

    /// Returns the sequence number of the run within the coordinator instance.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.instance[..4] {
            write!(formatter, "{byte:02x}")?;
        }
        write!(formatter, "/{}", self.sequence)
    }
}

/// Request to blind ratio ciphertexts (round 1).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct BlindRequest<G: Group> {
    /// Run id.
    pub run: RunId,
    /// Ratio ciphertexts `(α, β)`, one per selection.
    pub ciphertexts: Vec<Ciphertext<G>>,
}

/// Secret nonces `(ξ, u)` of a trustee for a single selection, or a marker that
/// the trustee retains them.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "", rename_all = "snake_case"))]
pub enum TrusteeNonces<G: Group> {
    /// The trustee keeps its nonces, keyed by the [`RunId`] and the selection position.
    Retained,
    /// Nonces are round-tripped through the coordinator. Only appropriate if the coordinator
    /// and the trustee are in the same trust domain.
    Echoed {
        /// Blinding exponent `ξ`.
        eps: SecretKey<G>,
        /// Commitment nonce `u`.
        u: SecretKey<G>,
    },
}

/// Blinding contribution of a single trustee for a single selection.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct BlindResponse<G: Group> {
    /// Blinded ratio `(A_j, B_j) = ([ξ]α, [ξ]β)`.
    pub blinded: Ciphertext<G>,
    /// Commitments `(a_j, b_j) = ([u]α, [u]β)`.
    pub commitments: Ciphertext<G>,
    /// Nonces, or a retention marker.
    pub nonces: TrusteeNonces<G>,
}

/// Challenge for a single selection sent to a trustee (round 2).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct BlindChallenge<G: Group> {
    /// Challenge `c`.
    #[cfg_attr(feature = "serde", serde(with = "ScalarHelper::<G>"))]
    pub challenge: G::Scalar,
    /// Nonces echoed verbatim from the trustee's [`BlindResponse`].
    pub nonces: TrusteeNonces<G>,
}

/// Request to answer challenges (round 2).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct ChallengeRequest<G: Group> {
    /// Run id; must match the id of the preceding [`BlindRequest`].
    pub run: RunId,
    /// Challenges, one per selection in the order of the [`BlindRequest`].
    pub challenges: Vec<BlindChallenge<G>>,
}

/// Trustee response to a challenge: `v_j = u − c·ξ`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct BlindChallengeResponse<G: Group> {
    /// Response scalar.
    #[cfg_attr(feature = "serde", serde(with = "ScalarHelper::<G>"))]
    pub response: G::Scalar,
}
