//! Plaintext equivalence proofs (PEPs) for encrypted ballots.
//!
//! A PEP shows that two ElGamal-encrypted ballots contain the same votes (or that they differ)
//! without revealing the votes to any single party. The protocol proceeds as follows:
//!
//! 1. The [`RatioBallot`] of the two ballots is computed: for each selection, the *ratio*
//!    ciphertext `(α, β)` is the difference of the two ciphertexts. It encrypts zero
//!    iff both selections encrypt the same value.
//! 2. [`BlindingTrustee`]s jointly raise each ratio to a secret exponent `ξ = Σ ξ_j`,
//!    producing a *blinded* ciphertext `(A, B)` together with a distributed
//!    [`BlindingProof`](crate::BlindingProof) of correct blinding. Blinding preserves
//!    the encryption of zero, but turns any other plaintext into a random group element.
//! 3. A [`ThresholdDecryptor`] (a quorum of guardians) decrypts `(A, B)` to `T`, proving each
//!    decryption share. The ballots are equal iff `T` is the group identity for every selection.
//!
//! The [`PepCoordinator`] drives the protocol; the produced [`BallotPep`] can be checked
//! by anyone holding the [`ElectionContext`](crate::ElectionContext) via [`PepVerifier`].
//!
//! # Examples
//!
//! ```
//! # use electionguard_pep::{
//! #     group::Ristretto,
//! #     pep::{
//! #         EncryptedBallot, EncryptedContest, EncryptedSelection, GuardianDecryptor,
//! #         LocalBlindingTrustee, PepCoordinator, PepVerifier,
//! #     },
//! #     sharing::{ActiveParticipant, Dealer, Params, PublicKeySet},
//! #     ElectionContext,
//! # };
//! # use rand::thread_rng;
//! # use std::{error::Error as StdError, sync::Arc};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn StdError>> {
//! let mut rng = thread_rng();
//! // Provision 3 guardians with a decryption quorum of 2.
//! let params = Params::new(3, 2);
//! let dealer = Dealer::<Ristretto>::new(params, &mut rng);
//! let key_set = PublicKeySet::new(params, dealer.public_info())?;
//! let guardians = (0..params.shares)
//!     .map(|i| {
//!         let share = dealer.secret_share_for_participant(i);
//!         ActiveParticipant::new(key_set.clone(), i, share)
//!     })
//!     .collect::<Result<Vec<_>, _>>()?;
//! let context = ElectionContext::new(b"election", key_set);
//!
//! let decryptor = GuardianDecryptor::new(guardians, &mut rng);
//! let coordinator = PepCoordinator::new(context.clone(), Arc::new(decryptor), &mut rng)
//!     .with_trustee(Arc::new(LocalBlindingTrustee::new("trustee-1", &mut rng)))
//!     .with_trustee(Arc::new(LocalBlindingTrustee::new("trustee-2", &mut rng)));
//!
//! // Encrypt the same vote twice.
//! let joint_key = context.joint_key();
//! let ballot = |ciphertext| {
//!     let selection = EncryptedSelection::new("alice", ciphertext);
//!     EncryptedBallot::new("ballot-1", vec![EncryptedContest::new("mayor", vec![selection])])
//! };
//! let first = ballot(joint_key.encrypt(1_u64, &mut rng));
//! let second = ballot(joint_key.encrypt(1_u64, &mut rng));
//!
//! let pep = coordinator.run(&first, &second).await?;
//! assert!(pep.is_equal);
//! PepVerifier::verify(&context, &pep)?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::fmt;

mod ballot;
mod config;
mod coordinator;
mod decryptor;
mod error;
mod messages;
mod metrics;
mod output;
mod ratio;
mod trustee;
mod verifier;

pub use self::{
    ballot::{EncryptedBallot, EncryptedContest, EncryptedSelection},
    config::PepConfig,
    coordinator::PepCoordinator,
    decryptor::{DecryptionProof, DecryptionShare, GuardianDecryptor, ThresholdDecryptor},
    error::{
        DecryptionError, PepError, PepVerificationError, ProofFailure, StructuralMismatch,
        TransportError, TrusteeRejection, VerificationFailure,
    },
    messages::{
        BlindChallenge, BlindChallengeResponse, BlindRequest, BlindResponse, ChallengeRequest,
        RunId, TrusteeNonces,
    },
    metrics::{NoopMetrics, PepMetrics, PepStep, RunOutcome},
    output::{BallotPep, ContestPep, SelectionPep},
    ratio::{ContestLayout, RatioBallot, RatioSelection},
    trustee::{BlindingTrustee, LocalBlindingTrustee, NonceMode},
    verifier::PepVerifier,
};

/// Reference to a selection within a ballot: the contest id and the selection id.
/// Displayed as `{contest_id}#{selection_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionRef {
    contest_id: String,
    selection_id: String,
}

impl SelectionRef {
    /// Creates a reference.
    pub fn new(contest_id: impl Into<String>, selection_id: impl Into<String>) -> Self {
        Self {
            contest_id: contest_id.into(),
            selection_id: selection_id.into(),
        }
    }

    /// Returns the contest id.
    pub fn contest_id(&self) -> &str {
        &self.contest_id
    }

    /// Returns the selection id.
    pub fn selection_id(&self) -> &str {
        &self.selection_id
    }
}

impl fmt::Display for SelectionRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}#{}", self.contest_id, self.selection_id)
    }
}
