//! Threshold decryption of blinded ratio ciphertexts.

use futures::future::{self, BoxFuture, FutureExt};
use rand_chacha::ChaChaRng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::fmt;
use std::sync::{Mutex, PoisonError};

use super::DecryptionError;
use crate::{
    group::Group,
    proofs::{LogEqualityProof, VerificationError},
    sharing::ActiveParticipant,
    CandidateDecryption, Ciphertext, ElectionContext,
};

/// Decryption share of a single guardian together with the proof of its correctness.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct DecryptionShare<G: Group> {
    /// 0-based index of the guardian.
    pub index: usize,
    /// Decryption share `D_i = [s_i]A`.
    pub share: CandidateDecryption<G>,
    /// Proof that `D_i` and the guardian's public key share have the same discrete log.
    pub proof: LogEqualityProof<G>,
}

/// Proof that a ciphertext decrypts to a certain group element. Consists of decryption
/// shares of a guardian quorum, each with a [`LogEqualityProof`] bound to
/// the [`ElectionContext`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct DecryptionProof<G: Group> {
    /// Decryption shares.
    pub shares: Vec<DecryptionShare<G>>,
}

impl<G: Group> DecryptionProof<G> {
    /// Verifies that `decrypted` is the decryption of `ciphertext` under the joint key
    /// of `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of shares differs from the decryption quorum,
    /// if guardian indexes are out of range or repeated, if a share proof does not verify,
    /// or if the combined shares do not decrypt `ciphertext` to `decrypted`.
    pub fn verify(
        &self,
        context: &ElectionContext<G>,
        ciphertext: &Ciphertext<G>,
        decrypted: &G::Element,
    ) -> Result<(), VerificationError> {
        let params = context.key_set().params();
        VerificationError::check_lengths("decryption shares", params.threshold, self.shares.len())?;

        let mut verified_shares = Vec::with_capacity(self.shares.len());
        for (pos, share) in self.shares.iter().enumerate() {
            if self.shares[..pos]
                .iter()
                .any(|other| other.index == share.index)
            {
                return Err(VerificationError::ParticipantIndex { index: share.index });
            }
            let verified =
                context.verify_share(share.share, *ciphertext, share.index, &share.proof)?;
            verified_shares.push((share.index, verified));
        }

        let combined = params
            .combine_shares(verified_shares)
            .ok_or(VerificationError::PlaintextMismatch)?;
        if combined.decrypt_to_element(*ciphertext) == *decrypted {
            Ok(())
        } else {
            Err(VerificationError::PlaintextMismatch)
        }
    }
}

/// Quorum of guardians able to decrypt ciphertexts under the joint election key.
///
/// The decryptor receives blinded ratio ciphertexts `(A, B)` and returns their decryptions
/// `T = B − [s]A` together with proofs, in the same order as the input. Implementations
/// may contact remote guardians; the returned future is awaited by the
/// [`PepCoordinator`](crate::pep::PepCoordinator).
pub trait ThresholdDecryptor<G: Group>: Send + Sync {
    /// Decrypts `ciphertexts`.
    fn decrypt<'a>(
        &'a self,
        context: &'a ElectionContext<G>,
        ciphertexts: &'a [Ciphertext<G>],
    ) -> BoxFuture<'a, Result<Vec<(G::Element, DecryptionProof<G>)>, DecryptionError>>;
}

/// In-process [`ThresholdDecryptor`] backed by [`ActiveParticipant`] guardians.
///
/// The decryptor uses the shares of the first `threshold` guardians (ordered by index).
pub struct GuardianDecryptor<G: Group> {
    guardians: Vec<ActiveParticipant<G>>,
    rng: Mutex<ChaChaRng>,
}

impl<G: Group> fmt::Debug for GuardianDecryptor<G> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indexes: Vec<_> = self.guardians.iter().map(ActiveParticipant::index).collect();
        formatter
            .debug_struct("GuardianDecryptor")
            .field("guardians", &indexes)
            .finish_non_exhaustive()
    }
}

impl<G: Group> GuardianDecryptor<G> {
    /// Creates a decryptor from the available guardians. Guardians with repeated indexes
    /// are ignored. The nonces for decryption proofs are drawn from a CSPRNG seeded
    /// from `rng`.
    pub fn new<R: CryptoRng + RngCore>(mut guardians: Vec<ActiveParticipant<G>>, rng: &mut R) -> Self {
        guardians.sort_by_key(ActiveParticipant::index);
        guardians.dedup_by_key(|guardian| guardian.index());
        let mut seed = <ChaChaRng as SeedableRng>::Seed::default();
        rng.fill_bytes(&mut seed);
        Self {
            guardians,
            rng: Mutex::new(ChaChaRng::from_seed(seed)),
        }
    }

    /// Returns the available guardians.
    pub fn guardians(&self) -> &[ActiveParticipant<G>] {
        &self.guardians
    }

    fn check_key_set(&self, context: &ElectionContext<G>) -> Result<(), DecryptionError> {
        let expected = context.key_set();
        let is_consistent = self.guardians.iter().all(|guardian| {
            let key_set = guardian.key_set();
            key_set.params() == expected.params()
                && key_set.shared_key() == expected.shared_key()
                && key_set.participant_keys() == expected.participant_keys()
        });
        if is_consistent {
            Ok(())
        } else {
            Err(DecryptionError::KeySetMismatch)
        }
    }

    fn decrypt_sync(
        &self,
        context: &ElectionContext<G>,
        ciphertexts: &[Ciphertext<G>],
    ) -> Result<Vec<(G::Element, DecryptionProof<G>)>, DecryptionError> {
        let params = context.key_set().params();
        if self.guardians.len() < params.threshold {
            return Err(DecryptionError::NotEnoughGuardians {
                available: self.guardians.len(),
                threshold: params.threshold,
            });
        }
        self.check_key_set(context)?;

        let quorum = &self.guardians[..params.threshold];
        log::debug!(
            "decrypting {} ciphertexts with guardians {:?}",
            ciphertexts.len(),
            quorum.iter().map(ActiveParticipant::index).collect::<Vec<_>>()
        );

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        ciphertexts
            .iter()
            .map(|&ciphertext| -> Result<_, DecryptionError> {
                let (verified, shares): (Vec<_>, Vec<_>) = quorum
                    .iter()
                    .map(|guardian| {
                        let (share, proof) = guardian.decrypt_share(context, ciphertext, &mut *rng);
                        let index = guardian.index();
                        let proved_share = DecryptionShare {
                            index,
                            share: share.into(),
                            proof,
                        };
                        ((index, share), proved_share)
                    })
                    .unzip();

                let combined = params
                    .combine_shares(verified)
                    .ok_or(DecryptionError::KeySetMismatch)?;
                let decrypted = combined.decrypt_to_element(ciphertext);
                Ok((decrypted, DecryptionProof { shares }))
            })
            .collect()
    }
}

impl<G: Group> ThresholdDecryptor<G> for GuardianDecryptor<G> {
    fn decrypt<'a>(
        &'a self,
        context: &'a ElectionContext<G>,
        ciphertexts: &'a [Ciphertext<G>],
    ) -> BoxFuture<'a, Result<Vec<(G::Element, DecryptionProof<G>)>, DecryptionError>> {
        future::ready(self.decrypt_sync(context, ciphertexts)).boxed()
    }
}
