//! Election context shared by all protocol participants.

use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[cfg(feature = "serde")]
use crate::serde::HashHelper;
use crate::{
    decryption::{CandidateDecryption, VerifiableDecryption},
    group::Group,
    proofs::{LogEqualityProof, TranscriptForGroup, VerificationError},
    sharing::PublicKeySet,
    Ciphertext, PublicKey, SecretKey,
};

/// Public election parameters every proof in the plaintext equivalence protocol is bound to:
/// the *extended base hash* `Q̅` and the guardians' [`PublicKeySet`] (which carries
/// the joint election public key `K`).
///
/// The context is read-only and can be freely shared among concurrent protocol runs.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct ElectionContext<G: Group> {
    #[cfg_attr(feature = "serde", serde(with = "HashHelper"))]
    extended_base_hash: [u8; 32],
    key_set: PublicKeySet<G>,
}

impl<G: Group> ElectionContext<G> {
    /// Creates a context from the election `base_hash` and the guardians' key set.
    /// The extended base hash is computed as `SHA-256(base_hash ‖ K)`, where `K` is
    /// the serialized joint public key.
    pub fn new(base_hash: &[u8], key_set: PublicKeySet<G>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(base_hash);
        hasher.update(key_set.shared_key().as_bytes());
        Self {
            extended_base_hash: hasher.finalize().into(),
            key_set,
        }
    }

    /// Creates a context from an already computed extended base hash.
    pub fn from_parts(extended_base_hash: [u8; 32], key_set: PublicKeySet<G>) -> Self {
        Self {
            extended_base_hash,
            key_set,
        }
    }

    /// Returns the extended base hash.
    pub fn extended_base_hash(&self) -> &[u8; 32] {
        &self.extended_base_hash
    }

    /// Returns the guardians' key set.
    pub fn key_set(&self) -> &PublicKeySet<G> {
        &self.key_set
    }

    /// Returns the joint election public key `K`.
    pub fn joint_key(&self) -> &PublicKey<G> {
        self.key_set.shared_key()
    }

    /// Appends the context to `transcript`.
    pub(crate) fn commit(&self, transcript: &mut Transcript) {
        transcript.append_message(b"Q", &self.extended_base_hash);
        self.key_set.commit(transcript);
    }

    fn decryption_share_transcript(&self, index: usize) -> Transcript {
        let mut transcript = Transcript::new(b"pep_decryption_share");
        self.commit(&mut transcript);
        transcript.append_u64(b"i", index as u64);
        transcript
    }

    pub(crate) fn prove_share<R: CryptoRng + RngCore>(
        &self,
        index: usize,
        secret_share: &SecretKey<G>,
        ciphertext: Ciphertext<G>,
        rng: &mut R,
    ) -> (VerifiableDecryption<G>, LogEqualityProof<G>) {
        let dh_element = ciphertext.random_element * secret_share.expose_scalar();
        let key_share = G::mul_generator(secret_share.expose_scalar());
        let mut transcript = self.decryption_share_transcript(index);
        transcript.start_proof(b"guardian_share");
        let proof = LogEqualityProof::new(
            &PublicKey::from_element(ciphertext.random_element),
            secret_share,
            (key_share, dh_element),
            &mut transcript,
            rng,
        );
        (VerifiableDecryption::from_element(dh_element), proof)
    }

    /// Verifies a decryption share of guardian `index` for `ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range for the key set, or if the proof
    /// does not verify.
    pub fn verify_share(
        &self,
        candidate_share: CandidateDecryption<G>,
        ciphertext: Ciphertext<G>,
        index: usize,
        proof: &LogEqualityProof<G>,
    ) -> Result<VerifiableDecryption<G>, VerificationError> {
        let key_share = self
            .key_set
            .participant_key(index)
            .ok_or(VerificationError::ParticipantIndex { index })?
            .as_element();
        let dh_element = candidate_share.dh_element();
        let mut transcript = self.decryption_share_transcript(index);
        transcript.start_proof(b"guardian_share");

        proof.verify(
            &PublicKey::from_element(ciphertext.random_element),
            (key_share, dh_element),
            &mut transcript,
        )?;
        Ok(VerifiableDecryption::from_element(dh_element))
    }
}
