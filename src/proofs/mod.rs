//! Zero-knowledge proofs.

use merlin::Transcript;

use crate::group::{Group, RandomBytesProvider};

mod blinding;
mod log_equality;

pub use self::{blinding::BlindingProof, log_equality::LogEqualityProof};

pub(crate) use self::blinding::{blinding_challenge, expected_commitments};

/// Extension trait for Merlin transcripts used in constructing our proofs.
pub(crate) trait TranscriptForGroup {
    fn start_proof(&mut self, proof_label: &'static [u8]);

    fn append_element_bytes(&mut self, label: &'static [u8], element_bytes: &[u8]);

    fn append_element<G: Group>(&mut self, label: &'static [u8], element: &G::Element);

    fn challenge_scalar<G: Group>(&mut self, label: &'static [u8]) -> G::Scalar;
}

impl TranscriptForGroup for Transcript {
    fn start_proof(&mut self, proof_label: &'static [u8]) {
        self.append_message(b"dom-sep", proof_label);
    }

    fn append_element_bytes(&mut self, label: &'static [u8], element_bytes: &[u8]) {
        self.append_message(label, element_bytes);
    }

    fn append_element<G: Group>(&mut self, label: &'static [u8], element: &G::Element) {
        let mut output = vec![0_u8; G::ELEMENT_SIZE];
        G::serialize_element(element, &mut output);
        self.append_element_bytes(label, &output);
    }

    fn challenge_scalar<G: Group>(&mut self, label: &'static [u8]) -> G::Scalar {
        G::scalar_from_random_bytes(RandomBytesProvider::new(self, label))
    }
}

/// Error verifying base proofs, such as [`LogEqualityProof`] or [`BlindingProof`],
/// and the decryption proofs assembled from them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum VerificationError {
    /// Restored challenge scalar does not match the one provided in the proof.
    ///
    /// This error most likely means that the proof itself is malformed, or that it was created
    /// for a different context than it is being verified for.
    #[error("restored challenge scalar does not match the one provided in the proof")]
    ChallengeMismatch,
    /// A collection (e.g., number of decryption shares) has a different size than expected.
    ///
    /// This error most likely means that the proof is malformed.
    #[error("number of {collection} ({actual}) differs from expected ({expected})")]
    LenMismatch {
        /// Human-readable collection name, such as "decryption shares".
        collection: &'static str,
        /// Expected size of the collection.
        expected: usize,
        /// Actual size of the collection.
        actual: usize,
    },
    /// Participant index referenced by a proof is out of range or repeated.
    #[error("participant index {index} is out of range or repeated")]
    ParticipantIndex {
        /// Offending 0-based participant index.
        index: usize,
    },
    /// Decryption shares verify individually, but their combination does not match
    /// the claimed decrypted element.
    #[error("combined decryption shares do not match the claimed decrypted element")]
    PlaintextMismatch,
}

impl VerificationError {
    pub(crate) fn check_lengths(
        collection: &'static str,
        expected: usize,
        actual: usize,
    ) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::LenMismatch {
                collection,
                expected,
                actual,
            })
        }
    }
}
