//! Stateless verification of protocol outputs.

use super::{BallotPep, EncryptedBallot, PepVerificationError, RatioBallot, VerificationFailure};
use crate::{group::Group, ElectionContext};

/// Verifier for [`BallotPep`]s.
///
/// Verification does not stop at the first failure; all failing selections
/// are reported in the returned [`PepVerificationError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PepVerifier;

impl PepVerifier {
    /// Verifies `pep` under `context`. For each selection, checks the blinding proof
    /// against the ratio and blinded ciphertexts, and the decryption proof against
    /// the blinded ciphertext and `t`. Also checks that the equality flag agrees with
    /// the `t` values.
    ///
    /// # Errors
    ///
    /// Returns all detected failures.
    pub fn verify<G: Group>(
        context: &ElectionContext<G>,
        pep: &BallotPep<G>,
    ) -> Result<(), PepVerificationError> {
        PepVerificationError::from_failures(Self::check_proofs(context, pep))
    }

    /// Same as [`Self::verify()`], but additionally checks that `pep` is computed
    /// for the specified pair of ballots.
    ///
    /// # Errors
    ///
    /// Returns all detected failures.
    pub fn verify_against_ballots<G: Group>(
        context: &ElectionContext<G>,
        pep: &BallotPep<G>,
        first: &EncryptedBallot<G>,
        second: &EncryptedBallot<G>,
    ) -> Result<(), PepVerificationError> {
        let mut failures = Self::check_proofs(context, pep);
        match RatioBallot::new(first, second) {
            Ok(ratio) => Self::check_ratios(pep, &ratio, &mut failures),
            Err(err) => failures.push(VerificationFailure::Structure(err)),
        }
        PepVerificationError::from_failures(failures)
    }

    fn check_proofs<G: Group>(
        context: &ElectionContext<G>,
        pep: &BallotPep<G>,
    ) -> Vec<VerificationFailure> {
        let mut failures = vec![];
        let mut all_identity = true;
        for (selection, proof) in pep.selections() {
            let blinded = &proof.ciphertext_ab;
            if G::is_identity(blinded.random_element()) || G::is_identity(blinded.blinded_element())
            {
                failures.push(VerificationFailure::DegenerateBlinding {
                    selection: selection.clone(),
                });
            }
            if let Err(source) = proof
                .blinding_proof
                .verify(context, &proof.ciphertext_ratio, blinded)
            {
                failures.push(VerificationFailure::BlindingProof {
                    selection: selection.clone(),
                    source,
                });
            }
            if let Err(source) = proof.decryption_proof.verify(context, blinded, &proof.t) {
                failures.push(VerificationFailure::DecryptionProof { selection, source });
            }
            all_identity &= G::is_identity(&proof.t);
        }

        if pep.is_equal != all_identity {
            failures.push(VerificationFailure::EqualityFlag {
                recorded: pep.is_equal,
                computed: all_identity,
            });
        }
        if !failures.is_empty() {
            log::debug!(
                "PEP for ballot `{}` has {} verification failures",
                pep.ballot_id,
                failures.len()
            );
        }
        failures
    }

    fn check_ratios<G: Group>(
        pep: &BallotPep<G>,
        ratio: &RatioBallot<G>,
        failures: &mut Vec<VerificationFailure>,
    ) {
        if pep.ballot_id != ratio.ballot_id() {
            failures.push(VerificationFailure::BallotId {
                recorded: pep.ballot_id.clone(),
                expected: ratio.ballot_id().to_owned(),
            });
        }

        let recorded: Vec<_> = pep.selections().collect();
        let is_same_layout = recorded.len() == ratio.len()
            && recorded
                .iter()
                .zip(ratio.selections())
                .all(|((reference, _), selection)| reference == selection.reference());
        if !is_same_layout {
            failures.push(VerificationFailure::Layout);
            return;
        }

        for ((reference, proof), selection) in recorded.into_iter().zip(ratio.selections()) {
            if proof.ciphertext_ratio != *selection.ratio() {
                failures.push(VerificationFailure::RatioMismatch {
                    selection: reference,
                });
            }
        }
    }
}
