//! Protocol outputs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{DecryptionProof, SelectionRef};
#[cfg(feature = "serde")]
use crate::serde::ElementHelper;
use crate::{group::Group, BlindingProof, Ciphertext};

/// Plaintext equivalence proof for a single selection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct SelectionPep<G: Group> {
    /// Selection id.
    pub selection_id: String,
    /// Ratio `(α, β)` of the compared ciphertexts.
    pub ciphertext_ratio: Ciphertext<G>,
    /// Blinded ratio `(A, B)`.
    pub ciphertext_ab: Ciphertext<G>,
    /// Proof that `(A, B)` is a blinding of `(α, β)`.
    pub blinding_proof: BlindingProof<G>,
    /// Decryption `T` of `(A, B)`. The identity iff the compared ciphertexts encrypt
    /// the same value.
    #[cfg_attr(feature = "serde", serde(with = "ElementHelper::<G>"))]
    pub t: G::Element,
    /// Proof that `T` is the correct decryption of `(A, B)`.
    pub decryption_proof: DecryptionProof<G>,
}

/// Plaintext equivalence proofs for all selections in a contest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct ContestPep<G: Group> {
    /// Contest id.
    pub contest_id: String,
    /// Proofs for the contest selections.
    pub selections: Vec<SelectionPep<G>>,
}

/// Result of comparing two encrypted ballots.
///
/// The `is_equal` flag is derived from the `t` values of all selections. Use
/// [`PepVerifier`](crate::pep::PepVerifier) to check the proofs and the flag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct BallotPep<G: Group> {
    /// Ballot id.
    pub ballot_id: String,
    /// Whether the ballots encrypt the same votes.
    pub is_equal: bool,
    /// Per-contest proofs.
    pub contests: Vec<ContestPep<G>>,
}

impl<G: Group> BallotPep<G> {
    /// Iterates over all selections together with their references.
    pub fn selections(&self) -> impl Iterator<Item = (SelectionRef, &SelectionPep<G>)> + '_ {
        self.contests.iter().flat_map(|contest| {
            contest.selections.iter().map(move |selection| {
                let reference = SelectionRef::new(&contest.contest_id, &selection.selection_id);
                (reference, selection)
            })
        })
    }

    /// Returns the number of selections across all contests.
    pub fn selection_count(&self) -> usize {
        self.contests
            .iter()
            .map(|contest| contest.selections.len())
            .sum()
    }
}
