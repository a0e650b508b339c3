//! Encrypted ballots compared by the protocol.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{group::Group, Ciphertext};

/// Encrypted selection: a single ElGamal ciphertext of a 0/1 vote.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct EncryptedSelection<G: Group> {
    /// Selection id, unique within the contest.
    pub selection_id: String,
    /// Encrypted vote.
    pub ciphertext: Ciphertext<G>,
}

impl<G: Group> EncryptedSelection<G> {
    /// Creates a selection.
    pub fn new(selection_id: impl Into<String>, ciphertext: Ciphertext<G>) -> Self {
        Self {
            selection_id: selection_id.into(),
            ciphertext,
        }
    }
}

/// Encrypted contest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct EncryptedContest<G: Group> {
    /// Contest id, unique within the ballot.
    pub contest_id: String,
    /// Encrypted selections.
    pub selections: Vec<EncryptedSelection<G>>,
}

impl<G: Group> EncryptedContest<G> {
    /// Creates a contest.
    pub fn new(contest_id: impl Into<String>, selections: Vec<EncryptedSelection<G>>) -> Self {
        Self {
            contest_id: contest_id.into(),
            selections,
        }
    }
}

/// Encrypted ballot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct EncryptedBallot<G: Group> {
    /// Ballot id.
    pub ballot_id: String,
    /// Encrypted contests.
    pub contests: Vec<EncryptedContest<G>>,
}

impl<G: Group> EncryptedBallot<G> {
    /// Creates a ballot.
    pub fn new(ballot_id: impl Into<String>, contests: Vec<EncryptedContest<G>>) -> Self {
        Self {
            ballot_id: ballot_id.into(),
            contests,
        }
    }

    /// Returns the total number of selections across all contests.
    pub fn selection_count(&self) -> usize {
        self.contests
            .iter()
            .map(|contest| contest.selections.len())
            .sum()
    }
}
