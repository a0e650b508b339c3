//! Ratio ballots: componentwise quotients of two encrypted ballots.

use std::collections::{HashMap, HashSet};

use super::{EncryptedBallot, EncryptedContest, EncryptedSelection, SelectionRef, StructuralMismatch};
use crate::{group::Group, Ciphertext};

/// Ratio ciphertext for a single selection.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioSelection<G: Group> {
    reference: SelectionRef,
    ratio: Ciphertext<G>,
}

impl<G: Group> RatioSelection<G> {
    /// Returns the reference to the selection.
    pub fn reference(&self) -> &SelectionRef {
        &self.reference
    }

    /// Returns the ratio ciphertext `(α, β)`.
    pub fn ratio(&self) -> &Ciphertext<G> {
        &self.ratio
    }
}

/// Position of a contest within the flat selection arena of a [`RatioBallot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestLayout {
    contest_id: String,
    start: usize,
    len: usize,
}

impl ContestLayout {
    /// Returns the contest id.
    pub fn contest_id(&self) -> &str {
        &self.contest_id
    }

    /// Returns the range of selection positions belonging to this contest.
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Componentwise quotient of two ballots with the same structure. Selections are
/// stored in a flat arena in the order of the first ballot; [`ContestLayout`]s
/// map contests to ranges in the arena.
///
/// Selections of the second ballot are matched to the first one by contest and selection ids,
/// so the ballots may list contests or selections in different orders.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioBallot<G: Group> {
    ballot_id: String,
    contests: Vec<ContestLayout>,
    selections: Vec<RatioSelection<G>>,
}

impl<G: Group> RatioBallot<G> {
    /// Computes the ratio of `first` and `second`.
    ///
    /// # Errors
    ///
    /// Returns an error if ballot ids differ, if contest or selection counts differ,
    /// if an id in `first` has no counterpart in `second`, or if ids repeat.
    pub fn new(
        first: &EncryptedBallot<G>,
        second: &EncryptedBallot<G>,
    ) -> Result<Self, StructuralMismatch> {
        if first.ballot_id != second.ballot_id {
            return Err(StructuralMismatch::BallotId {
                first: first.ballot_id.clone(),
                second: second.ballot_id.clone(),
            });
        }
        if first.contests.len() != second.contests.len() {
            return Err(StructuralMismatch::ContestCount {
                first: first.contests.len(),
                second: second.contests.len(),
            });
        }

        let second_contests = index_contests(&second.contests)?;
        let mut seen_contests = HashSet::with_capacity(first.contests.len());
        let mut contests = Vec::with_capacity(first.contests.len());
        let mut selections = Vec::with_capacity(first.selection_count());

        for contest in &first.contests {
            if !seen_contests.insert(contest.contest_id.as_str()) {
                return Err(StructuralMismatch::DuplicateContest {
                    contest_id: contest.contest_id.clone(),
                });
            }
            let other = second_contests
                .get(contest.contest_id.as_str())
                .ok_or_else(|| StructuralMismatch::UnmatchedContest {
                    contest_id: contest.contest_id.clone(),
                })?;

            let start = selections.len();
            Self::push_contest_ratios(contest, other, &mut selections)?;
            contests.push(ContestLayout {
                contest_id: contest.contest_id.clone(),
                start,
                len: selections.len() - start,
            });
        }

        Ok(Self {
            ballot_id: first.ballot_id.clone(),
            contests,
            selections,
        })
    }

    fn push_contest_ratios(
        contest: &EncryptedContest<G>,
        other: &EncryptedContest<G>,
        selections: &mut Vec<RatioSelection<G>>,
    ) -> Result<(), StructuralMismatch> {
        if contest.selections.len() != other.selections.len() {
            return Err(StructuralMismatch::SelectionCount {
                contest_id: contest.contest_id.clone(),
                first: contest.selections.len(),
                second: other.selections.len(),
            });
        }

        let other_selections = index_selections(other)?;
        let mut seen_selections = HashSet::with_capacity(contest.selections.len());
        for selection in &contest.selections {
            let reference = SelectionRef::new(&contest.contest_id, &selection.selection_id);
            if !seen_selections.insert(selection.selection_id.as_str()) {
                return Err(StructuralMismatch::DuplicateSelection {
                    selection: reference,
                });
            }
            let other = other_selections
                .get(selection.selection_id.as_str())
                .ok_or_else(|| StructuralMismatch::UnmatchedSelection {
                    selection: reference.clone(),
                })?;
            selections.push(RatioSelection {
                reference,
                ratio: selection.ciphertext - other.ciphertext,
            });
        }
        Ok(())
    }

    /// Returns the ballot id.
    pub fn ballot_id(&self) -> &str {
        &self.ballot_id
    }

    /// Returns the contest layout.
    pub fn contests(&self) -> &[ContestLayout] {
        &self.contests
    }

    /// Returns all selections in the arena order.
    pub fn selections(&self) -> &[RatioSelection<G>] {
        &self.selections
    }

    /// Returns the number of selections (`ntexts`).
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    /// Checks whether the ballot has no selections.
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Iterates over ratio ciphertexts in the arena order.
    pub fn ciphertexts(&self) -> impl Iterator<Item = Ciphertext<G>> + '_ {
        self.selections.iter().map(|selection| selection.ratio)
    }
}

fn index_contests<G: Group>(
    contests: &[EncryptedContest<G>],
) -> Result<HashMap<&str, &EncryptedContest<G>>, StructuralMismatch> {
    let mut index = HashMap::with_capacity(contests.len());
    for contest in contests {
        if index.insert(contest.contest_id.as_str(), contest).is_some() {
            return Err(StructuralMismatch::DuplicateContest {
                contest_id: contest.contest_id.clone(),
            });
        }
    }
    Ok(index)
}

fn index_selections<G: Group>(
    contest: &EncryptedContest<G>,
) -> Result<HashMap<&str, &EncryptedSelection<G>>, StructuralMismatch> {
    let mut index = HashMap::with_capacity(contest.selections.len());
    for selection in &contest.selections {
        if index
            .insert(selection.selection_id.as_str(), selection)
            .is_some()
        {
            return Err(StructuralMismatch::DuplicateSelection {
                selection: SelectionRef::new(&contest.contest_id, &selection.selection_id),
            });
        }
    }
    Ok(index)
}
