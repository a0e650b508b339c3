//! Error types for the plaintext equivalence protocol.

use core::{fmt, time::Duration};
use std::error::Error as StdError;

use super::{messages::RunId, SelectionRef};
use crate::proofs::VerificationError;

/// Helper to display a list of items separated by commas.
struct DisplayList<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for DisplayList<'_, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                formatter.write_str(", ")?;
            }
            fmt::Display::fmt(item, formatter)?;
        }
        Ok(())
    }
}

/// Two ballots cannot be compared because their structure differs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StructuralMismatch {
    /// Ballot ids differ.
    #[error("ballot ids differ: `{first}` vs `{second}`")]
    BallotId {
        /// Id of the first ballot.
        first: String,
        /// Id of the second ballot.
        second: String,
    },
    /// Ballots have a different number of contests.
    #[error("ballots contain {first} and {second} contests")]
    ContestCount {
        /// Number of contests in the first ballot.
        first: usize,
        /// Number of contests in the second ballot.
        second: usize,
    },
    /// A contest has a different number of selections in the two ballots.
    #[error("contest `{contest_id}` contains {first} and {second} selections")]
    SelectionCount {
        /// Contest id.
        contest_id: String,
        /// Number of selections in the first ballot.
        first: usize,
        /// Number of selections in the second ballot.
        second: usize,
    },
    /// A contest of the first ballot is missing from the second one.
    #[error("contest `{contest_id}` has no counterpart in the second ballot")]
    UnmatchedContest {
        /// Contest id.
        contest_id: String,
    },
    /// A selection of the first ballot is missing from the second one.
    #[error("selection `{selection}` has no counterpart in the second ballot")]
    UnmatchedSelection {
        /// Selection reference.
        selection: SelectionRef,
    },
    /// A contest id is repeated within a ballot.
    #[error("contest `{contest_id}` is repeated")]
    DuplicateContest {
        /// Contest id.
        contest_id: String,
    },
    /// A selection id is repeated within a contest.
    #[error("selection `{selection}` is repeated")]
    DuplicateSelection {
        /// Selection reference.
        selection: SelectionRef,
    },
}

/// Failure of the blinding proof check for a single selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofFailure {
    /// Selection for which the aggregated check failed.
    pub selection: SelectionRef,
    /// Indexes of the trustees whose individual contributions do not verify.
    /// May be empty if the failure cannot be attributed to a single trustee.
    pub trustees: Vec<usize>,
}

impl fmt::Display for ProofFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.trustees.is_empty() {
            write!(formatter, "`{}` (no trustee isolated)", self.selection)
        } else {
            write!(
                formatter,
                "`{}` (trustees {})",
                self.selection,
                DisplayList(&self.trustees)
            )
        }
    }
}

/// Reason why a blinding trustee rejected a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TrusteeRejection {
    /// The trustee has no retained nonces for the run (it never blinded for it,
    /// or the nonces were already consumed).
    #[error("no retained nonces for run {run}")]
    UnknownRun {
        /// Run id.
        run: RunId,
    },
    /// The trustee already blinded ciphertexts for the run.
    #[error("ciphertexts for run {run} were already blinded")]
    DuplicateRun {
        /// Run id.
        run: RunId,
    },
    /// The number of challenges differs from the number of blinded ciphertexts.
    #[error("received {actual} challenges for {expected} blinded ciphertexts")]
    LengthMismatch {
        /// Number of ciphertexts blinded for the run.
        expected: usize,
        /// Number of received challenges.
        actual: usize,
    },
    /// Nonces attached to a challenge do not match the trustee's nonce mode.
    #[error("challenge #{position} carries nonces in an unexpected form")]
    UnexpectedNonces {
        /// 0-based position of the challenge in the request.
        position: usize,
    },
}

/// Error communicating with a blinding trustee.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransportError {
    /// The trustee did not respond in time.
    #[error("trustee did not respond within {timeout:?}")]
    Timeout {
        /// Configured timeout.
        timeout: Duration,
    },
    /// The trustee returned a wrong number of responses.
    #[error("trustee returned {actual} responses, expected {expected}")]
    ResponseLength {
        /// Expected number of responses (the number of selections).
        expected: usize,
        /// Actual number of responses.
        actual: usize,
    },
    /// The trustee rejected the request.
    #[error("trustee rejected the request: {0}")]
    Rejected(#[from] TrusteeRejection),
    /// Other transport-specific error.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

/// Error produced by a [`ThresholdDecryptor`](crate::pep::ThresholdDecryptor).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecryptionError {
    /// Fewer guardians are available than the quorum requires.
    #[error("{available} guardians are available, while decryption requires {threshold}")]
    NotEnoughGuardians {
        /// Number of available guardians.
        available: usize,
        /// Decryption quorum.
        threshold: usize,
    },
    /// Guardians hold shares of a key different from the joint key of the election context.
    #[error("guardians' key set does not match the election context")]
    KeySetMismatch,
    /// The decryptor returned a wrong number of decryptions.
    #[error("decryptor returned {actual} decryptions, expected {expected}")]
    ResponseLength {
        /// Expected number of decryptions (the number of selections).
        expected: usize,
        /// Actual number of decryptions.
        actual: usize,
    },
    /// Other decryptor-specific error.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

/// Single failure detected when verifying a [`BallotPep`](crate::pep::BallotPep).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum VerificationFailure {
    /// The blinding proof of a selection does not verify.
    #[error("blinding proof for `{selection}` is invalid: {source}")]
    BlindingProof {
        /// Selection reference.
        selection: SelectionRef,
        /// Proof verification error.
        source: VerificationError,
    },
    /// The decryption proof of a selection does not verify.
    #[error("decryption proof for `{selection}` is invalid: {source}")]
    DecryptionProof {
        /// Selection reference.
        selection: SelectionRef,
        /// Proof verification error.
        source: VerificationError,
    },
    /// The blinded ciphertext of a selection has an identity component.
    #[error("blinded ciphertext for `{selection}` is degenerate")]
    DegenerateBlinding {
        /// Selection reference.
        selection: SelectionRef,
    },
    /// The equality flag disagrees with the decrypted values.
    #[error("equality flag is {recorded}, while decrypted values imply {computed}")]
    EqualityFlag {
        /// Recorded flag.
        recorded: bool,
        /// Flag implied by the decrypted values.
        computed: bool,
    },
    /// Input ballots cannot be compared.
    #[error("input ballots are not comparable: {0}")]
    Structure(#[source] StructuralMismatch),
    /// Ballot id differs from the id of the input ballots.
    #[error("recorded ballot id `{recorded}` differs from `{expected}`")]
    BallotId {
        /// Recorded id.
        recorded: String,
        /// Id of the input ballots.
        expected: String,
    },
    /// Contest / selection layout differs from the one of the input ballots.
    #[error("selection layout differs from the input ballots")]
    Layout,
    /// Recorded ratio ciphertext differs from the one derived from the input ballots.
    #[error("ratio ciphertext for `{selection}` differs from the input ballots")]
    RatioMismatch {
        /// Selection reference.
        selection: SelectionRef,
    },
}

/// Error verifying a [`BallotPep`](crate::pep::BallotPep). Contains all detected failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PepVerificationError {
    failures: Vec<VerificationFailure>,
}

impl PepVerificationError {
    pub(crate) fn from_failures(failures: Vec<VerificationFailure>) -> Result<(), Self> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self { failures })
        }
    }

    /// Returns all detected failures.
    pub fn failures(&self) -> &[VerificationFailure] {
        &self.failures
    }
}

impl fmt::Display for PepVerificationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "PEP verification failed: {}",
            DisplayList(&self.failures)
        )
    }
}

impl StdError for PepVerificationError {}

/// Error running the plaintext equivalence protocol.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PepError {
    /// Input ballots cannot be compared. Reported before contacting any trustee.
    #[error("ballots are not comparable: {0}")]
    StructuralMismatch(#[from] StructuralMismatch),
    /// The aggregated blinding is the group identity for some selections.
    #[error("blinding is degenerate for {}", DisplayList(.selections))]
    DegenerateBlinding {
        /// Affected selections.
        selections: Vec<SelectionRef>,
    },
    /// Blinding proofs do not verify for some selections.
    #[error("blinding proof verification failed for {}", DisplayList(.failures))]
    ProofVerification {
        /// Failures for all affected selections.
        failures: Vec<ProofFailure>,
    },
    /// Threshold decryption failed.
    #[error("threshold decryption failed: {0}")]
    Decryption(#[from] DecryptionError),
    /// The assembled result did not pass verification.
    #[error("assembled result did not pass verification: {0}")]
    FinalVerification(#[from] PepVerificationError),
    /// Communication with a blinding trustee failed.
    #[error("blinding trustee #{trustee} failed: {source}")]
    Transport {
        /// 0-based index of the trustee.
        trustee: usize,
        /// Transport error.
        source: TransportError,
    },
}
