//! Metrics hooks for protocol runs.

use core::{fmt, time::Duration};

/// Step of a protocol run reported to [`PepMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PepStep {
    /// Computing the ratio ballot.
    Ratio,
    /// Collecting blinding contributions from trustees.
    Blind,
    /// Aggregating blinding contributions.
    Aggregate,
    /// Deriving challenges.
    Challenge,
    /// Collecting challenge responses from trustees.
    Respond,
    /// Verifying blinding proofs.
    Verify,
    /// Threshold decryption.
    Decrypt,
    /// Verifying the assembled result.
    SelfVerify,
}

impl PepStep {
    /// Returns a short name of the step usable as a metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ratio => "ratio",
            Self::Blind => "blind",
            Self::Aggregate => "aggregate",
            Self::Challenge => "challenge",
            Self::Respond => "respond",
            Self::Verify => "verify",
            Self::Decrypt => "decrypt",
            Self::SelfVerify => "self_verify",
        }
    }
}

impl fmt::Display for PepStep {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Outcome of a protocol run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// Ballots were proven to be equal.
    Equal,
    /// Ballots were proven to differ.
    NotEqual,
    /// The run failed.
    Failed,
}

/// Receiver of timing information from the [`PepCoordinator`](crate::pep::PepCoordinator).
///
/// All methods have no-op default implementations.
pub trait PepMetrics: Send + Sync {
    /// Called after a protocol step has completed successfully.
    fn step_completed(&self, step: PepStep, elapsed: Duration) {
        let _ = (step, elapsed);
    }

    /// Called once per run, after the run has finished.
    fn run_finished(&self, outcome: RunOutcome, elapsed: Duration) {
        let _ = (outcome, elapsed);
    }
}

/// [`PepMetrics`] implementation that discards all data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl PepMetrics for NoopMetrics {}
