//! Coordinator driving the plaintext equivalence protocol.

use futures::{
    future,
    stream::{self, StreamExt},
};
use log::{debug, info, warn};
use rand_core::{CryptoRng, RngCore};

use core::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};
use std::{sync::Arc, time::Instant};

use super::{
    BallotPep, BlindChallenge, BlindChallengeResponse, BlindRequest, BlindResponse,
    BlindingTrustee, ChallengeRequest, ContestPep, DecryptionError, DecryptionProof,
    EncryptedBallot, NoopMetrics, PepConfig, PepError, PepMetrics, PepStep, PepVerifier,
    ProofFailure, RatioBallot, RunId, RunOutcome, SelectionPep, ThresholdDecryptor,
    TransportError,
};
use crate::{
    group::Group,
    proofs::{blinding_challenge, expected_commitments},
    BlindingProof, Ciphertext, ElectionContext,
};

/// Sum of the blinding contributions of all trustees for a single selection.
#[derive(Debug, Clone, Copy)]
struct BlindingAggregate<G: Group> {
    ratio: Ciphertext<G>,
    /// `(A, B) = (Σ A_j, Σ B_j)`.
    blinded: Ciphertext<G>,
    /// `(a, b) = (Σ a_j, Σ b_j)`.
    commitments: Ciphertext<G>,
}

impl<G: Group> BlindingAggregate<G> {
    fn new(ratio: Ciphertext<G>, contributions: &[BlindResponse<G>]) -> Self {
        let empty = Self {
            ratio,
            blinded: Ciphertext::zero(),
            commitments: Ciphertext::zero(),
        };
        contributions.iter().fold(empty, |acc, contribution| Self {
            blinded: acc.blinded + contribution.blinded,
            commitments: acc.commitments + contribution.commitments,
            ..acc
        })
    }

    fn is_degenerate(&self) -> bool {
        G::is_identity(&self.blinded.random_element) || G::is_identity(&self.blinded.blinded_element)
    }

    fn challenge(&self, context: &ElectionContext<G>) -> G::Scalar {
        let commitments = (
            self.commitments.random_element,
            self.commitments.blinded_element,
        );
        blinding_challenge(context, &self.ratio, &self.blinded, commitments)
    }

    /// Checks `a == [v]α + [c]A` and `b == [v]β + [c]B` for the given blinded ciphertext
    /// and commitments, which may be either aggregated or contributed by a single trustee.
    fn check_response(
        &self,
        blinded: &Ciphertext<G>,
        commitments: &Ciphertext<G>,
        challenge: &G::Scalar,
        response: &G::Scalar,
    ) -> bool {
        let (a, b) = expected_commitments(&self.ratio, blinded, challenge, response);
        a == commitments.random_element && b == commitments.blinded_element
    }
}

/// Intermediate results of the two blinding rounds, indexed by selection.
struct BlindingRounds<G: Group> {
    contributions: Vec<Vec<BlindResponse<G>>>,
    aggregates: Vec<BlindingAggregate<G>>,
    challenges: Vec<G::Scalar>,
    responses: Vec<Vec<BlindChallengeResponse<G>>>,
}

/// Converts a `rows × columns` matrix into a `columns × rows` one.
fn transpose<T>(rows: Vec<Vec<T>>, columns: usize) -> Vec<Vec<T>> {
    let row_count = rows.len();
    let mut transposed: Vec<Vec<T>> = (0..columns)
        .map(|_| Vec::with_capacity(row_count))
        .collect();
    for row in rows {
        for (column, item) in transposed.iter_mut().zip(row) {
            column.push(item);
        }
    }
    transposed
}

/// Coordinator of the plaintext equivalence protocol.
///
/// The coordinator holds the [`ElectionContext`], handles to [`BlindingTrustee`]s,
/// a [`ThresholdDecryptor`] and optional [`PepMetrics`]. A single coordinator can drive
/// many runs concurrently; each run gets a unique [`RunId`].
///
/// # Protocol
///
/// For a pair of ballots, [`Self::run()`]:
///
/// 0. Computes the [`RatioBallot`]; structurally incompatible ballots are rejected before
///    any trustee is contacted.
/// 1. Asks all trustees to blind the ratios (concurrently, each call under
///    [`PepConfig::trustee_timeout()`]).
/// 2. Sums the contributions into `(A, B, a, b)` per selection. Identity `A` or `B`
///    is rejected as degenerate.
/// 3. Derives the challenge `c` for each selection.
/// 4. Asks all trustees to respond to the challenges. If the run fails before this step
///    completes, all trustees are asked to [release](BlindingTrustee::release()) nonces
///    retained for the run.
/// 5. Sums responses into `v` and checks `a == [v]α + [c]A`, `b == [v]β + [c]B`.
///    If the aggregated check fails, contributions of individual trustees are checked
///    in order to isolate the faulty ones.
/// 6. Decrypts `(A, B)` via the decryptor; ballots are equal iff all decryptions
///    are the identity.
/// 7. Verifies the assembled [`BallotPep`] with [`PepVerifier`].
pub struct PepCoordinator<G: Group> {
    context: ElectionContext<G>,
    trustees: Vec<Arc<dyn BlindingTrustee<G>>>,
    decryptor: Arc<dyn ThresholdDecryptor<G>>,
    metrics: Arc<dyn PepMetrics>,
    config: PepConfig,
    instance: [u8; 16],
    next_run: AtomicU64,
}

impl<G: Group> fmt::Debug for PepCoordinator<G> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trustees: Vec<_> = self.trustees.iter().map(|trustee| trustee.id()).collect();
        formatter
            .debug_struct("PepCoordinator")
            .field("trustees", &trustees)
            .field("config", &self.config)
            .field("next_run", &self.next_run)
            .finish_non_exhaustive()
    }
}

impl<G: Group> PepCoordinator<G> {
    /// Creates a coordinator without trustees. The coordinator instance id (a part
    /// of every [`RunId`]) is sampled from `rng`.
    pub fn new<D, R>(context: ElectionContext<G>, decryptor: Arc<D>, rng: &mut R) -> Self
    where
        D: ThresholdDecryptor<G> + 'static,
        R: CryptoRng + RngCore,
    {
        let mut instance = [0_u8; 16];
        rng.fill_bytes(&mut instance);
        Self {
            context,
            trustees: Vec::new(),
            decryptor,
            metrics: Arc::new(NoopMetrics),
            config: PepConfig::default(),
            instance,
            next_run: AtomicU64::new(0),
        }
    }

    /// Adds a blinding trustee.
    #[must_use]
    pub fn with_trustee<T: BlindingTrustee<G> + 'static>(mut self, trustee: Arc<T>) -> Self {
        self.trustees.push(trustee);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: PepConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the metrics receiver.
    #[must_use]
    pub fn with_metrics<M: PepMetrics + 'static>(mut self, metrics: Arc<M>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Returns the election context.
    pub fn context(&self) -> &ElectionContext<G> {
        &self.context
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PepConfig {
        &self.config
    }

    /// Returns the number of blinding trustees.
    pub fn trustee_count(&self) -> usize {
        self.trustees.len()
    }

    fn next_run_id(&self) -> RunId {
        RunId::new(self.instance, self.next_run.fetch_add(1, Ordering::Relaxed))
    }

    fn finish_step(&self, step: PepStep, started: &mut Instant) {
        self.metrics.step_completed(step, started.elapsed());
        *started = Instant::now();
    }

    /// Proves that `first` and `second` encrypt the same votes, or that they differ.
    ///
    /// # Errors
    ///
    /// Returns an error if the ballots are structurally incompatible, if a trustee
    /// or the decryptor fails, or if the produced proofs do not verify. A successful result
    /// is always verified with [`PepVerifier`].
    pub async fn run(
        &self,
        first: &EncryptedBallot<G>,
        second: &EncryptedBallot<G>,
    ) -> Result<BallotPep<G>, PepError> {
        let run = self.next_run_id();
        let started = Instant::now();
        let result = self.run_steps(run, first, second).await;
        let elapsed = started.elapsed();

        let outcome = match &result {
            Ok(pep) if pep.is_equal => RunOutcome::Equal,
            Ok(_) => RunOutcome::NotEqual,
            Err(_) => RunOutcome::Failed,
        };
        self.metrics.run_finished(outcome, elapsed);
        match &result {
            Ok(pep) => info!(
                "ballot `{}`, run {run}: finished in {elapsed:?}, ballots are {}",
                pep.ballot_id,
                if pep.is_equal { "equal" } else { "not equal" }
            ),
            Err(err) => warn!("ballot `{}`, run {run}: failed: {err}", first.ballot_id),
        }
        result
    }

    /// Executes [`Self::run()`] for each pair of ballots. At most
    /// [`PepConfig::max_concurrent_runs()`] runs are in progress at any time.
    /// Results are returned in the order of `pairs`.
    pub async fn run_many<'a, I>(&'a self, pairs: I) -> Vec<Result<BallotPep<G>, PepError>>
    where
        I: IntoIterator<Item = (&'a EncryptedBallot<G>, &'a EncryptedBallot<G>)>,
    {
        stream::iter(pairs)
            .map(|(first, second)| self.run(first, second))
            .buffered(self.config.max_concurrent_runs())
            .collect()
            .await
    }

    async fn run_steps(
        &self,
        run: RunId,
        first: &EncryptedBallot<G>,
        second: &EncryptedBallot<G>,
    ) -> Result<BallotPep<G>, PepError> {
        let mut step_start = Instant::now();
        let ratio = RatioBallot::new(first, second)?;
        debug!(
            "ballot `{}`, run {run}: computed {} ratio ciphertexts",
            ratio.ballot_id(),
            ratio.len()
        );
        self.finish_step(PepStep::Ratio, &mut step_start);

        let rounds = match self.blinding_rounds(run, &ratio, &mut step_start).await {
            Ok(rounds) => rounds,
            Err(err) => {
                self.release(run).await;
                return Err(err);
            }
        };

        let proofs = Self::verify_responses(
            &ratio,
            &rounds.aggregates,
            &rounds.contributions,
            &rounds.challenges,
            &rounds.responses,
        )?;
        debug!(
            "ballot `{}`, run {run}: verified blinding proofs",
            ratio.ballot_id()
        );
        self.finish_step(PepStep::Verify, &mut step_start);

        let blinded: Vec<_> = rounds
            .aggregates
            .iter()
            .map(|aggregate| aggregate.blinded)
            .collect();
        let decryptions = self.decrypt(&blinded).await?;
        debug!(
            "ballot `{}`, run {run}: decrypted blinded ciphertexts",
            ratio.ballot_id()
        );
        self.finish_step(PepStep::Decrypt, &mut step_start);

        let pep = Self::assemble(&ratio, &rounds.aggregates, proofs, decryptions);
        PepVerifier::verify(&self.context, &pep).map_err(|err| {
            warn!(
                "ballot `{}`, run {run}: assembled result failed verification: {err}",
                pep.ballot_id
            );
            err
        })?;
        self.finish_step(PepStep::SelfVerify, &mut step_start);
        Ok(pep)
    }

    /// Executes steps 1 to 4: blinding, aggregation, challenges and responses.
    /// Once this succeeds, every trustee has consumed its nonces for `run`.
    async fn blinding_rounds(
        &self,
        run: RunId,
        ratio: &RatioBallot<G>,
        step_start: &mut Instant,
    ) -> Result<BlindingRounds<G>, PepError> {
        let ntexts = ratio.len();
        let ciphertexts: Vec<_> = ratio.ciphertexts().collect();
        let contributions = self.blind(run, &ciphertexts).await?;
        let contributions = transpose(contributions, ntexts);
        debug!(
            "ballot `{}`, run {run}: received blinding from {} trustees",
            ratio.ballot_id(),
            self.trustees.len()
        );
        self.finish_step(PepStep::Blind, step_start);

        let aggregates: Vec<_> = ciphertexts
            .iter()
            .zip(&contributions)
            .map(|(&ciphertext, contributions)| BlindingAggregate::new(ciphertext, contributions))
            .collect();
        let degenerate: Vec<_> = ratio
            .selections()
            .iter()
            .zip(&aggregates)
            .filter(|(_, aggregate)| aggregate.is_degenerate())
            .map(|(selection, _)| selection.reference().clone())
            .collect();
        if !degenerate.is_empty() {
            warn!(
                "ballot `{}`, run {run}: degenerate blinding for {} selections",
                ratio.ballot_id(),
                degenerate.len()
            );
            return Err(PepError::DegenerateBlinding {
                selections: degenerate,
            });
        }
        self.finish_step(PepStep::Aggregate, step_start);

        let challenges: Vec<_> = aggregates
            .iter()
            .map(|aggregate| aggregate.challenge(&self.context))
            .collect();
        debug!(
            "ballot `{}`, run {run}: derived challenges",
            ratio.ballot_id()
        );
        self.finish_step(PepStep::Challenge, step_start);

        let responses = self.respond(run, &contributions, &challenges).await?;
        let responses = transpose(responses, ntexts);
        self.finish_step(PepStep::Respond, step_start);

        Ok(BlindingRounds {
            contributions,
            aggregates,
            challenges,
            responses,
        })
    }

    /// Asks all trustees to drop nonces retained for an aborted `run`. Failures are logged
    /// and otherwise ignored.
    async fn release(&self, run: RunId) {
        let timeout = self.config.trustee_timeout();
        let calls = self.trustees.iter().enumerate().map(|(index, trustee)| async move {
            if tokio::time::timeout(timeout, trustee.release(run)).await.is_err() {
                warn!(
                    "blinding trustee #{index} (`{}`) did not release run {run} within {timeout:?}",
                    trustee.id()
                );
            }
        });
        future::join_all(calls).await;
        debug!("run {run}: asked {} trustees to release nonces", self.trustees.len());
    }

    async fn call_trustee<T>(
        &self,
        index: usize,
        call: future::BoxFuture<'_, Result<Vec<T>, TransportError>>,
        expected_len: usize,
    ) -> Result<Vec<T>, PepError> {
        let timeout = self.config.trustee_timeout();
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(responses)) if responses.len() == expected_len => Ok(responses),
            Ok(Ok(responses)) => Err(TransportError::ResponseLength {
                expected: expected_len,
                actual: responses.len(),
            }),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(TransportError::Timeout { timeout }),
        };

        result.map_err(|source| {
            warn!(
                "blinding trustee #{index} (`{}`) failed: {source}",
                self.trustees[index].id()
            );
            PepError::Transport {
                trustee: index,
                source,
            }
        })
    }

    /// Collects blinding contributions; the result is indexed by trustee, then by selection.
    async fn blind(
        &self,
        run: RunId,
        ciphertexts: &[Ciphertext<G>],
    ) -> Result<Vec<Vec<BlindResponse<G>>>, PepError> {
        let calls = self.trustees.iter().enumerate().map(|(index, trustee)| {
            let request = BlindRequest {
                run,
                ciphertexts: ciphertexts.to_vec(),
            };
            self.call_trustee(index, trustee.blind(request), ciphertexts.len())
        });
        future::try_join_all(calls).await
    }

    /// Collects challenge responses; the result is indexed by trustee, then by selection.
    async fn respond(
        &self,
        run: RunId,
        contributions: &[Vec<BlindResponse<G>>],
        challenges: &[G::Scalar],
    ) -> Result<Vec<Vec<BlindChallengeResponse<G>>>, PepError> {
        let calls = self.trustees.iter().enumerate().map(|(index, trustee)| {
            let trustee_challenges = contributions
                .iter()
                .zip(challenges)
                .map(|(selection_contributions, &challenge)| BlindChallenge {
                    challenge,
                    nonces: selection_contributions[index].nonces.clone(),
                })
                .collect();
            let request = ChallengeRequest {
                run,
                challenges: trustee_challenges,
            };
            self.call_trustee(index, trustee.challenge(request), contributions.len())
        });
        future::try_join_all(calls).await
    }

    fn verify_responses(
        ratio: &RatioBallot<G>,
        aggregates: &[BlindingAggregate<G>],
        contributions: &[Vec<BlindResponse<G>>],
        challenges: &[G::Scalar],
        responses: &[Vec<BlindChallengeResponse<G>>],
    ) -> Result<Vec<BlindingProof<G>>, PepError> {
        let mut proofs = Vec::with_capacity(aggregates.len());
        let mut failures = vec![];
        let selections = ratio.selections().iter().zip(aggregates);
        for (i, (selection, aggregate)) in selections.enumerate() {
            let challenge = &challenges[i];
            let response = responses[i]
                .iter()
                .fold(G::Scalar::default(), |acc, response| acc + response.response);
            if aggregate.check_response(
                &aggregate.blinded,
                &aggregate.commitments,
                challenge,
                &response,
            ) {
                proofs.push(BlindingProof::new(*challenge, response));
                continue;
            }

            let trustees: Vec<_> = contributions[i]
                .iter()
                .zip(&responses[i])
                .enumerate()
                .filter_map(|(j, (contribution, response))| {
                    let is_valid = aggregate.check_response(
                        &contribution.blinded,
                        &contribution.commitments,
                        challenge,
                        &response.response,
                    );
                    (!is_valid).then_some(j)
                })
                .collect();
            warn!(
                "blinding proof for `{}` does not verify; faulty trustees: {trustees:?}",
                selection.reference()
            );
            failures.push(ProofFailure {
                selection: selection.reference().clone(),
                trustees,
            });
        }

        if failures.is_empty() {
            Ok(proofs)
        } else {
            Err(PepError::ProofVerification { failures })
        }
    }

    async fn decrypt(
        &self,
        blinded: &[Ciphertext<G>],
    ) -> Result<Vec<(G::Element, DecryptionProof<G>)>, PepError> {
        let decryptions = self
            .decryptor
            .decrypt(&self.context, blinded)
            .await
            .map_err(|err| {
                warn!("threshold decryption failed: {err}");
                err
            })?;
        if decryptions.len() == blinded.len() {
            Ok(decryptions)
        } else {
            let err = DecryptionError::ResponseLength {
                expected: blinded.len(),
                actual: decryptions.len(),
            };
            warn!("threshold decryption failed: {err}");
            Err(err.into())
        }
    }

    fn assemble(
        ratio: &RatioBallot<G>,
        aggregates: &[BlindingAggregate<G>],
        proofs: Vec<BlindingProof<G>>,
        decryptions: Vec<(G::Element, DecryptionProof<G>)>,
    ) -> BallotPep<G> {
        let is_equal = decryptions.iter().all(|(t, _)| G::is_identity(t));
        let mut selections = ratio
            .selections()
            .iter()
            .zip(aggregates)
            .zip(proofs)
            .zip(decryptions)
            .map(|(((selection, aggregate), blinding_proof), (t, decryption_proof))| {
                SelectionPep {
                    selection_id: selection.reference().selection_id().to_owned(),
                    ciphertext_ratio: aggregate.ratio,
                    ciphertext_ab: aggregate.blinded,
                    blinding_proof,
                    t,
                    decryption_proof,
                }
            });

        let contests = ratio
            .contests()
            .iter()
            .map(|layout| ContestPep {
                contest_id: layout.contest_id().to_owned(),
                selections: selections.by_ref().take(layout.range().len()).collect(),
            })
            .collect();
        BallotPep {
            ballot_id: ratio.ballot_id().to_owned(),
            is_equal,
            contests,
        }
    }
}
