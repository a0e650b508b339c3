//! Blinding trustees.

use futures::future::{self, BoxFuture, FutureExt};
use rand_chacha::ChaChaRng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::fmt;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use super::{
    BlindChallengeResponse, BlindRequest, BlindResponse, ChallengeRequest, RunId,
    TransportError, TrusteeNonces, TrusteeRejection,
};
use crate::{group::Group, SecretKey};

/// Party contributing a share of the blinding exponent for ratio ciphertexts.
///
/// The protocol runs in two rounds. In [`Self::blind()`], the trustee samples
/// nonces `ξ, u` for each ratio `(α, β)` and returns `([ξ]α, [ξ]β)` and `([u]α, [u]β)`.
/// In [`Self::challenge()`], it answers each challenge `c` with `u − c·ξ`. Both rounds
/// preserve the order of ciphertexts, and the challenge round must cover the same positions
/// as the blinding round for the same [`RunId`].
///
/// Methods return boxed futures, so that trustees can be remote.
pub trait BlindingTrustee<G: Group>: Send + Sync {
    /// Returns a human-readable trustee id used in logs.
    fn id(&self) -> &str;

    /// Blinds ratio ciphertexts (round 1).
    fn blind(
        &self,
        request: BlindRequest<G>,
    ) -> BoxFuture<'_, Result<Vec<BlindResponse<G>>, TransportError>>;

    /// Answers challenges (round 2).
    fn challenge(
        &self,
        request: ChallengeRequest<G>,
    ) -> BoxFuture<'_, Result<Vec<BlindChallengeResponse<G>>, TransportError>>;

    /// Drops nonces retained for an aborted `run`. Called by the coordinator if the run fails
    /// after [`Self::blind()`] was requested but before all challenges are answered.
    /// Releasing an unknown run is a no-op.
    fn release(&self, run: RunId) -> BoxFuture<'_, ()>;
}

/// Handling of trustee nonces between the protocol rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NonceMode {
    /// The trustee keeps nonces in memory, keyed by the run id. Nonces are dropped
    /// once the challenges for the run are answered.
    #[default]
    Retained,
    /// Nonces are sent to the coordinator in [`BlindResponse`]s and are echoed back
    /// in challenges. Only suitable if the coordinator is trusted with the nonces.
    Echoed,
}

type Nonces<G> = (SecretKey<G>, SecretKey<G>);

/// Nonces retained for a single run.
struct RetainedRun<G: Group> {
    nonces: Vec<Nonces<G>>,
    created: Instant,
}

/// In-process [`BlindingTrustee`] with a ChaCha-based CSPRNG.
///
/// In [`NonceMode::Retained`], nonces of a run are dropped once the run's challenges
/// are answered or the run is released. Runs abandoned without either (e.g., because
/// the coordinator future was dropped) are evicted when they exceed the retention period,
/// or when the number of retained runs reaches the capacity; the oldest runs go first.
pub struct LocalBlindingTrustee<G: Group> {
    id: String,
    mode: NonceMode,
    retention_period: Duration,
    max_retained_runs: usize,
    rng: Mutex<ChaChaRng>,
    retained: Mutex<HashMap<RunId, RetainedRun<G>>>,
}

impl<G: Group> fmt::Debug for LocalBlindingTrustee<G> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LocalBlindingTrustee")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("retention_period", &self.retention_period)
            .field("max_retained_runs", &self.max_retained_runs)
            .finish_non_exhaustive()
    }
}

impl<G: Group> LocalBlindingTrustee<G> {
    /// Default period after which retained nonces of an unfinished run are evicted.
    pub const DEFAULT_RETENTION_PERIOD: Duration = Duration::from_secs(600);
    /// Default maximum number of runs with retained nonces.
    pub const DEFAULT_MAX_RETAINED_RUNS: usize = 1_024;

    /// Creates a trustee with the CSPRNG seeded from `rng`.
    pub fn new<R: CryptoRng + RngCore>(id: impl Into<String>, rng: &mut R) -> Self {
        let mut seed = <ChaChaRng as SeedableRng>::Seed::default();
        rng.fill_bytes(&mut seed);
        Self::from_seed(id, seed)
    }

    /// Creates a trustee with a deterministic CSPRNG.
    pub fn from_seed(id: impl Into<String>, seed: [u8; 32]) -> Self {
        Self {
            id: id.into(),
            mode: NonceMode::default(),
            retention_period: Self::DEFAULT_RETENTION_PERIOD,
            max_retained_runs: Self::DEFAULT_MAX_RETAINED_RUNS,
            rng: Mutex::new(ChaChaRng::from_seed(seed)),
            retained: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the nonce handling mode.
    #[must_use]
    pub fn with_nonce_mode(mut self, mode: NonceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the period after which retained nonces of an unfinished run are evicted.
    #[must_use]
    pub fn with_retention_period(mut self, period: Duration) -> Self {
        self.retention_period = period;
        self
    }

    /// Sets the maximum number of runs with retained nonces. Values less than 1 are treated as 1.
    #[must_use]
    pub fn with_max_retained_runs(mut self, max_runs: usize) -> Self {
        self.max_retained_runs = max_runs.max(1);
        self
    }

    /// Returns the nonce handling mode.
    pub fn nonce_mode(&self) -> NonceMode {
        self.mode
    }

    /// Returns the number of runs for which the trustee retains nonces.
    pub fn retained_runs(&self) -> usize {
        self.retained
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn nonzero_nonce(rng: &mut ChaChaRng) -> SecretKey<G> {
        loop {
            let scalar = G::generate_scalar(rng);
            if scalar != G::Scalar::default() {
                return SecretKey::new(scalar);
            }
        }
    }

    /// Evicts expired runs, then the oldest runs until there is room for a new one.
    fn evict(&self, retained: &mut HashMap<RunId, RetainedRun<G>>) {
        let count = retained.len();
        retained.retain(|_, run| run.created.elapsed() < self.retention_period);
        while retained.len() >= self.max_retained_runs {
            let oldest = retained
                .iter()
                .min_by_key(|(_, run)| run.created)
                .map(|(&id, _)| id);
            match oldest {
                Some(id) => retained.remove(&id),
                None => break,
            };
        }

        let evicted = count - retained.len();
        if evicted > 0 {
            log::warn!(
                "trustee `{}` evicted nonces of {evicted} unfinished runs",
                self.id
            );
        }
    }

    fn blind_sync(
        &self,
        request: &BlindRequest<G>,
    ) -> Result<Vec<BlindResponse<G>>, TrusteeRejection> {
        let mut retained = self.retained.lock().unwrap_or_else(PoisonError::into_inner);
        if self.mode == NonceMode::Retained {
            if retained.contains_key(&request.run) {
                return Err(TrusteeRejection::DuplicateRun { run: request.run });
            }
            self.evict(&mut retained);
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let nonces: Vec<_> = request
            .ciphertexts
            .iter()
            .map(|_| (Self::nonzero_nonce(&mut rng), Self::nonzero_nonce(&mut rng)))
            .collect();
        drop(rng);

        let responses = request
            .ciphertexts
            .iter()
            .zip(&nonces)
            .map(|(&ratio, (eps, u))| BlindResponse {
                blinded: ratio * eps.expose_scalar(),
                commitments: ratio * u.expose_scalar(),
                nonces: match self.mode {
                    NonceMode::Retained => TrusteeNonces::Retained,
                    NonceMode::Echoed => TrusteeNonces::Echoed {
                        eps: eps.clone(),
                        u: u.clone(),
                    },
                },
            })
            .collect();

        if self.mode == NonceMode::Retained {
            let run = RetainedRun {
                nonces,
                created: Instant::now(),
            };
            retained.insert(request.run, run);
        }
        log::debug!(
            "trustee `{}` blinded {} ciphertexts for run {}",
            self.id,
            request.ciphertexts.len(),
            request.run
        );
        Ok(responses)
    }

    fn challenge_sync(
        &self,
        request: &ChallengeRequest<G>,
    ) -> Result<Vec<BlindChallengeResponse<G>>, TrusteeRejection> {
        let responses = match self.mode {
            NonceMode::Retained => {
                let nonces = self
                    .retained
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&request.run)
                    .ok_or(TrusteeRejection::UnknownRun { run: request.run })?
                    .nonces;
                if nonces.len() != request.challenges.len() {
                    return Err(TrusteeRejection::LengthMismatch {
                        expected: nonces.len(),
                        actual: request.challenges.len(),
                    });
                }

                let challenges = request.challenges.iter().zip(&nonces).enumerate();
                challenges
                    .map(|(position, (challenge, (eps, u)))| {
                        if matches!(challenge.nonces, TrusteeNonces::Retained) {
                            Ok(Self::respond(&challenge.challenge, eps, u))
                        } else {
                            Err(TrusteeRejection::UnexpectedNonces { position })
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }

            NonceMode::Echoed => request
                .challenges
                .iter()
                .enumerate()
                .map(|(position, challenge)| match &challenge.nonces {
                    TrusteeNonces::Echoed { eps, u } => {
                        Ok(Self::respond(&challenge.challenge, eps, u))
                    }
                    TrusteeNonces::Retained => Err(TrusteeRejection::UnexpectedNonces { position }),
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        log::debug!(
            "trustee `{}` answered {} challenges for run {}",
            self.id,
            responses.len(),
            request.run
        );
        Ok(responses)
    }

    fn release_sync(&self, run: RunId) {
        let released = self
            .retained
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&run);
        if released.is_some() {
            log::debug!("trustee `{}` released nonces for run {run}", self.id);
        }
    }

    fn respond(
        challenge: &G::Scalar,
        eps: &SecretKey<G>,
        u: &SecretKey<G>,
    ) -> BlindChallengeResponse<G> {
        BlindChallengeResponse {
            response: *u.expose_scalar() - *challenge * *eps.expose_scalar(),
        }
    }
}

impl<G: Group> BlindingTrustee<G> for LocalBlindingTrustee<G> {
    fn id(&self) -> &str {
        &self.id
    }

    fn blind(
        &self,
        request: BlindRequest<G>,
    ) -> BoxFuture<'_, Result<Vec<BlindResponse<G>>, TransportError>> {
        let result = self.blind_sync(&request).map_err(TransportError::from);
        future::ready(result).boxed()
    }

    fn challenge(
        &self,
        request: ChallengeRequest<G>,
    ) -> BoxFuture<'_, Result<Vec<BlindChallengeResponse<G>>, TransportError>> {
        let result = self.challenge_sync(&request).map_err(TransportError::from);
        future::ready(result).boxed()
    }

    fn release(&self, run: RunId) -> BoxFuture<'_, ()> {
        self.release_sync(run);
        future::ready(()).boxed()
    }
}
