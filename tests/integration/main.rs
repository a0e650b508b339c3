//! Integration tests for the plaintext equivalence protocol, generic over the `Group`
//! implementation where possible.

use futures::future::{BoxFuture, FutureExt};
use rand_chacha::ChaChaRng;
use rand_core::{CryptoRng, RngCore, SeedableRng};
use subtle::ConstantTimeEq;

use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use electionguard_pep::{
    group::Group,
    pep::{
        BlindChallengeResponse, BlindRequest, BlindResponse, BlindingTrustee, ChallengeRequest,
        EncryptedBallot, EncryptedContest, EncryptedSelection, GuardianDecryptor,
        LocalBlindingTrustee, PepCoordinator, RunId, TransportError,
    },
    sharing::{ActiveParticipant, Dealer, Params, PublicKeySet},
    ElectionContext,
};

mod pep;
mod sharing;

pub fn assert_ct_eq<T: ConstantTimeEq + fmt::Debug>(x: &T, y: &T) {
    assert!(
        bool::from(x.ct_eq(y)),
        "Values are not equal: {:?}, {:?}",
        x,
        y
    );
}

/// Votes for a single contest: the contest id and `(selection_id, vote)` pairs.
pub type ContestVotes<'a> = (&'a str, &'a [(&'a str, u64)]);

/// Election with provisioned guardians.
pub struct Rig<G: Group> {
    pub context: ElectionContext<G>,
    pub guardians: Vec<ActiveParticipant<G>>,
}

impl<G: Group> Rig<G> {
    pub fn new(params: Params, rng: &mut (impl RngCore + CryptoRng)) -> Self {
        let dealer = Dealer::<G>::new(params, rng);
        let key_set = PublicKeySet::new(params, dealer.public_info()).unwrap();
        let guardians = (0..params.shares)
            .map(|i| {
                ActiveParticipant::new(key_set.clone(), i, dealer.secret_share_for_participant(i))
                    .unwrap()
            })
            .collect();

        Self {
            context: ElectionContext::new(b"integration-test-election", key_set),
            guardians,
        }
    }

    /// Creates a decryptor with the first `available` guardians.
    pub fn decryptor(
        &self,
        available: usize,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> GuardianDecryptor<G> {
        GuardianDecryptor::new(self.guardians[..available].to_vec(), rng)
    }

    /// Creates a coordinator with all guardians available and the specified trustees.
    pub fn coordinator<T: BlindingTrustee<G> + 'static>(
        &self,
        trustees: impl IntoIterator<Item = Arc<T>>,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> PepCoordinator<G> {
        let decryptor = self.decryptor(self.guardians.len(), rng);
        let coordinator = PepCoordinator::new(self.context.clone(), Arc::new(decryptor), rng);
        trustees
            .into_iter()
            .fold(coordinator, |coordinator, trustee| coordinator.with_trustee(trustee))
    }

    pub fn ballot(
        &self,
        ballot_id: &str,
        contests: &[ContestVotes<'_>],
        rng: &mut (impl RngCore + CryptoRng),
    ) -> EncryptedBallot<G> {
        let joint_key = self.context.joint_key();
        let contests = contests
            .iter()
            .map(|&(contest_id, votes)| {
                let selections = votes
                    .iter()
                    .map(|&(selection_id, vote)| {
                        EncryptedSelection::new(selection_id, joint_key.encrypt(vote, rng))
                    })
                    .collect();
                EncryptedContest::new(contest_id, selections)
            })
            .collect();
        EncryptedBallot::new(ballot_id, contests)
    }
}

pub fn seeded_rng(seed: u8) -> ChaChaRng {
    ChaChaRng::from_seed([seed; 32])
}

pub fn local_trustees<G: Group>(count: usize, seed: u8) -> Vec<Arc<LocalBlindingTrustee<G>>> {
    (0..count)
        .map(|i| {
            let seed = [seed.wrapping_add(i as u8); 32];
            Arc::new(LocalBlindingTrustee::from_seed(format!("trustee-{i}"), seed))
        })
        .collect()
}

/// Misbehavior injected by [`FaultyTrustee`].
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Behave honestly.
    None,
    /// Add one to the challenge response at the specified position.
    TamperResponse { position: usize },
    /// Delay each blinding response.
    Delay(Duration),
    /// Drop the last blinding response.
    TruncateBlinding,
    /// Shift the blinding commitments `(a_j, b_j)` at the specified position.
    TamperCommitment { position: usize },
}

/// Wrapper around [`LocalBlindingTrustee`] injecting faults and counting calls.
pub struct FaultyTrustee<G: Group> {
    inner: LocalBlindingTrustee<G>,
    fault: Fault,
    calls: AtomicUsize,
}

impl<G: Group> FaultyTrustee<G> {
    pub fn new(inner: LocalBlindingTrustee<G>, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &LocalBlindingTrustee<G> {
        &self.inner
    }
}

impl<G: Group> BlindingTrustee<G> for FaultyTrustee<G> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn blind(
        &self,
        request: BlindRequest<G>,
    ) -> BoxFuture<'_, Result<Vec<BlindResponse<G>>, TransportError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fault = self.fault;
        let responses = self.inner.blind(request);
        async move {
            let mut responses = responses.await?;
            match fault {
                Fault::Delay(delay) => tokio::time::sleep(delay).await,
                Fault::TruncateBlinding => {
                    responses.pop();
                }
                Fault::TamperCommitment { position } => {
                    let response = &mut responses[position];
                    response.commitments = response.commitments + response.blinded;
                }
                Fault::None | Fault::TamperResponse { .. } => {}
            }
            Ok(responses)
        }
        .boxed()
    }

    fn challenge(
        &self,
        request: ChallengeRequest<G>,
    ) -> BoxFuture<'_, Result<Vec<BlindChallengeResponse<G>>, TransportError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fault = self.fault;
        let responses = self.inner.challenge(request);
        async move {
            let mut responses = responses.await?;
            if let Fault::TamperResponse { position } = fault {
                responses[position].response = responses[position].response + G::Scalar::from(1_u64);
            }
            Ok(responses)
        }
        .boxed()
    }

    fn release(&self, run: RunId) -> BoxFuture<'_, ()> {
        self.inner.release(run)
    }
}
