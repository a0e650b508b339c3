//! Tests for the plaintext equivalence protocol.

use futures::future::{BoxFuture, FutureExt};
use rand::thread_rng;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{local_trustees, seeded_rng, Fault, FaultyTrustee, Rig};
use electionguard_pep::{
    group::{Curve25519Subgroup, ElementOps, Group, Ristretto},
    pep::{
        BallotPep, DecryptionError, DecryptionProof, EncryptedBallot, GuardianDecryptor,
        LocalBlindingTrustee, NonceMode, PepConfig, PepCoordinator, PepError, PepMetrics,
        PepStep, PepVerifier, ProofFailure, RunOutcome, SelectionRef, StructuralMismatch,
        ThresholdDecryptor, TransportError, VerificationFailure,
    },
    sharing::Params,
    Ciphertext, ElectionContext, VerificationError,
};

const MAYOR: &str = "mayor";
const PROPOSITION: &str = "prop-1";

fn worked_example_rig<G: Group>() -> Rig<G> {
    Rig::new(Params::new(4, 3), &mut thread_rng())
}

fn two_contest_ballot<G: Group>(
    rig: &Rig<G>,
    votes: [u64; 3],
) -> EncryptedBallot<G> {
    rig.ballot(
        "ballot-42",
        &[
            (MAYOR, &[("alice", votes[0]), ("bob", votes[1])]),
            (PROPOSITION, &[("yes", votes[2])]),
        ],
        &mut thread_rng(),
    )
}

async fn test_worked_example<G: Group>() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<G>();
    let trustees = local_trustees::<G>(3, 0);
    let coordinator = rig.coordinator(trustees.iter().cloned(), &mut rng);

    let first = rig.ballot("b", &[(MAYOR, &[("alice", 1)])], &mut rng);
    let same = rig.ballot("b", &[(MAYOR, &[("alice", 1)])], &mut rng);
    let other = rig.ballot("b", &[(MAYOR, &[("alice", 0)])], &mut rng);

    let pep = coordinator.run(&first, &same).await.unwrap();
    assert!(pep.is_equal);
    assert_eq!(pep.ballot_id, "b");
    assert_eq!(pep.contests.len(), 1);
    assert_eq!(pep.contests[0].contest_id, MAYOR);
    let selection = &pep.contests[0].selections[0];
    assert_eq!(selection.selection_id, "alice");
    assert!(G::is_identity(&selection.t));
    assert_eq!(selection.decryption_proof.shares.len(), 3);
    PepVerifier::verify(&rig.context, &pep).unwrap();
    PepVerifier::verify_against_ballots(&rig.context, &pep, &first, &same).unwrap();

    let pep = coordinator.run(&first, &other).await.unwrap();
    assert!(!pep.is_equal);
    assert!(!G::is_identity(&pep.contests[0].selections[0].t));
    PepVerifier::verify(&rig.context, &pep).unwrap();

    for trustee in &trustees {
        assert_eq!(trustee.retained_runs(), 0);
    }
}

#[tokio::test]
async fn worked_example_with_ristretto() {
    test_worked_example::<Ristretto>().await;
}

#[tokio::test]
async fn worked_example_with_curve25519() {
    test_worked_example::<Curve25519Subgroup>().await;
}

#[tokio::test]
async fn decryption_below_quorum_fails() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let decryptor = rig.decryptor(2, &mut rng);
    let coordinator = local_trustees::<Ristretto>(3, 0).into_iter().fold(
        PepCoordinator::new(rig.context.clone(), Arc::new(decryptor), &mut rng),
        |coordinator, trustee| coordinator.with_trustee(trustee),
    );

    let first = rig.ballot("b", &[(MAYOR, &[("alice", 1)])], &mut rng);
    let second = rig.ballot("b", &[(MAYOR, &[("alice", 1)])], &mut rng);
    let err = coordinator.run(&first, &second).await.unwrap_err();
    assert!(
        matches!(
            err,
            PepError::Decryption(DecryptionError::NotEnoughGuardians {
                available: 2,
                threshold: 3,
            })
        ),
        "{err:?}"
    );
}

#[tokio::test]
async fn multiple_contests_are_compared() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let coordinator = rig.coordinator(local_trustees::<Ristretto>(2, 10), &mut rng);

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [1, 0, 1]);
    let pep = coordinator.run(&first, &second).await.unwrap();
    assert!(pep.is_equal);
    assert_eq!(pep.selection_count(), 3);
    let refs: Vec<_> = pep.selections().map(|(reference, _)| reference.to_string()).collect();
    assert_eq!(refs, ["mayor#alice", "mayor#bob", "prop-1#yes"]);

    let third = two_contest_ballot(&rig, [1, 0, 0]);
    let pep = coordinator.run(&first, &third).await.unwrap();
    assert!(!pep.is_equal);
    let differing: Vec<_> = pep
        .selections()
        .filter(|(_, selection)| !Ristretto::is_identity(&selection.t))
        .map(|(reference, _)| reference.to_string())
        .collect();
    assert_eq!(differing, ["prop-1#yes"]);
}

#[tokio::test]
async fn reordered_selections_are_realigned() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let coordinator = rig.coordinator(local_trustees::<Ristretto>(2, 20), &mut rng);

    let first = two_contest_ballot(&rig, [0, 1, 1]);
    let reordered = rig.ballot(
        "ballot-42",
        &[
            (PROPOSITION, &[("yes", 1)]),
            (MAYOR, &[("bob", 1), ("alice", 0)]),
        ],
        &mut rng,
    );
    let pep = coordinator.run(&first, &reordered).await.unwrap();
    assert!(pep.is_equal);
    assert_eq!(pep.contests[0].contest_id, MAYOR);
    assert_eq!(pep.contests[0].selections[0].selection_id, "alice");
    PepVerifier::verify_against_ballots(&rig.context, &pep, &first, &reordered).unwrap();
}

#[tokio::test]
async fn structural_mismatch_is_detected_before_contacting_trustees() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let trustee = Arc::new(FaultyTrustee::new(
        LocalBlindingTrustee::new("t", &mut rng),
        Fault::None,
    ));
    let coordinator = rig.coordinator([trustee.clone()], &mut rng);

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = rig.ballot("ballot-42", &[(MAYOR, &[("alice", 1), ("bob", 0)])], &mut rng);
    let err = coordinator.run(&first, &second).await.unwrap_err();
    assert!(
        matches!(
            err,
            PepError::StructuralMismatch(StructuralMismatch::ContestCount {
                first: 2,
                second: 1
            })
        ),
        "{err:?}"
    );

    let renamed = rig.ballot(
        "other-ballot",
        &[(MAYOR, &[("alice", 1), ("bob", 0)]), (PROPOSITION, &[("yes", 1)])],
        &mut rng,
    );
    let err = coordinator.run(&first, &renamed).await.unwrap_err();
    assert!(
        matches!(
            err,
            PepError::StructuralMismatch(StructuralMismatch::BallotId { .. })
        ),
        "{err:?}"
    );
    assert_eq!(trustee.calls(), 0);
}

#[tokio::test]
async fn tampering_trustee_is_isolated() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let honest = local_trustees::<Ristretto>(2, 30);
    let faulty = Arc::new(FaultyTrustee::new(
        LocalBlindingTrustee::from_seed("faulty", [33; 32]),
        Fault::TamperResponse { position: 1 },
    ));
    let coordinator = rig
        .coordinator(honest.iter().cloned(), &mut rng)
        .with_trustee(faulty.clone());

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [1, 0, 1]);
    let err = coordinator.run(&first, &second).await.unwrap_err();
    let PepError::ProofVerification { failures } = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].selection.to_string(), "mayor#bob");
    assert_eq!(failures[0].trustees, [2]);

    // All trustees have consumed their nonces.
    assert_eq!(faulty.inner().retained_runs(), 0);
    for trustee in &honest {
        assert_eq!(trustee.retained_runs(), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn slow_trustee_times_out() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let slow = Arc::new(FaultyTrustee::new(
        LocalBlindingTrustee::new("slow", &mut rng),
        Fault::Delay(Duration::from_secs(60)),
    ));
    let honest = local_trustees::<Ristretto>(1, 40);
    let config = PepConfig::default().with_trustee_timeout(Duration::from_secs(1));
    let coordinator = rig
        .coordinator(honest.iter().cloned(), &mut rng)
        .with_trustee(slow.clone())
        .with_config(config);

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [1, 0, 1]);
    let err = coordinator.run(&first, &second).await.unwrap_err();
    assert!(
        matches!(
            err,
            PepError::Transport {
                trustee: 1,
                source: TransportError::Timeout { timeout },
            } if timeout == Duration::from_secs(1)
        ),
        "{err:?}"
    );
    assert_eq!(honest[0].retained_runs(), 0);
    assert_eq!(slow.inner().retained_runs(), 0);
}

#[tokio::test]
async fn aborted_runs_release_trustee_nonces() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let honest = local_trustees::<Ristretto>(2, 45);
    let truncating = Arc::new(FaultyTrustee::new(
        LocalBlindingTrustee::new("truncating", &mut rng),
        Fault::TruncateBlinding,
    ));
    let coordinator = rig
        .coordinator(honest.iter().cloned(), &mut rng)
        .with_trustee(truncating.clone());

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [1, 0, 1]);
    for _ in 0..5 {
        let err = coordinator.run(&first, &second).await.unwrap_err();
        assert!(
            matches!(err, PepError::Transport { trustee: 2, .. }),
            "{err:?}"
        );
    }

    let retained: Vec<_> = honest.iter().map(|trustee| trustee.retained_runs()).collect();
    assert_eq!(retained, [0, 0]);
    assert_eq!(truncating.inner().retained_runs(), 0);
}

#[tokio::test]
async fn tampered_commitments_are_attributed_to_trustee() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let faulty = Arc::new(FaultyTrustee::new(
        LocalBlindingTrustee::from_seed("faulty", [48; 32]),
        Fault::TamperCommitment { position: 2 },
    ));
    let coordinator = rig
        .coordinator(local_trustees::<Ristretto>(1, 46), &mut rng)
        .with_trustee(faulty)
        .with_trustee(local_trustees::<Ristretto>(1, 47).remove(0));

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [0, 0, 1]);
    let err = coordinator.run(&first, &second).await.unwrap_err();
    let PepError::ProofVerification { failures } = &err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(
        *failures,
        [ProofFailure {
            selection: SelectionRef::new(PROPOSITION, "yes"),
            trustees: vec![1],
        }]
    );
    assert_eq!(
        err.to_string(),
        "blinding proof verification failed for `prop-1#yes` (trustees 1)"
    );
}

/// Decryptor that produces genuine decryption proofs, but claims that every
/// ciphertext decrypts to the identity.
struct IdentityClaimingDecryptor<G: Group>(GuardianDecryptor<G>);

impl<G: Group> ThresholdDecryptor<G> for IdentityClaimingDecryptor<G> {
    fn decrypt<'a>(
        &'a self,
        context: &'a ElectionContext<G>,
        ciphertexts: &'a [Ciphertext<G>],
    ) -> BoxFuture<'a, Result<Vec<(G::Element, DecryptionProof<G>)>, DecryptionError>> {
        self.0
            .decrypt(context, ciphertexts)
            .map(|result| -> Result<Vec<_>, DecryptionError> {
                let decryptions = result?
                    .into_iter()
                    .map(|(_, proof)| (G::identity(), proof))
                    .collect();
                Ok(decryptions)
            })
            .boxed()
    }
}

#[tokio::test]
async fn lying_decryptor_fails_final_verification() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let decryptor = IdentityClaimingDecryptor(rig.decryptor(4, &mut rng));
    let coordinator = local_trustees::<Ristretto>(3, 49).into_iter().fold(
        PepCoordinator::new(rig.context.clone(), Arc::new(decryptor), &mut rng),
        |coordinator, trustee| coordinator.with_trustee(trustee),
    );

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let same = two_contest_ballot(&rig, [1, 0, 1]);
    let pep = coordinator.run(&first, &same).await.unwrap();
    assert!(pep.is_equal);

    let other = two_contest_ballot(&rig, [0, 1, 1]);
    let err = coordinator.run(&first, &other).await.unwrap_err();
    let err = match err {
        PepError::FinalVerification(err) => err,
        other => panic!("unexpected error: {other:?}"),
    };
    let failing: Vec<_> = err
        .failures()
        .iter()
        .map(|failure| match failure {
            VerificationFailure::DecryptionProof { selection, source } => {
                assert_eq!(*source, VerificationError::PlaintextMismatch);
                selection.to_string()
            }
            other => panic!("unexpected failure: {other:?}"),
        })
        .collect();
    assert_eq!(failing, ["mayor#alice", "mayor#bob"]);
}

#[tokio::test]
async fn malformed_trustee_response_is_rejected() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let truncating = Arc::new(FaultyTrustee::new(
        LocalBlindingTrustee::new("truncating", &mut rng),
        Fault::TruncateBlinding,
    ));
    let coordinator = rig.coordinator([truncating], &mut rng);

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [1, 0, 1]);
    let err = coordinator.run(&first, &second).await.unwrap_err();
    assert!(
        matches!(
            err,
            PepError::Transport {
                trustee: 0,
                source: TransportError::ResponseLength {
                    expected: 3,
                    actual: 2
                },
            }
        ),
        "{err:?}"
    );
    assert_eq!(
        err.to_string(),
        "blinding trustee #0 failed: trustee returned 2 responses, expected 3"
    );
}

#[tokio::test]
async fn echoed_nonces_produce_valid_proofs() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let trustees = (0..3).map(|i| {
        let trustee = LocalBlindingTrustee::from_seed(format!("echo-{i}"), [50 + i; 32]);
        Arc::new(trustee.with_nonce_mode(NonceMode::Echoed))
    });
    let coordinator = rig.coordinator(trustees, &mut rng);

    let first = two_contest_ballot(&rig, [0, 1, 0]);
    let second = two_contest_ballot(&rig, [1, 0, 0]);
    let pep = coordinator.run(&first, &second).await.unwrap();
    assert!(!pep.is_equal);
    PepVerifier::verify(&rig.context, &pep).unwrap();
}

async fn seeded_run(seed: u8) -> BallotPep<Ristretto> {
    let mut rng = seeded_rng(seed);
    let rig = Rig::<Ristretto>::new(Params::new(4, 3), &mut rng);
    let coordinator = rig.coordinator(local_trustees::<Ristretto>(3, seed), &mut rng);
    let first = rig.ballot("b", &[(MAYOR, &[("alice", 1), ("bob", 0)])], &mut rng);
    let second = rig.ballot("b", &[(MAYOR, &[("alice", 0), ("bob", 0)])], &mut rng);
    coordinator.run(&first, &second).await.unwrap()
}

#[tokio::test]
async fn protocol_is_deterministic_given_seeded_randomness() {
    let pep = seeded_run(7).await;
    assert_eq!(pep, seeded_run(7).await);
    assert_ne!(pep, seeded_run(8).await);
}

#[tokio::test]
async fn verifier_rejects_mutated_proofs() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let coordinator = rig.coordinator(local_trustees::<Ristretto>(3, 60), &mut rng);
    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [0, 1, 1]);
    let pep = coordinator.run(&first, &second).await.unwrap();
    assert!(!pep.is_equal);

    // Swap `t` values of the two mayor selections.
    let mut swapped_t = pep.clone();
    let selections = &mut swapped_t.contests[0].selections;
    let t = selections[0].t;
    selections[0].t = selections[1].t;
    selections[1].t = t;
    let err = PepVerifier::verify(&rig.context, &swapped_t).unwrap_err();
    let failures = err.failures();
    assert_eq!(failures.len(), 2, "{failures:?}");
    for failure in failures {
        assert!(
            matches!(
                failure,
                VerificationFailure::DecryptionProof {
                    source: VerificationError::PlaintextMismatch,
                    ..
                }
            ),
            "{failure:?}"
        );
    }

    // Swap blinding proofs.
    let mut swapped_proofs = pep.clone();
    let selections = &mut swapped_proofs.contests[0].selections;
    let proof = selections[0].blinding_proof;
    selections[0].blinding_proof = selections[1].blinding_proof;
    selections[1].blinding_proof = proof;
    let err = PepVerifier::verify(&rig.context, &swapped_proofs).unwrap_err();
    let failing: Vec<_> = err
        .failures()
        .iter()
        .map(|failure| match failure {
            VerificationFailure::BlindingProof { selection, source } => {
                assert_eq!(*source, VerificationError::ChallengeMismatch);
                selection.to_string()
            }
            other => panic!("unexpected failure: {other:?}"),
        })
        .collect();
    assert_eq!(failing, ["mayor#alice", "mayor#bob"]);

    // Flip the equality flag.
    let mut flipped = pep.clone();
    flipped.is_equal = true;
    let err = PepVerifier::verify(&rig.context, &flipped).unwrap_err();
    assert_eq!(
        err.failures(),
        [VerificationFailure::EqualityFlag {
            recorded: true,
            computed: false,
        }]
    );

    // Check against ballots the proof was not created for.
    let third = two_contest_ballot(&rig, [1, 0, 1]);
    let err = PepVerifier::verify_against_ballots(&rig.context, &pep, &first, &third).unwrap_err();
    assert_eq!(err.failures().len(), 3);
    assert!(err
        .failures()
        .iter()
        .all(|failure| matches!(failure, VerificationFailure::RatioMismatch { .. })));
}

#[tokio::test]
async fn verifier_rejects_proofs_under_foreign_context() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let coordinator = rig.coordinator(local_trustees::<Ristretto>(2, 70), &mut rng);
    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [1, 0, 1]);
    let pep = coordinator.run(&first, &second).await.unwrap();

    let other_rig = worked_example_rig::<Ristretto>();
    let err = PepVerifier::verify(&other_rig.context, &pep).unwrap_err();
    let blinding_failures = err
        .failures()
        .iter()
        .filter(|failure| matches!(failure, VerificationFailure::BlindingProof { .. }))
        .count();
    assert_eq!(blinding_failures, 3);
}

#[tokio::test]
async fn ballot_pep_survives_serde_round_trip() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let coordinator = rig.coordinator(local_trustees::<Ristretto>(3, 80), &mut rng);
    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [1, 1, 1]);
    let pep = coordinator.run(&first, &second).await.unwrap();

    let json = serde_json::to_value(&pep).unwrap();
    assert_eq!(json["ballot_id"], "ballot-42");
    assert_eq!(json["is_equal"], false);
    let selection = &json["contests"][0]["selections"][0];
    assert!(selection["t"].is_string(), "{selection:#}");
    assert!(selection["ciphertext_ab"]["pad"].is_string(), "{selection:#}");

    let restored: BallotPep<Ristretto> = serde_json::from_value(json).unwrap();
    assert_eq!(restored, pep);
    PepVerifier::verify(&rig.context, &restored).unwrap();

    let context_json = serde_json::to_string(&rig.context).unwrap();
    let context = serde_json::from_str(&context_json).unwrap();
    PepVerifier::verify(&context, &restored).unwrap();
}

#[tokio::test]
async fn many_runs_preserve_order() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let config = PepConfig::default().with_max_concurrent_runs(2);
    let coordinator = rig
        .coordinator(local_trustees::<Ristretto>(3, 90), &mut rng)
        .with_config(config);

    let votes = [[1, 0, 1], [0, 0, 1], [1, 1, 0], [0, 1, 0]];
    let pairs: Vec<_> = votes
        .iter()
        .enumerate()
        .map(|(i, &second_votes)| {
            let mut first = two_contest_ballot(&rig, [1, 0, 1]);
            let mut second = two_contest_ballot(&rig, second_votes);
            first.ballot_id = format!("ballot-{i}");
            second.ballot_id = format!("ballot-{i}");
            (first, second)
        })
        .collect();

    let results = coordinator
        .run_many(pairs.iter().map(|(first, second)| (first, second)))
        .await;
    let outcomes: Vec<_> = results
        .into_iter()
        .map(|result| {
            let pep = result.unwrap();
            (pep.ballot_id, pep.is_equal)
        })
        .collect();
    assert_eq!(
        outcomes,
        [
            ("ballot-0".to_owned(), true),
            ("ballot-1".to_owned(), false),
            ("ballot-2".to_owned(), false),
            ("ballot-3".to_owned(), false),
        ]
    );
}

#[derive(Debug, Default)]
struct RecordingMetrics {
    steps: Mutex<Vec<PepStep>>,
    outcomes: Mutex<Vec<RunOutcome>>,
}

impl PepMetrics for RecordingMetrics {
    fn step_completed(&self, step: PepStep, _elapsed: Duration) {
        self.steps.lock().unwrap().push(step);
    }

    fn run_finished(&self, outcome: RunOutcome, _elapsed: Duration) {
        self.outcomes.lock().unwrap().push(outcome);
    }
}

#[tokio::test]
async fn metrics_are_reported() {
    let mut rng = thread_rng();
    let rig = worked_example_rig::<Ristretto>();
    let metrics = Arc::new(RecordingMetrics::default());
    let coordinator = rig
        .coordinator(local_trustees::<Ristretto>(3, 100), &mut rng)
        .with_metrics(metrics.clone());

    let first = two_contest_ballot(&rig, [1, 0, 1]);
    let second = two_contest_ballot(&rig, [1, 0, 1]);
    coordinator.run(&first, &second).await.unwrap();
    let third = two_contest_ballot(&rig, [0, 0, 1]);
    coordinator.run(&first, &third).await.unwrap();
    let short = rig.ballot("ballot-42", &[(MAYOR, &[("alice", 1)])], &mut rng);
    coordinator.run(&first, &short).await.unwrap_err();

    let steps = metrics.steps.lock().unwrap();
    let expected_steps = [
        PepStep::Ratio,
        PepStep::Blind,
        PepStep::Aggregate,
        PepStep::Challenge,
        PepStep::Respond,
        PepStep::Verify,
        PepStep::Decrypt,
        PepStep::SelfVerify,
    ];
    assert_eq!(steps.len(), 2 * expected_steps.len());
    assert_eq!(steps[..8], expected_steps);
    assert_eq!(steps[8..], expected_steps);

    let outcomes = metrics.outcomes.lock().unwrap();
    assert_eq!(
        *outcomes,
        [RunOutcome::Equal, RunOutcome::NotEqual, RunOutcome::Failed]
    );
}
