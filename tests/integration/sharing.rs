//! Tests focused on guardian key sharing and threshold decryption.

use rand::{seq::IteratorRandom, thread_rng};
use rand_core::{CryptoRng, RngCore};

use crate::{assert_ct_eq, Rig};
use electionguard_pep::{
    group::Group,
    sharing::{Params, PublicKeySet},
    CandidateDecryption, Ciphertext, ElectionContext, VerifiableDecryption, VerificationError,
};

impl<G: Group> Rig<G> {
    /// Produces decryption shares of all guardians, checking each share proof.
    fn verified_shares(
        &self,
        ciphertext: Ciphertext<G>,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Vec<VerifiableDecryption<G>> {
        self.guardians
            .iter()
            .map(|guardian| {
                let (share, proof) = guardian.decrypt_share(&self.context, ciphertext, rng);
                let candidate = CandidateDecryption::from(share);
                self.context
                    .verify_share(candidate, ciphertext, guardian.index(), &proof)
                    .unwrap()
            })
            .collect()
    }
}

fn test_key_set_can_be_restored_from_participants<G: Group>(params: Params) {
    let rig: Rig<G> = Rig::new(params, &mut thread_rng());
    let key_set = rig.context.key_set();
    let restored =
        PublicKeySet::from_participants(params, key_set.participant_keys().to_vec()).unwrap();
    assert_eq!(restored.shared_key(), key_set.shared_key());

    // Contexts built from the same base hash and keys are interchangeable.
    let context = ElectionContext::new(b"integration-test-election", restored);
    assert_eq!(
        context.extended_base_hash(),
        rig.context.extended_base_hash()
    );
}

fn test_share_proofs_are_bound_to_guardian<G: Group>(params: Params) {
    let mut rng = thread_rng();
    let rig: Rig<G> = Rig::new(params, &mut rng);
    let ciphertext = rig.context.joint_key().encrypt(5_u64, &mut rng);

    let (share, proof) = rig.guardians[0].decrypt_share(&rig.context, ciphertext, &mut rng);
    let candidate = CandidateDecryption::from(share);
    rig.context
        .verify_share(candidate, ciphertext, 0, &proof)
        .unwrap();
    // The same share claimed by another guardian must not verify.
    let result = rig.context.verify_share(candidate, ciphertext, 1, &proof);
    assert!(
        matches!(result, Err(VerificationError::ChallengeMismatch)),
        "{:?}",
        result.err()
    );
    let result = rig
        .context
        .verify_share(candidate, ciphertext, params.shares, &proof);
    let Err(err) = result else {
        panic!("share verified for out-of-range index");
    };
    assert_eq!(
        err,
        VerificationError::ParticipantIndex {
            index: params.shares
        }
    );

    // The share does not verify for a different ciphertext either.
    let other_ciphertext = rig.context.joint_key().encrypt(5_u64, &mut rng);
    let result = rig
        .context
        .verify_share(candidate, other_ciphertext, 0, &proof);
    assert!(
        matches!(result, Err(VerificationError::ChallengeMismatch)),
        "{:?}",
        result.err()
    );
}

fn tiny_fuzz<G: Group>(params: Params) {
    let mut rng = thread_rng();
    let rig: Rig<G> = Rig::new(params, &mut rng);
    for _ in 0..20 {
        let value = G::generate_scalar(&mut rng);
        let encrypted = rig
            .context
            .joint_key()
            .encrypt_element(G::mul_generator(&value), &mut rng);
        let shares = rig.verified_shares(encrypted, &mut rng);
        for _ in 0..5 {
            let chosen_shares = shares
                .iter()
                .copied()
                .enumerate()
                .choose_multiple(&mut rng, params.threshold);
            let combined = params.combine_shares(chosen_shares).unwrap();
            let decrypted = combined.decrypt_to_element(encrypted);

            assert_ct_eq(&decrypted, &G::vartime_mul_generator(&value));
        }

        let too_few_shares = shares
            .iter()
            .copied()
            .enumerate()
            .take(params.threshold - 1);
        assert!(params.combine_shares(too_few_shares).is_none());
    }
}

mod curve25519 {
    use super::*;
    use electionguard_pep::group::Curve25519Subgroup;

    #[test]
    fn key_set_can_be_restored_from_participants() {
        test_key_set_can_be_restored_from_participants::<Curve25519Subgroup>(Params::new(10, 7));
        test_key_set_can_be_restored_from_participants::<Curve25519Subgroup>(Params::new(10, 8));
    }

    #[test]
    fn share_proofs_are_bound_to_guardian() {
        test_share_proofs_are_bound_to_guardian::<Curve25519Subgroup>(Params::new(4, 3));
    }

    #[test]
    fn fuzz_3_of_5() {
        tiny_fuzz::<Curve25519Subgroup>(Params::new(5, 3));
    }

    #[test]
    fn fuzz_5_of_5() {
        tiny_fuzz::<Curve25519Subgroup>(Params::new(5, 5));
    }

    #[test]
    fn fuzz_7_of_10() {
        tiny_fuzz::<Curve25519Subgroup>(Params::new(10, 7));
    }

    #[test]
    fn fuzz_12_of_15() {
        tiny_fuzz::<Curve25519Subgroup>(Params::new(15, 12));
    }
}

mod ristretto {
    use super::*;
    use electionguard_pep::group::Ristretto;

    #[test]
    fn key_set_can_be_restored_from_participants() {
        test_key_set_can_be_restored_from_participants::<Ristretto>(Params::new(10, 7));
        test_key_set_can_be_restored_from_participants::<Ristretto>(Params::new(10, 8));
    }

    #[test]
    fn share_proofs_are_bound_to_guardian() {
        test_share_proofs_are_bound_to_guardian::<Ristretto>(Params::new(4, 3));
    }

    #[test]
    fn fuzz_3_of_5() {
        tiny_fuzz::<Ristretto>(Params::new(5, 3));
    }

    #[test]
    fn fuzz_4_of_5() {
        tiny_fuzz::<Ristretto>(Params::new(5, 4));
    }

    #[test]
    fn fuzz_6_of_10() {
        tiny_fuzz::<Ristretto>(Params::new(10, 6));
    }

    #[test]
    fn fuzz_10_of_10() {
        tiny_fuzz::<Ristretto>(Params::new(10, 10));
    }

    #[test]
    fn fuzz_16_of_20() {
        tiny_fuzz::<Ristretto>(Params::new(20, 16));
    }
}
