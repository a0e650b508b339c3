//! [`BlindingProof`] and the challenge derivation shared with the coordinator.

use merlin::Transcript;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

#[cfg(feature = "serde")]
use crate::serde::ScalarHelper;
use crate::{
    group::Group,
    proofs::{TranscriptForGroup, VerificationError},
    Ciphertext, ElectionContext,
};

/// Domain separation byte for the blinding challenge.
const BLINDING_DOMAIN_TAG: u8 = 0x42;

/// Derives the Fiat–Shamir challenge for a blinded ratio ciphertext.
///
/// The challenge commits to the election context, the domain tag, the joint key `K`,
/// the ratio `(α, β)`, the blinded ciphertext `(A, B)` and the commitments `(a, b)`.
pub(crate) fn blinding_challenge<G: Group>(
    context: &ElectionContext<G>,
    ratio: &Ciphertext<G>,
    blinded: &Ciphertext<G>,
    commitments: (G::Element, G::Element),
) -> G::Scalar {
    let mut transcript = Transcript::new(b"pep_blinding");
    transcript.append_message(b"Q", context.extended_base_hash());
    transcript.append_message(b"tag", &[BLINDING_DOMAIN_TAG]);
    transcript.start_proof(b"ratio_blinding");
    transcript.append_element_bytes(b"K", context.joint_key().as_bytes());
    transcript.append_element::<G>(b"alpha", &ratio.random_element);
    transcript.append_element::<G>(b"beta", &ratio.blinded_element);
    transcript.append_element::<G>(b"A", &blinded.random_element);
    transcript.append_element::<G>(b"B", &blinded.blinded_element);
    transcript.append_element::<G>(b"a", &commitments.0);
    transcript.append_element::<G>(b"b", &commitments.1);
    transcript.challenge_scalar::<G>(b"c")
}

/// Restores commitments `([v]α + [c]A, [v]β + [c]B)` from a challenge and a response.
///
/// Applied to aggregated values, this yields the aggregated commitments `(a, b)`; applied
/// to the contribution of a single trustee, it yields `(a_j, b_j)`.
pub(crate) fn expected_commitments<G: Group>(
    ratio: &Ciphertext<G>,
    blinded: &Ciphertext<G>,
    challenge: &G::Scalar,
    response: &G::Scalar,
) -> (G::Element, G::Element) {
    let scalars = [*response, *challenge];
    (
        G::vartime_multi_mul(&scalars, [ratio.random_element, blinded.random_element]),
        G::vartime_multi_mul(&scalars, [ratio.blinded_element, blinded.blinded_element]),
    )
}

/// Proof that a blinded ciphertext `(A, B)` is the ratio ciphertext `(α, β)` raised
/// to a common secret exponent `ξ = Σ ξ_j` jointly held by the blinding trustees.
///
/// # Construction
///
/// This is a distributed Chaum–Pedersen proof. Each trustee `j` samples `ξ_j, u_j`
/// and publishes `A_j = [ξ_j]α`, `B_j = [ξ_j]β`, `a_j = [u_j]α`, `b_j = [u_j]β`.
/// The contributions are summed into `(A, B, a, b)`, the challenge `c` is derived from them
/// together with the election context, and each trustee answers with `v_j = u_j − c·ξ_j`.
/// The proof is `(c, v)` with `v = Σ v_j`. Verification equations are:
///
/// ```text
/// a ?= [v]α + [c]A;
/// b ?= [v]β + [c]B.
/// ```
///
/// As with [`LogEqualityProof`](crate::LogEqualityProof), commitments `(a, b)` are not stored;
/// they are restored from the verification equations, and the restored challenge is compared
/// to `c`.
///
/// # Implementation details
///
/// - The proof is serialized as 2 scalars: `(c, v)`.
/// - Verification is **not** constant-time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct BlindingProof<G: Group> {
    #[cfg_attr(feature = "serde", serde(with = "ScalarHelper::<G>"))]
    challenge: G::Scalar,
    #[cfg_attr(feature = "serde", serde(with = "ScalarHelper::<G>"))]
    response: G::Scalar,
}

impl<G: Group> BlindingProof<G> {
    pub(crate) fn new(challenge: G::Scalar, response: G::Scalar) -> Self {
        Self {
            challenge,
            response,
        }
    }

    /// Returns the challenge `c`.
    pub fn challenge(&self) -> &G::Scalar {
        &self.challenge
    }

    /// Returns the aggregated response `v`.
    pub fn response(&self) -> &G::Scalar {
        &self.response
    }

    /// Verifies that `blinded` is a blinding of `ratio` under `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if this proof does not verify.
    pub fn verify(
        &self,
        context: &ElectionContext<G>,
        ratio: &Ciphertext<G>,
        blinded: &Ciphertext<G>,
    ) -> Result<(), VerificationError> {
        let commitments = expected_commitments(ratio, blinded, &self.challenge, &self.response);
        let expected_challenge = blinding_challenge(context, ratio, blinded, commitments);
        if bool::from(expected_challenge.ct_eq(&self.challenge)) {
            Ok(())
        } else {
            Err(VerificationError::ChallengeMismatch)
        }
    }

    /// Serializes this proof into bytes: the challenge, then the response.
    pub fn to_bytes(self) -> Vec<u8> {
        let mut bytes = vec![0_u8; 2 * G::SCALAR_SIZE];
        G::serialize_scalar(&self.challenge, &mut bytes[..G::SCALAR_SIZE]);
        G::serialize_scalar(&self.response, &mut bytes[G::SCALAR_SIZE..]);
        bytes
    }

    /// Attempts to parse the proof from `bytes`. Returns `None` if `bytes` do not represent
    /// a well-formed proof.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 2 * G::SCALAR_SIZE {
            return None;
        }
        let challenge = G::deserialize_scalar(&bytes[..G::SCALAR_SIZE])?;
        let response = G::deserialize_scalar(&bytes[G::SCALAR_SIZE..])?;
        Some(Self::new(challenge, response))
    }
}

#[cfg(test)]
mod tests {
    use rand::thread_rng;

    use super::*;
    use crate::{
        group::{ElementOps, Ristretto},
        sharing::{Dealer, Params, PublicKeySet},
        SecretKey,
    };

    fn context() -> ElectionContext<Ristretto> {
        let params = Params::new(2, 2);
        let dealer = Dealer::<Ristretto>::new(params, &mut thread_rng());
        let key_set = PublicKeySet::new(params, dealer.public_info()).unwrap();
        ElectionContext::new(b"election", key_set)
    }

    /// Emulates a single prover holding all trustee nonces at once.
    fn prove(
        context: &ElectionContext<Ristretto>,
        ratio: &Ciphertext<Ristretto>,
        nonces: &[(SecretKey<Ristretto>, SecretKey<Ristretto>)],
    ) -> (Ciphertext<Ristretto>, BlindingProof<Ristretto>) {
        let eps = nonces
            .iter()
            .fold(SecretKey::new(0_u64.into()), |acc, (eps, _)| acc + eps.clone());
        let u = nonces
            .iter()
            .fold(SecretKey::new(0_u64.into()), |acc, (_, u)| acc + u.clone());
        let blinded = *ratio * eps.expose_scalar();
        let commitments = *ratio * u.expose_scalar();
        let challenge = blinding_challenge(
            context,
            ratio,
            &blinded,
            (commitments.random_element, commitments.blinded_element),
        );
        let response = *u.expose_scalar() - challenge * *eps.expose_scalar();
        (blinded, BlindingProof::new(challenge, response))
    }

    #[test]
    fn blinding_proof_basics() {
        let mut rng = thread_rng();
        let context = context();
        let key = context.joint_key().clone();
        let ratio = key.encrypt(2_u64, &mut rng) - key.encrypt(2_u64, &mut rng);
        let nonces: Vec<_> = (0..3)
            .map(|_| (SecretKey::generate(&mut rng), SecretKey::generate(&mut rng)))
            .collect();

        let (blinded, proof) = prove(&context, &ratio, &nonces);
        proof.verify(&context, &ratio, &blinded).unwrap();

        let restored = BlindingProof::<Ristretto>::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(restored, proof);
    }

    #[test]
    fn blinding_proof_rejects_tampering() {
        let mut rng = thread_rng();
        let context = context();
        let key = context.joint_key().clone();
        let ratio = key.encrypt(1_u64, &mut rng) - key.encrypt(0_u64, &mut rng);
        let nonces = [(SecretKey::generate(&mut rng), SecretKey::generate(&mut rng))];
        let (blinded, proof) = prove(&context, &ratio, &nonces);

        let mut bogus_blinded = blinded;
        bogus_blinded.blinded_element = bogus_blinded.blinded_element + Ristretto::generator();
        let err = proof.verify(&context, &ratio, &bogus_blinded).unwrap_err();
        assert_eq!(err, VerificationError::ChallengeMismatch);

        let bogus_ratio = ratio + ratio;
        let err = proof.verify(&context, &bogus_ratio, &blinded).unwrap_err();
        assert_eq!(err, VerificationError::ChallengeMismatch);

        let other_context = ElectionContext::from_parts([0; 32], context.key_set().clone());
        let err = proof.verify(&other_context, &ratio, &blinded).unwrap_err();
        assert_eq!(err, VerificationError::ChallengeMismatch);
    }
}
