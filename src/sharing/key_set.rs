//! `PublicKeySet` and associated helpers.

use merlin::Transcript;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{lagrange_coefficients, Params, PublicPolynomial, SharingError};
use crate::{group::Group, proofs::TranscriptForGroup, PublicKey};

/// Full public information about the guardians: the joint election key `K`
/// and the public key share of each guardian.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct PublicKeySet<G: Group> {
    params: Params,
    shared_key: PublicKey<G>,
    participant_keys: Vec<PublicKey<G>>,
}

impl<G: Group> PublicKeySet<G> {
    /// Creates an instance based on information provided by the dealer
    /// (the coefficients of the public polynomial).
    ///
    /// # Errors
    ///
    /// Returns an error if the number of polynomial coefficients does not match
    /// the threshold in `params`.
    pub fn new(params: Params, public_poly: Vec<G::Element>) -> Result<Self, SharingError> {
        if public_poly.len() != params.threshold {
            return Err(SharingError::MalformedDealerPolynomial);
        }

        let public_poly = PublicPolynomial::<G>::new(public_poly);
        let shared_key = PublicKey::from_element(public_poly.value_at_zero());
        let participant_keys = (0..params.shares)
            .map(|idx| PublicKey::from_element(public_poly.value_at((idx as u64 + 1).into())))
            .collect();

        Ok(Self {
            params,
            shared_key,
            participant_keys,
        })
    }

    /// Creates a key set from the guardians' public key shares. The joint key is restored
    /// by interpolating the first `threshold` shares; the remaining shares are checked
    /// against the interpolated polynomial.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of keys does not match `params`, or if the keys
    /// are inconsistent.
    pub fn from_participants(
        params: Params,
        participant_keys: Vec<PublicKey<G>>,
    ) -> Result<Self, SharingError> {
        if params.shares != participant_keys.len() {
            return Err(SharingError::ParticipantCountMismatch);
        }

        // Reconstruct the shared key based on first `t` participant keys.
        let indexes: Vec<_> = (0..params.threshold).collect();
        let (denominators, scale) = lagrange_coefficients::<G>(&indexes);
        let starting_keys = participant_keys
            .iter()
            .map(PublicKey::as_element)
            .take(params.threshold);
        let shared_key = G::vartime_multi_mul(&denominators, starting_keys.clone());
        let shared_key = PublicKey::from_element(shared_key * &scale);

        // Multiplicative inverses for `1..=n`.
        let mut inverses: Vec<_> = (1_u64..=params.shares as u64)
            .map(G::Scalar::from)
            .collect();
        G::invert_scalars(&mut inverses);

        for (x, key) in participant_keys.iter().enumerate().skip(params.threshold) {
            let mut key_scale = indexes
                .iter()
                .map(|&idx| G::Scalar::from((x - idx) as u64))
                .fold(G::Scalar::from(1), |acc, value| acc * value);

            let key_denominators: Vec<_> = denominators
                .iter()
                .enumerate()
                .map(|(idx, &d)| d * G::Scalar::from(idx as u64 + 1) * inverses[x - idx - 1])
                .collect();

            // The sign is negative iff threshold `t` is even: all `t` multiplicands
            // in `key_scale` are negative, as is `1 / (idx - x)` in each of `key_denominators`.
            if params.threshold % 2 == 0 {
                key_scale = -key_scale;
            }

            let interpolated_key = G::vartime_multi_mul(&key_denominators, starting_keys.clone());
            let interpolated_key = interpolated_key * &key_scale;
            if interpolated_key != key.as_element() {
                return Err(SharingError::MalformedParticipantKeys);
            }
        }

        Ok(Self {
            params,
            shared_key,
            participant_keys,
        })
    }

    /// Returns parameters of the threshold scheme.
    pub fn params(&self) -> Params {
        self.params
    }

    /// Returns the joint election key.
    pub fn shared_key(&self) -> &PublicKey<G> {
        &self.shared_key
    }

    /// Returns the public key share of guardian `index`, or `None` if the index is out of range.
    pub fn participant_key(&self, index: usize) -> Option<&PublicKey<G>> {
        self.participant_keys.get(index)
    }

    /// Returns public key shares of all guardians.
    pub fn participant_keys(&self) -> &[PublicKey<G>] {
        &self.participant_keys
    }

    pub(crate) fn commit(&self, transcript: &mut Transcript) {
        transcript.append_u64(b"n", self.params.shares as u64);
        transcript.append_u64(b"t", self.params.threshold as u64);
        transcript.append_element_bytes(b"K", self.shared_key.as_bytes());
    }
}
