//! Guardians holding shares of the election secret key, and threshold decryption.
//!
//! Guardian key material is produced by [Feldman's verifiable secret sharing][feldman-vss]:
//! a dealer samples a secret polynomial `P(z) = x + x_1 * z + … + x_{t-1} * z^{t-1}`,
//! publishes the *public polynomial* `Q(z) = [x]G + [z][x_1]G + …`, and hands the secret
//! share `s_i = P(i + 1)` to guardian `i`. `[x]G` is the joint election key `K`; values
//! `Q(i + 1)` are the guardians' public key shares. Any `t` guardians can jointly decrypt
//! by combining their decryption shares with Lagrange coefficients.
//!
//! The key ceremony itself (with its proofs of possession and complaint handling) is
//! outside the scope of this crate; [`Dealer`] exists so that guardians can be provisioned
//! in tests and benchmarks.
//!
//! [feldman-vss]: https://www.cs.umd.edu/~gasarch/TOPICS/secretsharing/feldmanVSS.pdf
//!
//! # Examples
//!
//! Threshold decryption requiring 2 of 3 guardians.
//!
//! ```
//! # use electionguard_pep::{
//! #     group::{ElementOps, Ristretto}, sharing::*, CandidateDecryption, ElectionContext,
//! # };
//! # use rand::thread_rng;
//! # use std::error::Error as StdError;
//! # fn main() -> Result<(), Box<dyn StdError>> {
//! let mut rng = thread_rng();
//! let params = Params::new(3, 2);
//! let dealer = Dealer::<Ristretto>::new(params, &mut rng);
//! let key_set = PublicKeySet::<Ristretto>::new(params, dealer.public_info())?;
//! let context = ElectionContext::new(b"election", key_set.clone());
//!
//! let guardians = (0..3)
//!     .map(|i| ActiveParticipant::new(
//!         key_set.clone(),
//!         i,
//!         dealer.secret_share_for_participant(i),
//!     ))
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! let enc = key_set.shared_key().encrypt(0_u64, &mut rng);
//! let shares = guardians
//!     .iter()
//!     .skip(1) // emulate the first guardian being unavailable
//!     .map(|guardian| {
//!         let (share, proof) = guardian.decrypt_share(&context, enc, &mut rng);
//!         let share = CandidateDecryption::from_bytes(&share.to_bytes()).unwrap();
//!         let share = context.verify_share(share, enc, guardian.index(), &proof)?;
//!         Ok((guardian.index(), share))
//!     })
//!     .collect::<Result<Vec<_>, Box<dyn StdError>>>()?;
//!
//! let combined = params.combine_shares(shares).unwrap();
//! let decrypted = combined.decrypt_to_element(enc);
//! assert_eq!(decrypted, Ristretto::identity());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::cmp::Ordering;

use crate::{group::Group, VerifiableDecryption};

mod key_set;
mod participant;

pub use self::{
    key_set::PublicKeySet,
    participant::{ActiveParticipant, Dealer},
};

/// Computes multipliers for the Lagrange polynomial interpolation based on the function values
/// at the given points. The indexes are zero-based, hence points are determined as
/// `indexes[i] + 1`.
///
/// Returns scaled denominators together with the common scale applied to all of them.
fn lagrange_coefficients<G: Group>(indexes: &[usize]) -> (Vec<G::Scalar>, G::Scalar) {
    // `false` corresponds to positive sign, `true` to negative. This is in order
    // to make XOR work as expected.

    let mut denominators: Vec<_> = indexes
        .iter()
        .map(|&index| {
            let (sign, denominator) = indexes
                .iter()
                .map(|&other_index| match index.cmp(&other_index) {
                    Ordering::Greater => (true, G::Scalar::from((index - other_index) as u64)),
                    Ordering::Less => (false, G::Scalar::from((other_index - index) as u64)),
                    Ordering::Equal => (false, G::Scalar::from(index as u64 + 1)),
                })
                .fold(
                    (false, G::Scalar::from(1)),
                    |(sign, magnitude), (elem_sign, elem_magnitude)| {
                        (sign ^ elem_sign, magnitude * elem_magnitude)
                    },
                );

            if sign {
                -denominator
            } else {
                denominator
            }
        })
        .collect();
    G::invert_scalars(&mut denominators);

    let scale = indexes
        .iter()
        .map(|&index| G::Scalar::from(index as u64 + 1))
        .fold(G::Scalar::from(1), |acc, value| acc * value);
    (denominators, scale)
}

/// Public polynomial committing to the dealer's secret polynomial.
#[derive(Debug, Clone)]
pub(crate) struct PublicPolynomial<G: Group>(Vec<G::Element>);

impl<G: Group> PublicPolynomial<G> {
    pub(crate) fn new(values: Vec<G::Element>) -> Self {
        Self(values)
    }

    fn value_at_zero(&self) -> G::Element {
        self.0[0]
    }

    pub(crate) fn value_at(&self, x: G::Scalar) -> G::Element {
        let mut val = G::Scalar::from(1_u64);
        let scalars: Vec<_> = (0..self.0.len())
            .map(|_| {
                let output = val;
                val = val * x;
                output
            })
            .collect();

        G::vartime_multi_mul(&scalars, self.0.iter().copied())
    }
}

/// Errors that can occur when provisioning guardians.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SharingError {
    /// Public polynomial received from the dealer is malformed.
    #[error("public polynomial received from the dealer is malformed")]
    MalformedDealerPolynomial,
    /// Secret received from the dealer does not correspond to their commitment via
    /// the public polynomial.
    #[error(
        "secret received from the dealer does not correspond to their commitment via \
         public polynomial"
    )]
    InvalidSecret,
    /// Number of participants specified in [`Params`] does not match the number
    /// of provided public keys.
    #[error(
        "number of participants specified in `Params` does not match the number \
         of provided public keys"
    )]
    ParticipantCountMismatch,
    /// Participants' public keys do not correspond to a single shared key.
    #[error("participants' public keys do not correspond to a single shared key")]
    MalformedParticipantKeys,
    /// Participant index is out of range for the key set.
    #[error("participant index {index} out of bounds, expected a value in 0..{shares}")]
    ParticipantIndex {
        /// Offending index.
        index: usize,
        /// Total number of participants.
        shares: usize,
    },
}

/// Parameters of a threshold ElGamal encryption scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Params {
    /// Total number of guardians.
    pub shares: usize,
    /// Number of guardians necessary to jointly decrypt a ciphertext (the quorum).
    pub threshold: usize,
}

impl Params {
    /// Creates new parameters.
    ///
    /// # Panics
    ///
    /// Panics if `shares` is equal to zero or if `threshold` is not in `1..=shares`.
    pub const fn new(shares: usize, threshold: usize) -> Self {
        assert!(shares > 0);
        assert!(threshold > 0 && threshold <= shares);
        Self { shares, threshold }
    }

    /// Combines shares decrypting the same ciphertext. The shares must be provided together
    /// with the 0-based indexes of the guardians they are coming from.
    ///
    /// Returns the combined decryption, or `None` if the number of shares is insufficient,
    /// or if some indexes are out of range or repeated.
    pub fn combine_shares<G: Group>(
        self,
        shares: impl IntoIterator<Item = (usize, VerifiableDecryption<G>)>,
    ) -> Option<VerifiableDecryption<G>> {
        let (indexes, shares): (Vec<_>, Vec<_>) = shares
            .into_iter()
            .take(self.threshold)
            .map(|(index, share)| (index, *share.as_element()))
            .unzip();
        if shares.len() < self.threshold {
            return None;
        }
        let indexes_are_valid = indexes.iter().enumerate().all(|(pos, &index)| {
            index < self.shares && !indexes[..pos].contains(&index)
        });
        if !indexes_are_valid {
            return None;
        }

        let (denominators, scale) = lagrange_coefficients::<G>(&indexes);
        let restored_value = G::vartime_multi_mul(&denominators, shares);
        let dh_element = restored_value * &scale;
        Some(VerifiableDecryption::from_element(dh_element))
    }
}
