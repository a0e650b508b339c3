//! Types representing guardian state.

use rand_core::{CryptoRng, RngCore};

use crate::{
    group::Group,
    proofs::LogEqualityProof,
    sharing::{Params, PublicKeySet, SharingError},
    Ciphertext, ElectionContext, Keypair, PublicKey, SecretKey, VerifiableDecryption,
};

/// Dealer in Feldman's verifiable secret sharing scheme, used to provision guardians.
#[derive(Debug, Clone)]
pub struct Dealer<G: Group> {
    params: Params,
    polynomial: Vec<Keypair<G>>,
}

impl<G: Group> Dealer<G> {
    /// Instantiates a dealer.
    pub fn new<R: CryptoRng + RngCore>(params: Params, rng: &mut R) -> Self {
        let polynomial = (0..params.threshold)
            .map(|_| Keypair::<G>::generate(rng))
            .collect();
        Self { params, polynomial }
    }

    /// Returns the coefficients of the public polynomial. These can be used to create
    /// a [`PublicKeySet`].
    pub fn public_info(&self) -> Vec<G::Element> {
        self.polynomial
            .iter()
            .map(|pair| pair.public().as_element())
            .collect()
    }

    /// Returns a secret share for guardian `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn secret_share_for_participant(&self, index: usize) -> SecretKey<G> {
        assert!(
            index < self.params.shares,
            "participant index {index} out of bounds, expected a value in 0..{}",
            self.params.shares
        );

        let power = G::Scalar::from(index as u64 + 1);
        let mut poly_value = SecretKey::new(G::Scalar::from(0));
        for keypair in self.polynomial.iter().rev() {
            poly_value = poly_value * &power + keypair.secret().clone();
        }
        poly_value
    }
}

/// Guardian holding a share of the election secret key.
#[derive(Debug, Clone)]
pub struct ActiveParticipant<G: Group> {
    key_set: PublicKeySet<G>,
    index: usize,
    secret_share: SecretKey<G>,
}

impl<G: Group> ActiveParticipant<G> {
    /// Creates a guardian with the specified 0-based `index` and secret share.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range, or if `secret_share` does not correspond
    /// to the guardian's public key share in `key_set`.
    pub fn new(
        key_set: PublicKeySet<G>,
        index: usize,
        secret_share: SecretKey<G>,
    ) -> Result<Self, SharingError> {
        let expected_element = key_set
            .participant_key(index)
            .ok_or(SharingError::ParticipantIndex {
                index,
                shares: key_set.params().shares,
            })?
            .as_element();
        if G::mul_generator(secret_share.expose_scalar()) == expected_element {
            Ok(Self {
                key_set,
                index,
                secret_share,
            })
        } else {
            Err(SharingError::InvalidSecret)
        }
    }

    /// Returns the public key set of the guardians.
    pub fn key_set(&self) -> &PublicKeySet<G> {
        &self.key_set
    }

    /// Returns the 0-based index of this guardian.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the public key share of this guardian.
    pub fn public_key_share(&self) -> &PublicKey<G> {
        &self.key_set.participant_keys()[self.index]
    }

    /// Creates a decryption share for `ciphertext` together with a proof of its validity
    /// bound to `context` and the guardian index.
    pub fn decrypt_share<R>(
        &self,
        context: &ElectionContext<G>,
        ciphertext: Ciphertext<G>,
        rng: &mut R,
    ) -> (VerifiableDecryption<G>, LogEqualityProof<G>)
    where
        R: CryptoRng + RngCore,
    {
        context.prove_share(self.index, &self.secret_share, ciphertext, rng)
    }
}
