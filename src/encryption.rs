//! `Ciphertext` and closely related types.

use rand_core::{CryptoRng, RngCore};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::{fmt, ops};

#[cfg(feature = "serde")]
use crate::serde::ElementHelper;
use crate::{group::Group, PublicKey, SecretKey};

/// Ciphertext for ElGamal encryption.
///
/// A ciphertext consists of 2 group elements: the random element `R = [r]G` (the *pad*)
/// and the blinded element `B = [m]G + [r]K` (the *data*), where `K` is the receiver's
/// public key and `m` the encrypted value.
///
/// Ciphertexts are partially homomorphic: they can be added together, subtracted or multiplied
/// by a scalar value. Subtracting two ciphertexts produces the *ratio* ciphertext that is used
/// by the plaintext equivalence protocol; it encrypts zero iff the operands encrypt
/// the same value.
///
/// # Examples
///
/// ```
/// # use electionguard_pep::{group::{ElementOps, Ristretto}, Keypair};
/// # use rand::thread_rng;
/// let mut rng = thread_rng();
/// let keypair = Keypair::<Ristretto>::generate(&mut rng);
/// let first = keypair.public().encrypt(1_u64, &mut rng);
/// let second = keypair.public().encrypt(1_u64, &mut rng);
/// let ratio = first - second;
/// let decrypted = keypair.secret().decrypt_to_element(ratio);
/// assert!(Ristretto::is_identity(&decrypted));
/// ```
#[derive(Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct Ciphertext<G: Group> {
    #[cfg_attr(feature = "serde", serde(rename = "pad", with = "ElementHelper::<G>"))]
    pub(crate) random_element: G::Element,
    #[cfg_attr(feature = "serde", serde(rename = "data", with = "ElementHelper::<G>"))]
    pub(crate) blinded_element: G::Element,
}

impl<G: Group> fmt::Debug for Ciphertext<G> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Ciphertext")
            .field("random_element", &self.random_element)
            .field("blinded_element", &self.blinded_element)
            .finish()
    }
}

impl<G: Group> PartialEq for Ciphertext<G> {
    fn eq(&self, other: &Self) -> bool {
        self.random_element == other.random_element
            && self.blinded_element == other.blinded_element
    }
}

impl<G: Group> Ciphertext<G> {
    /// Creates a ciphertext from its two components.
    pub fn new(random_element: G::Element, blinded_element: G::Element) -> Self {
        Self {
            random_element,
            blinded_element,
        }
    }

    /// Represents encryption of zero value without the blinding factor.
    pub fn zero() -> Self {
        Self {
            random_element: G::identity(),
            blinded_element: G::identity(),
        }
    }

    /// Returns a reference to the random element (the pad).
    pub fn random_element(&self) -> &G::Element {
        &self.random_element
    }

    /// Returns a reference to the blinded element (the data).
    pub fn blinded_element(&self) -> &G::Element {
        &self.blinded_element
    }

    /// Serializes this ciphertext as two group elements (the random element,
    /// then the blinded element).
    pub fn to_bytes(self) -> Vec<u8> {
        let mut bytes = vec![0_u8; 2 * G::ELEMENT_SIZE];
        G::serialize_element(&self.random_element, &mut bytes[..G::ELEMENT_SIZE]);
        G::serialize_element(&self.blinded_element, &mut bytes[G::ELEMENT_SIZE..]);
        bytes
    }

    /// Parses a ciphertext serialized with [`Self::to_bytes()`]. Returns `None` if `bytes`
    /// do not represent a pair of group elements.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 2 * G::ELEMENT_SIZE {
            return None;
        }
        let random_element = G::deserialize_element(&bytes[..G::ELEMENT_SIZE])?;
        let blinded_element = G::deserialize_element(&bytes[G::ELEMENT_SIZE..])?;
        Some(Self {
            random_element,
            blinded_element,
        })
    }
}

impl<G: Group> ops::Add for Ciphertext<G> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            random_element: self.random_element + rhs.random_element,
            blinded_element: self.blinded_element + rhs.blinded_element,
        }
    }
}

impl<G: Group> ops::AddAssign for Ciphertext<G> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<G: Group> ops::Sub for Ciphertext<G> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            random_element: self.random_element - rhs.random_element,
            blinded_element: self.blinded_element - rhs.blinded_element,
        }
    }
}

impl<G: Group> ops::Mul<&G::Scalar> for Ciphertext<G> {
    type Output = Self;

    fn mul(self, rhs: &G::Scalar) -> Self {
        Self {
            random_element: self.random_element * rhs,
            blinded_element: self.blinded_element * rhs,
        }
    }
}

impl<G: Group> PublicKey<G> {
    /// Encrypts a value for this key.
    pub fn encrypt<T, R: CryptoRng + RngCore>(&self, value: T, rng: &mut R) -> Ciphertext<G>
    where
        G::Scalar: From<T>,
    {
        let element = G::mul_generator(&G::Scalar::from(value));
        self.encrypt_element(element, rng)
    }

    /// Encrypts a group element for this key.
    pub fn encrypt_element<R: CryptoRng + RngCore>(
        &self,
        value: G::Element,
        rng: &mut R,
    ) -> Ciphertext<G> {
        let random_scalar = SecretKey::<G>::generate(rng);
        let random_element = G::mul_generator(random_scalar.expose_scalar());
        let dh_element = self.as_element() * random_scalar.expose_scalar();
        Ciphertext {
            random_element,
            blinded_element: value + dh_element,
        }
    }
}

impl<G: Group> SecretKey<G> {
    /// Decrypts the provided ciphertext and returns the produced group element.
    ///
    /// As the ciphertext does not include a MAC or another way to assert integrity,
    /// this operation cannot fail. If the ciphertext is not produced properly (e.g., it targets
    /// another receiver), the returned group element will be garbage.
    pub fn decrypt_to_element(&self, encrypted: Ciphertext<G>) -> G::Element {
        let dh_element = encrypted.random_element * self.expose_scalar();
        encrypted.blinded_element - dh_element
    }
}
