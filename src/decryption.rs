//! Decryption shares.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::serde::ElementHelper;
use crate::{group::Group, Ciphertext};

/// Verified decryption share (or the Lagrange combination of several shares): the
/// Diffie–Hellman element `D = [s]A` for the pad `A` of a ciphertext.
///
/// Instances are created by guardians, by [`ElectionContext::verify_share()`] or by
/// [`Params::combine_shares()`].
///
/// [`ElectionContext::verify_share()`]: crate::ElectionContext::verify_share()
/// [`Params::combine_shares()`]: crate::sharing::Params::combine_shares()
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = ""))]
pub struct VerifiableDecryption<G: Group> {
    #[cfg_attr(feature = "serde", serde(with = "ElementHelper::<G>"))]
    dh_element: G::Element,
}

impl<G: Group> VerifiableDecryption<G> {
    pub(crate) fn from_element(dh_element: G::Element) -> Self {
        Self { dh_element }
    }

    /// Returns the Diffie–Hellman element.
    pub fn as_element(&self) -> &G::Element {
        &self.dh_element
    }

    /// Serializes this share into bytes.
    pub fn to_bytes(self) -> Vec<u8> {
        let mut bytes = vec![0_u8; G::ELEMENT_SIZE];
        G::serialize_element(&self.dh_element, &mut bytes);
        bytes
    }

    /// Decrypts `encrypted` to a group element: `T = B − D`. For a blinded ratio ciphertext,
    /// `T` is the identity iff the original ciphertexts encrypt the same value.
    pub fn decrypt_to_element(&self, encrypted: Ciphertext<G>) -> G::Element {
        encrypted.blinded_element - self.dh_element
    }
}

/// Decryption share received from an untrusted source. Must be verified against
/// a proof before it can be combined.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent, bound = ""))]
pub struct CandidateDecryption<G: Group> {
    inner: VerifiableDecryption<G>,
}

impl<G: Group> CandidateDecryption<G> {
    /// Deserializes a share from bytes. Returns `None` if `bytes` do not represent
    /// a group element.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() == G::ELEMENT_SIZE {
            let dh_element = G::deserialize_element(bytes)?;
            Some(Self {
                inner: VerifiableDecryption { dh_element },
            })
        } else {
            None
        }
    }

    pub(crate) fn dh_element(self) -> G::Element {
        self.inner.dh_element
    }
}

impl<G: Group> From<VerifiableDecryption<G>> for CandidateDecryption<G> {
    fn from(decryption: VerifiableDecryption<G>) -> Self {
        Self { inner: decryption }
    }
}
