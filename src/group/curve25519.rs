use curve25519_dalek::{
    constants::{ED25519_BASEPOINT_POINT, ED25519_BASEPOINT_TABLE},
    edwards::{CompressedEdwardsY, EdwardsPoint},
    scalar::Scalar,
    traits::{Identity, IsIdentity, MultiscalarMul, VartimeMultiscalarMul},
};
use rand_core::{CryptoRng, RngCore};

use core::convert::TryInto;

use crate::group::{ElementOps, Group, RandomBytesProvider, ScalarOps};

/// Prime-order subgroup of Curve25519 without any transforms performed for EC points.
///
/// Since the curve has cofactor 8, [`ElementOps::deserialize_element()`] explicitly checks
/// that each decoded point is torsion-free. Elements received from blinding trustees
/// are therefore rejected at the boundary if they leave the prime-order subgroup.
///
/// Prefer [`Ristretto`](crate::group::Ristretto) unless compatibility with Ed25519
/// encodings is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Curve25519Subgroup(());

impl ScalarOps for Curve25519Subgroup {
    type Scalar = Scalar;

    const SCALAR_SIZE: usize = 32;

    fn generate_scalar<R: CryptoRng + RngCore>(rng: &mut R) -> Self::Scalar {
        let mut scalar_bytes = [0_u8; 64];
        rng.fill_bytes(&mut scalar_bytes[..]);
        Scalar::from_bytes_mod_order_wide(&scalar_bytes)
    }

    fn scalar_from_random_bytes(source: RandomBytesProvider<'_>) -> Self::Scalar {
        let mut scalar_bytes = [0_u8; 64];
        source.fill_bytes(&mut scalar_bytes);
        Scalar::from_bytes_mod_order_wide(&scalar_bytes)
    }

    fn invert_scalar(scalar: Self::Scalar) -> Self::Scalar {
        scalar.invert()
    }

    fn invert_scalars(scalars: &mut [Self::Scalar]) {
        Scalar::batch_invert(scalars);
    }

    fn serialize_scalar(scalar: &Self::Scalar, buffer: &mut [u8]) {
        buffer.copy_from_slice(&scalar.to_bytes());
    }

    fn deserialize_scalar(buffer: &[u8]) -> Option<Self::Scalar> {
        let bytes: [u8; 32] = buffer.try_into().ok()?;
        Scalar::from_canonical_bytes(bytes).into()
    }
}

impl ElementOps for Curve25519Subgroup {
    type Element = EdwardsPoint;

    const ELEMENT_SIZE: usize = 32;

    fn identity() -> Self::Element {
        EdwardsPoint::identity()
    }

    fn is_identity(element: &Self::Element) -> bool {
        element.is_identity()
    }

    fn generator() -> Self::Element {
        ED25519_BASEPOINT_POINT
    }

    fn serialize_element(element: &Self::Element, buffer: &mut [u8]) {
        buffer.copy_from_slice(&element.compress().to_bytes());
    }

    fn deserialize_element(buffer: &[u8]) -> Option<Self::Element> {
        CompressedEdwardsY::from_slice(buffer)
            .ok()?
            .decompress()
            .filter(EdwardsPoint::is_torsion_free)
    }
}

impl Group for Curve25519Subgroup {
    fn mul_generator(k: &Scalar) -> Self::Element {
        k * ED25519_BASEPOINT_TABLE
    }

    fn vartime_mul_generator(k: &Scalar) -> Self::Element {
        EdwardsPoint::vartime_double_scalar_mul_basepoint(
            &Scalar::ZERO,
            &EdwardsPoint::identity(),
            k,
        )
    }

    fn multi_mul<'a, I, J>(scalars: I, elements: J) -> Self::Element
    where
        I: IntoIterator<Item = &'a Self::Scalar>,
        J: IntoIterator<Item = Self::Element>,
    {
        EdwardsPoint::multiscalar_mul(scalars, elements)
    }

    fn vartime_double_mul_generator(
        k: &Scalar,
        k_element: Self::Element,
        r: &Scalar,
    ) -> Self::Element {
        EdwardsPoint::vartime_double_scalar_mul_basepoint(k, &k_element, r)
    }

    fn vartime_multi_mul<'a, I, J>(scalars: I, elements: J) -> Self::Element
    where
        I: IntoIterator<Item = &'a Self::Scalar>,
        J: IntoIterator<Item = Self::Element>,
    {
        EdwardsPoint::vartime_multiscalar_mul(scalars, elements)
    }
}
