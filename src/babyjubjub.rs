//! An implementation of the group abstraction for the Baby Jubjub curve.
//!
//! Baby Jubjub is a twisted Edwards curve defined over the BN254 scalar
//! field, designed for efficient use inside zkSNARK circuits. The adapter
//! operates over the prime-order subgroup; scalars live in the field of the
//! subgroup order.

use ark_ec::{CurveGroup, Group as ArkGroup};
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective, Fr};
use ark_ff::{BigInteger, Field as ArkField, One, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::{Field, FieldError, Group, GroupError};

/// An implementation of the FROST Baby Jubjub scalar field.
#[derive(Clone, Copy)]
pub struct BabyJubjubScalarField;

impl Field for BabyJubjubScalarField {
    type Scalar = Fr;

    type Serialization = [u8; 32];

    fn zero() -> Self::Scalar {
        Fr::zero()
    }

    fn one() -> Self::Scalar {
        Fr::one()
    }

    fn invert(scalar: &Self::Scalar) -> Result<Self::Scalar, FieldError> {
        // `inverse` returns None exactly when the scalar is zero.
        scalar.inverse().ok_or(FieldError::InvalidZeroScalar)
    }

    fn is_zero(scalar: &Self::Scalar) -> bool {
        scalar.is_zero()
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self::Scalar, FieldError> {
        // Wide reduction of 64 uniform bytes keeps the modular bias
        // negligible for the ~251-bit order.
        let mut buf = [0u8; 64];
        rng.try_fill_bytes(&mut buf)
            .map_err(|_| FieldError::RandomSourceFailure)?;
        Ok(Fr::from_be_bytes_mod_order(&buf))
    }

    fn serialize(scalar: &Self::Scalar) -> Self::Serialization {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&scalar.into_bigint().to_bytes_be());
        bytes
    }

    fn deserialize(buf: &[u8]) -> Self::Scalar {
        Fr::from_be_bytes_mod_order(buf)
    }

    fn order() -> Vec<u8> {
        Fr::MODULUS.to_bytes_be()
    }
}

/// An implementation of the FROST group over the prime-order subgroup of
/// Baby Jubjub.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BabyJubjub;

impl Group for BabyJubjub {
    type Field = BabyJubjubScalarField;

    type Element = EdwardsProjective;

    /// The compressed twisted Edwards encoding takes 32 bytes: the
    /// y-coordinate with the sign of x packed into the unused high bits.
    type Serialization = [u8; 32];

    fn identity() -> Self::Element {
        EdwardsProjective::zero()
    }

    fn generator() -> Self::Element {
        <EdwardsProjective as ArkGroup>::generator()
    }

    fn is_identity(element: &Self::Element) -> bool {
        element.is_zero()
    }

    fn serialize(element: &Self::Element) -> Self::Serialization {
        let mut bytes = [0u8; 32];
        element
            .into_affine()
            .serialize_compressed(&mut bytes[..])
            .expect("a compressed affine point always fits in 32 bytes");
        bytes
    }

    fn deserialize(buf: &Self::Serialization) -> Result<Self::Element, GroupError> {
        // `deserialize_compressed` checks that the encoding is canonical,
        // that the point lies on the curve and that it is a member of the
        // prime-order subgroup.
        let point = EdwardsAffine::deserialize_compressed(&buf[..])
            .map_err(|_| GroupError::MalformedElement)?;
        Ok(point.into())
    }

    fn hash_to_scalar(inputs: &[&[u8]]) -> Fr {
        let mut hasher = Sha256::new();
        for input in inputs {
            hasher.update(input);
        }
        Fr::from_be_bytes_mod_order(&hasher.finalize())
    }
}
