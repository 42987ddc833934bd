//! Traits used to abstract the prime-order group and its scalar field.

use core::{
    fmt::Debug,
    ops::{Add, Mul, Neg, Sub},
};

use rand_core::{CryptoRng, RngCore};

use crate::{FieldError, GroupError};

/// A prime order finite field GF(q) over which all scalar values for our prime
/// order group are defined.
///
/// This trait does not have to be implemented for a finite field scalar itself,
/// it can be a pass-through, implemented for a type just for the curve adapter,
/// and calls through to another implementation underneath, so that this trait
/// does not have to be implemented for types you don't own.
pub trait Field: Copy + Clone {
    /// An element of the scalar field GF(q).
    ///
    /// All arithmetic on values of this type is performed modulo q.
    type Scalar: Add<Output = Self::Scalar>
        + Sub<Output = Self::Scalar>
        + Mul<Output = Self::Scalar>
        + Neg<Output = Self::Scalar>
        + Copy
        + Clone
        + Eq
        + PartialEq;

    /// A unique byte array buf of fixed length N.
    type Serialization: AsRef<[u8]> + Debug + TryFrom<Vec<u8>>;

    /// Returns the zero element of the field, the additive identity.
    fn zero() -> Self::Scalar;

    /// Returns the one element of the field, the multiplicative identity.
    fn one() -> Self::Scalar;

    /// Computes the multiplicative inverse of an element of the scalar field,
    /// failing if the element is zero.
    fn invert(scalar: &Self::Scalar) -> Result<Self::Scalar, FieldError>;

    /// Returns true if the scalar is the zero element.
    fn is_zero(scalar: &Self::Scalar) -> bool;

    /// Samples a uniformly random scalar from the supplied entropy source.
    ///
    /// Fails with [`FieldError::RandomSourceFailure`] if the source errors;
    /// there is no silent fallback.
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self::Scalar, FieldError>;

    /// Maps a scalar to its canonical fixed-width big-endian byte encoding.
    fn serialize(scalar: &Self::Scalar) -> Self::Serialization;

    /// Maps a byte string of any length to a scalar, reducing the value
    /// modulo q. This is the permissive decoder used for hash outputs and
    /// small-integer identifiers; it cannot fail.
    fn deserialize(buf: &[u8]) -> Self::Scalar;

    /// Returns the big-endian byte encoding of the field order q.
    fn order() -> Vec<u8>;
}

/// An element of the [`Group`] `G`'s scalar [`Field`].
pub type Scalar<G> = <<G as Group>::Field as Field>::Scalar;

/// A prime-order group (or subgroup) that provides everything we need to
/// create and verify Schnorr signatures.
///
/// Like [`Field`], this trait can be a pass-through implemented for a marker
/// type owned by the curve adapter.
pub trait Group: Copy + Clone + PartialEq + Debug + 'static {
    /// A prime order finite field GF(q) over which all scalar values for our
    /// prime order group are defined.
    type Field: Field;

    /// An element of our group that we will be computing over.
    ///
    /// The additive identity is the neutral element; scalar multiplication
    /// is the action of [`Field::Scalar`] values on elements.
    type Element: Add<Output = Self::Element>
        + Sub<Output = Self::Element>
        + Neg<Output = Self::Element>
        + Mul<<Self::Field as Field>::Scalar, Output = Self::Element>
        + Copy
        + Clone
        + Eq
        + PartialEq;

    /// A unique byte array buf of fixed length N, the compressed canonical
    /// encoding of an element.
    type Serialization: AsRef<[u8]> + Debug + TryFrom<Vec<u8>>;

    /// Additive identity of the prime order group.
    fn identity() -> Self::Element;

    /// The fixed generator element of the prime order group.
    fn generator() -> Self::Element;

    /// Returns true if the element is the additive identity.
    fn is_identity(element: &Self::Element) -> bool;

    /// Maps an element to its unique compressed byte encoding.
    fn serialize(element: &Self::Element) -> Self::Serialization;

    /// Attempts to map a byte array `buf` to an element.
    ///
    /// Fails if the input is not a valid byte representation of an element
    /// of the prime-order subgroup.
    fn deserialize(buf: &Self::Serialization) -> Result<Self::Element, GroupError>;

    /// Hashes the concatenation of the inputs to a scalar.
    ///
    /// This is the adapter's internal default hash; the signing protocol
    /// itself uses the pluggable [`Hasher`](crate::Hasher) instead.
    fn hash_to_scalar(inputs: &[&[u8]]) -> <Self::Field as Field>::Scalar;
}

/// An element of the [`Group`] `G`.
pub type Element<G> = <G as Group>::Element;
