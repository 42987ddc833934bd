//! FROST participant identifiers

use core::fmt::{self, Debug};

use crate::{Error, Field, FieldError, Group, Scalar};

/// A FROST participant identifier.
///
/// The identifier is a field element in the scalar field that the secret
/// polynomial is defined over, corresponding to some x-coordinate for a
/// polynomial f(x) = y. MUST NOT be zero in the field, as f(0) = the shared
/// secret.
///
/// Participants are conventionally numbered 1..=n; the small integer is
/// embedded big-endian into the scalar encoding, so for n < 256 the encoded
/// identifier is 31 zero bytes followed by the integer.
#[derive(Copy, Clone)]
pub struct Identifier<G: Group>(Scalar<G>);

impl<G> Identifier<G>
where
    G: Group,
{
    /// Create a new identifier from a scalar, rejecting zero.
    pub(crate) fn new(scalar: Scalar<G>) -> Result<Self, Error> {
        if <G::Field as Field>::is_zero(&scalar) {
            Err(FieldError::InvalidZeroScalar.into())
        } else {
            Ok(Self(scalar))
        }
    }

    /// Get the inner scalar.
    pub(crate) fn to_scalar(&self) -> Scalar<G> {
        self.0
    }

    /// Serialize the identifier to its canonical big-endian scalar encoding.
    pub fn serialize(&self) -> <G::Field as Field>::Serialization {
        <G::Field as Field>::serialize(&self.0)
    }

    /// Deserialize an identifier from a serialized buffer.
    ///
    /// The value is reduced modulo the group order; a zero identifier is
    /// rejected.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::new(<G::Field as Field>::deserialize(bytes))
    }
}

impl<G> PartialEq for Identifier<G>
where
    G: Group,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<G> Eq for Identifier<G> where G: Group {}

impl<G> Debug for Identifier<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Identifier")
            .field(&hex::encode(self.serialize()))
            .finish()
    }
}

impl<G> Ord for Identifier<G>
where
    G: Group,
{
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        // The canonical encoding is fixed-width big-endian, so lexicographic
        // byte order matches numeric order.
        self.serialize().as_ref().cmp(other.serialize().as_ref())
    }
}

impl<G> PartialOrd for Identifier<G>
where
    G: Group,
{
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<G> TryFrom<u16> for Identifier<G>
where
    G: Group,
{
    type Error = Error;

    fn try_from(n: u16) -> Result<Identifier<G>, Self::Error> {
        if n == 0 {
            Err(FieldError::InvalidZeroScalar.into())
        } else {
            // Classic left-to-right double-and-add that skips the leading
            // bit 1 (identifiers are never zero, so there always is one).
            let one = <G::Field as Field>::one();
            let mut sum = <G::Field as Field>::one();

            let bits = (n.to_be_bytes().len() as u32) * 8;
            for i in (0..(bits - n.leading_zeros() - 1)).rev() {
                sum = sum + sum;
                if n & (1 << i) != 0 {
                    sum = sum + one;
                }
            }
            Self::new(sum)
        }
    }
}
