//! Schnorr signatures over prime order groups (or subgroups)

use core::fmt::{self, Debug};

use crate::{Element, Error, Field, Group, Scalar};

/// A Schnorr signature over some prime order group (or subgroup).
///
/// Signatures produced by FROST aggregation are indistinguishable from
/// single-party Schnorr signatures and verify under the group public key.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Signature<G: Group> {
    /// The commitment `R` to the signature nonce.
    pub(crate) R: Element<G>,
    /// The response `z` to the challenge computed from the commitment `R`,
    /// the group public key, and the message.
    pub(crate) z: Scalar<G>,
}

impl<G> Signature<G>
where
    G: Group,
{
    /// Create a signature from its commitment point and response scalar.
    pub fn new(R: Element<G>, z: Scalar<G>) -> Self {
        Self { R, z }
    }

    /// The commitment point R.
    pub fn R(&self) -> Element<G> {
        self.R
    }

    /// The response scalar z.
    pub fn z(&self) -> Scalar<G> {
        self.z
    }

    /// Converts this signature to bytes: `R || z` in their canonical
    /// encodings.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend_from_slice(G::serialize(&self.R).as_ref());
        bytes.extend_from_slice(<G::Field as Field>::serialize(&self.z).as_ref());
        bytes
    }

    /// Converts bytes into a `Signature`, rejecting buffers of the wrong
    /// length and invalid point encodings.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let r_len = G::serialize(&G::generator()).as_ref().len();
        let z_len = <G::Field as Field>::serialize(&<G::Field as Field>::zero())
            .as_ref()
            .len();

        if bytes.len() != r_len + z_len {
            return Err(Error::MalformedEncoding);
        }

        let r_serialization = G::Serialization::try_from(bytes[..r_len].to_vec())
            .map_err(|_| Error::MalformedEncoding)?;

        Ok(Self {
            R: G::deserialize(&r_serialization)?,
            z: <G::Field as Field>::deserialize(&bytes[r_len..]),
        })
    }
}

impl<G: Group> Debug for Signature<G> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signature")
            .field("R", &hex::encode(G::serialize(&self.R)))
            .field(
                "z",
                &hex::encode(<G::Field as Field>::serialize(&self.z)),
            )
            .finish()
    }
}
