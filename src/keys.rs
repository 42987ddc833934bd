//! FROST key shares and polynomial helpers

use core::fmt::{self, Debug};

use zeroize::Zeroize;

use crate::{Element, Field, Group, Identifier, Scalar};

/// Evaluate the polynomial with the given coefficients (constant term first)
/// at the point x using Horner's method.
pub(crate) fn evaluate_polynomial<G: Group>(
    x: Scalar<G>,
    coefficients: &[Scalar<G>],
) -> Scalar<G> {
    let mut value = <G::Field as Field>::zero();

    for coeff in coefficients.iter().skip(1).rev() {
        value = value + *coeff;
        value = value * x;
    }
    value
        + *coefficients
            .first()
            .expect("coefficients must have at least one element")
}

/// A participant's share of the distributed secret key, together with the
/// public keys that go with it.
///
/// Key shares are produced by DKG finalization and consumed by signing.
/// The secret key must be kept private; the group key is identical across
/// all participants of a DKG run and verifies the group's signatures.
#[derive(Clone)]
pub struct KeyShare<G: Group> {
    pub(crate) id: Identifier<G>,
    pub(crate) secret_key: Scalar<G>,
    pub(crate) public_key: Element<G>,
    pub(crate) group_key: Element<G>,
}

impl<G> KeyShare<G>
where
    G: Group,
{
    /// Create a key share from its parts.
    ///
    /// Useful when restoring a share from external storage; the caller is
    /// responsible for the consistency of the fields.
    pub fn new(
        id: Identifier<G>,
        secret_key: Scalar<G>,
        public_key: Element<G>,
        group_key: Element<G>,
    ) -> Self {
        Self {
            id,
            secret_key,
            public_key,
            group_key,
        }
    }

    /// The participant identifier this share belongs to.
    pub fn id(&self) -> Identifier<G> {
        self.id
    }

    /// This participant's share of the group secret key.
    pub fn secret_key(&self) -> Scalar<G> {
        self.secret_key
    }

    /// The public key corresponding to this participant's secret share.
    pub fn public_key(&self) -> Element<G> {
        self.public_key
    }

    /// The combined group public key.
    pub fn group_key(&self) -> Element<G> {
        self.group_key
    }
}

impl<G> Debug for KeyShare<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyShare")
            .field("id", &self.id)
            .field("secret_key", &"<redacted>")
            .field("public_key", &hex::encode(G::serialize(&self.public_key)))
            .field("group_key", &hex::encode(G::serialize(&self.group_key)))
            .finish()
    }
}

impl<G> Zeroize for KeyShare<G>
where
    G: Group,
{
    fn zeroize(&mut self) {
        self.secret_key = <G::Field as Field>::zero();
    }
}
