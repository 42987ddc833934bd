//! FROST two-round signing: nonce generation, signature shares, aggregation
//! and verification.
//!
//! Binding-factor and group-commitment computations depend on the order of
//! the commitment list, so [`Frost::sign_round2`] and [`Frost::aggregate`]
//! sort commitments by participant identifier before hashing; every signer
//! and the aggregator therefore operate on the same canonical list.

use core::fmt::{self, Debug};

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::{
    Element, Error, Field, Frost, Group, Hasher, Identifier, KeyShare, Scalar, Signature,
};

/// A participant's nonce pair for one signing operation.
///
/// Note that a `SigningNonce` must be used *only once*; re-using nonces
/// leaks the participant's long-lived secret share. The nonce scalars are
/// zeroized when the value is dropped; the session layer additionally
/// zeroizes them as soon as a signature share has been produced.
pub struct SigningNonce<G: Group> {
    pub(crate) id: Identifier<G>,
    /// The hiding nonce d.
    pub(crate) d: Scalar<G>,
    /// The binding nonce e.
    pub(crate) e: Scalar<G>,
}

impl<G> SigningNonce<G>
where
    G: Group,
{
    /// The identifier of the participant holding this nonce.
    pub fn id(&self) -> Identifier<G> {
        self.id
    }
}

impl<G> Debug for SigningNonce<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningNonce")
            .field("id", &self.id)
            .field("d", &"<redacted>")
            .field("e", &"<redacted>")
            .finish()
    }
}

impl<G> Zeroize for SigningNonce<G>
where
    G: Group,
{
    fn zeroize(&mut self) {
        self.d = <G::Field as Field>::zero();
        self.e = <G::Field as Field>::zero();
    }
}

impl<G> Drop for SigningNonce<G>
where
    G: Group,
{
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// A participant's commitment to their signing nonces, broadcast in round 1
/// of signing.
#[derive(Clone, Copy, PartialEq)]
pub struct SigningCommitment<G: Group> {
    pub(crate) id: Identifier<G>,
    /// `d * G`.
    pub(crate) hiding_point: Element<G>,
    /// `e * G`.
    pub(crate) binding_point: Element<G>,
}

impl<G> SigningCommitment<G>
where
    G: Group,
{
    /// The identifier of the committing participant.
    pub fn id(&self) -> Identifier<G> {
        self.id
    }

    /// The commitment to the hiding nonce.
    pub fn hiding_point(&self) -> Element<G> {
        self.hiding_point
    }

    /// The commitment to the binding nonce.
    pub fn binding_point(&self) -> Element<G> {
        self.binding_point
    }

    /// Encodes the commitment as `id || D || E`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend_from_slice(self.id.serialize().as_ref());
        bytes.extend_from_slice(G::serialize(&self.hiding_point).as_ref());
        bytes.extend_from_slice(G::serialize(&self.binding_point).as_ref());
        bytes
    }

    /// Decodes a commitment from its `id || D || E` encoding.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let id_len = <G::Field as Field>::serialize(&<G::Field as Field>::zero())
            .as_ref()
            .len();
        let element_len = G::serialize(&G::generator()).as_ref().len();
        if bytes.len() != id_len + 2 * element_len {
            return Err(Error::MalformedEncoding);
        }

        let deserialize_element = |chunk: &[u8]| -> Result<Element<G>, Error> {
            let buf = G::Serialization::try_from(chunk.to_vec())
                .map_err(|_| Error::MalformedEncoding)?;
            Ok(G::deserialize(&buf)?)
        };

        Ok(Self {
            id: Identifier::deserialize(&bytes[..id_len])?,
            hiding_point: deserialize_element(&bytes[id_len..id_len + element_len])?,
            binding_point: deserialize_element(&bytes[id_len + element_len..])?,
        })
    }
}

impl<G> Debug for SigningCommitment<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningCommitment")
            .field("id", &self.id)
            .field("hiding_point", &hex::encode(G::serialize(&self.hiding_point)))
            .field(
                "binding_point",
                &hex::encode(G::serialize(&self.binding_point)),
            )
            .finish()
    }
}

/// A participant's share of the final signature, produced in round 2.
#[derive(Clone, Copy, PartialEq)]
pub struct SignatureShare<G: Group> {
    pub(crate) id: Identifier<G>,
    pub(crate) z: Scalar<G>,
}

impl<G> SignatureShare<G>
where
    G: Group,
{
    /// The identifier of the participant that produced this share.
    pub fn id(&self) -> Identifier<G> {
        self.id
    }

    /// The response scalar of this share.
    pub fn z(&self) -> Scalar<G> {
        self.z
    }

    /// Encodes the share as `id || z`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend_from_slice(self.id.serialize().as_ref());
        bytes.extend_from_slice(<G::Field as Field>::serialize(&self.z).as_ref());
        bytes
    }

    /// Decodes a share from its `id || z` encoding.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let scalar_len = <G::Field as Field>::serialize(&<G::Field as Field>::zero())
            .as_ref()
            .len();
        if bytes.len() != 2 * scalar_len {
            return Err(Error::MalformedEncoding);
        }

        Ok(Self {
            id: Identifier::deserialize(&bytes[..scalar_len])?,
            z: <G::Field as Field>::deserialize(&bytes[scalar_len..]),
        })
    }
}

impl<G> Debug for SignatureShare<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureShare")
            .field("id", &self.id)
            .field("z", &hex::encode(<G::Field as Field>::serialize(&self.z)))
            .finish()
    }
}

/// Returns the commitments sorted by identifier ascending, rejecting
/// duplicated identifiers.
fn sorted_commitments<G: Group>(
    commitments: &[SigningCommitment<G>],
) -> Result<Vec<SigningCommitment<G>>, Error> {
    let mut sorted = commitments.to_vec();
    sorted.sort_by_key(|commitment| commitment.id);
    for window in sorted.windows(2) {
        if window[0].id == window[1].id {
            return Err(Error::DuplicatedParticipant);
        }
    }
    Ok(sorted)
}

/// Encodes the commitment list as the concatenation of `id || D || E` in
/// list order.
fn encode_commitment_list<G: Group>(commitments: &[SigningCommitment<G>]) -> Vec<u8> {
    let mut bytes = vec![];
    for commitment in commitments {
        bytes.extend_from_slice(&commitment.serialize());
    }
    bytes
}

/// Computes the Lagrange coefficient for `signer_id` over the signer set
/// given by `commitments`: the product of `id_j / (id_j - signer_id)` over
/// all other signers.
fn lagrange_coefficient<G: Group>(
    signer_id: Identifier<G>,
    commitments: &[SigningCommitment<G>],
) -> Result<Scalar<G>, Error> {
    let mut num = <G::Field as Field>::one();
    let mut den = <G::Field as Field>::one();

    for commitment in commitments {
        if commitment.id == signer_id {
            continue;
        }
        num = num * commitment.id.to_scalar();
        den = den * (commitment.id.to_scalar() - signer_id.to_scalar());
    }

    // A zero denominator means two signers share an identifier.
    if <G::Field as Field>::is_zero(&den) {
        return Err(Error::DuplicatedParticipant);
    }

    Ok(num * <G::Field as Field>::invert(&den)?)
}

impl<G, H> Frost<G, H>
where
    G: Group,
    H: Hasher<G>,
{
    /// Generates the nonce pair and the matching public commitment for one
    /// signing operation.
    pub fn sign_round1<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        key_share: &KeyShare<G>,
    ) -> Result<(SigningNonce<G>, SigningCommitment<G>), Error> {
        let d = <G::Field as Field>::random(rng)?;
        let e = <G::Field as Field>::random(rng)?;

        let nonce = SigningNonce {
            id: key_share.id,
            d,
            e,
        };
        let commitment = SigningCommitment {
            id: key_share.id,
            hiding_point: G::generator() * d,
            binding_point: G::generator() * e,
        };

        Ok((nonce, commitment))
    }

    /// Computes the per-signer binding factors for the (sorted) commitment
    /// list, index-aligned with it.
    fn binding_factors(
        &self,
        message: &[u8],
        commitments: &[SigningCommitment<G>],
    ) -> Vec<Scalar<G>> {
        let encoded_list = encode_commitment_list(commitments);
        commitments
            .iter()
            .map(|commitment| {
                self.hasher().H1(
                    message,
                    &encoded_list,
                    commitment.id.serialize().as_ref(),
                )
            })
            .collect()
    }

    /// Computes the group commitment `R = sum_j(D_j + rho_j * E_j)`.
    ///
    /// Identity hiding or binding points are rejected; accepting them would
    /// let a party cancel out another signer's nonce contribution.
    fn group_commitment(
        &self,
        commitments: &[SigningCommitment<G>],
        binding_factors: &[Scalar<G>],
    ) -> Result<Element<G>, Error> {
        let mut group_commitment = G::identity();
        for (commitment, rho) in commitments.iter().zip(binding_factors) {
            if G::is_identity(&commitment.hiding_point) || G::is_identity(&commitment.binding_point)
            {
                return Err(Error::IdentityCommitment);
            }
            group_commitment =
                group_commitment + commitment.hiding_point + commitment.binding_point * *rho;
        }
        Ok(group_commitment)
    }

    /// Produces this signer's signature share over `message`.
    ///
    /// `commitments` must contain the round 1 commitments of every signer
    /// participating in this operation, including the caller's own; order
    /// does not matter, the list is sorted by identifier internally.
    pub fn sign_round2(
        &self,
        key_share: &KeyShare<G>,
        nonce: &SigningNonce<G>,
        message: &[u8],
        commitments: &[SigningCommitment<G>],
    ) -> Result<SignatureShare<G>, Error> {
        if commitments.len() < self.threshold() as usize {
            return Err(Error::IncorrectNumberOfCommitments);
        }

        let commitments = sorted_commitments(commitments)?;
        let binding_factors = self.binding_factors(message, &commitments);

        let own_index = commitments
            .iter()
            .position(|commitment| commitment.id == key_share.id)
            .ok_or(Error::MissingCommitment)?;
        let rho = binding_factors[own_index];

        let group_commitment = self.group_commitment(&commitments, &binding_factors)?;

        let challenge = self.hasher().H2(
            G::serialize(&group_commitment).as_ref(),
            G::serialize(&key_share.group_key).as_ref(),
            message,
        );

        let lambda = lagrange_coefficient(key_share.id, &commitments)?;

        // z = d + rho * e + lambda * s * c
        let z = nonce.d + rho * nonce.e + lambda * key_share.secret_key * challenge;

        Ok(SignatureShare {
            id: key_share.id,
            z,
        })
    }

    /// Combines signature shares into the final signature.
    ///
    /// The group commitment R is recomputed from the same commitment list
    /// the signers used; the response is the sum of all shares.
    pub fn aggregate(
        &self,
        message: &[u8],
        commitments: &[SigningCommitment<G>],
        shares: &[SignatureShare<G>],
    ) -> Result<Signature<G>, Error> {
        let commitments = sorted_commitments(commitments)?;
        let binding_factors = self.binding_factors(message, &commitments);
        let group_commitment = self.group_commitment(&commitments, &binding_factors)?;

        let mut z = <G::Field as Field>::zero();
        for share in shares {
            z = z + share.z;
        }

        Ok(Signature {
            R: group_commitment,
            z,
        })
    }

    /// Checks a FROST signature against a message and the group public key.
    ///
    /// Accepts iff `z * G == R + c * group_key` with
    /// `c = H2(R, group_key, message)`. Verification never signals a
    /// transient failure; the result is simply true or false.
    pub fn verify(&self, message: &[u8], signature: &Signature<G>, group_key: &Element<G>) -> bool {
        let challenge = self.hasher().H2(
            G::serialize(&signature.R).as_ref(),
            G::serialize(group_key).as_ref(),
            message,
        );

        let lhs = G::generator() * signature.z;
        let rhs = signature.R + *group_key * challenge;

        lhs == rhs
    }
}
