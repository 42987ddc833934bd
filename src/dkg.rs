//! Distributed Key Generation functions and structures.
//!
//! The DKG supports generating FROST key shares in a distributed manner,
//! without a trusted dealer, via two rounds of communication between all
//! participants.
//!
//! Each of the `n` participants executes Feldman's Verifiable Secret Sharing
//! as the dealer in parallel, and derives their secret share as the sum of
//! the shares received from each of the `n` VSS executions. The key
//! generation stage requires participants to maintain a consistent view of
//! the public commitments to the secret polynomial coefficients, i.e. the
//! [`Round1Data`] broadcasts must travel over a secure broadcast channel,
//! while each [`Round1PrivateData`] share must travel over a confidential,
//! authenticated channel to its recipient only.

use core::fmt::{self, Debug};
use std::collections::BTreeMap;

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::keys::evaluate_polynomial;
use crate::{Element, Error, Field, Frost, Group, Hasher, Identifier, KeyShare, Scalar};

/// The public data broadcast by a participant during round 1 of the DKG.
///
/// `commitments[i] = a_i * G` where `a_0..a_{t-1}` are the coefficients of
/// the participant's secret polynomial.
#[derive(Clone, PartialEq)]
pub struct Round1Data<G: Group> {
    pub(crate) id: Identifier<G>,
    pub(crate) commitments: Vec<Element<G>>,
}

impl<G> Round1Data<G>
where
    G: Group,
{
    /// The identifier of the broadcasting participant.
    pub fn id(&self) -> Identifier<G> {
        self.id
    }

    /// The commitments to the broadcaster's polynomial coefficients.
    pub fn commitments(&self) -> &[Element<G>] {
        &self.commitments
    }

    /// Encodes the broadcast as `id || C_0 || .. || C_{t-1}`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend_from_slice(self.id.serialize().as_ref());
        for commitment in &self.commitments {
            bytes.extend_from_slice(G::serialize(commitment).as_ref());
        }
        bytes
    }

    /// Decodes a broadcast from its `id || C_0 || .. || C_{t-1}` encoding.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let id_len = <G::Field as Field>::serialize(&<G::Field as Field>::zero())
            .as_ref()
            .len();
        let element_len = G::serialize(&G::generator()).as_ref().len();

        if bytes.len() < id_len + element_len || (bytes.len() - id_len) % element_len != 0 {
            return Err(Error::MalformedEncoding);
        }

        let id = Identifier::deserialize(&bytes[..id_len])?;
        let commitments = bytes[id_len..]
            .chunks(element_len)
            .map(|chunk| {
                let buf = G::Serialization::try_from(chunk.to_vec())
                    .map_err(|_| Error::MalformedEncoding)?;
                Ok(G::deserialize(&buf)?)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self { id, commitments })
    }
}

impl<G> Debug for Round1Data<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Round1Data")
            .field("id", &self.id)
            .field(
                "commitments",
                &self
                    .commitments
                    .iter()
                    .map(|c| hex::encode(G::serialize(c)))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The private share sent from one participant to another during round 1 of
/// the DKG.
///
/// # Security
///
/// The share is the sender's polynomial evaluated at the recipient's
/// identifier and must be sent over a confidential, authenticated channel.
#[derive(Clone, Copy, PartialEq)]
pub struct Round1PrivateData<G: Group> {
    pub(crate) from_id: Identifier<G>,
    pub(crate) to_id: Identifier<G>,
    pub(crate) share: Scalar<G>,
}

impl<G> Round1PrivateData<G>
where
    G: Group,
{
    /// The sender's participant identifier.
    pub fn from_id(&self) -> Identifier<G> {
        self.from_id
    }

    /// The intended recipient's participant identifier.
    pub fn to_id(&self) -> Identifier<G> {
        self.to_id
    }

    /// The secret share itself.
    pub fn share(&self) -> Scalar<G> {
        self.share
    }

    /// Encodes the share as `from || to || share`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend_from_slice(self.from_id.serialize().as_ref());
        bytes.extend_from_slice(self.to_id.serialize().as_ref());
        bytes.extend_from_slice(<G::Field as Field>::serialize(&self.share).as_ref());
        bytes
    }

    /// Decodes a share from its `from || to || share` encoding.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let scalar_len = <G::Field as Field>::serialize(&<G::Field as Field>::zero())
            .as_ref()
            .len();
        if bytes.len() != 3 * scalar_len {
            return Err(Error::MalformedEncoding);
        }

        Ok(Self {
            from_id: Identifier::deserialize(&bytes[..scalar_len])?,
            to_id: Identifier::deserialize(&bytes[scalar_len..2 * scalar_len])?,
            share: <G::Field as Field>::deserialize(&bytes[2 * scalar_len..]),
        })
    }
}

impl<G> Debug for Round1PrivateData<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Round1PrivateData")
            .field("from_id", &self.from_id)
            .field("to_id", &self.to_id)
            .field("share", &"<redacted>")
            .finish()
    }
}

/// The state held by a single participant during the DKG.
///
/// Create instances with [`Frost::new_participant`]. The state is discarded
/// (and its secrets zeroized) once [`Frost::finalize`] produces a
/// [`KeyShare`].
pub struct Participant<G: Group> {
    pub(crate) id: Identifier<G>,
    pub(crate) coefficients: Vec<Scalar<G>>,
    pub(crate) commitments: Vec<Element<G>>,
    pub(crate) received_shares: BTreeMap<Identifier<G>, Scalar<G>>,
}

impl<G> Participant<G>
where
    G: Group,
{
    /// This participant's identifier.
    pub fn id(&self) -> Identifier<G> {
        self.id
    }

    /// Returns the public data that this participant must broadcast to all
    /// other participants.
    pub fn round1_broadcast(&self) -> Round1Data<G> {
        Round1Data {
            id: self.id,
            commitments: self.commitments.clone(),
        }
    }
}

impl<G> Debug for Participant<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("id", &self.id)
            .field("coefficients", &"<redacted>")
            .field("received_shares", &"<redacted>")
            .finish()
    }
}

impl<G> Zeroize for Participant<G>
where
    G: Group,
{
    fn zeroize(&mut self) {
        for coeff in self.coefficients.iter_mut() {
            *coeff = <G::Field as Field>::zero();
        }
        for share in self.received_shares.values_mut() {
            *share = <G::Field as Field>::zero();
        }
    }
}

impl<G, H> Frost<G, H>
where
    G: Group,
    H: Hasher<G>,
{
    /// Creates a new participant for the DKG.
    ///
    /// The id must be a unique integer from 1 to the total number of
    /// participants. The rng is used to sample the participant's secret
    /// polynomial of degree threshold - 1.
    pub fn new_participant<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        id: u16,
    ) -> Result<Participant<G>, Error> {
        let id = self.participant_id(id)?;

        let coefficients = (0..self.threshold())
            .map(|_| <G::Field as Field>::random(rng))
            .collect::<Result<Vec<_>, _>>()?;

        let commitments = coefficients
            .iter()
            .map(|coeff| G::generator() * *coeff)
            .collect();

        Ok(Participant {
            id,
            coefficients,
            commitments,
            received_shares: BTreeMap::new(),
        })
    }

    /// Computes the private share that `participant` must send to the given
    /// recipient: the participant's polynomial evaluated at the recipient's
    /// identifier.
    pub fn round1_private_send(
        &self,
        participant: &Participant<G>,
        recipient_id: u16,
    ) -> Result<Round1PrivateData<G>, Error> {
        let to_id = self.participant_id(recipient_id)?;
        let share = evaluate_polynomial::<G>(to_id.to_scalar(), &participant.coefficients);

        Ok(Round1PrivateData {
            from_id: participant.id,
            to_id,
            share,
        })
    }

    /// Verifies a received share against the sender's public commitments and
    /// stores it if valid.
    ///
    /// The Feldman check requires `share * G == sum_i(to^i * C_i)`. A share
    /// that fails the check indicates a faulty or malicious sender; it is
    /// reported as [`Error::InvalidSecretShare`] and not stored.
    pub fn round2_receive_share(
        &self,
        participant: &mut Participant<G>,
        data: &Round1PrivateData<G>,
        sender_commitments: &[Element<G>],
    ) -> Result<(), Error> {
        let lhs = G::generator() * data.share;

        let mut rhs = G::identity();
        let mut x_power = <G::Field as Field>::one();
        for commitment in sender_commitments {
            rhs = rhs + *commitment * x_power;
            x_power = x_power * data.to_id.to_scalar();
        }

        if lhs != rhs {
            return Err(Error::InvalidSecretShare);
        }

        participant
            .received_shares
            .insert(data.from_id, data.share);
        Ok(())
    }

    /// Completes the DKG for `participant`, computing their final key share.
    ///
    /// Call after all shares have been received and verified via
    /// [`Frost::round2_receive_share`]. `broadcasts` must contain exactly
    /// one [`Round1Data`] per participant, including the caller's own;
    /// policing duplicates and omissions is the caller's responsibility
    /// (the session layer enforces it).
    ///
    /// The DKG state is consumed and its secrets zeroized.
    pub fn finalize(
        &self,
        participant: Participant<G>,
        broadcasts: &[Round1Data<G>],
    ) -> Result<KeyShare<G>, Error> {
        let mut participant = participant;

        // Sum all received shares together with our own evaluation.
        let mut secret =
            evaluate_polynomial::<G>(participant.id.to_scalar(), &participant.coefficients);
        for share in participant.received_shares.values() {
            secret = secret + *share;
        }

        let public_key = G::generator() * secret;

        // The group key is the sum of all constant term commitments.
        let mut group_key = G::identity();
        for broadcast in broadcasts {
            group_key = group_key
                + *broadcast
                    .commitments
                    .first()
                    .ok_or(Error::MissingCommitment)?;
        }

        let key_share = KeyShare {
            id: participant.id,
            secret_key: secret,
            public_key,
            group_key,
        };

        participant.zeroize();

        Ok(key_share)
    }
}
