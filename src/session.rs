//! High-level session management for DKG ceremonies and signing operations.
//!
//! The session layer wraps the protocol core with lifecycle safety: it
//! bundles the round 1 DKG messages per participant, polices duplicate and
//! missing broadcasts, and guards signing nonces behind one-shot
//! [`SigningSession`] objects so a nonce can never be used for two
//! messages.

use core::fmt::{self, Debug};
use std::collections::BTreeMap;
use std::sync::Mutex;

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::dkg::{Participant, Round1Data, Round1PrivateData};
use crate::sign::{SignatureShare, SigningCommitment, SigningNonce};
use crate::{
    Element, Error, Field, Frost, Group, Hasher, Identifier, KeyShare, Sha256Hasher, Signature,
};

/// Manages a single participant's state throughout DKG and signing
/// ceremonies.
///
/// A session runs one DKG ceremony and can then create any number of
/// [`SigningSession`]s from the resulting key share.
pub struct Session<G: Group, H: Hasher<G> = Sha256Hasher> {
    id: u16,
    frost: Frost<G, H>,
    dkg_state: Option<Participant<G>>,
    key_share: Option<KeyShare<G>>,
    finalized: bool,
}

/// All messages generated during DKG round 1 by one participant.
pub struct Round1Output<G: Group> {
    /// The public commitment that must be broadcast to all participants.
    pub broadcast: Round1Data<G>,
    /// Private shares keyed by recipient participant id. Each share must be
    /// sent to its recipient over a confidential, authenticated channel.
    pub private_shares: BTreeMap<u16, Round1PrivateData<G>>,
}

/// All messages received by one participant during DKG round 1.
pub struct Round1Input<G: Group> {
    /// The public commitments from all participants, including this
    /// participant's own broadcast.
    pub broadcasts: Vec<Round1Data<G>>,
    /// The private shares sent to this participant by all other
    /// participants.
    pub private_shares: Vec<Round1PrivateData<G>>,
}

/// The output of a successful DKG ceremony.
#[derive(Clone)]
pub struct DkgResult<G: Group> {
    /// This participant's share of the distributed key. Store it securely;
    /// it is required for signing.
    pub key_share: KeyShare<G>,
    /// The combined public key for the threshold group, identical for all
    /// participants.
    pub group_key: Element<G>,
    /// Each participant's individual public key, derived by publicly
    /// evaluating the summed coefficient commitments at the participant's
    /// identifier.
    pub participant_keys: BTreeMap<u16, Element<G>>,
}

impl<G> Session<G, Sha256Hasher>
where
    G: Group,
{
    /// Creates a session for the participant with the given id using the
    /// default SHA-256 hasher.
    ///
    /// The id must be between 1 and `total`, inclusive.
    pub fn new(threshold: u16, total: u16, id: u16) -> Result<Self, Error> {
        Self::with_hasher(threshold, total, id, Sha256Hasher)
    }
}

impl<G, H> Session<G, H>
where
    G: Group,
    H: Hasher<G>,
{
    /// Creates a session with a custom hasher; all participants of a
    /// ceremony must use the same one.
    pub fn with_hasher(threshold: u16, total: u16, id: u16, hasher: H) -> Result<Self, Error> {
        if id < 1 || id > total {
            return Err(Error::InvalidParticipantId);
        }
        let frost = Frost::with_hasher(threshold, total, hasher)?;

        Ok(Self {
            id,
            frost,
            dkg_state: None,
            key_share: None,
            finalized: false,
        })
    }

    /// This participant's identifier.
    pub fn id(&self) -> u16 {
        self.id
    }

    /// This participant's key share, if DKG has completed.
    pub fn key_share(&self) -> Option<&KeyShare<G>> {
        self.key_share.as_ref()
    }

    /// The underlying FROST instance, for advanced use.
    pub fn frost(&self) -> &Frost<G, H> {
        &self.frost
    }

    /// Restores a previously saved key share, e.g. when resuming a
    /// participant from persistent storage.
    pub fn set_key_share(&mut self, key_share: KeyShare<G>) {
        self.key_share = Some(key_share);
        self.finalized = true;
    }

    /// Generates all round 1 DKG messages: the public broadcast and one
    /// private share per other participant.
    pub fn generate_round1<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        all_participant_ids: &[u16],
    ) -> Result<Round1Output<G>, Error> {
        if self.dkg_state.is_some() {
            return Err(Error::Round1AlreadyGenerated);
        }

        let participant = self.frost.new_participant(rng, self.id)?;
        let broadcast = participant.round1_broadcast();

        let mut private_shares = BTreeMap::new();
        for &recipient_id in all_participant_ids {
            if recipient_id == self.id {
                continue;
            }
            let share = self.frost.round1_private_send(&participant, recipient_id)?;
            private_shares.insert(recipient_id, share);
        }

        self.dkg_state = Some(participant);

        Ok(Round1Output {
            broadcast,
            private_shares,
        })
    }

    /// Processes the received round 1 messages and completes the DKG.
    ///
    /// The input must contain broadcasts from every participant (including
    /// this one, exactly once each) and the private shares addressed to this
    /// participant from every other participant. Every share is verified
    /// against its sender's commitments before it is accepted; any invalid
    /// share aborts the ceremony.
    pub fn process_round1(&mut self, input: &Round1Input<G>) -> Result<DkgResult<G>, Error> {
        if self.finalized {
            return Err(Error::DkgAlreadyFinalized);
        }
        let mut participant = self.dkg_state.take().ok_or(Error::DkgNotComplete)?;
        let own_id = participant.id();

        let result = self.run_round1(&mut participant, input, own_id);
        match result {
            Ok(()) => {
                let total = self.frost.total();
                let participant_keys = participant_keys(&input.broadcasts, total)?;
                let key_share = self.frost.finalize(participant, &input.broadcasts)?;
                let group_key = key_share.group_key();

                self.key_share = Some(key_share.clone());
                self.finalized = true;

                Ok(DkgResult {
                    key_share,
                    group_key,
                    participant_keys,
                })
            }
            Err(e) => {
                // A failed ceremony cannot be resumed; drop the state.
                participant.zeroize();
                Err(e)
            }
        }
    }

    fn run_round1(
        &self,
        participant: &mut Participant<G>,
        input: &Round1Input<G>,
        own_id: Identifier<G>,
    ) -> Result<(), Error> {
        let total = self.frost.total();

        // Exactly one broadcast per expected participant.
        let mut broadcasts_by_id: BTreeMap<Identifier<G>, &Round1Data<G>> = BTreeMap::new();
        for broadcast in &input.broadcasts {
            if broadcasts_by_id.insert(broadcast.id(), broadcast).is_some() {
                return Err(Error::DuplicatedParticipant);
            }
        }
        if broadcasts_by_id.len() != total as usize {
            return Err(Error::IncorrectNumberOfBroadcasts);
        }
        for id in 1..=total {
            let identifier = Identifier::try_from(id)?;
            if !broadcasts_by_id.contains_key(&identifier) {
                return Err(Error::MissingBroadcast);
            }
        }

        // Verify and accept each private share.
        for share in &input.private_shares {
            if share.to_id() != own_id {
                return Err(Error::WrongRecipient);
            }
            if share.from_id() == own_id {
                return Err(Error::DuplicatedParticipant);
            }
            let sender_broadcast = broadcasts_by_id
                .get(&share.from_id())
                .ok_or(Error::MissingBroadcast)?;
            self.frost
                .round2_receive_share(participant, share, sender_broadcast.commitments())?;
        }

        // One share from every other participant.
        if participant.received_shares.len() != (total - 1) as usize {
            return Err(Error::IncorrectNumberOfShares);
        }

        Ok(())
    }

    /// Creates a one-shot signing session over `message`.
    ///
    /// Fresh nonces are drawn immediately; the returned session exposes the
    /// commitment to broadcast and must be consumed by exactly one
    /// [`SigningSession::sign`] call.
    pub fn signing_session<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        message: &[u8],
    ) -> Result<SigningSession<G, H>, Error> {
        let key_share = self.key_share.as_ref().ok_or(Error::DkgNotComplete)?;

        let (nonce, commitment) = self.frost.sign_round1(rng, key_share)?;

        Ok(SigningSession {
            frost: self.frost.clone(),
            key_share: key_share.clone(),
            // Defensive copy; the message must not change under the session.
            message: message.to_vec(),
            commitment,
            state: Mutex::new(SessionState {
                nonce: Some(nonce),
                consumed: false,
            }),
        })
    }
}

impl<G, H> Debug for Session<G, H>
where
    G: Group,
    H: Hasher<G>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("finalized", &self.finalized)
            .finish()
    }
}

/// Derives every participant's public key from the round 1 broadcasts by
/// evaluating the summed coefficient commitments at each identifier.
fn participant_keys<G: Group>(
    broadcasts: &[Round1Data<G>],
    total: u16,
) -> Result<BTreeMap<u16, Element<G>>, Error> {
    // Sum the commitment vectors across all broadcasts.
    let threshold = broadcasts
        .first()
        .ok_or(Error::IncorrectNumberOfBroadcasts)?
        .commitments()
        .len();
    let mut summed = vec![G::identity(); threshold];
    for broadcast in broadcasts {
        if broadcast.commitments().len() != threshold {
            return Err(Error::IncorrectNumberOfCommitments);
        }
        for (sum, commitment) in summed.iter_mut().zip(broadcast.commitments()) {
            *sum = *sum + *commitment;
        }
    }

    // Y_j = sum_i(j^i * C_i) over the summed commitments.
    let mut keys = BTreeMap::new();
    for id in 1..=total {
        let x = Identifier::<G>::try_from(id)?.to_scalar();
        let mut x_power = <G::Field as Field>::one();
        let mut key = G::identity();
        for commitment in &summed {
            key = key + *commitment * x_power;
            x_power = x_power * x;
        }
        keys.insert(id, key);
    }
    Ok(keys)
}

impl<G> Debug for DkgResult<G>
where
    G: Group,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DkgResult")
            .field("key_share", &self.key_share)
            .field("group_key", &hex::encode(G::serialize(&self.group_key)))
            .finish()
    }
}

struct SessionState<G: Group> {
    nonce: Option<SigningNonce<G>>,
    consumed: bool,
}

/// A single signing operation with built-in nonce safety.
///
/// Each session can be used exactly once; a second [`SigningSession::sign`]
/// call deterministically fails with [`Error::SessionConsumed`]. The nonce
/// material is zeroized as soon as signing completes, successfully or not,
/// and in the drop path if the session is abandoned.
pub struct SigningSession<G: Group, H: Hasher<G> = Sha256Hasher> {
    frost: Frost<G, H>,
    key_share: KeyShare<G>,
    message: Vec<u8>,
    commitment: SigningCommitment<G>,
    state: Mutex<SessionState<G>>,
}

impl<G, H> SigningSession<G, H>
where
    G: Group,
    H: Hasher<G>,
{
    /// The public commitment to broadcast to the other signers.
    pub fn commitment(&self) -> SigningCommitment<G> {
        self.commitment
    }

    /// The message being signed.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Produces this participant's signature share.
    ///
    /// `all_commitments` must contain the commitments of every participating
    /// signer, including this session's own. The call consumes the session:
    /// any further call fails with [`Error::SessionConsumed`].
    pub fn sign(
        &self,
        all_commitments: &[SigningCommitment<G>],
    ) -> Result<SignatureShare<G>, Error> {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if state.consumed {
            return Err(Error::SessionConsumed);
        }
        // Mark as consumed before any operation that might fail.
        state.consumed = true;

        let mut nonce = match state.nonce.take() {
            Some(nonce) => nonce,
            None => return Err(Error::SessionConsumed),
        };

        let result = match all_commitments
            .iter()
            .find(|commitment| commitment.id() == self.commitment.id())
        {
            None => Err(Error::MissingCommitment),
            Some(found) if *found != self.commitment => Err(Error::IncorrectCommitment),
            Some(_) => {
                self.frost
                    .sign_round2(&self.key_share, &nonce, &self.message, all_commitments)
            }
        };

        nonce.zeroize();
        result
    }

    /// Whether this session has already been used for signing.
    pub fn is_consumed(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .consumed
    }
}

impl<G, H> Debug for SigningSession<G, H>
where
    G: Group,
    H: Hasher<G>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSession")
            .field("commitment", &self.commitment)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// Combines signature shares into a final signature, checking that the
/// share and commitment lists are consistent.
///
/// This is typically called by a coordinator after collecting shares from
/// all participating signers.
pub fn aggregate<G, H>(
    frost: &Frost<G, H>,
    message: &[u8],
    commitments: &[SigningCommitment<G>],
    shares: &[SignatureShare<G>],
) -> Result<Signature<G>, Error>
where
    G: Group,
    H: Hasher<G>,
{
    if shares.is_empty() || commitments.is_empty() || shares.len() != commitments.len() {
        return Err(Error::IncorrectNumberOfShares);
    }

    frost.aggregate(message, commitments, shares)
}

/// Checks a signature against a message and group key, surfacing failure as
/// [`Error::InvalidSignature`].
pub fn verify<G, H>(
    frost: &Frost<G, H>,
    message: &[u8],
    signature: &Signature<G>,
    group_key: &Element<G>,
) -> Result<(), Error>
where
    G: Group,
    H: Hasher<G>,
{
    if frost.verify(message, signature, group_key) {
        Ok(())
    } else {
        Err(Error::InvalidSignature)
    }
}

/// Performs a complete signing operation with all key shares in-process.
///
/// Useful for tests and single-machine threshold setups; distributed
/// deployments should use [`SigningSession`] instead. At least `threshold`
/// key shares must be provided.
pub fn quick_sign<G, H, R>(
    frost: &Frost<G, H>,
    rng: &mut R,
    key_shares: &[KeyShare<G>],
    message: &[u8],
) -> Result<Signature<G>, Error>
where
    G: Group,
    H: Hasher<G>,
    R: RngCore + CryptoRng,
{
    if key_shares.is_empty() {
        return Err(Error::IncorrectNumberOfShares);
    }

    let mut nonces = Vec::with_capacity(key_shares.len());
    let mut commitments = Vec::with_capacity(key_shares.len());
    for key_share in key_shares {
        let (nonce, commitment) = frost.sign_round1(rng, key_share)?;
        nonces.push(nonce);
        commitments.push(commitment);
    }

    let mut shares = Vec::with_capacity(key_shares.len());
    for (key_share, nonce) in key_shares.iter().zip(nonces.iter_mut()) {
        let share = frost.sign_round2(key_share, nonce, message, &commitments);
        nonce.zeroize();
        shares.push(share?);
    }

    frost.aggregate(message, &commitments, &shares)
}
