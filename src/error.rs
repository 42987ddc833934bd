//! FROST error types

use thiserror::Error;

/// An error related to FROST key generation, signing or session handling.
#[non_exhaustive]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// The threshold parameter is invalid.
    #[error("threshold must be at least 2")]
    InvalidThreshold,
    /// The total-participants parameter is invalid.
    #[error("total must be at least the threshold")]
    InvalidTotal,
    /// A participant identifier is outside the expected 1..=total range.
    #[error("participant id must be between 1 and the total number of participants")]
    InvalidParticipantId,
    /// The same participant appears more than once.
    #[error("Duplicated participant.")]
    DuplicatedParticipant,
    /// A broadcast from an expected participant is missing.
    #[error("Missing broadcast from participant.")]
    MissingBroadcast,
    /// The number of round 1 broadcasts does not match the number of participants.
    #[error("Incorrect number of broadcasts.")]
    IncorrectNumberOfBroadcasts,
    /// Feldman verification of a received secret share failed.
    #[error("Invalid secret share.")]
    InvalidSecretShare,
    /// A private share was addressed to a different participant.
    #[error("Share addressed to a different participant.")]
    WrongRecipient,
    /// Fewer commitments than the threshold were supplied to signing.
    #[error("Incorrect number of commitments.")]
    IncorrectNumberOfCommitments,
    /// The number of signature shares does not match the number of commitments.
    #[error("Incorrect number of signature shares.")]
    IncorrectNumberOfShares,
    /// The signer's own commitment is missing from the commitment list.
    #[error("The commitment list must contain the signer's commitment.")]
    MissingCommitment,
    /// The commitment in the list does not match the signer's own commitment.
    #[error("The signer's commitment is incorrect.")]
    IncorrectCommitment,
    /// A commitment equals the identity.
    #[error("Commitment equals the identity.")]
    IdentityCommitment,
    /// Signing was requested before DKG produced a key share.
    #[error("DKG not complete: no key share available.")]
    DkgNotComplete,
    /// Round 1 DKG material was already generated for this participant.
    #[error("Round 1 already generated.")]
    Round1AlreadyGenerated,
    /// The DKG for this participant has already been finalized.
    #[error("DKG already finalized.")]
    DkgAlreadyFinalized,
    /// The signing session was already used to produce a signature share.
    #[error("Session already consumed: nonce reuse prevented.")]
    SessionConsumed,
    /// The encoding of a signature or wire message was malformed.
    #[error("Malformed encoding.")]
    MalformedEncoding,
    /// Signature verification failed.
    #[error("Invalid signature.")]
    InvalidSignature,
    /// Error in the scalar field.
    #[error("Error in scalar field.")]
    FieldError(#[from] FieldError),
    /// Error in the group.
    #[error("Error in group.")]
    GroupError(#[from] GroupError),
}

/// An error related to a scalar field.
#[non_exhaustive]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldError {
    /// This scalar MUST NOT be zero.
    #[error("Invalid for this scalar to be zero.")]
    InvalidZeroScalar,
    /// The supplied random source failed to produce bytes.
    #[error("Random source failure.")]
    RandomSourceFailure,
}

/// An error related to a group or one of its elements.
#[non_exhaustive]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum GroupError {
    /// The encoding of a group element was malformed.
    #[error("Malformed group element encoding.")]
    MalformedElement,
}
