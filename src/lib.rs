#![allow(non_snake_case)]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

use core::marker::PhantomData;

mod babyjubjub;
pub mod dkg;
mod error;
mod hasher;
mod identifier;
mod keys;
pub mod session;
mod sign;
mod signature;
mod traits;

pub use babyjubjub::{BabyJubjub, BabyJubjubScalarField};
pub use error::{Error, FieldError, GroupError};
pub use hasher::{Blake2bHasher, Hasher, Sha256Hasher};
pub use identifier::Identifier;
pub use keys::KeyShare;
pub use sign::{SignatureShare, SigningCommitment, SigningNonce};
pub use signature::Signature;
pub use traits::{Element, Field, Group, Scalar};

/// The FROST threshold signature engine.
///
/// Holds the group, the threshold parameters and the hash family for one
/// deployment. All parameters are immutable after construction, so a
/// `Frost` value can be shared freely across threads.
///
/// The engine is generic over the [`Group`]; the [`BabyJubjub`] adapter is
/// the concrete instantiation shipped with this crate.
#[derive(Clone, Debug)]
pub struct Frost<G: Group, H: Hasher<G> = Sha256Hasher> {
    hasher: H,
    /// t: the minimum number of signers needed.
    threshold: u16,
    /// n: the total number of participants.
    total: u16,
    group: PhantomData<G>,
}

impl<G> Frost<G, Sha256Hasher>
where
    G: Group,
{
    /// Creates a FROST engine with the default SHA-256 hasher.
    ///
    /// `threshold` is the minimum number of signers (t) required to produce
    /// a valid signature and must be at least 2. `total` is the number of
    /// participants (n) and must be at least `threshold`.
    pub fn new(threshold: u16, total: u16) -> Result<Self, Error> {
        Self::with_hasher(threshold, total, Sha256Hasher)
    }
}

impl<G, H> Frost<G, H>
where
    G: Group,
    H: Hasher<G>,
{
    /// Creates a FROST engine with a custom hash configuration, e.g.
    /// [`Blake2bHasher`] for hardware-wallet compatibility.
    ///
    /// All parties of a DKG or signing ceremony must use the same hasher;
    /// signatures produced under one hasher do not verify under another.
    pub fn with_hasher(threshold: u16, total: u16, hasher: H) -> Result<Self, Error> {
        if threshold < 2 {
            return Err(Error::InvalidThreshold);
        }
        if total < threshold {
            return Err(Error::InvalidTotal);
        }

        Ok(Self {
            hasher,
            threshold,
            total,
            group: PhantomData,
        })
    }

    /// The minimum number of signers (t).
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// The total number of participants (n).
    pub fn total(&self) -> u16 {
        self.total
    }

    pub(crate) fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Converts a small-integer participant id into an [`Identifier`],
    /// validating the 1..=total range.
    pub(crate) fn participant_id(&self, id: u16) -> Result<Identifier<G>, Error> {
        if id < 1 || id > self.total {
            return Err(Error::InvalidParticipantId);
        }
        Identifier::try_from(id)
    }
}
