//! Domain-separated hash functions used by the FROST protocol.
//!
//! The protocol needs five hash functions H1..H5. They are bundled behind the
//! [`Hasher`] trait so that deployments can pick the hash family at runtime:
//! [`Sha256Hasher`] is the general-purpose default, while [`Blake2bHasher`]
//! reproduces the Blake2b-512 little-endian construction used by
//! hardware-wallet implementations of FROST over Baby Jubjub.
//!
//! All parties in a DKG or signing run must agree on the hasher; signatures
//! produced under one hasher do not verify under another.

use core::fmt::Debug;

use blake2::Blake2b512;
use sha2::{Digest, Sha256};

use crate::{Field, Group, Scalar};

/// The hash operations required by FROST.
///
/// Implementations provide the hash family and the domain separation scheme.
pub trait Hasher<G: Group>: Clone + Debug {
    /// H1: computes the binding factor for a signer from the message, the
    /// encoded commitment list and the signer identifier.
    fn H1(&self, message: &[u8], commitment_list: &[u8], signer_id: &[u8]) -> Scalar<G>;

    /// H2: computes the Schnorr challenge from the group commitment R, the
    /// group public key and the message.
    fn H2(&self, group_commitment: &[u8], group_key: &[u8], message: &[u8]) -> Scalar<G>;

    /// H3: derives a nonce from a seed, a binding factor and the message.
    ///
    /// Reserved for deterministic nonce derivation; the randomized signing
    /// flow does not call it.
    fn H3(&self, seed: &[u8], rho: &[u8], message: &[u8]) -> Scalar<G>;

    /// H4: hashes a message for signing.
    fn H4(&self, message: &[u8]) -> Vec<u8>;

    /// H5: hashes an encoded commitment list.
    fn H5(&self, commitment_list: &[u8]) -> Vec<u8>;
}

/// The default [`Hasher`], backed by SHA-256.
///
/// Scalar outputs interpret the 32-byte digest as a big-endian integer and
/// reduce it modulo the group order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha256Hasher;

fn sha256(inputs: &[&[u8]]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().to_vec()
}

impl<G: Group> Hasher<G> for Sha256Hasher {
    fn H1(&self, message: &[u8], commitment_list: &[u8], signer_id: &[u8]) -> Scalar<G> {
        G::hash_to_scalar(&[&b"rho"[..], message, commitment_list, signer_id])
    }

    fn H2(&self, group_commitment: &[u8], group_key: &[u8], message: &[u8]) -> Scalar<G> {
        // Plain concatenation, matching single-party Schnorr verifiers that
        // hash R || Y || m without a tag.
        G::hash_to_scalar(&[group_commitment, group_key, message])
    }

    fn H3(&self, seed: &[u8], rho: &[u8], message: &[u8]) -> Scalar<G> {
        G::hash_to_scalar(&[&b"nonce"[..], seed, rho, message])
    }

    fn H4(&self, message: &[u8]) -> Vec<u8> {
        sha256(&[&b"msg"[..], message])
    }

    fn H5(&self, commitment_list: &[u8]) -> Vec<u8> {
        sha256(&[&b"com"[..], commitment_list])
    }
}

/// The domain separation prefix used by Ledger-compatible implementations of
/// FROST over Baby Jubjub.
const DEFAULT_PREFIX: &str = "FROST-EDBABYJUJUB-BLAKE512-v1";

/// A [`Hasher`] backed by Blake2b-512 with an ASCII domain separation prefix.
///
/// Every hash is computed over `prefix || tag || inputs`. Scalar outputs
/// byte-reverse the 64-byte digest to **little-endian** before reducing it
/// modulo the group order; this byte order is required for interoperability
/// with hardware-wallet implementations and must not be changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blake2bHasher {
    prefix: String,
}

impl Blake2bHasher {
    /// Creates a hasher with the Ledger-compatible domain separation prefix.
    pub fn new() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.into(),
        }
    }

    /// Creates a hasher with a custom domain separation prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the domain separation prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn hash(&self, tag: &str, inputs: &[&[u8]]) -> Vec<u8> {
        let mut hasher = Blake2b512::new();
        hasher.update(self.prefix.as_bytes());
        hasher.update(tag.as_bytes());
        for input in inputs {
            hasher.update(input);
        }
        hasher.finalize().to_vec()
    }

    fn hash_to_scalar<G: Group>(&self, tag: &str, inputs: &[&[u8]]) -> Scalar<G> {
        let mut digest = self.hash(tag, inputs);
        // Little-endian interpretation of the digest.
        digest.reverse();
        <G::Field as Field>::deserialize(&digest)
    }
}

impl Default for Blake2bHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Group> Hasher<G> for Blake2bHasher {
    fn H1(&self, message: &[u8], commitment_list: &[u8], signer_id: &[u8]) -> Scalar<G> {
        self.hash_to_scalar::<G>("rho", &[message, commitment_list, signer_id])
    }

    fn H2(&self, group_commitment: &[u8], group_key: &[u8], message: &[u8]) -> Scalar<G> {
        self.hash_to_scalar::<G>("chal", &[group_commitment, group_key, message])
    }

    fn H3(&self, seed: &[u8], rho: &[u8], message: &[u8]) -> Scalar<G> {
        self.hash_to_scalar::<G>("nonce", &[seed, rho, message])
    }

    fn H4(&self, message: &[u8]) -> Vec<u8> {
        self.hash("msg", &[message])
    }

    fn H5(&self, commitment_list: &[u8]) -> Vec<u8> {
        self.hash("com", &[commitment_list])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::babyjubjub::BabyJubjubScalarField;
    use crate::BabyJubjub;

    type B = BabyJubjub;

    #[test]
    fn sha256_hasher_is_deterministic() {
        let hasher = Sha256Hasher;
        let a = <Sha256Hasher as Hasher<B>>::H1(&hasher, b"msg", b"list", b"id");
        let b = <Sha256Hasher as Hasher<B>>::H1(&hasher, b"msg", b"list", b"id");
        assert_eq!(a, b);
    }

    #[test]
    fn hashers_disagree() {
        let sha = Sha256Hasher;
        let blake = Blake2bHasher::new();
        let a = <Sha256Hasher as Hasher<B>>::H2(&sha, b"R", b"Y", b"m");
        let b = <Blake2bHasher as Hasher<B>>::H2(&blake, b"R", b"Y", b"m");
        assert_ne!(a, b);
    }

    #[test]
    fn blake2b_digest_is_interpreted_little_endian() {
        let hasher = Blake2bHasher::new();
        let mut digest = hasher.hash("rho", &[b"m", b"list", b"id"]);
        digest.reverse();
        let expected = <BabyJubjubScalarField as Field>::deserialize(&digest);
        let got = <Blake2bHasher as Hasher<B>>::H1(&hasher, b"m", b"list", b"id");
        assert_eq!(got, expected);
    }

    #[test]
    fn blake2b_prefix_changes_output() {
        let default = Blake2bHasher::new();
        let custom = Blake2bHasher::with_prefix("OTHER-PREFIX-v1");
        assert_eq!(default.prefix(), "FROST-EDBABYJUJUB-BLAKE512-v1");
        let a = <Blake2bHasher as Hasher<B>>::H4(&default, b"m");
        let b = <Blake2bHasher as Hasher<B>>::H4(&custom, b"m");
        assert_ne!(a, b);
    }
}
