//! End-to-end tests for DKG, signing and the session layer.

use std::collections::BTreeMap;

use rand::rngs::ThreadRng;

use frost_babyjubjub::dkg::{Participant, Round1Data, Round1PrivateData};
use frost_babyjubjub::session::{self, Round1Input, Session, SigningSession};
use frost_babyjubjub::{
    BabyJubjub, BabyJubjubScalarField, Blake2bHasher, Error, Field, Frost, Group, Hasher,
    KeyShare, Signature, SigningCommitment,
};

type B = BabyJubjub;

/// Runs a full honest DKG with the core API, returning one key share per
/// participant (index i holds participant i+1).
fn run_dkg<H: Hasher<B>>(frost: &Frost<B, H>, rng: &mut ThreadRng) -> Vec<KeyShare<B>> {
    let total = frost.total();

    let mut participants: Vec<Participant<B>> = (1..=total)
        .map(|id| frost.new_participant(rng, id).unwrap())
        .collect();

    let broadcasts: Vec<Round1Data<B>> = participants
        .iter()
        .map(|p| p.round1_broadcast())
        .collect();

    // Every participant sends a private share to every other participant.
    let mut sends: Vec<(usize, usize, Round1PrivateData<B>)> = Vec::new();
    for (sender_index, sender) in participants.iter().enumerate() {
        for recipient in 1..=total {
            if recipient as usize == sender_index + 1 {
                continue;
            }
            let data = frost.round1_private_send(sender, recipient).unwrap();
            sends.push((sender_index, recipient as usize - 1, data));
        }
    }
    for (sender_index, recipient_index, data) in sends {
        frost
            .round2_receive_share(
                &mut participants[recipient_index],
                &data,
                broadcasts[sender_index].commitments(),
            )
            .unwrap();
    }

    participants
        .into_iter()
        .map(|p| frost.finalize(p, &broadcasts).unwrap())
        .collect()
}

/// Signs `message` with the given subset of key shares using the two-round
/// protocol directly, then aggregates.
fn sign_with<H: Hasher<B>>(
    frost: &Frost<B, H>,
    rng: &mut ThreadRng,
    signers: &[KeyShare<B>],
    message: &[u8],
) -> Signature<B> {
    let mut nonces = Vec::new();
    let mut commitments: Vec<SigningCommitment<B>> = Vec::new();
    for share in signers {
        let (nonce, commitment) = frost.sign_round1(rng, share).unwrap();
        nonces.push(nonce);
        commitments.push(commitment);
    }

    let shares: Vec<_> = signers
        .iter()
        .zip(&nonces)
        .map(|(share, nonce)| {
            frost
                .sign_round2(share, nonce, message, &commitments)
                .unwrap()
        })
        .collect();

    frost.aggregate(message, &commitments, &shares).unwrap()
}

#[test]
fn dkg_and_sign_2_of_3() {
    let mut rng = rand::thread_rng();
    let frost = Frost::<B>::new(2, 3).unwrap();

    let key_shares = run_dkg(&frost, &mut rng);

    // Every participant computes the same group key.
    let group_key = key_shares[0].group_key();
    for share in &key_shares[1..] {
        assert_eq!(share.group_key(), group_key);
    }

    let message = b"hello FROST";
    let signature = sign_with(&frost, &mut rng, &key_shares[..2], message);

    assert!(frost.verify(message, &signature, &group_key));
    assert!(!frost.verify(b"wrong message", &signature, &group_key));
}

#[test]
fn signing_with_different_signer_subsets() {
    let mut rng = rand::thread_rng();
    let frost = Frost::<B>::new(2, 4).unwrap();

    let key_shares = run_dkg(&frost, &mut rng);
    let group_key = key_shares[0].group_key();
    let message = b"test message";

    // All 6 pairs.
    for i in 0..4 {
        for j in (i + 1)..4 {
            let signers = [key_shares[i].clone(), key_shares[j].clone()];
            let signature = sign_with(&frost, &mut rng, &signers, message);
            assert!(
                frost.verify(message, &signature, &group_key),
                "subset {{{}, {}}} failed",
                i + 1,
                j + 1
            );
        }
    }

    // Larger subsets also work.
    let signature = sign_with(&frost, &mut rng, &key_shares[..3], message);
    assert!(frost.verify(message, &signature, &group_key));
    let signature = sign_with(&frost, &mut rng, &key_shares[..4], message);
    assert!(frost.verify(message, &signature, &group_key));
}

#[test]
fn threshold_variations() {
    let mut rng = rand::thread_rng();
    let message = b"threshold signing test";

    for (threshold, total) in [(2u16, 3u16), (2, 5), (3, 5), (3, 7)] {
        let frost = Frost::<B>::new(threshold, total).unwrap();
        let key_shares = run_dkg(&frost, &mut rng);
        let group_key = key_shares[0].group_key();

        let signature = sign_with(
            &frost,
            &mut rng,
            &key_shares[..threshold as usize],
            message,
        );
        assert!(
            frost.verify(message, &signature, &group_key),
            "({threshold}, {total}) failed"
        );
    }
}

#[test]
fn tampered_signatures_fail() {
    let mut rng = rand::thread_rng();
    let frost = Frost::<B>::new(2, 3).unwrap();

    let key_shares = run_dkg(&frost, &mut rng);
    let group_key = key_shares[0].group_key();
    let message = b"original message";

    let signature = sign_with(&frost, &mut rng, &key_shares[..2], message);
    assert!(frost.verify(message, &signature, &group_key));

    // Tampered R.
    let tampered = Signature::new(signature.R() + B::generator(), signature.z());
    assert!(!frost.verify(message, &tampered, &group_key));

    // Tampered z.
    let one = <BabyJubjubScalarField as Field>::one();
    let tampered = Signature::new(signature.R(), signature.z() + one);
    assert!(!frost.verify(message, &tampered, &group_key));

    // Wrong group key.
    assert!(!frost.verify(message, &signature, &B::generator()));

    // Wrong and empty messages.
    assert!(!frost.verify(b"wrong message", &signature, &group_key));
    assert!(!frost.verify(b"", &signature, &group_key));

    // The empty message itself is signable.
    let signature = sign_with(&frost, &mut rng, &key_shares[..2], b"");
    assert!(frost.verify(b"", &signature, &group_key));
}

#[test]
fn blake2b_hasher_is_isolated_from_sha256() {
    let mut rng = rand::thread_rng();
    let blake = Frost::<B, Blake2bHasher>::with_hasher(2, 3, Blake2bHasher::new()).unwrap();

    let key_shares = run_dkg(&blake, &mut rng);
    let group_key = key_shares[0].group_key();
    let message = b"test message with blake2b";

    let signature = sign_with(&blake, &mut rng, &key_shares[..2], message);
    assert!(blake.verify(message, &signature, &group_key));

    // The same signature must not verify under the SHA-256 hasher.
    let sha = Frost::<B>::new(2, 3).unwrap();
    assert!(!sha.verify(message, &signature, &group_key));
}

#[test]
fn invalid_share_is_rejected() {
    let mut rng = rand::thread_rng();
    let frost = Frost::<B>::new(2, 2).unwrap();

    let p1 = frost.new_participant(&mut rng, 1).unwrap();
    let mut p2 = frost.new_participant(&mut rng, 2).unwrap();
    let b1 = p1.round1_broadcast();
    let b2 = p2.round1_broadcast();

    let share_1_to_2 = frost.round1_private_send(&p1, 2).unwrap();

    // Corrupt the share scalar through the wire encoding.
    let mut bytes = share_1_to_2.serialize();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let corrupted = Round1PrivateData::<B>::deserialize(&bytes).unwrap();

    assert_eq!(
        frost
            .round2_receive_share(&mut p2, &corrupted, b1.commitments())
            .unwrap_err(),
        Error::InvalidSecretShare
    );

    // The honest share is still accepted and the ceremony completes.
    frost
        .round2_receive_share(&mut p2, &share_1_to_2, b1.commitments())
        .unwrap();

    let mut p1 = p1;
    let share_2_to_1 = frost.round1_private_send(&p2, 1).unwrap();
    frost
        .round2_receive_share(&mut p1, &share_2_to_1, b2.commitments())
        .unwrap();

    let broadcasts = vec![b1, b2];
    let ks1 = frost.finalize(p1, &broadcasts).unwrap();
    let ks2 = frost.finalize(p2, &broadcasts).unwrap();
    assert_eq!(ks1.group_key(), ks2.group_key());

    let signature =
        session::quick_sign(&frost, &mut rng, &[ks1.clone(), ks2], b"after rejection").unwrap();
    assert!(frost.verify(b"after rejection", &signature, &ks1.group_key()));
}

#[test]
fn signature_and_wire_roundtrips() {
    let mut rng = rand::thread_rng();
    let frost = Frost::<B>::new(2, 3).unwrap();

    let key_shares = run_dkg(&frost, &mut rng);
    let group_key = key_shares[0].group_key();
    let message = b"roundtrip";

    let signature = sign_with(&frost, &mut rng, &key_shares[..2], message);
    let decoded = Signature::<B>::deserialize(&signature.serialize()).unwrap();
    assert_eq!(decoded, signature);
    assert!(frost.verify(message, &decoded, &group_key));

    assert!(Signature::<B>::deserialize(&signature.serialize()[1..]).is_err());

    let (_, commitment) = frost.sign_round1(&mut rng, &key_shares[0]).unwrap();
    let decoded = SigningCommitment::<B>::deserialize(&commitment.serialize()).unwrap();
    assert_eq!(decoded, commitment);

    let participant = frost.new_participant(&mut rng, 1).unwrap();
    let broadcast = participant.round1_broadcast();
    let decoded = Round1Data::<B>::deserialize(&broadcast.serialize()).unwrap();
    assert_eq!(decoded, broadcast);

    let private = frost.round1_private_send(&participant, 2).unwrap();
    let decoded = Round1PrivateData::<B>::deserialize(&private.serialize()).unwrap();
    assert_eq!(decoded, private);
}

/// Runs a full DKG through the session layer, returning the sessions and
/// each participant's DKG result.
fn run_session_dkg(
    threshold: u16,
    total: u16,
) -> (Vec<Session<B>>, Vec<session::DkgResult<B>>) {
    let mut rng = rand::thread_rng();
    let ids: Vec<u16> = (1..=total).collect();

    let mut sessions: Vec<Session<B>> = ids
        .iter()
        .map(|&id| Session::new(threshold, total, id).unwrap())
        .collect();

    let mut round1 = BTreeMap::new();
    for session in sessions.iter_mut() {
        round1.insert(session.id(), session.generate_round1(&mut rng, &ids).unwrap());
    }

    let broadcasts: Vec<Round1Data<B>> =
        round1.values().map(|r| r.broadcast.clone()).collect();

    let results = sessions
        .iter_mut()
        .map(|session| {
            let private_shares: Vec<Round1PrivateData<B>> = round1
                .iter()
                .filter(|(&sender, _)| sender != session.id())
                .map(|(_, r)| r.private_shares[&session.id()])
                .collect();
            session
                .process_round1(&Round1Input {
                    broadcasts: broadcasts.clone(),
                    private_shares,
                })
                .unwrap()
        })
        .collect();

    (sessions, results)
}

#[test]
fn session_dkg_agrees_on_keys() {
    let (_, results) = run_session_dkg(2, 3);

    let group_key = results[0].group_key;
    for result in &results {
        assert_eq!(result.group_key, group_key);
        assert_eq!(result.key_share.group_key(), group_key);
    }

    // The published per-participant keys match each participant's own
    // public key.
    for (index, result) in results.iter().enumerate() {
        let id = index as u16 + 1;
        for other in &results {
            assert_eq!(other.participant_keys[&id], result.key_share.public_key());
        }
    }
}

#[test]
fn session_signing_and_nonce_reuse_guard() {
    let mut rng = rand::thread_rng();
    let (sessions, results) = run_session_dkg(2, 3);
    let group_key = results[0].group_key;
    let message = b"test nonce reuse";

    let signing: Vec<SigningSession<B>> = sessions[..2]
        .iter()
        .map(|s| s.signing_session(&mut rng, message).unwrap())
        .collect();
    let commitments: Vec<SigningCommitment<B>> =
        signing.iter().map(|s| s.commitment()).collect();

    let shares: Vec<_> = signing
        .iter()
        .map(|s| s.sign(&commitments).unwrap())
        .collect();

    let frost = sessions[0].frost();
    let signature = session::aggregate(frost, message, &commitments, &shares).unwrap();
    session::verify(frost, message, &signature, &group_key).unwrap();

    // Every session is consumed: a second sign must fail deterministically.
    for s in &signing {
        assert!(s.is_consumed());
        assert_eq!(s.sign(&commitments).unwrap_err(), Error::SessionConsumed);
    }
}

#[test]
fn session_sign_requires_own_commitment() {
    let mut rng = rand::thread_rng();
    let (sessions, _) = run_session_dkg(2, 3);

    let s1 = sessions[0].signing_session(&mut rng, b"msg").unwrap();
    let s2 = sessions[1].signing_session(&mut rng, b"msg").unwrap();
    let s3 = sessions[2].signing_session(&mut rng, b"msg").unwrap();

    // Commitments of two other signers, not including session 1's own.
    let foreign = vec![s2.commitment(), s3.commitment()];
    assert_eq!(s1.sign(&foreign).unwrap_err(), Error::MissingCommitment);

    // The failed attempt still consumes the session.
    assert!(s1.is_consumed());
}

#[test]
fn session_rejects_bad_round1_input() {
    let mut rng = rand::thread_rng();
    let ids = [1u16, 2, 3];

    let mut sessions: Vec<Session<B>> = ids
        .iter()
        .map(|&id| Session::new(2, 3, id).unwrap())
        .collect();

    let mut round1 = BTreeMap::new();
    for session in sessions.iter_mut() {
        round1.insert(session.id(), session.generate_round1(&mut rng, &ids).unwrap());
    }
    let broadcasts: Vec<Round1Data<B>> =
        round1.values().map(|r| r.broadcast.clone()).collect();
    let shares_for_1: Vec<Round1PrivateData<B>> = [2u16, 3]
        .iter()
        .map(|sender| round1[sender].private_shares[&1])
        .collect();

    // Duplicated broadcast.
    let duplicated = vec![
        broadcasts[0].clone(),
        broadcasts[0].clone(),
        broadcasts[1].clone(),
    ];
    assert_eq!(
        sessions[0]
            .process_round1(&Round1Input {
                broadcasts: duplicated,
                private_shares: shares_for_1.clone(),
            })
            .unwrap_err(),
        Error::DuplicatedParticipant
    );

    // A failed ceremony aborts for good.
    assert_eq!(
        sessions[0]
            .process_round1(&Round1Input {
                broadcasts: broadcasts.clone(),
                private_shares: shares_for_1.clone(),
            })
            .unwrap_err(),
        Error::DkgNotComplete
    );

    // Missing broadcast, on a fresh participant.
    let missing = vec![broadcasts[0].clone(), broadcasts[1].clone()];
    let shares_for_2: Vec<Round1PrivateData<B>> = [1u16, 3]
        .iter()
        .map(|sender| round1[sender].private_shares[&2])
        .collect();
    assert_eq!(
        sessions[1]
            .process_round1(&Round1Input {
                broadcasts: missing,
                private_shares: shares_for_2,
            })
            .unwrap_err(),
        Error::IncorrectNumberOfBroadcasts
    );
}

#[test]
fn signing_before_dkg_fails() {
    let mut rng = rand::thread_rng();
    let session = Session::<B>::new(2, 3, 1).unwrap();
    assert_eq!(
        session.signing_session(&mut rng, b"msg").unwrap_err(),
        Error::DkgNotComplete
    );
}

#[test]
fn session_id_bounds() {
    assert_eq!(
        Session::<B>::new(2, 3, 0).unwrap_err(),
        Error::InvalidParticipantId
    );
    assert_eq!(
        Session::<B>::new(2, 3, 4).unwrap_err(),
        Error::InvalidParticipantId
    );
}

#[test]
fn commitment_order_does_not_matter() {
    let mut rng = rand::thread_rng();
    let frost = Frost::<B>::new(2, 3).unwrap();
    let key_shares = run_dkg(&frost, &mut rng);
    let group_key = key_shares[0].group_key();
    let message = b"order independence";

    let (nonce_1, commitment_1) = frost.sign_round1(&mut rng, &key_shares[0]).unwrap();
    let (nonce_2, commitment_2) = frost.sign_round1(&mut rng, &key_shares[1]).unwrap();

    // Each signer sees the list in a different order; the aggregator in a
    // third. Sorting by identifier makes them agree.
    let share_1 = frost
        .sign_round2(
            &key_shares[0],
            &nonce_1,
            message,
            &[commitment_2, commitment_1],
        )
        .unwrap();
    let share_2 = frost
        .sign_round2(
            &key_shares[1],
            &nonce_2,
            message,
            &[commitment_1, commitment_2],
        )
        .unwrap();

    let signature = frost
        .aggregate(message, &[commitment_2, commitment_1], &[share_1, share_2])
        .unwrap();
    assert!(frost.verify(message, &signature, &group_key));
}

#[test]
fn sign_round2_misuse_is_rejected() {
    let mut rng = rand::thread_rng();
    let frost = Frost::<B>::new(2, 3).unwrap();
    let key_shares = run_dkg(&frost, &mut rng);
    let message = b"misuse";

    let (nonce_1, commitment_1) = frost.sign_round1(&mut rng, &key_shares[0]).unwrap();
    let (_, commitment_2) = frost.sign_round1(&mut rng, &key_shares[1]).unwrap();
    let (_, commitment_3) = frost.sign_round1(&mut rng, &key_shares[2]).unwrap();

    // Fewer commitments than the threshold.
    assert_eq!(
        frost
            .sign_round2(&key_shares[0], &nonce_1, message, &[commitment_1])
            .unwrap_err(),
        Error::IncorrectNumberOfCommitments
    );

    // The signer's own commitment is missing.
    assert_eq!(
        frost
            .sign_round2(
                &key_shares[0],
                &nonce_1,
                message,
                &[commitment_2, commitment_3]
            )
            .unwrap_err(),
        Error::MissingCommitment
    );

    // A duplicated identifier in the list.
    assert_eq!(
        frost
            .sign_round2(
                &key_shares[0],
                &nonce_1,
                message,
                &[commitment_1, commitment_2, commitment_2]
            )
            .unwrap_err(),
        Error::DuplicatedParticipant
    );
}

#[test]
fn quick_sign_roundtrip() {
    let mut rng = rand::thread_rng();
    let frost = Frost::<B>::new(3, 5).unwrap();
    let key_shares = run_dkg(&frost, &mut rng);

    let signature =
        session::quick_sign(&frost, &mut rng, &key_shares[1..4], b"quick").unwrap();
    assert!(frost.verify(b"quick", &signature, &key_shares[0].group_key()));
}
