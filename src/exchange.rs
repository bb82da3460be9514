//! SM9 authenticated key exchange with key confirmation.
//!
//! Both parties hold exchange keys extracted under the same encryption master key pair.
//! The handshake takes three messages:
//!
//! 1. the initiator A sends `RA` ([`Party::initiate`]),
//! 2. the responder B answers with `RB` and its confirmation `SB` ([`Party::respond`]),
//! 3. A checks `SB`, derives the key and sends its confirmation `SA`
//!    ([`InitiatorSession::finish`]), which B checks ([`ResponderSession::confirm`]).

use crate::curve::{pairing, G1Affine, G2Affine, Gt, Scalar, G1_BYTES, GT_BYTES};
use crate::error::Error;
use crate::kgc::{
    extract_usk, public_point, EncryptMasterKeyPair, EncryptMasterPublicKey, Usage, UserSecretKey,
};
use crate::util::{kdf, rand_scalar, sm3, HASH_BYTES};
use core::fmt;
use rand::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use tracing::{debug, instrument};

/// Tag of the confirmation sent by the responder.
const RESPONDER_TAG: u8 = 0x82;

/// Tag of the confirmation sent by the initiator.
const INITIATOR_TAG: u8 = 0x83;

/// A confirmation value, `SA` or `SB`.
pub type Confirmation = [u8; HASH_BYTES];

/// One side of a key exchange: an identity together with its exchange key.
#[derive(Clone, Debug)]
pub struct Party {
    mpk: EncryptMasterPublicKey,
    key: G2Affine,
    id: Vec<u8>,
}

/// What the responder sends back to the initiator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponderReply {
    pub rb: G1Affine,
    pub sb: Confirmation,
}

/// The initiator's result of a handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitiatorOutcome {
    /// The derived key `SKA`.
    pub shared_key: Vec<u8>,
    /// The confirmation `SA` to send to the responder.
    pub sa: Confirmation,
    /// Whether the responder's confirmation `SB` matched.
    pub ack: bool,
}

/// State the initiator keeps between sending `RA` and receiving the reply.
pub struct InitiatorSession<'a> {
    party: &'a Party,
    peer_id: Vec<u8>,
    ra: G1Affine,
    r: Scalar,
}

/// State the responder keeps until the initiator's confirmation arrives.
pub struct ResponderSession {
    s2: Confirmation,
    shared_key: Vec<u8>,
}

impl fmt::Debug for InitiatorSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitiatorSession")
            .field("peer_id", &String::from_utf8_lossy(&self.peer_id))
            .field("ra", &self.ra)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for ResponderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponderSession").finish_non_exhaustive()
    }
}

/// Everything both confirmations and the shared key are computed from.
struct Transcript {
    /// `idA ‖ idB ‖ RA ‖ RB`
    prefix: Vec<u8>,
    g1: [u8; GT_BYTES],
    g2: [u8; GT_BYTES],
    g3: [u8; GT_BYTES],
}

impl Transcript {
    fn new(id_a: &[u8], id_b: &[u8], ra: &G1Affine, rb: &G1Affine, g: [&Gt; 3]) -> Self {
        let mut prefix = Vec::with_capacity(id_a.len() + id_b.len() + 2 * G1_BYTES);
        prefix.extend_from_slice(id_a);
        prefix.extend_from_slice(id_b);
        prefix.extend_from_slice(&ra.to_bytes());
        prefix.extend_from_slice(&rb.to_bytes());

        Transcript {
            prefix,
            g1: g[0].to_bytes(),
            g2: g[1].to_bytes(),
            g3: g[2].to_bytes(),
        }
    }

    /// `SM3(tag ‖ g1 ‖ SM3(g2 ‖ g3 ‖ idA ‖ idB ‖ RA ‖ RB))`
    fn confirmation(&self, tag: u8) -> Confirmation {
        let inner = sm3(&[&self.g2, &self.g3, &self.prefix]);
        sm3(&[&[tag], &self.g1, &inner])
    }

    /// `KDF(idA ‖ idB ‖ RA ‖ RB ‖ g1 ‖ g2 ‖ g3, klen)`
    fn shared_key(&self, klen: usize) -> Vec<u8> {
        let mut z = Vec::with_capacity(self.prefix.len() + 3 * GT_BYTES);
        z.extend_from_slice(&self.prefix);
        z.extend_from_slice(&self.g1);
        z.extend_from_slice(&self.g2);
        z.extend_from_slice(&self.g3);
        kdf(&z, klen)
    }
}

fn equal(a: &Confirmation, b: &Confirmation) -> bool {
    bool::from(a[..].ct_eq(&b[..]))
}

impl Party {
    /// A party using the exchange key `usk` extracted for `id` under `mpk`.
    pub fn new(
        mpk: &EncryptMasterPublicKey,
        usk: &UserSecretKey,
        id: &[u8],
    ) -> Result<Self, Error> {
        let key = usk.g2_point(Usage::Exchange)?.clone();
        Ok(Party {
            mpk: mpk.clone(),
            key,
            id: id.to_vec(),
        })
    }

    /// A party whose exchange key is extracted on the spot from the master key pair.
    pub fn from_master_key_pair(master: &EncryptMasterKeyPair, id: &[u8]) -> Result<Self, Error> {
        let usk = extract_usk(&master.secret, id, Usage::Exchange)?;
        Self::new(&master.public, &usk, id)
    }

    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// `[r]([H1(peer, hid)]P1 + Ppub)`
    fn commitment(&self, peer_id: &[u8], r: &Scalar) -> G1Affine {
        (&public_point(self.mpk.point(), peer_id, Usage::Exchange) * r).to_affine()
    }

    /// `e(Ppub, P2)^r`
    fn own_share(&self, r: &Scalar) -> Gt {
        pairing(self.mpk.point(), &G2Affine::generator()).pow(r)
    }

    pub(crate) fn initiate_with_nonce(
        &self,
        peer_id: &[u8],
        r: Scalar,
    ) -> (InitiatorSession<'_>, G1Affine) {
        let ra = self.commitment(peer_id, &r);
        let session = InitiatorSession {
            party: self,
            peer_id: peer_id.to_vec(),
            ra: ra.clone(),
            r,
        };
        (session, ra)
    }

    /// Starts a handshake with `peer_id`. `RA` goes to the responder.
    #[instrument(level = "debug", skip_all)]
    pub fn initiate<R: RngCore + CryptoRng>(
        &self,
        peer_id: &[u8],
        rng: &mut R,
    ) -> (InitiatorSession<'_>, G1Affine) {
        self.initiate_with_nonce(peer_id, rand_scalar(rng))
    }

    pub(crate) fn respond_with_nonce(
        &self,
        peer_id: &[u8],
        ra: &G1Affine,
        klen: usize,
        r: &Scalar,
    ) -> Result<(ResponderSession, ResponderReply), Error> {
        if !ra.is_valid() {
            debug!("RA is not in G1");
            return Err(Error::FieldMismatch("RA is not in G1"));
        }

        let rb = self.commitment(peer_id, r);
        let g1 = pairing(ra, &self.key);
        let g2 = self.own_share(r);
        let g3 = g1.pow(r);

        let transcript = Transcript::new(peer_id, &self.id, ra, &rb, [&g1, &g2, &g3]);
        let reply = ResponderReply {
            rb,
            sb: transcript.confirmation(RESPONDER_TAG),
        };
        let session = ResponderSession {
            s2: transcript.confirmation(INITIATOR_TAG),
            shared_key: transcript.shared_key(klen),
        };

        Ok((session, reply))
    }

    /// Answers the handshake started by `peer_id` with `RA`, deriving a `klen`-byte key.
    ///
    /// Fails with [`Error::FieldMismatch`] if `RA` is not a proper element of G1.
    #[instrument(level = "debug", skip_all, fields(klen = klen))]
    pub fn respond<R: RngCore + CryptoRng>(
        &self,
        peer_id: &[u8],
        ra: &G1Affine,
        klen: usize,
        rng: &mut R,
    ) -> Result<(ResponderSession, ResponderReply), Error> {
        self.respond_with_nonce(peer_id, ra, klen, &rand_scalar(rng))
    }
}

impl<'a> InitiatorSession<'a> {
    /// `RA` as sent to the responder.
    pub fn ra(&self) -> &G1Affine {
        &self.ra
    }

    /// Processes the responder's reply and derives a `klen`-byte key.
    ///
    /// Fails with [`Error::FieldMismatch`] if `RB` is not a proper element of G1. A wrong `SB`
    /// is reported through [`InitiatorOutcome::ack`].
    #[instrument(level = "debug", skip_all, fields(klen = klen))]
    pub fn finish(self, reply: &ResponderReply, klen: usize) -> Result<InitiatorOutcome, Error> {
        if !reply.rb.is_valid() {
            debug!("RB is not in G1");
            return Err(Error::FieldMismatch("RB is not in G1"));
        }

        let party = self.party;
        let g1 = party.own_share(&self.r);
        let g2 = pairing(&reply.rb, &party.key);
        let g3 = g2.pow(&self.r);

        let transcript = Transcript::new(
            &party.id,
            &self.peer_id,
            &self.ra,
            &reply.rb,
            [&g1, &g2, &g3],
        );
        let s1 = transcript.confirmation(RESPONDER_TAG);
        let ack = equal(&s1, &reply.sb);
        if !ack {
            debug!("SB does not match");
        }

        Ok(InitiatorOutcome {
            shared_key: transcript.shared_key(klen),
            sa: transcript.confirmation(INITIATOR_TAG),
            ack,
        })
    }
}

impl ResponderSession {
    /// Checks the initiator's confirmation `SA`.
    pub fn confirm(&self, sa: &Confirmation) -> bool {
        let ok = equal(&self.s2, sa);
        if !ok {
            debug!("SA does not match");
        }
        ok
    }

    /// The derived key `SKB`.
    pub fn shared_key(&self) -> &[u8] {
        &self.shared_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kgc::{setup_encrypt, MasterSecretKey};
    use crate::Compress;
    use hex_literal::hex;

    fn standard_master() -> EncryptMasterKeyPair {
        let ke = hex!("0002E65B0762D042F51F0D23542B13ED8CFA2E9A0E7206361E013A283905E31F");
        EncryptMasterKeyPair::from_secret(MasterSecretKey::from_bytes(&ke).unwrap())
    }

    fn scalar(bytes: [u8; 32]) -> Scalar {
        Scalar::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn standard_vector() {
        let master = standard_master();
        assert_eq!(
            master.public.point().to_bytes(),
            hex!(
                "9174542668E8F14AB273C0945C3690C66E5DD09678B86F734C4350567ED06283"
                "54E598C6BF749A3DACC9FFFEDD9DB6866C50457CFC7AA2A4AD65C3168FF74210"
            )
        );

        let alice = Party::from_master_key_pair(&master, b"Alice").unwrap();
        let bob = Party::from_master_key_pair(&master, b"Bob").unwrap();
        let ra_nonce = scalar(hex!(
            "00005879DD1D51E175946F23B1B41E93BA31C584AE59A426EC1046A4D03B06C8"
        ));
        let rb_nonce = scalar(hex!(
            "00018B98C44BEF9F8537FB7D071B2C928B3BC65BD3D69E1EEE213564905634FE"
        ));

        let (session_a, ra) = alice.initiate_with_nonce(b"Bob", ra_nonce);
        assert_eq!(
            ra.to_bytes(),
            hex!(
                "7CBA5B19069EE66AA79D490413D11846B9BA76DD22567F809CF23B6D964BB265"
                "A9760C99CB6F706343FED05637085864958D6C90902ABA7D405FBEDF7B781599"
            )
        );

        let (session_b, reply) = bob.respond_with_nonce(b"Alice", &ra, 16, &rb_nonce).unwrap();
        assert_eq!(
            reply.rb.to_bytes(),
            hex!(
                "861E91485FB7623D2794F495031A35598B493BD45BE37813ABC710FCC1F34482"
                "32D906A469EBC1216A802A7052D5617CD430FB56FBA729D41D9BD668E9EB9600"
            )
        );
        assert_eq!(
            reply.sb,
            hex!("3BB4BCEE8139C960B4D6566DB1E0D5F0B2767680E5E1BF934103E6C66E40FFEE")
        );
        assert_eq!(session_b.shared_key(), hex!("C5C13A8F59A97CDEAE64F16A2272A9E7"));

        let outcome = session_a.finish(&reply, 16).unwrap();
        assert!(outcome.ack);
        assert_eq!(outcome.shared_key, hex!("C5C13A8F59A97CDEAE64F16A2272A9E7"));
        assert_eq!(
            outcome.sa,
            hex!("195D1B7256BA7E0E67C71202A25F8C94FF8241702C2F55D613AE1C6B98215172")
        );
        assert!(session_b.confirm(&outcome.sa));
    }

    #[test]
    fn honest_handshake() {
        let mut rng = rand::thread_rng();
        let master = setup_encrypt(&mut rng);
        let usk = extract_usk(&master.secret, b"alice", Usage::Exchange).unwrap();
        let alice = Party::new(&master.public, &usk, b"alice").unwrap();
        let bob = Party::from_master_key_pair(&master, b"bob").unwrap();

        let (session_a, ra) = alice.initiate(bob.id(), &mut rng);
        assert_eq!(session_a.ra(), &ra);
        let (session_b, reply) = bob.respond(alice.id(), &ra, 48, &mut rng).unwrap();
        let outcome = session_a.finish(&reply, 48).unwrap();

        assert!(outcome.ack);
        assert_eq!(outcome.shared_key.len(), 48);
        assert_eq!(outcome.shared_key, session_b.shared_key());
        assert!(session_b.confirm(&outcome.sa));
    }

    #[test]
    fn confirmation_mismatch() {
        let mut rng = rand::thread_rng();
        let master = setup_encrypt(&mut rng);
        let alice = Party::from_master_key_pair(&master, b"alice").unwrap();
        let bob = Party::from_master_key_pair(&master, b"bob").unwrap();

        let (session_a, ra) = alice.initiate(b"bob", &mut rng);
        let (session_b, mut reply) = bob.respond(b"alice", &ra, 16, &mut rng).unwrap();
        reply.sb[0] ^= 0x80;

        let outcome = session_a.finish(&reply, 16).unwrap();
        assert!(!outcome.ack);

        let mut sa = outcome.sa;
        sa[31] ^= 0x01;
        assert!(!session_b.confirm(&sa));
    }

    #[test]
    fn impostor_derives_another_key() {
        let mut rng = rand::thread_rng();
        let master = setup_encrypt(&mut rng);
        let alice = Party::from_master_key_pair(&master, b"alice").unwrap();
        let bob = Party::from_master_key_pair(&master, b"bob").unwrap();
        let mallory = Party::from_master_key_pair(&master, b"mallory").unwrap();

        // Mallory claims to be alice.
        let (session_m, ra) = mallory.initiate(b"bob", &mut rng);
        let (session_b, reply) = bob.respond(alice.id(), &ra, 16, &mut rng).unwrap();
        let outcome = session_m.finish(&reply, 16).unwrap();

        assert!(!outcome.ack);
        assert_ne!(outcome.shared_key, session_b.shared_key());
        assert!(!session_b.confirm(&outcome.sa));
    }

    #[test]
    fn rejects_points_outside_g1() {
        let mut rng = rand::thread_rng();
        let master = standard_master();
        let alice = Party::from_master_key_pair(&master, b"Alice").unwrap();
        let bob = Party::from_master_key_pair(&master, b"Bob").unwrap();

        assert_eq!(
            bob.respond(b"Alice", &G1Affine::identity(), 16, &mut rng)
                .map(|_| ()),
            Err(Error::FieldMismatch("RA is not in G1"))
        );

        let (session_a, _) = alice.initiate(b"Bob", &mut rng);
        let reply = ResponderReply {
            rb: G1Affine::identity(),
            sb: [0; 32],
        };
        assert_eq!(
            session_a.finish(&reply, 16),
            Err(Error::FieldMismatch("RB is not in G1"))
        );
    }

    #[test]
    fn party_needs_an_exchange_key() {
        let master = standard_master();
        let usk = extract_usk(&master.secret, b"Alice", Usage::Encrypt).unwrap();

        assert!(matches!(
            Party::new(&master.public, &usk, b"Alice"),
            Err(Error::KeyUsage { .. })
        ));
    }
}
