//! SM9 identity-based signatures.
//!
//! Signing uses the signing master public key `Ppub-s ∈ G2` and a user key `ds ∈ G1`.
//! A signature `(h, S)` is checked against the signer's identity alone.

use crate::curve::{pairing, Field, G1Affine, Gt, Scalar, G1_BYTES};
use crate::error::Error;
use crate::kgc::{public_point, SignMasterPublicKey, Usage, UserSecretKey};
use crate::util::{h2, rand_scalar, MAX_RETRIES, SCALAR_BYTES};
use crate::Compress;
use arrayref::{array_refs, mut_array_refs};
use core::fmt;
use rand::{CryptoRng, RngCore};
use tracing::{debug, instrument};

/// Size of an encoded signature, `h ‖ S`.
pub const SIGNATURE_BYTES: usize = SCALAR_BYTES + G1_BYTES;

/// A signature `(h, S)` as it appears on the wire.
///
/// Nothing about the contents is assumed; [`verify`] checks the range of `h` and that `S` is a
/// proper element of G1.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub h: [u8; SCALAR_BYTES],
    pub s: [u8; G1_BYTES],
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("h", &hex::encode_upper(self.h))
            .field("s", &hex::encode_upper(self.s))
            .finish()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Compress for Signature {
    const OUTPUT_SIZE: usize = SIGNATURE_BYTES;
    type Output = [u8; SIGNATURE_BYTES];

    fn to_bytes(&self) -> [u8; SIGNATURE_BYTES] {
        let mut buf = [0u8; SIGNATURE_BYTES];
        let (h, s) = mut_array_refs![&mut buf, SCALAR_BYTES, G1_BYTES];
        *h = self.h;
        *s = self.s;
        buf
    }

    fn from_bytes(bytes: &[u8; SIGNATURE_BYTES]) -> Result<Self, Error> {
        let (h, s) = array_refs![bytes, SCALAR_BYTES, G1_BYTES];
        Ok(Signature { h: *h, s: *s })
    }
}

/// One signing attempt with nonce `r`; `None` if `l = r - h` vanishes.
fn sign_with(g: &Gt, ds: &G1Affine, msg: &[u8], r: &Scalar) -> Option<Signature> {
    let w = g.pow(r);
    let h = h2(msg, &w);
    let l = r.clone() - &h;
    if l.is_zero() {
        return None;
    }

    Some(Signature {
        h: h.to_bytes(),
        s: (ds * &l).to_affine().to_bytes(),
    })
}

#[cfg(test)]
pub(crate) fn sign_with_nonce(
    mpk: &SignMasterPublicKey,
    usk: &UserSecretKey,
    msg: &[u8],
    r: &Scalar,
) -> Result<Option<Signature>, Error> {
    let ds = usk.sign_point()?;
    let g = pairing(&G1Affine::generator(), mpk.point());
    Ok(sign_with(&g, ds, msg, r))
}

/// Signs `msg` with the signing key `usk`.
///
/// `mpk` must be the master public key the key was extracted under.
#[instrument(level = "debug", skip_all, fields(len = msg.len()))]
pub fn sign<R: RngCore + CryptoRng>(
    mpk: &SignMasterPublicKey,
    usk: &UserSecretKey,
    msg: &[u8],
    rng: &mut R,
) -> Result<Signature, Error> {
    let ds = usk.sign_point()?;
    let g = pairing(&G1Affine::generator(), mpk.point());

    for attempt in 0..MAX_RETRIES {
        let r = rand_scalar(rng);
        if let Some(sig) = sign_with(&g, ds, msg, &r) {
            return Ok(sig);
        }
        debug!(attempt, "l vanished, drawing a new nonce");
    }

    Err(Error::RetriesExhausted(MAX_RETRIES))
}

/// Verifies that `sig` is a signature by `id` on `msg`.
///
/// Malformed signatures are rejected rather than reported as errors.
#[instrument(level = "debug", skip_all, fields(len = msg.len()))]
pub fn verify(id: &[u8], mpk: &SignMasterPublicKey, msg: &[u8], sig: &Signature) -> bool {
    let h = match Scalar::from_bytes(&sig.h) {
        Ok(h) if !h.is_zero() => h,
        _ => {
            debug!("h outside [1, N-1]");
            return false;
        }
    };
    let s = match G1Affine::from_bytes(&sig.s) {
        Ok(s) if s.is_valid() => s,
        _ => {
            debug!("S is not in G1");
            return false;
        }
    };

    let t = pairing(&G1Affine::generator(), mpk.point()).pow(&h);
    let p = public_point(mpk.point(), id, Usage::Sign).to_affine();
    let u = pairing(&s, &p);
    let w = u * t;

    let valid = h2(msg, &w) == h;
    if !valid {
        debug!("signature mismatch");
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kgc::{extract_usk, setup_sign, MasterSecretKey, SignMasterKeyPair};
    use hex_literal::hex;

    const ID: &[u8] = b"Alice";
    const MSG: &[u8] = b"Chinese IBS standard";

    fn standard_master() -> SignMasterKeyPair {
        let ks = hex!("000130E78459D78545CB54C587E02CF480CE0B66340F319F348A1D5B1F2DC5F4");
        SignMasterKeyPair::from_secret(MasterSecretKey::from_bytes(&ks).unwrap())
    }

    fn standard_signature() -> (SignMasterKeyPair, Signature) {
        let master = standard_master();
        let usk = extract_usk(&master.secret, ID, Usage::Sign).unwrap();
        let r = Scalar::from_bytes(&hex!(
            "00033C8616B06704813203DFD00965022ED15975C662337AED648835DC4B1CBE"
        ))
        .unwrap();
        let sig = sign_with_nonce(&master.public, &usk, MSG, &r).unwrap().unwrap();
        (master, sig)
    }

    test_compress!(
        eq_serialize_deserialize_signature,
        Signature,
        standard_signature().1
    );

    #[test]
    fn standard_vector() {
        let (master, sig) = standard_signature();

        assert_eq!(
            sig.h,
            hex!("823C4B21E4BD2DFE1ED92C606653E996668563152FC33F55D7BFBB9BD9705ADB")
        );
        assert_eq!(
            sig.s,
            hex!(
                "73BF96923CE58B6AD0E13E9643A406D8EB98417C50EF1B29CEF9ADB48B6D598C"
                "856712F1C2E0968AB7769F42A99586AED139D5B8B3E15891827CC2ACED9BAA05"
            )
        );
        assert!(verify(ID, &master.public, MSG, &sig));
    }

    #[test]
    fn eq_sign_verify() {
        let mut rng = rand::thread_rng();
        let master = setup_sign(&mut rng);
        let usk = extract_usk(&master.secret, b"alice", Usage::Sign).unwrap();

        let sig = sign(&master.public, &usk, b"", &mut rng).unwrap();
        assert!(verify(b"alice", &master.public, b"", &sig));

        let sig = sign(&master.public, &usk, &[7u8; 1000], &mut rng).unwrap();
        assert!(verify(b"alice", &master.public, &[7u8; 1000], &sig));
        assert!(!verify(b"bob", &master.public, &[7u8; 1000], &sig));

        let other = setup_sign(&mut rng);
        assert!(!verify(b"alice", &other.public, &[7u8; 1000], &sig));
    }

    #[test]
    fn tampering_is_detected() {
        let (master, sig) = standard_signature();

        assert!(!verify(ID, &master.public, b"Chinese IBS standarD", &sig));

        let mut bad_h = sig;
        bad_h.h[31] ^= 0x01;
        assert!(!verify(ID, &master.public, MSG, &bad_h));

        let mut bad_s = sig;
        bad_s.s[63] ^= 0x01;
        assert!(!verify(ID, &master.public, MSG, &bad_s));
    }

    #[test]
    fn h_out_of_range() {
        let (master, sig) = standard_signature();

        let zero = Signature { h: [0; 32], ..sig };
        assert!(!verify(ID, &master.public, MSG, &zero));

        let order = Signature {
            h: hex!("B640000002A3A6F1D603AB4FF58EC74449F2934B18EA8BEEE56EE19CD69ECF25"),
            ..sig
        };
        assert!(!verify(ID, &master.public, MSG, &order));

        let max = Signature { h: [0xff; 32], ..sig };
        assert!(!verify(ID, &master.public, MSG, &max));
    }

    #[test]
    fn s_not_in_g1() {
        let (master, sig) = standard_signature();

        let identity = Signature { s: [0; 64], ..sig };
        assert!(!verify(ID, &master.public, MSG, &identity));

        let off_curve = Signature { s: [0x11; 64], ..sig };
        assert!(!verify(ID, &master.public, MSG, &off_curve));
    }

    #[test]
    fn signing_needs_a_signing_key() {
        let master = standard_master();
        let usk = UserSecretKey::Encrypt(crate::curve::G2Affine::generator());

        assert_eq!(
            sign(&master.public, &usk, MSG, &mut rand::thread_rng()),
            Err(Error::KeyUsage {
                expected: Usage::Sign,
                actual: Usage::Encrypt
            })
        );
    }
}
