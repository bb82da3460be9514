//! The SM9 identity-based key encapsulation mechanism.
//!
//! A sender holding the encryption master public key derives, for an identity, a fresh key
//! `K` together with its encapsulation `C1 ∈ G1`:
//!
//! * `Q = [H1(id, hid)]P1 + Ppub`,
//! * `C1 = [r]Q`, `w = e(Ppub, P2)^r`,
//! * `K = KDF(C1 ‖ w ‖ id, klen)`.
//!
//! The holder of the identity key `de` recovers `w = e(C1, de)` and with it `K`.
//! The hybrid encryption scheme in [`crate::pke`] is built on top of this.

use crate::curve::{pairing, G1Affine, G1Projective, G2Affine, Gt, Scalar, G1_BYTES, GT_BYTES};
use crate::error::Error;
use crate::kgc::{public_point, EncryptMasterPublicKey, Usage, UserSecretKey};
use crate::util::{is_all_zero, kdf, rand_scalar, MAX_RETRIES};
use rand::{CryptoRng, RngCore};
use tracing::{debug, instrument};

/// Whether a derived key has to be rejected. An empty key is never rejected.
pub(crate) fn is_zero_key(k: &[u8]) -> bool {
    !k.is_empty() && is_all_zero(k)
}

fn derive_key(c1: &G1Affine, w: &Gt, id: &[u8], klen: usize) -> Vec<u8> {
    let mut z = Vec::with_capacity(G1_BYTES + GT_BYTES + id.len());
    z.extend_from_slice(&c1.to_bytes());
    z.extend_from_slice(&w.to_bytes());
    z.extend_from_slice(id);
    kdf(&z, klen)
}

fn encapsulate(
    q: &G1Projective,
    g: &Gt,
    id: &[u8],
    klen: usize,
    r: &Scalar,
) -> (G1Affine, Vec<u8>) {
    let c1 = (q * r).to_affine();
    let w = g.pow(r);
    let k = derive_key(&c1, &w, id, klen);
    (c1, k)
}

/// Encapsulates with a caller-chosen nonce `r`.
#[cfg(test)]
pub(crate) fn encaps_with_nonce(
    mpk: &EncryptMasterPublicKey,
    id: &[u8],
    klen: usize,
    r: &Scalar,
) -> (G1Affine, Vec<u8>) {
    let q = public_point(mpk.point(), id, Usage::Encrypt);
    let g = pairing(mpk.point(), &G2Affine::generator());
    encapsulate(&q, &g, id, klen, r)
}

/// Draws nonces until `reject` accepts the derived key, at most [`MAX_RETRIES`] times.
pub(crate) fn encaps_checked<R, F>(
    mpk: &EncryptMasterPublicKey,
    id: &[u8],
    klen: usize,
    rng: &mut R,
    reject: F,
) -> Result<(G1Affine, Vec<u8>), Error>
where
    R: RngCore + CryptoRng,
    F: Fn(&[u8]) -> bool,
{
    let q = public_point(mpk.point(), id, Usage::Encrypt);
    let g = pairing(mpk.point(), &G2Affine::generator());

    for attempt in 0..MAX_RETRIES {
        let r = rand_scalar(rng);
        let (c1, k) = encapsulate(&q, &g, id, klen, &r);
        if !reject(&k) {
            return Ok((c1, k));
        }
        debug!(attempt, "derived key is all zero, drawing a new nonce");
    }

    Err(Error::RetriesExhausted(MAX_RETRIES))
}

/// Recomputes the `klen`-byte key behind `c1` without judging its value.
pub(crate) fn recover(
    de: &G2Affine,
    id: &[u8],
    c1: &G1Affine,
    klen: usize,
) -> Result<Vec<u8>, Error> {
    if !c1.is_valid() {
        return Err(Error::InvalidPoint("C1 not on G1"));
    }
    let w = pairing(c1, de);
    Ok(derive_key(c1, &w, id, klen))
}

/// Encapsulates a `klen`-byte key for `id`.
///
/// Returns the encapsulation `C1` and the key. An all-zero key is never returned.
#[instrument(level = "debug", skip_all, fields(klen = klen))]
pub fn encaps<R: RngCore + CryptoRng>(
    mpk: &EncryptMasterPublicKey,
    id: &[u8],
    klen: usize,
    rng: &mut R,
) -> Result<(G1Affine, Vec<u8>), Error> {
    encaps_checked(mpk, id, klen, rng, is_zero_key)
}

/// Decapsulates the `klen`-byte key from `c1` using the encryption key of `id`.
///
/// Fails with [`Error::InvalidPoint`] if `c1` is not a proper element of G1 and with
/// [`Error::ZeroKey`] if the recovered key is all zero.
#[instrument(level = "debug", skip_all, fields(klen = klen))]
pub fn decaps(
    usk: &UserSecretKey,
    id: &[u8],
    c1: &G1Affine,
    klen: usize,
) -> Result<Vec<u8>, Error> {
    let de = usk.g2_point(Usage::Encrypt)?;
    let k = recover(de, id, c1, klen)?;
    if is_zero_key(&k) {
        return Err(Error::ZeroKey);
    }
    Ok(k)
}
