//! SM9 identity-based public key encryption.
//!
//! A hybrid scheme: the key encapsulation of [`crate::kem`] yields `K1 ‖ K2`, the message is
//! encrypted under `K1` and authenticated with `C3 = SM3(C2 ‖ K2)`. Two data encapsulations
//! are available, see [`Mode`].

use crate::curve::{G1Affine, G2Affine, G1_BYTES};
use crate::error::Error;
use crate::kem::{encaps_checked, is_zero_key, recover};
use crate::kgc::{extract_usk, EncryptMasterPublicKey, MasterSecretKey, Usage, UserSecretKey};
use crate::util::{mac, HASH_BYTES};
use arrayref::array_ref;
use core::fmt;
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use rand::{CryptoRng, RngCore};
use sm4::Sm4;
use subtle::ConstantTimeEq;
use tracing::{debug, instrument};

#[cfg(test)]
use crate::curve::Scalar;

/// Size of the SM4 key `K1` in block mode.
pub const BLOCK_KEY_BYTES: usize = 16;

/// Size of the fixed part of a ciphertext, `C1 ‖ C3`.
pub const CT_OVERHEAD_BYTES: usize = G1_BYTES + HASH_BYTES;

type Sm4EcbEnc = ecb::Encryptor<Sm4>;
type Sm4EcbDec = ecb::Decryptor<Sm4>;

/// How the message is encrypted under `K1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// XOR with a key stream as long as the message.
    Stream,
    /// SM4 in ECB mode with PKCS#7 padding, under a 16-byte key.
    Block,
}

impl Mode {
    /// Length of `K1` for a message (or `C2`) of `len` bytes.
    fn key_len(self, len: usize) -> usize {
        match self {
            Mode::Stream => len,
            Mode::Block => BLOCK_KEY_BYTES,
        }
    }
}

/// An SM9 ciphertext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CipherText {
    pub c1: G1Affine,
    pub c3: [u8; HASH_BYTES],
    pub c2: Vec<u8>,
}

impl CipherText {
    /// `C1 ‖ C3 ‖ C2`
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CT_OVERHEAD_BYTES + self.c2.len());
        out.extend_from_slice(&self.c1.to_bytes());
        out.extend_from_slice(&self.c3);
        out.extend_from_slice(&self.c2);
        out
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < CT_OVERHEAD_BYTES {
            return Err(Error::InvalidEncoding("ciphertext too short"));
        }
        let (head, c2) = bytes.split_at(CT_OVERHEAD_BYTES);
        let c1 = G1Affine::from_bytes(array_ref![head, 0, G1_BYTES])?;
        let c3 = *array_ref![head, G1_BYTES, HASH_BYTES];

        Ok(CipherText {
            c1,
            c3,
            c2: c2.to_vec(),
        })
    }

    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s.trim()).map_err(|_| Error::InvalidEncoding("malformed hex"))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for CipherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.to_vec()))
    }
}

fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter().zip(key).map(|(d, k)| d ^ k).collect()
}

fn sm4_encrypt(k1: &[u8], msg: &[u8]) -> Result<Vec<u8>, Error> {
    let cipher =
        Sm4EcbEnc::new_from_slice(k1).map_err(|_| Error::InvalidEncoding("SM4 key length"))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(msg))
}

fn sm4_decrypt(k1: &[u8], c2: &[u8]) -> Result<Vec<u8>, Error> {
    let cipher =
        Sm4EcbDec::new_from_slice(k1).map_err(|_| Error::InvalidEncoding("SM4 key length"))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(c2)
        .map_err(|_| Error::Decryption)
}

/// Encrypts and authenticates `msg` under the derived `K1 ‖ K2`.
fn seal(c1: G1Affine, k: &[u8], msg: &[u8], mode: Mode) -> Result<CipherText, Error> {
    let (k1, k2) = k.split_at(mode.key_len(msg.len()));
    let c2 = match mode {
        Mode::Stream => xor(msg, k1),
        Mode::Block => sm4_encrypt(k1, msg)?,
    };
    let c3 = mac(k2, &c2);

    Ok(CipherText { c1, c3, c2 })
}

fn open(de: &G2Affine, id: &[u8], ct: &CipherText, mode: Mode) -> Result<Vec<u8>, Error> {
    let k1_len = mode.key_len(ct.c2.len());
    let k = recover(de, id, &ct.c1, k1_len + HASH_BYTES)?;
    let (k1, k2) = k.split_at(k1_len);

    if is_zero_key(k1) {
        return Err(Error::ZeroKey);
    }
    if !bool::from(mac(k2, &ct.c2)[..].ct_eq(&ct.c3[..])) {
        debug!("C3 verify failed");
        return Err(Error::MacMismatch);
    }

    match mode {
        Mode::Stream => Ok(xor(&ct.c2, k1)),
        Mode::Block => sm4_decrypt(k1, &ct.c2),
    }
}

#[cfg(test)]
pub(crate) fn encrypt_with_nonce(
    mpk: &EncryptMasterPublicKey,
    id: &[u8],
    msg: &[u8],
    mode: Mode,
    r: &Scalar,
) -> Result<CipherText, Error> {
    let klen = mode.key_len(msg.len()) + HASH_BYTES;
    let (c1, k) = crate::kem::encaps_with_nonce(mpk, id, klen, r);
    seal(c1, &k, msg, mode)
}

/// Encrypts `msg` for the identity `id`.
///
/// Nonces leading to an all-zero `K1` are redrawn; a message of length zero is encrypted
/// as is.
#[instrument(level = "debug", skip_all, fields(mode = ?mode, len = msg.len()))]
pub fn encrypt<R: RngCore + CryptoRng>(
    mpk: &EncryptMasterPublicKey,
    id: &[u8],
    msg: &[u8],
    mode: Mode,
    rng: &mut R,
) -> Result<CipherText, Error> {
    let k1_len = mode.key_len(msg.len());
    let (c1, k) = encaps_checked(mpk, id, k1_len + HASH_BYTES, rng, |k| {
        is_zero_key(&k[..k1_len])
    })?;
    seal(c1, &k, msg, mode)
}

/// Decrypts `ct` with the encryption key of `id`.
///
/// `C1` is checked to be a proper element of G1 and `C3` is verified before anything is
/// decrypted, so no plaintext is ever returned for a tampered ciphertext.
#[instrument(level = "debug", skip_all, fields(mode = ?mode))]
pub fn decrypt(
    usk: &UserSecretKey,
    id: &[u8],
    ct: &CipherText,
    mode: Mode,
) -> Result<Vec<u8>, Error> {
    let de = usk.g2_point(Usage::Encrypt)?;
    open(de, id, ct, mode)
}

/// Decrypts `ct` on behalf of `id` with the master secret key, deriving the identity key first.
#[instrument(level = "debug", skip_all, fields(mode = ?mode))]
pub fn decrypt_with_master_key(
    msk: &MasterSecretKey,
    id: &[u8],
    ct: &CipherText,
    mode: Mode,
) -> Result<Vec<u8>, Error> {
    let usk = extract_usk(msk, id, Usage::Encrypt)?;
    decrypt(&usk, id, ct, mode)
}
