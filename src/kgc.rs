//! The key generation center (KGC): master key pairs and identity key extraction.
//!
//! Signing uses a master public key in G2 and user keys in G1. Encryption and key exchange
//! use a master public key in G1 and user keys in G2. The two kinds of master keys are
//! distinct types and are never interchangeable.

use crate::curve::{
    Affine, CurveConfig, Field, G1Affine, G2Affine, Projective, Scalar, G1_BYTES, G2_BYTES,
};
use crate::error::Error;
use crate::util::{h1, rand_scalar, SCALAR_BYTES};
use crate::Compress;
use arrayref::{array_ref, array_refs, mut_array_refs};
use core::fmt;
use rand::{CryptoRng, RngCore};
use tracing::{instrument, warn};

/// Size of an encoded master secret key.
pub const MSK_BYTES: usize = SCALAR_BYTES;

/// Size of an encoded signing master public key: flag byte and a G2 point.
pub const SIGN_MPK_BYTES: usize = 1 + G2_BYTES;

/// Size of an encoded encryption master public key: flag byte and a G1 point.
pub const ENCRYPT_MPK_BYTES: usize = 1 + G1_BYTES;

const SIGN_FLAG: u8 = 0x01;
const ENCRYPT_FLAG: u8 = 0x00;

/// The group a key lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyGroup {
    G1,
    G2,
}

/// What an identity key is used for.
///
/// The discriminant is the `hid` byte hashed into `H1` and stored in front of encoded user keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Usage {
    Sign = 0x01,
    Exchange = 0x02,
    Encrypt = 0x03,
}

impl Usage {
    pub fn hid(self) -> u8 {
        self as u8
    }

    pub fn from_hid(hid: u8) -> Result<Self, Error> {
        match hid {
            0x01 => Ok(Usage::Sign),
            0x02 => Ok(Usage::Exchange),
            0x03 => Ok(Usage::Encrypt),
            _ => Err(Error::InvalidEncoding("unknown usage tag")),
        }
    }

    /// The group of user keys with this usage.
    pub fn key_group(self) -> KeyGroup {
        match self {
            Usage::Sign => KeyGroup::G1,
            Usage::Exchange | Usage::Encrypt => KeyGroup::G2,
        }
    }
}

/// Master secret key, a scalar in `[1, N-1]`.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterSecretKey(pub(crate) Scalar);

impl fmt::Debug for MasterSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSecretKey(..)")
    }
}

impl Compress for MasterSecretKey {
    const OUTPUT_SIZE: usize = MSK_BYTES;
    type Output = [u8; MSK_BYTES];

    fn to_bytes(&self) -> [u8; MSK_BYTES] {
        self.0.to_bytes()
    }

    fn from_bytes(bytes: &[u8; MSK_BYTES]) -> Result<Self, Error> {
        let s = Scalar::from_bytes(bytes)?;
        if s.is_zero() {
            return Err(Error::InvalidEncoding("zero master secret key"));
        }
        Ok(MasterSecretKey(s))
    }
}

/// Master public key for signatures, `[ks]P2`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignMasterPublicKey(pub(crate) G2Affine);

/// Master public key for encryption and key exchange, `[ke]P1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptMasterPublicKey(pub(crate) G1Affine);

impl SignMasterPublicKey {
    pub fn point(&self) -> &G2Affine {
        &self.0
    }
}

impl EncryptMasterPublicKey {
    pub fn point(&self) -> &G1Affine {
        &self.0
    }
}

impl Compress for SignMasterPublicKey {
    const OUTPUT_SIZE: usize = SIGN_MPK_BYTES;
    type Output = [u8; SIGN_MPK_BYTES];

    fn to_bytes(&self) -> [u8; SIGN_MPK_BYTES] {
        let mut buf = [0u8; SIGN_MPK_BYTES];
        let (flag, point) = mut_array_refs![&mut buf, 1, G2_BYTES];
        flag[0] = SIGN_FLAG;
        *point = self.0.to_bytes();
        buf
    }

    fn from_bytes(bytes: &[u8; SIGN_MPK_BYTES]) -> Result<Self, Error> {
        let (flag, point) = array_refs![bytes, 1, G2_BYTES];
        if flag[0] == ENCRYPT_FLAG {
            return Err(Error::InvalidEncoding("not a signing master public key"));
        }
        let p = G2Affine::from_bytes(point)?;
        if !p.is_valid() {
            return Err(Error::InvalidPoint("master public key is not in G2"));
        }
        Ok(SignMasterPublicKey(p))
    }
}

impl Compress for EncryptMasterPublicKey {
    const OUTPUT_SIZE: usize = ENCRYPT_MPK_BYTES;
    type Output = [u8; ENCRYPT_MPK_BYTES];

    fn to_bytes(&self) -> [u8; ENCRYPT_MPK_BYTES] {
        let mut buf = [0u8; ENCRYPT_MPK_BYTES];
        let (flag, point) = mut_array_refs![&mut buf, 1, G1_BYTES];
        flag[0] = ENCRYPT_FLAG;
        *point = self.0.to_bytes();
        buf
    }

    fn from_bytes(bytes: &[u8; ENCRYPT_MPK_BYTES]) -> Result<Self, Error> {
        let (flag, point) = array_refs![bytes, 1, G1_BYTES];
        if flag[0] != ENCRYPT_FLAG {
            return Err(Error::InvalidEncoding("not an encryption master public key"));
        }
        let p = G1Affine::from_bytes(point)?;
        if !p.is_valid() {
            return Err(Error::InvalidPoint("master public key is not in G1"));
        }
        Ok(EncryptMasterPublicKey(p))
    }
}

/// Either kind of master public key, told apart by the leading flag byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MasterPublicKey {
    Sign(SignMasterPublicKey),
    Encrypt(EncryptMasterPublicKey),
}

impl MasterPublicKey {
    pub fn to_vec(&self) -> Vec<u8> {
        match self {
            MasterPublicKey::Sign(k) => k.to_bytes().to_vec(),
            MasterPublicKey::Encrypt(k) => k.to_bytes().to_vec(),
        }
    }

    /// Decodes a flagged master public key: a nonzero flag selects the signing kind.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        match bytes.first() {
            None => Err(Error::InvalidEncoding("empty master public key")),
            Some(&ENCRYPT_FLAG) => {
                let arr: &[u8; ENCRYPT_MPK_BYTES] = bytes
                    .try_into()
                    .map_err(|_| Error::InvalidEncoding("encryption master public key length"))?;
                EncryptMasterPublicKey::from_bytes(arr).map(MasterPublicKey::Encrypt)
            }
            Some(_) => {
                let arr: &[u8; SIGN_MPK_BYTES] = bytes
                    .try_into()
                    .map_err(|_| Error::InvalidEncoding("signing master public key length"))?;
                SignMasterPublicKey::from_bytes(arr).map(MasterPublicKey::Sign)
            }
        }
    }

    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s.trim()).map_err(|_| Error::InvalidEncoding("malformed hex"))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for MasterPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.to_vec()))
    }
}

/// A master public key that can be recomputed from the master secret key.
pub trait MasterPublic: Compress {
    fn from_secret(msk: &MasterSecretKey) -> Self;
}

impl MasterPublic for SignMasterPublicKey {
    fn from_secret(msk: &MasterSecretKey) -> Self {
        SignMasterPublicKey((&G2Affine::generator() * &msk.0).to_affine())
    }
}

impl MasterPublic for EncryptMasterPublicKey {
    fn from_secret(msk: &MasterSecretKey) -> Self {
        EncryptMasterPublicKey((&G1Affine::generator() * &msk.0).to_affine())
    }
}

/// A master key pair as held by the KGC operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MasterKeyPair<P> {
    pub secret: MasterSecretKey,
    pub public: P,
}

pub type SignMasterKeyPair = MasterKeyPair<SignMasterPublicKey>;
pub type EncryptMasterKeyPair = MasterKeyPair<EncryptMasterPublicKey>;

impl<P: MasterPublic> MasterKeyPair<P> {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self::from_secret(MasterSecretKey(rand_scalar(rng)))
    }

    pub fn from_secret(secret: MasterSecretKey) -> Self {
        let public = P::from_secret(&secret);
        MasterKeyPair { secret, public }
    }

    /// `secret ‖ public`
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = self.secret.to_bytes().to_vec();
        out.extend_from_slice(self.public.to_bytes().as_ref());
        out
    }

    /// Decodes `secret ‖ public` and checks that the halves belong together.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != MSK_BYTES + P::OUTPUT_SIZE {
            return Err(Error::InvalidEncoding("master key pair length"));
        }
        let (secret, public) = bytes.split_at(MSK_BYTES);
        let secret = MasterSecretKey::from_bytes(array_ref![secret, 0, MSK_BYTES])?;
        let public = <P::Output as TryFrom<&[u8]>>::try_from(public)
            .map_err(|_| Error::InvalidEncoding("master public key length"))?;
        let public = P::from_bytes(&public)?;

        let pair = Self::from_secret(secret);
        if pair.public.to_bytes().as_ref() != public.to_bytes().as_ref() {
            return Err(Error::InvalidEncoding("master public key does not match secret key"));
        }
        Ok(pair)
    }
}

/// Generates a master key pair for signatures: `ks ∈ [1, N-1]`, `Ppub-s = [ks]P2`.
pub fn setup_sign<R: RngCore + CryptoRng>(rng: &mut R) -> SignMasterKeyPair {
    MasterKeyPair::generate(rng)
}

/// Generates a master key pair for encryption and key exchange: `ke ∈ [1, N-1]`,
/// `Ppub-e = [ke]P1`.
pub fn setup_encrypt<R: RngCore + CryptoRng>(rng: &mut R) -> EncryptMasterKeyPair {
    MasterKeyPair::generate(rng)
}

/// A private key extracted for an identity, tagged with its usage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserSecretKey {
    Sign(G1Affine),
    Exchange(G2Affine),
    Encrypt(G2Affine),
}

impl UserSecretKey {
    pub fn usage(&self) -> Usage {
        match self {
            UserSecretKey::Sign(_) => Usage::Sign,
            UserSecretKey::Exchange(_) => Usage::Exchange,
            UserSecretKey::Encrypt(_) => Usage::Encrypt,
        }
    }

    /// The signing key point, or a usage error.
    pub(crate) fn sign_point(&self) -> Result<&G1Affine, Error> {
        match self {
            UserSecretKey::Sign(d) => Ok(d),
            other => Err(Error::KeyUsage {
                expected: Usage::Sign,
                actual: other.usage(),
            }),
        }
    }

    /// The G2 key point for `expected`, or a usage error.
    pub(crate) fn g2_point(&self, expected: Usage) -> Result<&G2Affine, Error> {
        match self {
            UserSecretKey::Exchange(d) if expected == Usage::Exchange => Ok(d),
            UserSecretKey::Encrypt(d) if expected == Usage::Encrypt => Ok(d),
            other => Err(Error::KeyUsage {
                expected,
                actual: other.usage(),
            }),
        }
    }

    /// `hid ‖ point`
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![self.usage().hid()];
        match self {
            UserSecretKey::Sign(d) => out.extend_from_slice(&d.to_bytes()),
            UserSecretKey::Exchange(d) | UserSecretKey::Encrypt(d) => {
                out.extend_from_slice(&d.to_bytes())
            }
        }
        out
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let (tag, point) = bytes
            .split_first()
            .ok_or(Error::InvalidEncoding("empty user secret key"))?;
        let usage = Usage::from_hid(*tag)?;

        match usage.key_group() {
            KeyGroup::G1 => {
                let point: &[u8; G1_BYTES] = point
                    .try_into()
                    .map_err(|_| Error::InvalidEncoding("user secret key length"))?;
                let d = G1Affine::from_bytes(point)?;
                if !d.is_valid() {
                    return Err(Error::InvalidPoint("user secret key is not in G1"));
                }
                Ok(UserSecretKey::Sign(d))
            }
            KeyGroup::G2 => {
                let point: &[u8; G2_BYTES] = point
                    .try_into()
                    .map_err(|_| Error::InvalidEncoding("user secret key length"))?;
                let d = G2Affine::from_bytes(point)?;
                if !d.is_valid() {
                    return Err(Error::InvalidPoint("user secret key is not in G2"));
                }
                Ok(match usage {
                    Usage::Exchange => UserSecretKey::Exchange(d),
                    _ => UserSecretKey::Encrypt(d),
                })
            }
        }
    }

    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s.trim()).map_err(|_| Error::InvalidEncoding("malformed hex"))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for UserSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.to_vec()))
    }
}

/// `[H1(id, hid)]P + Ppub`, the public point of an identity in the group of `Ppub`.
pub(crate) fn public_point<C: CurveConfig>(
    ppub: &Affine<C>,
    id: &[u8],
    usage: Usage,
) -> Projective<C> {
    &(&Affine::<C>::generator() * &h1(id, usage.hid())) + ppub
}

/// Extracts the private key of `id` for `usage`.
///
/// `t1 = H1(id, hid) + s mod N`, `t2 = s·t1⁻¹ mod N`, and the key is `[t2]P1` for signing or
/// `[t2]P2` otherwise. Extraction is deterministic. If `t1` vanishes the master key has to be
/// replaced, which is reported as [`Error::MasterKeyRotation`].
#[instrument(level = "debug", skip_all, fields(usage = ?usage))]
pub fn extract_usk(msk: &MasterSecretKey, id: &[u8], usage: Usage) -> Result<UserSecretKey, Error> {
    let t1 = h1(id, usage.hid()) + &msk.0;
    let t1_inv = t1.invert().ok_or_else(|| {
        warn!("H1(id) + s vanished modulo N");
        Error::MasterKeyRotation
    })?;
    let t2 = &msk.0 * &t1_inv;

    Ok(match usage {
        Usage::Sign => UserSecretKey::Sign((&G1Affine::generator() * &t2).to_affine()),
        Usage::Exchange => UserSecretKey::Exchange((&G2Affine::generator() * &t2).to_affine()),
        Usage::Encrypt => UserSecretKey::Encrypt((&G2Affine::generator() * &t2).to_affine()),
    })
}
