//! The SM9 identity-based cryptosystem (GM/T 0044) on the SM9 BN256 pairing-friendly curve.
//!
//! A trusted key generation center ([`kgc`]) holds a master key pair and extracts private keys
//! bound to short identity strings. On top of those keys the crate implements:
//! * identity-based encryption as a key encapsulation mechanism ([`kem`]) and as a hybrid
//!   public-key encryption scheme ([`pke`]),
//! * identity-based signatures ([`sign`]),
//! * authenticated two-party key exchange with key confirmation ([`exchange`]).
//!
//! The curve arithmetic and the pairing are exposed in [`curve`].
//!
//! # Examples
//!
//! ```
//! use sm9::kgc::{self, Usage};
//! use sm9::pke::{self, Mode};
//!
//! let mut rng = rand::thread_rng();
//!
//! // The KGC sets up an encryption master key pair and extracts a key for "alice".
//! let master = kgc::setup_encrypt(&mut rng);
//! let usk = kgc::extract_usk(&master.secret, b"alice", Usage::Encrypt).unwrap();
//!
//! // Anyone holding the master public key can encrypt to "alice".
//! let msg = b"hello world!!";
//! let ct = pke::encrypt(&master.public, b"alice", msg, Mode::Block, &mut rng).unwrap();
//!
//! // Alice decrypts with the extracted private key.
//! let m = pke::decrypt(&usk, b"alice", &ct, Mode::Block).unwrap();
//! assert_eq!(m, msg);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
mod macros;

#[cfg(test)]
#[macro_use]
mod test_macros;

mod error;
mod util;

pub mod curve;
pub mod kem;
pub mod kgc;

#[cfg(feature = "encrypt")]
#[cfg_attr(docsrs, doc(cfg(feature = "encrypt")))]
pub mod pke;

#[cfg(feature = "sign")]
#[cfg_attr(docsrs, doc(cfg(feature = "sign")))]
pub mod sign;

#[cfg(feature = "exchange")]
#[cfg_attr(docsrs, doc(cfg(feature = "exchange")))]
pub mod exchange;

pub use error::Error;
pub use util::{h1, h2, kdf, mac};

/// Artifacts of the system with a fixed-size byte representation.
pub trait Compress: Sized {
    const OUTPUT_SIZE: usize;
    type Output: Sized + Copy + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Serializes this artifact.
    fn to_bytes(&self) -> Self::Output;

    /// Deserializes and validates an artifact.
    fn from_bytes(output: &Self::Output) -> Result<Self, Error>;

    /// Upper-case hex of [`Compress::to_bytes`].
    fn to_hex(&self) -> String {
        hex::encode_upper(self.to_bytes())
    }

    /// Parses the hex produced by [`Compress::to_hex`], in either case.
    fn from_hex(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s.trim()).map_err(|_| Error::InvalidEncoding("malformed hex"))?;
        let output = <Self::Output as TryFrom<&[u8]>>::try_from(&bytes[..])
            .map_err(|_| Error::InvalidEncoding("unexpected length"))?;
        Self::from_bytes(&output)
    }
}
