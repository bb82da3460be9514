//! Error type shared by the arithmetic layer, the key generation center and the protocols.
//!
//! Integrity failures that callers must not mistake for exceptions (a signature that does not
//! verify, a key confirmation that does not match) are reported as `bool` by the respective
//! operations and never surface here.

use crate::kgc::Usage;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Bytes that cannot represent a field element, a curve point or a key.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(&'static str),

    /// A decodable point outside the order-N subgroup, or the point at infinity where a
    /// proper point is required.
    #[error("invalid point: {0}")]
    InvalidPoint(&'static str),

    /// The ephemeral point of a key exchange peer is not an element of G1.
    #[error("field mismatch: {0}")]
    FieldMismatch(&'static str),

    #[error("C3 verify failed")]
    MacMismatch,

    #[error("K1 is all zero")]
    ZeroKey,

    /// Block mode padding did not verify after the MAC was accepted.
    #[error("decryption failed")]
    Decryption,

    /// A degenerate random draw repeated more often than the retry cap allows.
    #[error("retries exhausted after {0} attempts")]
    RetriesExhausted(usize),

    /// `H1(id, hid) + d` vanished modulo N during key extraction.
    #[error("master key must be rotated")]
    MasterKeyRotation,

    #[error("key usage mismatch: expected {expected:?}, got {actual:?}")]
    KeyUsage { expected: Usage, actual: Usage },
}
