use crate::curve::{Gt, Scalar};
use byteorder::{BigEndian, ByteOrder};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use sm3::{Digest, Sm3};

/// Size of a serialized scalar.
pub(crate) const SCALAR_BYTES: usize = 32;

/// Size of an SM3 digest, which is also the MAC tag and MAC key size.
pub(crate) const HASH_BYTES: usize = 32;

/// Output length of the hash-to-scalar functions, `⌈5·log₂(N) / 32⌉` for the 256-bit N.
const H_BYTES: usize = 40;

/// Upper bound on the nonces drawn by one operation before giving up.
pub(crate) const MAX_RETRIES: usize = 64;

/// Domain separators of H1 and H2.
const H1_PREFIX: u8 = 0x01;
const H2_PREFIX: u8 = 0x02;

/// Draws a uniform scalar in `[1, N-1]`.
///
/// Reduces 320 random bits like the hash-to-scalar functions do, so no rejection loop is needed.
#[inline(always)]
pub fn rand_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    let mut buf = [0u8; H_BYTES];
    rng.fill_bytes(&mut buf);
    reduce_nonzero(&buf)
}

/// `int(bytes) mod (N-1) + 1`
fn reduce_nonzero(bytes: &[u8]) -> Scalar {
    let n_minus_one = Scalar::modulus().clone() - 1u32;
    let v = BigUint::from_bytes_be(bytes) % &n_minus_one + 1u32;
    Scalar::from_biguint(&v)
}

/// Iterates over the bits of a big-endian byte string, most significant first.
pub fn bits(slice: &[u8]) -> impl Iterator<Item = bool> + '_ {
    slice
        .iter()
        .flat_map(|x| (0..8).rev().map(move |i| (*x >> i) & 1 == 1))
}

pub fn sm3(parts: &[&[u8]]) -> [u8; HASH_BYTES] {
    let mut digest = Sm3::new();
    for part in parts {
        digest.update(part);
    }
    digest.finalize().into()
}

/// `MAC(K2, C2) = SM3(C2 ‖ K2)`
pub fn mac(k2: &[u8], c2: &[u8]) -> [u8; HASH_BYTES] {
    sm3(&[c2, k2])
}

/// Counter-mode key derivation: `SM3(Z ‖ 1) ‖ SM3(Z ‖ 2) ‖ …`, truncated to `len` bytes.
pub fn kdf(z: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + HASH_BYTES);
    let mut ct = [0u8; 4];
    let mut counter: u32 = 1;

    while out.len() < len {
        BigEndian::write_u32(&mut ct, counter);
        out.extend_from_slice(&sm3(&[z, &ct]));
        counter += 1;
    }

    out.truncate(len);
    out
}

/// `H_v(prefix ‖ Z)` reduced into `[1, N-1]`.
fn hash_to_scalar(prefix: u8, parts: &[&[u8]]) -> Scalar {
    let mut z = vec![prefix];
    for part in parts {
        z.extend_from_slice(part);
    }
    reduce_nonzero(&kdf(&z, H_BYTES))
}

/// `H1(id ‖ hid, N)`: hashes an identity and its usage tag into `[1, N-1]`.
pub fn h1(id: &[u8], hid: u8) -> Scalar {
    hash_to_scalar(H1_PREFIX, &[id, &[hid]])
}

/// `H2(M ‖ w, N)`: hashes a message together with a GT element into `[1, N-1]`.
pub fn h2(msg: &[u8], w: &Gt) -> Scalar {
    hash_to_scalar(H2_PREFIX, &[msg, &w.to_bytes()])
}

pub(crate) fn is_all_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn bits_msb_first() {
        let b: Vec<bool> = bits(&[0b1000_0001, 0x40]).collect();

        assert_eq!(b.len(), 16);
        assert!(b[0] && b[7] && b[9]);
        assert_eq!(b.iter().filter(|x| **x).count(), 3);
    }

    #[test]
    fn kdf_vector() {
        let z = hex!(
            "1EDEE2C3 F4659144 91DE44CE FB2CB434 AB02C308 D9DC5E20 67B4FED5 AAAC8A0F"
            "1C9B4C43 5ECA35AB 83BB7341 74C0F78F DE81A533 74AFF3B3 602BBC5E 37BE9A4C"
            "8EAB0CD6 D0C95A6B BB7051AC 848FDFB9 689E5E5C 486B1294 557189B3 38B53B1D"
            "78082BB4 0152DC35 AC774442 CC6408FF D68494D9 953D77BF 55E30E84 697F6674"
            "5AAF5223 9E46B037 3B3168BA B75C32E0 48B5FAEB ABFA1F7F 9BA6B4C0 C90E65B0"
            "75F6A2D9 ED54C87C DDD2EAA7 87032320 205E7AC7 D7FEAA86 95AB2BF7 F5710861"
            "247C2034 CCF4A143 2DA1876D 023AD6D7 4FF1678F DA3AF37A 3D9F613C DE805798"
            "8B07151B AC93AF48 D78D86C2 6EA97F24 E2DACC84 104CCE87 91FE90BA 61B2049C"
            "AAC6AB38 EA07F996 6173FD9B BF34AAB5 8EE84CD3 777A9FD0 0BBCA1DC 09CF8696"
            "A1040465 BD723AE5 13C4BE3E F2CFDC08 8A935F0B 207DEED7 AAD5CE2F C37D4203"
            "4D874A4C E9B3B587 65B1252A 0880952B 4FF3C97E A1A4CFDC 67A0A007 2541A03D"
            "3924EABC 443B0503 510B93BB CD98EB70 E0192B82 1D14D69C CB2513A1 A7421EB7"
            "A018A035 E8FB61F2 71DE1C5B 3E781C63 508C113B 3EAC5378 05EAE164 D732FAD0"
            "56BEA27C 8624D506 4C9C278A 193D63F6 908EE558 DF5F5E07 21317FC6 E829C242 426F62"
        );
        let k = hex!("4FF5CF86 D2AD40C8 F4BAC98D 76ABDBDE 0C0E2F0A 829D3F91 1EF5B2BC E0695480");

        assert_eq!(kdf(&z, 32), k);
    }

    #[test]
    fn kdf_is_deterministic_and_prefix_stable() {
        let long = kdf(b"seed", 100);

        assert_eq!(long.len(), 100);
        assert_eq!(long, kdf(b"seed", 100));
        assert_eq!(kdf(b"seed", 33), long[..33]);
        assert!(kdf(b"seed", 0).is_empty());
    }

    #[test]
    fn h1_vector() {
        assert_eq!(
            h1(b"Bob", 0x03).to_bytes(),
            hex!("9CB1F6288CE0E51043CE72344582FFC301E0A812A7F5F2004B85547A24B82716")
        );
    }

    #[test]
    fn rand_scalar_is_nonzero() {
        let mut rng = rand::thread_rng();
        for _ in 0..8 {
            assert!(!crate::curve::Field::is_zero(&rand_scalar(&mut rng)));
        }
    }
}
