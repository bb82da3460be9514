use hex_literal::hex;
use num_bigint::BigUint;
use once_cell::sync::Lazy;

/// The SM9 base field prime q.
pub(crate) static MODULUS: Lazy<BigUint> = Lazy::new(|| {
    BigUint::from_bytes_be(&hex!(
        "B640000002A3A6F1D603AB4FF58EC74521F2934B1A7AEEDBE56F9B27E351457D"
    ))
});

prime_field!(
    /// An element of the base field F_q.
    Fp,
    MODULUS
);
