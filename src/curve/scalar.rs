use hex_literal::hex;
use num_bigint::BigUint;
use once_cell::sync::Lazy;

/// The prime order N shared by G1, G2 and GT.
pub(crate) static ORDER: Lazy<BigUint> = Lazy::new(|| {
    BigUint::from_bytes_be(&hex!(
        "B640000002A3A6F1D603AB4FF58EC74449F2934B18EA8BEEE56EE19CD69ECF25"
    ))
});

prime_field!(
    /// An integer modulo the group order N.
    Scalar,
    ORDER
);
