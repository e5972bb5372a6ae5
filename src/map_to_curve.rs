// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Deterministic hashing onto the P-256 curve via the simplified
//! Shallue-van de Woestijne-Ulas map
//!
//! The map follows
//! <https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-hash-to-curve-11#section-6.6.2>
//! with the standard P-256 parameters (`A = -3`, `Z = -10`). The field
//! element fed to the map is the SHA-256 digest of the domain tag, the
//! caller's fields and a trailing discriminator byte, reduced modulo the
//! field prime.

use crate::errors::InternalError;
use crate::group::SCALAR_LEN;
use core::str::FromStr;
use generic_array::{typenum::U32, GenericArray};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use once_cell::sync::Lazy;
use p256::elliptic_curve::group::prime::PrimeCurveAffine;
use p256::elliptic_curve::sec1::FromEncodedPoint;
use p256::{AffinePoint, EncodedPoint, ProjectivePoint};
use sha2::{Digest, Sha256};

// `p: 2^256 - 2^224 + 2^192 + 2^96 - 1`
static P: Lazy<BigInt> = Lazy::new(|| {
    BigInt::from_str(
        "115792089210356248762697446949407573530086143415290314195533631308867097853951",
    )
    .unwrap()
});
// `A: -3`
static A: Lazy<BigInt> = Lazy::new(|| &*P - BigInt::from(3));
// `B: 0x5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b`
static B: Lazy<BigInt> = Lazy::new(|| {
    BigInt::parse_bytes(
        b"5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b",
        16,
    )
    .unwrap()
});
// `Z: -10`
static Z: Lazy<BigInt> = Lazy::new(|| &*P - BigInt::from(10));

/// Hashes a tag and a sequence of fields onto a curve point.
pub(crate) fn hash_to_point(tag: u8, fields: &[&[u8]]) -> Result<ProjectivePoint, InternalError> {
    let mut input: Vec<u8> = vec![tag];
    for field in fields {
        input.extend_from_slice(field);
    }
    // trailing discriminator byte, fixed to zero
    input.push(0u8);

    let digest = Sha256::digest(&input);
    let u = BigInt::from_bytes_be(Sign::Plus, &digest).mod_floor(&P);
    let (x, y) = map_to_curve_simple_swu(&u);

    let encoded =
        EncodedPoint::from_affine_coordinates(&element_bytes(&x), &element_bytes(&y), false);
    let affine =
        AffinePoint::from_encoded_point(&encoded).ok_or(InternalError::HashToCurveError)?;
    Ok(affine.to_curve())
}

fn modp(value: BigInt) -> BigInt {
    value.mod_floor(&P)
}

/// See <https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-hash-to-curve-11#section-4>
fn inv0(value: &BigInt) -> BigInt {
    value.modpow(&(&*P - BigInt::from(2)), &P)
}

/// Corresponds to the sqrt_3mod4() function defined in
/// <https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-hash-to-curve-11#appendix-I.1>
fn sqrt_3mod4(value: &BigInt) -> BigInt {
    value.modpow(&((&*P + BigInt::one()) >> 2), &P)
}

/// Euler's criterion, as in
/// <https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-hash-to-curve-11#section-4>
fn is_square(value: &BigInt) -> bool {
    let legendre = value.modpow(&((&*P - BigInt::one()) >> 1), &P);
    legendre.is_zero() || legendre.is_one()
}

/// Corresponds to the map_to_curve_simple_swu() function defined in
/// <https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-hash-to-curve-11#appendix-F.2>
#[allow(clippy::many_single_char_names)]
fn map_to_curve_simple_swu(u: &BigInt) -> (BigInt, BigInt) {
    // 1.  c1 = -B / A
    let c1 = modp(-(&*B) * inv0(&A));
    // 2.  c2 = -1 / Z
    let c2 = modp(-inv0(&Z));

    // 1.  tv1 = Z * u^2
    let tv1 = modp(&*Z * u * u);
    // 2.  tv2 = tv1^2
    let tv2 = modp(&tv1 * &tv1);
    // 3.   x1 = inv0(tv1 + tv2)
    let mut x1 = inv0(&modp(&tv1 + &tv2));
    // 5.   e1 = x1 == 0
    let e1 = x1.is_zero();
    // 6.   x1 = x1 + 1
    x1 = modp(x1 + BigInt::one());
    // 7.   x1 = CMOV(x1, c2, e1)    # If (tv1 + tv2) == 0, set x1 = -1 / Z
    if e1 {
        x1 = c2;
    }
    // 8.   x1 = x1 * c1      # x1 = (-B / A) * (1 + (1 / (Z^2 * u^4 + Z * u^2)))
    x1 = modp(x1 * &c1);
    // 9..12.  gx1 = x1^3 + A * x1 + B
    let mut gx1 = modp(&x1 * &x1);
    gx1 = modp(gx1 + &*A);
    gx1 = modp(gx1 * &x1);
    gx1 = modp(gx1 + &*B);
    // 13.  x2 = tv1 * x1            # x2 = Z * u^2 * x1
    let x2 = modp(&tv1 * &x1);
    // 14..15. gx2 = (Z * u^2)^3 * gx1
    let tv3 = modp(tv1 * tv2);
    let gx2 = modp(&gx1 * &tv3);
    // 16..18. select x1 if gx1 is square, x2 otherwise
    let e2 = is_square(&gx1);
    let x = if e2 { x1 } else { x2 };
    let y2 = if e2 { gx1 } else { gx2 };
    // 19.   y = sqrt(y2)
    let mut y = sqrt_3mod4(&y2);
    // 20..21. fix the sign of y to the parity of u
    if u.is_odd() != y.is_odd() {
        y = modp(-y);
    }
    (x, y)
}

fn element_bytes(value: &BigInt) -> GenericArray<u8, U32> {
    let (_, bytes) = value.to_bytes_be();
    let mut output = GenericArray::default();
    output[SCALAR_LEN - bytes.len()..].copy_from_slice(&bytes);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Params {
        u0: &'static str,
        u1: &'static str,
        q0x: &'static str,
        q0y: &'static str,
        q1x: &'static str,
        q1y: &'static str,
    }

    // Test vectors taken from
    // https://datatracker.ietf.org/doc/html/draft-irtf-cfrg-hash-to-curve-11#appendix-J.1.1
    #[test]
    fn simple_swu_test_vectors() {
        let test_vectors = vec![
            Params {
                u0: "ad5342c66a6dd0ff080df1da0ea1c04b96e0330dd89406465eeba11582515009",
                u1: "8c0f1d43204bd6f6ea70ae8013070a1518b43873bcd850aafa0a9e220e2eea5a",
                q0x: "ab640a12220d3ff283510ff3f4b1953d09fad35795140b1c5d64f313967934d5",
                q0y: "dccb558863804a881d4fff3455716c836cef230e5209594ddd33d85c565b19b1",
                q1x: "51cce63c50d972a6e51c61334f0f4875c9ac1cd2d3238412f84e31da7d980ef5",
                q1y: "b45d1a36d00ad90e5ec7840a60a4de411917fbe7c82c3949a6e699e5a1b66aac",
            },
            Params {
                u0: "afe47f2ea2b10465cc26ac403194dfb68b7f5ee865cda61e9f3e07a537220af1",
                u1: "379a27833b0bfe6f7bdca08e1e83c760bf9a338ab335542704edcd69ce9e46e0",
                q0x: "5219ad0ddef3cc49b714145e91b2f7de6ce0a7a7dc7406c7726c7e373c58cb48",
                q0y: "7950144e52d30acbec7b624c203b1996c99617d0b61c2442354301b191d93ecf",
                q1x: "019b7cb4efcfeaf39f738fe638e31d375ad6837f58a852d032ff60c69ee3875f",
                q1y: "589a62d2b22357fed5449bc38065b760095ebe6aeac84b01156ee4252715446e",
            },
        ];

        for tv in test_vectors {
            let u0 = BigInt::parse_bytes(tv.u0.as_bytes(), 16).unwrap();
            let u1 = BigInt::parse_bytes(tv.u1.as_bytes(), 16).unwrap();

            let (q0x, q0y) = map_to_curve_simple_swu(&u0);
            let (q1x, q1y) = map_to_curve_simple_swu(&u1);

            assert_eq!(tv.q0x, hex::encode(element_bytes(&q0x)));
            assert_eq!(tv.q0y, hex::encode(element_bytes(&q0y)));
            assert_eq!(tv.q1x, hex::encode(element_bytes(&q1x)));
            assert_eq!(tv.q1y, hex::encode(element_bytes(&q1y)));
        }
    }

    #[test]
    fn hash_to_point_is_deterministic() {
        let first = hash_to_point(0x02, &[b"nonce bytes"]).unwrap();
        let second = hash_to_point(0x02, &[b"nonce bytes"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn hash_to_point_separates_tags_and_inputs() {
        let base = hash_to_point(0x02, &[b"nonce bytes"]).unwrap();
        assert_ne!(base, hash_to_point(0x03, &[b"nonce bytes"]).unwrap());
        assert_ne!(base, hash_to_point(0x02, &[b"nonce bytez"]).unwrap());
        // field boundaries are not authenticated, only the concatenation
        let rearranged = hash_to_point(0x02, &[b"nonce", b" bytes"]).unwrap();
        assert_eq!(base, rearranged);
    }
}
