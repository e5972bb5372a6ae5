// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Point and scalar operations over the NIST P-256 group, along with scalar
//! sampling and the hash-to-scalar primitive

use crate::constants::STR_HASH_Z;
use crate::errors::{utils::check_slice_size, InternalError};
use generic_array::{typenum::U32, GenericArray};
use hkdf::Hkdf;
use p256::elliptic_curve::group::prime::PrimeCurveAffine;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::elliptic_curve::subtle::Choice;
use p256::{AffinePoint, EncodedPoint, ProjectivePoint, Scalar};
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroize;

/// Length of a marshaled curve point: `0x04 || X || Y`.
pub(crate) const ELEMENT_LEN: usize = 65;
/// Length of a canonical big-endian scalar.
pub(crate) const SCALAR_LEN: usize = 32;

/// SEC1 tag byte for an uncompressed point.
const UNCOMPRESSED_TAG: u8 = 0x04;

/// Big-endian bytes of the P-256 group order `n`.
const GROUP_ORDER: [u8; SCALAR_LEN] = [
    0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xbc, 0xe6, 0xfa, 0xad, 0xa7, 0x17, 0x9e, 0x84, 0xf3, 0xb9, 0xca, 0xc2, 0xfc, 0x63,
    0x25, 0x51,
];

// HKDF-SHA256 can expand at most 255 blocks, which bounds the number of
// 32-byte reads a single hash-to-scalar invocation may consume.
const MAX_HASH_TO_SCALAR_READS: usize = 255;

/// Marshals a point in uncompressed SEC1 form.
pub(crate) fn serialize_point(point: &ProjectivePoint) -> Vec<u8> {
    point.to_affine().to_encoded_point(false).as_bytes().to_vec()
}

/// Unmarshals an uncompressed SEC1 point, rejecting any encoding that is not
/// exactly 65 bytes with a `0x04` tag, has a coordinate outside the base
/// field, or does not satisfy the curve equation. The point at infinity has
/// no uncompressed encoding and is therefore rejected by construction.
pub(crate) fn deserialize_point(input: &[u8]) -> Result<ProjectivePoint, InternalError> {
    let checked_slice = check_slice_size(input, ELEMENT_LEN, "point_bytes")?;
    if checked_slice[0] != UNCOMPRESSED_TAG {
        return Err(InternalError::PointError);
    }
    let encoded =
        EncodedPoint::from_bytes(checked_slice).map_err(|_| InternalError::PointError)?;
    let affine = AffinePoint::from_encoded_point(&encoded).ok_or(InternalError::PointError)?;
    Ok(affine.to_curve())
}

/// Canonical big-endian encoding of a scalar.
pub(crate) fn serialize_scalar(scalar: &Scalar) -> GenericArray<u8, U32> {
    (*scalar).into()
}

/// Decodes a canonical 32-byte big-endian scalar, rejecting values that are
/// not below the group order.
pub(crate) fn deserialize_scalar(input: &[u8]) -> Result<Scalar, InternalError> {
    let checked_slice = check_slice_size(input, SCALAR_LEN, "scalar_bytes")?;
    let mut bytes = [0u8; SCALAR_LEN];
    bytes.copy_from_slice(checked_slice);
    if !bool::from(in_scalar_field(&bytes)) {
        return Err(InternalError::ScalarError);
    }
    Ok(Scalar::from_bytes_reduced(GenericArray::from_slice(
        &bytes,
    )))
}

/// Constant-time check that big-endian `bytes` is strictly below the group
/// order.
pub(crate) fn in_scalar_field(bytes: &[u8; SCALAR_LEN]) -> Choice {
    let mut borrow: i32 = 0;
    for i in (0..SCALAR_LEN).rev() {
        let difference = bytes[i] as i32 - GROUP_ORDER[i] as i32 - borrow;
        borrow = (difference >> 8) & 1;
    }
    Choice::from(borrow as u8)
}

/// Samples a uniform scalar in `[1, n)` by rejection. Every iteration
/// performs the same work before the accept/reject decision, so timing
/// reveals only the (public) number of iterations.
pub(crate) fn random_scalar<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<Scalar, InternalError> {
    loop {
        let mut candidate = [0u8; SCALAR_LEN];
        rng.try_fill_bytes(&mut candidate)
            .map_err(|_| InternalError::EntropyError)?;
        let scalar = Scalar::from_bytes_reduced(GenericArray::from_slice(&candidate));
        let nonzero = Choice::from((candidate.iter().fold(0u8, |acc, b| acc | b) != 0) as u8);
        let accept = in_scalar_field(&candidate) & nonzero;
        candidate.zeroize();
        if bool::from(accept) {
            return Ok(scalar);
        }
    }
}

/// Hashes a tag and a sequence of fields onto a scalar in `[0, n)`.
///
/// The concatenated input serves as both the HKDF salt and keying material;
/// out-of-range candidates are replaced by the next 32 bytes of the same
/// HKDF output stream until one falls below the group order.
pub(crate) fn hash_to_scalar(tag: u8, fields: &[&[u8]]) -> Result<Scalar, InternalError> {
    let mut transcript: Vec<u8> = vec![tag];
    for field in fields {
        transcript.extend_from_slice(field);
    }

    let kdf = Hkdf::<Sha256>::new(Some(&transcript), &transcript);
    let mut candidate = [0u8; SCALAR_LEN];
    for reads in 1..=MAX_HASH_TO_SCALAR_READS {
        let mut stream = vec![0u8; SCALAR_LEN * reads];
        kdf.expand(STR_HASH_Z, &mut stream)
            .map_err(|_| InternalError::HkdfError)?;
        candidate.copy_from_slice(&stream[SCALAR_LEN * (reads - 1)..]);
        if bool::from(in_scalar_field(&candidate)) {
            return Ok(Scalar::from_bytes_reduced(GenericArray::from_slice(
                &candidate,
            )));
        }
    }
    Err(InternalError::HkdfError)
}
