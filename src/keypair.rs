// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Contains the server keypair type and its wire encoding

use crate::errors::{utils::check_slice_size, InternalError};
use crate::group::{
    deserialize_point, deserialize_scalar, random_scalar, serialize_point, serialize_scalar,
    ELEMENT_LEN, SCALAR_LEN,
};
use p256::{ProjectivePoint, Scalar};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Length of the wire encoding of a keypair: public point followed by the
/// private scalar.
pub const KEYPAIR_LEN: usize = ELEMENT_LEN + SCALAR_LEN;

/// A private scalar in `[1, n)` together with the matching public point on
/// P-256.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pk: ProjectivePoint,
    sk: Scalar,
}

impl KeyPair {
    /// Generating a random key pair given a cryptographic rng
    pub fn generate_random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, InternalError> {
        let sk = random_scalar(rng)?;
        Ok(Self {
            pk: ProjectivePoint::generator() * &sk,
            sk,
        })
    }

    /// The public key component
    pub(crate) fn public(&self) -> &ProjectivePoint {
        &self.pk
    }

    /// The private key component
    pub(crate) fn private(&self) -> &Scalar {
        &self.sk
    }

    /// The marshaled public key component
    pub fn public_key_bytes(&self) -> Vec<u8> {
        serialize_point(&self.pk)
    }

    pub(crate) fn from_private_scalar(sk: Scalar) -> Self {
        Self {
            pk: ProjectivePoint::generator() * &sk,
            sk,
        }
    }

    /// Obtains a KeyPair from a canonical big-endian encoding of the private
    /// key. The public component is recomputed, so the two can never be
    /// inconsistent.
    pub fn from_private_key_slice(input: &[u8]) -> Result<Self, InternalError> {
        let sk = deserialize_scalar(input)?;
        Ok(Self::from_private_scalar(sk))
    }

    /// Fixed-width encoding: marshaled public point, then the private scalar.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output = serialize_point(&self.pk);
        output.extend_from_slice(&serialize_scalar(&self.sk));
        output
    }

    /// Decodes a keypair, checking that the stored public point matches the
    /// private scalar.
    pub fn from_bytes(input: &[u8]) -> Result<Self, InternalError> {
        let checked_slice = check_slice_size(input, KEYPAIR_LEN, "keypair_bytes")?;
        let pk = deserialize_point(&checked_slice[..ELEMENT_LEN])?;
        let sk = deserialize_scalar(&checked_slice[ELEMENT_LEN..])?;
        if pk != ProjectivePoint::generator() * &sk {
            return Err(InternalError::PointError);
        }
        Ok(Self { pk, sk })
    }
}

impl Zeroize for KeyPair {
    fn zeroize(&mut self) {
        self.sk.zeroize();
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.zeroize();
    }
}
