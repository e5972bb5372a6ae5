// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The client side of the protocol: enrollment, verification requests,
//! response checking with key recovery, and rotation
//!
//! The client is responsible for protecting and checking passwords on the
//! website side. It holds its own private scalar and a copy of the server
//! public key, and refuses to release a derived key unless the server's
//! proof verifies against that key.

use crate::constants::{DHC0, DHC1, DHS0, DHS1, DM, NONCE_LEN, STR_SECRET};
use crate::errors::{InternalError, ProtocolError};
use crate::group::{
    deserialize_point, in_scalar_field, random_scalar, serialize_point, serialize_scalar,
    SCALAR_LEN,
};
use crate::map_to_curve::hash_to_point;
use crate::messages::{
    EnrollmentRecord, EnrollmentResponse, UpdateToken, VerifyPasswordProof,
    VerifyPasswordRequest, VerifyPasswordResponse,
};
use crate::proofs::{verify_failure, verify_success};
use generic_array::{typenum::U32, GenericArray};
use hkdf::Hkdf;
use p256::elliptic_curve::subtle::ConstantTimeEq;
use p256::elliptic_curve::Field;
use p256::{ProjectivePoint, Scalar};
use rand::{CryptoRng, RngCore};
use sha2::Sha512Trunc256;
use zeroize::Zeroize;

/// A 32-byte key derived for one enrollment record.
pub type RecordKey = GenericArray<u8, U32>;

/// The client half of the protocol, bound to one client key and one server
/// key epoch. Rotation produces a new value rather than mutating in place.
pub struct Client {
    private_key: Scalar,
    server_public_key: ProjectivePoint,
}

impl Client {
    /// Creates a client from its private key bytes and the server's
    /// marshaled public key.
    ///
    /// The private key may be 1 to 32 big-endian bytes (shorter encodings
    /// are left-padded) and must be a nonzero value below the group order.
    pub fn new(private_key: &[u8], server_public_key: &[u8]) -> Result<Self, ProtocolError> {
        if private_key.is_empty() || private_key.len() > SCALAR_LEN {
            return Err(ProtocolError::InvalidPrivateKey);
        }
        let mut padded = [0u8; SCALAR_LEN];
        padded[SCALAR_LEN - private_key.len()..].copy_from_slice(private_key);
        if !bool::from(in_scalar_field(&padded)) {
            return Err(ProtocolError::InvalidPrivateKey);
        }
        let scalar = Scalar::from_bytes_reduced(GenericArray::from_slice(&padded));
        padded.zeroize();
        if bool::from(scalar.ct_eq(&Scalar::zero())) {
            return Err(ProtocolError::InvalidPrivateKey);
        }

        let server_public_key =
            deserialize_point(server_public_key).map_err(|_| ProtocolError::InvalidPublicKey)?;

        Ok(Self {
            private_key: scalar,
            server_public_key,
        })
    }

    /// Generates a fresh client private key in canonical 32-byte form.
    pub fn generate_client_key<R: RngCore + CryptoRng>(
        rng: &mut R,
    ) -> Result<GenericArray<u8, U32>, ProtocolError> {
        Ok(serialize_scalar(&random_scalar(rng)?))
    }

    /// Turns a fresh enrollment response and the user's password into a new
    /// enrollment record for the database, together with a random key that
    /// can be used to protect the user's data.
    ///
    /// Fails with `InvalidProof` unless the response proves that the server
    /// evaluated its published key.
    pub fn enroll_account<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        password: &[u8],
        response: &EnrollmentResponse,
    ) -> Result<(EnrollmentRecord, RecordKey), ProtocolError> {
        verify_success(
            &response.proof,
            &self.server_public_key,
            &response.ns,
            &response.c0,
            &response.c1,
        )?;

        let mut nc = [0u8; NONCE_LEN];
        rng.try_fill_bytes(&mut nc)
            .map_err(|_| InternalError::EntropyError)?;
        let hc0 = hash_to_point(DHC0, &[&nc, password])?;
        let hc1 = hash_to_point(DHC1, &[&nc, password])?;

        // the encryption key in the form of a random curve point
        let mut m_buf = [0u8; 32];
        rng.try_fill_bytes(&mut m_buf)
            .map_err(|_| InternalError::EntropyError)?;
        let m = hash_to_point(DM, &[&m_buf])?;
        m_buf.zeroize();

        let key = derive_record_key(&m)?;

        let t0 = response.c0 + hc0 * &self.private_key;
        let t1 = response.c1 + hc1 * &self.private_key + m * &self.private_key;

        Ok((
            EnrollmentRecord {
                ns: response.ns.clone(),
                nc: nc.to_vec(),
                t0,
                t1,
            },
            key,
        ))
    }

    /// Builds the verification request for a password attempt against a
    /// stored record: the candidate point the server compares to its own
    /// evaluation.
    pub fn create_verify_password_request(
        &self,
        password: &[u8],
        record: &EnrollmentRecord,
    ) -> Result<VerifyPasswordRequest, ProtocolError> {
        if record.ns.is_empty() || record.nc.is_empty() {
            return Err(ProtocolError::InvalidRecord);
        }

        let hc0 = hash_to_point(DHC0, &[&record.nc, password])?;
        let c0 = record.t0 - hc0 * &self.private_key;

        Ok(VerifyPasswordRequest {
            ns: record.ns.clone(),
            c0,
        })
    }

    /// Checks the server's answer to a verification request and recovers
    /// the record key on success.
    ///
    /// Returns `InvalidPassword` when the server's proof of failure
    /// verifies, and `InvalidProof` when either proof shape fails to
    /// verify; no key is ever returned on an error path.
    pub fn check_response_and_decrypt(
        &self,
        password: &[u8],
        record: &EnrollmentRecord,
        response: &VerifyPasswordResponse,
    ) -> Result<RecordKey, ProtocolError> {
        if record.ns.is_empty() || record.nc.is_empty() {
            return Err(ProtocolError::InvalidRecord);
        }

        let hc0 = hash_to_point(DHC0, &[&record.nc, password])?;
        let hc1 = hash_to_point(DHC1, &[&record.nc, password])?;
        let c0 = record.t0 - hc0 * &self.private_key;

        match &response.proof {
            VerifyPasswordProof::Success(proof) => {
                verify_success(
                    proof,
                    &self.server_public_key,
                    &record.ns,
                    &c0,
                    &response.c1,
                )?;

                let inverse = Option::<Scalar>::from(self.private_key.invert())
                    .ok_or(ProtocolError::InvalidPrivateKey)?;
                let m = (record.t1 - response.c1 - hc1 * &self.private_key) * &inverse;
                Ok(derive_record_key(&m)?)
            }
            VerifyPasswordProof::Fail(proof) => {
                let hs0 = hash_to_point(DHS0, &[&record.ns])?;
                verify_failure(proof, &self.server_public_key, &hs0, &c0, &response.c1)?;
                Err(ProtocolError::InvalidPassword)
            }
        }
    }

    /// Applies an update token, producing the client for the next server
    /// key epoch: `x' = x*a` and `Y' = a*Y + b*G`.
    pub fn rotate(&self, token: &UpdateToken) -> Client {
        Client {
            private_key: self.private_key * token.a,
            server_public_key: self.server_public_key * &token.a
                + ProjectivePoint::generator() * &token.b,
        }
    }
}

impl Zeroize for Client {
    fn zeroize(&mut self) {
        self.private_key.zeroize();
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Applies an update token to a stored record. Deterministic in the record
/// and token alone; requires no client or server key material.
pub fn update_enrollment_record(
    record: &EnrollmentRecord,
    token: &UpdateToken,
) -> Result<EnrollmentRecord, ProtocolError> {
    if record.ns.is_empty() || record.nc.is_empty() {
        return Err(ProtocolError::InvalidRecord);
    }

    let hs0 = hash_to_point(DHS0, &[&record.ns])?;
    let hs1 = hash_to_point(DHS1, &[&record.ns])?;

    Ok(EnrollmentRecord {
        ns: record.ns.clone(),
        nc: record.nc.clone(),
        t0: record.t0 * &token.a + hs0 * &token.b,
        t1: record.t1 * &token.a + hs1 * &token.b,
    })
}

/// Applies an update token to raw key material, for callers that persist
/// keys as bytes rather than holding a [`Client`] value. Returns the new
/// client private key and the new marshaled server public key.
pub fn rotate_client_keys(
    client_private_key: &[u8],
    server_public_key: &[u8],
    token: &UpdateToken,
) -> Result<(GenericArray<u8, U32>, Vec<u8>), ProtocolError> {
    let client = Client::new(client_private_key, server_public_key)?;
    let rotated = client.rotate(token);
    Ok((
        serialize_scalar(&rotated.private_key),
        serialize_point(&rotated.server_public_key),
    ))
}

/// Derives the record encryption key from the secret point `M`.
fn derive_record_key(m: &ProjectivePoint) -> Result<RecordKey, InternalError> {
    let kdf = Hkdf::<Sha512Trunc256>::new(None, &serialize_point(m));
    let mut key = RecordKey::default();
    kdf.expand(STR_SECRET, &mut key)
        .map_err(|_| InternalError::HkdfError)?;
    Ok(key)
}
