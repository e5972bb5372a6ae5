// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The server side of the protocol: enrollment issuance, password
//! verification and key rotation
//!
//! The server holds the long-term keypair for the current epoch and answers
//! each request statelessly. It never sees a password, only curve points
//! blinded under the client key.

use crate::constants::{DHS0, DHS1, NONCE_LEN};
use crate::errors::{InternalError, ProtocolError};
use crate::group::random_scalar;
use crate::keypair::KeyPair;
use crate::map_to_curve::hash_to_point;
use crate::messages::{
    EnrollmentResponse, UpdateToken, VerifyPasswordProof, VerifyPasswordRequest,
    VerifyPasswordResponse,
};
use crate::proofs::{prove_failure, prove_success};
use p256::elliptic_curve::subtle::ConstantTimeEq;
use rand::{CryptoRng, RngCore};

/// The state a server holds for one key epoch. Rotation produces a new
/// value rather than mutating in place, so concurrent requests can keep
/// using the old epoch until every record has been updated.
pub struct Server {
    keypair: KeyPair,
}

impl Server {
    /// Wraps an existing keypair, e.g. one loaded from storage.
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Creates a server with a freshly generated keypair.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, ProtocolError> {
        Ok(Self {
            keypair: KeyPair::generate_random(rng)?,
        })
    }

    /// The keypair for the current epoch.
    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// The marshaled public key clients verify proofs against.
    pub fn public_key(&self) -> Vec<u8> {
        self.keypair.public_key_bytes()
    }

    /// Issues a fresh enrollment: a new server nonce, both hashed points
    /// evaluated under the private key, and a proof of correct evaluation.
    pub fn get_enrollment<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<EnrollmentResponse, ProtocolError> {
        let mut ns = [0u8; NONCE_LEN];
        rng.try_fill_bytes(&mut ns)
            .map_err(|_| InternalError::EntropyError)?;

        let hs0 = hash_to_point(DHS0, &[&ns])?;
        let hs1 = hash_to_point(DHS1, &[&ns])?;
        let c0 = &hs0 * self.keypair.private();
        let c1 = &hs1 * self.keypair.private();

        let proof = prove_success(rng, &self.keypair, &hs0, &hs1, &c0, &c1)?;

        Ok(EnrollmentResponse {
            ns: ns.to_vec(),
            c0,
            c1,
            proof,
        })
    }

    /// Compares a password attempt against what the server would compute
    /// with its private key, and answers with a zero-knowledge proof of
    /// either success or failure.
    pub fn verify_password<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        request: &VerifyPasswordRequest,
    ) -> Result<VerifyPasswordResponse, ProtocolError> {
        if request.ns.is_empty() || request.ns.len() > NONCE_LEN {
            return Err(ProtocolError::InvalidRequest);
        }

        let hs0 = hash_to_point(DHS0, &[&request.ns])?;
        let hs1 = hash_to_point(DHS1, &[&request.ns])?;

        if bool::from((&hs0 * self.keypair.private()).ct_eq(&request.c0)) {
            let c1 = &hs1 * self.keypair.private();
            let proof = prove_success(rng, &self.keypair, &hs0, &hs1, &request.c0, &c1)?;
            Ok(VerifyPasswordResponse {
                c1,
                proof: VerifyPasswordProof::Success(proof),
            })
        } else {
            let (c1, proof) = prove_failure(rng, &self.keypair, &request.c0, &hs0, &hs1)?;
            Ok(VerifyPasswordResponse {
                c1,
                proof: VerifyPasswordProof::Fail(proof),
            })
        }
    }

    /// Moves the server to a new key epoch `y' = y*a + b` and issues the
    /// update token clients apply to their keys and stored records.
    pub fn rotate<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(Server, UpdateToken), ProtocolError> {
        let a = random_scalar(rng)?;
        let b = random_scalar(rng)?;
        let rotated = *self.keypair.private() * a + b;

        Ok((
            Server {
                keypair: KeyPair::from_private_scalar(rotated),
            },
            UpdateToken { a, b },
        ))
    }
}
