// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Contains the messages exchanged between an enrollment server and its
//! clients, along with their byte codecs
//!
//! Every point field decodes through the strict SEC1 rules of the group
//! module, and every scalar field must be a canonical encoding below the
//! group order. Codecs use two-byte big-endian length prefixes per field.

use crate::constants::NONCE_LEN;
use crate::errors::{utils::check_slice_size, InternalError, ProtocolError};
use crate::group::{deserialize_point, deserialize_scalar, serialize_point, serialize_scalar};
use crate::serialization::{serialize, tokenize};
use p256::{ProjectivePoint, Scalar};

// Messages
// =========

/// The proof accompanying a response in which the server evaluated its
/// private key over the enrollment points: a three-equation Chaum-Pedersen
/// argument that the same discrete logarithm links the server public key and
/// both evaluated points.
#[derive(Clone)]
pub struct ProofOfSuccess {
    /// Commitment to the blind over the first hashed point
    pub(crate) term1: ProjectivePoint,
    /// Commitment to the blind over the second hashed point
    pub(crate) term2: ProjectivePoint,
    /// Commitment to the blind over the base point
    pub(crate) term3: ProjectivePoint,
    /// The response `blind + challenge * private_key` to the transcript
    /// challenge
    pub(crate) blind_x: Scalar,
}

/// The proof accompanying a rejected verification attempt: an argument of
/// knowledge of coefficients `(a, b)` with `C1 = a*C0 + b*HS0` whose
/// combination `a*Y + b*G` is the identity, which the server can only
/// construct for a mismatched `C0` without learning the password.
#[derive(Clone)]
pub struct ProofOfFail {
    /// Commitment to the first blind over the client's point
    pub(crate) term1: ProjectivePoint,
    /// Commitment to the second blind over the first hashed point
    pub(crate) term2: ProjectivePoint,
    /// Commitment to the first blind over the server public key
    pub(crate) term3: ProjectivePoint,
    /// Commitment to the second blind over the base point
    pub(crate) term4: ProjectivePoint,
    /// Response for the coefficient `a`
    pub(crate) blind_a: Scalar,
    /// Response for the coefficient `b`
    pub(crate) blind_b: Scalar,
}

/// The message issued by the server when a client enrolls a new account:
/// a fresh server nonce, the two evaluated enrollment points and the proof
/// that they were computed under the server's published public key.
#[derive(Clone)]
pub struct EnrollmentResponse {
    pub(crate) ns: Vec<u8>,
    pub(crate) c0: ProjectivePoint,
    pub(crate) c1: ProjectivePoint,
    pub(crate) proof: ProofOfSuccess,
}

/// The per-account state the client stores in its database. Holds both
/// enrollment nonces and the two blinded points; none of the fields reveal
/// the password or the derived key.
#[derive(Clone)]
pub struct EnrollmentRecord {
    pub(crate) ns: Vec<u8>,
    pub(crate) nc: Vec<u8>,
    pub(crate) t0: ProjectivePoint,
    pub(crate) t1: ProjectivePoint,
}

/// The message a client sends to check a password attempt: the server nonce
/// of the record and the candidate point recovered from it.
#[derive(Clone)]
pub struct VerifyPasswordRequest {
    pub(crate) ns: Vec<u8>,
    pub(crate) c0: ProjectivePoint,
}

/// The server's answer to a verification request. The proof variant encodes
/// whether the password matched, so a response can never carry a result bit
/// that disagrees with its proof.
#[derive(Clone)]
pub struct VerifyPasswordResponse {
    pub(crate) c1: ProjectivePoint,
    pub(crate) proof: VerifyPasswordProof,
}

/// The two proof shapes a verification response can carry
#[derive(Clone)]
pub enum VerifyPasswordProof {
    /// The password matched; the response proves correct evaluation
    Success(ProofOfSuccess),
    /// The password did not match; the response proves the mismatch
    Fail(ProofOfFail),
}

/// A pair of scalars `(a, b)` produced by server key rotation. Applying it
/// to the client keys and to every stored record moves them to the new
/// server key epoch without re-enrolling any account.
#[derive(Clone)]
pub struct UpdateToken {
    pub(crate) a: Scalar,
    pub(crate) b: Scalar,
}

impl VerifyPasswordResponse {
    /// Whether the server reported the password as matching. The claim is
    /// only meaningful once the attached proof has been verified.
    pub fn verified(&self) -> bool {
        matches!(self.proof, VerifyPasswordProof::Success(_))
    }
}

// Codecs
// =======

impl ProofOfSuccess {
    /// Serialization into bytes
    pub fn serialize(&self) -> Vec<u8> {
        [
            serialize(&serialize_point(&self.term1), 2),
            serialize(&serialize_point(&self.term2), 2),
            serialize(&serialize_point(&self.term3), 2),
            serialize(&serialize_scalar(&self.blind_x), 2),
        ]
        .concat()
    }

    /// Deserialization from bytes
    pub fn deserialize(input: &[u8]) -> Result<Self, ProtocolError> {
        let (proof, remainder) =
            Self::deserialize_part(input).map_err(|_| ProtocolError::InvalidProof)?;
        if !remainder.is_empty() {
            return Err(ProtocolError::InvalidProof);
        }
        Ok(proof)
    }

    fn deserialize_part(input: &[u8]) -> Result<(Self, Vec<u8>), InternalError> {
        let (term1_bytes, remainder) = tokenize(input, 2)?;
        let (term2_bytes, remainder) = tokenize(&remainder, 2)?;
        let (term3_bytes, remainder) = tokenize(&remainder, 2)?;
        let (blind_x_bytes, remainder) = tokenize(&remainder, 2)?;
        Ok((
            Self {
                term1: deserialize_point(&term1_bytes)?,
                term2: deserialize_point(&term2_bytes)?,
                term3: deserialize_point(&term3_bytes)?,
                blind_x: deserialize_scalar(&blind_x_bytes)?,
            },
            remainder,
        ))
    }
}

impl ProofOfFail {
    /// Serialization into bytes
    pub fn serialize(&self) -> Vec<u8> {
        [
            serialize(&serialize_point(&self.term1), 2),
            serialize(&serialize_point(&self.term2), 2),
            serialize(&serialize_point(&self.term3), 2),
            serialize(&serialize_point(&self.term4), 2),
            serialize(&serialize_scalar(&self.blind_a), 2),
            serialize(&serialize_scalar(&self.blind_b), 2),
        ]
        .concat()
    }

    /// Deserialization from bytes
    pub fn deserialize(input: &[u8]) -> Result<Self, ProtocolError> {
        let (proof, remainder) =
            Self::deserialize_part(input).map_err(|_| ProtocolError::InvalidProof)?;
        if !remainder.is_empty() {
            return Err(ProtocolError::InvalidProof);
        }
        Ok(proof)
    }

    fn deserialize_part(input: &[u8]) -> Result<(Self, Vec<u8>), InternalError> {
        let (term1_bytes, remainder) = tokenize(input, 2)?;
        let (term2_bytes, remainder) = tokenize(&remainder, 2)?;
        let (term3_bytes, remainder) = tokenize(&remainder, 2)?;
        let (term4_bytes, remainder) = tokenize(&remainder, 2)?;
        let (blind_a_bytes, remainder) = tokenize(&remainder, 2)?;
        let (blind_b_bytes, remainder) = tokenize(&remainder, 2)?;
        Ok((
            Self {
                term1: deserialize_point(&term1_bytes)?,
                term2: deserialize_point(&term2_bytes)?,
                term3: deserialize_point(&term3_bytes)?,
                term4: deserialize_point(&term4_bytes)?,
                blind_a: deserialize_scalar(&blind_a_bytes)?,
                blind_b: deserialize_scalar(&blind_b_bytes)?,
            },
            remainder,
        ))
    }
}

impl EnrollmentResponse {
    /// The server nonce carried by this response
    pub fn ns(&self) -> &[u8] {
        &self.ns
    }

    /// Serialization into bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut output = serialize(&self.ns, 2);
        output.extend_from_slice(&serialize(&serialize_point(&self.c0), 2));
        output.extend_from_slice(&serialize(&serialize_point(&self.c1), 2));
        output.extend_from_slice(&self.proof.serialize());
        output
    }

    /// Deserialization from bytes
    pub fn deserialize(input: &[u8]) -> Result<Self, ProtocolError> {
        let (ns, remainder) = tokenize(input, 2)?;
        check_slice_size(&ns, NONCE_LEN, "ns")?;
        let (c0_bytes, remainder) = tokenize(&remainder, 2)?;
        let (c1_bytes, remainder) = tokenize(&remainder, 2)?;

        let (proof, remainder) = ProofOfSuccess::deserialize_part(&remainder)
            .map_err(|_| ProtocolError::InvalidProof)?;
        if !remainder.is_empty() {
            return Err(InternalError::InvalidByteSequence.into());
        }

        Ok(Self {
            ns,
            c0: deserialize_point(&c0_bytes)?,
            c1: deserialize_point(&c1_bytes)?,
            proof,
        })
    }
}

impl EnrollmentRecord {
    /// Serialization into bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut output = serialize(&self.ns, 2);
        output.extend_from_slice(&serialize(&self.nc, 2));
        output.extend_from_slice(&serialize(&serialize_point(&self.t0), 2));
        output.extend_from_slice(&serialize(&serialize_point(&self.t1), 2));
        output
    }

    /// Deserialization from bytes
    pub fn deserialize(input: &[u8]) -> Result<Self, ProtocolError> {
        Self::deserialize_inner(input).map_err(|_| ProtocolError::InvalidRecord)
    }

    fn deserialize_inner(input: &[u8]) -> Result<Self, InternalError> {
        let (ns, remainder) = tokenize(input, 2)?;
        check_slice_size(&ns, NONCE_LEN, "ns")?;
        let (nc, remainder) = tokenize(&remainder, 2)?;
        check_slice_size(&nc, NONCE_LEN, "nc")?;
        let (t0_bytes, remainder) = tokenize(&remainder, 2)?;
        let (t1_bytes, remainder) = tokenize(&remainder, 2)?;
        if !remainder.is_empty() {
            return Err(InternalError::InvalidByteSequence);
        }

        Ok(Self {
            ns,
            nc,
            t0: deserialize_point(&t0_bytes)?,
            t1: deserialize_point(&t1_bytes)?,
        })
    }
}

impl VerifyPasswordRequest {
    /// Serialization into bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut output = serialize(&self.ns, 2);
        output.extend_from_slice(&serialize(&serialize_point(&self.c0), 2));
        output
    }

    /// Deserialization from bytes
    pub fn deserialize(input: &[u8]) -> Result<Self, ProtocolError> {
        Self::deserialize_inner(input).map_err(|_| ProtocolError::InvalidRequest)
    }

    fn deserialize_inner(input: &[u8]) -> Result<Self, InternalError> {
        let (ns, remainder) = tokenize(input, 2)?;
        if ns.is_empty() || ns.len() > NONCE_LEN {
            return Err(InternalError::SizeError {
                name: "ns",
                len: NONCE_LEN,
                actual_len: ns.len(),
            });
        }
        let (c0_bytes, remainder) = tokenize(&remainder, 2)?;
        if !remainder.is_empty() {
            return Err(InternalError::InvalidByteSequence);
        }

        Ok(Self {
            ns,
            c0: deserialize_point(&c0_bytes)?,
        })
    }
}

impl VerifyPasswordResponse {
    /// Serialization into bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut output = vec![self.verified() as u8];
        output.extend_from_slice(&serialize(&serialize_point(&self.c1), 2));
        match &self.proof {
            VerifyPasswordProof::Success(proof) => output.extend_from_slice(&proof.serialize()),
            VerifyPasswordProof::Fail(proof) => output.extend_from_slice(&proof.serialize()),
        }
        output
    }

    /// Deserialization from bytes
    pub fn deserialize(input: &[u8]) -> Result<Self, ProtocolError> {
        let res = match input.first() {
            Some(&0u8) => false,
            Some(&1u8) => true,
            _ => return Err(InternalError::InvalidByteSequence.into()),
        };
        let (c1_bytes, remainder) = tokenize(&input[1..], 2)?;
        let c1 = deserialize_point(&c1_bytes)?;

        let (proof, remainder) = (if res {
            ProofOfSuccess::deserialize_part(&remainder)
                .map(|(proof, rest)| (VerifyPasswordProof::Success(proof), rest))
        } else {
            ProofOfFail::deserialize_part(&remainder)
                .map(|(proof, rest)| (VerifyPasswordProof::Fail(proof), rest))
        })
        .map_err(|_| ProtocolError::InvalidProof)?;
        if !remainder.is_empty() {
            return Err(InternalError::InvalidByteSequence.into());
        }

        Ok(Self { c1, proof })
    }
}

impl UpdateToken {
    /// Serialization into bytes
    pub fn serialize(&self) -> Vec<u8> {
        [
            serialize(&serialize_scalar(&self.a), 2),
            serialize(&serialize_scalar(&self.b), 2),
        ]
        .concat()
    }

    /// Deserialization from bytes
    pub fn deserialize(input: &[u8]) -> Result<Self, ProtocolError> {
        let (a_bytes, remainder) = tokenize(input, 2)?;
        let (b_bytes, remainder) = tokenize(&remainder, 2)?;
        if !remainder.is_empty() {
            return Err(InternalError::InvalidByteSequence.into());
        }

        Ok(Self {
            a: deserialize_scalar(&a_bytes)?,
            b: deserialize_scalar(&b_bytes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::random_scalar;
    use proptest::{collection::vec, prelude::*};
    use rand::rngs::OsRng;

    fn random_point() -> ProjectivePoint {
        let mut rng = OsRng;
        ProjectivePoint::generator() * &random_scalar(&mut rng).unwrap()
    }

    fn sample_success_proof() -> ProofOfSuccess {
        let mut rng = OsRng;
        ProofOfSuccess {
            term1: random_point(),
            term2: random_point(),
            term3: random_point(),
            blind_x: random_scalar(&mut rng).unwrap(),
        }
    }

    fn sample_fail_proof() -> ProofOfFail {
        let mut rng = OsRng;
        ProofOfFail {
            term1: random_point(),
            term2: random_point(),
            term3: random_point(),
            term4: random_point(),
            blind_a: random_scalar(&mut rng).unwrap(),
            blind_b: random_scalar(&mut rng).unwrap(),
        }
    }

    #[test]
    fn enrollment_response_round_trip() {
        let response = EnrollmentResponse {
            ns: vec![7u8; NONCE_LEN],
            c0: random_point(),
            c1: random_point(),
            proof: sample_success_proof(),
        };
        let bytes = response.serialize();
        let recovered = EnrollmentResponse::deserialize(&bytes).unwrap();
        assert_eq!(recovered.serialize(), bytes);
    }

    #[test]
    fn enrollment_record_round_trip() {
        let record = EnrollmentRecord {
            ns: vec![1u8; NONCE_LEN],
            nc: vec![2u8; NONCE_LEN],
            t0: random_point(),
            t1: random_point(),
        };
        let bytes = record.serialize();
        let recovered = EnrollmentRecord::deserialize(&bytes).unwrap();
        assert_eq!(recovered.serialize(), bytes);
    }

    #[test]
    fn verify_password_messages_round_trip() {
        let request = VerifyPasswordRequest {
            ns: vec![3u8; NONCE_LEN],
            c0: random_point(),
        };
        let bytes = request.serialize();
        let recovered = VerifyPasswordRequest::deserialize(&bytes).unwrap();
        assert_eq!(recovered.serialize(), bytes);

        let ok_response = VerifyPasswordResponse {
            c1: random_point(),
            proof: VerifyPasswordProof::Success(sample_success_proof()),
        };
        let bytes = ok_response.serialize();
        assert_eq!(bytes[0], 1u8);
        let recovered = VerifyPasswordResponse::deserialize(&bytes).unwrap();
        assert!(recovered.verified());
        assert_eq!(recovered.serialize(), bytes);

        let fail_response = VerifyPasswordResponse {
            c1: random_point(),
            proof: VerifyPasswordProof::Fail(sample_fail_proof()),
        };
        let bytes = fail_response.serialize();
        assert_eq!(bytes[0], 0u8);
        let recovered = VerifyPasswordResponse::deserialize(&bytes).unwrap();
        assert!(!recovered.verified());
        assert_eq!(recovered.serialize(), bytes);
    }

    #[test]
    fn update_token_round_trip() {
        let mut rng = OsRng;
        let token = UpdateToken {
            a: random_scalar(&mut rng).unwrap(),
            b: random_scalar(&mut rng).unwrap(),
        };
        let bytes = token.serialize();
        let recovered = UpdateToken::deserialize(&bytes).unwrap();
        assert_eq!(recovered.serialize(), bytes);
    }

    #[test]
    fn request_rejects_bad_nonce_lengths() {
        let mut request = VerifyPasswordRequest {
            ns: Vec::new(),
            c0: random_point(),
        };
        assert!(VerifyPasswordRequest::deserialize(&request.serialize()).is_err());

        request.ns = vec![0u8; NONCE_LEN + 1];
        assert!(VerifyPasswordRequest::deserialize(&request.serialize()).is_err());
    }

    proptest! {
        #[test]
        fn test_nocrash_enrollment_response(bytes in vec(any::<u8>(), 0..700)) {
            EnrollmentResponse::deserialize(&bytes).map_or(true, |_| true);
        }

        #[test]
        fn test_nocrash_enrollment_record(bytes in vec(any::<u8>(), 0..700)) {
            EnrollmentRecord::deserialize(&bytes).map_or(true, |_| true);
        }

        #[test]
        fn test_nocrash_verify_password_request(bytes in vec(any::<u8>(), 0..700)) {
            VerifyPasswordRequest::deserialize(&bytes).map_or(true, |_| true);
        }

        #[test]
        fn test_nocrash_verify_password_response(bytes in vec(any::<u8>(), 0..700)) {
            VerifyPasswordResponse::deserialize(&bytes).map_or(true, |_| true);
        }

        #[test]
        fn test_nocrash_update_token(bytes in vec(any::<u8>(), 0..200)) {
            UpdateToken::deserialize(&bytes).map_or(true, |_| true);
        }
    }
}
