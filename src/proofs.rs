// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Non-interactive zero-knowledge proofs binding the server's responses to
//! its published public key
//!
//! Both proofs are Fiat-Shamir transforms: the challenge is a hash over the
//! server public key, the base point, the evaluated points and the prover's
//! commitments, each under its own domain tag.

use crate::constants::{DHS0, DHS1, PROOF_ERROR, PROOF_OK};
use crate::errors::{InternalError, ProtocolError};
use crate::group::{hash_to_scalar, random_scalar, serialize_point};
use crate::keypair::KeyPair;
use crate::map_to_curve::hash_to_point;
use crate::messages::{ProofOfFail, ProofOfSuccess};
use p256::elliptic_curve::subtle::ConstantTimeEq;
use p256::{ProjectivePoint, Scalar};
use rand::{CryptoRng, RngCore};

/// Challenge for a proof of success, bound to the full transcript.
fn success_challenge(
    server_public_key: &ProjectivePoint,
    c0: &ProjectivePoint,
    c1: &ProjectivePoint,
    term1: &ProjectivePoint,
    term2: &ProjectivePoint,
    term3: &ProjectivePoint,
) -> Result<Scalar, InternalError> {
    hash_to_scalar(
        PROOF_OK,
        &[
            &serialize_point(server_public_key),
            &serialize_point(&ProjectivePoint::generator()),
            &serialize_point(c0),
            &serialize_point(c1),
            &serialize_point(term1),
            &serialize_point(term2),
            &serialize_point(term3),
        ],
    )
}

/// Challenge for a proof of failure.
#[allow(clippy::too_many_arguments)]
fn failure_challenge(
    server_public_key: &ProjectivePoint,
    c0: &ProjectivePoint,
    c1: &ProjectivePoint,
    term1: &ProjectivePoint,
    term2: &ProjectivePoint,
    term3: &ProjectivePoint,
    term4: &ProjectivePoint,
) -> Result<Scalar, InternalError> {
    hash_to_scalar(
        PROOF_ERROR,
        &[
            &serialize_point(server_public_key),
            &serialize_point(&ProjectivePoint::generator()),
            &serialize_point(c0),
            &serialize_point(c1),
            &serialize_point(term1),
            &serialize_point(term2),
            &serialize_point(term3),
            &serialize_point(term4),
        ],
    )
}

/// Proves that `c0` and `c1` were obtained by evaluating the server private
/// key over the hashed points `hs0` and `hs1`.
pub(crate) fn prove_success<R: RngCore + CryptoRng>(
    rng: &mut R,
    keypair: &KeyPair,
    hs0: &ProjectivePoint,
    hs1: &ProjectivePoint,
    c0: &ProjectivePoint,
    c1: &ProjectivePoint,
) -> Result<ProofOfSuccess, InternalError> {
    let blind_x = random_scalar(rng)?;
    let term1 = hs0 * &blind_x;
    let term2 = hs1 * &blind_x;
    let term3 = ProjectivePoint::generator() * &blind_x;

    let challenge = success_challenge(keypair.public(), c0, c1, &term1, &term2, &term3)?;

    Ok(ProofOfSuccess {
        term1,
        term2,
        term3,
        blind_x: blind_x + challenge * keypair.private(),
    })
}

/// Verifies a proof of success against the hashed points recomputed from the
/// server nonce `ns`.
pub(crate) fn verify_success(
    proof: &ProofOfSuccess,
    server_public_key: &ProjectivePoint,
    ns: &[u8],
    c0: &ProjectivePoint,
    c1: &ProjectivePoint,
) -> Result<(), ProtocolError> {
    let hs0 = hash_to_point(DHS0, &[ns])?;
    let hs1 = hash_to_point(DHS1, &[ns])?;

    let challenge =
        success_challenge(server_public_key, c0, c1, &proof.term1, &proof.term2, &proof.term3)?;

    let checks = [
        (proof.term1 + c0 * &challenge, hs0 * &proof.blind_x),
        (proof.term2 + c1 * &challenge, hs1 * &proof.blind_x),
        (
            proof.term3 + server_public_key * &challenge,
            ProjectivePoint::generator() * &proof.blind_x,
        ),
    ];
    for (lhs, rhs) in &checks {
        if lhs != rhs {
            return Err(ProtocolError::InvalidProof);
        }
    }
    Ok(())
}

/// Constructs the decoy point `c1` for a rejected attempt and proves
/// knowledge of coefficients `(a, b)` with `c1 = a*c0 + b*hs0` and
/// `a*Y + b*G` equal to the identity.
///
/// The coefficients are `a = r`, `b = -r*y` for a fresh blind `r`, re-drawn
/// in the negligible case where the decoy collides with the point a correct
/// password would produce.
pub(crate) fn prove_failure<R: RngCore + CryptoRng>(
    rng: &mut R,
    keypair: &KeyPair,
    c0: &ProjectivePoint,
    hs0: &ProjectivePoint,
    hs1: &ProjectivePoint,
) -> Result<(ProjectivePoint, ProofOfFail), InternalError> {
    let honest_c1 = hs1 * keypair.private();
    let (a, b, c1) = loop {
        let r = random_scalar(rng)?;
        let a = r;
        let b = -(r * keypair.private());
        let c1 = c0 * &a + hs0 * &b;
        if !bool::from(c1.ct_eq(&honest_c1)) {
            break (a, b, c1);
        }
    };

    let blind_a = random_scalar(rng)?;
    let blind_b = random_scalar(rng)?;
    let term1 = c0 * &blind_a;
    let term2 = hs0 * &blind_b;
    let term3 = keypair.public() * &blind_a;
    let term4 = ProjectivePoint::generator() * &blind_b;

    let challenge =
        failure_challenge(keypair.public(), c0, &c1, &term1, &term2, &term3, &term4)?;

    Ok((
        c1,
        ProofOfFail {
            term1,
            term2,
            term3,
            term4,
            blind_a: blind_a + challenge * a,
            blind_b: blind_b + challenge * b,
        },
    ))
}

/// Verifies a proof of failure. The second equation omits the
/// `challenge * identity` term since it contributes nothing to the sum.
pub(crate) fn verify_failure(
    proof: &ProofOfFail,
    server_public_key: &ProjectivePoint,
    hs0: &ProjectivePoint,
    c0: &ProjectivePoint,
    c1: &ProjectivePoint,
) -> Result<(), ProtocolError> {
    let challenge = failure_challenge(
        server_public_key,
        c0,
        c1,
        &proof.term1,
        &proof.term2,
        &proof.term3,
        &proof.term4,
    )?;

    let lhs = proof.term1 + proof.term2 + c1 * &challenge;
    let rhs = c0 * &proof.blind_a + hs0 * &proof.blind_b;
    if lhs != rhs {
        return Err(ProtocolError::InvalidProof);
    }

    let lhs = proof.term3 + proof.term4;
    let rhs = server_public_key * &proof.blind_a
        + ProjectivePoint::generator() * &proof.blind_b;
    if lhs != rhs {
        return Err(ProtocolError::InvalidProof);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn success_proof_verifies_only_on_matching_transcript() {
        let mut rng = OsRng;
        let keypair = KeyPair::generate_random(&mut rng).unwrap();
        let ns = [5u8; 32];

        let hs0 = hash_to_point(DHS0, &[&ns]).unwrap();
        let hs1 = hash_to_point(DHS1, &[&ns]).unwrap();
        let c0 = &hs0 * keypair.private();
        let c1 = &hs1 * keypair.private();

        let proof = prove_success(&mut rng, &keypair, &hs0, &hs1, &c0, &c1).unwrap();
        assert!(verify_success(&proof, keypair.public(), &ns, &c0, &c1).is_ok());

        // different nonce, different server key, swapped points: all fail
        assert!(verify_success(&proof, keypair.public(), &[6u8; 32], &c0, &c1).is_err());
        let other = KeyPair::generate_random(&mut rng).unwrap();
        assert!(verify_success(&proof, other.public(), &ns, &c0, &c1).is_err());
        assert!(verify_success(&proof, keypair.public(), &ns, &c1, &c0).is_err());
    }

    #[test]
    fn failure_proof_verifies_and_avoids_honest_point() {
        let mut rng = OsRng;
        let keypair = KeyPair::generate_random(&mut rng).unwrap();
        let ns = [9u8; 32];

        let hs0 = hash_to_point(DHS0, &[&ns]).unwrap();
        let hs1 = hash_to_point(DHS1, &[&ns]).unwrap();
        // a candidate point that does not match the server key
        let wrong = random_scalar(&mut rng).unwrap();
        let c0 = &hs0 * &wrong;

        let (c1, proof) = prove_failure(&mut rng, &keypair, &c0, &hs0, &hs1).unwrap();
        assert_ne!(c1, &hs1 * keypair.private());
        assert!(verify_failure(&proof, keypair.public(), &hs0, &c0, &c1).is_ok());

        let other = KeyPair::generate_random(&mut rng).unwrap();
        assert!(verify_failure(&proof, other.public(), &hs0, &c0, &c1).is_err());
    }
}
