// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! A list of error types which are produced during an execution of the protocol
use displaydoc::Display;
use thiserror::Error;

/// Represents an error in the manipulation of internal cryptographic data
#[derive(Debug, Display, Error)]
pub enum InternalError {
    /// Deserializing from a byte sequence failed
    InvalidByteSequence,
    /// Invalid length for {name}: expected {len}, but is actually {actual_len}.
    SizeError {
        /// name
        name: &'static str,
        /// length
        len: usize,
        /// actual
        actual_len: usize,
    },
    /// Could not decode a curve point.
    PointError,
    /// Scalar bytes are not a canonical encoding of a value below the group order.
    ScalarError,
    /// Hashing onto the curve failed to produce a valid point.
    HashToCurveError,
    /// Computing HKDF failed while deriving subkeys
    HkdfError,
    /// The platform entropy source failed to produce random bytes.
    EntropyError,
}

/// Represents an error in protocol execution
#[derive(Debug, Display, Error)]
#[ignore_extra_doc_attributes]
pub enum ProtocolError {
    /// This error results from an internal error during primitive manipulation
    ///
    /// Internal error during primitive manipulation: {0}
    CryptoError(InternalError),
    /// The server public key failed to decode or is not a curve point.
    InvalidPublicKey,
    /// The client private key is empty or out of range.
    InvalidPrivateKey,
    /// A verification request field is missing or malformed.
    InvalidRequest,
    /// An enrollment record field is missing or fails to decode.
    InvalidRecord,
    /// A zero-knowledge proof failed to decode or verify.
    InvalidProof,
    /// The proof of failure verified successfully; the password attempt is wrong.
    InvalidPassword,
}

// This is meant to express future(ly) non-trivial ways of converting the
// internal error into a ProtocolError
impl From<InternalError> for ProtocolError {
    fn from(e: InternalError) -> ProtocolError {
        ProtocolError::CryptoError(e)
    }
}

pub(crate) mod utils {
    use super::*;

    pub fn check_slice_size<'a>(
        slice: &'a [u8],
        expected_len: usize,
        arg_name: &'static str,
    ) -> Result<&'a [u8], InternalError> {
        if slice.len() != expected_len {
            return Err(InternalError::SizeError {
                name: arg_name,
                len: expected_len,
                actual_len: slice.len(),
            });
        }
        Ok(slice)
    }
}
