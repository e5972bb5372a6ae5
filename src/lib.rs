// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! An implementation of the PHE password-hardened encryption protocol
//!
//! # Overview
//!
//! PHE is a protocol between a client (typically a web application backend)
//! and a dedicated server holding a long-term keypair. Enrolling a user's
//! password produces a per-account encryption key and an enrollment record
//! such that neither the client database alone nor the server alone can
//! recover the password or the key. The server participates in every
//! verification but never sees a plaintext password, and every one of its
//! answers carries a zero-knowledge proof the client checks against the
//! server's published public key before trusting it.
//!
//! All arithmetic happens on the NIST P-256 curve. Passwords and nonces are
//! hashed onto the curve with a domain-separated
//! Shallue-van de Woestijne-Ulas map, and proof challenges are derived with
//! a domain-separated HKDF-based hash-to-scalar.
//!
//! ## Setup
//!
//! The server generates a long-term keypair and publishes the public
//! component; the client generates a private key of its own and caches the
//! server public key:
//! ```
//! use phe::{Client, Server};
//! use rand::rngs::OsRng;
//!
//! let mut rng = OsRng;
//! let server = Server::generate(&mut rng)?;
//!
//! let client_key = Client::generate_client_key(&mut rng)?;
//! let client = Client::new(&client_key, &server.public_key())?;
//! # Ok::<(), phe::errors::ProtocolError>(())
//! ```
//!
//! ## Enrollment
//!
//! The server issues a fresh [`EnrollmentResponse`]; the client folds the
//! user's password into it, obtaining an [`EnrollmentRecord`] for its
//! database and a 32-byte key for protecting that user's data:
//! ```
//! # use phe::{Client, Server};
//! # use rand::rngs::OsRng;
//! # let mut rng = OsRng;
//! # let server = Server::generate(&mut rng)?;
//! # let client_key = Client::generate_client_key(&mut rng)?;
//! # let client = Client::new(&client_key, &server.public_key())?;
//! let response = server.get_enrollment(&mut rng)?;
//! let (record, key) =
//!     client.enroll_account(&mut rng, b"correct horse battery staple", &response)?;
//! # Ok::<(), phe::errors::ProtocolError>(())
//! ```
//!
//! ## Verification
//!
//! To check a password attempt, the client derives a
//! [`VerifyPasswordRequest`] from the stored record, the server answers with
//! a proof of success or failure, and the client recovers the key exactly
//! when the password matched:
//! ```
//! # use phe::{Client, Server};
//! # use rand::rngs::OsRng;
//! # let mut rng = OsRng;
//! # let server = Server::generate(&mut rng)?;
//! # let client_key = Client::generate_client_key(&mut rng)?;
//! # let client = Client::new(&client_key, &server.public_key())?;
//! # let response = server.get_enrollment(&mut rng)?;
//! # let (record, key) =
//! #     client.enroll_account(&mut rng, b"correct horse battery staple", &response)?;
//! let request =
//!     client.create_verify_password_request(b"correct horse battery staple", &record)?;
//! let response = server.verify_password(&mut rng, &request)?;
//! let recovered =
//!     client.check_response_and_decrypt(b"correct horse battery staple", &record, &response)?;
//! assert_eq!(key, recovered);
//! # Ok::<(), phe::errors::ProtocolError>(())
//! ```
//!
//! ## Key rotation
//!
//! Rotating the server key yields an [`UpdateToken`] that moves the client
//! key, the cached server public key and every stored record to the new
//! epoch, without touching any password:
//! ```
//! # use phe::{update_enrollment_record, Client, Server};
//! # use rand::rngs::OsRng;
//! # let mut rng = OsRng;
//! # let server = Server::generate(&mut rng)?;
//! # let client_key = Client::generate_client_key(&mut rng)?;
//! # let client = Client::new(&client_key, &server.public_key())?;
//! # let response = server.get_enrollment(&mut rng)?;
//! # let (record, key) =
//! #     client.enroll_account(&mut rng, b"correct horse battery staple", &response)?;
//! let (server, token) = server.rotate(&mut rng)?;
//! let client = client.rotate(&token);
//! let record = update_enrollment_record(&record, &token)?;
//!
//! let request =
//!     client.create_verify_password_request(b"correct horse battery staple", &record)?;
//! let response = server.verify_password(&mut rng, &request)?;
//! let recovered =
//!     client.check_response_and_decrypt(b"correct horse battery staple", &record, &response)?;
//! assert_eq!(key, recovered);
//! # Ok::<(), phe::errors::ProtocolError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

// Error types
pub mod errors;

mod client;
mod constants;
mod group;
mod keypair;
mod map_to_curve;
mod messages;
mod proofs;
mod serialization;
mod server;

#[cfg(test)]
mod tests;

// Exports

pub use crate::client::{rotate_client_keys, update_enrollment_record, Client, RecordKey};
pub use crate::keypair::{KeyPair, KEYPAIR_LEN};
pub use crate::messages::{
    EnrollmentRecord, EnrollmentResponse, ProofOfFail, ProofOfSuccess, UpdateToken,
    VerifyPasswordProof, VerifyPasswordRequest, VerifyPasswordResponse,
};
pub use crate::server::Server;
