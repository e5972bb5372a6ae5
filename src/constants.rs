// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Domain-separation tags and key-derivation labels shared by both sides of
//! the protocol. Changing any value here breaks interoperability.

/// Tag for hashing a client nonce and password onto the curve (first point).
pub(crate) const DHC0: u8 = 0x00;
/// Tag for hashing a client nonce and password onto the curve (second point).
pub(crate) const DHC1: u8 = 0x01;
/// Tag for hashing a server nonce onto the curve (first point).
pub(crate) const DHS0: u8 = 0x02;
/// Tag for hashing a server nonce onto the curve (second point).
pub(crate) const DHS1: u8 = 0x03;
/// Tag for hashing the random key seed onto the curve.
pub(crate) const DM: u8 = 0x04;
/// Tag binding a proof-of-success challenge to its transcript.
pub(crate) const PROOF_OK: u8 = 0x05;
/// Tag binding a proof-of-failure challenge to its transcript.
pub(crate) const PROOF_ERROR: u8 = 0x06;

/// HKDF info string for hashing onto a scalar.
pub(crate) const STR_HASH_Z: &[u8] = b"HashZ";
/// HKDF info string for deriving the record encryption key.
pub(crate) const STR_SECRET: &[u8] = b"Secret";

/// Length in bytes of the client and server enrollment nonces.
pub(crate) const NONCE_LEN: usize = 32;
