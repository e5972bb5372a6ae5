// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Length-prefixed field encoding used by the message codecs

use crate::errors::InternalError;

pub(crate) fn serialize(input: &[u8], max_bytes: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    output.extend_from_slice(&input.len().to_be_bytes()[8 - max_bytes..]);
    output.extend_from_slice(input);
    output
}

pub(crate) fn tokenize(
    input: &[u8],
    size_bytes: usize,
) -> Result<(Vec<u8>, Vec<u8>), InternalError> {
    if size_bytes > 8 || input.len() < size_bytes {
        return Err(InternalError::InvalidByteSequence);
    }

    let mut size_array = [0u8; 8];
    size_array[8 - size_bytes..].copy_from_slice(&input[..size_bytes]);
    let size = usize::from_be_bytes(size_array);

    if size_bytes + size > input.len() {
        return Err(InternalError::InvalidByteSequence);
    }

    Ok((
        input[size_bytes..size_bytes + size].to_vec(),
        input[size_bytes + size..].to_vec(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_inverts_serialize() {
        let payload = b"some payload bytes";
        let mut buffer = serialize(payload, 2);
        buffer.extend_from_slice(b"rest");

        let (field, remainder) = tokenize(&buffer, 2).unwrap();
        assert_eq!(field, payload.to_vec());
        assert_eq!(remainder, b"rest".to_vec());
    }

    #[test]
    fn tokenize_rejects_truncated_input() {
        let buffer = serialize(b"some payload bytes", 2);
        assert!(tokenize(&buffer[..buffer.len() - 1], 2).is_err());
        assert!(tokenize(&[], 2).is_err());
    }
}
