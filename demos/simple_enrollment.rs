// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Walks through the full lifecycle of one account: enrollment, a correct
//! and an incorrect login attempt, and a server key rotation.
//!
//! Run with:
//! `cargo run --example simple_enrollment`

use phe::errors::ProtocolError;
use phe::{update_enrollment_record, Client, Server};
use rand::rngs::OsRng;

fn main() -> Result<(), ProtocolError> {
    let mut rng = OsRng;
    let password = b"correct horse battery staple";

    // one-time setup on each side
    let server = Server::generate(&mut rng)?;
    let client_key = Client::generate_client_key(&mut rng)?;
    let client = Client::new(&client_key, &server.public_key())?;

    // enrollment
    let response = server.get_enrollment(&mut rng)?;
    let (record, key) = client.enroll_account(&mut rng, password, &response)?;
    println!("enrolled; record is {} bytes", record.serialize().len());

    // a correct attempt recovers the key
    let request = client.create_verify_password_request(password, &record)?;
    let response = server.verify_password(&mut rng, &request)?;
    let recovered = client.check_response_and_decrypt(password, &record, &response)?;
    assert_eq!(key, recovered);
    println!("correct password accepted");

    // a wrong attempt is rejected with a verified proof of failure
    let request = client.create_verify_password_request(b"hunter2", &record)?;
    let response = server.verify_password(&mut rng, &request)?;
    match client.check_response_and_decrypt(b"hunter2", &record, &response) {
        Err(ProtocolError::InvalidPassword) => println!("wrong password rejected"),
        other => panic!("unexpected outcome: {:?}", other.map(|_| "key")),
    }

    // rotate the server key and move everything to the new epoch
    let (server, token) = server.rotate(&mut rng)?;
    let client = client.rotate(&token);
    let record = update_enrollment_record(&record, &token)?;

    let request = client.create_verify_password_request(password, &record)?;
    let response = server.verify_password(&mut rng, &request)?;
    let recovered = client.check_response_and_decrypt(password, &record, &response)?;
    assert_eq!(key, recovered);
    println!("rotation preserved the record key");

    Ok(())
}
