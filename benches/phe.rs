// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

#[macro_use]
extern crate criterion;

use criterion::Criterion;
use phe::{update_enrollment_record, Client, Server};
use rand::rngs::OsRng;

const PASSWORD: &[u8] = b"hunter2";

fn get_enrollment(c: &mut Criterion) {
    let mut rng = OsRng;
    let server = Server::generate(&mut rng).unwrap();

    c.bench_function("server get enrollment", move |b| {
        b.iter(|| {
            server.get_enrollment(&mut rng).unwrap();
        })
    });
}

fn enroll_account(c: &mut Criterion) {
    let mut rng = OsRng;
    let server = Server::generate(&mut rng).unwrap();
    let client_key = Client::generate_client_key(&mut rng).unwrap();
    let client = Client::new(&client_key, &server.public_key()).unwrap();
    let response = server.get_enrollment(&mut rng).unwrap();

    c.bench_function("client enroll account", move |b| {
        b.iter(|| {
            client.enroll_account(&mut rng, PASSWORD, &response).unwrap();
        })
    });
}

fn verify_password_success(c: &mut Criterion) {
    let mut rng = OsRng;
    let server = Server::generate(&mut rng).unwrap();
    let client_key = Client::generate_client_key(&mut rng).unwrap();
    let client = Client::new(&client_key, &server.public_key()).unwrap();
    let response = server.get_enrollment(&mut rng).unwrap();
    let (record, _) = client.enroll_account(&mut rng, PASSWORD, &response).unwrap();
    let request = client
        .create_verify_password_request(PASSWORD, &record)
        .unwrap();

    c.bench_function("server verify password (match)", move |b| {
        b.iter(|| {
            server.verify_password(&mut rng, &request).unwrap();
        })
    });
}

fn verify_password_failure(c: &mut Criterion) {
    let mut rng = OsRng;
    let server = Server::generate(&mut rng).unwrap();
    let client_key = Client::generate_client_key(&mut rng).unwrap();
    let client = Client::new(&client_key, &server.public_key()).unwrap();
    let response = server.get_enrollment(&mut rng).unwrap();
    let (record, _) = client.enroll_account(&mut rng, PASSWORD, &response).unwrap();
    let request = client
        .create_verify_password_request(b"*******", &record)
        .unwrap();

    c.bench_function("server verify password (mismatch)", move |b| {
        b.iter(|| {
            server.verify_password(&mut rng, &request).unwrap();
        })
    });
}

fn check_response_and_decrypt(c: &mut Criterion) {
    let mut rng = OsRng;
    let server = Server::generate(&mut rng).unwrap();
    let client_key = Client::generate_client_key(&mut rng).unwrap();
    let client = Client::new(&client_key, &server.public_key()).unwrap();
    let response = server.get_enrollment(&mut rng).unwrap();
    let (record, _) = client.enroll_account(&mut rng, PASSWORD, &response).unwrap();
    let request = client
        .create_verify_password_request(PASSWORD, &record)
        .unwrap();
    let response = server.verify_password(&mut rng, &request).unwrap();

    c.bench_function("client check response and decrypt", move |b| {
        b.iter(|| {
            client
                .check_response_and_decrypt(PASSWORD, &record, &response)
                .unwrap();
        })
    });
}

fn rotate_and_update_record(c: &mut Criterion) {
    let mut rng = OsRng;
    let server = Server::generate(&mut rng).unwrap();
    let client_key = Client::generate_client_key(&mut rng).unwrap();
    let client = Client::new(&client_key, &server.public_key()).unwrap();
    let response = server.get_enrollment(&mut rng).unwrap();
    let (record, _) = client.enroll_account(&mut rng, PASSWORD, &response).unwrap();

    c.bench_function("server rotate + client record update", move |b| {
        b.iter(|| {
            let (_, token) = server.rotate(&mut rng).unwrap();
            update_enrollment_record(&record, &token).unwrap();
        })
    });
}

criterion_group!(
    phe_benches,
    get_enrollment,
    enroll_account,
    verify_password_success,
    verify_password_failure,
    check_response_and_decrypt,
    rotate_and_update_record,
);
criterion_main!(phe_benches);
