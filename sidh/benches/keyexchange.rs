#[macro_use]
extern crate criterion;

use criterion::Criterion;

use sidh::biginteger::BigInteger768;
use sidh::{compress_a, compress_b, decompress_and_shared_a, decompress_and_shared_b, keygen_a, keygen_b, shared_a, shared_b, Traversal};

fn sample_secret_keys() -> (BigInteger768, BigInteger768) {
    (BigInteger768::from_u64(1 << 60), BigInteger768::from_u64(3 * (1 << 58)))
}

fn alice_keygen(c: &mut Criterion) {
    let (sk_a, _) = sample_secret_keys();
    c.bench_function("Alice keygen", move |b| b.iter(|| keygen_a(&sk_a, Traversal::Fast).unwrap()));
}

fn bob_keygen(c: &mut Criterion) {
    let (_, sk_b) = sample_secret_keys();
    c.bench_function("Bob keygen", move |b| b.iter(|| keygen_b(&sk_b, Traversal::Fast).unwrap()));
}

fn alice_shared_secret(c: &mut Criterion) {
    let (sk_a, sk_b) = sample_secret_keys();
    let pk_b = keygen_b(&sk_b, Traversal::Fast).unwrap();
    c.bench_function("Alice shared secret", move |b| b.iter(|| shared_a(&sk_a, &pk_b, Traversal::Fast).unwrap()));
}

fn bob_shared_secret(c: &mut Criterion) {
    let (sk_a, sk_b) = sample_secret_keys();
    let pk_a = keygen_a(&sk_a, Traversal::Fast).unwrap();
    c.bench_function("Bob shared secret", move |b| b.iter(|| shared_b(&sk_b, &pk_a, Traversal::Fast).unwrap()));
}

fn alice_compress(c: &mut Criterion) {
    let (sk_a, _) = sample_secret_keys();
    let pk_a = keygen_a(&sk_a, Traversal::Fast).unwrap();
    c.bench_function("Alice public key compression", move |b| b.iter(|| compress_a(&pk_a).unwrap()));
}

fn bob_compress(c: &mut Criterion) {
    let (_, sk_b) = sample_secret_keys();
    let pk_b = keygen_b(&sk_b, Traversal::Fast).unwrap();
    c.bench_function("Bob public key compression", move |b| b.iter(|| compress_b(&pk_b).unwrap()));
}

fn alice_decompress_and_shared_secret(c: &mut Criterion) {
    let (sk_a, sk_b) = sample_secret_keys();
    let pk_b = keygen_b(&sk_b, Traversal::Fast).unwrap();
    let cpk_b = compress_b(&pk_b).unwrap();
    c.bench_function("Alice decompress and shared secret", move |b| {
        b.iter(|| decompress_and_shared_a(&sk_a, &cpk_b, Traversal::Fast).unwrap())
    });
}

fn bob_decompress_and_shared_secret(c: &mut Criterion) {
    let (sk_a, sk_b) = sample_secret_keys();
    let pk_a = keygen_a(&sk_a, Traversal::Fast).unwrap();
    let cpk_a = compress_a(&pk_a).unwrap();
    c.bench_function("Bob decompress and shared secret", move |b| {
        b.iter(|| decompress_and_shared_b(&sk_b, &cpk_a, Traversal::Fast).unwrap())
    });
}

criterion_group! {
    name = keyexchange;
    config = Criterion::default().sample_size(10);
    targets = alice_keygen, bob_keygen, alice_shared_secret, bob_shared_secret,
        alice_compress, bob_compress, alice_decompress_and_shared_secret, bob_decompress_and_shared_secret
}

criterion_main!(keyexchange);
