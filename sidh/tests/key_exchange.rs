//! End-to-end two-party exchange scenarios, exercised only through the
//! crate's public API (`sidh::*`), unlike the unit tests living alongside
//! each module that reach into `pub(crate)` internals.

use rand::{RngCore, SeedableRng};
use rand_xorshift::XorShiftRng;
use sidh::biginteger::BigInteger768;
use sidh::{compress_a, compress_b, decompress_and_shared_a, decompress_and_shared_b, keygen_a, keygen_b, shared_a, shared_b, Traversal};

fn order_two_372_minus(k: u64) -> BigInteger768 {
    let mut bound = sidh::params::P751Params::order_two_372();
    bound.sub_noborrow(&BigInteger768::from_u64(k));
    bound
}

fn order_three_239_minus(k: u64) -> BigInteger768 {
    let mut bound = sidh::params::P751Params::order_three_239();
    bound.sub_noborrow(&BigInteger768::from_u64(k));
    bound
}

/// Random limbs with every bit above `top_bit` forced to zero, i.e. a
/// uniform sample from `[0, 2^(top_bit+1))`.
fn random_masked(rng: &mut XorShiftRng, top_bit: usize) -> BigInteger768 {
    let mut limbs = [0u64; 12];
    for limb in limbs.iter_mut() {
        *limb = rng.next_u64();
    }
    let top_limb = top_bit / 64;
    let keep_bits = (top_bit % 64) + 1;
    limbs[top_limb] &= (1u64 << keep_bits) - 1;
    for limb in limbs.iter_mut().skip(top_limb + 1) {
        *limb = 0;
    }
    BigInteger768(limbs)
}

/// A uniform valid Alice secret key: even, nonzero, below `2^372`.
fn random_alice_sk(rng: &mut XorShiftRng) -> BigInteger768 {
    let bound = sidh::params::P751Params::order_two_372();
    loop {
        let mut candidate = random_masked(rng, 371);
        candidate.0[0] &= !1;
        if !candidate.is_zero() && candidate < bound {
            return candidate;
        }
    }
}

/// A uniform valid Bob secret key: a multiple of three, nonzero, below
/// `3^239`. Forces divisibility by subtracting the mod-3 remainder (via the
/// same limb-sum trick `sidh::sidh`'s own validation uses, since
/// `2^64 mod 3 == 1`), which only ever decreases the candidate so the
/// upper-bound check still holds.
fn random_bob_sk(rng: &mut XorShiftRng) -> BigInteger768 {
    let bound = sidh::params::P751Params::order_three_239();
    loop {
        let mut candidate = random_masked(rng, 378);
        if candidate >= bound {
            continue;
        }
        let rem: u64 = candidate.0.iter().fold(0u64, |acc, &limb| (acc + limb % 3) % 3);
        candidate.sub_noborrow(&BigInteger768::from_u64(rem));
        if !candidate.is_zero() {
            return candidate;
        }
    }
}

/// One uncompressed exchange for a given `(sk_A, sk_B)` pair, checked both
/// ways (Alice's shared secret from Bob's public key, and vice versa) and
/// under both traversal strategies.
fn exchange_agrees(sk_a: BigInteger768, sk_b: BigInteger768) {
    let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("sk_a in range");
    let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("sk_b in range");

    let secret_a = shared_a(&sk_a, &pk_b, Traversal::Fast).expect("valid exchange");
    let secret_b = shared_b(&sk_b, &pk_a, Traversal::Fast).expect("valid exchange");
    assert_eq!(secret_a.srdc(), secret_b.srdc());

    let secret_a_simple = shared_a(&sk_a, &pk_b, Traversal::Simple).expect("valid exchange");
    let secret_b_simple = shared_b(&sk_b, &pk_a, Traversal::Simple).expect("valid exchange");
    assert_eq!(secret_a_simple.srdc(), secret_a.srdc());
    assert_eq!(secret_b_simple.srdc(), secret_b.srdc());
}

#[test]
fn scenario_1_smallest_secret_keys() {
    exchange_agrees(BigInteger768::from_u64(2), BigInteger768::from_u64(3));
}

#[test]
fn scenario_2_small_multiples() {
    exchange_agrees(BigInteger768::from_u64(4), BigInteger768::from_u64(6));
}

#[test]
fn scenario_3_moderate_secret_keys() {
    exchange_agrees(BigInteger768::from_u64(1 << 20), BigInteger768::from_u64(3 * (1 << 18)));
}

#[test]
fn scenario_4_large_but_distinct_secret_keys() {
    exchange_agrees(BigInteger768::from_u64(1 << 40), BigInteger768::from_u64(3 * (1 << 35)));
}

#[test]
fn scenario_5_asymmetric_secret_keys() {
    exchange_agrees(BigInteger768::from_u64(1 << 10), order_three_239_minus(3 * 17));
}

#[test]
fn scenario_6_near_maximal_secret_keys() {
    exchange_agrees(order_two_372_minus(2), order_three_239_minus(3));
}

#[test]
fn compressed_exchange_matches_uncompressed_both_directions() {
    let sk_a = BigInteger768::from_u64(1 << 12);
    let sk_b = BigInteger768::from_u64(3 * (1 << 11));

    let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("sk_a in range");
    let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("sk_b in range");

    let cpk_a = compress_a(&pk_a).expect("compressible key");
    let cpk_b = compress_b(&pk_b).expect("compressible key");

    let uncompressed_a = shared_a(&sk_a, &pk_b, Traversal::Fast).expect("valid exchange");
    let uncompressed_b = shared_b(&sk_b, &pk_a, Traversal::Fast).expect("valid exchange");

    let via_compression_a = decompress_and_shared_a(&sk_a, &cpk_b, Traversal::Fast).expect("valid decompression");
    let via_compression_b = decompress_and_shared_b(&sk_b, &cpk_a, Traversal::Fast).expect("valid decompression");

    assert_eq!(uncompressed_a.srdc(), via_compression_a.srdc());
    assert_eq!(uncompressed_b.srdc(), via_compression_b.srdc());
    assert_eq!(uncompressed_a.srdc(), uncompressed_b.srdc());
}

#[test]
fn wire_format_roundtrips_a_live_exchange() {
    let sk_a = BigInteger768::from_u64(1 << 14);
    let sk_b = BigInteger768::from_u64(3 * (1 << 13));

    let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("sk_a in range");
    let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("sk_b in range");

    let pk_a_bytes = sidh::public_key_to_bytes(&pk_a);
    let pk_b_bytes = sidh::public_key_to_bytes(&pk_b);

    let pk_a_back = sidh::public_key_from_bytes(&pk_a_bytes).expect("well-formed encoding");
    let pk_b_back = sidh::public_key_from_bytes(&pk_b_bytes).expect("well-formed encoding");

    let secret_a = shared_a(&sk_a, &pk_b_back, Traversal::Fast).expect("valid exchange");
    let secret_b = shared_b(&sk_b, &pk_a_back, Traversal::Fast).expect("valid exchange");
    assert_eq!(secret_a.srdc(), secret_b.srdc());
}

#[test]
fn scenario_3_random_secret_keys_from_seeded_rng() {
    let mut rng = XorShiftRng::from_seed([7u8; 16]);
    for _ in 0..4 {
        let sk_a = random_alice_sk(&mut rng);
        let sk_b = random_bob_sk(&mut rng);

        let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("sk_a in range");
        let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("sk_b in range");

        let cpk_a = compress_a(&pk_a).expect("compressible key");
        let cpk_b = compress_b(&pk_b).expect("compressible key");

        let shared_uncompressed_a = shared_a(&sk_a, &pk_b, Traversal::Fast).expect("valid exchange");
        let shared_uncompressed_b = shared_b(&sk_b, &pk_a, Traversal::Fast).expect("valid exchange");
        let shared_via_compression_a = decompress_and_shared_a(&sk_a, &cpk_b, Traversal::Fast).expect("valid decompression");
        let shared_via_compression_b = decompress_and_shared_b(&sk_b, &cpk_a, Traversal::Fast).expect("valid decompression");

        assert_eq!(shared_uncompressed_a.srdc(), shared_uncompressed_b.srdc());
        assert_eq!(shared_via_compression_a.srdc(), shared_uncompressed_a.srdc());
        assert_eq!(shared_via_compression_b.srdc(), shared_uncompressed_b.srdc());
    }
}

#[test]
fn determinism_under_fixed_inputs() {
    let sk_a = BigInteger768::from_u64(2);
    let sk_b = BigInteger768::from_u64(3);

    let pk_a_first = keygen_a(&sk_a, Traversal::Fast).expect("valid key");
    let pk_a_second = keygen_a(&sk_a, Traversal::Fast).expect("valid key");
    assert_eq!(sidh::public_key_to_bytes(&pk_a_first), sidh::public_key_to_bytes(&pk_a_second));

    let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("valid key");
    let secret_first = shared_a(&sk_a, &pk_b, Traversal::Fast).expect("valid exchange");
    let secret_second = shared_a(&sk_a, &pk_b, Traversal::Fast).expect("valid exchange");
    assert_eq!(secret_first.srdc(), secret_second.srdc());
}

#[test]
fn malformed_public_key_does_not_silently_agree() {
    let sk_a = BigInteger768::from_u64(1 << 16);
    let sk_b = BigInteger768::from_u64(3 * (1 << 15));

    let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("valid key");
    let mut pk_b = keygen_b(&sk_b, Traversal::Fast).expect("valid key");

    // Corrupt xPQ so the three x-coordinates no longer come from a common
    // isogeny image; the shared-secret computation must not silently
    // produce the same answer Alice would get from the honest key.
    pk_b.xpq = pk_b.xpq.add(&pk_b.xpq);

    let honest_secret = shared_b(&sk_b, &pk_a, Traversal::Fast).expect("valid exchange");
    match shared_a(&sk_a, &pk_b, Traversal::Fast) {
        Err(_) => {}
        Ok(corrupted_secret) => assert_ne!(corrupted_secret.srdc(), honest_secret.srdc()),
    }
}

#[test]
fn rejects_out_of_range_secret_keys() {
    let too_big_a = sidh::params::P751Params::order_two_372();
    assert!(keygen_a(&too_big_a, Traversal::Fast).is_err());

    let odd_a = BigInteger768::from_u64(5);
    assert!(keygen_a(&odd_a, Traversal::Fast).is_err());

    let non_multiple_of_three_b = BigInteger768::from_u64(4);
    assert!(keygen_b(&non_multiple_of_three_b, Traversal::Fast).is_err());
}
