//! Wire format (spec.md §6): fixed-width little-endian byte encodings for
//! field elements, public keys, and compressed public keys.
//!
//! Every `Fp751` is de-Montgomerized via [`crate::fp::Fp751::to_canonical`]
//! before its limbs hit the wire, and re-lifted via
//! [`crate::fp::Fp751::from_canonical`] on the way back in, so the
//! Montgomery representation never leaks past this module.

use crate::biginteger::BigInteger768;
use crate::compression::CompressedPublicKey;
use crate::error::{ParameterMismatch, SidhError, SidhResult};
use crate::fp::Fp751;
use crate::fp2::Fp2;
use crate::sidh::PublicKey;

/// Bytes in one serialized `Fp751` element: `12 * 8`.
pub const FP_BYTES: usize = 96;
/// Bytes in one serialized `Fp2` element: `c0` then `c1`.
pub const FP2_BYTES: usize = 2 * FP_BYTES;
/// Bytes in an uncompressed [`PublicKey`]: `xp`, `xq`, `xpq`.
pub const PUBLIC_KEY_BYTES: usize = 3 * FP2_BYTES;
/// Bytes in a compressed Alice key: `a` plus three `3^239`-bounded scalars
/// packed into `ceil(378/8) = 48` bytes each, plus the normalization bit.
pub const COMPRESSED_A_BYTES: usize = FP2_BYTES + 3 * 48 + 1;
/// Bytes in a compressed Bob key: `a` plus three `2^372`-bounded scalars
/// packed into `ceil(372/8) = 47` bytes each, plus the normalization bit.
pub const COMPRESSED_B_BYTES: usize = FP2_BYTES + 3 * 47 + 1;

fn fp_to_bytes(x: &Fp751, out: &mut [u8]) {
    out.copy_from_slice(&x.to_canonical().to_bytes_le());
}

fn fp_from_bytes(bytes: &[u8]) -> Fp751 {
    Fp751::from_canonical(&BigInteger768::from_bytes_le(bytes))
}

fn fp2_to_bytes(x: &Fp2, out: &mut [u8]) {
    fp_to_bytes(&x.c0, &mut out[..FP_BYTES]);
    fp_to_bytes(&x.c1, &mut out[FP_BYTES..FP2_BYTES]);
}

fn fp2_from_bytes(bytes: &[u8]) -> Fp2 {
    Fp2::new(fp_from_bytes(&bytes[..FP_BYTES]), fp_from_bytes(&bytes[FP_BYTES..FP2_BYTES]))
}

fn scalar_to_bytes(x: &BigInteger768, out: &mut [u8]) {
    let full = x.to_bytes_le();
    out.copy_from_slice(&full[..out.len()]);
}

fn scalar_from_bytes(bytes: &[u8]) -> BigInteger768 {
    BigInteger768::from_bytes_le(bytes)
}

fn bad_length() -> SidhError {
    SidhError::ParameterMismatch(ParameterMismatch::InvalidEncodingLength)
}

pub fn public_key_to_bytes(pk: &PublicKey) -> [u8; PUBLIC_KEY_BYTES] {
    let mut out = [0u8; PUBLIC_KEY_BYTES];
    fp2_to_bytes(&pk.xp, &mut out[..FP2_BYTES]);
    fp2_to_bytes(&pk.xq, &mut out[FP2_BYTES..2 * FP2_BYTES]);
    fp2_to_bytes(&pk.xpq, &mut out[2 * FP2_BYTES..3 * FP2_BYTES]);
    out
}

pub fn public_key_from_bytes(bytes: &[u8]) -> SidhResult<PublicKey> {
    if bytes.len() != PUBLIC_KEY_BYTES {
        return Err(bad_length());
    }
    Ok(PublicKey {
        xp: fp2_from_bytes(&bytes[..FP2_BYTES]),
        xq: fp2_from_bytes(&bytes[FP2_BYTES..2 * FP2_BYTES]),
        xpq: fp2_from_bytes(&bytes[2 * FP2_BYTES..3 * FP2_BYTES]),
    })
}

fn compressed_to_bytes(cpk: &CompressedPublicKey, scalar_bytes: usize, out: &mut [u8]) {
    fp2_to_bytes(&cpk.a, &mut out[..FP2_BYTES]);
    let mut cursor = FP2_BYTES;
    for s in [&cpk.s1, &cpk.s2, &cpk.s3] {
        scalar_to_bytes(s, &mut out[cursor..cursor + scalar_bytes]);
        cursor += scalar_bytes;
    }
    out[cursor] = cpk.bit as u8;
}

fn compressed_from_bytes(bytes: &[u8], scalar_bytes: usize, expected_len: usize) -> SidhResult<CompressedPublicKey> {
    if bytes.len() != expected_len {
        return Err(bad_length());
    }
    let a = fp2_from_bytes(&bytes[..FP2_BYTES]);
    let mut cursor = FP2_BYTES;
    let mut scalars = [BigInteger768::zero(); 3];
    for s in scalars.iter_mut() {
        *s = scalar_from_bytes(&bytes[cursor..cursor + scalar_bytes]);
        cursor += scalar_bytes;
    }
    let bit = match bytes[cursor] {
        0 => false,
        1 => true,
        _ => return Err(bad_length()),
    };
    Ok(CompressedPublicKey { bit, s1: scalars[0], s2: scalars[1], s3: scalars[2], a })
}

pub fn compressed_a_to_bytes(cpk: &CompressedPublicKey) -> [u8; COMPRESSED_A_BYTES] {
    let mut out = [0u8; COMPRESSED_A_BYTES];
    compressed_to_bytes(cpk, 48, &mut out);
    out
}

pub fn compressed_a_from_bytes(bytes: &[u8]) -> SidhResult<CompressedPublicKey> {
    compressed_from_bytes(bytes, 48, COMPRESSED_A_BYTES)
}

pub fn compressed_b_to_bytes(cpk: &CompressedPublicKey) -> [u8; COMPRESSED_B_BYTES] {
    let mut out = [0u8; COMPRESSED_B_BYTES];
    compressed_to_bytes(cpk, 47, &mut out);
    out
}

pub fn compressed_b_from_bytes(bytes: &[u8]) -> SidhResult<CompressedPublicKey> {
    compressed_from_bytes(bytes, 47, COMPRESSED_B_BYTES)
}

// `CompressedPublicKey` deliberately gets no `serde` impl here: its wire
// width depends on whether it came from `compress_a` or `compress_b`, a
// distinction the struct itself doesn't carry, so a caller who needs to
// serialize one picks `compressed_a_to_bytes`/`compressed_b_to_bytes`
// explicitly and wraps the resulting fixed-size array however their
// transport requires.
#[cfg(feature = "serde")]
mod serde_support {
    use super::*;
    use serde::de::Error as DeError;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for PublicKey {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(&public_key_to_bytes(self))
        }
    }

    impl<'de> Deserialize<'de> for PublicKey {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            public_key_from_bytes(&bytes).map_err(DeError::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biginteger::BigInteger768;
    use crate::sidh::{keygen_a, keygen_b, Traversal};

    #[test]
    fn fp_roundtrips_through_canonical_bytes() {
        let x = Fp751::from_u64(123456789);
        let canonical = x.to_canonical();
        let lifted = Fp751::from_canonical(&canonical);
        assert_eq!(lifted.srdc(), x.srdc());
    }

    #[test]
    fn public_key_roundtrips() {
        let sk_a = BigInteger768::from_u64(1 << 10);
        let pk = keygen_a(&sk_a, Traversal::Fast).expect("valid secret key");
        let bytes = public_key_to_bytes(&pk);
        assert_eq!(bytes.len(), PUBLIC_KEY_BYTES);
        let back = public_key_from_bytes(&bytes).expect("well-formed encoding");
        assert_eq!(back.xp.srdc(), pk.xp.srdc());
        assert_eq!(back.xq.srdc(), pk.xq.srdc());
        assert_eq!(back.xpq.srdc(), pk.xpq.srdc());
    }

    #[test]
    fn public_key_from_bytes_rejects_wrong_length() {
        let bytes = [0u8; PUBLIC_KEY_BYTES - 1];
        assert!(public_key_from_bytes(&bytes).is_err());
    }

    #[test]
    fn compressed_b_roundtrips() {
        let sk_b = BigInteger768::from_u64(3 * (1 << 8));
        let pk_b = keygen_b(&sk_b, Traversal::Fast).expect("valid secret key");
        let cpk = crate::compression::compress_b(&pk_b).expect("compressible key");
        let bytes = compressed_b_to_bytes(&cpk);
        assert_eq!(bytes.len(), COMPRESSED_B_BYTES);
        let back = compressed_b_from_bytes(&bytes).expect("well-formed encoding");
        assert_eq!(back.bit, cpk.bit);
        assert_eq!(back.s1, cpk.s1);
        assert_eq!(back.s2, cpk.s2);
        assert_eq!(back.s3, cpk.s3);
        assert_eq!(back.a.srdc(), cpk.a.srdc());
    }

    #[test]
    fn compressed_a_roundtrips() {
        let sk_a = BigInteger768::from_u64(1 << 10);
        let pk_a = keygen_a(&sk_a, Traversal::Fast).expect("valid secret key");
        let cpk = crate::compression::compress_a(&pk_a).expect("compressible key");
        let bytes = compressed_a_to_bytes(&cpk);
        assert_eq!(bytes.len(), COMPRESSED_A_BYTES);
        let back = compressed_a_from_bytes(&bytes).expect("well-formed encoding");
        assert_eq!(back.bit, cpk.bit);
        assert_eq!(back.s1, cpk.s1);
        assert_eq!(back.s2, cpk.s2);
        assert_eq!(back.s3, cpk.s3);
    }
}
