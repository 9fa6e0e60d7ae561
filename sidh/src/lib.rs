//! Supersingular Isogeny Diffie-Hellman ephemeral key exchange over P751
//! (`p = 2^372 * 3^239 - 1`), with public-key compression.
//!
//! The module layout mirrors the teacher's `algebra` crate: a field layer
//! ([`fp`], [`fp2`], [`biginteger`], [`modscalar`]), a curve/isogeny layer
//! ([`curve`], [`isogeny`], [`strategy`], [`basis`]), a protocol layer built
//! from those ([`pairing`], [`pohlig_hellman`], [`sidh`], [`compression`]),
//! and parameter/error/wire-format modules that the rest thread through
//! explicitly ([`params`], [`error`], [`serialize`]) rather than relying on
//! process-global state.
//!
//! The two entry points most callers need are [`sidh::keygen_a`]/
//! [`sidh::keygen_b`] plus [`sidh::shared_a`]/[`sidh::shared_b`] for the
//! uncompressed exchange, and [`compression::compress_a`]/
//! [`compression::compress_b`] plus
//! [`compression::decompress_and_shared_a`]/
//! [`compression::decompress_and_shared_b`] for the bandwidth-reduced one.

pub mod basis;
pub mod biginteger;
pub mod compression;
pub mod curve;
pub mod error;
pub mod fp;
pub mod fp2;
pub mod isogeny;
pub mod modscalar;
pub mod pairing;
pub mod params;
pub mod pohlig_hellman;
pub mod serialize;
pub mod sidh;
pub mod strategy;

pub use compression::{compress_a, compress_b, decompress_and_shared_a, decompress_and_shared_b, CompressedPublicKey};
pub use error::{DomainViolation, InternalInvariant, ParameterMismatch, SidhError, SidhResult};
pub use serialize::{
    compressed_a_from_bytes, compressed_a_to_bytes, compressed_b_from_bytes, compressed_b_to_bytes, public_key_from_bytes, public_key_to_bytes,
};
pub use sidh::{keygen_a, keygen_b, shared_a, shared_b, j_invariant, PublicKey, Traversal};
