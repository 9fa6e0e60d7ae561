//! Error taxonomy for the key-exchange, compression, and low-level field
//! layers (spec §7). Every public entry point in [`crate::sidh`] and
//! [`crate::compression`] returns `Result<_, SidhError>`; the low-level
//! field/curve layers reserve `debug_assert!` for invariants that cannot be
//! violated by any well-typed caller (see the module doc of [`crate::fp`]).

use thiserror::Error;

/// The three error kinds from spec §7, flattened into one enum with
/// variants that name the failing operation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidhError {
    /// Inversion of zero, square root of a non-square, or a compressed
    /// public key whose scalars disagree with its normalization bit.
    #[error("domain violation: {0}")]
    DomainViolation(DomainViolation),

    /// A secret key out of range or of the wrong parity/divisibility, or a
    /// public key triple that does not correspond to a valid supersingular
    /// curve.
    #[error("parameter mismatch: {0}")]
    ParameterMismatch(ParameterMismatch),

    /// An internal invariant failed on a well-typed input; this should
    /// never happen and indicates a bug in this crate rather than caller
    /// misuse.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(InternalInvariant),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainViolation {
    #[error("attempted to invert zero")]
    InversionOfZero,
    #[error("square root requested of a non-square field element")]
    NotASquare,
    #[error("compressed public key scalars disagree with the normalization bit")]
    CompressionNormalizationMismatch,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterMismatch {
    #[error("Alice secret key out of range or not even")]
    InvalidAliceSecretKey,
    #[error("Bob secret key out of range or not a multiple of three")]
    InvalidBobSecretKey,
    #[error("public key triple does not lie on a valid supersingular curve")]
    InvalidPublicKeyCurve,
    #[error("three-point ladder input did not land in the expected torsion subgroup")]
    TorsionMismatch,
    #[error("encoded byte buffer has the wrong length for this type")]
    InvalidEncodingLength,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalInvariant {
    #[error("pairing final-exponentiation residue is not in the cyclotomic subgroup")]
    NotCyclotomic,
    #[error("Pohlig-Hellman digit fell outside its window's comparison table")]
    DigitOutOfRange,
    #[error("optimal-strategy split index out of bounds for the leaf count")]
    StrategyIndexOutOfBounds,
}

pub type SidhResult<T> = Result<T, SidhError>;
