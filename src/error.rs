use thiserror::Error;

/// Every failure mode the toolkit can produce.
///
/// There is no silent fallback anywhere in this crate except the
/// BIP32-specified retry on an out-of-range `I_L`/zero child key, which
/// advances to the next index internally and never surfaces as an error.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("HMAC output I_L is zero or >= curve order while deriving a master key")]
    InvalidSeed,

    #[error("derivation produced the point at infinity or another non-recoverable result")]
    InvalidDerivation,

    #[error("cannot derive a hardened child from an extended public key")]
    HardenedFromPublic,

    #[error("malformed key or record encoding: {0}")]
    InvalidEncoding(String),

    #[error("base58check or bech32 checksum did not match")]
    ChecksumMismatch,

    #[error("extended-key version bytes {0:02x?} not found in either sub-table for this network")]
    UnknownVersion([u8; 4]),

    #[error("extended-key version bytes {0:02x?} match both the extended-prv and extended-pub sub-tables")]
    AmbiguousVersion([u8; 4]),

    #[error("WIF prefix does not match the requested network")]
    WrongNetwork,

    #[error("value out of range: {0}")]
    OutOfRange(String),

    #[error("address type {0:?} has no single-key derivation defined")]
    Unsupported(crate::networks::AddressType),

    #[error("malformed derivation path: {0}")]
    InvalidPath(String),

    #[error("bech32 error: {0}")]
    Bech32(String),

    #[error("invalid bech32 human-readable part")]
    InvalidHRP,

    #[error("invalid bech32 padding in the converted data")]
    InvalidPadding,

    #[error("invalid mnemonic phrase")]
    InvalidMnemonic,
}

pub type Result<T> = std::result::Result<T, Error>;
