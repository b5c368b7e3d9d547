//! Base58Check: Base58 with a 4-byte double-SHA-256 checksum. Used for
//! legacy/P2SH addresses, WIF, and BIP32 extended-key records.

use crate::error::{Error, Result};

/// Appends `double_sha256(payload)[..4]` to `payload` and base58-encodes
/// the result.
pub fn encode(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Base58-decodes `s` and verifies the trailing 4-byte checksum, returning
/// the payload with the checksum stripped.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    bs58::decode(s)
        .with_check(None)
        .into_vec()
        .map_err(|_| Error::ChecksumMismatch)
}
