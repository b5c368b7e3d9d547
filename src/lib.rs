//! An HD wallet key toolkit for Bitcoin: secp256k1 primitives, BIP32
//! extended-key derivation, and P2PKH/P2WPKH-P2SH/P2WPKH address
//! encoding for mainnet and testnet.
//!
//! Mnemonic-to-seed expansion delegates to the `bip39` crate; this
//! crate owns everything from the seed downward. Broadcasting
//! transactions or fetching UTXOs is out of scope — see
//! [`networks::NetworkParams`]'s inert URL fields.

pub mod addresses;
pub mod base58check;
pub mod bech32;
pub mod curve;
pub mod error;
pub mod extended_keys;
pub mod hashing;
pub mod keys;
pub mod networks;
pub mod path;
pub mod script;

pub use error::{Error, Result};
pub use extended_keys::{decode, ExtendedKey, Xprv, Xpub};
pub use keys::{PrivateKey, PublicKey};
pub use networks::{AddressType, Network};
pub use path::DerivationPath;
