//! Address derivation: P2PKH (legacy), P2WPKH-in-P2SH (nested segwit),
//! and P2WPKH (native segwit bech32).

use crate::base58check;
use crate::bech32;
use crate::error::{Error, Result};
use crate::hashing::hash160;
use crate::keys::PublicKey;
use crate::networks::{AddressType, Network};
use crate::script::{push, witness_byte};

/// Derives an address of `kind` for `public_key` on `network`. Always
/// uses the compressed SEC1 encoding, per spec §4.6's "compressed flag
/// defaults to true" note.
pub fn address(public_key: &PublicKey, kind: AddressType, network: Network) -> Result<String> {
    match kind {
        AddressType::P2pkh => Ok(p2pkh(public_key, network)),
        AddressType::P2wpkhP2sh => Ok(p2wpkh_p2sh(public_key, network)),
        AddressType::P2wpkh => p2wpkh(public_key, network),
        _ => Err(Error::Unsupported(kind)),
    }
}

fn p2pkh(public_key: &PublicKey, network: Network) -> String {
    let hashed = hash160(&public_key.encode(true));
    let mut payload = vec![network.params().keyhash];
    payload.extend_from_slice(&hashed);
    base58check::encode(&payload)
}

fn p2wpkh_p2sh(public_key: &PublicKey, network: Network) -> String {
    let program_hash = hash160(&public_key.encode(true));
    let mut redeem_script = vec![witness_byte(0)];
    redeem_script.extend_from_slice(&push(&program_hash));
    let script_hash = hash160(&redeem_script);
    let mut payload = vec![network.params().scripthash];
    payload.extend_from_slice(&script_hash);
    base58check::encode(&payload)
}

fn p2wpkh(public_key: &PublicKey, network: Network) -> Result<String> {
    let witness_program = hash160(&public_key.encode(true));
    bech32::encode(network.params().hrp, 0, &witness_program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PublicKey;

    #[test]
    fn p2pkh_matches_spec_vector() {
        let public = PublicKey::from_hex(
            "0250863ad64a87ae8a2fe83c1af1a8403cb53f53e486d8511dad8a04887e5b2352",
            Network::Btc,
        )
        .unwrap();
        let addr = address(&public, AddressType::P2pkh, Network::Btc).unwrap();
        assert_eq!(addr, "1PMycacnJaSqwwJqjawXBErnLsZ7RkXUAs");
    }

    #[test]
    fn p2wpkh_p2sh_matches_spec_vector() {
        let public = PublicKey::from_hex(
            "03b82761f2482254b93fdf45f26c5d00bd51883fb7cd143080318c5be9746a5f5f",
            Network::Btc,
        )
        .unwrap();
        let addr = address(&public, AddressType::P2wpkhP2sh, Network::Btc).unwrap();
        assert_eq!(addr, "33x3UHfxVvJNqd275WG9XprVfepEUeASoj");
    }

    #[test]
    fn p2wpkh_matches_spec_vector() {
        let public = PublicKey::from_hex(
            "03727fcbaff7eadb840b13bfd5b3d258530f0c1208bf02d8537606d096f069d2b5",
            Network::Btc,
        )
        .unwrap();
        let addr = address(&public, AddressType::P2wpkh, Network::Btc).unwrap();
        assert_eq!(addr, "bc1qsxe29au72mvjf7vsfhmlcdd5seuslnnkmgw4ws");
    }

    #[test]
    fn unsupported_address_type_fails() {
        let public = PublicKey::from_hex(
            "0250863ad64a87ae8a2fe83c1af1a8403cb53f53e486d8511dad8a04887e5b2352",
            Network::Btc,
        )
        .unwrap();
        let result = address(&public, AddressType::P2wsh, Network::Btc);
        assert!(matches!(result, Err(Error::Unsupported(AddressType::P2wsh))));
    }
}
