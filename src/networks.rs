//! The frozen per-network parameter table: bech32 HRP, key-hash and
//! script-hash version bytes, WIF prefix, and the extended-key version
//! byte sub-tables keyed by address type.

/// Bitcoin address script templates this toolkit knows about. Only
/// `P2pkh`, `P2wpkhP2sh`, and `P2wpkh` have an `addresses::address`
/// implementation; the others exist so the extended-key version-byte
/// tables can be represented completely (matching `hdtools.opcodes`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    P2pk,
    P2pkh,
    P2sh,
    P2wpkh,
    P2wsh,
    P2wpkhP2sh,
    P2wshP2sh,
}

/// The two networks this toolkit supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Btc,
    Btct,
}

/// Per-network parameters. Every field is a plain constant; the
/// `utxo_url`/`rawtx_url`/`broadcast_url` fields mirror the Python
/// original's configuration surface and are never dereferenced by any
/// code path in this crate — there is no network I/O here.
pub struct NetworkParams {
    pub hrp: &'static str,
    pub keyhash: u8,
    pub scripthash: u8,
    pub wif: u8,
    pub extended_prv: &'static [(AddressType, [u8; 4])],
    pub extended_pub: &'static [(AddressType, [u8; 4])],
    pub utxo_url: &'static str,
    pub rawtx_url: &'static str,
    pub broadcast_url: &'static str,
}

const BTC_MAIN: NetworkParams = NetworkParams {
    hrp: "bc",
    keyhash: 0x00,
    scripthash: 0x05,
    wif: 0x80,
    extended_prv: &[
        (AddressType::P2pkh, [0x04, 0x88, 0xAD, 0xE4]),       // xprv
        (AddressType::P2wpkhP2sh, [0x04, 0x9D, 0x78, 0x78]),  // yprv
        (AddressType::P2wpkh, [0x04, 0xB2, 0x43, 0x0C]),      // zprv
        (AddressType::P2wshP2sh, [0x02, 0x95, 0xB4, 0x3F]),   // Yprv
        (AddressType::P2wsh, [0x02, 0xAA, 0x7A, 0x99]),       // Zprv
    ],
    extended_pub: &[
        (AddressType::P2pkh, [0x04, 0x88, 0xB2, 0x1E]),       // xpub
        (AddressType::P2wpkhP2sh, [0x04, 0x9D, 0x7C, 0xB2]),  // ypub
        (AddressType::P2wpkh, [0x04, 0xB2, 0x47, 0x46]),      // zpub
        // NOTE: this collides bit-for-bit with extended_prv's P2wshP2sh
        // (Yprv) entry above. Preserved verbatim per spec §9's documented
        // open question; decode() surfaces Error::AmbiguousVersion when
        // a record's version bytes match both sub-tables.
        (AddressType::P2wshP2sh, [0x02, 0x95, 0xB4, 0x3F]),   // Ypub
        (AddressType::P2wsh, [0x02, 0xAA, 0x7E, 0xD3]),       // Zpub
    ],
    utxo_url: "https://blockchain.info/unspent?active={address}",
    rawtx_url: "https://blockchain.info/rawtx/{txid}?format=hex",
    broadcast_url: "https://blockchain.info/pushtx",
};

const BTC_TEST: NetworkParams = NetworkParams {
    hrp: "tb",
    keyhash: 0x6f,
    scripthash: 0xc4,
    wif: 0xef,
    extended_prv: &[
        (AddressType::P2pkh, [0x04, 0x35, 0x83, 0x94]),      // tprv
        (AddressType::P2wpkhP2sh, [0x04, 0x4A, 0x4E, 0x28]), // uprv
        (AddressType::P2wpkh, [0x04, 0x5F, 0x18, 0xBC]),     // vprv
        (AddressType::P2wshP2sh, [0x02, 0x42, 0x85, 0xB5]),  // Uprv
        (AddressType::P2wsh, [0x02, 0x57, 0x50, 0x48]),      // Vprv
    ],
    extended_pub: &[
        (AddressType::P2pkh, [0x04, 0x35, 0x87, 0xCF]),      // tpub
        (AddressType::P2wpkhP2sh, [0x04, 0x4A, 0x52, 0x62]), // upub
        (AddressType::P2wpkh, [0x04, 0x5F, 0x1C, 0xF6]),     // vpub
        (AddressType::P2wshP2sh, [0x02, 0x42, 0x89, 0xEF]),  // Upub
        (AddressType::P2wsh, [0x02, 0x57, 0x54, 0x83]),      // Vpub
    ],
    utxo_url: "https://testnet.blockchain.info/unspent?active={address}",
    rawtx_url: "https://testnet.blockchain.info/rawtx/{txid}?format=hex",
    broadcast_url: "https://testnet.blockchain.info/pushtx",
};

impl Network {
    pub fn params(self) -> &'static NetworkParams {
        match self {
            Network::Btc => &BTC_MAIN,
            Network::Btct => &BTC_TEST,
        }
    }
}

impl NetworkParams {
    pub fn extended_prv_version(&self, kind: AddressType) -> Option<[u8; 4]> {
        self.extended_prv
            .iter()
            .find(|(t, _)| *t == kind)
            .map(|(_, v)| *v)
    }

    pub fn extended_pub_version(&self, kind: AddressType) -> Option<[u8; 4]> {
        self.extended_pub
            .iter()
            .find(|(t, _)| *t == kind)
            .map(|(_, v)| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_ypub_yprv_collision_is_preserved() {
        let params = Network::Btc.params();
        assert_eq!(
            params.extended_prv_version(AddressType::P2wshP2sh),
            params.extended_pub_version(AddressType::P2wshP2sh),
        );
    }

    #[test]
    fn testnet_version_bytes_do_not_collide() {
        let params = Network::Btct.params();
        assert_ne!(
            params.extended_prv_version(AddressType::P2wshP2sh),
            params.extended_pub_version(AddressType::P2wshP2sh),
        );
    }
}
