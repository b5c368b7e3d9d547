use bip_tools::{AddressType, Network, Xprv};

const SEED_HEX: &str = "66d35ff22d901d8ba764a07d8667eb282678fb9954712841494faf22b5d1a20b0a36ae8c3556a23caeb7bf33ed5b8d2ebd49de31a8c738c66067621730a16880";
const MNEMONIC: &str =
    "lemon child success once board usual cigar buffalo video cheese kitten onion build axis dose";

fn hex_decode(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

#[test]
fn master_from_raw_seed_matches_mnemonic_derived_master() {
    let seed = hex_decode(SEED_HEX);
    let from_seed = Xprv::from_seed(&seed, Network::Btc, AddressType::P2pkh).unwrap();
    let from_mnemonic =
        Xprv::from_mnemonic(MNEMONIC, "", Network::Btc, AddressType::P2pkh).unwrap();
    assert_eq!(from_seed.encode().unwrap(), from_mnemonic.encode().unwrap());
    assert_eq!(
        from_seed.encode().unwrap(),
        "xprv9s21ZrQH143K38p5ouMV2qFYest2F3uRQC51JPLqsdi8Lh1rkXUJRUy1m7rd5TvooJn6gerthNmntuJag6e73mrf8GmG96Ua8rpayQtUEsL"
    );
}

#[test]
fn testnet_master_from_mnemonic_matches_spec_vector() {
    let master = Xprv::from_mnemonic(MNEMONIC, "", Network::Btct, AddressType::P2pkh).unwrap();
    assert_eq!(
        master.encode().unwrap(),
        "tprv8ZgxMBicQKsPdx3cUUCzCUsXy1JEUZwRjjz8AomJMcCc8Hkwjtp3wELTgJ2H5qK8AkJsgkUerjMbMkrKoJz3rq8FeuyZoTCd3xa1R23x4LZ"
    );
}

#[test]
fn bip44_bip49_bip84_addresses_match_spec_vectors() {
    let master = Xprv::from_mnemonic(MNEMONIC, "", Network::Btc, AddressType::P2pkh).unwrap();

    let bip44_path = bip_tools::DerivationPath::parse("m/44h/0h/0h/0/0").unwrap();
    let bip44 = master.derive_path(&bip44_path).unwrap();
    assert_eq!(bip44.address(None).unwrap(), "1DgEh5Y6NioqaxHBBc2puDYq6SvG5NDsG9");

    let bip49_path = bip_tools::DerivationPath::parse("m/49h/0h/0h/0/0").unwrap();
    let bip49 = master.derive_path(&bip49_path).unwrap();
    assert_eq!(
        bip49.address(Some(AddressType::P2wpkhP2sh)).unwrap(),
        "39Qn8kHG6h7zv1Fh1iwjjyeRibx7gHTq1Z"
    );

    let bip84_path = bip_tools::DerivationPath::parse("m/84h/0h/0h/0/0").unwrap();
    let bip84 = master.derive_path(&bip84_path).unwrap();
    assert_eq!(
        bip84.address(Some(AddressType::P2wpkh)).unwrap(),
        "bc1qrxxtlul9j3p95wrt33zg7vdf74skujnhnghaey"
    );
}
