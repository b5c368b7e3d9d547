//! `PrivateKey` and `PublicKey`: the scalar/point pair at the bottom of
//! every derivation, plus WIF and SEC1 (de)serialization.

use num_bigint::BigUint;
use num_traits::Zero;
use rand::RngCore;

use crate::addresses;
use crate::base58check;
use crate::curve::{self, Point};
use crate::error::{Error, Result};
use crate::networks::{AddressType, Network};

/// A 32-byte big-endian scalar `d` with `1 <= d < n`. Carries a network
/// tag that affects only serialization (WIF, addresses derived from it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKey {
    d: BigUint,
    pub network: Network,
}

impl PrivateKey {
    /// Builds a private key from a 32-byte big-endian scalar, checking
    /// `1 <= d < n`.
    pub fn from_bytes(bytes: &[u8], network: Network) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(Error::InvalidEncoding(format!(
                "private key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        Self::from_int(BigUint::from_bytes_be(bytes), network)
    }

    pub fn from_int(d: BigUint, network: Network) -> Result<Self> {
        if d.is_zero() || d >= *curve::N {
            return Err(Error::OutOfRange(
                "private key scalar must satisfy 0 < d < n".into(),
            ));
        }
        Ok(Self { d, network })
    }

    pub fn from_hex(s: &str, network: Network) -> Result<Self> {
        let bytes =
            hex_decode(s).map_err(|e| Error::InvalidEncoding(format!("bad hex: {}", e)))?;
        Self::from_bytes(&bytes, network)
    }

    /// A cryptographically random private key, via `rand::rngs::OsRng` —
    /// the crate's sole dependency on ambient nondeterministic state.
    pub fn random(network: Network) -> Self {
        let mut rng = rand::rngs::OsRng;
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            if let Ok(key) = Self::from_bytes(&bytes, network) {
                return key;
            }
        }
    }

    pub fn bytes(&self) -> [u8; 32] {
        let raw = self.d.to_bytes_be();
        let mut out = [0u8; 32];
        out[32 - raw.len()..].copy_from_slice(&raw);
        out
    }

    pub fn int(&self) -> &BigUint {
        &self.d
    }

    pub fn to_public(&self) -> PublicKey {
        let point = curve::scalar_mul(&self.d, &curve::generator());
        PublicKey {
            point,
            network: self.network,
        }
    }

    /// Builds the WIF encoding: `wif_prefix || d || (0x01 if compressed)`
    /// plus a 4-byte double-SHA-256 checksum, base58-encoded.
    pub fn wif(&self, compressed: bool) -> String {
        let mut extended = vec![self.network.params().wif];
        extended.extend_from_slice(&self.bytes());
        if compressed {
            extended.push(0x01);
        }
        base58check::encode(&extended)
    }

    /// Parses a WIF string, verifying its checksum and network prefix.
    /// Returns the key along with whether it encoded a compressed
    /// public key.
    pub fn from_wif(s: &str, network: Network) -> Result<(Self, bool)> {
        let decoded = base58check::decode(s)?;
        if decoded.is_empty() {
            return Err(Error::InvalidEncoding("empty WIF payload".into()));
        }
        let (prefix, rest) = decoded.split_first().unwrap();
        if *prefix != network.params().wif {
            return Err(Error::WrongNetwork);
        }
        let (body, compressed) = match rest.len() {
            33 if rest[32] == 0x01 => (&rest[..32], true),
            32 => (rest, false),
            _ => {
                return Err(Error::InvalidEncoding(
                    "WIF body must be 32 or 33 bytes".into(),
                ))
            }
        };
        let key = Self::from_bytes(body, network)?;
        Ok((key, compressed))
    }
}

/// A point `P = d*G` on secp256k1. Carries a network tag for encoding
/// purposes only: equality compares the point, not the network.
#[derive(Debug, Clone)]
pub struct PublicKey {
    point: Point,
    pub network: Network,
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point
    }
}
impl Eq for PublicKey {}

impl PublicKey {
    /// Wraps a curve point as a public key. Rejects the point at infinity,
    /// which has no SEC1 encoding — callers that can legitimately produce
    /// infinity during derivation should check `Point::is_infinity` first
    /// and surface `Error::InvalidDerivation` themselves.
    pub fn from_point(point: Point, network: Network) -> Result<Self> {
        if point.is_infinity() {
            return Err(Error::InvalidDerivation);
        }
        Ok(Self { point, network })
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn from_hex(s: &str, network: Network) -> Result<Self> {
        let bytes =
            hex_decode(s).map_err(|e| Error::InvalidEncoding(format!("bad hex: {}", e)))?;
        Self::decode(&bytes, network)
    }

    /// SEC1 decode: `0x04 || x || y` uncompressed, `0x02`/`0x03 || x`
    /// compressed (recovering `y` via `curve::modsqrt`).
    pub fn decode(bytes: &[u8], network: Network) -> Result<Self> {
        match bytes.first() {
            Some(0x04) => {
                if bytes.len() != 65 {
                    return Err(Error::InvalidEncoding(
                        "uncompressed public key must be 65 bytes".into(),
                    ));
                }
                let x = BigUint::from_bytes_be(&bytes[1..33]);
                let y = BigUint::from_bytes_be(&bytes[33..65]);
                Ok(Self {
                    point: Point::Affine { x, y },
                    network,
                })
            }
            Some(prefix @ (0x02 | 0x03)) => {
                if bytes.len() != 33 {
                    return Err(Error::InvalidEncoding(
                        "compressed public key must be 33 bytes".into(),
                    ));
                }
                let x = BigUint::from_bytes_be(&bytes[1..]);
                let root = curve::modsqrt(&curve::rhs(&x), &curve::P).ok_or_else(|| {
                    Error::InvalidEncoding("x is not on the curve".into())
                })?;
                let root_is_odd = &root % 2u32 == BigUint::from(1u32);
                let wants_odd = *prefix == 0x03;
                let y = if root_is_odd == wants_odd {
                    root
                } else {
                    &*curve::P - &root
                };
                Ok(Self {
                    point: Point::Affine { x, y },
                    network,
                })
            }
            _ => Err(Error::InvalidEncoding(
                "unknown SEC1 prefix or empty input".into(),
            )),
        }
    }

    /// SEC1 encode: compressed (`0x02`/`0x03 || x`) or uncompressed
    /// (`0x04 || x || y`).
    pub fn encode(&self, compressed: bool) -> Vec<u8> {
        let (x, y) = match &self.point {
            Point::Affine { x, y } => (x, y),
            Point::Infinity => unreachable!("PublicKey never holds the point at infinity"),
        };
        let x_bytes = to_32_bytes(x);
        if compressed {
            let mut out = vec![if &(y % 2u32) == &BigUint::from(1u32) {
                0x03
            } else {
                0x02
            }];
            out.extend_from_slice(&x_bytes);
            out
        } else {
            let mut out = vec![0x04];
            out.extend_from_slice(&x_bytes);
            out.extend_from_slice(&to_32_bytes(y));
            out
        }
    }

    pub fn hex(&self, compressed: bool) -> String {
        hex_encode(&self.encode(compressed))
    }

    /// Derives an address from this public key; `compressed` defaults to
    /// `true` when called through this façade, matching spec §4.6.
    pub fn to_address(&self, kind: AddressType, network_override: Option<Network>) -> Result<String> {
        addresses::address(self, kind, network_override.unwrap_or(self.network))
    }
}

fn to_32_bytes(n: &BigUint) -> [u8; 32] {
    let raw = n.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - raw.len()..].copy_from_slice(&raw);
    out
}

pub(crate) fn hex_decode(s: &str) -> std::result::Result<Vec<u8>, String> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err("odd-length hex string".into());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wif_import_matches_spec_vector() {
        let (key, _) =
            PrivateKey::from_wif("5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ", Network::Btc)
                .unwrap();
        assert_eq!(
            hex_encode(&key.bytes()),
            "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d"
        );
    }

    #[test]
    fn wif_export_matches_spec_vector() {
        let key = PrivateKey::from_hex(
            "2BD036D77C4FE1F4DAFEAA005A1DC7F69522E4B3B53E7F537FA16C5ED5986D03",
            Network::Btc,
        )
        .unwrap();
        assert_eq!(
            key.wif(false),
            "5J9ajYkr763m6HvUkGar3nybCL4e5UMYRP1svduPM3fx1paSK6o"
        );
    }

    #[test]
    fn wif_round_trip_preserves_compressed_flag() {
        let key = PrivateKey::from_int(BigUint::from(42u32), Network::Btc).unwrap();
        for compressed in [true, false] {
            let wif = key.wif(compressed);
            let (recovered, recovered_compressed) = PrivateKey::from_wif(&wif, Network::Btc).unwrap();
            assert_eq!(recovered, key);
            assert_eq!(recovered_compressed, compressed);
        }
    }

    #[test]
    fn wif_rejects_wrong_network() {
        let key = PrivateKey::from_int(BigUint::from(7u32), Network::Btc).unwrap();
        let wif = key.wif(true);
        assert_eq!(PrivateKey::from_wif(&wif, Network::Btct), Err(Error::WrongNetwork));
    }

    #[test]
    fn sec1_round_trip_compressed_and_uncompressed() {
        let key = PrivateKey::from_int(BigUint::from(12345u32), Network::Btc).unwrap();
        let public = key.to_public();
        for compressed in [true, false] {
            let encoded = public.encode(compressed);
            let decoded = PublicKey::decode(&encoded, Network::Btc).unwrap();
            assert_eq!(decoded, public);
        }
    }

    #[test]
    fn public_key_from_wif_matches_spec_vector() {
        let (private, _) =
            PrivateKey::from_wif("L2AnMo4KYaNTKFwgd2ZSsgcxAo8QSwJ9QYSiBSm44a4WZrwPKTum", Network::Btc)
                .unwrap();
        let public = private.to_public();
        let expected = PublicKey::from_hex(
            "03b82761f2482254b93fdf45f26c5d00bd51883fb7cd143080318c5be9746a5f5f",
            Network::Btc,
        )
        .unwrap();
        assert_eq!(public, expected);
    }
}
