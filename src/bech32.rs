//! BIP173 bech32 encoding/decoding, hand-implemented from the reference
//! algorithm: this crate's curve arithmetic and its address checksums are
//! the two subsystems this toolkit owns outright rather than delegating
//! to a library.

use crate::error::{Error, Result};

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_CONST: u32 = 1;

fn polymod(values: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];
    let mut chk: u32 = 1;
    for &v in values {
        let b = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ (v as u32);
        for i in 0..5 {
            if (b >> i) & 1 == 1 {
                chk ^= GEN[i];
            }
        }
    }
    chk
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut v = Vec::with_capacity(hrp.len() * 2 + 1);
    v.extend(hrp.bytes().map(|b| b >> 5));
    v.push(0);
    v.extend(hrp.bytes().map(|b| b & 0x1f));
    v
}

fn create_checksum(hrp: &str, data: &[u8]) -> [u8; 6] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; 6]);
    let polymod = polymod(&values) ^ CHECKSUM_CONST;
    let mut checksum = [0u8; 6];
    for (i, slot) in checksum.iter_mut().enumerate() {
        *slot = ((polymod >> (5 * (5 - i))) & 0x1f) as u8;
    }
    checksum
}

fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values) == CHECKSUM_CONST
}

/// Converts `data`, grouped in `from`-bit chunks, into `to`-bit chunks.
/// Zero-pads the tail when `pad` is set; otherwise rejects a non-zero,
/// incomplete tail group (used on decode, where padding must be zero).
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Result<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let maxv: u32 = (1 << to) - 1;
    let mut ret = Vec::new();
    for &value in data {
        let value = value as u32;
        if (value >> from) != 0 {
            return Err(Error::InvalidPadding);
        }
        acc = (acc << from) | value;
        bits += from;
        while bits >= to {
            bits -= to;
            ret.push(((acc >> bits) & maxv) as u8);
        }
    }
    if pad {
        if bits > 0 {
            ret.push(((acc << (to - bits)) & maxv) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & maxv) != 0 {
        return Err(Error::InvalidPadding);
    }
    Ok(ret)
}

/// Encodes a witness program as a bech32 SegWit address: HRP + `1` +
/// base32 data (witness version followed by the converted program) +
/// 6-character checksum.
pub fn encode(hrp: &str, witver: u8, program: &[u8]) -> Result<String> {
    if !(0..=16).contains(&witver) {
        return Err(Error::Bech32("witness version must be 0-16".into()));
    }
    if hrp.is_empty() || hrp.chars().any(|c| !c.is_ascii() || c.is_ascii_uppercase()) {
        return Err(Error::Bech32("HRP must be non-empty lowercase ASCII".into()));
    }

    let mut data = vec![witver];
    data.extend(convert_bits(program, 8, 5, true)?);

    let checksum = create_checksum(hrp, &data);
    let mut out = String::with_capacity(hrp.len() + 1 + data.len() + 6);
    out.push_str(hrp);
    out.push('1');
    for &d in data.iter().chain(checksum.iter()) {
        out.push(CHARSET[d as usize] as char);
    }
    Ok(out)
}

/// Decodes a bech32 SegWit address into `(hrp, witness_version,
/// witness_program)`.
pub fn decode(s: &str) -> Result<(String, u8, Vec<u8>)> {
    if s.chars().any(|c| (c as u32) < 33 || (c as u32) > 126) {
        return Err(Error::Bech32("invalid character".into()));
    }
    let lower = s.to_lowercase();
    let upper_variant = s.to_uppercase();
    if s != lower && s != upper_variant {
        return Err(Error::Bech32("mixed case".into()));
    }
    let s = lower;

    let pos = s.rfind('1').ok_or_else(|| Error::InvalidHRP)?;
    if pos < 1 || pos + 7 > s.len() {
        return Err(Error::InvalidHRP);
    }
    let hrp = &s[..pos];
    let data_part = &s[pos + 1..];

    let mut data = Vec::with_capacity(data_part.len());
    for c in data_part.chars() {
        let v = CHARSET
            .iter()
            .position(|&x| x as char == c)
            .ok_or_else(|| Error::Bech32(format!("invalid data character '{}'", c)))?;
        data.push(v as u8);
    }

    if !verify_checksum(hrp, &data) {
        return Err(Error::ChecksumMismatch);
    }

    let (witver, program_5bit) = data.split_first().ok_or_else(|| Error::InvalidPadding)?;
    let program_5bit = &program_5bit[..program_5bit.len() - 6];
    let witver = *witver;
    if witver > 16 {
        return Err(Error::Bech32("invalid witness version".into()));
    }

    let program = convert_bits(program_5bit, 5, 8, false)?;
    if !(2..=40).contains(&program.len()) {
        return Err(Error::Bech32("invalid witness program length".into()));
    }
    if witver == 0 && program.len() != 20 && program.len() != 32 {
        return Err(Error::Bech32(
            "witness version 0 program must be 20 or 32 bytes".into(),
        ));
    }

    Ok((hrp.to_string(), witver, program))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p2wpkh_round_trip() {
        let program = [0u8; 20];
        let encoded = encode("bc", 0, &program).unwrap();
        let (hrp, witver, decoded_program) = decode(&encoded).unwrap();
        assert_eq!(hrp, "bc");
        assert_eq!(witver, 0);
        assert_eq!(decoded_program, program);
    }

    #[test]
    fn known_vector() {
        // From spec.md scenario 5.
        let program = [
            0x75, 0x1e, 0x76, 0xe8, 0x19, 0x91, 0x96, 0xd4, 0x54, 0x94, 0x1c, 0x45, 0xd1, 0xb3,
            0xa3, 0x23, 0xf1, 0x43, 0x3b, 0xd6,
        ];
        let address = encode("bc", 0, &program).unwrap();
        assert_eq!(address, "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
    }

    #[test]
    fn bit_flip_is_rejected() {
        let mut encoded = encode("bc", 0, &[0u8; 20]).unwrap().into_bytes();
        let last = encoded.len() - 1;
        encoded[last] = if encoded[last] == b'q' { b'p' } else { b'q' };
        let flipped = String::from_utf8(encoded).unwrap();
        assert!(decode(&flipped).is_err());
    }

    #[test]
    fn rejects_mixed_case() {
        assert!(decode("bC1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4").is_err());
    }
}
