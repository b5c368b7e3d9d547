//! Derivation path parsing: `m/44'/0'/0'/0/0`-shaped strings (accepting
//! both `'` and `h` as the hardened marker) reduced to a flat list of
//! raw BIP32 indices, each already offset by `2^31` when hardened.

use crate::error::{Error, Result};

pub const HARDENED_OFFSET: u32 = 1 << 31;

/// A parsed path: the root marker (`m` or `M`) plus the ordered list of
/// raw child indices to apply from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    pub is_private_root: bool,
    pub indices: Vec<u32>,
}

impl DerivationPath {
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split('/');
        let root = parts
            .next()
            .ok_or_else(|| Error::InvalidPath("empty path".into()))?;
        let is_private_root = match root {
            "m" => true,
            "M" => false,
            _ => return Err(Error::InvalidPath(format!("path must start with 'm' or 'M', got '{}'", root))),
        };

        let mut indices = Vec::new();
        for segment in parts {
            indices.push(parse_segment(segment)?);
        }
        Ok(Self {
            is_private_root,
            indices,
        })
    }
}

fn parse_segment(segment: &str) -> Result<u32> {
    if segment.is_empty() {
        return Err(Error::InvalidPath("empty path segment".into()));
    }
    let (digits, hardened) = match segment.strip_suffix(['h', 'H', '\'']) {
        Some(rest) => (rest, true),
        None => (segment, false),
    };
    let n: u32 = digits
        .parse()
        .map_err(|_| Error::InvalidPath(format!("not a number: '{}'", segment)))?;
    if n >= HARDENED_OFFSET {
        return Err(Error::InvalidPath(format!(
            "index {} out of range before applying the hardened offset",
            n
        )));
    }
    Ok(if hardened { n + HARDENED_OFFSET } else { n })
}

/// Renders a raw BIP32 index as the path segment the original toolkit
/// uses: plain decimal for non-hardened, `i - 2^31` followed by `h` for
/// hardened.
pub fn format_segment(i: u32) -> String {
    if i < HARDENED_OFFSET {
        format!("{}", i)
    } else {
        format!("{}h", i - HARDENED_OFFSET)
    }
}
