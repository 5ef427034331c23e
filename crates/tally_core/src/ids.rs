//! Newtypes and parsers for digest/result identifiers.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Prefix carried by every tally result id.
pub const TALLY_ID_PREFIX: &str = "TLY:";

fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn is_lower_hex_len(s: &str, n: usize) -> bool {
    s.len() == n && is_lower_hex(s)
}

/// 64-hex lowercase (input digest).
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sha256(String);

impl Sha256 {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sha256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Sha256 {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_lower_hex_len(s, 64) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidHex) }
    }
}

/// "TLY:" + 64-hex (lowercase), digest of the canonical result payload.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TallyId(String);

impl TallyId {
    pub fn as_str(&self) -> &str { &self.0 }

    /// Build from a digest; the prefix is added here.
    pub fn from_digest(digest: &Sha256) -> Self {
        Self(format!("{TALLY_ID_PREFIX}{}", digest.as_str()))
    }

    /// The hex part after the prefix.
    pub fn digest_hex(&self) -> &str {
        &self.0[TALLY_ID_PREFIX.len()..]
    }
}

impl fmt::Display for TallyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TallyId {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix(TALLY_ID_PREFIX).ok_or(CoreError::InvalidId)?;
        if is_lower_hex_len(rest, 64) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidId) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn sha256_requires_lower_hex_64() {
        assert!(HEX.parse::<Sha256>().is_ok());
        assert_eq!("ABC".parse::<Sha256>().unwrap_err(), CoreError::InvalidHex);
        assert!(HEX.to_uppercase().parse::<Sha256>().is_err());
    }

    #[test]
    fn tally_id_roundtrips_through_digest() {
        let d: Sha256 = HEX.parse().unwrap();
        let id = TallyId::from_digest(&d);
        assert_eq!(id.as_str(), format!("TLY:{HEX}"));
        assert_eq!(id.digest_hex(), HEX);
        assert_eq!(id.as_str().parse::<TallyId>().unwrap(), id);
        assert_eq!(format!("RES:{HEX}").parse::<TallyId>().unwrap_err(), CoreError::InvalidId);
    }
}
