//! Station types.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Maximum length of a station code.
const MAX_CODE_LEN: usize = 5;

/// Error returned when parsing an invalid station code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station code {code:?}: {reason}")]
pub struct InvalidStationCode {
    code: String,
    reason: &'static str,
}

/// A valid station code (e.g. `BFSTC`, `DLERY`, `MHIDE`).
///
/// Codes are 1 to 5 uppercase ASCII letters or digits. This type guarantees
/// that any `StationCode` value is valid by construction.
///
/// # Examples
///
/// ```
/// use rail_schedule::domain::StationCode;
///
/// let code = StationCode::parse("BFSTC").unwrap();
/// assert_eq!(code.as_str(), "BFSTC");
///
/// // Lowercase is rejected by the strict parser
/// assert!(StationCode::parse("bfstc").is_err());
///
/// // ...but accepted after normalization
/// assert_eq!(StationCode::parse_normalized(" bfstc ").unwrap(), code);
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationCode(String);

impl StationCode {
    /// Parse a station code from a string.
    ///
    /// The input must be 1 to 5 uppercase ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidStationCode> {
        let invalid = |reason| InvalidStationCode {
            code: s.to_string(),
            reason,
        };

        if s.is_empty() || s.len() > MAX_CODE_LEN {
            return Err(invalid("must be 1 to 5 characters"));
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(invalid("must be uppercase ASCII letters or digits"));
        }

        Ok(StationCode(s.to_string()))
    }

    /// Parse a station code after trimming whitespace and uppercasing.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidStationCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationCode {
    type Error = InvalidStationCode;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<StationCode> for String {
    fn from(code: StationCode) -> Self {
        code.0
    }
}

impl fmt::Debug for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationCode({})", self.0)
    }
}

impl fmt::Display for StationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A station from the remote station list.
///
/// Stations are never mutated; the whole list is replaced when refreshed.
/// Identity is the station code: two records with the same code compare
/// equal regardless of the other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Display name (e.g. "Dun Laoghaire").
    pub name: String,

    /// Short station code.
    pub code: StationCode,

    /// Alternative name, if the source provides one.
    pub alias: Option<String>,

    /// Latitude, for map rendering.
    pub latitude: f64,

    /// Longitude, for map rendering.
    pub longitude: f64,

    /// Numeric id assigned by the source.
    pub id: Option<u32>,
}

impl Station {
    /// Create a station with only a name and code.
    pub fn new(name: impl Into<String>, code: StationCode) -> Self {
        Self {
            name: name.into(),
            code,
            alias: None,
            latitude: 0.0,
            longitude: 0.0,
            id: None,
        }
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Station {}

impl Hash for Station {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(StationCode::parse("BFSTC").is_ok());
        assert!(StationCode::parse("DLERY").is_ok());
        assert!(StationCode::parse("BFF").is_ok());
        assert!(StationCode::parse("A").is_ok());
        assert!(StationCode::parse("GCDK2").is_ok());
    }

    #[test]
    fn reject_lowercase() {
        assert!(StationCode::parse("bfstc").is_err());
        assert!(StationCode::parse("Bfstc").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(StationCode::parse("").is_err());
        assert!(StationCode::parse("ABCDEF").is_err());
    }

    #[test]
    fn reject_punctuation() {
        assert!(StationCode::parse("A-B").is_err());
        assert!(StationCode::parse("A B").is_err());
        assert!(StationCode::parse("ÖBB").is_err());
    }

    #[test]
    fn normalized_trims_and_uppercases() {
        let code = StationCode::parse_normalized("  mhide ").unwrap();
        assert_eq!(code.as_str(), "MHIDE");
        assert!(StationCode::parse_normalized("   ").is_err());
    }

    #[test]
    fn display_and_debug() {
        let code = StationCode::parse("DRL").unwrap();
        assert_eq!(format!("{}", code), "DRL");
        assert_eq!(format!("{:?}", code), "StationCode(DRL)");
    }

    #[test]
    fn station_identity_is_code() {
        let code = StationCode::parse("BFF").unwrap();
        let mut a = Station::new("Belfast", code.clone());
        let b = Station::new("Belfast Lanyon Place", code);
        a.latitude = 54.6;
        assert_eq!(a, b);

        let c = Station::new("Belfast", StationCode::parse("BFSTC").unwrap());
        assert_ne!(a, c);
    }

    #[test]
    fn serde_rejects_invalid_code() {
        let ok: Result<StationCode, _> = serde_json::from_str("\"BFF\"");
        assert!(ok.is_ok());
        let bad: Result<StationCode, _> = serde_json::from_str("\"bff\"");
        assert!(bad.is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: parse then as_str returns the original
        #[test]
        fn roundtrip(s in "[A-Z0-9]{1,5}") {
            let code = StationCode::parse(&s).unwrap();
            prop_assert_eq!(code.as_str(), s.as_str());
        }

        /// Normalization accepts any case and surrounding spaces
        #[test]
        fn normalized_accepts_lowercase(s in "[a-z0-9]{1,5}") {
            let padded = format!(" {} ", s);
            let code = StationCode::parse_normalized(&padded).unwrap();
            prop_assert_eq!(code.as_str(), s.to_ascii_uppercase());
        }

        /// Overlong strings are always rejected
        #[test]
        fn overlong_rejected(s in "[A-Z]{6,12}") {
            prop_assert!(StationCode::parse(&s).is_err());
        }
    }
}
