//! Train code (service identity) type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a train code.
const MAX_CODE_LEN: usize = 8;

/// Error returned when parsing an invalid train code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train code {code:?}: {reason}")]
pub struct InvalidTrainCode {
    code: String,
    reason: &'static str,
}

/// A validated train code (e.g. `E109`, `A123`, `P607`).
///
/// Train codes identify one service on one day and are the key of the
/// journey cache. The remote source pads them with trailing spaces, so
/// most callers want [`TrainCode::parse_normalized`].
///
/// # Examples
///
/// ```
/// use rail_schedule::domain::TrainCode;
///
/// let code = TrainCode::parse_normalized("e109 ").unwrap();
/// assert_eq!(code.as_str(), "E109");
///
/// assert!(TrainCode::parse("").is_err());
/// assert!(TrainCode::parse("E 109").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrainCode(String);

impl TrainCode {
    /// Parse a train code from a string.
    ///
    /// The input must be 1 to 8 uppercase ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainCode> {
        let invalid = |reason| InvalidTrainCode {
            code: s.to_string(),
            reason,
        };

        if s.is_empty() || s.len() > MAX_CODE_LEN {
            return Err(invalid("must be 1 to 8 characters"));
        }

        if !s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(invalid("must be uppercase ASCII letters or digits"));
        }

        Ok(TrainCode(s.to_string()))
    }

    /// Parse a train code after trimming whitespace and uppercasing.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidTrainCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TrainCode {
    type Error = InvalidTrainCode;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TrainCode> for String {
    fn from(code: TrainCode) -> Self {
        code.0
    }
}

impl fmt::Debug for TrainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrainCode({})", self.0)
    }
}

impl fmt::Display for TrainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
