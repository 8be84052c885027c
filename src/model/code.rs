use std::collections::HashSet;
use std::fmt::Display;
use std::str::FromStr;

use log::debug;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const LENGTH: usize = 8;

/// Characters a voting code may contain. Codes are stored uppercase.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A voter's secret voting code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VotingCode {
    code: [u8; LENGTH],
}

impl VotingCode {
    /// Generate a random code.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code = [0; LENGTH];
        for c in &mut code {
            // Unwrap safe since the alphabet is non-empty.
            *c = *ALPHABET.choose(rng).unwrap();
        }
        Self { code }
    }

    /// Generate a random code that is not already in `taken`.
    pub fn unique<R: Rng + ?Sized>(rng: &mut R, taken: &HashSet<VotingCode>) -> Self {
        loop {
            let code = Self::random(rng);
            if !taken.contains(&code) {
                return code;
            }
            debug!("Voting code collision, regenerating");
        }
    }

    pub fn as_str(&self) -> &str {
        // Unwrap safe since every byte is drawn from the ASCII alphabet.
        std::str::from_utf8(&self.code).unwrap()
    }
}

impl Display for VotingCode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.as_str())
    }
}

impl FromStr for VotingCode {
    type Err = ParseError;

    /// Parse a code, ignoring case and surrounding whitespace.
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let string = string.trim();
        let len = string.chars().count();
        if len != LENGTH {
            return Err(Self::Err::InvalidLength(len));
        }
        let chars = string
            .chars()
            .map(|c| match c.to_ascii_uppercase() {
                upper @ ('A'..='Z' | '0'..='9') => Ok(upper as u8),
                _ => Err(Self::Err::InvalidChar(c)),
            })
            .collect::<Result<Vec<u8>, Self::Err>>()?;
        Ok(Self {
            code: chars.try_into().unwrap(), // Valid because chars.len() == LENGTH
        })
    }
}

impl TryFrom<String> for VotingCode {
    type Error = ParseError;

    fn try_from(string: String) -> Result<Self, Self::Error> {
        string.parse()
    }
}

impl From<VotingCode> for String {
    fn from(code: VotingCode) -> Self {
        code.to_string()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("voting code must contain exactly 8 characters, found {0}")]
    InvalidLength(usize),
    #[error("voting code must contain only letters and digits, found '{0}'")]
    InvalidChar(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_codes_are_well_formed() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let code = VotingCode::random(&mut rng);
            assert_eq!(code.as_str().len(), LENGTH);
            assert!(code
                .as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn unique_codes_never_repeat() {
        let mut rng = rand::thread_rng();
        let mut taken = HashSet::new();
        for _ in 0..2000 {
            let code = VotingCode::unique(&mut rng, &taken);
            assert!(taken.insert(code), "duplicate code {code}");
        }
    }

    #[test]
    fn parsing_ignores_case() {
        let upper: VotingCode = "AB12CD34".parse().unwrap();
        let lower: VotingCode = " ab12cd34 ".parse().unwrap();
        assert_eq!(upper, lower);
        assert_eq!(lower.to_string(), "AB12CD34");
    }

    #[test]
    fn parsing_rejects_bad_codes() {
        assert_eq!(
            "ABC".parse::<VotingCode>(),
            Err(ParseError::InvalidLength(3))
        );
        assert_eq!(
            "ABCD-123".parse::<VotingCode>(),
            Err(ParseError::InvalidChar('-'))
        );
    }

    #[test]
    fn serializes_as_string() {
        let code: VotingCode = "QWERTY12".parse().unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"QWERTY12\"");
        let back: VotingCode = serde_json::from_str("\"qwerty12\"").unwrap();
        assert_eq!(back, code);
    }
}
