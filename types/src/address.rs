//! Principal identifiers used for authorization checks.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An external identity (account address) that owns components, votes,
/// stands as a candidate, or receives escrowed funds.
///
/// The coordinator never authenticates principals itself; the execution
/// environment hands it a verified principal per call and the core only
/// compares identities.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Create a principal from a raw identifier.
    ///
    /// Surrounding whitespace is trimmed. Fails on an empty identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyPrincipal);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Principal {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_keeps_identifier() {
        let p = Principal::new("  0xabc  ").unwrap();
        assert_eq!(p.as_str(), "0xabc");
        assert_eq!(p.to_string(), "0xabc");
    }

    #[test]
    fn empty_identifier_rejected() {
        assert!(matches!(Principal::new("   "), Err(TypesError::EmptyPrincipal)));
        assert!("".parse::<Principal>().is_err());
    }

    #[test]
    fn equality_is_exact() {
        let a = Principal::new("alice").unwrap();
        let b: Principal = "alice".parse().unwrap();
        let c = Principal::new("Alice").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
