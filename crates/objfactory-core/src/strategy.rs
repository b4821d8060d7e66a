//! Construction strategies.

use crate::primitives::{BOTH, REFLECTION_ONLY, SPECIFICATION_ONLY};
use crate::types::FactoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the engine turns a key into an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    /// Look the key up in the store, fall back to a type name when it is unknown.
    #[default]
    Both,
    /// Treat the key as a type name and call its initializers.
    ReflectionOnly,
    /// Only ever use the store.
    SpecificationOnly,
}

impl Strategy {
    /// The string constant naming this strategy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Both => BOTH,
            Self::ReflectionOnly => REFLECTION_ONLY,
            Self::SpecificationOnly => SPECIFICATION_ONLY,
        }
    }

    /// Whether the store is consulted at all.
    #[must_use]
    pub const fn uses_store(self) -> bool {
        !matches!(self, Self::ReflectionOnly)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            BOTH => Ok(Self::Both),
            REFLECTION_ONLY => Ok(Self::ReflectionOnly),
            SPECIFICATION_ONLY => Ok(Self::SpecificationOnly),
            other if other.trim().is_empty() => Err(FactoryError::InvalidArgument(
                "the strategy should not be empty".to_string(),
            )),
            other => Err(FactoryError::InvalidArgument(format!(
                "unknown strategy '{other}', expected one of {BOTH}, {REFLECTION_ONLY}, {SPECIFICATION_ONLY}"
            ))),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = FactoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.as_str().to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_strings() {
        for strategy in [
            Strategy::Both,
            Strategy::ReflectionOnly,
            Strategy::SpecificationOnly,
        ] {
            assert_eq!(strategy.as_str().parse::<Strategy>().expect("parse"), strategy);
        }
    }

    #[test]
    fn rejects_unknown_and_blank_names() {
        for name in ["", "  ", "Both", "reflect", "spec"] {
            assert!(matches!(
                name.parse::<Strategy>(),
                Err(FactoryError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn default_is_both() {
        assert_eq!(Strategy::default(), Strategy::Both);
        assert!(Strategy::Both.uses_store());
        assert!(!Strategy::ReflectionOnly.uses_store());
    }
}
