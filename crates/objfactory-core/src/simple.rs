//! Text → scalar for simple specifications.

use crate::primitives::{STRING, STRING_FULL};
use crate::types::{BoxError, ConstructionError, Primitive, Value};
use std::str::FromStr;

/// Parses the text of simple specifications.
pub struct SimpleValueParser;

impl SimpleValueParser {
    /// Parse `text` as a value of the simple type `kind`.
    ///
    /// Strings are returned verbatim (even when empty). Every other kind
    /// rejects empty text.
    pub fn parse(kind: &str, text: &str) -> Result<Value, ConstructionError> {
        if kind == STRING || kind == STRING_FULL {
            return Ok(Value::String(text.to_string()));
        }
        let primitive = Primitive::from_alias(kind)
            .ok_or_else(|| ConstructionError::UnexpectedSimpleType(kind.to_string()))?;
        if text.is_empty() {
            return Err(ConstructionError::EmptyValue {
                type_name: kind.to_string(),
            });
        }

        match primitive {
            Primitive::Byte => number(kind, text).map(Value::Byte),
            Primitive::Short => number(kind, text).map(Value::Short),
            Primitive::Int => number(kind, text).map(Value::Int),
            Primitive::Long => number(kind, text).map(Value::Long),
            Primitive::Float => number(kind, strip_suffix(text)).map(Value::Float),
            Primitive::Double => number(kind, strip_suffix(text)).map(Value::Double),
            Primitive::Char => text
                .chars()
                .next()
                .map(Value::Char)
                .ok_or_else(|| ConstructionError::EmptyValue {
                    type_name: kind.to_string(),
                }),
            Primitive::Boolean => Ok(Value::Boolean(text.eq_ignore_ascii_case("true"))),
        }
    }
}

fn number<T>(kind: &str, text: &str) -> Result<T, ConstructionError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.parse::<T>()
        .map_err(|e| ConstructionError::InvalidNumber {
            type_name: kind.to_string(),
            text: text.to_string(),
            source: BoxError::from(e),
        })
}

/// Floating literals may carry a type suffix and surrounding blanks.
fn strip_suffix(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_suffix(['f', 'F', 'd', 'D'])
        .unwrap_or(trimmed)
}

// =============================================================================
// TESTS
// =============================================================================
