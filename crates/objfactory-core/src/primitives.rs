//! # Innate Primitives
//!
//! Fixed vocabulary shared by specifications, stores and the engine.
//!
//! These names are part of the public contract: specification authors and
//! callers pass them by value, so they must never change.
//!
//! ## Vocabulary
//!
//! 1. **Type aliases**: primitive and string names that resolve without a
//!    loading context.
//! 2. **Built-in types**: names every registry knows before any class is
//!    registered.
//! 3. **Strategy names**: the string form of each construction strategy.
//! 4. **Store syntax**: delimiters used by configuration-backed stores.

// =============================================================================
// TYPE ALIASES
// =============================================================================

/// 32-bit signed integer.
pub const INT: &str = "int";

/// 8-bit signed integer.
pub const BYTE: &str = "byte";

/// 16-bit signed integer.
pub const SHORT: &str = "short";

/// 64-bit signed integer.
pub const LONG: &str = "long";

/// 32-bit float.
pub const FLOAT: &str = "float";

/// 64-bit float.
pub const DOUBLE: &str = "double";

/// A single character.
pub const CHAR: &str = "char";

/// `true` / `false`.
pub const BOOLEAN: &str = "boolean";

/// Short alias for the string type.
pub const STRING: &str = "string";

/// Full alias for the string type.
///
/// Resolves to the same runtime type as [`STRING`] but is tracked as a
/// distinct simple kind, so a specification keeps the spelling it was
/// authored with.
pub const STRING_FULL: &str = "std::string::String";

/// Every alias accepted by a `Simple` specification, in table order.
pub const SIMPLE_TYPES: [&str; 10] = [
    INT,
    BYTE,
    SHORT,
    LONG,
    FLOAT,
    DOUBLE,
    CHAR,
    BOOLEAN,
    STRING,
    STRING_FULL,
];

// =============================================================================
// BUILT-IN TYPES
// =============================================================================

/// Root reference type. Every non-primitive value is assignable to it.
pub const ANY: &str = "any";

// =============================================================================
// STRATEGY NAMES
// =============================================================================

/// Try the specification store first, then registered initializers.
pub const BOTH: &str = "both";

/// Only registered initializers.
pub const REFLECTION_ONLY: &str = "reflection";

/// Only the specification store.
pub const SPECIFICATION_ONLY: &str = "specification";

// =============================================================================
// STORE SYNTAX
// =============================================================================

/// Separates key and identifier in a specification name (`key:identifier`).
pub const ID_DELIMITER: char = ':';

/// Array literal keyword for a null element.
pub const NULL_ITEM: &str = "null";

/// Check whether `name` is one of the simple (primitive or string) aliases.
#[must_use]
pub fn is_simple_type(name: &str) -> bool {
    SIMPLE_TYPES.contains(&name)
}

/// Check whether `name` is one of the two string aliases.
#[must_use]
pub fn is_string_type(name: &str) -> bool {
    name == STRING || name == STRING_FULL
}
