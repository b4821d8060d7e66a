//! # Formats
//!
//! Text formats specifications can be loaded from.
//!
//! - `array_literal`: the `{{1, 2}, {3, 4}}` brace syntax for array values
//! - `config_store`: TOML documents of named specifications

pub mod array_literal;
mod config_store;

pub use array_literal::Literal;
pub use config_store::ConfigStore;
