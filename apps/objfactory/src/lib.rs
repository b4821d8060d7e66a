//! # objfactory
//!
//! Command line front end for the objfactory construction engine.
//!
//! The binary wires [`objfactory_core`] to a demo type catalog, an optional
//! TOML specification file and an optional config file, then runs one
//! command. Everything here is exposed as a library so the commands can be
//! driven from tests.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod render;
