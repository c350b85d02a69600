//! CLI command implementations.

pub mod config;
pub mod entry;
pub mod find;
pub mod generate;
pub mod get;
pub mod keygen;
pub mod migrate;
pub mod section;
