//! Subcommand implementations.

pub mod config;
pub mod generate;
pub mod key;
pub mod models;
pub mod theme;
