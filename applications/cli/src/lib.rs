//! Preview Deck CLI Library
//!
//! Terminal host for the preview player: configuration, playlist loading,
//! command parsing and the interactive loop.
//!
//! This library exposes the core components for testing purposes.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod playlist;

// Re-export commonly used types for convenience
pub use config::DeckConfig;
pub use error::{CliError, Result};
