//! Concrete backends for the pulsefeed-core traits: an in-memory summary
//! store, a SQLite summary store, the Gemini generation client, and the
//! config loader.

pub mod config;
pub mod gemini;
pub mod memory;
pub mod sqlite;
