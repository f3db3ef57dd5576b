//! Configuration loader and schema types.
//!
//! This module exposes the settings the daemon needs to locate the minidlna
//! log and database and to talk to last.fm, plus helpers to load them from
//! disk and the environment.

mod load;
mod schema;

pub use load::resolve_config_path;
pub use schema::*;

#[cfg(test)]
mod tests;
