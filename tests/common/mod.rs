//! Common test infrastructure
//!
//! Builds a temporary data tree (song_data/ and log_data/) and a SQLite
//! warehouse file next to it. Tests should only import from this module.

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::{log_line, song_json, TestData};
