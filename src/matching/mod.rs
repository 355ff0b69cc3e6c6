//! Candidate matching: age derivation, search and decisions.

pub mod age;
pub mod decisions;
mod matcher;

pub use age::current_age;
pub use matcher::{MatchSettings, Matcher};
