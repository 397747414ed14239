//! Library entry for aptpulse exposing the update-check engine for the binary and integration tests.
//!
//! The pipeline runs `apt-get -s upgrade` twice (phased updates excluded, then
//! included), flags phased packages, classifies the rest with
//! `apt-cache policy`, and assembles a categorized snapshot.

pub mod logic;
pub mod report;
pub mod settings;
pub mod sources;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_utils;
