//! Request orchestration: cache lookups, deduplicated generation, format derivation.

pub mod config;
pub mod generator;
pub mod inflight;
pub mod source;
