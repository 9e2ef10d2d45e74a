//! Fingerprint-addressed, write-once image cache on the filesystem.

pub mod codec;
pub mod key;
pub mod store;
