use std::{borrow::Cow, fmt};

use crate::foundation::{
    error::{BackdropError, BackdropResult},
    math::sha256_hex,
};

/// Suffix appended to a key when the variant bundle is requested.
pub const VARIANT_SUFFIX: &str = "-extra";

const MAX_STEM_LEN: usize = 128;
/// Marks stems derived by hashing; verbatim keys never start with it.
const HASHED_STEM_PREFIX: &str = "h-";

/// Opaque cache key supplied by identifier resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wrap a raw key; empty keys are rejected.
    pub fn new(raw: impl Into<String>) -> BackdropResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(BackdropError::validation("cache key must not be empty"));
        }
        Ok(Self(raw))
    }

    /// Key for the content hash of uploaded bytes.
    pub fn for_bytes(bytes: &[u8]) -> Self {
        Self(sha256_hex(bytes))
    }

    /// Append [`VARIANT_SUFFIX`] when `variant` is set.
    pub fn with_variant(self, variant: bool) -> Self {
        if variant {
            Self(self.0 + VARIANT_SUFFIX)
        } else {
            self
        }
    }

    /// The key as supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name stem for this key.
    ///
    /// Filename-safe keys are used verbatim; anything else becomes `h-`
    /// followed by the hex SHA-256 of the key, so it can never escape the
    /// cache directory or land on the stem of a verbatim key.
    pub fn file_stem(&self) -> Cow<'_, str> {
        if is_filename_safe(&self.0) {
            Cow::Borrowed(&self.0)
        } else {
            Cow::Owned(format!(
                "{HASHED_STEM_PREFIX}{}",
                sha256_hex(self.0.as_bytes())
            ))
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_filename_safe(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_STEM_LEN
        && !s.starts_with('.')
        && !s.starts_with(HASHED_STEM_PREFIX)
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}
