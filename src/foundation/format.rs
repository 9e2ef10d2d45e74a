use std::{fmt, str::FromStr};

use crate::foundation::error::BackdropError;

/// Raster format a generated image can be served in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Lossless PNG; the canonical cache format.
    Png,
    /// JPEG stored under the `jpg` extension.
    Jpg,
    /// JPEG stored under the `jpeg` extension.
    Jpeg,
    /// Lossless WebP.
    Webp,
}

impl OutputFormat {
    /// Every supported format, in the order reported to callers.
    pub const ALL: [OutputFormat; 4] = [Self::Png, Self::Jpg, Self::Jpeg, Self::Webp];

    /// Format every other one is derived from.
    pub const CANONICAL: OutputFormat = Self::Png;

    /// File extension used for cache entries.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    /// MIME type of the encoded bytes.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// `true` for the lossless source-of-truth format.
    pub fn is_canonical(self) -> bool {
        self == Self::CANONICAL
    }

    /// Comma separated list of supported extensions.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for OutputFormat {
    type Err = BackdropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ext = s.trim().trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|f| f.extension().eq_ignore_ascii_case(ext))
            .ok_or_else(|| BackdropError::unsupported_format(s))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/format.rs"]
mod tests;
