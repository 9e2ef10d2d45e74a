use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use crate::{
    assets::decode::decode_asset,
    foundation::{
        error::{BackdropError, BackdropResult},
        math::hex_digest,
    },
};

/// Conventional file name of the default base template.
pub const BASE_FILE: &str = "background-base.png";
/// Conventional file name of the variant base template.
pub const VARIANT_BASE_FILE: &str = "background-base-extra.png";
/// Conventional file name of the luminance (silhouette) mask.
pub const LUMINANCE_MASK_FILE: &str = "mask.png";
/// Conventional file name of the side mask.
pub const SIDE_MASK_FILE: &str = "side-mask.png";
/// Conventional file name of the overlay tile.
pub const OVERLAY_FILE: &str = "overlay.png";

/// Raw encoded bytes of the four template assets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetBytes {
    /// Base template canvas.
    pub base: Vec<u8>,
    /// Grayscale mask defining the final silhouette.
    pub luminance_mask: Vec<u8>,
    /// Alpha mask selecting where the far layer shows.
    pub side_mask: Vec<u8>,
    /// Pattern composited last.
    pub overlay: Vec<u8>,
}

impl AssetBytes {
    /// Lowercase hex SHA-256 over base, luminance mask, side mask and overlay, in that order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha2::Sha256::new();
        for part in [
            &self.base,
            &self.luminance_mask,
            &self.side_mask,
            &self.overlay,
        ] {
            hasher.update(part);
        }
        hex_digest(hasher.finalize().as_slice())
    }
}

/// File locations of one asset bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    /// Base template canvas.
    pub base: PathBuf,
    /// Grayscale silhouette mask.
    pub luminance_mask: PathBuf,
    /// Far-layer alpha mask.
    pub side_mask: PathBuf,
    /// Overlay tile.
    pub overlay: PathBuf,
}

impl AssetPaths {
    /// Default bundle using the conventional file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            base: dir.join(BASE_FILE),
            luminance_mask: dir.join(LUMINANCE_MASK_FILE),
            side_mask: dir.join(SIDE_MASK_FILE),
            overlay: dir.join(OVERLAY_FILE),
        }
    }

    /// Variant bundle: same masks and overlay, alternate base template.
    pub fn variant_in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            base: dir.as_ref().join(VARIANT_BASE_FILE),
            ..Self::in_dir(dir)
        }
    }

    /// Read all four files.
    pub fn read(&self) -> BackdropResult<AssetBytes> {
        Ok(AssetBytes {
            base: read_asset(&self.base)?,
            luminance_mask: read_asset(&self.luminance_mask)?,
            side_mask: read_asset(&self.side_mask)?,
            overlay: read_asset(&self.overlay)?,
        })
    }
}

fn read_asset(path: &Path) -> BackdropResult<Vec<u8>> {
    let bytes = std::fs::read(path).with_context(|| format!("read asset '{}'", path.display()))?;
    Ok(bytes)
}

/// Decoded, immutable template images plus the fingerprint of their bytes.
#[derive(Clone, Debug)]
pub struct AssetBundle {
    base: RgbaImage,
    luminance_mask: GrayImage,
    side_mask: RgbaImage,
    overlay: RgbaImage,
    fingerprint: String,
}

impl AssetBundle {
    /// Decode and validate a bundle from raw file bytes.
    ///
    /// The side mask and overlay must match the base exactly; the luminance
    /// mask may be smaller than the base but never larger.
    pub fn from_bytes(bytes: &AssetBytes) -> BackdropResult<Self> {
        let base = decode_asset(&bytes.base, "base")?.to_rgba8();
        let luminance_mask = decode_asset(&bytes.luminance_mask, "luminance mask")?.to_luma8();
        let side_mask = decode_asset(&bytes.side_mask, "side mask")?.to_rgba8();
        let overlay = decode_asset(&bytes.overlay, "overlay")?.to_rgba8();

        let base_dims = base.dimensions();
        if base_dims.0 == 0 || base_dims.1 == 0 {
            return Err(BackdropError::validation("base template is empty"));
        }
        for (name, dims) in [
            ("side mask", side_mask.dimensions()),
            ("overlay", overlay.dimensions()),
        ] {
            if dims != base_dims {
                return Err(BackdropError::validation(format!(
                    "{name} is {}x{} but base is {}x{}",
                    dims.0, dims.1, base_dims.0, base_dims.1
                )));
            }
        }
        let (mw, mh) = luminance_mask.dimensions();
        if mw == 0 || mh == 0 || mw > base_dims.0 || mh > base_dims.1 {
            return Err(BackdropError::validation(format!(
                "luminance mask {mw}x{mh} must be non-empty and fit within base {}x{}",
                base_dims.0, base_dims.1
            )));
        }

        Ok(Self {
            base,
            luminance_mask,
            side_mask,
            overlay,
            fingerprint: bytes.fingerprint(),
        })
    }

    /// Read, decode and validate the files named by `paths`.
    #[tracing::instrument(skip_all, fields(base = %paths.base.display()))]
    pub fn load(paths: &AssetPaths) -> BackdropResult<Self> {
        let bundle = Self::from_bytes(&paths.read()?)?;
        tracing::debug!(fingerprint = %bundle.short_fingerprint(), "loaded asset bundle");
        Ok(bundle)
    }

    /// Base template canvas.
    pub fn base(&self) -> &RgbaImage {
        &self.base
    }

    /// Silhouette mask; its size is the output size.
    pub fn luminance_mask(&self) -> &GrayImage {
        &self.luminance_mask
    }

    /// Far-layer alpha mask.
    pub fn side_mask(&self) -> &RgbaImage {
        &self.side_mask
    }

    /// Overlay tile.
    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    /// Full hex SHA-256 fingerprint.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// First 16 hex characters of the fingerprint.
    pub fn short_fingerprint(&self) -> &str {
        &self.fingerprint[..16]
    }

    /// Output dimensions of every image composed with this bundle.
    pub fn output_dimensions(&self) -> (u32, u32) {
        self.luminance_mask.dimensions()
    }
}

/// The default bundle and its variant, selected per request.
#[derive(Clone, Debug)]
pub struct AssetSet {
    /// Bundle used when the variant flag is off.
    pub default: Arc<AssetBundle>,
    /// Bundle used when the variant flag is on.
    pub variant: Arc<AssetBundle>,
}

impl AssetSet {
    /// Pair two bundles.
    pub fn new(default: AssetBundle, variant: AssetBundle) -> Self {
        Self {
            default: Arc::new(default),
            variant: Arc::new(variant),
        }
    }

    /// Load both bundles from the conventional file names in `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> BackdropResult<Self> {
        let dir = dir.as_ref();
        Ok(Self::new(
            AssetBundle::load(&AssetPaths::in_dir(dir))?,
            AssetBundle::load(&AssetPaths::variant_in_dir(dir))?,
        ))
    }

    /// Bundle for the given variant flag.
    pub fn select(&self, variant: bool) -> &Arc<AssetBundle> {
        if variant { &self.variant } else { &self.default }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/bundle.rs"]
mod tests;
