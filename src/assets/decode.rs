use anyhow::Context;
use image::DynamicImage;

use crate::foundation::error::{BackdropError, BackdropResult};

/// Decode caller-supplied artwork bytes.
///
/// Failures are reported as [`BackdropError::Decode`] since the bytes came from the caller.
pub fn decode_source(bytes: &[u8]) -> BackdropResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(BackdropError::decode("source image is empty"));
    }
    image::load_from_memory(bytes).map_err(|e| BackdropError::decode(format!("source image: {e}")))
}

/// Decode a template asset; failures are internal errors, not caller errors.
pub(crate) fn decode_asset(bytes: &[u8], what: &str) -> BackdropResult<DynamicImage> {
    let img = image::load_from_memory(bytes).with_context(|| format!("decode {what} asset"))?;
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
