//! Ways of obtaining the source artwork, invoked only on a cache miss.

use std::{future::Future, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use image::DynamicImage;

use crate::{
    assets::decode::decode_source,
    foundation::error::{BackdropError, BackdropResult},
};

/// Lazily produces the source bitmap for a generation.
///
/// Identifier resolution (remote lookups, uploads) lives behind this trait;
/// the service calls [`SourceProvider::fetch`] at most once per actual composition.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Obtain and decode the source bitmap.
    async fn fetch(&self) -> BackdropResult<DynamicImage>;
}

/// Encoded image bytes already in memory, e.g. an upload.
#[derive(Clone, Debug)]
pub struct BytesSource {
    bytes: Arc<[u8]>,
}

impl BytesSource {
    /// Wrap encoded bytes.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

#[async_trait]
impl SourceProvider for BytesSource {
    async fn fetch(&self) -> BackdropResult<DynamicImage> {
        let bytes = Arc::clone(&self.bytes);
        decode_off_runtime(bytes).await
    }
}

/// A bitmap that is already decoded.
#[derive(Clone, Debug)]
pub struct ImageSource {
    image: Arc<DynamicImage>,
}

impl ImageSource {
    /// Wrap a decoded image.
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }
}

#[async_trait]
impl SourceProvider for ImageSource {
    async fn fetch(&self) -> BackdropResult<DynamicImage> {
        Ok(DynamicImage::clone(&self.image))
    }
}

/// An image file on local disk.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Read from `path` on fetch.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceProvider for FileSource {
    async fn fetch(&self) -> BackdropResult<DynamicImage> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            BackdropError::source_unavailable(format!("read '{}': {e}", self.path.display()))
        })?;
        decode_off_runtime(bytes.into()).await
    }
}

/// Adapter for an async closure, for callers that resolve sources themselves.
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F> {
    /// Wrap `f`; it is called once per fetch.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> SourceProvider for FnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = BackdropResult<DynamicImage>> + Send,
{
    async fn fetch(&self) -> BackdropResult<DynamicImage> {
        (self.f)().await
    }
}

async fn decode_off_runtime(bytes: Arc<[u8]>) -> BackdropResult<DynamicImage> {
    tokio::task::spawn_blocking(move || decode_source(&bytes))
        .await
        .map_err(|e| BackdropError::from(anyhow::anyhow!("decode task failed: {e}")))?
}

#[cfg(test)]
#[path = "../../tests/unit/service/source.rs"]
mod tests;
