use std::{
    io::{ErrorKind, Write as _},
    path::{Path, PathBuf},
};

use image::RgbaImage;

use crate::{
    cache::{codec, key::CacheKey},
    foundation::{
        error::{BackdropError, BackdropResult},
        format::OutputFormat,
    },
};

const FINGERPRINT_DIR_LEN: usize = 16;
const TEMP_PREFIX: &str = ".partial-";

/// Write-once image cache rooted at a directory.
///
/// Entries live at `<root>/<fingerprint prefix>/<key stem>.<ext>`. A new
/// asset fingerprint therefore addresses a fresh set of paths; entries under
/// old fingerprints are left in place and never read again.
#[derive(Clone, Debug)]
pub struct CachedImageStore {
    root: PathBuf,
}

impl CachedImageStore {
    /// Open (creating if needed) a store at `root`.
    pub fn open(root: impl Into<PathBuf>) -> BackdropResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            BackdropError::storage(format!("create cache dir '{}': {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic location of the entry for `(key, fingerprint, format)`.
    pub fn entry_path(&self, key: &CacheKey, fingerprint: &str, format: OutputFormat) -> PathBuf {
        let fp_dir = fingerprint.get(..FINGERPRINT_DIR_LEN).unwrap_or(fingerprint);
        self.root
            .join(fp_dir)
            .join(format!("{}.{}", key.file_stem(), format.extension()))
    }

    /// Bytes of an existing entry, or `None` if it was never written.
    pub fn lookup(
        &self,
        key: &CacheKey,
        fingerprint: &str,
        format: OutputFormat,
    ) -> BackdropResult<Option<Vec<u8>>> {
        let path = self.entry_path(key, fingerprint, format);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackdropError::storage(format!(
                "read '{}': {e}",
                path.display()
            ))),
        }
    }

    /// Return the canonical PNG for `(key, fingerprint)`, producing it on a miss.
    ///
    /// `producer` is not called when the entry exists. Nothing is written if it fails.
    pub fn ensure_canonical<F>(
        &self,
        key: &CacheKey,
        fingerprint: &str,
        producer: F,
    ) -> BackdropResult<Vec<u8>>
    where
        F: FnOnce() -> BackdropResult<RgbaImage>,
    {
        if let Some(bytes) = self.lookup(key, fingerprint, OutputFormat::CANONICAL)? {
            tracing::debug!(%key, "canonical cache hit");
            return Ok(bytes);
        }
        let image = producer()?;
        let bytes = codec::encode(&image, OutputFormat::CANONICAL)?;
        self.publish(&self.entry_path(key, fingerprint, OutputFormat::CANONICAL), bytes)
    }

    /// Return `format` bytes derived from `canonical`, transcoding on a miss.
    pub fn derive_format(
        &self,
        key: &CacheKey,
        fingerprint: &str,
        format: OutputFormat,
        canonical: &[u8],
    ) -> BackdropResult<Vec<u8>> {
        if format.is_canonical() {
            return Ok(canonical.to_vec());
        }
        if let Some(bytes) = self.lookup(key, fingerprint, format)? {
            tracing::debug!(%key, %format, "derived cache hit");
            return Ok(bytes);
        }
        tracing::debug!(%key, %format, "deriving from canonical");
        let bytes = codec::transcode(canonical, format)?;
        self.publish(&self.entry_path(key, fingerprint, format), bytes)
    }

    /// Atomically make `bytes` visible at `path` unless an entry already exists.
    ///
    /// Returns the bytes now stored at `path`, which are the earlier entry's
    /// if another writer got there first.
    fn publish(&self, path: &Path, bytes: Vec<u8>) -> BackdropResult<Vec<u8>> {
        let storage_err = |what: &str, e: std::io::Error| {
            BackdropError::storage(format!("{what} '{}': {e}", path.display()))
        };

        let dir = path.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(dir).map_err(|e| storage_err("create dir for", e))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(|e| storage_err("create temp file for", e))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| storage_err("write temp file for", e))?;

        match tmp.persist_noclobber(path) {
            Ok(_) => Ok(bytes),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "entry already published");
                std::fs::read(path).map_err(|e| storage_err("read", e))
            }
            Err(e) => Err(storage_err("publish", e.error)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
