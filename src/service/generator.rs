use std::{
    panic::AssertUnwindSafe,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use image::{DynamicImage, RgbaImage};

use crate::{
    assets::bundle::{AssetBundle, AssetSet},
    cache::{key::CacheKey, store::CachedImageStore},
    compose::compositor::compose,
    foundation::{
        error::{BackdropError, BackdropResult},
        format::OutputFormat,
    },
    service::{
        inflight::{InFlight, SharedJob},
        source::SourceProvider,
    },
};

/// Runtime options for [`GenerationService`].
#[derive(Clone, Debug, Default)]
pub struct ServiceOpts {
    /// Compositing worker threads; `None` lets rayon decide.
    pub compose_threads: Option<usize>,
}

/// Encoded output of one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Encoded image bytes.
    pub bytes: Arc<[u8]>,
    /// Format of `bytes`.
    pub format: OutputFormat,
}

impl GeneratedImage {
    /// MIME type of [`GeneratedImage::bytes`].
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Counters accumulated since the service was built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Requests that passed format validation.
    pub requests: u64,
    /// Requests answered directly from a cached entry.
    pub cache_hits: u64,
    /// Source fetches performed.
    pub source_fetches: u64,
    /// Compositions performed.
    pub compositions: u64,
    /// Derived-format jobs that reached the transcoding step.
    pub derivations: u64,
}

#[derive(Default)]
struct Counters {
    requests: AtomicU64,
    cache_hits: AtomicU64,
    source_fetches: AtomicU64,
    compositions: AtomicU64,
    derivations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> GenerationStats {
        GenerationStats {
            requests: self.requests.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            source_fetches: self.source_fetches.load(Ordering::Relaxed),
            compositions: self.compositions.load(Ordering::Relaxed),
            derivations: self.derivations.load(Ordering::Relaxed),
        }
    }
}

type CanonicalKey = (CacheKey, String);
type DerivedKey = (CacheKey, String, OutputFormat);

struct Inner {
    assets: RwLock<AssetSet>,
    store: CachedImageStore,
    pool: rayon::ThreadPool,
    canonical_jobs: InFlight<CanonicalKey, Arc<[u8]>>,
    derived_jobs: InFlight<DerivedKey, Arc<[u8]>>,
    counters: Counters,
}

/// Serves generated backgrounds, composing each distinct output at most once.
///
/// Cheap to clone; clones share the cache, worker pool and in-flight jobs.
/// Generation must be driven from within a multi-threaded Tokio runtime.
#[derive(Clone)]
pub struct GenerationService {
    inner: Arc<Inner>,
}

impl GenerationService {
    /// Build a service over `assets`, persisting into `store`.
    pub fn new(
        assets: AssetSet,
        store: CachedImageStore,
        opts: ServiceOpts,
    ) -> BackdropResult<Self> {
        Ok(Self {
            inner: Arc::new(Inner {
                assets: RwLock::new(assets),
                store,
                pool: build_pool(opts.compose_threads)?,
                canonical_jobs: InFlight::new(),
                derived_jobs: InFlight::new(),
                counters: Counters::default(),
            }),
        })
    }

    /// Generate (or fetch from cache) the background for `key` in `format`.
    ///
    /// `format` is validated before any I/O. `source` is only fetched when no
    /// canonical entry exists for the key under the selected bundle.
    pub async fn generate(
        &self,
        source: impl SourceProvider + 'static,
        key: &str,
        variant: bool,
        format: &str,
    ) -> BackdropResult<GeneratedImage> {
        let format: OutputFormat = format.parse()?;
        let key = CacheKey::new(key)?;
        self.generate_format(source, key, variant, format).await
    }

    /// Same as [`GenerationService::generate`] with an already parsed format and key.
    #[tracing::instrument(skip(self, source, key), fields(key = %key))]
    pub async fn generate_format(
        &self,
        source: impl SourceProvider + 'static,
        key: CacheKey,
        variant: bool,
        format: OutputFormat,
    ) -> BackdropResult<GeneratedImage> {
        let inner = &self.inner;
        Counters::bump(&inner.counters.requests);

        let bundle = inner.bundle(variant);
        let key = key.with_variant(variant);
        let fingerprint = bundle.fingerprint().to_string();

        if let Some(bytes) = inner.lookup(&key, &fingerprint, format).await? {
            tracing::debug!("cache hit");
            Counters::bump(&inner.counters.cache_hits);
            return Ok(GeneratedImage {
                bytes: bytes.into(),
                format,
            });
        }

        let source: Arc<dyn SourceProvider> = Arc::new(source);
        let bytes = if format.is_canonical() {
            Inner::canonical_job(inner, key, bundle, source).await?
        } else {
            Inner::derived_job(inner, key, bundle, source, format).await?
        };
        Ok(GeneratedImage { bytes, format })
    }

    /// Replace both asset bundles, e.g. after the template files changed.
    ///
    /// Entries cached under the old fingerprints are no longer addressed.
    pub fn swap_assets(&self, assets: AssetSet) {
        let mut slot = self
            .inner
            .assets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        tracing::info!(
            default = %assets.default.short_fingerprint(),
            variant = %assets.variant.short_fingerprint(),
            "swapped asset bundles"
        );
        *slot = assets;
    }

    /// Currently active asset bundles.
    pub fn assets(&self) -> AssetSet {
        self.inner
            .assets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Backing cache store.
    pub fn store(&self) -> &CachedImageStore {
        &self.inner.store
    }

    /// Snapshot of the service counters.
    pub fn stats(&self) -> GenerationStats {
        self.inner.counters.snapshot()
    }
}

impl Inner {
    fn bundle(&self, variant: bool) -> Arc<AssetBundle> {
        let assets = self.assets.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(assets.select(variant))
    }

    async fn lookup(
        &self,
        key: &CacheKey,
        fingerprint: &str,
        format: OutputFormat,
    ) -> BackdropResult<Option<Vec<u8>>> {
        let store = self.store.clone();
        let (key, fingerprint) = (key.clone(), fingerprint.to_string());
        blocking(move || store.lookup(&key, &fingerprint, format)).await
    }

    fn canonical_job(
        this: &Arc<Self>,
        key: CacheKey,
        bundle: Arc<AssetBundle>,
        source: Arc<dyn SourceProvider>,
    ) -> SharedJob<Arc<[u8]>> {
        let job_key = (key.clone(), bundle.fingerprint().to_string());
        this.canonical_jobs.join_or_start(job_key, || {
            let this = Arc::clone(this);
            async move { this.produce_canonical(key, bundle, source).await }
        })
    }

    fn derived_job(
        this: &Arc<Self>,
        key: CacheKey,
        bundle: Arc<AssetBundle>,
        source: Arc<dyn SourceProvider>,
        format: OutputFormat,
    ) -> SharedJob<Arc<[u8]>> {
        let job_key = (key.clone(), bundle.fingerprint().to_string(), format);
        this.derived_jobs.join_or_start(job_key, || {
            let this = Arc::clone(this);
            async move { this.produce_derived(key, bundle, source, format).await }
        })
    }

    async fn produce_canonical(
        self: Arc<Self>,
        key: CacheKey,
        bundle: Arc<AssetBundle>,
        source: Arc<dyn SourceProvider>,
    ) -> BackdropResult<Arc<[u8]>> {
        let fingerprint = bundle.fingerprint().to_string();
        // An earlier job may have published since the caller's lookup.
        if let Some(bytes) = self
            .lookup(&key, &fingerprint, OutputFormat::CANONICAL)
            .await?
        {
            return Ok(bytes.into());
        }

        Counters::bump(&self.counters.source_fetches);
        let image = source.fetch().await?;
        let composed = self.compose_on_pool(image, bundle).await?;

        let store = self.store.clone();
        let bytes =
            blocking(move || store.ensure_canonical(&key, &fingerprint, move || Ok(composed)))
                .await?;
        Ok(bytes.into())
    }

    async fn produce_derived(
        self: Arc<Self>,
        key: CacheKey,
        bundle: Arc<AssetBundle>,
        source: Arc<dyn SourceProvider>,
        format: OutputFormat,
    ) -> BackdropResult<Arc<[u8]>> {
        let fingerprint = bundle.fingerprint().to_string();
        if let Some(bytes) = self.lookup(&key, &fingerprint, format).await? {
            return Ok(bytes.into());
        }

        let canonical = Self::canonical_job(&self, key.clone(), bundle, source).await?;
        Counters::bump(&self.counters.derivations);
        let store = self.store.clone();
        let bytes =
            blocking(move || store.derive_format(&key, &fingerprint, format, &canonical)).await?;
        Ok(bytes.into())
    }

    async fn compose_on_pool(
        &self,
        source: DynamicImage,
        bundle: Arc<AssetBundle>,
    ) -> BackdropResult<RgbaImage> {
        Counters::bump(&self.counters.compositions);
        tracing::info!(
            width = source.width(),
            height = source.height(),
            "composing new background"
        );
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.pool.spawn(move || {
            let out = std::panic::catch_unwind(AssertUnwindSafe(|| compose(&source, &bundle)))
                .unwrap_or_else(|_| {
                    Err(BackdropError::from(anyhow::anyhow!("compositing panicked")))
                });
            let _ = tx.send(out);
        });
        rx.await.map_err(|_| {
            BackdropError::from(anyhow::anyhow!("compositing worker dropped the job"))
        })?
    }
}

async fn blocking<T, F>(f: F) -> BackdropResult<T>
where
    F: FnOnce() -> BackdropResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BackdropError::from(anyhow::anyhow!("blocking task failed: {e}")))?
}

fn build_pool(threads: Option<usize>) -> BackdropResult<rayon::ThreadPool> {
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("backdrop-compose-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        BackdropError::from(anyhow::anyhow!("failed to build compositing thread pool: {e}"))
    })
}
