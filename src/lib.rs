//! Template background generation.
//!
//! A source image is warped into four perspective copies, layered over a
//! template base, masked and cropped into a fixed-size background. Results are
//! cached on disk per (key, asset fingerprint, format) and concurrent requests
//! for the same output share a single composition.

#![forbid(unsafe_code)]

pub mod assets;
pub mod cache;
pub mod compose;
pub mod foundation;
pub mod service;
pub mod warp;

pub use assets::bundle::{AssetBundle, AssetBytes, AssetPaths, AssetSet};
pub use assets::decode::decode_source;
pub use cache::codec::{encode, transcode};
pub use cache::key::CacheKey;
pub use cache::store::CachedImageStore;
pub use compose::compositor::{compose, crop_band};
pub use compose::placement::{Layer, PLACEMENTS, Placement, QuadShape};
pub use foundation::error::{BackdropError, BackdropResult};
pub use foundation::format::OutputFormat;
pub use foundation::math::sha256_hex;
pub use service::config::ServiceConfig;
pub use service::generator::{GeneratedImage, GenerationService, GenerationStats, ServiceOpts};
pub use service::inflight::InFlight;
pub use service::source::{BytesSource, FileSource, FnSource, ImageSource, SourceProvider};
pub use warp::homography::Homography;
pub use warp::quad::{Quad, warp};

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
mod test_support;
