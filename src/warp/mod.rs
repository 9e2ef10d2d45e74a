//! Perspective resampling of a rectangular image onto a destination quad.

pub mod homography;
pub mod quad;
