//! Layered composition of warped artwork copies onto the template.

pub mod blend;
pub mod compositor;
pub mod placement;
