//! The fixed layout of artwork copies on a 1334×750 template.

use crate::warp::quad::Quad;

/// Source edge length at which the skew magnitudes below apply verbatim.
pub const REFERENCE_EDGE: f64 = 512.0;
/// Skew of the far (side) cards for a [`REFERENCE_EDGE`]-tall source.
pub const FAR_SHIFT: f64 = 30.0;
/// Skew of the near (front) cards for a [`REFERENCE_EDGE`]-wide source.
pub const NEAR_SHIFT: f64 = 10.0;

/// Layer a placement is drawn into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Shows through only where the side mask allows.
    Far,
    /// Composited directly over the base template.
    Near,
}

/// Destination quad family used to warp the artwork.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QuadShape {
    /// Vertical perspective shrink of the left edge.
    Far,
    /// Horizontal shear leaning right.
    Near,
    /// [`QuadShape::Near`] reflected top-to-bottom, leaning left.
    NearMirrored,
}

impl QuadShape {
    /// Concrete quad for a `width × height` source.
    ///
    /// Shifts scale with the skewed edge, so every non-empty source gets a
    /// proper quad with the same proportions.
    pub fn quad(self, width: u32, height: u32) -> Quad {
        let far_shift = scaled_shift(FAR_SHIFT, height);
        let near_shift = scaled_shift(NEAR_SHIFT, width);
        match self {
            Self::Far => Quad::far_skew(width, height, far_shift),
            Self::Near => Quad::near_skew(width, height, near_shift),
            Self::NearMirrored => {
                Quad::near_skew(width, height, near_shift).mirrored_vertically(height)
            }
        }
    }
}

/// One warped, resized, translucent copy of the artwork.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Warp applied at the source's native size.
    pub shape: QuadShape,
    /// Size after warping.
    pub resize_to: (u32, u32),
    /// Flat alpha written over every pixel of the copy.
    pub opacity: f32,
    /// Top-left corner on the layer canvas.
    pub paste_origin: (i64, i64),
    /// Target layer.
    pub layer: Layer,
}

/// Every placement, in paste order.
pub static PLACEMENTS: [Placement; 4] = [
    Placement {
        shape: QuadShape::Far,
        resize_to: (240, 240),
        opacity: 0.7,
        paste_origin: (0, 255),
        layer: Layer::Far,
    },
    Placement {
        shape: QuadShape::Far,
        resize_to: (240, 240),
        opacity: 0.7,
        paste_origin: (1094, 255),
        layer: Layer::Far,
    },
    Placement {
        shape: QuadShape::Near,
        resize_to: (420, 420),
        opacity: 0.95,
        paste_origin: (247, 165),
        layer: Layer::Near,
    },
    Placement {
        shape: QuadShape::NearMirrored,
        resize_to: (420, 420),
        opacity: 0.95,
        paste_origin: (667, 165),
        layer: Layer::Near,
    },
];

fn scaled_shift(shift: f64, edge: u32) -> f64 {
    shift * f64::from(edge) / REFERENCE_EDGE
}

/// Placements drawn into `layer`, in paste order.
pub fn placements_on(layer: Layer) -> impl Iterator<Item = &'static Placement> {
    PLACEMENTS.iter().filter(move |p| p.layer == layer)
}
