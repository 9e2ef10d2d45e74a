//! Projective transforms between the image rectangle and a quad.

use crate::{
    foundation::error::{BackdropError, BackdropResult},
    warp::quad::Quad,
};

const EPS: f64 = 1e-12;

/// Row-major 3×3 projective matrix with `m[8]` normalized to `1` after solving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    m: [f64; 9],
}

impl Homography {
    /// Identity transform.
    pub const IDENTITY: Homography = Homography {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Solve the unique transform mapping the rectangle `[0,0]×[w,h]` onto `quad`.
    ///
    /// Corners correspond in TL, TR, BR, BL order.
    pub fn from_rect_to_quad(width: f64, height: f64, quad: &Quad) -> BackdropResult<Self> {
        let src = [[0.0, 0.0], [width, 0.0], [width, height], [0.0, height]];
        Self::from_correspondences(&src, &quad.corners)
    }

    /// Solve the transform mapping each `src[i]` to `dst[i]`.
    pub fn from_correspondences(src: &[[f64; 2]; 4], dst: &[[f64; 2]; 4]) -> BackdropResult<Self> {
        let mut a = [[0.0f64; 9]; 8];
        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            let [x, y] = *s;
            let [u, v] = *d;
            a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, u];
            a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y, v];
        }
        let h = solve_8x8(a).ok_or_else(|| {
            BackdropError::validation(format!("degenerate warp quad {:?}", dst))
        })?;
        let out = Self {
            m: [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0],
        };
        if out.determinant().abs() < EPS {
            return Err(BackdropError::validation(format!(
                "degenerate warp quad {:?}",
                dst
            )));
        }
        Ok(out)
    }

    fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
            + m[2] * (m[3] * m[7] - m[4] * m[6])
    }

    /// Inverse transform, if the matrix is invertible.
    pub fn inverse(&self) -> BackdropResult<Self> {
        let m = &self.m;
        let c00 = m[4] * m[8] - m[5] * m[7];
        let c01 = m[5] * m[6] - m[3] * m[8];
        let c02 = m[3] * m[7] - m[4] * m[6];
        let det = self.determinant();
        if det.abs() < EPS {
            return Err(BackdropError::validation("homography is not invertible"));
        }
        let inv_det = 1.0 / det;
        Ok(Self {
            m: [
                c00 * inv_det,
                (m[2] * m[7] - m[1] * m[8]) * inv_det,
                (m[1] * m[5] - m[2] * m[4]) * inv_det,
                c01 * inv_det,
                (m[0] * m[8] - m[2] * m[6]) * inv_det,
                (m[2] * m[3] - m[0] * m[5]) * inv_det,
                c02 * inv_det,
                (m[1] * m[6] - m[0] * m[7]) * inv_det,
                (m[0] * m[4] - m[1] * m[3]) * inv_det,
            ],
        })
    }

    /// Map a point; `None` when it lands on the line at infinity.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let m = &self.m;
        let w = m[6] * x + m[7] * y + m[8];
        if w.abs() < EPS {
            return None;
        }
        Some((
            (m[0] * x + m[1] * y + m[2]) / w,
            (m[3] * x + m[4] * y + m[5]) / w,
        ))
    }

    /// Raw matrix coefficients.
    pub fn coeffs(&self) -> [f64; 9] {
        self.m
    }
}

/// Gaussian elimination with partial pivoting on an augmented 8×9 system.
fn solve_8x8(mut a: [[f64; 9]; 8]) -> Option<[f64; 8]> {
    for col in 0..8 {
        let pivot = (col..8).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < EPS {
            return None;
        }
        a.swap(col, pivot);
        for row in (col + 1)..8 {
            let f = a[row][col] / a[col][col];
            if f == 0.0 {
                continue;
            }
            for k in col..9 {
                a[row][k] -= f * a[col][k];
            }
        }
    }

    let mut x = [0.0f64; 8];
    for row in (0..8).rev() {
        let mut acc = a[row][8];
        for k in (row + 1)..8 {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
#[path = "../../tests/unit/warp/homography.rs"]
mod tests;
