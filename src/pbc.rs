use crate::error::{AnalysisError, AnalysisResult};
use coordination_common::Vec3;

/// Cubic periodic box centered on the origin, spanning `[-half_length, half_length)` per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicBox {
    half_length: f64,
    side: f64,
}

impl PeriodicBox {
    pub fn new(half_length: f64) -> AnalysisResult<Self> {
        if !(half_length > 0.0) || !half_length.is_finite() {
            return Err(AnalysisError::InvalidParameter(format!(
                "box half length must be positive, got {}",
                half_length
            )));
        }
        Ok(Self {
            half_length,
            side: 2.0 * half_length,
        })
    }

    pub fn half_length(&self) -> f64 {
        self.half_length
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    /// Shifts a raw dump position by `+half_length` and folds it into `[0, side)`.
    #[inline]
    pub fn wrap(&self, position: Vec3) -> Vec3 {
        position.map(|c| {
            let folded = (c + self.half_length).rem_euclid(self.side);
            // rem_euclid can round up to `side` for tiny negative inputs.
            if folded >= self.side { 0.0 } else { folded }
        })
    }

    /// Moves one wrapped coordinate by a box side towards `reference` when they are
    /// more than half a box apart on that axis.
    #[inline]
    pub fn nearest_image_coord(&self, coord: f64, reference: f64) -> f64 {
        if (coord - reference).abs() > self.half_length {
            if coord > reference {
                return coord - self.side;
            } else if coord < reference {
                return coord + self.side;
            }
        }
        coord
    }

    /// Per-axis nearest image of a wrapped position relative to a wrapped reference.
    #[inline]
    pub fn nearest_image(&self, position: Vec3, reference: Vec3) -> Vec3 {
        position.zip_map(reference, |c, r| self.nearest_image_coord(c, r))
    }

    /// Minimum-image separation between two raw dump positions.
    pub fn distance(&self, a: Vec3, b: Vec3) -> f64 {
        let reference = self.wrap(b);
        self.nearest_image(self.wrap(a), reference).distance(reference)
    }
}
