//! Ray batches threaded through the propagation engine.
//!
//! Purpose
//! -------
//! Carry a batch of exact rays of one wavelength from a common field point
//! through the element chain. A batch is created per trace request, consumed
//! by the engine, and returned transformed by every element it visits.
//!
//! Conventions
//! -----------
//! - `positions` and `end_positions` are `n × 3` arrays in the local frame
//!   of the node the batch last visited (its vertex at the origin).
//! - `angles` are `n × 3` unit direction cosines.
//! - Vignetting is data: a ray that misses a surface gets NaN coordinates,
//!   a ray outside a clear aperture keeps its coordinates; both set the
//!   `vignetted` flag, and neither aborts the trace.
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::optics::errors::{OpticsError, OpticsResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Rays {
    /// Wavelength in metres.
    pub wavelength: f64,
    /// Relative field coordinates of the point the batch was launched from.
    pub height: [f64; 2],
    /// Refractive index of the medium the rays currently travel in.
    pub refractive_index: f64,
    pub positions: Array2<f64>,
    pub angles: Array2<f64>,
    /// Intersection points with the last visited node.
    pub end_positions: Array2<f64>,
    pub vignetted: Array1<bool>,
}

impl Rays {
    /// An empty batch; fill it with [`Rays::with_launch`] or [`Rays::set_launch`].
    pub fn new(wavelength: f64, height: [f64; 2]) -> Self {
        Self {
            wavelength,
            height,
            refractive_index: 1.0,
            positions: Array2::zeros((0, 3)),
            angles: Array2::zeros((0, 3)),
            end_positions: Array2::zeros((0, 3)),
            vignetted: Array1::from_elem(0, false),
        }
    }

    pub fn with_launch(
        mut self, positions: Array2<f64>, angles: Array2<f64>,
    ) -> OpticsResult<Self> {
        self.set_launch(positions, angles)?;
        Ok(self)
    }

    /// Replace the launch state; resets end positions and vignetting.
    ///
    /// # Errors
    /// [`OpticsError::RayShapeMismatch`] unless both arrays are `n × 3`.
    pub fn set_launch(&mut self, positions: Array2<f64>, angles: Array2<f64>) -> OpticsResult<()> {
        if positions.ncols() != 3 || angles.ncols() != 3 || positions.nrows() != angles.nrows() {
            return Err(OpticsError::RayShapeMismatch {
                positions: positions.dim(),
                angles: angles.dim(),
            });
        }
        let n = positions.nrows();
        self.end_positions = positions.clone();
        self.positions = positions;
        self.angles = angles;
        self.vignetted = Array1::from_elem(n, false);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rays that have not been vignetted.
    pub fn valid_count(&self) -> usize {
        self.vignetted.iter().filter(|v| !**v).count()
    }

    /// Transverse `(x, y)` end positions of the unvignetted rays.
    pub fn valid_end_xy(&self) -> Array2<f64> {
        let rows: Vec<usize> =
            (0..self.len()).filter(|&i| !self.vignetted[i]).collect();
        self.end_positions.select(Axis(0), &rows).slice_move(ndarray::s![.., 0..2])
    }

    pub(crate) fn row(a: &Array2<f64>, i: usize) -> [f64; 3] {
        let r: ArrayView1<f64> = a.row(i);
        [r[0], r[1], r[2]]
    }
}
