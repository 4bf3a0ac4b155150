//! Rendering of mathematical data into drawing primitives under
//! arbitrary coordinate transforms.
//!
//! - [`transform`]: mappings from data to device coordinates, with
//!   domain errors, derivatives and boundary values at infinity.
//! - [`Sampling`]: adaptive sampling of parametric curves, refined
//!   until straight to within a device tolerance and broken at
//!   discontinuities.
//! - [`ticks`]: choice of axis ticks and of their labels for linear
//!   and logarithmic axes.
//! - [`draw`]: paths, curves, dots, histograms, error bars and axes
//!   drawn through a transform into a [`PathSink`].
//!
//! # Example
//!
//! ```
//! use adaptive_plot::{BoundingBox, Sampling, transform::Window};
//! let data = BoundingBox { xmin: -1., xmax: 1., ymin: -10., ymax: 10. };
//! let w = Window::new(0., 0., 100., 100., data).unwrap();
//! let s = Sampling::fun(|x| 1. / x, -1., 1.).seed(1).build(&w).unwrap();
//! // The pole at 0 splits the graph.
//! assert!(s.iter().any(|p| p.is_none()));
//! ```

/// Tolerance of the "nearly equal" tests (zero snapping of tick
/// labels, coincidence of ticks) and default step of the numerical
/// derivatives.
pub const EPSILON: f64 = 1e-5;

/// A box \[`xmin`, `xmax`\] × \[`ymin`, `ymax`\].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// The empty box: neutral element of [`BoundingBox::hull`].
    pub const EMPTY: BoundingBox = BoundingBox {
        xmin: f64::INFINITY,  xmax: f64::NEG_INFINITY,
        ymin: f64::INFINITY,  ymax: f64::NEG_INFINITY };

    /// Return `true` if the bounding box has a non-empty interior.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.xmin < self.xmax && self.ymin < self.ymax) // NAN ⟹ empty
    }

    /// Return `true` if the point (`x`, `y`) belongs to `self`
    /// (possibly on the boundary).
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.xmin <= x && x <= self.xmax && self.ymin <= y && y <= self.ymax
    }

    /// Return the smaller bounding-box containing both `self` and
    /// `other`.
    #[inline]
    pub fn hull(&self, other: &Self) -> Self {
        BoundingBox { xmin: self.xmin.min(other.xmin),
                      xmax: self.xmax.max(other.xmax),
                      ymin: self.ymin.min(other.ymin),
                      ymax: self.ymax.max(other.ymax) }
    }

    /// Smallest box containing `points` ([`BoundingBox::EMPTY`] if
    /// there are none).
    pub fn of_points<I>(points: I) -> Self
    where I: IntoIterator<Item = [f64; 2]> {
        points.into_iter().fold(Self::EMPTY, |bb, [x, y]| {
            BoundingBox { xmin: bb.xmin.min(x),  xmax: bb.xmax.max(x),
                          ymin: bb.ymin.min(y),  ymax: bb.ymax.max(y) }
        })
    }
}

pub mod error;
pub mod transform;
mod chain;
pub mod sampling;
pub mod path;
pub mod format;
pub mod ticks;
pub mod draw;
pub mod expr;

pub use error::{ConfigError, DomainError, Error};
pub use transform::{Boundary, Composite, Linear, Transform, Window};
pub use sampling::{Sample, Sampling};
pub use path::{Attributes, Path, PathSink};
pub use ticks::{TickPlanner, TickSet};
pub use format::number_format;


#[cfg(test)]
mod tests {
    use crate::BoundingBox;

    #[test]
    fn bounding_box() {
        let bb = BoundingBox::of_points([[1., 2.], [-1., 5.], [0., 3.]]);
        assert_eq!(bb, BoundingBox { xmin: -1., xmax: 1., ymin: 2., ymax: 5. });
        assert!(!bb.is_empty());
        assert!(bb.contains(0., 2.));
        assert!(!bb.contains(0., 1.));
        let e = BoundingBox::of_points([]);
        assert!(e.is_empty());
        assert_eq!(e.hull(&bb), bb);
        assert!(BoundingBox::of_points([[1., 1.]]).is_empty());
    }
}
