//! Parametric pressure shell and the containment predicate.
//!
//! The plan centre of the shell is the origin of the envelope-local frame. An
//! ellipse has semi-axes `a` (x) and `b` (y); a cylinder stands upright with
//! radius `a`; a cube spans `[-a, a] x [-b, b]`. Floors are stacked from the
//! shell base, `floor_gap` meters apart.

use serde::{Deserialize, Serialize};

use crate::error::ShellError;
use crate::geometry::{Footprint, Point};

/// Degenerate dimensions are clamped to this value so geometry stays evaluable.
pub const MIN_SHELL_DIMENSION: f64 = 0.1;

/// Slack allowed on the containment boundary (touching the edge is contained).
const BOUNDARY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellShape {
    Ellipse,
    Cylinder,
    Cube,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellSpec {
    pub shape: ShellShape,
    /// Semi-axis along x (the radius for cylinders).
    pub semi_a: f64,
    /// Semi-axis along y. Ignored for cylinders.
    pub semi_b: f64,
    /// Overall interior height.
    pub height: f64,
    pub floor_count: u32,
    pub floor_gap: f64,
}

/// Plan extent of one floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanExtent {
    pub width: f64,
    pub depth: f64,
}

impl Default for ShellSpec {
    fn default() -> Self {
        Self::ellipse(10.0, 7.0, 3.0)
    }
}

impl ShellSpec {
    pub fn ellipse(semi_a: f64, semi_b: f64, height: f64) -> Self {
        Self {
            shape: ShellShape::Ellipse,
            semi_a,
            semi_b,
            height,
            floor_count: 1,
            floor_gap: height,
        }
    }

    pub fn cylinder(radius: f64, height: f64) -> Self {
        Self {
            shape: ShellShape::Cylinder,
            semi_a: radius,
            semi_b: radius,
            height,
            floor_count: 1,
            floor_gap: height,
        }
    }

    pub fn cube(half_width: f64, half_depth: f64, height: f64) -> Self {
        Self {
            shape: ShellShape::Cube,
            semi_a: half_width,
            semi_b: half_depth,
            height,
            floor_count: 1,
            floor_gap: height,
        }
    }

    pub fn with_floors(mut self, floor_count: u32, floor_gap: f64) -> Self {
        self.floor_count = floor_count;
        self.floor_gap = floor_gap;
        self
    }

    /// A copy with degenerate dimensions clamped to their minimums.
    pub fn sanitized(&self) -> Self {
        let clamp_dim = |v: f64| {
            if v.is_finite() {
                v.max(MIN_SHELL_DIMENSION)
            } else {
                MIN_SHELL_DIMENSION
            }
        };
        Self {
            shape: self.shape,
            semi_a: clamp_dim(self.semi_a),
            semi_b: clamp_dim(self.semi_b),
            height: clamp_dim(self.height),
            floor_count: self.floor_count.max(1),
            floor_gap: clamp_dim(self.floor_gap),
        }
    }

    /// Check that the floor stack fits inside the overall height.
    pub fn validate(&self) -> Result<(), ShellError> {
        let spec = self.sanitized();
        let stack = spec.floor_count as f64 * spec.floor_gap;
        if stack > spec.height + BOUNDARY_EPSILON {
            return Err(ShellError::FloorsExceedHeight {
                floor_count: spec.floor_count,
                floor_gap: spec.floor_gap,
                height: spec.height,
            });
        }
        Ok(())
    }

    /// Plan semi-axes after clamping; cylinders are circular.
    pub fn semi_axes(&self) -> (f64, f64) {
        let spec = self.sanitized();
        match spec.shape {
            ShellShape::Cylinder => (spec.semi_a, spec.semi_a),
            ShellShape::Ellipse | ShellShape::Cube => (spec.semi_a, spec.semi_b),
        }
    }

    /// Elevation of a floor's deck above the shell base, if the floor exists
    /// and its full gap lies within the shell height.
    pub fn floor_elevation(&self, floor: u32) -> Option<f64> {
        let spec = self.sanitized();
        if floor == 0 || floor > spec.floor_count {
            return None;
        }
        let base = (floor - 1) as f64 * spec.floor_gap;
        if base + spec.floor_gap > spec.height + BOUNDARY_EPSILON {
            return None;
        }
        Some(base)
    }

    /// Identical for every floor of this shell family.
    pub fn plan_extent_for_floor(&self, _floor: u32) -> PlanExtent {
        let (a, b) = self.semi_axes();
        PlanExtent {
            width: 2.0 * a,
            depth: 2.0 * b,
        }
    }

    /// Plan area of a single floor.
    pub fn plan_area(&self) -> f64 {
        let (a, b) = self.semi_axes();
        match self.shape {
            ShellShape::Cube => 4.0 * a * b,
            ShellShape::Ellipse | ShellShape::Cylinder => std::f64::consts::PI * a * b,
        }
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        let (a, b) = self.semi_axes();
        match self.shape {
            ShellShape::Cube => {
                p.x.abs() <= a + BOUNDARY_EPSILON && p.y.abs() <= b + BOUNDARY_EPSILON
            }
            ShellShape::Ellipse | ShellShape::Cylinder => {
                let ex = p.x / a;
                let ey = p.y / b;
                ex * ex + ey * ey <= 1.0 + BOUNDARY_EPSILON
            }
        }
    }

    /// True iff every rotated corner of the footprint lies inside the plan
    /// outline and the floor is within the shell's height range. The boundary
    /// is inclusive.
    pub fn contains_footprint(&self, floor: u32, footprint: &Footprint) -> bool {
        if self.floor_elevation(floor).is_none() {
            return false;
        }
        footprint.corners().iter().all(|c| self.contains_point(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f64, cy: f64, edge: f64) -> Footprint {
        Footprint::new(Point::new(cx, cy), edge, edge, 0.0)
    }

    #[test]
    fn test_ellipse_containment() {
        let shell = ShellSpec::ellipse(10.0, 7.0, 3.0);
        // Corners at (+-2, +-2) are well inside.
        assert!(shell.contains_footprint(1, &square(0.0, 0.0, 4.0)));
        // Translated so the east corners reach x = 10.5 on the major axis.
        let fp = Footprint::new(Point::new(9.5, 0.0), 2.0, 0.0, 0.0);
        assert!(!shell.contains_footprint(1, &fp));
        // One corner pushed outside.
        assert!(!shell.contains_footprint(1, &square(8.5, 4.0, 2.0)));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let cube = ShellSpec::cube(5.0, 4.0, 3.0);
        assert!(cube.contains_footprint(1, &square(3.0, 2.0, 4.0)));
        assert!(!cube.contains_footprint(1, &square(3.01, 2.0, 4.0)));

        let cyl = ShellSpec::cylinder(5.0, 3.0);
        // Degenerate footprint sitting exactly on the circle.
        let fp = Footprint::new(Point::new(4.0, 0.0), 2.0, 0.0, 0.0);
        assert!(cyl.contains_footprint(1, &fp));
    }

    #[test]
    fn test_cylinder_ignores_semi_b() {
        let mut cyl = ShellSpec::cylinder(4.0, 3.0);
        cyl.semi_b = 100.0;
        assert_eq!(cyl.semi_axes(), (4.0, 4.0));
        assert!(!cyl.contains_footprint(1, &square(0.0, 4.0, 1.0)));
    }

    #[test]
    fn test_rotation_affects_containment() {
        let cube = ShellSpec::cube(2.0, 2.0, 3.0);
        let aligned = Footprint::new(Point::new(0.0, 0.0), 4.0, 4.0, 0.0);
        let rotated = Footprint::new(Point::new(0.0, 0.0), 4.0, 4.0, 45.0);
        assert!(cube.contains_footprint(1, &aligned));
        assert!(!cube.contains_footprint(1, &rotated));
    }

    #[test]
    fn test_floor_range() {
        let shell = ShellSpec::ellipse(10.0, 7.0, 6.0).with_floors(2, 3.0);
        assert!(shell.validate().is_ok());
        assert_eq!(shell.floor_elevation(2), Some(3.0));
        assert!(shell.contains_footprint(2, &square(0.0, 0.0, 2.0)));
        assert!(!shell.contains_footprint(0, &square(0.0, 0.0, 2.0)));
        assert!(!shell.contains_footprint(3, &square(0.0, 0.0, 2.0)));

        let tall = ShellSpec::ellipse(10.0, 7.0, 5.0).with_floors(2, 3.0);
        assert!(matches!(
            tall.validate(),
            Err(ShellError::FloorsExceedHeight { .. })
        ));
    }

    #[test]
    fn test_degenerate_dimensions_are_clamped() {
        let shell = ShellSpec::cylinder(-1.0, 0.0);
        let s = shell.sanitized();
        assert_eq!(s.semi_a, MIN_SHELL_DIMENSION);
        assert_eq!(s.height, MIN_SHELL_DIMENSION);
        let extent = shell.plan_extent_for_floor(1);
        assert!((extent.width - 0.2).abs() < 1e-12);
        assert!(shell.contains_point(&Point::new(0.0, 0.0)));
    }
}
