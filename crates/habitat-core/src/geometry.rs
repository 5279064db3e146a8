use serde::{Deserialize, Serialize};

/// Tolerance used by the overlap test so that touching edges do not count.
pub const OVERLAP_EPSILON: f64 = 1e-9;

/// A 2D point in envelope-local coordinates (meters, plan centre at the origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Rotate the point about the origin by `degrees` (counter-clockwise).
    pub fn rotated(&self, degrees: f64) -> Self {
        let rad = degrees.to_radians();
        let (sin_r, cos_r) = rad.sin_cos();
        Self {
            x: self.x * cos_r - self.y * sin_r,
            y: self.x * sin_r + self.y * cos_r,
        }
    }

    /// Bearing of the vector from `origin` to this point, in degrees.
    pub fn bearing_from(&self, origin: &Point) -> f64 {
        (self.y - origin.y).atan2(self.x - origin.x).to_degrees()
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Normalize an angle in degrees to the half-open range (-180, 180].
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let mut a = degrees % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// The rectangle a module occupies on its floor, rotated about its own centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub center: Point,
    /// Extent along the local x axis.
    pub width: f64,
    /// Extent along the local y axis.
    pub depth: f64,
    pub rotation_deg: f64,
}

impl Footprint {
    pub fn new(center: Point, width: f64, depth: f64, rotation_deg: f64) -> Self {
        Self {
            center,
            width,
            depth,
            rotation_deg,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.depth
    }

    /// The four corners after rotation, in order NW, NE, SE, SW of the local frame
    /// (local y grows "south", matching screen space).
    pub fn corners(&self) -> [Point; 4] {
        let hw = self.width / 2.0;
        let hd = self.depth / 2.0;
        [
            Point::new(-hw, -hd),
            Point::new(hw, -hd),
            Point::new(hw, hd),
            Point::new(-hw, hd),
        ]
        .map(|p| {
            let r = p.rotated(self.rotation_deg);
            r.translate(self.center.x, self.center.y)
        })
    }

    pub fn bbox(&self) -> BBox {
        let corners = self.corners();
        // Four corners are never empty.
        BBox::from_points(&corners).unwrap_or(BBox::new(self.center, self.center))
    }

    /// Local edge directions (unit vectors) of the rotated rectangle.
    fn axes(&self) -> [Point; 2] {
        [
            Point::new(1.0, 0.0).rotated(self.rotation_deg),
            Point::new(0.0, 1.0).rotated(self.rotation_deg),
        ]
    }

    /// Oriented-box overlap via the separating-axis theorem. Rectangles that only
    /// share an edge or a corner do not overlap.
    pub fn overlaps(&self, other: &Footprint) -> bool {
        if !self.bbox().intersects(&other.bbox()) {
            return false;
        }
        let mine = self.corners();
        let theirs = other.corners();
        for axis in self.axes().iter().chain(other.axes().iter()) {
            let (a_min, a_max) = project(&mine, axis);
            let (b_min, b_max) = project(&theirs, axis);
            if a_max <= b_min + OVERLAP_EPSILON || b_max <= a_min + OVERLAP_EPSILON {
                return false;
            }
        }
        true
    }
}

fn project(points: &[Point; 4], axis: &Point) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for p in points {
        let d = p.x * axis.x + p.y * axis.y;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-180.0) - 180.0).abs() < 1e-10);
        assert!((normalize_angle(540.0) - 180.0).abs() < 1e-10);
        assert!((normalize_angle(270.0) + 90.0).abs() < 1e-10);
        assert!((normalize_angle(-190.0) - 170.0).abs() < 1e-10);
        assert!((normalize_angle(45.0) - 45.0).abs() < 1e-10);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }

    #[test]
    fn test_footprint_corners_rotated() {
        let fp = Footprint::new(Point::new(1.0, 1.0), 2.0, 4.0, 90.0);
        let bbox = fp.bbox();
        assert!((bbox.width() - 4.0).abs() < 1e-9);
        assert!((bbox.height() - 2.0).abs() < 1e-9);
        assert!((fp.area() - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_axis_aligned_overlap() {
        let a = Footprint::new(Point::new(0.0, 0.0), 2.0, 2.0, 0.0);
        let b = Footprint::new(Point::new(1.5, 0.0), 2.0, 2.0, 0.0);
        let c = Footprint::new(Point::new(2.0, 0.0), 2.0, 2.0, 0.0);
        assert!(a.overlaps(&b));
        // Shared edge only.
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_rotated_overlap_uses_oriented_boxes() {
        // Bounding boxes intersect but the rotated diamond stays clear of the square.
        let square = Footprint::new(Point::new(0.0, 0.0), 2.0, 2.0, 0.0);
        let diamond = Footprint::new(Point::new(2.3, 2.3), 2.0, 2.0, 45.0);
        assert!(square.bbox().intersects(&diamond.bbox()));
        assert!(!square.overlaps(&diamond));

        let closer = Footprint::new(Point::new(1.5, 1.5), 2.0, 2.0, 45.0);
        assert!(square.overlaps(&closer));
    }
}
