use ncollide2d::na::Point3;

/// A segment index paired with the local fraction along that segment
pub struct IndexAndFraction {
    pub i: usize,
    pub f: f64,
}

impl IndexAndFraction {
    pub fn new(i: usize, f: f64) -> Self {
        Self { i, f }
    }
}

/// The distance of a point from the z axis, sqrt(x² + y²). This is the blade span coordinate.
pub fn cylindrical_radius(p: &Point3<f64>) -> f64 {
    p.x.hypot(p.y)
}

/// Mean cylindrical radius of a set of points, or 0.0 when there are none
pub fn mean_radius(points: &[Point3<f64>]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }

    points.iter().map(cylindrical_radius).sum::<f64>() / points.len() as f64
}

/// Linear interpolation between two points, with each coordinate treated independently. Values
/// of `t` outside of [0, 1] extrapolate along the line.
pub fn lerp(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    a + (b - a) * t
}
