use super::registry::CurveRegistry;
use super::{BladeCurve, Side};
use crate::errors::{InjectionError, SolverError};
use crate::geometry::common::{cylindrical_radius, lerp};
use crate::geometry::curve3::Curve3;
use ncollide2d::na::Point3;
use serde::Serialize;

/// Bounds and tolerance for the radial intersection search
#[derive(Copy, Clone, Debug, Serialize)]
pub struct SolverLimits {
    /// Accepted difference between the radius of the result and the target radius
    pub tol: f64,

    /// Maximum number of interval halvings once the target is bracketed
    pub max_bisections: usize,

    /// Maximum number of steps taken to extend the line towards a target outside of it
    pub max_extrapolations: usize,
}

impl Default for SolverLimits {
    fn default() -> Self {
        SolverLimits {
            tol: 1e-6,
            max_bisections: 200,
            max_extrapolations: 1000,
        }
    }
}

/// Finds the point on the straight line through `p1` and `p2` whose cylindrical radius equals
/// `target`.
///
/// When the target radius does not lie between the radii of the two points, the segment is
/// repeatedly shifted by its own length past the end whose radius is closer to the target, until
/// the target is bracketed. The bracketed segment is then bisected, keeping the half whose ends
/// straddle the target, until the midpoint radius is within tolerance.
///
/// Radius is assumed to change monotonically along the segment. A shift which does not bring the
/// line closer to the target fails with `NonMonotonic`, and exhausting either bound fails with
/// `NotConverged`, both carrying the last interval tried.
pub fn solve(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    target: f64,
    limits: &SolverLimits,
) -> Result<Point3<f64>, SolverError> {
    let f = |p: &Point3<f64>| cylindrical_radius(p) - target;

    let mut a = *p1;
    let mut b = *p2;
    let mut steps = 0;

    loop {
        let (fa, fb) = (f(&a), f(&b));
        if fa.abs() <= limits.tol {
            return Ok(a);
        }
        if fb.abs() <= limits.tol {
            return Ok(b);
        }
        if a == b {
            return Err(SolverError::DegenerateSegment(a));
        }
        if fa.signum() != fb.signum() {
            break;
        }

        if steps >= limits.max_extrapolations {
            return Err(SolverError::NotConverged {
                p1: a,
                p2: b,
                target,
                iterations: steps,
            });
        }
        steps += 1;

        let forward = fb.abs() < fa.abs();
        let (anchor, next) = if forward {
            (b, lerp(&a, &b, 2.0))
        } else {
            (a, lerp(&a, &b, -1.0))
        };

        let (f_anchor, f_next) = (f(&anchor), f(&next));
        if f_next.signum() == f_anchor.signum() && f_next.abs() >= f_anchor.abs() {
            return Err(SolverError::NonMonotonic { p1: a, p2: b, target });
        }

        (a, b) = if forward { (anchor, next) } else { (next, anchor) };
    }

    let mut fa = f(&a);
    for _ in 0..limits.max_bisections {
        let m = lerp(&a, &b, 0.5);
        let fm = f(&m);
        if fm.abs() <= limits.tol {
            return Ok(m);
        }

        if fm.signum() == fa.signum() {
            a = m;
            fa = fm;
        } else {
            b = m;
        }
    }

    Err(SolverError::NotConverged {
        p1: a,
        p2: b,
        target,
        iterations: steps + limits.max_bisections,
    })
}

/// Builds the points of a new section at the target radius by solving between index aligned
/// points of two bracketing curves. Unequal point counts are truncated to the shorter curve.
pub fn intersect_curves(
    c0: &Curve3,
    c1: &Curve3,
    target: f64,
    limits: &SolverLimits,
) -> Result<Vec<Point3<f64>>, SolverError> {
    if c0.points().len() != c1.points().len() {
        log::warn!(
            "{} has {} points and {} has {}, using the first {}",
            c0.name(),
            c0.points().len(),
            c1.name(),
            c1.points().len(),
            c0.points().len().min(c1.points().len())
        );
    }

    c0.points()
        .iter()
        .zip(c1.points())
        .map(|(p1, p2)| solve(p1, p2, target, limits))
        .collect()
}

/// Synthesizes the injection curve of a blade side at the given radius from the registered curves
/// bracketing it, registers it, and returns its registration index.
pub fn synthesize_injection(
    registry: &mut CurveRegistry,
    blade: &str,
    side: Side,
    index: usize,
    radius: f64,
    limits: &SolverLimits,
) -> Result<usize, InjectionError> {
    let points = {
        let (c0, c1) = registry.bracket(blade, side, radius)?;
        log::debug!(
            "injection {} at radius {} between {} ({}) and {} ({})",
            index,
            radius,
            c0.name(),
            c0.radius(),
            c1.name(),
            c1.radius()
        );
        intersect_curves(c0, c1, radius, limits)?
    };

    let curve = BladeCurve::injection(blade, side, index, radius, points);
    log::debug!("{}", curve);
    Ok(registry.register(curve))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    #[test]
    fn test_solve_between() {
        let result = solve(&p(0.0, 0.0, 0.0), &p(10.0, 0.0, 0.0), 5.0, &SolverLimits::default())
            .unwrap();

        assert_relative_eq!(5.0, cylindrical_radius(&result), epsilon = 1e-6);
        assert_relative_eq!(5.0, result.x, epsilon = 1e-6);
    }

    #[test]
    fn test_solve_extrapolates_forward() {
        let result = solve(&p(2.0, 0.0, 0.0), &p(4.0, 0.0, 0.0), 6.0, &SolverLimits::default())
            .unwrap();

        assert_relative_eq!(6.0, cylindrical_radius(&result), epsilon = 1e-6);
        assert_relative_eq!(6.0, result.x, epsilon = 1e-6);
    }

    #[test]
    fn test_solve_extrapolates_backward() {
        let result = solve(&p(4.0, 0.0, 2.0), &p(6.0, 0.0, 3.0), 1.0, &SolverLimits::default())
            .unwrap();

        assert_relative_eq!(1.0, result.x, epsilon = 1e-6);
        assert_relative_eq!(0.5, result.z, epsilon = 1e-6);
    }

    #[test]
    fn test_solve_far_extrapolation() {
        let result = solve(&p(1.0, 0.0, 0.0), &p(1.5, 0.0, 0.0), 40.25, &SolverLimits::default())
            .unwrap();

        assert_relative_eq!(40.25, result.x, epsilon = 1e-6);
    }

    #[test_case(5.5)]
    #[test_case(6.0)]
    #[test_case(7.5)]
    #[test_case(9.99)]
    fn test_solve_along_radial_line(target: f64) {
        // Radius grows linearly along this line, so the answer is known exactly
        let p1 = p(3.0, 4.0, 0.0);
        let p2 = p(6.0, 8.0, 1.0);
        let result = solve(&p1, &p2, target, &SolverLimits::default()).unwrap();
        let t = (target - 5.0) / 5.0;

        assert_relative_eq!(target, cylindrical_radius(&result), epsilon = 1e-6);
        assert_relative_eq!(3.0 + 3.0 * t, result.x, epsilon = 1e-5);
        assert_relative_eq!(4.0 + 4.0 * t, result.y, epsilon = 1e-5);
        assert_relative_eq!(t, result.z, epsilon = 1e-5);
    }

    #[test]
    fn test_solve_reversed_direction() {
        let result = solve(&p(0.0, 10.0, 0.0), &p(0.0, 2.0, 4.0), 4.0, &SolverLimits::default())
            .unwrap();

        assert_relative_eq!(4.0, result.y, epsilon = 1e-5);
        assert_relative_eq!(3.0, result.z, epsilon = 1e-5);
    }

    #[test]
    fn test_solve_constant_x() {
        let result = solve(&p(5.0, 0.0, 0.0), &p(5.0, 10.0, 0.0), 8.0, &SolverLimits::default())
            .unwrap();

        assert_relative_eq!(5.0, result.x, epsilon = 1e-12);
        assert_relative_eq!(39.0_f64.sqrt(), result.y, epsilon = 1e-5);
    }

    #[test]
    fn test_solve_endpoint_on_target() {
        let p2 = p(3.0, 4.0, 2.0);
        let result = solve(&p(1.0, 0.0, 0.0), &p2, 5.0, &SolverLimits::default()).unwrap();

        assert_eq!(p2, result);
    }

    #[test]
    fn test_solve_degenerate() {
        let a = p(3.0, 0.0, 0.0);
        let result = solve(&a, &a, 4.0, &SolverLimits::default());

        assert!(matches!(result, Err(SolverError::DegenerateSegment(_))));
    }

    #[test]
    fn test_solve_non_monotonic() {
        // The line passes the z axis at a distance of 5, so a radius of 3 is never reached
        let result = solve(&p(-1.0, 5.0, 0.0), &p(1.0, 5.0, 0.0), 3.0, &SolverLimits::default());

        assert!(matches!(result, Err(SolverError::NonMonotonic { .. })));
    }

    #[test]
    fn test_solve_extrapolation_bound() {
        let limits = SolverLimits {
            max_extrapolations: 3,
            ..SolverLimits::default()
        };
        let result = solve(&p(1.0, 0.0, 0.0), &p(2.0, 0.0, 0.0), 100.0, &limits);

        match result {
            Err(SolverError::NotConverged { p1, p2, iterations, .. }) => {
                assert_eq!(3, iterations);
                assert_relative_eq!(4.0, p1.x, epsilon = 1e-12);
                assert_relative_eq!(5.0, p2.x, epsilon = 1e-12);
            }
            _ => panic!("expected NotConverged"),
        }
    }

    #[test]
    fn test_solve_bisection_bound() {
        let limits = SolverLimits {
            max_bisections: 2,
            ..SolverLimits::default()
        };
        let result = solve(&p(0.0, 0.0, 0.0), &p(10.0, 0.0, 0.0), 1.0, &limits);

        assert!(matches!(
            result,
            Err(SolverError::NotConverged { iterations: 2, .. })
        ));
    }

    fn section(blade: &str, number: u32, r: f64) -> BladeCurve {
        let points = vec![
            p(r, 0.0, 0.0),
            p(r * 0.8, r * 0.6, 1.0),
            p(0.0, r, 2.0),
        ];
        BladeCurve::from_section(blade, Side::Suction, number, points)
    }

    #[test]
    fn test_intersect_curves() {
        let c0 = section("rb1", 1, 10.0);
        let c1 = section("rb1", 2, 20.0);
        let points = intersect_curves(&c0, &c1, 12.5, &SolverLimits::default()).unwrap();

        assert_eq!(3, points.len());
        for pt in points.iter() {
            assert_relative_eq!(12.5, cylindrical_radius(pt), epsilon = 1e-6);
        }
        assert_relative_eq!(12.5, points[0].x, epsilon = 1e-6);
        assert_relative_eq!(12.5, points[2].y, epsilon = 1e-6);
    }

    #[test]
    fn test_intersect_curves_truncates() {
        let c0 = section("rb1", 1, 10.0);
        let c1 = Curve3::new("short", vec![p(20.0, 0.0, 0.0), p(16.0, 12.0, 1.0)]);
        let points = intersect_curves(&c0, &c1, 15.0, &SolverLimits::default()).unwrap();

        assert_eq!(2, points.len());
    }

    #[test]
    fn test_synthesize_injection() {
        let mut registry = CurveRegistry::new();
        registry.register(section("rb1", 1, 10.0));
        registry.register(section("rb1", 2, 20.0));
        registry.register(section("rb1", 3, 30.0));

        let index =
            synthesize_injection(&mut registry, "rb1", Side::Suction, 1, 25.0, &SolverLimits::default())
                .unwrap();

        assert_eq!(3, index);
        let curve = registry.get(index).unwrap();
        assert_eq!("rb1_suction_radius_25_injection_1", curve.name());
        assert_relative_eq!(25.0, curve.radius(), epsilon = 1e-12);
        assert_relative_eq!(25.0, curve.points()[0].x, epsilon = 1e-6);
        assert_relative_eq!(1.0, curve.points()[1].z, epsilon = 1e-9);
        assert!(registry.injection("rb1", Side::Suction, 1, 25.0).is_ok());
    }

    #[test]
    fn test_synthesize_injection_beyond_sections() {
        let mut registry = CurveRegistry::new();
        registry.register(section("rb1", 1, 10.0));
        registry.register(section("rb1", 2, 20.0));

        let index =
            synthesize_injection(&mut registry, "rb1", Side::Suction, 1, 35.0, &SolverLimits::default())
                .unwrap();
        let curve = registry.get(index).unwrap();

        assert_relative_eq!(35.0, curve.points()[0].x, epsilon = 1e-6);
    }

    #[test]
    fn test_synthesize_injection_missing_bracket() {
        let mut registry = CurveRegistry::new();
        registry.register(section("rb1", 1, 10.0));

        let result =
            synthesize_injection(&mut registry, "rb1", Side::Suction, 1, 15.0, &SolverLimits::default());

        assert!(matches!(result, Err(InjectionError::Registry(_))));
        assert_eq!(1, registry.len());
    }
}
