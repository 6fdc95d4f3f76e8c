use crate::algorithms::first_index_at_or_above;
use crate::errors::CurveError;
use crate::geometry::common::{lerp, IndexAndFraction};
use itertools::Itertools;
use ncollide2d::na::{distance, Point3};
use std::cell::OnceCell;

/// Normalized positions this far past 1.0 are accepted as floating point overshoot
const FRACTION_TOL: f64 = 1e-9;

#[derive(Clone, Debug)]
struct Lengths {
    segments: Vec<f64>,
    cumulative: Vec<f64>,
}

/// A Curve3 is a 3 dimensional polygonal chain built from an ordered list of points, with
/// straight edges between consecutive points. Point order defines the direction of the curve and
/// is never changed. Positions along the curve are addressed by normalized arc length, so that
/// unevenly spaced source points do not distort placement.
#[derive(Clone, Debug)]
pub struct Curve3 {
    name: String,
    points: Vec<Point3<f64>>,
    lengths: OnceCell<Lengths>,
}

impl Curve3 {
    pub fn new(name: impl Into<String>, points: Vec<Point3<f64>>) -> Self {
        Curve3 {
            name: name.into(),
            points,
            lengths: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    fn lengths(&self) -> &Lengths {
        self.lengths.get_or_init(|| {
            let segments: Vec<f64> = self
                .points
                .iter()
                .tuple_windows()
                .map(|(a, b)| distance(a, b))
                .collect();

            let mut total = 0.0;
            let cumulative = segments
                .iter()
                .map(|l| {
                    total += l;
                    total
                })
                .collect();

            Lengths {
                segments,
                cumulative,
            }
        })
    }

    /// The Euclidean length of each edge, edge i joining point i and point i + 1. Computed on the
    /// first call and reused afterwards.
    pub fn segment_lengths(&self) -> &[f64] {
        &self.lengths().segments
    }

    /// Total length of the curve, or None when the curve has fewer than two points and so has no
    /// segments to measure.
    pub fn full_length(&self) -> Option<f64> {
        self.lengths().cumulative.last().copied()
    }

    /// Finds the segment containing the normalized position `s` and the local fraction along it.
    /// The segment is the first one whose inclusive cumulative length reaches the target length,
    /// or the last segment if none does.
    fn at_fraction(&self, s: f64) -> Result<IndexAndFraction, CurveError> {
        if self.points.len() < 2 {
            return Err(CurveError::NotEnoughPoints);
        }

        if !(0.0..=1.0 + FRACTION_TOL).contains(&s) {
            return Err(CurveError::ParameterOutOfRange { value: s });
        }

        let full = self.full_length().ok_or(CurveError::NotEnoughPoints)?;
        if full <= 0.0 {
            return Err(CurveError::ZeroLength);
        }

        let lengths = self.lengths();
        let target = s * full;
        let i = first_index_at_or_above(&lengths.cumulative, target);
        let before = if i == 0 { 0.0 } else { lengths.cumulative[i - 1] };
        let segment = lengths.segments[i];

        // Only a zero length first segment can be selected here, and only for s = 0
        let f = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };

        Ok(IndexAndFraction::new(i, f))
    }

    /// Converts a normalized arc length position in [0, 1] into absolute coordinates
    pub fn absolute_position(&self, s: f64) -> Result<Point3<f64>, CurveError> {
        let IndexAndFraction { i, f } = self.at_fraction(s)?;
        Ok(lerp(&self.points[i], &self.points[i + 1], f))
    }
}
