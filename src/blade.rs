use crate::geometry::common::mean_radius;
use crate::geometry::curve3::Curve3;
use ncollide2d::na::Point3;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

pub mod intersect;
pub mod registry;

/// One of the two airfoil surfaces of a blade
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Pressure,
    Suction,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Pressure => "pressure",
            Side::Suction => "suction",
        }
    }

    /// Recognizes a side marker at the start of a line, ignoring leading whitespace
    pub fn from_marker(line: &str) -> Option<Side> {
        let line = line.trim_start();
        if line.starts_with("suction") {
            Some(Side::Suction)
        } else if line.starts_with("pressure") {
            Some(Side::Pressure)
        } else {
            None
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pressure" => Ok(Side::Pressure),
            "suction" => Ok(Side::Suction),
            other => Err(other.to_string()),
        }
    }
}

/// A blade surface curve: a section profile of one side of one blade, together with the
/// cylindrical radius used to rank it along the blade span. Curves are either built from a parsed
/// geometry section, or synthesized at an exact radius for a cooling injection.
#[derive(Clone, Debug)]
pub struct BladeCurve {
    curve: Curve3,
    blade: String,
    side: Side,
    section: String,
    radius: f64,
    injection: Option<usize>,
}

impl BladeCurve {
    /// A curve from a parsed section, ranked by the mean cylindrical radius of its points
    pub fn from_section(blade: &str, side: Side, number: u32, points: Vec<Point3<f64>>) -> Self {
        let section = format!("section_{}", number);
        let radius = mean_radius(&points);
        BladeCurve {
            curve: Curve3::new(format!("{}_{}_{}", blade, side, section), points),
            blade: blade.to_string(),
            side,
            section,
            radius,
            injection: None,
        }
    }

    /// A synthetic curve lying at the exact target radius of injection `index`
    pub fn injection(
        blade: &str,
        side: Side,
        index: usize,
        radius: f64,
        points: Vec<Point3<f64>>,
    ) -> Self {
        BladeCurve {
            curve: Curve3::new(
                format!("{}_{}_radius_{}_injection_{}", blade, side, radius, index),
                points,
            ),
            blade: blade.to_string(),
            side,
            section: format!("injection_{}_radius_{}", index, radius),
            radius,
            injection: Some(index),
        }
    }

    pub fn blade(&self) -> &str {
        &self.blade
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Index of the injection request a synthetic curve was built for
    pub fn injection_index(&self) -> Option<usize> {
        self.injection
    }

    pub fn is_injection(&self) -> bool {
        self.injection.is_some()
    }

    pub fn matches(&self, blade: &str, side: Side) -> bool {
        self.blade == blade && self.side == side
    }
}

impl Deref for BladeCurve {
    type Target = Curve3;

    fn deref(&self) -> &Self::Target {
        &self.curve
    }
}

impl Display for BladeCurve {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Curve: {}", self.name())?;
        writeln!(
            f,
            "Blade: {};\tSide: {};\tSection: {}",
            self.blade, self.side, self.section
        )?;
        writeln!(f, "Radius: {}", self.radius)?;
        writeln!(f, "{:<20}{:^}{:>17}", "x", "y", "z")?;
        for p in self.points() {
            let (x, y, z) = (
                format!("{:.4}", p.x),
                format!("{:.4}", p.y),
                format!("{:.4}", p.z),
            );
            writeln!(f, "{:<10}\t\t{:^}\t\t{:>10}", x, y, z)?;
        }

        Ok(())
    }
}
