use super::{BladeCurve, Side};
use crate::errors::RegistryError;

/// Radii closer than this are considered the same when looking up injection curves
const RADIUS_TOL: f64 = 1e-9;

/// Holds every blade curve of one processing run, parsed and synthetic, in registration order.
/// Curves are only ever appended, and the order of registration drives bracket lookups.
#[derive(Default)]
pub struct CurveRegistry {
    curves: Vec<BladeCurve>,
}

impl CurveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a curve and returns its registration index. Names are not required to be unique.
    pub fn register(&mut self, curve: BladeCurve) -> usize {
        self.curves.push(curve);
        self.curves.len() - 1
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BladeCurve> {
        self.curves.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BladeCurve> {
        self.curves.iter()
    }

    /// Registration index of the first curve with the given name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.curves.iter().position(|c| c.name() == name)
    }

    /// Curves of one side of one blade, in registration order
    pub fn matching(&self, blade: &str, side: Side) -> Vec<&BladeCurve> {
        self.curves.iter().filter(|c| c.matches(blade, side)).collect()
    }

    /// Finds the pair of curves of a blade side to interpolate between for the given radius.
    ///
    /// Matching curves are scanned in registration order for the first one whose radius exceeds
    /// the target. That curve is returned second, with its predecessor first, or its successor
    /// first when it is the very first curve. When no curve exceeds the target, the last two
    /// curves are returned, last first, whatever their distance from the target.
    pub fn bracket(
        &self,
        blade: &str,
        side: Side,
        radius: f64,
    ) -> Result<(&BladeCurve, &BladeCurve), RegistryError> {
        let curves = self.matching(blade, side);
        if curves.len() < 2 {
            return Err(RegistryError::NotEnoughCurves {
                blade: blade.to_string(),
                side,
                found: curves.len(),
            });
        }

        if let Some(i) = curves.iter().position(|c| c.radius() > radius) {
            let other = if i == 0 { curves[1] } else { curves[i - 1] };
            return Ok((other, curves[i]));
        }

        // TODO: pick the two curves nearest to the target instead of the last two registered
        let n = curves.len();
        log::warn!(
            "radius {} exceeds every {} {} curve, extrapolating from {} and {}",
            radius,
            blade,
            side,
            curves[n - 1].name(),
            curves[n - 2].name()
        );
        Ok((curves[n - 1], curves[n - 2]))
    }

    /// The synthetic curve of injection request `index` on a blade side at the given radius
    pub fn injection(
        &self,
        blade: &str,
        side: Side,
        index: usize,
        radius: f64,
    ) -> Result<&BladeCurve, RegistryError> {
        self.curves
            .iter()
            .find(|c| {
                c.injection_index() == Some(index)
                    && c.matches(blade, side)
                    && (c.radius() - radius).abs() <= RADIUS_TOL
            })
            .ok_or_else(|| RegistryError::InjectionNotFound {
                blade: blade.to_string(),
                side,
                index,
                radius,
            })
    }
}
