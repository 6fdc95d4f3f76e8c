use crate::blade::intersect::{synthesize_injection, SolverLimits};
use crate::blade::registry::CurveRegistry;
use crate::errors::InjectionError;
use crate::serialize::Point3f64;
use ncollide2d::na::Point3;
use serde::Serialize;

pub mod config;
pub mod writer;

pub use config::{InjectionRequest, Parameter};

/// A cooling hole location on the blade surface, in millimetres
#[derive(Clone, Debug, Serialize)]
pub struct InjectionPoint {
    pub radius: f64,
    pub s: f64,

    #[serde(with = "Point3f64")]
    pub position: Point3<f64>,
}

/// Synthesizes the injection curves of every radius of a request and registers them
pub fn synthesize_request(
    registry: &mut CurveRegistry,
    request: &InjectionRequest,
    limits: &SolverLimits,
) -> Result<(), InjectionError> {
    for radius in request.radii.iter() {
        synthesize_injection(
            registry,
            &request.blade,
            request.side,
            request.index,
            *radius,
            limits,
        )?;
    }

    Ok(())
}

/// Locates every (radius, position) combination of a request on its registered injection curves,
/// radius major.
pub fn locate_points(
    registry: &CurveRegistry,
    request: &InjectionRequest,
) -> Result<Vec<InjectionPoint>, InjectionError> {
    let mut points = Vec::with_capacity(request.radii.len() * request.positions.len());
    for radius in request.radii.iter() {
        let curve = registry.injection(&request.blade, request.side, request.index, *radius)?;
        for s in request.positions.iter() {
            points.push(InjectionPoint {
                radius: *radius,
                s: *s,
                position: curve.absolute_position(*s)?,
            });
        }
    }

    Ok(points)
}
