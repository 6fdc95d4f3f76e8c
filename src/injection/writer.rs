use super::{InjectionPoint, InjectionRequest, Parameter};
use crate::blade::intersect::SolverLimits;
use crate::blade::Side;
use crate::serialize::Vector3f64;
use crate::units::LengthUnit;
use ncollide2d::na::Vector3;
use serde::Serialize;
use std::io::{self, Write};

/// Injection direction along the machine axis. Rotor blades (`rb<n>`) inject towards -z, every
/// other blade towards +z.
pub fn injection_direction(blade: &str) -> Vector3<f64> {
    let is_rotor = blade.match_indices("rb").any(|(i, _)| {
        blade[i + 2..]
            .chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
    });

    Vector3::new(0.0, 0.0, if is_rotor { -1.0 } else { 1.0 })
}

fn write_parameters<W: Write>(w: &mut W, parameters: &[Parameter]) -> io::Result<()> {
    for p in parameters {
        writeln!(w, "{} = {} [{}]", p.name, p.value, p.unit)?;
    }
    Ok(())
}

/// Writes the injection region table of one request. Coordinates are divided by `divisor` to
/// convert from millimetres to the output unit, while the hole diameter is written as configured.
pub fn write_injection_csv<W: Write>(
    w: &mut W,
    request: &InjectionRequest,
    points: &[InjectionPoint],
    divisor: f64,
) -> io::Result<()> {
    writeln!(w, "[Name]")?;
    writeln!(w, "{}", request.name())?;
    writeln!(w)?;
    writeln!(w, "[Parameters]")?;
    write_parameters(w, &request.parameters)?;
    writeln!(w)?;
    writeln!(w)?;
    writeln!(w, "[Spatial Fields]")?;
    writeln!(w, "x, y, z")?;
    writeln!(w)?;
    writeln!(w, "[Data]")?;
    writeln!(
        w,
        "x [ m ], y[ m ], z [ m ], Direction u [], Direction v [], Direction w []"
    )?;

    let dir = injection_direction(&request.blade);
    for p in points {
        let pos = p.position / divisor;
        writeln!(
            w,
            "{}, {}, {}, {}, {}, {}, {}",
            pos.x, pos.y, pos.z, dir.x, dir.y, dir.z, request.hole_diameter
        )?;
    }

    Ok(())
}

/// Summary of one written injection. Point positions are in millimetres.
#[derive(Serialize)]
pub struct InjectionRecord {
    pub name: String,
    pub file: String,
    pub blade: String,
    pub side: Side,
    pub hole_diameter: f64,
    pub hole_diameter_unit: LengthUnit,

    #[serde(with = "Vector3f64")]
    pub direction: Vector3<f64>,
    pub parameters: Vec<Parameter>,
    pub points: Vec<InjectionPoint>,
}

impl InjectionRecord {
    pub fn new(request: &InjectionRequest, points: Vec<InjectionPoint>) -> Self {
        InjectionRecord {
            name: request.name(),
            file: request.file_name(),
            blade: request.blade.clone(),
            side: request.side,
            hole_diameter: request.hole_diameter,
            hole_diameter_unit: request.hole_diameter_unit,
            direction: injection_direction(&request.blade),
            parameters: request.parameters.clone(),
            points,
        }
    }
}

/// Machine readable report of a run
#[derive(Serialize)]
pub struct RunReport {
    pub limits: SolverLimits,
    pub injections: Vec<InjectionRecord>,
}

pub fn write_report<W: Write>(mut w: W, report: &RunReport) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut w, report)?;
    w.flush().map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncollide2d::na::Point3;
    use test_case::test_case;

    #[test_case("rb1", -1.0)]
    #[test_case("rb_1", 1.0)]
    #[test_case("stage_rb12", -1.0)]
    #[test_case("gv3", 1.0)]
    #[test_case("rb", 1.0)]
    fn test_direction(blade: &str, w: f64) {
        let dir = injection_direction(blade);
        assert_eq!(Vector3::new(0.0, 0.0, w), dir);
    }

    fn sample_request() -> InjectionRequest {
        InjectionRequest {
            index: 2,
            blade: "rb1".to_string(),
            side: Side::Suction,
            radii: vec![250.0],
            positions: vec![0.5],
            hole_diameter: 0.5,
            hole_diameter_unit: LengthUnit::Mm,
            parameters: vec![Parameter {
                name: "Temperature".to_string(),
                value: "850".to_string(),
                unit: "K".to_string(),
            }],
        }
    }

    fn sample_points() -> Vec<InjectionPoint> {
        vec![InjectionPoint {
            radius: 250.0,
            s: 0.5,
            position: Point3::new(250.0, -125.0, 40.0),
        }]
    }

    #[test]
    fn test_write_injection_csv() {
        let mut buffer = Vec::new();
        write_injection_csv(&mut buffer, &sample_request(), &sample_points(), 1000.0).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let expected = "[Name]\n\
                        Injection rb1 suction 2\n\
                        \n\
                        [Parameters]\n\
                        Temperature = 850 [K]\n\
                        \n\
                        \n\
                        [Spatial Fields]\n\
                        x, y, z\n\
                        \n\
                        [Data]\n\
                        x [ m ], y[ m ], z [ m ], Direction u [], Direction v [], Direction w []\n\
                        0.25, -0.125, 0.04, 0, 0, -1, 0.5\n";
        assert_eq!(expected, text);
    }

    #[test]
    fn test_report() {
        let report = RunReport {
            limits: SolverLimits::default(),
            injections: vec![InjectionRecord::new(&sample_request(), sample_points())],
        };
        let mut buffer = Vec::new();
        write_report(&mut buffer, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        let injection = &value["injections"][0];
        assert_eq!("Injection rb1 suction 2", injection["name"]);
        assert_eq!("rb1_suction_injection_2.csv", injection["file"]);
        assert_eq!("suction", injection["side"]);
        assert_eq!(-1.0, injection["direction"]["z"]);
        assert_eq!(0.5, injection["hole_diameter"]);
        assert_eq!("mm", injection["hole_diameter_unit"]);
        assert_eq!(250.0, injection["points"][0]["position"]["x"]);
        assert_eq!(0.5, injection["points"][0]["s"]);
        assert_eq!(200, value["limits"]["max_bisections"]);
    }
}
