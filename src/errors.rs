use crate::blade::Side;
use ncollide2d::na::Point3;
use thiserror::Error;

/// Top level error for a processing run.
#[derive(Debug, Error)]
pub enum InjectionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed writing report: {0}")]
    Report(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed reading geometry: {0}")]
    Io(#[from] std::io::Error),

    #[error("section marker on line {line} appears before any side marker")]
    SectionWithoutSide { line: usize },
}

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("a curve needs at least two points")]
    NotEnoughPoints,

    #[error("curve has zero length")]
    ZeroLength,

    #[error("normalized position {value} is out of range [0, 1]")]
    ParameterOutOfRange { value: f64 },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("blade {blade} {side} has {found} registered curves, at least two are needed")]
    NotEnoughCurves {
        blade: String,
        side: Side,
        found: usize,
    },

    #[error("no curve of injection {index} for blade {blade} {side} at radius {radius}")]
    InjectionNotFound {
        blade: String,
        side: Side,
        index: usize,
        radius: f64,
    },
}

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("bracketing points coincide at {0}")]
    DegenerateSegment(Point3<f64>),

    #[error("radius is not monotonic between {p1} and {p2}, target {target} unreachable")]
    NonMonotonic {
        p1: Point3<f64>,
        p2: Point3<f64>,
        target: f64,
    },

    #[error("no convergence after {iterations} steps, last interval {p1} to {p2}, target {target}")]
    NotConverged {
        p1: Point3<f64>,
        p2: Point3<f64>,
        target: f64,
        iterations: usize,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading injection configuration: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column matching {0}")]
    MissingColumn(String),

    #[error("unrecognized unit in column header '{0}'")]
    UnknownUnit(String),

    #[error("unknown blade side '{0}'")]
    UnknownSide(String),

    #[error("column '{column}' holds a non numeric value '{value}'")]
    BadNumber { column: String, value: String },

    #[error("column '{column}' holds no values")]
    Empty { column: String },

    #[error("position {0} is outside [0, 1]")]
    PositionOutOfRange(f64),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
