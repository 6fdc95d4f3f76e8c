use crate::blade::intersect::SolverLimits;
use crate::units::MM_PER_M;
use std::path::PathBuf;

/// Inputs and settings of one processing run
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Directory searched for `.geomTurbo` files
    pub geometry_dir: PathBuf,

    /// Injection configuration table
    pub injection_config: PathBuf,

    /// Directory receiving one table per injection and the run report
    pub output_dir: PathBuf,

    /// Divisor converting millimetres into the output unit
    pub output_divisor: f64,
    pub limits: SolverLimits,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            geometry_dir: PathBuf::from("./geomturbo"),
            injection_config: PathBuf::from("./injections.cfg"),
            output_dir: PathBuf::from("./injections"),
            output_divisor: MM_PER_M,
            limits: SolverLimits::default(),
        }
    }
}

impl RunConfig {
    /// Builds a configuration from positional arguments, in the order geometry directory,
    /// injection configuration, output directory. Missing arguments keep their defaults.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut config = RunConfig::default();
        let mut args = args.into_iter();

        if let Some(a) = args.next() {
            config.geometry_dir = PathBuf::from(a);
        }
        if let Some(a) = args.next() {
            config.injection_config = PathBuf::from(a);
        }
        if let Some(a) = args.next() {
            config.output_dir = PathBuf::from(a);
        }

        config
    }
}
