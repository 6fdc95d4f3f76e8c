use crate::blade::registry::CurveRegistry;
use crate::blade::{BladeCurve, Side};
use crate::config::RunConfig;
use crate::errors::{ConfigError, InjectionError};
use crate::geomturbo::{parse_geometry_file, section_number, BladeGeometry};
use crate::injection::config::{read_requests_file, InjectionRequest};
use crate::injection::writer::{write_injection_csv, write_report, InjectionRecord, RunReport};
use crate::injection::{locate_points, synthesize_request, InjectionPoint};
use regex::Regex;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const GEOMETRY_EXTENSION: &str = "geomTurbo";
const BLADE_PATTERN: &str = r"(rb_?\d+)|(gv_?\d+)";
const REPORT_FILE: &str = "report.json";

/// Counts of what a run processed
#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub files_parsed: usize,
    pub curves_registered: usize,
    pub requests_written: usize,
    pub requests_failed: usize,
}

fn io_error(path: &Path, source: std::io::Error) -> InjectionError {
    InjectionError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// The `.geomTurbo` files of a directory, sorted by path. An unreadable directory is logged and
/// treated as empty.
pub fn geometry_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("could not read geometry directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|x| x == GEOMETRY_EXTENSION).unwrap_or(false))
        .collect();
    files.sort();
    files
}

/// The blade identifier embedded in a geometry file name, e.g. `rb1` or `gv_2`
pub fn blade_id(pattern: &Regex, path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    pattern.find(name).map(|m| m.as_str().to_string())
}

/// Registers a curve for every section of the requested sides of a blade, in file order, and
/// returns how many were registered. Sections with fewer than two points are skipped.
pub fn register_geometry(
    registry: &mut CurveRegistry,
    blade: &str,
    geometry: BladeGeometry,
    wanted: &HashSet<(String, Side)>,
) -> usize {
    let mut count = 0;
    for (side, sections) in geometry {
        if !wanted.contains(&(blade.to_string(), side)) {
            continue;
        }

        for (label, points) in sections {
            let number = match section_number(&label) {
                Some(n) => n,
                None => {
                    log::warn!("{} {}: no number in section label '{}'", blade, side, label);
                    continue;
                }
            };

            if points.len() < 2 {
                log::warn!(
                    "{} {} {}: {} points, section skipped",
                    blade,
                    side,
                    label,
                    points.len()
                );
                continue;
            }

            let curve = BladeCurve::from_section(blade, side, number, points);
            log::debug!("{}", curve);
            registry.register(curve);
            count += 1;
        }
    }

    count
}

fn process_request(
    registry: &mut CurveRegistry,
    request: &InjectionRequest,
    config: &RunConfig,
) -> Result<Vec<InjectionPoint>, InjectionError> {
    synthesize_request(registry, request, &config.limits)?;
    let points = locate_points(registry, request)?;

    let path = config.output_dir.join(request.file_name());
    let file = File::create(&path).map_err(|e| io_error(&path, e))?;
    let mut w = BufWriter::new(file);
    write_injection_csv(&mut w, request, &points, config.output_divisor)
        .and_then(|_| w.flush())
        .map_err(|e| io_error(&path, e))?;

    Ok(points)
}

/// Runs the whole injection placement: reads the injection requests, parses and registers the
/// blade geometry they refer to, synthesizes the injection curves, and writes one table per
/// request plus a JSON report to the output directory.
///
/// A failing configuration row, geometry file or request is logged and skipped. Only an
/// unreadable configuration or an unusable output directory stops the run.
pub fn run(config: &RunConfig) -> Result<RunSummary, InjectionError> {
    let mut summary = RunSummary::default();

    let mut requests = Vec::new();
    for (i, row) in read_requests_file(&config.injection_config)?.into_iter().enumerate() {
        match row {
            Ok(request) => requests.push(request),
            Err(e) => {
                log::error!("injection {}: {}", i + 1, e);
                summary.requests_failed += 1;
            }
        }
    }
    log::info!("{} injection requests read", requests.len());

    let wanted: HashSet<(String, Side)> = requests
        .iter()
        .map(|r| (r.blade.clone(), r.side))
        .collect();

    let pattern = Regex::new(BLADE_PATTERN).map_err(ConfigError::from)?;
    let mut registry = CurveRegistry::new();
    for path in geometry_files(&config.geometry_dir) {
        let blade = match blade_id(&pattern, &path) {
            Some(b) => b,
            None => {
                log::error!("no blade identifier in file name {}", path.display());
                continue;
            }
        };

        match parse_geometry_file(&path) {
            Ok(geometry) => {
                let count = register_geometry(&mut registry, &blade, geometry, &wanted);
                log::info!("{}: {} sections registered for {}", path.display(), count, blade);
                summary.files_parsed += 1;
                summary.curves_registered += count;
            }
            Err(e) => log::error!("{}: {}", path.display(), e),
        }
    }

    fs::create_dir_all(&config.output_dir).map_err(|e| io_error(&config.output_dir, e))?;

    let mut records = Vec::new();
    for request in requests.iter() {
        match process_request(&mut registry, request, config) {
            Ok(points) => {
                log::info!("{} written with {} points", request.name(), points.len());
                records.push(InjectionRecord::new(request, points));
                summary.requests_written += 1;
            }
            Err(e) => {
                log::error!("{}: {}", request.name(), e);
                summary.requests_failed += 1;
            }
        }
    }

    let report_path = config.output_dir.join(REPORT_FILE);
    let file = File::create(&report_path).map_err(|e| io_error(&report_path, e))?;
    let report = RunReport {
        limits: config.limits,
        injections: records,
    };
    write_report(BufWriter::new(file), &report)?;

    Ok(summary)
}
