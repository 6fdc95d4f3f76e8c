use crate::blade::Side;
use crate::errors::ParseError;
use indexmap::IndexMap;
use ncollide2d::na::Point3;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::iter::{Enumerate, Peekable};
use std::path::Path;

const BEGIN_MARKER: (&str, &str) = ("NI_BEGIN", "NIBLADEGEOMETRY");
const END_MARKER: (&str, &str) = ("NI_END", "NIBLADEGEOMETRY");

/// Section label to ordered section points, in file order
pub type Sections = IndexMap<String, Vec<Point3<f64>>>;

/// Side to its sections, in file order
pub type BladeGeometry = IndexMap<Side, Sections>;

type NumberedLines<R> = Peekable<Enumerate<Lines<R>>>;

fn is_marker(line: &str, marker: (&str, &str)) -> bool {
    line.strip_prefix(marker.0)
        .map(|rest| rest.trim_start().starts_with(marker.1))
        .unwrap_or(false)
}

/// Recognizes a section marker and returns the matched label, e.g. `section 1` or `# section 12`.
/// Anything after the section number is not part of the label.
fn section_marker(line: &str) -> Option<&str> {
    let body = match line.strip_prefix('#') {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        Some(_) => return None,
        None => line,
    };

    let rest = body.strip_prefix("section")?;
    let digits = rest.trim_start();
    let count = digits.chars().take_while(|c| c.is_ascii_digit()).count();
    if count == 0 {
        return None;
    }

    let end = line.len() - digits.len() + count;
    Some(&line[..end])
}

/// Extracts the section number from a label produced by the parser
pub fn section_number(label: &str) -> Option<u32> {
    label
        .rsplit(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|digits| digits.parse().ok())
}

fn parse_point(line: &str) -> Option<Point3<f64>> {
    let values: Vec<f64> = line
        .split_whitespace()
        .map(|v| v.parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    match values[..] {
        [x, y, z] => Some(Point3::new(x, y, z)),
        _ => None,
    }
}

fn next_line<R: BufRead>(lines: &mut NumberedLines<R>) -> Result<Option<(usize, String)>, ParseError> {
    match lines.next() {
        Some((i, line)) => Ok(Some((i + 1, line?))),
        None => Ok(None),
    }
}

/// True when the next line opens a side, a section or a block. Point lines never run into one.
fn next_is_marker<R: BufRead>(lines: &mut NumberedLines<R>) -> bool {
    match lines.peek() {
        Some((_, Ok(text))) => {
            let line = text.trim();
            section_marker(line).is_some()
                || Side::from_marker(line).is_some()
                || is_marker(line, BEGIN_MARKER)
                || is_marker(line, END_MARKER)
        }
        _ => false,
    }
}

/// Reads the point count and point lines which follow a section marker. Returns None when the
/// section is malformed, in which case it should be left empty.
fn read_section_points<R: BufRead>(
    lines: &mut NumberedLines<R>,
    label: &str,
) -> Result<Option<Vec<Point3<f64>>>, ParseError> {
    // Coordinate system header
    if next_line(lines)?.is_none() {
        log::warn!("{}: file ends before the section header", label);
        return Ok(None);
    }

    let (count_line, count_text) = match next_line(lines)? {
        Some(l) => l,
        None => {
            log::warn!("{}: file ends before the point count", label);
            return Ok(None);
        }
    };

    let count: usize = match count_text.trim().parse() {
        Ok(n) => n,
        Err(e) => {
            log::warn!(
                "{}: invalid point count '{}' on line {}: {}",
                label,
                count_text.trim(),
                count_line,
                e
            );
            return Ok(None);
        }
    };

    let mut points = Vec::new();
    for _ in 0..count {
        if next_is_marker(lines) {
            log::warn!(
                "{}: section ends after {} of {} points",
                label,
                points.len(),
                count
            );
            return Ok(None);
        }

        match next_line(lines)? {
            Some((n, text)) => match parse_point(&text) {
                Some(p) => points.push(p),
                None => {
                    log::warn!("{}: invalid point '{}' on line {}", label, text.trim(), n);
                    return Ok(None);
                }
            },
            None => {
                log::warn!(
                    "{}: file ends after {} of {} points",
                    label,
                    points.len(),
                    count
                );
                return Ok(None);
            }
        }
    }

    Ok(Some(points))
}

/// Parses the blade geometry block of a geomTurbo stream into sides and their sections.
///
/// Only the lines between `NI_BEGIN NIBLADEGEOMETRY` and `NI_END NIBLADEGEOMETRY` are examined,
/// and parsing stops at the first end marker. A side marker (`suction` or `pressure`) opens a
/// side, and each following section marker (`section <n>` or `# section <n>`) opens a section of
/// that side. A section marker is followed by one ignored header line, a point count, and that
/// many lines of whitespace separated x y z coordinates.
///
/// Malformed sections are logged and left empty, while a section appearing before any side is an
/// error.
pub fn parse_geometry<R: BufRead>(reader: R) -> Result<BladeGeometry, ParseError> {
    let mut geometry = BladeGeometry::new();
    let mut lines = reader.lines().enumerate().peekable();
    let mut in_block = false;
    let mut side: Option<Side> = None;

    while let Some((line_number, row)) = next_line(&mut lines)? {
        let line = row.trim();

        if is_marker(line, END_MARKER) {
            break;
        } else if is_marker(line, BEGIN_MARKER) {
            in_block = true;
        } else if !in_block {
            continue;
        } else if let Some(s) = Side::from_marker(line) {
            side = Some(s);
            geometry.insert(s, Sections::new());
        } else if let Some(label) = section_marker(line) {
            let current = side.ok_or(ParseError::SectionWithoutSide { line: line_number })?;
            let label = label.to_string();
            let points = read_section_points(&mut lines, &label)?.unwrap_or_default();
            geometry
                .entry(current)
                .or_default()
                .insert(label, points);
        }
    }

    Ok(geometry)
}

/// Parses the blade geometry block of a geomTurbo file
pub fn parse_geometry_file(path: &Path) -> Result<BladeGeometry, ParseError> {
    let file = File::open(path)?;
    parse_geometry(BufReader::new(file))
}
