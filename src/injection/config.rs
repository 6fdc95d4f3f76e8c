use crate::blade::Side;
use crate::errors::ConfigError;
use crate::units::LengthUnit;
use csv::{ReaderBuilder, StringRecord, Trim};
use regex::Regex;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

const BLADE: &str = "blade";
const SIDE: &str = "side";
const POSITIONS: &str = "s";

const RADIUS_PATTERN: &str = r"\br\s+\[\w+\]";
const DIAMETER_PATTERN: &str = r"\bDiameter\s+\[\w+\]";
const UNIT_PATTERN: &str = r"\b(mm|m|cm|dm|C|K|kg\s+s-1)\b";

/// A parameter carried from the configuration to the output without interpretation
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub unit: String,
}

/// One row of the injection configuration. Radii are in millimetres, while the hole diameter is
/// kept in the unit of its column and written out unchanged.
#[derive(Clone, Debug, Serialize)]
pub struct InjectionRequest {
    /// Row number, starting at 1
    pub index: usize,
    pub blade: String,
    pub side: Side,
    pub radii: Vec<f64>,
    pub positions: Vec<f64>,
    pub hole_diameter: f64,
    pub hole_diameter_unit: LengthUnit,
    pub parameters: Vec<Parameter>,
}

impl InjectionRequest {
    pub fn name(&self) -> String {
        format!("Injection {} {} {}", self.blade, self.side, self.index)
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}_injection_{}.csv", self.blade, self.side, self.index)
    }
}

struct HeaderPatterns {
    radius: Regex,
    diameter: Regex,
    unit: Regex,
}

impl HeaderPatterns {
    fn new() -> Result<Self, ConfigError> {
        Ok(HeaderPatterns {
            radius: Regex::new(RADIUS_PATTERN)?,
            diameter: Regex::new(DIAMETER_PATTERN)?,
            unit: Regex::new(UNIT_PATTERN)?,
        })
    }

    fn unit<'a>(&self, header: &'a str) -> Option<&'a str> {
        self.unit.find(header).map(|m| m.as_str())
    }

    fn length_unit(&self, header: &str) -> Option<LengthUnit> {
        self.unit(header).and_then(LengthUnit::from_symbol)
    }
}

/// A column found by name or by header pattern. A column which could not be found fails every
/// row that needs it.
struct Column {
    wanted: String,
    index: Option<usize>,
}

impl Column {
    fn find(headers: &StringRecord, wanted: &str, matches: impl Fn(&str) -> bool) -> Self {
        Column {
            wanted: wanted.to_string(),
            index: headers.iter().position(matches),
        }
    }

    fn index(&self) -> Result<usize, ConfigError> {
        self.index
            .ok_or_else(|| ConfigError::MissingColumn(self.wanted.clone()))
    }
}

/// Column positions resolved from the header row
struct Columns {
    blade: Column,
    side: Column,
    positions: Column,
    radius: Column,
    radius_unit: Option<LengthUnit>,
    diameter: Column,
    diameter_unit: Option<LengthUnit>,
    parameters: Vec<(usize, String, Option<String>)>,
}

impl Columns {
    fn resolve(headers: &StringRecord, patterns: &HeaderPatterns) -> Self {
        let blade = Column::find(headers, BLADE, |h| h == BLADE);
        let side = Column::find(headers, SIDE, |h| h == SIDE);
        let positions = Column::find(headers, POSITIONS, |h| h == POSITIONS);
        let radius = Column::find(headers, RADIUS_PATTERN, |h| patterns.radius.is_match(h));
        let diameter = Column::find(headers, DIAMETER_PATTERN, |h| patterns.diameter.is_match(h));

        let length_unit = |c: &Column| c.index.and_then(|i| patterns.length_unit(&headers[i]));
        let radius_unit = length_unit(&radius);
        let diameter_unit = length_unit(&diameter);

        let known: Vec<usize> = [&blade, &side, &positions, &radius, &diameter]
            .iter()
            .filter_map(|c| c.index)
            .collect();

        let parameters = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !known.contains(i))
            .map(|(i, header)| {
                let name = header.split_whitespace().next().unwrap_or(header);
                (i, name.to_string(), patterns.unit(header).map(|u| u.to_string()))
            })
            .collect();

        Columns {
            blade,
            side,
            positions,
            radius,
            radius_unit,
            diameter,
            diameter_unit,
            parameters,
        }
    }
}

fn require_unit<T>(unit: Option<T>, header: &str) -> Result<T, ConfigError> {
    unit.ok_or_else(|| ConfigError::UnknownUnit(header.to_string()))
}

fn parse_number(column: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse().map_err(|_| ConfigError::BadNumber {
        column: column.to_string(),
        value: value.to_string(),
    })
}

fn parse_list(column: &str, value: &str) -> Result<Vec<f64>, ConfigError> {
    let values = value
        .split_whitespace()
        .map(|v| parse_number(column, v))
        .collect::<Result<Vec<f64>, ConfigError>>()?;

    if values.is_empty() {
        return Err(ConfigError::Empty {
            column: column.to_string(),
        });
    }
    Ok(values)
}

fn parse_row(
    index: usize,
    headers: &StringRecord,
    row: &StringRecord,
    columns: &Columns,
) -> Result<InjectionRequest, ConfigError> {
    let field = |i: usize| row.get(i).unwrap_or("");

    let blade = field(columns.blade.index()?).to_string();
    let side = field(columns.side.index()?)
        .parse::<Side>()
        .map_err(ConfigError::UnknownSide)?;

    let radius = columns.radius.index()?;
    let radius_unit = require_unit(columns.radius_unit, &headers[radius])?;
    let radii = parse_list(&headers[radius], field(radius))?
        .into_iter()
        .map(|r| radius_unit.to_base(r))
        .collect();

    let positions = parse_list(POSITIONS, field(columns.positions.index()?))?;
    if let Some(s) = positions.iter().find(|s| !(0.0..=1.0).contains(*s)) {
        return Err(ConfigError::PositionOutOfRange(*s));
    }

    let diameter = columns.diameter.index()?;
    let hole_diameter_unit = require_unit(columns.diameter_unit, &headers[diameter])?;
    let hole_diameter = parse_number(&headers[diameter], field(diameter))?;

    let parameters = columns
        .parameters
        .iter()
        .map(|(i, name, unit)| -> Result<Parameter, ConfigError> {
            Ok(Parameter {
                name: name.clone(),
                value: field(*i).to_string(),
                unit: require_unit(unit.clone(), &headers[*i])?,
            })
        })
        .collect::<Result<Vec<Parameter>, ConfigError>>()?;

    Ok(InjectionRequest {
        index,
        blade,
        side,
        radii,
        positions,
        hole_diameter,
        hole_diameter_unit,
        parameters,
    })
}

/// Reads every row of an injection configuration.
///
/// Each row of the comma separated table describes one injection: the `blade` and `side` it
/// belongs to, a space separated list of radii in a column titled like `r [mm]`, a hole diameter
/// in a column titled like `Diameter [mm]`, and a space separated list of normalized positions
/// `s`. Every other column is an opaque parameter whose title holds a name and a unit, such as
/// `Temperature [K]`, and is passed through to the output untouched.
///
/// Only an unreadable table fails as a whole. A missing column or an unrecognised unit fails each
/// row, as does a bad value, so that the remaining rows can still be processed. Entries are in
/// row order, and row `i` (from 1) has request index `i`.
pub fn read_requests<R: Read>(
    reader: R,
) -> Result<Vec<Result<InjectionRequest, ConfigError>>, ConfigError> {
    let patterns = HeaderPatterns::new()?;
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let columns = Columns::resolve(&headers, &patterns);

    let requests = csv_reader
        .records()
        .enumerate()
        .map(|(i, record)| {
            let row = record?;
            parse_row(i + 1, &headers, &row, &columns)
        })
        .collect();

    Ok(requests)
}

pub fn read_requests_file(path: &Path) -> Result<Vec<Result<InjectionRequest, ConfigError>>, ConfigError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_requests(file)
}
