// loader.rs

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geo::{Coord, LineString, MultiPolygon, Polygon, Simplify};
use geojson::{GeoJson, Value};
use shapefile::dbase::{self, FieldValue};
use shapefile::{PolygonRing, Shape};
use tracing::{debug, info, warn};

use crate::category::all_parameter_columns;
use crate::dataset::{AttrValue, Dataset, RegionRecord};
use crate::error::{DashboardError, FormatIssue};

pub const STATE_COLUMN: &str = "NAME_1";
pub const DISTRICT_COLUMN: &str = "NAME_2";

/// Boundary files tried, in order, when nothing else is configured.
pub const DEFAULT_CANDIDATES: [&str; 2] =
    ["Solar_Suitability_layer.shp", "true_solar_suitability.shp"];

/// Datasets with more records than this are simplified on load.
const SIMPLIFY_ABOVE: usize = 100;
/// Douglas-Peucker tolerance in degrees.
const SIMPLIFY_TOLERANCE: f64 = 0.001;

/// A parsed feature before names are split out of the attribute table.
struct RawRow {
    geometry: MultiPolygon<f64>,
    fields: BTreeMap<String, AttrValue>,
}

/// Loads the first candidate that exists on disk.
pub fn load_first<P: AsRef<Path>>(candidates: &[P]) -> Result<Dataset, DashboardError> {
    let found = candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|path| path.is_file());

    match found {
        Some(path) => load_path(path),
        None => {
            warn!(count = candidates.len(), "no boundary file candidate exists");
            Err(DashboardError::DataNotFound {
                candidates: candidates
                    .iter()
                    .map(|p| p.as_ref().to_path_buf())
                    .collect(),
            })
        }
    }
}

/// Parses one boundary file, choosing the reader by extension.
pub fn load_path(path: &Path) -> Result<Dataset, DashboardError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let rows = match extension.as_deref() {
        Some("shp") => read_shapefile_rows(path)?,
        Some("geojson") | Some("json") => read_geojson_rows(path)?,
        _ => {
            return Err(DashboardError::format(path, FormatIssue::UnsupportedExtension));
        }
    };

    let dataset = build_dataset(path, rows)?.with_modified(modified_time(path));
    info!(
        path = %path.display(),
        records = dataset.len(),
        columns = dataset.columns().len(),
        "loaded boundary dataset"
    );
    Ok(dataset)
}

fn build_dataset(path: &Path, rows: Vec<RawRow>) -> Result<Dataset, DashboardError> {
    let columns: BTreeSet<String> = rows
        .iter()
        .flat_map(|row| row.fields.keys().cloned())
        .collect();

    if !rows.is_empty() {
        let missing: Vec<String> = [STATE_COLUMN, DISTRICT_COLUMN]
            .into_iter()
            .chain(all_parameter_columns())
            .filter(|column| !columns.contains(*column))
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::format(path, FormatIssue::MissingColumns(missing)));
        }
    }

    let simplify = rows.len() > SIMPLIFY_ABOVE;
    if simplify {
        debug!(records = rows.len(), tolerance = SIMPLIFY_TOLERANCE, "simplifying geometry");
    }

    let records = rows
        .into_iter()
        .map(|mut row| {
            let state = take_name(&mut row.fields, STATE_COLUMN);
            let district = take_name(&mut row.fields, DISTRICT_COLUMN);
            let geometry = if simplify {
                row.geometry.simplify(&SIMPLIFY_TOLERANCE)
            } else {
                row.geometry
            };
            RegionRecord {
                state,
                district,
                geometry: Arc::new(geometry),
                attributes: row.fields,
            }
        })
        .collect();

    Dataset::new(path, columns, records)
}

fn take_name(fields: &mut BTreeMap<String, AttrValue>, column: &str) -> String {
    match fields.remove(column) {
        Some(AttrValue::Text(s)) if !s.eq_ignore_ascii_case("nan") => s.trim().to_string(),
        Some(AttrValue::Number(n)) if n.is_finite() => n.to_string(),
        _ => String::new(),
    }
}

fn modified_time(path: &Path) -> Option<String> {
    let time = fs::metadata(path).ok()?.modified().ok()?;
    let datetime: chrono::DateTime<chrono::Local> = time.into();
    Some(format!("{}", datetime.format("%Y-%m-%d %H:%M")))
}

// --- Shapefile ---

fn read_shapefile_rows(path: &Path) -> Result<Vec<RawRow>, DashboardError> {
    let parse_err = |e: shapefile::Error| {
        DashboardError::format(path, FormatIssue::Parse(e.to_string()))
    };

    if declares_projected_crs(path) {
        warn!(
            path = %path.display(),
            "shapefile .prj declares a projected CRS; coordinates are drawn as lon/lat without reprojection"
        );
    }

    let mut reader = shapefile::Reader::from_path(path).map_err(parse_err)?;
    let mut rows = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.map_err(parse_err)?;
        let geometry =
            shape_to_multipolygon(shape).map_err(|issue| DashboardError::format(path, issue))?;
        let fields = record
            .into_iter()
            .map(|(name, value)| (name, field_to_attr(value)))
            .collect();
        rows.push(RawRow { geometry, fields });
    }
    debug!(path = %path.display(), rows = rows.len(), "read shapefile");
    Ok(rows)
}

/// True when the sibling `.prj` holds a projected (not geographic) WKT definition.
fn declares_projected_crs(path: &Path) -> bool {
    match fs::read_to_string(path.with_extension("prj")) {
        Ok(wkt) => {
            let wkt = wkt.trim_start().to_ascii_uppercase();
            wkt.starts_with("PROJCS[") || wkt.starts_with("PROJCRS[")
        }
        Err(_) => false,
    }
}

fn format_date(date: dbase::Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

fn field_to_attr(value: FieldValue) -> AttrValue {
    match value {
        FieldValue::Character(Some(s)) | FieldValue::Memo(s) => text_or_null(&s),
        FieldValue::Character(None) => AttrValue::Null,
        FieldValue::Numeric(n) => n.map_or(AttrValue::Null, AttrValue::Number),
        FieldValue::Float(n) => n.map_or(AttrValue::Null, |v| AttrValue::Number(v as f64)),
        FieldValue::Integer(n) => AttrValue::Number(n as f64),
        FieldValue::Double(n) | FieldValue::Currency(n) => AttrValue::Number(n),
        FieldValue::Logical(b) => b.map_or(AttrValue::Null, |b| AttrValue::Text(b.to_string())),
        FieldValue::Date(d) => d.map_or(AttrValue::Null, |d| AttrValue::Text(format_date(d))),
        FieldValue::DateTime(dt) => {
            let time = dt.time();
            AttrValue::Text(format!(
                "{} {:02}:{:02}:{:02}",
                format_date(dt.date()),
                time.hours(),
                time.minutes(),
                time.seconds()
            ))
        }
    }
}

fn text_or_null(s: &str) -> AttrValue {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        AttrValue::Null
    } else {
        AttrValue::Text(trimmed.to_string())
    }
}

fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>, FormatIssue> {
    match shape {
        Shape::NullShape => Ok(MultiPolygon(Vec::new())),
        Shape::Polygon(p) => Ok(rings_to_multipolygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonM(p) => Ok(rings_to_multipolygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonZ(p) => Ok(rings_to_multipolygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::Point(_) | Shape::PointM(_) | Shape::PointZ(_) => {
            Err(FormatIssue::UnsupportedShape("point".into()))
        }
        Shape::Polyline(_) | Shape::PolylineM(_) | Shape::PolylineZ(_) => {
            Err(FormatIssue::UnsupportedShape("polyline".into()))
        }
        Shape::Multipoint(_) | Shape::MultipointM(_) | Shape::MultipointZ(_) => {
            Err(FormatIssue::UnsupportedShape("multipoint".into()))
        }
        _ => Err(FormatIssue::UnsupportedShape("multipatch".into())),
    }
}

/// Groups shapefile rings: each outer ring owns the inner rings that follow it.
fn rings_to_multipolygon<P>(
    rings: &[PolygonRing<P>],
    coord: impl Fn(&P) -> Coord<f64>,
) -> MultiPolygon<f64> {
    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        match ring {
            PolygonRing::Outer(points) => {
                if let Some(ext) = exterior.take() {
                    polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
                exterior = Some(LineString(points.iter().map(&coord).collect()));
            }
            PolygonRing::Inner(points) => {
                holes.push(LineString(points.iter().map(&coord).collect()));
            }
        }
    }
    if let Some(ext) = exterior {
        polygons.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polygons)
}

// --- GeoJSON ---

fn read_geojson(path: &Path) -> Result<GeoJson, Box<dyn std::error::Error>> {
    let file = fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let geojson = GeoJson::from_reader(reader)?;
    Ok(geojson)
}

fn read_geojson_rows(path: &Path) -> Result<Vec<RawRow>, DashboardError> {
    let geojson = read_geojson(path)
        .map_err(|e| DashboardError::format(path, FormatIssue::Parse(e.to_string())))?;

    let features: Vec<(Option<geojson::Geometry>, Option<geojson::JsonObject>)> = match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .map(|f| (f.geometry, f.properties))
            .collect(),
        GeoJson::Feature(feature) => vec![(feature.geometry, feature.properties)],
        GeoJson::Geometry(geometry) => vec![(Some(geometry), None)],
    };

    features
        .into_iter()
        .map(|(geometry, properties)| {
            let geometry = match geometry {
                Some(geometry) => value_to_multipolygon(geometry.value)
                    .map_err(|issue| DashboardError::format(path, issue))?,
                None => MultiPolygon(Vec::new()),
            };
            let fields = properties
                .unwrap_or_default()
                .into_iter()
                .map(|(name, value)| (name, json_to_attr(value)))
                .collect();
            Ok(RawRow { geometry, fields })
        })
        .collect()
}

fn json_to_attr(value: serde_json::Value) -> AttrValue {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map_or(AttrValue::Null, AttrValue::Number),
        serde_json::Value::String(s) => text_or_null(&s),
        serde_json::Value::Bool(b) => AttrValue::Text(b.to_string()),
        serde_json::Value::Null => AttrValue::Null,
        other => AttrValue::Text(other.to_string()),
    }
}

fn ring_to_linestring(ring: &[Vec<f64>]) -> LineString<f64> {
    LineString(
        ring.iter()
            .filter(|position| position.len() >= 2)
            .map(|position| Coord {
                x: position[0],
                y: position[1],
            })
            .collect(),
    )
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    Some(Polygon::new(
        ring_to_linestring(exterior),
        interiors.iter().map(|r| ring_to_linestring(r)).collect(),
    ))
}

fn value_to_multipolygon(value: Value) -> Result<MultiPolygon<f64>, FormatIssue> {
    match value {
        Value::Polygon(rings) => Ok(MultiPolygon(rings_to_polygon(&rings).into_iter().collect())),
        Value::MultiPolygon(polygons) => Ok(MultiPolygon(
            polygons.iter().filter_map(|rings| rings_to_polygon(rings)).collect(),
        )),
        other => Err(FormatIssue::UnsupportedShape(other.type_name().to_string())),
    }
}

/// Candidate list with an optional explicit path tried first.
pub fn candidate_list(explicit: Option<&Path>, configured: &[PathBuf]) -> Vec<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(configured.iter().cloned())
        .collect()
}
