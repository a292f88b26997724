use std::{collections::BTreeMap, path::Path};

use log::info;
use polars::prelude::*;
use shapefile::{dbase::{FieldValue, Record}, Reader, Shape};

use crate::{
    common,
    error::{Error, Result},
    geom::{reproject_to_wgs84, shape_to_multipolygon, GeoTable},
};

/// Reads all shapes + attribute records from a `.shp` file (with its `.dbf`)
/// into a [`GeoTable`]. Attribute columns keep their source names and are
/// ordered alphabetically; text fields are trimmed, numeric fields become
/// Float64. When `source_proj` is given, geometries are reprojected from that
/// PROJ.4 definition to WGS84.
///
/// Without `source_proj`, a `.prj` sidecar describing a projected CRS is an
/// error: its coordinates are not degrees and would be simplified and
/// measured as if they were.
pub fn read_geo_table(path: &Path, source_proj: Option<&str>) -> Result<GeoTable> {
    common::require_file_exists(path)?;
    check_source_crs(path, source_proj)?;
    let shp_error = |source: shapefile::Error| Error::Shapefile { path: path.to_path_buf(), source };

    let mut reader = Reader::from_path(path).map_err(shp_error)?;
    let mut shapes = Vec::new();
    let mut records = Vec::new();
    for item in reader.iter_shapes_and_records() {
        let (shape, record): (Shape, Record) = item.map_err(shp_error)?;
        shapes.push(shape_to_multipolygon(shape)
            .map_err(|shape| Error::UnsupportedShape { path: path.to_path_buf(), shape })?);
        records.push(record);
    }
    info!("[shapefile] read {} shapes from {}", shapes.len(), path.display());

    if let Some(proj) = source_proj {
        info!("[shapefile] reprojecting {} to WGS84", path.display());
        shapes = reproject_to_wgs84(&shapes, proj)?;
    }

    GeoTable::new(records_to_dataframe(&records)?, shapes)
}

/// Accept a shapefile only when its `.prj` (if any) is geographic, or when a
/// PROJ.4 override says how to reproject it.
fn check_source_crs(path: &Path, source_proj: Option<&str>) -> Result<()> {
    let prj = path.with_extension("prj");
    if source_proj.is_some() || !prj.is_file() { return Ok(()) }

    let wkt = std::fs::read_to_string(&prj)
        .map_err(|e| Error::io(format!("reading {}", prj.display()), e))?;
    let head = wkt.trim_start().to_ascii_uppercase();
    if head.starts_with("PROJCS") || head.starts_with("PROJCRS") {
        return Err(Error::Projection(format!(
            "{} declares a projected CRS; set geometry.region_proj or geometry.commune_proj to its PROJ.4 definition",
            prj.display(),
        )));
    }
    Ok(())
}

/// Storage class of a dBase field across all records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Number,
}

fn field_kind(value: &FieldValue) -> Option<FieldKind> {
    match value {
        FieldValue::Character(Some(_)) | FieldValue::Memo(_) => Some(FieldKind::Text),
        FieldValue::Numeric(Some(_)) | FieldValue::Float(Some(_))
        | FieldValue::Double(_) | FieldValue::Integer(_) | FieldValue::Currency(_) => Some(FieldKind::Number),
        _ => None,
    }
}

fn text_value(value: Option<&FieldValue>) -> Option<String> {
    match value? {
        FieldValue::Character(Some(s)) => Some(s.trim().to_string()),
        FieldValue::Memo(s) => Some(s.trim().to_string()),
        other => number_value(Some(other)).map(|n| n.to_string()),
    }
}

fn number_value(value: Option<&FieldValue>) -> Option<f64> {
    match value? {
        FieldValue::Numeric(n) => *n,
        FieldValue::Float(n) => n.map(f64::from),
        FieldValue::Double(n) | FieldValue::Currency(n) => Some(*n),
        FieldValue::Integer(n) => Some(f64::from(*n)),
        _ => None,
    }
}

/// Convert dBase records to a DataFrame. A field is Text if any record holds
/// text for it, otherwise Number.
fn records_to_dataframe(records: &[Record]) -> Result<DataFrame> {
    let mut kinds: BTreeMap<String, Option<FieldKind>> = BTreeMap::new();
    for record in records {
        for (name, value) in record.clone() {
            let kind = kinds.entry(name).or_insert(None);
            match (*kind, field_kind(&value)) {
                (_, Some(FieldKind::Text)) => *kind = Some(FieldKind::Text),
                (None, found) => *kind = found,
                _ => {}
            }
        }
    }

    let columns = kinds.into_iter()
        .map(|(name, kind)| match kind.unwrap_or(FieldKind::Text) {
            FieldKind::Text => Column::new(
                name.as_str().into(),
                records.iter().map(|r| text_value(r.get(&name))).collect::<Vec<_>>(),
            ),
            FieldKind::Number => Column::new(
                name.as_str().into(),
                records.iter().map(|r| number_value(r.get(&name))).collect::<Vec<_>>(),
            ),
        })
        .collect::<Vec<_>>();

    if columns.is_empty() {
        // No attributes at all; a row id keeps the table aligned with its geometries.
        let fid = (0..records.len() as u32).collect::<Vec<_>>();
        return Ok(DataFrame::new(vec![Column::new("fid".into(), fid)])?);
    }
    Ok(DataFrame::new(columns)?)
}
