use polars::prelude::*;
use serde_json::Value;

use crate::aggregate::round2;
use crate::census::columns::{COMUNA_ID, REGION_ID};
use crate::error::Result;
use crate::geom::{optimize_geometries, GeoTable};
use crate::io::to_feature_collection;
use crate::normalize::{COMUNA_NAME, REGION_NAME};

/// Simplification tolerance applied to every payload, in degrees.
pub const PAYLOAD_TOLERANCE: f64 = 0.01;

/// Per-ring point budget applied to every payload.
pub const PAYLOAD_MAX_POINTS: usize = 500;

/// Identifier fields kept whenever present.
pub const ID_FIELDS: [&str; 2] = [REGION_ID, COMUNA_ID];

/// Name fields kept whenever present.
pub const NAME_FIELDS: [&str; 2] = [REGION_NAME, COMUNA_NAME];

/// Geometry + attribute bundle ready for a choropleth renderer.
#[derive(Debug, Clone)]
pub struct MapPayload {
    table: GeoTable,
}

impl MapPayload {
    #[inline] pub fn table(&self) -> &GeoTable { &self.table }

    #[inline] pub fn data(&self) -> &DataFrame { self.table.data() }

    #[inline] pub fn len(&self) -> usize { self.table.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.table.is_empty() }

    /// Column names carried by the payload, in order.
    pub fn fields(&self) -> Vec<String> {
        self.data().get_column_names().iter().map(|c| c.to_string()).collect()
    }

    /// FeatureCollection with the commune or region id as feature id.
    pub fn to_geojson(&self) -> Result<Value> {
        let id = [COMUNA_ID, REGION_ID].into_iter().find(|c| self.table.has_column(c));
        to_feature_collection(self.data(), self.table.shapes(), id)
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_geojson()?)?)
    }
}

/// Trim a joined table down to a renderable payload.
///
/// Keeps the present id and name fields plus every requested field that
/// exists; requested fields missing from `table` are skipped. With
/// `max_rows`, only the first rows in table order survive. Geometries are
/// simplified with [`PAYLOAD_TOLERANCE`] and capped at [`PAYLOAD_MAX_POINTS`]
/// points per ring, and float columns are rounded to two decimals.
pub fn build_map_payload<S: AsRef<str>>(table: &GeoTable, fields: &[S], max_rows: Option<usize>) -> Result<MapPayload> {
    let mut keep = Vec::<&str>::new();
    let wanted = ID_FIELDS.into_iter()
        .chain(NAME_FIELDS)
        .chain(fields.iter().map(AsRef::as_ref));
    for name in wanted {
        if table.has_column(name) && !keep.contains(&name) {
            keep.push(name);
        }
    }

    let mut data = table.data().select(keep)?;
    let mut rows = table.len();
    if let Some(cap) = max_rows.filter(|&cap| cap < rows) {
        data = data.head(Some(cap));
        rows = cap;
    }

    let shapes = optimize_geometries(&table.shapes()[..rows], PAYLOAD_TOLERANCE, Some(PAYLOAD_MAX_POINTS));
    let data = round_floats(data)?;
    Ok(MapPayload { table: GeoTable::new(data, shapes)? })
}

/// Round every floating-point column to two decimals.
fn round_floats(mut df: DataFrame) -> Result<DataFrame> {
    let floats = df.get_columns().iter()
        .filter(|c| c.dtype().is_float())
        .map(|c| c.name().clone())
        .collect::<Vec<_>>();

    for name in floats {
        let rounded: Float64Chunked = df.column(&name)?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.map(round2))
            .collect();
        df.replace(&name, rounded.with_name(name.clone()).into_series())?;
    }
    Ok(df)
}
