use geo::{orient::Direction, MultiPolygon, Orient};
use polars::prelude::{AnyValue, DataFrame};
use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Export rows + geometries as a GeoJSON FeatureCollection. Every attribute
/// column becomes a feature property; `id_column`, when present, also
/// becomes the feature id.
pub fn to_feature_collection(data: &DataFrame, shapes: &[MultiPolygon<f64>], id_column: Option<&str>) -> Result<Value> {
    if data.width() > 0 && data.height() != shapes.len() {
        return Err(Error::LengthMismatch { shapes: shapes.len(), rows: data.height() });
    }

    let columns = data.get_columns();
    let mut features = Vec::with_capacity(shapes.len());
    for (idx, mp) in shapes.iter().enumerate() {
        let mut properties = Map::new();
        let mut id = Value::Null;
        for column in columns {
            let value = any_value_to_json(column.get(idx)?);
            if Some(column.name().as_str()) == id_column { id = value.clone() }
            properties.insert(column.name().to_string(), value);
        }

        let mut feature = json!({
            "type": "Feature",
            "geometry": multipolygon_to_geojson(mp),
            "properties": properties,
        });
        if !id.is_null() { feature["id"] = id }
        features.push(feature);
    }

    Ok(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
}

/// Helper to convert a MultiPolygon to a serde_json::Value representing GeoJSON Geometry.
/// Each polygon is written as `[exterior, hole, hole, ...]`, exteriors
/// counter-clockwise and holes clockwise (RFC 7946 §3.1.6).
pub fn multipolygon_to_geojson(mp: &MultiPolygon<f64>) -> Value {
    let polygons = mp.orient(Direction::Default).0.iter()
        .map(|polygon| std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>())
            .collect::<Vec<_>>())
        .collect::<Vec<_>>();
    json!({
        "type": "MultiPolygon",
        "coordinates": polygons,
    })
}

fn any_value_to_json(value: AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(v) => json!(v),
        AnyValue::String(v) => json!(v),
        AnyValue::StringOwned(v) => json!(v.as_str()),
        AnyValue::Int8(v) => json!(v),
        AnyValue::Int32(v) => json!(v),
        AnyValue::Int64(v) => json!(v),
        AnyValue::UInt8(v) => json!(v),
        AnyValue::UInt32(v) => json!(v),
        AnyValue::UInt64(v) => json!(v),
        AnyValue::Float32(v) => json!(v),
        AnyValue::Float64(v) => json!(v),
        other => json!(other.to_string()),
    }
}
