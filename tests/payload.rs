// Map-payload field selection, row capping and geometry reduction on
// in-memory tables.

use censomap::{build_map_payload, GeoTable, PAYLOAD_MAX_POINTS};
use geo::{LineString, MultiPolygon, Polygon};
use polars::prelude::*;

fn ring(n: usize, radius: f64) -> LineString<f64> {
    let mut coords = (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * std::f64::consts::TAU;
            (radius * t.cos(), radius * t.sin())
        })
        .collect::<Vec<_>>();
    coords.push(coords[0]);
    LineString::from(coords)
}

fn communes() -> GeoTable {
    let data = DataFrame::new(vec![
        Column::new("comuna_id".into(), vec![101i32, 102]),
        Column::new("comuna_name".into(), vec!["Uno", "Dos"]),
        Column::new("province_name".into(), vec!["P", "P"]),
        Column::new("population_total".into(), vec![Some(10u64), None]),
        Column::new("pct_female".into(), vec![Some(33.333_333f64), None]),
    ]).unwrap();
    let with_hole = Polygon::new(ring(3_000, 5.0), vec![ring(2_000, 1.0)]);
    GeoTable::new(data, vec![
        MultiPolygon(vec![with_hole]),
        MultiPolygon(vec![Polygon::new(ring(12, 1.0), vec![])]),
    ]).unwrap()
}

#[test]
fn nonexistent_field_is_omitted_without_error() {
    let payload = build_map_payload(&communes(), &["population_total", "nonexistent_field"], None).unwrap();
    assert_eq!(payload.fields(), ["comuna_id", "comuna_name", "population_total"]);
}

#[test]
fn every_output_field_exists_in_the_input() {
    let table = communes();
    let payload = build_map_payload(&table, &["pct_female", "area", "province_name"], Some(1)).unwrap();
    for field in payload.fields() {
        assert!(table.has_column(&field), "{field} is not an input column");
    }
    assert_eq!(payload.len(), 1);
}

#[test]
fn rings_stay_closed_and_within_budget() {
    let payload = build_map_payload(&communes(), &["pct_female"], None).unwrap();
    for shape in payload.table().shapes() {
        for polygon in &shape.0 {
            for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
                assert!(ring.is_closed());
                assert!(ring.0.len() >= 4);
                assert!(ring.0.len() <= PAYLOAD_MAX_POINTS + 1);
            }
        }
    }
    let pct = payload.data().column("pct_female").unwrap().f64().unwrap().get(0);
    assert_eq!(pct, Some(33.33));
}

#[test]
fn geojson_is_a_feature_collection() {
    let payload = build_map_payload(&communes(), &["population_total"], None).unwrap();
    let geojson = payload.to_geojson().unwrap();
    assert_eq!(geojson["type"], "FeatureCollection");
    assert_eq!(geojson["features"].as_array().unwrap().len(), 2);
    assert_eq!(geojson["features"][0]["id"], 101);
    assert_eq!(geojson["features"][0]["geometry"]["type"], "MultiPolygon");
    assert!(geojson["features"][1]["properties"]["population_total"].is_null());
}
