//! Readers and writers, organized by file format.
//!
//! - `census` - chunked reader for the delimited person-level census file
//! - `shp` - shapefile reader producing a [`GeoTable`](crate::GeoTable)
//! - `geojson` - FeatureCollection export for map payloads
//! - `tabular` - CSV output for summary tables

mod census;
mod geojson;
mod shp;
mod tabular;

pub use census::{load_census, read_census, CENSUS_COLUMNS};
pub use geojson::{multipolygon_to_geojson, to_feature_collection};
pub use shp::read_geo_table;
pub use tabular::{write_csv, write_csv_to};
