mod convert;
mod optimize;
mod proj;
mod table;

pub(crate) use convert::shape_to_multipolygon;
pub use optimize::{cap_ring_points, optimize_geometries, optimize_multipolygon, simplify_multipolygon, DEFAULT_MAX_POINTS, DEFAULT_TOLERANCE};
pub use proj::reproject_to_wgs84;
pub use table::GeoTable;
