//! Joining aggregates onto geometries and trimming the result for rendering.

mod build;
mod join;

pub use build::{build_map_payload, MapPayload, ID_FIELDS, NAME_FIELDS, PAYLOAD_MAX_POINTS, PAYLOAD_TOLERANCE};
pub use join::{commune_map, region_map, with_density, AREA_KM2, DENSITY};
