use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::error::{Error, Result};

const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Reproject shapes from the CRS described by `source` (a PROJ.4 string) to
/// WGS84 lon/lat degrees.
pub fn reproject_to_wgs84(shapes: &[MultiPolygon<f64>], source: &str) -> Result<Vec<MultiPolygon<f64>>> {
    let from = Proj4::from_proj_string(source)
        .map_err(|e| Error::Projection(format!("failed to build source PROJ.4 {source:?}: {e}")))?;
    let to = Proj4::from_proj_string(WGS84)
        .map_err(|e| Error::Projection(format!("failed to build target PROJ.4: {e}")))?;

    // proj4rs works in radians for geographic systems.
    let source_is_geographic = source.contains("+proj=longlat") || source.contains("+proj=latlong");

    shapes.iter()
        .map(|shape| shape.try_map_coords(|coord: Coord<f64>| {
            let mut point = if source_is_geographic {
                (coord.x.to_radians(), coord.y.to_radians(), 0.0)
            } else {
                (coord.x, coord.y, 0.0)
            };
            transform(&from, &to, &mut point)
                .map_err(|e| Error::Projection(format!("transform failed at ({}, {}): {e}", coord.x, coord.y)))?;
            Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
        }))
        .collect()
}
