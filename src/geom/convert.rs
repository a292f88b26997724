use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Shape};

/// Convert a shapefile shape to a `geo::MultiPolygon<f64>`.
///
/// Null shapes become an empty multipolygon; non-areal shapes return the
/// offending shape type name.
pub(crate) fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>, String> {
    match shape {
        Shape::Polygon(p) => Ok(rings_to_multipolygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonM(p) => Ok(rings_to_multipolygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::PolygonZ(p) => Ok(rings_to_multipolygon(p.rings(), |pt| Coord { x: pt.x, y: pt.y })),
        Shape::NullShape => Ok(MultiPolygon(vec![])),
        other => Err(format!("{:?}", other.shapetype())),
    }
}

/// Group rings into polygons: each outer ring owns the inner rings that follow
/// it, which is the order shapefiles store them in.
fn rings_to_multipolygon<P>(rings: &[PolygonRing<P>], to_coord: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn closed(mut coords: Vec<Coord<f64>>) -> LineString<f64> {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
        LineString(coords)
    }

    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in rings {
        let coords = ring.points().iter().map(&to_coord).collect::<Vec<_>>();
        match ring {
            PolygonRing::Outer(_) => {
                if let Some(ext) = exterior.replace(closed(coords)) {
                    polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
            }
            PolygonRing::Inner(_) => holes.push(closed(coords)),
        }
    }
    if let Some(ext) = exterior {
        polygons.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polygons)
}
