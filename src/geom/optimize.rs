//! Payload-oriented geometry reduction.
//!
//! Two lossy passes: Ramer-Douglas-Peucker simplification, where `tolerance`
//! is the largest perpendicular deviation in coordinate units (degrees for
//! WGS84 input), then a hard per-ring point budget enforced by fixed-stride
//! subsampling. The stride pass is a size control, not a shape-preserving
//! simplification; very irregular rings can lose features.
//! Rings that a pass would collapse below a valid ring are left untouched, and
//! a valid polygon that simplification would make invalid is kept as it was.

use geo::{LineString, MultiPolygon, Polygon, Simplify, Validation};

pub const DEFAULT_TOLERANCE: f64 = 0.01;
pub const DEFAULT_MAX_POINTS: usize = 1000;

/// Smallest closed ring: a triangle plus its closing coordinate.
const MIN_RING_COORDS: usize = 4;

/// Simplify and cap every polygon of every shape.
pub fn optimize_geometries(shapes: &[MultiPolygon<f64>], tolerance: f64, max_points: Option<usize>) -> Vec<MultiPolygon<f64>> {
    shapes.iter()
        .map(|mp| optimize_multipolygon(mp, tolerance, max_points))
        .collect()
}

/// Simplify a single shape, then cap each ring to `max_points` (plus the closing coordinate).
pub fn optimize_multipolygon(mp: &MultiPolygon<f64>, tolerance: f64, max_points: Option<usize>) -> MultiPolygon<f64> {
    let simplified = simplify_multipolygon(mp, tolerance);
    match max_points {
        Some(max_points) => map_rings(&simplified, |ring| cap_ring_points(ring, max_points)),
        None => simplified,
    }
}

/// Simplify each polygon so that no removed vertex lay farther than
/// `tolerance` from the simplified outline. Polygons with degenerate rings
/// are passed through unchanged.
pub fn simplify_multipolygon(mp: &MultiPolygon<f64>, tolerance: f64) -> MultiPolygon<f64> {
    if !(tolerance.is_finite() && tolerance > 0.0) { return mp.clone() }
    let simplified = MultiPolygon(mp.0.iter().map(|poly| simplify_polygon(poly, tolerance)).collect());

    // Separately valid parts can still be pulled into each other.
    if mp.is_valid() && !simplified.is_valid() { mp.clone() } else { simplified }
}

fn simplify_polygon(poly: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let degenerate = |ring: &LineString<f64>| ring.0.len() < MIN_RING_COORDS || !ring.is_closed();
    if std::iter::once(poly.exterior()).chain(poly.interiors()).any(degenerate) { return poly.clone() }

    let pick = |ring: &LineString<f64>| {
        let candidate = ring.simplify(&tolerance);
        if degenerate(&candidate) { ring.clone() } else { candidate }
    };
    let simplified = Polygon::new(pick(poly.exterior()), poly.interiors().iter().map(pick).collect());

    if poly.is_valid() && !simplified.is_valid() { poly.clone() } else { simplified }
}

/// Keep every `step`-th coordinate so that at most `max_points` survive,
/// re-closing the ring if the stride skipped the closing coordinate.
///
/// A budget below 3 cannot hold a closed ring, so the ring comes back
/// unchanged. [`PipelineConfig`](crate::PipelineConfig) rejects such budgets.
pub fn cap_ring_points(ring: &LineString<f64>, max_points: usize) -> LineString<f64> {
    let coords = &ring.0;
    if max_points == 0 || coords.len() <= max_points { return ring.clone() }

    let step = coords.len().div_ceil(max_points);
    let mut sampled = coords.iter().step_by(step).copied().collect::<Vec<_>>();
    if let (Some(&first), Some(&last)) = (sampled.first(), sampled.last()) {
        if first != last { sampled.push(first) }
    }

    if sampled.len() < MIN_RING_COORDS { ring.clone() } else { LineString(sampled) }
}

fn map_rings(mp: &MultiPolygon<f64>, f: impl Fn(&LineString<f64>) -> LineString<f64>) -> MultiPolygon<f64> {
    MultiPolygon(mp.0.iter()
        .map(|poly| Polygon::new(
            f(poly.exterior()),
            poly.interiors().iter().map(&f).collect(),
        ))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    /// A closed ring approximating a circle with `n` distinct vertices.
    fn circle(n: usize, radius: f64) -> LineString<f64> {
        let mut coords = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64 * std::f64::consts::TAU;
                Coord { x: radius * t.cos(), y: radius * t.sin() }
            })
            .collect::<Vec<_>>();
        coords.push(coords[0]);
        LineString(coords)
    }

    fn assert_closed(mp: &MultiPolygon<f64>) {
        for poly in &mp.0 {
            for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
                assert!(ring.0.len() >= MIN_RING_COORDS, "ring collapsed to {} coords", ring.0.len());
                assert_eq!(ring.0.first(), ring.0.last(), "ring lost closure");
            }
        }
    }

    #[test]
    fn cap_respects_budget_and_closure() {
        for n in [10, 99, 500, 1001, 2500, 7919] {
            for max_points in [3, 4, 7, 100, 500, 1000] {
                let capped = cap_ring_points(&circle(n, 1.0), max_points);
                assert!(capped.0.len() <= max_points + 1, "n={n} max={max_points} got {}", capped.0.len());
                assert!(capped.is_closed());
            }
        }
    }

    #[test]
    fn cap_is_noop_under_budget() {
        let ring = circle(50, 1.0);
        assert_eq!(cap_ring_points(&ring, 51), ring);
        assert_eq!(cap_ring_points(&ring, 0), ring);
        assert_eq!(cap_ring_points(&ring, 1), ring);
        assert_eq!(cap_ring_points(&ring, 2), ring);
    }

    #[test]
    fn optimize_keeps_holes_closed() {
        let poly = Polygon::new(circle(3000, 10.0), vec![circle(1500, 2.0)]);
        let mp = MultiPolygon(vec![poly]);
        let optimized = optimize_multipolygon(&mp, DEFAULT_TOLERANCE, Some(500));

        assert_closed(&optimized);
        assert_eq!(optimized.0[0].interiors().len(), 1);
        assert!(optimized.0[0].exterior().0.len() <= 501);
    }

    #[test]
    fn huge_tolerance_keeps_a_valid_ring() {
        let mp = MultiPolygon(vec![Polygon::new(circle(40, 0.001), vec![])]);
        let simplified = simplify_multipolygon(&mp, 10.0);
        assert_closed(&simplified);
        assert!(simplified.0[0].exterior().0.len() <= 41);
    }

    #[test]
    fn features_wider_than_tolerance_survive() {
        // Densely sampled bottom edge with a 0.05 deep notch in the middle.
        let mut coords = (0..=1000)
            .map(|i| Coord { x: i as f64 * 0.001, y: 0.0 })
            .collect::<Vec<_>>();
        coords[500] = Coord { x: 0.5, y: -0.05 };
        coords.extend([Coord { x: 1.0, y: 1.0 }, Coord { x: 0.0, y: 1.0 }, Coord { x: 0.0, y: 0.0 }]);
        let original = Polygon::new(LineString(coords), vec![]);
        let mp = MultiPolygon(vec![original.clone()]);

        let simplified = simplify_multipolygon(&mp, DEFAULT_TOLERANCE);
        let exterior = simplified.0[0].exterior();
        assert!(exterior.0.contains(&Coord { x: 0.5, y: -0.05 }), "notch apex was dropped");
        assert!(exterior.0.len() < 20, "edge not simplified: {} coords", exterior.0.len());
        assert!(exterior.0.len() < original.exterior().0.len());
        assert!(simplified.is_valid());
    }

    #[test]
    fn simplification_never_breaks_a_valid_polygon() {
        // A shallow hole tucked into a notch that lies within tolerance.
        let square = |x0: f64, y0: f64, x1: f64, y1: f64| LineString(vec![
            Coord { x: x0, y: y0 }, Coord { x: x1, y: y0 }, Coord { x: x1, y: y1 },
            Coord { x: x0, y: y1 }, Coord { x: x0, y: y0 },
        ]);
        let mut exterior = square(0.0, 0.0, 1.0, 1.0).0;
        exterior.insert(1, Coord { x: 0.5, y: -0.004 });
        let poly = Polygon::new(LineString(exterior), vec![square(0.45, -0.003, 0.55, -0.001)]);
        assert!(poly.is_valid());

        let mp = MultiPolygon(vec![poly]);
        let simplified = simplify_multipolygon(&mp, DEFAULT_TOLERANCE);
        assert!(simplified.is_valid());
        assert_eq!(simplified, mp);
    }

    #[test]
    fn non_positive_tolerance_is_identity() {
        let mp = MultiPolygon(vec![Polygon::new(circle(40, 1.0), vec![])]);
        assert_eq!(simplify_multipolygon(&mp, 0.0), mp);
        assert_eq!(simplify_multipolygon(&mp, f64::NAN), mp);
    }

    #[test]
    fn degenerate_shapes_do_not_panic() {
        let flat = LineString(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }]);
        let mp = MultiPolygon(vec![
            Polygon::new(flat.clone(), vec![]),
            Polygon::new(LineString(vec![]), vec![]),
        ]);
        let optimized = optimize_multipolygon(&mp, DEFAULT_TOLERANCE, Some(2));
        assert_eq!(optimized.0.len(), 2);
        assert_eq!(optimized.0[0].exterior(), &flat);

        assert!(optimize_multipolygon(&MultiPolygon(vec![]), DEFAULT_TOLERANCE, Some(10)).0.is_empty());
    }

    #[test]
    fn zero_tolerance_only_caps() {
        let mp = MultiPolygon(vec![Polygon::new(circle(2000, 1.0), vec![])]);
        let optimized = optimize_multipolygon(&mp, 0.0, Some(1000));
        assert_closed(&optimized);
        assert!(optimized.0[0].exterior().0.len() <= 1001);
    }
}
