use geo::{BoundingRect, Coord, GeodesicArea, MultiPolygon, Rect};
use polars::prelude::*;

use crate::error::{Error, Result};

const ROW_INDEX: &str = "__row";

/// Attribute table with one geometry per row, in row order.
#[derive(Debug, Clone)]
pub struct GeoTable {
    data: DataFrame,
    shapes: Vec<MultiPolygon<f64>>,
}

impl GeoTable {
    /// A table without columns has no meaningful height and is accepted as is.
    pub fn new(data: DataFrame, shapes: Vec<MultiPolygon<f64>>) -> Result<Self> {
        if data.width() > 0 && data.height() != shapes.len() {
            return Err(Error::LengthMismatch { shapes: shapes.len(), rows: data.height() });
        }
        Ok(Self { data, shapes })
    }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    pub fn into_parts(self) -> (DataFrame, Vec<MultiPolygon<f64>>) { (self.data, self.shapes) }

    /// Whether the attribute table carries a column called `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.data.get_column_names().iter().any(|c| c.as_str() == name)
    }

    /// Replace the attribute table, keeping the geometries.
    pub fn with_data(self, data: DataFrame) -> Result<Self> { Self::new(data, self.shapes) }

    /// Replace the geometries, keeping the attribute table.
    pub fn with_shapes(self, shapes: Vec<MultiPolygon<f64>>) -> Result<Self> { Self::new(self.data, shapes) }

    /// Keep the rows where `mask` is true.
    pub fn filter(&self, mask: &BooleanChunked) -> Result<Self> {
        let shapes = self.shapes.iter()
            .zip(mask.into_iter())
            .filter_map(|(shape, keep)| (keep == Some(true)).then(|| shape.clone()))
            .collect();
        Self::new(self.data.filter(mask)?, shapes)
    }

    /// Keep the first `n` rows in current order.
    pub fn head(&self, n: usize) -> Self {
        Self {
            data: self.data.head(Some(n)),
            shapes: self.shapes.iter().take(n).cloned().collect(),
        }
    }

    /// Left-join `other` on `key`, preserving this table's row order. Rows
    /// without a match get nulls in the joined columns. `other` must have at
    /// most one row per key.
    pub fn left_join(&self, other: &DataFrame, key: &str) -> Result<Self> {
        let joined = self.data
            .with_row_index(ROW_INDEX.into(), None)?
            .left_join(other, [key], [key])?
            .sort([ROW_INDEX], SortMultipleOptions::default())?
            .drop(ROW_INDEX)?;
        Self::new(joined, self.shapes.clone())
    }

    /// Bounding rectangle of all shapes.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes.iter()
            .filter_map(|shape| shape.bounding_rect())
            .reduce(|a, b| Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            ))
    }

    /// Geodesic area of each shape in km², assuming lon/lat coordinates.
    pub fn areas_km2(&self) -> Vec<f64> {
        self.shapes.iter()
            .map(|shape| shape.geodesic_area_unsigned() / 1e6)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn unit_square(x0: f64) -> MultiPolygon<f64> {
        let ring = LineString::from(vec![(x0, 0.0), (x0 + 1.0, 0.0), (x0 + 1.0, 1.0), (x0, 1.0), (x0, 0.0)]);
        MultiPolygon(vec![Polygon::new(ring, vec![])])
    }

    fn table() -> GeoTable {
        let data = DataFrame::new(vec![
            Column::new("region_id".into(), vec![3i8, 1, 2]),
            Column::new("region_name".into(), vec!["c", "a", "b"]),
        ]).unwrap();
        GeoTable::new(data, vec![unit_square(0.0), unit_square(2.0), unit_square(4.0)]).unwrap()
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let data = DataFrame::new(vec![Column::new("region_id".into(), vec![1i8])]).unwrap();
        assert!(matches!(GeoTable::new(data, vec![]), Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn left_join_keeps_order_and_unmatched_rows() {
        let stats = DataFrame::new(vec![
            Column::new("region_id".into(), vec![1i8, 3]),
            Column::new("population_total".into(), vec![10u64, 30]),
        ]).unwrap();

        let joined = table().left_join(&stats, "region_id").unwrap();
        let ids = joined.data().column("region_id").unwrap().i8().unwrap().into_iter().collect::<Vec<_>>();
        let pops = joined.data().column("population_total").unwrap().u64().unwrap().into_iter().collect::<Vec<_>>();

        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
        assert_eq!(pops, vec![Some(30), Some(10), None]);
        assert_eq!(joined.len(), 3);
    }

    #[test]
    fn filter_and_head_keep_shapes_aligned() {
        let t = table();
        let mask = t.data().column("region_id").unwrap().i8().unwrap()
            .into_iter().map(|v| v != Some(1)).collect::<BooleanChunked>();
        let filtered = t.filter(&mask).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.shapes()[1], unit_square(4.0));

        let head = t.head(1);
        assert_eq!(head.len(), 1);
        assert_eq!(head.data().height(), 1);
        assert_eq!(head.shapes()[0], unit_square(0.0));
    }

    #[test]
    fn bounds_cover_all_shapes() {
        let rect = table().bounds().unwrap();
        assert_eq!((rect.min().x, rect.max().x), (0.0, 5.0));
    }

    #[test]
    fn one_degree_square_at_equator_area() {
        let areas = table().areas_km2();
        // ~111.3 km × ~110.6 km
        assert!((areas[0] - 12_308.0).abs() < 50.0, "area {}", areas[0]);
    }
}
