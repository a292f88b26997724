use std::collections::BTreeSet;

use polars::prelude::*;
use serde::Serialize;

use crate::census::columns::{AGE, COMUNA_ID, REGION_ID};
use crate::error::Result;
use crate::geom::GeoTable;
use crate::normalize::REGION_NAME;

use super::reduce::round2;

/// National headline figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub population: u64,
    pub age_mean: Option<f64>,
    pub regions: usize,
    pub communes: usize,
}

pub fn overview(census: &DataFrame) -> Result<Overview> {
    let ages = census.column(AGE)?.u8()?;
    let (sum, aged) = ages.into_no_null_iter()
        .fold((0u64, 0u64), |(sum, n), age| (sum + age as u64, n + 1));

    let regions = census.column(REGION_ID)?.i8()?.into_iter().flatten().collect::<BTreeSet<_>>();
    let communes = census.column(COMUNA_ID)?.i32()?.into_iter().flatten().collect::<BTreeSet<_>>();

    Ok(Overview {
        population: census.height() as u64,
        age_mean: (aged > 0).then(|| round2(sum as f64 / aged as f64)),
        regions: regions.len(),
        communes: communes.len(),
    })
}

/// A selectable region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionEntry {
    pub region_id: i8,
    pub region_name: Option<String>,
}

/// Distinct regions of a normalized region layer, sorted by id. The first
/// name seen for an id wins.
pub fn available_regions(regions: &GeoTable) -> Result<Vec<RegionEntry>> {
    let data = regions.data();
    let ids = data.column(REGION_ID)?.i8()?;
    let names = match data.get_column_index(REGION_NAME) {
        Some(_) => Some(data.column(REGION_NAME)?.str()?),
        None => None,
    };

    let mut entries = Vec::<RegionEntry>::new();
    for (row, id) in ids.into_iter().enumerate() {
        let Some(region_id) = id else { continue };
        if entries.iter().any(|e| e.region_id == region_id) { continue }
        let region_name = names.and_then(|n| n.get(row)).map(str::to_owned);
        entries.push(RegionEntry { region_id, region_name });
    }
    entries.sort_by_key(|e| e.region_id);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;

    #[test]
    fn headline_figures() {
        let df = DataFrame::new(vec![
            Column::new(REGION_ID.into(), vec![1i8, 1, 2]),
            Column::new(COMUNA_ID.into(), vec![101i32, 102, 201]),
            Column::new(AGE.into(), vec![10u8, 20, 31]),
        ]).unwrap();

        let out = overview(&df).unwrap();
        assert_eq!(out, Overview { population: 3, age_mean: Some(20.33), regions: 2, communes: 3 });
    }

    #[test]
    fn regions_are_distinct_and_sorted() {
        let df = DataFrame::new(vec![
            Column::new(REGION_ID.into(), vec![Some(13i8), Some(5), None, Some(5)]),
            Column::new(REGION_NAME.into(), vec!["Metropolitana", "Valparaíso", "?", "dup"]),
        ]).unwrap();
        let table = GeoTable::new(df, vec![MultiPolygon(vec![]); 4]).unwrap();

        let out = available_regions(&table).unwrap();
        assert_eq!(out, vec![
            RegionEntry { region_id: 5, region_name: Some("Valparaíso".into()) },
            RegionEntry { region_id: 13, region_name: Some("Metropolitana".into()) },
        ]);
    }
}
