use polars::prelude::*;

use crate::aggregate::{round2, POPULATION_TOTAL};
use crate::census::columns::{COMUNA_ID, REGION_ID};
use crate::error::Result;
use crate::geom::GeoTable;
use crate::normalize::REGION_ID_COM;

pub const AREA_KM2: &str = "area_km2";
pub const DENSITY: &str = "density";

/// Region geometries with the regional summary joined on `region_id`.
/// Regions without census rows keep null aggregates.
pub fn region_map(regions: &GeoTable, summary: &DataFrame) -> Result<GeoTable> {
    regions.left_join(summary, REGION_ID)
}

/// Commune geometries with the communal summary joined on `comuna_id`,
/// restricted to one region when `region` is given and the layer carries
/// `region_id_com`.
pub fn commune_map(communes: &GeoTable, summary: &DataFrame, region: Option<i8>) -> Result<GeoTable> {
    let scoped = match region {
        Some(target) if communes.has_column(REGION_ID_COM) => {
            let mask: BooleanChunked = communes.data()
                .column(REGION_ID_COM)?
                .i8()?
                .into_iter()
                .map(|id| id == Some(target))
                .collect();
            communes.filter(&mask)?
        }
        _ => communes.clone(),
    };
    scoped.left_join(summary, COMUNA_ID)
}

/// Append `area_km2` (geodesic) and `density` (people per km²).
/// Density falls back to 0 for a missing population or a zero area.
pub fn with_density(table: GeoTable) -> Result<GeoTable> {
    let areas = table.areas_km2();
    let population = match table.has_column(POPULATION_TOTAL) {
        true => table.data().column(POPULATION_TOTAL)?.cast(&DataType::Float64)?.f64()?.to_vec(),
        false => vec![None; table.len()],
    };

    let density = population.iter().zip(&areas)
        .map(|(people, &area)| match people {
            Some(people) if area > 0.0 => round2(people / area),
            _ => 0.0,
        })
        .collect::<Vec<f64>>();
    let areas = areas.into_iter().map(round2).collect::<Vec<f64>>();

    let (mut data, shapes) = table.into_parts();
    data.with_column(Column::new(AREA_KM2.into(), areas))?;
    data.with_column(Column::new(DENSITY.into(), density))?;
    GeoTable::new(data, shapes)
}
