use std::collections::BTreeSet;

use polars::prelude::*;

use crate::census::{columns::{AGE_BAND, REGION_ID, SEX_CATEGORY}, AgeBand, SexCategory};
use crate::error::Result;

pub const COUNT: &str = "count";

/// Counts per `(region_id, age_band)`. Every region with at least one banded
/// row lists all five bands, zero-filled, in band order.
pub fn age_by_region(census: &DataFrame) -> Result<DataFrame> {
    let labels = AgeBand::ALL.map(AgeBand::label);
    region_cross(census, AGE_BAND, &labels)
}

/// Counts per `(region_id, sex_category)`, both categories listed for every
/// region with at least one categorized row.
pub fn sex_by_region(census: &DataFrame) -> Result<DataFrame> {
    let labels = SexCategory::ALL.map(SexCategory::label);
    region_cross(census, SEX_CATEGORY, &labels)
}

/// Population pyramid: counts per `(age_band, sex_category)`, all ten
/// combinations present.
pub fn pyramid(census: &DataFrame) -> Result<DataFrame> {
    let (bands, sexes): (Vec<_>, Vec<_>) = AgeBand::ALL.iter()
        .flat_map(|band| SexCategory::ALL.map(|sex| (band.label(), sex.label())))
        .unzip();
    let grid = DataFrame::new(vec![
        Column::new(AGE_BAND.into(), bands),
        Column::new(SEX_CATEGORY.into(), sexes),
    ])?;
    zero_filled(grid, counts(census, [AGE_BAND, SEX_CATEGORY])?, [AGE_BAND, SEX_CATEGORY])
}

fn region_cross(census: &DataFrame, key: &str, labels: &[&str]) -> Result<DataFrame> {
    let counted = counts(census, [REGION_ID, key])?;
    let regions = counted.column(REGION_ID)?.i8()?
        .into_no_null_iter()
        .collect::<BTreeSet<_>>();

    let (ids, keys): (Vec<i8>, Vec<&str>) = regions.iter()
        .flat_map(|&region| labels.iter().map(move |&label| (region, label)))
        .unzip();
    let grid = DataFrame::new(vec![
        Column::new(REGION_ID.into(), ids),
        Column::new(key.into(), keys),
    ])?;
    zero_filled(grid, counted, [REGION_ID, key])
}

/// Row counts per key pair; rows with a null in either key are skipped.
fn counts(census: &DataFrame, keys: [&str; 2]) -> Result<DataFrame> {
    Ok(census.clone().lazy()
        .filter(col(keys[0]).is_not_null().and(col(keys[1]).is_not_null()))
        .group_by(keys.map(col))
        .agg([len().cast(DataType::UInt64).alias(COUNT)])
        .collect()?)
}

/// Align counts onto the full key grid, keeping grid order; missing cells are 0.
fn zero_filled(grid: DataFrame, counted: DataFrame, keys: [&str; 2]) -> Result<DataFrame> {
    let on = keys.map(col);
    let args = JoinArgs { maintain_order: MaintainOrderJoin::Left, ..JoinArgs::new(JoinType::Left) };
    Ok(grid.lazy()
        .join(counted.lazy(), on.clone(), on, args)
        .with_columns([col(COUNT).fill_null(lit(0u64))])
        .collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census() -> DataFrame {
        DataFrame::new(vec![
            Column::new(REGION_ID.into(), vec![Some(2i8), Some(1), Some(1), None, Some(1)]),
            Column::new(AGE_BAND.into(), vec![Some("0-17"), Some("65+"), Some("0-17"), Some("18-29"), None]),
            Column::new(SEX_CATEGORY.into(), vec![Some("Mujer"), Some("Hombre"), None, Some("Mujer"), Some("Mujer")]),
        ]).unwrap()
    }

    fn count_values(df: &DataFrame) -> Vec<u64> {
        df.column(COUNT).unwrap().u64().unwrap().into_no_null_iter().collect()
    }

    #[test]
    fn age_table_is_zero_filled_per_region() {
        let out = age_by_region(&census()).unwrap();
        assert_eq!(out.height(), 10);
        assert_eq!(count_values(&out), [1, 0, 0, 0, 1, 1, 0, 0, 0, 0]);
        let first_region = out.column(REGION_ID).unwrap().i8().unwrap().get(0);
        assert_eq!(first_region, Some(1));
    }

    #[test]
    fn sex_table_skips_null_keys() {
        let out = sex_by_region(&census()).unwrap();
        assert_eq!(out.height(), 4);
        assert_eq!(count_values(&out), [1, 1, 0, 1]);
    }

    #[test]
    fn pyramid_lists_every_cell() {
        let out = pyramid(&census()).unwrap();
        assert_eq!(out.height(), 10);
        assert_eq!(count_values(&out).iter().sum::<u64>(), 3);
        let labels = out.column(AGE_BAND).unwrap().str().unwrap();
        assert_eq!(labels.get(0), Some("0-17"));
        assert_eq!(labels.get(9), Some("65+"));
    }
}
