use polars::prelude::*;

use crate::census::columns::{COMUNA_ID, REGION_ID};
use crate::error::Result;

use super::reduce::summary_reductions;

/// One row per `region_id`: population, age mean/median/std and percent
/// female. Rows with a null region are left out.
pub fn regional_summary(census: &DataFrame) -> Result<DataFrame> {
    summarize(census.clone().lazy(), REGION_ID)
}

/// One row per `comuna_id`, optionally restricted to the communes of one
/// region. An unmatched region yields an empty table with the full schema.
pub fn communal_summary(census: &DataFrame, region: Option<i8>) -> Result<DataFrame> {
    let mut frame = census.clone().lazy();
    if let Some(target) = region {
        frame = frame.filter(col(REGION_ID).eq(lit(target)));
    }
    summarize(frame, COMUNA_ID)
}

/// Group by `key` and apply every summary reduction in one aggregation.
fn summarize(frame: LazyFrame, key: &str) -> Result<DataFrame> {
    let summary = frame
        .filter(col(key).is_not_null())
        .group_by([col(key)])
        .agg(summary_reductions())
        .collect()?;
    Ok(summary.sort([key], SortMultipleOptions::default())?)
}
