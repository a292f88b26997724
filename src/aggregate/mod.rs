//! Pre-computed tables over the person-level census.
//!
//! Every function here is pure over its input table and rounds floating
//! outputs to two decimals before returning.

mod cross;
mod overview;
mod reduce;
mod sample;
mod summary;

pub use cross::{age_by_region, pyramid, sex_by_region, COUNT};
pub use overview::{available_regions, overview, Overview, RegionEntry};
pub use reduce::{
    age_mean, age_median, age_std, pct_female, population_total, round2, summary_reductions,
    AGE_MEAN, AGE_MEDIAN, AGE_STD, PCT_FEMALE, POPULATION_TOTAL,
};
pub use sample::{census_sample, sample};
pub use summary::{communal_summary, regional_summary};
