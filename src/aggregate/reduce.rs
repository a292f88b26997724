//! Named reductions, one per summary column.
//!
//! Each function returns an aggregation expression already aliased to its
//! output column, so a summary is a single `group_by(..).agg(..)` over
//! [`summary_reductions`] and every statistic can be tested alone.

use polars::prelude::*;

use crate::census::{columns::{AGE, SEX_CATEGORY}, SexCategory};

pub const POPULATION_TOTAL: &str = "population_total";
pub const AGE_MEAN: &str = "age_mean";
pub const AGE_MEDIAN: &str = "age_median";
pub const AGE_STD: &str = "age_std";
pub const PCT_FEMALE: &str = "pct_female";

/// Row count of the group.
pub fn population_total() -> Expr {
    len().cast(DataType::UInt64).alias(POPULATION_TOTAL)
}

pub fn age_mean() -> Expr {
    round2_expr(col(AGE).cast(DataType::Float64).mean()).alias(AGE_MEAN)
}

/// Middle age; the mean of the two middle ages for an even count.
pub fn age_median() -> Expr {
    round2_expr(col(AGE).cast(DataType::Float64).median()).alias(AGE_MEDIAN)
}

/// Sample standard deviation (n - 1 denominator). Null below two ages.
pub fn age_std() -> Expr {
    round2_expr(col(AGE).cast(DataType::Float64).std(1)).alias(AGE_STD)
}

/// Share of the group whose sex category is Mujer, in percent. Rows without
/// a category count toward the denominator. Null for an empty group.
pub fn pct_female() -> Expr {
    let female = col(SEX_CATEGORY)
        .eq(lit(SexCategory::Mujer.label()))
        .sum()
        .cast(DataType::Float64);
    let share = female / len().cast(DataType::Float64) * lit(100.0);
    when(len().gt(lit(0)))
        .then(round2_expr(share))
        .otherwise(lit(NULL))
        .alias(PCT_FEMALE)
}

/// Every summary column after the key, in output order.
pub fn summary_reductions() -> Vec<Expr> {
    vec![population_total(), age_mean(), age_median(), age_std(), pct_female()]
}

fn round2_expr(expr: Expr) -> Expr {
    expr.round(2, RoundMode::HalfAwayFromZero)
}

/// Round half away from zero to two decimals.
#[inline]
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }
