use polars::prelude::*;
use rand::{rngs::StdRng, seq::index, SeedableRng};

use crate::config::SamplingOptions;
use crate::error::Result;

/// The bounded person-level sample used for visual summaries.
pub fn census_sample(census: &DataFrame, options: &SamplingOptions) -> Result<DataFrame> {
    sample(census, options.census_sample_size, options.seed)
}

/// Uniform sample of `size` rows without replacement, reproducible for a
/// given seed. Tables with at most `size` rows are returned unchanged.
/// Sampled rows keep their relative table order.
pub fn sample(df: &DataFrame, size: usize, seed: u64) -> Result<DataFrame> {
    if df.height() <= size { return Ok(df.clone()) }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = index::sample(&mut rng, df.height(), size)
        .into_iter()
        .map(|i| i as IdxSize)
        .collect::<Vec<_>>();
    picked.sort_unstable();

    Ok(df.take(&IdxCa::from_vec("idx".into(), picked))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: u32) -> DataFrame {
        DataFrame::new(vec![Column::new("row".into(), (0..n).collect::<Vec<_>>())]).unwrap()
    }

    #[test]
    fn same_seed_same_rows() {
        let df = table(1_000);
        let a = sample(&df, 100, 42).unwrap();
        let b = sample(&df, 100, 42).unwrap();
        assert_eq!(a.height(), 100);
        assert!(a.equals(&b));
    }

    #[test]
    fn different_seed_different_rows() {
        let df = table(1_000);
        assert!(!sample(&df, 100, 1).unwrap().equals(&sample(&df, 100, 2).unwrap()));
    }

    #[test]
    fn small_tables_pass_through() {
        let df = table(10);
        assert!(sample(&df, 10, 42).unwrap().equals(&df));
        assert!(sample(&df, 50_000, 42).unwrap().equals(&df));
    }

    #[test]
    fn rows_are_distinct_and_ordered() {
        let out = sample(&table(500), 50, 7).unwrap();
        let rows = out.column("row").unwrap().u32().unwrap().into_no_null_iter().collect::<Vec<_>>();
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn census_sample_uses_configured_size() {
        let options = SamplingOptions { census_sample_size: 25, ..SamplingOptions::default() };
        assert_eq!(census_sample(&table(100), &options).unwrap().height(), 25);
    }
}
