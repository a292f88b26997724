//! Canonical column names for region and commune attribute tables.
//!
//! Shapefile vintages disagree on what the key columns are called; the
//! candidate lists in [`SchemaOptions`] are tried in order and the first hit
//! wins.

use log::warn;
use polars::prelude::*;

use crate::census::columns::{COMUNA_ID, REGION_ID};
use crate::config::SchemaOptions;
use crate::error::{Error, Result};
use crate::geom::GeoTable;

/// Region foreign key on the commune layer.
pub const REGION_ID_COM: &str = "region_id_com";
pub const REGION_NAME: &str = "region_name";
pub const COMUNA_NAME: &str = "comuna_name";
pub const PROVINCE_NAME: &str = "province_name";

const REGION_NAMES: [(&str, &str); 1] = [("Region", REGION_NAME)];
const COMMUNE_NAMES: [(&str, &str); 2] = [("Comuna", COMUNA_NAME), ("Provincia", PROVINCE_NAME)];

/// Rename the first candidate present in `df` to `canonical`.
///
/// Fails with [`Error::Schema`] listing every candidate when none is present.
/// A column already named `canonical` counts as a match.
pub fn normalize_column(mut df: DataFrame, candidates: &[String], canonical: &str) -> Result<DataFrame> {
    let found = std::iter::once(canonical)
        .chain(candidates.iter().map(String::as_str))
        .find(|name| df.get_column_index(name).is_some())
        .map(str::to_owned);

    match found {
        Some(name) if name == canonical => Ok(df),
        Some(name) => {
            df.rename(&name, canonical.into())?;
            Ok(df)
        }
        None => Err(Error::Schema {
            target: canonical.to_string(),
            candidates: candidates.to_vec(),
        }),
    }
}

/// Normalize the region layer: `region_id` (Int8) plus an optional `region_name`.
pub fn normalize_regions(table: GeoTable, schema: &SchemaOptions) -> Result<GeoTable> {
    let (df, shapes) = table.into_parts();
    let mut df = normalize_column(df, &schema.region_key, REGION_ID)?;
    coerce_key(&mut df, REGION_ID, &DataType::Int8)?;
    rename_names(&mut df, &REGION_NAMES)?;
    GeoTable::new(df, shapes)
}

/// Normalize the commune layer: `comuna_id` (Int32), the optional
/// `region_id_com` foreign key (Int8) and the optional name columns.
pub fn normalize_communes(table: GeoTable, schema: &SchemaOptions) -> Result<GeoTable> {
    let (df, shapes) = table.into_parts();
    let mut df = normalize_column(df, &schema.commune_key, COMUNA_ID)?;
    coerce_key(&mut df, COMUNA_ID, &DataType::Int32)?;

    // The region key of a commune is optional: without it no region filter applies.
    df = match normalize_column(df.clone(), &schema.commune_region_key, REGION_ID_COM) {
        Ok(mut renamed) => {
            coerce_key(&mut renamed, REGION_ID_COM, &DataType::Int8)?;
            renamed
        }
        Err(Error::Schema { .. }) => df,
        Err(e) => return Err(e),
    };

    rename_names(&mut df, &COMMUNE_NAMES)?;
    GeoTable::new(df, shapes)
}

/// Cast a key column to `dtype`, going through Float64 so text and
/// numeric dbase fields behave alike. Unparseable values become null.
fn coerce_key(df: &mut DataFrame, name: &str, dtype: &DataType) -> Result<()> {
    let column = df.column(name)?;
    if column.dtype() == dtype { return Ok(()) }

    let before = column.null_count();
    let coerced = column
        .cast(&DataType::Float64)?
        .cast(dtype)?;
    let lost = coerced.null_count().saturating_sub(before);
    if lost > 0 {
        warn!("[normalize] {lost} value(s) of '{name}' could not be read as {dtype}");
    }
    df.with_column(coerced)?;
    Ok(())
}

fn rename_names(df: &mut DataFrame, names: &[(&str, &str)]) -> Result<()> {
    for &(source, canonical) in names {
        if df.get_column_index(source).is_none() { continue }
        let trimmed: StringChunked = df.column(source)?
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map(str::trim))
            .collect();
        df.replace(source, trimmed.with_name(source.into()).into_series())?;
        df.rename(source, canonical.into())?;
    }
    Ok(())
}
