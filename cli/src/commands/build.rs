use std::{fs, path::Path};

use anyhow::{Context, Result};
use censomap::{write_csv, MapPayload, Session};
use log::info;
use polars::prelude::DataFrame;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::BuildArgs) -> Result<()> {
    let mut config = super::load_config(cli)?;
    if let Some(tolerance) = args.tolerance { config.geometry.tolerance = tolerance }
    if let Some(max_points) = args.max_points { config.geometry.max_points = Some(max_points) }
    if let Some(size) = args.sample_size { config.sampling.sample_size = size }
    if args.region.is_some() { config.target_region = args.region }
    let region = config.target_region;

    let out_dir = args.output.clone().unwrap_or("./out".into());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("[build] failed to create {}", out_dir.display()))?;

    let mut session = Session::in_memory(config);
    let data = session.load(&super::sources(&args.sources)).context("[build] failed to load sources")?;

    let tables = [
        ("regional_summary.csv", session.regional_summary(&data)?),
        ("communal_summary.csv", session.communal_summary(&data, region)?),
        ("age_by_region.csv", session.age_by_region(&data)?),
        ("sex_by_region.csv", session.sex_by_region(&data)?),
        ("census_sample.csv", session.census_sample(&data)?),
        ("sample.csv", session.sample(&data)?),
        ("pyramid.csv", session.pyramid(&data)?),
    ];
    for (name, table) in &tables {
        write_table(table, &out_dir.join(name))?;
    }

    write_payload(&*session.region_payload(&data)?, &out_dir.join("regions.geojson"))?;
    write_payload(&*session.commune_payload(&data, region)?, &out_dir.join("communes.geojson"))?;

    info!("[build] wrote {} tables and 2 payloads to {}", tables.len(), out_dir.display());
    Ok(())
}

fn write_table(df: &DataFrame, path: &Path) -> Result<()> {
    info!("[build] writing {} ({} rows)", path.display(), df.height());
    write_csv(df, path).with_context(|| format!("[build] failed to write {}", path.display()))
}

fn write_payload(payload: &MapPayload, path: &Path) -> Result<()> {
    info!("[build] writing {} ({} features, fields {:?})", path.display(), payload.len(), payload.fields());
    let text = payload.to_geojson_string()?;
    fs::write(path, text).with_context(|| format!("[build] failed to write {}", path.display()))
}
