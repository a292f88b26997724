pub mod build;
pub mod summary;

use anyhow::{Context, Result};
use censomap::{PipelineConfig, Sources};

use crate::cli::{Cli, SourceArgs};

pub(crate) fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("[config] failed to load {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

pub(crate) fn sources(args: &SourceArgs) -> Sources {
    Sources {
        regions: args.regions.clone(),
        communes: args.communes.clone(),
        census: args.census.clone(),
    }
}
