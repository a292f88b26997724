use std::path::PathBuf;

/// Census aggregation and map-payload CLI
#[derive(clap::Parser, Debug)]
#[command(name = "censomap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON pipeline configuration; absent keys keep their defaults
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Compute every table and map payload into an output directory
    Build(BuildArgs),

    /// Print national headline figures and the region list
    Summary(SummaryArgs),
}

#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    /// Region shapefile (.shp, with its .dbf alongside)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Commune shapefile (.shp, with its .dbf alongside)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub communes: PathBuf,

    /// Person-level census microdata (delimited text)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub census: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output directory, defaults to "./out"
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Restrict communal outputs to one region
    #[arg(short, long)]
    pub region: Option<i8>,

    /// Simplification tolerance in degrees
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Maximum points per polygon ring
    #[arg(long)]
    pub max_points: Option<usize>,

    /// Size of the general-purpose sample
    #[arg(long)]
    pub sample_size: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}
