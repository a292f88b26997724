use anyhow::{Context, Result};
use censomap::Session;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::SummaryArgs) -> Result<()> {
    let mut session = Session::in_memory(super::load_config(cli)?);
    let data = session.load(&super::sources(&args.sources)).context("[summary] failed to load sources")?;

    let overview = session.overview(&data)?;
    let regions = session.available_regions(&data)?;

    if args.json {
        let out = serde_json::json!({ "overview": &*overview, "regions": &*regions });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("population  {}", overview.population);
    match overview.age_mean {
        Some(mean) => println!("mean age    {mean:.2}"),
        None => println!("mean age    -"),
    }
    println!("regions     {}", overview.regions);
    println!("communes    {}", overview.communes);
    println!();
    for region in regions.iter() {
        println!("{:>4}  {}", region.region_id, region.region_name.as_deref().unwrap_or(""));
    }
    Ok(())
}
