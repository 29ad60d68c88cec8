// footprint_node/src/main.rs

use clap::Parser;
use footprint_node::cli::Cli;
use footprint_node::{logging, NodeConfig, Simulation};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = NodeConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let mut simulation = Simulation::new(config)?;
    let frames = simulation.frames();
    info!(
        "Publishing {} -> {} from {}, {} and {} in {}",
        frames.base, frames.footprint, frames.left_foot, frames.right_foot, frames.base, frames.odom
    );

    let summary = simulation.run();
    if let Some(last) = &summary.last_footprint {
        let t = last.transform.translation.vector;
        info!(
            "Last footprint at {}: ({:.3}, {:.3}, {:.3}) in {}",
            last.stamp, t.x, t.y, t.z, last.parent
        );
    }
    Ok(())
}
