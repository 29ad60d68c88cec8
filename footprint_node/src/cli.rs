use clap::Parser;
use std::path::PathBuf;

/// Publishes the base_footprint frame of a walking robot.
///
/// Runs the footprint pipeline against a simulated walking gait and reports
/// how many footprints were published.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Prefix for every frame name that is not fully qualified.
    #[arg(long)]
    pub tf_prefix: Option<String>,

    /// Override the simulated duration, in seconds.
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Seed for the simulation's random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the effective configuration and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,

    /// Log every trigger (debug level for the footprint crates).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Applies the command-line overrides on top of a loaded config.
    pub fn apply(&self, config: &mut crate::config::NodeConfig) {
        if let Some(prefix) = &self.tf_prefix {
            config.tf_prefix = prefix.clone();
        }
        if let Some(duration) = self.duration {
            config.simulation.duration_seconds = duration;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = Some(seed);
        }
    }
}
