//! sensor-cli - Command line tool for browsing sensor readings and resistance anomalies.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "sensor-cli",
    version,
    about = "Sensor trend viewer with resistance anomaly highlighting"
)]
struct Cli {
    #[command(subcommand)]
    command: sensor_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("sensor-cli {}", env!("CARGO_PKG_VERSION"));
    sensor_cmd::run(cli.command)
}
