use clap::Parser;
use ld06_driver::{run_driver, DriverConfig};
use std::time::{Duration, Instant};

/// Reads the LD06 point map and prints every snapshot as a JSON line.
#[derive(Parser)]
#[command(about = "LD06 LiDAR map reader.", disable_version_flag = true)]
struct Args {
    /// The device path to a serial port
    port: Option<String>,

    /// TOML configuration file; the port argument overrides its `port`
    #[arg(short, long)]
    config: Option<String>,

    /// Interval between counter reports, in seconds
    #[arg(long, default_value_t = 5)]
    stats_interval: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DriverConfig::from_file(path)?,
        None => DriverConfig::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    let (driver_threads, snapshot_rx) = run_driver(&config)?;
    let stats_interval = Duration::from_secs(args.stats_interval);
    let mut last_report = Instant::now();

    while let Ok(snapshot) = snapshot_rx.recv() {
        println!("{}", serde_json::to_string(&snapshot)?);

        if last_report.elapsed() >= stats_interval {
            let counters = driver_threads.stats().counters();
            log::info!("{}", serde_json::to_string(&counters)?);
            last_report = Instant::now();
        }
    }

    drop(driver_threads);
    Ok(())
}
