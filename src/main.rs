// src/main.rs

//! qfsm - run the sensor-to-state scenarios and write their figures

use anyhow::{Context, Result};
use clap::Parser;
use qfsm::{RunConfig, ScenarioOutput, SensorVector, save_summary, simulate_scenario};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "qfsm")]
#[command(version)]
#[command(about = "Encode six sensor readings as a quantum circuit, simulate it, and plot the outcome", long_about = None)]
struct Cli {
    /// TOML file with run settings; flags below override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Number of measurement shots
    #[arg(short, long)]
    shots: Option<u64>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Print the text diagram and histogram of each run
    #[arg(long)]
    show: bool,

    /// Run one custom scenario instead of the built-in pair (e.g. "010111")
    #[arg(long, value_name = "BITS")]
    sensors: Option<SensorVector>,

    /// File-name tag for the custom scenario
    #[arg(short, long, requires = "sensors")]
    tag: Option<String>,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(outdir) = &self.outdir {
            config.outdir = outdir.clone();
        }
        if let Some(shots) = self.shots {
            config.shots = shots;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(tag) = &self.tag {
            config.tag = tag.clone();
        }
        config.show |= self.show;
        Ok(config)
    }
}

fn report(output: &ScenarioOutput) {
    let dominant = output.counts.dominant().map(|(bits, _)| bits).unwrap_or("-");
    println!(
        "{} -> dominant {} (expected {}, {})",
        output.sensors,
        dominant,
        output.expected.bitstring(),
        output.expected.name()
    );
    for path in output.written_files() {
        println!("  wrote {}", path.display());
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.run_config()?;

    if let Some(sensors) = &cli.sensors {
        let output = simulate_scenario(sensors, &config)
            .with_context(|| format!("scenario '{}' failed", config.tag))?;
        report(&output);
        return Ok(());
    }

    let emergency = simulate_scenario(&SensorVector::all_abnormal(), &config.with_tag("emergency"))
        .context("emergency scenario failed")?;
    report(&emergency);
    let normal = simulate_scenario(&SensorVector::all_normal(), &config.with_tag("normal"))
        .context("normal scenario failed")?;
    report(&normal);

    let summary = save_summary(&[("Emergency", &emergency.counts), ("Normal", &normal.counts)], &config)
        .context("summary histogram failed")?;
    println!("  wrote {}", summary.display());
    Ok(())
}
