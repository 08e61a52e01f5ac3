use std::path::PathBuf;

use clap::Parser;
use crypto_perf::config::{BenchConfig, Overrides};
use crypto_perf::driver::{catalogue_lines, outcomes_to_json, Driver, ReportSink};
use crypto_perf::{AlgorithmFamily, Direction, ProviderRegistry, Result, TimeUnit};
use env_logger::Env;
use log::info;

/// Times cryptographic primitives across providers and reports wall, CPU, user and system time.
#[derive(Parser, Debug)]
#[command(name = "crypto-perf", version)]
struct Args {
    /// JSON sweep configuration; the built-in suite is used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input file fed to every trial
    #[arg(long)]
    payload: Option<PathBuf>,

    #[arg(long)]
    trials: Option<usize>,

    /// block, stream, hash or asymmetric
    #[arg(long)]
    family: Option<AlgorithmFamily>,

    /// Algorithm id, e.g. "AES/CBC/PKCS5Padding"; needs --family
    #[arg(long)]
    algorithm: Option<String>,

    /// Key size in bits
    #[arg(long)]
    key_size: Option<usize>,

    /// full, forward (encrypt) or reverse (decrypt)
    #[arg(long)]
    direction: Option<Direction>,

    /// Provider to sweep; repeat for several
    #[arg(long = "provider")]
    providers: Vec<String>,

    /// ns, us, ms or s
    #[arg(long)]
    unit: Option<TimeUnit>,

    /// Decimal places in the report
    #[arg(long)]
    precision: Option<usize>,

    /// Directory for the per-family result files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print reports to stdout instead of result files
    #[arg(long)]
    stdout: bool,

    /// Print all run outcomes as JSON when done
    #[arg(long)]
    json: bool,

    /// List the algorithm catalogue and exit
    #[arg(long)]
    list: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            payload: self.payload.clone(),
            trials: self.trials,
            family: self.family,
            algorithm: self.algorithm.clone(),
            key_size: self.key_size,
            direction: self.direction,
            providers: self.providers.clone(),
            unit: self.unit,
            precision: self.precision,
            output_dir: self.output_dir.clone(),
            stdout: self.stdout,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        for line in catalogue_lines() {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut config = BenchConfig::load(args.config.as_deref())?;
    config.apply(&args.overrides())?;
    config.validate()?;
    info!(
        "Payload {}, {} sweeps, reporting in {}",
        config.payload.display(),
        config.sweeps.len(),
        config.unit
    );

    let registry = ProviderRegistry::install();
    let mut sink = ReportSink::for_config(&config)?;
    let outcomes = Driver::new(&config, registry).run(&mut sink);

    if args.json {
        println!("{}", outcomes_to_json(&outcomes)?);
    }
    Ok(())
}
