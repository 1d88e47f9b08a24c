// src/bin/emg_epoch.rs
//! Command line front end for the EMG epoch analysis pipeline

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use emg_epoch::config::paths;
use emg_epoch::{
    AnalysisPipeline, BatchConfig, BatchRunner, ConfigLoader, EventLog, SampleSource, WavSource,
};

/// [clap] derived struct to parse command line arguments.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[clap(long, default_value = "info", global = true)]
    log_level: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyse a single recording against its event log.
    Analyze {
        /// WAV recording to analyse.
        #[clap(long)]
        wav: PathBuf,

        /// Event log matching the recording.
        #[clap(long)]
        events: PathBuf,

        /// TOML file overriding the default analysis configuration.
        #[clap(long, env = "EMG_ANALYSIS_CONFIG")]
        config: Option<PathBuf>,

        /// Channel kept from multi-channel recordings.
        #[clap(long, default_value_t = 0)]
        channel: usize,

        /// Where to write the JSON report. Only a summary is printed when absent.
        #[clap(long)]
        output: Option<PathBuf>,
    },

    /// Analyse every session listed in a batch configuration.
    Batch {
        /// Batch configuration file.
        #[clap(long, default_value = paths::DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Run sessions in parallel regardless of the configuration.
        #[clap(long)]
        parallel: bool,

        /// Recording date to analyse. Repeat with --subject to replace the configured sessions.
        #[clap(long = "date")]
        dates: Vec<String>,

        /// Subject code to analyse, combined with every --date.
        #[clap(long = "subject")]
        subjects: Vec<String>,
    },

    /// Print the default batch configuration as TOML.
    Defaults,
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
}

fn loader_for(config: Option<PathBuf>) -> ConfigLoader {
    match config {
        Some(path) => ConfigLoader::with_paths(vec![path]),
        None => ConfigLoader::new(),
    }
}

fn analyze(
    wav: PathBuf,
    events: PathBuf,
    config: Option<PathBuf>,
    channel: usize,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let analysis = loader_for(config)
        .load_analysis_config()
        .context("loading analysis configuration")?;
    let pipeline = AnalysisPipeline::new(analysis)?;

    let recording = WavSource::new(channel).load(&wav)?;
    debug!(summary = ?pipeline.config().get_summary(recording.sample_rate_hz()), "configuration");
    let events = EventLog::from_file(&events)?;

    let report = pipeline.run(&recording, &events)?;

    println!(
        "{}: {} samples, raw threshold {:.4} ({} above), envelope threshold {:.4} ({} above)",
        wav.display(),
        report.signal.len(),
        report.raw_crossings.threshold,
        report.raw_crossings.count,
        report.envelope_crossings.threshold,
        report.envelope_crossings.count,
    );

    if let Some(output) = output {
        report.write_json(&output)?;
        info!(path = %output.display(), "wrote report");
    }
    Ok(())
}

fn batch(
    config: PathBuf,
    parallel: bool,
    dates: Vec<String>,
    subjects: Vec<String>,
) -> anyhow::Result<()> {
    if !config.is_file() {
        anyhow::bail!("batch configuration {} not found", config.display());
    }
    if dates.is_empty() != subjects.is_empty() {
        anyhow::bail!("--date and --subject must be given together");
    }

    let mut batch_config = ConfigLoader::with_paths(vec![config.clone()])
        .load_batch_config()
        .with_context(|| format!("loading batch configuration {}", config.display()))?;
    batch_config.parallel |= parallel;
    if !dates.is_empty() {
        batch_config.sessions = BatchConfig::sessions_from_lists(&dates, &subjects);
    }

    let source = Arc::new(WavSource::new(batch_config.channel));
    let summary = BatchRunner::new(batch_config, source)?.run();

    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!(
        "completed {}, skipped {}, failed {}",
        summary.completed(),
        summary.skipped(),
        summary.failed()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let info = emg_epoch::version_info();
    debug!(name = %info.name, version = %info.version, features = ?info.features, "starting");

    match args.command {
        Command::Analyze {
            wav,
            events,
            config,
            channel,
            output,
        } => analyze(wav, events, config, channel, output),
        Command::Batch {
            config,
            parallel,
            dates,
            subjects,
        } => batch(config, parallel, dates, subjects),
        Command::Defaults => {
            println!("# {} {} default configuration", info.name, info.version);
            print!("{}", toml::to_string_pretty(&BatchConfig::default())?);
            Ok(())
        }
    }
}
