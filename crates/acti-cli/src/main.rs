use std::io::{self, Write};
use std::path::Path;

use acti_core::{DstCorrection, SubjectSession};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use acti_cli::commands::{point, resolve, review, runs, segment, window};
use acti_cli::samples::{read_samples, subject_id};
use acti_cli::{Cli, Commands, Config};

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Reads a sample file and opens a session on it.
fn open_session(
    samples_path: &Path,
    subject: Option<&str>,
    config: &Config,
) -> Result<SubjectSession> {
    let id = subject_id(samples_path, subject)?;
    let samples = read_samples(samples_path)?;
    SubjectSession::from_samples(id, samples, config.session())
        .with_context(|| format!("failed to open subject from {}", samples_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Segment { samples, json }) => {
            let config = load_config(cli.config.as_deref())?;
            let data = read_samples(samples)?;
            segment::run(&mut out, &data, &config, *json)?;
        }
        Some(Commands::Window { samples, day, json }) => {
            let config = load_config(cli.config.as_deref())?;
            let session = open_session(samples, None, &config)?;
            window::run(&mut out, &session, *day, *json)?;
        }
        Some(Commands::Runs { flags, len }) => {
            runs::run(&mut out, flags, *len)?;
        }
        Some(Commands::Resolve { dragged, others }) => {
            resolve::run(&mut out, *dragged, others)?;
        }
        Some(Commands::Point {
            time,
            date,
            dst_shift,
        }) => {
            point::run_point(&mut out, time, *date, *dst_shift)?;
        }
        Some(Commands::Time {
            point: timepoint,
            date,
            offset,
            dst_at,
            dst_shift,
        }) => {
            let dst = dst_at
                .zip(*dst_shift)
                .map(|(timepoint, shift_seconds)| DstCorrection {
                    timepoint,
                    shift_seconds,
                });
            point::run_time(&mut out, *timepoint, *date, *offset, dst)?;
        }
        Some(Commands::Review {
            samples,
            actions,
            subject,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let mut session = open_session(samples, subject.as_deref(), &config)?;
            let actions = review::read_actions(actions)?;
            review::run(&mut out, &mut session, &actions)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}
