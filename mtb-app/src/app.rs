use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mtb_timing::SystemClock;
use mtb_tracking::{InMemoryProvenanceLog, StimulusSession, TrackingConfig};
use tokio::sync::mpsc;
use tracing::info;

use crate::catalog::load_catalog;
use crate::runtime::run_trial;
use crate::script::{ScriptStep, parse_script, play_script};
use crate::sink::JsonLinesSink;
use crate::telemetry;

/// Replays timed badge interactions against one stimulus and writes every
/// answer snapshot as a JSON line.
#[derive(Debug, Parser)]
#[command(name = "mtb", version)]
pub struct Cli {
    /// Tracking config JSON file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Badge catalog (file path or URL); overrides the config.
    #[arg(long)]
    pub catalog: Option<String>,
    /// Prefix for relative catalog paths; overrides the config.
    #[arg(long)]
    pub prefix: Option<String>,
    /// JSON-lines script of timed UI events.
    #[arg(long)]
    pub script: Option<PathBuf>,
    /// Unmount this many ms after mount instead of right after the script.
    #[arg(long)]
    pub unmount_at_ms: Option<u64>,
    #[arg(long)]
    pub persist_interval_ms: Option<u64>,
    /// Output file for answer payloads; stdout when absent.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

pub struct App {
    config: TrackingConfig,
    steps: Vec<ScriptStep>,
    unmount_at_ms: Option<u64>,
    out: Option<PathBuf>,
}

impl App {
    pub fn new() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                let body = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                TrackingConfig::from_json(&body)?
            }
            None => TrackingConfig::default(),
        };
        if let Some(catalog) = cli.catalog {
            config.catalog_path = Some(catalog);
        }
        if let Some(prefix) = cli.prefix {
            config.catalog_prefix = prefix;
        }
        if let Some(ms) = cli.persist_interval_ms {
            config.persist_interval_ms = ms;
        }
        config.validate()?;

        let steps = match &cli.script {
            Some(path) => {
                let body = std::fs::read_to_string(path)
                    .with_context(|| format!("reading script {}", path.display()))?;
                parse_script(&body).with_context(|| format!("parsing script {}", path.display()))?
            }
            None => Vec::new(),
        };

        Ok(Self {
            config,
            steps,
            unmount_at_ms: cli.unmount_at_ms,
            out: cli.out,
        })
    }

    pub fn run(self) -> Result<()> {
        let _ = telemetry::init_default_tracing();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.drive())
    }

    async fn drive(self) -> Result<()> {
        let writer: Box<dyn Write> = match &self.out {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            )),
            None => Box::new(io::stdout().lock()),
        };
        let mut sink = JsonLinesSink::new(writer);

        let session = StimulusSession::mount(
            self.config.clone(),
            SystemClock,
            InMemoryProvenanceLog::new(),
        );
        let (tx, rx) = mpsc::channel(64);
        let player = tokio::spawn(play_script(self.steps, tx, self.unmount_at_ms));

        let payload = run_trial(session, load_catalog(self.config), rx, &mut sink).await?;
        player.abort();

        let engagement = &payload.answers.trial_engagement;
        info!(
            time_on_stimulus_ms = engagement.time_on_stimulus_ms,
            interactions = engagement.total_badge_interactions,
            badges = engagement.unique_badges_interacted,
            "trial complete"
        );
        Ok(())
    }
}
