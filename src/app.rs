use crate::config::ConsensusConfig;
use crate::engine::AssemblyMode;
use crate::runtime::{ConsensusSnapshot, ConsensusWorker};
use crate::wire::load_batches;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

const USAGE: &str =
    "usage: assemblywatch --input <batches.jsonl> [--config <config.json>] [--mode assembly|disassembly]";

/// Parsed command line for the replay binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayArgs {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub mode: AssemblyMode,
}

impl ReplayArgs {
    /// Parses arguments (without the program name). `Ok(None)` means help was requested.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>> {
        let mut input = None;
        let mut config = None;
        let mut mode = AssemblyMode::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--input" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow!("--input requires a path"))?;
                    input = Some(PathBuf::from(path));
                }
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow!("--config requires a path"))?;
                    config = Some(PathBuf::from(path));
                }
                "--mode" => {
                    let raw = args
                        .next()
                        .ok_or_else(|| anyhow!("--mode requires a value"))?;
                    mode = AssemblyMode::parse(&raw)
                        .ok_or_else(|| anyhow!("unknown mode: {raw}"))?;
                }
                "--help" | "-h" => return Ok(None),
                other => return Err(anyhow!("unknown argument: {other}")),
            }
        }
        let input = input.ok_or_else(|| anyhow!("--input is required\n{USAGE}"))?;
        Ok(Some(Self {
            input,
            config,
            mode,
        }))
    }
}

/// Replays a recorded feed through a fresh worker and returns the final snapshot.
///
/// Log lines stream to `log_sink` while the feed is processed.
pub fn replay(
    args: &ReplayArgs,
    log_sink: Box<dyn Write + Send>,
) -> Result<(ConsensusWorker, ConsensusSnapshot)> {
    let config = match &args.config {
        Some(path) => ConsensusConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConsensusConfig::default(),
    };
    let batches = load_batches(&args.input)
        .with_context(|| format!("loading feed {}", args.input.display()))?;
    let mut worker = ConsensusWorker::new(
        config.build_estimator()?,
        config.plan(),
        config.build_queue(),
        config.build_logger()?.with_sink(log_sink),
    );
    worker.set_mode(args.mode);
    for batch in batches {
        worker.process(&batch);
    }
    let snapshot = worker.snapshots().load().as_ref().clone();
    Ok((worker, snapshot))
}

/// Binary entrypoint: replay the feed, log to stderr, print the final snapshot on stdout.
pub fn run() -> Result<()> {
    let Some(args) = ReplayArgs::parse(env::args().skip(1))? else {
        eprintln!("{USAGE}");
        return Ok(());
    };
    let (_, snapshot) = replay(&args, Box::new(io::stderr()))?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
