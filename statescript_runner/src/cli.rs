use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Headless host that drives a statescript graph through simulated ticks",
    version
)]
pub struct Args {
    /// Path to the graph document to load
    #[arg(long)]
    pub graph: Option<PathBuf>,

    /// Number of simulation ticks to run
    #[arg(long, default_value_t = 60)]
    pub ticks: u64,

    /// Seconds of simulated time per tick
    #[arg(long, default_value_t = 0.016)]
    pub tpf: f64,

    /// Scripted host events to inject while running (ticks are 1-based;
    /// an event applies just before its tick's update)
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Path to write the run summary and transition journal as JSON
    #[arg(long)]
    pub journal_json: Option<PathBuf>,

    /// Path to write the action descriptor catalog as JSON
    #[arg(long)]
    pub describe_actions: Option<PathBuf>,

    /// Print every applied transition while running
    #[arg(long)]
    pub verbose: bool,
}

pub fn parse() -> Result<Args> {
    let args = Args::parse();
    args.validate()?;
    Ok(args)
}

impl Args {
    fn validate(&self) -> Result<()> {
        if self.graph.is_none() && self.describe_actions.is_none() {
            bail!("nothing to do: pass --graph and/or --describe-actions");
        }
        if self.script.is_some() && self.graph.is_none() {
            bail!("--script requires --graph");
        }
        if self.journal_json.is_some() && self.graph.is_none() {
            bail!("--journal-json requires --graph");
        }
        if self.graph.is_some() && !self.tpf.is_finite() {
            bail!("--tpf must be a finite number of seconds");
        }
        Ok(())
    }
}
