//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{
    AbandonCommand, PipelinesCommand, RunsCommand, StartCommand, StatusCommand, StepCommand,
};
use std::ffi::OsString;
use std::path::PathBuf;

/// Step-wise RDF ETL pipelines against a SPARQL triple store
#[derive(Debug, Parser, Clone)]
#[command(name = "rdf-etl")]
#[command(version)]
#[command(about = "Runs RDF import pipelines one resumable step at a time", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (defaults to ./rdf-etl.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List the registered pipelines
    Pipelines(PipelinesCommand),

    /// Start a run of a pipeline at its first step
    Start(StartCommand),

    /// Run the current step of a run
    Step(StepCommand),

    /// Show where a run stands
    Status(StatusCommand),

    /// List stored runs
    Runs(RunsCommand),

    /// Forget a run
    Abandon(AbandonCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
