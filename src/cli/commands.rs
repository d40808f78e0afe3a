//! CLI command definitions

use crate::core::FormSubmission;
use clap::Args;
use uuid::Uuid;

/// List the registered pipelines
#[derive(Debug, Args, Clone)]
pub struct PipelinesCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Start a run
#[derive(Debug, Args, Clone)]
pub struct StartCommand {
    /// Pipeline ID
    pub pipeline: String,

    /// Run ID to use instead of a generated one; an existing run is reset
    #[arg(long)]
    pub run: Option<Uuid>,
}

/// Run the current step of a run
#[derive(Debug, Args, Clone)]
pub struct StepCommand {
    /// Run ID
    pub run: Uuid,

    /// Configuration form values (name=value)
    #[arg(long, value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Keep invoking until the run completes or needs input
    #[arg(long)]
    pub all: bool,
}

impl StepCommand {
    /// Form values given on the command line, if any
    pub fn submission(&self) -> Option<FormSubmission> {
        if self.set.is_empty() {
            None
        } else {
            Some(self.set.iter().cloned().collect())
        }
    }
}

/// Show where a run stands
#[derive(Debug, Args, Clone)]
pub struct StatusCommand {
    /// Run ID
    pub run: Uuid,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List stored runs
#[derive(Debug, Args, Clone)]
pub struct RunsCommand {
    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Forget a run
#[derive(Debug, Args, Clone)]
pub struct AbandonCommand {
    /// Run ID
    pub run: Uuid,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 || parts[0].trim().is_empty() {
        return Err(format!("Invalid name=value pair: {}", s));
    }
    Ok((parts[0].trim().to_string(), parts[1].to_string()))
}
