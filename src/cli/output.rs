//! CLI output formatting

use crate::{
    core::{ConfigurationForm, PipelineDefinition, RunPhase, ValidationErrors},
    execution::{OrchestratorEvent, RunStatus},
    persistence::RunRecord,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner shown while a step runs
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// First eight characters of a run ID
fn short_id(run_id: &uuid::Uuid) -> String {
    run_id.to_string()[..8].to_string()
}

/// Format a run phase for display
pub fn format_phase(phase: &RunPhase) -> String {
    match phase {
        RunPhase::AwaitingStep { step_id, .. } => {
            format!("{} {}", style("AWAITING").yellow(), style(step_id).cyan())
        }
        RunPhase::Completed => style("COMPLETED").green().to_string(),
    }
}

/// Format a pipeline definition for display
pub fn format_pipeline(definition: &PipelineDefinition) -> String {
    let mut lines = vec![format!(
        "{} - {} ({} steps)",
        style(&definition.id).bold(),
        definition.label,
        definition.len()
    )];
    for (sequence, step) in definition.steps.iter().enumerate() {
        lines.push(format!("    {}. {}", sequence + 1, style(step).cyan()));
    }
    lines.join("\n")
}

/// Format a run status for display
pub fn format_run_status(status: &RunStatus) -> String {
    format!(
        "{} {} - {} - {} ({}/{})",
        INFO,
        style(short_id(&status.run_id)).dim(),
        style(&status.label).bold(),
        format_phase(&status.phase),
        status.sequence,
        status.total_steps
    )
}

/// Format a stored run for display
pub fn format_run_record(record: &RunRecord) -> String {
    format!(
        "{} - {} - step {} - {}",
        style(record.run_id).dim(),
        style(record.state.pipeline_id()).bold(),
        record.state.sequence(),
        style(record.updated_at.to_rfc3339()).dim()
    )
}

/// Format a configuration form as a prompt for `--set` values
pub fn format_form(step_id: &str, form: &ConfigurationForm) -> String {
    let mut lines = vec![format!(
        "{} Step {} needs configuration:",
        WARN,
        style(step_id).cyan()
    )];
    for field in &form.fields {
        let marker = if field.required { "*" } else { " " };
        let mut line = format!(
            "  {}{} ({})",
            marker,
            style(&field.name).bold(),
            field.label
        );
        if let Some(default) = &field.default {
            line.push_str(&format!(" [default: {}]", style(default).dim()));
        }
        lines.push(line);
        if let Some(description) = &field.description {
            lines.push(format!("      {}", style(description).dim()));
        }
    }
    lines.push(format!(
        "  Provide values with {}",
        style("--set name=value").yellow()
    ));
    lines.join("\n")
}

/// Format form validation errors for display
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|error| {
            format!(
                "  {} {}: {}",
                CROSS,
                style(&error.field).bold(),
                style(&error.message).red()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format an orchestrator event for display
pub fn format_orchestrator_event(event: &OrchestratorEvent) -> Option<String> {
    let line = match event {
        OrchestratorEvent::RunStarted {
            run_id,
            pipeline_id,
        } => format!(
            "{} Started pipeline {} (run {})",
            ROCKET,
            style(pipeline_id).bold(),
            style(run_id).dim()
        ),
        OrchestratorEvent::StepStarted {
            sequence, step_id, ..
        } => format!(
            "{} {}. {}",
            SPINNER,
            sequence + 1,
            style(step_id).cyan()
        ),
        OrchestratorEvent::StepCompleted {
            step_id, next_step, ..
        } => match next_step {
            Some(next) => format!(
                "{} {} → {}",
                CHECK,
                style(step_id).green(),
                style(next).cyan()
            ),
            None => format!("{} {}", CHECK, style(step_id).green()),
        },
        OrchestratorEvent::StepFailed { step_id, error, .. } => {
            format!("{} {}: {}", CROSS, style(step_id).red(), style(error).dim())
        }
        OrchestratorEvent::ConfigurationRejected { step_id, .. } => format!(
            "{} Configuration of {} rejected",
            CROSS,
            style(step_id).red()
        ),
        OrchestratorEvent::PipelineCompleted { pipeline_id, .. } => format!(
            "{} Pipeline {} completed {}",
            INFO,
            style(pipeline_id).bold(),
            style("successfully").green()
        ),
        // The form itself is printed by the command
        OrchestratorEvent::ConfigurationRequested { .. } => return None,
    };
    Some(line)
}
