use anyhow::{Context, Result};
use rdf_etl::cli::commands::{
    AbandonCommand, PipelinesCommand, RunsCommand, StartCommand, StatusCommand, StepCommand,
};
use rdf_etl::cli::output::*;
use rdf_etl::cli::{Cli, Command};
use rdf_etl::core::config::EtlConfig;
use rdf_etl::mapping::ConfiguredMappings;
use rdf_etl::steps::builtin_registry;
use rdf_etl::{
    EtlError, InvocationOutcome, Orchestrator, PipelineRegistry, SparqlEndpoint, StateStore,
    StepServices,
};
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let config = EtlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let store = open_store(&config).await?;
    let orchestrator = build_orchestrator(&config, store.clone())?;

    // Execute command
    match &cli.command {
        Command::Pipelines(cmd) => list_pipelines(cmd, &orchestrator)?,
        Command::Start(cmd) => start_run(cmd, &orchestrator).await?,
        Command::Step(cmd) => run_step(cmd, &orchestrator).await?,
        Command::Status(cmd) => show_status(cmd, &orchestrator).await?,
        Command::Runs(cmd) => list_runs(cmd, store.as_ref()).await?,
        Command::Abandon(cmd) => abandon_run(cmd, &orchestrator).await?,
    }

    Ok(())
}

#[cfg(feature = "sqlite")]
async fn open_store(config: &EtlConfig) -> Result<Arc<dyn StateStore>> {
    let path = config.database_path();
    debug!("Using run database {}", path.display());
    Ok(Arc::new(
        rdf_etl::persistence::SqliteStateStore::new(&path).await?,
    ))
}

#[cfg(not(feature = "sqlite"))]
async fn open_store(_config: &EtlConfig) -> Result<Arc<dyn StateStore>> {
    debug!("Built without sqlite; run state is kept in memory");
    Ok(Arc::new(rdf_etl::InMemoryStateStore::new()))
}

fn build_orchestrator(config: &EtlConfig, store: Arc<dyn StateStore>) -> Result<Orchestrator> {
    let steps = builtin_registry();
    let pipelines = PipelineRegistry::from_config(config, &steps)?;
    let services = StepServices::new(
        Arc::new(SparqlEndpoint::new(&config.endpoint)?),
        Arc::new(ConfiguredMappings::new(config.mappings.clone())),
    );

    Ok(
        Orchestrator::new(Arc::new(pipelines), Arc::new(steps), services, store)
            .with_config(config)
            .with_event_handler(|event| {
                if let Some(line) = format_orchestrator_event(&event) {
                    println!("{}", line);
                }
            }),
    )
}

fn list_pipelines(cmd: &PipelinesCommand, orchestrator: &Orchestrator) -> Result<()> {
    let pipelines = orchestrator.pipelines().list();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&pipelines)?);
        return Ok(());
    }

    println!("{} Registered pipelines:", INFO);
    for definition in pipelines {
        println!("  {}", format_pipeline(definition));
    }
    Ok(())
}

async fn start_run(cmd: &StartCommand, orchestrator: &Orchestrator) -> Result<()> {
    let run_id = cmd.run.unwrap_or_else(Uuid::new_v4);
    orchestrator.start(run_id, &cmd.pipeline).await?;
    println!(
        "{} Continue with {}",
        INFO,
        style(format!("rdf-etl step {}", run_id)).yellow()
    );
    Ok(())
}

async fn run_step(cmd: &StepCommand, orchestrator: &Orchestrator) -> Result<()> {
    let mut submission = cmd.submission();

    loop {
        let spinner = create_spinner("Running step");
        let result = orchestrator.invoke(cmd.run, submission.as_ref()).await;
        spinner.finish_and_clear();

        match result {
            Ok(InvocationOutcome::AwaitingConfiguration { step_id, form }) => {
                println!("{}", format_form(&step_id, &form));
                return Ok(());
            }
            Ok(InvocationOutcome::StepCompleted { .. }) if cmd.all => {
                // Form values belong to the step they were given for
                submission = None;
            }
            Ok(InvocationOutcome::StepCompleted { .. }) => return Ok(()),
            Ok(InvocationOutcome::PipelineCompleted { .. }) => return Ok(()),
            Ok(InvocationOutcome::AlreadyCompleted) => {
                println!("{} Run {} has already completed", INFO, style(cmd.run).dim());
                return Ok(());
            }
            Err(EtlError::ConfigurationValidation { step_id, errors }) => {
                println!(
                    "{} Invalid configuration for {}:\n{}",
                    CROSS,
                    style(&step_id).cyan(),
                    format_validation_errors(&errors)
                );
                std::process::exit(2);
            }
            Err(e @ EtlError::StepExecution { .. }) => {
                println!(
                    "\n{} {} {}",
                    WARN,
                    style(e).red(),
                    style("(run the step again to retry)").dim()
                );
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

async fn show_status(cmd: &StatusCommand, orchestrator: &Orchestrator) -> Result<()> {
    let status = orchestrator.status(cmd.run).await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("{}", format_run_status(&status));
    }
    Ok(())
}

async fn list_runs(cmd: &RunsCommand, store: &dyn StateStore) -> Result<()> {
    let runs: Vec<_> = store.list_runs().await?.into_iter().take(cmd.limit).collect();

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Runs (showing latest {}):", INFO, cmd.limit);
    for record in &runs {
        println!("  {}", format_run_record(record));
    }
    Ok(())
}

async fn abandon_run(cmd: &AbandonCommand, orchestrator: &Orchestrator) -> Result<()> {
    orchestrator.abandon(cmd.run).await?;
    println!("{} Run {} abandoned", CHECK, style(cmd.run).dim());
    Ok(())
}
