//! Orchestrator - resumes a pipeline run one step at a time

use crate::{
    core::{
        config::EtlConfig, ConfigurationForm, EtlError, FormSubmission,
        PipelineDefinition, PipelineRegistry, PipelineState, RunPhase, StepConfiguration,
        StepRegistry, StepServices, ValidationErrors, SINK_GRAPH,
    },
    persistence::StateStore,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Events emitted while a run is driven
#[derive(Debug, Clone)]
pub enum OrchestratorEvent {
    RunStarted {
        run_id: Uuid,
        pipeline_id: String,
    },
    StepStarted {
        run_id: Uuid,
        sequence: usize,
        step_id: String,
    },
    ConfigurationRequested {
        run_id: Uuid,
        step_id: String,
    },
    ConfigurationRejected {
        run_id: Uuid,
        step_id: String,
        errors: ValidationErrors,
    },
    StepCompleted {
        run_id: Uuid,
        step_id: String,
        next_step: Option<String>,
    },
    StepFailed {
        run_id: Uuid,
        step_id: String,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
        pipeline_id: String,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(OrchestratorEvent) + Send + Sync>;

/// Result of one invocation of a run
#[derive(Debug, Clone)]
pub enum InvocationOutcome {
    /// The current step needs a form submission before it can execute
    AwaitingConfiguration {
        step_id: String,
        form: ConfigurationForm,
    },
    /// The current step ran and the run moved to the next one
    StepCompleted { step_id: String, next_step: String },
    /// The last step ran
    PipelineCompleted { step_id: String },
    /// Nothing left to run; state untouched
    AlreadyCompleted,
}

/// Snapshot of a run for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStatus {
    pub run_id: Uuid,
    pub pipeline_id: String,
    pub label: String,
    pub sequence: usize,
    pub total_steps: usize,
    pub phase: RunPhase,
}

/// Drives pipeline runs against persisted state
///
/// Every invocation reads the state from the store, runs at most one step
/// and writes the successor state only when that step succeeded.
pub struct Orchestrator {
    pipelines: Arc<PipelineRegistry>,
    steps: Arc<StepRegistry>,
    services: StepServices,
    store: Arc<dyn StateStore>,
    base_configuration: StepConfiguration,
    step_options: HashMap<String, StepConfiguration>,
    event_handlers: Vec<EventHandler>,
}

impl Orchestrator {
    pub fn new(
        pipelines: Arc<PipelineRegistry>,
        steps: Arc<StepRegistry>,
        services: StepServices,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            pipelines,
            steps,
            services,
            store,
            base_configuration: StepConfiguration::new(),
            step_options: HashMap::new(),
            event_handlers: Vec::new(),
        }
    }

    /// Take the sink graph and per-step options from a loaded config
    pub fn with_config(mut self, config: &EtlConfig) -> Self {
        self.base_configuration =
            StepConfiguration::new().with(SINK_GRAPH, config.sink_graph.as_str());
        self.step_options = config
            .steps
            .keys()
            .map(|id| (id.clone(), config.step_configuration(id)))
            .collect();
        self
    }

    /// Options applied to every step
    pub fn with_base_configuration(mut self, configuration: StepConfiguration) -> Self {
        self.base_configuration = configuration;
        self
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(OrchestratorEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    pub fn pipelines(&self) -> &PipelineRegistry {
        &self.pipelines
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: OrchestratorEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    fn configuration_for(&self, step_id: &str) -> StepConfiguration {
        self.step_options
            .get(step_id)
            .cloned()
            .unwrap_or_else(|| self.base_configuration.clone())
    }

    /// Begin a run of `pipeline_id` at its first step
    ///
    /// An existing run with the same ID is reset.
    pub async fn start(&self, run_id: Uuid, pipeline_id: &str) -> Result<PipelineState, EtlError> {
        let definition = self.pipelines.get(pipeline_id)?;
        let state = PipelineState::start(&definition.id);

        self.store.delete(run_id).await.map_err(EtlError::Storage)?;
        self.store
            .save(run_id, &state)
            .await
            .map_err(EtlError::Storage)?;

        info!("Started run {} of pipeline '{}'", run_id, definition.id);
        self.emit_event(OrchestratorEvent::RunStarted {
            run_id,
            pipeline_id: definition.id.clone(),
        });

        Ok(state)
    }

    /// Where a run stands
    pub async fn status(&self, run_id: Uuid) -> Result<RunStatus, EtlError> {
        let state = self.load_state(run_id).await?;
        let definition = self.pipelines.get(state.pipeline_id())?;
        let phase = phase_of(definition, &state)?;

        Ok(RunStatus {
            run_id,
            pipeline_id: definition.id.clone(),
            label: definition.label.clone(),
            sequence: state.sequence(),
            total_steps: definition.len(),
            phase,
        })
    }

    /// Forget a run
    pub async fn abandon(&self, run_id: Uuid) -> Result<(), EtlError> {
        self.load_state(run_id).await?;
        self.store.delete(run_id).await.map_err(EtlError::Storage)?;
        info!("Abandoned run {}", run_id);
        Ok(())
    }

    /// Run the current step of a run
    ///
    /// A configurable step without `submission` only returns its form.
    /// Rejected submissions and failing steps leave the stored state as it
    /// was, so the same step runs again on the next invocation.
    pub async fn invoke(
        &self,
        run_id: Uuid,
        submission: Option<&FormSubmission>,
    ) -> Result<InvocationOutcome, EtlError> {
        let state = self.load_state(run_id).await?;
        let definition = self.pipelines.get(state.pipeline_id())?;

        let step_id = match phase_of(definition, &state)? {
            RunPhase::Completed => {
                debug!("Run {} has already completed", run_id);
                return Ok(InvocationOutcome::AlreadyCompleted);
            }
            RunPhase::AwaitingStep { step_id, .. } => step_id,
        };

        let configuration = self.configuration_for(&step_id);
        let mut step = self
            .steps
            .create(&step_id, configuration.clone(), &self.services)?;

        if let Some(configurable) = step.as_configurable() {
            let Some(submission) = submission else {
                debug!("Step '{}' is waiting for configuration", step_id);
                self.emit_event(OrchestratorEvent::ConfigurationRequested {
                    run_id,
                    step_id: step_id.clone(),
                });
                return Ok(InvocationOutcome::AwaitingConfiguration {
                    form: configurable.build_configuration_form(&configuration),
                    step_id,
                });
            };

            if let Err(errors) = configurable.validate_configuration_form(submission, &configuration) {
                warn!("Configuration of step '{}' rejected: {}", step_id, errors);
                self.emit_event(OrchestratorEvent::ConfigurationRejected {
                    run_id,
                    step_id: step_id.clone(),
                    errors: errors.clone(),
                });
                return Err(EtlError::ConfigurationValidation { step_id, errors });
            }
            configurable.submit_configuration_form(submission);
        }

        let mut data = self
            .store
            .load_context(run_id)
            .await
            .map_err(EtlError::Storage)?;

        info!(
            "Running step '{}' ({}/{}) of '{}'",
            step_id,
            state.sequence() + 1,
            definition.len(),
            definition.id
        );
        self.emit_event(OrchestratorEvent::StepStarted {
            run_id,
            sequence: state.sequence(),
            step_id: step_id.clone(),
        });

        if let Err(source) = step.execute(&mut data).await {
            warn!("Step '{}' failed: {:#}", step_id, source);
            self.emit_event(OrchestratorEvent::StepFailed {
                run_id,
                step_id: step_id.clone(),
                error: format!("{:#}", source),
            });
            return Err(EtlError::StepExecution { step_id, source });
        }

        let next = state.advance();
        self.store
            .save_progress(run_id, &next, &data)
            .await
            .map_err(EtlError::Storage)?;

        let next_step = definition.step_at(next.sequence()).map(str::to_string);
        self.emit_event(OrchestratorEvent::StepCompleted {
            run_id,
            step_id: step_id.clone(),
            next_step: next_step.clone(),
        });

        match next_step {
            Some(next_step) => {
                info!("Step '{}' completed, next is '{}'", step_id, next_step);
                Ok(InvocationOutcome::StepCompleted { step_id, next_step })
            }
            None => {
                info!("Pipeline '{}' completed", definition.id);
                self.emit_event(OrchestratorEvent::PipelineCompleted {
                    run_id,
                    pipeline_id: definition.id.clone(),
                });
                Ok(InvocationOutcome::PipelineCompleted { step_id })
            }
        }
    }

    async fn load_state(&self, run_id: Uuid) -> Result<PipelineState, EtlError> {
        self.store
            .load(run_id)
            .await
            .map_err(EtlError::Storage)?
            .ok_or(EtlError::NoActiveStep { run_id })
    }
}

/// Resolve the step a state points at
fn phase_of(definition: &PipelineDefinition, state: &PipelineState) -> Result<RunPhase, EtlError> {
    if state.is_complete(definition.len()) {
        if state.sequence() > definition.len() {
            return Err(EtlError::UnknownStep {
                pipeline_id: definition.id.clone(),
                sequence: state.sequence(),
            });
        }
        return Ok(RunPhase::Completed);
    }

    let step_id = definition
        .step_at(state.sequence())
        .ok_or_else(|| EtlError::UnknownStep {
            pipeline_id: definition.id.clone(),
            sequence: state.sequence(),
        })?;

    Ok(RunPhase::AwaitingStep {
        sequence: state.sequence(),
        step_id: step_id.to_string(),
    })
}
