//! Command queue, dispatcher, outcome classifier and committer.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use lhr_common::hardware::HardwareControl;
use tracing::{debug, error, info, warn};

use super::machine::{EngineEvent, EngineState, EngineStateMachine, TransitionResult};
use crate::commands::{self, Command, CommandCreate, CommandResult, CommandStatus, Executed};
use crate::config::EngineConfig;
use crate::error::{CommandError, DefinedError, EngineError, ErrorOccurrence};
use crate::execution::{CommandContext, movement};
use crate::resources::{LabwareDefinition, ModelUtils, SystemModelUtils};
use crate::state::{LabwareOffset, State, StateReader, StateStore, StateUpdate, StateView};
use crate::types::{DeckPoint, LabwareLocation};

/// Cross-thread stop request, honoured before the next dispatch.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}

/// How a command ended, as seen by the engine.
#[derive(Debug)]
pub enum CommandOutcome {
    Succeeded(CommandResult, StateUpdate),
    DefinedError(DefinedError, StateUpdate),
    /// Caller misuse. Nothing is committed and the engine stays usable.
    Precondition(CommandError),
    /// Nothing is committed and the engine halts.
    Fatal(CommandError),
}

impl CommandOutcome {
    pub fn classify(result: Result<Executed<CommandResult>, CommandError>) -> Self {
        match result {
            Ok(Executed::Success(data)) => Self::Succeeded(data.public, data.state_update),
            Ok(Executed::DefinedError(data)) => Self::DefinedError(data.public, data.state_update),
            Err(err) if err.is_precondition() => Self::Precondition(err),
            Err(err) => Self::Fatal(err),
        }
    }
}

/// Executes commands one at a time against a hardware backend and owns the
/// state store.
pub struct CommandEngine {
    hardware: Box<dyn HardwareControl>,
    config: EngineConfig,
    model_utils: Box<dyn ModelUtils>,
    store: StateStore,
    machine: EngineStateMachine,
    commands: Vec<Command>,
    index: HashMap<String, usize>,
    queue: VecDeque<usize>,
    stop: StopHandle,
}

impl CommandEngine {
    pub fn new(hardware: Box<dyn HardwareControl>, config: EngineConfig) -> Self {
        info!(
            backend = hardware.name(),
            robot_type = %config.robot_type(),
            api_version = %config.api_version(),
            "command engine created"
        );
        Self {
            store: StateStore::new(State::new(config.state_config())),
            hardware,
            config,
            model_utils: Box::new(SystemModelUtils),
            machine: EngineStateMachine::new(),
            commands: Vec::new(),
            index: HashMap::new(),
            queue: VecDeque::new(),
            stop: StopHandle::default(),
        }
    }

    /// Replace the id/timestamp provider.
    pub fn with_model_utils(mut self, model_utils: impl ModelUtils + 'static) -> Self {
        self.model_utils = Box::new(model_utils);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn status(&self) -> EngineState {
        self.machine.state()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Snapshot of the state as of the last commit.
    pub fn state_view(&self) -> StateView {
        self.store.view()
    }

    pub fn state_reader(&self) -> StateReader {
        self.store.reader()
    }

    pub fn command(&self, command_id: &str) -> Option<&Command> {
        self.index.get(command_id).map(|&i| &self.commands[i])
    }

    /// Every command in enqueue order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        match self.machine.state() {
            EngineState::Halted => Err(EngineError::Halted),
            EngineState::Stopped => Err(EngineError::Stopped),
            EngineState::Idle | EngineState::Running => Ok(()),
        }
    }

    fn transition(&mut self, event: EngineEvent) -> Result<EngineState, EngineError> {
        match self.machine.handle_event(event) {
            TransitionResult::Ok(state) => {
                debug!(%state, ?event, "engine transition");
                Ok(state)
            }
            TransitionResult::Rejected(reason) => Err(EngineError::InvalidTransition(reason)),
        }
    }

    /// Queue a command; returns its id.
    pub fn enqueue(&mut self, create: CommandCreate) -> Result<String, EngineError> {
        self.ensure_open()?;
        let id = self.model_utils.generate_id();
        let command = Command {
            key: create.key.unwrap_or_else(|| id.clone()),
            id: id.clone(),
            params: create.params,
            status: CommandStatus::Queued,
            created_at: self.model_utils.get_timestamp(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
        };
        debug!(command_id = %id, command_type = %command.command_type(), "command queued");
        let slot = self.commands.len();
        self.commands.push(command);
        self.index.insert(id.clone(), slot);
        self.queue.push_back(slot);
        Ok(id)
    }

    /// Mark every queued command failed and move to `Stopped`.
    fn apply_stop(&mut self) -> Result<(), EngineError> {
        self.transition(EngineEvent::Stop)?;
        let dropped = self.queue.len();
        while let Some(slot) = self.queue.pop_front() {
            let occurrence =
                ErrorOccurrence::from_command_error(&*self.model_utils, &CommandError::RunStopped);
            let now = self.model_utils.get_timestamp();
            let command = &mut self.commands[slot];
            command.status = CommandStatus::Failed;
            command.completed_at = Some(now);
            command.error = Some(occurrence);
        }
        info!(dropped, "run stopped");
        Ok(())
    }

    /// Dispatch the oldest queued command.
    ///
    /// Returns `Ok(None)` when the queue is empty or a pending stop request
    /// was just applied.
    ///
    /// # Errors
    /// `Halted`/`Stopped` when the engine no longer accepts commands, and
    /// `CommandFatal` when this command halted the engine.
    pub async fn execute_next(&mut self) -> Result<Option<Command>, EngineError> {
        self.ensure_open()?;
        if self.stop.is_stop_requested() {
            self.apply_stop()?;
            return Ok(None);
        }
        let Some(slot) = self.queue.pop_front() else {
            return Ok(None);
        };

        self.transition(EngineEvent::Dispatch)?;
        let started_at = self.model_utils.get_timestamp();
        let (command_id, params) = {
            let command = &mut self.commands[slot];
            command.status = CommandStatus::Running;
            command.started_at = Some(started_at);
            (command.id.clone(), command.params.clone())
        };
        let command_type = params.command_type();
        info!(command_id = %command_id, %command_type, "dispatching command");

        let view = self.store.view();
        let result = {
            let mut ctx = CommandContext::new(
                &mut *self.hardware,
                &view,
                &*self.model_utils,
                &self.config,
            );
            commands::dispatch(&params, &mut ctx).await
        };
        let completed_at = self.model_utils.get_timestamp();

        match CommandOutcome::classify(result) {
            CommandOutcome::Succeeded(public, update) => {
                self.store.commit(&update);
                let command = &mut self.commands[slot];
                command.status = CommandStatus::Succeeded;
                command.result = Some(public);
                command.completed_at = Some(completed_at);
                info!(command_id = %command_id, %command_type, "command succeeded");
            }
            CommandOutcome::DefinedError(defined, update) => {
                self.store.commit(&update);
                let command = &mut self.commands[slot];
                command.status = CommandStatus::Failed;
                command.error = Some(defined.to_occurrence());
                command.completed_at = Some(completed_at);
                warn!(
                    command_id = %command_id,
                    %command_type,
                    error_type = defined.error_type(),
                    "command failed with a defined error"
                );
            }
            CommandOutcome::Precondition(err) => {
                let occurrence = ErrorOccurrence::from_command_error(&*self.model_utils, &err);
                let command = &mut self.commands[slot];
                command.status = CommandStatus::Failed;
                command.error = Some(occurrence);
                command.completed_at = Some(completed_at);
                warn!(command_id = %command_id, %command_type, error = %err, "command rejected");
            }
            CommandOutcome::Fatal(err) => {
                let occurrence = ErrorOccurrence::from_command_error(&*self.model_utils, &err);
                let command = &mut self.commands[slot];
                command.status = CommandStatus::Fatal;
                command.error = Some(occurrence);
                command.completed_at = Some(completed_at);
                self.transition(EngineEvent::Fatal)?;
                error!(command_id = %command_id, %command_type, error = %err, "command failed fatally, engine halted");
                return Err(EngineError::CommandFatal {
                    command_id,
                    source: err,
                });
            }
        }

        self.transition(EngineEvent::Complete)?;
        Ok(Some(self.commands[slot].clone()))
    }

    /// Enqueue `create` and run the queue up to and including it.
    pub async fn execute(&mut self, create: CommandCreate) -> Result<Command, EngineError> {
        let id = self.enqueue(create)?;
        while let Some(done) = self.execute_next().await? {
            if done.id == id {
                return Ok(done);
            }
        }
        // Only reachable when a stop request failed it while still queued.
        self.command(&id)
            .cloned()
            .ok_or(EngineError::CommandNotFound(id))
    }

    /// Run until the queue is empty or a stop request is applied.
    pub async fn run_until_idle(&mut self) -> Result<Vec<Command>, EngineError> {
        let mut completed = Vec::new();
        while let Some(command) = self.execute_next().await? {
            completed.push(command);
        }
        Ok(completed)
    }

    fn commit_out_of_band(&mut self, update: &StateUpdate) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.store.commit(update);
        Ok(())
    }

    /// Default movement speed (mm/s) for `pipette_id`; `None` restores the
    /// hardware default.
    pub fn set_pipette_movement_speed(
        &mut self,
        pipette_id: &str,
        speed: Option<f64>,
    ) -> Result<(), EngineError> {
        self.store.view().pipettes().get(pipette_id)?;
        movement::validate_speed(speed).map_err(|e| EngineError::InvalidParams(e.to_string()))?;
        let mut update = StateUpdate::new();
        update.set_pipette_movement_speed(pipette_id, speed);
        self.commit_out_of_band(&update)
    }

    /// Register a calibration offset for labware matching `definition_uri`
    /// at `location`. Applies to labware loaded afterwards.
    pub fn add_labware_offset(
        &mut self,
        definition_uri: impl Into<String>,
        location: LabwareLocation,
        vector: DeckPoint,
    ) -> Result<LabwareOffset, EngineError> {
        let offset = LabwareOffset {
            id: self.model_utils.generate_id(),
            definition_uri: definition_uri.into(),
            location,
            vector,
            created_at: self.model_utils.get_timestamp(),
        };
        let mut update = StateUpdate::new();
        update.add_labware_offset(offset.clone());
        self.commit_out_of_band(&update)?;
        info!(offset_id = %offset.id, uri = %offset.definition_uri, "labware offset added");
        Ok(offset)
    }

    /// Register a custom labware definition; returns its URI.
    pub fn add_labware_definition(
        &mut self,
        definition: LabwareDefinition,
    ) -> Result<String, EngineError> {
        let uri = definition.uri();
        let mut update = StateUpdate::new();
        update.add_labware_definition(Arc::new(definition));
        self.commit_out_of_band(&update)?;
        info!(%uri, "labware definition added");
        Ok(uri)
    }
}
