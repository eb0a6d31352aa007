//! Engine lifecycle transitions.
//!
//! ```text
//!   Idle ──Dispatch──► Running ──Complete──► Idle
//!    │                   │
//!   Stop               Fatal
//!    ▼                   ▼
//!  Stopped             Halted
//! ```
//!
//! `Stopped` and `Halted` are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Running,
    Stopped,
    Halted,
}

impl EngineState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Halted => "halted",
        }
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Halted)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an engine transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    Ok(EngineState),
    Rejected(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// A queued command starts.
    Dispatch,
    /// The running command reached `Succeeded` or `Failed`.
    Complete,
    /// The running command reached `Fatal`.
    Fatal,
    /// A stop request was observed between commands.
    Stop,
}

#[derive(Debug, Clone)]
pub struct EngineStateMachine {
    state: EngineState,
}

impl EngineStateMachine {
    pub const fn new() -> Self {
        Self {
            state: EngineState::Idle,
        }
    }

    #[inline]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    pub fn handle_event(&mut self, event: EngineEvent) -> TransitionResult {
        use EngineEvent::*;
        use EngineState::*;

        let next = match (self.state, event) {
            (Idle, Dispatch) => Running,
            (Running, Complete) => Idle,
            (Running, Fatal) => Halted,
            (Idle, Stop) => Stopped,
            _ => return TransitionResult::Rejected(invalid_transition_reason(self.state, event)),
        };
        self.state = next;
        TransitionResult::Ok(next)
    }

    /// Whether a new command may be dispatched.
    #[inline]
    pub const fn accepts_commands(&self) -> bool {
        matches!(self.state, EngineState::Idle)
    }
}

impl Default for EngineStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_transition_reason(state: EngineState, event: EngineEvent) -> &'static str {
    use EngineEvent::*;
    use EngineState::*;
    match (state, event) {
        (Halted, _) => "Halted: engine accepts no further events",
        (Stopped, _) => "Stopped: engine accepts no further events",
        (Running, Dispatch) => "Running: a command is already executing",
        (Running, Stop) => "Running: stop is honoured only between commands",
        (Idle, _) => "Idle: no command is running",
        (Running, _) => "Running: invalid event for current state",
    }
}
