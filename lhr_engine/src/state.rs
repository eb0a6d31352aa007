//! Engine state store.
//!
//! State is a set of slices, each folded by a pure reducer over a
//! [`StateUpdate`]. The engine is the only writer; everyone else reads
//! immutable snapshots.
//!
//! ```text
//!   command ──► StateUpdate ──► StateStore::commit ──► Arc<State> (new)
//!                                                         │
//!                               StateReader::view ◄───────┘
//! ```

pub mod areas;
pub mod fluid_stack;
pub mod geometry;
pub mod labware;
pub mod modules;
pub mod pipettes;
pub mod tips;
pub mod update;
pub mod wells;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::types::{ApiVersion, RobotType};

pub use areas::AddressableAreaView;
pub use fluid_stack::{FluidSegment, FluidStack};
pub use geometry::GeometryView;
pub use labware::{LabwareView, LoadedLabware};
pub use modules::{LoadedModule, ModuleView};
pub use pipettes::{LoadedPipette, PipetteView};
pub use tips::TipView;
pub use update::{FieldUpdate, FluidKind, FluidOperation, LabwareOffset, StateUpdate};
pub use wells::WellView;

/// Settings fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateConfig {
    pub robot_type: RobotType,
    pub api_version: ApiVersion,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    pub config: StateConfig,
    pub pipettes: pipettes::PipetteState,
    pub tips: tips::TipState,
    pub labware: labware::LabwareState,
    pub modules: modules::ModuleState,
    pub wells: wells::WellState,
    pub areas: areas::AddressableAreaState,
}

impl State {
    pub fn new(config: StateConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Fold one update into every slice.
    #[must_use]
    pub fn apply(self, update: &StateUpdate) -> Self {
        if update.is_empty() {
            return self;
        }
        Self {
            config: self.config,
            pipettes: pipettes::reduce(self.pipettes, update),
            tips: tips::reduce(self.tips, update),
            labware: labware::reduce(self.labware, update),
            modules: modules::reduce(self.modules, update),
            wells: wells::reduce(self.wells, update),
            areas: areas::reduce(self.areas, update),
        }
    }
}

type Shared = Arc<RwLock<Arc<State>>>;

/// Owner of the current state. Only the engine commits.
#[derive(Debug)]
pub struct StateStore {
    current: Shared,
}

impl StateStore {
    pub fn new(state: State) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(state))),
        }
    }

    pub fn view(&self) -> StateView {
        StateView {
            state: Arc::clone(&self.current.read()),
        }
    }

    pub fn reader(&self) -> StateReader {
        StateReader {
            current: Arc::clone(&self.current),
        }
    }

    /// Apply `update` and publish the resulting snapshot.
    ///
    /// Snapshots taken before the commit are unaffected.
    pub(crate) fn commit(&self, update: &StateUpdate) {
        if update.is_empty() {
            return;
        }
        let previous = Arc::clone(&self.current.read());
        let next = State::clone(&previous).apply(update);
        *self.current.write() = Arc::new(next);
        trace!("state committed");
    }
}

/// Read handle that can be cloned into other tasks or threads.
#[derive(Debug, Clone)]
pub struct StateReader {
    current: Shared,
}

impl StateReader {
    pub fn view(&self) -> StateView {
        StateView {
            state: Arc::clone(&self.current.read()),
        }
    }
}

/// Immutable snapshot of the engine state.
#[derive(Debug, Clone)]
pub struct StateView {
    state: Arc<State>,
}

impl StateView {
    pub fn new(state: State) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    #[inline]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[inline]
    pub fn config(&self) -> &StateConfig {
        &self.state.config
    }

    pub fn pipettes(&self) -> PipetteView<'_> {
        PipetteView::new(&self.state.pipettes)
    }

    pub fn tips(&self) -> TipView<'_> {
        TipView::new(&self.state.tips)
    }

    pub fn labware(&self) -> LabwareView<'_> {
        LabwareView::new(&self.state.labware)
    }

    pub fn modules(&self) -> ModuleView<'_> {
        ModuleView::new(&self.state.modules)
    }

    pub fn wells(&self) -> WellView<'_> {
        WellView::new(&self.state.wells)
    }

    pub fn areas(&self) -> AddressableAreaView<'_> {
        AddressableAreaView::new(&self.state.areas)
    }

    pub fn geometry(&self) -> GeometryView<'_> {
        GeometryView::new(&self.state)
    }
}
