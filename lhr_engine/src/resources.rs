//! Static resources the engine consults: pipette and labware definitions,
//! and the id/timestamp provider.

pub mod labware;
pub mod model_utils;
pub mod pipettes;

pub use labware::{Dimensions, LabwareDefinition, WellDefinition};
pub use model_utils::{ModelUtils, SequentialModelUtils, SystemModelUtils};
pub use pipettes::{LiquidClassConfig, PipetteConfig, PipetteDefinition, PipetteName};
