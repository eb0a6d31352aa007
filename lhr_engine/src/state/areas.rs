//! Addressable areas a protocol has used (trash bins, slot areas).

use std::collections::BTreeSet;

use super::update::{FieldUpdate, StateUpdate};
use crate::types::DeckSlot;

/// Prefix of Flex movable trash bin areas, e.g. `movableTrashA3`.
pub const MOVABLE_TRASH_PREFIX: &str = "movableTrash";

/// OT-2 fixed trash area.
pub const FIXED_TRASH_AREA: &str = "fixedTrash";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressableAreaState {
    pub used: BTreeSet<String>,
}

pub fn reduce(mut state: AddressableAreaState, update: &StateUpdate) -> AddressableAreaState {
    if let FieldUpdate::Set(name) = &update.addressable_area_used {
        state.used.insert(name.clone());
    }
    state
}

/// Slot under a movable trash area.
pub fn trash_bin_slot(area_name: &str) -> Option<DeckSlot> {
    area_name
        .strip_prefix(MOVABLE_TRASH_PREFIX)
        .and_then(|slot| slot.parse().ok())
}

#[derive(Debug, Clone, Copy)]
pub struct AddressableAreaView<'a> {
    state: &'a AddressableAreaState,
}

impl<'a> AddressableAreaView<'a> {
    pub fn new(state: &'a AddressableAreaState) -> Self {
        Self { state }
    }

    pub fn is_used(&self, area_name: &str) -> bool {
        self.state.used.contains(area_name)
    }

    /// Slots holding a trash bin the protocol has used.
    pub fn trash_bin_slots(&self) -> impl Iterator<Item = DeckSlot> + 'a {
        self.state.used.iter().filter_map(|a| trash_bin_slot(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trash_bins_are_tracked() {
        let mut update = StateUpdate::new();
        update.mark_addressable_area_used("movableTrashA3");
        let state = reduce(AddressableAreaState::default(), &update);
        let view = AddressableAreaView::new(&state);
        assert!(view.is_used("movableTrashA3"));
        assert_eq!(
            view.trash_bin_slots().collect::<Vec<_>>(),
            vec![DeckSlot::new(12).unwrap()]
        );
        assert_eq!(trash_bin_slot("fixedTrash"), None);
    }
}
