//! Per-mark tooltip interaction.
//!
//! Each rendered mark owns a [`MarkInteraction`]: a two-state machine
//! (`NO_TOOLTIP` / `TOOLTIP_ACTIVE`) whose only local state is a cached
//! tooltip uid. The store is the single source of truth for tooltip
//! lifetime; the cached uid is revalidated against it at the top of every
//! handler, since another mark's interaction (or the host) may have
//! removed the entry in between.

use super::{TimelineEvent, TrackId};
use crate::store::{StudyStore, TooltipUid};
use iced::Point;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkInteraction {
    tooltip: Option<TooltipUid>,
}

impl MarkInteraction {
    /// Drop the cached uid if the store no longer knows it. Must run
    /// before any write in the same handler invocation.
    fn sync(&mut self, store: &StudyStore) {
        if let Some(uid) = self.tooltip {
            if !store.tooltip_exists(uid) {
                self.tooltip = None;
            }
        }
    }

    /// Pointer moved over the mark: ensure a live tooltip entry exists for
    /// it, mark it hovered, and track the pointer's page coordinates.
    pub fn pointer_move(
        &mut self,
        store: &mut StudyStore,
        track: TrackId,
        events: &[TimelineEvent],
        position: Point,
    ) {
        self.sync(store);

        let uid = match self.tooltip {
            Some(uid) => uid,
            None => {
                let uid = store.add_tooltip(track, events.to_vec());
                self.tooltip = Some(uid);
                uid
            }
        };

        store.set_hovered_tooltip_uid(Some(uid));
        store.set_mouse_position(position);
    }

    /// Pointer left the mark: remove the tooltip unless it was pinned.
    pub fn pointer_leave(&mut self, store: &mut StudyStore) {
        self.sync(store);

        if let Some(uid) = self.tooltip {
            if !store.is_tooltip_pinned(uid) {
                store.remove_tooltip(uid);
                self.tooltip = None;
            } else if store.hovered_tooltip_uid() == Some(uid) {
                store.set_hovered_tooltip_uid(None);
            }
        }
    }

    /// Click on the mark: toggle the pin flag of its live tooltip, if any.
    pub fn click(&mut self, store: &mut StudyStore) {
        self.sync(store);

        if let Some(uid) = self.tooltip {
            store.toggle_pin_tooltip(uid);
        }
    }

    pub fn tooltip_uid(&self) -> Option<TooltipUid> {
        self.tooltip
    }
}
