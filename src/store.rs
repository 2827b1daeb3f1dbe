//! The shared observable store backing the timeline and selector views.
//!
//! The store is the single source of truth for tooltip lifetime, the
//! hovered-tooltip uid, the global mouse position, and the molecular
//! profile maps the selector reads. It is owned by the per-study tab and
//! mutated only inside the application's `update`, so every mutation
//! schedules a fresh render of a consistent snapshot.

use crate::timeline::{TimelineEvent, TrackId};
use iced::Point;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Generated identifier of a tooltip registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TooltipUid(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipEntry {
    pub track: TrackId,
    pub events: Vec<TimelineEvent>,
    pub pinned: bool,
}

/// One selectable molecular profile option, grouped under an assay type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileOption {
    pub value: String,
    pub label: String,
    pub profile_ids: Vec<String>,
}

impl std::fmt::Display for ProfileOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// A sample entity associated with a molecular profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SampleEntity {
    pub stable_id: String,
    #[serde(default)]
    pub sample_type: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct StudyStore {
    tooltips: BTreeMap<TooltipUid, TooltipEntry>,
    next_uid: u64,
    hovered_uid: Option<TooltipUid>,
    mouse_position: Point,
    pub options_by_assay: BTreeMap<String, Vec<ProfileOption>>,
    pub samples_by_profile: BTreeMap<String, Vec<SampleEntity>>,
}

impl StudyStore {
    pub fn new(
        options_by_assay: BTreeMap<String, Vec<ProfileOption>>,
        samples_by_profile: BTreeMap<String, Vec<SampleEntity>>,
    ) -> Self {
        Self {
            options_by_assay,
            samples_by_profile,
            ..Self::default()
        }
    }

    pub fn add_tooltip(&mut self, track: TrackId, events: Vec<TimelineEvent>) -> TooltipUid {
        let uid = TooltipUid(self.next_uid);
        self.next_uid += 1;
        self.tooltips.insert(
            uid,
            TooltipEntry {
                track,
                events,
                pinned: false,
            },
        );
        uid
    }

    pub fn remove_tooltip(&mut self, uid: TooltipUid) {
        self.tooltips.remove(&uid);
        if self.hovered_uid == Some(uid) {
            self.hovered_uid = None;
        }
    }

    pub fn toggle_pin_tooltip(&mut self, uid: TooltipUid) {
        if let Some(entry) = self.tooltips.get_mut(&uid) {
            entry.pinned = !entry.pinned;
        }
    }

    pub fn is_tooltip_pinned(&self, uid: TooltipUid) -> bool {
        self.tooltips
            .get(&uid)
            .map(|entry| entry.pinned)
            .unwrap_or(false)
    }

    pub fn tooltip_exists(&self, uid: TooltipUid) -> bool {
        self.tooltips.contains_key(&uid)
    }

    pub fn tooltip(&self, uid: TooltipUid) -> Option<&TooltipEntry> {
        self.tooltips.get(&uid)
    }

    pub fn set_hovered_tooltip_uid(&mut self, uid: Option<TooltipUid>) {
        self.hovered_uid = uid;
    }

    pub fn hovered_tooltip_uid(&self) -> Option<TooltipUid> {
        self.hovered_uid
    }

    pub fn hovered_tooltip(&self) -> Option<&TooltipEntry> {
        self.hovered_uid.and_then(|uid| self.tooltips.get(&uid))
    }

    pub fn set_mouse_position(&mut self, position: Point) {
        self.mouse_position = position;
    }

    pub fn mouse_position(&self) -> Point {
        self.mouse_position
    }

    pub fn pinned_tooltips(&self) -> impl Iterator<Item = (TooltipUid, &TooltipEntry)> {
        self.tooltips
            .iter()
            .filter(|(_, entry)| entry.pinned)
            .map(|(&uid, entry)| (uid, entry))
    }

    pub fn tooltip_count(&self) -> usize {
        self.tooltips.len()
    }
}
