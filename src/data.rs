use crate::store::{ProfileOption, SampleEntity, StudyStore};
use crate::timeline::{
    interaction::MarkInteraction, MarkKey, TimelineEvent, TimelineTrackSpec, TrackType,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read study file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse study file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("line-chart track {label:?} has no value_attribute")]
    MissingValueAttribute { label: String },
}

/// On-disk study file. Day offsets are relative to the study reference
/// date; explicit dates are display-only.
#[derive(Debug, Deserialize)]
struct StudyFile {
    study_id: String,
    patient_id: String,
    #[serde(default)]
    tracks: Vec<TrackFile>,
    #[serde(default)]
    profiles: BTreeMap<String, Vec<ProfileOption>>,
    #[serde(default)]
    profile_samples: BTreeMap<String, Vec<SampleEntity>>,
}

#[derive(Debug, Deserialize)]
struct TrackFile {
    label: String,
    #[serde(default, rename = "type")]
    track_type: TrackTypeFile,
    /// Attribute read by the value extractor of line-chart tracks.
    #[serde(default)]
    value_attribute: Option<String>,
    #[serde(default)]
    events: Vec<EventFile>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
enum TrackTypeFile {
    #[default]
    Event,
    LineChart,
}

#[derive(Debug, Deserialize)]
struct EventFile {
    start: i64,
    #[serde(default)]
    end: Option<i64>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

/// A fully loaded study tab: tracks, the shared store, and the per-mark
/// interaction state the timeline canvas drives.
#[derive(Debug, Clone)]
pub struct StudyData {
    pub study_id: String,
    pub patient_id: String,
    pub tracks: Vec<TimelineTrackSpec>,
    pub store: StudyStore,
    pub interactions: HashMap<MarkKey, MarkInteraction>,
    pub hovered_mark: Option<MarkKey>,
    pub selected_profile: Option<ProfileOption>,
}

pub fn load_study_data(path: &Path) -> Result<StudyData, DataError> {
    let raw = std::fs::read_to_string(path)?;
    let file: StudyFile = serde_json::from_str(&raw)?;
    build_study_data(file)
}

fn build_study_data(file: StudyFile) -> Result<StudyData, DataError> {
    let mut tracks = Vec::with_capacity(file.tracks.len());

    for (index, track_file) in file.tracks.into_iter().enumerate() {
        let id = index as u32;
        let track_type = match track_file.track_type {
            TrackTypeFile::Event => TrackType::Event,
            TrackTypeFile::LineChart => TrackType::LineChart,
        };

        let mut track = TimelineTrackSpec::new(id, track_file.label.clone(), track_type);

        if track_type == TrackType::LineChart {
            let attribute =
                track_file
                    .value_attribute
                    .ok_or_else(|| DataError::MissingValueAttribute {
                        label: track_file.label.clone(),
                    })?;
            track.value_of = Some(Arc::new(move |event: &TimelineEvent| {
                event.attribute(&attribute).and_then(|v| v.parse().ok())
            }));
        }

        let mut events: Vec<TimelineEvent> = track_file
            .events
            .into_iter()
            .map(|event| TimelineEvent {
                track: id,
                start: event.start,
                end: event.end.unwrap_or(event.start),
                attributes: event.attributes.into_iter().collect(),
                start_date: event.start_date,
                end_date: event.end_date,
                render: None,
            })
            .collect();
        events.sort_by_key(|event| event.start);
        track.events = events;

        tracks.push(track);
    }

    Ok(StudyData {
        study_id: file.study_id,
        patient_id: file.patient_id,
        tracks,
        store: StudyStore::new(file.profiles, file.profile_samples),
        interactions: HashMap::new(),
        hovered_mark: None,
        selected_profile: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDY_JSON: &str = r#"{
        "study_id": "lgg_ucsf_2014",
        "patient_id": "P04",
        "tracks": [
            {
                "label": "Treatment",
                "type": "event",
                "events": [
                    { "start": 30, "end": 120, "attributes": { "AGENT": "temozolomide" } },
                    { "start": 0, "start_date": "2014-01-02",
                      "attributes": { "EVENT_TYPE": "surgery" } }
                ]
            },
            {
                "label": "Karnofsky score",
                "type": "line-chart",
                "value_attribute": "VALUE",
                "events": [
                    { "start": 0, "attributes": { "VALUE": "80" } },
                    { "start": 90, "attributes": { "VALUE": "90" } }
                ]
            }
        ],
        "profiles": {
            "MUTATION_EXTENDED": [
                { "value": "lgg_ucsf_2014_mutations", "label": "Mutations",
                  "profile_ids": ["lgg_ucsf_2014_mutations"] }
            ]
        },
        "profile_samples": {
            "lgg_ucsf_2014_mutations": [
                { "stable_id": "P04-S01", "sample_type": "Primary" },
                { "stable_id": "P04-S02" }
            ]
        }
    }"#;

    fn load() -> StudyData {
        let file: StudyFile = serde_json::from_str(STUDY_JSON).unwrap();
        build_study_data(file).unwrap()
    }

    #[test]
    fn study_file_parses() {
        let data = load();
        assert_eq!(data.study_id, "lgg_ucsf_2014");
        assert_eq!(data.patient_id, "P04");
        assert_eq!(data.tracks.len(), 2);
        assert_eq!(
            data.store.samples_by_profile["lgg_ucsf_2014_mutations"][0].stable_id,
            "P04-S01"
        );
    }

    #[test]
    fn events_are_sorted_and_point_end_defaults_to_start() {
        let data = load();
        let treatment = &data.tracks[0];
        assert_eq!(treatment.events[0].start, 0);
        assert!(treatment.events[0].is_point());
        assert_eq!(treatment.events[1].end, 120);
    }

    #[test]
    fn line_chart_value_extractor_reads_named_attribute() {
        let data = load();
        let lab = &data.tracks[1];
        assert_eq!(lab.track_type, TrackType::LineChart);
        let value_of = lab.value_of.as_ref().unwrap();
        assert_eq!(value_of(&lab.events[0]), Some(80.0));
    }

    #[test]
    fn line_chart_without_value_attribute_is_an_error() {
        let json = r#"{
            "study_id": "s", "patient_id": "p",
            "tracks": [ { "label": "Lab", "type": "line-chart", "events": [] } ]
        }"#;
        let file: StudyFile = serde_json::from_str(json).unwrap();
        assert!(matches!(
            build_study_data(file),
            Err(DataError::MissingValueAttribute { .. })
        ));
    }

    #[test]
    fn unparsable_values_extract_as_none() {
        let json = r#"{
            "study_id": "s", "patient_id": "p",
            "tracks": [ {
                "label": "Lab", "type": "line-chart", "value_attribute": "VALUE",
                "events": [ { "start": 0, "attributes": { "VALUE": "n/a" } } ]
            } ]
        }"#;
        let file: StudyFile = serde_json::from_str(json).unwrap();
        let data = build_study_data(file).unwrap();
        let value_of = data.tracks[0].value_of.as_ref().unwrap();
        assert_eq!(value_of(&data.tracks[0].events[0]), None);
    }
}
