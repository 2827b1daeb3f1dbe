//! Molecular-profile selector: a dropdown over the study's profile
//! options and the sample identifiers behind the selected profile.

use crate::data::StudyData;
use crate::store::ProfileOption;
use crate::Message;
use iced::widget::{column, container, pick_list, row, text};
use iced::{Element, Length};
use std::path::PathBuf;

pub fn view(data: &StudyData) -> Element<'_, Message> {
    let options: Vec<ProfileOption> = data
        .store
        .options_by_assay
        .values()
        .flatten()
        .cloned()
        .collect();

    if options.is_empty() {
        return container(text("No molecular profiles in this study").size(12))
            .padding(6)
            .into();
    }

    let picker = pick_list(
        options,
        data.selected_profile.clone(),
        Message::ProfileSelected,
    )
    .placeholder("Select a molecular profile")
    .text_size(12);

    let mut samples = column![].spacing(2);
    if let Some(selected) = &data.selected_profile {
        for profile_id in &selected.profile_ids {
            let Some(entities) = data.store.samples_by_profile.get(profile_id) else {
                continue;
            };
            for entity in entities {
                let label = match &entity.sample_type {
                    Some(sample_type) => format!("{} ({})", entity.stable_id, sample_type),
                    None => entity.stable_id.clone(),
                };
                samples = samples.push(text(label).size(12));
            }
        }
    }

    container(
        row![
            column![text("Molecular profile").size(12), picker].spacing(4),
            column![text("Samples").size(12), samples].spacing(4),
        ]
        .spacing(20),
    )
    .width(Length::Fill)
    .padding(8)
    .into()
}

/// Mount-time diagnostic fetch. Fire-and-forget: re-reads the study file
/// and logs profile coverage; a slow or failed read only suppresses the
/// log line and has no other observable effect.
pub async fn log_profile_summary(path: PathBuf) {
    let summary = std::fs::read_to_string(&path)
        .map_err(|error| error.to_string())
        .and_then(|raw| {
            serde_json::from_str::<serde_json::Value>(&raw).map_err(|error| error.to_string())
        });

    match summary {
        Ok(value) => {
            let profile_count = value
                .get("profiles")
                .and_then(|profiles| profiles.as_object())
                .map(|assays| assays.values().filter_map(|v| v.as_array()).flatten().count())
                .unwrap_or(0);
            let sample_lists = value
                .get("profile_samples")
                .and_then(|samples| samples.as_object())
                .map(|map| map.len())
                .unwrap_or(0);
            tracing::debug!(
                path = %path.display(),
                profile_count,
                sample_lists,
                "molecular profile coverage"
            );
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "profile diagnostics fetch failed");
        }
    }
}
