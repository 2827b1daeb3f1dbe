//! Event grouping and value-axis scaling for timeline tracks.

use super::{TimelineEvent, TimelineTrackSpec};
use std::collections::HashMap;

/// Cap on the vertical padding reserved above and below a line-chart plot.
pub const MAX_PLOT_PADDING: f32 = 15.0;

/// Horizontal placement reported by the caller-supplied position function.
/// `pixel_width` is `None` for zero-width (point) events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventPosition {
    pub pixel_left: f32,
    pub pixel_width: Option<f32>,
}

/// Events sharing an identical `(start, end)` pair, rendered as one mark.
#[derive(Debug, Clone, PartialEq)]
pub struct EventGroup {
    pub start: i64,
    pub end: i64,
    pub events: Vec<TimelineEvent>,
}

impl EventGroup {
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }
}

/// Group a track's events by exact `(start, end)` collision. Groups keep
/// first-seen order; within a group events keep input order unless the
/// track supplies a simultaneous-event comparator, in which case each group
/// is re-sorted independently.
pub fn group_by_position(track: &TimelineTrackSpec) -> Vec<EventGroup> {
    let mut slots: HashMap<(i64, i64), usize> = HashMap::new();
    let mut groups: Vec<EventGroup> = Vec::new();

    for event in &track.events {
        let key = (event.start, event.end);
        match slots.get(&key) {
            Some(&slot) => groups[slot].events.push(event.clone()),
            None => {
                slots.insert(key, groups.len());
                groups.push(EventGroup {
                    start: event.start,
                    end: event.end,
                    events: vec![event.clone()],
                });
            }
        }
    }

    if let Some(sort) = &track.sort_simultaneous {
        for group in &mut groups {
            group.events.sort_by(|a, b| sort(a, b));
        }
    }

    groups
}

/// Value extent of a line-chart track, with `max > min` guaranteed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Scan every event of a line-chart track through its value extractor.
/// Returns `None` when no event yields a value (callers render nothing
/// height-dependent). An all-equal track gets the `max = min + 1`
/// correction so the scaling denominator stays strictly positive.
pub fn compute_value_range(track: &TimelineTrackSpec) -> Option<ValueRange> {
    let value_of = track.value_of.as_ref()?;

    let mut range: Option<ValueRange> = None;
    for event in &track.events {
        let Some(value) = value_of(event) else {
            continue;
        };
        range = Some(match range {
            None => ValueRange {
                min: value,
                max: value,
            },
            Some(range) => ValueRange {
                min: range.min.min(value),
                max: range.max.max(value),
            },
        });
    }

    range.map(|mut range| {
        if range.max == range.min {
            range.max = range.min + 1.0;
        }
        range
    })
}

/// Linear value-to-pixel map in a downward-increasing coordinate system:
/// `value == min` lands at the bottom of the plot area, `value == max` at
/// the top padding line.
pub fn value_to_y(value: f64, track_height: f32, range: ValueRange) -> f32 {
    let padding = (track_height / 7.0).min(MAX_PLOT_PADDING);
    let plot_height = track_height - 2.0 * padding;
    let proportion = ((value - range.min) / (range.max - range.min)) as f32;
    padding + (1.0 - proportion) * plot_height
}

/// Mean-of-values y for a group of simultaneous events. `None` iff every
/// event in the group yields a null value.
pub fn events_to_y(
    events: &[TimelineEvent],
    track: &TimelineTrackSpec,
    track_height: f32,
    range: ValueRange,
) -> Option<f32> {
    let value_of = track.value_of.as_ref()?;
    let values: Vec<f64> = events.iter().filter_map(|event| value_of(event)).collect();
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(value_to_y(mean, track_height, range))
}

/// Day-offset to pixel scale over `[min_day, max_day]`. The returned
/// closure is the opaque position function consumed by track assembly;
/// `limit` is the pixel width of the viewport.
pub fn day_position_scale(
    min_day: i64,
    max_day: i64,
) -> impl Fn(&TimelineEvent, f32) -> Option<EventPosition> {
    let span = (max_day - min_day).max(1) as f32;
    move |event: &TimelineEvent, limit: f32| {
        let per_day = limit / span;
        let pixel_left = (event.start - min_day) as f32 * per_day;
        let pixel_width = if event.is_point() {
            None
        } else {
            Some((event.end - event.start) as f32 * per_day)
        };
        Some(EventPosition {
            pixel_left,
            pixel_width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{TrackType, EVENT_ROW_HEIGHT};
    use std::sync::Arc;

    fn event(track: u32, start: i64, end: i64, value: Option<f64>) -> TimelineEvent {
        let mut attributes = Vec::new();
        if let Some(value) = value {
            attributes.push(("VALUE".to_string(), value.to_string()));
        }
        TimelineEvent {
            track,
            start,
            end,
            attributes,
            start_date: None,
            end_date: None,
            render: None,
        }
    }

    fn line_chart_track(events: Vec<TimelineEvent>) -> TimelineTrackSpec {
        let mut track = TimelineTrackSpec::new(0, "Lab", TrackType::LineChart);
        track.events = events;
        track.value_of = Some(Arc::new(|event: &TimelineEvent| {
            event.attribute("VALUE").and_then(|v| v.parse().ok())
        }));
        track
    }

    #[test]
    fn grouping_partitions_events() {
        let mut track = TimelineTrackSpec::new(0, "Treatment", TrackType::Event);
        track.events = vec![
            event(0, 0, 0, None),
            event(0, 0, 30, None),
            event(0, 0, 0, None),
            event(0, 5, 5, None),
        ];

        let groups = group_by_position(&track);
        assert_eq!(groups.len(), 3);
        let total: usize = groups.iter().map(|g| g.events.len()).sum();
        assert_eq!(total, track.events.len());

        // Two points at identical (0, 0) land in one group of two.
        assert_eq!(groups[0].events.len(), 2);
        assert!(groups[0].is_point());
        // Interval (0, 30) does not collide with point (0, 0).
        assert_eq!(groups[1].events.len(), 1);
        assert!(!groups[1].is_point());
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let mut track = TimelineTrackSpec::new(0, "Status", TrackType::Event);
        track.events = vec![
            event(0, 9, 9, None),
            event(0, 1, 1, None),
            event(0, 9, 9, None),
        ];

        let groups = group_by_position(&track);
        assert_eq!(groups[0].start, 9);
        assert_eq!(groups[1].start, 1);
    }

    #[test]
    fn comparator_resorts_within_groups() {
        let mut track = line_chart_track(vec![
            event(0, 0, 0, Some(9.0)),
            event(0, 0, 0, Some(1.0)),
            event(0, 0, 0, Some(5.0)),
        ]);
        track.sort_simultaneous = Some(Arc::new(|a: &TimelineEvent, b: &TimelineEvent| {
            let value = |e: &TimelineEvent| {
                e.attribute("VALUE")
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0)
            };
            value(a).partial_cmp(&value(b)).unwrap()
        }));

        let groups = group_by_position(&track);
        let values: Vec<&str> = groups[0]
            .events
            .iter()
            .map(|e| e.attribute("VALUE").unwrap())
            .collect();
        assert_eq!(values, ["1", "5", "9"]);
    }

    #[test]
    fn value_to_y_boundaries() {
        let range = ValueRange { min: 2.0, max: 8.0 };
        let height = 105.0;
        let padding = (height / 7.0_f32).min(MAX_PLOT_PADDING);
        let plot_height = height - 2.0 * padding;

        assert!((value_to_y(2.0, height, range) - (padding + plot_height)).abs() < 1e-4);
        assert!((value_to_y(8.0, height, range) - padding).abs() < 1e-4);
    }

    #[test]
    fn padding_is_capped_at_fifteen() {
        let range = ValueRange { min: 0.0, max: 1.0 };
        // 140 / 7 = 20, capped to 15.
        assert!((value_to_y(1.0, 140.0, range) - 15.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_range_is_corrected() {
        let track = line_chart_track(vec![
            event(0, 0, 0, Some(1.0)),
            event(0, 1, 1, Some(1.0)),
            event(0, 2, 2, Some(1.0)),
        ]);
        let range = compute_value_range(&track).unwrap();
        assert_eq!(range, ValueRange { min: 1.0, max: 2.0 });

        // All points sit at value == min, i.e. the bottom of the plot.
        let height = 105.0;
        let padding = (height / 7.0_f32).min(MAX_PLOT_PADDING);
        let y = value_to_y(1.0, height, range);
        assert!((y - (padding + height - 2.0 * padding)).abs() < 1e-4);
    }

    #[test]
    fn all_null_track_has_no_range() {
        let track = line_chart_track(vec![event(0, 0, 0, None), event(0, 1, 1, None)]);
        assert_eq!(compute_value_range(&track), None);
    }

    #[test]
    fn events_to_y_none_iff_all_null() {
        let track = line_chart_track(vec![
            event(0, 0, 0, Some(4.0)),
            event(0, 0, 0, None),
            event(0, 0, 0, Some(6.0)),
        ]);
        let range = ValueRange { min: 0.0, max: 10.0 };

        // Mean of the two non-null values is 5.0.
        let y = events_to_y(&track.events, &track, 105.0, range).unwrap();
        assert!((y - value_to_y(5.0, 105.0, range)).abs() < 1e-4);

        let nulls = [event(0, 0, 0, None)];
        assert_eq!(events_to_y(&nulls, &track, 105.0, range), None);
    }

    #[test]
    fn day_scale_maps_points_and_intervals() {
        let scale = day_position_scale(0, 100);
        let point = event(0, 50, 50, None);
        let position = scale(&point, 1000.0).unwrap();
        assert!((position.pixel_left - 500.0).abs() < 1e-3);
        assert_eq!(position.pixel_width, None);

        let interval = event(0, 10, 20, None);
        let position = scale(&interval, 1000.0).unwrap();
        assert!((position.pixel_left - 100.0).abs() < 1e-3);
        assert!((position.pixel_width.unwrap() - 100.0).abs() < 1e-3);
    }

    #[test]
    fn events_keep_row_height_constant() {
        let track = TimelineTrackSpec::new(0, "Surgery", TrackType::Event);
        assert_eq!(track.row_height(), EVENT_ROW_HEIGHT);
    }
}
