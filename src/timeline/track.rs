//! Assembly of one track row into an ordered mark list plus hit regions.

use super::layout::{self, EventGroup, EventPosition};
use super::marks::{self, Mark, BADGE_RADIUS};
use super::ticks::Tick;
use super::{TimelineTrackSpec, TrackType, POINT_RADIUS, RANGE_HEIGHT};

/// Viewport geometry of one track row, supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub width: f32,
    pub height: f32,
    pub y_offset: f32,
}

/// Pointer-interaction target for one position group, in track-local
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Index into [`TrackLayout::groups`].
    pub group: usize,
}

/// Everything needed to paint and hit-test one track row.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLayout {
    pub marks: Vec<Mark>,
    pub regions: Vec<HitRegion>,
    pub groups: Vec<EventGroup>,
}

/// Assemble a track: group events by identical position, compute the value
/// range once for line charts, place every group through the opaque
/// position function, and emit marks in order — highlight, grid lines,
/// connecting lines, group marks, bottom separator.
pub fn assemble_track(
    track: &TimelineTrackSpec,
    geometry: &TrackGeometry,
    highlighted: bool,
    position: &dyn Fn(&super::TimelineEvent, f32) -> Option<EventPosition>,
    ticker: &dyn Fn(&TimelineTrackSpec) -> Vec<Tick>,
) -> TrackLayout {
    let groups = layout::group_by_position(track);
    let is_line_chart = track.track_type == TrackType::LineChart;
    let value_range = if is_line_chart {
        layout::compute_value_range(track)
    } else {
        None
    };

    let mut group_marks: Vec<Mark> = Vec::new();
    let mut regions: Vec<HitRegion> = Vec::new();
    let mut plotted: Vec<(f32, f32)> = Vec::new();

    for (index, group) in groups.iter().enumerate() {
        let Some(placement) = position(&group.events[0], geometry.width) else {
            continue;
        };
        let x = placement.pixel_left;

        if group.is_point() {
            let point_y = value_range
                .and_then(|range| layout::events_to_y(&group.events, track, geometry.height, range));
            // Unresolved values still get a mark at mid-row; only the
            // connecting line skips them.
            let y = point_y.unwrap_or(geometry.height / 2.0);

            group_marks.extend(marks::render_point(group, track, x, y));
            regions.push(point_region(x, y, group.events.len(), index));

            if is_line_chart {
                if let Some(y) = point_y {
                    plotted.push((x, y));
                }
            }
        } else {
            let Some(pixel_width) = placement.pixel_width else {
                continue;
            };
            let mark = marks::render_range(x, pixel_width, geometry.height);
            if let Mark::RangeBar {
                x, y, width, ..
            } = mark
            {
                regions.push(HitRegion {
                    x,
                    y: y - 2.0,
                    width,
                    height: RANGE_HEIGHT + 4.0,
                    group: index,
                });
            }
            group_marks.push(mark);
        }
    }

    let mut all = Vec::new();
    if highlighted {
        all.push(Mark::Highlight {
            width: geometry.width,
            height: geometry.height,
        });
    }
    if is_line_chart {
        all.extend(marks::grid_lines(track, ticker));
        all.extend(marks::connecting_lines(&plotted));
    }
    all.extend(group_marks);
    all.push(Mark::Separator {
        y: geometry.height,
    });

    TrackLayout {
        marks: all,
        regions,
        groups,
    }
}

fn point_region(x: f32, y: f32, count: usize, group: usize) -> HitRegion {
    let radius = if count > 1 {
        BADGE_RADIUS + 2.0
    } else {
        POINT_RADIUS + 2.0
    };
    HitRegion {
        x: x - radius,
        y: y - radius,
        width: radius * 2.0,
        height: radius * 2.0,
        group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{layout::ValueRange, TimelineEvent, EVENT_ROW_HEIGHT};
    use std::sync::Arc;

    fn event(start: i64, end: i64, value: Option<f64>) -> TimelineEvent {
        let mut attributes = Vec::new();
        if let Some(value) = value {
            attributes.push(("VALUE".to_string(), value.to_string()));
        }
        TimelineEvent {
            track: 0,
            start,
            end,
            attributes,
            start_date: None,
            end_date: None,
            render: None,
        }
    }

    fn geometry(height: f32) -> TrackGeometry {
        TrackGeometry {
            width: 960.0,
            height,
            y_offset: 0.0,
        }
    }

    fn no_ticks(_: &TimelineTrackSpec) -> Vec<Tick> {
        Vec::new()
    }

    #[test]
    fn event_track_emits_marks_in_order() {
        let mut track = TimelineTrackSpec::new(0, "Treatment", TrackType::Event);
        track.events = vec![event(0, 0, None), event(10, 40, None)];
        let scale = layout::day_position_scale(0, 100);

        let layout = assemble_track(
            &track,
            &geometry(EVENT_ROW_HEIGHT),
            false,
            &scale,
            &no_ticks,
        );

        // Point circle, interval bar, then the dashed separator last.
        assert!(matches!(layout.marks[0], Mark::Circle { .. }));
        assert!(matches!(layout.marks[1], Mark::RangeBar { .. }));
        assert_eq!(
            layout.marks.last(),
            Some(&Mark::Separator {
                y: EVENT_ROW_HEIGHT
            })
        );
        assert_eq!(layout.regions.len(), 2);
        assert_eq!(layout.groups.len(), 2);
    }

    #[test]
    fn highlight_comes_first_when_set() {
        let mut track = TimelineTrackSpec::new(0, "Treatment", TrackType::Event);
        track.events = vec![event(0, 0, None)];
        let scale = layout::day_position_scale(0, 10);

        let layout = assemble_track(
            &track,
            &geometry(EVENT_ROW_HEIGHT),
            true,
            &scale,
            &no_ticks,
        );
        assert!(matches!(layout.marks[0], Mark::Highlight { .. }));
    }

    #[test]
    fn line_chart_connects_resolved_points_only() {
        let mut track = TimelineTrackSpec::new(0, "Lab", TrackType::LineChart);
        track.events = vec![
            event(0, 0, Some(1.0)),
            event(10, 10, None),
            event(20, 20, Some(3.0)),
            event(30, 30, Some(2.0)),
        ];
        track.value_of = Some(Arc::new(|event: &TimelineEvent| {
            event.attribute("VALUE").and_then(|v| v.parse().ok())
        }));
        let scale = layout::day_position_scale(0, 30);

        let layout = assemble_track(&track, &geometry(105.0), false, &scale, &no_ticks);

        // Three resolved points yield two segments; the all-null group is
        // skipped by the line but still gets a mark and a region.
        let segments = layout
            .marks
            .iter()
            .filter(|mark| matches!(mark, Mark::Segment { .. }))
            .count();
        assert_eq!(segments, 2);
        assert_eq!(layout.regions.len(), 4);
    }

    #[test]
    fn unpositioned_interval_is_skipped() {
        let mut track = TimelineTrackSpec::new(0, "Treatment", TrackType::Event);
        track.events = vec![event(5, 25, None)];

        // Position function reports no width: the interval renders nothing.
        let no_width = |event: &TimelineEvent, _: f32| {
            Some(EventPosition {
                pixel_left: event.start as f32,
                pixel_width: None,
            })
        };
        let layout = assemble_track(
            &track,
            &geometry(EVENT_ROW_HEIGHT),
            false,
            &no_width,
            &no_ticks,
        );
        assert!(layout.regions.is_empty());
        assert_eq!(
            layout.marks,
            vec![Mark::Separator {
                y: EVENT_ROW_HEIGHT
            }]
        );
    }

    #[test]
    fn stacked_points_hit_region_covers_badge() {
        let mut track = TimelineTrackSpec::new(0, "Samples", TrackType::Event);
        track.events = vec![event(0, 0, None), event(0, 0, None)];
        let scale = layout::day_position_scale(0, 10);

        let layout = assemble_track(
            &track,
            &geometry(EVENT_ROW_HEIGHT),
            false,
            &scale,
            &no_ticks,
        );
        assert_eq!(layout.regions.len(), 1);
        assert!(layout.regions[0].width > 2.0 * POINT_RADIUS);
    }

    #[test]
    fn line_chart_points_sit_at_scaled_y() {
        let mut track = TimelineTrackSpec::new(0, "Lab", TrackType::LineChart);
        track.events = vec![event(0, 0, Some(0.0)), event(10, 10, Some(10.0))];
        track.value_of = Some(Arc::new(|event: &TimelineEvent| {
            event.attribute("VALUE").and_then(|v| v.parse().ok())
        }));
        let scale = layout::day_position_scale(0, 10);

        let layout = assemble_track(&track, &geometry(105.0), false, &scale, &no_ticks);
        let range = ValueRange {
            min: 0.0,
            max: 10.0,
        };
        let expected_top = crate::timeline::layout::value_to_y(10.0, 105.0, range);

        let circle_ys: Vec<f32> = layout
            .marks
            .iter()
            .filter_map(|mark| match mark {
                Mark::Circle { y, .. } => Some(*y),
                _ => None,
            })
            .collect();
        assert_eq!(circle_ys.len(), 2);
        assert!((circle_ys[1] - expected_top).abs() < 1e-4);
    }
}
