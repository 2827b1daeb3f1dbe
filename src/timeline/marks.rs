//! Retained mark model for track rendering.
//!
//! Assembly produces a flat, ordered list of [`Mark`]s in track-local
//! coordinates; the canvas program paints them. Keeping the marks as data
//! (rather than drawing straight into a frame) is what lets the renderers
//! below be unit-tested.

use super::layout::EventGroup;
use super::ticks::Tick;
use super::{TimelineTrackSpec, POINT_RADIUS, RANGE_HEIGHT};

pub const BADGE_RADIUS: f32 = 7.0;

/// A visual primitive emitted by track assembly. Positions are relative to
/// the track row's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// Background wash over the whole row.
    Highlight { width: f32, height: f32 },
    /// Full-width horizontal value-axis line.
    GridLine { y: f32 },
    /// Straight segment between two plotted points.
    Segment { from: (f32, f32), to: (f32, f32) },
    /// Filled circle for a single point event.
    Circle { x: f32, y: f32, radius: f32 },
    /// Stroked circle, used behind stacked groups.
    OutlineCircle { x: f32, y: f32, radius: f32 },
    /// Count badge for a group of simultaneous events.
    Badge { x: f32, y: f32, count: usize },
    /// Rounded bar for an interval event.
    RangeBar {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// Free-form text, available to custom renderers.
    Label { x: f32, y: f32, content: String },
    /// Dashed bottom separator of the row.
    Separator { y: f32 },
}

/// Shift a custom renderer's output to the group's anchor point. Custom
/// renderers position their marks relative to the origin.
pub fn translate(marks: Vec<Mark>, dx: f32, dy: f32) -> Vec<Mark> {
    marks
        .into_iter()
        .map(|mark| match mark {
            Mark::Highlight { .. } | Mark::GridLine { .. } | Mark::Separator { .. } => mark,
            Mark::Segment { from, to } => Mark::Segment {
                from: (from.0 + dx, from.1 + dy),
                to: (to.0 + dx, to.1 + dy),
            },
            Mark::Circle { x, y, radius } => Mark::Circle {
                x: x + dx,
                y: y + dy,
                radius,
            },
            Mark::OutlineCircle { x, y, radius } => Mark::OutlineCircle {
                x: x + dx,
                y: y + dy,
                radius,
            },
            Mark::Badge { x, y, count } => Mark::Badge {
                x: x + dx,
                y: y + dy,
                count,
            },
            Mark::RangeBar {
                x,
                y,
                width,
                height,
            } => Mark::RangeBar {
                x: x + dx,
                y: y + dy,
                width,
                height,
            },
            Mark::Label { x, y, content } => Mark::Label {
                x: x + dx,
                y: y + dy,
                content,
            },
        })
        .collect()
}

/// Render one position group as a point mark at `(x, y)`. Three mutually
/// exclusive cases, in precedence order:
/// 1. a lone event carrying its own renderer delegates entirely to it;
/// 2. a multi-event group whose events all belong to a track with a
///    multi-event renderer delegates the whole group;
/// 3. otherwise the generic rendering: a count badge over stacked circles
///    for groups, a fixed-radius filled circle for a lone event.
pub fn render_point(group: &EventGroup, track: &TimelineTrackSpec, x: f32, y: f32) -> Vec<Mark> {
    if group.events.len() == 1 {
        if let Some(render) = &group.events[0].render {
            return translate(render(&group.events[0]), x, y);
        }
    } else if group.events.iter().all(|event| event.track == track.id) {
        if let Some(render) = &track.render_events {
            return translate(render(&group.events), x, y);
        }
    }

    if group.events.len() > 1 {
        vec![
            Mark::OutlineCircle {
                x: x + 3.0,
                y: y - 3.0,
                radius: POINT_RADIUS,
            },
            Mark::OutlineCircle {
                x: x + 1.5,
                y: y - 1.5,
                radius: POINT_RADIUS,
            },
            Mark::Badge {
                x,
                y,
                count: group.events.len(),
            },
        ]
    } else {
        vec![Mark::Circle {
            x,
            y,
            radius: POINT_RADIUS,
        }]
    }
}

/// Width of an interval bar: never narrower than a point's diameter, so
/// very short intervals stay visible.
pub fn range_width(pixel_width: f32) -> f32 {
    pixel_width.max(2.0 * POINT_RADIUS)
}

/// Rounded interval bar, vertically centered in the event-row height.
pub fn render_range(x: f32, pixel_width: f32, row_height: f32) -> Mark {
    Mark::RangeBar {
        x,
        y: (row_height - RANGE_HEIGHT) / 2.0,
        width: range_width(pixel_width),
        height: RANGE_HEIGHT,
    }
}

/// Straight segments between consecutive plotted points, in input order.
/// Fewer than two points draw nothing.
pub fn connecting_lines(points: &[(f32, f32)]) -> Vec<Mark> {
    points
        .windows(2)
        .map(|pair| Mark::Segment {
            from: pair[0],
            to: pair[1],
        })
        .collect()
}

/// One full-width horizontal line per tick offset reported by the opaque
/// axis-tick collaborator.
pub fn grid_lines(
    track: &TimelineTrackSpec,
    ticker: &dyn Fn(&TimelineTrackSpec) -> Vec<Tick>,
) -> Vec<Mark> {
    ticker(track)
        .into_iter()
        .map(|tick| Mark::GridLine { y: tick.offset })
        .collect()
}
