use crate::Message;
use iced::mouse;
use iced::widget::canvas::{self, Action, Canvas, Geometry, Program};
use iced::widget::{column, container, row, text};
use iced::{Color, Element, Length, Point, Rectangle, Renderer, Size, Theme};
use std::cmp::Ordering;
use std::sync::Arc;

pub mod header;
pub mod interaction;
pub mod layout;
pub mod marks;
pub mod ticks;
pub mod track;

use marks::Mark;
use track::{TrackGeometry, TrackLayout};

pub const LABEL_WIDTH: f32 = 150.0;
pub const HEADER_HEIGHT: f32 = 24.0;
pub const TRACK_SPACING: f32 = 2.0;
pub const TIMELINE_WIDTH: f32 = 960.0;

/// Row height of a discrete event track; also the fallback vertical center
/// for points on tracks without a value axis.
pub const EVENT_ROW_HEIGHT: f32 = 20.0;
/// Line-chart tracks get a taller row so the value axis has room to breathe.
pub const LINE_CHART_ROW_HEIGHT: f32 = 105.0;

pub const POINT_RADIUS: f32 = 4.0;
pub const RANGE_HEIGHT: f32 = 5.0;

pub type TrackId = u32;

pub type EventRenderFn = dyn Fn(&TimelineEvent) -> Vec<Mark> + Send + Sync;
pub type GroupRenderFn = dyn Fn(&[TimelineEvent]) -> Vec<Mark> + Send + Sync;
pub type ValueFn = dyn Fn(&TimelineEvent) -> Option<f64> + Send + Sync;
pub type SortFn = dyn Fn(&TimelineEvent, &TimelineEvent) -> Ordering + Send + Sync;

/// A point (`start == end`) or interval in time, measured in day offsets
/// from the study reference date. Immutable once constructed.
#[derive(Clone)]
pub struct TimelineEvent {
    pub track: TrackId,
    pub start: i64,
    pub end: i64,
    pub attributes: Vec<(String, String)>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub render: Option<Arc<EventRenderFn>>,
}

impl TimelineEvent {
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl std::fmt::Debug for TimelineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineEvent")
            .field("track", &self.track)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl PartialEq for TimelineEvent {
    fn eq(&self, other: &Self) -> bool {
        self.track == other.track
            && self.start == other.start
            && self.end == other.end
            && self.attributes == other.attributes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackType {
    #[default]
    Event,
    LineChart,
}

/// A named lane of the timeline holding one category of time-stamped
/// events. Supplied by the study file; read-only to the renderer.
#[derive(Clone)]
pub struct TimelineTrackSpec {
    pub id: TrackId,
    pub label: String,
    pub track_type: TrackType,
    pub events: Vec<TimelineEvent>,
    /// Value extraction for line-chart tracks. Events yielding `None` are
    /// skipped, never reported.
    pub value_of: Option<Arc<ValueFn>>,
    /// Re-sorts simultaneous events within a position group.
    pub sort_simultaneous: Option<Arc<SortFn>>,
    /// Custom renderer for a whole group of simultaneous events.
    pub render_events: Option<Arc<GroupRenderFn>>,
}

impl TimelineTrackSpec {
    pub fn new(id: TrackId, label: impl Into<String>, track_type: TrackType) -> Self {
        Self {
            id,
            label: label.into(),
            track_type,
            events: Vec::new(),
            value_of: None,
            sort_simultaneous: None,
            render_events: None,
        }
    }

    pub fn row_height(&self) -> f32 {
        match self.track_type {
            TrackType::Event => EVENT_ROW_HEIGHT,
            TrackType::LineChart => LINE_CHART_ROW_HEIGHT,
        }
    }
}

impl std::fmt::Debug for TimelineTrackSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineTrackSpec")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("track_type", &self.track_type)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Identifies one rendered position-group mark across renders, so the
/// per-mark tooltip interaction state survives view rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkKey {
    pub track: TrackId,
    pub start: i64,
    pub end: i64,
}

/// One assembled track row, ready to paint.
#[derive(Debug)]
pub struct TrackRow {
    pub track: TrackId,
    pub geometry: TrackGeometry,
    pub layout: TrackLayout,
}

/// Build the rows for every track with running y offsets, one layout each.
pub fn build_rows(
    tracks: &[TimelineTrackSpec],
    min_day: i64,
    max_day: i64,
    width: f32,
    highlighted_track: Option<TrackId>,
) -> Vec<TrackRow> {
    let position = layout::day_position_scale(min_day, max_day);
    let mut rows = Vec::with_capacity(tracks.len());
    let mut y_offset = 0.0;

    for spec in tracks {
        let geometry = TrackGeometry {
            width,
            height: spec.row_height(),
            y_offset,
        };
        let ticker = |spec: &TimelineTrackSpec| ticks::value_grid_ticks(spec, geometry.height);
        let layout = track::assemble_track(
            spec,
            &geometry,
            highlighted_track == Some(spec.id),
            &position,
            &ticker,
        );
        y_offset += geometry.height + TRACK_SPACING;
        rows.push(TrackRow {
            track: spec.id,
            geometry,
            layout,
        });
    }

    rows
}

pub fn total_height(rows: &[TrackRow]) -> f32 {
    rows.last()
        .map(|row| row.geometry.y_offset + row.geometry.height + TRACK_SPACING)
        .unwrap_or(0.0)
}

/// The full timeline view: label column, day-axis header, and one canvas
/// holding every track row.
pub fn view<'a>(tracks: &'a [TimelineTrackSpec], rows: Vec<TrackRow>) -> Element<'a, Message> {
    if tracks.iter().all(|track| track.events.is_empty()) {
        return container(text("No timeline data for this patient"))
            .width(Length::Fill)
            .height(Length::Fixed(120.0))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let mut labels = column![];
    labels = labels.push(
        container(text(""))
            .height(Length::Fixed(HEADER_HEIGHT))
            .width(Length::Fixed(LABEL_WIDTH)),
    );
    for row_data in &rows {
        labels = labels.push(
            container(
                text(
                    tracks
                        .iter()
                        .find(|track| track.id == row_data.track)
                        .map(|track| track.label.as_str())
                        .unwrap_or(""),
                )
                .size(12),
            )
            .height(Length::Fixed(row_data.geometry.height + TRACK_SPACING))
            .width(Length::Fixed(LABEL_WIDTH))
            .padding(2),
        );
    }

    let (min_day, max_day) = day_bounds(tracks);
    let header = Canvas::new(header::HeaderProgram { min_day, max_day })
        .width(Length::Fixed(TIMELINE_WIDTH))
        .height(Length::Fixed(HEADER_HEIGHT));

    let height = total_height(&rows);
    let tracks_canvas = Canvas::new(TracksProgram { rows })
        .width(Length::Fixed(TIMELINE_WIDTH))
        .height(Length::Fixed(height));

    row![labels, column![header, tracks_canvas]].into()
}

/// Day extent across every track; degenerate studies get a one-day span so
/// the position scale never divides by zero.
pub fn day_bounds(tracks: &[TimelineTrackSpec]) -> (i64, i64) {
    let mut min_day = i64::MAX;
    let mut max_day = i64::MIN;
    for track in tracks {
        for event in &track.events {
            min_day = min_day.min(event.start);
            max_day = max_day.max(event.end);
        }
    }
    if min_day > max_day {
        (0, 1)
    } else if min_day == max_day {
        (min_day, min_day + 1)
    } else {
        (min_day, max_day)
    }
}

pub struct TracksProgram {
    pub rows: Vec<TrackRow>,
}

#[derive(Default)]
pub struct TracksState {
    hovered: Option<(usize, usize)>,
}

impl TracksProgram {
    /// Hit-test the cursor against every row's regions. Returns
    /// `(row index, region index)`.
    fn region_at(&self, position: Point) -> Option<(usize, usize)> {
        for (row_index, row) in self.rows.iter().enumerate() {
            let local_y = position.y - row.geometry.y_offset;
            if local_y < 0.0 || local_y > row.geometry.height {
                continue;
            }
            for (region_index, region) in row.layout.regions.iter().enumerate() {
                let rect = Rectangle {
                    x: region.x,
                    y: region.y,
                    width: region.width,
                    height: region.height,
                };
                if rect.contains(Point::new(position.x, local_y)) {
                    return Some((row_index, region_index));
                }
            }
        }
        None
    }

    fn mark_at(&self, slot: (usize, usize)) -> (MarkKey, Vec<TimelineEvent>) {
        let row = &self.rows[slot.0];
        let group = &row.layout.groups[row.layout.regions[slot.1].group];
        let key = MarkKey {
            track: row.track,
            start: group.start,
            end: group.end,
        };
        (key, group.events.clone())
    }
}

impl Program<Message> for TracksProgram {
    type State = TracksState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        for row in &self.rows {
            paint_row(&mut frame, row, bounds.width);
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: &iced::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        match event {
            iced::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let slot = cursor
                    .position_in(bounds)
                    .and_then(|position| self.region_at(position));

                match slot {
                    Some(slot) => {
                        state.hovered = Some(slot);
                        let (key, events) = self.mark_at(slot);
                        // Re-published on every move so the store's mouse
                        // position tracks the pointer.
                        let position = cursor.position().unwrap_or(Point::ORIGIN);
                        return Some(Action::publish(Message::MarkHovered {
                            key,
                            events,
                            position,
                        }));
                    }
                    None => {
                        if state.hovered.take().is_some() {
                            return Some(Action::publish(Message::MarkLeft));
                        }
                    }
                }
            }
            iced::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(slot) = cursor
                    .position_in(bounds)
                    .and_then(|position| self.region_at(position))
                {
                    let (key, _) = self.mark_at(slot);
                    return Some(Action::publish(Message::MarkClicked { key }));
                }
            }
            _ => {}
        }
        None
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.hovered.is_some() {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Paint one assembled row. Marks are in track-local coordinates; the row's
/// y offset places them on the shared canvas.
fn paint_row(frame: &mut canvas::Frame, row: &TrackRow, width: f32) {
    let yo = row.geometry.y_offset;

    for mark in &row.layout.marks {
        match mark {
            Mark::Highlight { width, height } => {
                frame.fill_rectangle(
                    Point::new(0.0, yo),
                    Size::new(*width, *height),
                    Color::from_rgba(1.0, 0.95, 0.7, 0.45),
                );
            }
            Mark::GridLine { y } => {
                frame.stroke(
                    &canvas::Path::line(Point::new(0.0, yo + y), Point::new(width, yo + y)),
                    canvas::Stroke::default()
                        .with_color(Color::from_rgb(0.88, 0.88, 0.88))
                        .with_width(1.0),
                );
            }
            Mark::Segment { from, to } => {
                frame.stroke(
                    &canvas::Path::line(
                        Point::new(from.0, yo + from.1),
                        Point::new(to.0, yo + to.1),
                    ),
                    canvas::Stroke::default()
                        .with_color(Color::from_rgb(0.12, 0.47, 0.71))
                        .with_width(1.0),
                );
            }
            Mark::Circle { x, y, radius } => {
                frame.fill(
                    &canvas::Path::circle(Point::new(*x, yo + y), *radius),
                    Color::from_rgb(0.12, 0.47, 0.71),
                );
            }
            Mark::OutlineCircle { x, y, radius } => {
                frame.stroke(
                    &canvas::Path::circle(Point::new(*x, yo + y), *radius),
                    canvas::Stroke::default()
                        .with_color(Color::from_rgb(0.12, 0.47, 0.71))
                        .with_width(1.0),
                );
            }
            Mark::Badge { x, y, count } => {
                frame.fill(
                    &canvas::Path::circle(Point::new(*x, yo + y), marks::BADGE_RADIUS),
                    Color::from_rgb(0.12, 0.47, 0.71),
                );
                frame.fill_text(canvas::Text {
                    content: count.to_string(),
                    position: Point::new(x - 3.0, yo + y - 6.0),
                    color: Color::WHITE,
                    size: 10.0.into(),
                    ..Default::default()
                });
            }
            Mark::RangeBar {
                x,
                y,
                width,
                height,
            } => {
                frame.fill(
                    &canvas::Path::rounded_rectangle(
                        Point::new(*x, yo + y),
                        Size::new(*width, *height),
                        (*height / 2.0).into(),
                    ),
                    Color::from_rgb(0.12, 0.47, 0.71),
                );
            }
            Mark::Label { x, y, content } => {
                frame.fill_text(canvas::Text {
                    content: content.clone(),
                    position: Point::new(*x, yo + y),
                    color: Color::from_rgb(0.2, 0.2, 0.2),
                    size: 10.0.into(),
                    ..Default::default()
                });
            }
            Mark::Separator { y } => {
                frame.stroke(
                    &canvas::Path::line(Point::new(0.0, yo + y), Point::new(width, yo + y)),
                    canvas::Stroke {
                        line_dash: canvas::LineDash {
                            segments: &[3.0, 3.0],
                            offset: 0,
                        },
                        ..canvas::Stroke::default()
                            .with_color(Color::from_rgb(0.75, 0.75, 0.75))
                            .with_width(1.0)
                    },
                );
            }
        }
    }
}
