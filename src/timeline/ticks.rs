//! Shared helpers for computing nice tick intervals and formatting labels,
//! plus the app-side axis-tick collaborator for line-chart value grids.

use super::layout::{self, ValueRange};
use super::TimelineTrackSpec;

/// A single axis tick, expressed as a pixel offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub offset: f32,
}

/// Choose a "nice" interval (1/2/5 × power of ten) for a target step.
pub fn nice_interval(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }

    let log10 = step.log10().floor();
    let base = 10.0f64.powf(log10);
    let ratio = step / base;
    if ratio <= 1.0 {
        base
    } else if ratio <= 2.0 {
        base * 2.0
    } else if ratio <= 5.0 {
        base * 5.0
    } else {
        base * 10.0
    }
}

/// Format a day-offset label, picking years or months once the tick
/// interval is coarse enough for them to read naturally.
pub fn format_day_label(day: f64, interval: f64) -> String {
    if interval >= 365.0 {
        format!("{:.1} y", day / 365.0)
    } else if interval >= 30.0 {
        format!("{:.0} mo", day / 30.0)
    } else {
        format!("Day {:.0}", day)
    }
}

/// Horizontal grid-line offsets for a line-chart track: roughly three nice
/// value steps across the track's range, mapped through the same scaling
/// the points use. Tracks without a resolvable range get no grid.
pub fn value_grid_ticks(track: &TimelineTrackSpec, track_height: f32) -> Vec<Tick> {
    let Some(range) = layout::compute_value_range(track) else {
        return Vec::new();
    };

    value_ticks_for(range, track_height)
}

fn value_ticks_for(range: ValueRange, track_height: f32) -> Vec<Tick> {
    let step = nice_interval((range.max - range.min) / 3.0);
    if step <= 0.0 {
        return Vec::new();
    }

    let mut ticks = Vec::new();
    let mut value = (range.min / step).ceil() * step;
    while value <= range.max + 1e-9 {
        ticks.push(Tick {
            offset: layout::value_to_y(value, track_height, range),
        });
        value += step;
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_interval_rounds_to_1_2_5() {
        assert_eq!(nice_interval(1.0), 1.0);
        assert_eq!(nice_interval(1.3), 2.0);
        assert_eq!(nice_interval(3.0), 5.0);
        assert_eq!(nice_interval(7.0), 10.0);
        assert_eq!(nice_interval(30.0), 50.0);
        assert_eq!(nice_interval(0.0), 0.0);
    }

    #[test]
    fn day_labels_scale_with_interval() {
        assert_eq!(format_day_label(14.0, 7.0), "Day 14");
        assert_eq!(format_day_label(90.0, 30.0), "3 mo");
        assert_eq!(format_day_label(730.0, 365.0), "2.0 y");
    }

    #[test]
    fn value_ticks_stay_inside_plot_area() {
        let range = ValueRange {
            min: 0.0,
            max: 10.0,
        };
        let height = 105.0;
        let ticks = value_ticks_for(range, height);
        assert!(!ticks.is_empty());

        let padding = height / 7.0;
        for tick in &ticks {
            assert!(tick.offset >= padding - 1e-3);
            assert!(tick.offset <= height - padding + 1e-3);
        }
    }

    #[test]
    fn value_ticks_descend_as_values_rise() {
        let range = ValueRange {
            min: 0.0,
            max: 10.0,
        };
        let ticks = value_ticks_for(range, 105.0);
        for pair in ticks.windows(2) {
            assert!(pair[1].offset < pair[0].offset);
        }
    }
}
