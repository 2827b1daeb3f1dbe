use crate::timeline::ticks::{format_day_label, nice_interval};
use crate::Message;
use iced::mouse;
use iced::widget::canvas::{self, Geometry, Program};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

/// Day-axis header above the track rows: tick lines and day/month/year
/// labels at nice intervals.
pub(crate) struct HeaderProgram {
    pub(crate) min_day: i64,
    pub(crate) max_day: i64,
}

impl Program<Message> for HeaderProgram {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        frame.fill_rectangle(
            Point::new(0.0, 0.0),
            Size::new(bounds.width, bounds.height),
            Color::from_rgb(0.95, 0.95, 0.95),
        );

        let total_days = (self.max_day - self.min_day).max(1) as f64;
        let days_per_pixel = total_days / bounds.width as f64;

        // One labeled tick roughly every 80 pixels.
        let interval = nice_interval(80.0 * days_per_pixel);
        if interval <= 0.0 {
            return vec![frame.into_geometry()];
        }

        let mut day = (self.min_day as f64 / interval).ceil() * interval;
        while day <= self.max_day as f64 {
            let x = ((day - self.min_day as f64) / total_days) as f32 * bounds.width;

            frame.stroke(
                &canvas::Path::line(
                    Point::new(x, bounds.height - 5.0),
                    Point::new(x, bounds.height),
                ),
                canvas::Stroke::default()
                    .with_color(Color::from_rgb(0.35, 0.35, 0.35))
                    .with_width(1.0),
            );

            frame.fill_text(canvas::Text {
                content: format_day_label(day, interval),
                position: Point::new(x + 2.0, 4.0),
                color: Color::from_rgb(0.25, 0.25, 0.25),
                size: 10.0.into(),
                ..Default::default()
            });

            day += interval;
        }

        frame.stroke(
            &canvas::Path::line(
                Point::new(0.0, bounds.height),
                Point::new(bounds.width, bounds.height),
            ),
            canvas::Stroke::default()
                .with_color(Color::from_rgb(0.8, 0.8, 0.8))
                .with_width(1.0),
        );

        vec![frame.into_geometry()]
    }
}
