use iced::widget::{button, column, container, row, scrollable, text, Space};
use iced::{Alignment, Element, Length, Point, Task};
use iced_aw::{tab_bar, TabLabel};
use std::path::PathBuf;

mod data;
mod file;
mod selector;
mod store;
mod timeline;
mod tooltip;
mod ui;

use data::StudyData;
use file::{StudyLoadState, StudyTab};
use store::{ProfileOption, TooltipEntry, TooltipUid};
use timeline::{MarkKey, TimelineEvent};
use tooltip::TooltipCard;

pub fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    iced::application(Studyline::new, Studyline::update, Studyline::view)
        .title(Studyline::title)
        .run()
}

#[derive(Debug, Clone)]
enum Message {
    TabSelected(usize),
    CloseTab(usize),
    OpenFile,
    FileSelected(PathBuf),
    FileLoaded(u64, Box<Result<StudyData, String>>),
    ProfileSelected(ProfileOption),
    MarkHovered {
        key: MarkKey,
        events: Vec<TimelineEvent>,
        position: Point,
    },
    MarkLeft,
    MarkClicked {
        key: MarkKey,
    },
    RemoveTooltip(TooltipUid),
    None,
}

struct Studyline {
    active_tab: usize,
    tabs: Vec<StudyTab>,
    next_tab_id: u64,
}

impl Studyline {
    fn new() -> (Self, Task<Message>) {
        let mut app = Studyline {
            active_tab: 0,
            tabs: Vec::new(),
            next_tab_id: 0,
        };

        let initial_task = if let Some(path) = std::env::args().nth(1) {
            app.open_study(PathBuf::from(path))
        } else {
            Task::none()
        };

        (app, initial_task)
    }

    fn title(&self) -> String {
        match self.tabs.get(self.active_tab) {
            Some(tab) => format!("Studyline - {}", tab.title()),
            None => "Studyline - study timeline viewer".to_string(),
        }
    }

    fn open_study(&mut self, path: PathBuf) -> Task<Message> {
        let id = self.next_tab_id;
        self.next_tab_id += 1;
        self.tabs.push(StudyTab {
            id,
            path: path.clone(),
            load_state: StudyLoadState::Loading,
        });
        self.active_tab = self.tabs.len() - 1;

        Task::perform(
            async move { data::load_study_data(&path).map_err(|error| error.to_string()) },
            move |result| Message::FileLoaded(id, Box::new(result)),
        )
    }

    fn active_data_mut(&mut self) -> Option<&mut StudyData> {
        self.tabs.get_mut(self.active_tab)?.data_mut()
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(index) => {
                self.active_tab = index;
            }
            Message::CloseTab(index) => {
                if index < self.tabs.len() {
                    self.tabs.remove(index);
                    if self.active_tab >= self.tabs.len() && !self.tabs.is_empty() {
                        self.active_tab = self.tabs.len() - 1;
                    }
                }
            }
            Message::OpenFile => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .add_filter("study timeline", &["json"])
                            .pick_file()
                            .await
                    },
                    |handle| match handle {
                        Some(handle) => Message::FileSelected(handle.path().to_path_buf()),
                        None => Message::None,
                    },
                );
            }
            Message::FileSelected(path) => {
                return self.open_study(path);
            }
            Message::FileLoaded(id, result) => {
                let Some(tab) = self.tabs.iter_mut().find(|tab| tab.id == id) else {
                    return Task::none();
                };
                match *result {
                    Ok(study) => {
                        tracing::info!(
                            study = %study.study_id,
                            patient = %study.patient_id,
                            tracks = study.tracks.len(),
                            "study loaded"
                        );
                        tab.load_state = StudyLoadState::Ready(Box::new(study));
                        // Mount-time diagnostics for the selector; result
                        // only ever reaches the log.
                        let path = tab.path.clone();
                        return Task::perform(selector::log_profile_summary(path), |_| {
                            Message::None
                        });
                    }
                    Err(error) => {
                        tracing::warn!(%error, "study load failed");
                        tab.load_state = StudyLoadState::Error(error);
                    }
                }
            }
            Message::ProfileSelected(option) => {
                if let Some(data) = self.active_data_mut() {
                    data.selected_profile = Some(option);
                }
            }
            Message::MarkHovered {
                key,
                events,
                position,
            } => {
                if let Some(data) = self.active_data_mut() {
                    if data.hovered_mark != Some(key) {
                        if let Some(previous) = data.hovered_mark.take() {
                            if let Some(interaction) = data.interactions.get_mut(&previous) {
                                interaction.pointer_leave(&mut data.store);
                            }
                        }
                        data.hovered_mark = Some(key);
                    }
                    let interaction = data.interactions.entry(key).or_default();
                    interaction.pointer_move(&mut data.store, key.track, &events, position);
                }
            }
            Message::MarkLeft => {
                if let Some(data) = self.active_data_mut() {
                    if let Some(key) = data.hovered_mark.take() {
                        if let Some(interaction) = data.interactions.get_mut(&key) {
                            interaction.pointer_leave(&mut data.store);
                        }
                    }
                }
            }
            Message::MarkClicked { key } => {
                if let Some(data) = self.active_data_mut() {
                    if let Some(interaction) = data.interactions.get_mut(&key) {
                        interaction.click(&mut data.store);
                    }
                }
            }
            Message::RemoveTooltip(uid) => {
                if let Some(data) = self.active_data_mut() {
                    data.store.remove_tooltip(uid);
                }
            }
            Message::None => {}
        }
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let mut bar = tab_bar::TabBar::new(Message::TabSelected).on_close(Message::CloseTab);
        for (index, tab) in self.tabs.iter().enumerate() {
            bar = bar.push(index, TabLabel::Text(tab.title()));
        }
        if !self.tabs.is_empty() {
            bar = bar.set_active_tab(&self.active_tab);
        }

        let header = row![bar, Space::new().width(Length::Fill)]
            .push(button("Open").on_press(Message::OpenFile))
            .spacing(10)
            .padding(5)
            .align_y(Alignment::Center);

        let content: Element<'_, Message> = match self.tabs.get(self.active_tab) {
            Some(tab) => match &tab.load_state {
                StudyLoadState::Loading => centered_note("Loading study..."),
                StudyLoadState::Error(error) => centered_note(error),
                StudyLoadState::Ready(study) => self.study_view(study),
            },
            None => centered_note("Open a study file to start"),
        };

        column![header, content].into()
    }

    fn study_view<'a>(&'a self, data: &'a StudyData) -> Element<'a, Message> {
        let (min_day, max_day) = timeline::day_bounds(&data.tracks);
        let highlighted_track = data.store.hovered_tooltip().map(|entry| entry.track);
        let rows = timeline::build_rows(
            &data.tracks,
            min_day,
            max_day,
            timeline::TIMELINE_WIDTH,
            highlighted_track,
        );

        let body = column![
            selector::view(data),
            timeline::view(&data.tracks, rows),
            self.pinned_panel(data),
        ]
        .spacing(8);

        let page = scrollable(body).height(Length::Fill);

        let hovered = data.store.hovered_tooltip();
        let pinned = hovered.map(|entry| entry.pinned).unwrap_or(false);

        TooltipCard::new(page, move || match hovered {
            Some(entry) => tooltip_content(data, entry),
            None => Space::new().into(),
        })
        .show(hovered.is_some())
        .pinned(pinned)
        .anchor(data.store.mouse_position())
        .into()
    }

    fn pinned_panel<'a>(&'a self, data: &'a StudyData) -> Element<'a, Message> {
        let mut panel = column![].spacing(4).padding(6);
        let mut any = false;

        for (uid, entry) in data.store.pinned_tooltips() {
            any = true;
            let summary = format!(
                "{} — {} event(s), day {}",
                track_label(data, entry.track),
                entry.events.len(),
                entry.events.first().map(|event| event.start).unwrap_or(0),
            );
            panel = panel.push(
                row![
                    text(summary).size(12),
                    button(text("x").size(10))
                        .style(ui::flat_button_style)
                        .on_press(Message::RemoveTooltip(uid)),
                ]
                .spacing(6)
                .align_y(Alignment::Center),
            );
        }

        if any {
            column![text("Pinned").size(12), panel].spacing(2).into()
        } else {
            Space::new().into()
        }
    }
}

fn centered_note(note: &str) -> Element<'_, Message> {
    container(text(note))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn track_label(data: &StudyData, track: timeline::TrackId) -> &str {
    data.tracks
        .iter()
        .find(|spec| spec.id == track)
        .map(|spec| spec.label.as_str())
        .unwrap_or("Track")
}

/// Tooltip card body: track label, one block per event with its day span
/// (or explicit dates) and attribute bag, and a pin hint.
fn tooltip_content<'a>(data: &'a StudyData, entry: &'a TooltipEntry) -> Element<'a, Message> {
    let mut body = column![text(track_label(data, entry.track)).size(13)].spacing(3);

    for event in &entry.events {
        let span = match (&event.start_date, &event.end_date) {
            (Some(start), Some(end)) if !event.is_point() => format!("{start} – {end}"),
            (Some(start), _) => start.clone(),
            _ if event.is_point() => format!("Day {}", event.start),
            _ => format!("Day {} – {}", event.start, event.end),
        };
        let mut block = column![text(span).size(11)];
        for (key, value) in &event.attributes {
            block = block.push(text(format!("{key}: {value}")).size(11));
        }
        body = body.push(block);
    }

    let hint = if entry.pinned {
        "pinned — click to release"
    } else {
        "click to pin"
    };
    body = body.push(text(hint).size(9));

    body.into()
}
