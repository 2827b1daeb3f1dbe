use crate::data::StudyData;
use std::path::PathBuf;

#[derive(Debug)]
pub struct StudyTab {
    pub id: u64,
    pub path: PathBuf,
    pub load_state: StudyLoadState,
}

#[derive(Debug)]
pub enum StudyLoadState {
    Loading,
    Ready(Box<StudyData>),
    Error(String),
}

impl StudyTab {
    pub fn data(&self) -> Option<&StudyData> {
        match &self.load_state {
            StudyLoadState::Ready(data) => Some(data.as_ref()),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut StudyData> {
        match &mut self.load_state {
            StudyLoadState::Ready(data) => Some(data.as_mut()),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        match self.data() {
            Some(data) => format!("{} / {}", data.study_id, data.patient_id),
            None => self
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "study".to_string()),
        }
    }
}
