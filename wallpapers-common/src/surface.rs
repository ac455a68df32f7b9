use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub const SLIDESHOW_PAGE: &str = "slideshow.qml";

pub trait Surface {
    fn clear(&mut self);
    fn set_field(&mut self, key: &str, value: &str);
    fn show_page(&mut self, page: &str);
    fn show_image(&mut self, url: &str);
}

pub trait Speaker {
    fn speak(&mut self, text: &str);
}

/// Canned responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Intro,
    Searching { query: String },
    WallpaperChanged,
    WallpaperFailed,
    NoMorePictures,
}

impl Dialog {
    pub fn render(&self) -> String {
        match self {
            Dialog::Intro => {
                "Wallpapers is ready. Ask me for a random wallpaper or a picture of something.".to_string()
            }
            Dialog::Searching { query } => format!("Searching for {}", query),
            Dialog::WallpaperChanged => "Wallpaper changed".to_string(),
            Dialog::WallpaperFailed => "I could not change your wallpaper".to_string(),
            Dialog::NoMorePictures => "There are no more pictures".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiSnapshot {
    pub fields: BTreeMap<String, String>,
    pub page: Option<String>,
    pub image: Option<String>,
}

/// Shared in-memory GUI model; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct GuiModel {
    inner: Arc<Mutex<GuiSnapshot>>,
}

impl GuiModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GuiSnapshot> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> GuiSnapshot {
        self.lock().clone()
    }
}

impl Surface for GuiModel {
    fn clear(&mut self) {
        let mut gui = self.lock();
        gui.fields.clear();
        gui.page = None;
        gui.image = None;
    }

    fn set_field(&mut self, key: &str, value: &str) {
        self.lock().fields.insert(key.to_string(), value.to_string());
    }

    fn show_page(&mut self, page: &str) {
        self.lock().page = Some(page.to_string());
    }

    fn show_image(&mut self, url: &str) {
        let mut gui = self.lock();
        gui.image = Some(url.to_string());
        gui.page = None;
    }
}

/// Speaker that logs utterances and keeps them for whoever asked.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(mut lines) => lines.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }
}

impl Speaker for Transcript {
    fn speak(&mut self, text: &str) {
        log::info!("Speak: {}", text);
        match self.lines.lock() {
            Ok(mut lines) => lines.push(text.to_string()),
            Err(poisoned) => poisoned.into_inner().push(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gui_model_shares_state() {
        let gui = GuiModel::new();
        let mut handle = gui.clone();

        handle.set_field("title", "Fjord");
        handle.show_page(SLIDESHOW_PAGE);
        let snapshot = gui.snapshot();
        assert_eq!(snapshot.fields.get("title").map(String::as_str), Some("Fjord"));
        assert_eq!(snapshot.page.as_deref(), Some(SLIDESHOW_PAGE));

        handle.clear();
        assert_eq!(gui.snapshot(), GuiSnapshot::default());
    }

    #[test]
    fn test_transcript_drains() {
        let transcript = Transcript::new();
        let mut speaker = transcript.clone();

        speaker.speak(&Dialog::Searching { query: "foxes".into() }.render());
        assert_eq!(transcript.drain(), vec!["Searching for foxes"]);
        assert!(transcript.drain().is_empty());
    }
}
