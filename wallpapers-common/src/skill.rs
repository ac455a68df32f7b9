use crate::bus::{Announcer, HOMESCREEN_SET};
use crate::desktop::WallpaperSetter;
use crate::error::{IntentError, WallpapersError};
use crate::record::ImageRecord;
use crate::selector::Selector;
use crate::settings::SkillSettings;
use crate::slideshow::{Direction, Step};
use crate::surface::{Dialog, Speaker, Surface, SLIDESHOW_PAGE};
use crate::title::Titles;
use crate::vocab::Vocabulary;
use crate::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub const SKILL_NAME: &str = "Wallpapers";

/// Interaction context, used to gate follow-up intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Idle,
    PhotoUpdated,
    Slideshow,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Idle => write!(f, "idle"),
            Mode::PhotoUpdated => write!(f, "photo updated"),
            Mode::Slideshow => write!(f, "slideshow"),
        }
    }
}

/// The outward-facing services the skill calls into.
pub struct Collaborators {
    pub surface: Box<dyn Surface + Send>,
    pub speaker: Box<dyn Speaker + Send>,
    pub setter: Box<dyn WallpaperSetter + Send>,
    pub announcer: Box<dyn Announcer + Send>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillStatus {
    pub mode: Mode,
    pub position: usize,
    pub total: usize,
    pub source: Option<String>,
    pub current: Option<ImageRecord>,
    pub lang: String,
    pub last_selection: Option<DateTime<Utc>>,
}

pub struct WallpaperSkill {
    settings: SkillSettings,
    selector: Selector,
    titles: Titles,
    surface: Box<dyn Surface + Send>,
    speaker: Box<dyn Speaker + Send>,
    setter: Box<dyn WallpaperSetter + Send>,
    announcer: Box<dyn Announcer + Send>,
    mode: Mode,
    rng: StdRng,
    last_selection: Option<DateTime<Utc>>,
}

impl WallpaperSkill {
    pub fn new(settings: SkillSettings, selector: Selector, titles: Titles, collaborators: Collaborators) -> Self {
        Self {
            settings,
            selector,
            titles,
            surface: collaborators.surface,
            speaker: collaborators.speaker,
            setter: collaborators.setter,
            announcer: collaborators.announcer,
            mode: Mode::Idle,
            rng: StdRng::from_entropy(),
            last_selection: None,
        }
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn settings(&self) -> &SkillSettings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn announce(&self, event: &str, payload: serde_json::Value) {
        self.announcer.announce(event, payload);
    }

    /// Current record with its title ready for display.
    pub fn current(&mut self) -> Option<ImageRecord> {
        let current = self.selector.current()?.clone();
        Some(self.titles.present(&current))
    }

    pub fn status(&mut self) -> SkillStatus {
        SkillStatus {
            mode: self.mode,
            position: self.selector.slideshow().position(),
            total: self.selector.slideshow().len(),
            source: self.selector.last_source().map(|s| s.to_string()),
            current: self.current(),
            lang: self.settings.lang.clone(),
            last_selection: self.last_selection,
        }
    }

    /// Fresh list from the random plan. The slideshow and the GUI keep
    /// what the user is looking at.
    pub fn fresh_pictures(&mut self) -> Result<Vec<ImageRecord>> {
        let pictures = self.selector.pick_random(&mut self.rng)?;
        self.last_selection = Some(Utc::now());
        Ok(pictures)
    }

    /// Select a new list and push the first record's fields to the GUI.
    fn refresh(&mut self, query: Option<&str>) -> Result<ImageRecord> {
        let picked = match query {
            Some(q) => self.selector.select_query(q, &mut self.rng)?,
            None => self.selector.select_random(&mut self.rng)?,
        }
        .clone();
        self.last_selection = Some(Utc::now());

        let shown = self.titles.present(&picked);
        for (key, value) in shown.fields() {
            self.surface.set_field(&key, &value);
        }
        self.mode = Mode::PhotoUpdated;
        Ok(shown)
    }

    fn require_slideshow(&self) -> Result<()> {
        if self.mode != Mode::Slideshow {
            return Err(WallpapersError::Intent(IntentError::ContextMissing {
                context: Mode::Slideshow.to_string(),
            }));
        }
        Ok(())
    }

    fn say(&mut self, dialog: Dialog) {
        self.speaker.speak(&dialog.render());
    }

    pub fn intro(&mut self) {
        self.say(Dialog::Intro);
    }

    pub fn random_wallpaper(&mut self) -> Result<bool> {
        let picked = self.refresh(None)?;
        Ok(self.apply_and_show(&picked.image_url))
    }

    pub fn wallpaper_about(&mut self, query: &str) -> Result<bool> {
        self.say(Dialog::Searching {
            query: query.to_string(),
        });
        let picked = self.refresh(Some(query))?;
        Ok(self.apply_and_show(&picked.image_url))
    }

    pub fn random_picture(&mut self) -> Result<()> {
        self.refresh(None)?;
        self.display_current()
    }

    pub fn picture_about(&mut self, query: &str) -> Result<()> {
        self.say(Dialog::Searching {
            query: query.to_string(),
        });
        self.refresh(Some(query))?;
        self.display_current()
    }

    pub fn homepage(&mut self) -> Result<()> {
        self.random_picture()
    }

    /// Idle screen refresh.
    pub fn idle(&mut self) -> Result<()> {
        let picked = self.refresh(None)?;
        self.surface.show_image(&picked.image_url);
        Ok(())
    }

    pub fn next(&mut self) -> Result<bool> {
        self.step(Direction::Next)
    }

    pub fn previous(&mut self) -> Result<bool> {
        self.step(Direction::Previous)
    }

    fn step(&mut self, direction: Direction) -> Result<bool> {
        self.require_slideshow()?;
        let moved = matches!(self.selector.advance(direction), Step::Moved(_));
        if moved {
            self.display_current()?;
        } else {
            log::debug!("Cannot move {} from {}", direction, self.selector.slideshow().position());
            self.say(Dialog::NoMorePictures);
        }
        Ok(moved)
    }

    pub fn set_current(&mut self) -> Result<bool> {
        self.require_slideshow()?;
        let image_url = self
            .selector
            .current()
            .map(|r| r.image_url.clone())
            .ok_or(WallpapersError::Intent(IntentError::NoCurrentPicture))?;

        let changed = self.change_wallpaper(&image_url);
        self.say(if changed {
            Dialog::WallpaperChanged
        } else {
            Dialog::WallpaperFailed
        });
        Ok(changed)
    }

    /// Show every field of the current record, speak its title and open the
    /// slideshow page.
    pub fn display_current(&mut self) -> Result<()> {
        let shown = self
            .current()
            .ok_or(WallpapersError::Intent(IntentError::NoCurrentPicture))?;

        self.surface.clear();
        for (key, value) in shown.fields() {
            self.surface.set_field(&key, &value);
        }
        if let Some(title) = &shown.title {
            self.speaker.speak(title);
        }
        self.surface.show_page(SLIDESHOW_PAGE);
        self.mode = Mode::Slideshow;
        Ok(())
    }

    fn apply_and_show(&mut self, image_url: &str) -> bool {
        let changed = self.change_wallpaper(image_url);
        self.say(if changed {
            Dialog::WallpaperChanged
        } else {
            Dialog::WallpaperFailed
        });
        self.surface.show_image(image_url);
        changed
    }

    /// Tell the home screen, then set the desktop background.
    pub fn change_wallpaper(&mut self, image_url: &str) -> bool {
        self.announcer.announce(HOMESCREEN_SET, json!({ "url": image_url }));

        let configured = if self.settings.auto_detect {
            None
        } else {
            self.settings.desktop_env.clone()
        };

        let result = match configured {
            Some(env) => self.setter.set_wallpaper(image_url, Some(&env)).or_else(|e| {
                log::warn!("Setting wallpaper with {} failed ({}), trying detection", env, e);
                self.setter.set_wallpaper(image_url, None)
            }),
            None => self.setter.set_wallpaper(image_url, None),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("Could not change wallpaper: {}", e);
                false
            }
        }
    }

    /// Swap in new settings. The picture list and cursor survive.
    pub fn reload(&mut self, settings: SkillSettings, vocabulary: Vocabulary) {
        for (key, old, new) in self.settings.changes(&settings) {
            log::debug!("{}: {} changed from {} to {}", SKILL_NAME, key, old, new);
        }
        self.titles.set_lang(settings.lang.clone());
        self.selector
            .reconfigure(Arc::new(settings.selector.clone()), vocabulary);
        self.settings = settings;
    }
}
