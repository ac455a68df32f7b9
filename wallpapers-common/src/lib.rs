pub mod bus;
pub mod cache;
pub mod desktop;
pub mod error;
pub mod feeds;
pub mod ipc;
pub mod plan;
pub mod provider;
pub mod record;
pub mod selector;
pub mod settings;
pub mod skill;
pub mod slideshow;
pub mod sources;
pub mod surface;
pub mod title;
pub mod vocab;

pub use bus::{Announcer, BusMessage, Outbox};
pub use cache::ImageCache;
pub use desktop::{DesktopEnv, DesktopSetter, WallpaperSetter};
pub use error::{ErrorReporting, Result, WallpapersError};
pub use feeds::{Feed, FeedSet, DEFAULT_CHANNEL};
pub use ipc::{IpcClient, IpcCommand, IpcResponse, IpcServer};
pub use provider::Provider;
pub use record::ImageRecord;
pub use selector::Selector;
pub use settings::{Endpoints, SelectorConfig, SkillSettings};
pub use skill::{Collaborators, Mode, SkillStatus, WallpaperSkill};
pub use slideshow::{Direction, Slideshow, Step};
pub use sources::{HttpUpstream, Source, Upstream};
pub use surface::{GuiModel, Speaker, Surface, Transcript};
pub use title::{Titles, Translator, WebTranslator};
pub use vocab::{Levenshtein, Similarity, Vocabulary};
