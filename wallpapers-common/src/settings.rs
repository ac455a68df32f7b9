use crate::feeds::{FeedSet, DEFAULT_CHANNEL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where the HTTP sources live and how to talk to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Base of the channel boards (`{base}/r/{channel}/hot.json`).
    pub channel_site: String,
    /// Base of the search API (`{base}/search`).
    pub search_api: String,
    /// Human-facing site of the search/catalog source.
    pub search_site: String,
    /// Catalog category mask sent as `categories=`.
    pub categories_mask: String,
    pub allow_nsfw: bool,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            channel_site: "https://www.reddit.com".to_string(),
            search_api: "https://wallhaven.cc/api/v1".to_string(),
            search_site: "https://wallhaven.cc".to_string(),
            categories_mask: "111".to_string(),
            allow_nsfw: false,
            user_agent: concat!("wallpapers-skill/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Immutable selection settings, built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    pub channels: FeedSet,
    pub categories: FeedSet,
    pub free_search: bool,
    pub catalog: bool,
    pub search_limit: usize,
    pub channel_limit: usize,
    pub match_threshold: f64,
    pub default_channel: String,
    pub endpoints: Endpoints,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            channels: FeedSet::channels(),
            categories: FeedSet::categories(),
            free_search: false,
            catalog: true,
            search_limit: 3,
            channel_limit: 25,
            match_threshold: 0.85,
            default_channel: DEFAULT_CHANNEL.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

/// Everything the skill needs besides the selector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSettings {
    pub lang: String,
    pub auto_detect: bool,
    pub desktop_env: Option<String>,
    pub rotate_wallpaper: bool,
    pub rotate_every: Duration,
    pub vocab_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub cache_max_files: usize,
    pub selector: SelectorConfig,
}

impl Default for SkillSettings {
    fn default() -> Self {
        Self {
            lang: "en-us".to_string(),
            auto_detect: true,
            desktop_env: None,
            rotate_wallpaper: true,
            rotate_every: Duration::from_secs(30 * 60),
            vocab_dir: None,
            cache_dir: None,
            cache_max_files: 50,
            selector: SelectorConfig::default(),
        }
    }
}

impl SkillSettings {
    /// Setting keys whose values differ between `self` (old) and `new`,
    /// paired with the old and new values rendered for logging.
    pub fn changes(&self, new: &SkillSettings) -> Vec<(String, String, String)> {
        let mut changed = Vec::new();
        let mut check = |key: &str, old: String, new: String| {
            if old != new {
                changed.push((key.to_string(), old, new));
            }
        };

        check("lang", self.lang.clone(), new.lang.clone());
        check("auto_detect", self.auto_detect.to_string(), new.auto_detect.to_string());
        check("desktop_env", format!("{:?}", self.desktop_env), format!("{:?}", new.desktop_env));
        check("rotate_wallpaper", self.rotate_wallpaper.to_string(), new.rotate_wallpaper.to_string());
        check(
            "rotate_every",
            humantime::format_duration(self.rotate_every).to_string(),
            humantime::format_duration(new.rotate_every).to_string(),
        );
        check("free_search", self.selector.free_search.to_string(), new.selector.free_search.to_string());
        check("catalog", self.selector.catalog.to_string(), new.selector.catalog.to_string());
        check("search_limit", self.selector.search_limit.to_string(), new.selector.search_limit.to_string());

        for (old_set, new_set) in [
            (&self.selector.channels, &new.selector.channels),
            (&self.selector.categories, &new.selector.categories),
        ] {
            for feed in new_set.iter() {
                let before = old_set.is_enabled(&feed.name);
                if before != feed.enabled {
                    check(&feed.name, before.to_string(), feed.enabled.to_string());
                }
            }
        }

        changed
    }
}
