use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wallpapers_common::desktop::DesktopEnv;
use wallpapers_common::error::ConfigError;
use wallpapers_common::{Endpoints, FeedSet, Result, SelectorConfig, SkillSettings, WallpapersError, DEFAULT_CHANNEL};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub skill: SkillConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Per-channel enable flags, e.g. `EarthPorn = false`.
    #[serde(default)]
    pub channels: BTreeMap<String, bool>,
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SkillConfig {
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_true")]
    pub auto_detect: bool,
    #[serde(default)]
    pub desktop_env: Option<String>,
    #[serde(default = "default_true")]
    pub rotate_wallpaper: bool,
    #[serde(default = "default_rotate_every", with = "humantime_serde")]
    pub rotate_every: Duration,
    #[serde(default)]
    pub vocab_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub free_search: bool,
    #[serde(default = "default_true")]
    pub catalog: bool,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default = "default_channel_limit")]
    pub channel_limit: usize,
    /// Catalog category mask, three 0/1 flags.
    #[serde(default = "default_categories_mask")]
    pub categories: String,
    #[serde(default)]
    pub allow_nsfw: bool,
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_channel_site")]
    pub channel_site: String,
    #[serde(default = "default_search_api")]
    pub search_api: String,
    #[serde(default = "default_search_site")]
    pub search_site: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

// Default values
fn default_true() -> bool {
    true
}

fn default_lang() -> String {
    "en-us".to_string()
}

fn default_rotate_every() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_search_limit() -> usize {
    3
}

fn default_channel_limit() -> usize {
    25
}

fn default_categories_mask() -> String {
    "111".to_string()
}

fn default_match_threshold() -> f64 {
    0.85
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_channel_site() -> String {
    Endpoints::default().channel_site
}

fn default_search_api() -> String {
    Endpoints::default().search_api
}

fn default_search_site() -> String {
    Endpoints::default().search_site
}

fn default_max_files() -> usize {
    50
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            auto_detect: true,
            desktop_env: None,
            rotate_wallpaper: true,
            rotate_every: default_rotate_every(),
            vocab_dir: None,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            free_search: false,
            catalog: true,
            search_limit: default_search_limit(),
            channel_limit: default_channel_limit(),
            categories: default_categories_mask(),
            allow_nsfw: false,
            match_threshold: default_match_threshold(),
            timeout: default_timeout(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            channel_site: default_channel_site(),
            search_api: default_search_api(),
            search_site: default_search_site(),
            user_agent: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_files: default_max_files(),
        }
    }
}

fn invalid(field: &str, value: impl ToString) -> WallpapersError {
    WallpapersError::Config(ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

impl Config {
    /// Load from the default location. A missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            log::info!("No configuration at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| {
            WallpapersError::Config(ConfigError::FileRead {
                path: config_path.to_path_buf(),
                source: e,
            })
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        log::info!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(WallpapersError::Config(ConfigError::NoConfigDir))?
            .join("wallpapers");

        Ok(config_dir.join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        self.skill.validate()?;
        self.sources.validate()?;

        if self.cache.max_files == 0 {
            return Err(invalid("cache.max_files", self.cache.max_files));
        }

        Ok(())
    }

    /// Immutable runtime settings with the per-feed overrides applied.
    pub fn into_settings(self) -> SkillSettings {
        let mut channels = FeedSet::channels();
        apply_overrides(&mut channels, &self.channels, "channel");
        let mut categories = FeedSet::categories();
        apply_overrides(&mut categories, &self.categories, "category");

        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            channel_site: self.sources.endpoints.channel_site,
            search_api: self.sources.endpoints.search_api,
            search_site: self.sources.endpoints.search_site,
            categories_mask: self.sources.categories,
            allow_nsfw: self.sources.allow_nsfw,
            user_agent: self.sources.endpoints.user_agent.unwrap_or(defaults.user_agent),
            timeout: self.sources.timeout,
        };

        SkillSettings {
            lang: self.skill.lang,
            auto_detect: self.skill.auto_detect,
            desktop_env: self.skill.desktop_env,
            rotate_wallpaper: self.skill.rotate_wallpaper,
            rotate_every: self.skill.rotate_every,
            vocab_dir: self.skill.vocab_dir,
            cache_dir: self.cache.dir,
            cache_max_files: self.cache.max_files,
            selector: SelectorConfig {
                channels,
                categories,
                free_search: self.sources.free_search,
                catalog: self.sources.catalog,
                search_limit: self.sources.search_limit,
                channel_limit: self.sources.channel_limit,
                match_threshold: self.sources.match_threshold,
                default_channel: DEFAULT_CHANNEL.to_string(),
                endpoints,
            },
        }
    }
}

fn apply_overrides(feeds: &mut FeedSet, overrides: &BTreeMap<String, bool>, kind: &str) {
    for (name, &enabled) in overrides {
        if !feeds.iter().any(|feed| feed.name == *name) {
            log::warn!("Adding unknown {} {} from configuration", kind, name);
        }
        feeds.set_enabled(name, enabled);
    }
}

impl SkillConfig {
    fn validate(&self) -> Result<()> {
        if self.lang.trim().is_empty() {
            return Err(invalid("skill.lang", &self.lang));
        }

        if self.rotate_every < Duration::from_secs(1) {
            return Err(invalid("skill.rotate_every", format!("{:?}", self.rotate_every)));
        }

        if let Some(env) = &self.desktop_env {
            if env.parse::<DesktopEnv>().is_err() {
                return Err(invalid("skill.desktop_env", env));
            }
        } else if !self.auto_detect {
            log::warn!("auto_detect is off but no desktop_env is set; detection will be used");
        }

        Ok(())
    }
}

impl SourcesConfig {
    fn validate(&self) -> Result<()> {
        if self.search_limit == 0 {
            return Err(invalid("sources.search_limit", self.search_limit));
        }

        if self.channel_limit == 0 || self.channel_limit > 100 {
            return Err(invalid("sources.channel_limit", self.channel_limit));
        }

        if self.categories.len() != 3 || !self.categories.chars().all(|c| c == '0' || c == '1') {
            return Err(invalid("sources.categories", &self.categories));
        }

        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(invalid("sources.match_threshold", self.match_threshold));
        }

        if self.timeout < Duration::from_secs(1) {
            return Err(invalid("sources.timeout", format!("{:?}", self.timeout)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_runtime_defaults() {
        let settings = Config::default().into_settings();
        assert_eq!(settings, SkillSettings::default());

        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.into_settings(), SkillSettings::default());
    }

    #[test]
    fn test_duration_deserialization() {
        let toml_str = r#"
            [skill]
            rotate_every = "3m"

            [sources]
            timeout = "10s"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.skill.rotate_every, Duration::from_secs(180));
        assert_eq!(config.sources.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.skill.rotate_every = Duration::from_secs(0);
        assert!(config.validate().is_err());

        config.skill.rotate_every = default_rotate_every();
        config.sources.search_limit = 0;
        assert!(config.validate().is_err());

        config.sources.search_limit = 3;
        config.sources.categories = "1a1".to_string();
        assert!(config.validate().is_err());

        config.sources.categories = "010".to_string();
        config.skill.desktop_env = Some("amiga".to_string());
        match config.validate() {
            Err(WallpapersError::Config(ConfigError::InvalidValue { field, .. })) => {
                assert_eq!(field, "skill.desktop_env");
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }

        config.skill.desktop_env = Some("gnome".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_feed_overrides() {
        let toml_str = r#"
            [channels]
            EarthPorn = false
            MyOwnBoard = true

            [categories]
            space = false
        "#;

        let settings = toml::from_str::<Config>(toml_str).unwrap().into_settings();
        let selector = settings.selector;

        assert!(!selector.channels.is_enabled("EarthPorn"));
        assert!(selector.channels.is_enabled("SkyPorn"));
        assert!(selector.channels.is_enabled("MyOwnBoard"));
        assert!(!selector.categories.is_enabled("space"));
    }

    #[test]
    fn test_sources_section() {
        let toml_str = r#"
            [sources]
            free_search = true
            catalog = false
            search_limit = 5
            categories = "100"
            allow_nsfw = true

            [sources.endpoints]
            search_site = "https://example.org"
            user_agent = "test-agent"
        "#;

        let settings = toml::from_str::<Config>(toml_str).unwrap().into_settings();
        let selector = settings.selector;

        assert!(selector.free_search);
        assert!(!selector.catalog);
        assert_eq!(selector.search_limit, 5);
        assert_eq!(selector.endpoints.categories_mask, "100");
        assert!(selector.endpoints.allow_nsfw);
        assert_eq!(selector.endpoints.search_site, "https://example.org");
        assert_eq!(selector.endpoints.search_api, "https://wallhaven.cc/api/v1");
        assert_eq!(selector.endpoints.user_agent, "test-agent");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from_path(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config.skill.lang, "en-us");
        assert!(config.channels.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [skill]
            lang = "pt-pt"
            auto_detect = false
            desktop_env = "xfce"

            [cache]
            max_files = 10
            "#,
        )
        .unwrap();

        let settings = Config::load_from_path(&path).unwrap().into_settings();
        assert_eq!(settings.lang, "pt-pt");
        assert!(!settings.auto_detect);
        assert_eq!(settings.desktop_env.as_deref(), Some("xfce"));
        assert_eq!(settings.cache_max_files, 10);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[skill\nlang = ").unwrap();

        assert!(matches!(
            Config::load_from_path(&path),
            Err(WallpapersError::Config(ConfigError::TomlParse { .. }))
        ));
    }
}
