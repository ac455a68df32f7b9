pub mod http;
pub mod reddit;
pub mod wallhaven;

use crate::error::SourceError;
use crate::record::ImageRecord;
use crate::settings::{Endpoints, SelectorConfig};
use reqwest::Url;

pub use http::HttpUpstream;

pub type FetchResult = std::result::Result<Vec<ImageRecord>, SourceError>;

/// Access to the remote image sources.
pub trait Upstream {
    fn channel(&self, name: &str, limit: usize) -> FetchResult;
    fn category(&self, name: &str, limit: usize) -> FetchResult;
    fn search(&self, query: Option<&str>, limit: usize) -> FetchResult;
    /// Newest pictures on the catalog, regardless of category.
    fn latest(&self, limit: usize) -> FetchResult;
}

/// A concrete place to fetch a picture list from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Channel(String),
    Category(String),
    Catalog,
    Search(Option<String>),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Channel(name) => write!(f, "channel {}", name),
            Source::Category(name) => write!(f, "category {}", name),
            Source::Catalog => write!(f, "catalog"),
            Source::Search(Some(query)) => write!(f, "search \"{}\"", query),
            Source::Search(None) => write!(f, "random search"),
        }
    }
}

impl Source {
    /// Human-facing page for this source.
    pub fn page_url(&self, endpoints: &Endpoints) -> String {
        match self {
            Source::Channel(name) => {
                format!("{}/r/{}/", endpoints.channel_site.trim_end_matches('/'), name)
            }
            Source::Category(name) => site_url(
                endpoints,
                &[("q", name.as_str()), ("categories", endpoints.categories_mask.as_str())],
            ),
            Source::Catalog => format!("{}/latest", endpoints.search_site.trim_end_matches('/')),
            Source::Search(Some(query)) => {
                site_url(endpoints, &[("q", query.as_str()), ("sorting", "random")])
            }
            Source::Search(None) => site_url(endpoints, &[("sorting", "random")]),
        }
    }

    pub fn fetch(&self, upstream: &dyn Upstream, config: &SelectorConfig) -> FetchResult {
        match self {
            Source::Channel(name) => upstream.channel(name, config.channel_limit),
            Source::Category(name) => upstream.category(name, config.channel_limit),
            Source::Catalog => upstream.latest(config.channel_limit),
            Source::Search(query) => upstream.search(query.as_deref(), config.search_limit),
        }
    }

    /// Fetch and treat every failure as "no result from this source".
    pub fn attempt(&self, upstream: &dyn Upstream, config: &SelectorConfig) -> Option<Vec<ImageRecord>> {
        match self.fetch(upstream, config) {
            Ok(records) if records.is_empty() => {
                log::debug!("{} returned no images", self);
                None
            }
            Ok(records) => {
                log::debug!("{} returned {} images", self, records.len());
                Some(records)
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", self, e);
                None
            }
        }
    }
}

fn site_url(endpoints: &Endpoints, params: &[(&str, &str)]) -> String {
    let base = format!("{}/search", endpoints.search_site.trim_end_matches('/'));
    match Url::parse_with_params(&base, params) {
        Ok(url) => url.to_string(),
        Err(e) => {
            log::debug!("Could not build page url from {}: {}", base, e);
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_urls() {
        let endpoints = Endpoints::default();

        assert_eq!(
            Source::Channel("EarthPorn".to_string()).page_url(&endpoints),
            "https://www.reddit.com/r/EarthPorn/"
        );
        assert_eq!(
            Source::Category("abstract".to_string()).page_url(&endpoints),
            "https://wallhaven.cc/search?q=abstract&categories=111"
        );
        assert_eq!(
            Source::Search(Some("red fox".to_string())).page_url(&endpoints),
            "https://wallhaven.cc/search?q=red+fox&sorting=random"
        );
        assert_eq!(Source::Catalog.page_url(&endpoints), "https://wallhaven.cc/latest");
        assert_eq!(
            Source::Search(None).page_url(&endpoints),
            "https://wallhaven.cc/search?sorting=random"
        );
    }

    struct Failing;

    impl Upstream for Failing {
        fn channel(&self, name: &str, _limit: usize) -> FetchResult {
            Err(SourceError::unavailable(name, "timed out"))
        }
        fn category(&self, name: &str, _limit: usize) -> FetchResult {
            Err(SourceError::empty(name))
        }
        fn search(&self, _query: Option<&str>, _limit: usize) -> FetchResult {
            Ok(Vec::new())
        }
        fn latest(&self, _limit: usize) -> FetchResult {
            Err(SourceError::unavailable("catalog", "HTTP 503 Service Unavailable"))
        }
    }

    #[test]
    fn test_attempt_swallows_failures() {
        let config = SelectorConfig::default();

        assert!(Source::Channel("SkyPorn".into()).attempt(&Failing, &config).is_none());
        assert!(Source::Category("space".into()).attempt(&Failing, &config).is_none());
        assert!(Source::Search(None).attempt(&Failing, &config).is_none());
        assert!(Source::Catalog.attempt(&Failing, &config).is_none());
    }
}
