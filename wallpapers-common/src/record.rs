use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GUI key carrying the image link, kept stable for the slideshow page.
pub const IMAGE_KEY: &str = "imgLink";

/// One fetched wallpaper candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_url: String,
    pub title: Option<String>,
    /// Page the image was found on (post permalink, wallpaper page, ...).
    pub source_page: Option<String>,
    /// Human-facing page of the source that produced the list.
    pub url: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl ImageRecord {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            title: None,
            source_page: None,
            url: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.trim().is_empty() {
            self.title = Some(title);
        }
        self
    }

    pub fn with_source_page(mut self, page: impl Into<String>) -> Self {
        self.source_page = Some(page.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Every displayable field, in the shape the GUI surface expects.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![(IMAGE_KEY.to_string(), self.image_url.clone())];
        if let Some(title) = &self.title {
            fields.push(("title".to_string(), title.clone()));
        }
        if let Some(page) = &self.source_page {
            fields.push(("source".to_string(), page.clone()));
        }
        if let Some(url) = &self.url {
            fields.push(("url".to_string(), url.clone()));
        }
        fields.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields
    }
}
