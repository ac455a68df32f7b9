use crate::error::SourceError;
use crate::record::ImageRecord;
use regex::Regex;
use reqwest::blocking::Client;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Language the upstream titles are written in.
pub const BASE_LANG: &str = "en";

fn tag_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [r"\[.*?\]", r"\{.*?\}", r"\(.*?\)"]
            .iter()
            .map(|p| Regex::new(p).expect("valid tag pattern"))
            .collect()
    })
}

/// Strip `[...]`, then `{...}`, then `(...)` groups, then surrounding
/// whitespace.
pub fn sanitize(title: &str) -> String {
    let mut cleaned = title.to_string();
    for pattern in tag_patterns() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

fn primary_subtag(lang: &str) -> &str {
    lang.split(['-', '_']).next().unwrap_or(lang)
}

pub trait Translator {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, SourceError>;
}

/// Sanitizes titles and translates them into the display language,
/// translating each distinct title at most once.
pub struct Titles {
    lang: String,
    translator: Option<Box<dyn Translator + Send>>,
    cache: HashMap<String, String>,
}

impl Titles {
    pub fn new(lang: impl Into<String>, translator: Option<Box<dyn Translator + Send>>) -> Self {
        Self {
            lang: lang.into(),
            translator,
            cache: HashMap::new(),
        }
    }

    pub fn set_lang(&mut self, lang: impl Into<String>) {
        let lang = lang.into();
        if lang != self.lang {
            self.cache.clear();
            self.lang = lang;
        }
    }

    fn needs_translation(&self) -> bool {
        !primary_subtag(&self.lang).eq_ignore_ascii_case(BASE_LANG)
    }

    pub fn prepare(&mut self, title: &str) -> String {
        let clean = sanitize(title);
        if clean.is_empty() || !self.needs_translation() {
            return clean;
        }
        if let Some(hit) = self.cache.get(&clean) {
            return hit.clone();
        }

        let Some(translator) = &self.translator else {
            return clean;
        };
        let target = primary_subtag(&self.lang).to_lowercase();
        match translator.translate(&clean, &target) {
            Ok(translated) => {
                self.cache.insert(clean, translated.clone());
                translated
            }
            Err(e) => {
                log::warn!("Title translation failed, using original: {}", e);
                clean
            }
        }
    }

    /// Copy of `record` with its title ready for display.
    pub fn present(&mut self, record: &ImageRecord) -> ImageRecord {
        let mut shown = record.clone();
        shown.title = record
            .title
            .as_deref()
            .map(|t| self.prepare(t))
            .filter(|t| !t.is_empty());
        shown
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Translator backed by the public web translation endpoint.
pub struct WebTranslator {
    client: Client,
    endpoint: String,
}

impl WebTranslator {
    pub const DEFAULT_ENDPOINT: &'static str = "https://translate.googleapis.com/translate_a/single";

    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// The endpoint answers `[[["translated", "original", ...], ...], ...]`.
    fn parse(body: &serde_json::Value) -> Option<String> {
        let segments = body.get(0)?.as_array()?;
        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(|s| s.as_str()))
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

impl Translator for WebTranslator {
    fn translate(&self, text: &str, target_lang: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| SourceError::unavailable("translator", e))?;

        let body: serde_json::Value = response
            .json()
            .map_err(|e| SourceError::unavailable("translator", e))?;

        Self::parse(&body).ok_or_else(|| SourceError::empty("translator"))
    }
}
