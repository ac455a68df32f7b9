use crate::error::{Result, VocabError};
use crate::feeds::FeedSet;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Similarity between a spoken query and a vocabulary phrase, 0.0..=1.0.
pub trait Similarity {
    fn score(&self, query: &str, phrase: &str) -> f64;
}

/// Normalized Levenshtein similarity over lower-cased text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Levenshtein;

impl Similarity for Levenshtein {
    fn score(&self, query: &str, phrase: &str) -> f64 {
        strsim::normalized_levenshtein(&query.trim().to_lowercase(), &phrase.trim().to_lowercase())
    }
}

/// Best channel for a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub channel: String,
    pub phrase: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    phrases: HashMap<String, Vec<String>>,
}

impl Vocabulary {
    /// Phrases derived from the channel names themselves.
    pub fn derived(channels: &FeedSet) -> Self {
        let phrases = channels
            .iter()
            .map(|feed| (feed.name.clone(), derive_phrases(&feed.name)))
            .collect();
        Self { phrases }
    }

    /// Load `<dir>/<channel>.voc` for every enabled channel. A missing file
    /// means the installation is broken.
    pub fn load(dir: &Path, channels: &FeedSet) -> Result<Self> {
        let mut phrases = HashMap::new();
        for channel in channels.enabled() {
            let path = dir.join(format!("{}.voc", channel));
            if !path.exists() {
                return Err(VocabError::ResourceMissing {
                    name: channel.to_string(),
                    dir: dir.to_path_buf(),
                }
                .into());
            }
            let content = fs::read_to_string(&path).map_err(|e| VocabError::FileRead {
                path: path.clone(),
                source: e,
            })?;
            phrases.insert(channel.to_string(), parse_voc(&content));
        }
        log::info!("Loaded vocabulary for {} channels from {:?}", phrases.len(), dir);
        Ok(Self { phrases })
    }

    /// Localized directory for `lang`, e.g. `<root>/en-us`.
    pub fn lang_dir(root: &Path, lang: &str) -> PathBuf {
        root.join(lang.to_lowercase())
    }

    pub fn phrases(&self, channel: &str) -> &[String] {
        self.phrases.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Highest scoring channel among `channels`; the first wins a tie.
    pub fn best_match(
        &self,
        query: &str,
        channels: &FeedSet,
        similarity: &dyn Similarity,
    ) -> Option<Resolution> {
        let mut best: Option<Resolution> = None;
        for channel in channels.enabled() {
            for phrase in self.phrases(channel) {
                let score = similarity.score(query, phrase);
                if best.as_ref().map_or(score > 0.0, |b| score > b.score) {
                    best = Some(Resolution {
                        channel: channel.to_string(),
                        phrase: phrase.clone(),
                        score,
                    });
                }
            }
        }
        best
    }
}

/// One phrase per line; `|` separates alternatives, `#` starts a comment.
pub fn parse_voc(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split('|'))
        .map(|phrase| phrase.trim().to_lowercase())
        .filter(|phrase| !phrase.is_empty())
        .collect()
}

fn derive_phrases(name: &str) -> Vec<String> {
    let words = split_camel_case(name);
    let spaced = words.join(" ").to_lowercase();

    let mut phrases = vec![name.to_lowercase()];
    if spaced != phrases[0] {
        phrases.push(spaced);
    }

    let stem: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|w| !w.eq_ignore_ascii_case("porn"))
        .collect();
    if !stem.is_empty() && stem.len() < words.len() {
        let stem = stem.join(" ").to_lowercase();
        for suffix in ["pictures", "pics", "wallpapers"] {
            phrases.push(format!("{} {}", stem, suffix));
        }
        phrases.push(stem);
    }
    phrases
}

/// "EarthPorn" -> ["Earth", "Porn"], "MTGPorn" -> ["MTG", "Porn"],
/// "roadporn" -> ["road", "porn"].
fn split_camel_case(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let boundary = i > 0
            && c.is_uppercase()
            && (chars[i - 1].is_lowercase()
                || (chars[i - 1].is_uppercase() && chars.get(i + 1).is_some_and(|n| n.is_lowercase())));
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    // All-lowercase board names still end in the board suffix.
    if words.len() == 1 {
        let cut = words[0]
            .char_indices()
            .rev()
            .nth(3)
            .map(|(i, _)| i)
            .filter(|&i| i > 0 && words[0][i..].eq_ignore_ascii_case("porn"));
        if let Some(cut) = cut {
            let word = words.remove(0);
            words.push(word[..cut].to_string());
            words.push(word[cut..].to_string());
        }
    }
    words
}
