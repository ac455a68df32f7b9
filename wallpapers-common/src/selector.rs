use crate::error::{Result, SourceError};
use crate::plan::SourcePlan;
use crate::record::ImageRecord;
use crate::settings::SelectorConfig;
use crate::slideshow::{Direction, Slideshow, Step};
use crate::sources::{Source, Upstream};
use crate::vocab::{Similarity, Vocabulary};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

pub struct Selector {
    config: Arc<SelectorConfig>,
    upstream: Box<dyn Upstream + Send>,
    vocabulary: Vocabulary,
    similarity: Box<dyn Similarity + Send>,
    slideshow: Slideshow,
    last_source: Option<Source>,
}

impl Selector {
    pub fn new(
        config: Arc<SelectorConfig>,
        upstream: Box<dyn Upstream + Send>,
        vocabulary: Vocabulary,
        similarity: Box<dyn Similarity + Send>,
    ) -> Self {
        Self {
            config,
            upstream,
            vocabulary,
            similarity,
            slideshow: Slideshow::new(),
            last_source: None,
        }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn reconfigure(&mut self, config: Arc<SelectorConfig>, vocabulary: Vocabulary) {
        self.config = config;
        self.vocabulary = vocabulary;
    }

    /// Pick pictures without a topic.
    pub fn select_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&ImageRecord> {
        let plan = SourcePlan::random(&self.config, rng);
        let order = plan.draw(rng);
        log::debug!("Random selection will try {} sources", order.len());
        self.run(order, rng)
    }

    /// Pick pictures about `query`.
    pub fn select_query<R: Rng + ?Sized>(&mut self, query: &str, rng: &mut R) -> Result<&ImageRecord> {
        let source = self.resolve(query);
        log::info!("Query \"{}\" resolved to {}", query, source);
        let order = SourcePlan::resolved(source, &self.config).draw(rng);
        self.run(order, rng)
    }

    /// Decide which source a spoken query refers to.
    pub fn resolve(&self, query: &str) -> Source {
        let mut name = query.trim().to_string();

        if let Some(best) = self
            .vocabulary
            .best_match(&name, &self.config.channels, self.similarity.as_ref())
        {
            log::debug!(
                "Best vocabulary match for \"{}\": {} via \"{}\" ({:.2})",
                query,
                best.channel,
                best.phrase,
                best.score
            );
            if best.score > self.config.match_threshold {
                name = best.channel;
            }
        }

        if let Some(channel) = self.config.channels.find_enabled(&name) {
            Source::Channel(channel.to_string())
        } else if let Some(category) = self.config.categories.find_enabled(&name) {
            Source::Category(category.to_string())
        } else {
            Source::Search(Some(query.trim().to_string()))
        }
    }

    /// A random list that leaves the slideshow alone.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<ImageRecord>> {
        let order = SourcePlan::random(&self.config, rng).draw(rng);
        match self.gather(order, rng) {
            Some((_, records)) => Ok(records),
            None => Err(SourceError::Exhausted.into()),
        }
    }

    /// First non-empty result in `order`, shuffled and tagged with its page.
    fn gather<R: Rng + ?Sized>(&self, order: Vec<Source>, rng: &mut R) -> Option<(Source, Vec<ImageRecord>)> {
        for source in order {
            if let Some(mut records) = source.attempt(self.upstream.as_ref(), &self.config) {
                records.shuffle(rng);
                let page = source.page_url(&self.config.endpoints);
                for record in &mut records {
                    record.url = Some(page.clone());
                }
                log::info!("Selected {} pictures from {}", records.len(), source);
                return Some((source, records));
            }
        }
        log::error!("Every image source failed, including the default channel");
        None
    }

    fn run<R: Rng + ?Sized>(&mut self, order: Vec<Source>, rng: &mut R) -> Result<&ImageRecord> {
        match self.gather(order, rng) {
            Some((source, records)) => {
                self.slideshow.replace(records);
                self.last_source = Some(source);
                self.slideshow.current().ok_or_else(|| SourceError::Exhausted.into())
            }
            None => {
                self.slideshow.replace(Vec::new());
                self.last_source = None;
                Err(SourceError::Exhausted.into())
            }
        }
    }

    pub fn advance(&mut self, direction: Direction) -> Step<'_> {
        self.slideshow.advance(direction)
    }

    pub fn current(&self) -> Option<&ImageRecord> {
        self.slideshow.current()
    }

    pub fn slideshow(&self) -> &Slideshow {
        &self.slideshow
    }

    pub fn last_source(&self) -> Option<&Source> {
        self.last_source.as_ref()
    }
}
