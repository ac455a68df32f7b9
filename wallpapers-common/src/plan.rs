use crate::settings::SelectorConfig;
use crate::sources::Source;
use rand::seq::SliceRandom;
use rand::Rng;

const COIN: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub source: Source,
    /// Probability that this candidate is attempted at all.
    pub weight: f64,
}

impl Candidate {
    pub fn new(source: Source, weight: f64) -> Self {
        Self { source, weight }
    }
}

/// A position in the plan. `OneOf` attempts at most one member: the first
/// whose roll passes.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Single(Candidate),
    OneOf(Vec<Candidate>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourcePlan {
    slots: Vec<Slot>,
}

impl SourcePlan {
    /// Plan for a request without a topic: shuffled enabled channels, then
    /// free-search or catalog, then the default channel.
    pub fn random<R: Rng + ?Sized>(config: &SelectorConfig, rng: &mut R) -> Self {
        let mut channels: Vec<&str> = config.channels.enabled().collect();
        channels.shuffle(rng);

        let mut slots: Vec<Slot> = channels
            .into_iter()
            .map(|c| Slot::Single(Candidate::new(Source::Channel(c.to_string()), COIN)))
            .collect();

        let mut others = Vec::new();
        if config.free_search {
            others.push(Candidate::new(Source::Search(None), COIN));
        }
        if config.catalog {
            let mut categories: Vec<&str> = config.categories.enabled().collect();
            categories.shuffle(rng);
            let source = match categories.first() {
                Some(category) => Source::Category(category.to_string()),
                None => Source::Catalog,
            };
            others.push(Candidate::new(source, COIN));
        }
        if !others.is_empty() {
            slots.push(Slot::OneOf(others));
        }

        let mut plan = Self { slots };
        plan.push_fallback(config);
        plan
    }

    /// Plan for an already resolved source.
    pub fn resolved(source: Source, config: &SelectorConfig) -> Self {
        let mut plan = Self {
            slots: vec![Slot::Single(Candidate::new(source, 1.0))],
        };
        plan.push_fallback(config);
        plan
    }

    fn push_fallback(&mut self, config: &SelectorConfig) {
        self.slots.push(Slot::Single(Candidate::new(
            Source::Channel(config.default_channel.clone()),
            1.0,
        )));
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Roll every weight and return the sources to try, in order.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Source> {
        let mut drawn = Vec::new();
        for slot in &self.slots {
            match slot {
                Slot::Single(candidate) => {
                    if roll(candidate.weight, rng) {
                        drawn.push(candidate.source.clone());
                    }
                }
                Slot::OneOf(members) => {
                    if let Some(candidate) = members.iter().find(|c| roll(c.weight, rng)) {
                        drawn.push(candidate.source.clone());
                    }
                }
            }
        }
        drawn
    }
}

fn roll<R: Rng + ?Sized>(weight: f64, rng: &mut R) -> bool {
    weight >= 1.0 || rng.gen_bool(weight.clamp(0.0, 1.0))
}
