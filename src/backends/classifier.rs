//! Opaque classifier contract and the built-in lexicon classifiers

use anyhow::{bail, Result};
use serde::Deserialize;

/// One raw tag with its score, in the backend's native vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTag {
    pub tag: String,
    pub score: f64,
}

/// Raw classifier output. Backends disagree on shape: some return a single
/// best record, others a ranked list over all tags. Both collapse to the
/// highest-scoring tag before anything downstream sees them.
#[derive(Debug, Clone)]
pub enum RawPrediction {
    Single(ScoredTag),
    Ranked(Vec<ScoredTag>),
}

impl RawPrediction {
    /// The highest-scoring tag, or `None` for an empty ranked list.
    pub fn into_best(self) -> Option<ScoredTag> {
        match self {
            RawPrediction::Single(tag) => Some(tag),
            RawPrediction::Ranked(tags) => tags
                .into_iter()
                .reduce(|best, candidate| if candidate.score > best.score { candidate } else { best }),
        }
    }
}

/// The call contract every backend implements.
///
/// Calls are synchronous, may block for an unbounded duration, and may fail
/// arbitrarily; the adapter absorbs failures.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<RawPrediction>;
}

/// Which output shape a backend emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputShape {
    Single,
    #[default]
    Ranked,
}

/// A backend's native tag names for each polarity. Two-class backends have
/// no neutral tag.
#[derive(Debug, Clone, Deserialize)]
pub struct TagVocabulary {
    pub positive: String,
    pub negative: String,
    #[serde(default)]
    pub neutral: Option<String>,
}

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "best", "brilliant", "delicious", "enjoy", "excellent", "fantastic",
    "good", "great", "happy", "impressive", "love", "loved", "nice", "outstanding", "perfect",
    "pleasant", "recommend", "wonderful",
];

const NEGATIVE_WORDS: &[&str] = &[
    "awful", "bad", "boring", "broken", "disappointing", "disgusting", "dreadful", "hate",
    "hated", "horrible", "mediocre", "poor", "rude", "sad", "slow", "terrible", "unpleasant",
    "useless", "waste", "worst",
];

/// Rule-based classifier emitting scores over a backend-specific tag
/// vocabulary. Stands in for a hosted model so the default registry works
/// without weights; real model integrations implement [`Classifier`] the
/// same way.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    vocabulary: TagVocabulary,
    shape: OutputShape,
}

impl LexiconClassifier {
    pub fn new(vocabulary: TagVocabulary, shape: OutputShape) -> Self {
        Self { vocabulary, shape }
    }

    /// Score the text over the vocabulary. An additive prior keeps scores
    /// smooth and makes neutral win when no lexicon word matches.
    fn score(&self, text: &str) -> Vec<ScoredTag> {
        let mut positive_hits = 0usize;
        let mut negative_hits = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            if POSITIVE_WORDS.contains(&token.as_str()) {
                positive_hits += 1;
            } else if NEGATIVE_WORDS.contains(&token.as_str()) {
                negative_hits += 1;
            }
        }

        let positive_weight = positive_hits as f64 + 0.5;
        let negative_weight = negative_hits as f64 + 0.5;

        let mut tags = Vec::with_capacity(3);
        match &self.vocabulary.neutral {
            Some(neutral_tag) => {
                let neutral_weight = 1.0;
                let total = positive_weight + negative_weight + neutral_weight;
                tags.push(ScoredTag {
                    tag: self.vocabulary.positive.clone(),
                    score: positive_weight / total,
                });
                tags.push(ScoredTag {
                    tag: self.vocabulary.negative.clone(),
                    score: negative_weight / total,
                });
                tags.push(ScoredTag {
                    tag: neutral_tag.clone(),
                    score: neutral_weight / total,
                });
            }
            None => {
                let total = positive_weight + negative_weight;
                tags.push(ScoredTag {
                    tag: self.vocabulary.positive.clone(),
                    score: positive_weight / total,
                });
                tags.push(ScoredTag {
                    tag: self.vocabulary.negative.clone(),
                    score: negative_weight / total,
                });
            }
        }
        tags
    }
}

impl Classifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<RawPrediction> {
        let tags = self.score(text);
        match self.shape {
            OutputShape::Ranked => Ok(RawPrediction::Ranked(tags)),
            OutputShape::Single => match RawPrediction::Ranked(tags).into_best() {
                Some(best) => Ok(RawPrediction::Single(best)),
                None => bail!("lexicon produced no scored tags"),
            },
        }
    }
}
