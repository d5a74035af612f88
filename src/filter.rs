//! Sentence selection.
//!
//! Checks run in a fixed order and the first one that fires rejects the
//! sentence:
//!
//! 1. every normalised token is silence
//! 2. fewer than `short_sentence_tokens` original tokens, rejected with
//!    `short_rejection_probability`
//! 3. the semiotic classes are exactly one of the uninteresting sets, rejected
//!    with `uninteresting_rejection_probability`
//! 4. a non-silence token is missing from the dictionary
//!
//! Random draws only happen when the deterministic half of a check holds.
//! Runs without a seed are not reproducible.

use std::collections::BTreeSet;
use std::ops::AddAssign;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::phonemizer::lookup_key;
use crate::sources::is_silence;
use crate::{CorpusError, Lexicon, Sentence};

/// A source of uniform draws in `[0, 1)`.
pub trait UniformSource {
    fn next_f64(&mut self) -> f64;
}

impl UniformSource for fastrand::Rng {
    fn next_f64(&mut self) -> f64 {
        self.f64()
    }
}

/// Which checks apply to a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    /// The full cascade, for sources with semiotic class annotations.
    Full,
    /// Only the out-of-vocabulary check.
    VocabularyOnly,
}

/// Why a sentence was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    OnlySilence,
    Short,
    Uninteresting,
    OutOfVocabulary,
}

/// Thresholds for the filter cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Sentences with fewer original tokens than this are short.
    pub short_sentence_tokens: usize,
    pub short_rejection_probability: f64,
    pub uninteresting_rejection_probability: f64,
    /// Exact class sets that contain no normalisation phenomena.
    pub uninteresting_class_sets: Vec<Vec<String>>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            short_sentence_tokens: 15,
            short_rejection_probability: 0.9,
            uninteresting_rejection_probability: 0.5,
            uninteresting_class_sets: vec![
                vec!["PLAIN".to_string()],
                vec!["PUNCT".to_string()],
                vec!["PLAIN".to_string(), "PUNCT".to_string()],
            ],
        }
    }
}

impl FilterParams {
    /// Load filter parameters from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| CorpusError::Config(format!("Failed to parse JSON: {e}")).in_file(path))
    }
}

/// Counts of kept and rejected sentences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub kept: usize,
    pub only_silence: usize,
    pub short: usize,
    pub uninteresting: usize,
    pub out_of_vocabulary: usize,
}

impl FilterStats {
    fn record(&mut self, outcome: Option<Rejection>) {
        match outcome {
            None => self.kept += 1,
            Some(Rejection::OnlySilence) => self.only_silence += 1,
            Some(Rejection::Short) => self.short += 1,
            Some(Rejection::Uninteresting) => self.uninteresting += 1,
            Some(Rejection::OutOfVocabulary) => self.out_of_vocabulary += 1,
        }
    }

    pub fn rejected(&self) -> usize {
        self.only_silence + self.short + self.uninteresting + self.out_of_vocabulary
    }
}

impl AddAssign for FilterStats {
    fn add_assign(&mut self, other: Self) {
        self.kept += other.kept;
        self.only_silence += other.only_silence;
        self.short += other.short;
        self.uninteresting += other.uninteresting;
        self.out_of_vocabulary += other.out_of_vocabulary;
    }
}

/// Applies the filter cascade. Never modifies the sentences it keeps.
pub struct SentenceFilter<R = fastrand::Rng> {
    params: FilterParams,
    uninteresting: Vec<BTreeSet<String>>,
    rng: R,
}

impl SentenceFilter<fastrand::Rng> {
    /// Create a filter drawing from `fastrand`. `None` seeds from entropy.
    pub fn new(params: FilterParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self::with_source(params, rng)
    }
}

impl<R: UniformSource> SentenceFilter<R> {
    pub fn with_source(params: FilterParams, rng: R) -> Self {
        let uninteresting = params
            .uninteresting_class_sets
            .iter()
            .map(|set| set.iter().cloned().collect())
            .collect();
        Self {
            params,
            uninteresting,
            rng,
        }
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// Return the first reason to drop `sentence`, or `None` to keep it.
    pub fn check<L: Lexicon + ?Sized>(
        &mut self,
        sentence: &Sentence,
        lexicon: &L,
        policy: FilterPolicy,
    ) -> Option<Rejection> {
        if policy == FilterPolicy::Full {
            if sentence.normalised_tokens().all(is_silence) {
                return Some(Rejection::OnlySilence);
            }
            if self.is_short(sentence)
                && self.random_reject(self.params.short_rejection_probability)
            {
                return Some(Rejection::Short);
            }
            if self.is_uninteresting(sentence)
                && self.random_reject(self.params.uninteresting_rejection_probability)
            {
                return Some(Rejection::Uninteresting);
            }
        }

        let tokens: Vec<&str> = sentence.normalised_tokens().collect();
        if find_oov(&tokens, lexicon).is_some() {
            return Some(Rejection::OutOfVocabulary);
        }
        None
    }

    /// Keep the sentences that pass every check.
    pub fn retain<L: Lexicon + ?Sized>(
        &mut self,
        sentences: Vec<Sentence>,
        lexicon: &L,
        policy: FilterPolicy,
    ) -> (Vec<Sentence>, FilterStats) {
        let mut stats = FilterStats::default();
        let kept: Vec<Sentence> = sentences
            .into_iter()
            .filter(|sentence| {
                let outcome = self.check(sentence, lexicon, policy);
                stats.record(outcome);
                outcome.is_none()
            })
            .collect();
        log::debug!("Filter stats: {stats:?}");
        (kept, stats)
    }

    fn is_short(&self, sentence: &Sentence) -> bool {
        sentence.original_tokens().count() < self.params.short_sentence_tokens
    }

    /// Exact-set comparison; supersets of an uninteresting set are interesting.
    fn is_uninteresting(&self, sentence: &Sentence) -> bool {
        self.uninteresting
            .iter()
            .any(|set| *set == sentence.semiotic_classes)
    }

    fn random_reject(&mut self, probability: f64) -> bool {
        self.rng.next_f64() < probability
    }
}

/// Find the first non-silence token the dictionary cannot resolve.
///
/// Uses the same key selection as phonemisation, so the two never disagree.
pub fn find_oov<'a, L: Lexicon + ?Sized>(tokens: &[&'a str], lexicon: &L) -> Option<&'a str> {
    (0..tokens.len())
        .filter(|&i| !is_silence(tokens[i]))
        .find(|&i| !lexicon.contains(&lookup_key(tokens, i)))
        .map(|i| tokens[i])
}
