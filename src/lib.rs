//! # tts-corpus
//!
//! Builds a training corpus for text-normalisation and text-to-speech models
//! from annotated raw-text corpora.
//!
//! ## Features
//!
//! - **Two source formats**: semiotic-class token files (`class\toriginal\tnormalised`,
//!   sentences closed by `<eos>`) and LJSpeech transcripts (`id|original|normalised`)
//! - **Pronunciation dictionary**: CMU-style lexicon with manual corrections and
//!   conservative heteronym removal
//! - **Filtering**: drops content-free sentences and downsamples short or
//!   normalisation-free ones; out-of-vocabulary sentences are always dropped
//! - **Phonemisation**: word-boundary delimited phone strings with silence collapsing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tts_corpus::corpus::{BuildConfigBuilder, CorpusBuilder};
//! use tts_corpus::lexicon::{CmuDictionary, ManualCorrections};
//! use tts_corpus::sink::CsvSink;
//!
//! let corrections = ManualCorrections::builtin()?;
//! let dictionary = CmuDictionary::prepare(Path::new("cmudict-0.7b"), &corrections)?;
//!
//! let config = BuildConfigBuilder::default().target_sentences(20_000usize).build()?;
//! let mut builder = CorpusBuilder::new(&dictionary, config);
//! let mut sink = CsvSink::new("corpus.csv");
//! let summary = builder.build(Path::new("data/en_with_types"), &mut sink)?;
//! println!("wrote {} sentences", summary.sentences_written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod corpus;
pub mod error;
pub mod filter;
pub mod lexicon;
pub mod phonemizer;
pub mod sink;
pub mod sources;

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

pub use error::CorpusError;

/// Token used for pauses in normalised text and phone strings.
pub const SILENCE: &str = "<sil>";

/// Token delimiting the phones of consecutive words.
pub const WORD_BOUNDARY: &str = "<w>";

/// One sentence of a source corpus.
///
/// `semiotic_classes` only drives filtering and is never written out.
/// `phonemised` stays `None` until the phonemiser has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub original: String,
    pub normalised: String,
    #[serde(skip)]
    pub semiotic_classes: BTreeSet<String>,
    pub phonemised: Option<String>,
}

impl Sentence {
    /// Create a sentence without semiotic class information.
    pub fn new(original: impl Into<String>, normalised: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            normalised: normalised.into(),
            ..Default::default()
        }
    }

    /// Append one annotated token.
    pub fn push_token(&mut self, semiotic_class: &str, original: &str, normalised: &str) {
        self.semiotic_classes.insert(semiotic_class.to_string());
        self.original.push_str(original);
        self.original.push(' ');
        self.normalised.push_str(normalised);
        self.normalised.push(' ');
    }

    /// Trim the trailing separators left by [`push_token`](Self::push_token).
    pub fn finalise(mut self) -> Self {
        self.original.truncate(self.original.trim_end().len());
        self.normalised.truncate(self.normalised.trim_end().len());
        self
    }

    pub fn original_tokens(&self) -> impl Iterator<Item = &str> {
        self.original.split_whitespace()
    }

    pub fn normalised_tokens(&self) -> impl Iterator<Item = &str> {
        self.normalised.split_whitespace()
    }
}

/// Read-only word to phones lookup.
///
/// This is the only view of a dictionary that filtering and phonemisation get.
pub trait Lexicon {
    /// Look up a word, ignoring case. A miss is a normal outcome, not an error.
    fn lookup(&self, word: &str) -> Option<&str>;

    fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }
}

/// A dictionary that can be loaded from disk and cleaned of ambiguous entries.
pub trait LexiconSource: Lexicon + Sized {
    /// Load the raw lexicon file.
    fn load(path: &Path) -> Result<Self, CorpusError>;

    /// Drop every word that has more than one sense-indexed pronunciation.
    fn remove_heteronyms(&mut self);
}

#[cfg(test)]
mod tests {
    use super::Sentence;

    #[test]
    fn tokens_are_joined_and_trimmed() {
        let mut sentence = Sentence::default();
        sentence.push_token("PLAIN", "Hello", "hello");
        sentence.push_token("PUNCT", ",", "<sil>");
        sentence.push_token("PLAIN", "there", "there");
        let sentence = sentence.finalise();

        assert_eq!(sentence.original, "Hello , there");
        assert_eq!(sentence.normalised, "hello <sil> there");
        assert_eq!(sentence.original_tokens().count(), 3);
        assert_eq!(sentence.normalised_tokens().count(), 3);
    }

    #[test]
    fn semiotic_classes_are_deduplicated() {
        let mut sentence = Sentence::default();
        sentence.push_token("PLAIN", "a", "a");
        sentence.push_token("PLAIN", "b", "b");
        sentence.push_token("DATE", "1999", "nineteen ninety nine");

        let classes: Vec<&str> = sentence.semiotic_classes.iter().map(String::as_str).collect();
        assert_eq!(classes, vec!["DATE", "PLAIN"]);
    }
}
