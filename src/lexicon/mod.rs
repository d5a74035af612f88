//! Pronunciation dictionary engine.
//!
//! A raw CMU-format lexicon goes through three steps before it is used:
//!
//! 1. [`LexiconSource::load`](crate::LexiconSource::load) parses `WORD  PHONES` lines,
//!    skipping `;;;` comments.
//! 2. [`CmuDictionary::apply_manual_corrections`] promotes one chosen sense of
//!    frequent function words to the bare key and inserts the synthetic
//!    context keys used for "the".
//! 3. [`LexiconSource::remove_heteronyms`](crate::LexiconSource::remove_heteronyms)
//!    drops every remaining word with more than one sense.
//!
//! [`CmuDictionary::prepare`] runs all three in order. Afterwards the
//! dictionary is only handed out as `&dyn Lexicon` / `&impl Lexicon`.

pub mod cmu;
pub mod corrections;

pub use cmu::CmuDictionary;
pub use corrections::{ManualCorrections, PreferredSense, SyntheticEntry};

/// Synthetic key for "the" before a vowel-initial word.
pub const THE_VOWEL: &str = "THE_VOWEL";

/// Synthetic key for "the" before a consonant-initial word.
pub const THE_CONSONANT: &str = "THE_CONSONANT";
