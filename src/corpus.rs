//! Corpus assembly: parse, filter, interleave, phonemise and write.
//!
//! Primary files are processed one at a time and each surviving batch is
//! appended to the sink before the next file is read. An optional auxiliary
//! pool (usually LJSpeech) is mixed in at a fixed ratio until it runs out.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use derive_builder::Builder;

use crate::filter::{FilterParams, FilterPolicy, FilterStats, SentenceFilter, UniformSource};
use crate::phonemizer::phonemise_sentence;
use crate::sink::{CsvSink, NormalisedRecord, SentenceSink};
use crate::sources::{SentenceParser, SproatParser};
use crate::{CorpusError, Lexicon, Sentence};

/// Settings for a corpus build.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(default)]
pub struct BuildConfig {
    /// Stop once this many sentences have been written.
    pub target_sentences: usize,
    /// Inject one auxiliary sentence per this many primary sentences. 0 disables injection.
    pub injection_interval: usize,
    /// Primary files are the directory entries whose name starts with this.
    #[builder(setter(into))]
    pub source_prefix: String,
    pub filter: FilterParams,
    /// Seed for the filter's random draws. `None` makes runs non-reproducible.
    #[builder(setter(strip_option))]
    pub seed: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            target_sentences: 20_000,
            injection_interval: 20,
            source_prefix: "output-".to_string(),
            filter: FilterParams::default(),
            seed: None,
        }
    }
}

/// What a build produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub files_processed: usize,
    pub sentences_written: usize,
    pub auxiliary_injected: usize,
    pub auxiliary_remaining: usize,
    pub filter: FilterStats,
}

pub struct CorpusBuilder<'a, L: Lexicon + ?Sized, R = fastrand::Rng> {
    lexicon: &'a L,
    config: BuildConfig,
    filter: SentenceFilter<R>,
    auxiliary: VecDeque<Sentence>,
    primary_seen: usize,
    summary: BuildSummary,
}

impl<'a, L: Lexicon + ?Sized> CorpusBuilder<'a, L> {
    pub fn new(lexicon: &'a L, config: BuildConfig) -> Self {
        let filter = SentenceFilter::new(config.filter.clone(), config.seed);
        Self::with_filter(lexicon, config, filter)
    }
}

impl<'a, L: Lexicon + ?Sized, R: UniformSource> CorpusBuilder<'a, L, R> {
    /// Create a builder with an explicit filter, e.g. one with a scripted random source.
    pub fn with_filter(lexicon: &'a L, config: BuildConfig, filter: SentenceFilter<R>) -> Self {
        Self {
            lexicon,
            config,
            filter,
            auxiliary: VecDeque::new(),
            primary_seen: 0,
            summary: BuildSummary::default(),
        }
    }

    /// Parse and filter an auxiliary source, adding its survivors to the pool.
    pub fn load_auxiliary<P: SentenceParser>(
        &mut self,
        parser: &P,
        path: &Path,
    ) -> Result<usize, CorpusError> {
        let sentences = parser.parse_file(path)?;
        let total = sentences.len();
        let (kept, _) = self
            .filter
            .retain(sentences, self.lexicon, parser.filter_policy());
        log::info!(
            "Auxiliary pool: kept {} of {total} sentences from {}",
            kept.len(),
            path.display()
        );
        let added = kept.len();
        self.add_auxiliary(kept);
        Ok(added)
    }

    /// Add already filtered sentences to the auxiliary pool.
    pub fn add_auxiliary(&mut self, sentences: impl IntoIterator<Item = Sentence>) {
        self.auxiliary.extend(sentences);
    }

    pub fn auxiliary_remaining(&self) -> usize {
        self.auxiliary.len()
    }

    pub fn is_complete(&self) -> bool {
        self.summary.sentences_written >= self.config.target_sentences
    }

    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            auxiliary_remaining: self.auxiliary.len(),
            ..self.summary
        }
    }

    /// Mix auxiliary sentences into a primary batch.
    ///
    /// One auxiliary sentence follows every primary sentence whose running
    /// index is a multiple of the injection interval, while the pool lasts.
    pub fn interleave(&mut self, primary: Vec<Sentence>) -> Vec<Sentence> {
        self.interleave_up_to(primary, usize::MAX)
    }

    /// Like [`interleave`](Self::interleave), but stops once `limit`
    /// sentences have been produced. Auxiliary sentences only leave the pool
    /// and primary sentences only advance the injection counter when they
    /// make it into the result.
    pub fn interleave_up_to(&mut self, primary: Vec<Sentence>, limit: usize) -> Vec<Sentence> {
        let mut mixed = Vec::with_capacity(primary.len().saturating_add(1).min(limit));
        for sentence in primary {
            if mixed.len() >= limit {
                break;
            }
            mixed.push(sentence);
            let due = self.config.injection_interval > 0
                && self.primary_seen % self.config.injection_interval == 0;
            if due && mixed.len() < limit {
                if let Some(auxiliary) = self.auxiliary.pop_front() {
                    mixed.push(auxiliary);
                    self.summary.auxiliary_injected += 1;
                }
            }
            self.primary_seen += 1;
        }
        mixed
    }

    /// Filter, interleave, phonemise and write one batch of primary sentences.
    ///
    /// The batch is cut short if it would overshoot the target. Returns the
    /// number of sentences written.
    pub fn process_batch<S: SentenceSink + ?Sized>(
        &mut self,
        sentences: Vec<Sentence>,
        policy: FilterPolicy,
        sink: &mut S,
    ) -> Result<usize, CorpusError> {
        let (kept, stats) = self.filter.retain(sentences, self.lexicon, policy);
        self.summary.filter += stats;

        let remaining = self
            .config
            .target_sentences
            .saturating_sub(self.summary.sentences_written);
        let mut batch = self.interleave_up_to(kept, remaining);

        for sentence in &mut batch {
            phonemise_sentence(sentence, self.lexicon)?;
        }
        sink.write_batch(&batch)?;
        self.summary.sentences_written += batch.len();
        Ok(batch.len())
    }

    /// Run every matching file in `source_dir` through the semiotic-class parser.
    pub fn build<S: SentenceSink + ?Sized>(
        &mut self,
        source_dir: &Path,
        sink: &mut S,
    ) -> Result<BuildSummary, CorpusError> {
        let files = discover_sources(source_dir, &self.config.source_prefix)?;
        log::info!(
            "Found {} source files in {}",
            files.len(),
            source_dir.display()
        );
        self.build_from(&SproatParser::new(), &files, sink)
    }

    /// Process `files` in order until the target is reached.
    pub fn build_from<P: SentenceParser, S: SentenceSink + ?Sized>(
        &mut self,
        parser: &P,
        files: &[PathBuf],
        sink: &mut S,
    ) -> Result<BuildSummary, CorpusError> {
        for path in files {
            if self.is_complete() {
                break;
            }
            let sentences = parser.parse_file(path)?;
            let parsed = sentences.len();
            let written = self
                .process_batch(sentences, parser.filter_policy(), sink)
                .map_err(|e| e.in_file(path))?;
            self.summary.files_processed += 1;
            log::info!(
                "{}: wrote {written} of {parsed} sentences ({}/{} total, {} auxiliary left)",
                path.display(),
                self.summary.sentences_written,
                self.config.target_sentences,
                self.auxiliary.len()
            );
        }

        if !self.is_complete() {
            log::warn!(
                "Sources exhausted after {} of {} sentences",
                self.summary.sentences_written,
                self.config.target_sentences
            );
        }
        let summary = self.summary();
        log::info!("Build finished: {summary:?}");
        Ok(summary)
    }
}

/// Regular files in `dir` whose name starts with `prefix`, sorted by path.
pub fn discover_sources(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, CorpusError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CorpusError::from(e).in_file(dir))? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Write a semiotic-class file as an `original,normalised` table, unfiltered.
pub fn convert(source: &Path, sink: &mut CsvSink) -> Result<usize, CorpusError> {
    let sentences = SproatParser::new().parse_file(source)?;
    let written = sink.append(sentences.iter().map(NormalisedRecord::from))?;
    log::info!("Saved {written} sentences to {}", sink.path().display());
    Ok(written)
}
