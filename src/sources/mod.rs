//! Source corpus parsers.
//!
//! Each format turns raw file text into [`Sentence`] records. Shared text
//! handling lives here as free functions that the parsers compose.
//!
//! # Available Formats
//!
//! - [`SproatParser`] - semiotic-class token files, one `class\toriginal\tnormalised`
//!   token per line, sentences closed by a line containing `<eos>`
//! - [`LjSpeechParser`] - `id|original|normalised` transcripts, one sentence per line

pub mod ljspeech;
pub mod sproat;

use std::path::Path;

pub use ljspeech::LjSpeechParser;
pub use sproat::SproatParser;

use crate::filter::FilterPolicy;
use crate::{CorpusError, Sentence, SILENCE};

/// Marker for the end of a sentence in semiotic-class files.
pub const END_OF_SENTENCE: &str = "<eos>";

/// Common interface for corpus formats.
pub trait SentenceParser {
    /// Parse the full text of one source file.
    fn parse(&self, text: &str) -> Result<Vec<Sentence>, CorpusError>;

    /// Which filter checks apply to sentences of this format.
    fn filter_policy(&self) -> FilterPolicy;

    /// Read a source file fully into memory and parse it.
    fn parse_file(&self, path: &Path) -> Result<Vec<Sentence>, CorpusError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| CorpusError::from(e).in_file(path))?;
        let sentences = self.parse(&text).map_err(|e| e.in_file(path))?;
        log::debug!("Parsed {} sentences from {}", sentences.len(), path.display());
        Ok(sentences)
    }
}

pub fn contains_eos(line: &str) -> bool {
    line.contains(END_OF_SENTENCE)
}

pub fn is_silence(token: &str) -> bool {
    token == SILENCE
}

/// Split a line into exactly `expected` fields.
pub(crate) fn split_fields<'a>(
    line: &'a str,
    separator: char,
    expected: usize,
    line_number: usize,
) -> Result<Vec<&'a str>, CorpusError> {
    let fields: Vec<&str> = line.split(separator).collect();
    if fields.len() != expected {
        return Err(CorpusError::MalformedLine {
            line: line_number,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// Replace pause punctuation with silence markers.
///
/// Commas, semicolons and double quotes become ` <sil> `. A trailing period,
/// comma or semicolon becomes a trailing silence marker rather than being dropped.
pub fn replace_punct_with_sil(text: &str) -> String {
    let padded = format!(" {SILENCE} ");
    let mut replaced = text.replace([',', ';', '"'], &padded);

    let trimmed_len = replaced.trim_end().len();
    replaced.truncate(trimmed_len);
    if replaced.ends_with(['.', ',', ';']) {
        replaced.pop();
        replaced.push(' ');
        replaced.push_str(SILENCE);
    }
    replaced
}

/// Collapse runs of whitespace to single spaces and trim both ends.
pub fn remove_extra_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
