use super::{remove_extra_spaces, replace_punct_with_sil, SentenceParser};
use crate::filter::FilterPolicy;
use crate::{CorpusError, Sentence};

/// Parser for LJSpeech `metadata.csv` transcripts (`id|original|normalised`).
///
/// Transcripts carry no semiotic classes, so only the vocabulary check
/// applies to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LjSpeechParser;

impl LjSpeechParser {
    pub fn new() -> Self {
        Self
    }
}

impl SentenceParser for LjSpeechParser {
    fn parse(&self, text: &str) -> Result<Vec<Sentence>, CorpusError> {
        // Transcripts contain bare double quotes, so quoting is off.
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'|')
            .quoting(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut sentences = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() != 3 {
                return Err(CorpusError::MalformedLine {
                    line: record.position().map_or(0, |p| p.line() as usize),
                    expected: 3,
                    found: record.len(),
                });
            }
            let original = record[1].trim();
            let normalised = remove_extra_spaces(&replace_punct_with_sil(record[2].trim()));
            sentences.push(Sentence::new(original, normalised));
        }
        Ok(sentences)
    }

    fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy::VocabularyOnly
    }
}
