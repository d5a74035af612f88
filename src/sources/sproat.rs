use super::{contains_eos, split_fields, SentenceParser};
use crate::filter::FilterPolicy;
use crate::{CorpusError, Sentence, SILENCE};

/// Normalised field value meaning "same as the original token".
pub const SELF_MARKER: &str = "<self>";

/// Parser for semiotic-class annotated corpora.
///
/// Every line holds one token as `class\toriginal\tnormalised`. Tokens after
/// the last end-of-sentence line form an incomplete sentence and are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SproatParser;

impl SproatParser {
    pub fn new() -> Self {
        Self
    }
}

impl SentenceParser for SproatParser {
    fn parse(&self, text: &str) -> Result<Vec<Sentence>, CorpusError> {
        let mut sentences = Vec::new();
        let mut current = Sentence::default();

        for (idx, line) in text.lines().enumerate() {
            if contains_eos(line) {
                sentences.push(std::mem::take(&mut current).finalise());
                continue;
            }

            let fields = split_fields(line.trim(), '\t', 3, idx + 1)?;
            let (semiotic_class, original) = (fields[0], fields[1]);
            let normalised = normalise_token(original, fields[2]);
            current.push_token(semiotic_class, original, normalised);
        }

        if !current.original.is_empty() {
            log::warn!(
                "Dropping incomplete sentence at end of input: {:?}",
                current.original.trim_end()
            );
        }

        Ok(sentences)
    }

    fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy::Full
    }
}

/// Resolve the `<self>` marker and map bare `sil` to the silence marker.
fn normalise_token<'a>(original: &'a str, normalised: &'a str) -> &'a str {
    let token = if normalised == SELF_MARKER {
        original
    } else {
        normalised
    };
    if token == "sil" {
        SILENCE
    } else {
        token
    }
}
