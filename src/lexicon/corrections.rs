use std::path::Path;

use serde::Deserialize;

use crate::CorpusError;

const BUILTIN_CORRECTIONS: &str = include_str!("../../data/manual_corrections.json");

/// An entry inserted under a key that does not exist in the raw lexicon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyntheticEntry {
    pub key: String,
    pub phones: String,
}

/// The pronunciation chosen for a word that has several senses.
///
/// `sense` is either a sense-indexed key such as `WITH(2)` or the bare word
/// itself when the unindexed pronunciation is the one to keep.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PreferredSense {
    pub word: String,
    pub sense: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Hand-curated edits applied to the raw lexicon before heteronym removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ManualCorrections {
    #[serde(default)]
    pub synthetic: Vec<SyntheticEntry>,
    #[serde(default)]
    pub preferred: Vec<PreferredSense>,
}

impl ManualCorrections {
    /// The correction table shipped with the crate.
    pub fn builtin() -> Result<Self, CorpusError> {
        Self::from_json(BUILTIN_CORRECTIONS)
    }

    /// Load a replacement correction table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| e.in_file(path))
    }

    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let mut corrections: Self = serde_json::from_str(json)
            .map_err(|e| CorpusError::Config(format!("Failed to parse corrections: {e}")))?;
        for entry in &mut corrections.synthetic {
            entry.key = entry.key.to_uppercase();
        }
        for preferred in &mut corrections.preferred {
            preferred.word = preferred.word.to_uppercase();
            preferred.sense = preferred.sense.to_uppercase();
        }
        Ok(corrections)
    }
}

#[cfg(test)]
mod tests {
    use super::ManualCorrections;

    #[test]
    fn builtin_table_parses() {
        let corrections = ManualCorrections::builtin().expect("builtin table should parse");
        let keys: Vec<&str> = corrections.synthetic.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["THE_VOWEL", "THE_CONSONANT"]);

        let with = corrections
            .preferred
            .iter()
            .find(|p| p.word == "WITH")
            .expect("WITH should be corrected");
        assert_eq!(with.sense, "WITH(2)");
    }

    #[test]
    fn keys_are_uppercased() {
        let corrections = ManualCorrections::from_json(
            r#"{"preferred": [{"word": "to", "sense": "to(2)"}]}"#,
        )
        .unwrap();
        assert!(corrections.synthetic.is_empty());
        assert_eq!(corrections.preferred[0].word, "TO");
        assert_eq!(corrections.preferred[0].sense, "TO(2)");
        assert_eq!(corrections.preferred[0].note, None);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(ManualCorrections::from_json("{\"preferred\": 3}").is_err());
    }
}
