use std::collections::{hash_map, HashMap, HashSet};
use std::path::Path;

use super::corrections::ManualCorrections;
use crate::{CorpusError, Lexicon, LexiconSource};

/// Lines starting with this prefix are comments in CMU-format lexicons.
pub const COMMENT_PREFIX: &str = ";;;";

/// A CMU-format pronunciation dictionary.
///
/// Keys are upper-cased word forms, optionally sense-indexed (`WORD(2)`) until
/// [`remove_heteronyms`](LexiconSource::remove_heteronyms) runs. Values are
/// space-separated phones with stress digits.
#[derive(Debug, Default, Clone)]
pub struct CmuDictionary {
    entries: HashMap<String, String>,
}

impl CmuDictionary {
    /// Load a lexicon and run the full preparation sequence.
    ///
    /// Corrections run before heteronym removal, otherwise the words they fix
    /// would be dropped as ambiguous.
    pub fn prepare(path: &Path, corrections: &ManualCorrections) -> Result<Self, CorpusError> {
        let mut dictionary = Self::load(path)?;
        dictionary.apply_manual_corrections(corrections)?;
        dictionary.remove_heteronyms();
        Ok(dictionary)
    }

    /// Parse lexicon text. Comment and blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, CorpusError> {
        let mut entries = HashMap::new();
        for (idx, line) in text.lines().enumerate() {
            if line.starts_with(COMMENT_PREFIX) || line.trim().is_empty() {
                continue;
            }
            let (word, phones) = line
                .split_once(' ')
                .map(|(w, p)| (w.trim(), p.trim()))
                .filter(|(w, p)| !w.is_empty() && !p.is_empty())
                .ok_or_else(|| CorpusError::MalformedDictionaryLine {
                    line: idx + 1,
                    content: line.to_string(),
                })?;
            entries.insert(word.to_uppercase(), phones.to_string());
        }
        Ok(Self { entries })
    }

    /// Apply the curated correction table.
    ///
    /// Synthetic entries are inserted as-is. For each preferred sense, the
    /// chosen pronunciation is promoted to the bare word and every
    /// sense-indexed variant of that word is deleted.
    pub fn apply_manual_corrections(
        &mut self,
        corrections: &ManualCorrections,
    ) -> Result<(), CorpusError> {
        for entry in &corrections.synthetic {
            self.entries.insert(entry.key.clone(), entry.phones.clone());
        }

        let mut chosen = Vec::with_capacity(corrections.preferred.len());
        for preferred in &corrections.preferred {
            let phones = self
                .entries
                .get(&preferred.sense)
                .ok_or_else(|| CorpusError::MissingCorrectionKey(preferred.sense.clone()))?;
            chosen.push((preferred.word.clone(), phones.clone()));
        }

        let corrected: HashSet<&str> = chosen.iter().map(|(word, _)| word.as_str()).collect();
        let before = self.entries.len();
        self.entries
            .retain(|key, _| !matches!(split_sense(key), Some(base) if corrected.contains(base)));
        log::debug!(
            "Manual corrections removed {} sense-indexed entries",
            before - self.entries.len()
        );

        for (word, phones) in chosen {
            self.entries.insert(word, phones);
        }
        log::info!(
            "Applied {} synthetic entries and {} preferred senses",
            corrections.synthetic.len(),
            corrections.preferred.len()
        );
        Ok(())
    }

    /// Number of entries in the dictionary
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl Lexicon for CmuDictionary {
    fn lookup(&self, word: &str) -> Option<&str> {
        self.entries.get(&word.to_uppercase()).map(String::as_str)
    }
}

impl LexiconSource for CmuDictionary {
    /// CMU dict is distributed as Latin-1, so bytes are decoded one-to-one.
    fn load(path: &Path) -> Result<Self, CorpusError> {
        let bytes = std::fs::read(path).map_err(|e| CorpusError::from(e).in_file(path))?;
        let text = decode_latin1(&bytes);
        let dictionary = Self::parse(&text).map_err(|e| e.in_file(path))?;
        log::info!(
            "Loaded {} dictionary entries from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    fn remove_heteronyms(&mut self) {
        let ambiguous: HashSet<String> = self
            .entries
            .keys()
            .filter_map(|key| split_sense(key))
            .map(str::to_string)
            .collect();

        let before = self.entries.len();
        self.entries
            .retain(|key, _| split_sense(key).is_none() && !ambiguous.contains(key));
        log::info!(
            "Removed {} heteronym entries ({} words), {} remain",
            before - self.entries.len(),
            ambiguous.len(),
            self.entries.len()
        );
    }
}

/// Return the bare word of a sense-indexed key such as `WORD(12)`.
pub fn split_sense(key: &str) -> Option<&str> {
    let inner = key.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let index = &inner[open + 1..];
    if open == 0 || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(&inner[..open])
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::{decode_latin1, split_sense, CmuDictionary};
    use crate::lexicon::corrections::{ManualCorrections, PreferredSense, SyntheticEntry};
    use crate::{CorpusError, Lexicon, LexiconSource};
    use std::io::Write;

    const LEXICON: &str = ";;; # CMUdict  --  Major Version: 0.07
;;; comment line
CAT  K AE1 T
DOG  D AO1 G
READ  R EH1 D
READ(1)  R IY1 D
LIVE(1)  L IH1 V
LIVE(2)  L AY1 V
WITH  W IH1 DH
WITH(1)  W IH0 DH
WITH(2)  W IH1 TH
WITH(3)  W IH0 TH
IN  IH0 N
IN(1)  IH1 N
";

    fn corrections() -> ManualCorrections {
        ManualCorrections {
            synthetic: vec![SyntheticEntry {
                key: "THE_VOWEL".to_string(),
                phones: "DH IY0".to_string(),
            }],
            preferred: vec![
                PreferredSense {
                    word: "WITH".to_string(),
                    sense: "WITH(2)".to_string(),
                    note: None,
                },
                PreferredSense {
                    word: "IN".to_string(),
                    sense: "IN".to_string(),
                    note: None,
                },
            ],
        }
    }

    #[test]
    fn parses_entries_and_skips_comments() {
        let dict = CmuDictionary::parse(LEXICON).unwrap();
        assert_eq!(dict.len(), 12);
        assert_eq!(dict.lookup("cat"), Some("K AE1 T"));
        assert_eq!(dict.lookup("Cat"), Some("K AE1 T"));
        assert_eq!(dict.lookup("unicorn"), None);
    }

    #[test]
    fn rejects_lines_without_phones() {
        let err = CmuDictionary::parse("CAT  K AE1 T\nBROKEN\n").unwrap_err();
        assert!(matches!(
            err,
            CorpusError::MalformedDictionaryLine { line: 2, .. }
        ));
    }

    #[test]
    fn recognises_sense_suffixes() {
        assert_eq!(split_sense("READ(1)"), Some("READ"));
        assert_eq!(split_sense("READ(12)"), Some("READ"));
        assert_eq!(split_sense("READ"), None);
        assert_eq!(split_sense("READ()"), None);
        assert_eq!(split_sense("(1)"), None);
        assert_eq!(split_sense("READ(A)"), None);
    }

    #[test]
    fn heteronym_removal_leaves_no_sense_keys() {
        let mut dict = CmuDictionary::parse(LEXICON).unwrap();
        dict.remove_heteronyms();

        assert!(dict.iter().all(|(key, _)| split_sense(key).is_none()));
        assert_eq!(dict.lookup("READ"), None);
        assert_eq!(dict.lookup("LIVE"), None);
        assert_eq!(dict.lookup("WITH"), None);
        assert_eq!(dict.lookup("CAT"), Some("K AE1 T"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn corrected_words_survive_heteronym_removal() {
        let mut dict = CmuDictionary::parse(LEXICON).unwrap();
        dict.apply_manual_corrections(&corrections()).unwrap();
        dict.remove_heteronyms();

        assert_eq!(dict.lookup("with"), Some("W IH1 TH"));
        assert_eq!(dict.lookup("in"), Some("IH0 N"));
        assert_eq!(dict.lookup("THE_VOWEL"), Some("DH IY0"));
        assert_eq!(dict.lookup("WITH(2)"), None);
        assert_eq!(dict.lookup("READ"), None);
    }

    #[test]
    fn builtin_corrections_resolve_to_their_chosen_sense() {
        let mut lexicon = String::new();
        let builtin = ManualCorrections::builtin().unwrap();
        for (i, preferred) in builtin.preferred.iter().enumerate() {
            lexicon.push_str(&format!("{}  X{i}\n", preferred.word));
            lexicon.push_str(&format!("{}(1)  Y{i}\n", preferred.word));
            lexicon.push_str(&format!("{}(2)  Z{i}\n", preferred.word));
        }

        let mut dict = CmuDictionary::parse(&lexicon).unwrap();
        let raw = dict.clone();
        dict.apply_manual_corrections(&builtin).unwrap();
        dict.remove_heteronyms();

        for preferred in &builtin.preferred {
            assert_eq!(
                dict.lookup(&preferred.word),
                raw.lookup(&preferred.sense),
                "{} should use {}",
                preferred.word,
                preferred.sense
            );
        }
        assert_eq!(dict.lookup("THE_CONSONANT"), Some("DH AH0"));
    }

    #[test]
    fn missing_correction_key_is_fatal() {
        let mut dict = CmuDictionary::parse("CAT  K AE1 T\n").unwrap();
        let err = dict.apply_manual_corrections(&corrections()).unwrap_err();
        assert!(matches!(err, CorpusError::MissingCorrectionKey(key) if key == "WITH(2)"));
    }

    #[test]
    fn loads_latin1_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b";;; header\nCAF\xc9  K AE0 F EY1\n").unwrap();

        let dict = CmuDictionary::load(file.path()).unwrap();
        assert_eq!(dict.lookup("café"), Some("K AE0 F EY1"));
        assert_eq!(decode_latin1(b"\xe9"), "é");
    }
}
