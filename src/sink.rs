use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{CorpusError, Sentence};

/// Destination for finished sentences.
pub trait SentenceSink {
    /// Persist a batch. Anything written before an error stays written.
    fn write_batch(&mut self, sentences: &[Sentence]) -> Result<(), CorpusError>;
}

impl SentenceSink for Vec<Sentence> {
    fn write_batch(&mut self, sentences: &[Sentence]) -> Result<(), CorpusError> {
        self.extend_from_slice(sentences);
        Ok(())
    }
}

/// Row of the plain conversion table, without phones.
#[derive(Debug, Serialize)]
pub struct NormalisedRecord<'a> {
    pub original: &'a str,
    pub normalised: &'a str,
}

impl<'a> From<&'a Sentence> for NormalisedRecord<'a> {
    fn from(sentence: &'a Sentence) -> Self {
        Self {
            original: &sentence.original,
            normalised: &sentence.normalised,
        }
    }
}

/// CSV file sink opened in append mode for every batch.
///
/// The header row is only written while the file is still empty, so a run
/// that is interrupted keeps every batch flushed so far.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Append to `path`, creating it if needed.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Start from an empty file at `path`, discarding previous contents.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, CorpusError> {
        let path = path.into();
        std::fs::File::create(&path).map_err(|e| CorpusError::from(e).in_file(&path))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append any serialisable rows. The header comes from the row's field names.
    pub fn append<T, I>(&mut self, records: I) -> Result<usize, CorpusError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| CorpusError::from(e).in_file(&self.path))?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        let mut written = 0;
        for record in records {
            writer.serialize(record)?;
            written += 1;
        }
        writer.flush()?;
        log::debug!("Appended {written} rows to {}", self.path.display());
        Ok(written)
    }
}

impl SentenceSink for CsvSink {
    fn write_batch(&mut self, sentences: &[Sentence]) -> Result<(), CorpusError> {
        self.append(sentences)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CsvSink, NormalisedRecord, SentenceSink};
    use crate::Sentence;

    fn phonemised(original: &str, normalised: &str, phones: &str) -> Sentence {
        let mut sentence = Sentence::new(original, normalised);
        sentence.semiotic_classes.insert("PLAIN".to_string());
        sentence.phonemised = Some(phones.to_string());
        sentence
    }

    #[test]
    fn header_is_written_once_across_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        let mut sink = CsvSink::new(&path);

        sink.write_batch(&[phonemised("cat", "cat", "<w> K AE1 T <w>")])
            .unwrap();
        sink.write_batch(&[phonemised("Hi, cat", "hi <sil> cat", "<w> HH AY1 <w>")])
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "original,normalised,phonemised\n\
             cat,cat,<w> K AE1 T <w>\n\
             \"Hi, cat\",hi <sil> cat,<w> HH AY1 <w>\n"
        );
    }

    #[test]
    fn appends_to_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.csv");
        CsvSink::new(&path)
            .write_batch(&[phonemised("a", "a", "<w> AH0 <w>")])
            .unwrap();
        CsvSink::new(&path)
            .write_batch(&[phonemised("b", "b", "<w> B IY1 <w>")])
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("original,normalised").count(), 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn create_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        std::fs::write(&path, "stale\n").unwrap();

        let sentence = Sentence::new("2 cats", "two cats");
        let mut sink = CsvSink::create(&path).unwrap();
        let written = sink.append([NormalisedRecord::from(&sentence)]).unwrap();

        assert_eq!(written, 1);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "original,normalised\n2 cats,two cats\n"
        );
    }

    #[test]
    fn vec_sink_collects() {
        let mut sink: Vec<Sentence> = Vec::new();
        sink.write_batch(&[Sentence::new("a", "a")]).unwrap();
        assert_eq!(sink.len(), 1);
    }
}
