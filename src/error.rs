use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CorpusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Malformed dictionary entry on line {line}: {content:?}")]
    MalformedDictionaryLine { line: usize, content: String },
    #[error("Malformed corpus line {line}: expected {expected} fields, found {found}")]
    MalformedLine {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Manual correction refers to '{0}', which is not in the dictionary")]
    MissingCorrectionKey(String),
    #[error("'{0}' is not in the dictionary. Sentences must be filtered before phonemisation.")]
    OutOfVocabulary(String),
    #[error("{}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: Box<CorpusError>,
    },
}

impl CorpusError {
    /// Tag an error with the file that was being processed.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        CorpusError::Source {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
