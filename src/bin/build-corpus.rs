use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use tts_corpus::corpus::{convert, BuildConfigBuilder, CorpusBuilder};
use tts_corpus::filter::FilterParams;
use tts_corpus::lexicon::{CmuDictionary, ManualCorrections};
use tts_corpus::sink::CsvSink;
use tts_corpus::sources::LjSpeechParser;

#[derive(Parser, Debug)]
#[clap(name = "build-corpus", version, about = "Build phonemised text-normalisation corpora")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse, filter and phonemise semiotic-class files into a training table.
    Build(BuildArgs),

    /// Turn one semiotic-class file into an `original,normalised` table.
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Directory holding the semiotic-class source files.
    #[clap(long)]
    source: PathBuf,

    /// CSV file the corpus is appended to.
    #[clap(long)]
    target: PathBuf,

    /// CMU-format pronunciation dictionary.
    #[clap(long)]
    dictionary: PathBuf,

    /// LJSpeech metadata file to mix into the primary stream.
    #[clap(long)]
    ljspeech: Option<PathBuf>,

    /// Stop after this many sentences.
    #[clap(long, default_value_t = 20_000)]
    target_sentences: usize,

    /// Inject one LJSpeech sentence per this many primary sentences.
    #[clap(long, default_value_t = 20)]
    injection_interval: usize,

    /// Only source files whose name starts with this prefix are read.
    #[clap(long, default_value = "output-")]
    source_prefix: String,

    /// JSON file overriding the filter thresholds.
    #[clap(long)]
    filter_config: Option<PathBuf>,

    /// JSON file replacing the built-in manual correction table.
    #[clap(long)]
    corrections: Option<PathBuf>,

    /// Seed for the filter's random draws.
    #[clap(long)]
    seed: Option<u64>,

    /// Truncate the target file instead of appending to it.
    #[clap(long)]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// The file to turn into a CSV.
    #[clap(long)]
    source: PathBuf,

    /// Where to save the CSV.
    #[clap(long)]
    target: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Build(args) => build(args),
        Command::Convert(args) => {
            let mut sink = CsvSink::create(&args.target)?;
            convert(&args.source, &mut sink)?;
            Ok(())
        }
    }
}

fn build(args: BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();

    let corrections = match &args.corrections {
        Some(path) => ManualCorrections::load(path)?,
        None => ManualCorrections::builtin()?,
    };
    let dictionary = CmuDictionary::prepare(&args.dictionary, &corrections)?;
    log::info!(
        "Dictionary ready with {} entries in {:.2?}",
        dictionary.len(),
        start.elapsed()
    );

    let filter = match &args.filter_config {
        Some(path) => FilterParams::load(path)?,
        None => FilterParams::default(),
    };
    let mut config = BuildConfigBuilder::default();
    config
        .target_sentences(args.target_sentences)
        .injection_interval(args.injection_interval)
        .source_prefix(args.source_prefix)
        .filter(filter);
    if let Some(seed) = args.seed {
        config.seed(seed);
    }
    let config = config.build()?;

    let mut builder = CorpusBuilder::new(&dictionary, config);
    if let Some(path) = &args.ljspeech {
        builder.load_auxiliary(&LjSpeechParser::new(), path)?;
    }

    let mut sink = if args.overwrite {
        CsvSink::create(&args.target)?
    } else {
        CsvSink::new(&args.target)
    };
    let summary = builder.build(&args.source, &mut sink)?;

    println!(
        "Wrote {} sentences ({} from LJSpeech) from {} files to {} in {:.2?}",
        summary.sentences_written,
        summary.auxiliary_injected,
        summary.files_processed,
        args.target.display(),
        start.elapsed()
    );
    println!(
        "Rejected: {} silent, {} short, {} without normalisation, {} out of vocabulary",
        summary.filter.only_silence,
        summary.filter.short,
        summary.filter.uninteresting,
        summary.filter.out_of_vocabulary
    );
    Ok(())
}
