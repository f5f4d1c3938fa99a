/*
    compcorpus (Comparison Annotation Corpus)

        Licensed under the GNU General Public License v3
*/

use clap::{Args, Parser, Subcommand};
use std::process::ExitCode;

use compcorpus::*;

/// Builds and normalizes a corpus of comparison annotations
#[derive(Parser)]
#[command(name = "compcorpus", version, about, long_about = None)]
struct Cli {
    /// Configuration file (JSON), missing keys take their defaults
    #[arg(long, global = true)]
    config: Option<String>,

    /// Print verbose debug output to standard error
    #[arg(long, global = true)]
    debug: bool,

    /// Write the run statistics as JSON to this file
    #[arg(long, global = true)]
    stats_json: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file for the tokenized sentences, `-` for standard output
    #[arg(long, default_value = "-")]
    sentences_out: String,

    /// Output file for the annotations
    #[arg(long)]
    annotations_out: Option<String>,

    /// Annotation output format: canonical, json or jsonl
    #[arg(long)]
    dataformat: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert plain text documents with mention graphs (`<file>.json`) from the JDPA corpus
    Jdpa {
        inputs: Vec<String>,

        /// Do not follow coreference chains for arguments outside of the sentence
        #[arg(long)]
        no_coref: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Convert bracket-tagged review files (Jindal and Liu)
    Liu {
        inputs: Vec<String>,

        /// Include comparisons of type 4 (difference)
        #[arg(long)]
        type4: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Convert the review, phrase and relation tables of the USAGE corpus
    Usage {
        reviews: String,
        phrases: String,
        relations: String,

        /// Use the subjective phrase as predicate instead of the aspect
        #[arg(long)]
        subjective_head: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Select comparative sentences from canonical annotation files with a separate sentence table
    Ims {
        /// Tab-separated sentence table (id, sentence)
        sentences: String,
        annotations: Vec<String>,

        /// Drop difference and undefined comparisons, and inferior ranked or superlative ones
        #[arg(long)]
        only_positive: bool,

        /// Drop equatives when only keeping positive comparisons
        #[arg(long)]
        no_equative: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Normalize a sentence file and (optionally) the annotation file alongside it
    Normalize {
        sentences: String,
        annotations: Option<String>,

        /// Collapse labelled entities into placeholder tokens
        #[arg(long)]
        merge_entities: bool,

        /// Split multi-word predicates
        #[arg(long)]
        split_predicate: bool,

        /// Annotate the adjective instead of more/less/as/most/least as predicate
        #[arg(long)]
        annotate_adjective: bool,

        /// Entity order: keep, surface or preferred
        #[arg(long)]
        entity_order: Option<String>,

        /// Maximum number of tokens per sentence
        #[arg(long)]
        token_limit: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check every annotation token against the sentence word at its position
    Validate { sentences: String, annotations: String },
}

fn load_config(cli: &Cli) -> Result<Config, CorpusError> {
    let config = match cli.config.as_deref() {
        Some(filename) => Config::from_file(filename)?,
        None => Config::default(),
    };
    Ok(if cli.debug { config.with_debug(true) } else { config })
}

fn with_dataformat(config: Config, output: &OutputArgs) -> Result<Config, CorpusError> {
    match output.dataformat.as_deref() {
        Some(format) => Ok(config.with_dataformat(DataFormat::try_from(format)?)),
        None => Ok(config),
    }
}

/// Runs one adapter over its inputs, writing every sentence as soon as the adapter hands it over
fn convert(
    format: Format,
    config: Config,
    inputs: &[String],
    output: &OutputArgs,
    stats: &mut Statistics,
) -> Result<(), CorpusError> {
    let config = with_dataformat(config, output)?;
    let mut writer = CorpusWriter::create(&output.sentences_out, output.annotations_out.as_deref(), &config)?;
    format.adapter(config).convert_each(inputs, stats, &mut |annotation: SentenceAnnotation, stats: &mut Statistics| {
        #[cfg(feature = "validation")]
        {
            let problems = validation::validate_self(&annotation);
            validation::report(&annotation, &problems, stats);
        }
        writer.write(&annotation, stats)
    })?;
    writer.flush()
}

fn run(cli: &Cli, stats: &mut Statistics) -> Result<Config, CorpusError> {
    let config = load_config(cli)?;
    match &cli.command {
        Commands::Jdpa {
            inputs,
            no_coref,
            output,
        } => {
            let config = config.clone().with_use_coref(config.use_coref() && !no_coref);
            convert(Format::Jdpa, config, inputs, output, stats)?;
        }
        Commands::Liu { inputs, type4, output } => {
            let config = config.clone().with_use_type4(config.use_type4() || *type4);
            convert(Format::Liu, config, inputs, output, stats)?;
        }
        Commands::Usage {
            reviews,
            phrases,
            relations,
            subjective_head,
            output,
        } => {
            let config = config
                .clone()
                .with_subjective_head(config.subjective_head() || *subjective_head);
            let inputs = [reviews.clone(), phrases.clone(), relations.clone()];
            convert(Format::Usage, config, &inputs, output, stats)?;
        }
        Commands::Ims {
            sentences,
            annotations,
            only_positive,
            no_equative,
            output,
        } => {
            let config = config
                .clone()
                .with_only_positive(config.only_positive() || *only_positive)
                .with_use_equative(config.use_equative() && !no_equative);
            let inputs: Vec<String> = std::iter::once(sentences.clone())
                .chain(annotations.iter().cloned())
                .collect();
            convert(Format::Ims, config, &inputs, output, stats)?;
        }
        Commands::Normalize {
            sentences,
            annotations,
            merge_entities,
            split_predicate,
            annotate_adjective,
            entity_order,
            token_limit,
            output,
        } => {
            let mut config = with_dataformat(config.clone(), output)?
                .with_merge_entities(config.merge_entities() || *merge_entities)
                .with_split_predicate(config.split_predicate() || *split_predicate)
                .with_annotate_adjective(config.annotate_adjective() || *annotate_adjective);
            if let Some(order) = entity_order.as_deref() {
                config = config.with_entity_order(EntityOrder::try_from(order)?);
            }
            if let Some(limit) = token_limit {
                config = config.with_token_limit(*limit);
            }
            let reader = CorpusReader::open(sentences, annotations.as_deref(), &config)?;
            let annotations_out = annotations.as_ref().and(output.annotations_out.as_deref());
            let mut writer = CorpusWriter::create(&output.sentences_out, annotations_out, &config)?;
            Normalizer::new(config).normalize_corpus(reader, &mut writer, stats)?;
        }
        Commands::Validate {
            sentences,
            annotations,
        } => {
            #[cfg(feature = "validation")]
            {
                let reader = CorpusReader::open(sentences, Some(annotations.as_str()), &config)?;
                let invalid = validation::validate_corpus(reader, &config, stats);
                eprintln!("{} invalid annotations", invalid);
            }
            #[cfg(not(feature = "validation"))]
            {
                let _ = (sentences, annotations);
                return Err(CorpusError::OtherError(
                    "compcorpus was built without the validation feature",
                ));
            }
        }
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut stats = Statistics::new();
    let config = match run(&cli, &mut stats) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    stats.finish();
    print!("{}", stats);
    if let Some(filename) = cli.stats_json.as_deref() {
        if let Err(err) = stats.to_json_file(filename, &config) {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
