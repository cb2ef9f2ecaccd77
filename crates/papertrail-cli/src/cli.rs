use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use papertrail_diff::{Granularity, Strategy};
use papertrail_types::InputFormat;

#[derive(Parser)]
#[command(
    name = "papertrail",
    about = "Section-aware diffs between versions of a parsed paper",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two versions of a paper
    Diff(DiffArgs),
    /// Print the word similarity of two text files
    Similarity(SimilarityArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    #[arg(long)]
    pub strategy: Option<StrategyArg>,
    #[arg(long)]
    pub granularity: Option<GranularityArg>,
    /// Keep the raw minimal diff instead of merging it into readable chunks
    #[arg(long)]
    pub no_cleanup: bool,
    #[arg(long, default_value = "document")]
    pub input_format: InputFormatArg,
    /// Similarity needed to match a retitled section in place
    #[arg(long)]
    pub threshold: Option<f64>,
    /// TOML file with diff settings; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct SimilarityArgs {
    pub old: PathBuf,
    pub new: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyArg {
    Aligned,
    Positional,
    Flattened,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Aligned => Strategy::AlignedSections,
            StrategyArg::Positional => Strategy::PositionalSections,
            StrategyArg::Flattened => Strategy::FlattenedWholeDocument,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum GranularityArg {
    Char,
    Word,
    Line,
    Sentence,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Char => Granularity::Char,
            GranularityArg::Word => Granularity::Word,
            GranularityArg::Line => Granularity::Line,
            GranularityArg::Sentence => Granularity::Sentence,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormatArg {
    Document,
    LabeledData,
    ExtractedMetadata,
}

impl From<InputFormatArg> for InputFormat {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Document => InputFormat::Document,
            InputFormatArg::LabeledData => InputFormat::LabeledData,
            InputFormatArg::ExtractedMetadata => InputFormat::ExtractedMetadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_diff() {
        let cli = Cli::try_parse_from(["papertrail", "diff", "old.json", "new.json"]).unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.old, PathBuf::from("old.json"));
            assert_eq!(args.new, PathBuf::from("new.json"));
            assert_eq!(args.strategy, None);
            assert_eq!(args.input_format, InputFormatArg::Document);
            assert!(!args.no_cleanup);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_diff_options() {
        let cli = Cli::try_parse_from([
            "papertrail", "diff", "a.json", "b.json",
            "--strategy", "flattened",
            "--granularity", "sentence",
            "--no-cleanup",
            "--threshold", "0.7",
        ])
        .unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.strategy, Some(StrategyArg::Flattened));
            assert_eq!(args.granularity, Some(GranularityArg::Sentence));
            assert!(args.no_cleanup);
            assert_eq!(args.threshold, Some(0.7));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_input_format() {
        let cli = Cli::try_parse_from([
            "papertrail", "diff", "a.json", "b.json", "--input-format", "labeled-data",
        ])
        .unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(InputFormat::from(args.input_format), InputFormat::LabeledData);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::try_parse_from([
            "papertrail", "diff", "a.json", "b.json", "--config", "papertrail.toml",
        ])
        .unwrap();
        if let Command::Diff(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("papertrail.toml")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn reject_unknown_strategy() {
        assert!(Cli::try_parse_from([
            "papertrail", "diff", "a.json", "b.json", "--strategy", "fuzzy",
        ])
        .is_err());
    }

    #[test]
    fn diff_needs_two_files() {
        assert!(Cli::try_parse_from(["papertrail", "diff", "a.json"]).is_err());
    }

    #[test]
    fn parse_similarity() {
        let cli = Cli::try_parse_from(["papertrail", "similarity", "a.txt", "b.txt"]).unwrap();
        assert!(matches!(cli.command, Command::Similarity(_)));
    }

    #[test]
    fn strategy_mapping() {
        assert_eq!(Strategy::from(StrategyArg::Aligned), Strategy::AlignedSections);
        assert_eq!(Strategy::from(StrategyArg::Positional), Strategy::PositionalSections);
        assert_eq!(Strategy::from(StrategyArg::Flattened), Strategy::FlattenedWholeDocument);
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["papertrail", "--verbose", "similarity", "a", "b"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["papertrail", "diff", "a", "b", "--format", "json"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
