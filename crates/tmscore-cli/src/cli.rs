use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tmscoring::engine::correspondence::MatchMode;
use tmscoring::engine::scoring::ScoreMode;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "tmscore - optimal rigid-body superposition of two protein structures, scored by TM-score or RMSD.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Reference structure file (kept fixed).
    #[arg(value_name = "STRUCTURE_1")]
    pub structure_1: PathBuf,

    /// Moving structure file (transformed onto the reference).
    #[arg(value_name = "STRUCTURE_2")]
    pub structure_2: PathBuf,

    /// How atom correspondence between the structures is established.
    #[arg(short, long, value_enum)]
    pub mode: Option<MatchModeArg>,

    /// Objective the minimiser drives to an optimum.
    #[arg(long, value_enum)]
    pub objective: Option<ObjectiveArg>,

    /// Chain selector for the reference structure.
    #[arg(long, value_name = "ID")]
    pub chain_1: Option<char>,

    /// Chain selector for the moving structure.
    #[arg(long, value_name = "ID")]
    pub chain_2: Option<char>,

    /// Write a transformed copy of the moving structure to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Settings file in TOML format; command-line flags take precedence.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Cap on minimiser iterations.
    #[arg(long, value_name = "NUM")]
    pub max_iterations: Option<u64>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchModeArg {
    /// Match residues sharing the same sequence number.
    Index,
    /// Match residues through a global pairwise sequence alignment.
    Alignment,
}

impl From<MatchModeArg> for MatchMode {
    fn from(arg: MatchModeArg) -> Self {
        match arg {
            MatchModeArg::Index => MatchMode::Index,
            MatchModeArg::Alignment => MatchMode::Alignment,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveArg {
    /// Maximise the TM-score.
    Tm,
    /// Minimise the RMSD.
    Rmsd,
}

impl From<ObjectiveArg> for ScoreMode {
    fn from(arg: ObjectiveArg) -> Self {
        match arg {
            ObjectiveArg::Tm => ScoreMode::TmScore,
            ObjectiveArg::Rmsd => ScoreMode::Rmsd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_positional_structures_and_flags() {
        let cli = Cli::try_parse_from([
            "tmscore",
            "a.pdb",
            "b.pdb",
            "--mode",
            "alignment",
            "--objective",
            "rmsd",
            "--chain-2",
            "B",
        ])
        .unwrap();
        assert_eq!(cli.structure_1, PathBuf::from("a.pdb"));
        assert_eq!(cli.mode, Some(MatchModeArg::Alignment));
        assert_eq!(cli.objective, Some(ObjectiveArg::Rmsd));
        assert_eq!(cli.chain_2, Some('B'));
        assert_eq!(cli.chain_1, None);
    }
}
