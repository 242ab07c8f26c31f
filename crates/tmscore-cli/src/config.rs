use crate::cli::Cli;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tmscoring::engine::correspondence::MatchMode;
use tmscoring::engine::scoring::ScoreMode;
use tmscoring::workflows::superpose::SuperposeConfig;
use tracing::debug;

/// Settings file contents. Every field is optional; command-line flags take
/// precedence over whatever the file provides.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<String>,
    pub objective: Option<String>,
    #[serde(rename = "chain-1")]
    pub chain_1: Option<char>,
    #[serde(rename = "chain-2")]
    pub chain_2: Option<char>,
    #[serde(rename = "max-iterations")]
    pub max_iterations: Option<u64>,
}

pub fn load(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&raw).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded settings file");
    Ok(config)
}

fn parse_objective(raw: &str) -> Result<ScoreMode> {
    match raw {
        "tm" | "tmscore" => Ok(ScoreMode::TmScore),
        "rmsd" => Ok(ScoreMode::Rmsd),
        other => Err(CliError::Config(format!(
            "unknown objective '{other}' (expected 'tm' or 'rmsd')"
        ))),
    }
}

/// Resolves the effective run settings from CLI flags layered over the
/// optional settings file.
pub fn resolve(cli: &Cli) -> Result<SuperposeConfig> {
    let file = match &cli.config {
        Some(path) => load(path)?,
        None => FileConfig::default(),
    };
    let defaults = SuperposeConfig::default();

    let match_mode = match (cli.mode, &file.mode) {
        (Some(arg), _) => MatchMode::from(arg),
        (None, Some(raw)) => MatchMode::from_str(raw)?,
        (None, None) => defaults.match_mode,
    };
    let score_mode = match (cli.objective, &file.objective) {
        (Some(arg), _) => ScoreMode::from(arg),
        (None, Some(raw)) => parse_objective(raw)?,
        (None, None) => defaults.score_mode,
    };

    Ok(SuperposeConfig {
        match_mode,
        score_mode,
        chain1: cli.chain_1.or(file.chain_1).unwrap_or(defaults.chain1),
        chain2: cli.chain_2.or(file.chain_2).unwrap_or(defaults.chain2),
        max_iterations: cli
            .max_iterations
            .or(file.max_iterations)
            .unwrap_or(defaults.max_iterations),
        output: cli.output.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli_from(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let cli = cli_from(&["tmscore", "a.pdb", "b.pdb"]);
        let config = resolve(&cli).unwrap();
        assert_eq!(config.match_mode, MatchMode::Index);
        assert_eq!(config.score_mode, ScoreMode::TmScore);
        assert_eq!(config.chain1, 'A');
        assert_eq!(config.output, None);
    }

    #[test]
    fn file_settings_apply_and_flags_override_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "mode = \"alignment\"\nobjective = \"rmsd\"\n\"chain-2\" = \"C\"\n\"max-iterations\" = 100\n",
        )
        .unwrap();

        let cli = cli_from(&[
            "tmscore",
            "a.pdb",
            "b.pdb",
            "--config",
            path.to_str().unwrap(),
            "--objective",
            "tm",
        ]);
        let config = resolve(&cli).unwrap();

        assert_eq!(config.match_mode, MatchMode::Alignment);
        // CLI flag beats the file.
        assert_eq!(config.score_mode, ScoreMode::TmScore);
        assert_eq!(config.chain2, 'C');
        assert_eq!(config.max_iterations, 100);
    }

    #[test]
    fn unknown_mode_in_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "mode = \"fuzzy\"\n").unwrap();

        let cli = cli_from(&[
            "tmscore",
            "a.pdb",
            "b.pdb",
            "--config",
            path.to_str().unwrap(),
        ]);
        assert!(resolve(&cli).is_err());
    }

    #[test]
    fn unknown_keys_in_file_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "step-size = 2.0\n").unwrap();

        let cli = cli_from(&[
            "tmscore",
            "a.pdb",
            "b.pdb",
            "--config",
            path.to_str().unwrap(),
        ]);
        assert!(matches!(
            resolve(&cli).unwrap_err(),
            CliError::ConfigParse { .. }
        ));
    }
}
