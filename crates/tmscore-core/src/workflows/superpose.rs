use crate::engine::correspondence::MatchMode;
use crate::engine::error::EngineError;
use crate::engine::minimizer::NelderMeadMinimizer;
use crate::engine::scoring::{Aligning, ScoreMode, Seeding};
use crate::engine::transform::TransformParams;
use nalgebra::Matrix4;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Settings for a complete superposition run.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperposeConfig {
    pub match_mode: MatchMode,
    pub score_mode: ScoreMode,
    pub chain1: char,
    pub chain2: char,
    pub max_iterations: u64,
    /// When set, write a transformed copy of the second structure here.
    pub output: Option<PathBuf>,
}

impl Default for SuperposeConfig {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Index,
            score_mode: ScoreMode::TmScore,
            chain1: 'A',
            chain2: 'A',
            max_iterations: 5_000,
            output: None,
        }
    }
}

/// Outcome of a superposition run, evaluated at the converged optimum.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperposeReport {
    pub params: TransformParams,
    pub tm_score: f64,
    pub rmsd: f64,
    pub matrix: Matrix4<f64>,
    /// Reference atom count N (see `Correspondence::n`).
    pub n: usize,
    /// Matched atom pairs actually scored.
    pub matched: usize,
}

/// Runs the full superposition procedure for two structure files.
///
/// # Errors
///
/// Fails when either structure cannot be loaded, the correspondence is
/// empty, the minimizer fails, or the transformed copy cannot be written.
#[instrument(skip_all, name = "superpose_workflow")]
pub fn run(
    path1: &Path,
    path2: &Path,
    config: &SuperposeConfig,
) -> Result<SuperposeReport, EngineError> {
    info!(
        structure_1 = %path1.display(),
        structure_2 = %path2.display(),
        mode = ?config.match_mode,
        objective = ?config.score_mode,
        "starting superposition"
    );

    let mut scorer = Aligning::from_paths(
        path1,
        path2,
        config.match_mode,
        config.score_mode,
        config.chain1,
        config.chain2,
    )?;
    info!(
        n = scorer.n(),
        matched = scorer.matched_len(),
        "correspondence established"
    );

    let minimizer = NelderMeadMinimizer {
        max_iterations: config.max_iterations,
        ..Default::default()
    };
    let outcome = scorer.optimise(&minimizer, Seeding::Restart)?;

    if let Some(output) = &config.output {
        scorer.write(&outcome.params, output)?;
        info!(output = %output.display(), "transformed copy written");
    }

    Ok(SuperposeReport {
        params: outcome.params,
        tm_score: outcome.tm_score,
        rmsd: outcome.rmsd,
        matrix: Aligning::get_matrix(&outcome.params),
        n: scorer.n(),
        matched: scorer.matched_len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    fn pdb_with_cas(points: &[(f64, f64, f64)]) -> String {
        let mut out = String::from("HEADER    SYNTHETIC\n");
        for (k, &(x, y, z)) in points.iter().enumerate() {
            writeln!(
                out,
                "ATOM  {:>5}  CA  GLY A{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
                k + 1,
                k + 1,
                x,
                y,
                z
            )
            .unwrap();
        }
        out.push_str("END\n");
        out
    }

    fn base_points() -> Vec<(f64, f64, f64)> {
        vec![
            (0.0, 0.0, 0.0),
            (1.5, 0.2, -0.3),
            (2.9, 1.1, 0.4),
            (4.1, 1.8, 1.2),
        ]
    }

    #[test]
    fn identical_structures_superpose_perfectly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("same.pdb");
        std::fs::write(&path, pdb_with_cas(&base_points())).unwrap();

        let report = run(&path, &path, &SuperposeConfig::default()).unwrap();
        assert!(report.tm_score > 0.999, "tm = {}", report.tm_score);
        assert!(report.rmsd < 1e-3, "rmsd = {}", report.rmsd);
        assert_eq!(report.n, 4);
        assert_eq!(report.matched, 4);
    }

    #[test]
    fn translated_structure_converges_to_the_known_offset() {
        let offset = (3.0, -1.0, 2.0);
        let shifted: Vec<_> = base_points()
            .iter()
            .map(|&(x, y, z)| (x - offset.0, y - offset.1, z - offset.2))
            .collect();

        let dir = tempfile::tempdir().unwrap();
        let path1 = dir.path().join("fixed.pdb");
        let path2 = dir.path().join("moving.pdb");
        let output = dir.path().join("aligned.pdb");
        std::fs::write(&path1, pdb_with_cas(&base_points())).unwrap();
        std::fs::write(&path2, pdb_with_cas(&shifted)).unwrap();

        let config = SuperposeConfig {
            score_mode: ScoreMode::Rmsd,
            output: Some(output.clone()),
            ..Default::default()
        };
        let report = run(&path1, &path2, &config).unwrap();

        assert!((report.params.dx - offset.0).abs() < 1e-2);
        assert!((report.params.dy - offset.1).abs() < 1e-2);
        assert!((report.params.dz - offset.2).abs() < 1e-2);
        assert!(report.rmsd < 1e-2, "rmsd = {}", report.rmsd);

        // The written copy carries the moving atoms onto the fixed ones.
        let written = std::fs::read_to_string(&output).unwrap();
        let first_ca = written.lines().nth(1).unwrap();
        let x: f64 = first_ca[30..38].trim().parse().unwrap();
        assert!((x - 0.0).abs() < 2e-2, "x = {x}");
    }

    #[test]
    fn missing_file_surfaces_a_structure_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.pdb");
        let err = run(&missing, &missing, &SuperposeConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::Structure { .. }));
    }
}
