use crate::core::io::pdb::{self, PdbFile};
use crate::core::io::traits::StructureFile;
use crate::core::models::structure::Chain;
use crate::engine::correspondence::{Correspondence, MatchMode};
use crate::engine::error::EngineError;
use crate::engine::minimizer::{Minimizer, step_sizes};
use crate::engine::transform::{self, TransformParams};
use nalgebra::{Matrix4, Vector3};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Which objective the optimizer minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    /// Minimize the (negated) unnormalized TM-score sum.
    TmScore,
    /// Minimize the summed squared deviation.
    Rmsd,
}

impl ScoreMode {
    /// Error-definition constant handed to the minimizer for this objective.
    pub fn errordef(self) -> f64 {
        match self {
            ScoreMode::TmScore => 0.01,
            ScoreMode::Rmsd => 0.05,
        }
    }
}

/// How `optimise` chooses its starting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seeding {
    /// Reseed from the geometric initial guess.
    Restart,
    /// Reseed from the last converged parameters.
    Continue,
}

/// Result of a completed optimisation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimiseOutcome {
    pub params: TransformParams,
    pub objective_value: f64,
    pub tm_score: f64,
    pub rmsd: f64,
}

/// The scoring object: matched coordinates of two structures, the `d0` scale
/// derived from them, and the current-best transform parameters.
///
/// `coord1` is fixed, `coord2` is moving; a candidate transform is always
/// applied to `coord2`. The current-best parameters are mutated only by a
/// completed [`Aligning::optimise`] call.
///
/// `d0 = 1.24 * (N - 15)^(1/3) - 1.8` is cached squared at construction.
/// For N <= 15 the cube root goes non-positive and `d0` approaches or
/// crosses zero, which makes the TM-score penalty extreme or ill-defined.
/// That is a known degenerate-input condition of the metric and is left
/// as-is rather than silently clamped.
#[derive(Debug, Clone)]
pub struct Aligning {
    correspondence: Correspondence,
    d02: f64,
    mode: ScoreMode,
    source: Option<PathBuf>,
    best: TransformParams,
}

impl Aligning {
    /// Builds a scorer from two structure files.
    ///
    /// # Errors
    ///
    /// Fails when either file cannot be parsed, a selected chain is missing,
    /// or no marker atoms match between the two chains. No partial object is
    /// ever produced.
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        path1: P,
        path2: Q,
        match_mode: MatchMode,
        score_mode: ScoreMode,
        chain1: char,
        chain2: char,
    ) -> Result<Self, EngineError> {
        let first = load_chain(path1.as_ref(), chain1)?;
        let second = load_chain(path2.as_ref(), chain2)?;
        let correspondence = Correspondence::build(match_mode, &first, &second)?;

        let mut scorer = Self::from_correspondence(correspondence, score_mode);
        scorer.source = Some(path2.as_ref().to_path_buf());
        Ok(scorer)
    }

    /// Builds a scorer directly from a prebuilt correspondence.
    ///
    /// The resulting object cannot [`Aligning::write`] a transformed copy,
    /// since there is no source file to rewrite.
    pub fn from_correspondence(correspondence: Correspondence, mode: ScoreMode) -> Self {
        let d0 = 1.24 * (correspondence.n as f64 - 15.0).cbrt() - 1.8;
        Self {
            correspondence,
            d02: d0 * d0,
            mode,
            source: None,
            best: TransformParams::default(),
        }
    }

    /// The reference atom count N used for `d0` and normalization.
    pub fn n(&self) -> usize {
        self.correspondence.n
    }

    /// Number of matched atom pairs actually stacked.
    pub fn matched_len(&self) -> usize {
        self.correspondence.matched_len()
    }

    pub fn d0_squared(&self) -> f64 {
        self.d02
    }

    pub fn score_mode(&self) -> ScoreMode {
        self.mode
    }

    /// Parameters of the last completed optimisation (zeros before any run).
    pub fn best_params(&self) -> TransformParams {
        self.best
    }

    /// The 4x4 homogeneous transform for the given parameters.
    pub fn get_matrix(params: &TransformParams) -> Matrix4<f64> {
        transform::matrix_from(params)
    }

    fn squared_deviations(&self, params: &TransformParams) -> Vec<f64> {
        let moved = transform::matrix_from(params) * &self.correspondence.coord2;
        let diff = moved - &self.correspondence.coord1;
        (0..diff.ncols())
            .map(|c| {
                let col = diff.column(c);
                // The affine row's residual is identically zero and not counted.
                debug_assert!(col[3].abs() < 1e-9);
                col[0] * col[0] + col[1] * col[1] + col[2] * col[2]
            })
            .collect()
    }

    /// Unnormalized TM sum: `-sum_i 1 / (1 + d_i^2 / d0^2)`. Pure.
    pub fn tm_sum(&self, params: &TransformParams) -> f64 {
        -self
            .squared_deviations(params)
            .iter()
            .map(|d2| 1.0 / (1.0 + d2 / self.d02))
            .sum::<f64>()
    }

    /// Unnormalized squared-deviation sum. Pure.
    pub fn deviation_sum(&self, params: &TransformParams) -> f64 {
        self.squared_deviations(params).iter().sum()
    }

    /// Normalized TM-score, guaranteed in [0, 1].
    pub fn tmscore(&self, params: &TransformParams) -> f64 {
        -self.tm_sum(params) / self.correspondence.n as f64
    }

    /// Root-mean-square deviation for the given transform.
    pub fn rmsd(&self, params: &TransformParams) -> f64 {
        (self.deviation_sum(params) / self.correspondence.n as f64).sqrt()
    }

    /// The unnormalized objective the optimizer minimizes in this mode.
    pub fn objective_value(&self, params: &TransformParams) -> f64 {
        match self.mode {
            ScoreMode::TmScore => self.tm_sum(params),
            ScoreMode::Rmsd => self.deviation_sum(params),
        }
    }

    /// Crude starting transform from geometry alone.
    ///
    /// Translation is the centroid offset between the matched sets; the
    /// rotation aligns a single global direction vector (2nd matched atom
    /// minus last matched atom) of structure 1 onto structure 2's. The
    /// rotation part is a heuristic seed, not a correctness requirement.
    pub fn get_default_values(&self) -> TransformParams {
        let coord1 = &self.correspondence.coord1;
        let coord2 = &self.correspondence.coord2;
        let ncols = coord1.ncols();

        let diff = coord1 - coord2;
        let mut params = TransformParams::translation(
            diff.row(0).sum() / ncols as f64,
            diff.row(1).sum() / ncols as f64,
            diff.row(2).sum() / ncols as f64,
        );

        let direction = |m: &nalgebra::Matrix4xX<f64>| {
            if ncols < 2 {
                return None;
            }
            let head = m.column(1);
            let tail = m.column(ncols - 1);
            Vector3::new(head[0] - tail[0], head[1] - tail[1], head[2] - tail[2])
                .try_normalize(1e-12)
        };

        match (direction(coord1), direction(coord2)) {
            (Some(vec1), Some(vec2)) => match transform::rotation_between(&vec1, &vec2) {
                Some(rotation) => {
                    let (theta, phi, psi) = transform::euler_angles_from(rotation.matrix());
                    params.theta = theta;
                    params.phi = phi;
                    params.psi = psi;
                }
                None => {
                    warn!("antiparallel orientation vectors; seeding with identity rotation");
                }
            },
            _ => {
                warn!("degenerate orientation vectors; seeding with identity rotation");
            }
        }

        params
    }

    /// Runs the injected minimizer over the 6-parameter space and records the
    /// converged parameters as the new current best.
    ///
    /// # Errors
    ///
    /// A minimizer failure is surfaced as-is; the scorer does not retry with
    /// a different seed, and the current-best parameters stay untouched.
    #[instrument(skip_all, fields(seeding = ?seeding, mode = ?self.mode))]
    pub fn optimise(
        &mut self,
        minimizer: &dyn Minimizer,
        seeding: Seeding,
    ) -> Result<OptimiseOutcome, EngineError> {
        let seed = match seeding {
            Seeding::Restart => self.get_default_values(),
            Seeding::Continue => self.best,
        };

        let errordef = self.mode.errordef();
        let objective = |p: &TransformParams| self.objective_value(p);
        let run = minimizer.minimise(&objective, seed, step_sizes(), errordef)?;

        self.best = run.params;
        let outcome = OptimiseOutcome {
            params: run.params,
            objective_value: run.value,
            tm_score: self.tmscore(&run.params),
            rmsd: self.rmsd(&run.params),
        };
        info!(
            tm_score = outcome.tm_score,
            rmsd = outcome.rmsd,
            "optimisation complete"
        );
        Ok(outcome)
    }

    /// Writes a transformed copy of the moving structure's source file.
    ///
    /// # Errors
    ///
    /// Fails when the scorer was not built from files, or when the rewrite
    /// itself fails.
    pub fn write<P: AsRef<Path>>(
        &self,
        params: &TransformParams,
        output: P,
    ) -> Result<(), EngineError> {
        let source = self.source.as_ref().ok_or(EngineError::NoSourceFile)?;
        pdb::write_transformed(source, output, &transform::matrix_from(params))
            .map_err(EngineError::Write)
    }
}

fn load_chain(path: &Path, chain: char) -> Result<Chain, EngineError> {
    let structure = PdbFile::read_from_path(path).map_err(|source| EngineError::Structure {
        path: path.to_path_buf(),
        source,
    })?;
    structure
        .chain(chain)
        .cloned()
        .ok_or_else(|| EngineError::ChainNotFound {
            path: path.to_path_buf(),
            chain,
        })
}
