use crate::engine::transform::TransformParams;
use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead;
use thiserror::Error;
use tracing::debug;

/// Per-parameter initial step for the rotation angles.
pub const ANGLE_STEP: f64 = 0.1;
/// Per-parameter initial step for the translation offsets.
pub const OFFSET_STEP: f64 = 1.0;

/// Step sizes in parameter order (theta, phi, psi, dx, dy, dz).
pub fn step_sizes() -> [f64; 6] {
    [
        ANGLE_STEP,
        ANGLE_STEP,
        ANGLE_STEP,
        OFFSET_STEP,
        OFFSET_STEP,
        OFFSET_STEP,
    ]
}

#[derive(Debug, Error)]
pub enum MinimizerError {
    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Solver finished without producing a parameter vector")]
    NoSolution,
}

/// Converged parameters and the objective value there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizerRun {
    pub params: TransformParams,
    pub value: f64,
}

/// The injected minimizer capability.
///
/// The engine only defines what is fed in (objective, seed, per-parameter
/// step sizes, error-definition scalar) and what is read back; convergence
/// criteria and iteration strategy belong to the implementation. A stub that
/// simply evaluates the objective at the seed satisfies this contract, which
/// keeps the scoring object testable without a real solver.
pub trait Minimizer {
    fn minimise(
        &self,
        objective: &dyn Fn(&TransformParams) -> f64,
        seed: TransformParams,
        steps: [f64; 6],
        errordef: f64,
    ) -> Result<MinimizerRun, MinimizerError>;
}

/// Production minimizer: a Nelder-Mead simplex search.
///
/// The initial simplex is the seed plus one vertex per parameter, displaced
/// by that parameter's step size. The error-definition constant scales the
/// simplex standard-deviation tolerance used as the convergence criterion.
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadMinimizer {
    pub max_iterations: u64,
    pub tolerance_scale: f64,
}

impl Default for NelderMeadMinimizer {
    fn default() -> Self {
        Self {
            max_iterations: 5_000,
            tolerance_scale: 1e-6,
        }
    }
}

struct CostAdapter<'a> {
    objective: &'a dyn Fn(&TransformParams) -> f64,
}

impl CostFunction for CostAdapter<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok((self.objective)(&TransformParams::from_slice(param)))
    }
}

fn build_simplex(seed: TransformParams, steps: [f64; 6]) -> Vec<Vec<f64>> {
    let origin = seed.to_array().to_vec();
    let mut vertices = vec![origin.clone()];
    for (index, step) in steps.iter().enumerate() {
        let mut vertex = origin.clone();
        vertex[index] += step;
        vertices.push(vertex);
    }
    vertices
}

impl Minimizer for NelderMeadMinimizer {
    fn minimise(
        &self,
        objective: &dyn Fn(&TransformParams) -> f64,
        seed: TransformParams,
        steps: [f64; 6],
        errordef: f64,
    ) -> Result<MinimizerRun, MinimizerError> {
        let solver = NelderMead::new(build_simplex(seed, steps))
            .with_sd_tolerance(errordef * self.tolerance_scale)
            .map_err(|e| MinimizerError::Solver(e.to_string()))?;

        let result = Executor::new(CostAdapter { objective }, solver)
            .configure(|state| state.max_iters(self.max_iterations))
            .run()
            .map_err(|e| MinimizerError::Solver(e.to_string()))?;

        let state = result.state();
        debug!(
            iterations = state.get_iter(),
            best_cost = state.get_best_cost(),
            "nelder-mead run finished"
        );
        let best = state.get_best_param().ok_or(MinimizerError::NoSolution)?;
        Ok(MinimizerRun {
            params: TransformParams::from_slice(best),
            value: state.get_best_cost(),
        })
    }
}
