//! Execution helper that runs an `argmin` solver on a merit problem and
//! returns a solver-agnostic [`RunSummary`].
use argmin::core::{Executor, IterState, Solver, State, TerminationStatus};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin_math::ArgminL2Norm;

use crate::optimization::{
    errors::OptResult,
    lens_optimizer::{
        adapter::ArgMinAdapter,
        traits::OptimizeOptions,
        types::{FnEvalMap, Grad, Theta},
        validation::{validate_best, validate_value},
    },
};

/// Raw result of one solver run, in solver coordinates.
///
/// - `best`: best `z` found (finite).
/// - `cost`: penalized cost at `best`.
/// - `termination`: status as reported by `argmin`.
/// - `iterations` / `fn_evals`: counters from the final state.
/// - `grad_norm`: L2 norm of the last gradient; `None` for derivative-free
///   solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub best: Theta,
    pub cost: f64,
    pub termination: TerminationStatus,
    pub iterations: u64,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

/// Gradient types a solver state may carry.
///
/// L-BFGS keeps a [`Grad`]; Nelder–Mead keeps `()`.
pub trait GradientNorm {
    fn norm(&self) -> Option<f64>;
}

impl GradientNorm for Grad {
    fn norm(&self) -> Option<f64> {
        Some(self.l2_norm())
    }
}

impl GradientNorm for () {
    fn norm(&self) -> Option<f64> {
        None
    }
}

/// Run an `argmin` solver on a merit problem.
///
/// Shared by every method. It wires up:
/// - the merit problem via [`ArgMinAdapter`],
/// - the chosen `Solver` (L-BFGS with either line search, or Nelder–Mead),
/// - the initial point `z0`,
/// - optional observers (behind the `obs_slog` feature),
/// - optional `max_iters` and wall-clock timeout,
///   then executes the solver and collects the final state.
///
/// # Type Parameters
/// - `S`: any `argmin` solver whose problem is `ArgMinAdapter<'a>` and
///   whose state is `IterState<Theta, G, (), (), (), f64>`.
/// - `G`: gradient type held by the state (`Grad` or `()`).
///
/// # Feature flags
/// With `obs_slog` and `opts.verbose`, a terminal slog observer is attached
/// with `ObserverMode::Always`, and the starting cost (and gradient norm,
/// when available) is printed once before the first iteration.
///
/// # Errors
/// - Any `argmin` runtime error, mapped through `From<argmin::core::Error>`;
///   merit errors raised inside the solver come back as their own variants.
/// - [`OptError::MissingBest`](crate::optimization::errors::OptError::MissingBest)
///   or `InvalidBest` if the final state holds no usable point.
pub fn run_solver<'a, S, G>(
    z0: Theta, opts: &OptimizeOptions, problem: ArgMinAdapter<'a>, solver: S,
) -> OptResult<RunSummary>
where
    S: Solver<ArgMinAdapter<'a>, IterState<Theta, G, (), (), (), f64>> + Send + 'static,
    G: GradientNorm + Clone,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&z0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(z0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }
    if let Some(timeout) = opts.timeout {
        optimizer = optimizer.timeout(timeout);
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let fn_evals: FnEvalMap = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad_norm = result.take_gradient().and_then(|g| g.norm());
    let cost = result.get_best_cost();
    let best = validate_best(result.take_best_param())?;
    validate_value(cost)?;
    Ok(RunSummary { best, cost, termination, iterations, fn_evals, grad_norm })
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state(z0: &Theta, problem: &ArgMinAdapter<'_>) -> OptResult<()> {
    let c0 = problem.cost(z0)?;
    let g0n = problem.gradient(z0).ok().map(|g| g.l2_norm());

    eprintln!(
        "init: cost(z0) = {:.6}{}",
        c0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        optics::rays::Rays,
        optimization::{
            lens_optimizer::{
                builders::{build_nelder_mead, build_optimizer_more_thuente},
                traits::{Method, Tolerances},
            },
            merit::{
                demerits::FnDemerit,
                merit_function::{Merit, MeritFunction},
                parameters::{Spacing, Target},
            },
        },
        system::{fixtures::front_stop_singlet, paraxial::ParaxialTrace, system::System},
    };
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // ---------------------------------------------------------------------
    // Scope
    // -----
    // - Both state shapes (`Grad` and `()`) run to a summary.
    // - Iteration caps are honored.
    // ---------------------------------------------------------------------

    fn image_merit(target: f64) -> Merit {
        Merit::new().with_parameter(Spacing::new(Target::Image)).with_demerit(FnDemerit::new(
            "image distance",
            move |s: &System, _: &ParaxialTrace, _: &[Rays]| array![s.image.origin[2] - target],
        ))
    }

    #[test]
    // Purpose
    // -------
    // L-BFGS on an unbounded quadratic reaches the minimum and reports a
    // gradient norm.
    //
    // Given
    // -----
    // - Image spacing starts at 19, target 16.
    //
    // Expect
    // ------
    // - best ≈ 16, cost ≈ 0, grad_norm is Some.
    fn lbfgs_run_reaches_minimum() {
        // Arrange
        let system = front_stop_singlet();
        let merit = image_merit(16.0);
        let mf = MeritFunction::new(&system, &[], &merit).unwrap();
        let opts = OptimizeOptions::default();
        let problem = ArgMinAdapter::new(mf, &opts).unwrap();
        let solver = build_optimizer_more_thuente(&opts).unwrap();

        // Act
        let run = run_solver(array![19.0], &opts, problem, solver).unwrap();

        // Assert
        assert_abs_diff_eq!(run.best[0], 16.0, epsilon = 1e-4);
        assert!(run.cost < 1e-8);
        assert!(run.grad_norm.is_some());
        assert!(run.iterations >= 1);
    }

    #[test]
    fn nelder_mead_run_has_no_gradient_and_honors_max_iter() {
        let system = front_stop_singlet();
        let merit = image_merit(16.0);
        let mf = MeritFunction::new(&system, &[], &merit).unwrap();
        let tols = Tolerances::new(None, None, Some(3)).unwrap();
        let opts = OptimizeOptions::new(tols, Method::NelderMead, false, None).unwrap();
        let problem = ArgMinAdapter::new(mf, &opts).unwrap();
        let z0 = array![19.0];
        let solver = build_nelder_mead(&z0, &problem, &opts).unwrap();

        let run = run_solver(z0, &opts, problem, solver).unwrap();

        assert_eq!(run.grad_norm, None);
        assert!(run.iterations <= 3);
        assert!(run.cost <= 9.0);
    }
}
