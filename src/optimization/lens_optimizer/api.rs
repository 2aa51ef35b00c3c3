//! High-level entry point for optimizing a lens system against a [`Merit`].
//!
//! This binds the merit to a snapshot of the system, maps bounded parameters
//! to solver coordinates through an `ArgMinAdapter`, selects a solver by
//! [`Method`], and delegates the run to `run_solver`. On success the best
//! parameters are written back into the caller's system.
use crate::{
    optics::rays::Rays,
    optimization::{
        errors::OptResult,
        lens_optimizer::{
            adapter::ArgMinAdapter,
            builders::{
                build_nelder_mead, build_optimizer_hager_zhang, build_optimizer_more_thuente,
            },
            run::run_solver,
            traits::{LineSearcher, Method, OptimizeOptions, OptimizeOutcome},
        },
        merit::merit_function::{Merit, MeritFunction},
    },
    system::system::System,
};

/// Minimize the penalized merit of `system` by adjusting the merit's
/// parameters.
///
/// # Behavior
/// - Evaluates against a clone of `system`; the caller's system is untouched
///   until the run has finished.
/// - Reads the starting vector `x0` from the system and reports it as read;
///   the solver itself starts from `x0` pulled strictly inside any bounds.
/// - Builds L-BFGS (More–Thuente or Hager–Zhang line search) or Nelder–Mead
///   per `opts.method`, and runs it via `run_solver`.
/// - Writes the best vector back with [`Merit::set_values`], whether or not
///   the solver reports convergence; use
///   [`OptimizeOutcome::ensure_converged`] to insist on it.
///
/// # Parameters
/// - `system`: system to optimize; updated in place on success.
/// - `bundles`: ray batches handed to every demerit (may be empty).
/// - `merit`: parameters, demerits, and constraints.
/// - `opts`: solver options.
///
/// # Errors
/// - [`OptError::NoParameters`](crate::optimization::errors::OptError::NoParameters)
///   and parameter checks from building the merit function.
/// - [`OptError::InvalidBounds`](crate::optimization::errors::OptError::InvalidBounds)
///   for inconsistent bounds.
/// - Evaluation errors at the start point (trace failures, empty bundles,
///   non-finite cost).
/// - Solver construction and runtime errors.
///
/// On error `system` is left exactly as it was passed in.
///
/// # Example
/// ```no_run
/// use optrace::optimization::lens_optimizer::{optimize, OptimizeOptions};
/// use optrace::optimization::merit::{FocalLength, Merit, Spacing, Target};
/// # fn run(system: &mut optrace::system::System) -> optrace::optimization::errors::OptResult<()> {
/// let merit = Merit::new()
///     .with_parameter(Spacing::new(Target::Image).with_bounds(Some(0.0), Some(100.0)))
///     .with_demerit(FocalLength::new(50.0));
/// let out = optimize(system, &[], &merit, &OptimizeOptions::default())?.ensure_converged()?;
/// println!("image distance {:.4}, merit {:.3e}", out.x[0], out.objective);
/// # Ok(())
/// # }
/// ```
pub fn optimize(
    system: &mut System, bundles: &[Rays], merit: &Merit, opts: &OptimizeOptions,
) -> OptResult<OptimizeOutcome> {
    let template = system.clone();
    let merit_fn = MeritFunction::new(&template, bundles, merit)?;
    let problem = ArgMinAdapter::new(merit_fn, opts)?;

    let x0 = merit_fn.initial()?;
    let initial_objective = problem.cost_at(&x0)?;
    let z0 = problem.to_unbounded(&x0);

    let run = match opts.method {
        Method::Lbfgs(LineSearcher::MoreThuente) => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_solver(z0, opts, problem.clone(), solver)?
        }
        Method::Lbfgs(LineSearcher::HagerZhang) => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_solver(z0, opts, problem.clone(), solver)?
        }
        Method::NelderMead => {
            let solver = build_nelder_mead(&z0, &problem, opts)?;
            run_solver(z0, opts, problem.clone(), solver)?
        }
    };

    let x = problem.to_bounded(&run.best);
    let residuals = merit_fn.objective(&x)?;
    merit.set_values(system, &x)?;
    OptimizeOutcome::new(x0, x, initial_objective, residuals, run)
}
