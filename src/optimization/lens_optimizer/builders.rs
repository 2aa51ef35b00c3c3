//! lens_optimizer::builders — solver construction helpers.
//!
//! Purpose
//! -------
//! Hide argmin's generic wiring behind small builders that apply the
//! crate-level [`OptimizeOptions`] (tolerances, memory size, simplex
//! geometry), so the driver can request a configured solver without
//! touching argmin types.
//!
//! Key behaviors
//! -------------
//! - Construct L-BFGS with either Hager–Zhang or More–Thuente line search;
//!   [`configure_lbfgs`] applies the gradient and cost-change tolerances.
//! - Construct Nelder–Mead with an initial simplex of `n + 1` vertices: the
//!   start and one vertex per axis, one parameter scale away.
//!
//! Conventions
//! -----------
//! - Builders never set the initial parameter vector or `max_iters`; the
//!   runner applies those.
//! - Errors are always reported via [`OptResult`]; argmin's `Error` never
//!   leaks across module boundaries.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    lens_optimizer::{
        adapter::ArgMinAdapter,
        traits::OptimizeOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, NelderMeadSolver, Theta,
        },
    },
};

/// build_optimizer_hager_zhang — construct L-BFGS with Hager–Zhang line search.
///
/// Parameters
/// ----------
/// - `opts`: `&OptimizeOptions`
///   - `opts.lbfgs_mem`: optional history size (`m`); [`DEFAULT_LBFGS_MEM`]
///     when `None`.
///   - `opts.tols.tol_grad` / `opts.tols.tol_cost`: optional stopping
///     tolerances.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) if argmin rejects a
///   tolerance.
pub fn build_optimizer_hager_zhang(opts: &OptimizeOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// build_optimizer_more_thuente — construct L-BFGS with More–Thuente line search.
///
/// Same contract as [`build_optimizer_hager_zhang`].
pub fn build_optimizer_more_thuente(opts: &OptimizeOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Apply the optional gradient and cost-change tolerances to an L-BFGS
/// solver of any line-search type. A `None` tolerance leaves argmin's
/// default in place.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &OptimizeOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(tol_grad) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(tol_grad)?;
    }
    if let Some(tol_cost) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(tol_cost)?;
    }
    Ok(solver)
}

/// build_nelder_mead — construct Nelder–Mead around `z0`.
///
/// Parameters
/// ----------
/// - `z0`: starting point in solver coordinates.
/// - `problem`: supplies the per-axis simplex edge
///   ([`ArgMinAdapter::unit_steps`]).
/// - `opts`: `opts.tols.tol_cost`, when present, becomes the simplex
///   standard-deviation tolerance.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) if argmin rejects the
///   tolerance.
pub fn build_nelder_mead(
    z0: &Theta, problem: &ArgMinAdapter<'_>, opts: &OptimizeOptions,
) -> OptResult<NelderMeadSolver> {
    let steps = problem.unit_steps(z0);
    let mut vertices = Vec::with_capacity(z0.len() + 1);
    vertices.push(z0.clone());
    for (axis, &step) in steps.iter().enumerate() {
        let mut vertex = z0.clone();
        vertex[axis] += step;
        vertices.push(vertex);
    }
    let mut solver = NelderMeadSolver::new(vertices);
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_sd_tolerance(tol)?;
    }
    Ok(solver)
}
