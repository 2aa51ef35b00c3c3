//! Public configuration and result types of the lens optimizer.
//!
//! - [`OptimizeOptions`] and [`Tolerances`]: configuration for a run.
//! - [`Method`] and [`LineSearcher`]: solver selection.
//! - [`OptimizeOutcome`]: normalized result returned by
//!   [`optimize`](crate::optimization::lens_optimizer::optimize).
//!
//! Convention: the solver minimizes the penalized sum of squares
//! `‖F(x)‖² + penalty · (‖h(x)‖² + ‖max(0, g(x))‖²)`; every objective value
//! reported here is that quantity.
use std::{str::FromStr, time::Duration};

use argmin::core::{TerminationReason, TerminationStatus};

use crate::optimization::{
    errors::{OptError, OptResult},
    lens_optimizer::{
        run::RunSummary,
        types::{
            DEFAULT_DIFF_STEP, DEFAULT_PENALTY, DEFAULT_TIMEOUT_SECS, FnEvalMap, Residuals, Theta,
        },
        validation::{
            validate_value, verify_diff_step, verify_penalty, verify_tol_cost, verify_tol_grad,
        },
    },
};

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Solver used by [`optimize`](crate::optimization::lens_optimizer::optimize).
///
/// - `Lbfgs(ls)`: quasi-Newton on finite-difference gradients.
/// - `NelderMead`: derivative-free simplex; its initial simplex steps one
///   parameter scale along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Lbfgs(LineSearcher),
    NelderMead,
}

impl Default for Method {
    fn default() -> Self {
        Method::Lbfgs(LineSearcher::MoreThuente)
    }
}

impl FromStr for Method {
    type Err = OptError;

    /// Accepts `"lbfgs"` (More–Thuente), a line-search name (L-BFGS with that
    /// line search), or `"neldermead"` / `"nelder-mead"`; case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lbfgs" => Ok(Method::default()),
            "neldermead" | "nelder-mead" => Ok(Method::NelderMead),
            other => other.parse::<LineSearcher>().map(Method::Lbfgs).map_err(|_| {
                OptError::InvalidMethod {
                    name: s.to_string(),
                    reason: "Valid options are 'LBFGS', 'MoreThuente', 'HagerZhang', or \
                             'NelderMead'.",
                }
            }),
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: L-BFGS stops when the gradient norm falls below this.
/// - `tol_cost`: L-BFGS stops when the change in cost falls below this;
///   Nelder–Mead uses it as the simplex standard-deviation tolerance.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if max_iter == Some(0) {
            return Err(OptError::InvalidMaxIter {
                max_iter: 0,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Optimizer-level configuration.
///
/// Default:
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = 1e-12`, `max_iter = 300`
/// - `method`: L-BFGS with More–Thuente
/// - `verbose`: `false`
/// - `lbfgs_mem`: `None` (uses default of 7)
/// - `penalty`: 1e3
/// - `diff_step`: 1e-2 of each parameter's scale
/// - `timeout`: 2000 s
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOptions {
    pub tols: Tolerances,
    pub method: Method,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
    pub penalty: f64,
    pub diff_step: f64,
    pub timeout: Option<Duration>,
}

impl OptimizeOptions {
    /// Create options with the default penalty, step, and timeout.
    ///
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, method: Method, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self {
            tols,
            method,
            verbose,
            lbfgs_mem,
            penalty: DEFAULT_PENALTY,
            diff_step: DEFAULT_DIFF_STEP,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }

    pub fn with_penalty(mut self, penalty: f64) -> OptResult<Self> {
        verify_penalty(penalty)?;
        self.penalty = penalty;
        Ok(self)
    }

    pub fn with_diff_step(mut self, diff_step: f64) -> OptResult<Self> {
        verify_diff_step(diff_step)?;
        self.diff_step = diff_step;
        Ok(self)
    }

    /// `None` disables the wall-clock budget.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> OptResult<Self> {
        if let Some(t) = timeout {
            if t.is_zero() {
                return Err(OptError::InvalidTimeout { secs: t.as_secs_f64() });
            }
        }
        self.timeout = timeout;
        Ok(self)
    }
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self::new(
            Tolerances::new(Some(1e-6), Some(1e-12), Some(300)).unwrap(),
            Method::default(),
            false,
            None,
        )
        .unwrap()
    }
}

/// Canonical result returned by `optimize`.
///
/// - `x0` / `x`: starting and best parameter vectors (parameter space).
/// - `initial_objective` / `objective`: penalized cost at `x0` and `x`.
/// - `residuals`: weighted demerit residuals `F(x)` at the best vector.
/// - `converged`: `true` only if the solver met one of its tolerances;
///   iteration or time budgets running out do not count.
/// - `status`: human-readable termination status string.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last gradient, if the method uses one.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeOutcome {
    pub x0: Theta,
    pub x: Theta,
    pub initial_objective: f64,
    pub objective: f64,
    pub residuals: Residuals,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimizeOutcome {
    /// Build a validated outcome from the starting point and a solver run.
    ///
    /// # Errors
    /// [`OptError::NonFiniteCost`] if either objective is not finite.
    pub fn new(
        x0: Theta, x: Theta, initial_objective: f64, residuals: Residuals, run: RunSummary,
    ) -> OptResult<Self> {
        validate_value(initial_objective)?;
        validate_value(run.cost)?;
        let (converged, status) = match &run.termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, format!("{reason:?}"))
            }
        };
        Ok(Self {
            x0,
            x,
            initial_objective,
            objective: run.cost,
            residuals,
            converged,
            status,
            iterations: run.iterations as usize,
            fn_evals: run.fn_evals,
            grad_norm: run.grad_norm,
        })
    }

    /// Pass a converged outcome through; turn anything else into
    /// [`OptError::NotConverged`] carrying the best vector found.
    pub fn ensure_converged(self) -> OptResult<Self> {
        if self.converged {
            Ok(self)
        } else {
            let Self { status, objective, x, .. } = self;
            Err(OptError::NotConverged { status, objective, x })
        }
    }
}
