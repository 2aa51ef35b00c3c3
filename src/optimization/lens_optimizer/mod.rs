//! lens_optimizer — argmin-powered driver for merit-based lens optimization.
//!
//! Purpose
//! -------
//! Minimize a [`Merit`](crate::optimization::merit::Merit) over a
//! [`System`](crate::system::System): pick a solver, respect parameter
//! bounds, penalize constraint violations, and write the best parameters
//! back. Callers build a merit, choose [`OptimizeOptions`], and call
//! [`optimize`].
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] exposes the penalized merit cost
//!   `‖F‖² + penalty · (‖h‖² + ‖max(0, g)‖²)` to `argmin` in unconstrained
//!   coordinates; bounds are enforced by smooth transforms.
//! - [`builders`] construct L-BFGS (Hager–Zhang or More–Thuente line search)
//!   or Nelder–Mead from the options.
//! - [`run::run_solver`] executes any of them and collects a
//!   [`run::RunSummary`].
//! - [`finite_diff`] supplies gradients with per-parameter steps, since no
//!   analytic derivative of a ray trace is available.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every parameter vector handed to the merit function lies inside its
//!   bounds.
//! - The caller's system is only written after a successful run; errors
//!   leave it untouched.
//! - Options ([`Tolerances`], [`OptimizeOptions`]) are validated on
//!   construction.
//!
//! Conventions
//! -----------
//! - `x` is parameter space, `z` solver space; [`OptimizeOutcome`] reports
//!   `x`.
//! - `converged` is `true` only when a solver tolerance was met; running out
//!   of iterations or time is reported, not treated as an error, unless the
//!   caller asks via [`OptimizeOutcome::ensure_converged`].
//!
//! Downstream usage
//! ----------------
//! - Build a `Merit`, call [`optimize`] with the system, ray bundles, and
//!   options, then inspect [`OptimizeOutcome`].
//!
//! Testing notes
//! -------------
//! - Unit tests per submodule cover option validation, FD accuracy, the
//!   chain rule through bound transforms, and solver construction.
//! - `api` tests drive every method to a known optimum on a singlet.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::optimize;
pub use self::run::RunSummary;
pub use self::traits::{LineSearcher, Method, OptimizeOptions, OptimizeOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Residuals, Theta};

pub mod prelude {
    pub use super::api::optimize;
    pub use super::traits::{LineSearcher, Method, OptimizeOptions, OptimizeOutcome, Tolerances};
    pub use super::types::{Grad, Theta};
}
