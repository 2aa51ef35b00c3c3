//! Merit collection and the vector-valued functions built from it.
//!
//! Purpose
//! -------
//! Turn a [`Merit`] (parameters, demerits, constraints) plus a template
//! [`System`] and a set of pre-aimed ray bundles into the functions a
//! solver sees: the residual vector `F(x)`, equality residuals `h(x)`, and
//! inequality residuals `g(x) ≤ 0`.
//!
//! Key behaviors
//! -------------
//! - Every evaluation clones the template, writes `x` through the
//!   parameters' setters, and evaluates the clone; the template is never
//!   mutated, so evaluations are independent of each other and of order.
//! - Residuals are `weight · demerit`, flattened and concatenated in the
//!   order the demerits were added.
//! - Constraints are partitioned by kind; an empty partition is `None`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameter targets are validated once in [`MeritFunction::new`].
//! - Bundles are traced as given; they are not re-aimed per evaluation.
use ndarray::Array1;

use crate::{
    optics::rays::Rays,
    optimization::{
        errors::{OptError, OptResult},
        lens_optimizer::types::{Residuals, Theta},
        merit::traits::{Constraint, ConstraintKind, Demerit, Parameter},
    },
    system::{paraxial::ParaxialTrace, system::System},
};

/// Owned set of parameters, demerits, and constraints.
#[derive(Debug, Default)]
pub struct Merit {
    parameters: Vec<Box<dyn Parameter>>,
    demerits: Vec<Box<dyn Demerit>>,
    constraints: Vec<Box<dyn Constraint>>,
}

impl Merit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, parameter: impl Parameter + 'static) -> Self {
        self.parameters.push(Box::new(parameter));
        self
    }

    pub fn with_demerit(mut self, demerit: impl Demerit + 'static) -> Self {
        self.demerits.push(Box::new(demerit));
        self
    }

    pub fn with_constraint(mut self, constraint: impl Constraint + 'static) -> Self {
        self.constraints.push(Box::new(constraint));
        self
    }

    pub fn parameters(&self) -> &[Box<dyn Parameter>] {
        &self.parameters
    }

    pub fn demerits(&self) -> &[Box<dyn Demerit>] {
        &self.demerits
    }

    pub fn constraints(&self) -> &[Box<dyn Constraint>] {
        &self.constraints
    }

    /// Current parameter values read from `system`.
    pub fn get_values(&self, system: &System) -> OptResult<Theta> {
        self.parameters.iter().map(|p| p.get_value(system)).collect()
    }

    /// Write `x` into `system`, one entry per parameter in order.
    ///
    /// # Errors
    /// - [`OptError::ParameterDimMismatch`] if `x` has the wrong length.
    /// - Any error raised by a parameter's setter.
    pub fn set_values(&self, system: &mut System, x: &Theta) -> OptResult<()> {
        if x.len() != self.parameters.len() {
            return Err(OptError::ParameterDimMismatch {
                expected: self.parameters.len(),
                found: x.len(),
            });
        }
        for (parameter, &value) in self.parameters.iter().zip(x.iter()) {
            parameter.set_value(system, value)?;
        }
        Ok(())
    }
}

/// All residuals of one trial vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub residuals: Residuals,
    pub equality: Option<Residuals>,
    pub inequality: Option<Residuals>,
}

impl Evaluation {
    /// `‖F‖² + penalty · (‖h‖² + ‖max(0, g)‖²)`.
    pub fn penalized_cost(&self, penalty: f64) -> f64 {
        let objective = self.residuals.dot(&self.residuals);
        let equality = self.equality.as_ref().map_or(0.0, |h| h.dot(h));
        let inequality =
            self.inequality.as_ref().map_or(0.0, |g| g.iter().map(|v| v.max(0.0).powi(2)).sum());
        objective + penalty * (equality + inequality)
    }
}

/// The merit functions of one optimization run.
#[derive(Debug, Clone, Copy)]
pub struct MeritFunction<'a> {
    template: &'a System,
    bundles: &'a [Rays],
    merit: &'a Merit,
}

impl<'a> MeritFunction<'a> {
    /// Bind a merit to a template system and its bundles.
    ///
    /// # Errors
    /// - [`OptError::NoParameters`] if the merit has no parameters.
    /// - Whatever a parameter's `check` reports against `template`.
    pub fn new(template: &'a System, bundles: &'a [Rays], merit: &'a Merit) -> OptResult<Self> {
        if merit.parameters().is_empty() {
            return Err(OptError::NoParameters);
        }
        for parameter in merit.parameters() {
            parameter.check(template)?;
        }
        Ok(Self { template, bundles, merit })
    }

    pub fn dim(&self) -> usize {
        self.merit.parameters().len()
    }

    pub fn merit(&self) -> &'a Merit {
        self.merit
    }

    /// Parameter values of the template.
    pub fn initial(&self) -> OptResult<Theta> {
        self.merit.get_values(self.template)
    }

    /// A clone of the template with `x` applied.
    pub fn apply(&self, x: &Theta) -> OptResult<System> {
        let mut system = self.template.clone();
        self.merit.set_values(&mut system, x)?;
        Ok(system)
    }

    /// Weighted, concatenated demerit residuals `F(x)`.
    pub fn objective(&self, x: &Theta) -> OptResult<Residuals> {
        self.residuals(&self.apply(x)?)
    }

    /// Equality residuals `h(x)`, `None` without equality constraints.
    pub fn equality(&self, x: &Theta) -> OptResult<Option<Residuals>> {
        self.constraint_values(&self.apply(x)?, ConstraintKind::Equality)
    }

    /// Inequality residuals `g(x)`, `None` without inequality constraints.
    pub fn inequality(&self, x: &Theta) -> OptResult<Option<Residuals>> {
        self.constraint_values(&self.apply(x)?, ConstraintKind::Inequality)
    }

    /// Objective and both constraint partitions from a single clone.
    pub fn evaluate(&self, x: &Theta) -> OptResult<Evaluation> {
        let system = self.apply(x)?;
        Ok(Evaluation {
            residuals: self.residuals(&system)?,
            equality: self.constraint_values(&system, ConstraintKind::Equality)?,
            inequality: self.constraint_values(&system, ConstraintKind::Inequality)?,
        })
    }

    fn residuals(&self, system: &System) -> OptResult<Residuals> {
        let paraxial = ParaxialTrace::new(system)?;
        let rays: Vec<Rays> = self.bundles.iter().map(|b| system.propagate_through(b)).collect();
        let mut out = Vec::new();
        for demerit in self.merit.demerits() {
            let r = demerit.evaluate(system, &paraxial, &rays)?;
            let weight = demerit.weight();
            out.extend(r.iter().map(|v| v * weight));
        }
        Ok(Array1::from(out))
    }

    fn constraint_values(
        &self, system: &System, kind: ConstraintKind,
    ) -> OptResult<Option<Residuals>> {
        let mut out = Vec::new();
        let mut any = false;
        for constraint in self.merit.constraints().iter().filter(|c| c.kind() == kind) {
            any = true;
            out.extend(constraint.evaluate(system)?);
        }
        Ok(any.then(|| Array1::from(out)))
    }
}
