//! Concrete constraints.
use ndarray::{Array1, array};

use crate::{
    optimization::{
        errors::OptResult,
        merit::{
            parameters::Target,
            traits::{Constraint, ConstraintKind},
        },
    },
    system::system::System,
};

/// Keep an axial spacing at or above `min`: `g = min − spacing ≤ 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinSpacing {
    name: String,
    target: Target,
    min: f64,
}

impl MinSpacing {
    pub fn new(target: Target, min: f64) -> Self {
        let name = match target {
            Target::Element(i) => format!("min spacing[{i}]"),
            Target::Image => "min spacing[image]".to_string(),
        };
        Self { name, target, min }
    }
}

impl Constraint for MinSpacing {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, system: &System) -> OptResult<Array1<f64>> {
        let spacing = self.target.element(&self.name, system)?.origin[2];
        Ok(array![self.min - spacing])
    }

    fn kind(&self) -> ConstraintKind {
        ConstraintKind::Inequality
    }
}

type ConstraintFn = Box<dyn Fn(&System) -> Array1<f64>>;

/// Constraint backed by a closure.
pub struct FnConstraint {
    name: String,
    kind: ConstraintKind,
    f: ConstraintFn,
}

impl FnConstraint {
    pub fn new(
        name: impl Into<String>, kind: ConstraintKind,
        f: impl Fn(&System) -> Array1<f64> + 'static,
    ) -> Self {
        Self { name: name.into(), kind, f: Box::new(f) }
    }
}

impl std::fmt::Debug for FnConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnConstraint")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Constraint for FnConstraint {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, system: &System) -> OptResult<Array1<f64>> {
        Ok((self.f)(system))
    }

    fn kind(&self) -> ConstraintKind {
        self.kind
    }
}
