//! Concrete design variables: surface curvature, axial spacing, and
//! closure-backed parameters.
use crate::{
    optics::element::Element,
    optimization::{
        errors::{OptError, OptResult},
        merit::traits::Parameter,
    },
    system::system::System,
};

/// Which node of a system a parameter addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Index into `System::elements`.
    Element(usize),
    Image,
}

impl Target {
    pub(crate) fn element<'s>(&self, name: &str, system: &'s System) -> OptResult<&'s Element> {
        match *self {
            Target::Element(index) => system.elements().get(index).ok_or_else(|| {
                OptError::TargetOutOfRange {
                    name: name.to_string(),
                    index,
                    len: system.elements().len(),
                }
            }),
            Target::Image => Ok(&system.image),
        }
    }

    fn element_mut<'s>(&self, name: &str, system: &'s mut System) -> OptResult<&'s mut Element> {
        match *self {
            Target::Element(index) => {
                let len = system.elements().len();
                system.elements_mut().get_mut(index).ok_or_else(|| OptError::TargetOutOfRange {
                    name: name.to_string(),
                    index,
                    len,
                })
            }
            Target::Image => Ok(&mut system.image),
        }
    }
}

fn check_scale(name: &str, value: f64) -> OptResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(OptError::InvalidScale { name: name.to_string(), value })
    }
}

fn check_value(name: &str, value: f64) -> OptResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(OptError::InvalidParameterValue { name: name.to_string(), value })
    }
}

/// Curvature of the optic of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Curvature {
    name: String,
    target: Target,
    bounds: (Option<f64>, Option<f64>),
    scale: f64,
}

impl Curvature {
    pub fn new(element: usize) -> Self {
        Self {
            name: format!("curvature[{element}]"),
            target: Target::Element(element),
            bounds: (None, None),
            scale: 1.0,
        }
    }

    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.bounds = (lower, upper);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

impl Parameter for Curvature {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_value(&self, system: &System) -> OptResult<f64> {
        Ok(self.target.element(&self.name, system)?.curvature())
    }

    fn set_value(&self, system: &mut System, value: f64) -> OptResult<()> {
        check_value(&self.name, value)?;
        self.target.element_mut(&self.name, system)?.set_curvature(value);
        Ok(())
    }

    fn bounds(&self) -> (Option<f64>, Option<f64>) {
        self.bounds
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn check(&self, system: &System) -> OptResult<()> {
        check_scale(&self.name, self.scale)?;
        self.target.element(&self.name, system).map(|_| ())
    }
}

/// Axial distance from the previous node to the target's vertex, i.e. the
/// `z` component of its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Spacing {
    name: String,
    target: Target,
    bounds: (Option<f64>, Option<f64>),
    scale: f64,
}

impl Spacing {
    pub fn new(target: Target) -> Self {
        let name = match target {
            Target::Element(i) => format!("spacing[{i}]"),
            Target::Image => "spacing[image]".to_string(),
        };
        Self { name, target, bounds: (None, None), scale: 1.0 }
    }

    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.bounds = (lower, upper);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn target(&self) -> Target {
        self.target
    }
}

impl Parameter for Spacing {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_value(&self, system: &System) -> OptResult<f64> {
        Ok(self.target.element(&self.name, system)?.origin[2])
    }

    fn set_value(&self, system: &mut System, value: f64) -> OptResult<()> {
        check_value(&self.name, value)?;
        self.target.element_mut(&self.name, system)?.origin[2] = value;
        Ok(())
    }

    fn bounds(&self) -> (Option<f64>, Option<f64>) {
        self.bounds
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn check(&self, system: &System) -> OptResult<()> {
        check_scale(&self.name, self.scale)?;
        self.target.element(&self.name, system).map(|_| ())
    }
}

type Getter = Box<dyn Fn(&System) -> f64>;
type Setter = Box<dyn Fn(&mut System, f64)>;

/// Parameter backed by a getter/setter closure pair, for anything the
/// concrete parameters do not cover (tilts, object distance, glass indices).
pub struct FnParameter {
    name: String,
    get: Getter,
    set: Setter,
    bounds: (Option<f64>, Option<f64>),
    scale: f64,
}

impl FnParameter {
    pub fn new(
        name: impl Into<String>, get: impl Fn(&System) -> f64 + 'static,
        set: impl Fn(&mut System, f64) + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            get: Box::new(get),
            set: Box::new(set),
            bounds: (None, None),
            scale: 1.0,
        }
    }

    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.bounds = (lower, upper);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

impl std::fmt::Debug for FnParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnParameter")
            .field("name", &self.name)
            .field("bounds", &self.bounds)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl Parameter for FnParameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_value(&self, system: &System) -> OptResult<f64> {
        let value = (self.get)(system);
        check_value(&self.name, value)?;
        Ok(value)
    }

    fn set_value(&self, system: &mut System, value: f64) -> OptResult<()> {
        check_value(&self.name, value)?;
        (self.set)(system, value);
        Ok(())
    }

    fn bounds(&self) -> (Option<f64>, Option<f64>) {
        self.bounds
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn check(&self, system: &System) -> OptResult<()> {
        check_scale(&self.name, self.scale)?;
        self.get_value(system).map(|_| ())
    }
}
