//! Coordinate transforms from data coordinates (`x`, `y`) to device
//! coordinates (`X`, `Y`).
//!
//! A [`Transform`] may be undefined at some points (it then returns a
//! [`DomainError`]) and may substitute finite values for infinite
//! inputs through its [`Boundary`].  Transforms are immutable; the
//! boundary values used for an evaluation are passed explicitly to
//! [`Transform::eval_with`], which is how a [`Composite`] imposes its
//! own boundary on all its children.

use std::fmt::{self, Debug, Formatter};
use num_complex::Complex64;
use crate::{BoundingBox, EPSILON,
            error::{ConfigError, DomainError}};

/// Values substituted for the output coordinates when the
/// corresponding input coordinate is infinite (or, for logarithmic
/// axes, non-positive).  `None` means "no substitution".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Boundary {
    pub minus_infinity_x: Option<f64>,
    pub plus_infinity_x: Option<f64>,
    pub minus_infinity_y: Option<f64>,
    pub plus_infinity_y: Option<f64>,
}

impl Boundary {
    /// No substitution at all.
    pub const NONE: Boundary = Boundary {
        minus_infinity_x: None,  plus_infinity_x: None,
        minus_infinity_y: None,  plus_infinity_y: None };

    #[inline]
    fn substitute_x(&self, x: f64) -> Option<f64> {
        if x == f64::NEG_INFINITY { self.minus_infinity_x }
        else if x == f64::INFINITY { self.plus_infinity_x }
        else { None }
    }

    #[inline]
    fn substitute_y(&self, y: f64) -> Option<f64> {
        if y == f64::NEG_INFINITY { self.minus_infinity_y }
        else if y == f64::INFINITY { self.plus_infinity_y }
        else { None }
    }

    /// Replace the components of `out` whose input is infinite and
    /// check that the result is finite.
    fn apply(&self, x: f64, y: f64, mut out: [f64; 2])
             -> Result<[f64; 2], DomainError> {
        if let Some(v) = self.substitute_x(x) { out[0] = v }
        if let Some(v) = self.substitute_y(y) { out[1] = v }
        finite(out)
    }
}

#[inline]
fn finite(p: [f64; 2]) -> Result<[f64; 2], DomainError> {
    if p[0].is_finite() && p[1].is_finite() { Ok(p) }
    else { Err(DomainError::NotFinite) }
}

/// Jacobian of a transform: `dx` is the derivative of (`X`, `Y`) with
/// respect to `x` and `dy` with respect to `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivative {
    pub dx: [f64; 2],
    pub dy: [f64; 2],
}

/// Unit vectors giving the device direction of the data axes at a
/// point.  A direction is `None` when the corresponding derivative
/// vanishes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Directions {
    pub x_hat: Option<[f64; 2]>,
    pub y_hat: Option<[f64; 2]>,
}

impl Directions {
    /// The directions of a rectilinear transform.
    pub const AXES: Directions = Directions { x_hat: Some([1., 0.]),
                                              y_hat: Some([0., 1.]) };
}

/// Return `v / |v|` or `None` if `v` has zero (or non-finite) length.
#[inline]
fn unit([x, y]: [f64; 2]) -> Option<[f64; 2]> {
    let n = x.hypot(y);
    if n > 0. && n.is_finite() { Some([x / n, y / n]) } else { None }
}

/// Forward difference approximation of the Jacobian of `t` at (`x`,
/// `y`) with step `h`.
pub fn forward_difference<T>(t: &T, x: f64, y: f64, h: f64)
                             -> Result<Derivative, DomainError>
where T: Transform + ?Sized {
    let [x0, y0] = t.eval(x, y)?;
    let [x1, y1] = t.eval(x + h, y)?;
    let [x2, y2] = t.eval(x, y + h)?;
    Ok(Derivative { dx: [(x1 - x0) / h, (y1 - y0) / h],
                    dy: [(x2 - x0) / h, (y2 - y0) / h] })
}

/// A mapping from data coordinates to device coordinates.
pub trait Transform {
    /// Evaluate the transform at (`x`, `y`) using the boundary
    /// substitutions `b` (instead of the transform's own).
    fn eval_with(&self, x: f64, y: f64, b: &Boundary)
                 -> Result<[f64; 2], DomainError>;

    /// The boundary values of this transform.
    fn boundary(&self) -> &Boundary;

    /// Human readable description, used in log messages.
    fn name(&self) -> String { "transform".to_string() }

    /// Return `true` if the transform is known to be affine.
    fn is_affine(&self) -> bool { false }

    /// Evaluate the transform at (`x`, `y`).
    fn eval(&self, x: f64, y: f64) -> Result<[f64; 2], DomainError> {
        self.eval_with(x, y, self.boundary())
    }

    /// Return `true` iff the transform is defined at (`x`, `y`).
    fn contains(&self, x: f64, y: f64) -> bool {
        self.eval(x, y).is_ok()
    }

    /// Jacobian at (`x`, `y`) computed with a step `h`.
    fn derivative_step(&self, x: f64, y: f64, h: f64)
                       -> Result<Derivative, DomainError> {
        forward_difference(self, x, y, h)
    }

    /// Directions of the data axes at (`x`, `y`) computed with a step
    /// `h`.  See [`Directions`].
    fn normalized_derivative_step(&self, x: f64, y: f64, h: f64)
                                  -> Result<Directions, DomainError> {
        let d = self.derivative_step(x, y, h)?;
        Ok(Directions { x_hat: unit(d.dx), y_hat: unit(d.dy) })
    }

    /// Jacobian at (`x`, `y`) with the default step [`EPSILON`].
    fn derivative(&self, x: f64, y: f64) -> Result<Derivative, DomainError> {
        self.derivative_step(x, y, EPSILON)
    }

    /// Directions of the data axes at (`x`, `y`) with the default
    /// step [`EPSILON`].
    fn normalized_derivative(&self, x: f64, y: f64)
                             -> Result<Directions, DomainError> {
        self.normalized_derivative_step(x, y, EPSILON)
    }

    /// Move the children out of a composite transform.  Used to keep
    /// composites flat; other transforms return `None`.
    #[doc(hidden)]
    fn take_children(&mut self) -> Option<Vec<Box<dyn Transform>>> { None }
}


////////////////////////////////////////////////////////////////////////
//
// User functions

/// A transform given by a function of (`x`, `y`) and the boundary in
/// effect.
pub struct FnTransform<F> {
    f: F,
    name: Option<String>,
    boundary: Boundary,
}

impl<F> FnTransform<F> {
    /// Create a transform from `f`.  The function receives the
    /// boundary values in effect and is responsible for using them.
    pub fn new(f: F) -> Self
    where F: Fn(f64, f64, &Boundary) -> Result<[f64; 2], DomainError> {
        FnTransform { f, name: None, boundary: Boundary::NONE }
    }

    /// Set the name reported by [`Transform::name`].
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the boundary values of the transform.
    pub fn with_boundary(mut self, b: Boundary) -> Self {
        self.boundary = b;
        self
    }
}

/// Create a transform from a function of (`x`, `y`) only.  Boundary
/// values are substituted in the output for infinite inputs.
pub fn from_fn<G>(g: G) -> FnTransform<
        impl Fn(f64, f64, &Boundary) -> Result<[f64; 2], DomainError>>
where G: Fn(f64, f64) -> Result<[f64; 2], DomainError> {
    FnTransform::new(move |x, y, b: &Boundary| {
        let out = match g(x, y) {
            Ok(out) => out,
            // The function may fail at infinity while the boundary
            // provides both output coordinates.
            Err(e) => match (b.substitute_x(x), b.substitute_y(y)) {
                (Some(u), Some(v)) => [u, v],
                _ => return Err(e),
            }
        };
        b.apply(x, y, out)
    })
}

/// Create a transform from a complex function: the point (`x`, `y`)
/// stands for `z = x + iy` and is sent to the real and imaginary parts
/// of `g(z)`.  Boundary values are substituted as for [`from_fn`].
///
/// ```
/// use adaptive_plot::{Transform, transform::from_complex};
/// let sq = from_complex(|z| z * z);
/// assert_eq!(sq.eval(1., 1.).unwrap(), [0., 2.]);
/// ```
pub fn from_complex<G>(g: G) -> FnTransform<
        impl Fn(f64, f64, &Boundary) -> Result<[f64; 2], DomainError>>
where G: Fn(Complex64) -> Complex64 {
    from_fn(move |x, y| {
        let w = g(Complex64::new(x, y));
        Ok([w.re, w.im])
    }).named("z -> f(z)")
}

impl<F> Transform for FnTransform<F>
where F: Fn(f64, f64, &Boundary) -> Result<[f64; 2], DomainError> {
    fn eval_with(&self, x: f64, y: f64, b: &Boundary)
                 -> Result<[f64; 2], DomainError> {
        finite((self.f)(x, y, b)?)
    }

    fn boundary(&self) -> &Boundary { &self.boundary }

    fn name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "x,y -> f(x,y)".to_string())
    }
}

impl<F> Debug for FnTransform<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform")
            .field("name", &self.name)
            .field("boundary", &self.boundary)
            .finish()
    }
}


////////////////////////////////////////////////////////////////////////
//
// Affine maps

/// The affine map `X = a x + c y + x0`, `Y = b x + d y + y0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    pub a: f64,  pub b: f64,
    pub c: f64,  pub d: f64,
    pub x0: f64, pub y0: f64,
    boundary: Boundary,
}

/// `a * x` with the convention `0 * ∞ = 0` so that infinite inputs
/// only affect the coordinates that depend on them.
#[inline]
fn mul(a: f64, x: f64) -> f64 { if a == 0. { 0. } else { a * x } }

impl Linear {
    /// The map whose derivative with respect to `x` is (`a`, `b`),
    /// with respect to `y` is (`c`, `d`), and which sends the origin
    /// to (`x0`, `y0`).
    pub fn new(a: f64, b: f64, c: f64, d: f64, x0: f64, y0: f64) -> Self {
        Linear { a, b, c, d, x0, y0, boundary: Boundary::NONE }
    }

    pub fn identity() -> Self { Self::new(1., 0., 0., 1., 0., 0.) }

    pub fn scale(sx: f64, sy: f64) -> Self { Self::new(sx, 0., 0., sy, 0., 0.) }

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self::new(1., 0., 0., 1., dx, dy)
    }

    /// Rotation by `angle` radians around the origin.
    pub fn rotate(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(c, s, -s, c, 0., 0.)
    }

    pub fn with_boundary(mut self, b: Boundary) -> Self {
        self.boundary = b;
        self
    }
}

impl Transform for Linear {
    fn eval_with(&self, x: f64, y: f64, b: &Boundary)
                 -> Result<[f64; 2], DomainError> {
        let out = [mul(self.a, x) + mul(self.c, y) + self.x0,
                   mul(self.b, x) + mul(self.d, y) + self.y0];
        b.apply(x, y, out)
    }

    fn boundary(&self) -> &Boundary { &self.boundary }

    fn name(&self) -> String {
        format!("x,y -> {} x + {} y + {}, {} x + {} y + {}",
                self.a, self.c, self.x0, self.b, self.d, self.y0)
    }

    fn is_affine(&self) -> bool { true }

    fn derivative_step(&self, _: f64, _: f64, _: f64)
                       -> Result<Derivative, DomainError> {
        Ok(Derivative { dx: [self.a, self.b], dy: [self.c, self.d] })
    }

    fn normalized_derivative_step(&self, _: f64, _: f64, _: f64)
                                  -> Result<Directions, DomainError> {
        Ok(Directions { x_hat: unit([self.a, self.b]),
                        y_hat: unit([self.c, self.d]) })
    }
}


////////////////////////////////////////////////////////////////////////
//
// Windows

/// Map the data rectangle `input` (possibly with logarithmic axes)
/// onto the device rectangle with top-left corner (`x`, `y`) and
/// dimensions `width` × `height`.  The device `Y` axis points down:
/// `ymax` is sent to the top edge `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    input: BoundingBox,
    xlogbase: Option<f64>,
    ylogbase: Option<f64>,
    // Input bounds after the (optional) logarithm.
    ix: [f64; 2],
    iy: [f64; 2],
    boundary: Boundary,
}

fn check_log_base(base: f64) -> Result<(), ConfigError> {
    if base > 1. && base.is_finite() { Ok(()) }
    else { Err(ConfigError::LogBase(base)) }
}

impl Window {
    /// Return a linear window.  The input ranges must be finite and
    /// non-degenerate.  The device rectangle may have any size.
    pub fn new(x: f64, y: f64, width: f64, height: f64, input: BoundingBox)
               -> Result<Self, ConfigError> {
        for (name, value) in [("x", x), ("y", y), ("width", width),
                              ("height", height),
                              ("xmin", input.xmin), ("xmax", input.xmax),
                              ("ymin", input.ymin), ("ymax", input.ymax)] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { name, value })
            }
        }
        if input.xmin == input.xmax {
            return Err(ConfigError::EmptyRange { low: input.xmin,
                                                 high: input.xmax })
        }
        if input.ymin == input.ymax {
            return Err(ConfigError::EmptyRange { low: input.ymin,
                                                 high: input.ymax })
        }
        Ok(Window { x, y, width, height, input,
                    xlogbase: None,  ylogbase: None,
                    ix: [input.xmin, input.xmax],
                    iy: [input.ymin, input.ymax],
                    boundary: Boundary::NONE })
    }

    /// Make the x axis logarithmic in base `base`.
    pub fn log_x(mut self, base: f64) -> Result<Self, ConfigError> {
        check_log_base(base)?;
        for (bound, value) in [("xmin", self.input.xmin),
                               ("xmax", self.input.xmax)] {
            if value <= 0. {
                return Err(ConfigError::LogBound { bound, value, base })
            }
        }
        self.xlogbase = Some(base);
        self.ix = [self.input.xmin.log(base), self.input.xmax.log(base)];
        Ok(self)
    }

    /// Make the y axis logarithmic in base `base`.
    pub fn log_y(mut self, base: f64) -> Result<Self, ConfigError> {
        check_log_base(base)?;
        for (bound, value) in [("ymin", self.input.ymin),
                               ("ymax", self.input.ymax)] {
            if value <= 0. {
                return Err(ConfigError::LogBound { bound, value, base })
            }
        }
        self.ylogbase = Some(base);
        self.iy = [self.input.ymin.log(base), self.input.ymax.log(base)];
        Ok(self)
    }

    pub fn with_boundary(mut self, b: Boundary) -> Self {
        self.boundary = b;
        self
    }

    /// The data rectangle mapped by this window.
    pub fn input(&self) -> BoundingBox { self.input }

    /// Return the fraction of the way `v` lies in the (remapped)
    /// interval `i`, or `None` if `v` is out of the logarithm domain.
    #[inline]
    fn fraction(v: f64, log: Option<f64>, i: [f64; 2]) -> Option<f64> {
        let v = match log {
            Some(base) => if v <= 0. { return None } else { v.log(base) },
            None => v,
        };
        Some((v - i[0]) / (i[1] - i[0]))
    }

    #[inline]
    fn unfraction(r: f64, log: Option<f64>, i: [f64; 2]) -> f64 {
        let v = i[0] + r * (i[1] - i[0]);
        match log {
            Some(base) => base.powf(v),
            None => v,
        }
    }

    /// Inverse of the window: device coordinates to data coordinates.
    pub fn invert(&self, dev_x: f64, dev_y: f64) -> [f64; 2] {
        let rx = (dev_x - self.x) / self.width;
        let ry = 1. - (dev_y - self.y) / self.height;
        [Self::unfraction(rx, self.xlogbase, self.ix),
         Self::unfraction(ry, self.ylogbase, self.iy)]
    }
}

impl Transform for Window {
    fn eval_with(&self, x: f64, y: f64, b: &Boundary)
                 -> Result<[f64; 2], DomainError> {
        let dev_x = match b.substitute_x(x) {
            Some(v) => v,
            None => match Self::fraction(x, self.xlogbase, self.ix) {
                Some(r) => self.x + r * self.width,
                None => b.minus_infinity_x.ok_or(
                    DomainError::LogAxis { axis: 'x', value: x })?,
            }
        };
        let dev_y = match b.substitute_y(y) {
            Some(v) => v,
            None => match Self::fraction(y, self.ylogbase, self.iy) {
                Some(r) => self.y + (1. - r) * self.height,
                None => b.minus_infinity_y.ok_or(
                    DomainError::LogAxis { axis: 'y', value: y })?,
            }
        };
        finite([dev_x, dev_y])
    }

    fn boundary(&self) -> &Boundary { &self.boundary }

    fn name(&self) -> String {
        let xlog = self.xlogbase.map(|b| format!(" xlog{}", b))
            .unwrap_or_default();
        let ylog = self.ylogbase.map(|b| format!(" ylog{}", b))
            .unwrap_or_default();
        format!("({}, {}) ({}, {}) -> ({}, {}) ({}, {}){}{}",
                self.input.xmin, self.input.ymin,
                self.input.xmax, self.input.ymax,
                self.x, self.y + self.height, self.x + self.width, self.y,
                xlog, ylog)
    }

    fn is_affine(&self) -> bool {
        self.xlogbase.is_none() && self.ylogbase.is_none()
    }

    fn derivative_step(&self, x: f64, y: f64, h: f64)
                       -> Result<Derivative, DomainError> {
        if self.is_affine() {
            Ok(Derivative {
                dx: [self.width / (self.ix[1] - self.ix[0]), 0.],
                dy: [0., - self.height / (self.iy[1] - self.iy[0])] })
        } else {
            forward_difference(self, x, y, h)
        }
    }

    /// Windows are rectilinear: always return the unit axes.
    fn normalized_derivative_step(&self, _: f64, _: f64, _: f64)
                                  -> Result<Directions, DomainError> {
        Ok(Directions::AXES)
    }
}


////////////////////////////////////////////////////////////////////////
//
// Composition

/// A sequence of transforms applied left to right.  The sequence is
/// always flat: it never contains another composite.  During an
/// evaluation, all children use the boundary of the composite.
pub struct Composite {
    steps: Vec<Box<dyn Transform>>,
    boundary: Boundary,
}

/// Argument accepted when building a [`Composite`].  Nested
/// composites and sequences are flattened, `Skip` (or `None`) is
/// dropped.
pub enum Step {
    One(Box<dyn Transform>),
    Many(Composite),
    Seq(Vec<Step>),
    Skip,
}

impl From<Box<dyn Transform>> for Step {
    fn from(t: Box<dyn Transform>) -> Self { Step::One(t) }
}

impl From<Linear> for Step {
    fn from(t: Linear) -> Self { Step::One(Box::new(t)) }
}

impl From<Window> for Step {
    fn from(t: Window) -> Self { Step::One(Box::new(t)) }
}

impl<F> From<FnTransform<F>> for Step
where F: Fn(f64, f64, &Boundary) -> Result<[f64; 2], DomainError> + 'static {
    fn from(t: FnTransform<F>) -> Self { Step::One(Box::new(t)) }
}

impl From<Composite> for Step {
    fn from(c: Composite) -> Self { Step::Many(c) }
}

impl From<Vec<Step>> for Step {
    fn from(v: Vec<Step>) -> Self { Step::Seq(v) }
}

impl<T: Into<Step>> From<Option<T>> for Step {
    fn from(t: Option<T>) -> Self {
        match t { Some(t) => t.into(),  None => Step::Skip }
    }
}

impl Step {
    fn flatten_into(self, out: &mut Vec<Box<dyn Transform>>) {
        match self {
            Step::One(mut t) => match t.take_children() {
                Some(children) => out.extend(children),
                None => out.push(t),
            },
            Step::Many(c) => out.extend(c.steps),
            Step::Seq(v) => for s in v { s.flatten_into(out) },
            Step::Skip => (),
        }
    }

    fn flatten(self) -> Vec<Box<dyn Transform>> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }
}

impl Composite {
    /// Compose `steps`, the first one being applied first.
    pub fn new<I>(steps: I) -> Self
    where I: IntoIterator, I::Item: Into<Step> {
        let steps = Step::Seq(steps.into_iter().map(Into::into).collect());
        Composite { steps: steps.flatten(),  boundary: Boundary::NONE }
    }

    pub fn with_boundary(mut self, b: Boundary) -> Self {
        self.boundary = b;
        self
    }

    /// Number of (flattened) transforms.
    pub fn len(&self) -> usize { self.steps.len() }

    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    /// Return the `i`th transform.
    pub fn get(&self, i: usize) -> Option<&dyn Transform> {
        self.steps.get(i).map(|t| t.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Transform> + '_ {
        self.steps.iter().map(|t| t.as_ref())
    }

    /// Add `step` to be applied last.
    pub fn append(&mut self, step: impl Into<Step>) {
        step.into().flatten_into(&mut self.steps);
    }

    /// Add `step` to be applied first.
    pub fn prepend(&mut self, step: impl Into<Step>) {
        let new = step.into().flatten();
        self.steps.splice(0..0, new);
    }

    /// Return the composite applying `self` and then `step`.
    pub fn then(mut self, step: impl Into<Step>) -> Self {
        self.append(step);
        self
    }

    /// Replace the `i`th transform by `step` (which may expand to
    /// several transforms or to none).
    pub fn replace(&mut self, i: usize, step: impl Into<Step>)
                   -> Result<(), ConfigError> {
        if i >= self.steps.len() {
            return Err(ConfigError::Index { index: i, len: self.steps.len() })
        }
        let new = step.into().flatten();
        self.steps.splice(i ..= i, new);
        Ok(())
    }

    /// Remove and return the `i`th transform.
    pub fn remove(&mut self, i: usize)
                  -> Result<Box<dyn Transform>, ConfigError> {
        if i >= self.steps.len() {
            return Err(ConfigError::Index { index: i, len: self.steps.len() })
        }
        Ok(self.steps.remove(i))
    }
}

impl Transform for Composite {
    fn eval_with(&self, x: f64, y: f64, b: &Boundary)
                 -> Result<[f64; 2], DomainError> {
        let mut p = [x, y];
        for t in &self.steps {
            p = t.eval_with(p[0], p[1], b)?;
        }
        Ok(p)
    }

    fn boundary(&self) -> &Boundary { &self.boundary }

    fn name(&self) -> String {
        let names: Vec<_> = self.steps.iter()
            .map(|t| format!("({})", t.name())).collect();
        names.join(" -> ")
    }

    fn is_affine(&self) -> bool { self.steps.iter().all(|t| t.is_affine()) }

    fn take_children(&mut self) -> Option<Vec<Box<dyn Transform>>> {
        Some(std::mem::take(&mut self.steps))
    }
}

impl Debug for Composite {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("steps", &self.name())
            .field("boundary", &self.boundary)
            .finish()
    }
}


////////////////////////////////////////////////////////////////////////
//
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    fn window() -> Window {
        let bb = BoundingBox { xmin: 0., xmax: 10., ymin: -1., ymax: 1. };
        Window::new(0., 0., 100., 50., bb).unwrap()
    }

    #[test]
    fn window_linear() {
        let w = window();
        assert!(close(w.eval(0., -1.).unwrap(), [0., 50.]));
        assert!(close(w.eval(10., 1.).unwrap(), [100., 0.]));
        assert!(close(w.eval(5., 0.).unwrap(), [50., 25.]));
        // Affine: the image of a midpoint is the midpoint of images.
        let p = w.eval(2., 0.3).unwrap();
        let q = w.eval(8., -0.5).unwrap();
        let m = w.eval(5., -0.1).unwrap();
        assert!(close(m, [(p[0] + q[0]) / 2., (p[1] + q[1]) / 2.]));
        let d0 = w.derivative(1., 0.2).unwrap();
        let d1 = w.derivative(-7., 30.).unwrap();
        assert_eq!(d0, d1);
        assert_eq!(d0, Derivative { dx: [10., 0.], dy: [0., -25.] });
        assert_eq!(w.normalized_derivative(3., 0.).unwrap(), Directions::AXES);
        assert!(close(w.invert(50., 25.), [5., 0.]));
    }

    #[test]
    fn window_log() {
        let bb = BoundingBox { xmin: 1., xmax: 1000., ymin: 0., ymax: 1. };
        let w = Window::new(0., 0., 300., 10., bb).unwrap().log_x(10.).unwrap();
        assert!(close(w.eval(10., 0.).unwrap(), [100., 10.]));
        assert!(close(w.eval(100., 1.).unwrap(), [200., 0.]));
        assert_eq!(w.eval(0., 0.5),
                   Err(DomainError::LogAxis { axis: 'x', value: 0. }));
        assert!(!w.contains(-3., 0.5));
        let w = w.with_boundary(Boundary { minus_infinity_x: Some(-5.),
                                           ..Boundary::NONE });
        assert!(close(w.eval(-3., 0.5).unwrap(), [-5., 5.]));
        assert!(close(w.invert(200., 5.), [100., 0.5]));
        assert!(!w.is_affine());
    }

    #[test]
    fn window_config_errors() {
        let bb = BoundingBox { xmin: 0., xmax: 10., ymin: -1., ymax: 1. };
        let w = Window::new(0., 0., 1., 1., bb).unwrap();
        assert_eq!(w.clone().log_x(10.).unwrap_err(),
                   ConfigError::LogBound { bound: "xmin", value: 0.,
                                           base: 10. });
        assert_eq!(w.clone().log_y(10.).unwrap_err(),
                   ConfigError::LogBound { bound: "ymin", value: -1.,
                                           base: 10. });
        assert_eq!(w.log_x(1.).unwrap_err(), ConfigError::LogBase(1.));
        let bb = BoundingBox { xmin: 1., xmax: 1., ymin: -1., ymax: 1. };
        assert!(Window::new(0., 0., 1., 1., bb).is_err());
    }

    #[test]
    fn linear_derivative_is_exact() {
        let l = Linear::new(2., 0., 0., -3., 1., 1.);
        assert_eq!(l.derivative(5., 5.).unwrap(),
                   Derivative { dx: [2., 0.], dy: [0., -3.] });
        assert_eq!(l.normalized_derivative(0., 0.).unwrap(),
                   Directions { x_hat: Some([1., 0.]), y_hat: Some([0., -1.]) });
        let degenerate = Linear::new(0., 0., 1., 1., 0., 0.);
        let dir = degenerate.normalized_derivative(0., 0.).unwrap();
        assert_eq!(dir.x_hat, None);
        assert!(dir.y_hat.is_some());
    }

    #[test]
    fn linear_boundary() {
        let l = Linear::identity().with_boundary(
            Boundary { minus_infinity_x: Some(-1.), ..Boundary::NONE });
        assert_eq!(l.eval(f64::NEG_INFINITY, 2.).unwrap(), [-1., 2.]);
        assert_eq!(l.eval(f64::INFINITY, 2.), Err(DomainError::NotFinite));
    }

    #[test]
    fn fn_transform() {
        let polar = from_fn(|r, a| Ok([r * a.cos(), r * a.sin()]));
        assert!(close(polar.eval(2., 0.).unwrap(), [2., 0.]));
        let d = polar.derivative(1., 0.).unwrap();
        assert!((d.dx[0] - 1.).abs() < 1e-4 && d.dx[1].abs() < 1e-4);
        assert!(d.dy[0].abs() < 1e-4 && (d.dy[1] - 1.).abs() < 1e-4);
        let dir = polar.normalized_derivative(0., 0.).unwrap();
        // At r = 0, moving the angle does not move the point.
        assert!(dir.x_hat.is_some());
        assert_eq!(dir.y_hat, None);

        let sqrt = from_fn(|x, y| {
            if x < 0. { Err(DomainError::Undefined("sqrt".into())) }
            else { Ok([x.sqrt(), y]) }
        });
        assert!(sqrt.contains(4., 0.));
        assert!(!sqrt.contains(-4., 0.));
        let nan = from_fn(|x, y| Ok([x.ln(), y]));
        assert_eq!(nan.eval(-1., 0.), Err(DomainError::NotFinite));
    }

    #[test]
    fn fn_transform_sees_boundary() {
        let t = FnTransform::new(|x, y, b: &Boundary| {
            Ok([if x < 0. { b.minus_infinity_x.unwrap_or(0.) } else { x }, y])
        }).named("clamp");
        assert_eq!(t.name(), "clamp");
        assert_eq!(t.eval(-1., 0.).unwrap(), [0., 0.]);
        let b = Boundary { minus_infinity_x: Some(-9.), ..Boundary::NONE };
        assert_eq!(t.eval_with(-1., 0., &b).unwrap(), [-9., 0.]);
    }

    #[test]
    fn complex_transform() {
        let exp = from_complex(|z| z.exp());
        assert_eq!(exp.name(), "z -> f(z)");
        assert!(close(exp.eval(0., std::f64::consts::PI).unwrap(), [-1., 0.]));
        // The derivative of an analytic map is a similarity.
        let d = exp.derivative(0.5, 0.3).unwrap();
        assert!((d.dx[0] - d.dy[1]).abs() < 1e-4);
        assert!((d.dx[1] + d.dy[0]).abs() < 1e-4);

        let inv = from_complex(|z| Complex64::new(1., 0.) / z);
        assert!(close(inv.eval(0., 2.).unwrap(), [0., -0.5]));
        assert_eq!(inv.eval(0., 0.), Err(DomainError::NotFinite));

        let id = from_complex(|z| z).named("id").with_boundary(
            Boundary { plus_infinity_x: Some(100.), ..Boundary::NONE });
        assert_eq!(id.eval(f64::INFINITY, 2.).unwrap(), [100., 2.]);
        assert_eq!(id.eval(1., f64::INFINITY), Err(DomainError::NotFinite));
    }

    #[test]
    fn composite_flattening() {
        let inner = Composite::new([Linear::translate(1., 0.),
                                    Linear::scale(2., 2.)]);
        let steps: Vec<Step> = vec![
            Linear::translate(0., 1.).into(),
            inner.into(),
            Step::Skip,
            Step::Seq(vec![None::<Linear>.into(),
                           Linear::scale(10., 1.).into()]),
        ];
        let c = Composite::new(steps);
        assert_eq!(c.len(), 4);
        assert!(c.iter().all(|t| t.is_affine()));
        // (0,0) → (0,1) → (1,1) → (2,2) → (20,2)
        assert_eq!(c.eval(0., 0.).unwrap(), [20., 2.]);

        // A boxed composite is flattened too.
        let boxed: Box<dyn Transform> = Box::new(
            Composite::new([Linear::identity(), Linear::identity()]));
        let mut c = c.then(boxed);
        assert_eq!(c.len(), 6);
        c.prepend(Composite::new([Linear::translate(-1., 0.)]));
        assert_eq!(c.len(), 7);
        assert_eq!(c.eval(1., 0.).unwrap(), [20., 2.]);
        c.replace(0, Composite::new([Linear::identity(),
                                     Linear::identity()])).unwrap();
        assert_eq!(c.len(), 8);
        assert!(c.remove(8).is_err());
        c.remove(0).unwrap();
        assert_eq!(c.len(), 7);
        assert!(c.replace(7, Linear::identity()).is_err());
    }

    #[test]
    fn composite_threads_boundary() {
        let bb = BoundingBox { xmin: 1., xmax: 100., ymin: 0., ymax: 1. };
        let w = Window::new(0., 0., 2., 1., bb).unwrap().log_x(10.).unwrap()
            .with_boundary(Boundary { minus_infinity_x: Some(7.),
                                      ..Boundary::NONE });
        let mut c = Composite::new([Linear::identity()]);
        c.append(w);
        // The child's own boundary is not used inside the composite.
        assert!(c.eval(-1., 0.).is_err());
        let c = c.with_boundary(Boundary { minus_infinity_x: Some(-3.),
                                           ..Boundary::NONE });
        assert_eq!(c.eval(-1., 0.).unwrap(), [-3., 1.]);
        assert!(!c.is_affine());
    }
}
