//! Adaptive sampling of parametric curves.
//!
//! The curve `t ↦ f(t)` is evaluated at both ends of \[`low`,
//! `high`\], then each interval between consecutive samples is cut
//! at a (jittered) midpoint until, in device coordinates, the
//! midpoint is closer than `linearity_limit` to the chord joining the
//! endpoints.  Spans that cannot be made straight before
//! `recursion_limit` subdivisions are treated as discontinuities.

use std::fmt::{self, Display, Formatter};
use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use crate::{BoundingBox,
            chain::{Chain, Witness},
            error::{check_range, ConfigError, Error},
            path::{Attributes, Path, PathSink},
            transform::Transform};

/// Intervals are always subdivided until this depth.
const MIN_DEPTH: usize = 3;

/// One evaluation of the parametric function.  Data coordinates
/// (`x`, `y`) are `None` where the function is undefined; device
/// coordinates (`dev_x`, `dev_y`) are `None` where, in addition, the
/// transform is undefined.  A sample without device coordinates is a
/// cut in the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub t: f64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub dev_x: Option<f64>,
    pub dev_y: Option<f64>,
}

impl Sample {
    #[inline]
    fn undefined(t: f64) -> Self {
        Sample { t, x: None, y: None, dev_x: None, dev_y: None }
    }

    /// Data coordinates, if defined.
    #[inline]
    pub fn data(&self) -> Option<[f64; 2]> {
        Some([self.x?, self.y?])
    }

    /// Device coordinates, if defined.
    #[inline]
    pub fn device(&self) -> Option<[f64; 2]> {
        Some([self.dev_x?, self.dev_y?])
    }

    /// Mark the sample as a cut in the path.
    #[inline]
    fn cut(&mut self) {
        self.y = None;
        self.dev_y = None;
    }
}

/// A sampled curve: the samples ordered by their parameter.
#[derive(Debug, Clone)]
pub struct Sampling {
    chain: Chain<Sample>,
}


////////////////////////////////////////////////////////////////////////
//
// Options

#[derive(Debug, Clone, Copy)]
struct Options {
    low: f64,
    high: f64,
    random_sampling: bool,
    recursion_limit: usize,
    linearity_limit: f64,
    discontinuity_limit: f64,
    seed: Option<u64>,
}

impl Options {
    fn new(low: f64, high: f64) -> Self {
        Options { low, high,
                  random_sampling: true,
                  recursion_limit: 15,
                  linearity_limit: 0.1,
                  discontinuity_limit: 5.,
                  seed: None }
    }

    fn check(&self) -> Result<(), ConfigError> {
        check_range(self.low, self.high)?;
        if !(self.linearity_limit > 0. && self.linearity_limit.is_finite()) {
            return Err(ConfigError::BadLimit {
                name: "linearity_limit", value: self.linearity_limit })
        }
        if !(self.discontinuity_limit > 0.
             && self.discontinuity_limit.is_finite()) {
            return Err(ConfigError::BadLimit {
                name: "discontinuity_limit", value: self.discontinuity_limit })
        }
        Ok(())
    }
}

/// Add the standard option setters to `$struct` (which must have an
/// `opt: Options` field).
macro_rules! option_setters {
    ($struct: ident) => {
        impl<F> $struct<F> {
            /// Whether the interval cuts are jittered (uniformly in
            /// \[0.3, 0.7\] of the interval) rather than exact
            /// midpoints.  Jittering avoids aliasing with periodic
            /// features.  Default: `true`.
            pub fn random_sampling(mut self, yes: bool) -> Self {
                self.opt.random_sampling = yes;
                self
            }

            /// Maximum number of successive subdivisions of an
            /// interval.  Default: 15 (10 for [`Sampling::line`]).
            pub fn recursion_limit(mut self, n: usize) -> Self {
                self.opt.recursion_limit = n;
                self
            }

            /// Maximum distance, in device units, between a
            /// midpoint and the chord of its interval.  Default: 0.1.
            pub fn linearity_limit(mut self, d: f64) -> Self {
                self.opt.linearity_limit = d;
                self
            }

            /// Chords longer than the square of this value, in device
            /// units, are always subdivided.  Default: 5.
            pub fn discontinuity_limit(mut self, d: f64) -> Self {
                self.opt.discontinuity_limit = d;
                self
            }

            /// Seed the generator of the jitter, making the sampling
            /// reproducible.
            pub fn seed(mut self, seed: u64) -> Self {
                self.opt.seed = Some(seed);
                self
            }
        }
    }
}

/// Define a constructor on [`Sampling`] returning an options
/// structure holding the function.
macro_rules! new_sampling_fn {
    ($(#[$docfn: meta])* $fun: ident -> $ft: ty,
     $(#[$doc: meta])* $struct: ident) => {
        impl Sampling {
            $(#[$docfn])*
            ///
            /// The sampling is computed by `build`, which fails if
            /// `low` or `high` is not finite or if `low >= high`.
            #[must_use]
            pub fn $fun<F>(f: F, low: f64, high: f64) -> $struct<F>
            where F: FnMut(f64) -> $ft {
                $struct { f, opt: Options::new(low, high) }
            }
        }

        $(#[$doc])*
        pub struct $struct<F> {
            f: F,
            opt: Options,
        }

        option_setters!($struct);
    }
}

new_sampling_fn!(
    /// Sample the *image* of `f` on the interval \[`low`, `high`\].
    /// A non-finite coordinate means that `f` is undefined at `t`.
    ///
    /// # Example
    ///
    /// ```
    /// use adaptive_plot::{Sampling, transform::Linear};
    /// let s = Sampling::param(|t: f64| [t.cos(), t.sin()], 0., 6.)
    ///     .build(&Linear::scale(100., 100.)).unwrap();
    /// assert!(s.len() > 20);
    /// ```
    param -> [f64; 2],
    /// Options for sampling a parametric curve.  See [`Sampling::param`].
    Param);

new_sampling_fn!(
    /// Sample the *graph* of `f` on the interval \[`low`, `high`\].
    /// A non-finite value means that `f` is undefined at `x`.
    fun -> f64,
    /// Options for sampling a function ℝ → ℝ.  See [`Sampling::fun`].
    Fun);

new_sampling_fn!(
    /// Sample the image of a fallible `f` on \[`low`, `high`\].
    /// Domain errors are cuts in the path; configuration errors (for
    /// example a wrong number of components) abort the sampling.
    try_param -> Result<[f64; 2], Error>,
    /// Options for sampling a fallible parametric curve.
    /// See [`Sampling::try_param`].
    TryParam);

impl<F> Param<F>
where F: FnMut(f64) -> [f64; 2] {
    /// Return the sampling of the curve in the device coordinates of
    /// `tr`.
    pub fn build<T>(&mut self, tr: &T) -> Result<Sampling, ConfigError>
    where T: Transform + ?Sized {
        let f = &mut self.f;
        Sampler::new(|t| Ok(f(t)), tr).run(&self.opt)
    }
}

impl<F> Fun<F>
where F: FnMut(f64) -> f64 {
    /// Return the sampling of the graph in the device coordinates of
    /// `tr`.
    pub fn build<T>(&mut self, tr: &T) -> Result<Sampling, ConfigError>
    where T: Transform + ?Sized {
        let f = &mut self.f;
        Sampler::new(|x| Ok([x, f(x)]), tr).run(&self.opt)
    }
}

impl<F> TryParam<F>
where F: FnMut(f64) -> Result<[f64; 2], Error> {
    /// Return the sampling of the curve in the device coordinates of
    /// `tr`.
    pub fn build<T>(&mut self, tr: &T) -> Result<Sampling, ConfigError>
    where T: Transform + ?Sized {
        Sampler::new(&mut self.f, tr).run(&self.opt)
    }
}

/// Options for sampling a data-space segment.  See [`Sampling::line`].
pub struct Line<F> {
    f: F,
    opt: Options,
}

option_setters!(Line);

impl Sampling {
    /// Sample the segment from (`x1`, `y1`) to (`x2`, `y2`) in data
    /// coordinates.  Under a nonlinear transform, the segment is a
    /// curve in device coordinates.
    #[must_use]
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64)
                -> Line<impl FnMut(f64) -> [f64; 2]> {
        let f = move |t: f64| [x1 + t * (x2 - x1),  y1 + t * (y2 - y1)];
        let mut opt = Options::new(0., 1.);
        opt.recursion_limit = 10;
        Line { f, opt }
    }
}

impl<F> Line<F>
where F: FnMut(f64) -> [f64; 2] {
    pub fn build<T>(&mut self, tr: &T) -> Result<Sampling, ConfigError>
    where T: Transform + ?Sized {
        let f = &mut self.f;
        Sampler::new(|t| Ok(f(t)), tr).run(&self.opt)
    }
}


////////////////////////////////////////////////////////////////////////
//
// Sampling algorithm

struct Sampler<'a, G, T: ?Sized> {
    f: G,
    tr: &'a T,
    evaluations: usize,
}

impl<'a, G, T> Sampler<'a, G, T>
where G: FnMut(f64) -> Result<[f64; 2], Error>,
      T: Transform + ?Sized {
    fn new(f: G, tr: &'a T) -> Self {
        Sampler { f, tr, evaluations: 0 }
    }

    /// Evaluate the function and the transform at `t`.  Only
    /// configuration errors are reported.
    fn eval(&mut self, t: f64) -> Result<Sample, ConfigError> {
        self.evaluations += 1;
        let mut s = Sample::undefined(t);
        match (self.f)(t) {
            Ok([x, y]) if x.is_finite() && y.is_finite() => {
                s.x = Some(x);
                s.y = Some(y);
                match self.tr.eval(x, y) {
                    Ok([u, v]) => {
                        s.dev_x = Some(u);
                        s.dev_y = Some(v);
                    }
                    Err(e) => trace!("t = {}: transform undefined at \
                                      ({}, {}): {}", t, x, y, e),
                }
            }
            Ok([x, y]) => trace!("t = {}: non-finite point ({}, {})", t, x, y),
            Err(Error::Domain(e)) => trace!("t = {}: {}", t, e),
            Err(Error::Config(e)) => return Err(e),
        }
        Ok(s)
    }

    fn run(mut self, opt: &Options) -> Result<Sampling, ConfigError> {
        opt.check()?;
        let mut rng = match opt.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut chain = Chain::new();
        let low = chain.push_back(self.eval(opt.low)?);
        chain.push_back(self.eval(opt.high)?);
        // Intervals still to examine, given by their left end and
        // depth.  The left half is pushed last so that its right end
        // is still the new midpoint when it is examined.
        let mut todo: Vec<(Witness, usize)> = vec![(low, 0)];
        let mut cuts = 0;
        while let Some((left, depth)) = todo.pop() {
            let Some(right) = chain.next(left) else { continue };
            let l = *chain.get(left);
            let r = *chain.get(right);
            let u = if opt.random_sampling { rng.gen_range(0.3 ..= 0.7) }
                    else { 0.5 };
            let m = self.eval(l.t + u * (r.t - l.t))?;
            let mid = chain.insert_after(left, m);

            let (Some(pl), Some(pr)) = (l.device(), r.device()) else {
                // Localize where the curve stops being defined.
                if depth < opt.recursion_limit {
                    todo.push((mid, depth + 1));
                    todo.push((left, depth + 1));
                }
                continue
            };
            let Some(pm) = m.device() else { continue };
            // Distance of `pm` to the chord [pl, pr] is |numer / denom|.
            let numer = pl[0] * (pr[1] - pm[1]) + pm[0] * (pl[1] - pr[1])
                + pr[0] * (pm[1] - pl[1]);
            let denom = (pl[0] - pr[0]).hypot(pl[1] - pr[1]);
            if depth < MIN_DEPTH
                || (denom == 0. && l.t != r.t)
                || denom > opt.discontinuity_limit.powi(2)
                || (denom != 0. && (numer / denom).abs() > opt.linearity_limit)
            {
                if depth < opt.recursion_limit {
                    todo.push((mid, depth + 1));
                    todo.push((left, depth + 1));
                } else {
                    // Still not straight at the finest resolution:
                    // break the path there.
                    trace!("discontinuity between t = {} and t = {}",
                           l.t, r.t);
                    chain.get_mut(mid).cut();
                    cuts += 1;
                }
            }
        }
        debug!("sampled [{}, {}] with {} evaluations, {} discontinuities",
               opt.low, opt.high, self.evaluations, cuts);
        Ok(Sampling { chain })
    }
}


////////////////////////////////////////////////////////////////////////
//
// Output

/// Iterator on the device points of a [`Sampling`], see
/// [`Sampling::iter`].
pub struct Iter<'a> {
    samples: crate::chain::Iter<'a, Sample>,
    prev_is_cut: bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Option<[f64; 2]>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let s = self.samples.next()?;
            match s.device() {
                Some(p) => {
                    self.prev_is_cut = false;
                    return Some(Some(p))
                }
                None => if !self.prev_is_cut {
                    self.prev_is_cut = true;
                    return Some(None)
                }
            }
        }
    }
}

impl Sampling {
    /// Number of samples (including cuts).
    pub fn len(&self) -> usize { self.chain.len() }

    pub fn is_empty(&self) -> bool { self.chain.is_empty() }

    /// All samples, in parameter order.
    pub fn samples(&self) -> impl DoubleEndedIterator<Item = &Sample> + '_ {
        self.chain.iter()
    }

    /// Iterate on the device points of the path.  A path is made of
    /// continuous pieces whose points are given by contiguous values
    /// `Some(p)` interspaced by `None`.  Two `None` never follow each
    /// other and the path never starts with `None`.
    pub fn iter(&self) -> Iter<'_> {
        Iter { samples: self.chain.iter(),  prev_is_cut: true }
    }

    /// Send the path to `sink`: a move to every point following a cut
    /// (or starting the path), a line to all other points.
    pub fn draw<S: PathSink + ?Sized>(&self, sink: &mut S) {
        let mut prev_defined = false;
        for s in self.chain.iter() {
            match s.device() {
                Some([x, y]) => {
                    if prev_defined { sink.line_to(x, y) }
                    else { sink.move_to(x, y) }
                    prev_defined = true;
                }
                None => prev_defined = false,
            }
        }
    }

    /// Return the path with the given attributes.
    pub fn to_path(&self, attributes: Attributes) -> Path {
        let mut p = Path::with_attributes(attributes);
        self.draw(&mut p);
        p
    }

    /// Data coordinates of the samples that are drawn.
    pub fn last_points(&self) -> Vec<[f64; 2]> {
        self.chain.iter()
            .filter(|s| s.device().is_some())
            .filter_map(|s| s.data())
            .collect()
    }

    /// Smallest rectangle containing all device points.  If there is
    /// none, the "min" fields are +∞ and the "max" fields -∞.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::of_points(self.chain.iter().filter_map(|s| s.device()))
    }

    /// Smallest rectangle containing the data points that are drawn.
    pub fn data_bounding_box(&self) -> BoundingBox {
        BoundingBox::of_points(self.last_points())
    }
}

impl Display for Sampling {
    /// Display the device points in a tabular form: each point is
    /// written as "X Y" on a single line (in scientific notation).  A
    /// cut is a blank line.  This format is compatible with Gnuplot.
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        for p in self.iter() {
            match p {
                Some([x, y]) => writeln!(f, "{:e} {:e}", x, y)?,
                None => writeln!(f)?,
            }
        }
        Ok(())
    }
}


////////////////////////////////////////////////////////////////////////
//
// Tests
