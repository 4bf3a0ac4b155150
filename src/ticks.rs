//! Placement of axis ticks.
//!
//! Major ticks are chosen so that their labels fit a budget of
//! characters; minor ticks fill the gaps between them.  All functions
//! are independent of any transform: the returned coordinates are
//! data coordinates.

use std::{cmp::Ordering,
          collections::{btree_map, BTreeMap},
          fmt::{self, Debug, Formatter}};
use log::debug;
use crate::{EPSILON,
            error::{check_range, ConfigError},
            format::number_format};

/// Maximum number of candidate ticks considered by [`ticks`].
const MAX_TICKS: usize = 1000;

/// `f64` numbers at the exclusion of NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NotNAN(f64);

impl Eq for NotNAN {}

impl PartialOrd for NotNAN {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NotNAN {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Tick positions with their labels, sorted by position.  An empty
/// label marks an unlabeled tick.
#[derive(Clone, Default, PartialEq)]
pub struct TickSet(BTreeMap<NotNAN, String>);

impl Debug for TickSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl TickSet {
    pub fn new() -> Self { TickSet(BTreeMap::new()) }

    /// Add a tick at `x` (replacing the label of an existing tick).
    /// NaN positions are ignored.
    pub fn insert(&mut self, x: f64, label: impl Into<String>) {
        if !x.is_nan() {
            self.0.insert(NotNAN(x), label.into());
        }
    }

    /// Label of the tick at `x`, if any.
    pub fn get(&self, x: f64) -> Option<&str> {
        self.0.get(&NotNAN(x)).map(String::as_str)
    }

    pub fn contains(&self, x: f64) -> bool {
        self.0.contains_key(&NotNAN(x))
    }

    /// Remove all ticks within [`EPSILON`] of `x`.
    pub fn remove_near(&mut self, x: f64) {
        self.0.retain(|k, _| !((k.0 - x).abs() < EPSILON));
    }

    /// Return the same positions, all unlabeled.
    #[must_use]
    pub fn unlabeled(&self) -> Self {
        TickSet(self.0.keys().map(|&k| (k, String::new())).collect())
    }

    /// Positions in increasing order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = f64> + '_ {
        self.0.keys().map(|k| k.0)
    }

    /// Positions and labels in increasing order of positions.
    pub fn iter(&self) -> Iter<'_> { Iter(self.0.iter()) }

    /// Ticks having a non-empty label.
    pub fn labeled(&self) -> impl Iterator<Item = (f64, &str)> + '_ {
        self.iter().filter(|(_, l)| !l.is_empty())
    }

    /// Total number of characters of the labels.
    pub fn label_chars(&self) -> usize {
        self.0.values().map(|l| l.chars().count()).sum()
    }

    pub fn first(&self) -> Option<f64> { self.keys().next() }

    pub fn last(&self) -> Option<f64> { self.keys().next_back() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Add the ticks of `other`; its labels win.
    pub fn merge(&mut self, other: &TickSet) {
        for (x, l) in other.iter() { self.insert(x, l) }
    }
}

impl<L: Into<String>> FromIterator<(f64, L)> for TickSet {
    fn from_iter<I: IntoIterator<Item = (f64, L)>>(iter: I) -> Self {
        let mut t = TickSet::new();
        for (x, l) in iter { t.insert(x, l) }
        t
    }
}

impl<L: Into<String>> Extend<(f64, L)> for TickSet {
    fn extend<I: IntoIterator<Item = (f64, L)>>(&mut self, iter: I) {
        for (x, l) in iter { self.insert(x, l) }
    }
}

/// Iterator on the ticks of a [`TickSet`], see [`TickSet::iter`].
pub struct Iter<'a>(btree_map::Iter<'a, NotNAN, String>);

impl<'a> Iterator for Iter<'a> {
    type Item = (f64, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, l)| (k.0, l.as_str()))
    }
}

impl<'a> IntoIterator for &'a TickSet {
    type Item = (f64, &'a str);
    type IntoIter = Iter<'a>;
    fn into_iter(self) -> Iter<'a> { self.iter() }
}


////////////////////////////////////////////////////////////////////////
//
// Linear ticks

/// Successive factors by which the granularity is reduced.
const SHRINK: [f64; 3] = [0.5, 0.4, 0.5];

/// Label of `x`, snapped to "0" when `x` is negligible with respect
/// to the range width `w`.
fn label<F: Fn(f64) -> String>(format: &F, x: f64, w: f64) -> String {
    if x.abs() < EPSILON * w { "0".to_string() } else { format(x) }
}

/// `n` evenly spaced labeled ticks from `low` to `high` (n ≥ 2).
pub fn ticks_regular(low: f64, high: f64, n: usize)
                     -> Result<TickSet, ConfigError> {
    ticks_regular_with(low, high, n, number_format)
}

/// Same as [`ticks_regular`] with a custom label format.
pub fn ticks_regular_with<F>(low: f64, high: f64, n: usize, format: F)
                             -> Result<TickSet, ConfigError>
where F: Fn(f64) -> String {
    check_range(low, high)?;
    if n < 2 { return Err(ConfigError::TooFewTicks { min: 2, got: n }) }
    let w = high - low;
    let dx = w / (n - 1) as f64;
    Ok((0 .. n).map(|i| {
        let x = if i == n - 1 { high } else { low + i as f64 * dx };
        (x, label(&format, x, w))
    }).collect())
}

/// Major ticks of \[`low`, `high`\] whose labels total at most
/// `max_chars` characters.  The finest "round" granularity (1, 2 or 5
/// times a power of ten) whose labels fit is chosen.  If even the
/// coarsest one does not fit, return just `low` and `high`.
pub fn ticks(low: f64, high: f64, max_chars: usize)
             -> Result<TickSet, ConfigError> {
    ticks_with(low, high, max_chars, number_format)
}

/// Same as [`ticks`] with a custom label format.
pub fn ticks_with<F>(low: f64, high: f64, max_chars: usize, format: F)
                     -> Result<TickSet, ConfigError>
where F: Fn(f64) -> String {
    check_range(low, high)?;
    let w = high - low;
    let mut shrink = SHRINK.into_iter().cycle();
    let mut granularity = 10f64.powf(low.abs().max(high.abs()).log10().ceil());
    let mut low_n = (low / granularity).ceil();
    let mut high_n = (high / granularity).floor();
    while low_n > high_n {
        granularity *= shrink.next().unwrap_or(0.5);
        low_n = (low / granularity).ceil();
        high_n = (high / granularity).floor();
    }

    let mut last: Option<(TickSet, f64)> = None;
    loop {
        let mut trial = TickSet::new();
        let mut chars = 0;
        let count = high_n - low_n + 1.;
        // Room is left for the two bounds added at the end.
        let fits = count <= (MAX_TICKS - 2) as f64 && {
            for i in 0 .. count as usize {
                if chars > max_chars { break }
                let x = (low_n + i as f64) * granularity;
                let l = label(&format, x, w);
                chars += l.chars().count();
                trial.insert(x, l);
            }
            chars <= max_chars
        };
        if !fits {
            let Some((mut last_trial, last_g)) = last else {
                debug!("no ticks of [{}, {}] fit in {} characters",
                       low, high, max_chars);
                return Ok([(low, format(low)), (high, format(high))]
                          .into_iter().collect())
            };
            extend_with_bound(&mut last_trial, low, last_g, &format);
            extend_with_bound(&mut last_trial, high, last_g, &format);
            return Ok(last_trial)
        }
        last = Some((trial, granularity));
        granularity *= shrink.next().unwrap_or(0.5);
        low_n = (low / granularity).ceil();
        high_n = (high / granularity).floor();
    }
}

/// Add the bound `b` to `t` if it lies on the grid of step `g` and
/// is not already there.
fn extend_with_bound<F>(t: &mut TickSet, b: f64, g: f64, format: &F)
where F: Fn(f64) -> String {
    let present = t.keys().any(|x| (x - b).abs() / g < EPSILON);
    let n = b / g;
    if !present && (n - n.round()).abs() < EPSILON {
        debug!("adding the bound {} to the ticks", b);
        t.insert(b, format(b));
    }
}

/// Maximum number of minor ticks produced by [`miniticks`].
const MAX_MINOR_TICKS: usize = 10 * MAX_TICKS;

/// Minor ticks of \[`low`, `high`\] complementing the major ticks
/// `major`: multiples of a power of ten about ten times smaller than
/// the smallest gap between major ticks, excluding the positions of
/// the major ticks.  If `major` has less than two ticks, the major
/// ticks are computed with [`ticks`] and the bounds are excluded as
/// well.  Otherwise, `major` must span \[`low`, `high`\].
pub fn miniticks(low: f64, high: f64, major: &TickSet)
                 -> Result<TickSet, ConfigError> {
    check_range(low, high)?;
    if major.len() < 2 {
        return minor_within(low, high, major)
    }
    let w = high - low;
    let keys: Vec<f64> = major.keys().collect();
    let (first, last) = (keys[0], keys[keys.len() - 1]);
    if first > low + EPSILON * w || last < high - EPSILON * w {
        return Err(ConfigError::TicksSpan { first, last, low, high })
    }
    fill_minor(low, high, &keys, false)
}

/// Minor ticks between the bounds, which need not be reached by
/// `major`.  With less than two majors, [`ticks`] provides them.
fn minor_within(low: f64, high: f64, major: &TickSet)
                -> Result<TickSet, ConfigError> {
    let keys: Vec<f64> = if major.len() < 2 {
        ticks(low, high, 20)?.keys().collect()
    } else {
        major.keys().collect()
    };
    fill_minor(low, high, &keys, true)
}

/// Points of the minor grid in \[`low`, `high`\] avoiding
/// `keys` (sorted) and, if `skip_bounds`, `low` and `high`.  The
/// spacing derives from the gaps between `keys`, or between the
/// bounds and `keys` when there are less than two of them.
fn fill_minor(low: f64, high: f64, keys: &[f64], skip_bounds: bool)
              -> Result<TickSet, ConfigError> {
    let w = high - low;
    let gap = if keys.len() >= 2 {
        keys.windows(2).map(|k| k[1] - k[0]).fold(f64::INFINITY, f64::min)
    } else {
        let mut all = vec![low];
        all.extend(keys.iter().filter(|&&x| low < x && x < high));
        all.push(high);
        all.windows(2).map(|k| k[1] - k[0]).fold(f64::INFINITY, f64::min)
    };
    let spacing = 10f64.powf((gap.log10() - 1.).ceil());
    if !(spacing > 0. && spacing.is_finite()) {
        return Err(ConfigError::TooManyTicks { count: f64::INFINITY,
                                               spacing, max: MAX_MINOR_TICKS })
    }
    // The grid goes through the first major tick.
    let x0 = keys.first().copied().unwrap_or(low);
    let i0 = -((x0 - low) / spacing).floor();
    let count = ((high - x0) / spacing).floor() - i0 + 1.;
    if count > MAX_MINOR_TICKS as f64 {
        return Err(ConfigError::TooManyTicks { count, spacing,
                                               max: MAX_MINOR_TICKS })
    }
    let near = |x: f64, t: f64| (x - t).abs() < EPSILON * w;
    let mut minor = TickSet::new();
    for i in 0 .. count.max(0.) as usize {
        let x = x0 + (i0 + i as f64) * spacing;
        if keys.iter().any(|&t| near(x, t))
            || (skip_bounds && (near(x, low) || near(x, high))) { continue }
        minor.insert(x, "");
    }
    Ok(minor)
}


////////////////////////////////////////////////////////////////////////
//
// Logarithmic ticks

fn check_log(low: f64, high: f64, base: f64) -> Result<(), ConfigError> {
    check_range(low, high)?;
    if !(base > 1. && base.is_finite()) { return Err(ConfigError::LogBase(base)) }
    if low <= 0. {
        return Err(ConfigError::LogBound { bound: "low", value: low, base })
    }
    Ok(())
}

/// Integer powers of `base` in \[`low`, `high`\].
fn powers(low: f64, high: f64, base: f64) -> impl Iterator<Item = f64> {
    let n0 = low.log(base).floor() as i32;
    let n1 = high.log(base).ceil() as i32;
    (n0 ..= n1).map(move |n| base.powi(n))
        .filter(move |x| low <= *x && *x <= high)
}

/// Major ticks of a logarithmic axis: the powers of `base` in
/// \[`low`, `high`\].  If their labels exceed `max_chars`
/// characters, only one power out of 2, 3,... is labeled.  When there
/// are two powers or less in the range, linear ticks are added.
pub fn logticks(low: f64, high: f64, base: f64, max_chars: usize)
                -> Result<TickSet, ConfigError> {
    logticks_with(low, high, base, max_chars, number_format)
}

/// Same as [`logticks`] with a custom label format.
pub fn logticks_with<F>(low: f64, high: f64, base: f64, max_chars: usize,
                        format: F) -> Result<TickSet, ConfigError>
where F: Fn(f64) -> String {
    check_log(low, high, base)?;
    let keys: Vec<f64> = powers(low, high, base).collect();
    let mut out: TickSet = keys.iter().map(|&x| (x, format(x))).collect();
    for i in 1 .. keys.len() {
        let chars: usize = keys.iter().step_by(i)
            .map(|&x| out.get(x).map_or(0, |l| l.chars().count())).sum();
        if chars <= max_chars {
            for (j, &x) in keys.iter().enumerate() {
                if j % i != 0 { out.insert(x, "") }
            }
            break
        }
    }
    if out.len() <= 2 {
        debug!("only {} powers of {} in [{}, {}], adding linear ticks",
               out.len(), base, low, high);
        let mut lin = ticks_with(low, high, max_chars.div_ceil(2), &format)?;
        if let Some(lowest) = lin.first() {
            for (x, l) in out.iter() {
                if x < lowest { lin.insert(x, l) }
            }
        }
        out = lin;
    }
    Ok(out)
}

/// Minor ticks of a logarithmic axis: `m` times the powers of `base`
/// for `m` = 2,…,⌈`base`⌉ - 1.  Empty if the range holds two powers
/// of `base` or less.
pub fn logminiticks(low: f64, high: f64, base: f64)
                    -> Result<TickSet, ConfigError> {
    check_log(low, high, base)?;
    let n0 = low.log(base).floor() as i32;
    let n1 = high.log(base).ceil() as i32;
    let mut out = TickSet::new();
    let mut num_major = 0;
    for n in n0 ..= n1 {
        let x = base.powi(n);
        if low <= x && x <= high { num_major += 1 }
        for m in 2 .. base.ceil() as u32 {
            let y = m as f64 * x;
            if low <= y && y <= high { out.insert(y, "") }
        }
    }
    if num_major <= 2 { Ok(TickSet::new()) } else { Ok(out) }
}


////////////////////////////////////////////////////////////////////////
//
// Planner

/// Tick placement for an axis, with the options of the above
/// functions as a builder.
///
/// ```
/// use adaptive_plot::TickPlanner;
/// let p = TickPlanner::new(0., 100.).unwrap().max_chars(20);
/// let major = p.linear().unwrap();
/// assert_eq!(major.get(0.), Some("0"));
/// // Majors every 20, minors at 10, 30, 50, 70 and 90.
/// assert_eq!(p.minor(&major).unwrap().len(), 5);
/// ```
pub struct TickPlanner {
    low: f64,
    high: f64,
    max_chars: usize,
    log_base: Option<f64>,
    format: Box<dyn Fn(f64) -> String>,
}

impl Debug for TickPlanner {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickPlanner")
            .field("low", &self.low).field("high", &self.high)
            .field("max_chars", &self.max_chars)
            .field("log_base", &self.log_base)
            .finish_non_exhaustive()
    }
}

impl TickPlanner {
    /// Planner for the range \[`low`, `high`\], with a budget of 20
    /// characters and [`number_format`] labels.
    pub fn new(low: f64, high: f64) -> Result<Self, ConfigError> {
        check_range(low, high)?;
        Ok(TickPlanner { low, high, max_chars: 20, log_base: None,
                         format: Box::new(number_format) })
    }

    pub fn max_chars(mut self, n: usize) -> Self {
        self.max_chars = n;
        self
    }

    /// Use a custom label format.
    pub fn format(mut self, f: impl Fn(f64) -> String + 'static) -> Self {
        self.format = Box::new(f);
        self
    }

    /// Make the axis logarithmic in base `base`.  [`Self::major`] and
    /// [`Self::minor`] then use logarithmic ticks.
    pub fn log(mut self, base: f64) -> Result<Self, ConfigError> {
        check_log(self.low, self.high, base)?;
        self.log_base = Some(base);
        Ok(self)
    }

    pub fn range(&self) -> (f64, f64) { (self.low, self.high) }

    /// Linear major ticks, see [`ticks`].
    pub fn linear(&self) -> Result<TickSet, ConfigError> {
        ticks_with(self.low, self.high, self.max_chars, &self.format)
    }

    /// `n` regular ticks, see [`ticks_regular`].
    pub fn regular(&self, n: usize) -> Result<TickSet, ConfigError> {
        ticks_regular_with(self.low, self.high, n, &self.format)
    }

    /// Major ticks according to the axis kind.
    pub fn major(&self) -> Result<TickSet, ConfigError> {
        match self.log_base {
            Some(base) => logticks_with(self.low, self.high, base,
                                        self.max_chars, &self.format),
            None => self.linear(),
        }
    }

    /// Minor ticks according to the axis kind.  For a linear axis,
    /// the major ticks need not reach the bounds of the range and no
    /// minor tick is put on the bounds.
    pub fn minor(&self, major: &TickSet) -> Result<TickSet, ConfigError> {
        match self.log_base {
            Some(base) => logminiticks(self.low, self.high, base),
            None => minor_within(self.low, self.high, major),
        }
    }
}
