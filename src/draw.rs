//! Drawable elements.  Each one maps its data points through a
//! [`Transform`] and sends the result to a [`PathSink`].  Points where
//! the transform is undefined break the path.
//!
//! Styles are plain values: start from `Default::default()` (which
//! holds the defaults of the element) and override fields or
//! attributes with [`Attributes::merge`].

use log::debug;
use crate::{BoundingBox,
            error::{check_range, ConfigError},
            path::{Arc, Attributes, Path, PathSink},
            sampling::Sampling,
            ticks::{TickPlanner, TickSet},
            transform::Transform,
            EPSILON};

/// An element that can be drawn under a transform.
pub trait Drawable {
    /// Attributes of the rendered path.
    fn attributes(&self) -> &Attributes;

    /// Send the primitives of the element, in device coordinates, to
    /// `sink`.
    fn draw(&self, tr: &dyn Transform, sink: &mut dyn PathSink);

    /// Record the element in a [`Path`].
    fn to_path(&self, tr: &dyn Transform) -> Path {
        let mut p = Path::with_attributes(self.attributes().clone());
        self.draw(tr, &mut p);
        p
    }
}

#[inline]
fn eval(tr: &dyn Transform, [x, y]: [f64; 2]) -> Option<[f64; 2]> {
    tr.eval(x, y).ok()
}

#[inline]
fn add(p: [f64; 2], v: [f64; 2], s: f64) -> [f64; 2] {
    [p[0] + s * v[0], p[1] + s * v[1]]
}

/// Draw a segment of length `2 * len` centered at `p` in direction
/// `dir` and come back to `p`.
fn mark(sink: &mut dyn PathSink, p: [f64; 2], dir: [f64; 2], len: f64) {
    let [x0, y0] = add(p, dir, -len);
    let [x1, y1] = add(p, dir, len);
    sink.move_to(x0, y0);
    sink.line_to(x1, y1);
    sink.move_to(p[0], p[1]);
}


////////////////////////////////////////////////////////////////////////
//
// Paths given by commands

/// A point either in data coordinates (mapped by the transform) or in
/// device coordinates (used as is).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub device: bool,
}

impl Point {
    pub fn data(x: f64, y: f64) -> Self { Point { x, y, device: false } }

    pub fn device(x: f64, y: f64) -> Self { Point { x, y, device: true } }

    fn map(&self, tr: &dyn Transform) -> Option<[f64; 2]> {
        if self.device { Some([self.x, self.y]) }
        else { eval(tr, [self.x, self.y]) }
    }
}

/// A command of a [`DataPath`], with absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    /// Line to the point with this x and the current y.
    Horizontal(f64),
    /// Line to the point with this y and the current x.
    Vertical(f64),
    CurveTo { c1: Point, c2: Point, to: Point },
    /// Elliptical arc.  For a data point `to`, the radii are measured
    /// in data units at `to`.
    ArcTo { rx: f64, ry: f64, rotation: f64, large_arc: bool, sweep: bool,
            to: Point },
    Close,
}

/// A path given by commands.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPath {
    pub segments: Vec<Segment>,
    pub attributes: Attributes,
}

impl DataPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        DataPath { segments, attributes: Attributes::new() }
    }

    #[must_use]
    pub fn with_attributes(mut self, overrides: &Attributes) -> Self {
        self.attributes = self.attributes.merge(overrides);
        self
    }
}

impl Drawable for DataPath {
    fn attributes(&self) -> &Attributes { &self.attributes }

    fn draw(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        let mut current: Option<Point> = None;
        let mut start: Option<Point> = None;
        // `true` when the next defined point must start a sub-path.
        let mut broken = true;
        for seg in &self.segments {
            let to = match *seg {
                Segment::MoveTo(p) => {
                    current = Some(p);
                    start = Some(p);
                    match p.map(tr) {
                        Some([x, y]) => { sink.move_to(x, y); broken = false }
                        None => broken = true,
                    }
                    continue
                }
                Segment::LineTo(p) => p,
                Segment::Horizontal(x) => match current {
                    Some(c) => Point { x, ..c },
                    None => { broken = true; continue }
                },
                Segment::Vertical(y) => match current {
                    Some(c) => Point { y, ..c },
                    None => { broken = true; continue }
                },
                Segment::CurveTo { c1, c2, to } => {
                    current = Some(to);
                    match (c1.map(tr), c2.map(tr), to.map(tr)) {
                        (Some(c1), Some(c2), Some([x, y])) => {
                            if broken { sink.move_to(x, y); broken = false }
                            else { sink.curve_to(c1, c2, x, y) }
                        }
                        _ => broken = true,
                    }
                    continue
                }
                Segment::ArcTo { rx, ry, rotation, large_arc, sweep, to } => {
                    current = Some(to);
                    let radii = if to.device { Some([rx, ry]) } else {
                        match (to.map(tr), eval(tr, [to.x + rx, to.y + ry])) {
                            (Some(c), Some(r)) => Some([(r[0] - c[0]).abs(),
                                                        (r[1] - c[1]).abs()]),
                            _ => None,
                        }
                    };
                    match (radii, to.map(tr)) {
                        (Some([rx, ry]), Some([x, y])) => {
                            if broken { sink.move_to(x, y); broken = false }
                            else {
                                sink.arc_to(Arc { rx, ry, rotation, large_arc,
                                                  sweep, x, y })
                            }
                        }
                        _ => broken = true,
                    }
                    continue
                }
                Segment::Close => {
                    if !broken { sink.close() }
                    current = start;
                    continue
                }
            };
            current = Some(to);
            match to.map(tr) {
                Some([x, y]) => {
                    if broken { sink.move_to(x, y); broken = false }
                    else { sink.line_to(x, y) }
                }
                None => broken = true,
            }
        }
    }
}


////////////////////////////////////////////////////////////////////////
//
// Curves through points

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveMode {
    /// Straight segments.
    Lines,
    /// Cubic Bézier segments whose tangents are given by central
    /// differences.
    Smooth,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurveStyle {
    pub mode: CurveMode,
    /// Join the last point to the first one.
    pub closed: bool,
    pub attributes: Attributes,
}

impl Default for CurveStyle {
    fn default() -> Self {
        CurveStyle { mode: CurveMode::Lines,  closed: false,
                     attributes: Attributes::new().with("stroke-width", "0.5pt") }
    }
}

/// A curve through data points.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub points: Vec<[f64; 2]>,
    style: CurveStyle,
}

impl Curve {
    pub fn new(points: Vec<[f64; 2]>, style: CurveStyle) -> Self {
        Curve { points, style }
    }

    pub fn style(&self) -> &CurveStyle { &self.style }

    /// Half the difference of the neighbors of each point, in data
    /// coordinates.  Zero at the ends of an open curve.
    fn velocities(&self) -> Vec<[f64; 2]> {
        let p = &self.points;
        let n = p.len();
        (0 .. n).map(|i| {
            if !self.style.closed && (i == 0 || i == n - 1) { return [0., 0.] }
            let (next, prev) = (p[(i + 1) % n], p[(i + n - 1) % n]);
            [(next[0] - prev[0]) / 2., (next[1] - prev[1]) / 2.]
        }).collect()
    }
}

impl Drawable for Curve {
    fn attributes(&self) -> &Attributes { &self.style.attributes }

    fn draw(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        let p = &self.points;
        let n = p.len();
        if n == 0 { return }
        let v = match self.style.mode {
            CurveMode::Smooth => self.velocities(),
            CurveMode::Lines => vec![],
        };
        let mut broken = true;
        let mut drawn = false;
        let closing = if self.style.closed { Some(0) } else { None };
        for i in (0 .. n).chain(closing) {
            let Some([x, y]) = eval(tr, p[i]) else {
                broken = true;
                continue
            };
            if broken {
                sink.move_to(x, y);
                broken = false;
                drawn = true;
                continue
            }
            match self.style.mode {
                CurveMode::Lines => sink.line_to(x, y),
                CurveMode::Smooth => {
                    let prev = (i + n - 1) % n;
                    let c1 = eval(tr, add(p[prev], v[prev], 1. / 3.));
                    let c2 = eval(tr, add(p[i], v[i], -1. / 3.));
                    match (c1, c2) {
                        (Some(c1), Some(c2)) => sink.curve_to(c1, c2, x, y),
                        _ => sink.line_to(x, y),
                    }
                }
            }
        }
        if self.style.closed && drawn && !broken { sink.close() }
    }
}


////////////////////////////////////////////////////////////////////////
//
// Scatter plots

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterStyle {
    /// Radius of the dots, in device units.
    pub radius: f64,
    pub attributes: Attributes,
}

impl Default for ScatterStyle {
    fn default() -> Self {
        ScatterStyle { radius: 1.,
                       attributes: Attributes::new().with("stroke", "none")
                                                    .with("fill", "black") }
    }
}

/// Draw a dot of radius `r` at `c` as four quarter arcs.
fn dot(sink: &mut dyn PathSink, [x, y]: [f64; 2], r: f64) {
    let arc = |x, y| Arc { rx: r, ry: r, rotation: 0., large_arc: false,
                           sweep: false, x, y };
    sink.move_to(x + r, y);
    sink.arc_to(arc(x, y - r));
    sink.arc_to(arc(x - r, y));
    sink.arc_to(arc(x, y + r));
    sink.arc_to(arc(x + r, y));
}

/// Dots at data points.
#[derive(Debug, Clone, PartialEq)]
pub struct Scatter {
    pub points: Vec<[f64; 2]>,
    style: ScatterStyle,
}

impl Scatter {
    pub fn new(points: Vec<[f64; 2]>, style: ScatterStyle) -> Self {
        Scatter { points, style }
    }
}

impl Drawable for Scatter {
    fn attributes(&self) -> &Attributes { &self.style.attributes }

    fn draw(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        for &p in &self.points {
            if let Some(c) = eval(tr, p) { dot(sink, c, self.style.radius) }
        }
    }
}


////////////////////////////////////////////////////////////////////////
//
// Histograms

/// `n + 1` edges cutting \[`low`, `high`\] into `n` bins of equal
/// width.  The bounds may be given in any order; the last edge is
/// exactly the larger one.
pub fn edges(low: f64, high: f64, n: usize) -> Result<Vec<f64>, ConfigError> {
    let (low, high) = (low.min(high), low.max(high));
    check_range(low, high)?;
    if n == 0 { return Err(ConfigError::BadLimit { name: "bins", value: 0. }) }
    Ok(regular_edges(low, high, n))
}

fn regular_edges(a: f64, b: f64, n: usize) -> Vec<f64> {
    let step = (b - a) / n as f64;
    (0 ..= n).map(|i| if i == n { b } else { a + i as f64 * step }).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepsStyle {
    /// Level from which the first step rises and to which the last
    /// one falls.  `None` leaves the outline open.
    pub anchor: Option<f64>,
    pub attributes: Attributes,
}

impl Default for StepsStyle {
    fn default() -> Self {
        StepsStyle { anchor: Some(0.),
                     attributes: Attributes::new()
                         .with("stroke-linejoin", "miter") }
    }
}

/// Outline of a histogram: one horizontal step per bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Steps {
    edges: Vec<f64>,
    values: Vec<f64>,
    style: StepsStyle,
}

impl Steps {
    /// Histogram of `values` whose bin `i` spans from `edges[i]` to
    /// `edges[i + 1]`.  Two edges only are the ends of equal bins.
    pub fn new(edges: Vec<f64>, values: Vec<f64>, style: StepsStyle)
               -> Result<Self, ConfigError> {
        let edges = if edges.len() == 2 && values.len() > 1 {
            regular_edges(edges[0], edges[1], values.len())
        } else { edges };
        if edges.len() != values.len() + 1 {
            return Err(ConfigError::Arity { expected: values.len() + 1,
                                            got: edges.len() })
        }
        Ok(Steps { edges, values, style })
    }

    pub fn edges(&self) -> &[f64] { &self.edges }

    pub fn style(&self) -> &StepsStyle { &self.style }

    /// Corners of the outline in data coordinates, anchors included.
    pub fn points(&self) -> Vec<[f64; 2]> {
        let mut pts = Vec::with_capacity(2 * self.values.len() + 2);
        let (Some(&first), Some(&last)) = (self.edges.first(),
                                           self.edges.last())
        else { return pts };
        if self.values.is_empty() { return pts }
        if let Some(a) = self.style.anchor { pts.push([first, a]) }
        for (e, &v) in self.edges.windows(2).zip(&self.values) {
            pts.push([e[0], v]);
            pts.push([e[1], v]);
        }
        if let Some(a) = self.style.anchor { pts.push([last, a]) }
        pts
    }

    /// Smallest box containing the tops of the bins (the anchor is
    /// not part of the data).
    pub fn data_bounding_box(&self) -> BoundingBox {
        BoundingBox::of_points(self.edges.windows(2).zip(&self.values)
            .flat_map(|(e, &v)| [[e[0], v], [e[1], v]]))
    }
}

impl Drawable for Steps {
    fn attributes(&self) -> &Attributes { &self.style.attributes }

    fn draw(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        let mut broken = true;
        for p in self.points() {
            match eval(tr, p) {
                Some([x, y]) => {
                    if broken { sink.move_to(x, y) } else { sink.line_to(x, y) }
                    broken = false;
                }
                None => broken = true,
            }
        }
    }
}


////////////////////////////////////////////////////////////////////////
//
// Error bars

/// Extent of an error bar around a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bar {
    None,
    /// From `v - e` to `v + e`.
    Symmetric(f64),
    /// From `v + low` to `v + high`.
    Asymmetric { low: f64, high: f64 },
}

impl Bar {
    fn ends(self, v: f64) -> Option<[f64; 2]> {
        match self {
            Bar::None => None,
            Bar::Symmetric(e) => Some([v - e, v + e]),
            Bar::Asymmetric { low, high } => Some([v + low, v + high]),
        }
    }
}

/// A data point with its uncertainties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorPoint {
    pub x: f64,
    pub y: f64,
    pub x_bar: Bar,
    pub y_bar: Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBarsStyle {
    /// Draw a dot at each point.
    pub points: bool,
    /// Draw caps at the ends of the bars.
    pub caps: bool,
    /// Draw the bars themselves.
    pub lines: bool,
    /// Radius of the dots, in device units.
    pub radius: f64,
    /// Half length of the caps, in device units.
    pub cap_length: f64,
    pub attributes: Attributes,
}

impl Default for ErrorBarsStyle {
    fn default() -> Self {
        ErrorBarsStyle { points: true,  caps: true,  lines: true,
                         radius: 1.,  cap_length: 1.,
                         attributes: Attributes::new() }
    }
}

/// Points with error bars.  The caps are perpendicular to the bars in
/// device space, also under nonlinear transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBars {
    pub points: Vec<ErrorPoint>,
    style: ErrorBarsStyle,
}

#[derive(Clone, Copy)]
enum Dir { X, Y }

impl ErrorBars {
    pub fn new(points: Vec<ErrorPoint>, style: ErrorBarsStyle) -> Self {
        ErrorBars { points, style }
    }

    /// Cap of a bar in direction `dir` at the data point `at` whose
    /// device position is `dev`.
    fn cap(&self, tr: &dyn Transform, sink: &mut dyn PathSink,
           dir: Dir, at: [f64; 2], dev: [f64; 2]) {
        if !self.style.caps { return }
        // Caps of x bars follow the y axis and conversely.
        let d = tr.normalized_derivative(at[0], at[1]).ok()
            .and_then(|d| match dir { Dir::X => d.y_hat, Dir::Y => d.x_hat });
        if let Some(d) = d { mark(sink, dev, d, self.style.cap_length) }
    }

    /// Draw the bar in direction `dir` between the data points `lo`
    /// and `hi`.
    fn bar(&self, tr: &dyn Transform, sink: &mut dyn PathSink,
           dir: Dir, lo: [f64; 2], hi: [f64; 2]) {
        let (Some(l), Some(h)) = (eval(tr, lo), eval(tr, hi)) else { return };
        sink.move_to(l[0], l[1]);
        self.cap(tr, sink, dir, lo, l);
        if self.style.lines { sink.line_to(h[0], h[1]) }
        else { sink.move_to(h[0], h[1]) }
        self.cap(tr, sink, dir, hi, h);
    }

    /// Draw the bars only.
    pub fn draw_bars(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        for p in &self.points {
            if eval(tr, [p.x, p.y]).is_none() { continue }
            if let Some([a, b]) = p.x_bar.ends(p.x) {
                self.bar(tr, sink, Dir::X, [a, p.y], [b, p.y])
            }
            if let Some([a, b]) = p.y_bar.ends(p.y) {
                self.bar(tr, sink, Dir::Y, [p.x, a], [p.x, b])
            }
        }
    }

    /// Draw the dots only.
    pub fn draw_points(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        if !self.style.points { return }
        for p in &self.points {
            if let Some(c) = eval(tr, [p.x, p.y]) {
                dot(sink, c, self.style.radius)
            }
        }
    }

    /// Return the bars (not filled) and the dots (filled with the
    /// stroke color, black by default) as two paths.
    pub fn to_paths(&self, tr: &dyn Transform) -> (Path, Path) {
        let a = &self.style.attributes;
        let fill = a.get("stroke").unwrap_or("black").to_string();
        let mut bars = Path::with_attributes(a.clone().with("fill", "none"));
        self.draw_bars(tr, &mut bars);
        let mut dots = Path::with_attributes(
            a.clone().with("stroke", "none").with("fill", fill));
        self.draw_points(tr, &mut dots);
        (bars, dots)
    }
}

impl Drawable for ErrorBars {
    fn attributes(&self) -> &Attributes { &self.style.attributes }

    fn draw(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        self.draw_bars(tr, sink);
        self.draw_points(tr, sink);
    }
}


////////////////////////////////////////////////////////////////////////
//
// Axes

/// An axis: the horizontal line at data `y` or the vertical line at
/// data `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    X { y: f64 },
    Y { x: f64 },
}

impl Axis {
    /// Data point of the axis at coordinate `v` along it.
    fn at(self, v: f64) -> [f64; 2] {
        match self {
            Axis::X { y } => [v, y],
            Axis::Y { x } => [x, v],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisStyle {
    /// Half length of major tick marks, in device units.
    pub tick_length: f64,
    /// Half length of minor tick marks, in device units.
    pub minitick_length: f64,
    /// Distance between a tick mark and its label anchor.
    pub label_margin: f64,
    pub attributes: Attributes,
}

impl Default for AxisStyle {
    fn default() -> Self {
        AxisStyle { tick_length: 1.5,  minitick_length: 0.75,
                    label_margin: 1.,
                    attributes: Attributes::new().with("stroke-width", "0.25pt") }
    }
}

/// Where to write the label of a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Position of the tick along the axis (data coordinate).
    pub value: f64,
    /// Anchor of the label, in device coordinates.
    pub anchor: [f64; 2],
    /// Device direction of the axis at the tick.
    pub along: [f64; 2],
    /// Device direction from the tick mark to the label.
    pub normal: [f64; 2],
    pub text: String,
}

/// An axis line with its ticks.  The line is sampled when the
/// transform is not affine, and the tick marks are perpendicular to
/// the axis in device space.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTicks {
    axis: Axis,
    low: f64,
    high: f64,
    major: TickSet,
    minor: TickSet,
    style: AxisStyle,
}

impl AxisTicks {
    /// Axis spanning \[`low`, `high`\] with the given ticks.
    pub fn new(axis: Axis, low: f64, high: f64, major: TickSet,
               minor: TickSet, style: AxisStyle) -> Result<Self, ConfigError> {
        check_range(low, high)?;
        let pos = match axis { Axis::X { y } => y, Axis::Y { x } => x };
        if !pos.is_finite() {
            return Err(ConfigError::NotFinite { name: "axis", value: pos })
        }
        Ok(AxisTicks { axis, low, high, major, minor, style })
    }

    /// Axis with the major and minor ticks chosen by `planner`.
    pub fn planned(axis: Axis, planner: &TickPlanner, style: AxisStyle)
                   -> Result<Self, ConfigError> {
        let (low, high) = planner.range();
        let major = planner.major()?;
        let minor = planner.minor(&major)?;
        Self::new(axis, low, high, major, minor, style)
    }

    pub fn major(&self) -> &TickSet { &self.major }

    pub fn minor(&self) -> &TickSet { &self.minor }

    /// Device position of the tick at `v` with the direction of the
    /// axis and the direction of the tick mark.
    fn frame(&self, tr: &dyn Transform, v: f64)
             -> Option<([f64; 2], [f64; 2], [f64; 2])> {
        let [x, y] = self.axis.at(v);
        let p = tr.eval(x, y).ok()?;
        let d = tr.normalized_derivative(x, y).ok()?;
        let (x_hat, y_hat) = (d.x_hat?, d.y_hat?);
        match self.axis {
            Axis::X { .. } => Some((p, x_hat, y_hat)),
            Axis::Y { .. } => Some((p, y_hat, x_hat)),
        }
    }

    fn draw_line(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        let [x1, y1] = self.axis.at(self.low);
        let [x2, y2] = self.axis.at(self.high);
        if tr.is_affine() {
            if let (Some(a), Some(b)) = (eval(tr, [x1, y1]), eval(tr, [x2, y2])) {
                sink.move_to(a[0], a[1]);
                sink.line_to(b[0], b[1]);
                return
            }
        }
        match Sampling::line(x1, y1, x2, y2).random_sampling(false).build(tr) {
            Ok(s) => s.draw(sink),
            Err(e) => debug!("axis not drawn: {}", e),
        }
    }

    /// Positions of the labels of the major ticks.
    pub fn labels(&self, tr: &dyn Transform) -> Vec<Label> {
        let offset = self.style.tick_length + self.style.label_margin;
        self.major.labeled().filter_map(|(v, text)| {
            let (p, along, normal) = self.frame(tr, v)?;
            Some(Label { value: v,  anchor: add(p, normal, offset),
                         along,  normal,  text: text.to_string() })
        }).collect()
    }
}

impl Drawable for AxisTicks {
    fn attributes(&self) -> &Attributes { &self.style.attributes }

    fn draw(&self, tr: &dyn Transform, sink: &mut dyn PathSink) {
        self.draw_line(tr, sink);
        let w = self.high - self.low;
        let in_range = |v: f64| self.low - EPSILON * w <= v
            && v <= self.high + EPSILON * w;
        for (ticks, len) in [(&self.major, self.style.tick_length),
                             (&self.minor, self.style.minitick_length)] {
            for v in ticks.keys().filter(|&v| in_range(v)) {
                if let Some((p, _, normal)) = self.frame(tr, v) {
                    mark(sink, p, normal, len)
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{path::Command,
                transform::{from_fn, Linear, Window}};
    use crate::error::DomainError;

    fn close(a: [f64; 2], b: [f64; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9
    }

    fn window() -> Window {
        let bb = BoundingBox { xmin: 0., xmax: 10., ymin: 0., ymax: 10. };
        Window::new(0., 0., 100., 100., bb).unwrap()
    }

    fn log_window() -> Window {
        let bb = BoundingBox { xmin: 1., xmax: 10., ymin: 0., ymax: 10. };
        Window::new(0., 0., 100., 100., bb).unwrap().log_x(10.).unwrap()
    }

    #[test]
    fn data_path() {
        let d = DataPath::new(vec![
            Segment::MoveTo(Point::data(0., 0.)),
            Segment::Horizontal(10.),
            Segment::Vertical(10.),
            Segment::LineTo(Point::device(50., 50.)),
            Segment::Close]);
        let p = d.to_path(&window());
        assert_eq!(p.commands, vec![Command::MoveTo([0., 100.]),
                                    Command::LineTo([100., 100.]),
                                    Command::LineTo([100., 0.]),
                                    Command::LineTo([50., 50.]),
                                    Command::Close]);
    }

    #[test]
    fn data_path_breaks() {
        let w = log_window();
        let d = DataPath::new(vec![
            Segment::MoveTo(Point::data(1., 1.)),
            Segment::LineTo(Point::data(-1., 2.)),
            Segment::LineTo(Point::data(10., 2.)),
            Segment::CurveTo { c1: Point::data(5., 5.), c2: Point::data(5., 6.),
                               to: Point::data(2., 2.) },
            Segment::Close]);
        let p = d.to_path(&w);
        assert_eq!(p.subpaths(), 2);
        assert!(matches!(p.commands[2], Command::CurveTo { .. }));
        assert_eq!(p.commands.last(), Some(&Command::Close));
    }

    #[test]
    fn curve_lines_and_loop() {
        let pts = vec![[0., 0.], [1., 0.], [1., 1.]];
        let c = Curve::new(pts.clone(), CurveStyle { closed: true,
                                                     ..Default::default() });
        let p = c.to_path(&Linear::identity());
        assert_eq!(p.commands.len(), 5);
        assert_eq!(p.commands[3], Command::LineTo([0., 0.]));
        assert_eq!(p.commands[4], Command::Close);
        assert_eq!(p.attributes.get("stroke-width"), Some("0.5pt"));
    }

    #[test]
    fn curve_smooth() {
        let pts = vec![[0., 0.], [1., 1.], [2., 0.]];
        let c = Curve::new(pts, CurveStyle { mode: CurveMode::Smooth,
                                             ..Default::default() });
        let p = c.to_path(&Linear::identity());
        match p.commands[1] {
            Command::CurveTo { c1, c2, to } => {
                assert_eq!(c1, [0., 0.]); // Zero velocity at the end.
                assert!(close(c2, [1. - 1. / 3., 1.]));
                assert_eq!(to, [1., 1.]);
            }
            c => panic!("{:?}", c),
        }
    }

    #[test]
    fn curve_undefined_point() {
        let tr = from_fn(|x, y| if x == 1. { Err(DomainError::NotFinite) }
                                else { Ok([x, y]) });
        let c = Curve::new(vec![[0., 0.], [1., 0.], [2., 0.], [3., 0.]],
                           CurveStyle::default());
        let p = c.to_path(&tr);
        assert_eq!(p.polylines(), vec![vec![[0., 0.]],
                                       vec![[2., 0.], [3., 0.]]]);
    }

    #[test]
    fn scatter() {
        let s = Scatter::new(vec![[1., 1.], [-1., 1.]],
                             ScatterStyle { radius: 2., ..Default::default() });
        let w = log_window();
        let p = s.to_path(&w);
        assert_eq!(p.subpaths(), 1);
        assert_eq!(p.commands.len(), 5);
        assert_eq!(p.commands[0], Command::MoveTo([2., 90.]));
        assert_eq!(p.attributes.get("fill"), Some("black"));
    }

    #[test]
    fn error_bar_caps_follow_transform() {
        let pts = vec![ErrorPoint { x: 1., y: 1., x_bar: Bar::None,
                                    y_bar: Bar::Symmetric(0.5) }];
        let style = ErrorBarsStyle { points: false, ..Default::default() };
        let e = ErrorBars::new(pts.clone(), style.clone());
        let p = e.to_path(&Linear::identity());
        // Bar from (1, 0.5) to (1, 1.5), horizontal caps of length 2.
        assert_eq!(p.polylines(), vec![vec![[1., 0.5]],
                                       vec![[0., 0.5], [2., 0.5]],
                                       vec![[1., 0.5], [1., 1.5]],
                                       vec![[0., 1.5], [2., 1.5]],
                                       vec![[1., 1.5]]]);
        // Under a rotation, the caps rotate.
        let r = Linear::rotate(std::f64::consts::FRAC_PI_2);
        let p = ErrorBars::new(pts, style).to_path(&r);
        let cap = &p.polylines()[1];
        assert!(close(cap[0], [-0.5, 0.]) && close(cap[1], [-0.5, 2.]));
    }

    #[test]
    fn error_bars_asymmetric_and_dots() {
        let pts = vec![ErrorPoint { x: 1., y: 1.,
                                    x_bar: Bar::Asymmetric { low: -1., high: 2. },
                                    y_bar: Bar::None }];
        let style = ErrorBarsStyle {
            caps: false,
            attributes: Attributes::new().with("stroke", "red"),
            ..Default::default() };
        let (bars, dots) = ErrorBars::new(pts, style)
            .to_paths(&Linear::identity());
        assert_eq!(bars.polylines(), vec![vec![[0., 1.], [3., 1.]]]);
        assert_eq!(bars.attributes.get("fill"), Some("none"));
        assert_eq!(dots.subpaths(), 1);
        assert_eq!(dots.attributes.get("fill"), Some("red"));
        assert_eq!(dots.attributes.get("stroke"), Some("none"));
    }

    #[test]
    fn axis_ticks() {
        let planner = TickPlanner::new(0., 10.).unwrap();
        let a = AxisTicks::planned(Axis::X { y: 0. }, &planner,
                                   AxisStyle::default()).unwrap();
        let w = window();
        let p = a.to_path(&w);
        let lines = p.polylines();
        assert_eq!(lines[0], vec![[0., 100.], [100., 100.]]);
        // Each mark is a vertical segment followed by a move back.
        let n = a.major().len() + a.minor().len();
        assert_eq!(p.subpaths(), 1 + 2 * n);
        assert!(close(lines[1][0], [0., 98.5]) && close(lines[1][1], [0., 101.5]));
        let labels = a.labels(&w);
        assert_eq!(labels.len(), a.major().labeled().count());
        assert_eq!(labels[0].text, "0");
        assert!(close(labels[0].anchor, [0., 102.5]));
        assert!(close(labels[0].along, [1., 0.]));
    }

    #[test]
    fn histogram_edges() {
        assert_eq!(edges(0., 1., 4).unwrap(), vec![0., 0.25, 0.5, 0.75, 1.]);
        assert_eq!(edges(1., 0., 2).unwrap(), vec![0., 0.5, 1.]);
        let e = edges(0., 0.3, 3).unwrap();
        assert_eq!(e.len(), 4);
        assert_eq!(e[3], 0.3);
        assert_eq!(edges(0., 1., 0).unwrap_err(),
                   ConfigError::BadLimit { name: "bins", value: 0. });
        assert!(edges(1., 1., 3).is_err());
    }

    #[test]
    fn steps_anchored() {
        let h = Steps::new(vec![0., 2., 4.], vec![5., 3.],
                           StepsStyle::default()).unwrap();
        assert_eq!(h.attributes().get("stroke-linejoin"), Some("miter"));
        let p = h.to_path(&window());
        assert_eq!(p.subpaths(), 1);
        let expected = [[0., 100.], [0., 50.], [20., 50.], [20., 70.],
                        [40., 70.], [40., 100.]];
        let line = &p.polylines()[0];
        assert_eq!(line.len(), expected.len());
        assert!(line.iter().zip(&expected).all(|(&a, &b)| close(a, b)));
        let bb = h.data_bounding_box();
        assert_eq!((bb.ymin, bb.ymax), (3., 5.));
    }

    #[test]
    fn steps_from_range() {
        let style = StepsStyle { anchor: None, ..Default::default() };
        let h = Steps::new(vec![0., 6.], vec![1., 2., 3.], style).unwrap();
        assert_eq!(h.edges(), &[0., 2., 4., 6.]);
        assert_eq!(h.points(), vec![[0., 1.], [2., 1.], [2., 2.], [4., 2.],
                                    [4., 3.], [6., 3.]]);
        assert_eq!(Steps::new(vec![0., 1., 2.], vec![1.],
                              StepsStyle::default()).unwrap_err(),
                   ConfigError::Arity { expected: 2, got: 3 });
    }

    #[test]
    fn steps_break_outside_domain() {
        let style = StepsStyle { anchor: None, ..Default::default() };
        let h = Steps::new(vec![0., 1., 10.], vec![1., 2.], style).unwrap();
        let p = h.to_path(&log_window());
        assert_eq!(p.subpaths(), 1);
        assert_eq!(p.polylines()[0].len(), 3);
        assert!(close(p.polylines()[0][0], [0., 90.]));
    }

    #[test]
    fn axis_sampled_under_nonlinear_transform() {
        let tr = from_fn(|x, y| Ok([x * x.cos(), y + x * x.sin()]));
        let major = crate::ticks::ticks(0., 6., 20).unwrap();
        let a = AxisTicks::new(Axis::X { y: 0. }, 0., 6., major,
                               TickSet::new(), AxisStyle::default()).unwrap();
        let p = a.to_path(&tr);
        assert!(p.polylines()[0].len() > 10);
        assert!(AxisTicks::new(Axis::Y { x: f64::NAN }, 0., 1., TickSet::new(),
                               TickSet::new(), AxisStyle::default()).is_err());
    }
}
