//! Drawing primitives in device coordinates.
//!
//! Everything in this crate renders into a [`PathSink`].  The drawing
//! tree and its serialization live elsewhere; [`Path`] is a simple
//! sink that records the primitives.

use std::collections::BTreeMap;

/// Elliptical arc from the current point to (`x`, `y`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub rx: f64,
    pub ry: f64,
    /// Rotation of the ellipse x-axis, in degrees.
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub x: f64,
    pub y: f64,
}

/// A drawing primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    MoveTo([f64; 2]),
    LineTo([f64; 2]),
    /// Cubic Bézier curve with control points `c1`, `c2`.
    CurveTo { c1: [f64; 2], c2: [f64; 2], to: [f64; 2] },
    ArcTo(Arc),
    Close,
}

/// Receiver of drawing primitives.
pub trait PathSink {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn curve_to(&mut self, c1: [f64; 2], c2: [f64; 2], x: f64, y: f64);
    fn arc_to(&mut self, arc: Arc);
    fn close(&mut self);

    /// Dispatch `c` to the corresponding method.
    fn command(&mut self, c: Command) {
        match c {
            Command::MoveTo([x, y]) => self.move_to(x, y),
            Command::LineTo([x, y]) => self.line_to(x, y),
            Command::CurveTo { c1, c2, to: [x, y] } =>
                self.curve_to(c1, c2, x, y),
            Command::ArcTo(arc) => self.arc_to(arc),
            Command::Close => self.close(),
        }
    }
}

/// Attribute map attached to a rendered path (e.g. `stroke-width`).
/// The values are opaque to this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    pub fn new() -> Self { Attributes(BTreeMap::new()) }

    /// Return a copy of `self` with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>)
                -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Return `self` updated with all the entries of `overrides`.
    #[must_use]
    pub fn merge(mut self, overrides: &Attributes) -> Self {
        for (k, v) in &overrides.0 {
            self.0.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes(iter.into_iter()
                   .map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A recorded sequence of primitives with its attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub commands: Vec<Command>,
    pub attributes: Attributes,
}

impl Path {
    pub fn new() -> Self { Path::default() }

    pub fn with_attributes(attributes: Attributes) -> Self {
        Path { commands: Vec::new(), attributes }
    }

    /// Number of sub-paths (i.e. of `MoveTo` commands).
    pub fn subpaths(&self) -> usize {
        self.commands.iter()
            .filter(|c| matches!(c, Command::MoveTo(_))).count()
    }

    /// Split the path into its sub-paths, each given by its points.
    pub fn polylines(&self) -> Vec<Vec<[f64; 2]>> {
        let mut lines: Vec<Vec<[f64; 2]>> = vec![];
        for c in &self.commands {
            match *c {
                Command::MoveTo(p) => lines.push(vec![p]),
                Command::LineTo(p) | Command::CurveTo { to: p, .. } => {
                    if let Some(l) = lines.last_mut() { l.push(p) }
                }
                Command::ArcTo(a) => {
                    if let Some(l) = lines.last_mut() { l.push([a.x, a.y]) }
                }
                Command::Close => (),
            }
        }
        lines
    }
}

impl PathSink for Path {
    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(Command::MoveTo([x, y]))
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(Command::LineTo([x, y]))
    }

    fn curve_to(&mut self, c1: [f64; 2], c2: [f64; 2], x: f64, y: f64) {
        self.commands.push(Command::CurveTo { c1, c2, to: [x, y] })
    }

    fn arc_to(&mut self, arc: Arc) {
        self.commands.push(Command::ArcTo(arc))
    }

    fn close(&mut self) { self.commands.push(Command::Close) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record() {
        let mut p = Path::new();
        p.move_to(0., 0.);
        p.line_to(1., 0.);
        p.curve_to([1., 1.], [2., 1.], 2., 0.);
        p.command(Command::MoveTo([5., 5.]));
        p.arc_to(Arc { rx: 1., ry: 1., rotation: 0., large_arc: false,
                       sweep: true, x: 6., y: 6. });
        p.close();
        assert_eq!(p.subpaths(), 2);
        assert_eq!(p.polylines(),
                   vec![vec![[0., 0.], [1., 0.], [2., 0.]],
                        vec![[5., 5.], [6., 6.]]]);
    }

    #[test]
    fn attributes_merge() {
        let defaults: Attributes = [("stroke-width", "0.5pt"),
                                    ("fill", "none")].into_iter().collect();
        let a = defaults.clone()
            .merge(&Attributes::new().with("stroke-width", "1pt"));
        assert_eq!(a.get("stroke-width"), Some("1pt"));
        assert_eq!(a.get("fill"), Some("none"));
        assert_eq!(defaults.get("stroke-width"), Some("0.5pt"));
    }
}
