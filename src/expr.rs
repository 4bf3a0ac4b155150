//! A small expression language to give curves and transforms as
//! strings, e.g. `"cos(t), sin(2 * t)"`.
//!
//! Only arithmetic (`+ - * /`, `^` or `**` for powers), the constants
//! `pi` and `e`, the declared variables and the following functions
//! are accepted: `sin cos tan asin acos atan atan2 sinh cosh tanh exp
//! log log10 log2 sqrt abs floor ceil pow hypot min max`.  Any other
//! name is rejected when parsing.  A top-level comma separates the
//! components of the result.

use std::fmt::{self, Display, Formatter};
use log::debug;
use crate::{error::{ConfigError, DomainError, Error},
            transform::{from_fn, Boundary, FnTransform}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Sin, Cos, Tan, Asin, Acos, Atan, Atan2, Sinh, Cosh, Tanh,
    Exp, Log, Log10, Log2, Sqrt, Abs, Floor, Ceil, Pow, Hypot, Min, Max,
}

const FUNCTIONS: [(&str, Func); 22] = [
    ("sin", Func::Sin), ("cos", Func::Cos), ("tan", Func::Tan),
    ("asin", Func::Asin), ("acos", Func::Acos), ("atan", Func::Atan),
    ("atan2", Func::Atan2), ("sinh", Func::Sinh), ("cosh", Func::Cosh),
    ("tanh", Func::Tanh), ("exp", Func::Exp), ("log", Func::Log),
    ("log10", Func::Log10), ("log2", Func::Log2), ("sqrt", Func::Sqrt),
    ("abs", Func::Abs), ("floor", Func::Floor), ("ceil", Func::Ceil),
    ("pow", Func::Pow), ("hypot", Func::Hypot), ("min", Func::Min),
    ("max", Func::Max)];

const CONSTANTS: [(&str, f64); 2] = [("pi", std::f64::consts::PI),
                                     ("e", std::f64::consts::E)];

impl Func {
    fn lookup(name: &str) -> Option<Func> {
        FUNCTIONS.iter().find(|(n, _)| *n == name).map(|&(_, f)| f)
    }

    fn name(self) -> &'static str {
        FUNCTIONS.iter().find(|(_, f)| *f == self).map_or("?", |&(n, _)| n)
    }

    fn arity(self) -> usize {
        use Func::*;
        match self {
            Atan2 | Pow | Hypot | Min | Max => 2,
            _ => 1,
        }
    }

    fn apply(self, a: &[f64]) -> f64 {
        use Func::*;
        let x = a.first().copied().unwrap_or(f64::NAN);
        let y = a.get(1).copied().unwrap_or(f64::NAN);
        match self {
            Sin => x.sin(),  Cos => x.cos(),  Tan => x.tan(),
            Asin => x.asin(),  Acos => x.acos(),  Atan => x.atan(),
            Atan2 => x.atan2(y),
            Sinh => x.sinh(),  Cosh => x.cosh(),  Tanh => x.tanh(),
            Exp => x.exp(),  Log => x.ln(),  Log10 => x.log10(),
            Log2 => x.log2(),  Sqrt => x.sqrt(),  Abs => x.abs(),
            Floor => x.floor(),  Ceil => x.ceil(),
            Pow => x.powf(y),  Hypot => x.hypot(y),
            Min => x.min(y),  Max => x.max(y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op { Add, Sub, Mul, Div, Pow }

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Num(f64),
    Var(usize),
    Neg(Box<Node>),
    Bin(Op, Box<Node>, Box<Node>),
    Call(Func, Vec<Node>),
}

impl Node {
    fn eval(&self, vars: &[f64]) -> Result<f64, DomainError> {
        let v = match self {
            Node::Num(x) => *x,
            Node::Var(i) => vars.get(*i).copied().unwrap_or(f64::NAN),
            Node::Neg(a) => - a.eval(vars)?,
            Node::Bin(op, a, b) => {
                let (a, b) = (a.eval(vars)?, b.eval(vars)?);
                match op {
                    Op::Add => a + b,
                    Op::Sub => a - b,
                    Op::Mul => a * b,
                    Op::Div => a / b,
                    Op::Pow => a.powf(b),
                }
            }
            Node::Call(f, args) => {
                let a = args.iter().map(|n| n.eval(vars))
                    .collect::<Result<Vec<f64>, _>>()?;
                let v = f.apply(&a);
                if !v.is_finite() {
                    let a: Vec<String> = a.iter().map(f64::to_string).collect();
                    return Err(DomainError::Undefined(
                        format!("{}({}) is undefined", f.name(), a.join(", "))))
                }
                v
            }
        };
        if v.is_finite() { Ok(v) } else { Err(DomainError::NotFinite) }
    }
}


////////////////////////////////////////////////////////////////////////
//
// Lexer

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Name(String),
    Op(Op),
    LParen,
    RParen,
    Comma,
}

fn parse_error(pos: usize, msg: impl Into<String>) -> ConfigError {
    ConfigError::Parse { pos, msg: msg.into() }
}

/// Split `src` into tokens with their byte positions.
fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, ConfigError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let tok = match c {
            b' ' | b'\t' | b'\n' | b'\r' => { i += 1; continue }
            b'0' ..= b'9' | b'.' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_digit() || bytes[i] == b'.') { i += 1 }
                // Exponent, only if digits follow.
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && bytes[i].is_ascii_digit() {
                            i += 1
                        }
                    }
                }
                let s = &src[start .. i];
                let x = s.parse::<f64>().map_err(|_| {
                    parse_error(start, format!("invalid number {:?}", s))})?;
                Token::Num(x)
            }
            b'a' ..= b'z' | b'A' ..= b'Z' | b'_' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1
                }
                Token::Name(src[start .. i].to_string())
            }
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                Token::Op(Op::Pow)
            }
            _ => {
                i += 1;
                match c {
                    b'+' => Token::Op(Op::Add),
                    b'-' => Token::Op(Op::Sub),
                    b'*' => Token::Op(Op::Mul),
                    b'/' => Token::Op(Op::Div),
                    b'^' => Token::Op(Op::Pow),
                    b'(' => Token::LParen,
                    b')' => Token::RParen,
                    b',' => Token::Comma,
                    _ => {
                        let ch = src[start ..].chars().next().unwrap_or('?');
                        return Err(parse_error(
                            start, format!("unexpected character {:?}", ch)))
                    }
                }
            }
        };
        tokens.push((start, tok));
    }
    Ok(tokens)
}


////////////////////////////////////////////////////////////////////////
//
// Parser

/// Binding powers (left, right) of binary operators.
fn binding_power(op: Op) -> (u8, u8) {
    match op {
        Op::Add | Op::Sub => (1, 2),
        Op::Mul | Op::Div => (3, 4),
        Op::Pow => (7, 6), // Right associative.
    }
}

/// Right binding power of the unary minus: `-x^2 = -(x^2)`.
const NEG_BP: u8 = 5;

struct Parser<'a> {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
    vars: &'a [&'a str],
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    /// Position in the source of the current token.
    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(p, _)| *p)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        t
    }

    fn expect(&mut self, tok: Token, what: &str) -> Result<(), ConfigError> {
        let pos = self.offset();
        match self.next() {
            Some(t) if t == tok => Ok(()),
            _ => Err(parse_error(pos, format!("expected {}", what))),
        }
    }

    fn tuple(&mut self) -> Result<Vec<Node>, ConfigError> {
        let mut components = vec![self.expr(0)?];
        while self.peek() == Some(&Token::Comma) {
            self.pos += 1;
            components.push(self.expr(0)?);
        }
        if self.pos < self.tokens.len() {
            return Err(parse_error(self.offset(), "unexpected token"))
        }
        Ok(components)
    }

    fn expr(&mut self, min_bp: u8) -> Result<Node, ConfigError> {
        let mut lhs = self.prefix()?;
        while let Some(&Token::Op(op)) = self.peek() {
            let (l_bp, r_bp) = binding_power(op);
            if l_bp < min_bp { break }
            self.pos += 1;
            let rhs = self.expr(r_bp)?;
            lhs = Node::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn prefix(&mut self) -> Result<Node, ConfigError> {
        let pos = self.offset();
        match self.next() {
            Some(Token::Num(x)) => Ok(Node::Num(x)),
            Some(Token::Op(Op::Sub)) => Ok(Node::Neg(Box::new(self.expr(NEG_BP)?))),
            Some(Token::Op(Op::Add)) => self.expr(NEG_BP),
            Some(Token::LParen) => {
                let e = self.expr(0)?;
                self.expect(Token::RParen, "\")\"")?;
                Ok(e)
            }
            Some(Token::Name(name)) => self.name(pos, name),
            Some(_) => Err(parse_error(pos, "unexpected token")),
            None => Err(parse_error(pos, "unexpected end of expression")),
        }
    }

    fn name(&mut self, pos: usize, name: String) -> Result<Node, ConfigError> {
        if self.peek() == Some(&Token::LParen) {
            let Some(f) = Func::lookup(&name) else {
                return Err(ConfigError::UnknownName(name))
            };
            self.pos += 1;
            let mut args = vec![self.expr(0)?];
            while self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                args.push(self.expr(0)?);
            }
            self.expect(Token::RParen, "\")\"")?;
            if args.len() != f.arity() {
                return Err(parse_error(pos, format!(
                    "{} takes {} argument(s), {} given",
                    name, f.arity(), args.len())))
            }
            return Ok(Node::Call(f, args))
        }
        if let Some(i) = self.vars.iter().position(|v| *v == name) {
            return Ok(Node::Var(i))
        }
        if let Some(&(_, c)) = CONSTANTS.iter().find(|(n, _)| *n == name) {
            return Ok(Node::Num(c))
        }
        if Func::lookup(&name).is_some() {
            return Err(parse_error(pos, format!("{} must be called", name)))
        }
        Err(ConfigError::UnknownName(name))
    }
}


////////////////////////////////////////////////////////////////////////
//
// Expressions

/// A parsed expression: one or more components depending on a fixed
/// list of variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    src: String,
    vars: Vec<String>,
    components: Vec<Node>,
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.vars.join(","), self.src.trim())
    }
}

impl Expr {
    /// Parse `src` where the names in `vars` denote the variables
    /// (they shadow the constants).
    pub fn parse(src: &str, vars: &[&str]) -> Result<Expr, ConfigError> {
        let tokens = tokenize(src)?;
        let mut p = Parser { tokens, pos: 0, end: src.len(), vars };
        let components = p.tuple()?;
        debug!("parsed {:?} ({} component(s))", src, components.len());
        Ok(Expr { src: src.to_string(),
                  vars: vars.iter().map(|v| v.to_string()).collect(),
                  components })
    }

    /// Number of components of the result.
    pub fn len(&self) -> usize { self.components.len() }

    pub fn is_empty(&self) -> bool { self.components.is_empty() }

    fn values(&self, args: &[f64]) -> Result<Vec<f64>, DomainError> {
        self.components.iter().map(|n| n.eval(args)).collect()
    }

    /// Evaluate the components at `args` (one value per variable).
    pub fn eval(&self, args: &[f64]) -> Result<Vec<f64>, Error> {
        if args.len() != self.vars.len() {
            return Err(ConfigError::Arity { expected: self.vars.len(),
                                            got: args.len() }.into())
        }
        Ok(self.values(args)?)
    }
}

/// Parametric curve `t ↦ (x, y)` given by two components depending
/// on `t`, for [`Sampling::try_param`][crate::Sampling::try_param].
/// A wrong number of components is reported on evaluation.
pub fn parametric(src: &str)
                  -> Result<impl Fn(f64) -> Result<[f64; 2], Error>,
                            ConfigError> {
    let e = Expr::parse(src, &["t"])?;
    Ok(move |t: f64| -> Result<[f64; 2], Error> {
        match e.values(&[t])?[..] {
            [x, y] => Ok([x, y]),
            ref v => Err(ConfigError::Arity { expected: 2,
                                              got: v.len() }.into()),
        }
    })
}

/// Graph of the function of `x` given by one component, as a
/// parametric curve `x ↦ (x, f(x))`.
pub fn function(src: &str)
                -> Result<impl Fn(f64) -> Result<[f64; 2], Error>,
                          ConfigError> {
    let e = Expr::parse(src, &["x"])?;
    Ok(move |x: f64| -> Result<[f64; 2], Error> {
        match e.values(&[x])?[..] {
            [y] => Ok([x, y]),
            ref v => Err(ConfigError::Arity { expected: 1,
                                              got: v.len() }.into()),
        }
    })
}

/// Transform given by two components depending on `x` and `y`.
pub fn transform(src: &str)
                 -> Result<FnTransform<impl Fn(f64, f64, &Boundary)
                                               -> Result<[f64; 2], DomainError>>,
                           ConfigError> {
    let e = Expr::parse(src, &["x", "y"])?;
    if e.len() != 2 {
        return Err(ConfigError::Arity { expected: 2, got: e.len() })
    }
    let name = e.to_string();
    Ok(from_fn(move |x, y| match e.values(&[x, y])?[..] {
        [u, v] => Ok([u, v]),
        _ => Err(DomainError::NotFinite),
    }).named(name))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    fn eval1(src: &str, x: f64) -> Result<f64, Error> {
        Ok(Expr::parse(src, &["x"])?.eval(&[x])?[0])
    }

    #[test]
    fn precedence() {
        assert_eq!(eval1("1 + 2 * 3", 0.).unwrap(), 7.);
        assert_eq!(eval1("(1 + 2) * 3", 0.).unwrap(), 9.);
        assert_eq!(eval1("2 ^ 3 ^ 2", 0.).unwrap(), 512.);
        assert_eq!(eval1("2 ** 3 ** 2", 0.).unwrap(), 512.);
        assert_eq!(eval1("-x^2", 3.).unwrap(), -9.);
        assert_eq!(eval1("2^-1", 0.).unwrap(), 0.5);
        assert_eq!(eval1("8 / 2 / 2", 0.).unwrap(), 2.);
        assert_eq!(eval1("1 - 2 - 3", 0.).unwrap(), -4.);
        assert_eq!(eval1("1.5e3 + .5", 0.).unwrap(), 1500.5);
    }

    #[test]
    fn names() {
        assert_eq!(eval1("cos(pi)", 0.).unwrap(), -1.);
        assert_eq!(eval1("max(x, 2) + hypot(3, 4)", 1.).unwrap(), 7.);
        assert!((eval1("log(e)", 0.).unwrap() - 1.).abs() < 1e-15);
        // Variables shadow constants.
        assert_eq!(Expr::parse("e", &["e"]).unwrap().eval(&[2.]).unwrap(),
                   vec![2.]);
    }

    #[test]
    fn rejected() {
        assert_eq!(Expr::parse("system(1)", &["x"]).unwrap_err(),
                   ConfigError::UnknownName("system".into()));
        assert_eq!(Expr::parse("x + z", &["x"]).unwrap_err(),
                   ConfigError::UnknownName("z".into()));
        assert!(matches!(Expr::parse("sin", &["x"]),
                         Err(ConfigError::Parse { pos: 0, .. })));
        assert!(matches!(Expr::parse("atan2(1)", &["x"]),
                         Err(ConfigError::Parse { .. })));
        assert!(matches!(Expr::parse("(1 + 2", &["x"]),
                         Err(ConfigError::Parse { pos: 6, .. })));
        assert!(matches!(Expr::parse("1 $ 2", &["x"]),
                         Err(ConfigError::Parse { pos: 2, .. })));
        assert!(matches!(Expr::parse("1 2", &["x"]),
                         Err(ConfigError::Parse { pos: 2, .. })));
        assert!(matches!(Expr::parse("", &["x"]), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn domain_errors() {
        assert!(matches!(eval1("log(x)", -1.),
                         Err(Error::Domain(DomainError::Undefined(_)))));
        assert_eq!(eval1("1 / x", 0.).unwrap_err(),
                   Error::Domain(DomainError::NotFinite));
        assert!(matches!(Expr::parse("x", &["x"]).unwrap().eval(&[1., 2.]),
                         Err(Error::Config(ConfigError::Arity { .. }))));
    }

    #[test]
    fn helpers() {
        let f = parametric("cos(t), sin(t)").unwrap();
        assert_eq!(f(0.).unwrap(), [1., 0.]);
        let f = parametric("t, t, t").unwrap();
        assert_eq!(f(0.).unwrap_err(),
                   Error::Config(ConfigError::Arity { expected: 2, got: 3 }));
        let g = function("x^2").unwrap();
        assert_eq!(g(3.).unwrap(), [3., 9.]);
        let tr = transform("2 * x, y + 1").unwrap();
        assert_eq!(tr.eval(1., 1.).unwrap(), [2., 2.]);
        assert!(!tr.contains(f64::INFINITY, 0.));
        assert_eq!(tr.name(), "x,y -> 2 * x, y + 1");
        assert_eq!(transform("x").unwrap_err(),
                   ConfigError::Arity { expected: 2, got: 1 });
    }
}
