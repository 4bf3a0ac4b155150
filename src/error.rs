//! Errors.  A [`DomainError`] says that a transform or a sampled
//! function is not defined at some input; it is recoverable and only
//! creates a cut in the rendered path.  A [`ConfigError`] says that
//! the caller asked for something meaningless; it is always reported.

use thiserror::Error;

/// A transform or a function is undefined at the requested input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("{axis} = {value} is outside the domain of a logarithmic axis \
             and no boundary value is set")]
    LogAxis { axis: char, value: f64 },
    #[error("the result is not a finite number")]
    NotFinite,
    #[error("{0}")]
    Undefined(String),
}

/// Invalid arguments or configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("low = {low} must be less than high = {high}")]
    EmptyRange { low: f64, high: f64 },
    #[error("{name} = {value} must be finite")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} = {value} is not a valid limit")]
    BadLimit { name: &'static str, value: f64 },
    #[error("{bound} cannot be {value} if the logarithmic base is {base}")]
    LogBound { bound: &'static str, value: f64, base: f64 },
    #[error("the logarithmic base {0} must be greater than 1")]
    LogBase(f64),
    #[error("the function must return exactly {expected} values, \
             it returned {got}")]
    Arity { expected: usize, got: usize },
    #[error("major ticks {{{first}...{last}}} do not span [{low}, {high}]")]
    TicksSpan { first: f64, last: f64, low: f64, high: f64 },
    #[error("at least {min} ticks are required, got {got}")]
    TooFewTicks { min: usize, got: usize },
    #[error("{count} ticks of spacing {spacing} would be needed, at most \
             {max} are allowed")]
    TooManyTicks { count: f64, spacing: f64, max: usize },
    #[error("index {index} is out of bounds for {len} transforms")]
    Index { index: usize, len: usize },
    #[error("parse error at position {pos}: {msg}")]
    Parse { pos: usize, msg: String },
    #[error("\"{0}\" is not a permitted name")]
    UnknownName(String),
}

/// Error of an evaluator that may fail in both ways, for example a
/// parametric function given as an expression returning the wrong
/// number of components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Check that `low < high`, both finite.
pub(crate) fn check_range(low: f64, high: f64) -> Result<(), ConfigError> {
    if !low.is_finite() {
        return Err(ConfigError::NotFinite { name: "low", value: low })
    }
    if !high.is_finite() {
        return Err(ConfigError::NotFinite { name: "high", value: high })
    }
    if !(low < high) {
        return Err(ConfigError::EmptyRange { low, high })
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks() {
        assert!(check_range(0., 1.).is_ok());
        assert_eq!(check_range(1., 1.),
                   Err(ConfigError::EmptyRange { low: 1., high: 1. }));
        assert!(matches!(check_range(f64::NAN, 1.),
                         Err(ConfigError::NotFinite { name: "low", .. })));
        assert!(matches!(check_range(0., f64::INFINITY),
                         Err(ConfigError::NotFinite { name: "high", .. })));
    }

    #[test]
    fn messages() {
        let e = Error::from(ConfigError::Arity { expected: 2, got: 3 });
        assert_eq!(e.to_string(),
                   "the function must return exactly 2 values, it returned 3");
        let e = ConfigError::TicksSpan { first: 1., last: 2., low: 0.,
                                         high: 3. };
        assert_eq!(e.to_string(), "major ticks {1...2} do not span [0, 3]");
    }
}
