//! Formatting of tick labels.

/// Minus sign (distinct from the hyphen).
pub const MINUS: char = '\u{2212}';

/// Number of significant digits of labels.
const DIGITS: usize = 6;

/// Return the digits of `x` rounded to [`DIGITS`] significant digits,
/// without trailing zeros, and the decimal exponent when the
/// scientific notation has to be used (like C's `%g`).
fn general(x: f64) -> (String, Option<i32>) {
    if x == 0. { return ("0".to_string(), None) }
    let sci = format!("{:.*e}", DIGITS - 1, x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if exp < -4 || exp >= DIGITS as i32 {
        (trim_zeros(mantissa).to_string(), Some(exp))
    } else {
        let decimals = (DIGITS as i32 - 1 - exp).max(0) as usize;
        (trim_zeros(&format!("{:.*}", decimals, x)).to_string(), None)
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') { s.trim_end_matches('0').trim_end_matches('.') }
    else { s }
}

fn superscript(c: char) -> char {
    match c {
        '-' => '\u{207B}',
        '1' => '\u{00B9}',
        '2' => '\u{00B2}',
        '3' => '\u{00B3}',
        '0' | '4' ..= '9' =>
            char::from_u32(0x2070 + (c as u32 - '0' as u32)).unwrap_or(c),
        _ => c,
    }
}

/// Format `x` for a tick label: six significant digits, the minus
/// sign [`MINUS`] for negative numbers, and `m×10ⁿ` with superscript
/// exponent when the exponent is less than -4 or at least 6.  A
/// mantissa of 1 is omitted: 10⁶ rather than 1×10⁶.
///
/// ```
/// use adaptive_plot::format::number_format;
/// assert_eq!(number_format(1500000.), "1.5×10⁶");
/// assert_eq!(number_format(-0.0001), "−0.0001");
/// ```
pub fn number_format(x: f64) -> String {
    if !x.is_finite() {
        return if x.is_nan() { "NaN".to_string() }
               else if x > 0. { "∞".to_string() }
               else { format!("{}∞", MINUS) }
    }
    let (digits, exp) = general(x);
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, digits.as_str()),
    };
    let mut out = String::new();
    if negative { out.push(MINUS) }
    match exp {
        None => out.push_str(digits),
        Some(exp) => {
            if digits != "1" {
                out.push_str(digits);
                out.push('×');
            }
            out.push_str("10");
            out.extend(exp.to_string().chars().map(superscript));
        }
    }
    out
}
