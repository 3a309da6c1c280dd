//! printf-style message interpolation
//!
//! [`interpolate`] is strict and reports every problem as a [`FormatError`].
//! [`safe_format`] wraps it for the logging macros and never fails: on error
//! it joins every input with spaces and appends a marker naming the problem.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Largest accepted field width or precision
const MAX_FIELD: usize = u16::MAX as usize;

/// Marker appended when a non-string template is used with arguments
pub const NON_STRING_TEMPLATE_MARKER: &str =
    " [FORMAT WARNING: non-string template used with arguments]";

/// Errors produced by [`interpolate`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("incomplete format starting at position {0}")]
    Incomplete(usize),

    #[error("unsupported format character '{ch}' at position {position}")]
    Unsupported { ch: char, position: usize },

    #[error("width or precision too large at position {0}")]
    TooLarge(usize),

    #[error("not enough arguments for format string")]
    TooFewArguments,

    #[error("not all arguments converted during string formatting")]
    TooManyArguments,

    #[error("%{conversion} format: {expected} is required, not {found}")]
    TypeMismatch {
        conversion: char,
        expected: &'static str,
        found: &'static str,
    },
}

/// A single interpolation argument
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
}

impl Arg {
    /// Capture any displayable value as a string argument
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Arg::Str(value.to_string())
    }

    /// Name of the argument's kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Int(_) | Arg::UInt(_) => "int",
            Arg::Float(_) => "float",
            Arg::Bool(_) => "bool",
            Arg::Char(_) => "char",
            Arg::Str(_) => "str",
        }
    }

    /// Quoted form used by `%r`
    pub fn repr(&self) -> String {
        match self {
            Arg::Str(s) => format!("{:?}", s),
            Arg::Char(c) => format!("{:?}", c),
            other => other.to_string(),
        }
    }

    fn as_integer(&self, conversion: char) -> Result<i128, FormatError> {
        match self {
            Arg::Int(n) => Ok(*n as i128),
            Arg::UInt(n) => Ok(*n as i128),
            Arg::Bool(b) => Ok(*b as i128),
            Arg::Float(v) if v.is_finite() && matches!(conversion, 'd' | 'i' | 'u') => {
                Ok(v.trunc() as i128)
            }
            other => Err(FormatError::TypeMismatch {
                conversion,
                expected: "an integer",
                found: other.kind(),
            }),
        }
    }

    fn as_float(&self, conversion: char) -> Result<f64, FormatError> {
        match self {
            Arg::Int(n) => Ok(*n as f64),
            Arg::UInt(n) => Ok(*n as f64),
            Arg::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Arg::Float(v) => Ok(*v),
            other => Err(FormatError::TypeMismatch {
                conversion,
                expected: "a number",
                found: other.kind(),
            }),
        }
    }

    fn as_char(&self) -> Result<char, FormatError> {
        let mismatch = || FormatError::TypeMismatch {
            conversion: 'c',
            expected: "a single character",
            found: self.kind(),
        };
        match self {
            Arg::Char(c) => Ok(*c),
            Arg::Int(n) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(mismatch),
            Arg::UInt(n) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(mismatch),
            Arg::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(mismatch()),
                }
            }
            _ => Err(mismatch()),
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(n) => write!(f, "{}", n),
            Arg::UInt(n) => write!(f, "{}", n),
            Arg::Float(v) => f.write_str(&float_repr(*v)),
            Arg::Bool(b) => write!(f, "{}", b),
            Arg::Char(c) => write!(f, "{}", c),
            Arg::Str(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip form with a C-style signed exponent (`1e+16`)
fn float_repr(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    let debug = format!("{:?}", v);
    match debug.split_once('e') {
        Some((mantissa, exp)) => c_exponent(mantissa, exp.parse().unwrap_or(0)),
        None => debug,
    }
}

macro_rules! arg_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Arg {
                fn from(value: $source) -> Self {
                    Arg::$variant(value as $target)
                }
            }
        )+
    };
}

arg_from!(Int as i64: i8, i16, i32, i64, isize);
arg_from!(UInt as u64: u8, u16, u32, u64, usize);
arg_from!(Float as f64: f32, f64);

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Str(value.clone())
    }
}

#[derive(Debug, Default)]
struct Spec {
    left: bool,
    zero: bool,
    plus: bool,
    space: bool,
    alt: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

/// Substitute `args` into a printf-style `template`
///
/// Supports `%d %i %u %s %r %f %F %e %E %g %G %x %X %o %c %%` with the
/// `- + 0 # space` flags, a width and a `.precision`. Length modifiers
/// (`h`, `l`, `L`) are accepted and ignored.
pub fn interpolate(template: &str, args: &[Arg]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut chars = template.char_indices().peekable();
    let mut remaining = args.iter();

    while let Some((position, c)) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let spec = parse_spec(position, &mut chars)?;
        if spec.conversion == '%' {
            out.push('%');
            continue;
        }

        let arg = remaining.next().ok_or(FormatError::TooFewArguments)?;
        render(&spec, arg, &mut out)?;
    }

    if remaining.next().is_some() {
        return Err(FormatError::TooManyArguments);
    }
    Ok(out)
}

/// Interpolate without ever failing
///
/// With no arguments the template's string form is returned untouched, so a
/// message containing a bare `%` is logged as written.
pub fn safe_format(template: &Arg, args: &[Arg]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    let Arg::Str(text) = template else {
        return concatenate(template, args, NON_STRING_TEMPLATE_MARKER);
    };

    match interpolate(text, args) {
        Ok(message) => message,
        Err(err) => concatenate(
            template,
            args,
            &format!(" [FORMAT ERROR: {}; fell back to concatenation]", err),
        ),
    }
}

fn concatenate(template: &Arg, args: &[Arg], marker: &str) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(template.to_string());
    parts.extend(args.iter().map(|a| a.to_string()));
    let mut joined = parts.join(" ");
    joined.push_str(marker);
    joined
}

fn parse_spec(start: usize, chars: &mut Peekable<CharIndices<'_>>) -> Result<Spec, FormatError> {
    let mut spec = Spec::default();

    while let Some(&(_, c)) = chars.peek() {
        match c {
            '-' => spec.left = true,
            '0' => spec.zero = true,
            '+' => spec.plus = true,
            ' ' => spec.space = true,
            '#' => spec.alt = true,
            _ => break,
        }
        chars.next();
    }

    spec.width = parse_number(chars);
    if let Some(&(_, '.')) = chars.peek() {
        chars.next();
        spec.precision = Some(parse_number(chars).unwrap_or(0));
    }
    if spec.width.max(spec.precision).is_some_and(|n| n > MAX_FIELD) {
        return Err(FormatError::TooLarge(start));
    }
    while let Some(&(_, 'h' | 'l' | 'L')) = chars.peek() {
        chars.next();
    }

    match chars.next() {
        Some((_, ch @ ('d' | 'i' | 'u' | 's' | 'r' | 'f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'x'
        | 'X' | 'o' | 'c' | '%'))) => {
            spec.conversion = ch;
            Ok(spec)
        }
        Some((position, ch)) => Err(FormatError::Unsupported { ch, position }),
        None => Err(FormatError::Incomplete(start)),
    }
}

fn parse_number(chars: &mut Peekable<CharIndices<'_>>) -> Option<usize> {
    let mut value: Option<usize> = None;
    while let Some(&(_, c)) = chars.peek() {
        let Some(digit) = c.to_digit(10) else {
            break;
        };
        value = Some(
            value
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(digit as usize),
        );
        chars.next();
    }
    value
}

fn render(spec: &Spec, arg: &Arg, out: &mut String) -> Result<(), FormatError> {
    match spec.conversion {
        'd' | 'i' | 'u' => {
            let n = arg.as_integer(spec.conversion)?;
            let digits = min_digits(n.unsigned_abs().to_string(), spec.precision);
            push_numeric(out, spec, n < 0, "", &digits);
        }
        'x' | 'X' | 'o' => {
            let n = arg.as_integer(spec.conversion)?;
            let abs = n.unsigned_abs();
            let (digits, prefix) = match spec.conversion {
                'x' => (format!("{:x}", abs), "0x"),
                'X' => (format!("{:X}", abs), "0X"),
                _ => (format!("{:o}", abs), "0o"),
            };
            let prefix = if spec.alt { prefix } else { "" };
            push_numeric(out, spec, n < 0, prefix, &min_digits(digits, spec.precision));
        }
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let v = arg.as_float(spec.conversion)?;
            let upper = spec.conversion.is_ascii_uppercase();
            let digits = if v.is_nan() {
                "nan".to_string()
            } else if v.is_infinite() {
                "inf".to_string()
            } else {
                let abs = v.abs();
                let precision = spec.precision.unwrap_or(6);
                match spec.conversion.to_ascii_lowercase() {
                    'f' => format_fixed(abs, precision, spec.alt),
                    'e' => format_exponent(abs, precision, spec.alt),
                    _ => format_general(abs, precision, spec.alt),
                }
            };
            let digits = if upper {
                digits.to_ascii_uppercase()
            } else {
                digits
            };
            let negative = !v.is_nan() && v.is_sign_negative();
            push_numeric(out, spec, negative, "", &digits);
        }
        's' => push_text(out, spec, &truncate(arg.to_string(), spec.precision)),
        'r' => push_text(out, spec, &truncate(arg.repr(), spec.precision)),
        'c' => push_text(out, spec, &arg.as_char()?.to_string()),
        _ => unreachable!("conversion validated by parse_spec"),
    }
    Ok(())
}

fn min_digits(digits: String, precision: Option<usize>) -> String {
    match precision {
        Some(p) if digits.len() < p => format!("{}{}", "0".repeat(p - digits.len()), digits),
        _ => digits,
    }
}

fn truncate(text: String, precision: Option<usize>) -> String {
    match precision {
        Some(p) => text.chars().take(p).collect(),
        None => text,
    }
}

fn format_fixed(abs: f64, precision: usize, alt: bool) -> String {
    let mut s = format!("{:.*}", precision, abs);
    if alt && precision == 0 {
        s.push('.');
    }
    s
}

/// Split Rust's `1.5e3` output into mantissa and exponent
fn split_exponent(formatted: &str) -> (&str, i32) {
    match formatted.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (formatted, 0),
    }
}

fn c_exponent(mantissa: &str, exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exp.abs())
}

fn format_exponent(abs: f64, precision: usize, alt: bool) -> String {
    let formatted = format!("{:.*e}", precision, abs);
    let (mantissa, exp) = split_exponent(&formatted);
    let mut mantissa = mantissa.to_string();
    if alt && precision == 0 {
        mantissa.push('.');
    }
    c_exponent(&mantissa, exp)
}

fn format_general(abs: f64, precision: usize, alt: bool) -> String {
    let significant = precision.max(1);
    let scientific = format!("{:.*e}", significant - 1, abs);
    let (mantissa, exp) = split_exponent(&scientific);

    if exp >= -4 && exp < significant as i32 {
        let decimals = (significant as i32 - 1 - exp).max(0) as usize;
        let fixed = format!("{:.*}", decimals, abs);
        if alt {
            fixed
        } else {
            strip_fraction_zeros(&fixed).to_string()
        }
    } else if alt {
        c_exponent(mantissa, exp)
    } else {
        c_exponent(strip_fraction_zeros(mantissa), exp)
    }
}

fn strip_fraction_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn push_numeric(out: &mut String, spec: &Spec, negative: bool, prefix: &str, digits: &str) {
    let sign = if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    };
    let len = sign.len() + prefix.len() + digits.chars().count();
    let pad = spec.width.unwrap_or(0).saturating_sub(len);

    if spec.left {
        out.push_str(sign);
        out.push_str(prefix);
        out.push_str(digits);
        out.extend(std::iter::repeat(' ').take(pad));
    } else if spec.zero {
        out.push_str(sign);
        out.push_str(prefix);
        out.extend(std::iter::repeat('0').take(pad));
        out.push_str(digits);
    } else {
        out.extend(std::iter::repeat(' ').take(pad));
        out.push_str(sign);
        out.push_str(prefix);
        out.push_str(digits);
    }
}

fn push_text(out: &mut String, spec: &Spec, text: &str) {
    let pad = spec.width.unwrap_or(0).saturating_sub(text.chars().count());
    if spec.left {
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(pad));
    } else {
        out.extend(std::iter::repeat(' ').take(pad));
        out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_substitution() {
        let out = interpolate("user %s logged in %d times", &["alice".into(), 3.into()]).unwrap();
        assert_eq!(out, "user alice logged in 3 times");
    }

    #[test]
    fn test_percent_literal() {
        assert_eq!(interpolate("100%% done", &[]).unwrap(), "100% done");
        assert_eq!(interpolate("%d%%", &[50.into()]).unwrap(), "50%");
    }

    #[test]
    fn test_width_and_flags() {
        assert_eq!(interpolate("[%5d]", &[42.into()]).unwrap(), "[   42]");
        assert_eq!(interpolate("[%-5d]", &[42.into()]).unwrap(), "[42   ]");
        assert_eq!(interpolate("[%05d]", &[(-42).into()]).unwrap(), "[-0042]");
        assert_eq!(interpolate("[%+d]", &[7.into()]).unwrap(), "[+7]");
        assert_eq!(interpolate("[% d]", &[7.into()]).unwrap(), "[ 7]");
        assert_eq!(interpolate("[%6s]", &["ab".into()]).unwrap(), "[    ab]");
        assert_eq!(interpolate("[%-6s]", &["ab".into()]).unwrap(), "[ab    ]");
    }

    #[test]
    fn test_precision() {
        assert_eq!(interpolate("%.2f", &[1.23456.into()]).unwrap(), "1.23");
        assert_eq!(interpolate("%f", &[1.5.into()]).unwrap(), "1.500000");
        assert_eq!(interpolate("%.3s", &["abcdef".into()]).unwrap(), "abc");
        assert_eq!(interpolate("%.3d", &[5.into()]).unwrap(), "005");
        assert_eq!(interpolate("%8.3f", &[(-2.5).into()]).unwrap(), "  -2.500");
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(interpolate("%x", &[255.into()]).unwrap(), "ff");
        assert_eq!(interpolate("%X", &[255.into()]).unwrap(), "FF");
        assert_eq!(interpolate("%#x", &[255.into()]).unwrap(), "0xff");
        assert_eq!(interpolate("%o", &[8.into()]).unwrap(), "10");
        assert_eq!(interpolate("%#o", &[8.into()]).unwrap(), "0o10");
        assert_eq!(interpolate("%d", &[u64::MAX.into()]).unwrap(), u64::MAX.to_string());
        assert_eq!(interpolate("%d", &[true.into()]).unwrap(), "1");
        assert_eq!(interpolate("%d", &[3.9.into()]).unwrap(), "3");
        assert_eq!(interpolate("%u", &[3.9.into()]).unwrap(), "3");
        assert_eq!(interpolate("%ld", &[12.into()]).unwrap(), "12");
    }

    #[test]
    fn test_exponent_and_general() {
        assert_eq!(interpolate("%e", &[12345.678.into()]).unwrap(), "1.234568e+04");
        assert_eq!(interpolate("%.2E", &[0.000123.into()]).unwrap(), "1.23E-04");
        assert_eq!(interpolate("%g", &[0.0001.into()]).unwrap(), "0.0001");
        assert_eq!(interpolate("%g", &[100000.0.into()]).unwrap(), "100000");
        assert_eq!(interpolate("%g", &[1000000.0.into()]).unwrap(), "1e+06");
        assert_eq!(interpolate("%g", &[2.5.into()]).unwrap(), "2.5");
        assert_eq!(interpolate("%g", &[0.0.into()]).unwrap(), "0");
    }

    #[test]
    fn test_char_and_repr() {
        assert_eq!(interpolate("%c", &['x'.into()]).unwrap(), "x");
        assert_eq!(interpolate("%c", &[65.into()]).unwrap(), "A");
        assert_eq!(interpolate("%c", &["y".into()]).unwrap(), "y");
        assert_eq!(interpolate("%r", &["hi".into()]).unwrap(), "\"hi\"");
        assert_eq!(interpolate("%r", &[5.into()]).unwrap(), "5");
    }

    #[test]
    fn test_type_mismatch() {
        let err = interpolate("count %d", &["many".into()]).unwrap_err();
        assert_eq!(
            err,
            FormatError::TypeMismatch {
                conversion: 'd',
                expected: "an integer",
                found: "str",
            }
        );
        assert!(interpolate("%f", &["x".into()]).is_err());
        assert!(interpolate("%c", &["xy".into()]).is_err());
    }

    #[test]
    fn test_float_rejected_by_radix_conversions() {
        for template in ["%x", "%X", "%o"] {
            let err = interpolate(template, &[2.5.into()]).unwrap_err();
            assert!(matches!(err, FormatError::TypeMismatch { found: "float", .. }));
        }
    }

    #[test]
    fn test_float_string_form() {
        assert_eq!(interpolate("%s", &[1e16.into()]).unwrap(), "1e+16");
        assert_eq!(interpolate("%s", &[1.5e-7.into()]).unwrap(), "1.5e-07");
        assert_eq!(interpolate("%s", &[2.0.into()]).unwrap(), "2.0");
        assert_eq!(interpolate("%s", &[f64::NAN.into()]).unwrap(), "nan");
        assert_eq!(interpolate("%s", &[f64::NEG_INFINITY.into()]).unwrap(), "-inf");
    }

    #[test]
    fn test_oversized_fields_rejected() {
        assert_eq!(
            interpolate("%.70000f", &[1.5.into()]).unwrap_err(),
            FormatError::TooLarge(0)
        );
        assert_eq!(
            interpolate("n=%99999999999d", &[1.into()]).unwrap_err(),
            FormatError::TooLarge(2)
        );
        assert_eq!(interpolate("%65535d", &[1.into()]).unwrap().len(), MAX_FIELD);
    }

    #[test]
    fn test_safe_format_survives_oversized_fields() {
        let out = safe_format(&"%.70000f".into(), &[1.5.into()]);
        assert!(out.starts_with("%.70000f 1.5 [FORMAT ERROR:"));

        let out = safe_format(&"%99999999999d".into(), &[1.into()]);
        assert!(out.contains("too large"));
    }

    #[test]
    fn test_argument_count_errors() {
        assert_eq!(
            interpolate("%s and %s", &["one".into()]).unwrap_err(),
            FormatError::TooFewArguments
        );
        assert_eq!(
            interpolate("%s", &["one".into(), "two".into()]).unwrap_err(),
            FormatError::TooManyArguments
        );
    }

    #[test]
    fn test_malformed_templates() {
        assert_eq!(
            interpolate("trailing %", &[1.into()]).unwrap_err(),
            FormatError::Incomplete(9)
        );
        assert_eq!(
            interpolate("%q", &[1.into()]).unwrap_err(),
            FormatError::Unsupported { ch: 'q', position: 1 }
        );
    }

    #[test]
    fn test_safe_format_without_args_is_verbatim() {
        assert_eq!(safe_format(&"50% off %d".into(), &[]), "50% off %d");
        assert_eq!(safe_format(&42.into(), &[]), "42");
    }

    #[test]
    fn test_safe_format_falls_back_on_mismatch() {
        let out = safe_format(&"Credentials authentication: %d".into(), &["success".into()]);

        assert!(out.starts_with("Credentials authentication: %d success"));
        assert!(out.contains("[FORMAT ERROR:"));
        assert!(out.contains("fell back to concatenation"));
    }

    #[test]
    fn test_safe_format_non_string_template() {
        let out = safe_format(&Arg::Int(7), &["a".into(), 2.5.into()]);
        assert_eq!(out, format!("7 a 2.5{}", NON_STRING_TEMPLATE_MARKER));
    }

    #[test]
    fn test_safe_format_success() {
        assert_eq!(
            safe_format(&"response: %s".into(), &[Arg::display(&"ok")]),
            "response: ok"
        );
    }

    #[test]
    fn test_unicode_template() {
        assert_eq!(
            interpolate("żółw %s ✓", &["ok".into()]).unwrap(),
            "żółw ok ✓"
        );
    }
}
