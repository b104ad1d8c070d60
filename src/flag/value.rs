#![forbid(unsafe_code)]

//! Typed flag values and their storage
//!
//! A [`Value`] has a fixed [`Kind`] and one of two storage strategies:
//! a private cell shared only with the [`Slot`] handed back at registration,
//! or a key inside an external [`Container`].

use crate::contain::Container;
use crate::flag::duration::{format_duration, parse_duration};
use regex::Regex;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::time::Duration;

/// Validation hook for regex flags
///
/// Receives the raw input and the compiled patterns. Returning `Err` rejects
/// the input; the message is reported as the parse failure reason.
pub type Validator = Box<dyn Fn(&str, &[Regex]) -> Result<(), String>>;

/// The kind of a flag value, fixed when the flag is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Int64,
    Uint,
    Uint64,
    String,
    Float64,
    Duration,
    Regex,
}

/// A typed datum held by a value or by a container entry
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Bool(bool),
    Int(i32),
    Int64(i64),
    Uint(u32),
    Uint64(u64),
    Str(String),
    Float64(f64),
    Duration(Duration),
}

impl Kind {
    /// Short label shown next to the flag name in usage text
    ///
    /// Booleans take no argument and therefore have no label.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Kind::Bool => None,
            Kind::Int | Kind::Int64 => Some("int"),
            Kind::Uint | Kind::Uint64 => Some("uint"),
            Kind::String | Kind::Regex => Some("string"),
            Kind::Float64 => Some("float"),
            Kind::Duration => Some("duration"),
        }
    }

    pub fn zero(self) -> Datum {
        match self {
            Kind::Bool => Datum::Bool(false),
            Kind::Int => Datum::Int(0),
            Kind::Int64 => Datum::Int64(0),
            Kind::Uint => Datum::Uint(0),
            Kind::Uint64 => Datum::Uint64(0),
            Kind::String | Kind::Regex => Datum::Str(String::new()),
            Kind::Float64 => Datum::Float64(0.0),
            Kind::Duration => Datum::Duration(Duration::ZERO),
        }
    }

    /// Whether `datum` can be stored in a value of this kind
    pub fn admits(self, datum: &Datum) -> bool {
        matches!(
            (self, datum),
            (Kind::Bool, Datum::Bool(_))
                | (Kind::Int, Datum::Int(_))
                | (Kind::Int64, Datum::Int64(_))
                | (Kind::Uint, Datum::Uint(_))
                | (Kind::Uint64, Datum::Uint64(_))
                | (Kind::String | Kind::Regex, Datum::Str(_))
                | (Kind::Float64, Datum::Float64(_))
                | (Kind::Duration, Datum::Duration(_))
        )
    }

    /// Parses `literal` according to this kind's grammar
    pub fn parse(self, literal: &str) -> Result<Datum, String> {
        match self {
            Kind::Bool => parse_bool(literal).map(Datum::Bool),
            Kind::Int => parse_signed(literal)
                .and_then(|v| i32::try_from(v).map_err(|_| "value out of range".to_string()))
                .map(Datum::Int),
            Kind::Int64 => parse_signed(literal)
                .and_then(|v| i64::try_from(v).map_err(|_| "value out of range".to_string()))
                .map(Datum::Int64),
            Kind::Uint => parse_unsigned(literal)
                .and_then(|v| u32::try_from(v).map_err(|_| "value out of range".to_string()))
                .map(Datum::Uint),
            Kind::Uint64 => parse_unsigned(literal).map(Datum::Uint64),
            Kind::String | Kind::Regex => Ok(Datum::Str(literal.to_string())),
            Kind::Float64 => literal
                .parse::<f64>()
                .map(Datum::Float64)
                .map_err(|_| "invalid syntax".to_string()),
            Kind::Duration => parse_duration(literal).map(Datum::Duration),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint64 => "uint64",
            Kind::String => "string",
            Kind::Float64 => "float64",
            Kind::Duration => "duration",
            Kind::Regex => "regex",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Bool(v) => write!(f, "{}", v),
            Datum::Int(v) => write!(f, "{}", v),
            Datum::Int64(v) => write!(f, "{}", v),
            Datum::Uint(v) => write!(f, "{}", v),
            Datum::Uint64(v) => write!(f, "{}", v),
            Datum::Str(v) => f.write_str(v),
            Datum::Float64(v) => write!(f, "{}", v),
            Datum::Duration(v) => f.write_str(&format_duration(*v)),
        }
    }
}

fn parse_bool(literal: &str) -> Result<bool, String> {
    match literal {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("invalid boolean literal".to_string()),
    }
}

fn parse_signed(literal: &str) -> Result<i128, String> {
    let (negative, digits) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };
    let magnitude = i128::from(parse_magnitude(digits)?);
    Ok(if negative { -magnitude } else { magnitude })
}

fn parse_unsigned(literal: &str) -> Result<u64, String> {
    parse_magnitude(literal)
}

/// Parses an unsigned integer with an optional base prefix
///
/// `0x`, `0o` and `0b` select hex, octal and binary; a bare leading zero
/// selects octal. Underscores may separate digits.
fn parse_magnitude(literal: &str) -> Result<u64, String> {
    let lower = literal.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    // A base prefix may be followed by one separator; elsewhere `_` must sit
    // between two digits.
    let body = match radix {
        10 => body,
        _ => body.strip_prefix('_').unwrap_or(body),
    };
    if body.is_empty()
        || body.starts_with('_')
        || body.ends_with('_')
        || body.contains("__")
        || !body.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
    {
        return Err("invalid syntax".to_string());
    }

    let cleaned: String = body.chars().filter(|c| *c != '_').collect();
    u64::from_str_radix(&cleaned, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => "value out of range".to_string(),
        _ => "invalid syntax".to_string(),
    })
}

/// Rust types that map onto a value kind
pub trait Kinded: Clone + Default {
    const KIND: Kind;

    fn into_datum(self) -> Datum;

    fn from_datum(datum: &Datum) -> Option<Self>;
}

macro_rules! kinded {
    ($ty:ty, $kind:ident, $variant:ident) => {
        impl Kinded for $ty {
            const KIND: Kind = Kind::$kind;

            fn into_datum(self) -> Datum {
                Datum::$variant(self)
            }

            fn from_datum(datum: &Datum) -> Option<Self> {
                match datum {
                    Datum::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

kinded!(bool, Bool, Bool);
kinded!(i32, Int, Int);
kinded!(i64, Int64, Int64);
kinded!(u32, Uint, Uint);
kinded!(u64, Uint64, Uint64);
kinded!(String, String, Str);
kinded!(f64, Float64, Float64);
kinded!(Duration, Duration, Duration);

/// Typed read handle onto an owned flag value
///
/// Returned by the `FlagSet` registration methods. Clones share the same
/// storage, so a handle captured by a command closure observes whatever the
/// most recent parse stored.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    cell: Rc<RefCell<Datum>>,
    kind: PhantomData<T>,
}

impl<T: Kinded> Slot<T> {
    pub(crate) fn new(cell: Rc<RefCell<Datum>>) -> Self {
        Slot {
            cell,
            kind: PhantomData,
        }
    }

    pub fn get(&self) -> T {
        T::from_datum(&self.cell.borrow()).unwrap_or_default()
    }
}

enum Storage {
    Owned(Rc<RefCell<Datum>>),
    Contained {
        container: Rc<dyn Container>,
        key: String,
    },
}

struct Check {
    patterns: Vec<Regex>,
    validator: Validator,
}

/// A settable, gettable typed cell backing one flag
pub struct Value {
    kind: Kind,
    storage: Storage,
    check: Option<Check>,
}

impl Value {
    pub(crate) fn owned(kind: Kind, initial: Datum) -> (Self, Rc<RefCell<Datum>>) {
        let cell = Rc::new(RefCell::new(initial));
        let value = Value {
            kind,
            storage: Storage::Owned(Rc::clone(&cell)),
            check: None,
        };
        (value, cell)
    }

    pub(crate) fn contained(kind: Kind, container: Rc<dyn Container>, key: &str) -> Self {
        Value {
            kind,
            storage: Storage::Contained {
                container,
                key: key.to_string(),
            },
            check: None,
        }
    }

    pub(crate) fn with_check(mut self, patterns: Vec<Regex>, validator: Validator) -> Self {
        self.check = Some(Check {
            patterns,
            validator,
        });
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Current value
    ///
    /// For regex flags this is the most recently accepted input, not the
    /// pattern; see [`Value::patterns`] for the latter.
    pub fn get(&self) -> Datum {
        match &self.storage {
            Storage::Owned(cell) => cell.borrow().clone(),
            Storage::Contained { container, key } => container
                .get(key)
                .filter(|datum| self.kind.admits(datum))
                .unwrap_or_else(|| self.kind.zero()),
        }
    }

    /// Parses `literal`, validates it and stores the result
    ///
    /// Nothing is stored when parsing or validation fails.
    pub fn set(&self, literal: &str) -> Result<(), String> {
        let datum = self.kind.parse(literal)?;
        if let Some(check) = &self.check {
            (check.validator)(literal, &check.patterns)?;
        }
        self.store(datum);
        Ok(())
    }

    pub(crate) fn store(&self, datum: Datum) {
        match &self.storage {
            Storage::Owned(cell) => *cell.borrow_mut() = datum,
            Storage::Contained { container, key } => container.set(key, datum),
        }
    }

    pub fn is_bool_flag(&self) -> bool {
        self.kind == Kind::Bool
    }

    /// Compiled validation patterns; empty unless this is a regex flag
    pub fn patterns(&self) -> &[Regex] {
        self.check
            .as_ref()
            .map(|check| check.patterns.as_slice())
            .unwrap_or_default()
    }

    /// The container key, for contained values
    pub fn key(&self) -> Option<&str> {
        match &self.storage {
            Storage::Owned(_) => None,
            Storage::Contained { key, .. } => Some(key),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("kind", &self.kind)
            .field("key", &self.key())
            .field("value", &self.get())
            .finish()
    }
}

/// Validator that requires the input to match every pattern
pub fn match_all(input: &str, patterns: &[Regex]) -> Result<(), String> {
    for pattern in patterns {
        if !pattern.is_match(input) {
            return Err(format!(
                "regex flag '{} | {}': no match where a match was expected",
                pattern.as_str(),
                input
            ));
        }
    }
    Ok(())
}
