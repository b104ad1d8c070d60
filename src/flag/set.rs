#![forbid(unsafe_code)]

//! Named, ordered collections of flags
//!
//! A [`FlagSet`] owns the flags of one command. Flags are kept in
//! registration order (which drives usage output and visiting) with a name
//! index for lookup.

use crate::contain::Container;
use crate::flag::value::{Datum, Kind, Kinded, Slot, Validator, Value};
use crate::flag::FlagError;
use crate::status::Outcome;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::rc::Rc;
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::trace;

/// How a flag set reacts to configuration and parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorHandling {
    /// Return the error to the caller
    ContinueOnError,
    /// Report the error and usage on stderr, then exit with the usage-error code
    ExitOnError,
    /// Panic with the error message
    PanicOnError,
}

/// A single registered flag
#[derive(Debug)]
pub struct Flag {
    name: String,
    usage: String,
    default: Datum,
    value: Value,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Value the flag held when it was registered
    pub fn default_value(&self) -> &Datum {
        &self.default
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Splits the usage text into a type label and the displayed text
    ///
    /// A back-quoted word in the usage overrides the label inferred from the
    /// value kind and is shown with the quotes removed. A lone back-quote is
    /// left untouched.
    pub fn unquote_usage(&self) -> (Option<String>, String) {
        if let Some(open) = self.usage.find('`')
            && let Some(len) = self.usage[open + 1..].find('`')
        {
            let close = open + 1 + len;
            let label = &self.usage[open + 1..close];
            let text = format!("{}{}{}", &self.usage[..open], label, &self.usage[close + 1..]);
            return (Some(label.to_string()), text);
        }
        (
            self.value.kind().label().map(str::to_string),
            self.usage.clone(),
        )
    }
}

/// An ordered, name-unique set of flags for one command
#[derive(Debug)]
pub struct FlagSet {
    name: String,
    handling: ErrorHandling,
    flags: Vec<Flag>,
    index: HashMap<String, usize>,
    actual: HashSet<String>,
    args: Vec<String>,
    parsed: bool,
}

impl FlagSet {
    pub fn new(name: impl Into<String>, handling: ErrorHandling) -> Self {
        FlagSet {
            name: name.into(),
            handling,
            flags: Vec::new(),
            index: HashMap::new(),
            actual: HashSet::new(),
            args: Vec::new(),
            parsed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.handling
    }

    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Result<Slot<bool>, FlagError> {
        self.var(name, default, usage)
    }

    pub fn int(&mut self, name: &str, default: i32, usage: &str) -> Result<Slot<i32>, FlagError> {
        self.var(name, default, usage)
    }

    pub fn int64(&mut self, name: &str, default: i64, usage: &str) -> Result<Slot<i64>, FlagError> {
        self.var(name, default, usage)
    }

    pub fn uint(&mut self, name: &str, default: u32, usage: &str) -> Result<Slot<u32>, FlagError> {
        self.var(name, default, usage)
    }

    pub fn uint64(&mut self, name: &str, default: u64, usage: &str) -> Result<Slot<u64>, FlagError> {
        self.var(name, default, usage)
    }

    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Result<Slot<String>, FlagError> {
        self.var(name, default.to_string(), usage)
    }

    pub fn float64(&mut self, name: &str, default: f64, usage: &str) -> Result<Slot<f64>, FlagError> {
        self.var(name, default, usage)
    }

    pub fn duration(
        &mut self,
        name: &str,
        default: std::time::Duration,
        usage: &str,
    ) -> Result<Slot<std::time::Duration>, FlagError> {
        self.var(name, default, usage)
    }

    /// Registers an owned flag of any supported type
    pub fn var<T: Kinded>(&mut self, name: &str, default: T, usage: &str) -> Result<Slot<T>, FlagError> {
        self.ensure_free(name)?;
        let default = default.into_datum();
        let (value, cell) = Value::owned(T::KIND, default.clone());
        self.insert(name, usage, default, value);
        Ok(Slot::new(cell))
    }

    pub fn bool_contain(&mut self, container: Rc<dyn Container>, name: &str, key: &str, usage: &str) -> Result<(), FlagError> {
        self.contain(Kind::Bool, container, name, key, usage)
    }

    pub fn int_contain(&mut self, container: Rc<dyn Container>, name: &str, key: &str, usage: &str) -> Result<(), FlagError> {
        self.contain(Kind::Int, container, name, key, usage)
    }

    pub fn int64_contain(&mut self, container: Rc<dyn Container>, name: &str, key: &str, usage: &str) -> Result<(), FlagError> {
        self.contain(Kind::Int64, container, name, key, usage)
    }

    pub fn uint_contain(&mut self, container: Rc<dyn Container>, name: &str, key: &str, usage: &str) -> Result<(), FlagError> {
        self.contain(Kind::Uint, container, name, key, usage)
    }

    pub fn uint64_contain(&mut self, container: Rc<dyn Container>, name: &str, key: &str, usage: &str) -> Result<(), FlagError> {
        self.contain(Kind::Uint64, container, name, key, usage)
    }

    pub fn string_contain(&mut self, container: Rc<dyn Container>, name: &str, key: &str, usage: &str) -> Result<(), FlagError> {
        self.contain(Kind::String, container, name, key, usage)
    }

    pub fn float64_contain(&mut self, container: Rc<dyn Container>, name: &str, key: &str, usage: &str) -> Result<(), FlagError> {
        self.contain(Kind::Float64, container, name, key, usage)
    }

    pub fn duration_contain(&mut self, container: Rc<dyn Container>, name: &str, key: &str, usage: &str) -> Result<(), FlagError> {
        self.contain(Kind::Duration, container, name, key, usage)
    }

    /// Registers a contained flag of the given kind
    ///
    /// The flag starts from whatever the container holds at `key`. A missing
    /// entry is seeded with the kind's zero value; an entry of another kind
    /// is a configuration error.
    pub fn contain(
        &mut self,
        kind: Kind,
        container: Rc<dyn Container>,
        name: &str,
        key: &str,
        usage: &str,
    ) -> Result<(), FlagError> {
        self.ensure_free(name)?;
        let initial = self.seed(kind, container.as_ref(), name, key)?;
        let value = Value::contained(kind, container, key);
        self.insert(name, usage, initial, value);
        Ok(())
    }

    /// Registers a string flag whose input must pass `validator`
    pub fn regex<F>(&mut self, name: &str, usage: &str, validator: F, patterns: &[&str]) -> Result<Slot<String>, FlagError>
    where
        F: Fn(&str, &[Regex]) -> Result<(), String> + 'static,
    {
        self.ensure_free(name)?;
        let compiled = self.compile(name, patterns)?;
        let (value, cell) = Value::owned(Kind::Regex, Kind::Regex.zero());
        let value = value.with_check(compiled, Box::new(validator) as Validator);
        self.insert(name, usage, Kind::Regex.zero(), value);
        Ok(Slot::new(cell))
    }

    /// Contained counterpart of [`FlagSet::regex`]
    pub fn regex_contain<F>(
        &mut self,
        container: Rc<dyn Container>,
        name: &str,
        key: &str,
        usage: &str,
        validator: F,
        patterns: &[&str],
    ) -> Result<(), FlagError>
    where
        F: Fn(&str, &[Regex]) -> Result<(), String> + 'static,
    {
        self.ensure_free(name)?;
        let compiled = self.compile(name, patterns)?;
        let initial = self.seed(Kind::Regex, container.as_ref(), name, key)?;
        let value = Value::contained(Kind::Regex, container, key).with_check(compiled, Box::new(validator));
        self.insert(name, usage, initial, value);
        Ok(())
    }

    fn ensure_free(&self, name: &str) -> Result<(), FlagError> {
        if self.index.contains_key(name) {
            return Err(self.fail(FlagError::Redefined {
                set: self.name.clone(),
                name: name.to_string(),
            }));
        }
        Ok(())
    }

    fn seed(&self, kind: Kind, container: &dyn Container, name: &str, key: &str) -> Result<Datum, FlagError> {
        match container.get(key) {
            Some(datum) if kind.admits(&datum) => Ok(datum),
            Some(_) => Err(self.fail(FlagError::KindMismatch {
                name: name.to_string(),
                key: key.to_string(),
                expected: kind,
            })),
            None => {
                let zero = kind.zero();
                container.set(key, zero.clone());
                Ok(zero)
            }
        }
    }

    fn compile(&self, name: &str, patterns: &[&str]) -> Result<Vec<Regex>, FlagError> {
        patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| {
                    self.fail(FlagError::Pattern {
                        name: name.to_string(),
                        pattern: pattern.to_string(),
                        source,
                    })
                })
            })
            .collect()
    }

    fn insert(&mut self, name: &str, usage: &str, default: Datum, value: Value) {
        self.index.insert(name.to_string(), self.flags.len());
        self.flags.push(Flag {
            name: name.to_string(),
            usage: usage.to_string(),
            default,
            value,
        });
    }

    /// Applies the error handling mode
    ///
    /// Only returns in `ContinueOnError` mode.
    fn fail(&self, err: FlagError) -> FlagError {
        match self.handling {
            ErrorHandling::ContinueOnError => err,
            ErrorHandling::ExitOnError => {
                let mut stderr = StandardStream::stderr(ColorChoice::Auto);
                // The process is about to exit; a failed write changes nothing.
                let _ = writeln!(stderr, "{}", err).and_then(|_| self.usage(&mut stderr));
                std::process::exit(Outcome::UsageError.code())
            }
            ErrorHandling::PanicOnError => panic!("{}", err),
        }
    }

    /// Parses flag tokens, stopping at the first positional argument
    ///
    /// `arguments` must not include the command tag. Calling this again
    /// reprocesses the new input on top of the current state.
    pub fn parse<S: AsRef<str>>(&mut self, arguments: &[S]) -> Result<(), FlagError> {
        self.parsed = true;
        let tokens: Vec<&str> = arguments.iter().map(AsRef::as_ref).collect();
        let mut next = 0;
        loop {
            match self.parse_one(&tokens, &mut next) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => return Err(self.fail(err)),
            }
        }
        self.args = tokens[next..].iter().map(|t| t.to_string()).collect();
        Ok(())
    }

    /// Consumes one flag (and possibly its value); `false` ends flag parsing
    fn parse_one(&mut self, tokens: &[&str], next: &mut usize) -> Result<bool, FlagError> {
        let Some(token) = tokens.get(*next).copied() else {
            return Ok(false);
        };
        if token.len() < 2 || !token.starts_with('-') {
            return Ok(false);
        }

        let mut dashes = 1;
        if token.as_bytes()[1] == b'-' {
            dashes = 2;
            if token.len() == 2 {
                // "--" terminates the flags and is swallowed
                *next += 1;
                return Ok(false);
            }
        }

        let body = &token[dashes..];
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(FlagError::Syntax(token.to_string()));
        }
        *next += 1;

        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let Some(&position) = self.index.get(name) else {
            return Err(FlagError::Undefined(name.to_string()));
        };
        let flag = &self.flags[position];

        let literal = match inline {
            Some(literal) => literal,
            None if flag.value.is_bool_flag() => "true",
            None => {
                let Some(literal) = tokens.get(*next).copied() else {
                    return Err(FlagError::MissingValue(name.to_string()));
                };
                *next += 1;
                literal
            }
        };
        flag.value.set(literal).map_err(|reason| FlagError::InvalidValue {
            name: name.to_string(),
            value: literal.to_string(),
            reason,
        })?;

        trace!(set = %self.name, flag = name, value = literal, "flag parsed");
        self.actual.insert(name.to_string());
        Ok(true)
    }

    pub fn parsed(&self) -> bool {
        self.parsed
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.index.get(name).map(|&position| &self.flags[position])
    }

    /// Assigns a flag outside of parsing and marks it as set
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FlagError> {
        let Some(&position) = self.index.get(name) else {
            return Err(FlagError::NoSuchFlag(name.to_string()));
        };
        self.flags[position]
            .value
            .set(value)
            .map_err(|reason| FlagError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                reason,
            })?;
        self.actual.insert(name.to_string());
        Ok(())
    }

    /// Visits flags that have been set, in registration order
    pub fn visit<F: FnMut(&Flag)>(&self, mut f: F) {
        self.flags
            .iter()
            .filter(|flag| self.actual.contains(&flag.name))
            .for_each(|flag| f(flag));
    }

    /// Visits every registered flag, in registration order
    pub fn visit_all<F: FnMut(&Flag)>(&self, f: F) {
        self.flags.iter().for_each(f);
    }

    /// Number of flags that have been set
    pub fn n_flag(&self) -> usize {
        self.actual.len()
    }

    /// Positional argument `i`, if present
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }

    pub fn n_arg(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Writes one entry per registered flag
    pub fn usage(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        for flag in &self.flags {
            let (label, text) = flag.unquote_usage();

            write!(out, "  ")?;
            out.set_color(ColorSpec::new().set_bold(true))?;
            write!(out, "-{}", flag.name)?;
            out.reset()?;
            if let Some(label) = label {
                write!(out, " {}", label)?;
            }
            writeln!(out)?;

            write!(out, "    \t{}", text)?;
            if flag.default != flag.value.kind().zero() {
                match &flag.default {
                    Datum::Str(s) => write!(out, " (default {:?})", s)?,
                    other => write!(out, " (default {})", other)?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
