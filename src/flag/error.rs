#![forbid(unsafe_code)]

//! Flag configuration and parse errors

use crate::flag::Kind;
use thiserror::Error;

/// Errors raised while registering or parsing flags
///
/// Configuration errors (`Redefined`, `Pattern`, `KindMismatch`) surface at
/// registration time and the syntax and value errors come out of
/// `FlagSet::parse`; both go through the set's
/// [`ErrorHandling`](crate::flag::ErrorHandling) mode. `FlagSet::set` always
/// returns its errors to the caller.
#[derive(Debug, Error)]
pub enum FlagError {
    /// A flag with this name is already registered on the set
    #[error("{set} flag redefined: {name}")]
    Redefined { set: String, name: String },

    /// A validation pattern failed to compile
    #[error("flag -{name}: invalid pattern {pattern:?}: {source}")]
    Pattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A container entry holds a value of a different kind than the flag
    #[error("flag -{name}: container key {key:?} does not hold a {expected} value")]
    KindMismatch {
        name: String,
        key: String,
        expected: Kind,
    },

    /// A token looked like a flag but is not well formed
    #[error("bad flag syntax: {0}")]
    Syntax(String),

    /// The flag name is not registered on the set
    #[error("flag provided but not defined: -{0}")]
    Undefined(String),

    /// A non-boolean flag was given without a value
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    /// The supplied text is not a valid literal for the flag
    #[error("invalid value {value:?} for flag -{name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    /// `FlagSet::set` was called with an unregistered name
    #[error("no such flag -{0}")]
    NoSuchFlag(String),
}
