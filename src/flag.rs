//! Typed flags and flag sets

pub mod duration;
pub mod error;
pub mod set;
pub mod value;

pub use duration::{format_duration, parse_duration};
pub use error::FlagError;
pub use set::{ErrorHandling, Flag, FlagSet};
pub use value::{Datum, Kind, Kinded, Slot, Validator, Value, match_all};
