#![forbid(unsafe_code)]

//! External key-value containers backing "contained" flags
//!
//! A contained flag does not own its value; it reads and writes an entry of a
//! container shared with the rest of the program. The flag engine only needs
//! the [`Container`] capability. [`Store`] is a plain in-memory implementation.

use crate::flag::Datum;
use std::cell::RefCell;
use std::collections::HashMap;

/// Get/set access to a shared keyed store
///
/// Both methods take `&self`: containers are shared through `Rc` and are
/// expected to use interior mutability.
pub trait Container {
    fn get(&self, key: &str) -> Option<Datum>;

    fn set(&self, key: &str, value: Datum);
}

/// In-memory container
#[derive(Debug, Default)]
pub struct Store {
    entries: RefCell<HashMap<String, Datum>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Container for Store {
    fn get(&self, key: &str) -> Option<Datum> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Datum) {
        self.entries.borrow_mut().insert(key.to_string(), value);
    }
}
