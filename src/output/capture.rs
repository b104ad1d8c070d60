#![forbid(unsafe_code)]

//! In-memory output sink
//!
//! Clones share one buffer, so a host (or a test) can hand a `Capture` to the
//! instructer and read back what was rendered. Color requests are ignored.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use termcolor::{ColorSpec, WriteColor};

#[derive(Debug, Clone, Default)]
pub struct Capture {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.bytes.borrow_mut().clear();
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteColor for Capture {
    fn supports_color(&self) -> bool {
        false
    }

    fn set_color(&mut self, _spec: &ColorSpec) -> io::Result<()> {
        Ok(())
    }

    fn reset(&mut self) -> io::Result<()> {
        Ok(())
    }
}
