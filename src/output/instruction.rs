#![forbid(unsafe_code)]

//! Aggregate and subset usage rendering
//!
//! The instructer owns the output sink and the title template. It renders
//! the title followed by every group of a [`Commander`] in priority order, or
//! only a chosen subset of commands.

use crate::command::Commander;
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing::debug;

/// Output sink shared between the instructer and built-in commands
pub type SharedOutput = Rc<RefCell<Box<dyn WriteColor>>>;

/// Default title template; `{name}` is replaced with the program name
pub const DEFAULT_TITLE: &str = "{name} [OPTIONS...] {COMMAND} ...";

/// Something that can render usage on request
///
/// Cleanups use this to render instructions without holding the registry.
pub trait Instruct {
    fn instruction(&self) -> io::Result<()>;

    fn subset_instruction(&self, tags: &[String]) -> io::Result<()>;
}

pub struct Instructer {
    title: String,
    output: SharedOutput,
}

impl Instructer {
    pub fn new(output: Box<dyn WriteColor>) -> Self {
        Instructer {
            title: DEFAULT_TITLE.to_string(),
            output: Rc::new(RefCell::new(output)),
        }
    }

    /// Instructer writing to stdout with the given color choice
    pub fn stdout(color_choice: ColorChoice) -> Self {
        Self::new(Box::new(StandardStream::stdout(color_choice)))
    }

    pub fn set_title(&mut self, template: impl Into<String>) {
        self.title = template.into();
    }

    pub fn title(&self, name: &str) -> String {
        self.title.replace("{name}", name)
    }

    /// Handle to the output sink
    pub fn out(&self) -> SharedOutput {
        Rc::clone(&self.output)
    }

    /// Replaces the sink; existing handles see the new sink too
    pub fn set_out(&mut self, output: Box<dyn WriteColor>) {
        *self.output.borrow_mut() = output;
    }

    /// Writes the title and the usage of every command
    pub fn render<C>(&self, name: &str, commander: &Commander<C>) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        self.write_title(out.as_mut(), name)?;
        commander.write_usage(out.as_mut())?;
        out.flush()
    }

    /// Writes the usage of the named commands, skipping unknown tags
    pub fn render_subset<C>(&self, commander: &Commander<C>, tags: &[String]) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        for tag in tags {
            match commander.get_command(tag) {
                Some(cmd) => cmd.write_usage(out.as_mut())?,
                None => debug!(tag = tag.as_str(), "no such command for subset instruction"),
            }
        }
        out.flush()
    }

    fn write_title(&self, out: &mut dyn WriteColor, name: &str) -> io::Result<()> {
        out.set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::White)))?;
        write!(out, "{}", self.title(name))?;
        out.reset()?;
        writeln!(out)?;
        writeln!(out)
    }
}

impl fmt::Debug for Instructer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instructer")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}
