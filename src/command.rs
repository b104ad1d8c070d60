#![forbid(unsafe_code)]

//! Commands and their registry

pub mod group;

pub use group::{Commander, Group, SortBy};

use crate::flag::FlagSet;
use crate::status::ExitStatus;
use std::fmt;
use std::io;
use termcolor::{ColorSpec, WriteColor};

/// Execution function of a command
///
/// Receives the context and the tokens that followed the command tag, and
/// hands back the (possibly replaced) context with an exit status.
pub type CommandFn<C> = Box<dyn FnMut(C, &[String]) -> (C, ExitStatus)>;

/// A named subcommand with its own flag set
pub struct Command<C> {
    group: String,
    tag: String,
    usage: String,
    priority: i32,
    escapes: bool,
    action: Option<CommandFn<C>>,
    flags: FlagSet,
}

impl<C> Command<C> {
    /// Creates a command in the default group with priority 0 and no action
    pub fn new(tag: impl Into<String>, flags: FlagSet) -> Self {
        Command {
            group: String::new(),
            tag: tag.into(),
            usage: String::new(),
            priority: 0,
            escapes: false,
            action: None,
            flags,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Lower priorities run first
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the command as escaping: once it is seen, the rest of the
    /// argument vector belongs to it and no further commands are recognized
    pub fn with_escapes(mut self, escapes: bool) -> Self {
        self.escapes = escapes;
        self
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: FnMut(C, &[String]) -> (C, ExitStatus) + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn set_group(&mut self, group: impl Into<String>) {
        self.group = group.into();
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn escapes(&self) -> bool {
        self.escapes
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    /// Runs the action, or fails when the command has none
    pub fn execute(&mut self, ctx: C, args: &[String]) -> (C, ExitStatus) {
        match self.action.as_mut() {
            Some(action) => action(ctx, args),
            None => (ctx, ExitStatus::Failure),
        }
    }

    /// Writes the header, the usage text and the flag entries
    pub fn write_usage(&self, out: &mut dyn WriteColor) -> io::Result<()> {
        out.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(out, "-----")?;
        writeln!(out, "{} [<flags>]:", self.tag)?;
        out.reset()?;
        writeln!(out, "\t{}", self.usage)?;
        writeln!(out)?;
        self.flags.usage(out)?;
        writeln!(out)
    }
}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("group", &self.group)
            .field("tag", &self.tag)
            .field("priority", &self.priority)
            .field("escapes", &self.escapes)
            .field("has_action", &self.action.is_some())
            .field("flags", &self.flags)
            .finish()
    }
}
