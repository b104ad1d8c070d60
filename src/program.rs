#![forbid(unsafe_code)]

//! The program: command registry, instructer and cleaner in one place
//!
//! A [`Flip`] is configured once at startup (groups, commands, cleanups) and
//! then handed the argument vector through `execute` or `run`, which live in
//! [`crate::dispatch`].

use crate::cleanup::{Cleaner, Cleanup};
use crate::command::{Command, Commander, Group};
use crate::config::Config;
use crate::flag::{ErrorHandling, FlagSet};
use crate::output::{Instruct, Instructer, SharedOutput};
use crate::status::{ExitStatus, Outcome};
use std::fmt;
use std::io::{self, Write};
use termcolor::{ColorChoice, WriteColor};
use tracing::debug;

pub struct Flip<C> {
    name: String,
    pub(crate) commander: Commander<C>,
    instructer: Instructer,
    cleaner: Cleaner<C>,
}

impl<C: 'static> Flip<C> {
    /// Creates a program with an empty default group and the usage
    /// instruction registered as the usage-error cleanup
    pub fn new(name: impl Into<String>) -> Self {
        let mut cleaner = Cleaner::new();
        cleaner.set_cleanup(ExitStatus::UsageError, vec![Cleanup::Instruction]);
        let mut flip = Flip {
            name: name.into(),
            commander: Commander::new(),
            instructer: Instructer::stdout(ColorChoice::Auto),
            cleaner,
        };
        flip.set_group("", 0, vec![]);
        flip
    }

    pub fn with_config(name: impl Into<String>, config: &Config) -> Self {
        let mut flip = Self::new(name);
        flip.instructer = Instructer::stdout(config.color.into());
        flip.instructer.set_title(config.title.clone());
        if config.help {
            flip.add_help();
        }
        if let Some(version) = &config.version {
            flip.add_version(version);
        }
        flip
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn commander(&self) -> &Commander<C> {
        &self.commander
    }

    pub fn get_group(&self, name: &str) -> Option<&Group<C>> {
        self.commander.get_group(name)
    }

    pub fn get_group_mut(&mut self, name: &str) -> Option<&mut Group<C>> {
        self.commander.get_group_mut(name)
    }

    pub fn set_group(&mut self, name: &str, priority: i32, commands: Vec<Command<C>>) -> &mut Self {
        self.commander.set_group(name, priority, commands);
        self
    }

    pub fn get_command(&self, tag: &str) -> Option<&Command<C>> {
        self.commander.get_command(tag)
    }

    pub fn get_command_mut(&mut self, tag: &str) -> Option<&mut Command<C>> {
        self.commander.get_command_mut(tag)
    }

    pub fn set_command(&mut self, commands: Vec<Command<C>>) -> &mut Self {
        self.commander.set_command(commands);
        self
    }

    /// Registers a built-in command by name: `help`, or `version` with the
    /// version string as first argument
    pub fn add_command(&mut self, name: &str, args: &[&str]) -> &mut Self {
        match name {
            "help" => self.add_help(),
            "version" => self.add_version(args.first().copied().unwrap_or_default()),
            other => {
                debug!(command = other, "no built-in command with this name");
                self
            }
        }
    }

    /// Registers `help`, which escapes the rest of the arguments and routes
    /// dispatch to the usage instruction
    pub fn add_help(&mut self) -> &mut Self {
        let help = Command::new("help", FlagSet::new("help", ErrorHandling::ContinueOnError))
            .with_usage("Show usage for every command")
            .with_priority(i32::MIN)
            .with_escapes(true)
            .with_action(|ctx: C, _args: &[String]| (ctx, ExitStatus::UsageError));
        self.set_command(vec![help])
    }

    /// Registers `version`, which prints `<name> <version>` and succeeds
    pub fn add_version(&mut self, version: &str) -> &mut Self {
        let line = format!("{} {}", self.name, version);
        let out = self.instructer.out();
        let cmd = Command::new("version", FlagSet::new("version", ErrorHandling::ContinueOnError))
            .with_usage("Print the program version")
            .with_priority(i32::MIN + 1)
            .with_escapes(true)
            .with_action(move |ctx: C, _args: &[String]| {
                let mut out = out.borrow_mut();
                match writeln!(out, "{}", line).and_then(|_| out.flush()) {
                    Ok(()) => (ctx, ExitStatus::Success),
                    Err(_) => (ctx, ExitStatus::Failure),
                }
            });
        self.set_command(vec![cmd])
    }

    pub fn set_title(&mut self, template: impl Into<String>) -> &mut Self {
        self.instructer.set_title(template);
        self
    }

    /// Handle to the usage output sink
    pub fn output(&self) -> SharedOutput {
        self.instructer.out()
    }

    pub fn set_output(&mut self, output: Box<dyn WriteColor>) -> &mut Self {
        self.instructer.set_out(output);
        self
    }

    /// Cleanup rendering only the named commands
    pub fn subset_instruction<I, S>(&self, tags: I) -> Cleanup<C>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Cleanup::subset(tags)
    }

    pub fn set_cleanup(&mut self, status: ExitStatus, cleanups: Vec<Cleanup<C>>) -> &mut Self {
        self.cleaner.set_cleanup(status, cleanups);
        self
    }

    /// Runs the cleanups for `status` and then the `Any` bucket
    pub fn run_cleanup(&self, status: ExitStatus, ctx: &C) -> Option<Outcome> {
        self.cleaner.run_cleanup(status, ctx, self)
    }
}

impl<C> Instruct for Flip<C> {
    fn instruction(&self) -> io::Result<()> {
        self.instructer.render(&self.name, &self.commander)
    }

    fn subset_instruction(&self, tags: &[String]) -> io::Result<()> {
        self.instructer.render_subset(&self.commander, tags)
    }
}

impl<C> fmt::Debug for Flip<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self
            .commander
            .groups()
            .iter()
            .flat_map(|group| group.commands().iter().map(|cmd| cmd.tag()))
            .collect();
        f.debug_struct("Flip")
            .field("name", &self.name)
            .field("commands", &tags)
            .field("instructer", &self.instructer)
            .finish_non_exhaustive()
    }
}
