#![forbid(unsafe_code)]

//! Cleanup callbacks keyed by exit status
//!
//! After dispatch settles on a terminal status, the callbacks registered for
//! that status run in registration order, followed by those registered for
//! [`ExitStatus::Any`]. Callbacks never exit the process themselves; they can
//! request an outcome, and the first request wins.

use crate::output::Instruct;
use crate::status::{ExitStatus, Outcome};
use std::collections::HashMap;
use std::fmt;
use tracing::{trace, warn};

/// A single cleanup action
pub enum Cleanup<C> {
    /// Render usage for every registered command
    Instruction,
    /// Render usage for the named commands only
    Subset(Vec<String>),
    /// Arbitrary callback over the final context
    Custom(Box<dyn Fn(&C) -> Option<Outcome>>),
}

impl<C> Cleanup<C> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&C) -> Option<Outcome> + 'static,
    {
        Cleanup::Custom(Box::new(f))
    }

    pub fn subset<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Cleanup::Subset(tags.into_iter().map(Into::into).collect())
    }

    fn run(&self, ctx: &C, instruct: &dyn Instruct) -> Option<Outcome> {
        let rendered = match self {
            Cleanup::Custom(f) => return f(ctx),
            Cleanup::Instruction => instruct.instruction(),
            Cleanup::Subset(tags) => instruct.subset_instruction(tags),
        };
        if let Err(e) = rendered {
            warn!(error = %e, "failed to write usage");
        }
        Some(Outcome::UsageError)
    }
}

impl<C> fmt::Debug for Cleanup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cleanup::Instruction => f.write_str("Instruction"),
            Cleanup::Subset(tags) => f.debug_tuple("Subset").field(tags).finish(),
            Cleanup::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Registry of cleanup buckets
#[derive(Debug)]
pub struct Cleaner<C> {
    buckets: HashMap<ExitStatus, Vec<Cleanup<C>>>,
}

impl<C> Default for Cleaner<C> {
    fn default() -> Self {
        Cleaner {
            buckets: HashMap::new(),
        }
    }
}

impl<C> Cleaner<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends callbacks to a status bucket
    ///
    /// `ExitStatus::No` only tells dispatch to keep going and is never run,
    /// so registrations against it are dropped.
    pub fn set_cleanup(&mut self, status: ExitStatus, cleanups: Vec<Cleanup<C>>) {
        if status == ExitStatus::No {
            warn!("ignoring cleanups registered for ExitStatus::No");
            return;
        }
        self.buckets.entry(status).or_default().extend(cleanups);
    }

    pub fn len(&self, status: ExitStatus) -> usize {
        self.buckets.get(&status).map_or(0, Vec::len)
    }

    /// Runs the status bucket, then the `Any` bucket
    ///
    /// Returns the first outcome requested by a callback.
    pub fn run_cleanup(&self, status: ExitStatus, ctx: &C, instruct: &dyn Instruct) -> Option<Outcome> {
        let specific = self.buckets.get(&status).into_iter().flatten();
        let any = match status {
            ExitStatus::Any => None,
            _ => self.buckets.get(&ExitStatus::Any),
        };

        let mut requested = None;
        for cleanup in specific.chain(any.into_iter().flatten()) {
            trace!(?status, ?cleanup, "running cleanup");
            let outcome = cleanup.run(ctx, instruct);
            requested = requested.or(outcome);
        }
        requested
    }
}
