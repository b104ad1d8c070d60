#![forbid(unsafe_code)]

//! Argument segmentation and command dispatch
//!
//! A single argument vector may hold several command invocations. Dispatch
//! scans it for command tags, cuts it into one slice per occurrence, orders
//! the slices by command priority and runs them one at a time until a
//! command settles the outcome.

use crate::command::Commander;
use crate::program::Flip;
use crate::status::{ExitStatus, Outcome};
use tracing::{debug, trace};

/// A recognized command occurrence awaiting execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperation {
    /// Index of the command tag in the argument vector
    pub start: usize,
    /// Exclusive end of the command's slice
    pub stop: usize,
    pub priority: i32,
    pub(crate) location: (usize, usize),
}

/// Builds the execution queue for `arguments`
///
/// Algorithm:
/// 1. Every token equal to a registered tag opens an operation; an escaping
///    command stops the scan.
/// 2. Each operation runs up to the next one's start, the last one to the end.
/// 3. Operations are stably sorted by command priority, so position in the
///    input only breaks ties.
pub fn queue<C>(commander: &Commander<C>, arguments: &[String]) -> Vec<PendingOperation> {
    let mut operations: Vec<PendingOperation> = Vec::new();

    for (index, token) in arguments.iter().enumerate() {
        if let Some(location) = commander.locate(token) {
            let cmd = commander.command_at(location);
            operations.push(PendingOperation {
                start: index,
                stop: arguments.len(),
                priority: cmd.priority(),
                location,
            });
            if cmd.escapes() {
                trace!(tag = cmd.tag(), index, "escaping command stops the scan");
                break;
            }
        }
    }

    for i in 1..operations.len() {
        operations[i - 1].stop = operations[i].start;
    }

    operations.sort_by_key(|op| op.priority);
    operations
}

impl<C: 'static> Flip<C> {
    /// Dispatches `arguments` and returns the outcome code
    ///
    /// Returns 0 on success, -1 on failure and -2 when no command settled
    /// the outcome (including empty input and usage errors). A cleanup may
    /// override the code by requesting an outcome.
    pub fn execute<S: AsRef<str>>(&mut self, ctx: C, arguments: &[S]) -> i32 {
        let arguments: Vec<String> = arguments.iter().map(|a| a.as_ref().to_string()).collect();
        let mut ctx = ctx;

        for op in queue(&self.commander, &arguments) {
            let args = &arguments[op.start + 1..op.stop];
            let cmd = self.commander.command_at_mut(op.location);
            debug!(tag = cmd.tag(), priority = op.priority, ?args, "executing command");

            let (next, status) = match cmd.flags_mut().parse(args) {
                Ok(()) => cmd.execute(ctx, args),
                Err(e) => {
                    debug!(tag = cmd.tag(), error = %e, "flag parsing failed");
                    (ctx, ExitStatus::UsageError)
                }
            };
            ctx = next;

            trace!(?status, "command finished");
            match status {
                ExitStatus::Success | ExitStatus::Failure => return self.conclude(status, &ctx),
                ExitStatus::UsageError => break,
                ExitStatus::No | ExitStatus::Any => {}
            }
        }

        self.conclude(ExitStatus::UsageError, &ctx)
    }

    /// Dispatches `arguments` and exits the process with the outcome code
    pub fn run<S: AsRef<str>>(&mut self, ctx: C, arguments: &[S]) -> ! {
        let code = self.execute(ctx, arguments);
        std::process::exit(code)
    }

    fn conclude(&self, status: ExitStatus, ctx: &C) -> i32 {
        let default = Outcome::from_status(status).unwrap_or(Outcome::UsageError);
        let outcome = self.run_cleanup(status, ctx).unwrap_or(default);
        debug!(?status, ?outcome, "dispatch concluded");
        outcome.code()
    }
}
