#![forbid(unsafe_code)]

//! Flip: multi-command CLI toolkit
//!
//! Flip parses a flat argument vector that may contain several subcommands,
//! each with its own typed flags. Commands are queued by priority, executed
//! one after the other, and their exit status is routed through cleanup
//! callbacks before an outcome code is returned.
//!
//! ```no_run
//! use flip::{Command, ErrorHandling, ExitStatus, FlagSet, Flip};
//!
//! let mut flags = FlagSet::new("greet", ErrorHandling::ContinueOnError);
//! let name = flags.string("name", "world", "Who to greet").unwrap();
//!
//! let greet = Command::new("greet", flags)
//!     .with_usage("Print a greeting")
//!     .with_action(move |ctx: (), _args: &[String]| {
//!         println!("hello, {}", name.get());
//!         (ctx, ExitStatus::Success)
//!     });
//!
//! let mut app = Flip::new("hello");
//! app.add_help().set_group("main", 1, vec![greet]);
//!
//! let args: Vec<String> = std::env::args().skip(1).collect();
//! app.run((), &args);
//! ```

pub mod cleanup;
pub mod command;
pub mod config;
pub mod contain;
pub mod dispatch;
pub mod flag;
pub mod output;
pub mod program;
pub mod status;

pub use cleanup::{Cleaner, Cleanup};
pub use command::{Command, CommandFn, Commander, Group, SortBy};
pub use config::{ColorOption, Config, ConfigError};
pub use contain::{Container, Store};
pub use dispatch::PendingOperation;
pub use flag::{Datum, ErrorHandling, Flag, FlagError, FlagSet, Kind, Slot, Value, match_all};
pub use output::{Capture, Instruct, Instructer};
pub use program::Flip;
pub use status::{ExitStatus, Outcome};
