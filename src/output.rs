//! Usage rendering and output sinks

pub mod capture;
pub mod instruction;

pub use capture::Capture;
pub use instruction::{Instruct, Instructer, SharedOutput};
