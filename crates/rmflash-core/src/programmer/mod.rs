//! Flash programmer orchestration
//!
//! rmflash does not talk to flash hardware itself. It drives an external
//! programmer tool (minipro) and turns the tool's exit status and messages
//! into typed errors:
//!
//! - [`ProgrammerTool`] - seam over the external tool; [`Minipro`] runs the
//!   real binary with a timeout
//! - [`output`] - parsing of the tool's query and error output
//! - [`select`] - picking an image from a directory of candidates
//! - [`Orchestrator`] - detection and write flows built on top of the above

pub mod output;
pub mod select;

mod orchestrator;
mod tool;

pub use orchestrator::*;
pub use select::{Candidate, Chooser};
pub use tool::*;
