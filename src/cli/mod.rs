//! Command-line front end: a parsed [`Command`] runs against a catalog and
//! prints a JSON envelope.

mod command;
mod runner;

pub use command::Command;
pub use runner::{error_envelope, run};
