//! External data sources: process execution and the APT commands built on it.

pub mod apt;
pub mod runner;

pub use apt::{PhasingMode, UpdateSource};
pub use runner::{CheckContext, CommandError, CommandOutput, CommandRunner, SystemCommandRunner};
