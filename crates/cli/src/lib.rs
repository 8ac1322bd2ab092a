//! Scripted shopping sessions for the `storefront` binary.

pub mod runner;
pub mod script;

pub use runner::execute;
pub use script::{DEMO_SCRIPT, ScriptError, Step, parse_script};
