mod casks;
mod commands;
mod process;

pub use casks::{cask_name, parse_catalog, parse_installed};
pub use commands::{BrewClient, BrewOutput, CaskCommand, CaskVerb};
pub use process::{ProcessRunner, TokioRunner};
#[cfg(test)]
pub use process::CommandResult;

#[cfg(test)]
pub(crate) use process::testing;
