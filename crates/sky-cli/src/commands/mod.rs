//! Subcommand implementations

pub mod build;
pub mod check;
pub mod inspect;
pub mod run;

use std::path::Path;

use anyhow::Context;

/// Read a source file, naming it in the error.
pub fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}
