//! `sky build`: compile to JSON bytecode.

use std::path::{Path, PathBuf};

use sky_runtime::{write_bytecode_file, Runtime, BYTECODE_EXTENSION};

use crate::output::StyledOutput;

pub fn execute(file: &Path, output: Option<PathBuf>, out: &mut StyledOutput) -> anyhow::Result<()> {
    let bytecode = Runtime::default().load(file)?;
    let target = output.unwrap_or_else(|| file.with_extension(BYTECODE_EXTENSION));
    write_bytecode_file(&target, &bytecode)?;

    out.success("Compiled");
    out.line(&format!(" {} -> {}", file.display(), target.display()));
    Ok(())
}
