//! `sky check`: lex, parse and check without running.

use std::path::PathBuf;

use sky_runtime::check_source;

use crate::commands::read_source;
use crate::output::StyledOutput;

pub fn execute(files: &[PathBuf], out: &mut StyledOutput) -> anyhow::Result<()> {
    let mut failed = 0;

    for path in files {
        let source = read_source(path)?;
        let name = path.display().to_string();
        let report = check_source(&source, &name);

        if report.is_ok() {
            out.success("ok");
            out.line(&format!(": {}", name));
        } else {
            out.emit_diagnostics(&report.diagnostics, &report.files);
            failed += report.diagnostics.len();
        }
    }

    if failed > 0 {
        anyhow::bail!(
            "{} error{} found",
            failed,
            if failed == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
