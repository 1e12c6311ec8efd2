//! `sky disasm`, `sky tokens` and `sky ast`

use std::path::Path;

use sky_engine::parser::{Lexer, TokenKind};
use sky_runtime::{parse_source, Runtime, RuntimeOptions};

use crate::commands::read_source;
use crate::output::StyledOutput;

/// Bytecode listing of a source or bytecode file. The checker is skipped so
/// any program that compiles can be inspected.
pub fn disasm(file: &Path, out: &mut StyledOutput) -> anyhow::Result<()> {
    let runtime = Runtime::new(RuntimeOptions {
        check: false,
        ..RuntimeOptions::default()
    });
    let bytecode = runtime.load(file)?;
    out.plain(&bytecode.disassemble(&file.display().to_string()));
    Ok(())
}

/// One token per line: `line:col KIND("literal")`.
pub fn tokens(file: &Path, out: &mut StyledOutput) -> anyhow::Result<()> {
    let source = read_source(file)?;
    let tokens = Lexer::new(&source, file.display().to_string()).tokenize();

    let mut illegal = 0;
    for token in &tokens {
        if token.kind == TokenKind::Illegal {
            illegal += 1;
        }
        out.line(&format!(
            "{:>4}:{:<4} {}",
            token.span.line, token.span.column, token
        ));
    }

    if illegal > 0 {
        anyhow::bail!("{} illegal token{}", illegal, if illegal == 1 { "" } else { "s" });
    }
    Ok(())
}

/// The program in its canonical parenthesised form.
pub fn ast(file: &Path, out: &mut StyledOutput) -> anyhow::Result<()> {
    let source = read_source(file)?;
    let program = parse_source(&source, &file.display().to_string())?;
    out.plain(&program.to_string());
    Ok(())
}
