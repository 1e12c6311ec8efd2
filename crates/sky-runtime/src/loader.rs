//! Bytecode loading and writing.

use std::path::Path;

use sky_engine::compiler::{verify_bytecode, Bytecode};

use crate::error::RuntimeError;

/// Extension of serialized bytecode files
pub const BYTECODE_EXTENSION: &str = "skyc";

/// Whether `path` names a bytecode file rather than source.
pub fn is_bytecode_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(BYTECODE_EXTENSION)
}

/// Load and verify a .skyc file from disk.
pub fn load_bytecode_file(path: &Path) -> Result<Bytecode, RuntimeError> {
    let json = std::fs::read_to_string(path)?;
    load_bytecode_str(&json)
}

/// Decode and verify JSON bytecode.
pub fn load_bytecode_str(json: &str) -> Result<Bytecode, RuntimeError> {
    let bytecode =
        Bytecode::from_json(json).map_err(|e| RuntimeError::Bytecode(e.to_string()))?;
    verify_bytecode(&bytecode).map_err(|e| RuntimeError::Bytecode(e.to_string()))?;
    Ok(bytecode)
}

/// Write bytecode as pretty-printed JSON.
pub fn write_bytecode_file(path: &Path, bytecode: &Bytecode) -> Result<(), RuntimeError> {
    let json = bytecode
        .to_json()
        .map_err(|e| RuntimeError::Bytecode(e.to_string()))?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile_source;

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.skyc");
        let bytecode = compile_source("let x = 1 + 2\n", "prog.sky").unwrap();

        write_bytecode_file(&path, &bytecode).unwrap();
        assert!(is_bytecode_file(&path));
        assert_eq!(load_bytecode_file(&path).unwrap(), bytecode);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = load_bytecode_str("{ not json").unwrap_err();
        assert!(matches!(err, RuntimeError::Bytecode(_)));
    }

    #[test]
    fn test_rejects_unverifiable_bytecode() {
        let mut bytecode = compile_source("let x = 1\n", "prog.sky").unwrap();
        bytecode.version += 1;
        let json = bytecode.to_json().unwrap();
        let err = load_bytecode_str(&json).unwrap_err();
        assert!(err.to_string().starts_with("Bytecode error: unsupported bytecode version"));
    }
}
