//! Sky Runtime
//!
//! Ties the engine's stages into a pipeline: source or `.skyc` bytecode in,
//! a finished VM out. Also reads the `sky.toml` project manifest.

pub mod compile;
pub mod error;
pub mod loader;
pub mod manifest;

use std::path::Path;

use sky_engine::compiler::Bytecode;
use sky_engine::vm::{Vm, VmOptions};

pub use compile::{check_source, compile_source, compile_source_with_options, parse_source, CheckDiagnostics};
pub use error::RuntimeError;
pub use loader::{is_bytecode_file, load_bytecode_file, write_bytecode_file, BYTECODE_EXTENSION};
pub use manifest::{Manifest, ManifestError, MANIFEST_FILE};

/// Settings for a whole compile-and-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub vm: VmOptions,
    /// Run the semantic checker before compiling source
    pub check: bool,
    /// Verify compiled bytecode
    pub verify: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            vm: VmOptions::default(),
            check: true,
            verify: true,
        }
    }
}

impl RuntimeOptions {
    /// Options taken from a project manifest; absent fields keep defaults.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let defaults = Self::default();
        Self {
            vm: VmOptions {
                max_frames: manifest.vm.max_frames.unwrap_or(defaults.vm.max_frames),
                trace: manifest.vm.trace,
            },
            check: manifest.check.enabled,
            verify: defaults.verify,
        }
    }
}

/// Loads and runs Sky programs.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    options: RuntimeOptions,
}

impl Runtime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Compile a `.sky` file, or load a `.skyc` file.
    pub fn load(&self, path: &Path) -> Result<Bytecode, RuntimeError> {
        if is_bytecode_file(path) {
            return load_bytecode_file(path);
        }
        let source = std::fs::read_to_string(path)?;
        compile_source_with_options(&source, &path.display().to_string(), &self.options)
    }

    /// A VM configured with these options, printing to stdout.
    pub fn vm(&self) -> Vm {
        Vm::new(self.options.vm)
    }

    /// Load and run a program file. Returns the VM for inspection.
    pub fn run_file(&self, path: &Path) -> Result<Vm, RuntimeError> {
        let bytecode = self.load(path)?;
        let mut vm = self.vm();
        self.execute(&bytecode, &mut vm)?;
        Ok(vm)
    }

    /// Compile and run source text.
    pub fn run_source(&self, source: &str, file: &str) -> Result<Vm, RuntimeError> {
        let bytecode = compile_source_with_options(source, file, &self.options)?;
        let mut vm = self.vm();
        self.execute(&bytecode, &mut vm)?;
        Ok(vm)
    }

    /// Run already compiled bytecode on `vm`.
    pub fn execute(&self, bytecode: &Bytecode, vm: &mut Vm) -> Result<(), RuntimeError> {
        vm.run(bytecode)?;
        Ok(())
    }
}
