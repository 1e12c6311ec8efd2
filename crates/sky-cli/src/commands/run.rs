//! `sky run`: run a file, or the project entry from sky.toml.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use sky_runtime::{Manifest, Runtime, RuntimeOptions};

pub struct RunArgs {
    pub file: Option<PathBuf>,
    pub trace: bool,
    pub max_frames: Option<usize>,
    pub no_check: bool,
}

pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let root = Path::new(".");
    let manifest = Manifest::find(root).context("failed to load sky.toml")?;

    let mut options = manifest
        .as_ref()
        .map(RuntimeOptions::from_manifest)
        .unwrap_or_default();
    apply_flags(&mut options, &args);

    let path = match (&args.file, &manifest) {
        (Some(file), _) => file.clone(),
        (None, Some(manifest)) => manifest
            .entry_path(root)
            .ok_or_else(|| anyhow!("sky.toml has no project.entry; pass a file to run"))?,
        (None, None) => {
            return Err(anyhow!(
                "no file given and no sky.toml in the current directory"
            ))
        }
    };

    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    Runtime::new(options).run_file(&path)?;
    Ok(())
}

/// Command-line flags override manifest values.
fn apply_flags(options: &mut RuntimeOptions, args: &RunArgs) {
    if args.trace {
        options.vm.trace = true;
    }
    if let Some(max_frames) = args.max_frames {
        options.vm.max_frames = max_frames;
    }
    if args.no_check {
        options.check = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_options() {
        let mut options = RuntimeOptions::default();
        apply_flags(
            &mut options,
            &RunArgs {
                file: None,
                trace: true,
                max_frames: Some(16),
                no_check: true,
            },
        );
        assert!(options.vm.trace);
        assert_eq!(options.vm.max_frames, 16);
        assert!(!options.check);
    }

    #[test]
    fn test_absent_flags_keep_options() {
        let mut options = RuntimeOptions::default();
        apply_flags(
            &mut options,
            &RunArgs {
                file: None,
                trace: false,
                max_frames: None,
                no_check: false,
            },
        );
        assert_eq!(options, RuntimeOptions::default());
    }
}
