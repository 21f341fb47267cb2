//! `kforge -b`: build and post-process the kernel image.

use anyhow::Result;
use kforge_lifecycle::Engine;
use kforge_platform::MarkerStore;
use kforge_toolchain::ProcessRunner;

/// Build the kernel for `platform` and produce its image.
pub fn run<R: ProcessRunner, S: MarkerStore>(
    engine: &Engine<R, S>,
    platform: &str,
) -> Result<()> {
    let report = engine.after_build(platform)?;
    if report.is_clean() {
        println!(
            "Built {platform} ({}): {}",
            engine.layout().mode(),
            report.image.display()
        );
    } else {
        println!(
            "Built {platform} ({}): {} ({} diagnostic dump(s) failed)",
            engine.layout().mode(),
            report.image.display(),
            report.diagnostics.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use kforge_lifecycle::LifecycleError;
    use kforge_platform::{
        BuildMode, FsMarkerStore, KernelLayout, PlatformRegistry, PlatformSettings, StateTracker,
    };
    use kforge_toolchain::{RecordingRunner, Toolset};

    use super::*;

    fn engine(
        root: &std::path::Path,
        runner: RecordingRunner,
    ) -> Engine<RecordingRunner, FsMarkerStore> {
        Engine::new(
            PlatformRegistry::builtin(&PlatformSettings::default()),
            StateTracker::new(FsMarkerStore::new(root)),
            runner,
            KernelLayout::new(root, "riscv64gc-unknown-none-elf", "kernel", BuildMode::Debug),
            Toolset::default(),
        )
    }

    #[test]
    fn build_marks_platform() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("platform/qemu");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("linker.ld"), "").unwrap();

        let engine = engine(dir.path(), RecordingRunner::new());
        run(&engine, "qemu").unwrap();
        assert!(dir.path().join("last-qemu").is_file());
        assert!(engine.runner().ran("rust-objcopy"));
    }

    #[test]
    fn build_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("platform/qemu");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join("linker.ld"), "").unwrap();

        let runner = RecordingRunner::new().failing_program("cargo");
        let err = run(&engine(dir.path(), runner), "qemu").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::BuildFailure { .. })
        ));
    }
}
