//! QEMU `virt` machine backend.

use std::path::{Path, PathBuf};

use kforge_toolchain::ToolCommand;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::KernelLayout;
use crate::platform::{self, Platform, PostBuildReport, StageContext};

/// Emulator settings (`[qemu]` in `kforge.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct QemuSettings {
    pub binary: String,
    pub machine: String,
    /// SBI firmware passed to `-bios`.
    pub bios: PathBuf,
    /// Physical address the kernel binary is loaded at.
    pub load_address: String,
    /// Raw disk image attached as a virtio block device, if any.
    pub fs_image: Option<PathBuf>,
}

impl Default for QemuSettings {
    fn default() -> Self {
        Self {
            binary: "qemu-system-riscv64".to_string(),
            machine: "virt".to_string(),
            bios: PathBuf::from("../bootloader/rustsbi-qemu.bin"),
            load_address: "0x80200000".to_string(),
            fs_image: Some(PathBuf::from("fs.img")),
        }
    }
}

/// The emulated RISC-V virtual machine.
#[derive(Debug, Clone, Default)]
pub struct Qemu {
    settings: QemuSettings,
}

impl Qemu {
    pub const NAME: &'static str = "qemu";

    pub fn new(settings: QemuSettings) -> Self {
        Self { settings }
    }

    /// The emulator command line for `image`; `-S -s` halts the CPU and
    /// opens a gdb stub on :1234.
    pub fn command_line(&self, layout: &KernelLayout, image: &Path, debug: bool) -> ToolCommand {
        let s = &self.settings;
        let mut command = ToolCommand::new(&s.binary)
            .current_dir(layout.root())
            .args(["-machine", s.machine.as_str(), "-nographic", "-bios"])
            .path_arg(&s.bios)
            .arg("-device")
            .arg(format!("loader,addr={},file={}", s.load_address, image.display()));
        if let Some(fs_image) = &s.fs_image {
            command = command
                .arg("-drive")
                .arg(format!("file={},if=none,format=raw,id=x0", fs_image.display()))
                .args(["-device", "virtio-blk-device,drive=x0,bus=virtio-mmio-bus.0"]);
        }
        if debug {
            command = command.args(["-S", "-s"]);
        }
        command
    }
}

impl Platform for Qemu {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "QEMU riscv64 virt machine (emulated)"
    }

    fn pre_build(&self, ctx: &StageContext<'_>) -> Result<()> {
        platform::stage_linker_script(ctx, Self::NAME)
    }

    fn build(&self, ctx: &StageContext<'_>) -> Result<()> {
        log::info!("Build platform: {}", Self::NAME);
        platform::cargo_build(ctx, &[])
    }

    fn after_build(&self, ctx: &StageContext<'_>) -> Result<PostBuildReport> {
        platform::extract_kernel_binary(ctx)?;
        Ok(PostBuildReport {
            image: self.kernel_image(ctx.layout),
            diagnostics: platform::dump_diagnostics(ctx),
        })
    }

    fn clean(&self, ctx: &StageContext<'_>) -> Result<()> {
        platform::remove_build_outputs(ctx, &[])
    }

    fn run(&self, ctx: &StageContext<'_>, image: &Path, debug: bool) -> Result<()> {
        ctx.run_checked(&self.command_line(ctx.layout, image, debug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::BuildMode;
    use kforge_toolchain::{RecordingRunner, Toolset};

    fn layout(root: &Path) -> KernelLayout {
        KernelLayout::new(root, "riscv64gc-unknown-none-elf", "kernel", BuildMode::Debug)
    }

    #[test]
    fn command_line_matches_virt_machine() {
        let layout = layout(Path::new("/work"));
        let qemu = Qemu::default();
        let cmd = qemu.command_line(&layout, &layout.kernel_bin(), false);
        assert_eq!(cmd.program(), "qemu-system-riscv64");
        assert_eq!(
            cmd.arguments(),
            [
                "-machine",
                "virt",
                "-nographic",
                "-bios",
                "../bootloader/rustsbi-qemu.bin",
                "-device",
                "loader,addr=0x80200000,file=/work/target/riscv64gc-unknown-none-elf/debug/kernel.bin",
                "-drive",
                "file=fs.img,if=none,format=raw,id=x0",
                "-device",
                "virtio-blk-device,drive=x0,bus=virtio-mmio-bus.0",
            ]
        );
    }

    #[test]
    fn debug_run_waits_for_gdb() {
        let layout = layout(Path::new("/work"));
        let cmd = Qemu::default().command_line(&layout, &layout.kernel_bin(), true);
        assert!(cmd.arguments().ends_with(&["-S".to_string(), "-s".to_string()]));
    }

    #[test]
    fn no_disk_without_fs_image() {
        let layout = layout(Path::new("/work"));
        let qemu = Qemu::new(QemuSettings {
            fs_image: None,
            ..QemuSettings::default()
        });
        let cmd = qemu.command_line(&layout, &layout.kernel_bin(), false);
        assert!(!cmd.arguments().iter().any(|a| a == "-drive"));
    }

    #[test]
    fn after_build_stops_when_extraction_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let tools = Toolset::default();
        let runner = RecordingRunner::new().failing_program("rust-objcopy");
        let ctx = StageContext::new(&runner, &layout, &tools);

        assert!(Qemu::default().after_build(&ctx).is_err());
        assert_eq!(runner.programs(), ["rust-objcopy"]);
    }

    #[test]
    fn after_build_reports_failed_dumps() {
        let dir = tempfile::tempdir().unwrap();
        let layout = layout(dir.path());
        let tools = Toolset::default();
        let runner = RecordingRunner::new().failing_program("rust-nm");
        let ctx = StageContext::new(&runner, &layout, &tools);

        let report = Qemu::default().after_build(&ctx).unwrap();
        assert_eq!(report.image, layout.kernel_bin());
        assert_eq!(report.diagnostics.len(), 1);
        assert!(runner.ran("readelf"));
    }
}
