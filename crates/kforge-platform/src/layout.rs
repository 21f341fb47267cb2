//! Kernel artifact layout.
//!
//! Every path the stages read or write is derived here from the working
//! directory, the target triple, the kernel crate name and the build mode:
//!
//! ```text
//! <root>/
//!   platform/<name>/linker.ld           per-platform linker script (input)
//!   linker.ld                           staged linker script
//!   target/<triple>/<mode>/<kernel>     compiled ELF
//!   target/<triple>/<mode>/<kernel>.bin  stripped raw binary
//!   dump.txt, head.txt, nm.txt          diagnostic dumps
//! ```

use std::path::{Path, PathBuf};

use crate::mode::BuildMode;

pub const LINKER_SCRIPT: &str = "linker.ld";
pub const DISASSEMBLY: &str = "dump.txt";
pub const HEADERS: &str = "head.txt";
pub const SYMBOLS: &str = "nm.txt";

/// Paths for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelLayout {
    root: PathBuf,
    target: String,
    kernel: String,
    mode: BuildMode,
}

impl KernelLayout {
    pub fn new(
        root: impl Into<PathBuf>,
        target: impl Into<String>,
        kernel: impl Into<String>,
        mode: BuildMode,
    ) -> Self {
        Self {
            root: root.into(),
            target: target.into(),
            kernel: kernel.into(),
            mode,
        }
    }

    /// Working directory all commands run from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Resolve a configured path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    pub fn kernel_elf(&self) -> PathBuf {
        self.root
            .join("target")
            .join(&self.target)
            .join(self.mode.as_str())
            .join(&self.kernel)
    }

    /// The Kernel Binary: `<elf>.bin`.
    pub fn kernel_bin(&self) -> PathBuf {
        self.kernel_elf().with_file_name(format!("{}.bin", self.kernel))
    }

    pub fn platform_linker_script(&self, platform: &str) -> PathBuf {
        self.root.join("platform").join(platform).join(LINKER_SCRIPT)
    }

    pub fn linker_script(&self) -> PathBuf {
        self.root.join(LINKER_SCRIPT)
    }

    pub fn disassembly(&self) -> PathBuf {
        self.root.join(DISASSEMBLY)
    }

    pub fn headers(&self) -> PathBuf {
        self.root.join(HEADERS)
    }

    pub fn symbols(&self) -> PathBuf {
        self.root.join(SYMBOLS)
    }

    /// Files left in the working directory by pre-build and post-build.
    pub fn staged_files(&self) -> [PathBuf; 4] {
        [
            self.linker_script(),
            self.disassembly(),
            self.headers(),
            self.symbols(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(mode: BuildMode) -> KernelLayout {
        KernelLayout::new("/work", "riscv64gc-unknown-none-elf", "kernel", mode)
    }

    #[test]
    fn debug_paths() {
        let l = layout(BuildMode::Debug);
        assert_eq!(
            l.kernel_elf(),
            Path::new("/work/target/riscv64gc-unknown-none-elf/debug/kernel")
        );
        assert_eq!(
            l.kernel_bin(),
            Path::new("/work/target/riscv64gc-unknown-none-elf/debug/kernel.bin")
        );
    }

    #[test]
    fn release_changes_only_mode_segment() {
        let debug = layout(BuildMode::Debug);
        let release = layout(BuildMode::Release);
        assert_eq!(
            release.kernel_bin(),
            Path::new("/work/target/riscv64gc-unknown-none-elf/release/kernel.bin")
        );
        assert_eq!(debug.staged_files(), release.staged_files());
        assert_eq!(
            debug.platform_linker_script("qemu"),
            release.platform_linker_script("qemu")
        );
    }

    #[test]
    fn staged_files_live_in_root() {
        let l = layout(BuildMode::Debug);
        assert_eq!(l.platform_linker_script("k210"), Path::new("/work/platform/k210/linker.ld"));
        for file in l.staged_files() {
            assert_eq!(file.parent(), Some(Path::new("/work")));
        }
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let l = layout(BuildMode::Debug);
        assert_eq!(l.resolve(Path::new("fs.img")), Path::new("/work/fs.img"));
        assert_eq!(l.resolve(Path::new("/opt/sbi.bin")), Path::new("/opt/sbi.bin"));
    }
}
