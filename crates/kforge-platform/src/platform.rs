//! The platform capability trait and the stage steps shared by backends.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kforge_toolchain::{ProcessRunner, Redirect, Tool, ToolCommand, ToolchainError, Toolset};

use crate::error::{PlatformError, Result};
use crate::layout::KernelLayout;
use crate::mode::BuildMode;

/// Everything a stage needs to run external tools for one invocation.
#[derive(Clone, Copy)]
pub struct StageContext<'a> {
    pub runner: &'a dyn ProcessRunner,
    pub layout: &'a KernelLayout,
    pub tools: &'a Toolset,
}

impl<'a> StageContext<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        layout: &'a KernelLayout,
        tools: &'a Toolset,
    ) -> Self {
        Self {
            runner,
            layout,
            tools,
        }
    }

    pub fn mode(&self) -> BuildMode {
        self.layout.mode()
    }

    /// Start a command for a configured tool, running from the working directory.
    pub fn tool(&self, tool: Tool) -> Result<ToolCommand> {
        Ok(self.tools.command(tool)?.current_dir(self.layout.root()))
    }

    /// Run a command; a non-zero exit is an error.
    pub fn run_checked(&self, command: &ToolCommand) -> Result<()> {
        Ok(self.runner.run_checked(command)?)
    }
}

impl fmt::Debug for StageContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageContext")
            .field("layout", self.layout)
            .field("tools", self.tools)
            .finish_non_exhaustive()
    }
}

/// A diagnostic dump that failed without stopping the pipeline.
#[derive(Debug)]
pub struct DiagnosticFailure {
    /// Which dump failed (e.g. "disassembly").
    pub step: &'static str,
    pub error: ToolchainError,
}

impl fmt::Display for DiagnosticFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dump failed: {}", self.step, self.error)
    }
}

/// Outcome of a successful post-build stage.
#[derive(Debug)]
pub struct PostBuildReport {
    /// The image consumed by `run`.
    pub image: PathBuf,
    /// Best-effort dumps that failed.
    pub diagnostics: Vec<DiagnosticFailure>,
}

impl PostBuildReport {
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            diagnostics: Vec::new(),
        }
    }

    /// True when every diagnostic dump succeeded.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// A target environment with its five lifecycle operations.
///
/// Every operation has a no-op default, so a backend only implements what it
/// needs. Object-safe so platforms can be stored in `Box<dyn Platform>`.
///
/// Marker bookkeeping (switch detection, marker removal on clean) is done by
/// the lifecycle engine around these calls, not by the backends.
pub trait Platform: fmt::Debug {
    /// Unique registry name.
    fn name(&self) -> &str;

    /// One-line description for platform listings.
    fn description(&self) -> &str {
        ""
    }

    /// The image `run` hands to the emulator or flasher.
    fn kernel_image(&self, layout: &KernelLayout) -> PathBuf {
        layout.kernel_bin()
    }

    /// Stage platform-specific inputs into the working directory.
    fn pre_build(&self, _ctx: &StageContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Compile the kernel.
    fn build(&self, _ctx: &StageContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Produce the kernel image and diagnostic dumps from the compiled ELF.
    ///
    /// An error means the image was not produced. Failed dumps are returned
    /// in the report instead.
    fn after_build(&self, ctx: &StageContext<'_>) -> Result<PostBuildReport> {
        Ok(PostBuildReport::new(self.kernel_image(ctx.layout)))
    }

    /// Remove everything this platform's build left behind. Must be idempotent.
    fn clean(&self, _ctx: &StageContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Boot or flash `image`; with `debug`, wait for a debugger to attach.
    fn run(&self, _ctx: &StageContext<'_>, _image: &Path, _debug: bool) -> Result<()> {
        Ok(())
    }
}

/// Copy `platform/<name>/linker.ld` into the working directory.
pub fn stage_linker_script(ctx: &StageContext<'_>, platform: &str) -> Result<()> {
    let source = ctx.layout.platform_linker_script(platform);
    let dest = ctx.layout.linker_script();
    fs::copy(&source, &dest).map_err(|e| PlatformError::io(&source, e))?;
    log::debug!("staged {} -> {}", source.display(), dest.display());
    Ok(())
}

/// `cargo build` with the mode flag and any platform-specific arguments.
pub fn cargo_build(ctx: &StageContext<'_>, extra: &[String]) -> Result<()> {
    let command = ctx
        .tool(Tool::Cargo)?
        .arg("build")
        .args(ctx.mode().cargo_args().iter().copied())
        .args(extra.iter().cloned());
    ctx.run_checked(&command)
}

/// Strip the ELF into the raw Kernel Binary. Load-bearing.
pub fn extract_kernel_binary(ctx: &StageContext<'_>) -> Result<()> {
    let command = ctx
        .tool(Tool::Objcopy)?
        .path_arg(&ctx.layout.kernel_elf())
        .args(["--strip-all", "-O", "binary"])
        .path_arg(&ctx.layout.kernel_bin());
    ctx.run_checked(&command)
}

/// Write the disassembly, section headers, symbols and segments of the ELF.
///
/// Each dump is independent; failures are collected, not propagated.
pub fn dump_diagnostics(ctx: &StageContext<'_>) -> Vec<DiagnosticFailure> {
    let elf = ctx.layout.kernel_elf();
    let steps: [(&'static str, Tool, &[&str], Redirect); 4] = [
        ("disassembly", Tool::Objdump, &["-S"], Redirect::Truncate(ctx.layout.disassembly())),
        ("section header", Tool::SectionDump, &["-h"], Redirect::Truncate(ctx.layout.headers())),
        ("symbol", Tool::Nm, &[], Redirect::Truncate(ctx.layout.symbols())),
        // appended after the section headers
        ("segment", Tool::Readelf, &["--segments"], Redirect::Append(ctx.layout.headers())),
    ];

    let mut failures = Vec::new();
    for (step, tool, flags, output) in steps {
        let result = ctx.tools.command(tool).and_then(|command| {
            let command = command
                .current_dir(ctx.layout.root())
                .args(flags.iter().copied())
                .path_arg(&elf)
                .redirect(output);
            ctx.runner.run_checked(&command)
        });
        if let Err(error) = result {
            failures.push(DiagnosticFailure { step, error });
        }
    }
    failures
}

/// `cargo clean` plus removal of the staged files and `extra`.
///
/// A failing `cargo clean` is logged and skipped; missing files are fine.
pub fn remove_build_outputs(ctx: &StageContext<'_>, extra: &[PathBuf]) -> Result<()> {
    let command = ctx.tool(Tool::Cargo)?.arg("clean");
    if let Err(e) = ctx.run_checked(&command) {
        log::warn!("{e}; continuing clean");
    }

    for path in ctx.layout.staged_files().iter().chain(extra) {
        if remove_if_exists(path)? {
            log::debug!("removed {}", path.display());
        }
    }
    Ok(())
}

/// Remove a file, returning whether it existed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PlatformError::io(path, e)),
    }
}
