//! Kendryte K210 development board backend.
//!
//! The flashable image is the SBI bootloader with the kernel binary written
//! 128 KiB into it, flashed over the board's USB serial port with `kflash.py`.

use std::fs;
use std::path::{Path, PathBuf};

use kforge_toolchain::ToolCommand;
use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};
use crate::layout::KernelLayout;
use crate::platform::{self, Platform, PostBuildReport, StageContext};

/// Board settings (`[k210]` in `kforge.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct K210Settings {
    /// SBI bootloader the image is built on.
    pub bootloader: PathBuf,
    /// Flashable image, relative to the working directory.
    pub image: PathBuf,
    pub serial_port: String,
    pub baud_rate: u32,
    pub python: String,
    pub flasher: PathBuf,
    /// Cargo features enabled instead of the defaults.
    pub features: Vec<String>,
    /// Run `sudo chmod 777` on the serial port before flashing.
    pub grant_port_access: bool,
}

impl Default for K210Settings {
    fn default() -> Self {
        Self {
            bootloader: PathBuf::from("../bootloader/rustsbi-k210.bin"),
            image: PathBuf::from("os.bin"),
            serial_port: "/dev/ttyUSB0".to_string(),
            baud_rate: 1_500_000,
            python: "python3".to_string(),
            flasher: PathBuf::from("kflash.py"),
            features: vec!["k210".to_string(), "debug".to_string()],
            grant_port_access: true,
        }
    }
}

/// The physical K210 board.
#[derive(Debug, Clone, Default)]
pub struct K210 {
    settings: K210Settings,
}

impl K210 {
    pub const NAME: &'static str = "k210";

    pub fn new(settings: K210Settings) -> Self {
        Self { settings }
    }

    fn cargo_args(&self) -> Vec<String> {
        vec![
            "--no-default-features".to_string(),
            "--features".to_string(),
            self.settings.features.join(","),
        ]
    }

    /// Write the kernel binary into the image after the bootloader.
    fn payload_command(&self, layout: &KernelLayout) -> ToolCommand {
        ToolCommand::new("dd")
            .current_dir(layout.root())
            .arg(format!("if={}", layout.kernel_bin().display()))
            .arg(format!("of={}", self.kernel_image(layout).display()))
            .args(["bs=128k", "seek=1"])
    }

    /// Flasher command lines, in order.
    pub fn flash_commands(&self, layout: &KernelLayout, image: &Path) -> Vec<ToolCommand> {
        let s = &self.settings;
        let mut commands = Vec::new();
        if s.grant_port_access {
            commands.push(
                ToolCommand::new("sudo")
                    .current_dir(layout.root())
                    .args(["chmod", "777", s.serial_port.as_str()]),
            );
        }
        commands.push(
            ToolCommand::new(&s.python)
                .current_dir(layout.root())
                .path_arg(&s.flasher)
                .args(["-p", s.serial_port.as_str()])
                .arg("-b")
                .arg(s.baud_rate.to_string())
                .arg("-t")
                .path_arg(image),
        );
        commands
    }
}

impl Platform for K210 {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Kendryte K210 board (flashed over serial)"
    }

    fn kernel_image(&self, layout: &KernelLayout) -> PathBuf {
        layout.resolve(&self.settings.image)
    }

    fn pre_build(&self, ctx: &StageContext<'_>) -> Result<()> {
        platform::stage_linker_script(ctx, Self::NAME)
    }

    fn build(&self, ctx: &StageContext<'_>) -> Result<()> {
        log::info!("Build platform: {}", Self::NAME);
        platform::cargo_build(ctx, &self.cargo_args())
    }

    fn after_build(&self, ctx: &StageContext<'_>) -> Result<PostBuildReport> {
        let image = self.kernel_image(ctx.layout);
        let bootloader = ctx.layout.resolve(&self.settings.bootloader);
        fs::copy(&bootloader, &image).map_err(|e| PlatformError::io(&bootloader, e))?;
        platform::extract_kernel_binary(ctx)?;
        ctx.run_checked(&self.payload_command(ctx.layout))?;

        Ok(PostBuildReport {
            image,
            diagnostics: platform::dump_diagnostics(ctx),
        })
    }

    fn clean(&self, ctx: &StageContext<'_>) -> Result<()> {
        platform::remove_build_outputs(ctx, &[self.kernel_image(ctx.layout)])
    }

    fn run(&self, ctx: &StageContext<'_>, image: &Path, debug: bool) -> Result<()> {
        if debug {
            log::warn!("kflash cannot wait for a debugger; flashing {} normally", Self::NAME);
        }
        for command in self.flash_commands(ctx.layout, image) {
            ctx.run_checked(&command)?;
        }
        Ok(())
    }
}
