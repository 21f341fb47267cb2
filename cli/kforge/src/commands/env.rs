//! `kforge --check-env`: make sure the cross toolchain is installed.

use anyhow::{Context, Result};
use kforge_toolchain::{ProcessRunner, Tool, ToolCommand, Toolset};

/// Check the compilation target and binutils, installing whatever is missing.
pub fn run(runner: &impl ProcessRunner, tools: &Toolset, target: &str) -> Result<()> {
    print!("{}", check(runner, tools, target)?);
    Ok(())
}

fn check(runner: &impl ProcessRunner, tools: &Toolset, target: &str) -> Result<String> {
    let mut report = String::from("=== kforge environment ===\n\n");

    let listing = runner
        .output(&ToolCommand::new("rustup").args(["target", "list", "--installed"]))
        .context("listing installed targets (is rustup installed?)")?;
    if ensure_target(runner, &listing, target)? {
        report.push_str(&format!("  target {target}: installed now\n"));
    } else {
        report.push_str(&format!("  target {target}: ok\n"));
    }

    let version = tools.command(Tool::Objdump)?.arg("--version");
    let present = runner.output(&version).is_ok();
    if ensure_binutils(runner, present)? {
        report.push_str("  binutils: installed now\n");
    } else {
        report.push_str(&format!("  binutils: ok ({})\n", version.program()));
    }
    Ok(report)
}

/// Whether `target` appears in `rustup target list --installed` output.
fn target_installed(listing: &str, target: &str) -> bool {
    listing.lines().any(|line| line.trim() == target)
}

/// Install `target` unless it is listed. Returns whether anything was installed.
fn ensure_target(runner: &impl ProcessRunner, listing: &str, target: &str) -> Result<bool> {
    if target_installed(listing, target) {
        return Ok(false);
    }
    log::info!("installing target {target}");
    runner.run_checked(&ToolCommand::new("rustup").args(["target", "add", target]))?;
    Ok(true)
}

/// Install llvm-tools and cargo-binutils unless the objdump wrapper is present.
fn ensure_binutils(runner: &impl ProcessRunner, present: bool) -> Result<bool> {
    if present {
        return Ok(false);
    }
    log::info!("installing llvm-tools-preview and cargo-binutils");
    runner.run_checked(
        &ToolCommand::new("rustup").args(["component", "add", "llvm-tools-preview"]),
    )?;
    runner.run_checked(&ToolCommand::new("cargo").args(["install", "cargo-binutils"]))?;
    Ok(true)
}
