//! kforge: build, package and boot a RISC-V teaching kernel.

mod commands;
mod manifest;

use std::process;

use anyhow::Context;
use clap::{Args, Parser};
use kforge_lifecycle::{Engine, LifecycleError};
use kforge_platform::{BuildMode, FsMarkerStore, StateTracker};
use kforge_toolchain::SystemRunner;

#[derive(Parser)]
#[command(name = "kforge", about = "Build and boot the kernel on QEMU or the K210 board")]
struct Cli {
    /// Target platform (default: `default-platform` in kforge.toml, else the first registered)
    #[arg(short, long)]
    platform: Option<String>,
    /// Build with the release profile
    #[arg(long)]
    release: bool,
    /// Log every external command before it runs
    #[arg(long)]
    verbose: bool,
    #[command(flatten)]
    action: Action,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Action {
    /// Build the kernel and its image
    #[arg(short, long)]
    build: bool,
    /// Build, then boot or flash the kernel
    #[arg(short, long)]
    run: bool,
    /// Remove the platform's build outputs
    #[arg(short, long)]
    clean: bool,
    /// Like --run, halted and waiting for a debugger
    #[arg(short, long)]
    debug: bool,
    /// Print the kernel version file
    #[arg(short, long)]
    version: bool,
    /// List registered platforms
    #[arg(long)]
    show_platforms: bool,
    /// Build-dependency graph (not implemented)
    #[arg(long)]
    graph: bool,
    /// List build markers in the working directory
    #[arg(long)]
    show_state: bool,
    /// Check the cross toolchain and install what is missing
    #[arg(long)]
    check_env: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(exit_code(&e));
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// 255 when the platform is unknown or there was nothing to boot, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<LifecycleError>() {
        Some(e) if e.is_unknown_platform() || e.is_refused_run() => 255,
        _ => 1,
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (manifest, project_dir) = manifest::load_or_default(&cwd)?;
    let mode = BuildMode::from_release_flag(cli.release);

    let engine = Engine::new(
        manifest.registry(),
        StateTracker::new(FsMarkerStore::new(&project_dir)),
        SystemRunner,
        manifest.layout(&project_dir, mode),
        manifest.tools.clone(),
    );

    let platform = match cli.platform {
        Some(name) => name,
        None => manifest
            .default_platform(engine.registry())
            .context("no platforms registered")?
            .to_string(),
    };
    engine.platform(&platform)?;

    let action = cli.action;
    if action.build {
        commands::build::run(&engine, &platform)
    } else if action.run {
        commands::run::run(&engine, &platform, false)
    } else if action.debug {
        commands::run::run(&engine, &platform, true)
    } else if action.clean {
        commands::clean::run(&engine, &platform)
    } else if action.version {
        commands::version::run(&project_dir.join(&manifest.project.version_file))
    } else if action.show_platforms {
        commands::platforms::list(engine.registry(), &platform)
    } else if action.show_state {
        commands::state::run(&engine)
    } else if action.check_env {
        commands::env::run(engine.runner(), &manifest.tools, &manifest.project.target)
    } else {
        log::warn!("--graph is reserved and does nothing yet");
        Ok(())
    }
}
