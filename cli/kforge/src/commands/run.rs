//! `kforge -r` / `kforge -d`: build, then boot or flash the kernel.

use anyhow::Result;
use kforge_lifecycle::Engine;
use kforge_platform::MarkerStore;
use kforge_toolchain::ProcessRunner;

/// Build everything and start the kernel on `platform`.
///
/// With `debug`, the emulator halts at the first instruction and waits for
/// a debugger.
pub fn run<R: ProcessRunner, S: MarkerStore>(
    engine: &Engine<R, S>,
    platform: &str,
    debug: bool,
) -> Result<()> {
    engine.run(platform, debug)?;
    Ok(())
}
