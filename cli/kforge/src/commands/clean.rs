//! `kforge -c`: remove a platform's build outputs.

use anyhow::Result;
use kforge_lifecycle::Engine;
use kforge_platform::MarkerStore;
use kforge_toolchain::ProcessRunner;

pub fn run<R: ProcessRunner, S: MarkerStore>(
    engine: &Engine<R, S>,
    platform: &str,
) -> Result<()> {
    engine.clean(platform)?;
    println!("Cleaned {platform}");
    Ok(())
}
