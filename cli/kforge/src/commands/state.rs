//! `kforge --show-state`: list build markers in the working directory.

use anyhow::Result;
use kforge_lifecycle::Engine;
use kforge_platform::{MarkerRecord, MarkerStore};
use kforge_toolchain::ProcessRunner;

pub fn run<R: ProcessRunner, S: MarkerStore>(engine: &Engine<R, S>) -> Result<()> {
    print!("{}", render(&engine.markers()?));
    Ok(())
}

fn render(markers: &[MarkerRecord]) -> String {
    if markers.is_empty() {
        return "No platform has been built here\n".to_string();
    }
    let mut out = String::new();
    for record in markers {
        let mode = record.mode.map_or("unknown mode", |m| m.as_str());
        out.push_str(&format!("last built: {} ({mode})\n", record.platform));
    }
    if markers.len() > 1 {
        out.push_str("warning: more than one marker present, the next switch cleans one of them\n");
    }
    out
}
