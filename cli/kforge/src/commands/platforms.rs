//! `kforge --show-platforms`: list registered platforms.

use anyhow::Result;
use kforge_platform::PlatformRegistry;

/// Print every registered platform, marking the one in use.
pub fn list(registry: &PlatformRegistry, selected: &str) -> Result<()> {
    print!("{}", render(registry, selected));
    Ok(())
}

fn render(registry: &PlatformRegistry, selected: &str) -> String {
    let mut out = String::from("Registered platforms:\n");
    for platform in registry.list() {
        let marker = if platform.name() == selected { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<10} {}\n",
            platform.name(),
            platform.description()
        ));
    }
    out
}
