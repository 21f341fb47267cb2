//! `kforge.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kforge_platform::{
    BuildMode, K210Settings, KernelLayout, PlatformRegistry, PlatformSettings, QemuSettings,
};
use kforge_toolchain::Toolset;
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "kforge.toml";

/// The top-level manifest. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KforgeManifest {
    pub project: ProjectConfig,
    /// Command prefixes for the external tools.
    pub tools: Toolset,
    pub qemu: QemuSettings,
    pub k210: K210Settings,
}

/// Project section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProjectConfig {
    /// Compilation target triple.
    pub target: String,
    /// Kernel crate (and ELF) name.
    pub kernel: String,
    /// Platform used when `-p` is not given.
    pub default_platform: Option<String>,
    /// File printed by `-v`.
    pub version_file: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            target: "riscv64gc-unknown-none-elf".to_string(),
            kernel: "kernel".to_string(),
            default_platform: None,
            version_file: PathBuf::from("version"),
        }
    }
}

impl KforgeManifest {
    /// Search upward from `start_dir` for a `kforge.toml` file, parse and return it
    /// along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: KforgeManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing kforge.toml")
    }

    /// The builtin platforms, configured from the `[qemu]` and `[k210]` sections.
    pub fn registry(&self) -> PlatformRegistry {
        PlatformRegistry::builtin(&PlatformSettings {
            qemu: self.qemu.clone(),
            k210: self.k210.clone(),
        })
    }

    pub fn layout(&self, project_dir: &Path, mode: BuildMode) -> KernelLayout {
        KernelLayout::new(project_dir, &self.project.target, &self.project.kernel, mode)
    }

    /// Platform to use when none was requested: the manifest's default, else
    /// the first registered platform.
    pub fn default_platform<'a>(&'a self, registry: &'a PlatformRegistry) -> Option<&'a str> {
        self.project
            .default_platform
            .as_deref()
            .or_else(|| registry.default_platform().map(|p| p.name()))
    }
}

/// Load the manifest from `cwd` upward, falling back to defaults rooted at `cwd`.
pub fn load_or_default(cwd: &Path) -> Result<(KforgeManifest, PathBuf)> {
    match KforgeManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((manifest, dir)),
        None => {
            log::debug!("no {MANIFEST_FILE} found, using defaults in {}", cwd.display());
            Ok((KforgeManifest::default(), cwd.to_path_buf()))
        }
    }
}
