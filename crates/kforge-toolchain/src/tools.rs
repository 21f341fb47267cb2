//! Configurable command prefixes for the binutils-style tools.
//!
//! The defaults target RISC-V through the `cargo-binutils` wrappers, except
//! for the section-header dump, which uses the host `objdump`.

use serde::{Deserialize, Serialize};

use crate::command::ToolCommand;
use crate::error::{Result, ToolchainError};

/// The external tools invoked by the build stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Cargo,
    Objcopy,
    Objdump,
    SectionDump,
    Nm,
    Readelf,
}

impl Tool {
    /// Configuration key of this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Cargo => "cargo",
            Tool::Objcopy => "objcopy",
            Tool::Objdump => "objdump",
            Tool::SectionDump => "section-dump",
            Tool::Nm => "nm",
            Tool::Readelf => "readelf",
        }
    }
}

/// Command prefixes for each [`Tool`]: program followed by leading arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Toolset {
    pub cargo: Vec<String>,
    pub objcopy: Vec<String>,
    pub objdump: Vec<String>,
    pub section_dump: Vec<String>,
    pub nm: Vec<String>,
    pub readelf: Vec<String>,
}

impl Default for Toolset {
    fn default() -> Self {
        Self {
            cargo: prefix(&["cargo"]),
            objcopy: prefix(&["rust-objcopy", "--binary-architecture=riscv64"]),
            objdump: prefix(&["rust-objdump", "--arch-name=riscv64"]),
            section_dump: prefix(&["objdump"]),
            nm: prefix(&["rust-nm"]),
            readelf: prefix(&["readelf"]),
        }
    }
}

fn prefix(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl Toolset {
    /// The configured prefix for `tool`.
    pub fn prefix(&self, tool: Tool) -> &[String] {
        match tool {
            Tool::Cargo => &self.cargo,
            Tool::Objcopy => &self.objcopy,
            Tool::Objdump => &self.objdump,
            Tool::SectionDump => &self.section_dump,
            Tool::Nm => &self.nm,
            Tool::Readelf => &self.readelf,
        }
    }

    /// Start a command line for `tool`.
    pub fn command(&self, tool: Tool) -> Result<ToolCommand> {
        ToolCommand::from_prefix(self.prefix(tool)).ok_or_else(|| ToolchainError::EmptyTool {
            tool: tool.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_riscv() {
        let tools = Toolset::default();
        let objcopy = tools.command(Tool::Objcopy).unwrap();
        assert_eq!(objcopy.program(), "rust-objcopy");
        assert_eq!(objcopy.arguments(), ["--binary-architecture=riscv64"]);
        assert_eq!(tools.command(Tool::SectionDump).unwrap().program(), "objdump");
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let tools = Toolset {
            nm: Vec::new(),
            ..Toolset::default()
        };
        let err = tools.command(Tool::Nm).unwrap_err();
        assert!(matches!(err, ToolchainError::EmptyTool { ref tool } if tool == "nm"));
    }
}
