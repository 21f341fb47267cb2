//! `kforge -v`: print the kernel's version file.

use std::path::Path;

use anyhow::{Context, Result};

pub fn run(version_file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(version_file)
        .with_context(|| format!("reading {}", version_file.display()))?;
    println!("{}", text.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn missing_version_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = super::run(&dir.path().join("version")).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn prints_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version");
        std::fs::write(&path, "v0.3.1\n").unwrap();
        super::run(&path).unwrap();
    }
}
