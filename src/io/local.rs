use super::Source;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Local file input
pub struct LocalFileSource {
    path: PathBuf,
    entry_name: String,
    unix_mode: Option<u32>,
}

impl LocalFileSource {
    pub fn new(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("cannot stat {}", path.display()))?;
        if !metadata.is_file() {
            bail!("{} is not a regular file", path.display());
        }

        let entry_name = entry_name_for(path);
        if entry_name.is_empty() {
            bail!("{} has no usable entry name", path.display());
        }

        #[cfg(unix)]
        let unix_mode = {
            use std::os::unix::fs::PermissionsExt;
            Some(metadata.permissions().mode())
        };

        #[cfg(not(unix))]
        let unix_mode = None;

        Ok(Self {
            path: path.to_path_buf(),
            entry_name,
            unix_mode,
        })
    }
}

/// Archive names are relative and `/`-separated: root, prefix, `.` and `..`
/// components are dropped.
fn entry_name_for(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl Source for LocalFileSource {
    async fn read_all(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("cannot read {}", self.path.display()))
    }

    fn entry_name(&self) -> &str {
        &self.entry_name
    }

    fn unix_mode(&self) -> Option<u32> {
        self.unix_mode
    }
}
