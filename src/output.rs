//! Writing generated artifacts to disk

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::codegen::Artifact;

/// Write every artifact into `dir`, creating it if needed.
/// Returns the written paths in order.
pub fn write_artifacts<'a, I>(dir: &Path, artifacts: I) -> std::io::Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = &'a Artifact>,
{
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        fs::write(&path, artifact.render())?;
        info!("    → {}", path.display());
        written.push(path);
    }

    Ok(written)
}
