use std::path::{Path, PathBuf};

use anyhow::Context;

/// Directory next to `executable` that holds `{public_dir}/index.html`, if any
pub fn asset_root(executable: &Path, public_dir: &str) -> Option<PathBuf> {
    let dir = executable.parent()?;
    dir.join(public_dir)
        .join("index.html")
        .is_file()
        .then(|| dir.to_path_buf())
}

/// Moves the working directory next to the executable when the assets live
/// there, so relative paths in the config resolve the same way wherever the
/// binary is started from.
pub fn enter_asset_root(public_dir: &str) -> Result<(), anyhow::Error> {
    let executable = std::env::current_exe().context("failed to locate executable")?;

    if let Some(root) = asset_root(&executable, public_dir) {
        std::env::set_current_dir(&root)
            .with_context(|| format!("failed to enter {}", root.display()))?;
        info!("serving assets from {}", root.display());
    }

    Ok(())
}
