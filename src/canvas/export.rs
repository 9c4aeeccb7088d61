use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use image::{ImageFormat, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_STEM: &str = "my-painting";
pub const EXPORT_SUBDIR: &str = "exports";

pub fn exe_relative_output_folder_from_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(EXPORT_SUBDIR))
}

/// Creates the export folder, defaulting to `exports/` next to the executable.
pub fn ensure_output_folder(configured: Option<&Path>) -> Result<PathBuf> {
    let output = match configured {
        Some(dir) => dir.to_path_buf(),
        None => {
            let exe_path = std::env::current_exe().context("resolve current executable")?;
            exe_relative_output_folder_from_path(&exe_path)?
        }
    };
    fs::create_dir_all(&output)
        .with_context(|| format!("create export folder {}", output.display()))?;
    Ok(output)
}

/// `my-painting_20260102_030405`
pub fn timestamped_stem(base: &str, now: DateTime<Local>) -> String {
    format!("{}_{}", base, now.format("%Y%m%d_%H%M%S"))
}

pub fn build_filename(stem: &str) -> String {
    format!("{stem}.png")
}

/// Writes `<dir>/<stem>.png`, replacing an existing file of the same name.
pub fn export_png(image: &RgbaImage, dir: &Path, stem: &str) -> Result<PathBuf> {
    if stem.trim().is_empty() {
        return Err(anyhow!("export file name is empty"));
    }
    fs::create_dir_all(dir).with_context(|| format!("create export folder {}", dir.display()))?;
    let path = dir.join(build_filename(stem));
    image
        .save_with_format(&path, ImageFormat::Png)
        .with_context(|| format!("write png {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "canvas exported"
    );
    Ok(path)
}
