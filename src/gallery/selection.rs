use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::constants::IMAGE_EXTENSIONS;
use crate::utils::{log_debug, log_warn, PixupError, Result};

/// Whether the file name carries one of the accepted image extensions
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Turn command-line inputs into the ordered upload batch.
///
/// Files are kept exactly as given, in order, even if they don't exist:
/// a bad path becomes a per-item failure later instead of aborting here.
/// Directories contribute their own image files (not recursive), sorted.
pub fn collect_image_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let found = images_in_dir(input);
            log_debug(format!("{} images in {}", found.len(), input.display()));
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }

    if paths.is_empty() {
        return Err(PixupError::InvalidInput(
            "no image files selected".to_string(),
        ));
    }
    Ok(paths)
}

fn images_in_dir(dir: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = WalkBuilder::new(dir)
        .standard_filters(false)
        .max_depth(Some(1))
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log_warn("📂", format!("Skipping unreadable entry in {}: {}", dir.display(), e));
                None
            }
        })
        .filter(|entry| entry.file_type().map_or(false, |t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| is_image_path(path))
        .collect();

    images.sort();
    images
}
