/// Source directory enumeration
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, SessionError};
use crate::validation::MetadataDecoder;

/// List the regular files directly inside `dir`, sorted by name
///
/// Subdirectories and symlinks are skipped. Nothing is filtered by extension:
/// files that are not images are weeded out lazily during navigation.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(SessionError::Scan {
                    path: dir.to_path_buf(),
                    source: e,
                })
            }
            Err(e) => {
                warn!("⚠️  Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            debug!("Not a regular file: {}", entry.path().display());
            continue;
        }

        files.push(entry.into_path());
    }

    debug!("🔍 Found {} files in {}", files.len(), dir.display());
    Ok(files)
}

/// Files whose pixel count is below `megapixels`
///
/// Files the decoder cannot read are left out.
pub fn smaller_than<D: MetadataDecoder>(
    files: &[PathBuf],
    decoder: &mut D,
    megapixels: f64,
) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|path| match decoder.decode_metadata(path) {
            Ok(dims) => dims.megapixels() < megapixels,
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                false
            }
        })
        .cloned()
        .collect()
}
