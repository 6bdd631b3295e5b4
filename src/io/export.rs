/// Crop export
///
/// Saves the selected region of an image into the destination directory under
/// the original filename, optionally copying the untouched original into an
/// archive directory first. Undo deletes the saved crop (and its archived
/// original) again.
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CollaboratorError;
use crate::geometry::Rect;

/// Everything needed to write one crop
#[derive(Debug, Clone, PartialEq)]
pub struct CropRequest {
    /// Image to crop
    pub source: PathBuf,
    /// Name the crop is saved under
    pub filename: String,
    /// Region to keep, in image pixels
    pub selection: Rect,
}

/// Writes and deletes crops
pub trait CropStore {
    /// Save the crop, returning the written path
    fn crop_and_save(&self, request: &CropRequest) -> Result<PathBuf, CollaboratorError>;

    /// Delete a previously saved crop, returning the deleted path
    fn delete_saved(&self, filename: &str) -> Result<PathBuf, CollaboratorError>;
}

/// Filesystem-backed crop store
#[derive(Debug, Clone)]
pub struct Exporter {
    destination: PathBuf,
    archive: Option<PathBuf>,
}

impl Exporter {
    pub fn new(destination: PathBuf, archive: Option<PathBuf>) -> Self {
        Self {
            destination,
            archive,
        }
    }

    /// Copy `source` into the archive, returning the copy's path
    fn archive_original(
        &self,
        source: &Path,
        filename: &str,
    ) -> Result<Option<PathBuf>, CollaboratorError> {
        let Some(archive) = &self.archive else {
            return Ok(None);
        };

        let target = archive.join(filename);
        fs::copy(source, &target).map_err(|e| CollaboratorError::Io {
            path: target.clone(),
            source: e,
        })?;
        info!("📁 Archived original: {}", target.display());
        Ok(Some(target))
    }
}

impl CropStore for Exporter {
    fn crop_and_save(&self, request: &CropRequest) -> Result<PathBuf, CollaboratorError> {
        if !request.source.exists() {
            return Err(CollaboratorError::NotFound(request.source.clone()));
        }

        let img = image::open(&request.source).map_err(|e| CollaboratorError::Image {
            path: request.source.clone(),
            source: e,
        })?;

        let rect = request.selection;
        let cropped = img.crop_imm(
            rect.x.max(0) as u32,
            rect.y.max(0) as u32,
            rect.width.max(1) as u32,
            rect.height.max(1) as u32,
        );

        let archived = self.archive_original(&request.source, &request.filename)?;

        let target = self.destination.join(&request.filename);
        if let Err(e) = cropped.save(&target) {
            // A failed save leaves no archive entry behind
            if let Some(archived) = archived {
                if let Err(e) = fs::remove_file(&archived) {
                    warn!("⚠️  Could not remove archived copy {}: {}", archived.display(), e);
                }
            }
            return Err(CollaboratorError::Image {
                path: target,
                source: e,
            });
        }

        info!(
            "✅ Saved {}x{} crop: {}",
            cropped.width(),
            cropped.height(),
            target.display()
        );
        Ok(target)
    }

    fn delete_saved(&self, filename: &str) -> Result<PathBuf, CollaboratorError> {
        let target = self.destination.join(filename);
        if !target.exists() {
            return Err(CollaboratorError::NotFound(target));
        }

        fs::remove_file(&target).map_err(|e| CollaboratorError::Io {
            path: target.clone(),
            source: e,
        })?;
        info!("🗑️  Deleted {}", target.display());

        if let Some(archive) = &self.archive {
            let archived = archive.join(filename);
            if archived.exists() {
                if let Err(e) = fs::remove_file(&archived) {
                    warn!("⚠️  Could not remove archived copy {}: {}", archived.display(), e);
                }
            }
        }

        Ok(target)
    }
}

/// Save a crop on a blocking worker thread
///
/// Returns the saved path, or the error rendered as text for the UI.
pub async fn save_async<S>(store: S, request: CropRequest) -> Result<PathBuf, String>
where
    S: CropStore + Send + 'static,
{
    tokio::task::spawn_blocking(move || store.crop_and_save(&request).map_err(|e| e.to_string()))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        img.save(&path).unwrap();
        path
    }

    fn request(source: PathBuf, selection: Rect) -> CropRequest {
        let filename = source.file_name().unwrap().to_string_lossy().to_string();
        CropRequest {
            source,
            filename,
            selection,
        }
    }

    #[test]
    fn test_crop_and_save_writes_selected_region() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let source = write_image(src.path(), "wide.png", 64, 48);

        let exporter = Exporter::new(dst.path().to_path_buf(), None);
        let saved = exporter
            .crop_and_save(&request(source, Rect::new(8, 4, 32, 20)))
            .unwrap();

        assert_eq!(saved, dst.path().join("wide.png"));
        let cropped = image::open(&saved).unwrap();
        assert_eq!(cropped.dimensions(), (32, 20));
        // Top-left pixel of the crop is (8, 4) in the original
        assert_eq!(cropped.to_rgb8().get_pixel(0, 0), &Rgb([8, 4, 0]));
    }

    #[test]
    fn test_missing_source_is_reported() {
        let dst = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dst.path().to_path_buf(), None);

        let result = exporter.crop_and_save(&request(
            dst.path().join("gone.png"),
            Rect::new(0, 0, 10, 10),
        ));
        assert!(matches!(result, Err(CollaboratorError::NotFound(_))));
    }

    #[test]
    fn test_archive_receives_original() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let archive = tempfile::tempdir().unwrap();
        let source = write_image(src.path(), "a.png", 40, 30);

        let exporter = Exporter::new(dst.path().to_path_buf(), Some(archive.path().to_path_buf()));
        exporter
            .crop_and_save(&request(source, Rect::new(0, 0, 16, 10)))
            .unwrap();

        let archived = image::open(archive.path().join("a.png")).unwrap();
        assert_eq!(archived.dimensions(), (40, 30));
    }

    #[test]
    fn test_failed_save_leaves_no_archive_copy() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let archive = tempfile::tempdir().unwrap();
        let source = write_image(src.path(), "d.png", 40, 30);

        let exporter = Exporter::new(
            dst.path().join("missing"),
            Some(archive.path().to_path_buf()),
        );
        let result = exporter.crop_and_save(&request(source.clone(), Rect::new(0, 0, 16, 10)));

        assert!(matches!(result, Err(CollaboratorError::Image { .. })));
        assert!(!archive.path().join("d.png").exists());
        assert!(source.exists());
    }

    #[test]
    fn test_delete_saved_removes_crop_and_archive() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let archive = tempfile::tempdir().unwrap();
        let source = write_image(src.path(), "b.png", 40, 30);

        let exporter = Exporter::new(dst.path().to_path_buf(), Some(archive.path().to_path_buf()));
        exporter
            .crop_and_save(&request(source.clone(), Rect::new(0, 0, 16, 10)))
            .unwrap();

        let deleted = exporter.delete_saved("b.png").unwrap();
        assert_eq!(deleted, dst.path().join("b.png"));
        assert!(!deleted.exists());
        assert!(!archive.path().join("b.png").exists());
        // Original is untouched
        assert!(source.exists());
    }

    #[test]
    fn test_delete_unsaved_is_not_found() {
        let dst = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dst.path().to_path_buf(), None);
        assert!(matches!(
            exporter.delete_saved("never.png"),
            Err(CollaboratorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_save_async() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let source = write_image(src.path(), "c.png", 20, 20);

        let exporter = Exporter::new(dst.path().to_path_buf(), None);
        let saved = save_async(exporter.clone(), request(source, Rect::new(2, 2, 10, 10)))
            .await
            .unwrap();
        assert!(saved.exists());

        let missing = save_async(exporter, request(src.path().join("nope.png"), Rect::new(0, 0, 1, 1))).await;
        assert!(missing.unwrap_err().contains("not found"));
    }
}
