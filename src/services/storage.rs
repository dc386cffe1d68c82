use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::AppError;

/// On-disk storage for uploaded files. The upload directory is an
/// explicit constructor argument, not process-wide state.
#[derive(Debug, Clone)]
pub struct FileStorage {
    upload_dir: PathBuf,
}

impl FileStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let upload_dir = upload_dir.into();
        fs::create_dir_all(&upload_dir)?;
        Ok(Self { upload_dir })
    }

    /// Save uploaded bytes under a random filename, keeping the
    /// original extension so the loader can dispatch on it.
    pub fn save(&self, original_filename: &str, data: &[u8]) -> Result<PathBuf, AppError> {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        let path = self
            .upload_dir
            .join(format!("{}{}", Uuid::new_v4(), extension));
        fs::write(&path, data)?;
        tracing::debug!("Saved upload to {}", path.display());
        Ok(path)
    }

    /// Best-effort removal; missing files are not an error.
    pub fn remove(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_keeps_extension_and_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let path = storage.save("report.CSV", b"a,b\n1,2\n").unwrap();
        assert_eq!(path.extension().unwrap(), "csv");
        assert_eq!(fs::read(&path).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn saved_filenames_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let first = storage.save("data.csv", b"x").unwrap();
        let second = storage.save("data.csv", b"y").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn remove_is_quiet_for_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        storage.remove(Path::new("does-not-exist.csv"));
    }
}
