use std::{
    fs::{self, OpenOptions, rename, write},
    path::{Path, PathBuf},
};

use fs2::FileExt;
use uuid::Uuid;

use crate::storage::{Storage, StorageError};

/// Number of backups retained per key
const BACKUPS_TO_KEEP: usize = 5;

/// Stores every key as its own file inside `dir`.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }

    fn create_backup_dir(&self) -> Result<(), StorageError> {
        let backups_dir = self.get_backup_dir();
        fs::create_dir(&backups_dir).map_err(|e| StorageError::BackupFailed {
            path: backups_dir,
            source: e,
        })?;
        Ok(())
    }

    fn create_backup(&self, key: &str, path: &Path) -> Result<u64, StorageError> {
        let file_exists = fs::exists(path).map_err(|e| StorageError::BackupFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        if !file_exists {
            return Ok(0);
        }

        let backup_path = self.get_backup_path(key);
        match fs::copy(path, &backup_path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.create_backup_dir()?;
                self.create_backup(key, path)
            }
            Err(e) => Err(StorageError::BackupFailed {
                path: backup_path,
                source: e,
            }),
            Ok(bytes) => Ok(bytes),
        }
    }

    fn cleanup_old_backups(&self, key: &str) -> Result<(), StorageError> {
        let backup_dir = self.get_backup_dir();
        let backup_dir_exists =
            fs::exists(&backup_dir).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        if !backup_dir_exists {
            return Ok(());
        }

        let prefix = format!("{key}.");
        let mut file_entries = fs::read_dir(&backup_dir)
            .map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?
            .flatten()
            .filter(|entry| entry.metadata().map(|m| m.is_file()).unwrap_or(false))
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .map(|entry| entry.path())
            .collect::<Vec<_>>();

        // Names end in a zero-padded nanosecond stamp, so lexical order is age order
        file_entries.sort();

        let number_of_files_to_delete = file_entries.len().saturating_sub(BACKUPS_TO_KEEP);
        if number_of_files_to_delete == 0 {
            return Ok(());
        }

        for file_path in &file_entries[0..number_of_files_to_delete] {
            fs::remove_file(file_path).map_err(|e| StorageError::CleanupFailed {
                dir: backup_dir.clone(),
                source: e,
            })?;
        }
        tracing::debug!(key, removed = number_of_files_to_delete, "pruned old backups");

        Ok(())
    }

    fn get_backup_dir(&self) -> PathBuf {
        self.dir.join("backups")
    }

    fn get_backup_path(&self, key: &str) -> PathBuf {
        let stamp = jiff::Timestamp::now().as_nanosecond();
        // Keys never contain '.', so the prefix cannot match another key's backups
        self.get_backup_dir().join(format!("{key}.{stamp:020}"))
    }

    /// Back up the current value and move `temp_path` over it while holding the key's lock.
    fn replace_locked(&self, key: &str, path: &Path, temp_path: &Path) -> Result<(), StorageError> {
        let save_failed = |path: PathBuf, source: std::io::Error| StorageError::SaveFailed {
            key: key.to_string(),
            path,
            source,
        };

        let lock_file_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_file_path)
            .map_err(|e| save_failed(lock_file_path.clone(), e))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| save_failed(lock_file_path.clone(), e))?;

        self.create_backup(key, path)?;
        self.cleanup_old_backups(key)?;

        rename(temp_path, path).map_err(|e| save_failed(path.to_path_buf(), e))?;

        lock_file
            .unlock()
            .map_err(|e| save_failed(lock_file_path, e))?;

        Ok(())
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::LoadFailed {
                key: key.to_string(),
                path,
                source: e,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        let save_failed = |path: PathBuf, source: std::io::Error| StorageError::SaveFailed {
            key: key.to_string(),
            path,
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|e| save_failed(self.dir.clone(), e))?;

        let temp_path = self.dir.join(format!("{key}.tmp.{}", Uuid::new_v4()));
        write(&temp_path, value).map_err(|e| save_failed(temp_path.clone(), e))?;

        let result = self.replace_locked(key, &path, &temp_path);
        if result.is_err()
            && let Err(e) = fs::remove_file(&temp_path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %temp_path.display(), error = %e, "failed to remove temp file");
        }
        result
    }
}
