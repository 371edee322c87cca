//! Backup use case: copies the preferences store aside before it is changed
//! and publishes the copy's location to later build steps.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Prefix of the per-run directory that holds the backup copy.
pub const BACKUP_DIR_PREFIX: &str = "simkbd-backup-";

/// Error type for the backup use case.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to inspect {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create backup directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} has no file name", .0.display())]
    NoFileName(PathBuf),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Error type for environment exporters.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("`{command}` could not be run: {reason}")]
    Unavailable { command: String, reason: String },

    #[error("failed to export {key}: {output}")]
    Failed { key: String, output: String },
}

/// Makes a key/value pair visible to subsequent build steps.
#[cfg_attr(test, mockall::automock)]
pub trait EnvExporter {
    /// # Errors
    ///
    /// Returns [`ExportError`] if the value could not be stored.
    fn export(&self, key: &str, value: &str) -> Result<(), ExportError>;
}

/// Copies `source` into a fresh `simkbd-backup-<uuid>` directory under
/// `backup_root`.
///
/// Returns `Ok(None)` when `source` does not exist; there is nothing to
/// restore in that case.
///
/// # Errors
///
/// Returns [`BackupError`] if the source cannot be inspected, or the backup
/// directory cannot be created or written.
pub fn backup_preferences(
    source: &Path,
    backup_root: &Path,
) -> Result<Option<PathBuf>, BackupError> {
    match source.try_exists() {
        Ok(true) => {}
        Ok(false) => return Ok(None),
        Err(e) => {
            return Err(BackupError::Inspect {
                path: source.to_path_buf(),
                source: e,
            })
        }
    }

    let file_name = source
        .file_name()
        .ok_or_else(|| BackupError::NoFileName(source.to_path_buf()))?;

    let dir = backup_root.join(format!("{BACKUP_DIR_PREFIX}{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).map_err(|e| BackupError::CreateDir {
        path: dir.clone(),
        source: e,
    })?;

    let target = dir.join(file_name);
    std::fs::copy(source, &target).map_err(|e| BackupError::Copy {
        from: source.to_path_buf(),
        to: target.clone(),
        source: e,
    })?;

    debug!("Copied {} to {}", source.display(), target.display());
    Ok(Some(target))
}

/// Backs up `source` and exports the copy's path under `env_key`.
///
/// A missing source is logged and skipped; nothing is exported.
///
/// # Errors
///
/// Returns [`BackupError`] if the copy or the export fails.
pub fn backup_and_export(
    source: &Path,
    backup_root: &Path,
    env_key: &str,
    exporter: &dyn EnvExporter,
) -> Result<Option<PathBuf>, BackupError> {
    let Some(backup) = backup_preferences(source, backup_root)? else {
        info!(
            "Preferences file doesn't exist at {}, skipping backup",
            source.display()
        );
        return Ok(None);
    };

    exporter.export(env_key, &backup.to_string_lossy())?;
    info!("Backed up preferences to {} ({env_key})", backup.display());
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::{eq, function};

    fn temp_root(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("simkbd_{tag}_{}", Uuid::new_v4()))
    }

    #[test]
    fn test_backup_copies_bytes_into_unique_directory() {
        // Arrange
        let root = temp_root("backup");
        std::fs::create_dir_all(&root).unwrap();
        let source = root.join("com.apple.iphonesimulator.plist");
        std::fs::write(&source, b"bplist00-original").unwrap();
        let backups = root.join("backups");

        // Act
        let first = backup_preferences(&source, &backups).unwrap().unwrap();
        let second = backup_preferences(&source, &backups).unwrap().unwrap();

        // Assert
        assert_eq!(std::fs::read(&first).unwrap(), b"bplist00-original");
        assert_eq!(first.file_name().unwrap(), "com.apple.iphonesimulator.plist");
        assert_ne!(first.parent(), second.parent());
        let dir_name = first.parent().unwrap().file_name().unwrap().to_string_lossy();
        assert!(dir_name.starts_with(BACKUP_DIR_PREFIX));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_backup_of_missing_source_returns_none_and_creates_nothing() {
        let root = temp_root("backup_missing");

        let result = backup_preferences(&root.join("missing.plist"), &root).unwrap();

        assert!(result.is_none());
        assert!(!root.exists());
    }

    #[test]
    fn test_backup_and_export_publishes_backup_path() {
        // Arrange
        let root = temp_root("export");
        std::fs::create_dir_all(&root).unwrap();
        let source = root.join("prefs.plist");
        std::fs::write(&source, b"<plist/>").unwrap();

        let mut exporter = MockEnvExporter::new();
        exporter
            .expect_export()
            .with(
                eq("BACKUP_KEY"),
                function(|v: &str| v.ends_with("prefs.plist")),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        // Act
        let backup = backup_and_export(&source, &root, "BACKUP_KEY", &exporter)
            .unwrap()
            .unwrap();

        // Assert
        assert!(backup.starts_with(&root));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_backup_and_export_skips_export_when_source_missing() {
        let root = temp_root("export_missing");
        let mut exporter = MockEnvExporter::new();
        exporter.expect_export().never();

        let result = backup_and_export(&root.join("none.plist"), &root, "K", &exporter).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_backup_and_export_propagates_export_failure() {
        let root = temp_root("export_fail");
        std::fs::create_dir_all(&root).unwrap();
        let source = root.join("prefs.plist");
        std::fs::write(&source, b"<plist/>").unwrap();

        let mut exporter = MockEnvExporter::new();
        exporter.expect_export().returning(|key, _| {
            Err(ExportError::Failed {
                key: key.to_string(),
                output: "envman: not initialised".to_string(),
            })
        });

        let err = backup_and_export(&source, &root, "K", &exporter).unwrap_err();

        assert!(matches!(err, BackupError::Export(ExportError::Failed { .. })));

        std::fs::remove_dir_all(&root).ok();
    }
}
