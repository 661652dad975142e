//! Owner-only permissions for database files.
//!
//! The ledger database holds the administrator identity; on Unix its
//! directory is tightened to 0o700 and the file plus its WAL/SHM sidecars
//! to 0o600 before SQLite opens it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::StoreError;

/// Create the parent directory and the database file with owner-only
/// permissions. Existing files are tightened in place.
pub(crate) fn prepare_db_path(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        harden_dir(parent)?;
    }
    create_owner_only(path)?;
    restrict_db_files(path)
}

fn harden_dir(dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir)
        .map_err(|e| StoreError::io(format!("create directory {}", dir.display()), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::{MetadataExt, PermissionsExt};

        let metadata = fs::metadata(dir)
            .map_err(|e| StoreError::io(format!("stat directory {}", dir.display()), e))?;
        // Shared directories we do not own are left alone.
        let uid = unsafe { libc::getuid() };
        if metadata.uid() != uid {
            return Ok(());
        }
        if metadata.permissions().mode() & 0o077 != 0 {
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700)).map_err(|e| {
                StoreError::io(format!("restrict directory {}", dir.display()), e)
            })?;
        }
    }
    Ok(())
}

fn create_owner_only(path: &Path) -> Result<(), StoreError> {
    if path.exists() {
        return Ok(());
    }

    let mut options = fs::OpenOptions::new();
    options.create(true).truncate(false).read(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .map(drop)
        .map_err(|e| StoreError::io(format!("create database {}", path.display()), e))
}

fn restrict_db_files(path: &Path) -> Result<(), StoreError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| StoreError::io(format!("restrict database {}", path.display()), e))?;
        for suffix in ["-wal", "-shm"] {
            let sidecar = sidecar_path(path, suffix);
            if sidecar.exists()
                && let Err(err) = fs::set_permissions(&sidecar, fs::Permissions::from_mode(0o600))
            {
                tracing::warn!(
                    path = %sidecar.display(),
                    error = %err,
                    "Could not restrict database sidecar permissions"
                );
            }
        }
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    match path.file_name() {
        Some(name) => path.with_file_name(format!("{}{suffix}", name.to_string_lossy())),
        None => PathBuf::from(format!("{}{suffix}", path.display())),
    }
}
