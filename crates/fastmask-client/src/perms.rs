//! Permission guard for the config directory and token file.
//!
//! The token grants full masked-email control over the account, so the
//! file holding it must not be readable by other local users. On Unix
//! targets the directory must be exactly `0700` and the file `0600` (or
//! `0400` for a read-only setup); anything else is rejected before the
//! file content is touched. Targets without POSIX mode bits cannot
//! express the constraint, so the checks pass there.

use std::fs::Metadata;
use std::path::Path;

use crate::error::ClientError;

const DIR_MODE: u32 = 0o700;
const FILE_MODE: u32 = 0o600;
const FILE_MODE_READ_ONLY: u32 = 0o400;

/// Permission bits of `meta`, or `None` on targets without mode bits.
#[cfg(unix)]
fn permission_bits(meta: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(meta.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permission_bits(_meta: &Metadata) -> Option<u32> {
    None
}

fn stat(path: &Path, what: &str) -> Result<Metadata, ClientError> {
    std::fs::metadata(path)
        .map_err(|e| ClientError::Config(format!("cannot access {what} {}: {e}", path.display())))
}

/// Checks that the config directory is mode `0700`.
///
/// # Errors
///
/// Returns [`ClientError::Config`] if the directory cannot be stat-ed and
/// [`ClientError::InsecurePermissions`] if its mode is anything other
/// than `0700`.
pub fn check_directory(path: &Path) -> Result<(), ClientError> {
    let meta = stat(path, "config directory")?;
    if let Some(mode) = permission_bits(&meta) {
        if mode != DIR_MODE {
            return Err(ClientError::InsecurePermissions {
                path: path.to_path_buf(),
                actual: mode,
                expected: "0700",
            });
        }
    }
    Ok(())
}

/// Checks that the token file is mode `0600` or `0400`.
///
/// # Errors
///
/// Returns [`ClientError::Config`] if the file cannot be stat-ed and
/// [`ClientError::InsecurePermissions`] for any other mode.
pub fn check_file(path: &Path) -> Result<(), ClientError> {
    let meta = stat(path, "config file")?;
    if let Some(mode) = permission_bits(&meta) {
        if mode != FILE_MODE && mode != FILE_MODE_READ_ONLY {
            return Err(ClientError::InsecurePermissions {
                path: path.to_path_buf(),
                actual: mode,
                expected: "0600 or 0400",
            });
        }
    }
    Ok(())
}
