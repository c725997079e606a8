//! Restricting access to output files.

use std::path::Path;

use crate::error::CliError;

/// Owner read/write only.
pub const DEFAULT_OUTPUT_MODE: u32 = 0o600;

/// Set the Unix permission bits of `path` to `mode`.
#[cfg(unix)]
pub fn restrict(path: &Path, mode: u32) -> Result<(), CliError> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| CliError::io(path, e))
}

/// Permission bits are a Unix concept; elsewhere this only logs.
#[cfg(not(unix))]
pub fn restrict(path: &Path, mode: u32) -> Result<(), CliError> {
    tracing::debug!(path = %path.display(), mode = format_args!("{:o}", mode), "skipping chmod on this platform");
    Ok(())
}
