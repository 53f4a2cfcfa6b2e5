use std::fs;
use std::path::Path;

use filetime::FileTime;

use crate::error::TransferError;

use super::TransferPair;

// Create the destination directory, copy bytes (overwriting), then carry over
// access and modification times. Returns the number of bytes copied.
pub(super) fn copy_pair(pair: &TransferPair) -> Result<u64, TransferError> {
    if let Some(dir) = pair.destination.parent() {
        fs::create_dir_all(dir)
            .map_err(|e| TransferError::CreateDirFailed(dir.to_path_buf(), e.to_string()))?;
    }
    let failed = |reason: String| TransferError::CopyFailed {
        source: pair.source.clone(),
        destination: pair.destination.clone(),
        reason,
    };

    // fs::copy also copies permission bits, so a read-only source leaves a
    // read-only destination that the next run could not overwrite
    make_writable(&pair.destination).map_err(|e| failed(e.to_string()))?;
    let bytes = fs::copy(&pair.source, &pair.destination).map_err(|e| failed(e.to_string()))?;
    preserve_times(&pair.source, &pair.destination).map_err(|e| failed(e.to_string()))?;
    Ok(bytes)
}

fn make_writable(path: &Path) -> std::io::Result<()> {
    let md = match fs::metadata(path) {
        Ok(md) => md,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    let mut perms = md.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

fn preserve_times(src: &Path, dst: &Path) -> std::io::Result<()> {
    let md = fs::metadata(src)?;
    let atime = FileTime::from_last_access_time(&md);
    let mtime = FileTime::from_last_modification_time(&md);
    filetime::set_file_times(dst, atime, mtime)
}
