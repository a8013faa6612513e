//! Read-only views of what a destination holds.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::common::parse_archive_index;
use crate::error::{BackupError, Result};

/// All `backup_<N>.zip` files directly under `destination`, ordered by index.
pub fn list_archives(destination: &Path) -> Result<Vec<(u32, PathBuf)>> {
    let entries = fs::read_dir(destination).map_err(|e| BackupError::io(destination, e))?;

    let mut archives: Vec<(u32, PathBuf)> = entries
        .flatten()
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| {
            let index = parse_archive_index(&e.file_name().to_string_lossy())?;
            Some((index, e.path()))
        })
        .collect();
    archives.sort_by_key(|(index, _)| *index);
    Ok(archives)
}

/// Entry names stored in one archive, in central-directory order.
pub fn list_entries(archive_path: &Path) -> Result<Vec<String>> {
    let file = File::open(archive_path).map_err(|e| BackupError::io(archive_path, e))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| BackupError::zip(archive_path, e))?;

    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| BackupError::zip(archive_path, e))?;
        names.push(entry.name().to_owned());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn archives_sorted_numerically() {
        let dir = tempdir().unwrap();
        for name in ["backup_10.zip", "backup_2.zip", "backup_1.zip", "backup.log", "other.zip"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let found: Vec<u32> = list_archives(dir.path()).unwrap().into_iter().map(|(i, _)| i).collect();
        assert_eq!(found, vec![1, 2, 10]);
    }

    #[test]
    fn garbage_archive_is_a_zip_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("backup_1.zip");
        fs::write(&path, b"definitely not a zip").unwrap();
        assert!(matches!(list_entries(&path), Err(BackupError::Zip { .. })));
    }
}
