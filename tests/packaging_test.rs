use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use tempfile::tempdir;
use zip::ZipArchive;
use zipstage::package::{package_tree, PackageOptions};
use zipstage::{runner, staging, walk, BackupConfig, BackupError, ProgressTracker, SplitSize};

fn write_file(root: &Path, rel: &str, contents: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn archive_contents(path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        out.push((entry.name().to_string(), data));
    }
    out
}

fn options(dest: &Path, cap: u64) -> PackageOptions {
    PackageOptions {
        staging_root: staging::staging_dir(dest),
        destination: dest.to_path_buf(),
        split_size: SplitSize::from_bytes(cap).unwrap(),
        start_index: 1,
    }
}

#[test]
fn two_small_files_split_across_two_archives() {
    let dest = tempdir().unwrap();
    let staging_root = staging::staging_dir(dest.path());
    write_file(&staging_root, "a.txt", b"hello");
    write_file(&staging_root, "sub/b.txt", b"world");

    let report = package_tree(&options(dest.path(), 8), &ProgressTracker::new()).unwrap();
    assert_eq!(report.archives.len(), 2);

    let first = archive_contents(&dest.path().join("backup_1.zip"));
    let second = archive_contents(&dest.path().join("backup_2.zip"));
    assert_eq!(first, vec![("staging/a.txt".to_string(), b"hello".to_vec())]);
    assert_eq!(second, vec![("staging/sub/b.txt".to_string(), b"world".to_vec())]);
    assert!(!dest.path().join("backup_3.zip").exists());

    let log = fs::read_to_string(dest.path().join("backup.log")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("Backup realizado em: "));
    assert_eq!(lines[0].len(), "Backup realizado em: ".len() + "yyyy-MM-dd HH:mm:ss".len());
    assert_eq!(
        &lines[1..],
        &[
            "Arquivo ZIP: backup_1.zip",
            " - staging/a.txt",
            "Arquivo ZIP: backup_2.zip",
            " - staging/sub/b.txt",
        ]
    );
}

#[test]
fn archives_cover_staging_exactly_and_respect_cap() {
    let dest = tempdir().unwrap();
    let staging_root = staging::staging_dir(dest.path());
    let sizes = [3usize, 40, 7, 12, 25, 1, 0, 19, 60, 8];
    for (i, size) in sizes.iter().enumerate() {
        write_file(&staging_root, &format!("d{}/f{}.bin", i % 3, i), &vec![b'x'; *size]);
    }
    let expected: BTreeSet<String> = walk::collect_files(&staging_root, "staging")
        .into_iter()
        .map(|e| e.relative_path)
        .collect();

    let cap = 30;
    let report = package_tree(&options(dest.path(), cap), &ProgressTracker::new()).unwrap();

    let mut seen = Vec::new();
    for (position, archive) in report.archives.iter().enumerate() {
        assert_eq!(archive.index as usize, position + 1);
        let contents = archive_contents(&archive.path);
        let names: Vec<String> = contents.iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, archive.entries);

        let declared: u64 = contents.iter().map(|(_, d)| d.len() as u64).sum();
        assert_eq!(declared, archive.declared_bytes);
        if archive.entries.len() > 1 {
            assert!(declared <= cap, "{} holds {} bytes", archive.file_name, declared);
        }
        seen.extend(names);
    }

    let unique: BTreeSet<String> = seen.iter().cloned().collect();
    assert_eq!(unique.len(), seen.len(), "duplicate entries");
    assert_eq!(unique, expected);
}

#[test]
fn packaging_without_staging_creates_nothing() {
    let dest = tempdir().unwrap();
    let config = BackupConfig::new("", dest.path());

    let err = runner::run_package(&config, &ProgressTracker::new()).unwrap_err();
    assert!(matches!(err, BackupError::MissingStagingDirectory { .. }));
    assert!(!dest.path().join("backup_1.zip").exists());
    assert!(!staging::is_packaging_ready(dest.path()));
}

#[cfg(unix)]
#[test]
fn unreadable_entry_is_logged_and_skipped() {
    let dest = tempdir().unwrap();
    let staging_root = staging::staging_dir(dest.path());
    write_file(&staging_root, "a.txt", b"first");
    write_file(&staging_root, "c.txt", b"third");
    std::os::unix::fs::symlink(staging_root.join("does-not-exist"), staging_root.join("b.txt")).unwrap();

    let config = BackupConfig::new("", dest.path());
    let report = runner::run_package(&config, &ProgressTracker::new()).unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.processed, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "staging/b.txt");

    let names: Vec<String> = archive_contents(&dest.path().join("backup_1.zip"))
        .into_iter()
        .map(|(n, _)| n)
        .collect();
    assert_eq!(names, vec!["staging/a.txt", "staging/c.txt"]);

    let log = fs::read_to_string(dest.path().join("backup.log")).unwrap();
    let errors: Vec<&str> = log.lines().filter(|l| l.starts_with("Erro ao compactar ")).collect();
    let successes = log.lines().filter(|l| l.starts_with(" - ")).count();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Erro ao compactar staging/b.txt: "));
    assert_eq!(successes, 2);

    // A completed run still clears staging.
    assert!(!staging_root.exists());
}

#[cfg(unix)]
#[test]
fn entry_failing_mid_stream_is_dropped_from_archive() {
    let dest = tempdir().unwrap();
    let outside = tempdir().unwrap();
    fs::write(outside.path().join("inner.txt"), b"not archived").unwrap();

    let staging_root = staging::staging_dir(dest.path());
    write_file(&staging_root, "a.txt", b"first");
    write_file(&staging_root, "c.txt", b"third");
    // Opens fine, but reading a directory fails once the entry has been started.
    std::os::unix::fs::symlink(outside.path(), staging_root.join("b_link")).unwrap();

    let config = BackupConfig::new("", dest.path());
    let report = runner::run_package(&config, &ProgressTracker::new()).unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "staging/b_link");
    assert_eq!(report.archived_count(), 2);

    let contents = archive_contents(&dest.path().join("backup_1.zip"));
    assert_eq!(
        contents,
        vec![
            ("staging/a.txt".to_string(), b"first".to_vec()),
            ("staging/c.txt".to_string(), b"third".to_vec()),
        ]
    );

    let log = fs::read_to_string(dest.path().join("backup.log")).unwrap();
    assert!(log.lines().any(|l| l.starts_with("Erro ao compactar staging/b_link: ")));
    assert!(!log.contains(" - staging/b_link"));
    assert!(outside.path().join("inner.txt").exists());
}

#[test]
fn log_is_appended_across_runs() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_file(src.path(), "one.txt", b"1");
    let config = BackupConfig::new(src.path(), dest.path());

    runner::run_backup(&config, &ProgressTracker::new()).unwrap();
    runner::run_backup(&config.clone().with_start_index(2), &ProgressTracker::new()).unwrap();

    let log = fs::read_to_string(dest.path().join("backup.log")).unwrap();
    assert_eq!(log.lines().filter(|l| l.starts_with("Backup realizado em: ")).count(), 2);
    assert!(log.contains("Arquivo ZIP: backup_1.zip\n - staging/one.txt\n"));
    assert!(log.contains("Arquivo ZIP: backup_2.zip\n - staging/one.txt\n"));
    assert!(dest.path().join("backup_1.zip").is_file());
    assert!(dest.path().join("backup_2.zip").is_file());
}

#[test]
fn empty_staging_still_produces_one_archive() {
    let dest = tempdir().unwrap();
    fs::create_dir_all(staging::staging_dir(dest.path()).join("nothing/here")).unwrap();

    let report = package_tree(&options(dest.path(), 10), &ProgressTracker::new()).unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(report.archives.len(), 1);
    assert!(archive_contents(&dest.path().join("backup_1.zip")).is_empty());
}
