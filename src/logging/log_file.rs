//! Log file opening and rotation
//!
//! On restart the daemon can keep one backup of the previous log (`<path>.1`)
//! before starting a fresh file. Rotation problems never abort startup; only a
//! missing directory or an unopenable file is fatal.

use std::ffi::OsString;
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::error::LogInitError;

/// Suffix appended to the log path for the backup copy
pub const BACKUP_SUFFIX: &str = ".1";

/// Whether to move an existing log aside before opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackupPolicy {
    pub do_backup: bool,
}

impl BackupPolicy {
    /// Keep the previous log as `<path>.1` and start a fresh file
    pub fn rotate() -> Self {
        Self { do_backup: true }
    }

    /// Keep writing to the end of the existing log
    pub fn append() -> Self {
        Self { do_backup: false }
    }
}

/// What `open_or_rotate` did to get a writable file
#[derive(Debug)]
pub enum OpenOutcome {
    /// The previous log was moved to the backup path; the file is fresh
    Rotated,
    /// Backup was requested but no previous log existed
    FirstRun,
    /// The backup rename failed; the existing file is appended to instead
    RotationFailed(io::Error),
    /// No backup requested; the existing file is appended to
    Appended,
}

impl OpenOutcome {
    /// Check whether the file was opened in append mode
    pub fn is_append(&self) -> bool {
        matches!(self, OpenOutcome::RotationFailed(_) | OpenOutcome::Appended)
    }
}

/// An open log file together with how it was obtained
#[derive(Debug)]
pub struct OpenedLog {
    pub file: File,
    pub path: PathBuf,
    pub outcome: OpenOutcome,
}

/// Backup path for a log file: the same path with `.1` appended
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Open the log file at `path`, rotating the previous one first if asked
///
/// Parent directories are created as needed (mode 0750 on Unix).
pub fn open_or_rotate(path: &Path, policy: BackupPolicy) -> Result<OpenedLog, LogInitError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_log_dir(parent).map_err(|source| LogInitError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let outcome = if policy.do_backup {
        match fs::rename(path, backup_path(path)) {
            Ok(()) => OpenOutcome::Rotated,
            Err(e) if e.kind() == io::ErrorKind::NotFound => OpenOutcome::FirstRun,
            Err(e) => OpenOutcome::RotationFailed(e),
        }
    } else {
        OpenOutcome::Appended
    };

    let mut options = OpenOptions::new();
    options.read(true).create(true);
    if outcome.is_append() {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }

    let file = options.open(path).map_err(|source| LogInitError::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(OpenedLog {
        file,
        path: path.to_path_buf(),
        outcome,
    })
}

fn create_log_dir(dir: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o750);
    }
    builder.create(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("/var/log/dnswatch.log")),
            PathBuf::from("/var/log/dnswatch.log.1")
        );
        assert_eq!(backup_path(Path::new("noext")), PathBuf::from("noext.1"));
    }

    #[test]
    fn test_append_keeps_prior_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dnswatch.log");

        let mut first = open_or_rotate(&path, BackupPolicy::append()).unwrap();
        assert!(matches!(first.outcome, OpenOutcome::Appended));
        first.file.write_all(b"first\n").unwrap();
        drop(first);

        let mut second = open_or_rotate(&path, BackupPolicy::append()).unwrap();
        assert!(matches!(second.outcome, OpenOutcome::Appended));
        second.file.write_all(b"second\n").unwrap();
        drop(second);

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_rotation_moves_previous_log() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dnswatch.log");
        fs::write(&path, "X").unwrap();

        let opened = open_or_rotate(&path, BackupPolicy::rotate()).unwrap();
        assert!(matches!(opened.outcome, OpenOutcome::Rotated));
        drop(opened);

        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "X");
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_rotation_replaces_older_backup() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dnswatch.log");
        fs::write(backup_path(&path), "old").unwrap();
        fs::write(&path, "new").unwrap();

        open_or_rotate(&path, BackupPolicy::rotate()).unwrap();

        assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "new");
    }

    #[test]
    fn test_first_run_rotation_creates_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dnswatch.log");

        let opened = open_or_rotate(&path, BackupPolicy::rotate()).unwrap();
        assert!(matches!(opened.outcome, OpenOutcome::FirstRun));

        assert!(path.exists());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_failed_rotation_falls_back_to_append() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dnswatch.log");
        fs::write(&path, "kept\n").unwrap();

        // A non-empty directory at the backup path makes the rename fail
        let blocker = backup_path(&path);
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("occupied"), "").unwrap();

        let mut opened = open_or_rotate(&path, BackupPolicy::rotate()).unwrap();
        assert!(matches!(opened.outcome, OpenOutcome::RotationFailed(_)));
        opened.file.write_all(b"more\n").unwrap();
        drop(opened);

        assert_eq!(fs::read_to_string(&path).unwrap(), "kept\nmore\n");
    }

    #[test]
    fn test_creates_missing_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("dnswatch.log");

        open_or_rotate(&path, BackupPolicy::append()).unwrap();
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(temp_dir.path().join("a"))
                .unwrap()
                .permissions()
                .mode();
            // umask can only clear bits
            assert_eq!(mode & 0o027, 0);
        }
    }

    #[test]
    fn test_unusable_parent_is_create_dir_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain-file");
        fs::write(&file, "").unwrap();
        let path = file.join("logs").join("dnswatch.log");

        let err = open_or_rotate(&path, BackupPolicy::append()).unwrap_err();
        assert!(matches!(err, LogInitError::CreateDir { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_directory_at_log_path_is_open_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dnswatch.log");
        fs::create_dir(&path).unwrap();

        let err = open_or_rotate(&path, BackupPolicy::append()).unwrap_err();
        assert!(matches!(err, LogInitError::OpenFile { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
