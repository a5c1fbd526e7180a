//! File copy helpers

use std::{
    fs::{File, FileTimes},
    path::Path,
};

/// Copy `from` over `to`, keeping the source's permissions and timestamps.
///
/// A read-only source gives a read-only copy, so the times are set through a
/// handle that does not ask for write access to the contents.
///
/// Returns the number of bytes copied.
pub fn copy_preserving(from: &Path, to: &Path) -> std::io::Result<u64> {
    let metadata = std::fs::metadata(from)?;
    let bytes = std::fs::copy(from, to)?;

    let mut times = FileTimes::new().set_modified(metadata.modified()?);

    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    open_for_times(to)?.set_times(times)?;

    tracing::debug!(?from, ?to, bytes, "copied file");

    Ok(bytes)
}

/// The owner may change a file's times through a read-only descriptor.
#[cfg(unix)]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;

    File::options().access_mode(FILE_WRITE_ATTRIBUTES).open(path)
}

#[cfg(not(any(unix, windows)))]
fn open_for_times(path: &Path) -> std::io::Result<File> {
    File::options().write(true).open(path)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    fn set_modified(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn copy_keeps_bytes_and_modified_time() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.sl2");
        let target = dir.path().join("target.sl2");

        std::fs::write(&source, b"\x00\x01save\xff").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        set_modified(&source, old);

        let bytes = copy_preserving(&source, &target).unwrap();

        assert_eq!(bytes, 7);
        assert_eq!(std::fs::read(&target).unwrap(), b"\x00\x01save\xff");
        assert_eq!(
            std::fs::metadata(&target).unwrap().modified().unwrap(),
            old
        );
    }

    #[test]
    fn read_only_source_is_copied_with_its_times() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.sl2");
        let target = dir.path().join("target.sl2");

        std::fs::write(&source, b"locked").unwrap();
        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_500_000_000);
        set_modified(&source, old);

        let mut permissions = std::fs::metadata(&source).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&source, permissions).unwrap();

        let bytes = copy_preserving(&source, &target).unwrap();

        let metadata = std::fs::metadata(&target).unwrap();
        assert_eq!(bytes, 6);
        assert_eq!(std::fs::read(&target).unwrap(), b"locked");
        assert_eq!(metadata.modified().unwrap(), old);
        assert!(metadata.permissions().readonly());
    }

    #[test]
    fn copy_overwrites_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        let target = dir.path().join("target");

        std::fs::write(&source, b"new").unwrap();
        std::fs::write(&target, b"older and longer").unwrap();

        copy_preserving(&source, &target).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = copy_preserving(&dir.path().join("nope"), &dir.path().join("target"))
            .unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert!(!dir.path().join("target").exists());
    }
}
