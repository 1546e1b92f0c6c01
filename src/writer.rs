use std::fs::{create_dir_all, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::error::WriteError;

/// Creates `dir` and every missing ancestor.
///
/// Several workers may race on the same directory tree; a directory that already
/// exists (or was created by someone else in the meantime) is not an error.
pub fn ensure_dir(dir: &Path) -> Result<(), WriteError> {
    if dir.is_dir() {
        return Ok(());
    }

    debug!("Creating directory {}", dir.display());
    create_dir_all(dir).map_err(|source| WriteError::DirCreationError {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes `bytes` to `path`, replacing whatever was there.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    let io_err = |source: io::Error| WriteError::FileIOError {
        path: path.to_path_buf(),
        source,
    };

    debug!("Creating/writing to file {:?}", path);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(io_err)?;

    file.write_all(bytes).map_err(io_err)?;
    file.flush().map_err(io_err)
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use tempdir::TempDir;

    use super::{ensure_dir, write_file};
    use crate::error::WriteError;

    #[test]
    fn overwrites_existing_file() {
        let dir = TempDir::new("writer").unwrap();
        let path = dir.path().join("a.jpg");

        write_file(&path, b"a much longer first payload").unwrap();
        write_file(&path, b"short").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"short");
    }

    #[test]
    fn racing_directory_creation_succeeds() {
        let dir = TempDir::new("writer").unwrap();
        let target = Arc::new(dir.path().join("deep/nested/tree"));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let target = target.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    ensure_dir(&target)
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert!(dir.path().join("deep/nested/tree").is_dir());
    }

    #[test]
    fn file_in_place_of_directory_is_reported() {
        let dir = TempDir::new("writer").unwrap();
        fs::write(dir.path().join("blocker"), b"").unwrap();

        let err = ensure_dir(&dir.path().join("blocker/child")).unwrap_err();
        assert!(matches!(err, WriteError::DirCreationError { .. }));
    }
}
