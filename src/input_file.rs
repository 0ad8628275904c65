use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::MapError;
use crate::shared_types::{UnitIndex, BLOCK_SIZE};

/// Creates (or truncates) the input file for writing.
pub(crate) fn open_input_file(path: &Path) -> Result<File, MapError> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| MapError::CreateFile {
            path: path.to_owned(),
            source,
        })
}

/// Writes `n` blocks, block `i` holding `i` as a little-endian `i32`.
/// Indices past `i32::MAX` wrap.
pub(crate) fn write_blocks(file: File, path: &Path, n: u64) -> Result<(), MapError> {
    let create_err = |source: io::Error| MapError::CreateFile {
        path: path.to_owned(),
        source,
    };
    let mut out = BufWriter::new(file);
    for i in 0..n {
        out.write_all(&(i as i32).to_le_bytes()).map_err(create_err)?;
    }
    out.flush().map_err(create_err)?;
    debug!("wrote {} blocks to {}", n, path.display());
    Ok(())
}

pub(crate) fn file_size(path: &Path) -> Result<u64, MapError> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|source| MapError::FileOpen {
            path: path.to_owned(),
            source,
        })
}

/// Number of complete blocks a file of `size` bytes holds.
pub(crate) fn whole_blocks(size: u64) -> UnitIndex {
    size / BLOCK_SIZE as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input_file(path: &Path, n: u64) -> Result<(), MapError> {
        write_blocks(open_input_file(path)?, path, n)
    }

    #[test]
    fn writes_fixed_size_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.dat");
        create_input_file(&path, 24).unwrap();

        assert_eq!(file_size(&path).unwrap(), 24 * BLOCK_SIZE as u64);
        assert_eq!(whole_blocks(file_size(&path).unwrap()), 24);
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[5 * BLOCK_SIZE..6 * BLOCK_SIZE], &5i32.to_le_bytes());
    }

    #[test]
    fn recreating_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.dat");
        create_input_file(&path, 100).unwrap();
        create_input_file(&path, 3).unwrap();
        assert_eq!(file_size(&path).unwrap(), 3 * BLOCK_SIZE as u64);
    }

    #[test]
    fn zero_blocks_gives_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.dat");
        create_input_file(&path, 0).unwrap();
        assert_eq!(file_size(&path).unwrap(), 0);
    }

    #[test]
    fn create_fails_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("input.dat");
        assert!(matches!(
            create_input_file(&path, 1),
            Err(MapError::CreateFile { .. })
        ));
    }
}
