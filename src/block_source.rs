use std::fs::File;
use std::io;
use std::path::Path;

use clap::ValueEnum;

use crate::error::MapError;
use crate::shared_types::{PartialSum, UnitIndex, BLOCK_SIZE};

/// Random access to fixed-size blocks.
///
/// Implementations must not move any cursor shared with other readers: a leaf
/// reading unit 3 can never disturb a concurrent leaf reading unit 17.
pub(crate) trait BlockSource: Send + Sync {
    /// Fills `buf` from `offset` and returns how many bytes were available,
    /// which is less than `buf.len()` only at end of file.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    fn read_block(&self, unit: UnitIndex) -> Result<[u8; BLOCK_SIZE], MapError> {
        let offset = unit
            .checked_mul(BLOCK_SIZE as u64)
            .ok_or(MapError::InvalidRange {
                start: unit,
                end: unit.saturating_add(1),
            })?;
        let mut block = [0u8; BLOCK_SIZE];
        let got = self
            .read_at(offset, &mut block)
            .map_err(|source| MapError::Io { unit, source })?;
        if got < BLOCK_SIZE {
            return Err(MapError::ShortRead {
                unit,
                offset,
                expected: BLOCK_SIZE,
                got,
            });
        }
        Ok(block)
    }
}

/// Read-only input file, read through positional reads.
#[derive(Debug)]
pub(crate) struct FileBlocks {
    file: File,
}

impl FileBlocks {
    pub(crate) fn open(path: &Path) -> Result<Self, MapError> {
        let file = File::open(path).map_err(|source| MapError::FileOpen {
            path: path.to_owned(),
            source,
        })?;
        Ok(Self { file })
    }
}

impl BlockSource for FileBlocks {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match positional_read(&self.file, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(read) => filled += read,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

#[cfg(unix)]
fn positional_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

// seek_read moves the handle's cursor, but every call passes its own offset
// so no reader depends on where another one left it.
#[cfg(windows)]
fn positional_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

impl BlockSource for [u8] {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.len() => start,
            _ => return Ok(0),
        };
        let available = &self[start..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        Ok(n)
    }
}

impl BlockSource for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.as_slice().read_at(offset, buf)
    }
}

/// How a block is turned into the scalar that gets summed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Extraction {
    /// First byte, read as an unsigned byte.
    #[default]
    FirstByte,
    /// Whole block as a little-endian `i32`.
    Word,
}

impl Extraction {
    pub(crate) fn extract(self, block: &[u8; BLOCK_SIZE]) -> PartialSum {
        match self {
            Extraction::FirstByte => PartialSum::from(block[0]),
            Extraction::Word => PartialSum::from(i32::from_le_bytes(*block)),
        }
    }
}
