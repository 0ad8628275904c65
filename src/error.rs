use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::shared_types::UnitIndex;

#[derive(Error, Debug)]
pub(crate) enum MapError {
    #[error("invalid range [{start}, {end})")]
    InvalidRange { start: UnitIndex, end: UnitIndex },
    #[error("short read at unit {unit} (offset {offset}): wanted {expected} bytes, got {got}")]
    ShortRead {
        unit: UnitIndex,
        offset: u64,
        expected: usize,
        got: usize,
    },
    #[error("failed to open {}: {source}", .path.display())]
    FileOpen { path: PathBuf, source: io::Error },
    #[error("failed to create {}: {source}", .path.display())]
    CreateFile { path: PathBuf, source: io::Error },
    #[error("read error at unit {unit}: {source}")]
    Io { unit: UnitIndex, source: io::Error },
    #[error("failed to write report: {0}")]
    Report(io::Error),
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
