use std::io::{Error as IoError, ErrorKind};
use std::path::PathBuf;

use crate::{Error, RecordRepository, Result};

/// Keeps the store in an in-memory buffer.
///
/// `None` stands for a store that does not exist yet, so the "missing file"
/// paths of the operations can be exercised without touching the disk.
#[derive(Debug, Default, Clone)]
pub struct MemRepository {
    data: Option<Vec<u8>>,
    writes: usize,
}

impl MemRepository {
    /// A repository whose store does not exist.
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository holding the given raw content.
    pub fn with_content<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self {
            data: Some(bytes.into()),
            writes: 0,
        }
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Number of times the store has been rewritten.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl RecordRepository for MemRepository {
    fn read(&self) -> Result<Vec<u8>> {
        self.data.clone().ok_or_else(|| Error::FileOpen {
            path: PathBuf::from("<memory>"),
            source: IoError::new(ErrorKind::NotFound, "store does not exist"),
        })
    }

    fn read_or_create(&mut self) -> Result<Vec<u8>> {
        Ok(self.data.get_or_insert_with(Vec::new).clone())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.data = Some(bytes.to_vec());
        self.writes += 1;
        Ok(())
    }
}
