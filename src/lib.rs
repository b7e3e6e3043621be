//! User Records is a tiny file-backed store for user entries.
//!
//! The whole store lives in one file as a JSON array of `{id, email, age}` objects.
//! Every invocation reads the full array, applies a single operation and, when the
//! operation mutates the store, rewrites the whole file.
//!
//! ## Core Components
//! - [`config`]: Raw arguments and their validation into a typed [`config::Config`].
//! - [`engine`]: Repositories (file-backed and in-memory) and the four operations.
//! - [`dispatch`]: Validates arguments and routes to the requested operation.

pub mod config;
pub mod dispatch;
pub mod engine;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the record store.
#[derive(Error, Debug)]
pub enum Error {
    /// No operation was given.
    #[error("-operation flag has to be specified")]
    MissingOperation,
    /// The operation is not one of `add`, `list`, `remove` or `findById`.
    #[error("operation {0} not allowed")]
    UnknownOperation(String),
    /// No store file was given.
    #[error("-fileName flag has to be specified")]
    MissingFileName,
    /// `add` was requested without an item.
    #[error("-item flag has to be specified")]
    MissingItem,
    /// `remove` or `findById` was requested without an id.
    #[error("-id flag has to be specified")]
    MissingId,
    /// The store file could not be opened.
    #[error("could not open {}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The store file was opened but reading it failed.
    #[error("could not read store")]
    IoRead(#[source] std::io::Error),
    /// The store content is not a JSON array of records.
    #[error("could not parse store")]
    Parse(#[from] serde_json::Error),
    /// Writing the store file or the output failed.
    #[error("IO error")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for record store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A single user entry.
///
/// Missing fields decode to their zero value and unknown fields are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Record {
    pub id: String,
    pub email: String,
    pub age: i64,
}

/// Storage boundary between the operations and the bytes they live in.
///
/// Implementors only move raw bytes around; the JSON encoding of the store is
/// handled by the provided methods.
pub trait RecordRepository {
    /// Returns the raw store content. Fails with [`Error::FileOpen`] if the store
    /// does not exist.
    fn read(&self) -> Result<Vec<u8>>;

    /// Returns the raw store content, creating an empty store first if needed.
    fn read_or_create(&mut self) -> Result<Vec<u8>>;

    /// Replaces the whole store content.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Loads and decodes the store. Empty content is a parse failure.
    fn load(&self) -> Result<Vec<Record>> {
        let bytes = self.read()?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Loads the store for a mutation that may start from nothing: a missing
    /// store is created and empty content counts as an empty array.
    fn load_or_default(&mut self) -> Result<Vec<Record>> {
        let bytes = self.read_or_create()?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Encodes and writes the whole store, returning the bytes written.
    fn save(&mut self, records: &[Record]) -> Result<Vec<u8>> {
        let bytes = serde_json::to_vec(records)?;
        self.write(&bytes)?;
        Ok(bytes)
    }
}
