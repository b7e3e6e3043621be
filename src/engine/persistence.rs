use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::{Error, RecordRepository, Result};

/// Mode given to store files this crate creates.
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// Keeps the store in a single JSON file.
///
/// Writes use an atomic "write-then-rename" strategy: the new content goes to a
/// temporary file next to the store, which is then persisted over it.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_error(&self, source: std::io::Error) -> Error {
        Error::FileOpen {
            path: self.path.clone(),
            source,
        }
    }

    fn read_from(&self, mut file: File) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(Error::IoRead)?;
        debug!("Read {} bytes from {:?}", bytes.len(), self.path);
        Ok(bytes)
    }

    /// The file a write should land on: symlinks are followed so the link
    /// survives and its target gets the new content.
    fn write_target(&self) -> Result<PathBuf> {
        match fs::canonicalize(&self.path) {
            Ok(target) => Ok(target),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(self.path.clone()),
            Err(e) => Err(e.into()),
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

impl RecordRepository for JsonFileRepository {
    fn read(&self) -> Result<Vec<u8>> {
        let file = File::open(&self.path).map_err(|e| self.open_error(e))?;
        self.read_from(file)
    }

    fn read_or_create(&mut self) -> Result<Vec<u8>> {
        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(FILE_MODE);
        }
        let file = options.open(&self.path).map_err(|e| self.open_error(e))?;
        self.read_from(file)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let target = self.write_target()?;
        let permissions = match fs::metadata(&target) {
            Ok(meta) => Some(meta.permissions()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let mut temp = match NamedTempFile::new_in(parent_dir(&target)) {
            Ok(temp) => temp,
            Err(e) if e.kind() == ErrorKind::PermissionDenied && permissions.is_some() => {
                warn!("Cannot create a temp file next to {:?} ({}), rewriting in place", target, e);
                fs::write(&target, bytes)?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;

        match permissions {
            Some(permissions) => fs::set_permissions(temp.path(), permissions)?,
            #[cfg(unix)]
            None => {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(temp.path(), fs::Permissions::from_mode(FILE_MODE))?;
            }
            #[cfg(not(unix))]
            None => {}
        }

        temp.persist(&target).map_err(|e| Error::Io(e.error))?;
        debug!("Wrote {} bytes to {:?}", bytes.len(), target);
        Ok(())
    }
}
