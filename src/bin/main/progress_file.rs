use std::{
    fs, io,
    path::{Path, PathBuf},
};

use cadence_core::progress::{ProgressStore, SavedProgress, decode, encode};
use log::debug;

use super::error::HostError;

/// One binary progress record per key, stored as `<dir>/<key>.bin`.
pub(super) struct FileProgressStore {
    dir: PathBuf,
}

impl FileProgressStore {
    pub(super) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.bin"))
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("bin.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

impl ProgressStore for FileProgressStore {
    type Error = HostError;

    fn read(&mut self, key: &str) -> Result<Option<SavedProgress>, Self::Error> {
        let path = self.record_path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(decode(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(HostError::ProgressIo(err)),
        }
    }

    fn write(&mut self, key: &str, progress: &SavedProgress) -> Result<(), Self::Error> {
        let record = encode(progress)?;
        fs::create_dir_all(&self.dir).map_err(HostError::ProgressIo)?;
        let path = self.record_path(key);
        write_atomically(&path, &record).map_err(HostError::ProgressIo)?;
        debug!("progress-file: wrote {} bytes to {}", record.len(), path.display());
        Ok(())
    }
}
