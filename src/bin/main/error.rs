use std::{fmt, io, path::PathBuf};

use cadence_core::{document::DocumentError, progress::ProgressCodecError};

#[derive(Debug)]
pub(super) enum HostError {
    Read { path: PathBuf, source: io::Error },
    Document(DocumentError),
    ProgressIo(io::Error),
    ProgressCodec(ProgressCodecError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            Self::Document(err) => write!(f, "{err}"),
            Self::ProgressIo(err) => write!(f, "progress store: {err}"),
            Self::ProgressCodec(err) => write!(f, "progress store: {err}"),
        }
    }
}

impl std::error::Error for HostError {}

impl From<DocumentError> for HostError {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}

impl From<ProgressCodecError> for HostError {
    fn from(err: ProgressCodecError) -> Self {
        Self::ProgressCodec(err)
    }
}
