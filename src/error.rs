use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors returned when re-parsing arguments from a file.
///
/// `E` is the error type of the argument parser; it defaults to
/// [`clap::Error`] since [`ClapParser`](crate::parser::ClapParser) is the
/// parser most hosts plug in.
#[derive(Debug, Error)]
pub enum FileArgsError<E = clap::Error> {
    /// The argument file is missing or could not be read.
    ///
    /// A missing file only reaches the caller when the fallback policy is
    /// [`FallbackPolicy::Fail`](crate::source::FallbackPolicy::Fail).
    #[error("Failed to read argument file '{path}': {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but the parser rejected its tokens.
    #[error("Invalid arguments: {0}")]
    ArgumentSyntax(#[source] E),
}

impl<E> FileArgsError<E> {
    pub(crate) fn source_unavailable(path: &Path, source: io::Error) -> Self {
        Self::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        }
    }

    /// True if this error means the argument file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }

    /// Path of the argument file, for `SourceUnavailable` errors.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceUnavailable { path, .. } => Some(path),
            Self::ArgumentSyntax(_) => None,
        }
    }
}
