//! Argument file access.
//!
//! An [`ArgSource`] names the file to read and decides what a missing file
//! means. Reading produces one token per line, or `None` when the file is
//! absent and the fallback policy hands control back to process arguments.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::FileArgsError;

/// What to do when the argument file does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Report the missing file as [`FileArgsError::SourceUnavailable`].
    #[default]
    Fail,
    /// Parse as if no argument list was given, so the parser falls back to
    /// the real process arguments.
    UseProcessArgs,
}

/// Modification time of the argument file as last observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModTime {
    /// Never read, or absent while fallback is enabled.
    #[default]
    Missing,
    At(SystemTime),
}

/// Location of an argument file plus its missing-file policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSource {
    path: PathBuf,
    fallback: FallbackPolicy,
}

impl ArgSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback: FallbackPolicy::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point at a different file. Takes effect on the next read.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    pub fn set_fallback(&mut self, fallback: FallbackPolicy) {
        self.fallback = fallback;
    }

    /// Read the file and split it into argument tokens.
    ///
    /// Returns `Ok(None)` only when the file is missing and the policy is
    /// [`FallbackPolicy::UseProcessArgs`]. Any other I/O failure, including
    /// non UTF-8 content, is a `SourceUnavailable` error.
    pub fn read_args<E>(&self) -> Result<Option<Vec<String>>, FileArgsError<E>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let args = split_lines(&content);
                tracing::debug!(
                    path = %self.path.display(),
                    count = args.len(),
                    "Read argument file"
                );
                Ok(Some(args))
            }
            Err(e) => self.on_missing(e).map(|()| None),
        }
    }

    /// Query the file's modification time without reading its content.
    pub fn modified<E>(&self) -> Result<ModTime, FileArgsError<E>> {
        match fs::metadata(&self.path).and_then(|meta| meta.modified()) {
            Ok(time) => Ok(ModTime::At(time)),
            Err(e) => self.on_missing(e).map(|()| ModTime::Missing),
        }
    }

    fn on_missing<E>(&self, e: io::Error) -> Result<(), FileArgsError<E>> {
        if e.kind() == io::ErrorKind::NotFound && self.fallback == FallbackPolicy::UseProcessArgs {
            tracing::debug!(
                path = %self.path.display(),
                "Argument file missing, falling back to process arguments"
            );
            return Ok(());
        }
        Err(FileArgsError::source_unavailable(&self.path, e))
    }
}

/// Split file content into lines.
///
/// `\r\n` and every Unicode line boundary end a line: `\n`, `\r`, `\x0b`,
/// `\x0c`, `\x1c`, `\x1d`, `\x1e`, `\u{85}`, `\u{2028}` and `\u{2029}`. A
/// trailing terminator does not produce an empty final token; blank lines in
/// the middle do.
pub fn split_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        match rest.char_indices().find(|&(_, c)| is_line_boundary(c)) {
            Some((idx, c)) => {
                lines.push(rest[..idx].to_string());
                let skip = if rest[idx..].starts_with("\r\n") {
                    2
                } else {
                    c.len_utf8()
                };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }

    lines
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}
