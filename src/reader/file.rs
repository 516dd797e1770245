use std::path::{Path, PathBuf};

use crate::error::FileArgsError;
use crate::parser::ArgParser;
use crate::reader::Reparse;
use crate::source::{ArgSource, FallbackPolicy};

/// Parses arguments from a file, reading it again on every call.
///
/// Each line of the file is one argument token.
#[derive(Debug)]
pub struct FileArgumentParser<P> {
    parser: P,
    source: ArgSource,
}

impl<P: ArgParser> FileArgumentParser<P> {
    /// Create a reader for `path`. A missing file is an error until
    /// [`with_fallback`](Self::with_fallback) says otherwise.
    pub fn new(parser: P, path: impl Into<PathBuf>) -> Self {
        Self::from_source(parser, ArgSource::new(path))
    }

    pub fn from_source(parser: P, source: ArgSource) -> Self {
        Self { parser, source }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.source.set_fallback(fallback);
        self
    }

    /// Read the file and parse its lines.
    ///
    /// `prepopulated` is handed to the parser untouched; fields the file does
    /// not mention keep its values.
    pub fn parse_args(
        &self,
        prepopulated: Option<P::Output>,
    ) -> Result<P::Output, FileArgsError<P::Error>> {
        let args = self.source.read_args::<P::Error>()?;
        self.parser
            .parse(args, prepopulated)
            .map_err(FileArgsError::ArgumentSyntax)
    }

    pub fn path(&self) -> &Path {
        self.source.path()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.source.set_path(path);
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.source.fallback()
    }

    pub fn set_fallback(&mut self, fallback: FallbackPolicy) {
        self.source.set_fallback(fallback);
    }

    pub fn source(&self) -> &ArgSource {
        &self.source
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }
}

impl<P: ArgParser> Reparse for FileArgumentParser<P> {
    type Item = P::Output;
    type Error = FileArgsError<P::Error>;

    fn parse_once(&mut self) -> Result<P::Output, FileArgsError<P::Error>> {
        self.parse_args(None)
    }
}
