use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::FileArgsError;
use crate::parser::ArgParser;
use crate::reader::{FileArgumentParser, Reparse};
use crate::source::{ArgSource, FallbackPolicy, ModTime};

/// Parses arguments from a file, re-reading only when its modification time
/// changes.
///
/// Every call still queries the file's metadata. Content is read and parsed
/// only when there is no cached result or the timestamp differs from the one
/// seen at the last successful parse.
///
/// Filesystem timestamps are coarse. Two writes within one timestamp quantum
/// look identical, so the second write is picked up only once a later write
/// moves the timestamp.
pub struct CachedFileArgumentParser<P: ArgParser> {
    inner: FileArgumentParser<P>,
    last_modified: ModTime,
    cached: Option<Arc<P::Output>>,
}

impl<P: ArgParser> CachedFileArgumentParser<P> {
    pub fn new(parser: P, path: impl Into<PathBuf>) -> Self {
        Self::from_source(parser, ArgSource::new(path))
    }

    pub fn from_source(parser: P, source: ArgSource) -> Self {
        Self {
            inner: FileArgumentParser::from_source(parser, source),
            last_modified: ModTime::Missing,
            cached: None,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.inner.set_fallback(fallback);
        self
    }

    /// Return the cached result, or re-read and parse if the file changed.
    ///
    /// `prepopulated` is only used when a re-parse happens. A failed re-parse
    /// clears the cache, so the next call reads the file again instead of
    /// serving the stale result.
    pub fn parse_args(
        &mut self,
        prepopulated: Option<P::Output>,
    ) -> Result<Arc<P::Output>, FileArgsError<P::Error>> {
        let modified = self.inner.source().modified::<P::Error>()?;

        if modified == self.last_modified {
            if let Some(cached) = &self.cached {
                tracing::trace!(path = %self.path().display(), "Argument file unchanged");
                return Ok(Arc::clone(cached));
            }
        }

        tracing::debug!(
            path = %self.path().display(),
            cached = self.cached.is_some(),
            "Argument file changed, re-parsing"
        );
        self.invalidate();

        let parsed = Arc::new(self.inner.parse_args(prepopulated)?);
        self.last_modified = modified;
        self.cached = Some(Arc::clone(&parsed));
        Ok(parsed)
    }

    /// Forget the cached result so the next call re-reads the file.
    pub fn invalidate(&mut self) {
        self.last_modified = ModTime::Missing;
        self.cached = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Point at a different file. The cache is dropped.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.inner.set_path(path);
        self.invalidate();
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.inner.fallback()
    }

    pub fn set_fallback(&mut self, fallback: FallbackPolicy) {
        self.inner.set_fallback(fallback);
    }

    pub fn source(&self) -> &ArgSource {
        self.inner.source()
    }

    pub fn parser(&self) -> &P {
        self.inner.parser()
    }
}

impl<P> fmt::Debug for CachedFileArgumentParser<P>
where
    P: ArgParser + fmt::Debug,
    P::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFileArgumentParser")
            .field("inner", &self.inner)
            .field("last_modified", &self.last_modified)
            .field("cached", &self.cached)
            .finish()
    }
}

impl<P: ArgParser> Reparse for CachedFileArgumentParser<P> {
    type Item = Arc<P::Output>;
    type Error = FileArgsError<P::Error>;

    fn parse_once(&mut self) -> Result<Arc<P::Output>, FileArgsError<P::Error>> {
        self.parse_args(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs::{self, OpenOptions};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// Echo parser that counts invocations.
    #[derive(Debug, Default)]
    struct Counting {
        calls: Cell<usize>,
    }

    impl ArgParser for Counting {
        type Output = Vec<String>;
        type Error = String;

        fn parse(
            &self,
            args: Option<Vec<String>>,
            _prepopulated: Option<Vec<String>>,
        ) -> Result<Vec<String>, String> {
            self.calls.set(self.calls.get() + 1);
            match args {
                Some(args) if args.iter().any(|a| a == "--bad") => Err("bad flag".into()),
                Some(args) => Ok(args),
                None => Ok(vec!["<process>".into()]),
            }
        }
    }

    fn write_at(path: &Path, content: &str, secs: u64) {
        fs::write(path, content).unwrap();
        let file = OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn unchanged_file_is_parsed_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("args.txt");
        write_at(&path, "abc123\n", 1_000);

        let mut reader = CachedFileArgumentParser::new(Counting::default(), &path);
        let first = reader.parse_once().unwrap();
        let second = reader.parse_once().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, vec!["abc123"]);
        assert_eq!(reader.parser().calls.get(), 1);
    }

    #[test]
    fn cache_hit_ignores_prepopulated_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("args.txt");
        write_at(&path, "abc123\n", 1_000);

        let mut reader = CachedFileArgumentParser::new(Counting::default(), &path);
        let first = reader.parse_args(None).unwrap();
        let second = reader.parse_args(Some(vec!["ignored".into()])).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, vec!["abc123"]);
        assert_eq!(reader.parser().calls.get(), 1);
    }

    #[test]
    fn debug_shows_cache_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("args.txt");
        write_at(&path, "abc123\n", 1_000);

        let mut reader = CachedFileArgumentParser::new(Counting::default(), &path);
        assert!(format!("{:?}", reader).contains("cached: None"));
        reader.parse_once().unwrap();
        let debug = format!("{:?}", reader);
        assert!(debug.starts_with("CachedFileArgumentParser"));
        assert!(debug.contains("abc123"));
        assert!(debug.contains("last_modified: At("));
    }

    #[test]
    fn content_change_without_timestamp_change_is_not_seen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("args.txt");
        write_at(&path, "0\n", 1_000);

        let mut reader = CachedFileArgumentParser::new(Counting::default(), &path);
        assert_eq!(*reader.parse_once().unwrap(), vec!["0"]);

        write_at(&path, "1\n", 1_000);
        assert_eq!(*reader.parse_once().unwrap(), vec!["0"]);

        write_at(&path, "1\n", 1_001);
        assert_eq!(*reader.parse_once().unwrap(), vec!["1"]);
        assert_eq!(reader.parser().calls.get(), 2);
    }

    #[test]
    fn missing_file_without_fallback_fails() {
        let dir = TempDir::new().unwrap();
        let mut reader =
            CachedFileArgumentParser::new(Counting::default(), dir.path().join("missing.txt"));

        assert!(reader.parse_once().unwrap_err().is_not_found());
        assert_eq!(reader.parser().calls.get(), 0);
    }

    #[test]
    fn missing_file_with_fallback_is_cached() {
        let dir = TempDir::new().unwrap();
        let mut reader =
            CachedFileArgumentParser::new(Counting::default(), dir.path().join("missing.txt"))
                .with_fallback(FallbackPolicy::UseProcessArgs);

        let first = reader.parse_once().unwrap();
        let second = reader.parse_once().unwrap();
        assert_eq!(*first, vec!["<process>"]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reader.parser().calls.get(), 1);
    }

    #[test]
    fn delete_and_recreate_invalidates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("args.txt");
        write_at(&path, "0\n", 1_000);

        let mut reader = CachedFileArgumentParser::new(Counting::default(), &path)
            .with_fallback(FallbackPolicy::UseProcessArgs);
        assert_eq!(*reader.parse_once().unwrap(), vec!["0"]);

        fs::remove_file(&path).unwrap();
        assert_eq!(*reader.parse_once().unwrap(), vec!["<process>"]);

        write_at(&path, "1\n", 2_000);
        assert_eq!(*reader.parse_once().unwrap(), vec!["1"]);
    }

    #[test]
    fn syntax_error_is_not_masked_by_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("args.txt");
        write_at(&path, "good\n", 1_000);

        let mut reader = CachedFileArgumentParser::new(Counting::default(), &path);
        assert_eq!(*reader.parse_once().unwrap(), vec!["good"]);

        write_at(&path, "--bad\n", 1_001);
        assert!(matches!(
            reader.parse_once(),
            Err(FileArgsError::ArgumentSyntax(_))
        ));
        assert!(!reader.is_cached());
        assert!(matches!(
            reader.parse_once(),
            Err(FileArgsError::ArgumentSyntax(_))
        ));
    }

    #[test]
    fn invalidate_forces_reparse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("args.txt");
        write_at(&path, "x\n", 1_000);

        let mut reader = CachedFileArgumentParser::new(Counting::default(), &path);
        let first = reader.parse_once().unwrap();
        reader.invalidate();
        assert!(!reader.is_cached());
        let second = reader.parse_once().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
        assert_eq!(reader.parser().calls.get(), 2);
    }

    #[test]
    fn set_path_drops_cache() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        write_at(&first, "one\n", 1_000);
        write_at(&second, "two\n", 1_000);

        let mut reader = CachedFileArgumentParser::new(Counting::default(), &first);
        assert_eq!(*reader.parse_once().unwrap(), vec!["one"]);
        reader.set_path(&second);
        assert_eq!(*reader.parse_once().unwrap(), vec!["two"]);
    }
}
