//! Readers that re-parse arguments from a file on demand.
//!
//! ```text
//! path → read lines → ArgParser → result
//! ```
//!
//! [`FileArgumentParser`] reads the file on every call.
//! [`CachedFileArgumentParser`] re-reads only when the file's modification
//! time changes. Both implement [`Reparse`], which offers a single parse and
//! an endless stream of parses.

mod cached;
mod file;

use std::iter::FusedIterator;

pub use cached::CachedFileArgumentParser;
pub use file::FileArgumentParser;

/// Something that can produce a fresh parse result each time it is asked.
pub trait Reparse {
    type Item;
    type Error;

    /// Parse the current file content once.
    fn parse_once(&mut self) -> Result<Self::Item, Self::Error>;

    /// Endless lazy stream of parses, one [`parse_once`](Self::parse_once)
    /// per `next()`.
    ///
    /// The stream never ends on its own; bound it with `take`, `take_while`
    /// or a `break`.
    fn continuous(&mut self) -> Continuous<'_, Self>
    where
        Self: Sized,
    {
        Continuous { reader: self }
    }
}

/// Iterator returned by [`Reparse::continuous`].
#[derive(Debug)]
pub struct Continuous<'a, R> {
    reader: &'a mut R,
}

impl<R: Reparse> Iterator for Continuous<'_, R> {
    type Item = Result<R::Item, R::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.reader.parse_once())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: Reparse> FusedIterator for Continuous<'_, R> {}
