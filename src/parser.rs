//! The argument parser seam.
//!
//! Readers never interpret tokens themselves; they hand them to an
//! [`ArgParser`]. [`ClapParser`] adapts any `clap` derive type.

use std::ffi::OsString;
use std::fmt;
use std::marker::PhantomData;

use clap::Parser;

/// Turns an ordered token list into a structured result.
pub trait ArgParser {
    type Output;
    type Error;

    /// Parse `args`, or the parser's own default argument source when
    /// `args` is `None`.
    ///
    /// When `prepopulated` is given, values not mentioned by the tokens keep
    /// the prepopulated values.
    fn parse(
        &self,
        args: Option<Vec<String>>,
        prepopulated: Option<Self::Output>,
    ) -> Result<Self::Output, Self::Error>;
}

/// [`ArgParser`] backed by a `clap::Parser` type.
///
/// File tokens are parsed as if they followed the binary name on the
/// command line. With no tokens the real process arguments are used, or the
/// replacement set with [`with_process_args`](Self::with_process_args).
pub struct ClapParser<T> {
    process_args: Option<Vec<OsString>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Parser> ClapParser<T> {
    pub fn new() -> Self {
        Self {
            process_args: None,
            _marker: PhantomData,
        }
    }

    /// Replace `std::env::args_os()` as the fallback argument list.
    ///
    /// The first element is the binary name, as with real process arguments.
    pub fn with_process_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.process_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    fn full_args(&self, args: Option<Vec<String>>) -> Vec<OsString> {
        match args {
            Some(tokens) => {
                let bin_name = T::command().get_name().to_string();
                std::iter::once(OsString::from(bin_name))
                    .chain(tokens.into_iter().map(OsString::from))
                    .collect()
            }
            None => match &self.process_args {
                Some(process_args) => process_args.clone(),
                None => std::env::args_os().collect(),
            },
        }
    }
}

impl<T> fmt::Debug for ClapParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClapParser")
            .field("process_args", &self.process_args)
            .finish()
    }
}

impl<T: Parser> Default for ClapParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Parser> ArgParser for ClapParser<T> {
    type Output = T;
    type Error = clap::Error;

    fn parse(&self, args: Option<Vec<String>>, prepopulated: Option<T>) -> Result<T, clap::Error> {
        let full_args = self.full_args(args);
        match prepopulated {
            Some(mut value) => {
                value.try_update_from(full_args)?;
                Ok(value)
            }
            None => T::try_parse_from(full_args),
        }
    }
}
