//! Re-parse command-line arguments from a file.
//!
//! A host program keeps its arguments in a text file, one token per line,
//! and asks for a fresh parse whenever it wants to pick up edits:
//!
//! ```no_run
//! use clap::Parser;
//! use fileargs::{ClapParser, FileArgumentParser, Reparse};
//!
//! #[derive(Parser)]
//! struct Args {
//!     name: String,
//! }
//!
//! let mut reader = FileArgumentParser::new(ClapParser::<Args>::new(), "args.txt");
//! for args in reader.continuous().take(3) {
//!     println!("{}", args?.name);
//! }
//! # Ok::<(), fileargs::FileArgsError>(())
//! ```
//!
//! [`CachedFileArgumentParser`] skips the read and parse while the file's
//! modification time is unchanged.

pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod reader;
pub mod source;

pub use config::{ConfigError, SourceConfig};
pub use error::FileArgsError;
pub use parser::{ArgParser, ClapParser};
pub use reader::{CachedFileArgumentParser, Continuous, FileArgumentParser, Reparse};
pub use source::{split_lines, ArgSource, FallbackPolicy, ModTime};
