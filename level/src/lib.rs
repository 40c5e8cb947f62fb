#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level interpretation for Marble Maze.
//!
//! Levels are plain-text grids where every character is one tile. The
//! [`parse_level`] entry point turns the text into a [`LevelLayout`] of typed,
//! positioned descriptors, while [`LevelSource`] implementations supply the
//! raw text for a level index. Any failure here is fatal for the run: shipped
//! levels are static data, so there is nothing to retry.

mod parser;
mod source;

use std::{io, path::PathBuf};

use marble_maze_core::LevelLayout;
use thiserror::Error;

pub use self::parser::{parse_level, EMPTY_SYMBOL};
pub use self::source::{resource_name, InMemoryLevels, LevelDirectory, LevelSource};

/// Errors raised while obtaining or interpreting level text.
#[derive(Debug, Error)]
pub enum LevelError {
    /// No resource exists for the requested level.
    #[error("could not find level{level}.txt")]
    NotFound {
        /// Index of the missing level.
        level: u32,
    },
    /// The level resource exists but could not be read.
    #[error("could not load level {level} from {}", .path.display())]
    Unreadable {
        /// Index of the level being read.
        level: u32,
        /// Location of the resource.
        path: PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The level text contains a symbol that maps to no entity kind.
    #[error("unknown level symbol {symbol:?} in level {level} at line {line}, column {column}")]
    UnknownSymbol {
        /// Index of the malformed level.
        level: u32,
        /// Offending symbol.
        symbol: char,
        /// One-based line number within the level text.
        line: usize,
        /// Zero-based grid column of the symbol.
        column: u32,
        /// Zero-based grid row of the symbol, counted from the bottom.
        row: u32,
    },
}

/// Loads the text for `level` from `source` and parses it.
pub fn load_layout<S>(source: &S, level: u32) -> Result<LevelLayout, LevelError>
where
    S: LevelSource + ?Sized,
{
    let text = source.load_level_text(level)?;
    parse_level(&text, level)
}
