//! Providers of raw level text.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::LevelError;

/// Supplies the raw text of a level resource.
pub trait LevelSource {
    /// Returns the text of `level`, or an error when it cannot be obtained.
    fn load_level_text(&self, level: u32) -> Result<String, LevelError>;
}

impl<S> LevelSource for &S
where
    S: LevelSource + ?Sized,
{
    fn load_level_text(&self, level: u32) -> Result<String, LevelError> {
        (**self).load_level_text(level)
    }
}

/// Conventional resource name of a level file.
#[must_use]
pub fn resource_name(level: u32) -> String {
    format!("level{level}.txt")
}

/// Level source backed by a directory of `level<N>.txt` files.
#[derive(Clone, Debug)]
pub struct LevelDirectory {
    root: PathBuf,
}

impl LevelDirectory {
    /// Creates a source reading levels from `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the levels are read from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the file holding `level`.
    #[must_use]
    pub fn path_for(&self, level: u32) -> PathBuf {
        self.root.join(resource_name(level))
    }
}

impl LevelSource for LevelDirectory {
    fn load_level_text(&self, level: u32) -> Result<String, LevelError> {
        let path = self.path_for(level);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                Err(LevelError::NotFound { level })
            }
            Err(source) => Err(LevelError::Unreadable {
                level,
                path,
                source,
            }),
        }
    }
}

/// Level source holding level text in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLevels {
    levels: BTreeMap<u32, String>,
}

impl InMemoryLevels {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `text` as the content of `level`, replacing any previous text.
    #[must_use]
    pub fn with_level(mut self, level: u32, text: impl Into<String>) -> Self {
        self.insert(level, text);
        self
    }

    /// Stores `text` as the content of `level`, replacing any previous text.
    pub fn insert(&mut self, level: u32, text: impl Into<String>) {
        let _ = self.levels.insert(level, text.into());
    }
}

impl LevelSource for InMemoryLevels {
    fn load_level_text(&self, level: u32) -> Result<String, LevelError> {
        self.levels
            .get(&level)
            .cloned()
            .ok_or(LevelError::NotFound { level })
    }
}
