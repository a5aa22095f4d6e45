use crate::game::{Grid, GridError};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Error type for level parsing operations.
#[derive(Debug, Error)]
pub enum LevelError {
    /// IO error when reading from file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Invalid board content, with the 1-based level number
    #[error("Invalid level {index}: {source}")]
    InvalidLevel { index: usize, source: GridError },
}

/// A collection of boards read from a single text file.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Grid>,
}

impl Levels {
    /// Parse levels from a string.
    ///
    /// The format uses:
    /// - Lines starting with `;` as level separators/comments
    /// - One board row per line in `W . T B P` markers
    /// - Empty lines between levels (optional)
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current_level = String::new();

        for line in contents.lines() {
            // Comments and blank lines both end the level being read
            if line.trim_start().starts_with(';') || line.trim().is_empty() {
                if !current_level.is_empty() {
                    Self::push_level(&mut levels, &current_level)?;
                    current_level.clear();
                }
                continue;
            }

            current_level.push_str(line);
            current_level.push('\n');
        }

        // Don't forget the last level if file doesn't end with empty line
        if !current_level.is_empty() {
            Self::push_level(&mut levels, &current_level)?;
        }

        Ok(Levels { levels })
    }

    fn push_level(levels: &mut Vec<Grid>, text: &str) -> Result<(), LevelError> {
        let grid = Grid::from_text(text).map_err(|source| LevelError::InvalidLevel {
            index: levels.len() + 1,
            source,
        })?;
        levels.push(grid);
        Ok(())
    }

    /// Parse levels from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Grid> {
        self.levels.get(index)
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
