
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

use crate::config::ConfigError;

/// Configuration for content chunking. Sizes are in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window length
    pub chunk_size: usize,
    /// Characters shared by consecutive windows
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 120,
        }
    }
}

impl ChunkingConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }

        if self.overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge(self.overlap, self.chunk_size));
        }

        Ok(())
    }
}

/// Splits text into fixed-size, overlapping character windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextChunker {
    #[inline]
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        }
    }
}

impl TextChunker {
    #[inline]
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ConfigError> {
        Self::from_config(&ChunkingConfig {
            chunk_size,
            overlap,
        })
    }

    #[inline]
    pub fn from_config(config: &ChunkingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            chunk_size: config.chunk_size,
            overlap: config.overlap,
        })
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[inline]
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Distance between the starts of consecutive windows
    #[inline]
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Lazily iterate over the windows of `text`.
    ///
    /// The iterator is `Clone`, so a sequence can be replayed from any point, and
    /// calling `chunks` again on the same text yields the same windows.
    #[inline]
    pub fn chunks<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            text,
            byte_start: 0,
            chunk_size: self.chunk_size,
            stride: self.stride(),
            finished: text.is_empty(),
        }
    }

    /// Number of windows produced for a text of `char_len` characters
    #[inline]
    pub fn chunk_count(&self, char_len: usize) -> usize {
        match char_len {
            0 => 0,
            len if len <= self.chunk_size => 1,
            len => (len - self.overlap).div_ceil(self.stride()),
        }
    }
}

/// Iterator over the windows produced by [`TextChunker::chunks`]
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    byte_start: usize,
    chunk_size: usize,
    stride: usize,
    finished: bool,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(rest) = self.text.get(self.byte_start..).filter(|rest| !rest.is_empty()) else {
            self.finished = true;
            return None;
        };

        // A character at index `chunk_size` means the text continues past this window
        let end = match rest.char_indices().nth(self.chunk_size) {
            Some((offset, _)) => self.byte_start + offset,
            None => {
                self.finished = true;
                self.text.len()
            }
        };

        let window = self.text.get(self.byte_start..end);

        if !self.finished {
            match rest.char_indices().nth(self.stride) {
                Some((offset, _)) => self.byte_start += offset,
                None => self.finished = true,
            }
        }

        window
    }
}

impl FusedIterator for Chunks<'_> {}
