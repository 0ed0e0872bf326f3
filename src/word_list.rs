//! `word_list` — Module to load the input word list for the solver.
//!
//! The input format is one candidate word per line. This module is the word
//! source the solver consumes through a narrow interface: it trims each line
//! and drops blank ones, handing over exactly the non-blank tokens the solver
//! expects. No other validation happens here — any token is accepted as-is,
//! and duplicate lines are kept (each occurrence is a word the solver must
//! place).
//!
//! File order is preserved; the solver reorders words itself during
//! preprocessing.
//!
//! The public API provides:
//! - `parse_from_str(...)` — parse in-memory contents.
//! - `load_from_path(...)` — convenience method to read from a file path.

/// Struct representing a ready-to-solve word list.
#[derive(Debug, Clone)]
pub struct WordList {
    /// Trimmed, non-blank words in file order.
    pub words: Vec<String>,
}

impl WordList {
    /// Parse a raw word list from an in-memory string: one word per line,
    /// surrounding whitespace trimmed, blank lines skipped.
    #[must_use]
    pub fn parse_from_str(contents: &str) -> WordList {
        let words = contents
            .lines()
            .filter_map(|raw_line| {
                let line = raw_line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.to_string())
                }
            })
            .collect();

        WordList { words }
    }

    /// Read a word list from a file path and parse it.
    ///
    /// # Errors
    ///
    /// Will return an `Error` if unable to read a file at `path`; the message
    /// names the path.
    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<WordList> {
        let path_ref = path.as_ref();

        let data = std::fs::read_to_string(path_ref).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read word list from '{}': {}", path_ref.display(), e),
            )
        })?;

        Ok(Self::parse_from_str(&data))
    }
}
