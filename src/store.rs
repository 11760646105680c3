//! Word store: the ordered, immutable word list served by the page server.
//!
//! The source is a comma-delimited token stream.  Each token is trimmed of
//! surrounding whitespace and empty tokens are discarded, so
//! `"a, b,,c\n"` loads as `["a", "b", "c"]`.  Line breaks are removed before
//! splitting, so a file spread over several lines loads as one stream and no
//! word can carry the protocol's line terminator.
//!
//! A [`WordList`] is never mutated after load; the server shares it between
//! connection tasks behind an `Arc` without any lock.

use std::fs;
use std::ops::Index;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to read the word-list source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read word list {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered sequence of words, indices `0..len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Read and parse the word file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let list = Self::parse(&text);
        log::debug!("[store] loaded {} words from {}", list.len(), path.display());
        Ok(list)
    }

    /// Strip line breaks, then split `text` on commas, trimming each token
    /// and dropping empty ones.
    pub fn parse(text: &str) -> Self {
        let text: String = text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
        let words = text
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_owned)
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }
}

impl From<Vec<String>> for WordList {
    fn from(words: Vec<String>) -> Self {
        Self { words }
    }
}

impl<'a> FromIterator<&'a str> for WordList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(str::to_owned).collect(),
        }
    }
}

impl Index<usize> for WordList {
    type Output = str;

    fn index(&self, i: usize) -> &str {
        &self.words[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_trims_and_drops_empty_tokens() {
        let list = WordList::parse(" a, b,,c \n, ,d\n");
        assert_eq!(list.as_slice(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn parse_joins_lines_before_splitting() {
        let list = WordList::parse("a,b\nc,d\r\ne,\nf");
        assert_eq!(list.as_slice(), ["a", "bc", "de", "f"]);
        assert!(list
            .as_slice()
            .iter()
            .all(|w| !w.contains(|c: char| c == '\n' || c == '\r')));
    }

    #[test]
    fn parse_empty_source_gives_empty_list() {
        assert!(WordList::parse("").is_empty());
        assert!(WordList::parse(" , ,\n").is_empty());
    }

    #[test]
    fn parse_keeps_duplicates_in_order() {
        let list = WordList::parse("cat,dog,cat");
        assert_eq!(list.len(), 3);
        assert_eq!(&list[0], "cat");
        assert_eq!(&list[2], "cat");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "alpha,beta,\ngamma").unwrap();
        let list = WordList::load(file.path()).unwrap();
        assert_eq!(list.as_slice(), ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = WordList::load(&missing).unwrap_err();
        assert!(matches!(err, LoadError::Unreadable { ref path, .. } if *path == missing));
        assert!(err.to_string().contains("nope.txt"));
    }
}
