//! Prepared text blocks for repeated evaluation.

use hashbrown::HashSet;

/// A block of text prepared for matching.
///
/// Holds the raw text for pattern searches and the set of unique words for
/// exact lookups. Words are the runs of ASCII letters and digits left after
/// every other character is treated as a separator; case is preserved.
///
/// Build one index and reuse it to match many expressions against the same
/// text.
///
/// # Examples
/// ```
/// use rematch::TextIndex;
/// let text = TextIndex::new("python, go, golang!");
/// assert!(text.contains_word("golang"));
/// assert!(!text.contains_word("golang!"));
/// assert_eq!(text.raw(), "python, go, golang!");
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    raw: String,
    words: HashSet<String>,
}

impl TextIndex {
    /// Index a block of text.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let words = raw
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_owned)
            .collect();
        Self { raw, words }
    }

    /// The text as given.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether `word` is one of the unique words of the text.
    #[must_use]
    pub fn contains_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of unique words.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Iterate over the unique words in unspecified order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl From<&str> for TextIndex {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for TextIndex {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
