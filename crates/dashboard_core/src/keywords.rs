//! Keyword allow-list with a local id cache.
use std::collections::BTreeSet;

pub type KeywordId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub id: KeywordId,
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeywordRejection {
    #[error("keyword is empty")]
    Empty,
    #[error("keyword {0:?} already present")]
    Duplicate(String),
    #[error("keyword {0:?} is not known")]
    Unknown(String),
    #[error("keyword {0:?} is already being removed")]
    RemovalPending(String),
}

/// Words in display order plus the id of each, kept current across add/remove
/// so deletions never need a fresh lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeywordBook {
    entries: Vec<Keyword>,
    pending_adds: BTreeSet<String>,
    pending_removals: BTreeSet<KeywordId>,
}

impl KeywordBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.word.clone()).collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.iter().any(|entry| entry.word == word)
    }

    /// Replaces the cache with the list loaded from the store. Pending work
    /// is kept; its completion reconciles against the new list.
    pub fn replace_all(&mut self, keywords: Vec<Keyword>) {
        let mut seen = BTreeSet::new();
        self.entries = keywords
            .into_iter()
            .filter(|keyword| seen.insert(keyword.word.clone()))
            .collect();
    }

    /// Validates `raw` and marks it in flight. Returns the trimmed word to create.
    pub fn begin_add(&mut self, raw: &str) -> Result<String, KeywordRejection> {
        let word = raw.trim();
        if word.is_empty() {
            return Err(KeywordRejection::Empty);
        }
        if self.contains(word) || self.pending_adds.contains(word) {
            return Err(KeywordRejection::Duplicate(word.to_string()));
        }
        self.pending_adds.insert(word.to_string());
        Ok(word.to_string())
    }

    /// Records a successful create. Returns `true` if the list changed.
    pub fn complete_add(&mut self, keyword: Keyword) -> bool {
        self.pending_adds.remove(&keyword.word);
        if self.contains(&keyword.word) {
            return false;
        }
        self.entries.push(keyword);
        true
    }

    pub fn abort_add(&mut self, word: &str) {
        self.pending_adds.remove(word);
    }

    /// Resolves `word` to its cached id and marks the removal in flight.
    pub fn begin_remove(&mut self, word: &str) -> Result<KeywordId, KeywordRejection> {
        let id = self
            .entries
            .iter()
            .find(|entry| entry.word == word)
            .map(|entry| entry.id)
            .ok_or_else(|| KeywordRejection::Unknown(word.to_string()))?;
        if !self.pending_removals.insert(id) {
            return Err(KeywordRejection::RemovalPending(word.to_string()));
        }
        Ok(id)
    }

    /// Records a successful delete. Returns `true` if the list changed.
    pub fn complete_remove(&mut self, id: KeywordId) -> bool {
        self.pending_removals.remove(&id);
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn abort_remove(&mut self, id: KeywordId) {
        self.pending_removals.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword(id: KeywordId, word: &str) -> Keyword {
        Keyword {
            id,
            word: word.to_string(),
        }
    }

    #[test]
    fn blank_words_are_rejected() {
        let mut book = KeywordBook::new();
        assert_eq!(book.begin_add("   "), Err(KeywordRejection::Empty));
        assert_eq!(book.begin_add(""), Err(KeywordRejection::Empty));
    }

    #[test]
    fn duplicates_are_case_sensitive() {
        let mut book = KeywordBook::new();
        book.replace_all(vec![keyword(1, "Foo")]);

        assert_eq!(
            book.begin_add(" Foo "),
            Err(KeywordRejection::Duplicate("Foo".into()))
        );
        assert_eq!(book.begin_add("foo"), Ok("foo".into()));
    }

    #[test]
    fn in_flight_add_blocks_a_second_add() {
        let mut book = KeywordBook::new();
        assert_eq!(book.begin_add("Foo"), Ok("Foo".into()));
        assert!(book.begin_add("Foo").is_err());

        book.abort_add("Foo");
        assert!(book.begin_add("Foo").is_ok());
    }

    #[test]
    fn remove_uses_cached_id() {
        let mut book = KeywordBook::new();
        book.replace_all(vec![keyword(4, "vacuna"), keyword(9, "ley")]);
        assert!(book.complete_add(keyword(12, "norma")));

        assert_eq!(book.begin_remove("norma"), Ok(12));
        assert_eq!(
            book.begin_remove("norma"),
            Err(KeywordRejection::RemovalPending("norma".into()))
        );
        assert!(book.complete_remove(12));
        assert_eq!(book.words(), vec!["vacuna".to_string(), "ley".to_string()]);
        assert_eq!(
            book.begin_remove("norma"),
            Err(KeywordRejection::Unknown("norma".into()))
        );
    }
}
