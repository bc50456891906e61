//! Word categories and the flattened view the playback loop consumes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::LibraryError;

/// Ordered words the playback loop cycles through. Implementations must
/// return a stable order between edits.
pub trait WordSource: Send + Sync {
    fn active_words(&self) -> Vec<String>;
}

/// Where an `update_words` edit ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordsUpdate {
    /// Written back to the single selected category.
    Category(String),
    /// Kept as a transient active list, categories untouched.
    Transient,
}

/// Named word categories plus the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordLibrary {
    categories: BTreeMap<String, Vec<String>>,
    selected: BTreeSet<String>,
    // Set by an edit that could not be written back to one category
    transient: Option<Vec<String>>,
}

impl WordLibrary {
    pub fn new(categories: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    pub fn categories(&self) -> &BTreeMap<String, Vec<String>> {
        &self.categories
    }

    pub fn selected(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn add_category(&mut self, name: &str) -> Result<(), LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }
        if self.categories.contains_key(name) {
            return Err(LibraryError::DuplicateCategory(name.to_string()));
        }
        self.categories.insert(name.to_string(), Vec::new());
        Ok(())
    }

    /// Inserts a category from newline-delimited text. Blank lines are dropped.
    /// Returns the number of words stored.
    pub fn import_category(
        &mut self,
        name: &str,
        text: &str,
        replace: bool,
    ) -> Result<usize, LibraryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::EmptyName);
        }
        let words = split_words(text);
        if words.is_empty() {
            return Err(LibraryError::EmptyFile);
        }
        if !replace && self.categories.contains_key(name) {
            return Err(LibraryError::DuplicateCategory(name.to_string()));
        }
        let count = words.len();
        self.categories.insert(name.to_string(), words);
        if self.selected.contains(name) {
            self.transient = None;
        }
        Ok(count)
    }

    /// Deletes every named category, or none of them if any name is unknown.
    pub fn delete_categories<I, S>(&mut self, names: I) -> Result<usize, LibraryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        if let Some(unknown) = names.iter().find(|n| !self.categories.contains_key(n.as_str())) {
            return Err(LibraryError::UnknownCategory(unknown.clone()));
        }
        for name in &names {
            self.categories.remove(name);
            if self.selected.remove(name) {
                self.transient = None;
            }
        }
        Ok(names.len())
    }

    /// Replaces the selection. Unknown names are rejected and leave the
    /// selection unchanged.
    pub fn select<I, S>(&mut self, names: I) -> Result<(), LibraryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected = BTreeSet::new();
        for name in names {
            let name = name.as_ref();
            if !self.categories.contains_key(name) {
                return Err(LibraryError::UnknownCategory(name.to_string()));
            }
            selected.insert(name.to_string());
        }
        self.selected = selected;
        self.transient = None;
        Ok(())
    }

    /// Replaces the active words. With exactly one category selected the
    /// words are stored in it; otherwise they only replace the active list.
    pub fn update_words(&mut self, words: Vec<String>) -> WordsUpdate {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        if self.selected.len() == 1 {
            if let Some(name) = self.selected.iter().next().cloned() {
                self.categories.insert(name.clone(), words);
                self.transient = None;
                return WordsUpdate::Category(name);
            }
        }
        self.transient = Some(words);
        WordsUpdate::Transient
    }

    pub fn active_words(&self) -> Vec<String> {
        if let Some(words) = &self.transient {
            return words.clone();
        }
        // BTreeSet iterates in name order, which fixes the concatenation order
        self.selected
            .iter()
            .filter_map(|name| self.categories.get(name))
            .flatten()
            .cloned()
            .collect()
    }
}

fn split_words(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Library shared between the console and the playback worker.
#[derive(Debug, Clone, Default)]
pub struct SharedLibrary(Arc<RwLock<WordLibrary>>);

impl SharedLibrary {
    pub fn new(library: WordLibrary) -> Self {
        Self(Arc::new(RwLock::new(library)))
    }

    pub fn read<R>(&self, f: impl FnOnce(&WordLibrary) -> R) -> R {
        f(&self.0.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut WordLibrary) -> R) -> R {
        f(&mut self.0.write().unwrap_or_else(PoisonError::into_inner))
    }
}

impl WordSource for SharedLibrary {
    fn active_words(&self) -> Vec<String> {
        self.read(WordLibrary::active_words)
    }
}

impl WordSource for RwLock<Vec<String>> {
    fn active_words(&self) -> Vec<String> {
        self.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn library() -> WordLibrary {
        let mut categories = BTreeMap::new();
        categories.insert("fruit".to_string(), words(&["APPLE", "BANANA"]));
        categories.insert("calm".to_string(), words(&["BREATHE"]));
        categories.insert("bold".to_string(), words(&["DARE", "LEAP"]));
        WordLibrary::new(categories)
    }

    #[test]
    fn nothing_selected_means_no_words() {
        assert!(library().active_words().is_empty());
    }

    #[test]
    fn multiple_categories_concatenate_in_name_order() {
        let mut lib = library();
        lib.select(["fruit", "bold", "calm"]).unwrap();
        assert_eq!(
            lib.active_words(),
            words(&["DARE", "LEAP", "BREATHE", "APPLE", "BANANA"])
        );
    }

    #[test]
    fn selecting_unknown_category_keeps_previous_selection() {
        let mut lib = library();
        lib.select(["fruit"]).unwrap();
        assert_eq!(
            lib.select(["fruit", "nope"]),
            Err(LibraryError::UnknownCategory("nope".to_string()))
        );
        assert_eq!(lib.active_words(), words(&["APPLE", "BANANA"]));
    }

    #[test]
    fn add_rejects_duplicates_and_blank_names() {
        let mut lib = library();
        assert_eq!(lib.add_category("  "), Err(LibraryError::EmptyName));
        assert_eq!(
            lib.add_category("fruit"),
            Err(LibraryError::DuplicateCategory("fruit".to_string()))
        );
        lib.add_category("new").unwrap();
        assert!(lib.categories()["new"].is_empty());
    }

    #[test]
    fn import_strips_blank_lines_and_whitespace() {
        let mut lib = library();
        let count = lib
            .import_category("list", "  ONE \n\n TWO\r\n\t\nTHREE", false)
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(lib.categories()["list"], words(&["ONE", "TWO", "THREE"]));
    }

    #[test]
    fn import_rejects_empty_text_and_unconfirmed_replace() {
        let mut lib = library();
        assert_eq!(lib.import_category("x", "\n  \n", false), Err(LibraryError::EmptyFile));
        assert_eq!(
            lib.import_category("fruit", "KIWI", false),
            Err(LibraryError::DuplicateCategory("fruit".to_string()))
        );
        assert_eq!(lib.import_category("fruit", "KIWI", true), Ok(1));
        assert_eq!(lib.categories()["fruit"], words(&["KIWI"]));
    }

    #[test]
    fn delete_drops_category_from_selection() {
        let mut lib = library();
        lib.select(["fruit", "calm"]).unwrap();
        assert_eq!(lib.delete_categories(["fruit"]), Ok(1));
        assert_eq!(lib.selected().len(), 1);
        assert_eq!(lib.active_words(), words(&["BREATHE"]));
        assert_eq!(
            lib.delete_categories(["fruit"]),
            Err(LibraryError::UnknownCategory("fruit".to_string()))
        );
    }

    #[test]
    fn delete_with_an_unknown_name_deletes_nothing() {
        let mut lib = library();
        assert_eq!(
            lib.delete_categories(["calm", "missing"]),
            Err(LibraryError::UnknownCategory("missing".to_string()))
        );
        assert!(lib.categories().contains_key("calm"));
        assert!(lib.categories().contains_key("fruit"));
    }

    #[test]
    fn single_selection_update_is_written_back() {
        let mut lib = library();
        lib.select(["calm"]).unwrap();
        let outcome = lib.update_words(words(&["REST", " ", "SLOW "]));
        assert_eq!(outcome, WordsUpdate::Category("calm".to_string()));
        assert_eq!(lib.categories()["calm"], words(&["REST", "SLOW"]));
        assert_eq!(lib.active_words(), words(&["REST", "SLOW"]));
    }

    #[test]
    fn multi_selection_update_is_transient() {
        let mut lib = library();
        lib.select(["fruit", "bold"]).unwrap();
        let before = lib.categories().clone();

        assert_eq!(lib.update_words(words(&["ONLY"])), WordsUpdate::Transient);
        assert_eq!(lib.active_words(), words(&["ONLY"]));
        assert_eq!(lib.categories(), &before);

        // A new selection discards the transient list
        lib.select(["fruit"]).unwrap();
        assert_eq!(lib.active_words(), words(&["APPLE", "BANANA"]));
    }

    #[test]
    fn shared_library_reflects_edits() {
        let shared = SharedLibrary::new(library());
        shared.write(|lib| lib.select(["fruit"])).unwrap();
        assert_eq!(shared.active_words().len(), 2);
        shared.write(|lib| lib.update_words(words(&["A", "B", "C"])));
        assert_eq!(shared.active_words().len(), 3);
    }
}
