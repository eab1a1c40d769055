//! Catalogue sequences (jutsu)

use serde::{Deserialize, Serialize};

use crate::types::SymbolId;

/// One recognizable sign sequence with per-language display strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEntry {
    /// Category per language (e.g. "火遁"); empty strings mean none
    #[serde(default)]
    pub category: Vec<String>,
    /// Name per language
    pub names: Vec<String>,
    /// The sign pattern, in performing order
    pub symbols: Vec<SymbolId>,
}

impl SequenceEntry {
    /// Category in the given language. The native column decides whether
    /// the entry has a category at all.
    pub fn category(&self, language: usize) -> Option<&str> {
        self.category.first().filter(|native| !native.is_empty())?;
        self.category
            .get(language)
            .or_else(|| self.category.first())
            .map(String::as_str)
    }

    pub fn name(&self, language: usize) -> &str {
        self.names
            .get(language)
            .or_else(|| self.names.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Name as shown on screen: `category{sep}name`, or the name alone
    pub fn display_name(&self, language: usize, separator: &str) -> String {
        match self.category(language) {
            Some(category) => format!("{}{}{}", category, separator, self.name(language)),
            None => self.name(language).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fireball() -> SequenceEntry {
        SequenceEntry {
            category: vec!["火遁".into(), "Fire Style".into()],
            names: vec!["豪火球の術".into(), "Fireball Jutsu".into()],
            symbols: vec![SymbolId(5), SymbolId(7)],
        }
    }

    #[test]
    fn test_display_name_with_category() {
        assert_eq!(fireball().display_name(0, "・"), "火遁・豪火球の術");
        assert_eq!(fireball().display_name(1, ": "), "Fire Style: Fireball Jutsu");
    }

    #[test]
    fn test_display_name_without_category() {
        let entry = SequenceEntry {
            category: vec![String::new(), String::new()],
            names: vec!["千鳥".into(), "Chidori".into()],
            symbols: vec![SymbolId(1)],
        };
        assert_eq!(entry.display_name(0, "・"), "千鳥");
        assert_eq!(entry.display_name(1, "・"), "Chidori");
    }

    #[test]
    fn test_native_column_decides_category() {
        let translated_only = SequenceEntry {
            category: vec![String::new(), "Lightning".into()],
            names: vec!["千鳥".into(), "Chidori".into()],
            symbols: vec![SymbolId(1)],
        };
        assert_eq!(translated_only.category(1), None);
        assert_eq!(translated_only.display_name(1, "・"), "Chidori");

        let native_only = SequenceEntry {
            category: vec!["雷遁".into(), String::new()],
            ..translated_only
        };
        assert_eq!(native_only.category(1), Some(""));
        assert_eq!(native_only.display_name(1, "・"), "・Chidori");
    }
}
