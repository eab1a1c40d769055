//! Symbol and sequence catalogues
//!
//! Loaded once, validated as a whole, immutable afterwards. Every sequence is
//! flattened to its primary-label string at load time; the matcher compares
//! against those strings.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CatalogueError;
use crate::types::{SequenceEntry, Symbol, SymbolId};

/// Catalogue embedded in the binary (twelve zodiac seals + 壬 + 合掌)
const BUILTIN_CATALOGUE: &str = include_str!("../../data/catalogue.json");

/// On-disk catalogue shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogueFile {
    languages: Vec<String>,
    symbols: Vec<Symbol>,
    sequences: Vec<RawSequence>,
}

/// Sequence row before its ids are checked
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSequence {
    #[serde(default)]
    category: Vec<String>,
    names: Vec<String>,
    symbols: Vec<u32>,
}

/// Validated symbol + sequence catalogue
#[derive(Debug, Clone)]
pub struct Catalogue {
    languages: Vec<String>,
    symbols: Vec<Symbol>,
    sequences: Vec<SequenceEntry>,
    /// Flattened primary labels per sequence
    patterns: Vec<String>,
}

impl Catalogue {
    /// Parse and validate a JSON catalogue
    pub fn from_json_str(json: &str) -> Result<Self, CatalogueError> {
        let file: CatalogueFile = serde_json::from_str(json)?;
        Self::validate(file)
    }

    /// Load a JSON catalogue from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The embedded default catalogue
    pub fn builtin() -> Result<Self, CatalogueError> {
        Self::from_json_str(BUILTIN_CATALOGUE)
    }

    /// Start building a catalogue in code
    pub fn builder<S: AsRef<str>>(languages: &[S]) -> CatalogueBuilder {
        CatalogueBuilder {
            file: CatalogueFile {
                languages: languages.iter().map(|l| l.as_ref().to_string()).collect(),
                symbols: Vec::new(),
                sequences: Vec::new(),
            },
        }
    }

    fn validate(file: CatalogueFile) -> Result<Self, CatalogueError> {
        let expected = file.languages.len();
        if expected == 0 {
            return Err(CatalogueError::NoLanguages);
        }
        if file.symbols.is_empty() {
            return Err(CatalogueError::NoSymbols);
        }
        if file.symbols.len() > u16::MAX as usize + 1 {
            return Err(CatalogueError::TooManySymbols(file.symbols.len()));
        }

        for (symbol, entry) in file.symbols.iter().enumerate() {
            if entry.labels.len() != expected {
                return Err(CatalogueError::SymbolLabelCount {
                    symbol,
                    found: entry.labels.len(),
                    expected,
                });
            }
            if entry.primary().is_empty() {
                return Err(CatalogueError::EmptySymbolLabel { symbol });
            }
        }

        let mut sequences = Vec::with_capacity(file.sequences.len());
        for (sequence, raw) in file.sequences.into_iter().enumerate() {
            if raw.names.len() != expected {
                return Err(CatalogueError::SequenceNameCount {
                    sequence,
                    found: raw.names.len(),
                    expected,
                });
            }
            if !raw.category.is_empty() && raw.category.len() != expected {
                return Err(CatalogueError::SequenceCategoryCount {
                    sequence,
                    found: raw.category.len(),
                    expected,
                });
            }
            if raw.symbols.is_empty() {
                return Err(CatalogueError::EmptySequence { sequence });
            }

            let mut symbols = Vec::with_capacity(raw.symbols.len());
            for &symbol in &raw.symbols {
                if symbol as usize >= file.symbols.len() {
                    return Err(CatalogueError::UnknownSymbol { sequence, symbol });
                }
                symbols.push(SymbolId(symbol as u16));
            }

            sequences.push(SequenceEntry {
                category: raw.category,
                names: raw.names,
                symbols,
            });
        }

        let mut catalogue = Self {
            languages: file.languages,
            symbols: file.symbols,
            sequences,
            patterns: Vec::new(),
        };
        catalogue.patterns = catalogue
            .sequences
            .iter()
            .map(|entry| catalogue.flatten(entry.symbols.iter().copied()))
            .collect();
        Ok(catalogue)
    }

    /// Map a raw oracle class id onto the catalogue
    pub fn symbol_id(&self, raw: u32) -> Option<SymbolId> {
        ((raw as usize) < self.symbols.len()).then(|| SymbolId(raw as u16))
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Find a symbol by any of its labels (ASCII case-insensitive)
    pub fn lookup_label(&self, label: &str) -> Option<SymbolId> {
        self.symbols
            .iter()
            .position(|s| s.labels.iter().any(|l| l.eq_ignore_ascii_case(label)))
            .map(|i| SymbolId(i as u16))
    }

    /// Concatenate primary labels in order (the matching key)
    pub fn flatten(&self, ids: impl IntoIterator<Item = SymbolId>) -> String {
        ids.into_iter()
            .filter_map(|id| self.symbol(id))
            .map(Symbol::primary)
            .collect()
    }

    /// Join labels in the given language for display
    pub fn render(
        &self,
        ids: impl IntoIterator<Item = SymbolId>,
        language: usize,
        separator: &str,
    ) -> String {
        ids.into_iter()
            .filter_map(|id| self.symbol(id))
            .map(|s| s.label(language))
            .collect::<Vec<_>>()
            .join(separator)
    }

    pub fn sequences(&self) -> &[SequenceEntry] {
        &self.sequences
    }

    pub fn sequence(&self, index: usize) -> Option<&SequenceEntry> {
        self.sequences.get(index)
    }

    /// Flattened primary-label string of a sequence
    pub fn pattern(&self, index: usize) -> Option<&str> {
        self.patterns.get(index).map(String::as_str)
    }

    /// Flattened patterns in catalogue order
    pub fn patterns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.patterns.iter().map(String::as_str).enumerate()
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Longest sequence, in signs
    pub fn longest_sequence(&self) -> usize {
        self.sequences.iter().map(|s| s.symbols.len()).max().unwrap_or(0)
    }

    /// SHA-256 of the canonical JSON form, hex encoded
    pub fn digest(&self) -> String {
        let file = CatalogueFile {
            languages: self.languages.clone(),
            symbols: self.symbols.clone(),
            sequences: self
                .sequences
                .iter()
                .map(|s| RawSequence {
                    category: s.category.clone(),
                    names: s.names.clone(),
                    symbols: s.symbols.iter().map(|id| id.0 as u32).collect(),
                })
                .collect(),
        };
        let json = serde_json::to_vec(&file).unwrap_or_default();
        let hash = Sha256::digest(&json);
        hash.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// In-code catalogue construction (validated on `build`)
#[derive(Debug, Clone)]
pub struct CatalogueBuilder {
    file: CatalogueFile,
}

impl CatalogueBuilder {
    pub fn symbol<S: AsRef<str>>(mut self, labels: &[S]) -> Self {
        self.file.symbols.push(Symbol {
            labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
        });
        self
    }

    pub fn sequence<S: AsRef<str>>(mut self, category: &[S], names: &[S], symbols: &[u32]) -> Self {
        self.file.sequences.push(RawSequence {
            category: category.iter().map(|c| c.as_ref().to_string()).collect(),
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
            symbols: symbols.to_vec(),
        });
        self
    }

    pub fn build(self) -> Result<Catalogue, CatalogueError> {
        Catalogue::validate(self.file)
    }
}

// =============================================================================
// TESTS
// =============================================================================
