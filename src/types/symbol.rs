//! Symbol ids and detections

use serde::{Deserialize, Serialize};

/// Catalogue-validated hand sign id (row index in the symbol table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u16);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One hand sign with a label per catalogue language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Labels indexed by language; index 0 is the matching key
    pub labels: Vec<String>,
}

impl Symbol {
    /// Primary label, used for flattening
    pub fn primary(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or("")
    }

    /// Label in the given language, falling back to the primary one
    pub fn label(&self, language: usize) -> &str {
        self.labels
            .get(language)
            .map(String::as_str)
            .unwrap_or_else(|| self.primary())
    }
}

/// A single classifier output for one detected region
///
/// `symbol` is the raw class id from the oracle; it is not trusted to be
/// inside the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub symbol: u32,
    pub confidence: f64,
}

impl Detection {
    pub fn new(symbol: u32, confidence: f64) -> Self {
        Self { symbol, confidence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_falls_back_to_primary() {
        let symbol = Symbol { labels: vec!["子".to_string()] };
        assert_eq!(symbol.label(0), "子");
        assert_eq!(symbol.label(1), "子");
    }

    #[test]
    fn test_detection_json_shape() {
        let d: Detection = serde_json::from_str(r#"{"symbol": 3, "confidence": 0.9}"#).unwrap();
        assert_eq!(d, Detection::new(3, 0.9));
    }
}
