//! Splits unit descriptions into independently indexed variants.
//!
//! Seed data joins several phrasings of one description with a numbering
//! marker, e.g. `"Mô tả 1: ...\n\nMô tả 2: ..."`. Each phrasing becomes its
//! own [`VariantEntry`] so a query can match any of them.

use regex::Regex;

use crate::error::{Error, Result};
use crate::types::{Unit, VariantEntry};

pub const DEFAULT_VARIANT_MARKER: &str = r"Mô tả \d+:\s*";

#[derive(Debug, Clone)]
pub struct VariantSplitter {
    marker: Regex,
}

impl Default for VariantSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_VARIANT_MARKER).expect("default variant marker compiles")
    }
}

impl VariantSplitter {
    pub fn new(marker: &str) -> Result<Self> {
        let marker = Regex::new(marker)
            .map_err(|e| Error::InvalidConfig(format!("variant marker '{marker}': {e}")))?;
        Ok(Self { marker })
    }

    pub fn marker(&self) -> &str {
        self.marker.as_str()
    }

    /// Split one description into trimmed, non-empty variants.
    ///
    /// Text before the first marker is kept as its own variant. Without any
    /// marker, or when the markers leave nothing behind, the whole trimmed
    /// string is the single variant.
    pub fn split(&self, description: &str) -> Vec<String> {
        let parts: Vec<String> = self
            .marker
            .split(description)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        let whole = description.trim();
        if parts.is_empty() && !whole.is_empty() {
            return vec![whole.to_string()];
        }
        parts
    }

    /// Flatten units into index entries, skipping units without a usable description.
    pub fn entries_from_units(&self, units: &[Unit]) -> Vec<VariantEntry> {
        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for unit in units {
            let variants = unit.description.as_deref().map(|d| self.split(d)).unwrap_or_default();
            if variants.is_empty() {
                skipped += 1;
                continue;
            }
            let total_variants = variants.len();
            for (variant_index, content) in variants.into_iter().enumerate() {
                entries.push(VariantEntry {
                    id: VariantEntry::variant_id(unit.id, variant_index),
                    unit_id: unit.id,
                    variant_index,
                    total_variants,
                    content,
                });
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "units without description excluded from indexing");
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_numbered_variants() {
        let splitter = VariantSplitter::default();
        let parts = splitter.split("Mô tả 1: wave hand side to side\n\nMô tả 2: palm facing outward");
        assert_eq!(parts, vec!["wave hand side to side", "palm facing outward"]);
    }

    #[test]
    fn no_marker_is_single_variant() {
        let splitter = VariantSplitter::default();
        assert_eq!(splitter.split("  move fist in circle "), vec!["move fist in circle"]);
    }

    #[test]
    fn leading_text_before_marker_is_kept() {
        let splitter = VariantSplitter::default();
        let parts = splitter.split("intro text Mô tả 1: first");
        assert_eq!(parts, vec!["intro text", "first"]);
    }

    #[test]
    fn bare_marker_falls_back_to_whole_field() {
        let splitter = VariantSplitter::default();
        assert_eq!(splitter.split(" Mô tả 1: "), vec!["Mô tả 1:"]);
        assert!(splitter.split("   ").is_empty());
    }

    #[test]
    fn custom_marker() {
        let splitter = VariantSplitter::new(r"\[\d+\]\s*").expect("marker");
        assert_eq!(splitter.split("[1] a [2] b"), vec!["a", "b"]);
    }

    #[test]
    fn invalid_marker_is_config_error() {
        assert!(matches!(VariantSplitter::new("(unclosed"), Err(Error::InvalidConfig(_))));
    }
}
