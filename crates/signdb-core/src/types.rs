//! Domain types shared by the store, the indices and the search service.

use serde::{Deserialize, Serialize};

pub type UnitId = i64;
pub type VariantId = String;

/// What a unit teaches. Mirrors the `unit.type` check constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Letter,
    Digit,
    Word,
    Phrase,
    Sentence,
    Sign,
}

/// The smallest learnable item. Belongs to exactly one lesson.
///
/// `description` may hold several variants joined with a numbering marker
/// (see [`crate::variants::VariantSplitter`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    #[serde(alias = "unit_id")]
    pub id: UnitId,
    #[serde(default)]
    pub lesson_id: Option<i64>,
    #[serde(default, rename = "type")]
    pub kind: Option<UnitKind>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub transcription: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    #[serde(alias = "topic_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub cover_video_url: Option<String>,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Number of lessons under this topic, computed client-side.
    #[serde(default)]
    pub lesson_count: usize,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Lesson {
    #[serde(alias = "lesson_id")]
    pub id: i64,
    pub topic_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// One description variant of a unit; the unit of indexing.
///
/// - `id`: `"<unit_id>:<variant_index>"`, unique across the index
/// - `unit_id`: owning unit, the unit of de-duplication and ranking
/// - `variant_index`/`total_variants`: position within the unit's description
/// - `content`: the variant text with its numbering marker stripped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantEntry {
    pub id: VariantId,
    pub unit_id: UnitId,
    pub variant_index: usize,
    pub total_variants: usize,
    pub content: String,
}

impl VariantEntry {
    pub fn variant_id(unit_id: UnitId, variant_index: usize) -> VariantId {
        format!("{unit_id}:{variant_index}")
    }
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
}

/// The minimal surface returned by both indices.
///
/// `id` matches `VariantEntry::id`. `score` is engine-specific but
/// higher is always better; hits come back best first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: VariantId,
    pub score: f32,
    pub source: SourceKind,
}

/// Channel weights for reciprocal-rank fusion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SearchWeights {
    pub semantic: f32,
    pub lexical: f32,
}

impl Default for SearchWeights {
    fn default() -> Self {
        Self { semantic: 0.3, lexical: 0.7 }
    }
}

impl SearchWeights {
    pub fn new(semantic: f32, lexical: f32) -> Self {
        Self { semantic, lexical }
    }

    pub fn is_valid(&self) -> bool {
        self.semantic.is_finite() && self.lexical.is_finite() && self.semantic >= 0.0 && self.lexical >= 0.0
    }
}

/// A unit returned by hybrid search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedUnit {
    pub unit_id: UnitId,
    pub text: String,
    /// The full, unsplit description of the unit.
    pub description: String,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub transcription: Option<String>,
    pub relevance_score: f32,
    /// The single variant that drove the unit's score.
    pub matched_description: String,
}
